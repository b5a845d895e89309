#![forbid(unsafe_code)]

//! Blinkguard public facade crate.
//!
//! Re-exports the stable surface area: wrap a platform text field in
//! [`LeakGuardedTextField`] wherever the base control is expected, and
//! register a diagnostics callback once through
//! [`LeakGuardedTextField::set_failed_to_apply_fix_callback`].
//!
//! # Example
//!
//! ```ignore
//! use blinkguard::prelude::*;
//!
//! let mut field = LeakGuardedTextField::new(platform_field);
//! LeakGuardedTextField::<PlatformField>::set_failed_to_apply_fix_callback(Some(
//!     std::sync::Arc::new(|report| eprintln!("caret repair failed: {report}")),
//! ));
//! field.layout();
//! ```

// --- Core re-exports -------------------------------------------------------

pub use blinkguard_core::bus::{BlinkBus, BlinkSubscriber};
pub use blinkguard_core::caret::{CaretBlinker, DEFAULT_BLINK_INTERVAL};
pub use blinkguard_core::control::TextFieldControl;

// --- Guard re-exports ------------------------------------------------------

pub use blinkguard_field::{
    ERROR_DOMAIN, ErrorCode, Fault, FailureCallback, FailureReport, FailureReporter,
    LeakGuardedTextField, RepairAttempt, run_repair,
};

/// Commonly used imports.
pub mod prelude {
    pub use crate::{
        ErrorCode, FailureCallback, FailureReport, FailureReporter, LeakGuardedTextField,
        TextFieldControl,
    };
}
