#![forbid(unsafe_code)]

//! Leak-guarded text field.
//!
//! A platform text-input control leaks when a layout pass starts its
//! caret blink animation and the control never becomes the current input
//! target: the animation's owner reference back to the control is only
//! released on the resign path, which is never reached. The pinned
//! control keeps its blink timer alive and floods the shared tick bus.
//!
//! [`LeakGuardedTextField`] wraps any [`TextFieldControl`], behaves as
//! the wrapped control in every respect, and on each layout pass detects
//! the vulnerable condition, severs the owner reference, verifies the
//! severance took, and reports failures exactly once through the
//! process-wide [`FailureReporter`].
//!
//! [`TextFieldControl`]: blinkguard_core::TextFieldControl

pub mod field;
pub mod repair;
pub mod report;

pub use field::LeakGuardedTextField;
pub use repair::{Fault, RepairAttempt, run_repair};
pub use report::{ERROR_DOMAIN, ErrorCode, FailureCallback, FailureReport, FailureReporter};
