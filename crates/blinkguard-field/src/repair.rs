#![forbid(unsafe_code)]

//! The detect-and-break repair algorithm.
//!
//! One repair attempt runs per layout signal. It checks the vulnerable
//! condition, severs the caret owner reference through the control's
//! privileged operation, and verifies the severance took. The severance
//! step reaches into private platform state and may unwind; the unwind
//! is caught here and converted to a [`Fault`], never propagated to the
//! layout caller.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use blinkguard_core::control::TextFieldControl;

/// Why a repair attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// The severance operation panicked. Carries the panic message.
    Exception {
        /// Message extracted from the panic payload.
        message: String,
    },
    /// The severance operation returned normally but the owner
    /// reference was still held afterwards.
    VerificationFailed,
}

impl Fault {
    fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Self::Exception { message }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exception { message } => write!(f, "severance panicked: {message}"),
            Self::VerificationFailed => {
                write!(f, "owner reference still held after severance")
            }
        }
    }
}

impl std::error::Error for Fault {}

/// Outcome of one repair attempt.
#[derive(Debug, Clone)]
pub struct RepairAttempt {
    /// Whether the vulnerable condition was detected.
    pub triggered: bool,
    /// Whether post-repair verification passed.
    pub succeeded: bool,
    fault: Option<Fault>,
}

impl RepairAttempt {
    fn skipped() -> Self {
        Self {
            triggered: false,
            succeeded: false,
            fault: None,
        }
    }

    fn repaired() -> Self {
        Self {
            triggered: true,
            succeeded: true,
            fault: None,
        }
    }

    fn faulted(fault: Fault) -> Self {
        Self {
            triggered: true,
            succeeded: false,
            fault: Some(fault),
        }
    }

    /// The fault produced by this attempt, if any.
    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    /// Consume the attempt, yielding its fault.
    pub fn into_fault(self) -> Option<Fault> {
        self.fault
    }
}

/// Run one repair attempt against `control`.
///
/// `target_while_engaged` is the wrapper's sticky record of whether the
/// control has ever been the current input target while the owner
/// reference was established; for such a control the normal resign path
/// is responsible for the release and the repair must stay out of the
/// way.
///
/// The attempt is idempotent: a successful severance makes the condition
/// false, so the next call is a no-op.
pub fn run_repair<C: TextFieldControl>(
    control: &mut C,
    target_while_engaged: bool,
) -> RepairAttempt {
    if !control.caret_owner_held() || control.is_input_target() || target_while_engaged {
        return RepairAttempt::skipped();
    }

    match catch_unwind(AssertUnwindSafe(|| control.sever_caret_owner())) {
        Err(payload) => RepairAttempt::faulted(Fault::from_panic(payload)),
        Ok(()) => {
            if control.caret_owner_held() {
                RepairAttempt::faulted(Fault::VerificationFailed)
            } else {
                RepairAttempt::repaired()
            }
        }
    }
}
