#![forbid(unsafe_code)]

//! Failure reporting.
//!
//! Repair attempts run per instance and per layout signal; diagnostics
//! consumption is global and typically wired up once. [`FailureReporter`]
//! decouples the two: it caches the first failure ever recorded and
//! guarantees the registered callback observes it exactly once, whether
//! the callback was registered before or after the failure happened.
//!
//! # Invariants
//!
//! 1. **First failure wins**: once `last_failure` is set it is never
//!    cleared or replaced for the life of the process.
//! 2. **Exactly once**: whichever callback is active at the relevant
//!    moment is invoked exactly once for the first failure, either
//!    synchronously at [`record`] time or synchronously at the next
//!    non-empty [`set_callback`] call. It is never invoked if no failure
//!    ever occurs.
//! 3. **No lock across user code**: callbacks run with the reporter lock
//!    released, so a callback may call back into the reporter.
//!
//! [`record`]: FailureReporter::record
//! [`set_callback`]: FailureReporter::set_callback

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::repair::Fault;

/// Error-domain identifier attached to every [`FailureReport`].
pub const ERROR_DOMAIN: &str = "blinkguard.caret-repair";

/// Failure classification surfaced to the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The severance step panicked.
    Exception = 1,
    /// The severance step completed but the leak was still present.
    NoFix = 2,
}

impl ErrorCode {
    /// Numeric code value.
    pub const fn value(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exception => write!(f, "exception during repair"),
            Self::NoFix => write!(f, "repair had no effect"),
        }
    }
}

/// One recorded repair failure. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct FailureReport {
    domain: &'static str,
    code: ErrorCode,
    fault: Option<Fault>,
}

impl FailureReport {
    /// Build a report from the fault a repair attempt produced.
    pub fn from_fault(fault: Fault) -> Self {
        let code = match fault {
            Fault::Exception { .. } => ErrorCode::Exception,
            Fault::VerificationFailed => ErrorCode::NoFix,
        };
        Self {
            domain: ERROR_DOMAIN,
            code,
            fault: Some(fault),
        }
    }

    /// The error-domain identifier.
    pub fn domain(&self) -> &'static str {
        self.domain
    }

    /// The failure classification.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// The underlying fault, for logging.
    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} code={}] ", self.domain, self.code.value())?;
        match &self.fault {
            Some(fault) => write!(f, "{fault}"),
            None => write!(f, "{}", self.code),
        }
    }
}

impl std::error::Error for FailureReport {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.fault
            .as_ref()
            .map(|fault| fault as &(dyn std::error::Error + 'static))
    }
}

/// Callback receiving failure reports.
pub type FailureCallback = Arc<dyn Fn(&FailureReport) + Send + Sync>;

struct ReporterState {
    last_failure: Option<FailureReport>,
    callback: Option<FailureCallback>,
}

/// Process-wide failure registry: at most one cached failure, at most
/// one active callback.
///
/// The process-wide instance lives for the process lifetime and is
/// reached through [`FailureReporter::global`]. Separate instances can
/// be created for tests. All mutation goes through [`set_callback`] and
/// [`record`]; the state is guarded by a mutex so reports arriving off
/// the UI thread are still safe.
///
/// [`set_callback`]: FailureReporter::set_callback
/// [`record`]: FailureReporter::record
pub struct FailureReporter {
    state: Mutex<ReporterState>,
}

static GLOBAL_REPORTER: FailureReporter = FailureReporter::new();

impl FailureReporter {
    /// Create an empty reporter.
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(ReporterState {
                last_failure: None,
                callback: None,
            }),
        }
    }

    /// The process-wide reporter instance.
    pub fn global() -> &'static FailureReporter {
        &GLOBAL_REPORTER
    }

    /// Replace the registered callback. `None` removes it.
    ///
    /// If a failure is already cached and `callback` is non-empty, the
    /// new callback is invoked synchronously with that failure before
    /// this call returns.
    pub fn set_callback(&self, callback: Option<FailureCallback>) {
        let replay = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.callback = callback;
            match (&state.last_failure, &state.callback) {
                (Some(report), Some(cb)) => Some((report.clone(), Arc::clone(cb))),
                _ => None,
            }
        };
        if let Some((report, cb)) = replay {
            cb(&report);
        }
    }

    /// Record a repair failure. Entry point for the guard wrapper.
    ///
    /// The first report is cached for the process lifetime and delivered
    /// synchronously to the registered callback, if any. Every later
    /// call is a no-op, so a persistent fault re-reported on each layout
    /// signal cannot spam the callback.
    pub fn record(&self, report: FailureReport) {
        let deliver = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if state.last_failure.is_some() {
                return;
            }
            state.last_failure = Some(report.clone());
            state.callback.as_ref().map(Arc::clone)
        };
        if let Some(cb) = deliver {
            cb(&report);
        }
    }

    /// The cached first failure, if any.
    pub fn last_failure(&self) -> Option<FailureReport> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last_failure
            .clone()
    }
}

impl Default for FailureReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FailureReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("FailureReporter")
            .field("last_failure", &state.last_failure)
            .field("has_callback", &state.callback.is_some())
            .finish()
    }
}
