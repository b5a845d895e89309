#![forbid(unsafe_code)]

//! The leak-guarded text field wrapper.
//!
//! Wraps any [`TextFieldControl`] and forwards its whole surface
//! unchanged. The single point of interception is the layout pass: after
//! deferring to the wrapped control's own layout handling, the wrapper
//! runs the repair algorithm and hands any fault to the failure
//! reporter. Running the repair after the base pass means an owner
//! reference established during that very pass is severed before the
//! signal returns; the ordering does not affect the base control's
//! layout result (see the integration tests).

use blinkguard_core::control::TextFieldControl;

use crate::repair::run_repair;
use crate::report::{FailureCallback, FailureReport, FailureReporter};

/// Drop-in substitute for a platform text-input control that neutralizes
/// the caret-blink retain cycle.
///
/// Behaves as the wrapped control in all respects. Each layout signal
/// re-attempts the repair while the vulnerable condition persists; a
/// control that becomes the current input target while the caret owner
/// reference is established is left to the normal resign path forever
/// after.
#[derive(Debug)]
pub struct LeakGuardedTextField<C: TextFieldControl> {
    inner: C,
    /// Sticky: the control was the input target while the owner
    /// reference was established, so the resign path owns the release.
    target_while_engaged: bool,
    reporter: &'static FailureReporter,
}

impl<C: TextFieldControl> LeakGuardedTextField<C> {
    /// Wrap a control, reporting failures to the process-wide reporter.
    pub fn new(inner: C) -> Self {
        Self::with_reporter(inner, FailureReporter::global())
    }

    /// Wrap a control, reporting failures to a specific reporter.
    pub fn with_reporter(inner: C, reporter: &'static FailureReporter) -> Self {
        Self {
            inner,
            target_while_engaged: false,
            reporter,
        }
    }

    /// Set the process-wide callback invoked when a repair fails.
    ///
    /// Passing `None` removes the current callback. If a repair has
    /// already failed by the time a non-empty callback is registered,
    /// the callback is invoked immediately with that first failure; it
    /// is never invoked more than once for it.
    pub fn set_failed_to_apply_fix_callback(callback: Option<FailureCallback>) {
        FailureReporter::global().set_callback(callback);
    }

    /// The wrapped control.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Mutable access to the wrapped control.
    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    /// Unwrap, discarding the guard.
    pub fn into_inner(self) -> C {
        self.inner
    }

    fn repair_and_report(&mut self) {
        let attempt = run_repair(&mut self.inner, self.target_while_engaged);

        #[cfg(feature = "tracing")]
        match attempt.fault() {
            Some(fault) => tracing::warn!(%fault, "caret repair failed"),
            None if attempt.triggered => tracing::debug!("caret owner reference severed"),
            None => {}
        }

        if let Some(fault) = attempt.into_fault() {
            self.reporter.record(FailureReport::from_fault(fault));
        }
    }
}

impl<C: TextFieldControl> TextFieldControl for LeakGuardedTextField<C> {
    fn value(&self) -> &str {
        self.inner.value()
    }

    fn set_value(&mut self, value: &str) {
        self.inner.set_value(value);
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    fn insert_char(&mut self, c: char) {
        self.inner.insert_char(c);
    }

    fn delete_char_back(&mut self) {
        self.inner.delete_char_back();
    }

    fn cursor(&self) -> usize {
        self.inner.cursor()
    }

    fn set_cursor(&mut self, index: usize) {
        self.inner.set_cursor(index);
    }

    fn placeholder(&self) -> &str {
        self.inner.placeholder()
    }

    fn set_placeholder(&mut self, placeholder: &str) {
        self.inner.set_placeholder(placeholder);
    }

    fn is_input_target(&self) -> bool {
        self.inner.is_input_target()
    }

    fn become_input_target(&mut self) -> bool {
        let became = self.inner.become_input_target();
        if became && self.inner.caret_owner_held() {
            self.target_while_engaged = true;
        }
        became
    }

    fn resign_input_target(&mut self) -> bool {
        self.inner.resign_input_target()
    }

    fn layout(&mut self) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("guarded_layout").entered();

        self.inner.layout();
        self.repair_and_report();
    }

    fn caret_owner_held(&self) -> bool {
        self.inner.caret_owner_held()
    }

    fn sever_caret_owner(&mut self) {
        self.inner.sever_caret_owner();
    }
}
