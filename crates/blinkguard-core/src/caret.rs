#![forbid(unsafe_code)]

//! Caret-blink animation state.
//!
//! A [`CaretBlinker`] is the per-control piece of the caret animation
//! subsystem. While engaged it holds a strong reference back to the
//! control's shared state (`owner`), which keeps the control alive for
//! the duration of the animation. That reference is released when the
//! control resigns input-target status. If the resign path is never
//! taken, the reference pins the control forever; severing it is exactly
//! what the leak guard does.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Default blink interval, matching the common platform caret cadence.
pub const DEFAULT_BLINK_INTERVAL: Duration = Duration::from_millis(500);

/// Per-control caret-blink animation state.
///
/// `T` is the control's shared inner state. The `owner` handle is the
/// single strong back-reference this crate is built around.
pub struct CaretBlinker<T> {
    /// Strong back-reference to the control while the animation runs.
    owner: Option<Rc<T>>,
    interval: Duration,
    elapsed: Duration,
    visible: bool,
}

impl<T> CaretBlinker<T> {
    /// Create a disengaged blinker with the given blink interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            owner: None,
            interval,
            elapsed: Duration::ZERO,
            visible: false,
        }
    }

    /// Engage the animation, retaining `owner` until [`stop`] is called.
    ///
    /// The caret starts its phase visible. Re-engaging while already
    /// engaged replaces the held owner and resets the phase.
    ///
    /// [`stop`]: CaretBlinker::stop
    pub fn start(&mut self, owner: Rc<T>) {
        self.owner = Some(owner);
        self.visible = true;
        self.elapsed = Duration::ZERO;
    }

    /// Disengage the animation and release the owner reference.
    pub fn stop(&mut self) {
        self.owner = None;
        self.visible = false;
        self.elapsed = Duration::ZERO;
    }

    /// Whether the owner reference is currently held.
    pub fn is_engaged(&self) -> bool {
        self.owner.is_some()
    }

    /// Whether the caret is in the visible half of its blink phase.
    pub fn caret_visible(&self) -> bool {
        self.visible
    }

    /// The configured blink interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Advance the animation clock. Returns `true` if visibility
    /// toggled. Does nothing while disengaged.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.owner.is_none() || self.interval.is_zero() {
            return false;
        }
        self.elapsed += dt;
        let mut changed = false;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            self.visible = !self.visible;
            changed = true;
        }
        changed
    }
}

impl<T> Default for CaretBlinker<T> {
    fn default() -> Self {
        Self::new(DEFAULT_BLINK_INTERVAL)
    }
}

// The owner reference may be part of a cycle, so Debug reports only
// whether it is held rather than following it.
impl<T> fmt::Debug for CaretBlinker<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaretBlinker")
            .field("engaged", &self.is_engaged())
            .field("interval", &self.interval)
            .field("visible", &self.visible)
            .finish()
    }
}
