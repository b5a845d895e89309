#![forbid(unsafe_code)]

//! Blink-tick dispatch bus.
//!
//! Models the shared notification path that caret animations post to.
//! Subscribers are held weakly: a control that has been dropped is
//! pruned on the next tick. A control that is kept alive by its own
//! blinker's owner reference stays subscribed and keeps receiving ticks,
//! which is the saturation the leak guard exists to stop.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Receiver of blink ticks. Implementations use interior mutability;
/// delivery happens on the single UI thread.
pub trait BlinkSubscriber {
    /// One blink tick from the dispatch bus.
    fn on_blink_tick(&self);
}

#[derive(Default)]
struct BusInner {
    subscribers: Vec<Weak<dyn BlinkSubscriber>>,
    delivered: u64,
}

/// Shared blink-tick dispatcher. Cloning yields another handle to the
/// same bus.
#[derive(Clone, Default)]
pub struct BlinkBus {
    inner: Rc<RefCell<BusInner>>,
}

impl BlinkBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a caret state. Only a weak reference is kept; the bus
    /// never extends a subscriber's lifetime.
    pub fn subscribe<S: BlinkSubscriber + 'static>(&self, subscriber: &Rc<S>) {
        let erased: Rc<dyn BlinkSubscriber> = subscriber.clone();
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&erased));
    }

    /// Deliver one tick to every live subscriber, pruning dead entries.
    /// Returns the number of deliveries made.
    pub fn tick(&self) -> usize {
        // Upgrade outside the delivery loop so subscribers may call back
        // into the bus without re-borrowing it.
        let live: Vec<Rc<dyn BlinkSubscriber>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|weak| weak.upgrade().is_some());
            inner.subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        for subscriber in &live {
            subscriber.on_blink_tick();
        }
        let count = live.len();
        self.inner.borrow_mut().delivered += count as u64;
        count
    }

    /// Number of subscribers that are still alive.
    pub fn live_subscribers(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|weak| weak.upgrade().is_some())
            .count()
    }

    /// Total deliveries made since the bus was created.
    pub fn ticks_delivered(&self) -> u64 {
        self.inner.borrow().delivered
    }
}

impl std::fmt::Debug for BlinkBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlinkBus")
            .field("live_subscribers", &self.live_subscribers())
            .field("ticks_delivered", &self.ticks_delivered())
            .finish()
    }
}
