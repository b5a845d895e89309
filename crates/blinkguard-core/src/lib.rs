#![forbid(unsafe_code)]

//! Control capability surface and caret-blink primitives for blinkguard.
//!
//! This crate holds the vocabulary shared by the leak guard and by any
//! concrete text-field control it wraps: the [`TextFieldControl`] capability
//! trait, the [`CaretBlinker`] animation primitive whose owner reference is
//! the edge the guard severs, and the [`BlinkBus`] tick dispatcher that a
//! leaked blinker saturates.

pub mod bus;
pub mod caret;
pub mod control;

pub use bus::{BlinkBus, BlinkSubscriber};
pub use caret::{CaretBlinker, DEFAULT_BLINK_INTERVAL};
pub use control::TextFieldControl;
