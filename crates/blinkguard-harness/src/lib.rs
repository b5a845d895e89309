#![forbid(unsafe_code)]

//! Test harness for blinkguard.
//!
//! Provides [`SimTextField`], a simulated platform text field that
//! faithfully reproduces the caret-blink retain-cycle defect, with
//! injection knobs for driving the guard's failure paths.

pub mod sim;

pub use sim::{CaretCell, SeverBehavior, SimTextField};
