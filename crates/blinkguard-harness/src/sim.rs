#![forbid(unsafe_code)]

//! Simulated platform text field.
//!
//! [`SimTextField`] implements [`TextFieldControl`] and reproduces the
//! platform defect the guard exists for: every layout pass starts the
//! caret blink animation, focused or not, and only the resign path stops
//! it. While the animation runs, the blinker inside the field's shared
//! caret state holds a strong `Rc` back to that same state, so a field
//! that is laid out and then dropped without ever becoming the input
//! target stays alive and keeps receiving blink ticks.
//!
//! [`SeverBehavior`] controls what the privileged severance operation
//! does, so tests can drive the clean path, the unwind path, and the
//! severance-had-no-effect path.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use blinkguard_core::bus::{BlinkBus, BlinkSubscriber};
use blinkguard_core::caret::CaretBlinker;
use blinkguard_core::control::TextFieldControl;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// What [`TextFieldControl::sever_caret_owner`] does on a simulated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeverBehavior {
    /// Release the owner reference, as the platform's resign path would.
    #[default]
    Clean,
    /// Panic, as if the private caret state changed shape in a platform
    /// update.
    Panic,
    /// Return normally without releasing anything, so post-repair
    /// verification finds the reference still held.
    Sticky,
}

struct CaretState {
    blinker: CaretBlinker<CaretCell>,
    ticks_seen: u64,
}

/// The field's shared caret state. The blinker it contains holds the
/// owner reference back to this very cell while engaged; that loop is
/// the retain cycle under test.
pub struct CaretCell {
    state: RefCell<CaretState>,
}

impl CaretCell {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            state: RefCell::new(CaretState {
                blinker: CaretBlinker::default(),
                ticks_seen: 0,
            }),
        })
    }

    /// Blink ticks this cell has received from the bus.
    pub fn ticks_seen(&self) -> u64 {
        self.state.borrow().ticks_seen
    }

    /// Whether the caret is in the visible half of its blink phase.
    pub fn caret_visible(&self) -> bool {
        self.state.borrow().blinker.caret_visible()
    }

    fn owner_held(&self) -> bool {
        self.state.borrow().blinker.is_engaged()
    }

    fn engage(cell: &Rc<Self>) {
        let owner = Rc::clone(cell);
        cell.state.borrow_mut().blinker.start(owner);
    }

    fn release(&self) {
        self.state.borrow_mut().blinker.stop();
    }
}

impl BlinkSubscriber for CaretCell {
    fn on_blink_tick(&self) {
        let mut state = self.state.borrow_mut();
        state.ticks_seen += 1;
        let interval = state.blinker.interval();
        state.blinker.advance(interval);
    }
}

/// Simulated platform text field, grapheme-cluster aware.
pub struct SimTextField {
    value: String,
    cursor: usize,
    placeholder: String,
    input_target: bool,
    caret: Rc<CaretCell>,
    bus: BlinkBus,
    subscribed: bool,
    layout_passes: u64,
    sever_behavior: SeverBehavior,
}

impl SimTextField {
    /// Create an empty field attached to the given blink bus.
    pub fn new(bus: &BlinkBus) -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            placeholder: String::new(),
            input_target: false,
            caret: CaretCell::new(),
            bus: bus.clone(),
            subscribed: false,
            layout_passes: 0,
            sever_behavior: SeverBehavior::default(),
        }
    }

    /// Set the text value (builder).
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self.cursor = self.value.graphemes(true).count();
        self
    }

    /// Set the placeholder text (builder).
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Set the severance behavior (builder).
    pub fn with_sever_behavior(mut self, behavior: SeverBehavior) -> Self {
        self.sever_behavior = behavior;
        self
    }

    /// Change the severance behavior on an existing field.
    pub fn set_sever_behavior(&mut self, behavior: SeverBehavior) {
        self.sever_behavior = behavior;
    }

    /// Number of layout passes delivered so far.
    pub fn layout_passes(&self) -> u64 {
        self.layout_passes
    }

    /// Whether the caret is in the visible half of its blink phase.
    pub fn caret_visible(&self) -> bool {
        self.caret.caret_visible()
    }

    /// Blink ticks this field has received from the bus.
    pub fn ticks_seen(&self) -> u64 {
        self.caret.ticks_seen()
    }

    /// Strong count on the shared caret state. Two while the blinker is
    /// engaged (field + owner reference), one otherwise.
    pub fn caret_strong_count(&self) -> usize {
        Rc::strong_count(&self.caret)
    }

    /// Weak handle to the shared caret state, for observing whether it
    /// outlives the field.
    pub fn caret_weak(&self) -> Weak<CaretCell> {
        Rc::downgrade(&self.caret)
    }

    /// Visual column of the cursor, in display cells.
    pub fn caret_column(&self) -> usize {
        self.value
            .graphemes(true)
            .take(self.cursor)
            .map(UnicodeWidthStr::width)
            .sum()
    }

    fn start_caret_blink(&mut self) {
        if !self.subscribed {
            self.bus.subscribe(&self.caret);
            self.subscribed = true;
        }
        CaretCell::engage(&self.caret);
    }

    fn grapheme_count(&self) -> usize {
        self.value.graphemes(true).count()
    }

    fn grapheme_byte_offset(&self, grapheme_idx: usize) -> usize {
        self.value
            .grapheme_indices(true)
            .nth(grapheme_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }
}

impl TextFieldControl for SimTextField {
    fn value(&self) -> &str {
        &self.value
    }

    fn set_value(&mut self, value: &str) {
        self.value = value.to_owned();
        self.cursor = self.cursor.min(self.grapheme_count());
    }

    fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn insert_char(&mut self, c: char) {
        let byte_offset = self.grapheme_byte_offset(self.cursor);
        self.value.insert(byte_offset, c);
        self.cursor += 1;
    }

    fn delete_char_back(&mut self) {
        if self.cursor > 0 {
            let byte_start = self.grapheme_byte_offset(self.cursor - 1);
            let byte_end = self.grapheme_byte_offset(self.cursor);
            self.value.drain(byte_start..byte_end);
            self.cursor -= 1;
        }
    }

    fn cursor(&self) -> usize {
        self.cursor
    }

    fn set_cursor(&mut self, index: usize) {
        self.cursor = index.min(self.grapheme_count());
    }

    fn placeholder(&self) -> &str {
        &self.placeholder
    }

    fn set_placeholder(&mut self, placeholder: &str) {
        self.placeholder = placeholder.to_owned();
    }

    fn is_input_target(&self) -> bool {
        self.input_target
    }

    fn become_input_target(&mut self) -> bool {
        self.input_target = true;
        self.start_caret_blink();
        true
    }

    fn resign_input_target(&mut self) -> bool {
        if !self.input_target {
            return false;
        }
        self.input_target = false;
        self.caret.release();
        true
    }

    fn layout(&mut self) {
        self.layout_passes += 1;
        // The defect: the blink animation starts on every layout pass,
        // whether or not the field is the input target.
        self.start_caret_blink();
    }

    fn caret_owner_held(&self) -> bool {
        self.caret.owner_held()
    }

    fn sever_caret_owner(&mut self) {
        match self.sever_behavior {
            SeverBehavior::Clean => self.caret.release(),
            SeverBehavior::Panic => panic!("caret blink state not in the expected shape"),
            SeverBehavior::Sticky => {}
        }
    }
}
