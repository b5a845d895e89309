#![forbid(unsafe_code)]

//! Capability surface of a platform text-input control.
//!
//! The leak guard does not own a text field implementation. It wraps
//! anything that exposes this trait, forwards the ordinary surface
//! unchanged, and uses the two privileged operations at the bottom to
//! inspect and repair the caret-blink retain cycle.

/// The capability surface of an editable single-line text control.
///
/// The ordinary operations mirror what any platform text field offers:
/// text access, cursor management, input-target (focus) transitions, and
/// a layout pass delivered by the host whenever the control's geometry
/// has been recomputed.
///
/// The two caret operations are privileged introspection into the
/// control's private animation state. They exist solely so a wrapper can
/// detect and break the blink-cycle owner reference; ordinary callers
/// have no business with them.
pub trait TextFieldControl {
    /// Current text value.
    fn value(&self) -> &str;

    /// Replace the text value. Implementations clamp the cursor to the
    /// new value's bounds.
    fn set_value(&mut self, value: &str);

    /// Remove all text.
    fn clear(&mut self);

    /// Insert a character at the cursor.
    fn insert_char(&mut self, c: char);

    /// Delete the character before the cursor. No-op at position zero.
    fn delete_char_back(&mut self);

    /// Cursor position as a grapheme index.
    fn cursor(&self) -> usize;

    /// Move the cursor, clamped to the value's grapheme count.
    fn set_cursor(&mut self, index: usize);

    /// Placeholder text shown while the value is empty.
    fn placeholder(&self) -> &str;

    /// Replace the placeholder text.
    fn set_placeholder(&mut self, placeholder: &str);

    /// Whether this control is the current input target (the element
    /// receiving keyboard input, a "first responder" elsewhere).
    fn is_input_target(&self) -> bool;

    /// Request input-target status. Returns `false` if the platform
    /// refuses the transition.
    fn become_input_target(&mut self) -> bool;

    /// Give up input-target status. Returns `false` if the control was
    /// not the input target. This is the path that normally releases the
    /// caret-blink owner reference.
    fn resign_input_target(&mut self) -> bool;

    /// Layout pass, delivered by the host after the control's geometry
    /// has been (re)computed.
    fn layout(&mut self);

    /// Privileged: whether the caret animation currently holds its owner
    /// reference back to the control.
    fn caret_owner_held(&self) -> bool;

    /// Privileged: reach into the private caret-animation state and
    /// release the owner reference, as the resign path would.
    ///
    /// This operation is fragile. If the control's internals are not in
    /// the expected shape it may panic; callers that cannot tolerate an
    /// unwind must catch it.
    fn sever_caret_owner(&mut self);
}
