//! Keyboard and mouse state with edge detection.
//!
//! [`InputState`] keeps two snapshots: the one being built this frame and the
//! one from the previous frame. Edge queries (`was_pressed`, `was_released`)
//! compare the two, so they hold for exactly one frame after the change.

use serde::{Deserialize, Serialize};

use super::events::Event;
use crate::geometry::Vec2;

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// Keys the engine tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Key {
    #[default]
    A,
    D,
    W,
    S,
    Left,
    Right,
    Up,
    Down,
    Space,
    Return,
    Escape,
}

impl Key {
    pub const COUNT: usize = 11;

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// MouseButton
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    #[inline]
    fn mask(self) -> u8 {
        1 << (self as u8)
    }
}

// ---------------------------------------------------------------------------
// InputState
// ---------------------------------------------------------------------------

/// Current and previous input snapshots.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: [bool; Key::COUNT],
    prev_keys: [bool; Key::COUNT],
    buttons: u8,
    prev_buttons: u8,
    mouse: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rotate snapshots: the current state becomes the previous one.
    /// Call once per frame after systems have read the input.
    pub fn end_frame(&mut self) {
        self.prev_keys = self.keys;
        self.prev_buttons = self.buttons;
    }

    /// Fold a platform event into the current snapshot.
    pub fn apply(&mut self, event: &Event) {
        match *event {
            Event::KeyDown(key) => self.press(key),
            Event::KeyUp(key) => self.release(key),
            Event::MouseButtonDown(button) => self.press_button(button),
            Event::MouseButtonUp(button) => self.release_button(button),
            Event::MouseMotion(position) => self.move_mouse(position),
            Event::Quit => {}
        }
    }

    // -- feeding -------------------------------------------------------------

    pub fn press(&mut self, key: Key) {
        self.keys[key.index()] = true;
    }

    pub fn release(&mut self, key: Key) {
        self.keys[key.index()] = false;
    }

    pub fn press_button(&mut self, button: MouseButton) {
        self.buttons |= button.mask();
    }

    pub fn release_button(&mut self, button: MouseButton) {
        self.buttons &= !button.mask();
    }

    pub fn move_mouse(&mut self, position: Vec2) {
        self.mouse = position;
    }

    // -- keyboard queries ----------------------------------------------------

    pub fn is_down(&self, key: Key) -> bool {
        self.keys[key.index()]
    }

    pub fn is_up(&self, key: Key) -> bool {
        !self.is_down(key)
    }

    /// Down now, up last frame.
    pub fn was_pressed(&self, key: Key) -> bool {
        self.keys[key.index()] && !self.prev_keys[key.index()]
    }

    /// Up now, down last frame.
    pub fn was_released(&self, key: Key) -> bool {
        !self.keys[key.index()] && self.prev_keys[key.index()]
    }

    // -- mouse queries -------------------------------------------------------

    pub fn mouse_is_down(&self, button: MouseButton) -> bool {
        self.buttons & button.mask() != 0
    }

    pub fn mouse_is_up(&self, button: MouseButton) -> bool {
        !self.mouse_is_down(button)
    }

    pub fn mouse_was_pressed(&self, button: MouseButton) -> bool {
        self.mouse_is_down(button) && self.prev_buttons & button.mask() == 0
    }

    pub fn mouse_was_released(&self, button: MouseButton) -> bool {
        !self.mouse_is_down(button) && self.prev_buttons & button.mask() != 0
    }

    pub fn mouse_position(&self) -> Vec2 {
        self.mouse
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_edges_last_one_frame() {
        let mut input = InputState::new();
        input.press(Key::Left);
        assert!(input.is_down(Key::Left));
        assert!(input.was_pressed(Key::Left));

        input.end_frame();
        assert!(input.is_down(Key::Left));
        assert!(!input.was_pressed(Key::Left));

        input.release(Key::Left);
        assert!(input.is_up(Key::Left));
        assert!(input.was_released(Key::Left));

        input.end_frame();
        assert!(!input.was_released(Key::Left));
    }

    #[test]
    fn keys_are_independent() {
        let mut input = InputState::new();
        input.press(Key::A);
        assert!(input.is_up(Key::D));
        assert!(!input.was_pressed(Key::D));
    }

    #[test]
    fn mouse_buttons_use_bitmask() {
        let mut input = InputState::new();
        input.press_button(MouseButton::Left);
        input.press_button(MouseButton::Right);
        assert!(input.mouse_was_pressed(MouseButton::Left));
        assert!(input.mouse_is_up(MouseButton::Middle));

        input.end_frame();
        input.release_button(MouseButton::Left);
        assert!(input.mouse_was_released(MouseButton::Left));
        assert!(input.mouse_is_down(MouseButton::Right));
        assert!(!input.mouse_was_pressed(MouseButton::Right));
    }

    #[test]
    fn events_feed_current_snapshot() {
        let mut input = InputState::new();
        input.apply(&Event::KeyDown(Key::Space));
        input.apply(&Event::MouseMotion(Vec2::new(12.0, 34.0)));
        input.apply(&Event::MouseButtonDown(MouseButton::Left));
        assert!(input.was_pressed(Key::Space));
        assert_eq!(input.mouse_position(), Vec2::new(12.0, 34.0));
        assert!(input.mouse_is_down(MouseButton::Left));
        input.apply(&Event::Quit);
        assert!(input.is_down(Key::Space));
    }
}
