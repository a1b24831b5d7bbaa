//! Keyboard state consumed by the simulation
//!
//! Directions are level-triggered (held keys), jump is edge-triggered and
//! consumed by the next step.

use serde::{Deserialize, Serialize};

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Forward,
    Back,
    Jump,
}

impl Key {
    /// Map a DOM `KeyboardEvent.code`
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "KeyA" | "ArrowLeft" => Some(Key::Left),
            "KeyD" | "ArrowRight" => Some(Key::Right),
            "KeyW" | "ArrowUp" => Some(Key::Forward),
            "KeyS" | "ArrowDown" => Some(Key::Back),
            "Space" => Some(Key::Jump),
            _ => None,
        }
    }
}

/// Input for a single step (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Toward -z
    pub forward: bool,
    /// Toward +z
    pub back: bool,
    /// Jump pressed since the last step
    pub jump: bool,
}

/// Held keys plus a pending jump
#[derive(Debug, Clone, Default)]
pub struct InputState {
    left: bool,
    right: bool,
    forward: bool,
    back: bool,
    jump_held: bool,
    jump_pending: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        match key {
            Key::Left => self.left = true,
            Key::Right => self.right = true,
            Key::Forward => self.forward = true,
            Key::Back => self.back = true,
            Key::Jump => {
                // Auto-repeat keydowns while held are not new presses
                if !self.jump_held {
                    self.jump_pending = true;
                }
                self.jump_held = true;
            }
        }
    }

    pub fn key_up(&mut self, key: Key) {
        match key {
            Key::Left => self.left = false,
            Key::Right => self.right = false,
            Key::Forward => self.forward = false,
            Key::Back => self.back = false,
            Key::Jump => self.jump_held = false,
        }
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        match key {
            Key::Left => self.left,
            Key::Right => self.right,
            Key::Forward => self.forward,
            Key::Back => self.back,
            Key::Jump => self.jump_held,
        }
    }

    /// Snapshot for the next step; the pending jump is consumed
    pub fn take_tick_input(&mut self) -> TickInput {
        let input = TickInput {
            left: self.left,
            right: self.right,
            forward: self.forward,
            back: self.back,
            jump: self.jump_pending,
        };
        self.jump_pending = false;
        input
    }

    /// Release everything (restart, focus loss)
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_codes() {
        assert_eq!(Key::from_code("KeyA"), Some(Key::Left));
        assert_eq!(Key::from_code("KeyD"), Some(Key::Right));
        assert_eq!(Key::from_code("KeyW"), Some(Key::Forward));
        assert_eq!(Key::from_code("KeyS"), Some(Key::Back));
        assert_eq!(Key::from_code("Space"), Some(Key::Jump));
        assert_eq!(Key::from_code("KeyQ"), None);
    }

    #[test]
    fn test_directions_are_held() {
        let mut input = InputState::new();
        input.key_down(Key::Left);
        input.key_down(Key::Back);
        assert!(input.take_tick_input().left);
        let tick = input.take_tick_input();
        assert!(tick.left && tick.back);

        input.key_up(Key::Left);
        let tick = input.take_tick_input();
        assert!(!tick.left && tick.back);
    }

    #[test]
    fn test_jump_consumed_once() {
        let mut input = InputState::new();
        input.key_down(Key::Jump);
        assert!(input.take_tick_input().jump);
        assert!(!input.take_tick_input().jump);
        assert!(input.is_pressed(Key::Jump));
    }

    #[test]
    fn test_jump_ignores_auto_repeat() {
        let mut input = InputState::new();
        input.key_down(Key::Jump);
        input.take_tick_input();
        input.key_down(Key::Jump);
        assert!(!input.take_tick_input().jump);

        input.key_up(Key::Jump);
        input.key_down(Key::Jump);
        assert!(input.take_tick_input().jump);
    }

    #[test]
    fn test_clear() {
        let mut input = InputState::new();
        input.key_down(Key::Right);
        input.key_down(Key::Jump);
        input.clear();
        assert_eq!(input.take_tick_input(), TickInput::default());
    }
}
