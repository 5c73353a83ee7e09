//! Client input management with change detection

use crate::game::world::InputVector;
use crate::ws::protocol::ClientMsg;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Tracks held directions and emits a `move` only when the resulting
/// input vector differs from the last one sent.
#[derive(Debug, Default)]
pub struct InputTracker {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    last_sent: InputVector,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, direction: Direction) -> Option<ClientMsg> {
        self.set(direction, true)
    }

    pub fn release(&mut self, direction: Direction) -> Option<ClientMsg> {
        self.set(direction, false)
    }

    /// Release everything, e.g. when the window loses focus
    pub fn clear(&mut self) -> Option<ClientMsg> {
        self.up = false;
        self.down = false;
        self.left = false;
        self.right = false;
        self.emit_if_changed()
    }

    /// Input vector implied by the held keys. Opposite keys cancel out.
    pub fn current(&self) -> InputVector {
        InputVector {
            x: self.right as i8 - self.left as i8,
            // screen y grows downwards
            y: self.down as i8 - self.up as i8,
        }
    }

    fn set(&mut self, direction: Direction, held: bool) -> Option<ClientMsg> {
        match direction {
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
        self.emit_if_changed()
    }

    fn emit_if_changed(&mut self) -> Option<ClientMsg> {
        let input = self.current();
        if input == self.last_sent {
            return None;
        }
        self.last_sent = input;
        Some(ClientMsg::Move { input })
    }
}
