//! Window events as the render side sees them.
//!
//! The windowing layer pushes into an [`EventQueue`]; the app drains it
//! once per frame. Nothing here depends on a windowing library.

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// Framebuffer size in pixels.
    Resized { width: u32, height: u32 },
    KeyPressed(Key),
    CloseRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<WindowEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: WindowEvent) {
        self.events.push_back(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Events in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = WindowEvent> + '_ {
        self.events.drain(..)
    }
}
