//! User input events the engine reacts to.
//!
//! The embedding application converts its windowing events into [`UserEvent`]s and feeds
//! them to [`MapEngine::handle_event`](crate::MapEngine::handle_event). How an event is
//! interpreted depends on the active [`ToolMode`](crate::ToolMode): a left click places a
//! measurement vertex or starts a feature query, a double click finishes a drawing, and
//! pointer movement drives the live measurement label.

use crate::view::ScreenPosition;

/// Mouse button enum.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Middle mouse button.
    Middle,
    /// Right mouse button.
    Right,
    /// Any other mouse button.
    Other,
}

/// State of the pointer at the moment of the event.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MouseEvent {
    /// Pointer position on the screen in pixels from the top-left corner.
    pub screen_position: ScreenPosition,
}

/// User interaction event.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UserEvent {
    /// A mouse button was clicked.
    Click(MouseButton, MouseEvent),
    /// A double click was done.
    DoubleClick(MouseButton, MouseEvent),
    /// Mouse pointer moved.
    PointerMoved(MouseEvent),
}
