#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! The host translates its native input (DOM events, windowing events) into
//! these values before handing them to the tour engine. All events derive
//! `Clone` and `PartialEq` for use in tests and pattern matching.
//!
//! # Design Notes
//!
//! - Pointer coordinates are viewport-relative logical pixels
//! - `KeyEventKind` defaults to `Press` when the host cannot tell
//! - `Modifiers` ride along on key events; the lock uses them to tell page
//!   scrolling (Ctrl+Home, Shift+Space) from history navigation (Alt+Left)

use bitflags::bitflags;

use crate::geometry::Point;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),

    /// A mouse event (buttons, movement, wheel).
    Mouse(MouseEvent),

    /// A touch event.
    Touch(TouchEvent),

    /// The viewport or document changed size.
    Resize {
        /// New viewport width in logical pixels.
        width: f64,
        /// New viewport height in logical pixels.
        height: f64,
    },
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether the browser would scroll the page for this key.
    ///
    /// Alt/Super with Left/Right is history navigation, not a scroll.
    #[must_use]
    pub const fn scrolls_page(&self) -> bool {
        match self.code {
            KeyCode::Left | KeyCode::Right => !self
                .modifiers
                .intersects(Modifiers::ALT.union(Modifiers::SUPER)),
            code => code.is_scroll_key(),
        }
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key. Space is `Char(' ')`.
    Char(char),
    Enter,
    Escape,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
}

impl KeyCode {
    /// Keys that scroll the page by default in a browser.
    #[must_use]
    pub const fn is_scroll_key(&self) -> bool {
        matches!(
            self,
            Self::Up
                | Self::Down
                | Self::Left
                | Self::Right
                | Self::PageUp
                | Self::PageDown
                | Self::Home
                | Self::End
                | Self::Char(' ')
        )
    }
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// A mouse event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    /// The type of mouse event.
    pub kind: MouseEventKind,

    /// X coordinate in viewport pixels.
    pub x: f64,

    /// Y coordinate in viewport pixels.
    pub y: f64,
}

impl MouseEvent {
    /// Create a new mouse event.
    #[must_use]
    pub const fn new(kind: MouseEventKind, x: f64, y: f64) -> Self {
        Self { kind, x, y }
    }

    /// Get the position as a point.
    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// The type of mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    /// Mouse button pressed down.
    Down(MouseButton),

    /// Mouse button released.
    Up(MouseButton),

    /// Mouse moved (no button pressed).
    Moved,

    ScrollUp,
    ScrollDown,
    ScrollLeft,
    ScrollRight,
}

impl MouseEventKind {
    /// Wheel events in any direction.
    #[must_use]
    pub const fn is_scroll(&self) -> bool {
        matches!(
            self,
            Self::ScrollUp | Self::ScrollDown | Self::ScrollLeft | Self::ScrollRight
        )
    }
}

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    /// Middle mouse button (scroll wheel click).
    Middle,
}

/// A touch event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub x: f64,
    pub y: f64,
}

impl TouchEvent {
    #[must_use]
    pub const fn new(phase: TouchPhase, x: f64, y: f64) -> Self {
        Self { phase, x, y }
    }
}

/// Touch lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}
