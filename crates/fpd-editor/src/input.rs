//! Input abstraction layer.
//!
//! Normalizes mouse and wheel events from the host into a unified
//! `InputEvent` enum consumed by the interaction engine. Positions are
//! container pixels; the engine maps them into scene space itself.

use kurbo::Point;

/// Which pointer button started a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    /// Left mouse button, pen or touch contact.
    #[default]
    Primary,
    /// Middle button; pans the camera.
    Middle,
    /// Right button; ignored by the editor.
    Secondary,
}

impl PointerButton {
    /// Map a DOM `MouseEvent.button` code.
    pub fn from_dom(code: i16) -> Self {
        match code {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// Modifier keys held during a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };
}

/// A normalized input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed.
    PointerDown {
        x: f64,
        y: f64,
        button: PointerButton,
        modifiers: Modifiers,
    },

    /// Pointer moved, pressed or not.
    PointerMove {
        x: f64,
        y: f64,
        button: PointerButton,
        modifiers: Modifiers,
    },

    /// Pointer released.
    PointerUp {
        x: f64,
        y: f64,
        button: PointerButton,
        modifiers: Modifiers,
    },

    /// Wheel zoom about the pointer. `factor` > 1 zooms in.
    Wheel { x: f64, y: f64, factor: f64 },

    /// Camera computed by an external zoom gesture.
    Zoom { k: f64, x: f64, y: f64 },
}

impl InputEvent {
    pub fn pointer_down(x: f64, y: f64, modifiers: Modifiers) -> Self {
        Self::PointerDown {
            x,
            y,
            button: PointerButton::Primary,
            modifiers,
        }
    }

    pub fn pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove {
            x,
            y,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_up(x: f64, y: f64) -> Self {
        Self::PointerUp {
            x,
            y,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    /// Build a `Wheel` event from a DOM `WheelEvent` delta.
    ///
    /// `delta_mode` follows the DOM: 0 = pixels, 1 = lines, 2 = pages.
    /// One notch of a line-mode wheel zooms by roughly 2^0.15.
    pub fn from_wheel_delta(x: f64, y: f64, delta_y: f64, delta_mode: u32) -> Self {
        let unit = match delta_mode {
            0 => 0.002,
            1 => 0.05,
            _ => 1.0,
        };
        Self::Wheel {
            x,
            y,
            factor: 2f64.powf(-delta_y * unit),
        }
    }

    /// Screen position, if this is a pointer or wheel event.
    pub fn position(&self) -> Option<Point> {
        match *self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. }
            | Self::Wheel { x, y, .. } => Some(Point::new(x, y)),
            Self::Zoom { .. } => None,
        }
    }
}
