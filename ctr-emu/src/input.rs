//! Physical input sampled once per frame.
//!
//! The host scans the console's buttons, the touch surface and the soft
//! keyboard widget, and hands the result to the frame scheduler as one
//! [`InputSample`]. Nothing here talks to hardware.

use bitflags::bitflags;

bitflags! {
    /// Physical console buttons, in the hardware's bit order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Buttons: u32 {
        const A = 1 << 0;
        const B = 1 << 1;
        const SELECT = 1 << 2;
        const START = 1 << 3;
        const DRIGHT = 1 << 4;
        const DLEFT = 1 << 5;
        const DUP = 1 << 6;
        const DDOWN = 1 << 7;
        const R = 1 << 8;
        const L = 1 << 9;
        const X = 1 << 10;
        const Y = 1 << 11;
        const ZL = 1 << 14;
        const ZR = 1 << 15;
        const TOUCH = 1 << 20;
        const CPAD_RIGHT = 1 << 28;
        const CPAD_LEFT = 1 << 29;
        const CPAD_UP = 1 << 30;
        const CPAD_DOWN = 1 << 31;

        /// D-pad or circle pad, either direction source.
        const UP = Self::DUP.bits() | Self::CPAD_UP.bits();
        const DOWN = Self::DDOWN.bits() | Self::CPAD_DOWN.bits();
        const LEFT = Self::DLEFT.bits() | Self::CPAD_LEFT.bits();
        const RIGHT = Self::DRIGHT.bits() | Self::CPAD_RIGHT.bits();
    }
}

/// A key reported by the soft keyboard this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A character code; 1..=127 are delivered to the program.
    Char(u8),
    /// The home key, folded into the controller's HOME bit.
    Home,
    /// The system key, which opens the reset prompt instead of reaching the program.
    System,
}

/// Soft keyboard state for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardSample {
    /// Key tapped this frame, if any.
    pub key: Option<Key>,
    /// Ctrl modifier latched.
    pub ctrl: bool,
    /// Alt modifier latched.
    pub alt: bool,
    /// Shift modifier latched.
    pub shift: bool,
}

/// A touch contact in touch-surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
}

impl TouchPoint {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Everything the host sampled in one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSample {
    /// Buttons held down (including ones pressed this frame).
    pub held: Buttons,
    /// Buttons that went down this frame.
    pub pressed: Buttons,
    /// Soft keyboard widget state.
    pub keyboard: KeyboardSample,
    /// Touch contact, if the surface is being touched.
    pub touch: Option<TouchPoint>,
}

impl InputSample {
    /// Sample with `buttons` held (and pressed, if `pressed` is set).
    pub fn buttons(held: Buttons, pressed: Buttons) -> Self {
        Self {
            held: held | pressed,
            pressed,
            ..Self::default()
        }
    }

    /// Sample with only a touch contact.
    pub fn touch(x: u16, y: u16) -> Self {
        Self {
            held: Buttons::TOUCH,
            touch: Some(TouchPoint::new(x, y)),
            ..Self::default()
        }
    }

    /// Sample with only a soft keyboard key.
    pub fn key(key: Key) -> Self {
        Self {
            keyboard: KeyboardSample {
                key: Some(key),
                ..KeyboardSample::default()
            },
            ..Self::default()
        }
    }

    /// Buttons held or pressed this frame.
    #[inline]
    pub fn all_held(&self) -> Buttons {
        self.held | self.pressed
    }

    /// No physical button is down.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.all_held().is_empty()
    }
}
