// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-agnostic input events consumed by [`crate::Canvas`].
//!
//! Hosts translate their native pointer, wheel and keyboard events into these
//! small value types. Positions are in the same coordinate space as the
//! viewport bounds reported by [`crate::LayoutProbe`].

use kurbo::{Point, Vec2};

bitflags::bitflags! {
    /// Keyboard modifiers held during an input event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Modifiers: u8 {
        /// Shift.
        const SHIFT = 1 << 0;
        /// Control.
        const CTRL = 1 << 1;
        /// Alt / Option.
        const ALT = 1 << 2;
        /// Meta / Command / Windows.
        const META = 1 << 3;
    }
}

bitflags::bitflags! {
    /// What the host should do after the canvas handled an event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct InputResponse: u8 {
        /// The canvas consumed the event; the host should prevent the native
        /// default action.
        const HANDLED = 1 << 0;
        /// Dispatch a synthesized mousedown on the document body so that
        /// click-outside handlers elsewhere still observe the press.
        const FORWARD_MOUSEDOWN = 1 << 1;
        /// Dragging became active; show the panning indicator.
        const PANNING_STARTED = 1 << 2;
        /// Dragging ended; hide the panning indicator.
        const PANNING_ENDED = 1 << 3;
        /// The transform changed while handling the event.
        const TRANSFORM_CHANGED = 1 << 4;
    }
}

impl InputResponse {
    /// Returns `true` if the host should prevent the native default action.
    #[must_use]
    pub fn is_handled(self) -> bool {
        self.contains(Self::HANDLED)
    }
}

/// Pointer button that triggered a press or release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    /// Main button (usually left).
    Primary,
    /// Auxiliary button (usually middle / wheel).
    Auxiliary,
    /// Secondary button (usually right).
    Secondary,
    /// Any other button, by DOM-style index.
    Other(u16),
}

impl PointerButton {
    /// Maps a DOM `MouseEvent.button` index to a button.
    #[must_use]
    pub fn from_index(index: i16) -> Self {
        match index {
            0 => Self::Primary,
            1 => Self::Auxiliary,
            2 => Self::Secondary,
            other => Self::Other(other.unsigned_abs()),
        }
    }
}

/// A pointer press, move, or release.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInput {
    /// Pointer position.
    pub position: Point,
    /// Button associated with the event (ignored for moves).
    pub button: PointerButton,
    /// Modifiers held.
    pub modifiers: Modifiers,
}

impl PointerInput {
    /// A primary-button event at `position` with no modifiers.
    #[must_use]
    pub fn primary(position: Point) -> Self {
        Self {
            position,
            button: PointerButton::Primary,
            modifiers: Modifiers::empty(),
        }
    }
}

/// Unit of a wheel delta.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WheelDeltaMode {
    /// Pixels.
    #[default]
    Pixel,
    /// Lines.
    Line,
    /// Pages.
    Page,
}

/// Pixels per wheel line.
pub const WHEEL_LINE_PIXELS: f64 = 25.0;

/// Pixels per wheel page.
pub const WHEEL_PAGE_PIXELS: f64 = 500.0;

impl WheelDeltaMode {
    /// Maps a DOM `WheelEvent.deltaMode` value.
    #[must_use]
    pub fn from_dom(mode: u32) -> Self {
        match mode {
            1 => Self::Line,
            2 => Self::Page,
            _ => Self::Pixel,
        }
    }

    fn pixels_per_unit(self) -> f64 {
        match self {
            Self::Pixel => 1.0,
            Self::Line => WHEEL_LINE_PIXELS,
            Self::Page => WHEEL_PAGE_PIXELS,
        }
    }
}

/// A wheel (or trackpad scroll) event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelInput {
    /// Pointer position.
    pub position: Point,
    /// Raw delta in `mode` units. Positive `y` scrolls down.
    pub delta: Vec2,
    /// Unit of `delta`.
    pub mode: WheelDeltaMode,
    /// Modifiers held.
    pub modifiers: Modifiers,
}

impl WheelInput {
    /// A pixel-mode wheel event with no modifiers.
    #[must_use]
    pub fn pixels(position: Point, delta: Vec2) -> Self {
        Self {
            position,
            delta,
            mode: WheelDeltaMode::Pixel,
            modifiers: Modifiers::empty(),
        }
    }

    /// Returns this event with `modifiers` held.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Delta converted to pixels.
    #[must_use]
    pub fn pixel_delta(&self) -> Vec2 {
        self.delta * self.mode.pixels_per_unit()
    }
}

/// Keys the canvas reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// Arrow up.
    ArrowUp,
    /// Arrow down.
    ArrowDown,
    /// Arrow left.
    ArrowLeft,
    /// Arrow right.
    ArrowRight,
    /// A printable character.
    Character(char),
    /// Anything else.
    Other,
}

impl Key {
    /// Maps a DOM `KeyboardEvent.key` string.
    #[must_use]
    pub fn from_dom(key: &str) -> Self {
        match key {
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Character(c),
                    _ => Self::Other,
                }
            }
        }
    }

    /// Pan direction for arrow and `h/j/k/l` keys, as a unit vector in view
    /// space describing which way the content moves.
    #[must_use]
    pub fn pan_direction(self) -> Option<Vec2> {
        match self {
            Self::ArrowUp | Self::Character('k') => Some(Vec2::new(0.0, 1.0)),
            Self::ArrowDown | Self::Character('j') => Some(Vec2::new(0.0, -1.0)),
            Self::ArrowLeft | Self::Character('h') => Some(Vec2::new(1.0, 0.0)),
            Self::ArrowRight | Self::Character('l') => Some(Vec2::new(-1.0, 0.0)),
            _ => None,
        }
    }
}

/// A key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyInput {
    /// Key pressed.
    pub key: Key,
    /// Modifiers held.
    pub modifiers: Modifiers,
}

impl KeyInput {
    /// A key press without modifiers.
    #[must_use]
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::empty(),
        }
    }
}
