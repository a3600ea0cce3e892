// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_canvas_web --heading-base-level=0

//! Browser host for [`understory_canvas`].
//!
//! When targeting `wasm32`, [`WebCanvas`] binds a canvas to two DOM elements:
//! a viewport that receives input and a content element that receives the
//! transform. It provides:
//! - Pointer, wheel (non-passive) and optional keyboard listeners, bound on
//!   mount and removed on drop.
//! - A layout probe based on `getBoundingClientRect`.
//! - `requestIdleCallback` scheduling with the engine's timeout (falling back
//!   to `setTimeout` where it is missing) and a `requestAnimationFrame` loop
//!   that runs only while a transition is active.
//! - The `panning` class on the viewport during a drag, and a synthesized
//!   `mousedown` on the document body for every primary press so that
//!   outside-click handlers keep working.
//!
//! ## Markup
//!
//! The caller's content element is moved into a layer that the canvas builds
//! inside the viewport, chosen by [`LayerMarkup::select`] from the engine's
//! render strategy:
//! - WebKit: an absolutely positioned `<div>` at the viewport origin, moved
//!   through `style.transform`. SVG content gets an `<svg>` wrapper inside it.
//! - Other engines: an `<svg>` covering the viewport with a `<g>` moved through
//!   its `transform` attribute. HTML content is hosted in a `<foreignObject>`.
//!
//! The viewport should be a positioned element (`position: relative` or
//! similar), usually with `overflow: hidden`. Use [`detect_engine`] to learn
//! the strategy before mounting. Dropping the canvas moves the content back
//! where it was and removes the layer.
//!
//! ```no_run
//! #[cfg(target_arch = "wasm32")]
//! fn mount(
//!     viewport: web_sys::Element,
//!     content: web_sys::Element,
//! ) -> Result<understory_canvas_web::WebCanvas, understory_canvas_web::WebCanvasError> {
//!     let canvas = understory_canvas_web::WebCanvas::mount(
//!         viewport,
//!         content,
//!         understory_canvas::CanvasConfig::default().with_arrow_key_pan(10.0),
//!     )?;
//!     canvas.handle().fit_content_to_view(Default::default());
//!     Ok(canvas)
//! }
//! ```
//!
//! [`WebCanvas::mount_with`] also takes a callback that receives a
//! [`understory_canvas::CanvasHandle`] once the canvas is mounted.
//!
//! Callbacks registered through [`WebCanvas::on_zoom`] run while the canvas is
//! busy; they may use a [`understory_canvas::CanvasHandle`] but must not call
//! back into the [`WebCanvas`].

#![no_std]

extern crate alloc;

use kurbo::Rect;
use understory_canvas::{Modifiers, RenderStrategy};

#[cfg(target_arch = "wasm32")]
mod dom;

#[cfg(target_arch = "wasm32")]
pub use dom::{DomLayer, DomProbe, DomTarget, WebCanvas, WebCanvasError, detect_engine};

/// Class set on the viewport element while a drag is in progress.
pub const PANNING_CLASS: &str = "panning";

/// Namespace of SVG elements.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Inline style of the positioned `<div>` layer.
pub const POSITIONED_LAYER_STYLE: &str =
    "position: absolute; left: 0; top: 0; transform-origin: 0 0;";

/// Inline style of the `<svg>` elements the canvas creates.
pub const SVG_LAYER_STYLE: &str =
    "position: absolute; left: 0; top: 0; width: 100%; height: 100%; overflow: visible;";

/// Elements built inside the viewport to carry the content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerMarkup {
    /// `<div>` holding HTML content.
    PositionedDiv,
    /// `<div><svg>` holding SVG content.
    PositionedSvg,
    /// `<svg><g>` holding SVG content.
    SvgGroup,
    /// `<svg><g><foreignObject>` holding HTML content.
    SvgForeignObject,
}

impl LayerMarkup {
    /// Picks the markup for `strategy` and the kind of content.
    #[must_use]
    pub fn select(strategy: RenderStrategy, content_is_svg: bool) -> Self {
        match (strategy, content_is_svg) {
            (RenderStrategy::StyledLayer, false) => Self::PositionedDiv,
            (RenderStrategy::StyledLayer, true) => Self::PositionedSvg,
            (RenderStrategy::SvgGroup, true) => Self::SvgGroup,
            (RenderStrategy::SvgGroup, false) => Self::SvgForeignObject,
        }
    }

    /// Strategy that paints the element carrying the transform.
    #[must_use]
    pub fn strategy(self) -> RenderStrategy {
        match self {
            Self::PositionedDiv | Self::PositionedSvg => RenderStrategy::StyledLayer,
            Self::SvgGroup | Self::SvgForeignObject => RenderStrategy::SvgGroup,
        }
    }
}

/// Union of the measured boxes of a content root and its children.
///
/// Boxes without area are skipped, so empty wrappers and collapsed positioned
/// layers do not stretch the extent. Returns `None` when nothing has area.
#[must_use]
pub fn content_extent(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects
        .into_iter()
        .filter(|r| r.is_finite() && r.area() > 0.0)
        .reduce(|a, b| a.union(b))
}

/// Collects DOM modifier key flags.
#[must_use]
pub fn modifiers(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    let mut mods = Modifiers::empty();
    mods.set(Modifiers::SHIFT, shift);
    mods.set(Modifiers::CTRL, ctrl);
    mods.set(Modifiers::ALT, alt);
    mods.set(Modifiers::META, meta);
    mods
}

/// Returns `true` for tags whose key presses belong to the element.
#[must_use]
pub fn is_text_entry_tag(tag_name: &str) -> bool {
    ["INPUT", "TEXTAREA", "SELECT"]
        .iter()
        .any(|tag| tag.eq_ignore_ascii_case(tag_name))
}
