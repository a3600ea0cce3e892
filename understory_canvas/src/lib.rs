// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_canvas --heading-base-level=0

//! Understory Canvas: a headless pan/zoom engine for infinite canvases.
//!
//! This crate owns the state of an infinite canvas (a translation plus a
//! uniform scale) and everything that changes it:
//! - Drag panning, wheel pan, zoom-to-cursor, pinch and keyboard panning.
//! - Animated "scroll node into view", "fit content" and "center horizontally"
//!   operations, deferred to an idle point with a maximum latency.
//! - A single transform store that notifies every observer synchronously.
//! - Engine-specific render strategy selection (SVG group vs. styled layer).
//!
//! It does **not** own a DOM, a clock or an event loop. Hosts:
//! - Measure layout through a [`LayoutProbe`].
//! - Translate native events into [`PointerInput`], [`WheelInput`] and
//!   [`KeyInput`], and act on the returned [`InputResponse`] flags.
//! - Call [`Canvas::on_idle`] and [`Canvas::on_frame`] with their own
//!   timestamps.
//! - Paint the transform, for example with a [`ViewportRenderer`].
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Rect, Vec2};
//! use understory_canvas::{
//!     Canvas, CanvasConfig, FitOptions, LayoutProbe, NoTarget, PointerInput, RenderEngine,
//! };
//!
//! struct Fixed;
//!
//! impl LayoutProbe for Fixed {
//!     type Node = ();
//!     fn viewport_bounds(&self) -> Option<Rect> {
//!         Some(Rect::new(0.0, 0.0, 800.0, 600.0))
//!     }
//!     fn content_bounds(&self) -> Option<Rect> {
//!         Some(Rect::new(0.0, 0.0, 1600.0, 1200.0))
//!     }
//!     fn node_bounds(&self, _: &()) -> Option<Rect> {
//!         None
//!     }
//! }
//!
//! let mut canvas = Canvas::new(CanvasConfig::default(), Fixed, RenderEngine::Blink).unwrap();
//! assert!(canvas.mount());
//!
//! // Drag the view by (20, 10).
//! canvas.pointer_down(&PointerInput::primary(Point::new(100.0, 100.0)), None::<&NoTarget>);
//! canvas.pointer_move(&PointerInput::primary(Point::new(120.0, 110.0)));
//! canvas.pointer_up();
//! assert_eq!(canvas.transform().translate, Vec2::new(20.0, 10.0));
//!
//! // Fit the content; it animates over the default 300 ms.
//! canvas.handle().fit_content_to_view(FitOptions::default());
//! canvas.on_idle(0.0);
//! let mut now = 0.0;
//! while canvas.on_frame(now) {
//!     now += 16.0;
//! }
//! assert_eq!(canvas.transform().scale, 0.5);
//! ```
//!
//! ## Observing the transform
//!
//! ```rust
//! # use kurbo::Rect;
//! # use understory_canvas::{Canvas, CanvasConfig, LayoutProbe, RenderEngine};
//! # struct Fixed;
//! # impl LayoutProbe for Fixed {
//! #     type Node = ();
//! #     fn viewport_bounds(&self) -> Option<Rect> { Some(Rect::new(0.0, 0.0, 800.0, 600.0)) }
//! #     fn content_bounds(&self) -> Option<Rect> { None }
//! #     fn node_bounds(&self, _: &()) -> Option<Rect> { None }
//! # }
//! use understory_canvas::{RenderStrategy, ViewportRenderer, ContentLayer};
//!
//! #[derive(Default)]
//! struct Group(String);
//!
//! impl ContentLayer for Group {
//!     fn set_transform_attribute(&mut self, value: &str) {
//!         self.0 = value.to_string();
//!     }
//!     fn set_style_transform(&mut self, value: &str) {
//!         self.0 = value.to_string();
//!     }
//! }
//!
//! let mut canvas = Canvas::new(CanvasConfig::default(), Fixed, RenderEngine::Gecko).unwrap();
//! assert_eq!(canvas.render_strategy(), RenderStrategy::SvgGroup);
//! canvas.on_zoom(|t| println!("scale is now {}", t.scale));
//! canvas.pinch(kurbo::Point::ORIGIN, 2.0);
//!
//! let mut renderer = ViewportRenderer::new(canvas.render_strategy(), Group::default());
//! renderer.paint(canvas.transform());
//! assert_eq!(renderer.layer().0, "translate(0, 0) scale(2)");
//! ```
//!
//! ## Design notes
//!
//! - A content point `p` is drawn at `p * scale + translate`, relative to the
//!   viewport origin.
//! - [`Canvas`] is the only writer of the [`TransformStore`]; every write is
//!   clamped into the zoom limits.
//! - Viewport bounds are captured once at mount. Node and content bounds are
//!   measured live when a request runs. A resized viewport is only picked up
//!   on the next mount.
//! - Any user gesture interrupts a running transition.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod canvas;
mod collaborators;
mod config;
mod filter;
mod geometry;
mod gesture;
mod handle;
mod input;
mod render;
mod schedule;
mod store;
mod transform;
mod transition;

pub use canvas::{Canvas, LayoutProbe};
pub use collaborators::{BackgroundProps, OverlaySnapshot, Scrollbar, ScrollbarProps};
pub use config::{
    CanvasConfig, ConfigError, DEFAULT_ARROW_KEY_PAN_STEP, DEFAULT_MAX_AUTO_SCALE,
    DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, DEFAULT_TRANSITION_MS, DEFAULT_ZOOM_SCALE, IdleTimeouts,
};
pub use filter::{
    BlockMarkers, DEFAULT_NO_PAN_MARKER, DEFAULT_NO_WHEEL_MARKER, InputTarget, NoTarget,
    should_block_pan, should_block_wheel,
};
pub use geometry::{
    Anchor, AxisAlign, FitParams, anchored_transform, clamp, content_rect, fit_transform,
    horizontal_center_transform,
};
pub use gesture::{Dragging, GestureEngine, GestureOptions, GestureOutcome};
pub use handle::{
    CanvasHandle, FitOptions, HorizontalCenterOptions, ScrollNodeOptions, ViewportState,
    ZoomHandle,
};
pub use input::{
    InputResponse, Key, KeyInput, Modifiers, PointerButton, PointerInput, WHEEL_LINE_PIXELS,
    WHEEL_PAGE_PIXELS, WheelDeltaMode, WheelInput,
};
pub use render::{ContentLayer, RenderEngine, RenderStrategy, ViewportRenderer};
pub use schedule::IdleQueue;
pub use store::{ChangeSource, ListenerId, TransformChange, TransformStore};
pub use transform::{CanvasTransform, ZoomLimits};
pub use transition::{Transition, TransitionSample, ease_cubic_in_out};
