// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture and wheel interpretation.
//!
//! [`GestureEngine`] turns pointer, wheel, pinch and key events into proposed
//! transforms. It never writes the transform itself; [`crate::Canvas`] takes
//! the proposal and writes it through the store.
//!
//! ## Drag state machine
//!
//! ```text
//!          primary press (not blocked)
//!   Idle ------------------------------> Active
//!    ^                                     |
//!    +------ release / cancel / reset -----+
//! ```
//!
//! While `Active`, each pointer move pans by the movement delta.
//!
//! ## Wheel
//!
//! A wheel event either zooms or pans, never both:
//! - with a zoom modifier held, the scale is multiplied by
//!   `2^(-delta_y * zoom_scale)` about the pointer;
//! - otherwise, with `pan_on_scroll`, both axes pan by the delta, converted to
//!   content units with the current scale so the on-screen speed does not
//!   depend on zoom;
//! - otherwise the wheel zooms as if the modifier were held.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Vec2};

use crate::config::CanvasConfig;
use crate::filter::{BlockMarkers, InputTarget, should_block_pan, should_block_wheel};
use crate::input::{InputResponse, KeyInput, Modifiers, PointerButton, PointerInput, WheelInput};
use crate::store::ChangeSource;
use crate::transform::{CanvasTransform, ZoomLimits};

/// Whether a pointer drag is in progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Dragging {
    /// No button held on the canvas.
    #[default]
    Idle,
    /// Primary button held; moves pan the view.
    Active,
}

/// Tracks the last pointer position of a drag.
#[derive(Clone, Copy, Debug, Default)]
struct DragState {
    start_pos: Option<Point>,
    last_pos: Option<Point>,
}

impl DragState {
    fn start(&mut self, pos: Point) {
        self.start_pos = Some(pos);
        self.last_pos = Some(pos);
    }

    /// Movement since the previous update, or `None` when not dragging.
    fn update(&mut self, pos: Point) -> Option<Vec2> {
        self.start_pos?;
        let last = self.last_pos.replace(pos)?;
        Some(pos - last)
    }

    fn end(&mut self) {
        self.start_pos = None;
        self.last_pos = None;
    }

    fn is_dragging(&self) -> bool {
        self.start_pos.is_some()
    }
}

/// Input options copied from [`CanvasConfig`].
#[derive(Clone, Debug, PartialEq)]
pub struct GestureOptions {
    /// Plain wheel pans.
    pub pan_on_scroll: bool,
    /// Flip the wheel pan direction.
    pub invert_scroll: bool,
    /// Wheel zoom sensitivity.
    pub zoom_scale: f64,
    /// Modifiers that turn a wheel event into a zoom.
    pub zoom_modifiers: Modifiers,
    /// Keyboard panning enabled.
    pub enable_arrow_key_pan: bool,
    /// Keyboard pan step in view pixels.
    pub arrow_key_pan_step: f64,
    /// Opt-out markers.
    pub block_markers: BlockMarkers,
}

impl From<&CanvasConfig> for GestureOptions {
    fn from(config: &CanvasConfig) -> Self {
        Self {
            pan_on_scroll: config.pan_on_scroll,
            invert_scroll: config.invert_scroll,
            zoom_scale: config.zoom_scale,
            zoom_modifiers: config.zoom_modifiers,
            enable_arrow_key_pan: config.enable_arrow_key_pan,
            arrow_key_pan_step: config.arrow_key_pan_step,
            block_markers: config.block_markers.clone(),
        }
    }
}

/// Result of feeding one event to the [`GestureEngine`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureOutcome {
    /// Proposed transform, if the event moves the view.
    pub transform: Option<CanvasTransform>,
    /// Writer path to attribute the change to.
    pub source: ChangeSource,
    /// Host-facing flags.
    pub response: InputResponse,
    /// Wheel pan delta to mirror onto the scrollbar.
    pub scroll_delta: Option<Vec2>,
}

impl GestureOutcome {
    fn ignored(source: ChangeSource) -> Self {
        Self {
            transform: None,
            source,
            response: InputResponse::empty(),
            scroll_delta: None,
        }
    }

    fn handled(source: ChangeSource, transform: Option<CanvasTransform>) -> Self {
        Self {
            transform,
            source,
            response: InputResponse::HANDLED,
            scroll_delta: None,
        }
    }
}

/// Converts pointer, wheel, pinch and key input into proposed transforms.
#[derive(Clone, Debug)]
pub struct GestureEngine {
    options: GestureOptions,
    drag: DragState,
}

impl GestureEngine {
    /// Creates an idle engine.
    #[must_use]
    pub fn new(options: GestureOptions) -> Self {
        Self {
            options,
            drag: DragState::default(),
        }
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &GestureOptions {
        &self.options
    }

    /// Replaces the options; an active drag is kept.
    pub fn set_options(&mut self, options: GestureOptions) {
        self.options = options;
    }

    /// Drag state.
    #[must_use]
    pub fn dragging(&self) -> Dragging {
        if self.drag.is_dragging() {
            Dragging::Active
        } else {
            Dragging::Idle
        }
    }

    /// Handles a press.
    ///
    /// Only an unmodified primary press that no ancestor opts out of starts a
    /// drag. Secondary and auxiliary presses fall through untouched so native
    /// context menus keep working; ctrl+primary counts as a context click.
    pub fn pointer_down<T: InputTarget>(
        &mut self,
        event: &PointerInput,
        target: Option<&T>,
    ) -> GestureOutcome {
        if event.button != PointerButton::Primary || event.modifiers.contains(Modifiers::CTRL) {
            return GestureOutcome::ignored(ChangeSource::Drag);
        }
        if target.is_some_and(|t| should_block_pan(t, &self.options.block_markers)) {
            return GestureOutcome::ignored(ChangeSource::Drag);
        }
        let mut outcome = GestureOutcome::handled(ChangeSource::Drag, None);
        if !self.drag.is_dragging() {
            outcome.response |= InputResponse::FORWARD_MOUSEDOWN | InputResponse::PANNING_STARTED;
        }
        self.drag.start(event.position);
        outcome
    }

    /// Handles a pointer move; pans while a drag is active.
    pub fn pointer_move(&mut self, event: &PointerInput, current: CanvasTransform) -> GestureOutcome {
        match self.drag.update(event.position) {
            Some(delta) => GestureOutcome::handled(
                ChangeSource::Drag,
                (delta != Vec2::ZERO).then(|| current.translate_by_view(delta)),
            ),
            None => GestureOutcome::ignored(ChangeSource::Drag),
        }
    }

    /// Handles a release or cancel; ends an active drag.
    pub fn pointer_up(&mut self) -> GestureOutcome {
        if !self.drag.is_dragging() {
            return GestureOutcome::ignored(ChangeSource::Drag);
        }
        self.drag.end();
        let mut outcome = GestureOutcome::handled(ChangeSource::Drag, None);
        outcome.response |= InputResponse::PANNING_ENDED;
        outcome
    }

    /// Ends any drag without producing a response (unmount, focus loss).
    pub fn reset(&mut self) {
        self.drag.end();
    }

    /// Handles a wheel event.
    ///
    /// `origin` is the viewport origin in the event's coordinate space.
    pub fn wheel<T: InputTarget>(
        &mut self,
        event: &WheelInput,
        target: Option<&T>,
        current: CanvasTransform,
        limits: ZoomLimits,
        origin: Point,
    ) -> GestureOutcome {
        if target.is_some_and(|t| should_block_wheel(t, &self.options.block_markers)) {
            return GestureOutcome::ignored(ChangeSource::Wheel);
        }
        let delta = event.pixel_delta();
        let zoom_intent = event.modifiers.intersects(self.options.zoom_modifiers);
        if zoom_intent || !self.options.pan_on_scroll {
            let factor = 2.0_f64.powf(-delta.y * self.options.zoom_scale);
            let scale = limits.clamp(current.scale * factor);
            let anchor = (event.position - origin).to_point();
            let next = current.scale_about(anchor, scale);
            return GestureOutcome::handled(ChangeSource::Wheel, (next != current).then_some(next));
        }

        let scroll = if self.options.invert_scroll {
            -delta
        } else {
            delta
        };
        if scroll == Vec2::ZERO || current.scale <= 0.0 {
            return GestureOutcome::handled(ChangeSource::Wheel, None);
        }
        let next = current.translate_by_content(-scroll / current.scale);
        let mut outcome = GestureOutcome::handled(ChangeSource::Wheel, Some(next));
        outcome.scroll_delta = Some(scroll);
        outcome
    }

    /// Handles one step of a pinch gesture: scale by `factor` about `center`.
    pub fn pinch(
        &mut self,
        center: Point,
        factor: f64,
        current: CanvasTransform,
        limits: ZoomLimits,
        origin: Point,
    ) -> GestureOutcome {
        if !(factor.is_finite() && factor > 0.0) {
            return GestureOutcome::ignored(ChangeSource::Pinch);
        }
        let scale = limits.clamp(current.scale * factor);
        let next = current.scale_about((center - origin).to_point(), scale);
        GestureOutcome::handled(ChangeSource::Pinch, (next != current).then_some(next))
    }

    /// Handles a key press; pans by the configured step for arrow/`hjkl` keys.
    pub fn key_down(&mut self, event: &KeyInput, current: CanvasTransform) -> GestureOutcome {
        if !self.options.enable_arrow_key_pan
            || event
                .modifiers
                .intersects(Modifiers::CTRL | Modifiers::META | Modifiers::ALT)
        {
            return GestureOutcome::ignored(ChangeSource::Keyboard);
        }
        match event.key.pan_direction() {
            Some(dir) => GestureOutcome::handled(
                ChangeSource::Keyboard,
                Some(current.translate_by_view(dir * self.options.arrow_key_pan_step)),
            ),
            None => GestureOutcome::ignored(ChangeSource::Keyboard),
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Vec2};

    use super::{Dragging, GestureEngine, GestureOptions};
    use crate::config::CanvasConfig;
    use crate::filter::NoTarget;
    use crate::input::{
        InputResponse, Key, KeyInput, Modifiers, PointerButton, PointerInput, WheelInput,
    };
    use crate::transform::{CanvasTransform, ZoomLimits};

    fn engine(config: &CanvasConfig) -> GestureEngine {
        GestureEngine::new(GestureOptions::from(config))
    }

    const NONE: Option<&NoTarget> = None;

    #[test]
    fn primary_press_drag_release() {
        let mut g = engine(&CanvasConfig::default());
        let down = g.pointer_down(&PointerInput::primary(Point::new(10.0, 10.0)), NONE);
        assert!(down.response.contains(
            InputResponse::HANDLED | InputResponse::FORWARD_MOUSEDOWN | InputResponse::PANNING_STARTED
        ));
        assert_eq!(g.dragging(), Dragging::Active);

        let moved = g.pointer_move(
            &PointerInput::primary(Point::new(25.0, 4.0)),
            CanvasTransform::IDENTITY,
        );
        assert_eq!(
            moved.transform.unwrap().translate,
            Vec2::new(15.0, -6.0)
        );

        let up = g.pointer_up();
        assert!(up.response.contains(InputResponse::PANNING_ENDED));
        assert_eq!(g.dragging(), Dragging::Idle);
    }

    #[test]
    fn second_press_does_not_forward_again() {
        let mut g = engine(&CanvasConfig::default());
        g.pointer_down(&PointerInput::primary(Point::ORIGIN), NONE);
        let again = g.pointer_down(&PointerInput::primary(Point::ORIGIN), NONE);
        assert!(again.response.is_handled());
        assert!(!again.response.contains(InputResponse::FORWARD_MOUSEDOWN));
    }

    #[test]
    fn secondary_and_ctrl_primary_fall_through() {
        let mut g = engine(&CanvasConfig::default());
        let mut right = PointerInput::primary(Point::ORIGIN);
        right.button = PointerButton::Secondary;
        assert_eq!(g.pointer_down(&right, NONE).response, InputResponse::empty());

        let mut ctrl = PointerInput::primary(Point::ORIGIN);
        ctrl.modifiers = Modifiers::CTRL;
        assert_eq!(g.pointer_down(&ctrl, NONE).response, InputResponse::empty());
        assert_eq!(g.dragging(), Dragging::Idle);
    }

    #[test]
    fn move_without_press_is_ignored() {
        let mut g = engine(&CanvasConfig::default());
        let out = g.pointer_move(
            &PointerInput::primary(Point::new(3.0, 3.0)),
            CanvasTransform::IDENTITY,
        );
        assert!(out.transform.is_none());
        assert!(!out.response.is_handled());
        assert!(!g.pointer_up().response.is_handled());
    }

    #[test]
    fn modifier_wheel_zooms_about_cursor() {
        let mut g = engine(&CanvasConfig::default());
        let current = CanvasTransform::new(Vec2::new(20.0, 30.0), 1.0);
        let cursor = Point::new(200.0, 150.0);
        let wheel = WheelInput::pixels(cursor, Vec2::new(0.0, -500.0)).with_modifiers(Modifiers::CTRL);
        let out = g.wheel(&wheel, NONE, current, ZoomLimits::default(), Point::ORIGIN);
        let next = out.transform.unwrap();
        // 2^(500 * 0.002) = 2.
        assert!((next.scale - 2.0).abs() < 1e-12);
        let before = current.view_to_content(cursor);
        let after = next.view_to_content(cursor);
        assert!((before - after).hypot() < 1e-9);
        assert!(out.scroll_delta.is_none());
    }

    #[test]
    fn plain_wheel_pans_by_screen_delta() {
        let mut g = engine(&CanvasConfig::default());
        for scale in [0.5, 1.0, 2.0] {
            let current = CanvasTransform::new(Vec2::ZERO, scale);
            let wheel = WheelInput::pixels(Point::ORIGIN, Vec2::new(12.0, 40.0));
            let out = g.wheel(&wheel, NONE, current, ZoomLimits::default(), Point::ORIGIN);
            let next = out.transform.unwrap();
            assert!((next.translate - Vec2::new(-12.0, -40.0)).hypot() < 1e-9);
            assert_eq!(next.scale, scale);
            assert_eq!(out.scroll_delta, Some(Vec2::new(12.0, 40.0)));
        }
    }

    #[test]
    fn invert_scroll_flips_pan() {
        let mut g = engine(&CanvasConfig::default().with_invert_scroll(true));
        let wheel = WheelInput::pixels(Point::ORIGIN, Vec2::new(0.0, 40.0));
        let out = g.wheel(
            &wheel,
            NONE,
            CanvasTransform::IDENTITY,
            ZoomLimits::default(),
            Point::ORIGIN,
        );
        assert_eq!(out.transform.unwrap().translate, Vec2::new(0.0, 40.0));
    }

    #[test]
    fn wheel_without_pan_on_scroll_zooms() {
        let mut g = engine(&CanvasConfig::default().with_pan_on_scroll(false));
        let wheel = WheelInput::pixels(Point::ORIGIN, Vec2::new(0.0, 500.0));
        let out = g.wheel(
            &wheel,
            NONE,
            CanvasTransform::IDENTITY,
            ZoomLimits::default(),
            Point::ORIGIN,
        );
        assert!((out.transform.unwrap().scale - 0.5).abs() < 1e-12);
    }

    #[test]
    fn pinch_clamps_scale() {
        let mut g = engine(&CanvasConfig::default());
        let out = g.pinch(
            Point::new(50.0, 50.0),
            100.0,
            CanvasTransform::IDENTITY,
            ZoomLimits::new(0.1, 4.0),
            Point::ORIGIN,
        );
        assert_eq!(out.transform.unwrap().scale, 4.0);
        let bad = g.pinch(
            Point::ORIGIN,
            0.0,
            CanvasTransform::IDENTITY,
            ZoomLimits::default(),
            Point::ORIGIN,
        );
        assert!(bad.transform.is_none());
    }

    #[test]
    fn keys_pan_only_when_enabled() {
        let mut off = engine(&CanvasConfig::default());
        assert!(off
            .key_down(&KeyInput::plain(Key::ArrowLeft), CanvasTransform::IDENTITY)
            .transform
            .is_none());

        let mut on = engine(&CanvasConfig::default().with_arrow_key_pan(10.0));
        let out = on.key_down(&KeyInput::plain(Key::Character('j')), CanvasTransform::IDENTITY);
        assert_eq!(out.transform.unwrap().translate, Vec2::new(0.0, -10.0));

        let shortcut = KeyInput {
            key: Key::ArrowLeft,
            modifiers: Modifiers::META,
        };
        assert!(on
            .key_down(&shortcut, CanvasTransform::IDENTITY)
            .transform
            .is_none());
    }
}
