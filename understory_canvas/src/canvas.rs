// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The canvas: glue between input, the transform store and transitions.
//!
//! [`Canvas`] owns the [`TransformStore`] and is its only writer. The host
//! feeds it input events, idle periods and animation frames; everything else
//! (renderer, background grid, scrollbar, overlays) observes the store.
//!
//! ## Timing
//!
//! All time values are host milliseconds supplied by the caller, so the canvas
//! itself never reads a clock. Requests from a [`CanvasHandle`] are stamped
//! when the canvas first sees them (on [`Canvas::on_idle`] or
//! [`Canvas::on_frame`]) and run either at the next idle period or once their
//! idle timeout has passed, whichever comes first. Writes through a
//! [`crate::ZoomHandle`] have no idle timeout and run on the first frame that
//! sees them.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use kurbo::{Point, Rect, Vec2};

use crate::collaborators::{BackgroundProps, OverlaySnapshot, Scrollbar, ScrollbarProps};
use crate::config::{CanvasConfig, ConfigError};
use crate::filter::InputTarget;
use crate::geometry::{FitParams, anchored_transform, fit_transform, horizontal_center_transform};
use crate::gesture::{Dragging, GestureEngine, GestureOptions, GestureOutcome};
use crate::handle::{
    CanvasHandle, FitOptions, HorizontalCenterOptions, Request, ScrollNodeOptions, Shared,
    ViewportState,
};
use crate::input::{InputResponse, KeyInput, PointerInput, WheelInput};
use crate::render::{RenderEngine, RenderStrategy};
use crate::schedule::IdleQueue;
use crate::store::{ChangeSource, ListenerId, TransformChange, TransformStore};
use crate::transform::CanvasTransform;
use crate::transition::Transition;

/// Measures the live layout the canvas is embedded in.
///
/// All rectangles are in one host coordinate space (for example client
/// coordinates from `getBoundingClientRect`), measured with the current
/// transform applied.
pub trait LayoutProbe {
    /// Handle to a node inside the canvas content.
    ///
    /// Handles outlive any single call: they are queued until the host is idle.
    type Node: 'static;

    /// Bounds of the viewport element.
    fn viewport_bounds(&self) -> Option<Rect>;

    /// Bounds of the whole content.
    fn content_bounds(&self) -> Option<Rect>;

    /// Bounds of a single node, or `None` if it is not laid out.
    fn node_bounds(&self, node: &Self::Node) -> Option<Rect>;
}

type MountCallback<N> = Box<dyn FnOnce(CanvasHandle<N>)>;

/// An infinite pan/zoom canvas.
pub struct Canvas<P: LayoutProbe> {
    config: CanvasConfig,
    engine: RenderEngine,
    probe: P,
    store: TransformStore,
    gestures: GestureEngine,
    viewport: Option<Rect>,
    transition: Option<Transition>,
    queue: IdleQueue<Request<P::Node>>,
    shared: Rc<RefCell<Shared<P::Node>>>,
    scrollbar: Option<Box<dyn Scrollbar>>,
    on_mount: Option<MountCallback<P::Node>>,
}

impl<P: LayoutProbe> fmt::Debug for Canvas<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("config", &self.config)
            .field("engine", &self.engine)
            .field("store", &self.store)
            .field("gestures", &self.gestures)
            .field("viewport", &self.viewport)
            .field("transition", &self.transition)
            .field("queued", &self.queue.len())
            .field("scrollbar", &self.scrollbar.is_some())
            .finish_non_exhaustive()
    }
}

impl<P: LayoutProbe> Canvas<P> {
    /// Creates an unmounted canvas.
    ///
    /// `engine` selects the render strategy and the idle timeout; it cannot
    /// change afterwards.
    pub fn new(config: CanvasConfig, probe: P, engine: RenderEngine) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut store = TransformStore::new(config.initial_transform, config.zoom_limits());
        let shared = Rc::new(RefCell::new(Shared::new(store.get())));
        {
            let shared = shared.clone();
            store.subscribe(move |change: &TransformChange| {
                shared.borrow_mut().transform = change.current;
            });
        }
        Ok(Self {
            gestures: GestureEngine::new(GestureOptions::from(&config)),
            config,
            engine,
            probe,
            store,
            viewport: None,
            transition: None,
            queue: IdleQueue::new(),
            shared,
            scrollbar: None,
            on_mount: None,
        })
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Replaces the configuration.
    ///
    /// New zoom limits re-clamp the current transform immediately. The
    /// initial transform only matters before the first mount and is ignored
    /// here.
    pub fn reconfigure(&mut self, config: CanvasConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.gestures.set_options(GestureOptions::from(&config));
        self.store.set_limits(config.zoom_limits());
        self.config = config;
        Ok(())
    }

    /// Rendering engine given at construction.
    #[must_use]
    pub fn engine(&self) -> RenderEngine {
        self.engine
    }

    /// Render strategy for the content layer.
    #[must_use]
    pub fn render_strategy(&self) -> RenderStrategy {
        self.engine.render_strategy()
    }

    /// Layout probe.
    #[must_use]
    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Mutable layout probe.
    pub fn probe_mut(&mut self) -> &mut P {
        &mut self.probe
    }

    /// Current transform.
    #[must_use]
    pub fn transform(&self) -> CanvasTransform {
        self.store.get()
    }

    /// The transform store, for read access.
    #[must_use]
    pub fn store(&self) -> &TransformStore {
        &self.store
    }

    /// Drag state.
    #[must_use]
    pub fn dragging(&self) -> Dragging {
        self.gestures.dragging()
    }

    /// Returns `true` between [`Self::mount`] and [`Self::unmount`].
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.viewport.is_some()
    }

    /// Viewport bounds captured at mount.
    #[must_use]
    pub fn viewport_bounds(&self) -> Option<Rect> {
        self.viewport
    }

    /// Returns `true` while a transition is running.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// A new handle to the imperative API.
    #[must_use]
    pub fn handle(&self) -> CanvasHandle<P::Node> {
        CanvasHandle::new(self.shared.clone())
    }

    /// Snapshot of the transform plus a zoom handle; see
    /// [`CanvasHandle::viewport_state`].
    #[must_use]
    pub fn viewport_state(&self) -> ViewportState<P::Node> {
        self.handle().viewport_state()
    }

    /// Registers an observer called with every transform change.
    pub fn subscribe(&mut self, listener: impl FnMut(&TransformChange) + 'static) -> ListenerId {
        self.store.subscribe(listener)
    }

    /// Removes an observer.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Registers a callback receiving the new transform after every change.
    pub fn on_zoom(&mut self, mut callback: impl FnMut(CanvasTransform) + 'static) -> ListenerId {
        self.store.subscribe(move |change| callback(change.current))
    }

    /// Registers a callback run once with a handle on the next mount.
    ///
    /// Registering while already mounted waits for a remount; register before
    /// calling [`Self::mount`] to observe the first one.
    pub fn on_mount(&mut self, callback: impl FnOnce(CanvasHandle<P::Node>) + 'static) {
        self.on_mount = Some(Box::new(callback));
    }

    /// Sets the function called whenever a handle enqueues a request.
    ///
    /// Hosts use it to schedule an idle callback. It is called synchronously
    /// from the handle method and must not re-enter the canvas.
    pub fn set_idle_waker(&mut self, waker: impl Fn() + 'static) {
        self.shared.borrow_mut().idle_waker = Some(Rc::new(waker));
    }

    /// Sets the function called whenever a [`crate::ZoomHandle`] writes.
    ///
    /// Hosts use it to request an animation frame. The same re-entrancy rule
    /// as [`Self::set_idle_waker`] applies.
    pub fn set_frame_waker(&mut self, waker: impl Fn() + 'static) {
        self.shared.borrow_mut().frame_waker = Some(Rc::new(waker));
    }

    /// Attaches the scrollbar collaborator.
    pub fn set_scrollbar(&mut self, scrollbar: Box<dyn Scrollbar>) {
        self.scrollbar = Some(scrollbar);
    }

    /// Detaches and returns the scrollbar collaborator.
    pub fn take_scrollbar(&mut self) -> Option<Box<dyn Scrollbar>> {
        self.scrollbar.take()
    }

    /// Captures the viewport bounds and starts accepting requests.
    ///
    /// Returns `false`, leaving the canvas unmounted, when the viewport cannot
    /// be measured.
    pub fn mount(&mut self) -> bool {
        let Some(viewport) = self.probe.viewport_bounds() else {
            tracing::debug!("viewport not measurable; canvas stays unmounted");
            return false;
        };
        self.viewport = Some(viewport);
        {
            let mut shared = self.shared.borrow_mut();
            shared.mounted = true;
            shared.transform = self.store.get();
        }
        tracing::debug!(
            x = viewport.x0,
            y = viewport.y0,
            width = viewport.width(),
            height = viewport.height(),
            "canvas mounted"
        );
        if let Some(callback) = self.on_mount.take() {
            callback(self.handle());
        }
        true
    }

    /// Stops accepting requests and drops pending work.
    ///
    /// An active drag ends without a response and a running transition stops
    /// where it is.
    pub fn unmount(&mut self) {
        if self.viewport.take().is_none() {
            return;
        }
        self.gestures.reset();
        self.transition = None;
        self.queue.clear();
        let mut shared = self.shared.borrow_mut();
        shared.mounted = false;
        shared.requests.clear();
        tracing::debug!("canvas unmounted");
    }

    fn origin(&self) -> Point {
        self.viewport.map_or(Point::ORIGIN, |v| v.origin())
    }

    fn interrupt_transition(&mut self) {
        if let Some(transition) = self.transition.take() {
            tracing::trace!(target_scale = transition.target().scale, "transition interrupted");
        }
    }

    fn apply(&mut self, outcome: GestureOutcome) -> InputResponse {
        let mut response = outcome.response;
        if response.is_handled() {
            self.interrupt_transition();
        }
        if let Some(next) = outcome.transform
            && self.store.set(next, outcome.source)
        {
            response |= InputResponse::TRANSFORM_CHANGED;
        }
        if let (Some(delta), Some(scrollbar)) = (outcome.scroll_delta, self.scrollbar.as_mut()) {
            scrollbar.apply_scroll_delta(delta);
        }
        response
    }

    /// Handles a pointer press on the canvas.
    ///
    /// `target` is the innermost element under the pointer, used for the
    /// opt-out markers.
    pub fn pointer_down<T: InputTarget>(
        &mut self,
        event: &PointerInput,
        target: Option<&T>,
    ) -> InputResponse {
        let outcome = self.gestures.pointer_down(event, target);
        self.apply(outcome)
    }

    /// Handles a pointer move.
    pub fn pointer_move(&mut self, event: &PointerInput) -> InputResponse {
        let outcome = self.gestures.pointer_move(event, self.store.get());
        self.apply(outcome)
    }

    /// Handles a pointer release.
    pub fn pointer_up(&mut self) -> InputResponse {
        let outcome = self.gestures.pointer_up();
        self.apply(outcome)
    }

    /// Handles a cancelled pointer; same as a release.
    pub fn pointer_cancel(&mut self) -> InputResponse {
        self.pointer_up()
    }

    /// Handles a wheel event.
    pub fn wheel<T: InputTarget>(&mut self, event: &WheelInput, target: Option<&T>) -> InputResponse {
        let outcome = self.gestures.wheel(
            event,
            target,
            self.store.get(),
            self.store.limits(),
            self.origin(),
        );
        self.apply(outcome)
    }

    /// Handles one pinch step scaling by `factor` about `center`.
    pub fn pinch(&mut self, center: Point, factor: f64) -> InputResponse {
        let outcome = self.gestures.pinch(
            center,
            factor,
            self.store.get(),
            self.store.limits(),
            self.origin(),
        );
        self.apply(outcome)
    }

    /// Handles a key press.
    pub fn key_down(&mut self, event: &KeyInput) -> InputResponse {
        let outcome = self.gestures.key_down(event, self.store.get());
        self.apply(outcome)
    }

    /// Pans by a delta reported by the scrollbar, in view pixels.
    pub fn on_scrollbar_scroll(&mut self, delta: Vec2) -> bool {
        if delta == Vec2::ZERO {
            return false;
        }
        self.interrupt_transition();
        let next = self.store.get().translate_by_view(-delta);
        self.store.set(next, ChangeSource::Scrollbar)
    }

    /// Inputs for the background grid.
    #[must_use]
    pub fn background_props(&self) -> BackgroundProps {
        BackgroundProps {
            transform: self.store.get(),
            max_zoom: self.store.limits().max(),
        }
    }

    /// Inputs for the scrollbar, once mounted.
    #[must_use]
    pub fn scrollbar_props(&self) -> Option<ScrollbarProps> {
        let viewport = self.viewport?;
        let t = self.store.get();
        Some(ScrollbarProps {
            scale: t.scale,
            container_size: viewport.size(),
            offset: -t.translate,
        })
    }

    /// Read-only transform view for overlays.
    #[must_use]
    pub fn overlay_snapshot(&self) -> OverlaySnapshot {
        let t = self.store.get();
        let limits = self.store.limits();
        OverlaySnapshot {
            translate: t.translate,
            scale: t.scale,
            min_zoom: limits.min(),
            max_zoom: limits.max(),
        }
    }

    fn collect_requests(&mut self, now_ms: f64) {
        let incoming: VecDeque<_> = core::mem::take(&mut self.shared.borrow_mut().requests);
        if incoming.is_empty() {
            return;
        }
        let timeout = self.config.idle_timeouts.for_engine(self.engine);
        tracing::trace!(count = incoming.len(), timeout, "requests scheduled");
        for request in incoming {
            let timeout = if request.is_immediate() { 0.0 } else { timeout };
            self.queue.push(request, now_ms, timeout);
        }
    }

    /// Runs every pending request; call when the host is idle.
    ///
    /// Returns `true` if animation frames are needed.
    pub fn on_idle(&mut self, now_ms: f64) -> bool {
        self.collect_requests(now_ms);
        while let Some(request) = self.queue.pop_ready(now_ms, true) {
            self.run(request, now_ms);
        }
        self.needs_frame()
    }

    /// Advances the canvas at an animation frame.
    ///
    /// Requests whose idle timeout has expired run first, then the running
    /// transition is sampled. Returns `true` while more frames are needed.
    pub fn on_frame(&mut self, now_ms: f64) -> bool {
        self.collect_requests(now_ms);
        while let Some(request) = self.queue.pop_ready(now_ms, false) {
            self.run(request, now_ms);
        }
        if let Some(transition) = self.transition {
            let sample = transition.sample(now_ms);
            if sample.finished {
                self.transition = None;
                tracing::trace!("transition finished");
            }
            self.store.set(sample.transform, ChangeSource::Transition);
        }
        self.needs_frame()
    }

    /// Returns `true` while a transition runs or requests are waiting.
    #[must_use]
    pub fn needs_frame(&self) -> bool {
        self.transition.is_some() || !self.queue.is_empty()
    }

    /// Earliest idle deadline among pending requests.
    #[must_use]
    pub fn next_deadline(&self) -> Option<f64> {
        self.queue.next_deadline()
    }

    fn duration(&self, requested: Option<f64>) -> f64 {
        requested.unwrap_or(self.config.default_duration_ms)
    }

    fn run(&mut self, request: Request<P::Node>, now_ms: f64) {
        if self.viewport.is_none() {
            tracing::trace!("canvas not mounted; request dropped");
            return;
        }
        match request {
            Request::ScrollNode(options) => self.run_scroll_node(options, now_ms),
            Request::Fit(options) => self.run_fit(options, now_ms),
            Request::CenterHorizontally(options) => self.run_center_horizontally(options, now_ms),
            Request::Set(transform) => {
                self.interrupt_transition();
                self.store.set(transform, ChangeSource::Direct);
            }
            Request::TransitionTo {
                target,
                duration_ms,
            } => {
                let duration = self.duration(duration_ms);
                self.start_transition(target, duration, now_ms);
            }
        }
    }

    fn measured_viewport(&self) -> Option<Rect> {
        self.viewport
            .filter(|v| v.is_finite() && v.width() > 0.0 && v.height() > 0.0)
    }

    fn run_scroll_node(&mut self, options: ScrollNodeOptions<P::Node>, now_ms: f64) {
        let Some(container) = self.measured_viewport() else {
            tracing::debug!("viewport degenerate; scroll to node skipped");
            return;
        };
        let Some(node) = self
            .probe
            .node_bounds(&options.node)
            .filter(|r| r.is_finite())
        else {
            tracing::debug!("node not measurable; scroll to node skipped");
            return;
        };
        let current = self.store.get();
        let mut scale = options.target_scale.unwrap_or(current.scale);
        if options.allow_scale_increase_only {
            scale = scale.max(current.scale);
        }
        if let Some(max_scale) = options.max_scale {
            scale = scale.min(max_scale);
        }
        let scale = self.store.limits().clamp(scale);
        let target = anchored_transform(
            options.anchor,
            container,
            node,
            current,
            scale,
            options.offset,
        );
        let duration = self.duration(options.duration_ms);
        self.start_transition(target, duration, now_ms);
    }

    fn run_fit(&mut self, options: FitOptions, now_ms: f64) {
        let Some(container) = self.measured_viewport() else {
            tracing::debug!("viewport degenerate; fit skipped");
            return;
        };
        let Some(content) = self.probe.content_bounds().filter(|r| r.is_finite()) else {
            tracing::debug!("content not measurable; fit skipped");
            return;
        };
        let params = FitParams {
            target_scale: options.target_scale,
            max_auto_scale: options
                .max_auto_scale
                .unwrap_or(self.config.max_auto_scale),
            offset: options.offset,
            disable_vertical_center: options.disable_vertical_center,
        };
        let Some(target) = fit_transform(
            container,
            content,
            self.store.get(),
            params,
            self.store.limits(),
        ) else {
            tracing::debug!("content empty; fit skipped");
            return;
        };
        if let Some(scrollbar) = self.scrollbar.as_mut() {
            scrollbar.reset_position();
        }
        let duration = self.duration(options.duration_ms);
        self.start_transition(target, duration, now_ms);
    }

    fn run_center_horizontally(&mut self, options: HorizontalCenterOptions, now_ms: f64) {
        let Some(container) = self.measured_viewport() else {
            tracing::debug!("viewport degenerate; horizontal centering skipped");
            return;
        };
        let Some(content) = self.probe.content_bounds().filter(|r| r.is_finite()) else {
            tracing::debug!("content not measurable; horizontal centering skipped");
            return;
        };
        let Some(target) =
            horizontal_center_transform(container, content, self.store.get(), options.offset_x)
        else {
            tracing::debug!("content has no width; horizontal centering skipped");
            return;
        };
        let duration = self.duration(options.duration_ms);
        self.start_transition(target, duration, now_ms);
    }

    /// Replaces any running transition with one towards `target`.
    fn start_transition(&mut self, target: CanvasTransform, duration_ms: f64, now_ms: f64) {
        let target = target.clamped(self.store.limits());
        let current = self.store.get();
        if duration_ms <= 0.0 || current == target {
            self.transition = None;
            self.store.set(target, ChangeSource::Transition);
            return;
        }
        tracing::debug!(
            x = target.translate.x,
            y = target.translate.y,
            scale = target.scale,
            duration_ms,
            "transition started"
        );
        self.transition = Some(Transition::new(current, target, now_ms, duration_ms));
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};

    use kurbo::{Point, Rect, Vec2};

    use super::{Canvas, LayoutProbe};
    use crate::collaborators::Scrollbar;
    use crate::config::CanvasConfig;
    use crate::filter::NoTarget;
    use crate::handle::{FitOptions, HorizontalCenterOptions, ScrollNodeOptions};
    use crate::input::{InputResponse, Modifiers, PointerInput, WheelInput};
    use crate::render::RenderEngine;
    use crate::store::ChangeSource;
    use crate::transform::CanvasTransform;

    /// Viewport at (100, 50) with static content; transform ignored.
    struct StaticProbe {
        content: Option<Rect>,
    }

    impl LayoutProbe for StaticProbe {
        type Node = ();

        fn viewport_bounds(&self) -> Option<Rect> {
            Some(Rect::new(100.0, 50.0, 900.0, 650.0))
        }

        fn content_bounds(&self) -> Option<Rect> {
            self.content
        }

        fn node_bounds(&self, _: &()) -> Option<Rect> {
            None
        }
    }

    #[derive(Default)]
    struct Log {
        deltas: Vec<Vec2>,
        resets: usize,
    }

    struct RecordingScrollbar(Rc<RefCell<Log>>);

    impl Scrollbar for RecordingScrollbar {
        fn apply_scroll_delta(&mut self, delta: Vec2) {
            self.0.borrow_mut().deltas.push(delta);
        }

        fn reset_position(&mut self) {
            self.0.borrow_mut().resets += 1;
        }
    }

    fn canvas(content: Option<Rect>) -> Canvas<StaticProbe> {
        Canvas::new(
            CanvasConfig::default(),
            StaticProbe { content },
            RenderEngine::Blink,
        )
        .unwrap()
    }

    const NONE: Option<&NoTarget> = None;

    #[test]
    fn invalid_config_is_rejected() {
        let bad = CanvasConfig::default().with_zoom_limits(-1.0, 2.0);
        assert!(Canvas::new(bad, StaticProbe { content: None }, RenderEngine::Blink).is_err());
    }

    #[test]
    fn wheel_zoom_is_relative_to_viewport_origin() {
        let mut c = canvas(None);
        assert!(c.mount());
        let cursor = Point::new(300.0, 250.0);
        let wheel = WheelInput::pixels(cursor, Vec2::new(0.0, -500.0)).with_modifiers(Modifiers::CTRL);
        let response = c.wheel(&wheel, NONE);
        assert!(response.contains(InputResponse::HANDLED | InputResponse::TRANSFORM_CHANGED));
        let local = Point::new(200.0, 200.0);
        let fixed = CanvasTransform::IDENTITY.view_to_content(local);
        assert!((c.transform().view_to_content(local) - fixed).hypot() < 1e-9);
    }

    #[test]
    fn wheel_pan_is_mirrored_on_scrollbar() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut c = canvas(None);
        c.set_scrollbar(Box::new(RecordingScrollbar(log.clone())));
        c.wheel(&WheelInput::pixels(Point::ORIGIN, Vec2::new(0.0, 30.0)), NONE);
        assert_eq!(log.borrow().deltas.as_slice(), &[Vec2::new(0.0, 30.0)]);
        assert!(c.on_scrollbar_scroll(Vec2::new(0.0, 10.0)));
        assert_eq!(c.transform().translate, Vec2::new(0.0, -40.0));
    }

    #[test]
    fn fit_resets_scrollbar_and_animates() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut c = canvas(Some(Rect::new(100.0, 50.0, 1700.0, 1250.0)));
        c.set_scrollbar(Box::new(RecordingScrollbar(log.clone())));
        assert!(c.mount());
        c.handle().fit_content_to_view(FitOptions::default());
        assert!(c.on_idle(0.0));
        assert_eq!(log.borrow().resets, 1);
        assert!(c.is_transitioning());
        assert!(c.on_frame(150.0));
        assert!(!c.on_frame(300.0));
        assert!(c.transform().approx_eq(CanvasTransform::new(Vec2::ZERO, 0.5), 1e-9));
    }

    #[test]
    fn gesture_interrupts_transition() {
        let mut c = canvas(Some(Rect::new(100.0, 50.0, 1700.0, 1250.0)));
        assert!(c.mount());
        c.handle().fit_content_to_view(FitOptions::default());
        c.on_idle(0.0);
        c.on_frame(100.0);
        let reached = c.transform();
        c.pointer_down(&PointerInput::primary(Point::ORIGIN), NONE);
        assert!(!c.is_transitioning());
        assert!(!c.on_frame(400.0));
        assert_eq!(c.transform(), reached);
    }

    #[test]
    fn requests_run_on_frame_after_idle_timeout() {
        let mut c = canvas(Some(Rect::new(100.0, 50.0, 500.0, 650.0)));
        assert!(c.mount());
        c.handle()
            .scroll_content_horizontally_to_center(HorizontalCenterOptions::default());
        // Seen at t=0, default timeout 100 ms.
        assert!(c.on_frame(0.0));
        assert!(!c.is_transitioning());
        assert_eq!(c.transform(), CanvasTransform::IDENTITY);
        assert_eq!(c.next_deadline(), Some(100.0));
        assert!(c.on_frame(100.0));
        assert!(c.is_transitioning());
        assert!(!c.on_frame(400.0));
        assert_eq!(c.transform().translate, Vec2::new(200.0, 0.0));
    }

    #[test]
    fn zoom_handle_writes_apply_on_next_frame() {
        let frames = Rc::new(Cell::new(0));
        let mut c = canvas(None);
        {
            let frames = frames.clone();
            c.set_frame_waker(move || frames.set(frames.get() + 1));
        }
        assert!(c.mount());
        let zoom = c.viewport_state().zoom.unwrap();
        let target = CanvasTransform::new(Vec2::new(40.0, 0.0), 2.0);
        zoom.set_transform(target);
        assert_eq!(frames.get(), 1);
        assert_eq!(c.next_deadline(), None);
        assert!(!c.on_frame(16.0));
        assert_eq!(c.transform(), target);
        assert_eq!(zoom.transform(), target);

        zoom.transition_to(CanvasTransform::IDENTITY, Some(100.0));
        assert!(c.on_frame(32.0));
        assert!(c.is_transitioning());
        assert!(!c.on_frame(132.0));
        assert_eq!(zoom.transform(), CanvasTransform::IDENTITY);
    }

    #[test]
    fn webkit_uses_longer_timeout() {
        let mut c = Canvas::new(
            CanvasConfig::default(),
            StaticProbe { content: None },
            RenderEngine::WebKit,
        )
        .unwrap();
        assert!(c.mount());
        c.handle().fit_content_to_view(FitOptions::default());
        c.on_frame(10.0);
        assert_eq!(c.next_deadline(), Some(310.0));
    }

    /// Nodes are owned ids looked up by name.
    struct NamedProbe;

    impl LayoutProbe for NamedProbe {
        type Node = String;

        fn viewport_bounds(&self) -> Option<Rect> {
            Some(Rect::new(0.0, 0.0, 800.0, 600.0))
        }

        fn content_bounds(&self) -> Option<Rect> {
            None
        }

        fn node_bounds(&self, node: &String) -> Option<Rect> {
            (node == "card").then(|| Rect::new(0.0, 0.0, 100.0, 100.0))
        }
    }

    #[test]
    fn owned_node_handles_are_queued_and_measured() {
        let mut c =
            Canvas::new(CanvasConfig::default(), NamedProbe, RenderEngine::Blink).unwrap();
        assert!(c.mount());
        let handle = c.handle();
        handle.scroll_node_to_center(
            ScrollNodeOptions::new(String::from("card")).with_duration_ms(0.0),
        );
        handle.scroll_node_to_center(ScrollNodeOptions::new(String::from("missing")));
        assert!(!c.on_idle(0.0));
        assert_eq!(c.transform().translate, Vec2::new(350.0, 250.0));
    }

    #[test]
    fn on_mount_fires_on_the_next_mount_only() {
        let calls = Rc::new(Cell::new(0));
        let mut c = canvas(None);
        assert!(c.mount());
        {
            let calls = calls.clone();
            c.on_mount(move |handle| {
                assert!(handle.is_mounted());
                calls.set(calls.get() + 1);
            });
        }
        assert_eq!(calls.get(), 0);
        c.unmount();
        assert!(c.mount());
        assert_eq!(calls.get(), 1);
        c.unmount();
        assert!(c.mount());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn on_zoom_and_unmount() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut c = canvas(None);
        {
            let seen = seen.clone();
            c.on_zoom(move |t| seen.borrow_mut().push(t));
        }
        let sources = Rc::new(RefCell::new(Vec::new()));
        {
            let sources = sources.clone();
            c.subscribe(move |change| sources.borrow_mut().push(change.source));
        }
        assert!(c.mount());
        c.pointer_down(&PointerInput::primary(Point::ORIGIN), NONE);
        c.pointer_move(&PointerInput::primary(Point::new(5.0, 0.0)));
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(sources.borrow().as_slice(), &[ChangeSource::Drag]);

        c.unmount();
        assert!(!c.is_mounted());
        assert_eq!(c.dragging(), crate::gesture::Dragging::Idle);
        let handle = c.handle();
        handle.fit_content_to_view(FitOptions::default());
        assert!(!c.on_idle(0.0));
        assert_eq!(handle.viewport_state().transform, CanvasTransform::ZERO);
    }

    #[test]
    fn reconfigure_reclamps() {
        let mut c = canvas(None);
        c.pinch(Point::ORIGIN, 3.0);
        assert_eq!(c.transform().scale, 3.0);
        c.reconfigure(CanvasConfig::default().with_zoom_limits(0.5, 2.0))
            .unwrap();
        assert_eq!(c.transform().scale, 2.0);
        assert_eq!(c.overlay_snapshot().max_zoom, 2.0);
        assert_eq!(c.background_props().max_zoom, 2.0);
    }
}
