// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use kurbo::{Point, Rect, Vec2};
use understory_canvas::{
    Canvas, CanvasConfig, CanvasHandle, CanvasTransform, ConfigError, ContentLayer,
    InputResponse, InputTarget, Key, KeyInput, LayoutProbe, ListenerId, PointerButton,
    PointerInput, RenderEngine, RenderStrategy, ViewportRenderer, WheelDeltaMode, WheelInput,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlElement,
    IdleRequestOptions, KeyboardEvent, MouseEvent, MouseEventInit, Node, PointerEvent,
    WheelEvent, Window,
};

use crate::{
    LayerMarkup, PANNING_CLASS, POSITIONED_LAYER_STYLE, SVG_LAYER_STYLE, SVG_NAMESPACE,
    content_extent, is_text_entry_tag, modifiers,
};

fn client_rect(element: &Element) -> Rect {
    let r = element.get_bounding_client_rect();
    Rect::from_origin_size((r.x(), r.y()), (r.width(), r.height()))
}

fn pointer_input(event: &MouseEvent) -> PointerInput {
    PointerInput {
        position: Point::new(f64::from(event.client_x()), f64::from(event.client_y())),
        button: PointerButton::from_index(event.button()),
        modifiers: modifiers(
            event.shift_key(),
            event.ctrl_key(),
            event.alt_key(),
            event.meta_key(),
        ),
    }
}

fn event_target(event: &Event) -> Option<DomTarget> {
    event
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .map(DomTarget)
}

/// A DOM element as seen by the opt-out marker predicates.
///
/// Markers are attributes: an element opts out when it carries the attribute.
#[derive(Clone, Debug)]
pub struct DomTarget(pub Element);

impl InputTarget for DomTarget {
    fn has_marker(&self, marker: &str) -> bool {
        self.0.has_attribute(marker)
    }

    fn parent_target(&self) -> Option<Self> {
        self.0.parent_element().map(Self)
    }
}

/// Engine of the current browser, from `navigator.userAgent`.
///
/// [`WebCanvas::mount`] makes the same choice; call this beforehand to learn
/// which [`RenderStrategy`] and markup the canvas will use.
#[must_use]
pub fn detect_engine() -> Option<RenderEngine> {
    let user_agent = web_sys::window()?.navigator().user_agent().ok()?;
    Some(RenderEngine::from_user_agent(&user_agent))
}

/// Measures the viewport, content and nodes with `getBoundingClientRect`.
#[derive(Clone, Debug)]
pub struct DomProbe {
    viewport: Element,
    content: Element,
}

impl LayoutProbe for DomProbe {
    type Node = Element;

    fn viewport_bounds(&self) -> Option<Rect> {
        Some(client_rect(&self.viewport))
    }

    /// The content root together with its direct children, so positioned
    /// children outside the root's own box still count.
    fn content_bounds(&self) -> Option<Rect> {
        let children = core::iter::successors(self.content.first_element_child(), |child| {
            child.next_element_sibling()
        });
        content_extent(
            core::iter::once(client_rect(&self.content))
                .chain(children.map(|child| client_rect(&child))),
        )
    }

    fn node_bounds(&self, node: &Element) -> Option<Rect> {
        node.is_connected().then(|| client_rect(node))
    }
}

/// The layer element receiving the transform.
#[derive(Clone, Debug)]
pub struct DomLayer(Element);

/// Markup built around the caller's content, undone on teardown.
struct Layer {
    /// Outermost created element, a child of the viewport.
    root: Element,
    /// Element the transform is painted on.
    target: Element,
    content: Element,
    /// Where the content lived before mount.
    home: Option<(Node, Option<Node>)>,
}

impl Layer {
    fn build(
        document: &Document,
        viewport: &Element,
        content: &Element,
        markup: LayerMarkup,
    ) -> Result<Self, JsValue> {
        let svg = |tag: &str| document.create_element_ns(Some(SVG_NAMESPACE), tag);
        let (root, target, holder) = match markup {
            LayerMarkup::PositionedDiv => {
                let div = document.create_element("div")?;
                div.set_attribute("style", POSITIONED_LAYER_STYLE)?;
                (div.clone(), div.clone(), div)
            }
            LayerMarkup::PositionedSvg => {
                let div = document.create_element("div")?;
                div.set_attribute("style", POSITIONED_LAYER_STYLE)?;
                let inner = svg("svg")?;
                inner.set_attribute("style", SVG_LAYER_STYLE)?;
                div.append_child(&inner)?;
                (div.clone(), div, inner)
            }
            LayerMarkup::SvgGroup => {
                let outer = svg("svg")?;
                outer.set_attribute("style", SVG_LAYER_STYLE)?;
                let group = svg("g")?;
                outer.append_child(&group)?;
                (outer, group.clone(), group)
            }
            LayerMarkup::SvgForeignObject => {
                let outer = svg("svg")?;
                outer.set_attribute("style", SVG_LAYER_STYLE)?;
                let group = svg("g")?;
                let foreign = svg("foreignObject")?;
                // A unit box with visible overflow lets HTML content size itself.
                foreign.set_attribute("width", "1")?;
                foreign.set_attribute("height", "1")?;
                foreign.set_attribute("style", "overflow: visible;")?;
                group.append_child(&foreign)?;
                outer.append_child(&group)?;
                (outer, group, foreign)
            }
        };
        let home = content
            .parent_node()
            .map(|parent| (parent, content.next_sibling()));
        viewport.append_child(&root)?;
        holder.append_child(content)?;
        Ok(Self {
            root,
            target,
            content: content.clone(),
            home,
        })
    }

    fn dismantle(&self) {
        if let Some((parent, next)) = &self.home
            && let Err(err) = parent.insert_before(&self.content, next.as_ref())
        {
            tracing::warn!(?err, "failed to restore canvas content");
        }
        self.root.remove();
    }
}

impl ContentLayer for DomLayer {
    fn set_transform_attribute(&mut self, value: &str) {
        if let Err(err) = self.0.set_attribute("transform", value) {
            tracing::warn!(?err, "failed to set transform attribute");
        }
    }

    fn set_style_transform(&mut self, value: &str) {
        let Some(element) = self.0.dyn_ref::<HtmlElement>() else {
            tracing::warn!("styled layer is not an HTML element");
            return;
        };
        let style = element.style();
        if let Err(err) = style
            .set_property("transform-origin", "0 0")
            .and_then(|()| style.set_property("transform", value))
        {
            tracing::warn!(?err, "failed to set style transform");
        }
    }
}

/// Failure to mount a [`WebCanvas`].
#[derive(Debug)]
pub enum WebCanvasError {
    /// No global `window`.
    NoWindow,
    /// The viewport element could not be measured.
    NotMeasurable,
    /// The configuration was rejected.
    Config(ConfigError),
    /// A DOM call failed.
    Js(JsValue),
}

impl fmt::Display for WebCanvasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWindow => f.write_str("no global window"),
            Self::NotMeasurable => f.write_str("viewport element could not be measured"),
            Self::Config(err) => write!(f, "invalid canvas configuration: {err}"),
            Self::Js(err) => write!(f, "DOM call failed: {err:?}"),
        }
    }
}

impl core::error::Error for WebCanvasError {}

impl From<ConfigError> for WebCanvasError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<JsValue> for WebCanvasError {
    fn from(err: JsValue) -> Self {
        Self::Js(err)
    }
}

/// An event listener that removes itself on drop.
struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn bind<E: JsCast + 'static>(
        target: &EventTarget,
        kind: &'static str,
        passive: bool,
        mut handler: impl FnMut(E) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if let Ok(event) = event.dyn_into::<E>() {
                handler(event);
            }
        });
        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            callback.as_ref().unchecked_ref(),
            &options,
        )?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

enum IdleRequest {
    Idle(u32),
    Timeout(i32),
}

#[derive(Default)]
struct Scheduler {
    idle: Option<IdleRequest>,
    frame: Option<i32>,
}

struct Inner {
    window: Window,
    viewport: Element,
    layer: Layer,
    canvas: RefCell<Canvas<DomProbe>>,
    has_idle_callback: bool,
    idle_timeout_ms: Cell<f64>,
    scheduler: RefCell<Scheduler>,
    idle_callback: Closure<dyn FnMut()>,
    frame_callback: Closure<dyn FnMut(f64)>,
    listeners: RefCell<Vec<Listener>>,
    key_listener: RefCell<Option<Listener>>,
}

impl Inner {
    fn now(&self) -> f64 {
        self.window.performance().map_or(0.0, |p| p.now())
    }

    fn schedule_idle(&self) {
        let mut scheduler = self.scheduler.borrow_mut();
        if scheduler.idle.is_some() {
            return;
        }
        let callback: &js_sys::Function = self.idle_callback.as_ref().unchecked_ref();
        let request = if self.has_idle_callback {
            let options = IdleRequestOptions::new();
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Idle timeouts are small whole milliseconds."
            )]
            options.set_timeout(self.idle_timeout_ms.get().max(0.0) as u32);
            self.window
                .request_idle_callback_with_options(callback, &options)
                .map(IdleRequest::Idle)
        } else {
            self.window
                .set_timeout_with_callback_and_timeout_and_arguments_0(callback, 0)
                .map(IdleRequest::Timeout)
        };
        match request {
            Ok(request) => scheduler.idle = Some(request),
            Err(err) => tracing::warn!(?err, "failed to schedule idle callback"),
        }
    }

    fn schedule_frame(&self) {
        let mut scheduler = self.scheduler.borrow_mut();
        if scheduler.frame.is_some() {
            return;
        }
        match self
            .window
            .request_animation_frame(self.frame_callback.as_ref().unchecked_ref())
        {
            Ok(id) => scheduler.frame = Some(id),
            Err(err) => tracing::warn!(?err, "failed to request animation frame"),
        }
    }

    fn run_idle(&self) {
        self.scheduler.borrow_mut().idle = None;
        let now = self.now();
        let more = self.canvas.borrow_mut().on_idle(now);
        if more {
            self.schedule_frame();
        }
    }

    fn run_frame(&self, now: f64) {
        self.scheduler.borrow_mut().frame = None;
        let more = self.canvas.borrow_mut().on_frame(now);
        if more {
            self.schedule_frame();
        }
    }

    fn listen<E: JsCast + 'static>(
        self: &Rc<Self>,
        target: &EventTarget,
        kind: &'static str,
        passive: bool,
        handler: fn(&Self, E),
    ) -> Result<Listener, JsValue> {
        let weak = Rc::downgrade(self);
        Listener::bind(target, kind, passive, move |event: E| {
            if let Some(inner) = weak.upgrade() {
                handler(&inner, event);
            }
        })
    }

    fn bind_pointer_listeners(self: &Rc<Self>) -> Result<(), JsValue> {
        self.listeners.borrow_mut().clear();
        let target: &EventTarget = self.viewport.as_ref();
        let listeners = [
            self.listen(target, "pointerdown", false, Self::on_pointer_down)?,
            self.listen(target, "pointermove", true, Self::on_pointer_move)?,
            self.listen(target, "pointerup", true, Self::on_pointer_up)?,
            self.listen(target, "pointercancel", true, Self::on_pointer_up)?,
            self.listen(target, "wheel", false, Self::on_wheel)?,
        ];
        self.listeners.borrow_mut().extend(listeners);
        Ok(())
    }

    fn bind_key_listener(self: &Rc<Self>) -> Result<(), JsValue> {
        self.key_listener.borrow_mut().take();
        if !self.canvas.borrow().config().enable_arrow_key_pan {
            return Ok(());
        }
        let target: &EventTarget = self.window.as_ref();
        let listener = self.listen(target, "keydown", false, Self::on_key_down)?;
        *self.key_listener.borrow_mut() = Some(listener);
        Ok(())
    }

    fn apply_panning_class(&self, response: InputResponse) {
        let classes = self.viewport.class_list();
        if response.contains(InputResponse::PANNING_STARTED) {
            let _ = classes.add_1(PANNING_CLASS);
        }
        if response.contains(InputResponse::PANNING_ENDED) {
            let _ = classes.remove_1(PANNING_CLASS);
        }
    }

    fn forward_mousedown(&self) {
        let Some(body) = self.window.document().and_then(|d| d.body()) else {
            return;
        };
        let init = MouseEventInit::new();
        init.set_bubbles(true);
        match MouseEvent::new_with_mouse_event_init_dict("mousedown", &init) {
            Ok(event) => {
                let _ = body.dispatch_event(&event);
            }
            Err(err) => tracing::warn!(?err, "failed to synthesize mousedown"),
        }
    }

    fn on_pointer_down(&self, event: PointerEvent) {
        let input = pointer_input(&event);
        let target = event_target(&event);
        let response = self.canvas.borrow_mut().pointer_down(&input, target.as_ref());
        if !response.is_handled() {
            return;
        }
        event.prevent_default();
        if response.contains(InputResponse::PANNING_STARTED) {
            let _ = self.viewport.set_pointer_capture(event.pointer_id());
        }
        self.apply_panning_class(response);
        if response.contains(InputResponse::FORWARD_MOUSEDOWN) {
            self.forward_mousedown();
        }
    }

    fn on_pointer_move(&self, event: PointerEvent) {
        let input = pointer_input(&event);
        self.canvas.borrow_mut().pointer_move(&input);
    }

    fn on_pointer_up(&self, event: PointerEvent) {
        let response = self.canvas.borrow_mut().pointer_up();
        if response.contains(InputResponse::PANNING_ENDED) {
            let _ = self.viewport.release_pointer_capture(event.pointer_id());
        }
        self.apply_panning_class(response);
    }

    fn on_wheel(&self, event: WheelEvent) {
        let mut input = WheelInput::pixels(
            pointer_input(&event).position,
            Vec2::new(event.delta_x(), event.delta_y()),
        );
        input.mode = WheelDeltaMode::from_dom(event.delta_mode());
        input.modifiers = modifiers(
            event.shift_key(),
            event.ctrl_key(),
            event.alt_key(),
            event.meta_key(),
        );
        let target = event_target(&event);
        let response = self.canvas.borrow_mut().wheel(&input, target.as_ref());
        if response.is_handled() {
            event.prevent_default();
        }
    }

    fn on_key_down(&self, event: KeyboardEvent) {
        if let Some(DomTarget(element)) = event_target(&event) {
            let editable = element
                .dyn_ref::<HtmlElement>()
                .is_some_and(HtmlElement::is_content_editable);
            if editable || is_text_entry_tag(&element.tag_name()) {
                return;
            }
        }
        let input = KeyInput {
            key: Key::from_dom(&event.key()),
            modifiers: modifiers(
                event.shift_key(),
                event.ctrl_key(),
                event.alt_key(),
                event.meta_key(),
            ),
        };
        let response = self.canvas.borrow_mut().key_down(&input);
        if response.is_handled() {
            event.prevent_default();
        }
    }

    fn teardown(&self) {
        self.listeners.borrow_mut().clear();
        self.key_listener.borrow_mut().take();
        {
            let mut scheduler = self.scheduler.borrow_mut();
            if let Some(id) = scheduler.frame.take() {
                let _ = self.window.cancel_animation_frame(id);
            }
            match scheduler.idle.take() {
                Some(IdleRequest::Idle(id)) => self.window.cancel_idle_callback(id),
                Some(IdleRequest::Timeout(id)) => self.window.clear_timeout_with_handle(id),
                None => {}
            }
        }
        if let Ok(mut canvas) = self.canvas.try_borrow_mut() {
            canvas.unmount();
        }
        let _ = self.viewport.class_list().remove_1(PANNING_CLASS);
        self.layer.dismantle();
    }
}

/// A canvas bound to DOM elements.
///
/// Dropping it removes every listener and cancels pending callbacks.
pub struct WebCanvas {
    inner: Rc<Inner>,
}

impl fmt::Debug for WebCanvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebCanvas")
            .field("viewport", &self.inner.viewport)
            .field("listeners", &self.inner.listeners.borrow().len())
            .field("keys", &self.inner.key_listener.borrow().is_some())
            .finish_non_exhaustive()
    }
}

type MountCallback = Box<dyn FnOnce(CanvasHandle<Element>)>;

impl WebCanvas {
    /// Binds a canvas to `viewport` (input, measurement) and `content`, then
    /// mounts it.
    ///
    /// `content` is moved into a layer built inside the viewport; see the
    /// crate docs for the markup.
    pub fn mount(
        viewport: Element,
        content: Element,
        config: CanvasConfig,
    ) -> Result<Self, WebCanvasError> {
        Self::bind(viewport, content, config, None)
    }

    /// Like [`Self::mount`], calling `on_mount` with a handle once mounted.
    pub fn mount_with(
        viewport: Element,
        content: Element,
        config: CanvasConfig,
        on_mount: impl FnOnce(CanvasHandle<Element>) + 'static,
    ) -> Result<Self, WebCanvasError> {
        Self::bind(viewport, content, config, Some(Box::new(on_mount)))
    }

    fn bind(
        viewport: Element,
        content: Element,
        config: CanvasConfig,
        on_mount: Option<MountCallback>,
    ) -> Result<Self, WebCanvasError> {
        let window = web_sys::window().ok_or(WebCanvasError::NoWindow)?;
        let document = window.document().ok_or(WebCanvasError::NoWindow)?;
        let engine = detect_engine().unwrap_or_default();
        let content_is_svg = content.namespace_uri().as_deref() == Some(SVG_NAMESPACE);
        let markup = LayerMarkup::select(engine.render_strategy(), content_is_svg);
        let probe = DomProbe {
            viewport: viewport.clone(),
            content: content.clone(),
        };
        let mut canvas = Canvas::new(config, probe, engine)?;
        let layer = Layer::build(&document, &viewport, &content, markup)?;

        let mut renderer =
            ViewportRenderer::new(markup.strategy(), DomLayer(layer.target.clone()));
        renderer.paint(canvas.transform());
        let renderer = Rc::new(RefCell::new(renderer));
        canvas.subscribe(move |change| renderer.borrow_mut().paint(change.current));
        if let Some(on_mount) = on_mount {
            canvas.on_mount(on_mount);
        }

        let has_idle_callback =
            js_sys::Reflect::has(&window, &JsValue::from_str("requestIdleCallback"))
                .unwrap_or(false);
        let idle_timeout_ms = Cell::new(canvas.config().idle_timeouts.for_engine(engine));
        tracing::debug!(?engine, ?markup, has_idle_callback, "binding web canvas");

        let inner = Rc::new_cyclic(|weak: &Weak<Inner>| {
            let idle_callback = {
                let weak = weak.clone();
                Closure::<dyn FnMut()>::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.run_idle();
                    }
                })
            };
            let frame_callback = {
                let weak = weak.clone();
                Closure::<dyn FnMut(f64)>::new(move |now: f64| {
                    if let Some(inner) = weak.upgrade() {
                        inner.run_frame(now);
                    }
                })
            };
            Inner {
                window,
                viewport,
                layer,
                canvas: RefCell::new(canvas),
                has_idle_callback,
                idle_timeout_ms,
                scheduler: RefCell::new(Scheduler::default()),
                idle_callback,
                frame_callback,
                listeners: RefCell::new(Vec::new()),
                key_listener: RefCell::new(None),
            }
        });
        {
            let mut canvas = inner.canvas.borrow_mut();
            let weak = Rc::downgrade(&inner);
            canvas.set_idle_waker(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.schedule_idle();
                }
            });
            let weak = Rc::downgrade(&inner);
            canvas.set_frame_waker(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.schedule_frame();
                }
            });
        }
        if let Err(err) = inner
            .bind_pointer_listeners()
            .and_then(|()| inner.bind_key_listener())
        {
            inner.teardown();
            return Err(err.into());
        }
        let mounted = inner.canvas.borrow_mut().mount();
        if !mounted {
            inner.teardown();
            return Err(WebCanvasError::NotMeasurable);
        }
        Ok(Self { inner })
    }

    /// Strategy used to paint the content layer.
    #[must_use]
    pub fn render_strategy(&self) -> RenderStrategy {
        self.inner.canvas.borrow().render_strategy()
    }

    /// Imperative API; nodes are DOM elements inside the content.
    #[must_use]
    pub fn handle(&self) -> CanvasHandle<Element> {
        self.inner.canvas.borrow().handle()
    }

    /// Current transform.
    #[must_use]
    pub fn transform(&self) -> CanvasTransform {
        self.inner.canvas.borrow().transform()
    }

    /// Engine detected from the user agent.
    #[must_use]
    pub fn engine(&self) -> RenderEngine {
        self.inner.canvas.borrow().engine()
    }

    /// Registers a callback receiving the new transform after every change.
    pub fn on_zoom(&self, callback: impl FnMut(CanvasTransform) + 'static) -> ListenerId {
        self.inner.canvas.borrow_mut().on_zoom(callback)
    }

    /// Replaces the configuration and rebinds the keyboard listener.
    pub fn reconfigure(&self, config: CanvasConfig) -> Result<(), WebCanvasError> {
        let timeout = {
            let mut canvas = self.inner.canvas.borrow_mut();
            canvas.reconfigure(config)?;
            canvas.config().idle_timeouts.for_engine(canvas.engine())
        };
        self.inner.idle_timeout_ms.set(timeout);
        self.inner.bind_key_listener()?;
        Ok(())
    }

    /// Runs `f` with the underlying canvas, for example to attach a scrollbar.
    pub fn with_canvas<R>(&self, f: impl FnOnce(&mut Canvas<DomProbe>) -> R) -> R {
        f(&mut self.inner.canvas.borrow_mut())
    }
}

impl Drop for WebCanvas {
    fn drop(&mut self) {
        self.inner.teardown();
    }
}
