// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The imperative API handed to the hosting application.
//!
//! A [`CanvasHandle`] is a cheap, clonable capability. It never touches the
//! transform directly: every call enqueues a request that the owning
//! [`crate::Canvas`] runs once the host is idle (or the idle timeout expires).
//! Writes through a [`ZoomHandle`] skip the idle wait and run on the next
//! animation frame. Calls made while the canvas is not mounted are dropped.

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use kurbo::Vec2;

use crate::geometry::Anchor;
use crate::transform::CanvasTransform;

/// Options for [`CanvasHandle::scroll_node_into_view`].
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollNodeOptions<N> {
    /// Node to bring into view.
    pub node: N,
    /// Where the node should end up inside the viewport.
    pub anchor: Anchor,
    /// Extra translation in view pixels.
    pub offset: Vec2,
    /// Scale to use instead of the current one.
    pub target_scale: Option<f64>,
    /// Never zoom out below the current scale.
    pub allow_scale_increase_only: bool,
    /// Upper bound on the resulting scale.
    pub max_scale: Option<f64>,
    /// Transition duration; the configured default when `None`.
    pub duration_ms: Option<f64>,
}

impl<N> ScrollNodeOptions<N> {
    /// Centers `node` at the current scale with the default duration.
    pub fn new(node: N) -> Self {
        Self {
            node,
            anchor: Anchor::CENTER,
            offset: Vec2::ZERO,
            target_scale: None,
            allow_scale_increase_only: false,
            max_scale: None,
            duration_ms: None,
        }
    }

    /// Sets the anchor.
    #[must_use]
    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Sets the pixel offset.
    #[must_use]
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the target scale.
    #[must_use]
    pub fn with_target_scale(mut self, scale: f64) -> Self {
        self.target_scale = Some(scale);
        self
    }

    /// Prevents the scale from decreasing.
    #[must_use]
    pub fn increase_scale_only(mut self) -> Self {
        self.allow_scale_increase_only = true;
        self
    }

    /// Caps the resulting scale.
    #[must_use]
    pub fn with_max_scale(mut self, scale: f64) -> Self {
        self.max_scale = Some(scale);
        self
    }

    /// Sets the transition duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// Options for [`CanvasHandle::fit_content_to_view`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FitOptions {
    /// Transition duration; the configured default when `None`.
    pub duration_ms: Option<f64>,
    /// Extra translation in view pixels.
    pub offset: Vec2,
    /// Scale to use instead of the computed fit ratio.
    pub target_scale: Option<f64>,
    /// Cap on the computed fit ratio; the configured default when `None`.
    pub max_auto_scale: Option<f64>,
    /// Keep content top-aligned even when height is the binding axis.
    pub disable_vertical_center: bool,
}

/// Options for [`CanvasHandle::scroll_content_horizontally_to_center`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HorizontalCenterOptions {
    /// Extra horizontal translation in view pixels.
    pub offset_x: f64,
    /// Transition duration; the configured default when `None`.
    pub duration_ms: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Request<N> {
    ScrollNode(ScrollNodeOptions<N>),
    Fit(FitOptions),
    CenterHorizontally(HorizontalCenterOptions),
    Set(CanvasTransform),
    TransitionTo {
        target: CanvasTransform,
        duration_ms: Option<f64>,
    },
}

impl<N> Request<N> {
    /// Direct writes run on the next frame instead of waiting for idle time.
    pub(crate) fn is_immediate(&self) -> bool {
        matches!(self, Self::Set(_) | Self::TransitionTo { .. })
    }
}

pub(crate) type Waker = Rc<dyn Fn()>;

pub(crate) struct Shared<N> {
    pub(crate) mounted: bool,
    pub(crate) transform: CanvasTransform,
    pub(crate) requests: VecDeque<Request<N>>,
    pub(crate) idle_waker: Option<Waker>,
    pub(crate) frame_waker: Option<Waker>,
}

impl<N> Shared<N> {
    pub(crate) fn new(transform: CanvasTransform) -> Self {
        Self {
            mounted: false,
            transform,
            requests: VecDeque::new(),
            idle_waker: None,
            frame_waker: None,
        }
    }
}

fn submit<N>(shared: &Rc<RefCell<Shared<N>>>, request: Request<N>) {
    let waker = {
        let mut shared = shared.borrow_mut();
        if !shared.mounted {
            tracing::trace!("canvas not mounted; request dropped");
            return;
        }
        let waker = if request.is_immediate() {
            shared.frame_waker.clone()
        } else {
            shared.idle_waker.clone()
        };
        shared.requests.push_back(request);
        waker
    };
    if let Some(wake) = waker {
        wake();
    }
}

/// Imperative API of a canvas.
pub struct CanvasHandle<N> {
    shared: Rc<RefCell<Shared<N>>>,
}

impl<N> Clone for CanvasHandle<N> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<N> fmt::Debug for CanvasHandle<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.shared.borrow();
        f.debug_struct("CanvasHandle")
            .field("mounted", &shared.mounted)
            .field("transform", &shared.transform)
            .field("pending", &shared.requests.len())
            .finish_non_exhaustive()
    }
}

impl<N> CanvasHandle<N> {
    pub(crate) fn new(shared: Rc<RefCell<Shared<N>>>) -> Self {
        Self { shared }
    }

    /// Returns `true` while the canvas is mounted.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.shared.borrow().mounted
    }

    /// Animates so that `options.node` sits at `options.anchor`.
    pub fn scroll_node_into_view(&self, options: ScrollNodeOptions<N>) {
        submit(&self.shared, Request::ScrollNode(options));
    }

    /// Animates so that `options.node` is centered; `options.anchor` is ignored.
    pub fn scroll_node_to_center(&self, options: ScrollNodeOptions<N>) {
        self.scroll_node_into_view(options.with_anchor(Anchor::CENTER));
    }

    /// Animates so that the whole content fits the viewport.
    pub fn fit_content_to_view(&self, options: FitOptions) {
        submit(&self.shared, Request::Fit(options));
    }

    /// Animates the horizontal translation so the content is centered.
    pub fn scroll_content_horizontally_to_center(&self, options: HorizontalCenterOptions) {
        submit(&self.shared, Request::CenterHorizontally(options));
    }

    /// Snapshot of the current transform plus a [`ZoomHandle`].
    ///
    /// Before mount this is a placeholder with [`CanvasTransform::ZERO`] and
    /// no zoom handle.
    #[must_use]
    pub fn viewport_state(&self) -> ViewportState<N> {
        let shared = self.shared.borrow();
        if !shared.mounted {
            return ViewportState {
                transform: CanvasTransform::ZERO,
                zoom: None,
            };
        }
        ViewportState {
            transform: shared.transform,
            zoom: Some(ZoomHandle {
                shared: self.shared.clone(),
            }),
        }
    }
}

/// Synchronous snapshot returned by [`CanvasHandle::viewport_state`].
#[derive(Debug)]
pub struct ViewportState<N> {
    /// Transform at the time of the call.
    pub transform: CanvasTransform,
    /// Direct access to the transform writer; `None` before mount.
    pub zoom: Option<ZoomHandle<N>>,
}

/// Escape hatch for callers that compute their own transforms.
///
/// Writes still go through the canvas's single writer path and are clamped
/// into the zoom limits and observed by all subscribers. They do not wait for
/// an idle period: the next [`crate::Canvas::on_frame`] applies them.
pub struct ZoomHandle<N> {
    shared: Rc<RefCell<Shared<N>>>,
}

impl<N> Clone for ZoomHandle<N> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<N> fmt::Debug for ZoomHandle<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoomHandle").finish_non_exhaustive()
    }
}

impl<N> ZoomHandle<N> {
    /// Latest transform applied by the canvas.
    ///
    /// Writes made through this handle show up after the next frame.
    #[must_use]
    pub fn transform(&self) -> CanvasTransform {
        self.shared.borrow().transform
    }

    /// Jumps to `transform`.
    pub fn set_transform(&self, transform: CanvasTransform) {
        submit(&self.shared, Request::Set(transform));
    }

    /// Animates to `transform`.
    pub fn transition_to(&self, transform: CanvasTransform, duration_ms: Option<f64>) {
        submit(
            &self.shared,
            Request::TransitionTo {
                target: transform,
                duration_ms,
            },
        );
    }
}
