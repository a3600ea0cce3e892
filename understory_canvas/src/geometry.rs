// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pure helpers that turn measured bounds into target transforms.
//!
//! All rectangles passed to these functions are *view-space* measurements,
//! the way a host reports them (for example `getBoundingClientRect` in a
//! browser). Content measurements are therefore already scaled by the current
//! transform; each helper converts them back into content units before
//! applying the target scale.

use kurbo::{Rect, Vec2};

use crate::transform::{CanvasTransform, ZoomLimits};

/// Bounds `value` to `[min, max]`.
///
/// Total for any finite bounds with `min <= max`; a NaN `value` yields `min`.
#[must_use]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.max(min).min(max)
}

/// Alignment of one axis of an [`Anchor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AxisAlign {
    /// Left or top edge.
    Start,
    /// Center line.
    #[default]
    Center,
    /// Right or bottom edge.
    End,
}

impl AxisAlign {
    /// Fraction of the extent at which this alignment sits (`0`, `0.5`, `1`).
    #[must_use]
    pub fn fraction(self) -> f64 {
        match self {
            Self::Start => 0.0,
            Self::Center => 0.5,
            Self::End => 1.0,
        }
    }
}

/// One of the nine named alignments used to position a node in the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Anchor {
    /// Horizontal alignment.
    pub x: AxisAlign,
    /// Vertical alignment.
    pub y: AxisAlign,
}

impl Anchor {
    /// Top-left corner.
    pub const TOP_LEFT: Self = Self::new(AxisAlign::Start, AxisAlign::Start);
    /// Center of the top edge.
    pub const TOP_CENTER: Self = Self::new(AxisAlign::Center, AxisAlign::Start);
    /// Top-right corner.
    pub const TOP_RIGHT: Self = Self::new(AxisAlign::End, AxisAlign::Start);
    /// Center of the left edge.
    pub const CENTER_LEFT: Self = Self::new(AxisAlign::Start, AxisAlign::Center);
    /// Center.
    pub const CENTER: Self = Self::new(AxisAlign::Center, AxisAlign::Center);
    /// Center of the right edge.
    pub const CENTER_RIGHT: Self = Self::new(AxisAlign::End, AxisAlign::Center);
    /// Bottom-left corner.
    pub const BOTTOM_LEFT: Self = Self::new(AxisAlign::Start, AxisAlign::End);
    /// Center of the bottom edge.
    pub const BOTTOM_CENTER: Self = Self::new(AxisAlign::Center, AxisAlign::End);
    /// Bottom-right corner.
    pub const BOTTOM_RIGHT: Self = Self::new(AxisAlign::End, AxisAlign::End);

    /// Creates an anchor from per-axis alignments.
    #[must_use]
    pub const fn new(x: AxisAlign, y: AxisAlign) -> Self {
        Self { x, y }
    }
}

/// Converts a view-space measurement into content units under `current`.
///
/// `container` is the viewport rectangle in the same coordinate space as
/// `measured`; its origin is where content translate `(0, 0)` lands.
#[must_use]
pub fn content_rect(container: Rect, measured: Rect, current: CanvasTransform) -> Rect {
    current.view_to_content_rect(measured - container.origin().to_vec2())
}

/// Computes the transform that aligns `node` with `container` at `anchor`.
///
/// `node` and `container` are view-space measurements taken under `current`.
/// The returned transform uses `target_scale` and has `offset` (view pixels)
/// added to its translation.
#[must_use]
pub fn anchored_transform(
    anchor: Anchor,
    container: Rect,
    node: Rect,
    current: CanvasTransform,
    target_scale: f64,
    offset: Vec2,
) -> CanvasTransform {
    let local = content_rect(container, node, current);
    let fx = anchor.x.fraction();
    let fy = anchor.y.fraction();
    // Point of the node (content units) that must land on the matching point
    // of the container (view pixels).
    let node_x = local.x0 + local.width() * fx;
    let node_y = local.y0 + local.height() * fy;
    let view_x = container.width() * fx;
    let view_y = container.height() * fy;
    CanvasTransform::new(
        Vec2::new(view_x - node_x * target_scale, view_y - node_y * target_scale) + offset,
        target_scale,
    )
}

/// Parameters for [`fit_transform`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitParams {
    /// Explicit scale to use instead of the computed fit ratio.
    pub target_scale: Option<f64>,
    /// Upper bound applied to the computed fit ratio.
    pub max_auto_scale: f64,
    /// Extra translation in view pixels.
    pub offset: Vec2,
    /// Keep the content top-aligned even when height is the binding axis.
    pub disable_vertical_center: bool,
}

/// Computes the transform that fits `content` into `container`.
///
/// The scale is the smaller of the two axis ratios (the binding axis) capped
/// at `max_auto_scale`, or `target_scale` when given, clamped into `limits`. Content is always centered
/// horizontally; it is centered vertically only when height is the binding
/// axis, otherwise its top edge aligns with the container's.
///
/// Returns `None` when either rectangle is empty.
#[must_use]
pub fn fit_transform(
    container: Rect,
    content: Rect,
    current: CanvasTransform,
    params: FitParams,
    limits: ZoomLimits,
) -> Option<CanvasTransform> {
    let local = content_rect(container, content, current);
    if local.width() <= 0.0 || local.height() <= 0.0 {
        return None;
    }
    if container.width() <= 0.0 || container.height() <= 0.0 {
        return None;
    }
    let ratio_w = container.width() / local.width();
    let ratio_h = container.height() / local.height();
    let height_binds = ratio_h <= ratio_w;
    let scale = match params.target_scale {
        Some(scale) => scale,
        None => ratio_h.min(ratio_w).min(params.max_auto_scale),
    };
    let scale = limits.clamp(scale);

    let tx = (container.width() - local.width() * scale) / 2.0 - local.x0 * scale;
    let ty = if height_binds && !params.disable_vertical_center {
        (container.height() - local.height() * scale) / 2.0 - local.y0 * scale
    } else {
        -local.y0 * scale
    };
    Some(CanvasTransform::new(Vec2::new(tx, ty) + params.offset, scale))
}

/// Recenters `content` horizontally, keeping the vertical translation and scale.
///
/// Returns `None` when the content has no width.
#[must_use]
pub fn horizontal_center_transform(
    container: Rect,
    content: Rect,
    current: CanvasTransform,
    offset_x: f64,
) -> Option<CanvasTransform> {
    let local = content_rect(container, content, current);
    if local.width() <= 0.0 {
        return None;
    }
    let scale = current.scale;
    let tx = (container.width() - local.width() * scale) / 2.0 - local.x0 * scale + offset_x;
    Some(CanvasTransform::new(
        Vec2::new(tx, current.translate.y),
        scale,
    ))
}
