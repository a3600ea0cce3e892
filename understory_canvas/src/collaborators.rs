// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contracts for the presentational components around the canvas.
//!
//! The background grid, the scrollbar and free-floating overlays are not part
//! of this crate. They read the transform through the snapshots below and,
//! for the scrollbar, feed scroll deltas back through
//! [`crate::Canvas::on_scrollbar_scroll`].

use kurbo::{Point, Size, Vec2};

use crate::transform::CanvasTransform;

/// Scrollbar widget driven by the canvas.
pub trait Scrollbar {
    /// Moves the thumb by a wheel pan delta (view pixels).
    fn apply_scroll_delta(&mut self, delta: Vec2);

    /// Returns the thumb to its resting position.
    fn reset_position(&mut self);
}

/// Inputs of the background grid renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackgroundProps {
    /// Current transform.
    pub transform: CanvasTransform,
    /// Configured maximum zoom, used to pick grid density.
    pub max_zoom: f64,
}

/// Inputs of the scrollbar widget.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollbarProps {
    /// Current scale.
    pub scale: f64,
    /// Size of the cached viewport bounds.
    pub container_size: Size,
    /// Scroll offset of the content relative to the viewport origin, in
    /// view pixels (the negated translation).
    pub offset: Vec2,
}

/// Read-only view of the transform for self-positioning overlays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlaySnapshot {
    /// Current translation.
    pub translate: Vec2,
    /// Current scale.
    pub scale: f64,
    /// Configured minimum zoom.
    pub min_zoom: f64,
    /// Configured maximum zoom.
    pub max_zoom: f64,
}

impl OverlaySnapshot {
    /// Maps a content-space point to view space.
    #[must_use]
    pub fn content_to_screen(&self, pt: Point) -> Point {
        CanvasTransform::new(self.translate, self.scale).content_to_view(pt)
    }

    /// Position of the current scale within `[min_zoom, max_zoom]`, in `[0, 1]`.
    ///
    /// Zoom sliders use this to place their handle.
    #[must_use]
    pub fn zoom_fraction(&self) -> f64 {
        let span = self.max_zoom - self.min_zoom;
        if span <= 0.0 {
            return 0.0;
        }
        ((self.scale - self.min_zoom) / span).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Vec2};

    use super::OverlaySnapshot;

    #[test]
    fn overlay_maps_points_and_reports_zoom_fraction() {
        let snap = OverlaySnapshot {
            translate: Vec2::new(10.0, 20.0),
            scale: 2.0,
            min_zoom: 1.0,
            max_zoom: 3.0,
        };
        assert_eq!(snap.content_to_screen(Point::new(5.0, 5.0)), Point::new(20.0, 30.0));
        assert_eq!(snap.zoom_fraction(), 0.5);
    }
}
