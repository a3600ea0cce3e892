// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The canvas transform and its zoom range.

use kurbo::{Affine, Point, Rect, Vec2};

use crate::geometry::clamp;

/// Pan + uniform zoom applied to the canvas content.
///
/// A content-space point `p` is drawn at `p * scale + translate` in view
/// (device pixel) space, relative to the viewport origin.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CanvasTransform {
    /// Translation in view pixels.
    pub translate: Vec2,
    /// Uniform zoom factor.
    pub scale: f64,
}

impl Default for CanvasTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl CanvasTransform {
    /// No translation, scale `1.0`.
    pub const IDENTITY: Self = Self {
        translate: Vec2::ZERO,
        scale: 1.0,
    };

    /// Zero translation and zero scale.
    ///
    /// Reported by [`crate::CanvasHandle::viewport_state`] before the canvas
    /// has mounted.
    pub const ZERO: Self = Self {
        translate: Vec2::ZERO,
        scale: 0.0,
    };

    /// Creates a transform from its parts.
    #[must_use]
    pub const fn new(translate: Vec2, scale: f64) -> Self {
        Self { translate, scale }
    }

    /// Returns the equivalent kurbo affine (`translate * scale`).
    #[must_use]
    pub fn to_affine(self) -> Affine {
        Affine::translate(self.translate) * Affine::scale(self.scale)
    }

    /// Maps a content-space point into view space.
    #[must_use]
    pub fn content_to_view(self, pt: Point) -> Point {
        (pt.to_vec2() * self.scale + self.translate).to_point()
    }

    /// Maps a view-space point back into content space.
    ///
    /// Returns the point unchanged when the scale is zero.
    #[must_use]
    pub fn view_to_content(self, pt: Point) -> Point {
        if self.scale == 0.0 {
            return pt;
        }
        ((pt.to_vec2() - self.translate) / self.scale).to_point()
    }

    /// Maps a view-space rectangle into content space.
    #[must_use]
    pub fn view_to_content_rect(self, rect: Rect) -> Rect {
        Rect::from_points(
            self.view_to_content(rect.origin()),
            self.view_to_content(Point::new(rect.x1, rect.y1)),
        )
    }

    /// Returns this transform with its scale clamped into `limits`.
    #[must_use]
    pub fn clamped(self, limits: ZoomLimits) -> Self {
        Self {
            translate: self.translate,
            scale: limits.clamp(self.scale),
        }
    }

    /// Pans by a delta expressed in content units.
    ///
    /// The view moves by `delta * scale` pixels.
    #[must_use]
    pub fn translate_by_content(self, delta: Vec2) -> Self {
        Self {
            translate: self.translate + delta * self.scale,
            scale: self.scale,
        }
    }

    /// Pans by a delta expressed in view pixels.
    #[must_use]
    pub fn translate_by_view(self, delta: Vec2) -> Self {
        Self {
            translate: self.translate + delta,
            scale: self.scale,
        }
    }

    /// Rescales to `new_scale` while keeping `anchor` (view space) fixed.
    ///
    /// The content point under `anchor` before the call is still under
    /// `anchor` afterwards. A non-positive current scale leaves the
    /// translation untouched.
    #[must_use]
    pub fn scale_about(self, anchor: Point, new_scale: f64) -> Self {
        if self.scale <= 0.0 {
            return Self {
                translate: self.translate,
                scale: new_scale,
            };
        }
        let ratio = new_scale / self.scale;
        let anchor = anchor.to_vec2();
        Self {
            translate: anchor - (anchor - self.translate) * ratio,
            scale: new_scale,
        }
    }

    /// Linear interpolation between `self` and `other` at `t`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            translate: self.translate.lerp(other.translate, t),
            scale: self.scale + (other.scale - self.scale) * t,
        }
    }

    /// Returns `true` if both transforms agree within `eps` on every component.
    #[must_use]
    pub fn approx_eq(self, other: Self, eps: f64) -> bool {
        (self.translate.x - other.translate.x).abs() <= eps
            && (self.translate.y - other.translate.y).abs() <= eps
            && (self.scale - other.scale).abs() <= eps
    }
}

/// Inclusive zoom range.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoomLimits {
    min: f64,
    max: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MIN_ZOOM, crate::config::DEFAULT_MAX_ZOOM)
    }
}

impl ZoomLimits {
    /// Creates a zoom range, swapping the bounds if they are reversed.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Lower bound.
    #[must_use]
    pub fn min(self) -> f64 {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub fn max(self) -> f64 {
        self.max
    }

    /// Clamps `scale` into the range.
    #[must_use]
    pub fn clamp(self, scale: f64) -> f64 {
        clamp(scale, self.min, self.max)
    }

    /// Returns `true` if `scale` lies inside the range.
    #[must_use]
    pub fn contains(self, scale: f64) -> bool {
        scale >= self.min && scale <= self.max
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect, Vec2};

    use super::{CanvasTransform, ZoomLimits};

    #[test]
    fn content_view_roundtrip() {
        let t = CanvasTransform::new(Vec2::new(30.0, -12.0), 2.5);
        let p = Point::new(7.0, 11.0);
        let back = t.view_to_content(t.content_to_view(p));
        assert!((back.x - p.x).abs() < 1e-9, "x drifted: {back:?}");
        assert!((back.y - p.y).abs() < 1e-9, "y drifted: {back:?}");
    }

    #[test]
    fn affine_matches_content_to_view() {
        let t = CanvasTransform::new(Vec2::new(5.0, 9.0), 0.5);
        let p = Point::new(100.0, -40.0);
        assert_eq!(t.to_affine() * p, t.content_to_view(p));
    }

    #[test]
    fn scale_about_keeps_anchor_fixed() {
        let t = CanvasTransform::new(Vec2::new(40.0, 25.0), 1.25);
        let anchor = Point::new(320.0, 180.0);
        let before = t.view_to_content(anchor);
        let after = t.scale_about(anchor, 3.0).view_to_content(anchor);
        assert!((before - after).hypot() < 1e-9, "anchor moved");
    }

    #[test]
    fn content_pan_is_scaled_into_view_pixels() {
        let t = CanvasTransform::new(Vec2::ZERO, 2.0);
        let moved = t.translate_by_content(Vec2::new(-10.0, 5.0));
        assert_eq!(moved.translate, Vec2::new(-20.0, 10.0));
    }

    #[test]
    fn view_rect_maps_to_content_rect() {
        let t = CanvasTransform::new(Vec2::new(100.0, 50.0), 2.0);
        let r = t.view_to_content_rect(Rect::new(100.0, 50.0, 300.0, 250.0));
        assert_eq!(r, Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn zoom_limits_normalize_and_clamp() {
        let limits = ZoomLimits::new(4.0, 0.1);
        assert_eq!(limits.min(), 0.1);
        assert_eq!(limits.max(), 4.0);
        assert_eq!(limits.clamp(10.0), 4.0);
        assert_eq!(limits.clamp(0.01), 0.1);
        assert!(limits.contains(1.0));
    }

    #[test]
    fn lerp_hits_endpoints() {
        let a = CanvasTransform::IDENTITY;
        let b = CanvasTransform::new(Vec2::new(10.0, 20.0), 3.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert!(a.lerp(b, 1.0).approx_eq(b, 1e-12));
        assert!(a.lerp(b, 0.5).approx_eq(CanvasTransform::new(Vec2::new(5.0, 10.0), 2.0), 1e-12));
    }
}
