// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for the transform math and the gesture engine.

use kurbo::{Point, Vec2};
use proptest::prelude::*;
use understory_canvas::{
    CanvasConfig, CanvasTransform, GestureEngine, GestureOptions, Modifiers, NoTarget,
    WheelInput, ZoomLimits, clamp,
};

const NONE: Option<&NoTarget> = None;

fn engine() -> GestureEngine {
    GestureEngine::new(GestureOptions::from(&CanvasConfig::default()))
}

proptest! {
    #[test]
    fn clamp_stays_in_range_and_is_idempotent(
        value in -1.0e6f64..1.0e6,
        a in -100.0f64..100.0,
        b in -100.0f64..100.0,
    ) {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        let once = clamp(value, min, max);
        prop_assert!(once >= min && once <= max);
        prop_assert_eq!(clamp(once, min, max), once);
    }

    #[test]
    fn zoom_limits_contain_every_clamped_scale(
        scale in 0.0f64..100.0,
        a in 0.01f64..10.0,
        b in 0.01f64..10.0,
    ) {
        let limits = ZoomLimits::new(a, b);
        prop_assert!(limits.contains(limits.clamp(scale)));
    }

    #[test]
    fn wheel_zoom_keeps_cursor_point_fixed(
        tx in -1000.0f64..1000.0,
        ty in -1000.0f64..1000.0,
        scale in 0.1f64..4.0,
        cx in 0.0f64..1920.0,
        cy in 0.0f64..1080.0,
        dy in -300.0f64..300.0,
    ) {
        let current = CanvasTransform::new(Vec2::new(tx, ty), scale);
        let cursor = Point::new(cx, cy);
        let wheel = WheelInput::pixels(cursor, Vec2::new(0.0, dy)).with_modifiers(Modifiers::CTRL);
        let out = engine().wheel(&wheel, NONE, current, ZoomLimits::default(), Point::ORIGIN);
        if let Some(next) = out.transform {
            let before = current.view_to_content(cursor);
            let after = next.view_to_content(cursor);
            prop_assert!((before - after).hypot() < 1e-6, "{before:?} vs {after:?}");
            prop_assert!(ZoomLimits::default().contains(next.scale));
        }
    }

    #[test]
    fn wheel_pan_moves_screen_by_delta_at_any_scale(
        scale in 0.1f64..4.0,
        dx in -500.0f64..500.0,
        dy in -500.0f64..500.0,
    ) {
        let current = CanvasTransform::new(Vec2::new(10.0, 20.0), scale);
        let wheel = WheelInput::pixels(Point::ORIGIN, Vec2::new(dx, dy));
        let out = engine().wheel(&wheel, NONE, current, ZoomLimits::default(), Point::ORIGIN);
        if let Some(next) = out.transform {
            let moved = next.translate - current.translate;
            prop_assert!((moved + Vec2::new(dx, dy)).hypot() < 1e-6);
            prop_assert_eq!(next.scale, scale);
        }
    }

    #[test]
    fn content_view_round_trip(
        tx in -1000.0f64..1000.0,
        ty in -1000.0f64..1000.0,
        scale in 0.1f64..4.0,
        x in -1.0e4f64..1.0e4,
        y in -1.0e4f64..1.0e4,
    ) {
        let t = CanvasTransform::new(Vec2::new(tx, ty), scale);
        let p = Point::new(x, y);
        let back = t.view_to_content(t.content_to_view(p));
        prop_assert!((back - p).hypot() < 1e-6);
    }
}
