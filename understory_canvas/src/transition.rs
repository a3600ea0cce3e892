// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timed interpolation between two transforms.

use crate::transform::CanvasTransform;

/// Cubic ease-in-out on `t` in `[0, 1]`.
#[must_use]
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

/// An in-flight animated transition.
///
/// Timestamps are host milliseconds (for example the `requestAnimationFrame`
/// timestamp). The first sample at or after `start_ms + duration_ms` yields the
/// exact target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    from: CanvasTransform,
    to: CanvasTransform,
    start_ms: f64,
    duration_ms: f64,
}

/// One step of a [`Transition`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionSample {
    /// Interpolated transform.
    pub transform: CanvasTransform,
    /// `true` once the target has been reached.
    pub finished: bool,
}

impl Transition {
    /// Starts a transition from `from` to `to` at `start_ms`.
    #[must_use]
    pub fn new(from: CanvasTransform, to: CanvasTransform, start_ms: f64, duration_ms: f64) -> Self {
        Self {
            from,
            to,
            start_ms,
            duration_ms: duration_ms.max(0.0),
        }
    }

    /// Target transform.
    #[must_use]
    pub fn target(&self) -> CanvasTransform {
        self.to
    }

    /// Samples the transition at `now_ms`.
    #[must_use]
    pub fn sample(&self, now_ms: f64) -> TransitionSample {
        if self.duration_ms <= 0.0 {
            return TransitionSample {
                transform: self.to,
                finished: true,
            };
        }
        let t = (now_ms - self.start_ms) / self.duration_ms;
        if t >= 1.0 {
            return TransitionSample {
                transform: self.to,
                finished: true,
            };
        }
        TransitionSample {
            transform: self.from.lerp(self.to, ease_cubic_in_out(t)),
            finished: false,
        }
    }
}
