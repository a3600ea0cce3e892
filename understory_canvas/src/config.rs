// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canvas options, their defaults and validation.

use core::fmt;

use crate::filter::BlockMarkers;
use crate::input::Modifiers;
use crate::render::RenderEngine;
use crate::transform::{CanvasTransform, ZoomLimits};

/// Default lower zoom bound.
pub const DEFAULT_MIN_ZOOM: f64 = 0.1;
/// Default upper zoom bound.
pub const DEFAULT_MAX_ZOOM: f64 = 4.0;
/// Default wheel-to-zoom sensitivity (exponent per pixel of wheel delta).
pub const DEFAULT_ZOOM_SCALE: f64 = 0.002;
/// Default keyboard pan step, in view pixels.
pub const DEFAULT_ARROW_KEY_PAN_STEP: f64 = 10.0;
/// Default duration of animated transitions, in milliseconds.
pub const DEFAULT_TRANSITION_MS: f64 = 300.0;
/// Default cap on the scale chosen by fit-to-view.
pub const DEFAULT_MAX_AUTO_SCALE: f64 = 1.0;

/// How long a deferred request may wait for the host to go idle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdleTimeouts {
    /// Timeout on engines with accelerated transforms, in milliseconds.
    pub default_ms: f64,
    /// Timeout on WebKit, in milliseconds.
    pub webkit_ms: f64,
}

impl Default for IdleTimeouts {
    fn default() -> Self {
        Self {
            default_ms: 100.0,
            webkit_ms: 300.0,
        }
    }
}

impl IdleTimeouts {
    /// Timeout to use for `engine`.
    #[must_use]
    pub fn for_engine(self, engine: RenderEngine) -> f64 {
        match engine {
            RenderEngine::WebKit => self.webkit_ms,
            _ => self.default_ms,
        }
    }
}

/// Canvas configuration.
///
/// Every field has a default; use the `with_*` builders to override the ones
/// you care about and [`CanvasConfig::validate`] to check user-provided values.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CanvasConfig {
    /// Lower zoom bound.
    pub min_zoom: f64,
    /// Upper zoom bound.
    pub max_zoom: f64,
    /// Wheel without a zoom modifier pans instead of zooming.
    pub pan_on_scroll: bool,
    /// Flip the wheel pan direction.
    pub invert_scroll: bool,
    /// Wheel-to-zoom sensitivity: scale is multiplied by `2^(-delta_y * zoom_scale)`.
    pub zoom_scale: f64,
    /// Pan with arrow keys and `h/j/k/l`.
    pub enable_arrow_key_pan: bool,
    /// Keyboard pan step in view pixels.
    pub arrow_key_pan_step: f64,
    /// Transform applied at mount.
    pub initial_transform: CanvasTransform,
    /// Modifiers that turn a wheel event into a zoom.
    pub zoom_modifiers: Modifiers,
    /// Markers that opt subtrees out of wheel or drag handling.
    pub block_markers: BlockMarkers,
    /// Transition duration used when a request does not name one.
    pub default_duration_ms: f64,
    /// Cap on the scale chosen by fit-to-view.
    pub max_auto_scale: f64,
    /// Idle-queue timeouts.
    pub idle_timeouts: IdleTimeouts,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            pan_on_scroll: true,
            invert_scroll: false,
            zoom_scale: DEFAULT_ZOOM_SCALE,
            enable_arrow_key_pan: false,
            arrow_key_pan_step: DEFAULT_ARROW_KEY_PAN_STEP,
            initial_transform: CanvasTransform::IDENTITY,
            zoom_modifiers: Modifiers::CTRL | Modifiers::META,
            block_markers: BlockMarkers::default(),
            default_duration_ms: DEFAULT_TRANSITION_MS,
            max_auto_scale: DEFAULT_MAX_AUTO_SCALE,
            idle_timeouts: IdleTimeouts::default(),
        }
    }
}

impl CanvasConfig {
    /// Sets the zoom bounds.
    #[must_use]
    pub fn with_zoom_limits(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    /// Sets whether the plain wheel pans.
    #[must_use]
    pub fn with_pan_on_scroll(mut self, pan_on_scroll: bool) -> Self {
        self.pan_on_scroll = pan_on_scroll;
        self
    }

    /// Sets whether the wheel pan direction is flipped.
    #[must_use]
    pub fn with_invert_scroll(mut self, invert_scroll: bool) -> Self {
        self.invert_scroll = invert_scroll;
        self
    }

    /// Sets the wheel-to-zoom sensitivity.
    #[must_use]
    pub fn with_zoom_scale(mut self, zoom_scale: f64) -> Self {
        self.zoom_scale = zoom_scale;
        self
    }

    /// Enables keyboard panning with the given step.
    #[must_use]
    pub fn with_arrow_key_pan(mut self, step: f64) -> Self {
        self.enable_arrow_key_pan = true;
        self.arrow_key_pan_step = step;
        self
    }

    /// Sets the transform applied at mount.
    #[must_use]
    pub fn with_initial_transform(mut self, transform: CanvasTransform) -> Self {
        self.initial_transform = transform;
        self
    }

    /// Sets the modifiers that turn a wheel event into a zoom.
    #[must_use]
    pub fn with_zoom_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.zoom_modifiers = modifiers;
        self
    }

    /// Sets the block markers.
    #[must_use]
    pub fn with_block_markers(mut self, markers: BlockMarkers) -> Self {
        self.block_markers = markers;
        self
    }

    /// Sets how long deferred requests may wait for an idle period.
    #[must_use]
    pub fn with_idle_timeouts(mut self, timeouts: IdleTimeouts) -> Self {
        self.idle_timeouts = timeouts;
        self
    }

    /// Zoom bounds as a [`ZoomLimits`].
    #[must_use]
    pub fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits::new(self.min_zoom, self.max_zoom)
    }

    /// Checks that the numeric fields are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("min_zoom", self.min_zoom), ("max_zoom", self.max_zoom)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidZoomBound { field, value });
            }
        }
        if self.min_zoom > self.max_zoom {
            return Err(ConfigError::InvertedZoomLimits {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        if !self.zoom_scale.is_finite() {
            return Err(ConfigError::NonFinite { field: "zoom_scale" });
        }
        if !self.arrow_key_pan_step.is_finite() || self.arrow_key_pan_step < 0.0 {
            return Err(ConfigError::Negative {
                field: "arrow_key_pan_step",
            });
        }
        if !self.default_duration_ms.is_finite() || self.default_duration_ms < 0.0 {
            return Err(ConfigError::Negative {
                field: "default_duration_ms",
            });
        }
        if !self.max_auto_scale.is_finite() || self.max_auto_scale <= 0.0 {
            return Err(ConfigError::Negative {
                field: "max_auto_scale",
            });
        }
        for (field, value) in [
            ("idle_timeouts.default_ms", self.idle_timeouts.default_ms),
            ("idle_timeouts.webkit_ms", self.idle_timeouts.webkit_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Negative { field });
            }
        }
        Ok(())
    }
}

/// Rejected configuration value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// A zoom bound is not a positive finite number.
    InvalidZoomBound {
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
    /// `min_zoom` is greater than `max_zoom`.
    InvertedZoomLimits {
        /// Configured lower bound.
        min: f64,
        /// Configured upper bound.
        max: f64,
    },
    /// A field must be finite.
    NonFinite {
        /// Field name.
        field: &'static str,
    },
    /// A field must be finite and not negative.
    Negative {
        /// Field name.
        field: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidZoomBound { field, value } => {
                write!(f, "{field} must be a positive finite number, got {value}")
            }
            Self::InvertedZoomLimits { min, max } => {
                write!(f, "min_zoom ({min}) is greater than max_zoom ({max})")
            }
            Self::NonFinite { field } => write!(f, "{field} must be finite"),
            Self::Negative { field } => write!(f, "{field} must be finite and not negative"),
        }
    }
}

impl core::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::{CanvasConfig, ConfigError, IdleTimeouts};
    use crate::render::RenderEngine;

    #[test]
    fn defaults_validate() {
        let config = CanvasConfig::default();
        assert_eq!(config.min_zoom, 0.1);
        assert_eq!(config.max_zoom, 4.0);
        assert!(config.pan_on_scroll);
        assert!(!config.invert_scroll);
        assert!(!config.enable_arrow_key_pan);
        assert_eq!(config.arrow_key_pan_step, 10.0);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn inverted_limits_are_rejected() {
        let config = CanvasConfig::default().with_zoom_limits(3.0, 1.0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvertedZoomLimits { min: 3.0, max: 1.0 })
        );
    }

    #[test]
    fn non_positive_bound_is_rejected_with_message() {
        let config = CanvasConfig::default().with_zoom_limits(0.0, 1.0);
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "min_zoom must be a positive finite number, got 0"
        );
    }

    #[test]
    fn negative_step_is_rejected() {
        let config = CanvasConfig::default().with_arrow_key_pan(-1.0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::Negative {
                field: "arrow_key_pan_step"
            })
        );
    }

    #[test]
    fn unusable_idle_timeouts_are_rejected() {
        let nan = CanvasConfig::default().with_idle_timeouts(IdleTimeouts {
            default_ms: f64::NAN,
            webkit_ms: 300.0,
        });
        assert_eq!(
            nan.validate(),
            Err(ConfigError::Negative {
                field: "idle_timeouts.default_ms"
            })
        );
        let negative = CanvasConfig::default().with_idle_timeouts(IdleTimeouts {
            default_ms: 100.0,
            webkit_ms: -1.0,
        });
        assert_eq!(
            negative.validate(),
            Err(ConfigError::Negative {
                field: "idle_timeouts.webkit_ms"
            })
        );
        let zero = CanvasConfig::default().with_idle_timeouts(IdleTimeouts {
            default_ms: 0.0,
            webkit_ms: 0.0,
        });
        assert_eq!(zero.validate(), Ok(()));
    }

    #[test]
    fn webkit_waits_longer() {
        let timeouts = IdleTimeouts::default();
        assert!(timeouts.for_engine(RenderEngine::WebKit) > timeouts.for_engine(RenderEngine::Blink));
    }
}
