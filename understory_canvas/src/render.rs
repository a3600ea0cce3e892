// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render strategy selection and transform painting.
//!
//! WebKit mis-renders HTML content nested inside scalable vector markup once a
//! transform is applied to it. On WebKit the content is therefore placed in a
//! plain positioned layer and moved through `style.transform`; every other
//! engine gets an SVG group moved through its `transform` attribute. The
//! choice is made once, when the canvas is created.

use alloc::format;
use alloc::string::String;

use crate::transform::CanvasTransform;

/// Browser rendering engine, as far as the canvas cares.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderEngine {
    /// Chromium-based browsers.
    Blink,
    /// Firefox.
    Gecko,
    /// Safari and every browser on iOS/iPadOS.
    WebKit,
    /// Non-browser hosts or unrecognized agents.
    #[default]
    Unknown,
}

impl RenderEngine {
    /// Classifies a `navigator.userAgent` string.
    #[must_use]
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ua = user_agent;
        // All iOS browsers are WebKit regardless of branding.
        if ua.contains("iPhone") || ua.contains("iPad") || ua.contains("iPod") {
            return Self::WebKit;
        }
        if ua.contains("Firefox/") && ua.contains("Gecko/") {
            return Self::Gecko;
        }
        if ua.contains("Chrome/") || ua.contains("Chromium/") || ua.contains("Edg/") {
            return Self::Blink;
        }
        if ua.contains("AppleWebKit/") && ua.contains("Safari/") && !ua.contains("Android") {
            return Self::WebKit;
        }
        Self::Unknown
    }

    /// Strategy used to apply the canvas transform on this engine.
    #[must_use]
    pub fn render_strategy(self) -> RenderStrategy {
        match self {
            Self::WebKit => RenderStrategy::StyledLayer,
            _ => RenderStrategy::SvgGroup,
        }
    }
}

/// How the transform reaches the content layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderStrategy {
    /// Content lives in an SVG `<g>`; the transform is its `transform` attribute.
    SvgGroup,
    /// Content lives in a positioned layer; the transform is `style.transform`
    /// with `transform-origin: 0 0`.
    StyledLayer,
}

impl RenderStrategy {
    /// Formats `transform` the way this strategy applies it.
    #[must_use]
    pub fn transform_value(self, transform: CanvasTransform) -> String {
        let CanvasTransform { translate, scale } = transform;
        match self {
            Self::SvgGroup => format!("translate({}, {}) scale({})", translate.x, translate.y, scale),
            Self::StyledLayer => {
                format!("translate({}px, {}px) scale({})", translate.x, translate.y, scale)
            }
        }
    }
}

/// Host element that receives the content transform.
pub trait ContentLayer {
    /// Sets the SVG `transform` attribute.
    fn set_transform_attribute(&mut self, value: &str);

    /// Sets the CSS `transform` property (and `transform-origin: 0 0`).
    fn set_style_transform(&mut self, value: &str);
}

/// Paints the current transform onto a [`ContentLayer`] with a fixed strategy.
#[derive(Debug)]
pub struct ViewportRenderer<L> {
    strategy: RenderStrategy,
    layer: L,
    last: Option<CanvasTransform>,
}

impl<L: ContentLayer> ViewportRenderer<L> {
    /// Creates a renderer; the strategy never changes afterwards.
    pub fn new(strategy: RenderStrategy, layer: L) -> Self {
        Self {
            strategy,
            layer,
            last: None,
        }
    }

    /// Strategy chosen at construction.
    #[must_use]
    pub fn strategy(&self) -> RenderStrategy {
        self.strategy
    }

    /// Applies `transform`; repeated identical transforms are skipped.
    pub fn paint(&mut self, transform: CanvasTransform) {
        if self.last == Some(transform) {
            return;
        }
        let value = self.strategy.transform_value(transform);
        match self.strategy {
            RenderStrategy::SvgGroup => self.layer.set_transform_attribute(&value),
            RenderStrategy::StyledLayer => self.layer.set_style_transform(&value),
        }
        self.last = Some(transform);
    }

    /// Borrows the underlying layer.
    pub fn layer(&self) -> &L {
        &self.layer
    }
}
