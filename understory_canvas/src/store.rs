// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The transform store: single source of truth for the canvas transform.
//!
//! Only [`crate::Canvas`] writes to the store. Every write clamps the scale
//! into the configured limits and synchronously notifies all observers before
//! returning, so a renderer, a background grid and a scrollbar all see the
//! same transform within the same input-handling turn. Observers are notified
//! in subscription order, but nothing should depend on that.

use alloc::boxed::Box;

use smallvec::SmallVec;

use crate::transform::{CanvasTransform, ZoomLimits};

/// Which writer path produced a transform change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeSource {
    /// Pointer drag.
    Drag,
    /// Wheel pan or zoom.
    Wheel,
    /// Pinch gesture.
    Pinch,
    /// Keyboard panning.
    Keyboard,
    /// Scrollbar collaborator.
    Scrollbar,
    /// A frame of an animated transition.
    Transition,
    /// A direct write through the zoom handle, or the initial transform.
    Direct,
    /// Re-clamping after the zoom limits changed.
    Limits,
}

/// Notification delivered to observers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformChange {
    /// Transform before the write.
    pub previous: CanvasTransform,
    /// Transform after the write.
    pub current: CanvasTransform,
    /// Writer path.
    pub source: ChangeSource,
}

/// Identifies an observer registered with [`TransformStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u32);

type Listener = Box<dyn FnMut(&TransformChange)>;

/// Current transform, zoom limits and observer list.
pub struct TransformStore {
    transform: CanvasTransform,
    limits: ZoomLimits,
    listeners: SmallVec<[(ListenerId, Listener); 4]>,
    next_id: u32,
    revision: u64,
}

impl core::fmt::Debug for TransformStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TransformStore")
            .field("transform", &self.transform)
            .field("limits", &self.limits)
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .field("revision", &self.revision)
            .finish()
    }
}

impl TransformStore {
    /// Creates a store holding `initial`, clamped into `limits`.
    #[must_use]
    pub fn new(initial: CanvasTransform, limits: ZoomLimits) -> Self {
        Self {
            transform: initial.clamped(limits),
            limits,
            listeners: SmallVec::new(),
            next_id: 0,
            revision: 0,
        }
    }

    /// Current transform.
    #[must_use]
    pub fn get(&self) -> CanvasTransform {
        self.transform
    }

    /// Current zoom limits.
    #[must_use]
    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    /// Number of writes that changed the transform.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Registers an observer called after every change.
    pub fn subscribe(&mut self, listener: impl FnMut(&TransformChange) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes an observer. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Number of registered observers.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Writes `transform` (scale clamped) and notifies observers.
    ///
    /// Returns `true` if the stored transform changed.
    pub(crate) fn set(&mut self, transform: CanvasTransform, source: ChangeSource) -> bool {
        let next = transform.clamped(self.limits);
        if next == self.transform {
            return false;
        }
        let change = TransformChange {
            previous: self.transform,
            current: next,
            source,
        };
        self.transform = next;
        self.revision += 1;
        for (_, listener) in &mut self.listeners {
            listener(&change);
        }
        true
    }

    /// Replaces the zoom limits and re-clamps the current scale.
    pub(crate) fn set_limits(&mut self, limits: ZoomLimits) -> bool {
        self.limits = limits;
        self.set(self.transform, ChangeSource::Limits)
    }
}
