// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input-blocking predicates.
//!
//! Widgets nested inside the canvas (scrollable lists, text editors, sliders)
//! opt out of canvas panning or wheel handling by carrying a marker, for
//! example a `data-canvas-no-wheel` attribute. The predicates here walk from
//! the event target up through its ancestors and report whether any of them
//! carries the relevant marker.

use alloc::borrow::Cow;

/// Marker attribute that opts a subtree out of wheel pan/zoom.
pub const DEFAULT_NO_WHEEL_MARKER: &str = "data-canvas-no-wheel";

/// Marker attribute that opts a subtree out of drag panning.
pub const DEFAULT_NO_PAN_MARKER: &str = "data-canvas-no-pan";

/// A node that input events can target.
///
/// Implemented by hosts for their element type (a DOM element, a widget id in
/// a retained tree, ...).
pub trait InputTarget: Sized {
    /// Returns `true` if this node itself carries `marker`.
    fn has_marker(&self, marker: &str) -> bool;

    /// Returns the parent node, if any.
    fn parent_target(&self) -> Option<Self>;
}

/// Marker names used by [`should_block_wheel`] and [`should_block_pan`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockMarkers {
    /// Marker that blocks wheel handling.
    pub wheel: Cow<'static, str>,
    /// Marker that blocks drag panning.
    pub pan: Cow<'static, str>,
}

impl Default for BlockMarkers {
    fn default() -> Self {
        Self {
            wheel: Cow::Borrowed(DEFAULT_NO_WHEEL_MARKER),
            pan: Cow::Borrowed(DEFAULT_NO_PAN_MARKER),
        }
    }
}

fn any_ancestor_marked<T: InputTarget>(target: &T, marker: &str) -> bool {
    if target.has_marker(marker) {
        return true;
    }
    let mut current = target.parent_target();
    while let Some(node) = current {
        if node.has_marker(marker) {
            return true;
        }
        current = node.parent_target();
    }
    false
}

/// Returns `true` when a wheel event on `target` must not pan or zoom the canvas.
#[must_use]
pub fn should_block_wheel<T: InputTarget>(target: &T, markers: &BlockMarkers) -> bool {
    any_ancestor_marked(target, &markers.wheel)
}

/// Returns `true` when a press on `target` must not start a drag pan.
#[must_use]
pub fn should_block_pan<T: InputTarget>(target: &T, markers: &BlockMarkers) -> bool {
    any_ancestor_marked(target, &markers.pan)
}

/// An [`InputTarget`] that never carries a marker and has no parent.
///
/// Useful for hosts that do not track targets at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoTarget;

impl InputTarget for NoTarget {
    fn has_marker(&self, _marker: &str) -> bool {
        false
    }

    fn parent_target(&self) -> Option<Self> {
        None
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::{BlockMarkers, InputTarget, NoTarget, should_block_pan, should_block_wheel};

    /// Index into a flat tree of `(parent, markers)` entries.
    #[derive(Clone, Copy)]
    struct Node<'a> {
        tree: &'a [(Option<usize>, Vec<&'static str>)],
        index: usize,
    }

    impl InputTarget for Node<'_> {
        fn has_marker(&self, marker: &str) -> bool {
            self.tree[self.index].1.iter().any(|m| *m == marker)
        }

        fn parent_target(&self) -> Option<Self> {
            self.tree[self.index].0.map(|index| Node {
                tree: self.tree,
                index,
            })
        }
    }

    #[test]
    fn marker_on_ancestor_blocks_wheel_only() {
        let tree = vec![
            (None, vec![]),
            (Some(0), vec!["data-canvas-no-wheel"]),
            (Some(1), vec![]),
        ];
        let leaf = Node {
            tree: &tree,
            index: 2,
        };
        let markers = BlockMarkers::default();
        assert!(should_block_wheel(&leaf, &markers));
        assert!(!should_block_pan(&leaf, &markers));
    }

    #[test]
    fn marker_on_target_blocks_pan() {
        let tree = vec![(None, vec![]), (Some(0), vec!["data-canvas-no-pan"])];
        let target = Node {
            tree: &tree,
            index: 1,
        };
        assert!(should_block_pan(&target, &BlockMarkers::default()));
        let root = Node {
            tree: &tree,
            index: 0,
        };
        assert!(!should_block_pan(&root, &BlockMarkers::default()));
    }

    #[test]
    fn custom_markers_are_honored() {
        let tree = vec![(None, vec!["scroll-list"])];
        let node = Node {
            tree: &tree,
            index: 0,
        };
        let markers = BlockMarkers {
            wheel: "scroll-list".into(),
            ..BlockMarkers::default()
        };
        assert!(should_block_wheel(&node, &markers));
        assert!(!should_block_wheel(&node, &BlockMarkers::default()));
    }

    #[test]
    fn no_target_never_blocks() {
        assert!(!should_block_wheel(&NoTarget, &BlockMarkers::default()));
        assert!(!should_block_pan(&NoTarget, &BlockMarkers::default()));
    }
}
