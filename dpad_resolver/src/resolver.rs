// Copyright 2025 the Dpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Level-by-level directional resolution.

use alloc::vec::Vec;

use dpad_focus_tree::{FocusFlags, FocusTree, NodeId};
use kurbo::Rect;

use crate::descend::descend;
use crate::{DefaultPolicy, Direction, FocusEntry, FocusPolicy, FocusSpace};

/// Resolves directional presses against a [`FocusTree`].
///
/// ## Algorithm
///
/// 1. Start with the focused node as the *level node*.
/// 2. Build a [`FocusSpace`] from the level node and its siblings. Siblings
///    are enabled only if [`descend`] finds a target inside them. A node
///    without a layout box takes the union of its measured descendants'
///    boxes; only subtrees with nothing measured are left unplaced. The
///    level node falls back to the focused node's layout last.
/// 3. Ask the policy for the next node at this level. If it finds one,
///    descend into it and return the target.
/// 4. Otherwise, unless the parent is a focus boundary or the root, make the
///    parent the level node and repeat.
///
/// A `None` result is a normal miss: the caller keeps the current focus.
#[derive(Clone, Debug, Default)]
pub struct Resolver<P = DefaultPolicy> {
    policy: P,
}

impl Resolver {
    /// Create a resolver using [`DefaultPolicy`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: FocusPolicy<NodeId>> Resolver<P> {
    /// Create a resolver with a custom per-level policy.
    pub fn with_policy(policy: P) -> Self {
        Self { policy }
    }

    /// The per-level policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// The node that should receive focus after pressing `direction` while
    /// `current` is focused, or `None` if nothing qualifies at any level.
    pub fn resolve(&self, tree: &FocusTree, current: NodeId, direction: Direction) -> Option<NodeId> {
        if !tree.is_linked(current) {
            return None;
        }
        let focused_rect = tree.layout(current);
        let mut level = current;
        loop {
            let parent = tree.parent_of(level)?;
            let entries = level_entries(tree, parent, level, focused_rect);
            let space = FocusSpace { nodes: &entries };
            if let Some(next) = self.policy.next(level, direction, &space) {
                return descend(tree, next);
            }
            if tree.flags(parent).contains(FocusFlags::FOCUS_BOUNDARY) {
                return None;
            }
            level = parent;
        }
    }
}

fn level_entries(
    tree: &FocusTree,
    parent: NodeId,
    level: NodeId,
    focused_rect: Option<Rect>,
) -> Vec<FocusEntry<NodeId>> {
    tree.children_of(parent)
        .iter()
        .enumerate()
        .map(|(order, &id)| {
            if id == level {
                FocusEntry {
                    id,
                    rect: measured_bounds(tree, id).or(focused_rect),
                    order,
                    enabled: true,
                }
            } else {
                FocusEntry {
                    id,
                    rect: measured_bounds(tree, id),
                    order,
                    enabled: descend(tree, id).is_some(),
                }
            }
        })
        .collect()
}

/// The node's own box, or the union of the boxes found below it.
fn measured_bounds(tree: &FocusTree, id: NodeId) -> Option<Rect> {
    tree.layout(id).or_else(|| {
        tree.children_of(id)
            .iter()
            .filter_map(|&child| measured_bounds(tree, child))
            .reduce(|a, b| a.union(b))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpad_focus_tree::{FocusKey, FocusProps};

    fn key(k: &str) -> FocusKey {
        FocusKey::from(k)
    }

    fn boxed(tree: &mut FocusTree, k: &str, x: f64, y: f64, w: f64, h: f64) {
        tree.update_layout(k, Rect::new(x, y, x + w, y + h)).unwrap();
    }

    /// Root with two focusable leaves side by side.
    #[test]
    fn two_tiles_right_then_miss() {
        let mut tree = FocusTree::new();
        let a = tree.register(key("A"), None, FocusProps::leaf()).unwrap();
        let b = tree.register(key("B"), None, FocusProps::leaf()).unwrap();
        boxed(&mut tree, "A", 0.0, 0.0, 80.0, 80.0);
        boxed(&mut tree, "B", 100.0, 0.0, 80.0, 80.0);

        let resolver = Resolver::new();
        assert_eq!(resolver.resolve(&tree, a, Direction::Right), Some(b));
        assert_eq!(resolver.resolve(&tree, b, Direction::Right), None);
        assert_eq!(resolver.resolve(&tree, b, Direction::Left), Some(a));
        assert_eq!(resolver.resolve(&tree, a, Direction::Up), None);
    }

    /// Two rows of tiles; pressing down leaves the first row and enters the second.
    fn two_rows(save_last: bool) -> FocusTree {
        let mut tree = FocusTree::new();
        let row_props = if save_last {
            FocusProps::container().with(FocusFlags::SAVE_LAST_FOCUSED_CHILD)
        } else {
            FocusProps::container()
        };
        for (r, row) in ["row0", "row1"].into_iter().enumerate() {
            tree.register(key(row), None, row_props.clone()).unwrap();
            let y = r as f64 * 100.0;
            boxed(&mut tree, row, 0.0, y, 400.0, 80.0);
            for c in 0..4 {
                let tile = alloc::format!("{row}-{c}");
                tree.register(key(&tile), Some(key(row)), FocusProps::leaf())
                    .unwrap();
                boxed(&mut tree, &tile, c as f64 * 100.0, y, 80.0, 80.0);
            }
        }
        tree
    }

    #[test]
    fn climbs_to_parent_siblings_and_descends() {
        let tree = two_rows(false);
        let resolver = Resolver::new();
        let from = tree.id_of("row0-2").unwrap();

        // No sibling tile lies below; the rows are siblings one level up.
        // Descent enters row1 at its first child.
        assert_eq!(
            resolver.resolve(&tree, from, Direction::Down),
            tree.id_of("row1-0")
        );
        assert_eq!(
            resolver.resolve(&tree, from, Direction::Right),
            tree.id_of("row0-3")
        );
        assert_eq!(resolver.resolve(&tree, from, Direction::Up), None);
    }

    #[test]
    fn descent_restores_saved_child() {
        let mut tree = two_rows(true);
        let resolver = Resolver::new();
        let saved = tree.id_of("row1-2").unwrap();
        tree.update_focus_memory(None, Some(saved));

        let from = tree.id_of("row0-0").unwrap();
        assert_eq!(resolver.resolve(&tree, from, Direction::Down), Some(saved));
    }

    #[test]
    fn boundary_stops_escape() {
        let mut tree = two_rows(false);
        tree.set_flags(
            "row0",
            FocusFlags::AUTO_RESTORE_FOCUS | FocusFlags::FOCUS_BOUNDARY,
        )
        .unwrap();
        let resolver = Resolver::new();
        let from = tree.id_of("row0-2").unwrap();
        assert_eq!(resolver.resolve(&tree, from, Direction::Down), None);
        // Movement inside the boundary still works.
        assert_eq!(
            resolver.resolve(&tree, from, Direction::Left),
            tree.id_of("row0-1")
        );
    }

    #[test]
    fn skips_siblings_without_focus_targets() {
        let mut tree = FocusTree::new();
        let a = tree.register(key("a"), None, FocusProps::leaf()).unwrap();
        tree.register(key("disabled"), None, FocusProps::leaf().without(FocusFlags::FOCUSABLE))
            .unwrap();
        tree.register(key("empty"), None, FocusProps::container())
            .unwrap();
        let c = tree.register(key("c"), None, FocusProps::leaf()).unwrap();
        boxed(&mut tree, "a", 0.0, 0.0, 50.0, 50.0);
        boxed(&mut tree, "disabled", 60.0, 0.0, 50.0, 50.0);
        boxed(&mut tree, "empty", 120.0, 0.0, 50.0, 50.0);
        boxed(&mut tree, "c", 180.0, 0.0, 50.0, 50.0);

        assert_eq!(Resolver::new().resolve(&tree, a, Direction::Right), Some(c));
    }

    #[test]
    fn unmeasured_tree_navigates_in_document_order() {
        let mut tree = FocusTree::new();
        let a = tree.register(key("a"), None, FocusProps::leaf()).unwrap();
        let b = tree.register(key("b"), None, FocusProps::leaf()).unwrap();
        let c = tree.register(key("c"), None, FocusProps::leaf()).unwrap();
        let resolver = Resolver::new();

        assert_eq!(resolver.resolve(&tree, a, Direction::Right), Some(b));
        assert_eq!(resolver.resolve(&tree, b, Direction::Down), Some(c));
        assert_eq!(resolver.resolve(&tree, c, Direction::Right), None);
        assert_eq!(resolver.resolve(&tree, c, Direction::Up), Some(b));
    }

    #[test]
    fn unmeasured_container_uses_focused_box() {
        let mut tree = FocusTree::new();
        tree.register(key("row"), None, FocusProps::container())
            .unwrap();
        let inner = tree
            .register(key("inner"), Some(key("row")), FocusProps::leaf())
            .unwrap();
        let side = tree.register(key("side"), None, FocusProps::leaf()).unwrap();
        // `row` is never measured; the focused tile's box stands in for it.
        boxed(&mut tree, "inner", 200.0, 0.0, 50.0, 50.0);
        boxed(&mut tree, "side", 0.0, 0.0, 50.0, 50.0);

        let resolver = Resolver::new();
        assert_eq!(resolver.resolve(&tree, inner, Direction::Left), Some(side));
        assert_eq!(resolver.resolve(&tree, inner, Direction::Right), None);
    }

    /// Rows are never measured; only their tiles report boxes.
    #[test]
    fn unmeasured_rows_take_their_tiles_bounds() {
        let mut tree = FocusTree::new();
        for (r, row) in ["row0", "row1"].into_iter().enumerate() {
            tree.register(key(row), None, FocusProps::container())
                .unwrap();
            for c in 0..2 {
                let tile = alloc::format!("{row}-{c}");
                tree.register(key(&tile), Some(key(row)), FocusProps::leaf())
                    .unwrap();
                boxed(&mut tree, &tile, c as f64 * 100.0, r as f64 * 100.0, 80.0, 80.0);
            }
        }
        let resolver = Resolver::new();
        let id = |k: &str| tree.id_of(k).unwrap();

        // The end of a row is a miss, not a jump to the next row.
        assert_eq!(resolver.resolve(&tree, id("row0-1"), Direction::Right), None);
        assert_eq!(resolver.resolve(&tree, id("row1-0"), Direction::Left), None);
        // Vertical moves still cross rows by geometry.
        assert_eq!(
            resolver.resolve(&tree, id("row0-1"), Direction::Down),
            Some(id("row1-0"))
        );
        assert_eq!(
            resolver.resolve(&tree, id("row1-1"), Direction::Up),
            Some(id("row0-0"))
        );
    }

    #[test]
    fn measured_bounds_unions_nested_descendants() {
        let mut tree = FocusTree::new();
        let page = tree.register(key("page"), None, FocusProps::container())
            .unwrap();
        tree.register(key("row"), Some(key("page")), FocusProps::container())
            .unwrap();
        tree.register(key("a"), Some(key("row")), FocusProps::leaf())
            .unwrap();
        tree.register(key("b"), Some(key("row")), FocusProps::leaf())
            .unwrap();
        let empty = tree.register(key("empty"), None, FocusProps::container())
            .unwrap();
        boxed(&mut tree, "a", 0.0, 0.0, 10.0, 10.0);
        boxed(&mut tree, "b", 50.0, 20.0, 10.0, 10.0);

        assert_eq!(measured_bounds(&tree, page), Some(Rect::new(0.0, 0.0, 60.0, 30.0)));
        assert_eq!(measured_bounds(&tree, empty), None);
    }

    #[test]
    fn pending_or_stale_origin_resolves_nothing() {
        let mut tree = FocusTree::new();
        let waiting = tree
            .register(key("w"), Some(key("later")), FocusProps::leaf())
            .unwrap();
        tree.register(key("x"), None, FocusProps::leaf()).unwrap();
        let resolver = Resolver::new();
        assert_eq!(resolver.resolve(&tree, waiting, Direction::Right), None);

        let x = tree.id_of("x").unwrap();
        tree.unregister("x").unwrap();
        assert_eq!(resolver.resolve(&tree, x, Direction::Left), None);
    }

    #[test]
    fn custom_policy_is_consulted_per_level() {
        /// Always picks the first other enabled entry.
        struct FirstOther;
        impl FocusPolicy<NodeId> for FirstOther {
            fn next(
                &self,
                origin: NodeId,
                _direction: Direction,
                space: &FocusSpace<'_, NodeId>,
            ) -> Option<NodeId> {
                space
                    .nodes
                    .iter()
                    .find(|e| e.enabled && e.id != origin)
                    .map(|e| e.id)
            }
        }

        let mut tree = FocusTree::new();
        let a = tree.register(key("a"), None, FocusProps::leaf()).unwrap();
        let b = tree.register(key("b"), None, FocusProps::leaf()).unwrap();
        let resolver = Resolver::with_policy(FirstOther);
        assert_eq!(resolver.resolve(&tree, b, Direction::Right), Some(a));
    }
}
