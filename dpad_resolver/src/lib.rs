// Copyright 2025 the Dpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dpad Resolver: turn "move up/down/left/right" into the next focused node.
//!
//! Resolution works one tree level at a time:
//! - **Candidates** ([`FocusEntry`] / [`FocusSpace`]) are the siblings of the
//!   current level node, each with its layout box (if measured) and document
//!   order. A sibling is *enabled* only if entering it yields a focus target.
//! - A **policy** ([`FocusPolicy`]) picks the best candidate in the pressed
//!   [`Direction`]. [`DefaultPolicy`] prefers the nearest box whose center lies
//!   strictly in the pressed half-plane, penalizing off-axis distance, then
//!   breaks ties by Euclidean distance and document order.
//! - The **[`Resolver`]** climbs one level whenever a level has no candidate,
//!   stopping at focus boundaries or the root, and finally [`descend`]s into
//!   the chosen node via its preferred child, its last focused child, or its
//!   first focusable descendant.
//!
//! ## Minimal example
//!
//! Two tiles laid out left-to-right:
//!
//! ```rust
//! use dpad_focus_tree::{FocusProps, FocusTree};
//! use dpad_resolver::{Direction, Resolver};
//! use kurbo::Rect;
//!
//! let mut tree = FocusTree::new();
//! let a = tree.register("a".into(), None, FocusProps::leaf()).unwrap();
//! let b = tree.register("b".into(), None, FocusProps::leaf()).unwrap();
//! tree.update_layout("a", Rect::new(0.0, 0.0, 80.0, 80.0)).unwrap();
//! tree.update_layout("b", Rect::new(100.0, 0.0, 180.0, 80.0)).unwrap();
//!
//! let resolver = Resolver::new();
//! assert_eq!(resolver.resolve(&tree, a, Direction::Right), Some(b));
//! // Nothing further right: a miss, not an error.
//! assert_eq!(resolver.resolve(&tree, b, Direction::Right), None);
//! ```
//!
//! ## Unmeasured nodes
//!
//! A container without its own layout box is placed at the union of its
//! measured descendants, so hosts may measure tiles only. Nodes with nothing
//! measured anywhere below fall back to document order: right and down move
//! to the next sibling, left and up to the previous one. A placed origin only
//! falls back to unplaced siblings when no placed sibling qualifies.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use core::cmp::Ordering;

use kurbo::Rect;

mod descend;
mod resolver;

pub use descend::{descend, descend_children};
pub use resolver::Resolver;

/// Direction of a directional-pad press.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Move toward smaller y.
    Up,
    /// Move toward larger y.
    Down,
    /// Move toward smaller x.
    Left,
    /// Move toward larger x.
    Right,
}

impl Direction {
    /// All four directions.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// The direction pointing the other way.
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Whether this direction follows document order (right, down).
    pub fn is_forward(self) -> bool {
        matches!(self, Self::Down | Self::Right)
    }

    /// Whether this direction moves along the x axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// A single candidate within a [`FocusSpace`].
#[derive(Clone, Debug)]
pub struct FocusEntry<K> {
    /// Identifier for this node.
    pub id: K,
    /// Layout box, if measured.
    ///
    /// All entries within a given [`FocusSpace`] should use the same
    /// coordinate space so that positions compare meaningfully.
    pub rect: Option<Rect>,
    /// Document order among the entries of the space.
    pub order: usize,
    /// Whether this node can be navigated to.
    pub enabled: bool,
}

/// A read-only view of candidates at one tree level.
///
/// The origin entry is part of the space; policies find it by id.
#[derive(Clone, Debug)]
pub struct FocusSpace<'a, K> {
    /// Candidates, including the origin.
    pub nodes: &'a [FocusEntry<K>],
}

/// Trait for directional selection policies.
///
/// A policy receives the origin, the pressed direction, and the candidates
/// at one level, and returns the next node at that level, if any. It never
/// climbs or descends; [`Resolver`] does that.
pub trait FocusPolicy<K>
where
    K: Copy + Eq,
{
    /// Pick the next node at this level.
    fn next(&self, origin: K, direction: Direction, space: &FocusSpace<'_, K>) -> Option<K>;
}

/// Nearest-in-direction policy with document-order fallback.
#[derive(Copy, Clone, Debug)]
pub struct DefaultPolicy {
    /// Penalty factor for distance across the pressed axis.
    pub off_axis_weight: f64,
}

impl Default for DefaultPolicy {
    fn default() -> Self {
        Self {
            off_axis_weight: 4.0,
        }
    }
}

impl<K> FocusPolicy<K> for DefaultPolicy
where
    K: Copy + Eq,
{
    fn next(&self, origin: K, direction: Direction, space: &FocusSpace<'_, K>) -> Option<K> {
        let origin_entry = space.nodes.iter().find(|e| e.id == origin)?;
        match origin_entry.rect {
            Some(rect) => {
                next_directional(origin, rect, direction, space, self.off_axis_weight)
                    .or_else(|| {
                        next_in_document_order(origin_entry.order, direction, space, |e| {
                            e.rect.is_none()
                        })
                    })
            }
            None => next_in_document_order(origin_entry.order, direction, space, |_| true),
        }
    }
}

fn next_directional<K>(
    origin: K,
    origin_rect: Rect,
    direction: Direction,
    space: &FocusSpace<'_, K>,
    off_axis_weight: f64,
) -> Option<K>
where
    K: Copy + Eq,
{
    let oc = origin_rect.center();

    // (score, squared distance, document order, id)
    let mut best: Option<(f64, f64, usize, K)> = None;

    for candidate in space.nodes {
        if !candidate.enabled || candidate.id == origin {
            continue;
        }
        let Some(rect) = candidate.rect else {
            continue;
        };
        let cc = rect.center();
        let dx = cc.x - oc.x;
        let dy = cc.y - oc.y;

        let (primary, secondary, forward_sign) = match direction {
            Direction::Right => (dx, dy, 1.0),
            Direction::Left => (dx, dy, -1.0),
            Direction::Down => (dy, dx, 1.0),
            Direction::Up => (dy, dx, -1.0),
        };

        // Restrict to the forward half-plane.
        if forward_sign * primary <= 0.0 {
            continue;
        }

        let score = primary.abs() + off_axis_weight * secondary.abs();
        let distance = dx * dx + dy * dy;
        if !score.is_finite() || !distance.is_finite() {
            continue;
        }

        let wins = match best {
            None => true,
            Some((best_score, best_distance, best_order, _)) => {
                score
                    .total_cmp(&best_score)
                    .then(distance.total_cmp(&best_distance))
                    .then(candidate.order.cmp(&best_order))
                    == Ordering::Less
            }
        };
        if wins {
            best = Some((score, distance, candidate.order, candidate.id));
        }
    }

    best.map(|(_, _, _, id)| id)
}

fn next_in_document_order<K>(
    origin_order: usize,
    direction: Direction,
    space: &FocusSpace<'_, K>,
    eligible: impl Fn(&FocusEntry<K>) -> bool,
) -> Option<K>
where
    K: Copy + Eq,
{
    let candidates = space
        .nodes
        .iter()
        .filter(|e| e.enabled && eligible(*e));
    if direction.is_forward() {
        candidates
            .filter(|e| e.order > origin_order)
            .min_by_key(|e| e.order)
            .map(|e| e.id)
    } else {
        candidates
            .filter(|e| e.order < origin_order)
            .max_by_key(|e| e.order)
            .map(|e| e.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn entry(id: u32, rect: Option<Rect>, order: usize) -> FocusEntry<u32> {
        FocusEntry {
            id,
            rect,
            order,
            enabled: true,
        }
    }

    fn tile(x: f64, y: f64) -> Option<Rect> {
        Some(Rect::new(x, y, x + 10.0, y + 10.0))
    }

    #[test]
    fn directional_prefers_forward_candidates() {
        let entries = vec![
            entry(1, tile(0.0, 0.0), 0),
            // Right of origin.
            entry(2, tile(20.0, 0.0), 1),
            // Left of origin.
            entry(3, tile(-30.0, 0.0), 2),
        ];
        let space = FocusSpace { nodes: &entries };
        let policy = DefaultPolicy::default();

        assert_eq!(policy.next(1, Direction::Right, &space), Some(2));
        assert_eq!(policy.next(1, Direction::Left, &space), Some(3));
        assert_eq!(policy.next(1, Direction::Up, &space), None);
        assert_eq!(policy.next(1, Direction::Down, &space), None);
    }

    #[test]
    fn off_axis_distance_is_penalized() {
        let entries = vec![
            entry(1, tile(0.0, 0.0), 0),
            // Closer along x, but far below.
            entry(2, tile(15.0, 40.0), 1),
            // Further along x, same row.
            entry(3, tile(60.0, 0.0), 2),
        ];
        let space = FocusSpace { nodes: &entries };
        assert_eq!(
            DefaultPolicy::default().next(1, Direction::Right, &space),
            Some(3)
        );
    }

    #[test]
    fn equal_scores_break_by_distance_then_order() {
        let entries = vec![
            entry(1, tile(0.0, 0.0), 0),
            entry(2, tile(20.0, 10.0), 1),
            entry(3, tile(40.0, 5.0), 2),
        ];
        let space = FocusSpace { nodes: &entries };
        let policy = DefaultPolicy {
            off_axis_weight: 4.0,
        };
        // 2: score 20 + 40 = 60, distance 500. 3: score 40 + 20 = 60, distance 1625.
        assert_eq!(policy.next(1, Direction::Right, &space), Some(2));

        // Identical geometry: document order decides.
        let twins = vec![
            entry(1, tile(0.0, 0.0), 0),
            entry(7, tile(20.0, 0.0), 2),
            entry(5, tile(20.0, 0.0), 1),
        ];
        let space = FocusSpace { nodes: &twins };
        assert_eq!(policy.next(1, Direction::Right, &space), Some(5));
    }

    #[test]
    fn directional_skips_disabled_and_self() {
        let mut entries = vec![
            entry(1, tile(0.0, 0.0), 0),
            // Right but disabled.
            entry(2, tile(20.0, 0.0), 1),
            // Further right and enabled.
            entry(3, tile(40.0, 0.0), 2),
        ];
        entries[1].enabled = false;
        let space = FocusSpace { nodes: &entries };
        let policy = DefaultPolicy::default();

        assert_eq!(policy.next(1, Direction::Right, &space), Some(3));
        // No wrap-around: nothing lies to the left.
        assert_eq!(policy.next(1, Direction::Left, &space), None);
    }

    #[test]
    fn overlapping_centers_are_not_in_the_half_plane() {
        let entries = vec![entry(1, tile(0.0, 0.0), 0), entry(2, tile(0.0, 0.0), 1)];
        let space = FocusSpace { nodes: &entries };
        for direction in Direction::ALL {
            assert_eq!(DefaultPolicy::default().next(1, direction, &space), None);
        }
    }

    #[test]
    fn unmeasured_origin_uses_document_order() {
        let entries = vec![
            entry(1, tile(0.0, 0.0), 0),
            entry(2, None, 1),
            entry(3, tile(-50.0, 0.0), 2),
        ];
        let space = FocusSpace { nodes: &entries };
        let policy = DefaultPolicy::default();

        assert_eq!(policy.next(2, Direction::Right, &space), Some(3));
        assert_eq!(policy.next(2, Direction::Down, &space), Some(3));
        assert_eq!(policy.next(2, Direction::Left, &space), Some(1));
        assert_eq!(policy.next(2, Direction::Up, &space), Some(1));
    }

    #[test]
    fn measured_origin_falls_back_to_unmeasured_siblings_only() {
        let entries = vec![
            // Measured, left of origin but after it in document order.
            entry(1, tile(20.0, 0.0), 0),
            entry(2, tile(0.0, 0.0), 2),
            entry(3, None, 1),
        ];
        let space = FocusSpace { nodes: &entries };
        let policy = DefaultPolicy::default();

        // Nothing measured to the right of 1; the unmeasured sibling 3 follows it.
        assert_eq!(policy.next(1, Direction::Right, &space), Some(3));
        // From 2 the measured sibling 1 lies right; nothing at all lies below.
        assert_eq!(policy.next(2, Direction::Right, &space), Some(1));
        assert_eq!(policy.next(2, Direction::Down, &space), None);
    }

    #[test]
    fn unknown_origin_yields_none() {
        let entries = vec![entry(1, tile(0.0, 0.0), 0)];
        let space = FocusSpace { nodes: &entries };
        assert_eq!(DefaultPolicy::default().next(9, Direction::Right, &space), None);
    }

    #[test]
    fn direction_helpers() {
        for d in Direction::ALL {
            assert_eq!(d.opposite().opposite(), d);
            assert_ne!(d.is_forward(), d.opposite().is_forward());
            assert_eq!(d.is_horizontal(), d.opposite().is_horizontal());
        }
    }
}
