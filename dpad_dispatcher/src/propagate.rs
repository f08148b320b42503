// Copyright 2025 the Dpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arrow-press propagation: walk focused node → root and honor stop outcomes.
//!
//! Before a directional press is resolved, the focused node and then each of
//! its ancestors get a chance to handle it. This is how custom widgets (for
//! example a horizontally scrolling row that wants to own left/right) take
//! over default navigation.
//!
//! - The sequence starts with the focused node ([`Phase::Target`]) and
//!   continues with its ancestors, nearest first ([`Phase::Bubble`]).
//! - [`Outcome::Stop`] aborts propagation immediately and suppresses default
//!   resolution.
//! - [`run`] returns the entry where propagation stopped, or `None` if the
//!   sequence completed.

use dpad_focus_tree::{FocusTree, NodeId};
use smallvec::SmallVec;

use crate::events::Outcome;

/// Position of an entry in the propagation sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    /// The focused node itself.
    Target,
    /// An ancestor of the focused node.
    Bubble,
}

/// One step of a propagation sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Dispatch {
    pub(crate) node: NodeId,
    pub(crate) phase: Phase,
}

/// Propagation sequences rarely exceed this depth.
pub(crate) type Path = SmallVec<[Dispatch; 8]>;

/// The target → bubble sequence for `target`.
pub(crate) fn bubble_path(tree: &FocusTree, target: NodeId) -> Path {
    core::iter::once(Dispatch {
        node: target,
        phase: Phase::Target,
    })
    .chain(tree.ancestors(target).map(|node| Dispatch {
        node,
        phase: Phase::Bubble,
    }))
    .collect()
}

/// Run a handler over a propagation sequence and honor stop outcomes.
///
/// - [`Outcome::Continue`]: keep going.
/// - [`Outcome::Stop`]: abort propagation immediately (no later entries).
///
/// Returns `None` if the full sequence was visited, or `Some(d)` with the
/// entry whose handler returned [`Outcome::Stop`].
pub(crate) fn run<'a, E>(
    seq: &'a [Dispatch],
    event: &mut E,
    mut handler: impl FnMut(&Dispatch, &mut E) -> Outcome,
) -> Option<&'a Dispatch> {
    for d in seq {
        match handler(d, event) {
            Outcome::Continue => {}
            Outcome::Stop => return Some(d),
        }
    }
    None
}
