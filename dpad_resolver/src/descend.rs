// Copyright 2025 the Dpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Entering a node: choosing which descendant actually takes focus.

use dpad_focus_tree::{FocusFlags, FocusTree, NodeId};

/// The node that receives focus when `id` is entered.
///
/// Tries [`descend_children`] first; if no child yields a target, `id` itself
/// when it is focusable. Returns `None` for stale ids and for subtrees with
/// nothing focusable.
pub fn descend(tree: &FocusTree, id: NodeId) -> Option<NodeId> {
    if !tree.is_alive(id) {
        return None;
    }
    if !tree.children_of(id).is_empty()
        && let Some(target) = descend_children(tree, id)
    {
        return Some(target);
    }
    tree.flags(id)
        .contains(FocusFlags::FOCUSABLE)
        .then_some(id)
}

/// The node that receives focus when entering one of `id`'s children.
///
/// Order of preference:
/// 1. the preferred child, if registered under `id`;
/// 2. the last focused child, if `id` saves it;
/// 3. the first child in document order that yields a target.
pub fn descend_children(tree: &FocusTree, id: NodeId) -> Option<NodeId> {
    let props = tree.props(id)?;
    let preferred = props
        .preferred_child
        .as_ref()
        .and_then(|key| tree.id_of(key.as_str()))
        .filter(|&child| tree.is_ancestor(id, child));
    let remembered = props
        .flags
        .contains(FocusFlags::SAVE_LAST_FOCUSED_CHILD)
        .then(|| tree.last_focused_child(id))
        .flatten();

    preferred
        .and_then(|child| descend(tree, child))
        .or_else(|| remembered.and_then(|child| descend(tree, child)))
        .or_else(|| {
            tree.children_of(id)
                .iter()
                .find_map(|&child| descend(tree, child))
        })
}
