// Copyright 2025 the Dpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use dpad_focus_tree::FocusKey;
use kurbo::Rect;

/// One measured node, as drawn by a visual debugging overlay.
///
/// Produced by [`crate::Dispatcher::debug_overlay`] in depth-first document
/// order, so later boxes paint over their ancestors.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayBox {
    /// Key of the node.
    pub focus_key: FocusKey,
    /// Its last reported layout box.
    pub rect: Rect,
    /// Depth below the root (top-level nodes are 1).
    pub depth: usize,
    /// Whether the node itself may hold focus.
    pub focusable: bool,
    /// Whether the node holds focus.
    pub focused: bool,
    /// Whether a descendant holds focus (tracking containers only).
    pub has_focused_child: bool,
}
