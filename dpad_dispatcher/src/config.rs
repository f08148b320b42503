// Copyright 2025 the Dpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatcher and per-node configuration.

use alloc::boxed::Box;
use core::any::Any;
use core::fmt;

use dpad_focus_tree::{FocusFlags, FocusKey, FocusProps, OrphanPolicy, TreeOptions};
use dpad_resolver::Direction;

use crate::events::{FocusDetails, FocusRequests, Outcome};
use crate::keymap::KeyMap;

/// Callback fired on focus, blur, enter press, and enter release.
pub type FocusHandler = Box<dyn FnMut(&FocusDetails, &mut FocusRequests)>;

/// Callback fired on a directional press while the node (or a descendant) is
/// focused. Returning [`Outcome::Stop`] swallows the press.
pub type ArrowHandler = Box<dyn FnMut(Direction, &FocusDetails, &mut FocusRequests) -> Outcome>;

/// Options passed to [`crate::Dispatcher::init`].
#[derive(Clone, Debug)]
pub struct InitOptions {
    /// Emit `debug`-level traces for registration and focus transitions.
    pub debug: bool,
    /// Make [`crate::Dispatcher::debug_overlay`] report layout boxes.
    pub visual_debug: bool,
    /// Reject nodes whose parent never registers instead of attaching them
    /// to the root. `None` follows [`InitOptions::debug`].
    pub strict_parents: Option<bool>,
    /// Number of [`crate::Dispatcher::settle`] calls a child may wait for its
    /// parent.
    pub parent_grace_passes: u8,
    /// Upper bound on callback-issued requests processed per operation.
    pub max_deferred_requests: usize,
    /// Key code bindings used by [`crate::Dispatcher::handle_key_down`].
    pub key_map: KeyMap,
}

impl InitOptions {
    /// Default options with debug logging turned on.
    pub fn debugging() -> Self {
        Self {
            debug: true,
            ..Self::default()
        }
    }

    /// Whether orphans are rejected.
    pub fn strict(&self) -> bool {
        self.strict_parents.unwrap_or(self.debug)
    }

    pub(crate) fn tree_options(&self) -> TreeOptions {
        TreeOptions {
            parent_grace_passes: self.parent_grace_passes,
            orphan_policy: if self.strict() {
                OrphanPolicy::Reject
            } else {
                OrphanPolicy::AttachToRoot
            },
        }
    }
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            debug: false,
            visual_debug: false,
            strict_parents: None,
            parent_grace_passes: 1,
            max_deferred_requests: 64,
            key_map: KeyMap::default(),
        }
    }
}

/// Everything a UI component declares when it becomes focusable.
///
/// Built with chained setters:
///
/// ```rust
/// use dpad_dispatcher::NodeConfig;
///
/// let row = NodeConfig::new()
///     .key("games-row")
///     .parent("home")
///     .track_children(true)
///     .save_last_focused_child(true)
///     .on_focus(|details, _| {
///         let _scroll_to = details.layout.map(|r| r.x0);
///     });
/// assert!(row.focusable);
/// ```
pub struct NodeConfig {
    /// Unique key. Generated when absent.
    pub focus_key: Option<FocusKey>,
    /// Key of the enclosing container. Root when absent.
    pub parent_focus_key: Option<FocusKey>,
    /// Whether the node itself may hold focus.
    pub focusable: bool,
    /// Remember the last focused child and re-enter it.
    pub save_last_focused_child: bool,
    /// Maintain "has focused child".
    pub track_children: bool,
    /// Pick a new target inside this node when its focused descendant is removed.
    ///
    /// Turning this off keeps focus out of this node's other children. The
    /// node itself still takes focus if it is focusable; otherwise the
    /// search continues with its ancestors. Wrap the node in a focus
    /// boundary to stop it there.
    pub auto_restore_focus: bool,
    /// Navigation may not escape this node.
    pub is_focus_boundary: bool,
    /// Child to enter first.
    pub preferred_child_focus_key: Option<FocusKey>,
    /// Fired when enter is pressed while this node is focused.
    pub on_enter_press: Option<FocusHandler>,
    /// Fired when enter is released on the node that saw the press.
    pub on_enter_release: Option<FocusHandler>,
    /// Fired on directional presses before resolution.
    pub on_arrow_press: Option<ArrowHandler>,
    /// Fired when this node gains focus.
    pub on_focus: Option<FocusHandler>,
    /// Fired when this node loses focus.
    pub on_blur: Option<FocusHandler>,
    /// Opaque host data retrievable via [`crate::Dispatcher::extra_props`].
    pub extra_props: Option<Box<dyn Any>>,
}

impl NodeConfig {
    /// A focusable node with no callbacks, parented to the root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the focus key.
    pub fn key(mut self, key: impl Into<FocusKey>) -> Self {
        self.focus_key = Some(key.into());
        self
    }

    /// Set the parent key.
    pub fn parent(mut self, key: impl Into<FocusKey>) -> Self {
        self.parent_focus_key = Some(key.into());
        self
    }

    /// Set whether the node itself may hold focus.
    pub fn focusable(mut self, focusable: bool) -> Self {
        self.focusable = focusable;
        self
    }

    /// Set whether the last focused child is remembered.
    pub fn save_last_focused_child(mut self, save: bool) -> Self {
        self.save_last_focused_child = save;
        self
    }

    /// Set whether "has focused child" is tracked.
    pub fn track_children(mut self, track: bool) -> Self {
        self.track_children = track;
        self
    }

    /// Set whether focus is restored inside this node.
    pub fn auto_restore_focus(mut self, restore: bool) -> Self {
        self.auto_restore_focus = restore;
        self
    }

    /// Set whether the node is a focus boundary.
    pub fn focus_boundary(mut self, boundary: bool) -> Self {
        self.is_focus_boundary = boundary;
        self
    }

    /// Set the preferred child.
    pub fn preferred_child(mut self, key: impl Into<FocusKey>) -> Self {
        self.preferred_child_focus_key = Some(key.into());
        self
    }

    /// Set the enter-press callback.
    pub fn on_enter_press(mut self, f: impl FnMut(&FocusDetails, &mut FocusRequests) + 'static) -> Self {
        self.on_enter_press = Some(Box::new(f));
        self
    }

    /// Set the enter-release callback.
    pub fn on_enter_release(
        mut self,
        f: impl FnMut(&FocusDetails, &mut FocusRequests) + 'static,
    ) -> Self {
        self.on_enter_release = Some(Box::new(f));
        self
    }

    /// Set the arrow-press callback.
    pub fn on_arrow_press(
        mut self,
        f: impl FnMut(Direction, &FocusDetails, &mut FocusRequests) -> Outcome + 'static,
    ) -> Self {
        self.on_arrow_press = Some(Box::new(f));
        self
    }

    /// Set the focus callback.
    pub fn on_focus(mut self, f: impl FnMut(&FocusDetails, &mut FocusRequests) + 'static) -> Self {
        self.on_focus = Some(Box::new(f));
        self
    }

    /// Set the blur callback.
    pub fn on_blur(mut self, f: impl FnMut(&FocusDetails, &mut FocusRequests) + 'static) -> Self {
        self.on_blur = Some(Box::new(f));
        self
    }

    /// Attach opaque host data.
    pub fn extra_props(mut self, props: impl Any) -> Self {
        self.extra_props = Some(Box::new(props));
        self
    }

    /// The tree-level properties this configuration describes.
    pub fn props(&self) -> FocusProps {
        let mut flags = FocusFlags::empty();
        flags.set(FocusFlags::FOCUSABLE, self.focusable);
        flags.set(FocusFlags::SAVE_LAST_FOCUSED_CHILD, self.save_last_focused_child);
        flags.set(FocusFlags::TRACK_CHILDREN, self.track_children);
        flags.set(FocusFlags::AUTO_RESTORE_FOCUS, self.auto_restore_focus);
        flags.set(FocusFlags::FOCUS_BOUNDARY, self.is_focus_boundary);
        FocusProps {
            flags,
            preferred_child: self.preferred_child_focus_key.clone(),
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            focus_key: None,
            parent_focus_key: None,
            focusable: true,
            save_last_focused_child: false,
            track_children: false,
            auto_restore_focus: true,
            is_focus_boundary: false,
            preferred_child_focus_key: None,
            on_enter_press: None,
            on_enter_release: None,
            on_arrow_press: None,
            on_focus: None,
            on_blur: None,
            extra_props: None,
        }
    }
}

impl fmt::Debug for NodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeConfig")
            .field("focus_key", &self.focus_key)
            .field("parent_focus_key", &self.parent_focus_key)
            .field("props", &self.props())
            .field("on_enter_press", &self.on_enter_press.is_some())
            .field("on_enter_release", &self.on_enter_release.is_some())
            .field("on_arrow_press", &self.on_arrow_press.is_some())
            .field("on_focus", &self.on_focus.is_some())
            .field("on_blur", &self.on_blur.is_some())
            .field("extra_props", &self.extra_props.is_some())
            .finish_non_exhaustive()
    }
}

/// Callbacks and host data kept by the dispatcher for a registered node.
#[derive(Default)]
pub(crate) struct Handlers {
    pub(crate) on_enter_press: Option<FocusHandler>,
    pub(crate) on_enter_release: Option<FocusHandler>,
    pub(crate) on_arrow_press: Option<ArrowHandler>,
    pub(crate) on_focus: Option<FocusHandler>,
    pub(crate) on_blur: Option<FocusHandler>,
    pub(crate) extra_props: Option<Box<dyn Any>>,
}

impl From<NodeConfig> for Handlers {
    fn from(config: NodeConfig) -> Self {
        Self {
            on_enter_press: config.on_enter_press,
            on_enter_release: config.on_enter_release,
            on_arrow_press: config.on_arrow_press,
            on_focus: config.on_focus,
            on_blur: config.on_blur,
            extra_props: config.extra_props,
        }
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("on_enter_press", &self.on_enter_press.is_some())
            .field("on_enter_release", &self.on_enter_release.is_some())
            .field("on_arrow_press", &self.on_arrow_press.is_some())
            .field("on_focus", &self.on_focus.is_some())
            .field("on_blur", &self.on_blur.is_some())
            .field("extra_props", &self.extra_props.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_defaults_match_leaf_props() {
        let config = NodeConfig::new();
        assert_eq!(config.props(), FocusProps::leaf());
    }

    #[test]
    fn builders_set_flags_and_preferred_child() {
        let config = NodeConfig::new()
            .focusable(false)
            .track_children(true)
            .save_last_focused_child(true)
            .focus_boundary(true)
            .auto_restore_focus(false)
            .preferred_child("b");
        let props = config.props();
        assert_eq!(
            props.flags,
            FocusFlags::TRACK_CHILDREN
                | FocusFlags::SAVE_LAST_FOCUSED_CHILD
                | FocusFlags::FOCUS_BOUNDARY
        );
        assert_eq!(props.preferred_child.as_ref().map(FocusKey::as_str), Some("b"));
    }

    #[test]
    fn strict_parents_follows_debug_unless_set() {
        assert_eq!(InitOptions::default().tree_options().orphan_policy, OrphanPolicy::AttachToRoot);
        assert_eq!(InitOptions::debugging().tree_options().orphan_policy, OrphanPolicy::Reject);
        let relaxed = InitOptions {
            strict_parents: Some(false),
            ..InitOptions::debugging()
        };
        assert!(!relaxed.strict());
    }
}
