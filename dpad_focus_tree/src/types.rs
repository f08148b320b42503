// Copyright 2025 the Dpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the focus tree: node identifiers, focus keys, flags, and per-node props.

use alloc::string::String;
use alloc::sync::Arc;
use core::borrow::Borrow;
use core::fmt;

/// Key reserved for the permanent root node of every [`crate::FocusTree`].
pub const ROOT_FOCUS_KEY: &str = "SN:ROOT";

/// Identifier for a node in the tree (generational).
///
/// A `NodeId` stays valid until its node is unregistered. After that the slot
/// may be reused, but the generation changes, so stale identifiers never alias
/// a newer node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Caller-visible name of a focusable node.
///
/// Keys are unique among live registrations. Cloning is cheap.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FocusKey(Arc<str>);

impl FocusKey {
    /// Create a key from any string-like value.
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the root key.
    pub fn is_root(&self) -> bool {
        &*self.0 == ROOT_FOCUS_KEY
    }
}

impl fmt::Debug for FocusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for FocusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FocusKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FocusKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FocusKey {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl From<String> for FocusKey {
    fn from(value: String) -> Self {
        Self(value.into())
    }
}

impl From<&String> for FocusKey {
    fn from(value: &String) -> Self {
        Self(value.as_str().into())
    }
}

bitflags::bitflags! {
    /// Per-node behaviour flags consulted by resolution, descent, and restoration.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct FocusFlags: u8 {
        /// Node may receive focus itself.
        const FOCUSABLE               = 0b0000_0001;
        /// Node remembers which child last held focus and prefers it on re-entry.
        const SAVE_LAST_FOCUSED_CHILD = 0b0000_0010;
        /// Node tracks whether any descendant currently holds focus.
        const TRACK_CHILDREN          = 0b0000_0100;
        /// When a focused descendant disappears, focus is restored inside this node.
        const AUTO_RESTORE_FOCUS      = 0b0000_1000;
        /// Directional search does not escape this node to its siblings.
        const FOCUS_BOUNDARY          = 0b0001_0000;
    }
}

impl Default for FocusFlags {
    fn default() -> Self {
        Self::FOCUSABLE | Self::AUTO_RESTORE_FOCUS
    }
}

/// Structural focus properties for a node.
///
/// Callbacks and other presentation concerns live with the dispatcher; the
/// tree only stores what navigation needs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FocusProps {
    /// Behaviour flags.
    pub flags: FocusFlags,
    /// Child (or deeper descendant) to enter first when this node is entered
    /// from outside. Overrides last-focused-child memory.
    pub preferred_child: Option<FocusKey>,
}

impl FocusProps {
    /// Props for a plain focusable leaf.
    pub fn leaf() -> Self {
        Self::default()
    }

    /// Props for a container that is not focusable itself.
    pub fn container() -> Self {
        Self {
            flags: FocusFlags::AUTO_RESTORE_FOCUS,
            preferred_child: None,
        }
    }

    /// Returns these props with `flags` added.
    pub fn with(mut self, flags: FocusFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Returns these props with `flags` removed.
    pub fn without(mut self, flags: FocusFlags) -> Self {
        self.flags &= !flags;
        self
    }

    /// Returns these props with a preferred child key.
    pub fn preferring(mut self, child: impl Into<FocusKey>) -> Self {
        self.preferred_child = Some(child.into());
        self
    }
}
