// Copyright 2025 the Dpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dpad Focus Tree: the keyed hierarchy behind directional-pad navigation.
//!
//! A television or console front-end is a tree of focusable regions: pages
//! contain rows, rows contain tiles. This crate stores that hierarchy as the
//! navigation engine sees it.
//!
//! - Every node owns a unique [`FocusKey`], an optional parent, its children in
//!   document order, an optional layout box, and [`FocusProps`].
//! - A permanent root (key [`ROOT_FOCUS_KEY`]) anchors all top-level nodes.
//! - Children may register before their parent. They wait as *pending* nodes
//!   and are linked as soon as the parent key registers. [`FocusTree::settle`]
//!   marks the end of a mount pass and resolves nodes whose parent never
//!   appeared, according to [`OrphanPolicy`].
//! - Removing a node hands its children to its parent, in its place, so a
//!   container unmounting before its tiles never orphans them.
//! - Focus memory ([`FocusTree::update_focus_memory`]) records the last focused
//!   child of saving containers and the "has focused child" flag of tracking
//!   containers.
//!
//! ## Not a layout engine
//!
//! Layout boxes are reported by the host through [`FocusTree::update_layout`].
//! The tree never measures anything; unmeasured nodes simply have no box.
//!
//! ## API overview
//!
//! - [`FocusTree`]: the container.
//! - [`NodeId`]: generational handle of a node.
//! - [`FocusKey`]: caller-visible unique name.
//! - [`FocusFlags`] / [`FocusProps`]: behaviour flags and preferred child.
//! - [`TreeOptions`]: grace period and orphan policy.
//! - [`TreeError`]: mutation failures.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod tree;
mod types;

pub use error::TreeError;
pub use tree::{FocusTree, Orphan, OrphanPolicy, Removed, TreeOptions};
pub use types::{FocusFlags, FocusKey, FocusProps, NodeId, ROOT_FOCUS_KEY};
