// Copyright 2025 the Dpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: registration, deferred linking, layout, focus memory.

use alloc::{vec, vec::Vec};
use hashbrown::HashMap;
use kurbo::Rect;
use smallvec::SmallVec;

use crate::error::TreeError;
use crate::types::{FocusFlags, FocusKey, FocusProps, NodeId, ROOT_FOCUS_KEY};

/// What [`FocusTree::settle`] does with a node whose parent never appeared.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum OrphanPolicy {
    /// Link the node (and its subtree) under the root.
    #[default]
    AttachToRoot,
    /// Remove the node and its subtree.
    Reject,
}

/// Tree-wide configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TreeOptions {
    /// Number of [`FocusTree::settle`] passes a pending node may wait for its
    /// parent before it is treated as an orphan.
    pub parent_grace_passes: u8,
    /// Resolution applied to orphans.
    pub orphan_policy: OrphanPolicy,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            parent_grace_passes: 1,
            orphan_policy: OrphanPolicy::AttachToRoot,
        }
    }
}

/// A pending node resolved by [`FocusTree::settle`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Orphan {
    /// Key of the orphaned node.
    pub key: FocusKey,
    /// Parent key it was waiting for.
    pub parent: FocusKey,
    /// How it was resolved.
    pub resolution: OrphanPolicy,
    /// Keys removed from the tree (the orphan and its subtree) under
    /// [`OrphanPolicy::Reject`]; empty otherwise.
    pub removed: Vec<FocusKey>,
}

impl Orphan {
    /// The error describing this orphan.
    pub fn error(&self) -> TreeError {
        TreeError::ParentNotFound {
            key: self.key.clone(),
            parent: self.parent.clone(),
        }
    }
}

/// Summary of a successful [`FocusTree::unregister`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Removed {
    /// Identifier the node had; now stale.
    pub id: NodeId,
    /// Key the node had; now free.
    pub key: FocusKey,
    /// Parent the node was linked under, if any.
    pub parent: Option<NodeId>,
    /// Former children, now children of `parent` in the removed node's place.
    pub adopted: Vec<NodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Pending {
    parent: FocusKey,
    passes: u8,
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    generation: u32,
    key: FocusKey,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    props: FocusProps,
    layout: Option<Rect>,
    last_focused_child: Option<NodeId>,
    has_focused_child: bool,
    pending: Option<Pending>,
}

impl Node {
    fn new(generation: u32, key: FocusKey, props: FocusProps) -> Self {
        Self {
            generation,
            key,
            parent: None,
            children: Vec::new(),
            props,
            layout: None,
            last_focused_child: None,
            has_focused_child: false,
            pending: None,
        }
    }
}

/// Keyed hierarchy of focusable nodes.
///
/// Every tree owns a permanent, non-focusable root (key [`ROOT_FOCUS_KEY`]).
/// Nodes registered without a parent key are linked under it. Nodes whose
/// parent key is not registered yet are kept *pending*: their key is
/// reserved, but they are not reachable from the root until the parent
/// appears or [`FocusTree::settle`] resolves them as orphans.
///
/// Children are kept in registration order, which is the document order used
/// for tie-breaking and descent.
///
/// ## Example
///
/// ```rust
/// use dpad_focus_tree::{FocusProps, FocusTree};
///
/// let mut tree = FocusTree::new();
/// // A tile mounts before the row that contains it.
/// let tile = tree.register("tile".into(), Some("row".into()), FocusProps::leaf()).unwrap();
/// assert!(!tree.is_linked(tile));
///
/// let row = tree.register("row".into(), None, FocusProps::container()).unwrap();
/// assert_eq!(tree.parent_of(tile), Some(row));
/// assert!(tree.is_linked(tile));
/// ```
pub struct FocusTree {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    by_key: HashMap<FocusKey, NodeId>,
    /// pending nodes in registration order
    pending: Vec<NodeId>,
    root: NodeId,
    options: TreeOptions,
}

impl core::fmt::Debug for FocusTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("FocusTree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("pending", &self.pending.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for FocusTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusTree {
    /// Create a tree holding only the root, with default options.
    pub fn new() -> Self {
        Self::with_options(TreeOptions::default())
    }

    /// Create a tree holding only the root.
    pub fn with_options(options: TreeOptions) -> Self {
        let root = NodeId::new(0, 1);
        let root_key = FocusKey::from(ROOT_FOCUS_KEY);
        let mut by_key = HashMap::new();
        by_key.insert(root_key.clone(), root);
        Self {
            nodes: vec![Some(Node::new(1, root_key, FocusProps::container()))],
            generations: vec![1],
            free_list: Vec::new(),
            by_key,
            pending: Vec::new(),
            root,
            options,
        }
    }

    /// The tree's options.
    pub fn options(&self) -> TreeOptions {
        self.options
    }

    /// The permanent root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Register a node under `parent` (or under the root if `None`).
    ///
    /// If `parent` names a key that is not registered yet, the node is kept
    /// pending and linked as soon as that key registers. Any nodes already
    /// pending on `key` are linked under the new node, in their registration
    /// order.
    pub fn register(
        &mut self,
        key: FocusKey,
        parent: Option<FocusKey>,
        props: FocusProps,
    ) -> Result<NodeId, TreeError> {
        if self.by_key.contains_key(key.as_str()) {
            return Err(TreeError::DuplicateKey(key));
        }
        // Resolve the parent before the new key is visible, so a node can
        // never be its own parent.
        let parent_id = match &parent {
            None => Some(self.root),
            Some(p) => self.by_key.get(p.as_str()).copied(),
        };

        let id = self.alloc(key.clone(), props);
        self.by_key.insert(key, id);
        if let Some(p) = parent_id {
            self.link_parent(id, p);
        } else if let Some(awaited) = parent {
            self.node_mut(id).pending = Some(Pending {
                parent: awaited,
                passes: 0,
            });
            self.pending.push(id);
        }
        self.link_waiting_children(id);
        Ok(id)
    }

    /// Remove a node.
    ///
    /// Its children take its place under its parent, keeping their order, so
    /// removing an intermediate container never orphans its descendants. The
    /// children of a pending node inherit its pending parent key.
    pub fn unregister(&mut self, key: &str) -> Result<Removed, TreeError> {
        let Some(&id) = self.by_key.get(key) else {
            return Err(TreeError::UnknownKey(FocusKey::from(key)));
        };
        if id == self.root {
            return Err(TreeError::RootIsPermanent);
        }
        let node = self.nodes[id.idx()].take().expect("dangling NodeId");
        self.by_key.remove(key);
        self.free_list.push(id.idx());
        self.pending.retain(|&p| p != id);

        let adopted = node.children;
        match (node.parent, node.pending) {
            (Some(parent), _) => {
                let p = self.node_mut(parent);
                match p.children.iter().position(|&c| c == id) {
                    Some(pos) => {
                        p.children.splice(pos..=pos, adopted.iter().copied());
                    }
                    None => p.children.extend(adopted.iter().copied()),
                }
                if p.last_focused_child == Some(id) {
                    p.last_focused_child = None;
                }
                for &child in &adopted {
                    self.node_mut(child).parent = Some(parent);
                }
            }
            (None, Some(pending)) => {
                for &child in &adopted {
                    let c = self.node_mut(child);
                    c.parent = None;
                    c.pending = Some(pending.clone());
                    self.pending.push(child);
                }
            }
            (None, None) => {
                let root = self.root;
                for &child in &adopted {
                    self.node_mut(child).parent = None;
                    self.link_parent(child, root);
                }
            }
        }

        Ok(Removed {
            id,
            key: node.key,
            parent: node.parent,
            adopted,
        })
    }

    /// End of a mount pass: age pending nodes and resolve those that waited
    /// longer than [`TreeOptions::parent_grace_passes`].
    pub fn settle(&mut self) -> Vec<Orphan> {
        let grace = self.options.parent_grace_passes;
        let mut orphans = Vec::new();
        let waiting = core::mem::take(&mut self.pending);
        for id in waiting {
            if !self.is_alive(id) {
                continue;
            }
            let expired = {
                let Some(pending) = self.node_mut(id).pending.as_mut() else {
                    continue;
                };
                pending.passes = pending.passes.saturating_add(1);
                pending.passes > grace
            };
            if !expired {
                self.pending.push(id);
                continue;
            }
            let Some(pending) = self.node_mut(id).pending.take() else {
                continue;
            };
            let key = self.node(id).key.clone();
            let removed = match self.options.orphan_policy {
                OrphanPolicy::AttachToRoot => {
                    let root = self.root;
                    self.link_parent(id, root);
                    Vec::new()
                }
                OrphanPolicy::Reject => self.remove_subtree(id),
            };
            orphans.push(Orphan {
                key,
                parent: pending.parent,
                resolution: self.options.orphan_policy,
                removed,
            });
        }
        orphans
    }

    /// Replace the layout box of a node.
    ///
    /// Only metadata changes; the tree shape is untouched.
    pub fn update_layout(&mut self, key: &str, layout: Rect) -> Result<(), TreeError> {
        let id = self.require(key)?;
        self.node_mut(id).layout = Some(layout);
        Ok(())
    }

    /// Forget the layout box of a node, returning it to document-order-only navigation.
    pub fn clear_layout(&mut self, key: &str) -> Result<(), TreeError> {
        let id = self.require(key)?;
        self.node_mut(id).layout = None;
        Ok(())
    }

    /// Replace the behaviour flags of a node.
    pub fn set_flags(&mut self, key: &str, flags: FocusFlags) -> Result<(), TreeError> {
        let id = self.require(key)?;
        self.node_mut(id).props.flags = flags;
        Ok(())
    }

    /// Toggle whether a node may receive focus itself.
    pub fn set_focusable(&mut self, key: &str, focusable: bool) -> Result<(), TreeError> {
        let id = self.require(key)?;
        self.node_mut(id)
            .props
            .flags
            .set(FocusFlags::FOCUSABLE, focusable);
        Ok(())
    }

    /// Replace the preferred child of a node.
    pub fn set_preferred_child(
        &mut self,
        key: &str,
        child: Option<FocusKey>,
    ) -> Result<(), TreeError> {
        let id = self.require(key)?;
        self.node_mut(id).props.preferred_child = child;
        Ok(())
    }

    /// Update focus memory for a focus move from `previous` to `next`.
    ///
    /// Clears the tracked-children flag along the old path, then walks the
    /// new path recording the last focused child (for
    /// [`FocusFlags::SAVE_LAST_FOCUSED_CHILD`]) and setting the
    /// tracked-children flag (for [`FocusFlags::TRACK_CHILDREN`]).
    pub fn update_focus_memory(&mut self, previous: Option<NodeId>, next: Option<NodeId>) {
        if let Some(prev) = previous.filter(|&p| self.is_alive(p)) {
            let chain: SmallVec<[NodeId; 8]> = self.ancestors(prev).collect();
            for a in chain {
                self.node_mut(a).has_focused_child = false;
            }
        }
        if let Some(next) = next.filter(|&n| self.is_alive(n)) {
            let chain: SmallVec<[NodeId; 8]> = self.ancestors(next).collect();
            let mut child = next;
            for a in chain {
                let n = self.node_mut(a);
                if n.props.flags.contains(FocusFlags::TRACK_CHILDREN) {
                    n.has_focused_child = true;
                }
                if n.props.flags.contains(FocusFlags::SAVE_LAST_FOCUSED_CHILD) {
                    n.last_focused_child = Some(child);
                }
                child = a;
            }
        }
    }
}

impl FocusTree {
    // --- queries ---

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is considered live if its slot exists and its generation matches
    /// the current generation stored in that slot.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .is_some_and(|n| n.generation == id.1)
    }

    /// Returns true if `id` is live and reachable from the root.
    pub fn is_linked(&self, id: NodeId) -> bool {
        self.is_alive(id) && (id == self.root || self.ancestors(id).last() == Some(self.root))
    }

    /// Returns true if `id` is waiting for its parent to register.
    pub fn is_pending(&self, id: NodeId) -> bool {
        self.slot(id).is_some_and(|n| n.pending.is_some())
    }

    /// Look up the node registered under `key`.
    pub fn id_of(&self, key: &str) -> Option<NodeId> {
        self.by_key.get(key).copied()
    }

    /// Returns true if `key` is registered (linked or pending).
    pub fn contains_key(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// The key of a live node.
    pub fn key_of(&self, id: NodeId) -> Option<&FocusKey> {
        self.slot(id).map(|n| &n.key)
    }

    /// Returns the parent of a node if live, or `None` for the root, pending nodes, or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).and_then(|n| n.parent)
    }

    /// Get the children of a node in document order, or an empty slice if the node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.slot(id).map_or(&[], |n| &n.children)
    }

    /// The props of a live node.
    pub fn props(&self, id: NodeId) -> Option<&FocusProps> {
        self.slot(id).map(|n| &n.props)
    }

    /// The flags of a node, or empty flags for stale ids.
    pub fn flags(&self, id: NodeId) -> FocusFlags {
        self.slot(id).map_or(FocusFlags::empty(), |n| n.props.flags)
    }

    /// The last layout box reported for a node, if it has been measured.
    pub fn layout(&self, id: NodeId) -> Option<Rect> {
        self.slot(id).and_then(|n| n.layout)
    }

    /// The child that last led to focus, for nodes saving it.
    pub fn last_focused_child(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id)
            .and_then(|n| n.last_focused_child)
            .filter(|&c| self.is_alive(c))
    }

    /// Whether a descendant of a [`FocusFlags::TRACK_CHILDREN`] node holds focus.
    pub fn has_focused_child(&self, id: NodeId) -> bool {
        self.slot(id).is_some_and(|n| n.has_focused_child)
    }

    /// Number of registered nodes, excluding the root.
    pub fn len(&self) -> usize {
        self.by_key.len() - 1
    }

    /// Returns true when nothing hangs under the root.
    pub fn is_empty(&self) -> bool {
        self.children_of(self.root).is_empty()
    }

    /// Number of nodes still waiting for their parent.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Iterate the ancestors of a node, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        core::iter::successors(self.parent_of(id), move |&p| self.parent_of(p))
    }

    /// Returns true if `ancestor` is a strict ancestor of `descendant`.
    pub fn is_ancestor(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        self.ancestors(descendant).any(|a| a == ancestor)
    }

    /// Path from the root (or the top of a pending subtree) down to `id`, inclusive.
    pub fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        if !self.is_alive(id) {
            return Vec::new();
        }
        let mut path: Vec<NodeId> = core::iter::once(id).chain(self.ancestors(id)).collect();
        path.reverse();
        path
    }

    /// Get the next node in depth-first (document) order.
    ///
    /// Returns `None` if no next node exists or if the current node is stale.
    /// This is a standard tree traversal that does not wrap around.
    pub fn next_depth_first(&self, current: NodeId) -> Option<NodeId> {
        if !self.is_alive(current) {
            return None;
        }
        if let Some(&first_child) = self.node(current).children.first() {
            return Some(first_child);
        }
        let mut node = current;
        while let Some(parent) = self.parent_of(node) {
            if let Some(next_sibling) = self.next_sibling(node) {
                return Some(next_sibling);
            }
            node = parent;
        }
        None
    }

    // --- internals ---

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent_of(node)?;
        let siblings = &self.node(parent).children;
        let pos = siblings.iter().position(|&id| id == node)?;
        siblings.get(pos + 1).copied()
    }

    fn slot(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.idx())?
            .as_ref()
            .filter(|n| n.generation == id.1)
    }

    fn require(&self, key: &str) -> Result<NodeId, TreeError> {
        self.id_of(key)
            .ok_or_else(|| TreeError::UnknownKey(FocusKey::from(key)))
    }

    /// Access a node; panics if `id` is stale.
    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn alloc(&mut self, key: FocusKey, props: FocusProps) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, key, props));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId stores 32-bit slot indices."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, key, props)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId stores 32-bit slot indices."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        NodeId::new(idx, generation)
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        self.node_mut(parent).children.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        let p = self.node_mut(parent);
        p.children.retain(|c| *c != id);
        if p.last_focused_child == Some(id) {
            p.last_focused_child = None;
        }
        self.node_mut(id).parent = None;
    }

    /// Link every node pending on `parent`'s key, unless that would close a cycle.
    fn link_waiting_children(&mut self, parent: NodeId) {
        let key = self.node(parent).key.clone();
        let mut i = 0;
        while i < self.pending.len() {
            let child = self.pending[i];
            let waits = self
                .node(child)
                .pending
                .as_ref()
                .is_some_and(|p| p.parent == key);
            if waits && child != parent && !self.is_ancestor(child, parent) {
                self.pending.remove(i);
                self.node_mut(child).pending = None;
                self.link_parent(child, parent);
            } else {
                i += 1;
            }
        }
    }

    fn remove_subtree(&mut self, id: NodeId) -> Vec<FocusKey> {
        if let Some(parent) = self.parent_of(id) {
            self.unlink_parent(id, parent);
        }
        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(node) = self.nodes[next.idx()].take() else {
                continue;
            };
            stack.extend(node.children.iter().rev().copied());
            self.by_key.remove(node.key.as_str());
            self.free_list.push(next.idx());
            self.pending.retain(|&p| p != next);
            removed.push(node.key);
        }
        removed
    }
}
