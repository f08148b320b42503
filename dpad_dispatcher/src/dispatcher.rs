// Copyright 2025 the Dpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The focus state machine.

use alloc::format;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use dpad_focus_tree::{FocusFlags, FocusKey, FocusTree, NodeId, Orphan, OrphanPolicy, TreeError};
use dpad_resolver::{DefaultPolicy, Direction, FocusPolicy, Resolver, descend, descend_children};
use hashbrown::HashMap;
use kurbo::Rect;

use crate::config::{FocusHandler, Handlers, InitOptions, NodeConfig};
use crate::error::FocusError;
use crate::events::{FocusCause, FocusDetails, FocusRequests, FocusState, Outcome, Request};
use crate::keymap::Input;
use crate::overlay::OverlayBox;
use crate::propagate::{bubble_path, run};

/// Result of [`Dispatcher::register_node`].
///
/// Registration never moves focus, so there is no focused flag here; ask
/// [`Dispatcher::is_focused`] with `focus_key` for the live state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    /// The node's key, generated if the config had none.
    pub focus_key: FocusKey,
    /// Handle of the node in [`Dispatcher::tree`].
    pub node: NodeId,
}

/// Owns the focus tree and the single focus pointer.
///
/// All mutation goes through the dispatcher: nodes register and unregister,
/// report layout, and the host feeds it key presses. Callbacks fire
/// synchronously in a fixed order (blur, then focus); focus changes they
/// request through [`FocusRequests`] are applied after the operation that
/// triggered them returns.
///
/// ## Errors
///
/// Caller misuse (unknown keys, duplicate keys, focusing something that
/// cannot take focus) is logged and reported as `false`/`None`/`Err`; no
/// method panics on it.
pub struct Dispatcher<P = DefaultPolicy> {
    options: InitOptions,
    tree: FocusTree,
    resolver: Resolver<P>,
    handlers: HashMap<NodeId, Handlers>,
    focused: Option<NodeId>,
    /// Cause of the current focus, reported to enter and arrow handlers.
    cause: FocusCause,
    /// Node that saw the last enter press, awaiting its release.
    enter_pressed: Option<NodeId>,
    requests: FocusRequests,
    generated_keys: u64,
}

impl Dispatcher {
    /// Create a dispatcher using [`DefaultPolicy`].
    pub fn init(options: InitOptions) -> Self {
        Self::with_policy(options, DefaultPolicy::default())
    }

    /// Create a dispatcher with default options.
    pub fn new() -> Self {
        Self::init(InitOptions::default())
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: FocusPolicy<NodeId>> Dispatcher<P> {
    /// Create a dispatcher with a custom per-level resolution policy.
    pub fn with_policy(options: InitOptions, policy: P) -> Self {
        let tree = FocusTree::with_options(options.tree_options());
        if options.debug {
            tracing::debug!(
                strict_parents = options.strict(),
                grace = options.parent_grace_passes,
                "focus dispatcher initialized"
            );
        }
        Self {
            options,
            tree,
            resolver: Resolver::with_policy(policy),
            handlers: HashMap::new(),
            focused: None,
            cause: FocusCause::Explicit,
            enter_pressed: None,
            requests: FocusRequests::default(),
            generated_keys: 0,
        }
    }

    /// The options this dispatcher was created with.
    pub fn options(&self) -> &InitOptions {
        &self.options
    }

    /// Read access to the focus tree.
    pub fn tree(&self) -> &FocusTree {
        &self.tree
    }

    // --- registration ---

    /// Register a focusable node.
    ///
    /// A node whose parent has not registered yet is kept pending until it
    /// does (see [`Dispatcher::settle`]). Registration never moves focus.
    ///
    /// Returns an error, after logging it, if the key is already in use.
    pub fn register_node(&mut self, mut config: NodeConfig) -> Result<Registration, FocusError> {
        let props = config.props();
        let key = match config.focus_key.take() {
            Some(key) => key,
            None => self.generate_key(),
        };
        let parent = config.parent_focus_key.take();
        let id = match self.tree.register(key.clone(), parent.clone(), props) {
            Ok(id) => id,
            Err(err) => {
                tracing::error!(%err, "focus node registration rejected");
                return Err(err.into());
            }
        };
        self.handlers.insert(id, Handlers::from(config));
        if self.options.debug {
            tracing::debug!(
                key = %key,
                parent = parent.as_ref().map(FocusKey::as_str),
                pending = self.tree.is_pending(id),
                "focus node registered"
            );
        }
        Ok(Registration {
            focus_key: key,
            node: id,
        })
    }

    /// Remove a node.
    ///
    /// Its children move up to its parent. If it held focus, focus is
    /// restored (see the crate docs); requests queued by the resulting
    /// callbacks are then processed.
    pub fn unregister_node(&mut self, key: &str) -> bool {
        let Some(id) = self.tree.id_of(key) else {
            tracing::warn!(key, "unregister of unknown focus key");
            return false;
        };
        let was_focused = self.focused == Some(id);
        if was_focused {
            self.tree.update_focus_memory(Some(id), None);
        }
        let removed = match self.tree.unregister(key) {
            Ok(removed) => removed,
            Err(err) => {
                tracing::warn!(%err, "focus node not removed");
                return false;
            }
        };
        self.handlers.remove(&removed.id);
        if self.options.debug {
            tracing::debug!(
                key,
                adopted = removed.adopted.len(),
                was_focused,
                "focus node unregistered"
            );
        }
        if was_focused {
            self.focused = None;
            self.restore(removed.parent);
        }
        self.drain_requests();
        true
    }

    /// End of a mount pass: resolve nodes whose parent never registered.
    ///
    /// Orphans are attached to the root (logged at `warn`) or, with strict
    /// parents, removed together with their subtree (logged at `error`).
    pub fn settle(&mut self) -> Vec<Orphan> {
        let orphans = self.tree.settle();
        for orphan in &orphans {
            let err = orphan.error();
            match orphan.resolution {
                OrphanPolicy::AttachToRoot => {
                    tracing::warn!(%err, "orphaned focus node attached to root");
                }
                OrphanPolicy::Reject => {
                    tracing::error!(%err, removed = orphan.removed.len(), "orphaned focus node rejected");
                }
            }
        }
        if orphans.iter().any(|o| !o.removed.is_empty()) {
            let tree = &self.tree;
            self.handlers.retain(|id, _| tree.is_alive(*id));
        }
        orphans
    }

    /// Record the layout box of a node.
    pub fn update_layout(&mut self, key: &str, layout: Rect) -> bool {
        logged(self.tree.update_layout(key, layout), "layout update ignored")
    }

    /// Toggle whether a node may hold focus itself.
    ///
    /// The current focus is left alone even if it is the node being
    /// disabled; it only affects future moves.
    pub fn set_focusable(&mut self, key: &str, focusable: bool) -> bool {
        logged(self.tree.set_focusable(key, focusable), "focusable change ignored")
    }

    /// Replace the preferred child of a container.
    pub fn set_preferred_child(&mut self, key: &str, child: Option<FocusKey>) -> bool {
        logged(
            self.tree.set_preferred_child(key, child),
            "preferred child change ignored",
        )
    }

    // --- focus movement ---

    /// Focus `key`, or the node descent into it selects.
    ///
    /// Fires `on_blur` on the previous node and `on_focus` on the new one.
    /// Returns `false` (and logs) if the key is unknown, still pending, or
    /// holds nothing focusable; the state is then unchanged.
    pub fn focus_self(&mut self, key: &str) -> bool {
        let result = self.focus_key(key, FocusCause::Explicit);
        if let Err(err) = &result {
            tracing::warn!(%err, "focus request ignored");
        }
        self.drain_requests();
        result.is_ok()
    }

    /// Focus `key` from outside any component; same as [`Dispatcher::focus_self`].
    pub fn set_focus(&mut self, key: &str) -> bool {
        self.focus_self(key)
    }

    /// Move focus in `direction`.
    ///
    /// Arrow handlers on the focused node and its ancestors run first; any
    /// of them may stop the press. Returns `true` if focus moved. A miss
    /// leaves the state unchanged and fires no callbacks.
    pub fn dispatch_direction(&mut self, direction: Direction) -> bool {
        let moved = self.navigate(direction);
        self.drain_requests();
        moved
    }

    /// Deliver an enter press to the focused node's `on_enter_press`.
    ///
    /// Returns `true` if a handler ran.
    pub fn dispatch_enter(&mut self) -> bool {
        let Some(current) = self.focused else {
            return false;
        };
        self.enter_pressed = Some(current);
        let ran = self.fire(current, self.cause, |h| h.on_enter_press.as_mut());
        self.drain_requests();
        ran
    }

    /// Deliver an enter release to the focused node's `on_enter_release`.
    ///
    /// Only the node that saw the press receives the release; if focus moved
    /// in between, the release is dropped. Returns `true` if a handler ran.
    pub fn dispatch_enter_release(&mut self) -> bool {
        let pressed = self.enter_pressed.take();
        let Some(current) = self.focused.filter(|&f| pressed == Some(f)) else {
            return false;
        };
        let ran = self.fire(current, self.cause, |h| h.on_enter_release.as_mut());
        self.drain_requests();
        ran
    }

    /// Translate a raw key press through the [`crate::KeyMap`].
    ///
    /// Returns `false` for unmapped codes.
    pub fn handle_key_down(&mut self, code: u32) -> bool {
        match self.options.key_map.input_for(code) {
            Some(Input::Direction(direction)) => self.dispatch_direction(direction),
            Some(Input::Enter) => self.dispatch_enter(),
            None => false,
        }
    }

    /// Translate a raw key release through the [`crate::KeyMap`].
    ///
    /// Only enter has release semantics.
    pub fn handle_key_up(&mut self, code: u32) -> bool {
        match self.options.key_map.input_for(code) {
            Some(Input::Enter) => self.dispatch_enter_release(),
            Some(Input::Direction(_)) | None => false,
        }
    }

    // --- queries ---

    /// Key of the focused node.
    pub fn current_focus_key(&self) -> Option<&FocusKey> {
        self.focused.and_then(|id| self.tree.key_of(id))
    }

    /// The state machine's current state.
    pub fn state(&self) -> FocusState {
        match self.current_focus_key() {
            Some(key) => FocusState::Focused(key.clone()),
            None => FocusState::Unfocused,
        }
    }

    /// Keys from the root down to the focused node, inclusive.
    ///
    /// Empty while unfocused.
    pub fn focus_path(&self) -> Vec<FocusKey> {
        let Some(focused) = self.focused else {
            return Vec::new();
        };
        self.tree
            .path_to(focused)
            .into_iter()
            .filter_map(|id| self.tree.key_of(id).cloned())
            .collect()
    }

    /// Returns true if `key` holds focus.
    pub fn is_focused(&self, key: &str) -> bool {
        self.focused.is_some() && self.focused == self.tree.id_of(key)
    }

    /// Returns true if `key` tracks children and one of its descendants holds focus.
    pub fn has_focused_child(&self, key: &str) -> bool {
        self.tree
            .id_of(key)
            .is_some_and(|id| self.tree.has_focused_child(id))
    }

    /// Returns true if `key` is registered (linked or pending).
    pub fn is_registered(&self, key: &str) -> bool {
        self.tree.contains_key(key)
    }

    /// The opaque host data attached at registration.
    pub fn extra_props(&self, key: &str) -> Option<&dyn Any> {
        let id = self.tree.id_of(key)?;
        self.handlers.get(&id)?.extra_props.as_deref()
    }

    /// Boxes of every measured, linked node in document order.
    ///
    /// Empty unless [`InitOptions::visual_debug`] is set.
    pub fn debug_overlay(&self) -> Vec<OverlayBox> {
        if !self.options.visual_debug {
            return Vec::new();
        }
        let mut boxes = Vec::new();
        let mut cursor = self.tree.next_depth_first(self.tree.root());
        while let Some(id) = cursor {
            if let (Some(rect), Some(key)) = (self.tree.layout(id), self.tree.key_of(id)) {
                boxes.push(OverlayBox {
                    focus_key: key.clone(),
                    rect,
                    depth: self.tree.ancestors(id).count(),
                    focusable: self.tree.flags(id).contains(FocusFlags::FOCUSABLE),
                    focused: self.focused == Some(id),
                    has_focused_child: self.tree.has_focused_child(id),
                });
            }
            cursor = self.tree.next_depth_first(id);
        }
        boxes
    }

    // --- internals ---

    fn generate_key(&mut self) -> FocusKey {
        loop {
            let key = format!("sn:focusable-item-{}", self.generated_keys);
            self.generated_keys += 1;
            if !self.tree.contains_key(&key) {
                return FocusKey::from(key);
            }
        }
    }

    fn focus_key(&mut self, key: &str, cause: FocusCause) -> Result<NodeId, FocusError> {
        let id = self
            .tree
            .id_of(key)
            .ok_or_else(|| TreeError::UnknownKey(FocusKey::from(key)))?;
        if !self.tree.is_linked(id) {
            return Err(FocusError::Detached(FocusKey::from(key)));
        }
        let target =
            descend(&self.tree, id).ok_or_else(|| FocusError::NothingFocusable(FocusKey::from(key)))?;
        self.move_focus(target, cause);
        Ok(target)
    }

    fn navigate(&mut self, direction: Direction) -> bool {
        let Some(current) = self.focused else {
            if self.options.debug {
                tracing::debug!(?direction, "direction ignored while unfocused");
            }
            return false;
        };
        if self.intercepted(current, direction) {
            return false;
        }
        match self.resolver.resolve(&self.tree, current, direction) {
            Some(next) => {
                self.move_focus(next, FocusCause::Direction(direction));
                true
            }
            None => {
                if self.options.debug {
                    tracing::debug!(?direction, from = ?self.current_focus_key(), "no focus candidate");
                }
                false
            }
        }
    }

    /// Run arrow handlers from the focused node up to the root.
    fn intercepted(&mut self, current: NodeId, direction: Direction) -> bool {
        let Some(details) = self.details(current, self.cause) else {
            return false;
        };
        let seq = bubble_path(&self.tree, current);
        let handlers = &mut self.handlers;
        let stopped = run(&seq, &mut self.requests, |d, requests| {
            match handlers.get_mut(&d.node).and_then(|h| h.on_arrow_press.as_mut()) {
                Some(on_arrow_press) => on_arrow_press(direction, &details, requests),
                None => Outcome::Continue,
            }
        });
        if let Some(stop) = stopped {
            if self.options.debug {
                tracing::debug!(
                    ?direction,
                    by = ?self.tree.key_of(stop.node),
                    phase = ?stop.phase,
                    "arrow press intercepted"
                );
            }
            return true;
        }
        false
    }

    /// Blur the old node, update focus memory, then focus `target`.
    fn move_focus(&mut self, target: NodeId, cause: FocusCause) {
        let previous = self.focused;
        if previous == Some(target) {
            return;
        }
        if let Some(prev) = previous {
            self.fire(prev, cause, |h| h.on_blur.as_mut());
        }
        self.focused = Some(target);
        self.cause = cause;
        self.tree.update_focus_memory(previous, Some(target));
        if self.options.debug {
            tracing::debug!(
                from = ?previous.and_then(|p| self.tree.key_of(p)),
                to = ?self.tree.key_of(target),
                ?cause,
                "focus moved"
            );
        }
        self.fire(target, cause, |h| h.on_focus.as_mut());
    }

    /// Call one of `id`'s handlers. Returns `true` if it had one.
    fn fire(
        &mut self,
        id: NodeId,
        cause: FocusCause,
        pick: impl FnOnce(&mut Handlers) -> Option<&mut FocusHandler>,
    ) -> bool {
        let Some(details) = self.details(id, cause) else {
            return false;
        };
        match self.handlers.get_mut(&id).and_then(pick) {
            Some(handler) => {
                handler(&details, &mut self.requests);
                true
            }
            None => false,
        }
    }

    fn details(&self, id: NodeId, cause: FocusCause) -> Option<FocusDetails> {
        Some(FocusDetails {
            focus_key: self.tree.key_of(id)?.clone(),
            layout: self.tree.layout(id),
            cause,
        })
    }

    /// Pick a new focus after the focused node was removed.
    ///
    /// Walks surviving ancestors from `start`: an auto-restoring ancestor
    /// re-enters its children, otherwise a focusable ancestor takes focus
    /// itself. An ancestor that is neither only stops its own children from
    /// being entered; the walk goes on to its parent and ends at a focus
    /// boundary.
    fn restore(&mut self, start: Option<NodeId>) {
        let mut cursor = start;
        while let Some(ancestor) = cursor.filter(|&a| self.tree.is_linked(a)) {
            let flags = self.tree.flags(ancestor);
            if flags.contains(FocusFlags::AUTO_RESTORE_FOCUS)
                && let Some(target) = descend_children(&self.tree, ancestor)
            {
                self.move_focus(target, FocusCause::Restore);
                return;
            }
            if flags.contains(FocusFlags::FOCUSABLE) {
                self.move_focus(ancestor, FocusCause::Restore);
                return;
            }
            if flags.contains(FocusFlags::FOCUS_BOUNDARY) {
                break;
            }
            cursor = self.tree.parent_of(ancestor);
        }
        if self.options.debug {
            tracing::debug!("focus lost with nothing to restore; unfocused");
        }
    }

    /// Apply focus changes queued by callbacks, in order.
    fn drain_requests(&mut self) {
        let limit = self.options.max_deferred_requests;
        let mut processed = 0_usize;
        while let Some(request) = self.requests.pop_front() {
            if processed == limit {
                let dropped = self.requests.len() + 1;
                self.requests.clear();
                tracing::warn!(dropped, limit, "deferred focus requests over limit; dropped");
                return;
            }
            processed += 1;
            match request {
                Request::Focus(key) => {
                    if let Err(err) = self.focus_key(key.as_str(), FocusCause::Explicit) {
                        tracing::warn!(%err, "deferred focus request ignored");
                    }
                }
                Request::Navigate(direction) => {
                    self.navigate(direction);
                }
            }
        }
    }
}

fn logged<T>(result: Result<T, TreeError>, message: &'static str) -> bool {
    match result {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(%err, "{message}");
            false
        }
    }
}

impl<P: fmt::Debug> fmt::Debug for Dispatcher<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("options", &self.options)
            .field("tree", &self.tree)
            .field("resolver", &self.resolver)
            .field("handlers", &self.handlers)
            .field("focused", &self.focused)
            .field("cause", &self.cause)
            .field("queued", &self.requests.len())
            .finish_non_exhaustive()
    }
}
