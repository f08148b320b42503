// Copyright 2025 the Dpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Values passed to node callbacks, and the deferred request queue.

use alloc::collections::VecDeque;

use dpad_focus_tree::FocusKey;
use dpad_resolver::Direction;
use kurbo::Rect;

/// Why focus moved.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FocusCause {
    /// [`crate::Dispatcher::focus_self`] or a queued [`FocusRequests::focus`].
    Explicit,
    /// A directional press.
    Direction(Direction),
    /// The focused node was unregistered and focus was restored elsewhere.
    Restore,
}

/// Snapshot of a node handed to its callbacks.
#[derive(Clone, Debug, PartialEq)]
pub struct FocusDetails {
    /// Key of the node the callback belongs to.
    pub focus_key: FocusKey,
    /// The node's last reported layout box, if measured.
    ///
    /// Scrolling containers typically read `layout.x0` in `on_focus` to bring
    /// the focused tile into view.
    pub layout: Option<Rect>,
    /// What caused the focus change (for enter and arrow callbacks: what
    /// caused the current focus).
    pub cause: FocusCause,
}

/// Observable dispatcher state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FocusState {
    /// Nothing focused: before the first successful focus, or after the
    /// focused node disappeared with nowhere to restore to.
    Unfocused,
    /// The node with this key holds focus.
    Focused(FocusKey),
}

/// Propagation control returned by arrow-press handlers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Keep going: let ancestors see the press, then resolve it.
    Continue,
    /// Swallow the press: no further handlers, no default resolution.
    Stop,
}

/// A focus change requested from inside a callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    /// Focus the node with this key, as if by [`crate::Dispatcher::focus_self`].
    Focus(FocusKey),
    /// Navigate in this direction, as if by [`crate::Dispatcher::dispatch_direction`].
    Navigate(Direction),
}

/// Queue of focus changes requested by callbacks.
///
/// Callbacks cannot reach the dispatcher while it is mid-transition. They
/// record requests here instead; the dispatcher processes them in order once
/// the current operation has finished firing callbacks.
#[derive(Clone, Debug, Default)]
pub struct FocusRequests {
    queue: VecDeque<Request>,
}

impl FocusRequests {
    /// Request focus on `key` after the current operation.
    pub fn focus(&mut self, key: impl Into<FocusKey>) {
        self.queue.push_back(Request::Focus(key.into()));
    }

    /// Request a directional move after the current operation.
    pub fn navigate(&mut self, direction: Direction) {
        self.queue.push_back(Request::Navigate(direction));
    }

    /// Number of queued requests.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub(crate) fn pop_front(&mut self) -> Option<Request> {
        self.queue.pop_front()
    }

    pub(crate) fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_are_fifo() {
        let mut requests = FocusRequests::default();
        assert!(requests.is_empty());
        requests.focus("a");
        requests.navigate(Direction::Left);
        assert_eq!(requests.len(), 2);
        assert_eq!(requests.pop_front(), Some(Request::Focus(FocusKey::from("a"))));
        assert_eq!(requests.pop_front(), Some(Request::Navigate(Direction::Left)));
        assert_eq!(requests.pop_front(), None);
    }
}
