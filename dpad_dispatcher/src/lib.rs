// Copyright 2025 the Dpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dpad Dispatcher: the focus state machine for directional-pad UIs.
//!
//! A [`Dispatcher`] owns a [`FocusTree`](dpad_focus_tree::FocusTree) and the
//! single focus pointer. The presentation layer talks to it through a small
//! interface:
//!
//! - [`Dispatcher::register_node`] / [`Dispatcher::unregister_node`] as
//!   components mount and unmount, with a [`NodeConfig`] describing flags and
//!   callbacks.
//! - [`Dispatcher::update_layout`] after each layout pass.
//! - [`Dispatcher::focus_self`] to jump, typically once a screen's data has
//!   arrived.
//! - [`Dispatcher::dispatch_direction`], [`Dispatcher::dispatch_enter`] and
//!   [`Dispatcher::dispatch_enter_release`], or the raw
//!   [`Dispatcher::handle_key_down`] / [`Dispatcher::handle_key_up`] through a
//!   [`KeyMap`].
//!
//! ## States
//!
//! [`FocusState::Unfocused`] until the first successful focus, and again if
//! the focused node disappears with nowhere to go. Otherwise
//! [`FocusState::Focused`]. Registering nodes never moves focus.
//!
//! ## Callbacks
//!
//! `on_blur` of the old node always fires before `on_focus` of the new one.
//! Callbacks get a [`FocusDetails`] and a [`FocusRequests`] queue; focus
//! changes requested there run after the current operation, in order, up to
//! [`InitOptions::max_deferred_requests`] per operation.
//!
//! Before a directional press is resolved, `on_arrow_press` handlers run on
//! the focused node and then on each ancestor; the first [`Outcome::Stop`]
//! swallows the press.
//!
//! ## Restoration
//!
//! When the focused node is unregistered, its surviving ancestors are tried
//! from the nearest up. An ancestor with `auto_restore_focus` re-enters its
//! children (preferred child, then last focused child, then document order);
//! otherwise a focusable ancestor takes focus itself. A container with
//! `auto_restore_focus` off is skipped, not a dead end: the walk continues
//! above it and stops only at a focus boundary. If nothing qualifies the
//! dispatcher becomes unfocused.
//!
//! ## Example
//!
//! ```rust
//! use dpad_dispatcher::{Dispatcher, FocusState, NodeConfig};
//! use dpad_resolver::Direction;
//! use kurbo::Rect;
//!
//! let mut nav = Dispatcher::new();
//! nav.register_node(NodeConfig::new().key("A")).unwrap();
//! nav.register_node(NodeConfig::new().key("B")).unwrap();
//! nav.update_layout("A", Rect::new(0.0, 0.0, 80.0, 80.0));
//! nav.update_layout("B", Rect::new(100.0, 0.0, 180.0, 80.0));
//!
//! assert!(nav.focus_self("A"));
//! assert!(nav.dispatch_direction(Direction::Right));
//! assert_eq!(nav.state(), FocusState::Focused("B".into()));
//! // Nothing further right: state unchanged.
//! assert!(!nav.dispatch_direction(Direction::Right));
//! assert!(nav.is_focused("B"));
//! ```
//!
//! ## Logging
//!
//! Diagnostics go through [`tracing`]. With [`InitOptions::debug`] set,
//! registration, resolution and focus transitions are traced at `debug`.
//! Misuse is always reported at `warn` or `error`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod dispatcher;
mod error;
mod events;
mod keymap;
mod overlay;
mod propagate;

pub use config::{ArrowHandler, FocusHandler, InitOptions, NodeConfig};
pub use dispatcher::{Dispatcher, Registration};
pub use error::FocusError;
pub use events::{FocusCause, FocusDetails, FocusRequests, FocusState, Outcome, Request};
pub use keymap::{Input, KeyMap};
pub use overlay::OverlayBox;
