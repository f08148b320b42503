// Copyright 2025 the Dpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by tree mutations.

use crate::types::FocusKey;

/// Failure of a [`crate::FocusTree`] mutation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// A live registration (linked or pending) already owns this key.
    #[error("focus key `{0}` is already registered")]
    DuplicateKey(FocusKey),
    /// A pending node outlived its grace period without its parent appearing.
    #[error("parent `{parent}` of focus key `{key}` was never registered")]
    ParentNotFound {
        /// Key of the orphaned node.
        key: FocusKey,
        /// Parent key the node was waiting for.
        parent: FocusKey,
    },
    /// No node is registered under this key.
    #[error("focus key `{0}` is not registered")]
    UnknownKey(FocusKey),
    /// The root node cannot be unregistered.
    #[error("the root focus node cannot be unregistered")]
    RootIsPermanent,
}
