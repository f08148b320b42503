// Copyright 2025 the Dpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use dpad_focus_tree::{FocusKey, TreeError};

/// Why a dispatcher operation could not be carried out.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FocusError {
    /// The underlying tree rejected the operation.
    #[error(transparent)]
    Tree(#[from] TreeError),
    /// The node is still waiting for its parent to register.
    #[error("focus key `{0}` is not linked into the tree yet")]
    Detached(FocusKey),
    /// Neither the node nor any of its descendants can take focus.
    #[error("focus key `{0}` has no focusable target")]
    NothingFocusable(FocusKey),
}
