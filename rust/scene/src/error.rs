// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for scene operations.

use crate::keys::NodeKey;
use crate::node::NodeKind;

/// Result type alias for scene operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or editing a scene.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A key does not refer to a live node.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeKey),

    /// The node exists but holds a different kind of data.
    #[error("node '{node}' is a {found}, expected {expected}")]
    WrongNodeKind {
        node: String,
        expected: NodeKind,
        found: NodeKind,
    },

    /// Only linear transform nodes can be parents.
    #[error("node '{0}' is not a linear transform and cannot be a parent")]
    NotATransform(String),

    /// Assigning the parent would make a node its own ancestor.
    #[error("making '{parent}' the parent of '{node}' would create a cycle")]
    ParentCycle { node: String, parent: String },

    /// A scene description names a node that does not exist.
    #[error("unknown node name: {0}")]
    UnknownNodeName(String),

    /// A scene description uses the same name twice.
    #[error("duplicate node name: {0}")]
    DuplicateNodeName(String),

    /// Mesh data in a scene description is inconsistent.
    #[error("invalid mesh: {0}")]
    InvalidMesh(#[from] dynmod_geometry::Error),
}
