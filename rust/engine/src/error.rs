// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the modeling engine.

use dynmod_scene::NodeKey;

/// Result type alias for engine operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A tool's descriptors are malformed. Raised while a tool is built or
/// registered, never while it runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("enumerated parameter '{0}' has no legal values")]
    EmptyChoices(String),

    #[error("default '{default}' of parameter '{key}' is not one of its legal values")]
    DefaultNotInChoices { key: String, default: String },

    #[error("default of parameter '{key}' does not match its {kind} kind")]
    DefaultKindMismatch { key: String, kind: &'static str },

    #[error("role '{0}' is declared by more than one port")]
    DuplicateRole(String),

    #[error("parameter key '{0}' is declared more than once")]
    DuplicateParameterKey(String),

    #[error("a tool named '{0}' is already registered")]
    DuplicateToolName(String),
}

/// Errors raised by the engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("node {0:?} is not an operation")]
    NotAnOperation(NodeKey),

    #[error("transform of node '{0}' cannot be inverted")]
    SingularTransform(String),

    #[error(transparent)]
    Scene(#[from] dynmod_scene::Error),

    #[error(transparent)]
    Geometry(#[from] dynmod_geometry::Error),
}
