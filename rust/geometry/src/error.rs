// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during geometry processing
#[derive(Error, Debug)]
pub enum Error {
    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    #[error("Polygon {polygon} references point {index} but the mesh has {point_count} points")]
    IndexOutOfBounds {
        polygon: usize,
        index: u32,
        point_count: usize,
    },

    #[error("Direction count {directions} does not match point count {points}")]
    DirectionCountMismatch { directions: usize, points: usize },

    #[error("Invalid geometry parameter: {0}")]
    InvalidParameter(String),
}
