// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dynamic Modeler Geometry
//!
//! Polygon meshes and the geometric building blocks the modeling tools are
//! made of: affine helpers on top of nalgebra, coincident point merging,
//! polygon triangulation with earcutr, primitive generators and linear
//! extrusion.

pub mod clean;
pub mod error;
pub mod extrusion;
pub mod mesh;
pub mod primitives;
pub mod spatial;
pub mod transform;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Vector3};

pub use clean::{CleanStats, MeshCleaner};
pub use error::{Error, Result};
pub use extrusion::{extrude_linear, ExtrusionDirection};
pub use mesh::{Mesh, Polygon};
pub use primitives::{arrow, cube, ArrowParams};
pub use spatial::SpatialGrid;
pub use triangulation::{triangulate_mesh, triangulate_polygon};
