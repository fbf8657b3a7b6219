// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Linear extrusion of polygon meshes
//!
//! Every point is swept along its own offset vector. The original surface
//! becomes the bottom cap (winding reversed), the swept copy the top cap, and
//! each boundary edge (an edge used by exactly one polygon) gets a side wall.
//! The result is triangulated.

use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;

use crate::mesh::{Mesh, Polygon};
use crate::triangulation::triangulate_mesh;
use crate::{Error, Result};

/// How far and where each point is swept.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtrusionDirection {
    /// Along the unit point normal, times the distance
    PointNormals(f64),
    /// The same offset for every point
    Vector(Vector3<f64>),
    /// Toward `target` by `distance` (unit direction per point)
    TowardPoint { target: Point3<f64>, distance: f64 },
    /// `scale * (p - origin)` for each point `p`
    FromPoint { origin: Point3<f64>, scale: f64 },
    /// Explicit offset per point, in point order
    PerPoint(Vec<Vector3<f64>>),
}

impl ExtrusionDirection {
    fn offsets(&self, mesh: &Mesh) -> Result<Vec<Vector3<f64>>> {
        let offsets = match self {
            Self::PointNormals(distance) => mesh
                .point_normals()
                .into_iter()
                .map(|n| n * *distance)
                .collect(),
            Self::Vector(v) => vec![*v; mesh.point_count()],
            Self::TowardPoint { target, distance } => mesh
                .points()
                .map(|p| (*target - p).try_normalize(1e-12).unwrap_or_else(Vector3::zeros) * *distance)
                .collect(),
            Self::FromPoint { origin, scale } => {
                mesh.points().map(|p| (p - *origin) * *scale).collect()
            }
            Self::PerPoint(offsets) => {
                if offsets.len() != mesh.point_count() {
                    return Err(Error::DirectionCountMismatch {
                        directions: offsets.len(),
                        points: mesh.point_count(),
                    });
                }
                offsets.clone()
            }
        };
        Ok(offsets)
    }
}

/// Extrude `mesh` and return a closed, triangulated surface.
///
/// An empty input yields an empty mesh.
pub fn extrude_linear(mesh: &Mesh, direction: &ExtrusionDirection) -> Result<Mesh> {
    mesh.validate()?;
    if mesh.is_empty() || mesh.polygons.is_empty() {
        return Ok(Mesh::new());
    }

    let offsets = direction.offsets(mesh)?;
    let n = mesh.point_count() as u32;

    let mut swept = Mesh::with_capacity(mesh.point_count() * 2, mesh.polygon_count() * 2);
    swept.positions.extend_from_slice(&mesh.positions);
    for (p, offset) in mesh.points().zip(&offsets) {
        swept.add_point(p + *offset);
    }

    // bottom
    for polygon in &mesh.polygons {
        swept.polygons.push(polygon.iter().rev().copied().collect::<Polygon>());
    }
    // top
    for polygon in &mesh.polygons {
        swept.polygons.push(polygon.iter().map(|&i| i + n).collect::<Polygon>());
    }
    // walls
    for (a, b) in boundary_edges(mesh) {
        swept.add_polygon(&[a, b, b + n, a + n]);
    }

    triangulate_mesh(&swept)
}

/// Directed boundary edges in polygon order. An edge is on the boundary when
/// no other polygon uses it in either direction.
fn boundary_edges(mesh: &Mesh) -> Vec<(u32, u32)> {
    let mut usage: FxHashMap<(u32, u32), u32> = FxHashMap::default();
    let edges = || {
        mesh.polygons.iter().flat_map(|polygon| {
            (0..polygon.len()).map(move |k| (polygon[k], polygon[(k + 1) % polygon.len()]))
        })
    };

    for (a, b) in edges() {
        *usage.entry((a.min(b), a.max(b))).or_default() += 1;
    }
    edges()
        .filter(|&(a, b)| a != b && usage.get(&(a.min(b), a.max(b))) == Some(&1))
        .collect()
}
