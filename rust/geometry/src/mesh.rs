// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon mesh data structure

use nalgebra::{Matrix4, Point3, Vector3};
use smallvec::SmallVec;

use crate::{Error, Result};

/// Point indices of one polygon. Triangles and quads stay inline.
pub type Polygon = SmallVec<[u32; 4]>;

/// Polygon mesh with double precision points.
///
/// Points are stored flat (`x, y, z` per point) the same way render buffers
/// are laid out; polygons index into them and may have any number of
/// corners.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Point positions (x, y, z)
    pub positions: Vec<f64>,
    /// Polygons as point index lists, counter-clockwise seen from outside
    pub polygons: Vec<Polygon>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            polygons: Vec::new(),
        }
    }

    /// Create a mesh with capacity
    pub fn with_capacity(point_count: usize, polygon_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(point_count * 3),
            polygons: Vec::with_capacity(polygon_count),
        }
    }

    /// Add a point and return its index
    #[inline]
    pub fn add_point(&mut self, point: Point3<f64>) -> u32 {
        let index = self.point_count() as u32;
        self.positions.extend_from_slice(&[point.x, point.y, point.z]);
        index
    }

    /// Add a polygon from point indices
    #[inline]
    pub fn add_polygon(&mut self, indices: &[u32]) {
        self.polygons.push(Polygon::from_slice(indices));
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.add_polygon(&[i0, i1, i2]);
    }

    /// Position of point `index`
    ///
    /// Panics if `index` is out of range.
    #[inline]
    pub fn point(&self, index: usize) -> Point3<f64> {
        let base = index * 3;
        Point3::new(
            self.positions[base],
            self.positions[base + 1],
            self.positions[base + 2],
        )
    }

    /// Iterate over all point positions
    pub fn points(&self) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.positions
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
    }

    /// Get point count
    #[inline]
    pub fn point_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get polygon count
    #[inline]
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Check if mesh has no points
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Check every polygon index against the point count
    pub fn validate(&self) -> Result<()> {
        let point_count = self.point_count();
        for (polygon, indices) in self.polygons.iter().enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= point_count) {
                return Err(Error::IndexOutOfBounds {
                    polygon,
                    index,
                    point_count,
                });
            }
        }
        Ok(())
    }

    /// Append another mesh, offsetting its polygon indices
    pub fn merge(&mut self, other: &Mesh) {
        if other.is_empty() {
            return;
        }

        let offset = self.point_count() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.polygons.reserve(other.polygons.len());
        self.polygons.extend(
            other
                .polygons
                .iter()
                .map(|p| p.iter().map(|&i| i + offset).collect::<Polygon>()),
        );
    }

    /// Apply an affine transform to every point in place
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        if *matrix == Matrix4::identity() {
            return;
        }
        for chunk in self.positions.chunks_exact_mut(3) {
            let p = matrix.transform_point(&Point3::new(chunk[0], chunk[1], chunk[2]));
            chunk[0] = p.x;
            chunk[1] = p.y;
            chunk[2] = p.z;
        }
    }

    /// Write a transformed copy of this mesh into `out`, reusing its storage
    pub fn transform_into(&self, matrix: &Matrix4<f64>, out: &mut Mesh) {
        out.clear();
        out.positions.extend_from_slice(&self.positions);
        out.polygons.extend(self.polygons.iter().cloned());
        out.transform(matrix);
    }

    /// Reverse the corner order of every polygon (flips facing)
    pub fn reverse_winding(&mut self) {
        for polygon in &mut self.polygons {
            polygon.reverse();
        }
    }

    /// Area-weighted normal of a polygon (Newell's method, not normalized)
    pub fn polygon_normal(&self, polygon: usize) -> Vector3<f64> {
        let indices = &self.polygons[polygon];
        let mut normal = Vector3::zeros();
        for (k, &i) in indices.iter().enumerate() {
            let a = self.point(i as usize);
            let b = self.point(indices[(k + 1) % indices.len()] as usize);
            normal.x += (a.y - b.y) * (a.z + b.z);
            normal.y += (a.z - b.z) * (a.x + b.x);
            normal.z += (a.x - b.x) * (a.y + b.y);
        }
        normal
    }

    /// Unit point normals averaged from adjacent polygon normals.
    ///
    /// Points not used by any polygon (or only by degenerate ones) get a zero
    /// vector.
    pub fn point_normals(&self) -> Vec<Vector3<f64>> {
        let mut normals = vec![Vector3::zeros(); self.point_count()];
        for polygon in 0..self.polygons.len() {
            let normal = self.polygon_normal(polygon);
            for &i in &self.polygons[polygon] {
                normals[i as usize] += normal;
            }
        }
        for normal in &mut normals {
            let length = normal.norm();
            if length > f64::EPSILON {
                *normal /= length;
            }
        }
        normals
    }

    /// Calculate bounds (min, max)
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);
        for p in self.points() {
            min = min.inf(&p);
            max = max.sup(&p);
        }
        (min, max)
    }

    /// Clear the mesh, keeping allocations
    #[inline]
    pub fn clear(&mut self) {
        self.positions.clear();
        self.polygons.clear();
    }
}
