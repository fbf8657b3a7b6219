// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use nalgebra::Point3;

use super::add_ring;
use crate::mesh::{Mesh, Polygon};

/// Shape of a unit-length arrow pointing along +X.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowParams {
    /// Length of the conical tip, as a fraction of the arrow length
    pub tip_length: f64,
    /// Radius of the cone base
    pub tip_radius: f64,
    /// Number of sides of the cone
    pub tip_resolution: u32,
    /// Radius of the cylindrical shaft
    pub shaft_radius: f64,
    /// Number of sides of the shaft
    pub shaft_resolution: u32,
}

impl Default for ArrowParams {
    fn default() -> Self {
        Self {
            tip_length: 0.35,
            tip_radius: 0.1,
            tip_resolution: 6,
            shaft_radius: 0.03,
            shaft_resolution: 6,
        }
    }
}

impl ArrowParams {
    pub const MIN_RESOLUTION: u32 = 3;
    pub const MAX_RESOLUTION: u32 = 128;

    /// Clamp every field into its legal range. NaN lengths become zero.
    pub fn clamped(self) -> Self {
        let clamp = |v: f64, max: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, max) };
        Self {
            tip_length: clamp(self.tip_length, 1.0),
            tip_radius: clamp(self.tip_radius, 10.0),
            tip_resolution: self
                .tip_resolution
                .clamp(Self::MIN_RESOLUTION, Self::MAX_RESOLUTION),
            shaft_radius: clamp(self.shaft_radius, 5.0),
            shaft_resolution: self
                .shaft_resolution
                .clamp(Self::MIN_RESOLUTION, Self::MAX_RESOLUTION),
        }
    }
}

/// Arrow from the origin to `(1, 0, 0)`: a capped cylinder up to
/// `1 - tip_length` followed by a capped cone.
///
/// Parameters are clamped first. Parts that collapse to zero length or
/// radius are left out.
pub fn arrow(params: &ArrowParams) -> Mesh {
    let params = params.clamped();
    let shaft_end = 1.0 - params.tip_length;
    let mut mesh = Mesh::new();

    if shaft_end > 0.0 && params.shaft_radius > 0.0 {
        let n = params.shaft_resolution;
        let back = add_ring(&mut mesh, 0.0, params.shaft_radius, n);
        let front = add_ring(&mut mesh, shaft_end, params.shaft_radius, n);
        for i in 0..n {
            let j = (i + 1) % n;
            mesh.add_polygon(&[back + i, back + j, front + j, front + i]);
        }
        // back cap faces -X, front cap +X
        mesh.polygons.push((0..n).rev().map(|i| back + i).collect::<Polygon>());
        mesh.polygons.push((0..n).map(|i| front + i).collect::<Polygon>());
    }

    if params.tip_length > 0.0 && params.tip_radius > 0.0 {
        let n = params.tip_resolution;
        let base = add_ring(&mut mesh, shaft_end, params.tip_radius, n);
        let apex = mesh.add_point(Point3::new(1.0, 0.0, 0.0));
        for i in 0..n {
            mesh.add_triangle(base + i, base + (i + 1) % n, apex);
        }
        mesh.polygons.push((0..n).rev().map(|i| base + i).collect::<Polygon>());
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_arrow() {
        let mesh = arrow(&ArrowParams::default());
        // shaft: 2 rings of 6, cone: ring of 6 + apex
        assert_eq!(mesh.point_count(), 19);
        // shaft: 6 sides + 2 caps, cone: 6 sides + 1 cap
        assert_eq!(mesh.polygon_count(), 15);
        assert!(mesh.validate().is_ok());

        let (min, max) = mesh.bounds();
        assert_relative_eq!(min.x, 0.0);
        assert_relative_eq!(max.x, 1.0);
        assert_relative_eq!(max.y, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_arrow_sides_point_outward() {
        let mesh = arrow(&ArrowParams::default());
        for polygon in 0..mesh.polygon_count() {
            let normal = mesh.polygon_normal(polygon);
            let first = mesh.point(mesh.polygons[polygon][0] as usize);
            // radial component of the normal agrees with the radial position
            let radial = normal.y * first.y + normal.z * first.z;
            if normal.x.abs() < 1e-9 {
                assert!(radial > 0.0);
            }
        }
    }

    #[test]
    fn test_parameters_are_clamped() {
        let params = ArrowParams {
            tip_length: 3.0,
            tip_radius: -1.0,
            tip_resolution: 1,
            shaft_radius: 99.0,
            shaft_resolution: 1000,
        }
        .clamped();
        assert_eq!(params.tip_length, 1.0);
        assert_eq!(params.tip_radius, 0.0);
        assert_eq!(params.tip_resolution, 3);
        assert_eq!(params.shaft_radius, 5.0);
        assert_eq!(params.shaft_resolution, 128);
    }

    #[test]
    fn test_full_length_tip_has_no_shaft() {
        let mesh = arrow(&ArrowParams {
            tip_length: 1.0,
            ..ArrowParams::default()
        });
        assert_eq!(mesh.point_count(), 7);
        assert_eq!(mesh.polygon_count(), 7);
    }
}
