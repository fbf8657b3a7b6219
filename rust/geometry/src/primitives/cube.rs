// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use nalgebra::Point3;

use crate::mesh::Mesh;

/// Corner order of each face, counter-clockwise seen from outside.
/// Corner `i` sits at `+x` if bit 0 is set, `+y` for bit 1, `+z` for bit 2.
const FACES: [[u32; 4]; 6] = [
    [0, 4, 6, 2], // -X
    [1, 3, 7, 5], // +X
    [0, 1, 5, 4], // -Y
    [2, 6, 7, 3], // +Y
    [0, 2, 3, 1], // -Z
    [4, 5, 7, 6], // +Z
];

/// Axis-aligned box centred at the origin with 8 points and 6 quads.
///
/// Negative lengths are treated as their absolute value.
pub fn cube(x_length: f64, y_length: f64, z_length: f64) -> Mesh {
    let half = [
        x_length.abs() / 2.0,
        y_length.abs() / 2.0,
        z_length.abs() / 2.0,
    ];

    let mut mesh = Mesh::with_capacity(8, 6);
    for corner in 0..8u32 {
        let sign = |bit: u32| if corner & bit != 0 { 1.0 } else { -1.0 };
        mesh.add_point(Point3::new(
            sign(1) * half[0],
            sign(2) * half[1],
            sign(4) * half[2],
        ));
    }
    for face in &FACES {
        mesh.add_polygon(face);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_dimensions() {
        let mesh = cube(10.0, 25.0, 50.0);
        assert_eq!(mesh.point_count(), 8);
        assert_eq!(mesh.polygon_count(), 6);

        let (min, max) = mesh.bounds();
        assert_relative_eq!(min, Point3::new(-5.0, -12.5, -25.0));
        assert_relative_eq!(max, Point3::new(5.0, 12.5, 25.0));
    }

    #[test]
    fn test_cube_faces_point_outward() {
        let mesh = cube(1.0, 2.0, 3.0);
        for polygon in 0..mesh.polygon_count() {
            let normal = mesh.polygon_normal(polygon);
            let centre = mesh.polygons[polygon]
                .iter()
                .map(|&i| mesh.point(i as usize).coords)
                .sum::<nalgebra::Vector3<f64>>()
                / 4.0;
            assert!(normal.dot(&centre) > 0.0, "face {polygon} points inward");
        }
    }
}
