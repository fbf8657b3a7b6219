// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! Planar polygons in 3D are projected onto their own plane and handed to
//! earcutr. Triangles, quads and small convex polygons skip the ear clipper.

use nalgebra::{Point2, Point3, Vector3};

use crate::mesh::Mesh;
use crate::transform::perpendicular;
use crate::{Error, Result};

/// Check if a polygon is convex (all cross products have same sign)
#[inline]
fn is_convex(points: &[Point2<f64>]) -> bool {
    let n = points.len();
    let mut sign = 0i8;

    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];

        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);
        if cross.abs() > 1e-10 {
            let current = if cross > 0.0 { 1i8 } else { -1i8 };
            if sign == 0 {
                sign = current;
            } else if sign != current {
                return false;
            }
        }
    }

    true
}

#[inline]
fn fan_triangulate(n: usize) -> Vec<[usize; 3]> {
    (1..n - 1).map(|i| [0, i, i + 1]).collect()
}

/// Newell normal of a closed point loop, normalized. Falls back to +Z.
pub fn polygon_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut normal = Vector3::<f64>::zeros();
    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal.try_normalize(1e-12).unwrap_or_else(Vector3::z)
}

/// Project 3D points onto the plane with the given normal.
///
/// The 2D basis is right-handed with respect to `normal`, so a loop that is
/// counter-clockwise around the normal stays counter-clockwise in 2D.
pub fn project_to_2d(points: &[Point3<f64>], normal: &Vector3<f64>) -> Vec<Point2<f64>> {
    let Some(origin) = points.first() else {
        return Vec::new();
    };
    let u_axis = perpendicular(normal);
    let v_axis = normal.cross(&u_axis);

    points
        .iter()
        .map(|p| {
            let v = p - origin;
            Point2::new(v.dot(&u_axis), v.dot(&v_axis))
        })
        .collect()
}

/// Triangulate a planar polygon given by its corner positions.
///
/// Returned triangles index into `points` and keep the polygon's winding.
pub fn triangulate_polygon(points: &[Point3<f64>]) -> Result<Vec<[usize; 3]>> {
    let n = points.len();
    if n < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points to triangulate".to_string(),
        ));
    }

    // FAST PATH: Triangle or quad
    if n == 3 {
        return Ok(vec![[0, 1, 2]]);
    }
    if n == 4 {
        return Ok(vec![[0, 1, 2], [0, 2, 3]]);
    }

    let normal = polygon_normal(points);
    let projected = project_to_2d(points, &normal);

    // FAST PATH: Convex polygon
    if n <= 8 && is_convex(&projected) {
        return Ok(fan_triangulate(n));
    }

    let mut vertices = Vec::with_capacity(n * 2);
    for p in &projected {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    let indices = earcutr::earcut(&vertices, &[], 2)
        .map_err(|e| Error::TriangulationError(format!("{:?}", e)))?;

    // earcut does not promise an output orientation
    Ok(indices
        .chunks_exact(3)
        .map(|t| {
            let (a, b, c) = (&projected[t[0]], &projected[t[1]], &projected[t[2]]);
            let area = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
            if area < 0.0 {
                [t[0], t[2], t[1]]
            } else {
                [t[0], t[1], t[2]]
            }
        })
        .collect())
}

/// Replace every polygon of `mesh` with triangles. Points are untouched.
pub fn triangulate_mesh(mesh: &Mesh) -> Result<Mesh> {
    let mut out = Mesh::with_capacity(mesh.point_count(), mesh.polygon_count() * 2);
    out.positions.extend_from_slice(&mesh.positions);

    let mut corners = Vec::new();
    for polygon in &mesh.polygons {
        if polygon.len() == 3 {
            out.polygons.push(polygon.clone());
            continue;
        }
        corners.clear();
        corners.extend(polygon.iter().map(|&i| mesh.point(i as usize)));
        for [a, b, c] in triangulate_polygon(&corners)? {
            out.add_triangle(polygon[a], polygon[b], polygon[c]);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn signed_normal(points: &[Point3<f64>], tri: [usize; 3]) -> Vector3<f64> {
        (points[tri[1]] - points[tri[0]]).cross(&(points[tri[2]] - points[tri[0]]))
    }

    #[test]
    fn test_triangulate_square() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let triangles = triangulate_polygon(&points).unwrap();
        assert_eq!(triangles.len(), 2);
    }

    #[test]
    fn test_triangulate_insufficient_points() {
        let points = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        assert!(triangulate_polygon(&points).is_err());
    }

    #[test]
    fn test_concave_polygon_keeps_winding() {
        // L-shape in the XZ plane, counter-clockwise around -Y
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 2.0),
            Point3::new(0.0, 0.0, 2.0),
        ];
        let normal = polygon_normal(&points);
        assert_relative_eq!(normal, -Vector3::y(), epsilon = 1e-12);

        let triangles = triangulate_polygon(&points).unwrap();
        assert_eq!(triangles.len(), 4);

        let mut area = 0.0;
        for tri in triangles {
            let n = signed_normal(&points, tri);
            assert!(n.dot(&normal) > 0.0);
            area += n.norm() / 2.0;
        }
        assert_relative_eq!(area, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_triangulate_mesh_preserves_points() {
        let mut mesh = Mesh::new();
        for i in 0..6 {
            let a = i as f64 * std::f64::consts::TAU / 6.0;
            mesh.add_point(Point3::new(a.cos(), a.sin(), 0.0));
        }
        mesh.add_polygon(&[0, 1, 2, 3, 4, 5]);

        let triangulated = triangulate_mesh(&mesh).unwrap();
        assert_eq!(triangulated.positions, mesh.positions);
        assert_eq!(triangulated.polygon_count(), 4);
        assert!(triangulated.polygons.iter().all(|p| p.len() == 3));
    }
}
