// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Affine helpers shared by the modeling tools
//!
//! Everything here works on homogeneous 4x4 matrices mapping local
//! coordinates to parent coordinates (column vector convention, as nalgebra
//! uses it).

use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, Unit, Vector3};

/// Lengths below this are treated as zero when normalizing.
pub const EPSILON: f64 = 1e-12;

/// Pure translation matrix
#[inline]
pub fn translation(offset: &Vector3<f64>) -> Matrix4<f64> {
    Matrix4::new_translation(offset)
}

/// Rotation about `axis` through the origin, by `angle` radians.
///
/// Returns `None` for a zero-length axis.
pub fn rotation_about_axis(axis: &Vector3<f64>, angle: f64) -> Option<Matrix4<f64>> {
    let axis = Unit::try_new(*axis, EPSILON)?;
    Some(Rotation3::from_axis_angle(&axis, angle).to_homogeneous())
}

/// Axis and angle turning direction `p0 - p1` into `p2 - p1`.
///
/// The axis is the normalized cross product of the two arms and the angle
/// lies in `[0, pi]`. Returns `None` when either arm has zero length or the
/// arms are parallel (no unique axis).
pub fn angle_between(
    p0: &Point3<f64>,
    vertex: &Point3<f64>,
    p2: &Point3<f64>,
) -> Option<(Unit<Vector3<f64>>, f64)> {
    let a = p0 - vertex;
    let b = p2 - vertex;
    let cross = a.cross(&b);
    let axis = Unit::try_new(cross, EPSILON)?;
    let angle = cross.norm().atan2(a.dot(&b));
    Some((axis, angle))
}

/// Rotation part of a transform as axis and angle.
///
/// The upper 3x3 block is orthonormalized first (polar decomposition) so
/// scaled or sheared matrices still yield a usable rotation. A rotation
/// without a defined axis (identity, or a degenerate block) reports the Z
/// axis and angle `0`. Half-turns report angle `π` about the axis taken from
/// the largest column of `R + I`.
pub fn rotation_axis_angle(matrix: &Matrix4<f64>) -> (Unit<Vector3<f64>>, f64) {
    let block: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
    let Some(rotation) = orthonormalize(&block) else {
        return (Vector3::z_axis(), 0.0);
    };

    if rotation.trace() < HALF_TURN_TRACE {
        let sum = rotation + Matrix3::identity();
        let column = (0..3)
            .map(|j| sum.column(j).into_owned())
            .max_by(|a, b| a.norm_squared().total_cmp(&b.norm_squared()));
        if let Some(axis) = column.and_then(|c| Unit::try_new(c, EPSILON)) {
            return (axis, std::f64::consts::PI);
        }
    }

    Rotation3::from_matrix_unchecked(rotation)
        .axis_angle()
        .unwrap_or((Vector3::z_axis(), 0.0))
}

/// Below this trace a rotation is treated as a half-turn; `trace + 1` is
/// roughly the square of the angle's distance to `π`.
const HALF_TURN_TRACE: f64 = -1.0 + 1e-12;

/// Closest proper rotation to `block`, or `None` for a zero block
fn orthonormalize(block: &Matrix3<f64>) -> Option<Matrix3<f64>> {
    if block.norm() < EPSILON {
        return None;
    }
    let svd = block.svd(true, true);
    let (mut u, v_t) = (svd.u?, svd.v_t?);
    if (u * v_t).determinant() < 0.0 {
        u.column_mut(2).neg_mut();
    }
    Some(u * v_t)
}

/// Translation column of a transform
#[inline]
pub fn translation_part(matrix: &Matrix4<f64>) -> Vector3<f64> {
    Vector3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)])
}

/// Whether the transform flips orientation (negative determinant of the
/// linear part). Polygon winding must be reversed after applying one.
pub fn is_orientation_reversing(matrix: &Matrix4<f64>) -> bool {
    matrix.fixed_view::<3, 3>(0, 0).determinant() < 0.0
}

/// A unit vector perpendicular to `v`.
///
/// Crosses `v` with the coordinate axis it is least aligned with, so the
/// result is stable for any nonzero input. Zero input yields the X axis.
pub fn perpendicular(v: &Vector3<f64>) -> Vector3<f64> {
    let abs = v.abs();
    let helper = if abs.x <= abs.y && abs.x <= abs.z {
        Vector3::x()
    } else if abs.y <= abs.z {
        Vector3::y()
    } else {
        Vector3::z()
    };
    v.cross(&helper)
        .try_normalize(EPSILON)
        .unwrap_or_else(Vector3::x)
}

/// Object-to-parent frame of a plane defined by three points.
///
/// Origin at `p0`, X toward `p1`, Z along `(p1 - p0) x (p2 - p0)`. Returns
/// `None` if the points are coincident or collinear.
pub fn frame_from_three_points(
    p0: &Point3<f64>,
    p1: &Point3<f64>,
    p2: &Point3<f64>,
) -> Option<Matrix4<f64>> {
    let x = (p1 - p0).try_normalize(EPSILON)?;
    let z = x.cross(&(p2 - p0)).try_normalize(EPSILON)?;
    let y = z.cross(&x);
    Some(frame(p0, &x, &y, &z))
}

/// Object-to-parent frame of a plane defined by an origin and a normal.
///
/// The in-plane X axis is [`perpendicular`] to the normal. Returns `None`
/// for a zero normal.
pub fn frame_from_point_normal(
    origin: &Point3<f64>,
    normal: &Vector3<f64>,
) -> Option<Matrix4<f64>> {
    let z = normal.try_normalize(EPSILON)?;
    let x = perpendicular(&z);
    let y = z.cross(&x);
    Some(frame(origin, &x, &y, &z))
}

/// Reflection across the plane through `point` with normal `normal`.
///
/// `M = T(p) * (I - 2 n n^T) * T(-p)`. Returns `None` for a zero normal.
pub fn reflection_across_plane(
    point: &Point3<f64>,
    normal: &Vector3<f64>,
) -> Option<Matrix4<f64>> {
    let n = normal.try_normalize(EPSILON)?;
    let householder = Matrix3::identity() - 2.0 * n * n.transpose();
    let offset = point.coords - householder * point.coords;

    let mut matrix = householder.to_homogeneous();
    matrix[(0, 3)] = offset.x;
    matrix[(1, 3)] = offset.y;
    matrix[(2, 3)] = offset.z;
    Some(matrix)
}

fn frame(
    origin: &Point3<f64>,
    x: &Vector3<f64>,
    y: &Vector3<f64>,
    z: &Vector3<f64>,
) -> Matrix4<f64> {
    Matrix4::new(
        x.x, y.x, z.x, origin.x,
        x.y, y.y, z.y, origin.y,
        x.z, y.z, z.z, origin.z,
        0.0, 0.0, 0.0, 1.0,
    )
}
