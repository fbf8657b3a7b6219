// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transform composition.
//!
//! An ordered list of sources is folded into one matrix by post-multiplying
//! each contribution: `result = result * contribution`. With
//! `[translation T, rotation R]` a local point `p` therefore maps to
//! `T * R * p`: rotated first, then translated.
//!
//! | source    | contribution                                         |
//! |-----------|------------------------------------------------------|
//! | point     | translation to its first control point               |
//! | angle     | rotation about the origin by the angle between arms  |
//! | plane     | plane frame                                          |
//! | transform | the node's matrix                                    |
//! | mesh      | identity                                             |
//!
//! In [`FrameMode::World`] every contribution is first taken to world
//! coordinates through the source's parent transforms. Degenerate sources
//! (no points, collinear angle arms, ill-defined planes) contribute identity.

use dynmod_geometry::transform::{
    angle_between, perpendicular, rotation_about_axis, rotation_axis_angle, translation,
    translation_part,
};
use nalgebra::{Matrix4, Point3};

use crate::sources::{GeometricSource, SourceGeometry};

/// Whether parent transforms of the sources are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameMode {
    /// Use node-local values
    #[default]
    Local,
    /// Map every source to world coordinates first
    World,
}

/// Fold `sources` left to right, starting from identity.
pub fn compose(sources: &[GeometricSource<'_>], mode: FrameMode) -> ComposedTransform {
    let mut result = Matrix4::identity();
    for source in sources {
        match contribution(source, mode) {
            Some(matrix) => result *= matrix,
            None => tracing::debug!(node = ?source.node, "Source contributes identity"),
        }
    }
    ComposedTransform { matrix: result }
}

fn contribution(source: &GeometricSource<'_>, mode: FrameMode) -> Option<Matrix4<f64>> {
    let to_world = match (mode, source.parent_to_world) {
        (FrameMode::World, Some(matrix)) => Some(matrix),
        _ => None,
    };
    let place = |p: &Point3<f64>| match &to_world {
        Some(matrix) => matrix.transform_point(p),
        None => *p,
    };

    match source.geometry {
        SourceGeometry::Point(points) => {
            let first = place(points.first()?);
            Some(translation(&first.coords))
        }
        SourceGeometry::Angle(points) => {
            let [p0, p1, p2] = points else {
                return None;
            };
            let (axis, angle) = angle_between(&place(p0), &place(p1), &place(p2))?;
            rotation_about_axis(&axis, angle)
        }
        SourceGeometry::Plane(frame) => {
            let frame = frame?;
            Some(to_world.map_or(frame, |m| m * frame))
        }
        SourceGeometry::Transform(matrix) => Some(to_world.map_or(matrix, |m| m * matrix)),
        SourceGeometry::Mesh(_) => None,
    }
}

/// Result of a composition, with the output representations derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComposedTransform {
    pub matrix: Matrix4<f64>,
}

impl ComposedTransform {
    /// Translation of the composed transform as a point
    pub fn position(&self) -> Point3<f64> {
        Point3::from(translation_part(&self.matrix))
    }

    /// Three angle control points `[arm, vertex, arm]` encoding the rotation.
    ///
    /// The vertex sits at the translation; the first arm is a vector of
    /// length `handle` perpendicular to the rotation axis and the second is
    /// that vector rotated. Feeding the points back as an angle source
    /// reproduces the rotation. Without rotation both arms coincide.
    pub fn angle_points(&self, handle: f64) -> [Point3<f64>; 3] {
        let vertex = self.position();
        let (axis, angle) = rotation_axis_angle(&self.matrix);
        let arm = perpendicular(&axis) * handle;
        let rotated = rotation_about_axis(&axis, angle)
            .map_or(arm, |r| r.transform_vector(&arm));
        [vertex + arm, vertex, vertex + rotated]
    }

    /// Reference triangle `(0,0,0)`, `(h,0,0)`, `(0,h,0)` mapped through the
    /// composed transform, as three-point plane control points.
    pub fn plane_points(&self, handle: f64) -> [Point3<f64>; 3] {
        [
            Point3::origin(),
            Point3::new(handle, 0.0, 0.0),
            Point3::new(0.0, handle, 0.0),
        ]
        .map(|p| self.matrix.transform_point(&p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dynmod_scene::NodeKey;
    use nalgebra::Vector3;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn source(geometry: SourceGeometry<'_>) -> GeometricSource<'_> {
        GeometricSource {
            node: NodeKey::default(),
            geometry,
            parent_to_world: None,
        }
    }

    #[test]
    fn test_translate_then_rotate() {
        let point = [Point3::new(10.0, 0.0, 0.0)];
        let angle = [
            Point3::new(1.0, 0.0, 0.0),
            Point3::origin(),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let sources = [
            source(SourceGeometry::Point(&point)),
            source(SourceGeometry::Angle(&angle)),
        ];
        let composed = compose(&sources, FrameMode::Local);
        assert_relative_eq!(
            composed.matrix.transform_point(&Point3::new(1.0, 0.0, 0.0)),
            Point3::new(10.0, 1.0, 0.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_order_matters() {
        let point = [Point3::new(10.0, 0.0, 0.0)];
        let angle = [
            Point3::new(1.0, 0.0, 0.0),
            Point3::origin(),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let forward = compose(
            &[source(SourceGeometry::Point(&point)), source(SourceGeometry::Angle(&angle))],
            FrameMode::Local,
        );
        let backward = compose(
            &[source(SourceGeometry::Angle(&angle)), source(SourceGeometry::Point(&point))],
            FrameMode::Local,
        );
        assert_relative_eq!(backward.position(), Point3::new(0.0, 10.0, 0.0), epsilon = 1e-12);
        assert!((forward.matrix - backward.matrix).norm() > 1.0);
    }

    #[test]
    fn test_degenerate_sources_are_identity() {
        let empty: [Point3<f64>; 0] = [];
        let collinear = [
            Point3::new(1.0, 0.0, 0.0),
            Point3::origin(),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let two_points = [Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        let mesh = dynmod_geometry::Mesh::new();
        let sources = [
            source(SourceGeometry::Point(&empty)),
            source(SourceGeometry::Angle(&collinear)),
            source(SourceGeometry::Angle(&two_points)),
            source(SourceGeometry::Plane(None)),
            source(SourceGeometry::Mesh(&mesh)),
        ];
        assert_eq!(compose(&sources, FrameMode::World).matrix, Matrix4::identity());
    }

    #[test]
    fn test_world_mode_applies_parent() {
        let point = [Point3::new(1.0, 0.0, 0.0)];
        let mut src = source(SourceGeometry::Point(&point));
        src.parent_to_world = Some(Matrix4::new_translation(&Vector3::new(0.0, 5.0, 0.0)));

        let local = compose(&[src], FrameMode::Local);
        let world = compose(&[src], FrameMode::World);
        assert_relative_eq!(local.position(), Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(world.position(), Point3::new(1.0, 5.0, 0.0));
    }

    #[test]
    fn test_angle_points_round_trip() {
        let rotation = rotation_about_axis(&Vector3::new(1.0, 2.0, 2.0), 1.2).unwrap();
        let composed = ComposedTransform {
            matrix: Matrix4::new_translation(&Vector3::new(3.0, 0.0, -1.0)) * rotation,
        };
        let points = composed.angle_points(50.0);
        assert_relative_eq!(points[1], Point3::new(3.0, 0.0, -1.0), epsilon = 1e-9);
        assert_relative_eq!((points[0] - points[1]).norm(), 50.0, epsilon = 1e-9);

        let refolded = compose(&[source(SourceGeometry::Angle(&points))], FrameMode::Local);
        assert_relative_eq!(refolded.matrix, rotation, epsilon = 1e-9);
    }

    #[test]
    fn test_angle_points_without_rotation() {
        let composed = ComposedTransform {
            matrix: Matrix4::new_translation(&Vector3::new(1.0, 1.0, 1.0)),
        };
        let [a, vertex, b] = composed.angle_points(2.0);
        assert_eq!(a, b);
        assert_relative_eq!((a - vertex).dot(&Vector3::z()), 0.0);
    }

    #[test]
    fn test_angle_points_of_half_turn() {
        for axis in [Vector3::x(), Vector3::z()] {
            let composed = ComposedTransform {
                matrix: rotation_about_axis(&axis, PI).unwrap(),
            };
            let [a, vertex, b] = composed.angle_points(10.0);
            let (first, second) = (a - vertex, b - vertex);
            assert_relative_eq!(first.norm(), 10.0, epsilon = 1e-9);
            assert_relative_eq!(first.angle(&second), PI, epsilon = 1e-9);
            assert_relative_eq!(first.dot(&axis), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_plane_points() {
        let composed = ComposedTransform {
            matrix: Matrix4::new_translation(&Vector3::new(0.0, 0.0, 7.0))
                * rotation_about_axis(&Vector3::z(), FRAC_PI_2).unwrap(),
        };
        let points = composed.plane_points(50.0);
        assert_relative_eq!(points[0], Point3::new(0.0, 0.0, 7.0), epsilon = 1e-9);
        assert_relative_eq!(points[1], Point3::new(0.0, 50.0, 7.0), epsilon = 1e-9);
        assert_relative_eq!(points[2], Point3::new(-50.0, 0.0, 7.0), epsilon = 1e-9);
    }
}
