// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node kinds and their payloads.

use dynmod_geometry::transform::{frame_from_point_normal, frame_from_three_points};
use dynmod_geometry::Mesh;
use nalgebra::{Matrix4, Point3, Vector3};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::keys::NodeKey;
use crate::parameter::ParameterValue;

/// Type tag of a node. Ports accept nodes by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    PointList,
    Line,
    Angle,
    Plane,
    LinearTransform,
    Model,
    Operation,
}

impl NodeKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            NodeKind::PointList => "PointList",
            NodeKind::Line => "Line",
            NodeKind::Angle => "Angle",
            NodeKind::Plane => "Plane",
            NodeKind::LinearTransform => "LinearTransform",
            NodeKind::Model => "Model",
            NodeKind::Operation => "Operation",
        }
    }

    /// True for the kinds that carry control points
    pub const fn is_markup(&self) -> bool {
        matches!(
            self,
            NodeKind::PointList | NodeKind::Line | NodeKind::Angle | NodeKind::Plane
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a plane node defines its plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaneType {
    /// Origin, a point on the X axis and a point in the XY half plane
    #[default]
    ThreePoints,
    /// Origin (first control point) and an explicit normal
    PointNormal,
}

/// Plane payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneData {
    pub control_points: Vec<Point3<f64>>,
    pub plane_type: PlaneType,
    /// Used by [`PlaneType::PointNormal`] only
    pub normal: Vector3<f64>,
}

impl Default for PlaneData {
    fn default() -> Self {
        Self {
            control_points: Vec::new(),
            plane_type: PlaneType::ThreePoints,
            normal: Vector3::z(),
        }
    }
}

impl PlaneData {
    /// Plane frame in node coordinates, or `None` if the plane is not well
    /// defined (too few points, coincident or collinear points, zero normal).
    pub fn object_to_node(&self) -> Option<Matrix4<f64>> {
        match self.plane_type {
            PlaneType::ThreePoints => match self.control_points.as_slice() {
                [p0, p1, p2, ..] => frame_from_three_points(p0, p1, p2),
                _ => None,
            },
            PlaneType::PointNormal => {
                let origin = self.control_points.first()?;
                frame_from_point_normal(origin, &self.normal)
            }
        }
    }

    #[inline]
    pub fn is_well_defined(&self) -> bool {
        self.object_to_node().is_some()
    }
}

/// Operation payload: which tool runs and what it is wired to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationData {
    pub tool_name: String,
    /// Role -> referenced nodes, in reference order
    pub references: FxHashMap<String, Vec<NodeKey>>,
    /// Storage key -> stored value
    pub parameters: FxHashMap<String, ParameterValue>,
    /// Re-run automatically when inputs change
    pub continuous_update: bool,
}

impl OperationData {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            continuous_update: true,
            ..Self::default()
        }
    }

    /// Nodes referenced under `role`, empty if none
    pub fn references(&self, role: &str) -> &[NodeKey] {
        self.references.get(role).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Kind-specific node payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    PointList(Vec<Point3<f64>>),
    Line(Vec<Point3<f64>>),
    Angle(Vec<Point3<f64>>),
    Plane(PlaneData),
    LinearTransform(Matrix4<f64>),
    Model(Mesh),
    Operation(OperationData),
}

impl NodeData {
    /// Empty payload of the given kind. Transforms start as identity.
    pub fn empty(kind: NodeKind) -> Self {
        match kind {
            NodeKind::PointList => NodeData::PointList(Vec::new()),
            NodeKind::Line => NodeData::Line(Vec::new()),
            NodeKind::Angle => NodeData::Angle(Vec::new()),
            NodeKind::Plane => NodeData::Plane(PlaneData::default()),
            NodeKind::LinearTransform => NodeData::LinearTransform(Matrix4::identity()),
            NodeKind::Model => NodeData::Model(Mesh::new()),
            NodeKind::Operation => NodeData::Operation(OperationData::default()),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::PointList(_) => NodeKind::PointList,
            NodeData::Line(_) => NodeKind::Line,
            NodeData::Angle(_) => NodeKind::Angle,
            NodeData::Plane(_) => NodeKind::Plane,
            NodeData::LinearTransform(_) => NodeKind::LinearTransform,
            NodeData::Model(_) => NodeKind::Model,
            NodeData::Operation(_) => NodeKind::Operation,
        }
    }

    /// Control points of markup nodes
    pub fn control_points(&self) -> Option<&[Point3<f64>]> {
        match self {
            NodeData::PointList(points) | NodeData::Line(points) | NodeData::Angle(points) => {
                Some(points)
            }
            NodeData::Plane(plane) => Some(&plane.control_points),
            _ => None,
        }
    }

    pub(crate) fn control_points_mut(&mut self) -> Option<&mut Vec<Point3<f64>>> {
        match self {
            NodeData::PointList(points) | NodeData::Line(points) | NodeData::Angle(points) => {
                Some(points)
            }
            NodeData::Plane(plane) => Some(&mut plane.control_points),
            _ => None,
        }
    }

    pub fn plane(&self) -> Option<&PlaneData> {
        match self {
            NodeData::Plane(plane) => Some(plane),
            _ => None,
        }
    }

    pub fn matrix_to_parent(&self) -> Option<&Matrix4<f64>> {
        match self {
            NodeData::LinearTransform(matrix) => Some(matrix),
            _ => None,
        }
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        match self {
            NodeData::Model(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn operation(&self) -> Option<&OperationData> {
        match self {
            NodeData::Operation(operation) => Some(operation),
            _ => None,
        }
    }
}

/// A node as stored in the scene.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    /// Linear transform node this node hangs below
    pub parent: Option<NodeKey>,
    pub data: NodeData,
    /// Bumped every time a modification guard on this node commits
    pub revision: u64,
}

impl SceneNode {
    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_three_point_plane_frame() {
        let plane = PlaneData {
            control_points: vec![
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(0.0, 1.0, 1.0),
            ],
            ..PlaneData::default()
        };
        let m = plane.object_to_node().unwrap();
        assert_relative_eq!(m, Matrix4::new_translation(&Vector3::new(0.0, 0.0, 1.0)), epsilon = 1e-12);
    }

    #[test]
    fn test_ill_defined_planes() {
        let mut plane = PlaneData {
            control_points: vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
            ..PlaneData::default()
        };
        assert!(!plane.is_well_defined());

        plane.plane_type = PlaneType::PointNormal;
        assert!(plane.is_well_defined());
        plane.normal = Vector3::zeros();
        assert!(!plane.is_well_defined());
    }

    #[test]
    fn test_empty_payload_kinds() {
        for kind in [
            NodeKind::PointList,
            NodeKind::Line,
            NodeKind::Angle,
            NodeKind::Plane,
            NodeKind::LinearTransform,
            NodeKind::Model,
            NodeKind::Operation,
        ] {
            let data = NodeData::empty(kind);
            assert_eq!(data.kind(), kind);
            assert_eq!(data.control_points().is_some(), kind.is_markup());
        }
    }
}
