// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometric sources: scene nodes viewed as inputs to a composition.

use dynmod_geometry::Mesh;
use dynmod_scene::{NodeData, NodeKey, Scene};
use nalgebra::{Matrix4, Point3};

/// Local-frame content of a source, borrowed from the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceGeometry<'a> {
    /// Control points of a point list or line
    Point(&'a [Point3<f64>]),
    /// Control points of an angle
    Angle(&'a [Point3<f64>]),
    /// Plane frame in node coordinates, `None` if the plane is ill-defined
    Plane(Option<Matrix4<f64>>),
    /// Matrix to parent of a linear transform node
    Transform(Matrix4<f64>),
    Mesh(&'a Mesh),
}

/// One resolved input of a composition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometricSource<'a> {
    pub node: NodeKey,
    pub geometry: SourceGeometry<'a>,
    /// Parent-to-world transform, `None` when the node has no parent
    pub parent_to_world: Option<Matrix4<f64>>,
}

impl<'a> GeometricSource<'a> {
    /// View `node` as a source. Operation nodes and unknown keys give `None`.
    pub fn resolve(scene: &'a Scene, node: NodeKey) -> Option<Self> {
        let entry = scene.get(node)?;
        let geometry = match &entry.data {
            NodeData::PointList(points) | NodeData::Line(points) => SourceGeometry::Point(points),
            NodeData::Angle(points) => SourceGeometry::Angle(points),
            NodeData::Plane(plane) => SourceGeometry::Plane(plane.object_to_node()),
            NodeData::LinearTransform(matrix) => SourceGeometry::Transform(*matrix),
            NodeData::Model(mesh) => SourceGeometry::Mesh(mesh),
            NodeData::Operation(_) => return None,
        };
        let parent_to_world = match entry.parent {
            Some(_) => scene.parent_to_world(node).ok(),
            None => None,
        };
        Some(Self {
            node,
            geometry,
            parent_to_world,
        })
    }

    /// Parent-to-world transform, identity without parent
    pub fn to_world(&self) -> Matrix4<f64> {
        self.parent_to_world.unwrap_or_else(Matrix4::identity)
    }
}

/// Resolve every node in order, skipping those that are not sources
pub fn resolve_sources<'a>(scene: &'a Scene, nodes: &[NodeKey]) -> Vec<GeometricSource<'a>> {
    nodes
        .iter()
        .filter_map(|&node| GeometricSource::resolve(scene, node))
        .collect()
}
