// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scoped batch modification of one node.

use dynmod_geometry::Mesh;
use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::{Error, Result};
use crate::events::{push_unique, ChangeEvent, ChangeEvents};
use crate::keys::NodeKey;
use crate::node::{NodeData, NodeKind, PlaneType};
use crate::scene::Scene;

/// Open modification of one node.
///
/// Setters replace fields in place and record which event tags apply. When
/// the guard is dropped, the scene queues a single notification for the node
/// (if anything was written) and bumps its revision. A matrix change also
/// notifies every descendant with [`ChangeEvent::TransformModified`].
#[must_use = "the notification is sent when the guard is dropped"]
pub struct ModifyGuard<'a> {
    scene: &'a mut Scene,
    node: NodeKey,
    events: ChangeEvents,
}

impl<'a> ModifyGuard<'a> {
    pub(crate) fn new(scene: &'a mut Scene, node: NodeKey) -> Self {
        Self {
            scene,
            node,
            events: ChangeEvents::new(),
        }
    }

    /// Key of the node being modified
    pub fn node(&self) -> NodeKey {
        self.node
    }

    /// Replace the mesh of a model node, reusing its allocation
    pub fn set_mesh(&mut self, mesh: &Mesh) -> Result<()> {
        let written = match &mut self.scene.node_mut(self.node)?.data {
            NodeData::Model(current) => {
                current.clone_from(mesh);
                true
            }
            _ => false,
        };
        self.finish(written, NodeKind::Model, ChangeEvent::MeshModified)
    }

    /// Replace the control points of a markup node
    pub fn set_control_points(&mut self, points: &[Point3<f64>]) -> Result<()> {
        let written = match self.scene.node_mut(self.node)?.data.control_points_mut() {
            Some(current) => {
                current.clear();
                current.extend_from_slice(points);
                true
            }
            None => false,
        };
        self.finish(written, NodeKind::PointList, ChangeEvent::PointModified)
    }

    pub fn set_plane_type(&mut self, plane_type: PlaneType) -> Result<()> {
        let written = match &mut self.scene.node_mut(self.node)?.data {
            NodeData::Plane(plane) => {
                plane.plane_type = plane_type;
                true
            }
            _ => false,
        };
        self.finish(written, NodeKind::Plane, ChangeEvent::PointModified)
    }

    pub fn set_plane_normal(&mut self, normal: Vector3<f64>) -> Result<()> {
        let written = match &mut self.scene.node_mut(self.node)?.data {
            NodeData::Plane(plane) => {
                plane.normal = normal;
                true
            }
            _ => false,
        };
        self.finish(written, NodeKind::Plane, ChangeEvent::PointModified)
    }

    /// Replace the matrix of a linear transform node
    pub fn set_matrix_to_parent(&mut self, matrix: Matrix4<f64>) -> Result<()> {
        let written = match &mut self.scene.node_mut(self.node)?.data {
            NodeData::LinearTransform(current) => {
                *current = matrix;
                true
            }
            _ => false,
        };
        self.finish(written, NodeKind::LinearTransform, ChangeEvent::TransformModified)
    }

    /// Scene under modification, read-only
    pub fn scene(&self) -> &Scene {
        self.scene
    }

    fn record(&mut self, event: ChangeEvent) {
        push_unique(&mut self.events, ChangeEvent::Modified);
        push_unique(&mut self.events, event);
    }

    fn finish(&mut self, written: bool, expected: NodeKind, event: ChangeEvent) -> Result<()> {
        if !written {
            let node = self.scene.node(self.node)?;
            return Err(Error::WrongNodeKind {
                node: node.name.clone(),
                expected,
                found: node.kind(),
            });
        }
        self.record(event);
        Ok(())
    }
}

impl Drop for ModifyGuard<'_> {
    fn drop(&mut self) {
        if self.events.is_empty() {
            return;
        }
        let events = std::mem::take(&mut self.events);
        self.scene.commit(self.node, events);
    }
}
