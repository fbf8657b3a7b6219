// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The node store.

use dynmod_geometry::Mesh;
use nalgebra::{Matrix4, Point3};
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::events::{ChangeEvent, ChangeEvents, ChangeNotification};
use crate::guard::ModifyGuard;
use crate::keys::NodeKey;
use crate::node::{NodeData, NodeKind, OperationData, PlaneData, SceneNode};
use crate::parameter::ParameterValue;

/// In-memory scene: nodes, parent links and the pending notification queue.
///
/// Adding nodes is silent; every later change queues a
/// [`ChangeNotification`] that [`drain_notifications`](Scene::drain_notifications)
/// hands to whoever dispatches them.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: SlotMap<NodeKey, SceneNode>,
    pending: Vec<ChangeNotification>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Insert a node without a parent
    pub fn add_node(&mut self, name: impl Into<String>, data: NodeData) -> NodeKey {
        self.nodes.insert(SceneNode {
            name: name.into(),
            parent: None,
            data,
            revision: 0,
        })
    }

    pub fn add_point_list(&mut self, name: impl Into<String>, points: Vec<Point3<f64>>) -> NodeKey {
        self.add_node(name, NodeData::PointList(points))
    }

    pub fn add_line(&mut self, name: impl Into<String>, points: Vec<Point3<f64>>) -> NodeKey {
        self.add_node(name, NodeData::Line(points))
    }

    pub fn add_angle(&mut self, name: impl Into<String>, points: Vec<Point3<f64>>) -> NodeKey {
        self.add_node(name, NodeData::Angle(points))
    }

    pub fn add_plane(&mut self, name: impl Into<String>, plane: PlaneData) -> NodeKey {
        self.add_node(name, NodeData::Plane(plane))
    }

    pub fn add_transform(&mut self, name: impl Into<String>, matrix: Matrix4<f64>) -> NodeKey {
        self.add_node(name, NodeData::LinearTransform(matrix))
    }

    pub fn add_model(&mut self, name: impl Into<String>, mesh: Mesh) -> NodeKey {
        self.add_node(name, NodeData::Model(mesh))
    }

    /// Insert an operation node running `tool_name`, continuous update on
    pub fn add_operation(&mut self, name: impl Into<String>, tool_name: impl Into<String>) -> NodeKey {
        self.add_node(name, NodeData::Operation(OperationData::new(tool_name)))
    }

    /// Remove a node. Children lose their parent and operations drop their
    /// references to it; both are notified.
    pub fn remove_node(&mut self, key: NodeKey) -> Result<SceneNode> {
        let removed = self.nodes.remove(key).ok_or(Error::NodeNotFound(key))?;

        let mut orphaned = Vec::new();
        let mut rewired = Vec::new();
        for (other, node) in self.nodes.iter_mut() {
            if node.parent == Some(key) {
                node.parent = None;
                orphaned.push(other);
            }
            if let NodeData::Operation(operation) = &mut node.data {
                let mut changed = false;
                for references in operation.references.values_mut() {
                    let before = references.len();
                    references.retain(|&r| r != key);
                    changed |= references.len() != before;
                }
                if changed {
                    rewired.push(other);
                }
            }
        }

        for node in orphaned {
            self.commit(node, events(&[ChangeEvent::Modified, ChangeEvent::TransformModified]));
        }
        for node in rewired {
            self.commit(node, events(&[ChangeEvent::Modified]));
        }
        Ok(removed)
    }

    #[inline]
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    #[inline]
    pub fn get(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    pub fn node(&self, key: NodeKey) -> Result<&SceneNode> {
        self.nodes.get(key).ok_or(Error::NodeNotFound(key))
    }

    pub(crate) fn node_mut(&mut self, key: NodeKey) -> Result<&mut SceneNode> {
        self.nodes.get_mut(key).ok_or(Error::NodeNotFound(key))
    }

    #[inline]
    pub fn kind(&self, key: NodeKey) -> Option<NodeKind> {
        self.nodes.get(key).map(SceneNode::kind)
    }

    #[inline]
    pub fn name(&self, key: NodeKey) -> Option<&str> {
        self.nodes.get(key).map(|n| n.name.as_str())
    }

    /// First node with the given name
    pub fn find_by_name(&self, name: &str) -> Option<NodeKey> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(key, _)| key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &SceneNode)> {
        self.nodes.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of committed modifications of a node (0 for unknown keys)
    pub fn revision(&self, key: NodeKey) -> u64 {
        self.nodes.get(key).map_or(0, |n| n.revision)
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    pub fn parent_transform(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(|n| n.parent)
    }

    /// Hang `key` below the linear transform `parent` (or detach it).
    ///
    /// Notifies the node and its descendants with `TransformModified`.
    pub fn set_parent_transform(&mut self, key: NodeKey, parent: Option<NodeKey>) -> Result<()> {
        let name = self.node(key)?.name.clone();
        if let Some(parent) = parent {
            let parent_node = self.node(parent)?;
            if parent_node.kind() != NodeKind::LinearTransform {
                return Err(Error::NotATransform(parent_node.name.clone()));
            }
            let mut current = Some(parent);
            while let Some(ancestor) = current {
                if ancestor == key {
                    return Err(Error::ParentCycle {
                        node: name,
                        parent: parent_node.name.clone(),
                    });
                }
                current = self.parent_transform(ancestor);
            }
        }

        self.node_mut(key)?.parent = parent;
        self.commit(key, events(&[ChangeEvent::Modified, ChangeEvent::TransformModified]));
        Ok(())
    }

    /// Product of all ancestor matrices, root first. Identity without parent.
    pub fn parent_to_world(&self, key: NodeKey) -> Result<Matrix4<f64>> {
        let mut matrix = Matrix4::identity();
        let mut current = self.node(key)?.parent;
        while let Some(parent) = current {
            let node = self.node(parent)?;
            if let Some(to_parent) = node.data.matrix_to_parent() {
                matrix = to_parent * matrix;
            }
            current = node.parent;
        }
        Ok(matrix)
    }

    /// Node-to-world transform: the parent chain, plus the node's own matrix
    /// for linear transform nodes.
    pub fn node_to_world(&self, key: NodeKey) -> Result<Matrix4<f64>> {
        let parent_to_world = self.parent_to_world(key)?;
        Ok(match self.node(key)?.data.matrix_to_parent() {
            Some(to_parent) => parent_to_world * to_parent,
            None => parent_to_world,
        })
    }

    /// All nodes below `key` in the transform hierarchy
    pub fn descendants(&self, key: NodeKey) -> Vec<NodeKey> {
        self.nodes
            .iter()
            .filter(|&(other, _)| other != key && self.has_ancestor(other, key))
            .map(|(other, _)| other)
            .collect()
    }

    fn has_ancestor(&self, key: NodeKey, ancestor: NodeKey) -> bool {
        let mut current = self.parent_transform(key);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent_transform(parent);
        }
        false
    }

    // ========================================================================
    // Modification and notification
    // ========================================================================

    /// Open a batch modification of `key`. See [`ModifyGuard`].
    pub fn begin_modification(&mut self, key: NodeKey) -> Result<ModifyGuard<'_>> {
        self.node(key)?;
        Ok(ModifyGuard::new(self, key))
    }

    pub fn set_control_points(&mut self, key: NodeKey, points: &[Point3<f64>]) -> Result<()> {
        self.begin_modification(key)?.set_control_points(points)
    }

    pub fn set_matrix_to_parent(&mut self, key: NodeKey, matrix: Matrix4<f64>) -> Result<()> {
        self.begin_modification(key)?.set_matrix_to_parent(matrix)
    }

    pub fn set_mesh(&mut self, key: NodeKey, mesh: &Mesh) -> Result<()> {
        self.begin_modification(key)?.set_mesh(mesh)
    }

    /// Take every queued notification, oldest first
    pub fn drain_notifications(&mut self) -> Vec<ChangeNotification> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending_notifications(&self) -> bool {
        !self.pending.is_empty()
    }

    pub(crate) fn commit(&mut self, key: NodeKey, events: ChangeEvents) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        node.revision += 1;

        let transform_changed = events.contains(&ChangeEvent::TransformModified);
        self.pending.push(ChangeNotification { node: key, events });

        if transform_changed {
            for descendant in self.descendants(key) {
                self.pending.push(ChangeNotification {
                    node: descendant,
                    events: events_of(ChangeEvent::TransformModified),
                });
            }
        }
    }

    // ========================================================================
    // Operations
    // ========================================================================

    pub fn operation(&self, key: NodeKey) -> Result<&OperationData> {
        let node = self.node(key)?;
        node.data.operation().ok_or_else(|| Error::WrongNodeKind {
            node: node.name.clone(),
            expected: NodeKind::Operation,
            found: node.kind(),
        })
    }

    fn operation_mut(&mut self, key: NodeKey) -> Result<&mut OperationData> {
        let node = self.node_mut(key)?;
        let found = node.kind();
        match &mut node.data {
            NodeData::Operation(operation) => Ok(operation),
            _ => Err(Error::WrongNodeKind {
                node: node.name.clone(),
                expected: NodeKind::Operation,
                found,
            }),
        }
    }

    /// Nodes referenced by operation `key` under `role`. Empty for unknown
    /// keys, non-operation nodes and unset roles.
    pub fn references(&self, key: NodeKey, role: &str) -> &[NodeKey] {
        self.nodes
            .get(key)
            .and_then(|n| n.data.operation())
            .map(|op| op.references(role))
            .unwrap_or(&[])
    }

    /// Append `node` to the references of `role`
    pub fn add_reference(&mut self, key: NodeKey, role: &str, node: NodeKey) -> Result<()> {
        self.node(node)?;
        self.operation_mut(key)?
            .references
            .entry(role.to_string())
            .or_default()
            .push(node);
        self.commit(key, events_of(ChangeEvent::Modified));
        Ok(())
    }

    /// Replace all references of `role`
    pub fn set_references(&mut self, key: NodeKey, role: &str, nodes: Vec<NodeKey>) -> Result<()> {
        for &node in &nodes {
            self.node(node)?;
        }
        self.operation_mut(key)?
            .references
            .insert(role.to_string(), nodes);
        self.commit(key, events_of(ChangeEvent::Modified));
        Ok(())
    }

    pub fn clear_references(&mut self, key: NodeKey, role: &str) -> Result<()> {
        self.operation_mut(key)?.references.remove(role);
        self.commit(key, events_of(ChangeEvent::Modified));
        Ok(())
    }

    pub fn parameter(&self, key: NodeKey, storage_key: &str) -> Option<&ParameterValue> {
        self.nodes
            .get(key)
            .and_then(|n| n.data.operation())
            .and_then(|op| op.parameters.get(storage_key))
    }

    pub fn set_parameter(
        &mut self,
        key: NodeKey,
        storage_key: &str,
        value: impl Into<ParameterValue>,
    ) -> Result<()> {
        self.operation_mut(key)?
            .parameters
            .insert(storage_key.to_string(), value.into());
        self.commit(key, events_of(ChangeEvent::Modified));
        Ok(())
    }

    pub fn set_continuous_update(&mut self, key: NodeKey, enabled: bool) -> Result<()> {
        self.operation_mut(key)?.continuous_update = enabled;
        self.commit(key, events_of(ChangeEvent::Modified));
        Ok(())
    }
}

fn events(tags: &[ChangeEvent]) -> ChangeEvents {
    ChangeEvents::from_slice(tags)
}

fn events_of(tag: ChangeEvent) -> ChangeEvents {
    events(&[tag])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn translation(x: f64, y: f64, z: f64) -> Matrix4<f64> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    #[test]
    fn test_parent_chain_root_first() {
        let mut scene = Scene::new();
        let outer = scene.add_transform("outer", Matrix4::new_scaling(2.0));
        let inner = scene.add_transform("inner", translation(1.0, 0.0, 0.0));
        let points = scene.add_point_list("points", vec![Point3::origin()]);
        scene.set_parent_transform(inner, Some(outer)).unwrap();
        scene.set_parent_transform(points, Some(inner)).unwrap();

        let to_world = scene.parent_to_world(points).unwrap();
        // scale applies after the inner translation
        assert_relative_eq!(
            to_world.transform_point(&Point3::origin()),
            Point3::new(2.0, 0.0, 0.0),
            epsilon = 1e-12
        );
        assert_relative_eq!(scene.node_to_world(inner).unwrap(), to_world, epsilon = 1e-12);
        assert_eq!(scene.parent_to_world(outer).unwrap(), Matrix4::identity());
    }

    #[test]
    fn test_parent_cycle_rejected() {
        let mut scene = Scene::new();
        let a = scene.add_transform("a", Matrix4::identity());
        let b = scene.add_transform("b", Matrix4::identity());
        scene.set_parent_transform(b, Some(a)).unwrap();

        assert!(matches!(
            scene.set_parent_transform(a, Some(b)),
            Err(Error::ParentCycle { .. })
        ));
        assert!(matches!(
            scene.set_parent_transform(a, Some(a)),
            Err(Error::ParentCycle { .. })
        ));
        assert_eq!(scene.parent_transform(a), None);
    }

    #[test]
    fn test_parent_must_be_transform() {
        let mut scene = Scene::new();
        let model = scene.add_model("model", Mesh::new());
        let points = scene.add_point_list("points", Vec::new());
        assert!(matches!(
            scene.set_parent_transform(points, Some(model)),
            Err(Error::NotATransform(_))
        ));
    }

    #[test]
    fn test_one_notification_per_guard() {
        let mut scene = Scene::new();
        let plane = scene.add_plane("plane", PlaneData::default());
        {
            let mut guard = scene.begin_modification(plane).unwrap();
            guard
                .set_control_points(&[Point3::origin(), Point3::new(1.0, 0.0, 0.0)])
                .unwrap();
            guard.set_plane_type(crate::PlaneType::PointNormal).unwrap();
            guard.set_plane_normal(Vector3::x()).unwrap();
        }

        let notifications = scene.drain_notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].node, plane);
        assert!(notifications[0].contains(ChangeEvent::Modified));
        assert!(notifications[0].contains(ChangeEvent::PointModified));
        assert_eq!(notifications[0].events.len(), 2);
        assert_eq!(scene.revision(plane), 1);
    }

    #[test]
    fn test_empty_guard_is_silent() {
        let mut scene = Scene::new();
        let model = scene.add_model("model", Mesh::new());
        drop(scene.begin_modification(model).unwrap());
        assert!(!scene.has_pending_notifications());
        assert_eq!(scene.revision(model), 0);
    }

    #[test]
    fn test_wrong_kind_write_is_rejected() {
        let mut scene = Scene::new();
        let points = scene.add_point_list("points", Vec::new());
        let result = scene.set_mesh(points, &Mesh::new());
        assert!(matches!(
            result,
            Err(Error::WrongNodeKind {
                expected: NodeKind::Model,
                found: NodeKind::PointList,
                ..
            })
        ));
        assert!(!scene.has_pending_notifications());
    }

    #[test]
    fn test_transform_change_notifies_descendants() {
        let mut scene = Scene::new();
        let root = scene.add_transform("root", Matrix4::identity());
        let child = scene.add_transform("child", Matrix4::identity());
        let model = scene.add_model("model", Mesh::new());
        let unrelated = scene.add_model("unrelated", Mesh::new());
        scene.set_parent_transform(child, Some(root)).unwrap();
        scene.set_parent_transform(model, Some(child)).unwrap();
        scene.drain_notifications();

        scene.set_matrix_to_parent(root, translation(0.0, 0.0, 1.0)).unwrap();
        let notifications = scene.drain_notifications();

        let notified: Vec<NodeKey> = notifications.iter().map(|n| n.node).collect();
        assert_eq!(notified.len(), 3);
        assert_eq!(notified[0], root);
        assert!(notified.contains(&child));
        assert!(notified.contains(&model));
        assert!(!notified.contains(&unrelated));
        assert!(notifications
            .iter()
            .all(|n| n.contains(ChangeEvent::TransformModified)));
    }

    #[test]
    fn test_operation_edits() {
        let mut scene = Scene::new();
        let model = scene.add_model("model", Mesh::new());
        let op = scene.add_operation("append", "Append");

        scene.add_reference(op, "Append.InputModel", model).unwrap();
        scene.add_reference(op, "Append.InputModel", model).unwrap();
        scene.set_parameter(op, "Key", 2.5).unwrap();

        assert_eq!(scene.references(op, "Append.InputModel"), &[model, model]);
        assert!(scene.references(op, "Other").is_empty());
        assert_eq!(scene.parameter(op, "Key"), Some(&ParameterValue::Double(2.5)));
        assert_eq!(scene.drain_notifications().len(), 3);

        assert!(scene.set_parameter(model, "Key", 1i64).is_err());
    }

    #[test]
    fn test_remove_node_cleans_up() {
        let mut scene = Scene::new();
        let parent = scene.add_transform("parent", Matrix4::identity());
        let model = scene.add_model("model", Mesh::new());
        let op = scene.add_operation("append", "Append");
        scene.set_parent_transform(model, Some(parent)).unwrap();
        scene.add_reference(op, "Append.InputModel", model).unwrap();
        scene.drain_notifications();

        scene.remove_node(model).unwrap();
        assert!(!scene.contains(model));
        assert!(scene.references(op, "Append.InputModel").is_empty());
        let notifications = scene.drain_notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].node, op);

        scene.remove_node(parent).unwrap();
        assert!(scene.remove_node(parent).is_err());
    }
}
