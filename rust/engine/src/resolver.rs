// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reference resolution and the per-run tool context.

use dynmod_scene::{NodeKey, NodeKind, ParameterValue, Scene};
use smallvec::SmallVec;

use crate::config::ModelerConfig;
use crate::descriptor::{PortDescriptor, ToolDescriptors};

/// Role-based lookup of the nodes an operation references.
pub trait ReferenceResolver {
    /// Number of references under `role`
    fn count_by_role(&self, role: &str) -> usize;

    /// The `index`-th reference under `role`, if it exists and is alive
    fn resolve_by_role(&self, role: &str, index: usize) -> Option<NodeKey>;

    /// Kind of a live node
    fn node_kind(&self, node: NodeKey) -> Option<NodeKind>;

    /// The `index`-th reference of `port`, if its kind is accepted
    fn resolve_accepted(&self, port: &PortDescriptor, index: usize) -> Option<NodeKey> {
        let node = self.resolve_by_role(port.role(), index)?;
        port.accepts_kind(self.node_kind(node)?).then_some(node)
    }

    /// All references of `port` whose kind is accepted, in reference order
    fn accepted_nodes(&self, port: &PortDescriptor) -> SmallVec<[NodeKey; 4]> {
        (0..self.count_by_role(port.role()))
            .filter_map(|i| self.resolve_accepted(port, i))
            .collect()
    }
}

/// Everything a tool sees during one run: the scene, the operation node it
/// runs for, and the engine configuration.
pub struct ToolContext<'a> {
    scene: &'a mut Scene,
    operation: NodeKey,
    config: &'a ModelerConfig,
}

impl<'a> ToolContext<'a> {
    pub fn new(scene: &'a mut Scene, operation: NodeKey, config: &'a ModelerConfig) -> Self {
        Self {
            scene,
            operation,
            config,
        }
    }

    pub fn operation(&self) -> NodeKey {
        self.operation
    }

    /// Name of the operation node, for log messages
    pub fn operation_name(&self) -> &str {
        self.scene.name(self.operation).unwrap_or("<removed>")
    }

    pub fn scene(&self) -> &Scene {
        self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        self.scene
    }

    pub fn config(&self) -> &ModelerConfig {
        self.config
    }

    /// Value stored on the operation node under `key`
    pub fn parameter(&self, key: &str) -> Option<&ParameterValue> {
        self.scene.parameter(self.operation, key)
    }

    /// Accepted nodes referenced under `role`. Empty if `role` is not one
    /// of the tool's ports.
    pub fn nodes_for(&self, descriptors: &ToolDescriptors, role: &str) -> SmallVec<[NodeKey; 4]> {
        descriptors
            .port(role)
            .map(|port| self.accepted_nodes(port))
            .unwrap_or_default()
    }

    /// First accepted node referenced under `role`
    pub fn first_for(&self, descriptors: &ToolDescriptors, role: &str) -> Option<NodeKey> {
        let port = descriptors.port(role)?;
        (0..self.count_by_role(role)).find_map(|i| self.resolve_accepted(port, i))
    }
}

impl ReferenceResolver for ToolContext<'_> {
    fn count_by_role(&self, role: &str) -> usize {
        self.scene.references(self.operation, role).len()
    }

    fn resolve_by_role(&self, role: &str, index: usize) -> Option<NodeKey> {
        self.scene
            .references(self.operation, role)
            .get(index)
            .copied()
            .filter(|&node| self.scene.contains(node))
    }

    fn node_kind(&self, node: NodeKey) -> Option<NodeKind> {
        self.scene.kind(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynmod_geometry::Mesh;

    #[test]
    fn test_resolution_filters_kinds() {
        let mut scene = Scene::new();
        let model = scene.add_model("model", Mesh::new());
        let line = scene.add_line("line", Vec::new());
        let op = scene.add_operation("op", "Test");
        scene.set_references(op, "Test.Input", vec![line, model]).unwrap();

        let port = PortDescriptor::new("Input", "", "Test.Input").accepts(&[NodeKind::Model]);
        let descriptors = ToolDescriptors::new(vec![port], Vec::new(), Vec::new()).unwrap();
        let config = ModelerConfig::default();
        let ctx = ToolContext::new(&mut scene, op, &config);

        assert_eq!(ctx.count_by_role("Test.Input"), 2);
        assert_eq!(ctx.resolve_by_role("Test.Input", 0), Some(line));
        assert_eq!(ctx.resolve_by_role("Test.Input", 2), None);
        assert_eq!(ctx.nodes_for(&descriptors, "Test.Input").as_slice(), &[model]);
        assert_eq!(ctx.first_for(&descriptors, "Test.Input"), Some(model));
        assert!(ctx.nodes_for(&descriptors, "Test.Unknown").is_empty());
    }
}
