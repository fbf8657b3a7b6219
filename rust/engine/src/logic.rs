// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Modeler logic: one tool instance per operation node, re-run when the
//! nodes it observes change.
//!
//! Dispatch happens in rounds. Each round drains the scene's notification
//! queue and runs every affected operation at most once; whatever those runs
//! write forms the next round. An operation is affected when
//!
//! - its own node was modified (parameters, references, flags), or
//! - a node referenced under one of its input roles reports an event listed
//!   by that input port.
//!
//! Only operations with continuous update enabled react to notifications.
//! The others run through [`ModelerLogic::run_operation`] alone.

use dynmod_scene::{ChangeNotification, NodeKey, OperationData, Scene};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::catalog::ToolCatalog;
use crate::config::ModelerConfig;
use crate::descriptor::ToolDescriptors;
use crate::error::{Error, Result};
use crate::resolver::ToolContext;
use crate::tool::Tool;

struct ToolInstance {
    tool_name: String,
    tool: Box<dyn Tool>,
}

/// Outcome of a dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Notification rounds processed
    pub rounds: usize,
    /// Tool runs performed
    pub runs: usize,
    /// Runs that reported failure or could not start
    pub failures: usize,
    /// Whether the round limit stopped the dispatch
    pub truncated: bool,
}

pub struct ModelerLogic {
    catalog: ToolCatalog,
    config: ModelerConfig,
    instances: FxHashMap<NodeKey, ToolInstance>,
}

impl ModelerLogic {
    pub fn new(catalog: ToolCatalog, config: ModelerConfig) -> Self {
        Self {
            catalog,
            config,
            instances: FxHashMap::default(),
        }
    }

    /// Logic over the built-in tools with the default configuration
    pub fn with_default_tools() -> Self {
        Self::new(ToolCatalog::with_default_tools(), ModelerConfig::default())
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &ModelerConfig {
        &self.config
    }

    /// Number of live tool instances
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Run the tool of `operation` once, whatever its update mode.
    ///
    /// Errors are reserved for requests that cannot reach a tool: a node that
    /// is missing or not an operation, or an unknown tool name. The tool's
    /// own outcome is the returned flag.
    pub fn run_operation(&mut self, scene: &mut Scene, operation: NodeKey) -> Result<bool> {
        let tool_name = match scene.node(operation)?.data.operation() {
            Some(op) => op.tool_name.clone(),
            None => return Err(Error::NotAnOperation(operation)),
        };
        let tool = Self::instance(&mut self.instances, &self.catalog, operation, &tool_name)?;
        let mut ctx = ToolContext::new(scene, operation, &self.config);
        Ok(tool.run(&mut ctx))
    }

    /// Run every continuous-update operation once, then dispatch the
    /// resulting notifications.
    pub fn update_all(&mut self, scene: &mut Scene) -> DispatchReport {
        let operations: Vec<NodeKey> = scene
            .iter()
            .filter(|(_, node)| node.data.operation().is_some_and(|op| op.continuous_update))
            .map(|(key, _)| key)
            .collect();

        let mut report = DispatchReport::default();
        self.run_batch(scene, &operations, &mut report);
        let dispatched = self.process_notifications(scene);
        DispatchReport {
            rounds: dispatched.rounds,
            runs: report.runs + dispatched.runs,
            failures: report.failures + dispatched.failures,
            truncated: dispatched.truncated,
        }
    }

    /// Dispatch pending notifications until the scene is quiet or the round
    /// limit is hit. Notifications left at the limit are discarded.
    pub fn process_notifications(&mut self, scene: &mut Scene) -> DispatchReport {
        let mut report = DispatchReport::default();
        self.instances.retain(|key, _| scene.contains(*key));

        while scene.has_pending_notifications() {
            if report.rounds >= self.config.max_dispatch_rounds {
                let dropped = scene.drain_notifications().len();
                tracing::warn!(
                    rounds = report.rounds,
                    dropped,
                    "Dispatch round limit reached, stopping"
                );
                report.truncated = true;
                break;
            }
            report.rounds += 1;

            let notifications = scene.drain_notifications();
            self.instances.retain(|key, _| scene.contains(*key));
            let triggered = self.triggered_operations(scene, &notifications);
            tracing::debug!(
                round = report.rounds,
                notifications = notifications.len(),
                triggered = triggered.len(),
                "Dispatch round"
            );
            self.run_batch(scene, &triggered, &mut report);
        }
        report
    }

    fn run_batch(&mut self, scene: &mut Scene, operations: &[NodeKey], report: &mut DispatchReport) {
        for &operation in operations {
            match self.run_operation(scene, operation) {
                Ok(succeeded) => {
                    report.runs += 1;
                    if !succeeded {
                        report.failures += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        operation = scene.name(operation).unwrap_or_default(),
                        error = %e,
                        "Operation could not run"
                    );
                    report.failures += 1;
                }
            }
        }
    }

    /// Continuous-update operations affected by `notifications`, each once,
    /// in scene order
    fn triggered_operations(
        &mut self,
        scene: &Scene,
        notifications: &[ChangeNotification],
    ) -> Vec<NodeKey> {
        let changed: FxHashSet<NodeKey> = notifications.iter().map(|n| n.node).collect();
        let mut triggered = Vec::new();

        for (key, node) in scene.iter() {
            let Some(op) = node.data.operation() else {
                continue;
            };
            if !op.continuous_update {
                continue;
            }
            if changed.contains(&key) {
                triggered.push(key);
                continue;
            }
            let tool = match Self::instance(&mut self.instances, &self.catalog, key, &op.tool_name) {
                Ok(tool) => tool,
                Err(e) => {
                    tracing::debug!(operation = %node.name, error = %e, "Skipping operation");
                    continue;
                }
            };
            let descriptors = tool.descriptors();
            if notifications
                .iter()
                .any(|n| observes(op, descriptors, n))
            {
                triggered.push(key);
            }
        }
        triggered
    }

    fn instance<'a>(
        instances: &'a mut FxHashMap<NodeKey, ToolInstance>,
        catalog: &ToolCatalog,
        operation: NodeKey,
        tool_name: &str,
    ) -> Result<&'a mut Box<dyn Tool>> {
        let stale = instances
            .get(&operation)
            .map_or(true, |instance| instance.tool_name != tool_name);
        if stale {
            let tool = catalog.create_instance(tool_name)?;
            tracing::debug!(tool = tool_name, "Created tool instance");
            instances.insert(
                operation,
                ToolInstance {
                    tool_name: tool_name.to_string(),
                    tool,
                },
            );
        }
        instances
            .get_mut(&operation)
            .map(|instance| &mut instance.tool)
            .ok_or(Error::NotAnOperation(operation))
    }
}

/// Whether `notification` concerns a node `op` references under an input
/// role, with an event that input port listens to
fn observes(op: &OperationData, descriptors: &ToolDescriptors, notification: &ChangeNotification) -> bool {
    descriptors.inputs().iter().any(|port| {
        notification.matches_any(port.events())
            && op.references(port.role()).contains(&notification.node)
    })
}

impl Default for ModelerLogic {
    fn default() -> Self {
        Self::with_default_tools()
    }
}

impl std::fmt::Debug for ModelerLogic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelerLogic")
            .field("tools", &self.catalog.tool_names())
            .field("config", &self.config)
            .field("instances", &self.instances.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynmod_geometry::Mesh;

    #[test]
    fn test_run_operation_rejects_non_operations() {
        let mut logic = ModelerLogic::with_default_tools();
        let mut scene = Scene::new();
        let model = scene.add_model("model", Mesh::new());
        assert!(matches!(
            logic.run_operation(&mut scene, model),
            Err(Error::NotAnOperation(key)) if key == model
        ));
    }

    #[test]
    fn test_run_operation_unknown_tool() {
        let mut logic = ModelerLogic::with_default_tools();
        let mut scene = Scene::new();
        let op = scene.add_operation("op", "Does not exist");
        assert!(matches!(
            logic.run_operation(&mut scene, op),
            Err(Error::UnknownTool(_))
        ));
        assert_eq!(logic.instance_count(), 0);
    }

    #[test]
    fn test_instances_follow_scene() {
        let mut logic = ModelerLogic::with_default_tools();
        let mut scene = Scene::new();
        let output = scene.add_model("cube", Mesh::new());
        let op = scene.add_operation("op", "Create Cube");
        scene.add_reference(op, "Cube.OutputModel", output).unwrap();

        assert!(logic.run_operation(&mut scene, op).unwrap());
        assert_eq!(logic.instance_count(), 1);

        scene.remove_node(op).unwrap();
        logic.process_notifications(&mut scene);
        assert_eq!(logic.instance_count(), 0);
    }

    #[test]
    fn test_kind_check_on_missing_node() {
        let mut logic = ModelerLogic::with_default_tools();
        let mut scene = Scene::new();
        let op = scene.add_operation("op", "Append");
        scene.remove_node(op).unwrap();
        assert!(matches!(
            logic.run_operation(&mut scene, op),
            Err(Error::Scene(_))
        ));
    }
}
