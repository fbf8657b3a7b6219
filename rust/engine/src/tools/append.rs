// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Append: union of several models into one, with coincident points merged.

use std::sync::Arc;

use dynmod_scene::{ChangeEvent, NodeKind};

use crate::descriptor::{PortDescriptor, ToolDescriptors};
use crate::error::{ConfigurationError, Result};
use crate::merge::{world_to_local, MeshMergePipeline};
use crate::resolver::ToolContext;
use crate::tool::Tool;

struct Roles;

impl Roles {
    const INPUT_MODEL: &'static str = "Append.InputModel";
    const OUTPUT_MODEL: &'static str = "Append.OutputModel";
}

pub struct AppendTool {
    descriptors: Arc<ToolDescriptors>,
    pipeline: MeshMergePipeline,
}

impl AppendTool {
    pub const NAME: &'static str = "Append";

    pub fn new() -> Result<Self, ConfigurationError> {
        let inputs = vec![PortDescriptor::new(
            "Model",
            "Models to append, in order.",
            Roles::INPUT_MODEL,
        )
        .accepts(&[NodeKind::Model])
        .required()
        .multiple()
        .triggers(&[
            ChangeEvent::Modified,
            ChangeEvent::MeshModified,
            ChangeEvent::TransformModified,
        ])];
        let outputs = vec![PortDescriptor::new(
            "Appended model",
            "Union of the input models.",
            Roles::OUTPUT_MODEL,
        )
        .accepts(&[NodeKind::Model])];

        Ok(Self::with_descriptors(Arc::new(ToolDescriptors::new(
            inputs,
            outputs,
            Vec::new(),
        )?)))
    }

    fn with_descriptors(descriptors: Arc<ToolDescriptors>) -> Self {
        Self {
            descriptors,
            pipeline: MeshMergePipeline::default(),
        }
    }
}

impl Tool for AppendTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn create_instance(&self) -> Box<dyn Tool> {
        Box::new(Self::with_descriptors(Arc::clone(&self.descriptors)))
    }

    fn descriptors(&self) -> &ToolDescriptors {
        &self.descriptors
    }

    fn run_internal(&mut self, ctx: &mut ToolContext<'_>) -> Result<()> {
        self.pipeline.set_tolerance(ctx.config().merge_tolerance);
        self.pipeline.clear();

        let inputs = ctx.nodes_for(&self.descriptors, Roles::INPUT_MODEL);
        let mut usable = 0;
        for &node in &inputs {
            let scene = ctx.scene();
            let Some(mesh) = scene.get(node).and_then(|n| n.data.mesh()) else {
                continue;
            };
            if let Err(e) = self.pipeline.append(mesh, &scene.node_to_world(node)?) {
                tracing::warn!(
                    operation = ctx.operation_name(),
                    model = scene.name(node).unwrap_or_default(),
                    error = %e,
                    "Skipping invalid input model"
                );
                continue;
            }
            usable += 1;
        }
        if usable == 0 {
            tracing::debug!(operation = ctx.operation_name(), "No usable input model");
            return Ok(());
        }

        self.pipeline.merge();

        let outputs = ctx.nodes_for(&self.descriptors, Roles::OUTPUT_MODEL);
        let frames = outputs
            .iter()
            .map(|&node| Ok((node, world_to_local(ctx.scene(), node)?)))
            .collect::<Result<Vec<_>>>()?;
        for (node, matrix) in frames {
            let mesh = self.pipeline.express_in(&matrix);
            ctx.scene_mut().begin_modification(node)?.set_mesh(mesh)?;
        }
        Ok(())
    }
}
