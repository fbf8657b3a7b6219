// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use dynmod_geometry::cube;
use dynmod_scene::NodeKind;

use crate::descriptor::{ParameterDescriptor, PortDescriptor, ToolDescriptors};
use crate::error::{ConfigurationError, Result};
use crate::resolver::ToolContext;
use crate::tool::Tool;

struct Roles;

impl Roles {
    const OUTPUT_MODEL: &'static str = "Cube.OutputModel";
}

/// Axis-aligned box centered at the origin of the output model.
pub struct CreateCubeTool {
    descriptors: Arc<ToolDescriptors>,
}

impl CreateCubeTool {
    pub const NAME: &'static str = "Create Cube";

    pub fn new() -> Result<Self, ConfigurationError> {
        let outputs = vec![PortDescriptor::new(
            "Cube model",
            "Output model receiving the box.",
            Roles::OUTPUT_MODEL,
        )
        .accepts(&[NodeKind::Model])];
        let parameters = vec![
            ParameterDescriptor::double("X length", "Size along X.", "XLength", 10.0)?,
            ParameterDescriptor::double("Y length", "Size along Y.", "YLength", 25.0)?,
            ParameterDescriptor::double("Z length", "Size along Z.", "ZLength", 50.0)?,
        ];

        Ok(Self {
            descriptors: Arc::new(ToolDescriptors::new(Vec::new(), outputs, parameters)?),
        })
    }
}

impl Tool for CreateCubeTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn create_instance(&self) -> Box<dyn Tool> {
        Box::new(Self {
            descriptors: Arc::clone(&self.descriptors),
        })
    }

    fn descriptors(&self) -> &ToolDescriptors {
        &self.descriptors
    }

    fn run_internal(&mut self, ctx: &mut ToolContext<'_>) -> Result<()> {
        let mesh = cube(
            self.nth_parameter_value(0, ctx).to_f64(),
            self.nth_parameter_value(1, ctx).to_f64(),
            self.nth_parameter_value(2, ctx).to_f64(),
        );
        for node in ctx.nodes_for(&self.descriptors, Roles::OUTPUT_MODEL) {
            ctx.scene_mut().begin_modification(node)?.set_mesh(&mesh)?;
        }
        Ok(())
    }
}
