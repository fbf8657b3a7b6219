// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use dynmod_geometry::{arrow, ArrowParams};
use dynmod_scene::NodeKind;

use crate::descriptor::{ParameterDescriptor, PortDescriptor, ToolDescriptors};
use crate::error::{ConfigurationError, Result};
use crate::resolver::ToolContext;
use crate::tool::Tool;

struct Roles;

impl Roles {
    const OUTPUT_MODEL: &'static str = "Arrow.OutputModel";
}

/// Unit-length arrow along +X in the output model's frame.
pub struct CreateArrowTool {
    descriptors: Arc<ToolDescriptors>,
}

impl CreateArrowTool {
    pub const NAME: &'static str = "Create Arrow";

    pub fn new() -> Result<Self, ConfigurationError> {
        let defaults = ArrowParams::default();
        let outputs = vec![PortDescriptor::new(
            "Arrow model",
            "Output model receiving the arrow.",
            Roles::OUTPUT_MODEL,
        )
        .accepts(&[NodeKind::Model])];
        let parameters = vec![
            ParameterDescriptor::double(
                "Tip length",
                "Length of the tip as a fraction of the arrow length (0 to 1).",
                "TipLength",
                defaults.tip_length,
            )?,
            ParameterDescriptor::double(
                "Tip radius",
                "Radius of the cone base (0 to 10).",
                "TipRadius",
                defaults.tip_radius,
            )?,
            ParameterDescriptor::int(
                "Tip resolution",
                "Number of sides of the cone (3 to 128).",
                "TipResolution",
                i64::from(defaults.tip_resolution),
            )?,
            ParameterDescriptor::double(
                "Shaft radius",
                "Radius of the shaft (0 to 5).",
                "ShaftRadius",
                defaults.shaft_radius,
            )?,
            ParameterDescriptor::int(
                "Shaft resolution",
                "Number of sides of the shaft (3 to 128).",
                "ShaftResolution",
                i64::from(defaults.shaft_resolution),
            )?,
        ];

        Ok(Self {
            descriptors: Arc::new(ToolDescriptors::new(Vec::new(), outputs, parameters)?),
        })
    }

    fn params(&self, ctx: &ToolContext<'_>) -> ArrowParams {
        let resolution = |n: usize| {
            let value = self.nth_parameter_value(n, ctx).to_i64();
            value.clamp(
                i64::from(ArrowParams::MIN_RESOLUTION),
                i64::from(ArrowParams::MAX_RESOLUTION),
            ) as u32
        };
        ArrowParams {
            tip_length: self.nth_parameter_value(0, ctx).to_f64(),
            tip_radius: self.nth_parameter_value(1, ctx).to_f64(),
            tip_resolution: resolution(2),
            shaft_radius: self.nth_parameter_value(3, ctx).to_f64(),
            shaft_resolution: resolution(4),
        }
        .clamped()
    }
}

impl Tool for CreateArrowTool {
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
        let mesh = arrow(&self.params(ctx));
        for node in ctx.nodes_for(&self.descriptors, Roles::OUTPUT_MODEL) {
            ctx.scene_mut().begin_modification(node)?.set_mesh(&mesh)?;
        }
        Ok(())
    }
}
