// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transform maker: folds markups and transforms into one rigid transform
//! and publishes it as a point, an angle, a plane and a matrix.

use std::sync::Arc;

use dynmod_scene::{ChangeEvent, NodeKind, PlaneType};

use crate::compose::{compose, ComposedTransform, FrameMode};
use crate::descriptor::{ParameterDescriptor, PortDescriptor, ToolDescriptors};
use crate::error::{ConfigurationError, Result};
use crate::resolver::ToolContext;
use crate::sources::resolve_sources;
use crate::tool::Tool;

struct Roles;

impl Roles {
    const SOURCE: &'static str = "TransformMaker.TransformSource";
    const OUTPUT_POINT: &'static str = "TransformMaker.OutputPoint";
    const OUTPUT_ANGLE: &'static str = "TransformMaker.OutputAngle";
    const OUTPUT_PLANE: &'static str = "TransformMaker.OutputPlane";
    const OUTPUT_TRANSFORM: &'static str = "TransformMaker.OutputLinearTransform";
}

const IGNORE_PARENTS: &str = "Ignore ParentTransforms";
const USE_PARENTS: &str = "Use ParentTransforms";

pub struct TransformMakerTool {
    descriptors: Arc<ToolDescriptors>,
}

impl TransformMakerTool {
    pub const NAME: &'static str = "Transform maker";

    pub fn new() -> Result<Self, ConfigurationError> {
        let inputs = vec![PortDescriptor::new(
            "Input nodes",
            "Sources of the final transform, applied in post-multiply order.",
            Roles::SOURCE,
        )
        .accepts(&[
            NodeKind::PointList,
            NodeKind::Angle,
            NodeKind::Plane,
            NodeKind::LinearTransform,
        ])
        .required()
        .multiple()
        .triggers(&[
            ChangeEvent::Modified,
            ChangeEvent::PointModified,
            ChangeEvent::TransformModified,
        ])];

        let outputs = vec![
            PortDescriptor::new(
                "Final transform position",
                "Point list holding the translation of the final transform.",
                Roles::OUTPUT_POINT,
            )
            .accepts(&[NodeKind::PointList]),
            PortDescriptor::new(
                "Final transform angle",
                "Final rotation as an angle; the rotation axis passes through the vertex, normal to the arms.",
                Roles::OUTPUT_ANGLE,
            )
            .accepts(&[NodeKind::Angle]),
            PortDescriptor::new(
                "Final transform frame",
                "Final transform as a plane whose axes follow the rotation and whose origin is the translation.",
                Roles::OUTPUT_PLANE,
            )
            .accepts(&[NodeKind::Plane]),
            PortDescriptor::new(
                "Full final transform",
                "Final transform as the matrix of a linear transform node.",
                Roles::OUTPUT_TRANSFORM,
            )
            .accepts(&[NodeKind::LinearTransform]),
        ];

        let parameters = vec![ParameterDescriptor::enumerated(
            "Use parent transforms",
            "Whether the parent transforms of the sources are applied.",
            "UseParentTransforms",
            &[IGNORE_PARENTS, USE_PARENTS],
            IGNORE_PARENTS,
        )?];

        Ok(Self {
            descriptors: Arc::new(ToolDescriptors::new(inputs, outputs, parameters)?),
        })
    }

    fn frame_mode(&self, ctx: &ToolContext<'_>) -> FrameMode {
        match self.nth_parameter_value(0, ctx).as_str() {
            Some(USE_PARENTS) => FrameMode::World,
            _ => FrameMode::Local,
        }
    }

    fn write_outputs(&self, ctx: &mut ToolContext<'_>, composed: &ComposedTransform) -> Result<()> {
        let handle = ctx.config().handle_length;

        for node in ctx.nodes_for(&self.descriptors, Roles::OUTPUT_POINT) {
            ctx.scene_mut()
                .begin_modification(node)?
                .set_control_points(&[composed.position()])?;
        }
        for node in ctx.nodes_for(&self.descriptors, Roles::OUTPUT_ANGLE) {
            ctx.scene_mut()
                .begin_modification(node)?
                .set_control_points(&composed.angle_points(handle))?;
        }
        for node in ctx.nodes_for(&self.descriptors, Roles::OUTPUT_PLANE) {
            let mut guard = ctx.scene_mut().begin_modification(node)?;
            guard.set_plane_type(PlaneType::ThreePoints)?;
            guard.set_control_points(&composed.plane_points(handle))?;
        }
        for node in ctx.nodes_for(&self.descriptors, Roles::OUTPUT_TRANSFORM) {
            ctx.scene_mut()
                .begin_modification(node)?
                .set_matrix_to_parent(composed.matrix)?;
        }
        Ok(())
    }
}

impl Tool for TransformMakerTool {
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
        let mode = self.frame_mode(ctx);
        let nodes = ctx.nodes_for(&self.descriptors, Roles::SOURCE);
        let composed = compose(&resolve_sources(ctx.scene(), &nodes), mode);
        tracing::debug!(
            operation = ctx.operation_name(),
            sources = nodes.len(),
            ?mode,
            "Composed transform"
        );
        self.write_outputs(ctx, &composed)
    }
}
