// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mirror: reflect a model across a plane.

use std::sync::Arc;

use dynmod_geometry::transform::{is_orientation_reversing, reflection_across_plane};
use dynmod_geometry::Mesh;
use dynmod_scene::{ChangeEvent, NodeKind};
use nalgebra::{Matrix4, Point3};

use crate::descriptor::{PortDescriptor, ToolDescriptors};
use crate::error::{ConfigurationError, Result};
use crate::merge::world_to_local;
use crate::resolver::ToolContext;
use crate::sources::{GeometricSource, SourceGeometry};
use crate::tool::Tool;

struct Roles;

impl Roles {
    const INPUT_MODEL: &'static str = "Mirror.InputModel";
    const INPUT_PLANE: &'static str = "Mirror.InputPlane";
    const OUTPUT_MODEL: &'static str = "Mirror.OutputModel";
}

pub struct MirrorTool {
    descriptors: Arc<ToolDescriptors>,
    mirrored: Mesh,
}

impl MirrorTool {
    pub const NAME: &'static str = "Mirror";

    pub fn new() -> Result<Self, ConfigurationError> {
        let inputs = vec![
            PortDescriptor::new("Model", "Model to mirror.", Roles::INPUT_MODEL)
                .accepts(&[NodeKind::Model])
                .required()
                .triggers(&[
                    ChangeEvent::Modified,
                    ChangeEvent::MeshModified,
                    ChangeEvent::TransformModified,
                ]),
            PortDescriptor::new("Mirror plane", "Plane to mirror across.", Roles::INPUT_PLANE)
                .accepts(&[NodeKind::Plane])
                .required()
                .triggers(&[
                    ChangeEvent::Modified,
                    ChangeEvent::PointModified,
                    ChangeEvent::TransformModified,
                ]),
        ];
        let outputs = vec![PortDescriptor::new(
            "Mirrored model",
            "Output model receiving the reflection.",
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
            mirrored: Mesh::new(),
        }
    }
}

/// World-space reflection across the plane node, `None` if ill-defined
fn world_reflection(source: &GeometricSource<'_>) -> Option<Matrix4<f64>> {
    let SourceGeometry::Plane(Some(frame)) = source.geometry else {
        return None;
    };
    let world = source.to_world() * frame;
    let origin = Point3::new(world[(0, 3)], world[(1, 3)], world[(2, 3)]);
    let normal = world.fixed_view::<3, 1>(0, 2).into_owned();
    reflection_across_plane(&origin, &normal)
}

impl Tool for MirrorTool {
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
        let (Some(model), Some(plane)) = (
            ctx.first_for(&self.descriptors, Roles::INPUT_MODEL),
            ctx.first_for(&self.descriptors, Roles::INPUT_PLANE),
        ) else {
            return Ok(());
        };

        let reflection = GeometricSource::resolve(ctx.scene(), plane)
            .as_ref()
            .and_then(world_reflection);
        let Some(reflection) = reflection else {
            tracing::debug!(operation = ctx.operation_name(), "Mirror plane is not well defined");
            return Ok(());
        };
        let model_to_world = ctx.scene().node_to_world(model)?;

        let outputs = ctx.nodes_for(&self.descriptors, Roles::OUTPUT_MODEL);
        let frames = outputs
            .iter()
            .map(|&node| Ok((node, world_to_local(ctx.scene(), node)?)))
            .collect::<Result<Vec<_>>>()?;

        for (output, world_to_output) in frames {
            let combined = world_to_output * reflection * model_to_world;
            let Some(mesh) = ctx.scene().get(model).and_then(|n| n.data.mesh()) else {
                return Ok(());
            };
            mesh.transform_into(&combined, &mut self.mirrored);
            if is_orientation_reversing(&combined) {
                self.mirrored.reverse_winding();
            }
            ctx.scene_mut()
                .begin_modification(output)?
                .set_mesh(&self.mirrored)?;
        }
        Ok(())
    }
}
