// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrude: sweep a surface into a closed solid.
//!
//! The sweep direction depends on the optional markup input:
//!
//! | markup           | `Fixed`                             | `Scaled`                          |
//! |------------------|-------------------------------------|-----------------------------------|
//! | none             | point normals × value               | point normals × value             |
//! | plane            | world normal × value                | world normal × value              |
//! | point list       | toward the first point, unit × value | `-value × (p - first point)`      |
//! | line (2 points)  | unit line direction × value         | line vector × value               |
//!
//! Markups that cannot define a direction fall back to point normals.

use std::sync::Arc;

use dynmod_geometry::{extrude_linear, ExtrusionDirection, Mesh};
use dynmod_scene::{ChangeEvent, NodeData, NodeKey, NodeKind, Scene};
use nalgebra::{Matrix4, Vector3};

use crate::descriptor::{ParameterDescriptor, PortDescriptor, ToolDescriptors};
use crate::error::{ConfigurationError, Result};
use crate::resolver::ToolContext;
use crate::tool::Tool;
use crate::tools::write_world_mesh;

struct Roles;

impl Roles {
    const INPUT_MODEL: &'static str = "Extrude.InputModel";
    const INPUT_MARKUPS: &'static str = "Extrude.InputMarkups";
    const OUTPUT_MODEL: &'static str = "Extrude.OutputModel";
}

const FIXED: &str = "Fixed";
const SCALED: &str = "Scaled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LengthMode {
    Fixed,
    Scaled,
}

pub struct ExtrudeTool {
    descriptors: Arc<ToolDescriptors>,
    world_mesh: Mesh,
    local_mesh: Mesh,
}

impl ExtrudeTool {
    pub const NAME: &'static str = "Extrude";

    pub fn new() -> Result<Self, ConfigurationError> {
        let inputs = vec![
            PortDescriptor::new("Model", "Surface to extrude.", Roles::INPUT_MODEL)
                .accepts(&[NodeKind::Model])
                .required()
                .triggers(&[
                    ChangeEvent::Modified,
                    ChangeEvent::MeshModified,
                    ChangeEvent::TransformModified,
                ]),
            PortDescriptor::new(
                "Markups",
                "Optional point list, line or plane defining the extrusion direction.",
                Roles::INPUT_MARKUPS,
            )
            .accepts(&[NodeKind::PointList, NodeKind::Line, NodeKind::Plane])
            .triggers(&[
                ChangeEvent::Modified,
                ChangeEvent::PointModified,
                ChangeEvent::TransformModified,
            ]),
        ];
        let outputs = vec![PortDescriptor::new(
            "Extruded model",
            "Output model receiving the closed surface.",
            Roles::OUTPUT_MODEL,
        )
        .accepts(&[NodeKind::Model])];
        let parameters = vec![
            ParameterDescriptor::enumerated(
                "Length mode",
                "Fixed or scaled length. Ignored for planes.",
                "Extrude.LengthMode",
                &[FIXED, SCALED],
                FIXED,
            )?,
            ParameterDescriptor::double(
                "Extrusion length",
                "Length or scale factor of the extrusion.",
                "Extrude.ExtrusionValue",
                1.0,
            )?,
        ];

        Ok(Self::with_descriptors(Arc::new(ToolDescriptors::new(
            inputs, outputs, parameters,
        )?)))
    }

    fn with_descriptors(descriptors: Arc<ToolDescriptors>) -> Self {
        Self {
            descriptors,
            world_mesh: Mesh::new(),
            local_mesh: Mesh::new(),
        }
    }

    fn length_mode(&self, ctx: &ToolContext<'_>) -> LengthMode {
        match self.nth_parameter_value(0, ctx).as_str() {
            Some(SCALED) => LengthMode::Scaled,
            _ => LengthMode::Fixed,
        }
    }
}

/// Extrusion direction for the optional markup node, in world coordinates
fn direction(
    scene: &Scene,
    markups: Option<NodeKey>,
    mode: LengthMode,
    value: f64,
) -> Result<ExtrusionDirection> {
    let normals = ExtrusionDirection::PointNormals(value);
    let Some(node) = markups else {
        return Ok(normals);
    };
    let Some(entry) = scene.get(node) else {
        return Ok(normals);
    };
    let to_world: Matrix4<f64> = scene.node_to_world(node)?;

    let direction = match (&entry.data, mode) {
        (NodeData::Plane(plane), _) => match plane.object_to_node() {
            Some(frame) => {
                let world = to_world * frame;
                let normal: Vector3<f64> = world.fixed_view::<3, 1>(0, 2).into_owned();
                ExtrusionDirection::Vector(normal.normalize() * value)
            }
            None => normals,
        },
        (NodeData::PointList(points), LengthMode::Fixed) => match points.first() {
            Some(first) => ExtrusionDirection::TowardPoint {
                target: to_world.transform_point(first),
                distance: value,
            },
            None => normals,
        },
        (NodeData::PointList(points), LengthMode::Scaled) => match points.first() {
            Some(first) => ExtrusionDirection::FromPoint {
                origin: to_world.transform_point(first),
                scale: -value,
            },
            None => normals,
        },
        (NodeData::Line(points), _) => match points.as_slice() {
            [start, end] => {
                let vector = to_world.transform_point(end) - to_world.transform_point(start);
                match mode {
                    LengthMode::Fixed => match vector.try_normalize(f64::EPSILON) {
                        Some(unit) => ExtrusionDirection::Vector(unit * value),
                        None => normals,
                    },
                    LengthMode::Scaled => ExtrusionDirection::Vector(vector * value),
                }
            }
            _ => normals,
        },
        _ => normals,
    };
    Ok(direction)
}

impl Tool for ExtrudeTool {
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
        let Some(model) = ctx.first_for(&self.descriptors, Roles::INPUT_MODEL) else {
            return Ok(());
        };
        let outputs = ctx.nodes_for(&self.descriptors, Roles::OUTPUT_MODEL);

        let extruded = {
            let scene = ctx.scene();
            let Some(mesh) = scene.get(model).and_then(|n| n.data.mesh()) else {
                return Ok(());
            };
            if mesh.is_empty() {
                Mesh::new()
            } else {
                mesh.transform_into(&scene.node_to_world(model)?, &mut self.world_mesh);
                let markups = ctx.first_for(&self.descriptors, Roles::INPUT_MARKUPS);
                let direction = direction(
                    scene,
                    markups,
                    self.length_mode(ctx),
                    self.nth_parameter_value(1, ctx).to_f64(),
                )?;
                tracing::debug!(operation = ctx.operation_name(), ?direction, "Extruding");
                extrude_linear(&self.world_mesh, &direction)?
            }
        };

        write_world_mesh(ctx, &outputs, &extruded, &mut self.local_mesh)
    }
}
