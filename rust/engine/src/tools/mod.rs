// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Built-in tools.

mod append;
mod create_arrow;
mod create_cube;
mod extrude;
mod mirror;
mod transform_maker;

pub use append::AppendTool;
pub use create_arrow::CreateArrowTool;
pub use create_cube::CreateCubeTool;
pub use extrude::ExtrudeTool;
pub use mirror::MirrorTool;
pub use transform_maker::TransformMakerTool;

use dynmod_geometry::Mesh;
use dynmod_scene::NodeKey;

use crate::error::Result;
use crate::merge::world_to_local;
use crate::resolver::ToolContext;

/// Write `mesh` to every output model, expressed in each node's own frame.
///
/// `mesh` is in world coordinates. Each node gets one guard and therefore one
/// notification. Frames are checked before anything is written.
pub(crate) fn write_world_mesh(
    ctx: &mut ToolContext<'_>,
    outputs: &[NodeKey],
    mesh: &Mesh,
    scratch: &mut Mesh,
) -> Result<()> {
    let frames = outputs
        .iter()
        .map(|&node| Ok((node, world_to_local(ctx.scene(), node)?)))
        .collect::<Result<Vec<_>>>()?;

    for (node, matrix) in frames {
        mesh.transform_into(&matrix, scratch);
        ctx.scene_mut().begin_modification(node)?.set_mesh(scratch)?;
    }
    Ok(())
}
