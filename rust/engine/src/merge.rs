// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh merge pipeline: gather meshes in world coordinates, merge coincident
//! points, then express the result in the output node's frame.

use dynmod_geometry::{CleanStats, Mesh, MeshCleaner};
use dynmod_scene::{NodeKey, Scene};
use nalgebra::Matrix4;

use crate::error::{Error, Result};

/// World-to-node transform of `node`, the inverse of its node-to-world
/// transform. Fails with [`Error::SingularTransform`] when that transform
/// cannot be inverted.
pub fn world_to_local(scene: &Scene, node: NodeKey) -> Result<Matrix4<f64>> {
    let to_world = scene.node_to_world(node)?;
    to_world.try_inverse().ok_or_else(|| {
        Error::SingularTransform(scene.name(node).unwrap_or_default().to_string())
    })
}

/// Reusable merge buffers. One pipeline lives in each tool instance that
/// merges meshes; nothing is reallocated once the buffers have grown.
#[derive(Debug, Default)]
pub struct MeshMergePipeline {
    world_copy: Mesh,
    appended: Mesh,
    cleaned: Mesh,
    local: Mesh,
    cleaner: MeshCleaner,
}

impl MeshMergePipeline {
    pub fn new(tolerance: f64) -> Self {
        Self {
            cleaner: MeshCleaner::new(tolerance),
            ..Self::default()
        }
    }

    /// Change the point merge tolerance, keeping the buffers
    pub fn set_tolerance(&mut self, tolerance: f64) {
        if self.cleaner.tolerance() != tolerance.max(0.0) {
            self.cleaner = MeshCleaner::new(tolerance);
        }
    }

    /// Forget everything appended so far
    pub fn clear(&mut self) {
        self.appended.clear();
    }

    /// Append `mesh` mapped through `to_world`.
    ///
    /// A mesh with polygon indices past its own points is rejected and
    /// nothing is appended.
    pub fn append(&mut self, mesh: &Mesh, to_world: &Matrix4<f64>) -> Result<()> {
        mesh.validate()?;
        mesh.transform_into(to_world, &mut self.world_copy);
        self.appended.merge(&self.world_copy);
        Ok(())
    }

    /// Number of points appended since the last clear
    pub fn appended_points(&self) -> usize {
        self.appended.point_count()
    }

    /// Merge coincident points and drop degenerate or repeated polygons
    pub fn merge(&mut self) -> CleanStats {
        let stats = self.cleaner.clean_into(&self.appended, &mut self.cleaned);
        tracing::debug!(
            points = self.cleaned.point_count(),
            polygons = self.cleaned.polygon_count(),
            merged_points = stats.merged_points,
            duplicate_polygons = stats.duplicate_polygons,
            "Merged meshes"
        );
        stats
    }

    /// Merged mesh in world coordinates
    pub fn merged(&self) -> &Mesh {
        &self.cleaned
    }

    /// Merged mesh mapped through `world_to_local`
    pub fn express_in(&mut self, world_to_local: &Matrix4<f64>) -> &Mesh {
        self.cleaned.transform_into(world_to_local, &mut self.local);
        &self.local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dynmod_geometry::cube;
    use nalgebra::{Point3, Vector3};

    #[test]
    fn test_shared_face_is_merged() {
        let mut pipeline = MeshMergePipeline::new(0.0);
        let unit = cube(1.0, 1.0, 1.0);
        pipeline.append(&unit, &Matrix4::identity()).unwrap();
        pipeline
            .append(&unit, &Matrix4::new_translation(&Vector3::new(1.0, 0.0, 0.0)))
            .unwrap();
        assert_eq!(pipeline.appended_points(), 16);

        let stats = pipeline.merge();
        assert_eq!(stats.merged_points, 4);
        assert_eq!(stats.duplicate_polygons, 1);
        assert_eq!(pipeline.merged().point_count(), 12);
        assert_eq!(pipeline.merged().polygon_count(), 11);
    }

    #[test]
    fn test_express_in_local_frame() {
        let mut pipeline = MeshMergePipeline::new(0.0);
        let mut mesh = Mesh::new();
        mesh.add_point(Point3::new(5.0, 0.0, 0.0));
        mesh.add_point(Point3::new(6.0, 0.0, 0.0));
        mesh.add_point(Point3::new(5.0, 1.0, 0.0));
        mesh.add_triangle(0, 1, 2);
        pipeline.append(&mesh, &Matrix4::identity()).unwrap();
        pipeline.merge();

        let world_to_local = Matrix4::new_translation(&Vector3::new(-5.0, 0.0, 0.0));
        let local = pipeline.express_in(&world_to_local);
        assert_relative_eq!(local.point(0), Point3::origin());
        assert_relative_eq!(local.point(2), Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_clear_between_runs() {
        let mut pipeline = MeshMergePipeline::new(0.0);
        pipeline.append(&cube(1.0, 1.0, 1.0), &Matrix4::identity()).unwrap();
        pipeline.clear();
        pipeline.merge();
        assert!(pipeline.merged().is_empty());
    }

    #[test]
    fn test_invalid_mesh_is_rejected() {
        let mut pipeline = MeshMergePipeline::new(0.0);
        let mut broken = Mesh::new();
        broken.add_point(Point3::origin());
        broken.add_point(Point3::new(1.0, 0.0, 0.0));
        broken.add_point(Point3::new(0.0, 1.0, 0.0));
        broken.add_triangle(0, 1, 5);

        assert!(matches!(
            pipeline.append(&broken, &Matrix4::identity()),
            Err(Error::Geometry(_))
        ));
        assert_eq!(pipeline.appended_points(), 0);
    }

    #[test]
    fn test_singular_output_frame() {
        let mut scene = Scene::new();
        let flat = scene.add_transform(
            "flat",
            Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 1.0, 0.0)),
        );
        let model = scene.add_model("model", Mesh::new());
        scene.set_parent_transform(model, Some(flat)).unwrap();

        assert!(matches!(
            world_to_local(&scene, model),
            Err(Error::SingularTransform(name)) if name == "model"
        ));
    }
}
