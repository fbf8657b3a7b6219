// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use dynmod_engine::{ModelerConfig, ModelerLogic, ToolCatalog};
use dynmod_geometry::Mesh;
use dynmod_scene::{NodeKey, Scene};
use nalgebra::{Matrix4, Point3, Vector3};

const SOURCE: &str = "TransformMaker.TransformSource";
const OUTPUT_TRANSFORM: &str = "TransformMaker.OutputLinearTransform";

fn translation_of(scene: &Scene, node: NodeKey) -> Vector3<f64> {
    let matrix = scene.get(node).unwrap().data.matrix_to_parent().unwrap();
    matrix.fixed_view::<3, 1>(0, 3).into_owned()
}

fn follower() -> (Scene, NodeKey, NodeKey, NodeKey) {
    let mut scene = Scene::new();
    let point = scene.add_point_list("point", vec![Point3::new(10.0, 0.0, 0.0)]);
    let result = scene.add_transform("result", Matrix4::identity());
    let op = scene.add_operation("follow", "Transform maker");
    scene.set_references(op, SOURCE, vec![point]).unwrap();
    scene.set_references(op, OUTPUT_TRANSFORM, vec![result]).unwrap();
    (scene, point, result, op)
}

#[test]
fn test_continuous_operation_follows_inputs() {
    let (mut scene, point, result, _) = follower();
    let mut logic = ModelerLogic::with_default_tools();

    logic.process_notifications(&mut scene);
    assert_relative_eq!(translation_of(&scene, result), Vector3::new(10.0, 0.0, 0.0));

    scene
        .set_control_points(point, &[Point3::new(3.0, 4.0, 0.0)])
        .unwrap();
    let report = logic.process_notifications(&mut scene);
    assert_eq!(report.runs, 1);
    assert_eq!(report.failures, 0);
    assert!(!report.truncated);
    assert_relative_eq!(translation_of(&scene, result), Vector3::new(3.0, 4.0, 0.0));
}

#[test]
fn test_parent_change_reaches_observers() {
    let (mut scene, point, result, op) = follower();
    let frame = scene.add_transform("frame", Matrix4::identity());
    scene.set_parent_transform(point, Some(frame)).unwrap();
    scene
        .set_parameter(op, "UseParentTransforms", "Use ParentTransforms")
        .unwrap();
    let mut logic = ModelerLogic::with_default_tools();
    logic.process_notifications(&mut scene);

    scene
        .set_matrix_to_parent(frame, Matrix4::new_translation(&Vector3::new(0.0, 0.0, 2.0)))
        .unwrap();
    logic.process_notifications(&mut scene);
    assert_relative_eq!(translation_of(&scene, result), Vector3::new(10.0, 0.0, 2.0));
}

#[test]
fn test_manual_operation_waits_for_apply() {
    let (mut scene, point, result, op) = follower();
    scene.set_continuous_update(op, false).unwrap();
    let mut logic = ModelerLogic::with_default_tools();

    scene
        .set_control_points(point, &[Point3::new(1.0, 2.0, 3.0)])
        .unwrap();
    let report = logic.process_notifications(&mut scene);
    assert_eq!(report.runs, 0);
    assert_eq!(translation_of(&scene, result), Vector3::zeros());

    assert!(logic.run_operation(&mut scene, op).unwrap());
    assert_relative_eq!(translation_of(&scene, result), Vector3::new(1.0, 2.0, 3.0));
}

#[test]
fn test_unrelated_changes_do_not_trigger() {
    let (mut scene, _, _, _) = follower();
    let mut logic = ModelerLogic::with_default_tools();
    logic.process_notifications(&mut scene);

    let other = scene.add_point_list("other", Vec::new());
    scene
        .set_control_points(other, &[Point3::origin()])
        .unwrap();
    let report = logic.process_notifications(&mut scene);
    assert_eq!(report.rounds, 1);
    assert_eq!(report.runs, 0);
}

#[test]
fn test_operations_chain_through_outputs() {
    let mut scene = Scene::new();
    let cube_model = scene.add_model("cube", Mesh::new());
    let merged = scene.add_model("merged", Mesh::new());
    let cube_op = scene.add_operation("make cube", "Create Cube");
    scene
        .set_references(cube_op, "Cube.OutputModel", vec![cube_model])
        .unwrap();
    let append_op = scene.add_operation("append", "Append");
    scene
        .set_references(append_op, "Append.InputModel", vec![cube_model])
        .unwrap();
    scene
        .set_references(append_op, "Append.OutputModel", vec![merged])
        .unwrap();
    scene.drain_notifications();

    let mut logic = ModelerLogic::with_default_tools();
    let report = logic.update_all(&mut scene);
    assert_eq!(report.failures, 0);
    assert_eq!(scene.get(merged).unwrap().data.mesh().unwrap().point_count(), 8);

    scene.set_parameter(cube_op, "XLength", 2.0).unwrap();
    let report = logic.process_notifications(&mut scene);
    assert_eq!(report.runs, 2);
    let (min, max) = scene.get(merged).unwrap().data.mesh().unwrap().bounds();
    assert_relative_eq!(min.x, -1.0);
    assert_relative_eq!(max.x, 1.0);
}

#[test]
fn test_feedback_loop_is_capped() {
    let mut scene = Scene::new();
    let node = scene.add_transform(
        "loop",
        Matrix4::new_translation(&Vector3::new(1.0, 0.0, 0.0)),
    );
    let op = scene.add_operation("feedback", "Transform maker");
    scene.set_references(op, SOURCE, vec![node]).unwrap();
    scene.set_references(op, OUTPUT_TRANSFORM, vec![node]).unwrap();

    let config = ModelerConfig {
        max_dispatch_rounds: 4,
        ..ModelerConfig::default()
    };
    let mut logic = ModelerLogic::new(ToolCatalog::with_default_tools(), config);
    let report = logic.process_notifications(&mut scene);

    assert!(report.truncated);
    assert_eq!(report.rounds, 4);
    assert_eq!(report.runs, 4);
    assert!(!scene.has_pending_notifications());
}

#[test]
fn test_removed_input_fails_the_operation() {
    let (mut scene, point, _, _) = follower();
    let mut logic = ModelerLogic::with_default_tools();
    logic.process_notifications(&mut scene);

    scene.remove_node(point).unwrap();
    let report = logic.process_notifications(&mut scene);
    assert_eq!(report.runs, 1);
    assert_eq!(report.failures, 1);
}
