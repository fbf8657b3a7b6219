// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use dynmod_engine::{
    CreateCubeTool, ExtrudeTool, MirrorTool, ModelerConfig, ModelerLogic, Tool, ToolContext,
};
use dynmod_geometry::{cube, Mesh};
use dynmod_scene::{NodeKey, ParameterValue, PlaneData, Scene};
use nalgebra::Point3;

fn mirror_scene() -> (Scene, NodeKey, NodeKey, NodeKey, NodeKey) {
    let mut scene = Scene::new();
    let model = scene.add_model("model", cube(1.0, 1.0, 1.0));
    let plane = scene.add_plane(
        "plane",
        PlaneData {
            control_points: vec![
                Point3::origin(),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            ..PlaneData::default()
        },
    );
    let output = scene.add_model("mirrored", Mesh::new());
    let op = scene.add_operation("mirror", "Mirror");
    scene.set_references(op, "Mirror.InputModel", vec![model]).unwrap();
    scene.set_references(op, "Mirror.InputPlane", vec![plane]).unwrap();
    scene.set_references(op, "Mirror.OutputModel", vec![output]).unwrap();
    (scene, model, plane, output, op)
}

fn has_inputs(tool: &dyn Tool, scene: &mut Scene, op: NodeKey) -> bool {
    let config = ModelerConfig::default();
    let ctx = ToolContext::new(scene, op, &config);
    tool.has_required_inputs(&ctx)
}

#[test]
fn test_single_port_needs_exactly_one_node() {
    let tool = MirrorTool::new().unwrap();
    let (mut scene, model, _, _, op) = mirror_scene();
    assert!(has_inputs(&tool, &mut scene, op));

    scene.clear_references(op, "Mirror.InputModel").unwrap();
    assert!(!has_inputs(&tool, &mut scene, op));

    let other = scene.add_model("other", Mesh::new());
    scene
        .set_references(op, "Mirror.InputModel", vec![model, other])
        .unwrap();
    assert!(!has_inputs(&tool, &mut scene, op));
}

#[test]
fn test_single_port_checks_kind() {
    let tool = MirrorTool::new().unwrap();
    let (mut scene, _, plane, _, op) = mirror_scene();
    scene.set_references(op, "Mirror.InputModel", vec![plane]).unwrap();
    assert!(!has_inputs(&tool, &mut scene, op));
}

#[test]
fn test_missing_input_fails_without_writing() {
    let (mut scene, _, _, output, op) = mirror_scene();
    scene.clear_references(op, "Mirror.InputPlane").unwrap();
    scene.drain_notifications();

    let mut logic = ModelerLogic::with_default_tools();
    assert!(!logic.run_operation(&mut scene, op).unwrap());
    assert!(scene.get(output).unwrap().data.mesh().unwrap().is_empty());
    assert!(!scene.has_pending_notifications());
}

#[test]
fn test_optional_port_may_be_empty() {
    let tool = ExtrudeTool::new().unwrap();
    let mut scene = Scene::new();
    let model = scene.add_model("model", Mesh::new());
    let op = scene.add_operation("extrude", "Extrude");
    scene.set_references(op, "Extrude.InputModel", vec![model]).unwrap();
    assert!(has_inputs(&tool, &mut scene, op));
}

#[test]
fn test_unconnected_output_is_a_no_op() {
    let (mut scene, _, _, output, op) = mirror_scene();
    scene.clear_references(op, "Mirror.OutputModel").unwrap();
    scene.drain_notifications();

    let mut logic = ModelerLogic::with_default_tools();
    assert!(logic.run_operation(&mut scene, op).unwrap());
    assert!(scene.get(output).unwrap().data.mesh().unwrap().is_empty());
    assert!(!scene.has_pending_notifications());
}

#[test]
fn test_output_of_wrong_kind_is_not_connected() {
    let (mut scene, _, _, _, op) = mirror_scene();
    let points = scene.add_point_list("points", vec![Point3::origin()]);
    scene.set_references(op, "Mirror.OutputModel", vec![points]).unwrap();
    scene.drain_notifications();

    let mut logic = ModelerLogic::with_default_tools();
    assert!(logic.run_operation(&mut scene, op).unwrap());
    assert!(!scene.has_pending_notifications());
}

#[test]
fn test_parameter_defaults_and_stored_values() {
    let tool = CreateCubeTool::new().unwrap();
    let mut scene = Scene::new();
    let op = scene.add_operation("cube", "Create Cube");
    scene.set_parameter(op, "YLength", 3_i64).unwrap();

    let config = ModelerConfig::default();
    let ctx = ToolContext::new(&mut scene, op, &config);
    assert_eq!(tool.nth_parameter_value(0, &ctx), ParameterValue::Double(10.0));
    assert_eq!(tool.nth_parameter_value(1, &ctx), ParameterValue::Int(3));
    assert_eq!(tool.nth_parameter_value(1, &ctx).to_f64(), 3.0);
}

#[test]
fn test_illegal_choice_falls_back_to_default() {
    let tool = ExtrudeTool::new().unwrap();
    let mut scene = Scene::new();
    let op = scene.add_operation("extrude", "Extrude");
    scene.set_parameter(op, "Extrude.LengthMode", "Sideways").unwrap();

    let config = ModelerConfig::default();
    let ctx = ToolContext::new(&mut scene, op, &config);
    assert_eq!(tool.nth_parameter_value(0, &ctx), ParameterValue::from("Fixed"));
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "has no parameter")]
fn test_parameter_index_out_of_range() {
    let tool = CreateCubeTool::new().unwrap();
    let mut scene = Scene::new();
    let op = scene.add_operation("cube", "Create Cube");
    let config = ModelerConfig::default();
    let ctx = ToolContext::new(&mut scene, op, &config);
    tool.nth_parameter_value(3, &ctx);
}
