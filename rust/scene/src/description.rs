// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serializable scene description.
//!
//! Nodes and operations refer to each other by name. Points are `[x, y, z]`
//! arrays and matrices are row-major `4x4` arrays:
//!
//! ```json
//! {
//!   "nodes": [
//!     { "name": "frame", "kind": "linear_transform",
//!       "matrix": [[1,0,0,10],[0,1,0,0],[0,0,1,0],[0,0,0,1]] },
//!     { "name": "tip", "kind": "point_list", "points": [[1,0,0]], "parent": "frame" },
//!     { "name": "result", "kind": "linear_transform" }
//!   ],
//!   "operations": [
//!     { "name": "maker", "tool": "Transform maker",
//!       "references": { "TransformMaker.TransformSource": ["tip"],
//!                       "TransformMaker.OutputLinearTransform": ["result"] } }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use dynmod_geometry::Mesh;
use nalgebra::{Matrix4, Point3, Vector3};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::keys::NodeKey;
use crate::node::{NodeData, OperationData, PlaneData, PlaneType};
use crate::parameter::ParameterValue;
use crate::scene::Scene;

/// A whole scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub nodes: Vec<NodeDescription>,
    #[serde(default)]
    pub operations: Vec<OperationDescription>,
}

/// One data node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(flatten)]
    pub payload: NodePayload,
}

/// Kind-specific node content, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodePayload {
    PointList {
        #[serde(default)]
        points: Vec<[f64; 3]>,
    },
    Line {
        #[serde(default)]
        points: Vec<[f64; 3]>,
    },
    Angle {
        #[serde(default)]
        points: Vec<[f64; 3]>,
    },
    Plane {
        #[serde(default)]
        points: Vec<[f64; 3]>,
        #[serde(default)]
        plane_type: PlaneType,
        #[serde(default = "default_normal")]
        normal: [f64; 3],
    },
    LinearTransform {
        #[serde(default = "identity_rows")]
        matrix: [[f64; 4]; 4],
    },
    Model {
        #[serde(default)]
        points: Vec<[f64; 3]>,
        #[serde(default)]
        polygons: Vec<Vec<u32>>,
    },
}

/// One operation node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDescription {
    pub name: String,
    pub tool: String,
    /// Role -> node names
    #[serde(default)]
    pub references: BTreeMap<String, Vec<String>>,
    /// Storage key -> value
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterValue>,
    #[serde(default = "default_true")]
    pub continuous_update: bool,
}

fn default_normal() -> [f64; 3] {
    [0.0, 0.0, 1.0]
}

fn identity_rows() -> [[f64; 4]; 4] {
    to_rows(&Matrix4::identity())
}

fn default_true() -> bool {
    true
}

fn to_points(points: &[[f64; 3]]) -> Vec<Point3<f64>> {
    points.iter().map(|p| Point3::new(p[0], p[1], p[2])).collect()
}

fn from_points(points: &[Point3<f64>]) -> Vec<[f64; 3]> {
    points.iter().map(|p| [p.x, p.y, p.z]).collect()
}

fn to_rows(matrix: &Matrix4<f64>) -> [[f64; 4]; 4] {
    let mut rows = [[0.0; 4]; 4];
    for (r, row) in rows.iter_mut().enumerate() {
        for (c, value) in row.iter_mut().enumerate() {
            *value = matrix[(r, c)];
        }
    }
    rows
}

fn from_rows(rows: &[[f64; 4]; 4]) -> Matrix4<f64> {
    Matrix4::from_fn(|r, c| rows[r][c])
}

impl NodePayload {
    fn into_data(self) -> Result<NodeData> {
        Ok(match self {
            NodePayload::PointList { points } => NodeData::PointList(to_points(&points)),
            NodePayload::Line { points } => NodeData::Line(to_points(&points)),
            NodePayload::Angle { points } => NodeData::Angle(to_points(&points)),
            NodePayload::Plane {
                points,
                plane_type,
                normal,
            } => NodeData::Plane(PlaneData {
                control_points: to_points(&points),
                plane_type,
                normal: Vector3::new(normal[0], normal[1], normal[2]),
            }),
            NodePayload::LinearTransform { matrix } => NodeData::LinearTransform(from_rows(&matrix)),
            NodePayload::Model { points, polygons } => {
                let mut mesh = Mesh::with_capacity(points.len(), polygons.len());
                for p in &to_points(&points) {
                    mesh.add_point(*p);
                }
                for polygon in &polygons {
                    mesh.add_polygon(polygon);
                }
                mesh.validate()?;
                NodeData::Model(mesh)
            }
        })
    }

    /// Payload describing `data`, `None` for operation nodes
    fn from_data(data: &NodeData) -> Option<Self> {
        Some(match data {
            NodeData::PointList(points) => NodePayload::PointList {
                points: from_points(points),
            },
            NodeData::Line(points) => NodePayload::Line {
                points: from_points(points),
            },
            NodeData::Angle(points) => NodePayload::Angle {
                points: from_points(points),
            },
            NodeData::Plane(plane) => NodePayload::Plane {
                points: from_points(&plane.control_points),
                plane_type: plane.plane_type,
                normal: [plane.normal.x, plane.normal.y, plane.normal.z],
            },
            NodeData::LinearTransform(matrix) => NodePayload::LinearTransform {
                matrix: to_rows(matrix),
            },
            NodeData::Model(mesh) => NodePayload::Model {
                points: mesh.points().map(|p| [p.x, p.y, p.z]).collect(),
                polygons: mesh.polygons.iter().map(|p| p.to_vec()).collect(),
            },
            NodeData::Operation(_) => return None,
        })
    }
}

impl Scene {
    /// Build a scene from a description.
    ///
    /// Returns the scene and the key of every named node and operation. The
    /// new scene has no pending notifications.
    pub fn from_description(
        description: &SceneDescription,
    ) -> Result<(Scene, FxHashMap<String, NodeKey>)> {
        let mut scene = Scene::new();
        let mut keys: FxHashMap<String, NodeKey> = FxHashMap::default();

        for node in &description.nodes {
            if keys.contains_key(&node.name) {
                return Err(Error::DuplicateNodeName(node.name.clone()));
            }
            let key = scene.add_node(node.name.clone(), node.payload.clone().into_data()?);
            keys.insert(node.name.clone(), key);
        }

        let lookup = |keys: &FxHashMap<String, NodeKey>, name: &str| {
            keys.get(name)
                .copied()
                .ok_or_else(|| Error::UnknownNodeName(name.to_string()))
        };

        for node in &description.nodes {
            if let Some(parent) = &node.parent {
                let parent = lookup(&keys, parent)?;
                scene.set_parent_transform(keys[&node.name], Some(parent))?;
            }
        }

        for operation in &description.operations {
            if keys.contains_key(&operation.name) {
                return Err(Error::DuplicateNodeName(operation.name.clone()));
            }
            let mut data = OperationData::new(operation.tool.clone());
            data.continuous_update = operation.continuous_update;
            for (role, names) in &operation.references {
                let nodes = names
                    .iter()
                    .map(|name| lookup(&keys, name))
                    .collect::<Result<Vec<_>>>()?;
                data.references.insert(role.clone(), nodes);
            }
            for (storage_key, value) in &operation.parameters {
                data.parameters.insert(storage_key.clone(), value.clone());
            }
            let key = scene.add_node(operation.name.clone(), NodeData::Operation(data));
            keys.insert(operation.name.clone(), key);
        }

        scene.drain_notifications();
        Ok((scene, keys))
    }

    /// Description of one data node. Operation nodes have none.
    pub fn describe_node(&self, key: NodeKey) -> Result<Option<NodeDescription>> {
        let node = self.node(key)?;
        let parent = node
            .parent
            .and_then(|p| self.name(p))
            .map(str::to_string);
        Ok(NodePayload::from_data(&node.data).map(|payload| NodeDescription {
            name: node.name.clone(),
            parent,
            payload,
        }))
    }

    /// Description of the whole scene
    pub fn describe(&self) -> SceneDescription {
        let mut description = SceneDescription::default();
        for (key, node) in self.iter() {
            match &node.data {
                NodeData::Operation(operation) => {
                    let names = |keys: &[NodeKey]| -> Vec<String> {
                        keys.iter()
                            .filter_map(|&k| self.name(k))
                            .map(str::to_string)
                            .collect()
                    };
                    description.operations.push(OperationDescription {
                        name: node.name.clone(),
                        tool: operation.tool_name.clone(),
                        references: operation
                            .references
                            .iter()
                            .map(|(role, keys)| (role.clone(), names(keys)))
                            .collect(),
                        parameters: operation
                            .parameters
                            .iter()
                            .map(|(k, v)| (k.clone(), v.clone()))
                            .collect(),
                        continuous_update: operation.continuous_update,
                    });
                }
                _ => {
                    if let Ok(Some(node)) = self.describe_node(key) {
                        description.nodes.push(node);
                    }
                }
            }
        }
        description
    }
}
