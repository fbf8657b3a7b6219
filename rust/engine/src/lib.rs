// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dynamic Modeler Engine
//!
//! Modeling tools that derive scene nodes from other scene nodes and keep
//! them up to date:
//!
//! - **Descriptors**: the ports and parameters each tool declares
//! - **Tool contract**: required-input and connected-output checks around
//!   every run
//! - **Composition**: ordered markups and transforms folded into one matrix
//! - **Merging**: meshes gathered in world coordinates, deduplicated and
//!   re-expressed in the output frame
//! - **Logic**: one tool instance per operation node, re-run on change
//!
//! ```ignore
//! let mut logic = ModelerLogic::with_default_tools();
//! let (mut scene, names) = Scene::from_description(&description)?;
//! logic.update_all(&mut scene);
//! ```

pub mod catalog;
pub mod compose;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod logic;
pub mod merge;
pub mod resolver;
pub mod sources;
pub mod tool;
pub mod tools;

pub use catalog::ToolCatalog;
pub use compose::{compose, ComposedTransform, FrameMode};
pub use config::ModelerConfig;
pub use descriptor::{
    Cardinality, ParameterDescriptor, ParameterKind, PortDescriptor, ToolDescriptors,
};
pub use error::{ConfigurationError, Error, Result};
pub use logic::{DispatchReport, ModelerLogic};
pub use merge::{world_to_local, MeshMergePipeline};
pub use resolver::{ReferenceResolver, ToolContext};
pub use sources::{resolve_sources, GeometricSource, SourceGeometry};
pub use tool::Tool;
pub use tools::{
    AppendTool, CreateArrowTool, CreateCubeTool, ExtrudeTool, MirrorTool, TransformMakerTool,
};
