// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Dynamic Modeler Scene
//!
//! In-memory host scene the modeling tools read from and write to.
//!
//! - Nodes live in a [`slotmap::SlotMap`] and are addressed by [`NodeKey`].
//! - Every non-operation node may hang below a linear transform node; the
//!   chain of ancestors gives its parent-to-world transform.
//! - Operation nodes record which tool they run, which nodes fill each
//!   reference role, and the stored parameter values.
//! - Writes go through a [`ModifyGuard`]; dropping the guard queues exactly
//!   one [`ChangeNotification`] for the node.
//!
//! Scenes can be built in code or imported from a JSON-friendly
//! [`SceneDescription`].

pub mod description;
pub mod error;
pub mod events;
pub mod guard;
pub mod keys;
pub mod node;
pub mod parameter;
pub mod scene;

pub use description::{NodeDescription, NodePayload, OperationDescription, SceneDescription};
pub use error::{Error, Result};
pub use events::{ChangeEvent, ChangeEvents, ChangeNotification};
pub use guard::ModifyGuard;
pub use keys::NodeKey;
pub use node::{NodeData, NodeKind, OperationData, PlaneData, PlaneType, SceneNode};
pub use parameter::ParameterValue;
pub use scene::Scene;
