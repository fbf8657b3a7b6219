// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Port and parameter descriptors.
//!
//! Every tool publishes its inputs, outputs and parameters as immutable
//! descriptors built once in its constructor. The only checks happen here,
//! at construction: a tool whose descriptors are inconsistent never gets
//! registered.

use dynmod_scene::{ChangeEvent, NodeKind, ParameterValue};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::error::ConfigurationError;

/// How many nodes a port takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    Single,
    Multiple,
}

/// One input or output slot of a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct PortDescriptor {
    name: String,
    description: String,
    role: String,
    accepted_kinds: SmallVec<[NodeKind; 4]>,
    cardinality: Cardinality,
    required: bool,
    events: SmallVec<[ChangeEvent; 4]>,
}

impl PortDescriptor {
    /// An optional single port accepting nothing yet. Chain the builder
    /// methods to complete it.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            role: role.into(),
            accepted_kinds: SmallVec::new(),
            cardinality: Cardinality::Single,
            required: false,
            events: SmallVec::new(),
        }
    }

    pub fn accepts(mut self, kinds: &[NodeKind]) -> Self {
        self.accepted_kinds.extend_from_slice(kinds);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.cardinality = Cardinality::Multiple;
        self
    }

    /// Event tags on referenced nodes that should re-run the tool
    pub fn triggers(mut self, events: &[ChangeEvent]) -> Self {
        self.events.extend_from_slice(events);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn accepted_kinds(&self) -> &[NodeKind] {
        &self.accepted_kinds
    }

    #[inline]
    pub fn accepts_kind(&self, kind: NodeKind) -> bool {
        self.accepted_kinds.contains(&kind)
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn events(&self) -> &[ChangeEvent] {
        &self.events
    }
}

/// Value kind of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    Double,
    Int,
    String,
    /// A string restricted to an ordered set of legal values
    Enumerated,
}

impl ParameterKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::Double => "double",
            ParameterKind::Int => "int",
            ParameterKind::String => "string",
            ParameterKind::Enumerated => "enumerated-string",
        }
    }
}

/// One scalar parameter of a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    name: String,
    description: String,
    key: String,
    kind: ParameterKind,
    default: ParameterValue,
    choices: Vec<String>,
}

impl ParameterDescriptor {
    /// Generic constructor; the typed ones below are usually more convenient.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        key: impl Into<String>,
        kind: ParameterKind,
        default: ParameterValue,
        choices: Vec<String>,
    ) -> Result<Self, ConfigurationError> {
        let key = key.into();
        let kind_matches = match kind {
            ParameterKind::Double => {
                matches!(default, ParameterValue::Double(_) | ParameterValue::Int(_))
            }
            ParameterKind::Int => matches!(default, ParameterValue::Int(_)),
            ParameterKind::String | ParameterKind::Enumerated => {
                matches!(default, ParameterValue::String(_))
            }
        };
        if !kind_matches {
            return Err(ConfigurationError::DefaultKindMismatch {
                key,
                kind: kind.as_str(),
            });
        }

        if kind == ParameterKind::Enumerated {
            if choices.is_empty() {
                return Err(ConfigurationError::EmptyChoices(key));
            }
            let text = default.text();
            if !choices.iter().any(|c| *c == text) {
                return Err(ConfigurationError::DefaultNotInChoices { key, default: text });
            }
        }

        Ok(Self {
            name: name.into(),
            description: description.into(),
            key,
            kind,
            default,
            choices,
        })
    }

    pub fn double(
        name: impl Into<String>,
        description: impl Into<String>,
        key: impl Into<String>,
        default: f64,
    ) -> Result<Self, ConfigurationError> {
        Self::new(name, description, key, ParameterKind::Double, default.into(), Vec::new())
    }

    pub fn int(
        name: impl Into<String>,
        description: impl Into<String>,
        key: impl Into<String>,
        default: i64,
    ) -> Result<Self, ConfigurationError> {
        Self::new(name, description, key, ParameterKind::Int, default.into(), Vec::new())
    }

    pub fn string(
        name: impl Into<String>,
        description: impl Into<String>,
        key: impl Into<String>,
        default: &str,
    ) -> Result<Self, ConfigurationError> {
        Self::new(name, description, key, ParameterKind::String, default.into(), Vec::new())
    }

    /// An enumerated string; `default` must be one of `choices`
    pub fn enumerated(
        name: impl Into<String>,
        description: impl Into<String>,
        key: impl Into<String>,
        choices: &[&str],
        default: &str,
    ) -> Result<Self, ConfigurationError> {
        Self::new(
            name,
            description,
            key,
            ParameterKind::Enumerated,
            default.into(),
            choices.iter().map(|c| c.to_string()).collect(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Storage key on the operation node
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    pub fn default_value(&self) -> &ParameterValue {
        &self.default
    }

    /// Legal values of an enumerated parameter, empty otherwise
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// True unless this is an enumerated parameter and `value` is not one of
    /// its legal values
    pub fn accepts_value(&self, value: &ParameterValue) -> bool {
        if self.kind != ParameterKind::Enumerated {
            return true;
        }
        let text = value.text();
        self.choices.iter().any(|c| *c == text)
    }
}

/// The complete, validated descriptor set of one tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptors {
    inputs: Vec<PortDescriptor>,
    outputs: Vec<PortDescriptor>,
    parameters: Vec<ParameterDescriptor>,
}

impl ToolDescriptors {
    /// Checks that roles are unique across inputs and outputs and that
    /// parameter keys are unique.
    pub fn new(
        inputs: Vec<PortDescriptor>,
        outputs: Vec<PortDescriptor>,
        parameters: Vec<ParameterDescriptor>,
    ) -> Result<Self, ConfigurationError> {
        let mut roles = FxHashSet::default();
        for port in inputs.iter().chain(&outputs) {
            if !roles.insert(port.role()) {
                return Err(ConfigurationError::DuplicateRole(port.role().to_string()));
            }
        }
        let mut keys = FxHashSet::default();
        for parameter in &parameters {
            if !keys.insert(parameter.key()) {
                return Err(ConfigurationError::DuplicateParameterKey(
                    parameter.key().to_string(),
                ));
            }
        }

        Ok(Self {
            inputs,
            outputs,
            parameters,
        })
    }

    pub fn inputs(&self) -> &[PortDescriptor] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[PortDescriptor] {
        &self.outputs
    }

    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    /// Input or output port declaring `role`
    pub fn port(&self, role: &str) -> Option<&PortDescriptor> {
        self.inputs
            .iter()
            .chain(&self.outputs)
            .find(|p| p.role() == role)
    }
}
