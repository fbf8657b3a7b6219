// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The tool contract and its change-detection gate.

use dynmod_scene::ParameterValue;

use crate::descriptor::{Cardinality, ParameterDescriptor, ParameterKind, ToolDescriptors};
use crate::error::Result;
use crate::resolver::{ReferenceResolver, ToolContext};

/// A modeling tool.
///
/// One instance exists per operation node. Instances may keep working
/// buffers between runs to avoid reallocation, but every run must derive
/// its output from the current inputs and parameters alone.
///
/// Implementors provide [`run_internal`](Tool::run_internal); callers use
/// [`run`](Tool::run), which wraps it in the gate:
///
/// 1. required inputs missing: `false`, nothing computed;
/// 2. no output connected: `true`, nothing computed or written;
/// 3. otherwise the full computation runs; its errors are logged and
///    reported as `false`.
pub trait Tool {
    /// Catalog name, unique across the catalog
    fn name(&self) -> &'static str;

    /// A fresh, independent instance of this tool
    fn create_instance(&self) -> Box<dyn Tool>;

    fn descriptors(&self) -> &ToolDescriptors;

    /// Tool-specific computation and output write-back
    fn run_internal(&mut self, ctx: &mut ToolContext<'_>) -> Result<()>;

    /// Check every required input port against its cardinality.
    ///
    /// A single port needs exactly one reference resolving to an accepted
    /// kind; a multiple port needs at least one reference. Optional ports
    /// are not checked.
    fn has_required_inputs(&self, ctx: &ToolContext<'_>) -> bool {
        for port in self.descriptors().inputs() {
            if !port.is_required() {
                continue;
            }
            let count = ctx.count_by_role(port.role());
            let satisfied = match port.cardinality() {
                Cardinality::Single => count == 1 && ctx.resolve_accepted(port, 0).is_some(),
                Cardinality::Multiple => count >= 1,
            };
            if !satisfied {
                tracing::debug!(
                    tool = self.name(),
                    role = port.role(),
                    count,
                    "Required input not satisfied"
                );
                return false;
            }
        }
        true
    }

    /// True if any output port references a node of an accepted kind
    fn has_connected_output(&self, ctx: &ToolContext<'_>) -> bool {
        self.descriptors()
            .outputs()
            .iter()
            .any(|port| !ctx.accepted_nodes(port).is_empty())
    }

    /// Gate, then compute. See the trait documentation.
    fn run(&mut self, ctx: &mut ToolContext<'_>) -> bool {
        if !self.has_required_inputs(ctx) {
            tracing::warn!(
                tool = self.name(),
                operation = ctx.operation_name(),
                "Missing required inputs, not running"
            );
            return false;
        }
        if !self.has_connected_output(ctx) {
            tracing::debug!(
                tool = self.name(),
                operation = ctx.operation_name(),
                "No output connected, nothing to do"
            );
            return true;
        }

        match self.run_internal(ctx) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    tool = self.name(),
                    operation = ctx.operation_name(),
                    error = %e,
                    "Run failed"
                );
                false
            }
        }
    }

    /// Value of the `n`-th parameter: the value stored on the operation node,
    /// or the descriptor default. An enumerated value outside its legal set
    /// falls back to the default.
    ///
    /// `n` out of range is a programming error: it panics in debug builds
    /// and yields the empty value otherwise.
    fn nth_parameter_value(&self, n: usize, ctx: &ToolContext<'_>) -> ParameterValue {
        let Some(parameter) = self.descriptors().parameters().get(n) else {
            debug_assert!(false, "tool {} has no parameter {n}", self.name());
            tracing::error!(tool = self.name(), index = n, "Parameter index out of range");
            return ParameterValue::default();
        };

        match ctx.parameter(parameter.key()) {
            None => parameter.default_value().clone(),
            Some(value) if !is_legal(parameter, value) => {
                tracing::warn!(
                    tool = self.name(),
                    key = parameter.key(),
                    value = %value,
                    "Value is not a legal choice, using default"
                );
                parameter.default_value().clone()
            }
            Some(value) => value.clone(),
        }
    }
}

/// Whether `value` may be stored under `parameter`; only enumerated
/// parameters restrict their values
fn is_legal(parameter: &ParameterDescriptor, value: &ParameterValue) -> bool {
    parameter.kind() != ParameterKind::Enumerated || parameter.accepts_value(value)
}
