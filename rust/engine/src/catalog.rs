// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tool catalog - name-based registry of tool prototypes.

use crate::error::{ConfigurationError, Error, Result};
use crate::tool::Tool;
use crate::tools::{
    AppendTool, CreateArrowTool, CreateCubeTool, ExtrudeTool, MirrorTool, TransformMakerTool,
};

/// Registry of tool prototypes. Instances are created by exact name.
#[derive(Default)]
pub struct ToolCatalog {
    prototypes: Vec<Box<dyn Tool>>,
}

impl ToolCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every built-in tool. Tools whose descriptors fail to
    /// build are logged and left out.
    pub fn with_default_tools() -> Self {
        let mut catalog = Self::new();
        catalog.register_built(TransformMakerTool::new());
        catalog.register_built(AppendTool::new());
        catalog.register_built(CreateCubeTool::new());
        catalog.register_built(CreateArrowTool::new());
        catalog.register_built(MirrorTool::new());
        catalog.register_built(ExtrudeTool::new());
        catalog
    }

    /// Register a prototype. Names must be unique.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<(), ConfigurationError> {
        if self.contains(tool.name()) {
            return Err(ConfigurationError::DuplicateToolName(tool.name().to_string()));
        }
        tracing::debug!(tool = tool.name(), "Registered tool");
        self.prototypes.push(tool);
        Ok(())
    }

    /// Register the outcome of a tool constructor, logging any configuration
    /// error. Returns whether the tool was registered.
    pub fn register_built<T: Tool + 'static>(
        &mut self,
        built: Result<T, ConfigurationError>,
    ) -> bool {
        match built.and_then(|tool| self.register(Box::new(tool))) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Tool not registered");
                false
            }
        }
    }

    /// Names in registration order
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.prototypes.iter().map(|t| t.name()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.prototypes.iter().any(|t| t.name() == name)
    }

    /// New instance of the tool registered under exactly `name`
    pub fn create_instance(&self, name: &str) -> Result<Box<dyn Tool>> {
        self.prototypes
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.create_instance())
            .ok_or_else(|| Error::UnknownTool(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tools() {
        let catalog = ToolCatalog::with_default_tools();
        assert_eq!(
            catalog.tool_names(),
            vec![
                "Transform maker",
                "Append",
                "Create Cube",
                "Create Arrow",
                "Mirror",
                "Extrude"
            ]
        );
    }

    #[test]
    fn test_lookup_is_exact() {
        let catalog = ToolCatalog::with_default_tools();
        let tool = catalog.create_instance("Append").unwrap();
        assert_eq!(tool.name(), "Append");

        assert!(matches!(
            catalog.create_instance("append"),
            Err(Error::UnknownTool(name)) if name == "append"
        ));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut catalog = ToolCatalog::with_default_tools();
        let result = catalog.register(Box::new(AppendTool::new().unwrap()));
        assert_eq!(
            result,
            Err(ConfigurationError::DuplicateToolName("Append".into()))
        );
        assert!(!catalog.register_built(AppendTool::new()));
        assert_eq!(catalog.len(), 6);
    }

    #[test]
    fn test_failed_construction_is_skipped() {
        let mut catalog = ToolCatalog::new();
        let failed: std::result::Result<AppendTool, _> =
            Err(ConfigurationError::EmptyChoices("Mode".into()));
        assert!(!catalog.register_built(failed));
        assert!(catalog.is_empty());
    }
}
