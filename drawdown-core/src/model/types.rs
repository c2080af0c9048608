//! Type definitions for the model module.

use crate::component::{Component, RequirementDefinition};
use petgraph::Graph;
use std::sync::Arc;

/// Type alias for a component wrapped in an Arc for shared ownership.
pub type C = Arc<dyn Component>;

/// Type alias for the component dependency graph.
pub type CGraph = Graph<C, RequirementDefinition>;

/// Internal definition tracking for a variable during model building.
#[derive(Debug)]
pub(crate) struct VariableDefinition {
    pub name: String,
    pub unit: String,
    /// Component that first declared the variable
    pub component: String,
}

impl VariableDefinition {
    pub fn from_requirement_definition(definition: &RequirementDefinition, component: &str) -> Self {
        Self {
            name: definition.name.clone(),
            unit: definition.unit.clone(),
            component: component.to_string(),
        }
    }
}
