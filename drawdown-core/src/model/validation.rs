//! Validation functions for model building.

use crate::component::RequirementDefinition;
use crate::errors::{ModelError, ModelResult};
use petgraph::visit::{IntoNeighbors, IntoNodeIdentifiers, Visitable};
use std::collections::HashMap;

use super::types::VariableDefinition;

/// Checks if the new definition is consistent with any earlier declaration of the same variable.
///
/// Every component that names a variable must agree on its unit.
pub(crate) fn verify_definition(
    definitions: &mut HashMap<String, VariableDefinition>,
    definition: &RequirementDefinition,
    component_name: &str,
) -> ModelResult<()> {
    match definitions.get(&definition.name) {
        Some(existing) => {
            if existing.unit != definition.unit {
                return Err(ModelError::UnitMismatch {
                    variable: definition.name.clone(),
                    producer: existing.component.clone(),
                    producer_unit: existing.unit.clone(),
                    consumer: component_name.to_string(),
                    consumer_unit: definition.unit.clone(),
                });
            }
        }
        None => {
            definitions.insert(
                definition.name.clone(),
                VariableDefinition::from_requirement_definition(definition, component_name),
            );
        }
    }
    Ok(())
}

/// Check that a component graph is valid.
///
/// We require a directed acyclic graph which doesn't contain any cycles
/// (other than a self-referential node).
/// This avoids the case where component `A` depends on a component `B`,
/// but component `B` also depends on component `A`.
pub(crate) fn is_valid_graph<G>(g: G) -> bool
where
    G: IntoNodeIdentifiers + IntoNeighbors + Visitable,
{
    use petgraph::visit::{depth_first_search, DfsEvent};

    depth_first_search(g, g.node_identifiers(), |event| match event {
        DfsEvent::BackEdge(a, b) => match a == b {
            true => Ok(()),
            false => Err(()),
        },
        _ => Ok(()),
    })
    .is_ok()
}
