//! Model builder for constructing models from components.

use crate::component::{RequirementDefinition, RequirementType, StateValue};
use crate::errors::{ModelError, ModelResult};
use crate::series::AnnualRegionalSeries;
use crate::series_collection::{SeriesCollection, VariableType};
use petgraph::algo::toposort;
use petgraph::graph::NodeIndex;
use petgraph::Graph;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::null_component::NullComponent;
use super::runtime::Model;
use super::types::{CGraph, VariableDefinition, C};
use super::validation::{is_valid_graph, verify_definition};

/// Build a new model from a set of components.
///
/// The builder generates a graph that defines the inter-component dependencies
/// and determines what variables are endogenous and exogenous to the model.
/// This graph is used by the model to define the order in which components are solved.
///
/// Every variable must have exactly one source: either a single producing component or an
/// exogenous value supplied to the builder.
#[derive(Default)]
pub struct ModelBuilder {
    components: Vec<C>,
    exogenous_variables: Vec<(String, StateValue)>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component with the builder.
    pub fn with_component(&mut self, component: C) -> &mut Self {
        self.components.push(component);
        self
    }

    /// Supply an exogenous series
    pub fn with_exogenous_series(&mut self, name: &str, series: AnnualRegionalSeries) -> &mut Self {
        self.exogenous_variables
            .push((name.to_string(), StateValue::Series(series)));
        self
    }

    /// Supply an exogenous flag
    pub fn with_exogenous_flag(&mut self, name: &str, flag: Option<bool>) -> &mut Self {
        self.exogenous_variables
            .push((name.to_string(), StateValue::Flag(flag)));
        self
    }

    /// Builds the component graph for the registered components and creates a concrete model.
    ///
    /// Returns an error if a variable has more than one source, if a required input has no
    /// source, if units disagree or if the components depend on each other in a cycle.
    pub fn build(&self) -> ModelResult<Model> {
        let mut graph: CGraph = Graph::new();
        let mut definitions: HashMap<String, VariableDefinition> = HashMap::new();
        let mut producers: HashMap<String, (NodeIndex, String)> = HashMap::new();
        let mut collection = SeriesCollection::new();

        for (name, value) in &self.exogenous_variables {
            collection.add(name, Some(value.clone()), VariableType::Exogenous)?;
        }

        let initial_node = graph.add_node(Arc::new(NullComponent {}));
        let nodes: Vec<NodeIndex> = self
            .components
            .iter()
            .map(|component| graph.add_node(component.clone()))
            .collect();

        // Producers first so that the order components are registered in doesn't matter
        for (component, node) in self.components.iter().zip(&nodes) {
            let component_name = component.name();
            for requirement in component.outputs() {
                verify_definition(&mut definitions, &requirement, &component_name)?;

                if collection.contains(&requirement.name) {
                    let first = producers
                        .get(&requirement.name)
                        .map(|(_, name)| name.clone())
                        .unwrap_or_else(|| "exogenous input".to_string());
                    return Err(ModelError::DuplicateProducer {
                        variable: requirement.name.clone(),
                        first,
                        second: component_name,
                    });
                }
                collection.add(&requirement.name, None, VariableType::Endogenous)?;
                producers.insert(requirement.name.clone(), (*node, component_name.clone()));
            }
        }

        for (component, node) in self.components.iter().zip(&nodes) {
            let component_name = component.name();
            let mut has_dependencies = false;

            for requirement in component.inputs() {
                verify_definition(&mut definitions, &requirement, &component_name)?;

                match producers.get(&requirement.name) {
                    Some((producer_node, _)) if producer_node != node => {
                        graph.add_edge(*producer_node, *node, requirement.clone());
                        has_dependencies = true;
                    }
                    Some(_) => {}
                    None if collection.contains(&requirement.name) => {}
                    None => {
                        return Err(ModelError::MissingInput {
                            variable: requirement.name.clone(),
                            stage: component_name,
                        })
                    }
                }
            }

            if !has_dependencies {
                // Components without dependencies hang off the initial node so that
                // the graph is connected
                graph.add_edge(
                    initial_node,
                    *node,
                    RequirementDefinition::new("", "", RequirementType::EmptyLink),
                );
            }
        }

        // Check that the component graph doesn't contain any loops
        if !is_valid_graph(&graph) {
            return Err(ModelError::CyclicDependency);
        }
        let order: Vec<NodeIndex> = toposort(&graph, None)
            .map_err(|_| ModelError::CyclicDependency)?
            .into_iter()
            .filter(|nx| *nx != initial_node)
            .collect();

        debug!(
            components = self.components.len(),
            variables = collection.len(),
            "built model graph"
        );

        Ok(Model::new(graph, initial_node, order, collection))
    }
}
