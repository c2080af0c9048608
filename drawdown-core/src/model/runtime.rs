//! Model struct and runtime execution.

use crate::component::InputState;
use crate::errors::{ModelError, ModelResult};
use crate::series::AnnualRegionalSeries;
use crate::series_collection::SeriesCollection;
use petgraph::dot::{Config, Dot};
use petgraph::graph::NodeIndex;
use std::ops::Index;
use tracing::{debug, warn};

use super::types::{CGraph, C};

/// A coupled set of components that are solved together.
///
/// Each component may require information from other components (endogenous) or
/// predefined data (exogenous). The component is agnostic about where that state is defined.
///
/// For example, the unit adoption component reads the total addressable market. Whether that
/// series is produced by a TAM component or supplied externally makes no difference to it,
/// but if a TAM component is present it is solved first.
#[derive(Debug)]
pub struct Model {
    /// A directed graph with components as nodes and the edges defining the state dependencies
    /// between nodes.
    components: CGraph,
    /// The base node of the graph from where to begin traversing.
    initial_node: NodeIndex,
    /// Components in dependency order
    order: Vec<NodeIndex>,
    /// The model state.
    ///
    /// Variable names within the model are unique and these variable names are used by
    /// components to request state.
    collection: SeriesCollection,
    finished: bool,
}

impl Model {
    pub(crate) fn new(
        components: CGraph,
        initial_node: NodeIndex,
        order: Vec<NodeIndex>,
        collection: SeriesCollection,
    ) -> Self {
        Self {
            components,
            initial_node,
            order,
            collection,
            finished: false,
        }
    }

    /// Solve a single component.
    ///
    /// The outputs of the component are pushed into the model's collection to be used by
    /// later components.
    fn solve_component(&mut self, component: C) -> ModelResult<()> {
        let component_name = component.name();
        debug!(component = %component_name, "solving component");

        let output_state = {
            let mut values = vec![];
            for name in component.input_names() {
                let item = self
                    .collection
                    .get_by_name(&name)
                    .ok_or_else(|| ModelError::MissingVariable(name.clone()))?;
                let value = item
                    .value
                    .as_ref()
                    .ok_or_else(|| ModelError::MissingVariable(name.clone()))?;
                values.push((item.name.as_str(), value));
            }
            component.solve(&InputState::build(values))?
        };

        let declared = component.output_names();
        for name in &declared {
            if !output_state.contains_key(name) {
                return Err(ModelError::MissingVariable(name.clone()));
            }
        }
        for (key, state_value) in output_state {
            if !declared.contains(&key) {
                warn!(component = %component_name, variable = %key, "ignoring undeclared output");
                continue;
            }
            self.collection.set_value(&key, state_value)?;
        }
        Ok(())
    }

    /// Solve every component once in dependency order.
    ///
    /// Stops at the first component that fails. Running a finished model is a no-op.
    pub fn run(&mut self) -> ModelResult<()> {
        if self.finished {
            return Ok(());
        }
        for nx in self.order.clone() {
            let component = self.components.index(nx).clone();
            self.solve_component(component)?;
        }
        self.finished = true;
        Ok(())
    }

    /// Returns true once every component has been solved.
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Components in the order they are solved
    pub fn component_names(&self) -> Vec<String> {
        self.order
            .iter()
            .map(|nx| self.components.index(*nx).name())
            .collect()
    }

    /// Create a diagram that represents the component graph.
    ///
    /// Useful for debugging.
    pub fn as_dot(&self) -> Dot<'_, &CGraph> {
        Dot::with_attr_getters(
            &self.components,
            &[Config::NodeNoLabel, Config::EdgeNoLabel],
            &|_, er| format!("label = {:?}", er.weight().name),
            &|_, (_, component)| format!("label = {:?}", component.name()),
        )
    }

    /// The node every dependency-free component is attached to
    pub fn initial_node(&self) -> NodeIndex {
        self.initial_node
    }

    /// Returns a reference to the series collection.
    pub fn collection(&self) -> &SeriesCollection {
        &self.collection
    }

    pub fn get_series(&self, name: &str) -> ModelResult<&AnnualRegionalSeries> {
        self.collection.get_series(name)
    }

    pub fn get_flag(&self, name: &str) -> ModelResult<Option<bool>> {
        self.collection.get_flag(name)
    }
}
