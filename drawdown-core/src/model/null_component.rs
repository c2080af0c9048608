//! Null component for graph initialization.

use crate::component::{Component, InputState, OutputState, RequirementDefinition};
use crate::errors::ModelResult;

/// A null component that does nothing.
///
/// Used as an initial component to ensure that the model graph is connected.
#[derive(Debug)]
pub(crate) struct NullComponent {}

impl Component for NullComponent {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![]
    }

    fn solve(&self, _input_state: &InputState) -> ModelResult<OutputState> {
        Ok(OutputState::new())
    }
}
