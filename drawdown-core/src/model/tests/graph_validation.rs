//! Build-time validation of the component graph.

use super::basic::{exogenous, Scale};
use crate::component::{Component, InputState, OutputState, RequirementDefinition};
use crate::errors::{ModelError, ModelResult};
use crate::model::ModelBuilder;
use std::sync::Arc;

#[test]
fn missing_input_is_reported() {
    let err = ModelBuilder::new()
        .with_component(Arc::new(Scale {
            input: "a",
            output: "b",
            factor: 2.0,
        }))
        .build()
        .unwrap_err();

    match err {
        ModelError::MissingInput { variable, stage } => {
            assert_eq!(variable, "a");
            assert_eq!(stage, "Scale");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn two_producers_are_rejected() {
    let err = ModelBuilder::new()
        .with_component(Arc::new(Scale {
            input: "a",
            output: "b",
            factor: 2.0,
        }))
        .with_component(Arc::new(Scale {
            input: "a",
            output: "b",
            factor: 3.0,
        }))
        .with_exogenous_series("a", exogenous())
        .build()
        .unwrap_err();
    assert!(matches!(err, ModelError::DuplicateProducer { .. }));
}

#[test]
fn producer_and_exogenous_value_are_rejected() {
    let err = ModelBuilder::new()
        .with_component(Arc::new(Scale {
            input: "a",
            output: "b",
            factor: 2.0,
        }))
        .with_exogenous_series("a", exogenous())
        .with_exogenous_series("b", exogenous())
        .build()
        .unwrap_err();

    match err {
        ModelError::DuplicateProducer { first, .. } => assert_eq!(first, "exogenous input"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn cycles_are_rejected() {
    let err = ModelBuilder::new()
        .with_component(Arc::new(Scale {
            input: "a",
            output: "b",
            factor: 2.0,
        }))
        .with_component(Arc::new(Scale {
            input: "b",
            output: "a",
            factor: 0.5,
        }))
        .build()
        .unwrap_err();
    assert!(matches!(err, ModelError::CyclicDependency));
}

#[derive(Debug)]
struct WrongUnit;

impl Component for WrongUnit {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            RequirementDefinition::input("b", "other unit"),
            RequirementDefinition::output("z", "unit"),
        ]
    }

    fn solve(&self, _input_state: &InputState) -> ModelResult<OutputState> {
        Ok(OutputState::new())
    }
}

#[test]
fn unit_mismatch_is_rejected() {
    let err = ModelBuilder::new()
        .with_component(Arc::new(Scale {
            input: "a",
            output: "b",
            factor: 2.0,
        }))
        .with_component(Arc::new(WrongUnit))
        .with_exogenous_series("a", exogenous())
        .build()
        .unwrap_err();
    assert!(matches!(err, ModelError::UnitMismatch { .. }));
}

#[test]
fn missing_declared_output_fails_the_run() {
    let mut model = ModelBuilder::new()
        .with_component(Arc::new(Scale {
            input: "a",
            output: "b",
            factor: 2.0,
        }))
        .with_component(Arc::new(ForgetfulComponent))
        .with_exogenous_series("a", exogenous())
        .build()
        .unwrap();

    assert!(matches!(model.run(), Err(ModelError::MissingVariable(name)) if name == "z"));
    assert!(!model.finished());
}

#[derive(Debug)]
struct ForgetfulComponent;

impl Component for ForgetfulComponent {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            RequirementDefinition::input("b", "unit"),
            RequirementDefinition::output("z", "unit"),
        ]
    }

    fn solve(&self, _input_state: &InputState) -> ModelResult<OutputState> {
        Ok(OutputState::new())
    }
}
