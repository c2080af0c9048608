//! Stage abstraction
//!
//! Each stage of a solution model implements [`Component`]. A component declares the named
//! variables it reads and writes through [`RequirementDefinition`]s; the model builder uses
//! these to wire components together and to decide which variables must be supplied
//! exogenously.

use crate::errors::{ModelError, ModelResult};
use crate::series::AnnualRegionalSeries;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;

#[derive(Debug, Eq, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum RequirementType {
    Input,
    Output,
    /// Used to connect components without a dependency to the start of the graph
    EmptyLink,
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct RequirementDefinition {
    pub name: String,
    pub unit: String,
    pub requirement_type: RequirementType,
}

impl RequirementDefinition {
    pub fn new(name: &str, unit: &str, requirement_type: RequirementType) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
            requirement_type,
        }
    }

    pub fn input(name: &str, unit: &str) -> Self {
        Self::new(name, unit, RequirementType::Input)
    }

    pub fn output(name: &str, unit: &str) -> Self {
        Self::new(name, unit, RequirementType::Output)
    }
}

/// A value exchanged between components
#[derive(Debug, Clone, PartialEq)]
pub enum StateValue {
    Series(AnnualRegionalSeries),
    /// A tri-state flag; `None` means the producer has no opinion
    Flag(Option<bool>),
}

impl StateValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            StateValue::Series(_) => "series",
            StateValue::Flag(_) => "flag",
        }
    }

    pub fn as_series(&self) -> Option<&AnnualRegionalSeries> {
        match self {
            StateValue::Series(series) => Some(series),
            StateValue::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<Option<bool>> {
        match self {
            StateValue::Flag(flag) => Some(*flag),
            StateValue::Series(_) => None,
        }
    }
}

impl From<AnnualRegionalSeries> for StateValue {
    fn from(series: AnnualRegionalSeries) -> Self {
        StateValue::Series(series)
    }
}

impl From<Option<bool>> for StateValue {
    fn from(flag: Option<bool>) -> Self {
        StateValue::Flag(flag)
    }
}

/// Input state for a component
///
/// Borrowed views of the variables a component declared as inputs.
#[derive(Debug, Clone, Default)]
pub struct InputState<'a> {
    state: Vec<(&'a str, &'a StateValue)>,
}

impl<'a> InputState<'a> {
    pub fn build(values: Vec<(&'a str, &'a StateValue)>) -> Self {
        Self { state: values }
    }

    pub fn empty() -> Self {
        Self { state: vec![] }
    }

    pub fn get(&self, name: &str) -> ModelResult<&'a StateValue> {
        self.state
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
            .ok_or_else(|| ModelError::MissingVariable(name.to_string()))
    }

    pub fn get_series(&self, name: &str) -> ModelResult<&'a AnnualRegionalSeries> {
        let value = self.get(name)?;
        value.as_series().ok_or_else(|| ModelError::WrongStateType {
            variable: name.to_string(),
            expected: "series",
            found: value.type_name(),
        })
    }

    pub fn get_flag(&self, name: &str) -> ModelResult<Option<bool>> {
        let value = self.get(name)?;
        value.as_flag().ok_or_else(|| ModelError::WrongStateType {
            variable: name.to_string(),
            expected: "flag",
            found: value.type_name(),
        })
    }

    pub fn has(&self, name: &str) -> bool {
        self.state.iter().any(|(n, _)| *n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'a str, &'a StateValue)> {
        self.state.iter()
    }
}

/// Values produced by a component, keyed by variable name
pub type OutputState = HashMap<String, StateValue>;

/// Component of a solution model
///
/// Components are solved exactly once per model run, after every component producing one of
/// their inputs. A component must be a pure function of its parameters and its input state.
pub trait Component: Debug + Send + Sync {
    fn definitions(&self) -> Vec<RequirementDefinition>;

    /// Name used in error messages and graph output
    ///
    /// Defaults to the type name taken from the `Debug` representation.
    fn name(&self) -> String {
        let debug_str = format!("{:?}", self);
        debug_str
            .split(['{', ' ', '('])
            .next()
            .unwrap_or("UnknownComponent")
            .to_string()
    }

    fn inputs(&self) -> Vec<RequirementDefinition> {
        self.definitions()
            .iter()
            .filter(|d| d.requirement_type == RequirementType::Input)
            .cloned()
            .collect()
    }

    fn input_names(&self) -> Vec<String> {
        self.inputs().into_iter().map(|d| d.name).collect()
    }

    fn outputs(&self) -> Vec<RequirementDefinition> {
        self.definitions()
            .iter()
            .filter(|d| d.requirement_type == RequirementType::Output)
            .cloned()
            .collect()
    }

    fn output_names(&self) -> Vec<String> {
        self.outputs().into_iter().map(|d| d.name).collect()
    }

    fn solve(&self, input_state: &InputState) -> ModelResult<OutputState>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Doubler {
        factor: f64,
    }

    impl Component for Doubler {
        fn definitions(&self) -> Vec<RequirementDefinition> {
            vec![
                RequirementDefinition::input("a", "unit"),
                RequirementDefinition::output("b", "unit"),
            ]
        }

        fn solve(&self, input_state: &InputState) -> ModelResult<OutputState> {
            let a = input_state.get_series("a")?;
            let mut output = OutputState::new();
            output.insert("b".to_string(), a.scale(self.factor).into());
            Ok(output)
        }
    }

    #[test]
    fn splits_definitions() {
        let component = Doubler { factor: 2.0 };
        assert_eq!(component.input_names(), vec!["a".to_string()]);
        assert_eq!(component.output_names(), vec!["b".to_string()]);
        assert_eq!(component.name(), "Doubler");
    }

    #[test]
    fn input_state_lookup() {
        let series = StateValue::Series(AnnualRegionalSeries::filled(2020..=2021, 1.5));
        let flag = StateValue::Flag(Some(true));
        let state = InputState::build(vec![("a", &series), ("single", &flag)]);

        assert!(state.has("a"));
        assert_eq!(state.get_flag("single").unwrap(), Some(true));
        assert!(matches!(
            state.get_series("single"),
            Err(ModelError::WrongStateType { .. })
        ));
        assert!(matches!(
            state.get("missing"),
            Err(ModelError::MissingVariable(_))
        ));

        let output = Doubler { factor: 2.0 }.solve(&state).unwrap();
        let b = output["b"].as_series().unwrap();
        assert_eq!(b.get(2021, crate::region::Region::World).unwrap(), 3.0);
    }
}
