use crate::component::StateValue;
use crate::errors::{ModelError, ModelResult};
use crate::series::AnnualRegionalSeries;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, PartialOrd, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum VariableType {
    /// Values that are defined outside of the model
    Exogenous,
    /// Values that are determined within the model
    Endogenous,
}

#[derive(Debug, Clone)]
pub struct SeriesItem {
    pub name: String,
    pub value: Option<StateValue>,
    pub variable_type: VariableType,
}

/// A collection of named model variables
///
/// Allows access to every series in the model by name. Endogenous variables are registered
/// empty when the model is built and filled in as their producing component is solved.
#[derive(Debug, Clone, Default)]
pub struct SeriesCollection {
    items: Vec<SeriesItem>,
}

impl SeriesCollection {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Register a variable; names must be unique
    pub fn add(
        &mut self,
        name: &str,
        value: Option<StateValue>,
        variable_type: VariableType,
    ) -> ModelResult<()> {
        if self.contains(name) {
            return Err(ModelError::invalid(name, "variable already exists"));
        }
        self.items.push(SeriesItem {
            name: name.to_string(),
            value,
            variable_type,
        });
        Ok(())
    }

    pub fn add_series(&mut self, name: &str, series: AnnualRegionalSeries) -> ModelResult<()> {
        self.add(name, Some(StateValue::Series(series)), VariableType::Exogenous)
    }

    pub fn add_flag(&mut self, name: &str, flag: Option<bool>) -> ModelResult<()> {
        self.add(name, Some(StateValue::Flag(flag)), VariableType::Exogenous)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|x| x.name == name)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&SeriesItem> {
        self.items.iter().find(|x| x.name == name)
    }

    /// The current value of a variable
    pub fn get_value(&self, name: &str) -> ModelResult<&StateValue> {
        self.get_by_name(name)
            .and_then(|item| item.value.as_ref())
            .ok_or_else(|| ModelError::MissingVariable(name.to_string()))
    }

    pub fn get_series(&self, name: &str) -> ModelResult<&AnnualRegionalSeries> {
        let value = self.get_value(name)?;
        value.as_series().ok_or_else(|| ModelError::WrongStateType {
            variable: name.to_string(),
            expected: "series",
            found: value.type_name(),
        })
    }

    pub fn get_flag(&self, name: &str) -> ModelResult<Option<bool>> {
        let value = self.get_value(name)?;
        value.as_flag().ok_or_else(|| ModelError::WrongStateType {
            variable: name.to_string(),
            expected: "flag",
            found: value.type_name(),
        })
    }

    pub fn set_value(&mut self, name: &str, value: StateValue) -> ModelResult<()> {
        let item = self
            .items
            .iter_mut()
            .find(|x| x.name == name)
            .ok_or_else(|| ModelError::MissingVariable(name.to_string()))?;
        item.value = Some(value);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for SeriesCollection {
    type Item = SeriesItem;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_twice_fails() {
        let mut collection = SeriesCollection::new();
        collection
            .add_series("tam", AnnualRegionalSeries::filled(2020..=2021, 1.0))
            .unwrap();
        assert!(collection
            .add_series("tam", AnnualRegionalSeries::filled(2020..=2021, 2.0))
            .is_err());
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn empty_endogenous_values_are_missing() {
        let mut collection = SeriesCollection::new();
        collection
            .add("units", None, VariableType::Endogenous)
            .unwrap();
        assert!(matches!(
            collection.get_series("units"),
            Err(ModelError::MissingVariable(_))
        ));

        collection
            .set_value("units", StateValue::Flag(None))
            .unwrap();
        assert_eq!(collection.get_flag("units").unwrap(), None);
        assert!(collection.get_series("units").is_err());
    }
}
