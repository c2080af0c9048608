//! User-supplied adoption scenarios
//!
//! A solution can ship a list of hand-built adoption series. Exactly one included entry must
//! carry the requested name; its table is used both as the adoption data and as the trend.
//!
//! # Outputs
//!
//! * `adoption_data_per_region`
//! * `adoption_trend_per_region`

use drawdown_core::component::{Component, InputState, OutputState, RequirementDefinition};
use drawdown_core::data_sources::CustomAdoptionSource;
use drawdown_core::errors::{ModelError, ModelResult};
use drawdown_core::loader::{LoadCall, TableCache};
use drawdown_core::series::AnnualRegionalSeries;
use drawdown_core::standard_variables::{VAR_ADOPTION_DATA, VAR_ADOPTION_TREND};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomAdoptionParameters {
    pub name: String,
    pub sources: Vec<CustomAdoptionSource>,
}

#[derive(Debug, Clone)]
pub struct CustomAdoption {
    parameters: CustomAdoptionParameters,
    cache: Arc<TableCache>,
}

impl CustomAdoption {
    pub fn from_parameters(parameters: CustomAdoptionParameters, cache: Arc<TableCache>) -> Self {
        Self { parameters, cache }
    }

    /// The single included source matching the configured name
    pub fn selected_source(&self) -> ModelResult<&CustomAdoptionSource> {
        let name = &self.parameters.name;
        let matches: Vec<&CustomAdoptionSource> = self
            .parameters
            .sources
            .iter()
            .filter(|s| s.include && &s.name == name)
            .collect();
        match matches.as_slice() {
            [source] => Ok(source),
            _ => Err(ModelError::CustomAdoptionMatch {
                name: name.clone(),
                matches: matches.len(),
            }),
        }
    }

    pub fn calculate_adoption(&self) -> ModelResult<AnnualRegionalSeries> {
        let source = self.selected_source()?;
        debug!(name = %source.name, path = ?source.path, "loading custom adoption");
        let data = self
            .cache
            .read_csv(&LoadCall::new(source.path.as_path()))?;

        for (year, row) in data.years().iter().zip(data.values().rows()) {
            if let Some(value) = row.iter().find(|v| **v < 0.0) {
                return Err(ModelError::invalid(
                    "custom adoption",
                    format!("'{}' has negative value {} in {}", source.name, value, year),
                ));
            }
        }
        Ok(data)
    }
}

impl Component for CustomAdoption {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![VAR_ADOPTION_DATA.as_output(), VAR_ADOPTION_TREND.as_output()]
    }

    fn solve(&self, _input_state: &InputState) -> ModelResult<OutputState> {
        let data = self.calculate_adoption()?;
        Ok(OutputState::from([
            (VAR_ADOPTION_DATA.name.to_string(), data.clone().into()),
            (VAR_ADOPTION_TREND.name.to_string(), data.into()),
        ]))
    }
}
