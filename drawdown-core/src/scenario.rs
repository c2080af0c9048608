//! Scenario parameters
//!
//! A scenario is an immutable bundle of the advanced controls of a solution: report range,
//! adoption basis, costs, lifetimes and emissions coefficients. Scenarios are read from TOML
//! and every field must be known; missing or unexpected fields are configuration errors.
//!
//! ```toml
//! [scenarios."PDS1-Example"]
//! report_start_year = 2020
//! report_end_year = 2050
//! soln_pds_adoption_basis = "Existing Adoption Prognostications"
//! # ...
//! ```

use crate::errors::{ModelError, ModelResult};
use crate::region::Region;
use crate::series::{FloatValue, RegionalValues, Year};
use crate::trend::{Growth, TrendKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// How the solution path adoption is derived
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PdsAdoptionBasis {
    #[serde(rename = "Fully Customized PDS")]
    FullyCustomized,
    #[serde(rename = "Existing Adoption Prognostications")]
    ExistingPrognostications,
}

impl PdsAdoptionBasis {
    pub fn label(self) -> &'static str {
        match self {
            PdsAdoptionBasis::FullyCustomized => "Fully Customized PDS",
            PdsAdoptionBasis::ExistingPrognostications => "Existing Adoption Prognostications",
        }
    }
}

impl fmt::Display for PdsAdoptionBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How the reference path adoption is derived
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefAdoptionBasis {
    Default,
    Custom,
}

/// Global warming potentials used to express CH4 and N2O as CO2-eq
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Co2eqConversionSource {
    #[serde(rename = "AR5 with feedback")]
    Ar5WithFeedback,
    #[serde(rename = "AR5")]
    Ar5,
    #[serde(rename = "AR4")]
    Ar4,
    #[serde(rename = "SAR")]
    Sar,
}

impl Co2eqConversionSource {
    /// 100-year GWP of CH4
    pub fn ch4_gwp(self) -> FloatValue {
        match self {
            Co2eqConversionSource::Ar5WithFeedback => 34.0,
            Co2eqConversionSource::Ar5 => 28.0,
            Co2eqConversionSource::Ar4 => 25.0,
            Co2eqConversionSource::Sar => 21.0,
        }
    }

    /// 100-year GWP of N2O
    pub fn n2o_gwp(self) -> FloatValue {
        match self {
            Co2eqConversionSource::Ar5WithFeedback => 298.0,
            Co2eqConversionSource::Ar5 => 265.0,
            Co2eqConversionSource::Ar4 => 298.0,
            Co2eqConversionSource::Sar => 310.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmissionsGridSource {
    #[serde(rename = "Meta-Analysis")]
    MetaAnalysis,
    #[serde(rename = "IPCC Only")]
    IpccOnly,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmissionsGridRange {
    Mean,
    Low,
    High,
}

/// The advanced controls of one scenario
///
/// Costs are per implementation unit, usage and emissions per functional unit unless named
/// otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdvancedControls {
    #[serde(default)]
    pub description: String,
    pub report_start_year: Year,
    pub report_end_year: Year,

    // Adoption
    pub soln_ref_adoption_basis: RefAdoptionBasis,
    pub soln_ref_adoption_regional_data: bool,
    pub soln_pds_adoption_regional_data: bool,
    pub soln_pds_adoption_basis: PdsAdoptionBasis,
    #[serde(default)]
    pub soln_pds_adoption_custom_name: Option<String>,
    #[serde(default)]
    pub soln_pds_adoption_prognostication_source: Option<String>,
    #[serde(default)]
    pub soln_pds_adoption_prognostication_trend: Option<TrendKind>,
    #[serde(default)]
    pub soln_pds_adoption_prognostication_growth: Option<Growth>,
    /// TAM source for years up to 2014
    pub source_until_2014: String,
    pub ref_source_post_2014: String,
    pub pds_source_post_2014: String,
    /// Target share of the 2050 PDS TAM; regions without an entry target zero
    #[serde(default)]
    pub pds_adoption_final_percentage: Vec<(Region, FloatValue)>,

    // Financial
    pub pds_2014_cost: FloatValue,
    pub ref_2014_cost: FloatValue,
    pub conv_2014_cost: FloatValue,
    pub soln_first_cost_efficiency_rate: FloatValue,
    pub conv_first_cost_efficiency_rate: FloatValue,
    pub soln_first_cost_below_conv: bool,
    pub npv_discount_rate: FloatValue,
    pub soln_lifetime_capacity: FloatValue,
    pub soln_avg_annual_use: FloatValue,
    pub conv_lifetime_capacity: FloatValue,
    pub conv_avg_annual_use: FloatValue,
    pub soln_var_oper_cost_per_funit: FloatValue,
    pub soln_fuel_cost_per_funit: FloatValue,
    pub soln_fixed_oper_cost_per_iunit: FloatValue,
    pub conv_var_oper_cost_per_funit: FloatValue,
    pub conv_fuel_cost_per_funit: FloatValue,
    pub conv_fixed_oper_cost_per_iunit: FloatValue,

    // Emissions
    pub ch4_is_co2eq: bool,
    pub n2o_is_co2eq: bool,
    pub co2eq_conversion_source: Co2eqConversionSource,
    pub soln_indirect_co2_per_iunit: FloatValue,
    pub conv_indirect_co2_per_unit: FloatValue,
    pub conv_indirect_co2_is_iunits: bool,
    pub ch4_co2_per_funit: FloatValue,
    pub n2o_co2_per_funit: FloatValue,
    pub soln_energy_efficiency_factor: FloatValue,
    pub soln_annual_energy_used: FloatValue,
    pub conv_annual_energy_used: FloatValue,
    pub conv_fuel_consumed_per_funit: FloatValue,
    pub soln_fuel_efficiency_factor: FloatValue,
    pub conv_fuel_emissions_factor: FloatValue,
    pub soln_fuel_emissions_factor: FloatValue,
    pub emissions_grid_source: EmissionsGridSource,
    pub emissions_grid_range: EmissionsGridRange,
    pub emissions_use_co2eq: bool,
    pub conv_emissions_per_funit: FloatValue,
    pub soln_emissions_per_funit: FloatValue,
}

impl AdvancedControls {
    /// Check ranges and the fields each adoption basis depends on
    pub fn validate(&self) -> ModelResult<()> {
        if self.report_start_year > self.report_end_year {
            return Err(ModelError::invalid(
                "report_start_year",
                format!(
                    "{} is after report_end_year {}",
                    self.report_start_year, self.report_end_year
                ),
            ));
        }
        for (field, rate) in [
            (
                "soln_first_cost_efficiency_rate",
                self.soln_first_cost_efficiency_rate,
            ),
            (
                "conv_first_cost_efficiency_rate",
                self.conv_first_cost_efficiency_rate,
            ),
        ] {
            if !(0.0..1.0).contains(&rate) {
                return Err(ModelError::invalid(field, format!("{} is not in [0, 1)", rate)));
            }
        }
        for (field, value) in [
            ("soln_lifetime_capacity", self.soln_lifetime_capacity),
            ("soln_avg_annual_use", self.soln_avg_annual_use),
            ("conv_lifetime_capacity", self.conv_lifetime_capacity),
            ("conv_avg_annual_use", self.conv_avg_annual_use),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ModelError::invalid(field, format!("{} must be positive", value)));
            }
        }
        if self.npv_discount_rate.is_nan() || self.npv_discount_rate <= -1.0 {
            return Err(ModelError::invalid(
                "npv_discount_rate",
                format!("{} must be greater than -1", self.npv_discount_rate),
            ));
        }
        for (region, percentage) in &self.pds_adoption_final_percentage {
            if !(0.0..=1.0).contains(percentage) {
                return Err(ModelError::invalid(
                    "pds_adoption_final_percentage",
                    format!("{} for {} is not in [0, 1]", percentage, region),
                ));
            }
        }

        match self.soln_pds_adoption_basis {
            PdsAdoptionBasis::FullyCustomized => {
                if self.soln_pds_adoption_custom_name.is_none() {
                    return Err(ModelError::invalid(
                        "soln_pds_adoption_custom_name",
                        "required for a fully customized PDS",
                    ));
                }
            }
            PdsAdoptionBasis::ExistingPrognostications => {
                if self.soln_pds_adoption_prognostication_source.is_none()
                    || self.soln_pds_adoption_prognostication_trend.is_none()
                    || self.soln_pds_adoption_prognostication_growth.is_none()
                {
                    return Err(ModelError::invalid(
                        "soln_pds_adoption_prognostication_source",
                        "source, trend and growth are required for existing prognostications",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Target share of the final-year PDS TAM per region; absent regions target zero
    pub fn pds_final_percentage(&self) -> RegionalValues {
        for region in Region::ALL {
            if !self.pds_adoption_final_percentage.iter().any(|(r, _)| *r == region) {
                debug!(region = %region, "no final adoption percentage, targeting zero");
            }
        }
        RegionalValues::from_pairs(&self.pds_adoption_final_percentage, 0.0)
    }

    /// Solution lifetime in years
    pub fn soln_lifetime_replacement(&self) -> FloatValue {
        self.soln_lifetime_capacity / self.soln_avg_annual_use
    }

    /// Conventional lifetime in years
    pub fn conv_lifetime_replacement(&self) -> FloatValue {
        self.conv_lifetime_capacity / self.conv_avg_annual_use
    }

    /// Solution lifetime rounded to whole years, at least one
    pub fn soln_lifetime_replacement_rounded(&self) -> usize {
        self.soln_lifetime_replacement().round().max(1.0) as usize
    }

    /// Conventional lifetime rounded to whole years, at least one
    pub fn conv_lifetime_replacement_rounded(&self) -> usize {
        self.conv_lifetime_replacement().round().max(1.0) as usize
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    #[serde(default)]
    default: Option<String>,
    scenarios: BTreeMap<String, toml::Value>,
}

/// Named scenarios of one solution
#[derive(Debug, Clone, Default)]
pub struct ScenarioRegistry {
    scenarios: BTreeMap<String, Arc<AdvancedControls>>,
    default: Option<String>,
}

impl ScenarioRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a registry from a TOML document with a `[scenarios."<name>"]` table per scenario
    /// and an optional top-level `default` scenario name
    pub fn from_toml_str(contents: &str) -> ModelResult<Self> {
        let file: ScenarioFile =
            toml::from_str(contents).map_err(|e| ModelError::Parse(e.to_string()))?;

        let mut registry = Self::new();
        for (name, value) in file.scenarios {
            let controls: AdvancedControls = value.try_into().map_err(|e: toml::de::Error| {
                ModelError::UnrecognizedConfiguration {
                    field: format!("scenario '{}'", name),
                    value: e.to_string(),
                }
            })?;
            registry.insert(&name, controls)?;
        }

        if let Some(default) = file.default {
            registry.get(&default)?;
            registry.default = Some(default);
        }
        Ok(registry)
    }

    /// Validate and add a scenario, replacing any scenario with the same name
    pub fn insert(&mut self, name: &str, controls: AdvancedControls) -> ModelResult<()> {
        controls.validate()?;
        self.scenarios.insert(name.to_string(), Arc::new(controls));
        Ok(())
    }

    pub fn get(&self, name: &str) -> ModelResult<Arc<AdvancedControls>> {
        let controls = self
            .scenarios
            .get(name)
            .cloned()
            .ok_or_else(|| ModelError::UnknownScenario(name.to_string()))?;
        info!(scenario = name, "selected scenario");
        Ok(controls)
    }

    /// Name of the scenario used when none is requested
    pub fn default_name(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const EXAMPLE: &str = r#"
default = "Low"

[scenarios.Low]
description = "low growth"
report_start_year = 2020
report_end_year = 2050
soln_ref_adoption_basis = "Default"
soln_ref_adoption_regional_data = false
soln_pds_adoption_regional_data = false
soln_pds_adoption_basis = "Existing Adoption Prognostications"
soln_pds_adoption_prognostication_source = "ALL SOURCES"
soln_pds_adoption_prognostication_trend = "3rd Poly"
soln_pds_adoption_prognostication_growth = "Low"
source_until_2014 = "ALL SOURCES"
ref_source_post_2014 = "Baseline Cases"
pds_source_post_2014 = "Maximum Cases"
pds_adoption_final_percentage = [["World", 0.0], ["USA", 0.5]]
pds_2014_cost = 100.0
ref_2014_cost = 100.0
conv_2014_cost = 80.0
soln_first_cost_efficiency_rate = 0.0
conv_first_cost_efficiency_rate = 0.0
soln_first_cost_below_conv = true
npv_discount_rate = 0.094
soln_lifetime_capacity = 1.0
soln_avg_annual_use = 1.0
conv_lifetime_capacity = 1.0
conv_avg_annual_use = 1.0
soln_var_oper_cost_per_funit = 0.0
soln_fuel_cost_per_funit = 0.0
soln_fixed_oper_cost_per_iunit = 0.0
conv_var_oper_cost_per_funit = 0.0
conv_fuel_cost_per_funit = 0.0
conv_fixed_oper_cost_per_iunit = 0.0
ch4_is_co2eq = true
n2o_is_co2eq = true
co2eq_conversion_source = "AR5 with feedback"
soln_indirect_co2_per_iunit = 0.0
conv_indirect_co2_per_unit = 0.0
conv_indirect_co2_is_iunits = false
ch4_co2_per_funit = 0.0
n2o_co2_per_funit = 0.0
soln_energy_efficiency_factor = 0.0
soln_annual_energy_used = 0.0
conv_annual_energy_used = 0.0
conv_fuel_consumed_per_funit = 0.0
soln_fuel_efficiency_factor = 0.0
conv_fuel_emissions_factor = 0.0
soln_fuel_emissions_factor = 0.0
emissions_grid_source = "Meta-Analysis"
emissions_grid_range = "Mean"
emissions_use_co2eq = true
conv_emissions_per_funit = 0.0
soln_emissions_per_funit = 0.0
"#;

    #[test]
    fn parses_registry() {
        let registry = ScenarioRegistry::from_toml_str(EXAMPLE).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.default_name(), Some("Low"));

        let ac = registry.get("Low").unwrap();
        assert_eq!(
            ac.soln_pds_adoption_basis,
            PdsAdoptionBasis::ExistingPrognostications
        );
        assert_eq!(
            ac.soln_pds_adoption_prognostication_trend,
            Some(TrendKind::Degree3)
        );
        assert_eq!(ac.co2eq_conversion_source.ch4_gwp(), 34.0);

        let percentages = ac.pds_final_percentage();
        assert_eq!(percentages[Region::Usa], 0.5);
        assert_eq!(percentages[Region::China], 0.0);
    }

    #[test]
    fn unknown_scenario() {
        let registry = ScenarioRegistry::from_toml_str(EXAMPLE).unwrap();
        assert!(matches!(
            registry.get("High"),
            Err(ModelError::UnknownScenario(name)) if name == "High"
        ));
    }

    #[test]
    fn unknown_basis_is_unrecognized() {
        let contents = EXAMPLE.replace(
            "\"Existing Adoption Prognostications\"",
            "\"Linear Interpolation\"",
        );
        assert!(matches!(
            ScenarioRegistry::from_toml_str(&contents),
            Err(ModelError::UnrecognizedConfiguration { .. })
        ));
    }

    #[test]
    fn unknown_and_missing_fields_are_rejected() {
        let extra = EXAMPLE.replace("report_end_year = 2050", "report_end_year = 2050\ncolour = 1");
        assert!(matches!(
            ScenarioRegistry::from_toml_str(&extra),
            Err(ModelError::UnrecognizedConfiguration { .. })
        ));

        let missing = EXAMPLE.replace("npv_discount_rate = 0.094\n", "");
        assert!(matches!(
            ScenarioRegistry::from_toml_str(&missing),
            Err(ModelError::UnrecognizedConfiguration { .. })
        ));
    }

    #[test]
    fn validation() {
        let reversed = EXAMPLE.replace("report_start_year = 2020", "report_start_year = 2060");
        assert!(matches!(
            ScenarioRegistry::from_toml_str(&reversed),
            Err(ModelError::InvalidParameter { .. })
        ));

        let no_custom_name = EXAMPLE.replace(
            "\"Existing Adoption Prognostications\"",
            "\"Fully Customized PDS\"",
        );
        assert!(matches!(
            ScenarioRegistry::from_toml_str(&no_custom_name),
            Err(ModelError::InvalidParameter { field, .. }) if field == "soln_pds_adoption_custom_name"
        ));
    }

    #[test]
    fn unknown_default_is_an_error() {
        let contents = EXAMPLE.replace("default = \"Low\"", "default = \"Medium\"");
        assert!(ScenarioRegistry::from_toml_str(&contents).is_err());
    }
}
