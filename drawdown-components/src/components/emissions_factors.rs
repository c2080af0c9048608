//! Electricity grid emissions factors
//!
//! Emissions per kWh of grid electricity displaced by or consumed by the solution, per region.
//! The factors are held constant over the configured years.
//!
//! # Outputs
//!
//! * `conv_ref_grid_CO2eq_per_KWh` : from the configured source and range
//! * `conv_ref_grid_CO2_per_KWh` : CO2 only, independent of the source

use drawdown_core::component::{Component, InputState, OutputState, RequirementDefinition};
use drawdown_core::errors::ModelResult;
use drawdown_core::region::REGION_COUNT;
use drawdown_core::scenario::{AdvancedControls, EmissionsGridRange, EmissionsGridSource};
use drawdown_core::series::{AnnualRegionalSeries, FloatValue, RegionalValues, Year};
use drawdown_core::standard_variables::{
    VAR_CONV_REF_GRID_CO2EQ_PER_KWH, VAR_CONV_REF_GRID_CO2_PER_KWH,
};
use serde::{Deserialize, Serialize};

type RegionalFactors = [FloatValue; REGION_COUNT];

// kg CO2eq per kWh, in region column order
const META_ANALYSIS_MEAN: RegionalFactors =
    [0.580, 0.454, 0.623, 0.692, 0.601, 0.232, 0.761, 0.810, 0.356, 0.503];
const META_ANALYSIS_LOW: RegionalFactors =
    [0.484, 0.372, 0.514, 0.581, 0.493, 0.184, 0.652, 0.693, 0.291, 0.418];
const META_ANALYSIS_HIGH: RegionalFactors =
    [0.677, 0.531, 0.731, 0.803, 0.709, 0.281, 0.870, 0.928, 0.428, 0.584];
const IPCC_ONLY_MEAN: RegionalFactors =
    [0.563, 0.432, 0.604, 0.671, 0.583, 0.221, 0.742, 0.793, 0.347, 0.482];
const IPCC_ONLY_LOW: RegionalFactors =
    [0.471, 0.360, 0.502, 0.562, 0.481, 0.178, 0.631, 0.672, 0.288, 0.401];
const IPCC_ONLY_HIGH: RegionalFactors =
    [0.654, 0.503, 0.702, 0.781, 0.684, 0.263, 0.851, 0.912, 0.410, 0.561];

// kg CO2 per kWh
const CO2_ONLY: RegionalFactors =
    [0.484, 0.403, 0.531, 0.612, 0.522, 0.198, 0.682, 0.731, 0.312, 0.451];

/// Grid CO2eq factors for a source and range
pub fn co2eq_factors(source: EmissionsGridSource, range: EmissionsGridRange) -> RegionalValues {
    let factors = match (source, range) {
        (EmissionsGridSource::MetaAnalysis, EmissionsGridRange::Mean) => META_ANALYSIS_MEAN,
        (EmissionsGridSource::MetaAnalysis, EmissionsGridRange::Low) => META_ANALYSIS_LOW,
        (EmissionsGridSource::MetaAnalysis, EmissionsGridRange::High) => META_ANALYSIS_HIGH,
        (EmissionsGridSource::IpccOnly, EmissionsGridRange::Mean) => IPCC_ONLY_MEAN,
        (EmissionsGridSource::IpccOnly, EmissionsGridRange::Low) => IPCC_ONLY_LOW,
        (EmissionsGridSource::IpccOnly, EmissionsGridRange::High) => IPCC_ONLY_HIGH,
    };
    RegionalValues::from_array(factors)
}

pub fn co2_factors() -> RegionalValues {
    RegionalValues::from_array(CO2_ONLY)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmissionsFactorsParameters {
    pub source: EmissionsGridSource,
    pub range: EmissionsGridRange,
    pub first_year: Year,
    pub last_year: Year,
}

impl EmissionsFactorsParameters {
    pub fn from_controls(ac: &AdvancedControls, first_year: Year, last_year: Year) -> Self {
        Self {
            source: ac.emissions_grid_source,
            range: ac.emissions_grid_range,
            first_year,
            last_year,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmissionsFactors {
    parameters: EmissionsFactorsParameters,
}

impl EmissionsFactors {
    pub fn from_parameters(parameters: EmissionsFactorsParameters) -> Self {
        Self { parameters }
    }

    fn constant_over_years(&self, factors: RegionalValues) -> AnnualRegionalSeries {
        let p = &self.parameters;
        AnnualRegionalSeries::from_fn(p.first_year..=p.last_year, |_, region| factors[region])
    }

    pub fn calculate_co2eq_per_kwh(&self) -> AnnualRegionalSeries {
        self.constant_over_years(co2eq_factors(self.parameters.source, self.parameters.range))
    }

    pub fn calculate_co2_per_kwh(&self) -> AnnualRegionalSeries {
        self.constant_over_years(co2_factors())
    }
}

impl Component for EmissionsFactors {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            VAR_CONV_REF_GRID_CO2_PER_KWH.as_output(),
            VAR_CONV_REF_GRID_CO2EQ_PER_KWH.as_output(),
        ]
    }

    fn solve(&self, _input_state: &InputState) -> ModelResult<OutputState> {
        Ok(OutputState::from([
            (
                VAR_CONV_REF_GRID_CO2_PER_KWH.name.to_string(),
                self.calculate_co2_per_kwh().into(),
            ),
            (
                VAR_CONV_REF_GRID_CO2EQ_PER_KWH.name.to_string(),
                self.calculate_co2eq_per_kwh().into(),
            ),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawdown_core::region::Region;

    fn factors(source: EmissionsGridSource, range: EmissionsGridRange) -> EmissionsFactors {
        EmissionsFactors::from_parameters(EmissionsFactorsParameters {
            source,
            range,
            first_year: 2015,
            last_year: 2060,
        })
    }

    #[test]
    fn test_ranges_are_ordered() {
        for source in [EmissionsGridSource::MetaAnalysis, EmissionsGridSource::IpccOnly] {
            let low = co2eq_factors(source, EmissionsGridRange::Low);
            let mean = co2eq_factors(source, EmissionsGridRange::Mean);
            let high = co2eq_factors(source, EmissionsGridRange::High);
            for region in Region::ALL {
                assert!(low[region] < mean[region]);
                assert!(mean[region] < high[region]);
                assert!(co2_factors()[region] <= mean[region]);
            }
        }
    }

    #[test]
    fn test_constant_over_years() {
        let ef = factors(EmissionsGridSource::MetaAnalysis, EmissionsGridRange::Mean);
        let output = ef.solve(&InputState::empty()).unwrap();
        let co2eq = output[VAR_CONV_REF_GRID_CO2EQ_PER_KWH.name]
            .as_series()
            .unwrap();
        assert_eq!(co2eq.first_year(), Some(2015));
        assert_eq!(co2eq.last_year(), Some(2060));
        assert_eq!(co2eq.get(2015, Region::World).unwrap(), 0.580);
        assert_eq!(co2eq.get(2060, Region::World).unwrap(), 0.580);
        assert_eq!(co2eq.get(2030, Region::Usa).unwrap(), 0.503);
    }
}
