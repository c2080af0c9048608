//! CH4 calcs
//!
//! Methane avoided by the solution and the resulting reduction in atmospheric concentration.
//! Reductions outside the report years are zero.
//!
//! # Inputs
//!
//! * `soln_net_annual_funits_adopted`
//!
//! # Outputs
//!
//! * `ch4_tons_reduced` : t CH4
//! * `ch4_co2eq_tons_reduced` : t CO2eq
//! * `ch4_ppb_calculator` : ppb CH4 avoided in the atmosphere

use drawdown_core::component::{Component, InputState, OutputState, RequirementDefinition};
use drawdown_core::errors::ModelResult;
use drawdown_core::region::Region;
use drawdown_core::scenario::AdvancedControls;
use drawdown_core::series::{AnnualRegionalSeries, FloatValue, Year};
use drawdown_core::standard_variables::{
    VAR_CH4_CO2EQ_TONS_REDUCED, VAR_CH4_PPB, VAR_CH4_TONS_REDUCED,
    VAR_SOLN_NET_ANNUAL_FUNITS_ADOPTED,
};
use serde::{Deserialize, Serialize};

/// Tg of CH4 per ppb of atmospheric concentration
pub const CH4_TG_PER_PPB: FloatValue = 2.75;
/// Atmospheric lifetime of CH4 in years
pub const CH4_LIFETIME: FloatValue = 12.4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CH4CalcsParameters {
    pub ch4_co2_per_funit: FloatValue,
    /// Whether `ch4_co2_per_funit` is already expressed as CO2eq
    pub ch4_is_co2eq: bool,
    pub ch4_gwp: FloatValue,
    pub report_start_year: Year,
    pub report_end_year: Year,
}

impl CH4CalcsParameters {
    pub fn from_controls(ac: &AdvancedControls) -> Self {
        Self {
            ch4_co2_per_funit: ac.ch4_co2_per_funit,
            ch4_is_co2eq: ac.ch4_is_co2eq,
            ch4_gwp: ac.co2eq_conversion_source.ch4_gwp(),
            report_start_year: ac.report_start_year,
            report_end_year: ac.report_end_year,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CH4Calcs {
    parameters: CH4CalcsParameters,
}

impl CH4Calcs {
    pub fn from_parameters(parameters: CH4CalcsParameters) -> Self {
        Self { parameters }
    }

    pub fn calculate_tons_reduced(&self, net_funits: &AnnualRegionalSeries) -> AnnualRegionalSeries {
        let p = &self.parameters;
        let per_funit = if p.ch4_is_co2eq {
            p.ch4_co2_per_funit / p.ch4_gwp
        } else {
            p.ch4_co2_per_funit
        };
        net_funits
            .scale(per_funit)
            .zero_outside(p.report_start_year, p.report_end_year)
    }

    pub fn calculate_co2eq_tons_reduced(
        &self,
        net_funits: &AnnualRegionalSeries,
    ) -> AnnualRegionalSeries {
        let p = &self.parameters;
        let per_funit = if p.ch4_is_co2eq {
            p.ch4_co2_per_funit
        } else {
            p.ch4_co2_per_funit * p.ch4_gwp
        };
        net_funits
            .scale(per_funit)
            .zero_outside(p.report_start_year, p.report_end_year)
    }

    /// Avoided concentration, with each year's reduction decaying over the CH4 lifetime
    pub fn calculate_ppb(
        &self,
        tons_reduced: &AnnualRegionalSeries,
    ) -> ModelResult<AnnualRegionalSeries> {
        let years = tons_reduced.years();
        let mut ppb = AnnualRegionalSeries::filled(years.iter().copied(), 0.0);
        for region in Region::ALL {
            let column = tons_reduced.column(region);
            for (i, year) in years.iter().enumerate() {
                let total: FloatValue = years[..=i]
                    .iter()
                    .zip(column.iter())
                    .filter(|(_, tons)| !tons.is_nan())
                    .map(|(emitted, tons)| {
                        let age = (year - emitted) as FloatValue;
                        tons * 1e-6 * (-age / CH4_LIFETIME).exp() / CH4_TG_PER_PPB
                    })
                    .sum();
                ppb.set(*year, region, total)?;
            }
        }
        Ok(ppb)
    }
}

impl Component for CH4Calcs {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            VAR_SOLN_NET_ANNUAL_FUNITS_ADOPTED.as_input(),
            VAR_CH4_TONS_REDUCED.as_output(),
            VAR_CH4_CO2EQ_TONS_REDUCED.as_output(),
            VAR_CH4_PPB.as_output(),
        ]
    }

    fn solve(&self, input_state: &InputState) -> ModelResult<OutputState> {
        let net = input_state.get_series(VAR_SOLN_NET_ANNUAL_FUNITS_ADOPTED.name)?;
        let tons = self.calculate_tons_reduced(net);
        let ppb = self.calculate_ppb(&tons)?;
        let co2eq = self.calculate_co2eq_tons_reduced(net);
        Ok(OutputState::from([
            (VAR_CH4_CO2EQ_TONS_REDUCED.name.to_string(), co2eq.into()),
            (VAR_CH4_TONS_REDUCED.name.to_string(), tons.into()),
            (VAR_CH4_PPB.name.to_string(), ppb.into()),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawdown_core::component::StateValue;
    use is_close::is_close;

    fn ch4(ch4_is_co2eq: bool) -> CH4Calcs {
        CH4Calcs::from_parameters(CH4CalcsParameters {
            ch4_co2_per_funit: 56.0,
            ch4_is_co2eq,
            ch4_gwp: 28.0,
            report_start_year: 2020,
            report_end_year: 2030,
        })
    }

    #[test]
    fn test_raw_gas_per_funit() {
        let net = AnnualRegionalSeries::filled(2014..=2040, 2.0);
        let c4 = ch4(false);
        let tons = c4.calculate_tons_reduced(&net);
        assert_eq!(tons.get(2020, Region::World).unwrap(), 112.0);
        assert_eq!(tons.get(2019, Region::World).unwrap(), 0.0);
        assert_eq!(tons.get(2031, Region::World).unwrap(), 0.0);
        let co2eq = c4.calculate_co2eq_tons_reduced(&net);
        assert_eq!(co2eq.get(2025, Region::China).unwrap(), 112.0 * 28.0);
    }

    #[test]
    fn test_co2eq_per_funit() {
        let net = AnnualRegionalSeries::filled(2014..=2040, 2.0);
        let c4 = ch4(true);
        let tons = c4.calculate_tons_reduced(&net);
        assert_eq!(tons.get(2025, Region::World).unwrap(), 4.0);
        assert_eq!(
            c4.calculate_co2eq_tons_reduced(&net).get(2025, Region::World).unwrap(),
            112.0
        );
    }

    #[test]
    fn test_ppb_decays() {
        let mut tons = AnnualRegionalSeries::filled(2020..=2022, 0.0);
        tons.set(2020, Region::World, 2.75e6).unwrap();
        let ppb = ch4(false).calculate_ppb(&tons).unwrap();
        assert!(is_close!(ppb.get(2020, Region::World).unwrap(), 1.0));
        assert!(is_close!(
            ppb.get(2022, Region::World).unwrap(),
            (-2.0 / CH4_LIFETIME).exp()
        ));
        assert_eq!(ppb.get(2022, Region::Usa).unwrap(), 0.0);
    }

    #[test]
    fn test_solve() {
        let net: StateValue = AnnualRegionalSeries::filled(2014..=2050, 1.0).into();
        let input_state = InputState::build(vec![(VAR_SOLN_NET_ANNUAL_FUNITS_ADOPTED.name, &net)]);
        let output = ch4(false).solve(&input_state).unwrap();
        let ppb = output[VAR_CH4_PPB.name].as_series().unwrap();
        assert_eq!(ppb.get(2019, Region::World).unwrap(), 0.0);
        assert!(ppb.get(2030, Region::World).unwrap() > ppb.get(2025, Region::World).unwrap());
        // decays once the report years end
        assert!(ppb.get(2040, Region::World).unwrap() < ppb.get(2030, Region::World).unwrap());
    }
}
