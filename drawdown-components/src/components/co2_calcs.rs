//! CO2 calcs
//!
//! Emissions avoided by the solution, assembled from the grid electricity, direct, fuel and
//! indirect terms. Totals are reported in million metric tonnes and are zero outside the
//! report years.
//!
//! # Inputs
//!
//! * `soln_net_annual_funits_adopted`
//! * `soln_pds_net_grid_electricity_units_saved`, `soln_pds_net_grid_electricity_units_used` : TWh
//! * `soln_pds_direct_co2_emissions_saved`, `soln_pds_direct_ch4_co2_emissions_saved`,
//!   `soln_pds_direct_n2o_co2_emissions_saved` : t
//! * `soln_pds_new_iunits_reqd`, `soln_ref_new_iunits_reqd`, `conv_ref_new_iunits`
//! * `conv_ref_grid_CO2_per_KWh`, `conv_ref_grid_CO2eq_per_KWh`
//!
//! # Outputs
//!
//! * `co2eq_mmt_reduced` and its terms: `co2eq_reduced_grid_emissions`,
//!   `co2eq_increased_grid_usage_emissions`, `co2eq_direct_reduced_emissions`,
//!   `co2eq_reduced_fuel_emissions`, `co2eq_net_indirect_emissions`
//! * `co2_mmt_reduced`
//! * `n2o_co2eq_reduced`

use drawdown_core::component::{Component, InputState, OutputState, RequirementDefinition};
use drawdown_core::errors::ModelResult;
use drawdown_core::scenario::AdvancedControls;
use drawdown_core::series::{AnnualRegionalSeries, FloatValue, Year};
use drawdown_core::standard_variables::{
    VAR_CO2EQ_DIRECT_REDUCED_EMISSIONS, VAR_CO2EQ_INCREASED_GRID_USAGE_EMISSIONS,
    VAR_CO2EQ_MMT_REDUCED, VAR_CO2EQ_NET_INDIRECT_EMISSIONS, VAR_CO2EQ_REDUCED_FUEL_EMISSIONS,
    VAR_CO2EQ_REDUCED_GRID_EMISSIONS, VAR_CO2_MMT_REDUCED, VAR_CONV_REF_GRID_CO2EQ_PER_KWH,
    VAR_CONV_REF_GRID_CO2_PER_KWH, VAR_CONV_REF_NEW_IUNITS, VAR_N2O_CO2EQ_REDUCED,
    VAR_SOLN_NET_ANNUAL_FUNITS_ADOPTED, VAR_SOLN_PDS_DIRECT_CH4_CO2_EMISSIONS_SAVED,
    VAR_SOLN_PDS_DIRECT_CO2_EMISSIONS_SAVED, VAR_SOLN_PDS_DIRECT_N2O_CO2_EMISSIONS_SAVED,
    VAR_SOLN_PDS_NET_GRID_ELECTRICITY_UNITS_SAVED, VAR_SOLN_PDS_NET_GRID_ELECTRICITY_UNITS_USED,
    VAR_SOLN_PDS_NEW_IUNITS_REQD, VAR_SOLN_REF_NEW_IUNITS_REQD,
};
use serde::{Deserialize, Serialize};

const TONNES_PER_MMT: FloatValue = 1e6;
const LITERS_PER_CUBIC_METER: FloatValue = 1000.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CO2CalcsParameters {
    /// Use the CO2eq grid factor for the grid terms rather than CO2 only
    pub emissions_use_co2eq: bool,
    pub conv_fuel_consumed_per_funit: FloatValue,
    pub soln_fuel_efficiency_factor: FloatValue,
    pub conv_fuel_emissions_factor: FloatValue,
    pub soln_fuel_emissions_factor: FloatValue,
    /// Fuel consumption is given in liters while the emissions factors are per cubic meter
    pub fuel_in_liters: bool,
    pub soln_indirect_co2_per_iunit: FloatValue,
    pub conv_indirect_co2_per_unit: FloatValue,
    /// Whether the conventional indirect emissions are per implementation unit
    pub conv_indirect_co2_is_iunits: bool,
    pub report_start_year: Year,
    pub report_end_year: Year,
}

impl CO2CalcsParameters {
    pub fn from_controls(ac: &AdvancedControls, fuel_in_liters: bool) -> Self {
        Self {
            emissions_use_co2eq: ac.emissions_use_co2eq,
            conv_fuel_consumed_per_funit: ac.conv_fuel_consumed_per_funit,
            soln_fuel_efficiency_factor: ac.soln_fuel_efficiency_factor,
            conv_fuel_emissions_factor: ac.conv_fuel_emissions_factor,
            soln_fuel_emissions_factor: ac.soln_fuel_emissions_factor,
            fuel_in_liters,
            soln_indirect_co2_per_iunit: ac.soln_indirect_co2_per_iunit,
            conv_indirect_co2_per_unit: ac.conv_indirect_co2_per_unit,
            conv_indirect_co2_is_iunits: ac.conv_indirect_co2_is_iunits,
            report_start_year: ac.report_start_year,
            report_end_year: ac.report_end_year,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CO2Calcs {
    parameters: CO2CalcsParameters,
}

impl CO2Calcs {
    pub fn from_parameters(parameters: CO2CalcsParameters) -> Self {
        Self { parameters }
    }

    /// Grid emissions in MMT for electricity in TWh and a factor in kg per kWh
    pub fn calculate_grid_emissions(
        &self,
        electricity: &AnnualRegionalSeries,
        factor: &AnnualRegionalSeries,
    ) -> ModelResult<AnnualRegionalSeries> {
        let factor = electricity.align_to(factor)?;
        electricity.zip_with(&factor, "grid_emissions", |twh, kg_per_kwh| twh * kg_per_kwh)
    }

    pub fn calculate_fuel_emissions(
        &self,
        net_funits: &AnnualRegionalSeries,
    ) -> AnnualRegionalSeries {
        let p = &self.parameters;
        let per_funit = p.conv_fuel_consumed_per_funit
            * (p.conv_fuel_emissions_factor
                - p.soln_fuel_emissions_factor * (1.0 - p.soln_fuel_efficiency_factor));
        let unit_factor = if p.fuel_in_liters {
            1.0 / LITERS_PER_CUBIC_METER
        } else {
            1.0
        };
        net_funits.scale(per_funit * unit_factor / TONNES_PER_MMT)
    }

    pub fn calculate_net_indirect_emissions(
        &self,
        net_funits: &AnnualRegionalSeries,
        soln_pds_new_iunits: &AnnualRegionalSeries,
        soln_ref_new_iunits: &AnnualRegionalSeries,
        conv_ref_new_iunits: &AnnualRegionalSeries,
    ) -> ModelResult<AnnualRegionalSeries> {
        let p = &self.parameters;
        let soln = soln_pds_new_iunits
            .zip_with(soln_ref_new_iunits, "soln_new_iunits", |pds, reference| {
                (pds - reference) * p.soln_indirect_co2_per_iunit
            })?;
        let conv = if p.conv_indirect_co2_is_iunits {
            conv_ref_new_iunits.scale(p.conv_indirect_co2_per_unit)
        } else {
            net_funits.scale(p.conv_indirect_co2_per_unit)
        };
        soln.zip_with(&conv, "co2eq_net_indirect_emissions", |s, c| {
            (s - c) / TONNES_PER_MMT
        })
    }
}

fn sum_all(
    first: &AnnualRegionalSeries,
    rest: &[&AnnualRegionalSeries],
    context: &str,
) -> ModelResult<AnnualRegionalSeries> {
    rest.iter().try_fold(first.clone(), |total, term| {
        total.zip_with(term, context, |a, b| a + b)
    })
}

impl Component for CO2Calcs {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            VAR_SOLN_NET_ANNUAL_FUNITS_ADOPTED.as_input(),
            VAR_SOLN_PDS_NET_GRID_ELECTRICITY_UNITS_SAVED.as_input(),
            VAR_SOLN_PDS_NET_GRID_ELECTRICITY_UNITS_USED.as_input(),
            VAR_SOLN_PDS_DIRECT_CO2_EMISSIONS_SAVED.as_input(),
            VAR_SOLN_PDS_DIRECT_CH4_CO2_EMISSIONS_SAVED.as_input(),
            VAR_SOLN_PDS_DIRECT_N2O_CO2_EMISSIONS_SAVED.as_input(),
            VAR_SOLN_PDS_NEW_IUNITS_REQD.as_input(),
            VAR_SOLN_REF_NEW_IUNITS_REQD.as_input(),
            VAR_CONV_REF_NEW_IUNITS.as_input(),
            VAR_CONV_REF_GRID_CO2_PER_KWH.as_input(),
            VAR_CONV_REF_GRID_CO2EQ_PER_KWH.as_input(),
            VAR_CO2EQ_MMT_REDUCED.as_output(),
            VAR_CO2_MMT_REDUCED.as_output(),
            VAR_N2O_CO2EQ_REDUCED.as_output(),
            VAR_CO2EQ_REDUCED_GRID_EMISSIONS.as_output(),
            VAR_CO2EQ_INCREASED_GRID_USAGE_EMISSIONS.as_output(),
            VAR_CO2EQ_DIRECT_REDUCED_EMISSIONS.as_output(),
            VAR_CO2EQ_REDUCED_FUEL_EMISSIONS.as_output(),
            VAR_CO2EQ_NET_INDIRECT_EMISSIONS.as_output(),
        ]
    }

    fn solve(&self, input_state: &InputState) -> ModelResult<OutputState> {
        let p = &self.parameters;
        let net = input_state.get_series(VAR_SOLN_NET_ANNUAL_FUNITS_ADOPTED.name)?;
        let grid_saved =
            input_state.get_series(VAR_SOLN_PDS_NET_GRID_ELECTRICITY_UNITS_SAVED.name)?;
        let grid_used =
            input_state.get_series(VAR_SOLN_PDS_NET_GRID_ELECTRICITY_UNITS_USED.name)?;
        let direct_co2 = input_state.get_series(VAR_SOLN_PDS_DIRECT_CO2_EMISSIONS_SAVED.name)?;
        let direct_ch4 = input_state.get_series(VAR_SOLN_PDS_DIRECT_CH4_CO2_EMISSIONS_SAVED.name)?;
        let direct_n2o = input_state.get_series(VAR_SOLN_PDS_DIRECT_N2O_CO2_EMISSIONS_SAVED.name)?;
        let co2_per_kwh = input_state.get_series(VAR_CONV_REF_GRID_CO2_PER_KWH.name)?;
        let co2eq_per_kwh = input_state.get_series(VAR_CONV_REF_GRID_CO2EQ_PER_KWH.name)?;

        let grid_factor = if p.emissions_use_co2eq {
            co2eq_per_kwh
        } else {
            co2_per_kwh
        };
        let grid_reduced = self.calculate_grid_emissions(grid_saved, grid_factor)?;
        let grid_increased = self.calculate_grid_emissions(grid_used, grid_factor)?;
        let direct = sum_all(
            direct_co2,
            &[direct_ch4, direct_n2o],
            "co2eq_direct_reduced_emissions",
        )?
        .scale(1.0 / TONNES_PER_MMT);
        let fuel = self.calculate_fuel_emissions(net);
        let indirect = self.calculate_net_indirect_emissions(
            net,
            input_state.get_series(VAR_SOLN_PDS_NEW_IUNITS_REQD.name)?,
            input_state.get_series(VAR_SOLN_REF_NEW_IUNITS_REQD.name)?,
            input_state.get_series(VAR_CONV_REF_NEW_IUNITS.name)?,
        )?;

        let co2eq_mmt = sum_all(&grid_reduced, &[&direct, &fuel], "co2eq_mmt_reduced")?
            .zip_with(&grid_increased, "co2eq_mmt_reduced", |a, b| a - b)?
            .zip_with(&indirect, "co2eq_mmt_reduced", |a, b| a - b)?;

        let co2_grid_reduced = self.calculate_grid_emissions(grid_saved, co2_per_kwh)?;
        let co2_grid_increased = self.calculate_grid_emissions(grid_used, co2_per_kwh)?;
        let co2_mmt = sum_all(
            &co2_grid_reduced,
            &[&direct_co2.scale(1.0 / TONNES_PER_MMT), &fuel],
            "co2_mmt_reduced",
        )?
        .zip_with(&co2_grid_increased, "co2_mmt_reduced", |a, b| a - b)?
        .zip_with(&indirect, "co2_mmt_reduced", |a, b| a - b)?;

        let n2o = direct_n2o.scale(1.0 / TONNES_PER_MMT);

        let (start, end) = (p.report_start_year, p.report_end_year);
        Ok(OutputState::from([
            (
                VAR_CO2EQ_MMT_REDUCED.name.to_string(),
                co2eq_mmt.zero_outside(start, end).into(),
            ),
            (
                VAR_CO2_MMT_REDUCED.name.to_string(),
                co2_mmt.zero_outside(start, end).into(),
            ),
            (
                VAR_N2O_CO2EQ_REDUCED.name.to_string(),
                n2o.zero_outside(start, end).into(),
            ),
            (
                VAR_CO2EQ_REDUCED_GRID_EMISSIONS.name.to_string(),
                grid_reduced.into(),
            ),
            (
                VAR_CO2EQ_INCREASED_GRID_USAGE_EMISSIONS.name.to_string(),
                grid_increased.into(),
            ),
            (VAR_CO2EQ_DIRECT_REDUCED_EMISSIONS.name.to_string(), direct.into()),
            (VAR_CO2EQ_REDUCED_FUEL_EMISSIONS.name.to_string(), fuel.into()),
            (VAR_CO2EQ_NET_INDIRECT_EMISSIONS.name.to_string(), indirect.into()),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawdown_core::component::StateValue;
    use drawdown_core::region::Region;
    use is_close::is_close;

    fn parameters() -> CO2CalcsParameters {
        CO2CalcsParameters {
            emissions_use_co2eq: true,
            conv_fuel_consumed_per_funit: 0.0,
            soln_fuel_efficiency_factor: 0.0,
            conv_fuel_emissions_factor: 0.0,
            soln_fuel_emissions_factor: 0.0,
            fuel_in_liters: false,
            soln_indirect_co2_per_iunit: 0.0,
            conv_indirect_co2_per_unit: 0.0,
            conv_indirect_co2_is_iunits: false,
            report_start_year: 2020,
            report_end_year: 2050,
        }
    }

    fn filled(value: f64) -> AnnualRegionalSeries {
        AnnualRegionalSeries::filled(2014..=2050, value)
    }

    #[test]
    fn test_grid_emissions_align_factor_years() {
        let c2 = CO2Calcs::from_parameters(parameters());
        let factor = AnnualRegionalSeries::filled(2012..=2060, 0.5);
        let emissions = c2.calculate_grid_emissions(&filled(4.0), &factor).unwrap();
        assert_eq!(emissions.first_year(), Some(2014));
        assert_eq!(emissions.get(2050, Region::World).unwrap(), 2.0);

        let short = AnnualRegionalSeries::filled(2020..=2060, 0.5);
        assert!(c2.calculate_grid_emissions(&filled(4.0), &short).is_err());
    }

    #[test]
    fn test_fuel_emissions() {
        let mut p = parameters();
        p.conv_fuel_consumed_per_funit = 100.0;
        p.conv_fuel_emissions_factor = 3.0;
        p.soln_fuel_emissions_factor = 2.0;
        p.soln_fuel_efficiency_factor = 0.5;
        let fuel = CO2Calcs::from_parameters(p.clone()).calculate_fuel_emissions(&filled(1e4));
        // 1e4 * 100 * (3 - 2 * 0.5) / 1e6
        assert!(is_close!(fuel.get(2030, Region::World).unwrap(), 2.0));

        p.fuel_in_liters = true;
        let fuel = CO2Calcs::from_parameters(p).calculate_fuel_emissions(&filled(1e4));
        assert!(is_close!(fuel.get(2030, Region::World).unwrap(), 0.002));
    }

    #[test]
    fn test_net_indirect_emissions() {
        let mut p = parameters();
        p.soln_indirect_co2_per_iunit = 1e6;
        p.conv_indirect_co2_per_unit = 5e5;
        let c2 = CO2Calcs::from_parameters(p.clone());
        let indirect = c2
            .calculate_net_indirect_emissions(&filled(3.0), &filled(4.0), &filled(1.0), &filled(2.0))
            .unwrap();
        // (4 - 1) * 1 - 3 * 0.5
        assert!(is_close!(indirect.get(2030, Region::World).unwrap(), 1.5));

        p.conv_indirect_co2_is_iunits = true;
        let c2 = CO2Calcs::from_parameters(p);
        let indirect = c2
            .calculate_net_indirect_emissions(&filled(3.0), &filled(4.0), &filled(1.0), &filled(2.0))
            .unwrap();
        assert!(is_close!(indirect.get(2030, Region::World).unwrap(), 2.0));
    }

    #[test]
    fn test_solve() {
        let c2 = CO2Calcs::from_parameters(parameters());
        let net: StateValue = filled(1.0).into();
        let saved: StateValue = filled(10.0).into();
        let used: StateValue = filled(2.0).into();
        let direct_co2: StateValue = filled(3e6).into();
        let direct_ch4: StateValue = filled(1e6).into();
        let direct_n2o: StateValue = filled(2e6).into();
        let new: StateValue = filled(0.0).into();
        let co2: StateValue = AnnualRegionalSeries::filled(2012..=2060, 0.4).into();
        let co2eq: StateValue = AnnualRegionalSeries::filled(2012..=2060, 0.5).into();
        let input_state = InputState::build(vec![
            (VAR_SOLN_NET_ANNUAL_FUNITS_ADOPTED.name, &net),
            (VAR_SOLN_PDS_NET_GRID_ELECTRICITY_UNITS_SAVED.name, &saved),
            (VAR_SOLN_PDS_NET_GRID_ELECTRICITY_UNITS_USED.name, &used),
            (VAR_SOLN_PDS_DIRECT_CO2_EMISSIONS_SAVED.name, &direct_co2),
            (VAR_SOLN_PDS_DIRECT_CH4_CO2_EMISSIONS_SAVED.name, &direct_ch4),
            (VAR_SOLN_PDS_DIRECT_N2O_CO2_EMISSIONS_SAVED.name, &direct_n2o),
            (VAR_SOLN_PDS_NEW_IUNITS_REQD.name, &new),
            (VAR_SOLN_REF_NEW_IUNITS_REQD.name, &new),
            (VAR_CONV_REF_NEW_IUNITS.name, &new),
            (VAR_CONV_REF_GRID_CO2_PER_KWH.name, &co2),
            (VAR_CONV_REF_GRID_CO2EQ_PER_KWH.name, &co2eq),
        ]);
        let output = c2.solve(&input_state).unwrap();
        let get = |name: &str, year: Year| {
            output[name]
                .as_series()
                .unwrap()
                .get(year, Region::World)
                .unwrap()
        };

        // 10 * 0.5 - 2 * 0.5 + 6
        assert!(is_close!(get(VAR_CO2EQ_MMT_REDUCED.name, 2030), 10.0));
        // 10 * 0.4 - 2 * 0.4 + 3
        assert!(is_close!(get(VAR_CO2_MMT_REDUCED.name, 2030), 6.2));
        assert!(is_close!(get(VAR_N2O_CO2EQ_REDUCED.name, 2030), 2.0));
        assert_eq!(get(VAR_CO2EQ_MMT_REDUCED.name, 2019), 0.0);
        // terms are not limited to the report years
        assert!(is_close!(get(VAR_CO2EQ_DIRECT_REDUCED_EMISSIONS.name, 2015), 6.0));
    }
}
