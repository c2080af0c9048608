//! Unit adoption
//!
//! Converts functional-unit adoption into implementation units for the solution and the
//! conventional technology it displaces, the units that must be built each year, and the
//! direct energy and emissions consequences of the net adoption.
//!
//! New units required are never negative: a fall in installed units is not treated as
//! negative construction. Units reaching the end of their lifetime are rebuilt, so the new
//! units of year `y` also include those built `lifetime` years earlier.
//!
//! # Inputs
//!
//! * `ref_tam_per_region`
//! * `soln_ref_funits_adopted`
//! * `soln_pds_funits_adopted`
//!
//! # Outputs
//!
//! * `soln_ref_tot_iunits_reqd`, `soln_pds_tot_iunits_reqd`
//! * `conv_ref_tot_iunits`, `conv_ref_annual_tot_iunits`
//! * `soln_net_annual_funits_adopted`
//! * `soln_pds_new_iunits_reqd`, `soln_ref_new_iunits_reqd`, `conv_ref_new_iunits`
//! * `soln_pds_cumulative_iunits`
//! * `soln_pds_net_grid_electricity_units_saved`, `soln_pds_net_grid_electricity_units_used`
//! * `soln_pds_direct_co2_emissions_saved`, `soln_pds_direct_ch4_co2_emissions_saved`,
//!   `soln_pds_direct_n2o_co2_emissions_saved`

use drawdown_core::component::{Component, InputState, OutputState, RequirementDefinition};
use drawdown_core::errors::ModelResult;
use drawdown_core::scenario::{AdvancedControls, Co2eqConversionSource};
use drawdown_core::series::{AnnualRegionalSeries, FloatValue};
use drawdown_core::standard_variables::{
    VAR_CONV_REF_ANNUAL_TOT_IUNITS, VAR_CONV_REF_NEW_IUNITS, VAR_CONV_REF_TOT_IUNITS,
    VAR_REF_TAM, VAR_SOLN_NET_ANNUAL_FUNITS_ADOPTED, VAR_SOLN_PDS_CUMULATIVE_IUNITS,
    VAR_SOLN_PDS_DIRECT_CH4_CO2_EMISSIONS_SAVED, VAR_SOLN_PDS_DIRECT_CO2_EMISSIONS_SAVED,
    VAR_SOLN_PDS_DIRECT_N2O_CO2_EMISSIONS_SAVED, VAR_SOLN_PDS_FUNITS_ADOPTED,
    VAR_SOLN_PDS_NET_GRID_ELECTRICITY_UNITS_SAVED, VAR_SOLN_PDS_NET_GRID_ELECTRICITY_UNITS_USED,
    VAR_SOLN_PDS_NEW_IUNITS_REQD, VAR_SOLN_PDS_TOT_IUNITS_REQD, VAR_SOLN_REF_FUNITS_ADOPTED,
    VAR_SOLN_REF_NEW_IUNITS_REQD, VAR_SOLN_REF_TOT_IUNITS_REQD,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitAdoptionParameters {
    /// Functional units delivered per implementation unit per year
    pub soln_avg_annual_use: FloatValue,
    pub conv_avg_annual_use: FloatValue,
    /// Whole years before a unit is replaced
    pub soln_lifetime_replacement: usize,
    pub conv_lifetime_replacement: usize,
    pub soln_energy_efficiency_factor: FloatValue,
    pub soln_annual_energy_used: FloatValue,
    pub conv_annual_energy_used: FloatValue,
    pub conv_emissions_per_funit: FloatValue,
    pub soln_emissions_per_funit: FloatValue,
    pub ch4_co2_per_funit: FloatValue,
    pub n2o_co2_per_funit: FloatValue,
    pub ch4_is_co2eq: bool,
    pub n2o_is_co2eq: bool,
    pub co2eq_conversion_source: Co2eqConversionSource,
    /// Subtract the solution's own emissions as well as crediting the displaced conventional
    /// emissions
    pub double_count_adjustment: bool,
}

impl UnitAdoptionParameters {
    pub fn from_controls(ac: &AdvancedControls, double_count_adjustment: bool) -> Self {
        Self {
            soln_avg_annual_use: ac.soln_avg_annual_use,
            conv_avg_annual_use: ac.conv_avg_annual_use,
            soln_lifetime_replacement: ac.soln_lifetime_replacement_rounded(),
            conv_lifetime_replacement: ac.conv_lifetime_replacement_rounded(),
            soln_energy_efficiency_factor: ac.soln_energy_efficiency_factor,
            soln_annual_energy_used: ac.soln_annual_energy_used,
            conv_annual_energy_used: ac.conv_annual_energy_used,
            conv_emissions_per_funit: ac.conv_emissions_per_funit,
            soln_emissions_per_funit: ac.soln_emissions_per_funit,
            ch4_co2_per_funit: ac.ch4_co2_per_funit,
            n2o_co2_per_funit: ac.n2o_co2_per_funit,
            ch4_is_co2eq: ac.ch4_is_co2eq,
            n2o_is_co2eq: ac.n2o_is_co2eq,
            co2eq_conversion_source: ac.co2eq_conversion_source,
            double_count_adjustment,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UnitAdoption {
    parameters: UnitAdoptionParameters,
}

/// Units built each year to follow `total` with units lasting `lifetime` years
///
/// The first year builds nothing; afterwards growth in `total` is built and every unit built
/// `lifetime` years earlier is replaced. Shrinking totals build nothing.
pub fn new_units_required(
    total: &AnnualRegionalSeries,
    lifetime: usize,
) -> ModelResult<AnnualRegionalSeries> {
    let lifetime = lifetime.max(1);
    // f64::max maps NaN growth to zero
    let mut values = total.first_difference().map(|v| v.max(0.0)).values().clone();
    for i in lifetime..values.nrows() {
        let replaced = values.row(i - lifetime).to_owned();
        let mut row = values.row_mut(i);
        row += &replaced;
    }
    AnnualRegionalSeries::new(total.years().to_vec(), values)
}

impl UnitAdoption {
    pub fn from_parameters(parameters: UnitAdoptionParameters) -> Self {
        Self { parameters }
    }

    pub fn calculate_tot_iunits(&self, funits: &AnnualRegionalSeries) -> AnnualRegionalSeries {
        funits.scale(1.0 / self.parameters.soln_avg_annual_use)
    }

    /// Conventional units still serving the reference market
    pub fn calculate_conv_ref_tot_iunits(
        &self,
        ref_tam: &AnnualRegionalSeries,
        ref_funits: &AnnualRegionalSeries,
    ) -> ModelResult<AnnualRegionalSeries> {
        let conv_use = self.parameters.conv_avg_annual_use;
        ref_funits.align_to(ref_tam)?.zip_with(
            ref_funits,
            "conv_ref_tot_iunits",
            |tam, funits| (tam - funits) / conv_use,
        )
    }

    /// Cumulative installed solution units, starting from the first year's installed base
    pub fn calculate_cumulative_iunits(
        &self,
        tot_iunits: &AnnualRegionalSeries,
        new_iunits: &AnnualRegionalSeries,
    ) -> ModelResult<AnnualRegionalSeries> {
        let mut cumulative = new_iunits.cumulative_sum();
        if let Some(first) = tot_iunits.first_year() {
            let base = tot_iunits.row(first)?.map(|v| v.max(0.0));
            for year in new_iunits.years() {
                let row = cumulative.row(*year)?.zip_with(&base, |a, b| a + b);
                cumulative.set_row(*year, &row)?;
            }
        }
        Ok(cumulative)
    }

    /// Direct emissions avoided by the net adoption, t CO2-eq
    pub fn calculate_direct_co2_saved(&self, net_funits: &AnnualRegionalSeries) -> AnnualRegionalSeries {
        let conv = self.parameters.conv_emissions_per_funit;
        let soln = if self.parameters.double_count_adjustment {
            self.parameters.soln_emissions_per_funit
        } else {
            0.0
        };
        net_funits.map(|net| conv * net - soln * net)
    }

    pub fn calculate_direct_ch4_saved(&self, net_funits: &AnnualRegionalSeries) -> AnnualRegionalSeries {
        let factor = if self.parameters.ch4_is_co2eq {
            1.0
        } else {
            self.parameters.co2eq_conversion_source.ch4_gwp()
        };
        net_funits.scale(self.parameters.ch4_co2_per_funit * factor)
    }

    pub fn calculate_direct_n2o_saved(&self, net_funits: &AnnualRegionalSeries) -> AnnualRegionalSeries {
        let factor = if self.parameters.n2o_is_co2eq {
            1.0
        } else {
            self.parameters.co2eq_conversion_source.n2o_gwp()
        };
        net_funits.scale(self.parameters.n2o_co2_per_funit * factor)
    }
}

impl Component for UnitAdoption {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            VAR_REF_TAM.as_input(),
            VAR_SOLN_REF_FUNITS_ADOPTED.as_input(),
            VAR_SOLN_PDS_FUNITS_ADOPTED.as_input(),
            VAR_SOLN_REF_TOT_IUNITS_REQD.as_output(),
            VAR_SOLN_PDS_TOT_IUNITS_REQD.as_output(),
            VAR_CONV_REF_TOT_IUNITS.as_output(),
            VAR_CONV_REF_ANNUAL_TOT_IUNITS.as_output(),
            VAR_SOLN_NET_ANNUAL_FUNITS_ADOPTED.as_output(),
            VAR_SOLN_PDS_NEW_IUNITS_REQD.as_output(),
            VAR_SOLN_REF_NEW_IUNITS_REQD.as_output(),
            VAR_CONV_REF_NEW_IUNITS.as_output(),
            VAR_SOLN_PDS_CUMULATIVE_IUNITS.as_output(),
            VAR_SOLN_PDS_NET_GRID_ELECTRICITY_UNITS_SAVED.as_output(),
            VAR_SOLN_PDS_NET_GRID_ELECTRICITY_UNITS_USED.as_output(),
            VAR_SOLN_PDS_DIRECT_CO2_EMISSIONS_SAVED.as_output(),
            VAR_SOLN_PDS_DIRECT_CH4_CO2_EMISSIONS_SAVED.as_output(),
            VAR_SOLN_PDS_DIRECT_N2O_CO2_EMISSIONS_SAVED.as_output(),
        ]
    }

    fn solve(&self, input_state: &InputState) -> ModelResult<OutputState> {
        let p = &self.parameters;
        let ref_tam = input_state.get_series(VAR_REF_TAM.name)?;
        let ref_funits = input_state.get_series(VAR_SOLN_REF_FUNITS_ADOPTED.name)?;
        let pds_funits = input_state.get_series(VAR_SOLN_PDS_FUNITS_ADOPTED.name)?;

        let ref_tot = self.calculate_tot_iunits(ref_funits);
        let pds_tot = self.calculate_tot_iunits(pds_funits);
        let conv_tot = self.calculate_conv_ref_tot_iunits(ref_tam, ref_funits)?;
        let net = pds_funits.zip_with(ref_funits, "soln_net_annual_funits_adopted", |p, r| p - r)?;
        let conv_annual_tot = net.scale(1.0 / p.conv_avg_annual_use);

        let pds_new = new_units_required(&pds_tot, p.soln_lifetime_replacement)?;
        let ref_new = new_units_required(&ref_tot, p.soln_lifetime_replacement)?;
        let conv_new = new_units_required(&conv_annual_tot, p.conv_lifetime_replacement)?;
        let cumulative = self.calculate_cumulative_iunits(&pds_tot, &pds_new)?;

        let grid_saved = net.scale(p.conv_annual_energy_used * p.soln_energy_efficiency_factor);
        let grid_used = net.scale(p.soln_annual_energy_used);
        let co2_saved = self.calculate_direct_co2_saved(&net);
        let ch4_saved = self.calculate_direct_ch4_saved(&net);
        let n2o_saved = self.calculate_direct_n2o_saved(&net);

        Ok(OutputState::from([
            (VAR_SOLN_REF_TOT_IUNITS_REQD.name.to_string(), ref_tot.into()),
            (VAR_SOLN_PDS_TOT_IUNITS_REQD.name.to_string(), pds_tot.into()),
            (VAR_CONV_REF_TOT_IUNITS.name.to_string(), conv_tot.into()),
            (VAR_CONV_REF_ANNUAL_TOT_IUNITS.name.to_string(), conv_annual_tot.into()),
            (VAR_SOLN_NET_ANNUAL_FUNITS_ADOPTED.name.to_string(), net.into()),
            (VAR_SOLN_PDS_NEW_IUNITS_REQD.name.to_string(), pds_new.into()),
            (VAR_SOLN_REF_NEW_IUNITS_REQD.name.to_string(), ref_new.into()),
            (VAR_CONV_REF_NEW_IUNITS.name.to_string(), conv_new.into()),
            (VAR_SOLN_PDS_CUMULATIVE_IUNITS.name.to_string(), cumulative.into()),
            (
                VAR_SOLN_PDS_NET_GRID_ELECTRICITY_UNITS_SAVED.name.to_string(),
                grid_saved.into(),
            ),
            (
                VAR_SOLN_PDS_NET_GRID_ELECTRICITY_UNITS_USED.name.to_string(),
                grid_used.into(),
            ),
            (VAR_SOLN_PDS_DIRECT_CO2_EMISSIONS_SAVED.name.to_string(), co2_saved.into()),
            (VAR_SOLN_PDS_DIRECT_CH4_CO2_EMISSIONS_SAVED.name.to_string(), ch4_saved.into()),
            (VAR_SOLN_PDS_DIRECT_N2O_CO2_EMISSIONS_SAVED.name.to_string(), n2o_saved.into()),
        ]))
    }
}
