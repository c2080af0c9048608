//! Operating cost
//!
//! # Inputs
//!
//! * `soln_net_annual_funits_adopted`
//! * `soln_pds_tot_iunits_reqd`
//! * `conv_ref_annual_tot_iunits`
//! * `soln_pds_new_iunits_reqd`
//! * `conv_ref_new_iunits`
//!
//! # Outputs
//!
//! * `soln_pds_annual_operating_cost`
//! * `conv_ref_annual_operating_cost`
//! * `marginal_annual_operating_cost` : conventional minus solution, positive for savings
//! * `soln_pds_lifetime_operating_cost`, `conv_ref_lifetime_operating_cost` : discounted
//!   operating cost over the lifetime of the units built each year

use drawdown_core::component::{Component, InputState, OutputState, RequirementDefinition};
use drawdown_core::errors::ModelResult;
use drawdown_core::scenario::AdvancedControls;
use drawdown_core::series::{AnnualRegionalSeries, FloatValue};
use drawdown_core::standard_variables::{
    VAR_CONV_REF_ANNUAL_OPERATING_COST, VAR_CONV_REF_ANNUAL_TOT_IUNITS,
    VAR_CONV_REF_LIFETIME_OPERATING_COST, VAR_CONV_REF_NEW_IUNITS,
    VAR_MARGINAL_ANNUAL_OPERATING_COST, VAR_SOLN_NET_ANNUAL_FUNITS_ADOPTED,
    VAR_SOLN_PDS_ANNUAL_OPERATING_COST, VAR_SOLN_PDS_LIFETIME_OPERATING_COST,
    VAR_SOLN_PDS_NEW_IUNITS_REQD, VAR_SOLN_PDS_TOT_IUNITS_REQD,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatingCostParameters {
    pub soln_var_oper_cost_per_funit: FloatValue,
    pub soln_fuel_cost_per_funit: FloatValue,
    pub soln_fixed_oper_cost_per_iunit: FloatValue,
    pub conv_var_oper_cost_per_funit: FloatValue,
    pub conv_fuel_cost_per_funit: FloatValue,
    pub conv_fixed_oper_cost_per_iunit: FloatValue,
    pub soln_avg_annual_use: FloatValue,
    pub conv_avg_annual_use: FloatValue,
    pub soln_lifetime_replacement: usize,
    pub conv_lifetime_replacement: usize,
    pub npv_discount_rate: FloatValue,
}

impl OperatingCostParameters {
    pub fn from_controls(ac: &AdvancedControls) -> Self {
        Self {
            soln_var_oper_cost_per_funit: ac.soln_var_oper_cost_per_funit,
            soln_fuel_cost_per_funit: ac.soln_fuel_cost_per_funit,
            soln_fixed_oper_cost_per_iunit: ac.soln_fixed_oper_cost_per_iunit,
            conv_var_oper_cost_per_funit: ac.conv_var_oper_cost_per_funit,
            conv_fuel_cost_per_funit: ac.conv_fuel_cost_per_funit,
            conv_fixed_oper_cost_per_iunit: ac.conv_fixed_oper_cost_per_iunit,
            soln_avg_annual_use: ac.soln_avg_annual_use,
            conv_avg_annual_use: ac.conv_avg_annual_use,
            soln_lifetime_replacement: ac.soln_lifetime_replacement_rounded(),
            conv_lifetime_replacement: ac.conv_lifetime_replacement_rounded(),
            npv_discount_rate: ac.npv_discount_rate,
        }
    }
}

/// Present value of one unit of cost paid at the start of each of `years` years
pub fn discount_factor_sum(rate: FloatValue, years: usize) -> FloatValue {
    (0..years).map(|t| (1.0 + rate).powi(-(t as i32))).sum()
}

#[derive(Debug, Clone)]
pub struct OperatingCost {
    parameters: OperatingCostParameters,
}

impl OperatingCost {
    pub fn from_parameters(parameters: OperatingCostParameters) -> Self {
        Self { parameters }
    }

    pub fn calculate_soln_annual_cost(
        &self,
        net_funits: &AnnualRegionalSeries,
        tot_iunits: &AnnualRegionalSeries,
    ) -> ModelResult<AnnualRegionalSeries> {
        let p = &self.parameters;
        let per_funit = p.soln_var_oper_cost_per_funit + p.soln_fuel_cost_per_funit;
        let fixed = p.soln_fixed_oper_cost_per_iunit;
        net_funits.zip_with(tot_iunits, "soln_pds_annual_operating_cost", |f, i| {
            f * per_funit + i * fixed
        })
    }

    pub fn calculate_conv_annual_cost(
        &self,
        net_funits: &AnnualRegionalSeries,
        conv_annual_tot_iunits: &AnnualRegionalSeries,
    ) -> ModelResult<AnnualRegionalSeries> {
        let p = &self.parameters;
        let per_funit = p.conv_var_oper_cost_per_funit + p.conv_fuel_cost_per_funit;
        let fixed = p.conv_fixed_oper_cost_per_iunit;
        net_funits.zip_with(
            conv_annual_tot_iunits,
            "conv_ref_annual_operating_cost",
            |f, i| f * per_funit + i * fixed,
        )
    }

    /// Discounted lifetime operating cost of each year's new solution units
    pub fn calculate_soln_lifetime_cost(
        &self,
        new_iunits: &AnnualRegionalSeries,
    ) -> AnnualRegionalSeries {
        let p = &self.parameters;
        let per_iunit = p.soln_avg_annual_use
            * (p.soln_var_oper_cost_per_funit + p.soln_fuel_cost_per_funit)
            + p.soln_fixed_oper_cost_per_iunit;
        new_iunits.scale(
            per_iunit * discount_factor_sum(p.npv_discount_rate, p.soln_lifetime_replacement),
        )
    }

    /// Discounted lifetime operating cost of each year's displaced conventional units
    pub fn calculate_conv_lifetime_cost(
        &self,
        new_iunits: &AnnualRegionalSeries,
    ) -> AnnualRegionalSeries {
        let p = &self.parameters;
        let per_iunit = p.conv_avg_annual_use
            * (p.conv_var_oper_cost_per_funit + p.conv_fuel_cost_per_funit)
            + p.conv_fixed_oper_cost_per_iunit;
        new_iunits.scale(
            per_iunit * discount_factor_sum(p.npv_discount_rate, p.conv_lifetime_replacement),
        )
    }
}

impl Component for OperatingCost {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            VAR_SOLN_NET_ANNUAL_FUNITS_ADOPTED.as_input(),
            VAR_SOLN_PDS_TOT_IUNITS_REQD.as_input(),
            VAR_CONV_REF_ANNUAL_TOT_IUNITS.as_input(),
            VAR_SOLN_PDS_NEW_IUNITS_REQD.as_input(),
            VAR_CONV_REF_NEW_IUNITS.as_input(),
            VAR_SOLN_PDS_ANNUAL_OPERATING_COST.as_output(),
            VAR_CONV_REF_ANNUAL_OPERATING_COST.as_output(),
            VAR_MARGINAL_ANNUAL_OPERATING_COST.as_output(),
            VAR_SOLN_PDS_LIFETIME_OPERATING_COST.as_output(),
            VAR_CONV_REF_LIFETIME_OPERATING_COST.as_output(),
        ]
    }

    fn solve(&self, input_state: &InputState) -> ModelResult<OutputState> {
        let net = input_state.get_series(VAR_SOLN_NET_ANNUAL_FUNITS_ADOPTED.name)?;
        let pds_tot = input_state.get_series(VAR_SOLN_PDS_TOT_IUNITS_REQD.name)?;
        let conv_annual_tot = input_state.get_series(VAR_CONV_REF_ANNUAL_TOT_IUNITS.name)?;
        let pds_new = input_state.get_series(VAR_SOLN_PDS_NEW_IUNITS_REQD.name)?;
        let conv_new = input_state.get_series(VAR_CONV_REF_NEW_IUNITS.name)?;

        let soln_annual = self.calculate_soln_annual_cost(net, pds_tot)?;
        let conv_annual = self.calculate_conv_annual_cost(net, conv_annual_tot)?;
        let marginal = conv_annual.zip_with(&soln_annual, "marginal_annual_operating_cost", |c, s| {
            c - s
        })?;

        Ok(OutputState::from([
            (VAR_SOLN_PDS_ANNUAL_OPERATING_COST.name.to_string(), soln_annual.into()),
            (VAR_CONV_REF_ANNUAL_OPERATING_COST.name.to_string(), conv_annual.into()),
            (VAR_MARGINAL_ANNUAL_OPERATING_COST.name.to_string(), marginal.into()),
            (
                VAR_SOLN_PDS_LIFETIME_OPERATING_COST.name.to_string(),
                self.calculate_soln_lifetime_cost(pds_new).into(),
            ),
            (
                VAR_CONV_REF_LIFETIME_OPERATING_COST.name.to_string(),
                self.calculate_conv_lifetime_cost(conv_new).into(),
            ),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawdown_core::component::StateValue;
    use drawdown_core::region::Region;
    use is_close::is_close;

    fn parameters() -> OperatingCostParameters {
        OperatingCostParameters {
            soln_var_oper_cost_per_funit: 1.0,
            soln_fuel_cost_per_funit: 0.5,
            soln_fixed_oper_cost_per_iunit: 10.0,
            conv_var_oper_cost_per_funit: 2.0,
            conv_fuel_cost_per_funit: 1.0,
            conv_fixed_oper_cost_per_iunit: 5.0,
            soln_avg_annual_use: 2.0,
            conv_avg_annual_use: 4.0,
            soln_lifetime_replacement: 2,
            conv_lifetime_replacement: 1,
            npv_discount_rate: 0.1,
        }
    }

    fn filled(value: f64) -> AnnualRegionalSeries {
        AnnualRegionalSeries::filled(2014..=2016, value)
    }

    #[test]
    fn test_discount_factor_sum() {
        assert_eq!(discount_factor_sum(0.1, 0), 0.0);
        assert_eq!(discount_factor_sum(0.1, 1), 1.0);
        assert!(is_close!(discount_factor_sum(0.1, 2), 1.0 + 1.0 / 1.1));
        assert!(is_close!(discount_factor_sum(0.0, 5), 5.0));
    }

    #[test]
    fn test_lifetime_cost() {
        let oc = OperatingCost::from_parameters(parameters());
        let lifetime = oc.calculate_soln_lifetime_cost(&filled(3.0));
        // (2 * 1.5 + 10) per unit per year
        assert!(is_close!(
            lifetime.get(2015, Region::World).unwrap(),
            3.0 * 13.0 * (1.0 + 1.0 / 1.1)
        ));
        let conv = oc.calculate_conv_lifetime_cost(&filled(3.0));
        assert!(is_close!(conv.get(2015, Region::World).unwrap(), 3.0 * 17.0));
    }

    #[test]
    fn test_solve() {
        let oc = OperatingCost::from_parameters(parameters());
        let net: StateValue = filled(4.0).into();
        let pds_tot: StateValue = filled(2.0).into();
        let conv_annual_tot: StateValue = filled(1.0).into();
        let new: StateValue = filled(0.0).into();
        let input_state = InputState::build(vec![
            (VAR_SOLN_NET_ANNUAL_FUNITS_ADOPTED.name, &net),
            (VAR_SOLN_PDS_TOT_IUNITS_REQD.name, &pds_tot),
            (VAR_CONV_REF_ANNUAL_TOT_IUNITS.name, &conv_annual_tot),
            (VAR_SOLN_PDS_NEW_IUNITS_REQD.name, &new),
            (VAR_CONV_REF_NEW_IUNITS.name, &new),
        ]);
        let output = oc.solve(&input_state).unwrap();
        let get = |name: &str| output[name].as_series().unwrap().get(2016, Region::Eu).unwrap();

        assert!(is_close!(get(VAR_SOLN_PDS_ANNUAL_OPERATING_COST.name), 4.0 * 1.5 + 20.0));
        assert!(is_close!(get(VAR_CONV_REF_ANNUAL_OPERATING_COST.name), 4.0 * 3.0 + 5.0));
        assert!(is_close!(get(VAR_MARGINAL_ANNUAL_OPERATING_COST.name), -9.0));
        assert_eq!(get(VAR_SOLN_PDS_LIFETIME_OPERATING_COST.name), 0.0);
    }
}
