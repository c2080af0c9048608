//! First cost
//!
//! Installation cost per implementation unit follows a learning curve: each doubling
//! (or, generally, each `learning_rate`-fold increase) of World installed units relative to
//! the first year lowers the cost by the efficiency rate.
//!
//! # Inputs
//!
//! * `soln_pds_tot_iunits_reqd`, `soln_ref_tot_iunits_reqd`, `conv_ref_tot_iunits`
//! * `soln_pds_new_iunits_reqd`, `soln_ref_new_iunits_reqd`, `conv_ref_new_iunits`
//!
//! # Outputs
//!
//! * `soln_pds_install_cost_per_iunit`, `soln_ref_install_cost_per_iunit`,
//!   `conv_ref_install_cost_per_iunit`
//! * `soln_pds_annual_world_first_cost`, `soln_ref_annual_world_first_cost`,
//!   `conv_ref_annual_world_first_cost`
//! * `soln_pds_cumulative_install`

use drawdown_core::component::{Component, InputState, OutputState, RequirementDefinition};
use drawdown_core::errors::ModelResult;
use drawdown_core::region::Region;
use drawdown_core::scenario::AdvancedControls;
use drawdown_core::series::{AnnualRegionalSeries, FloatValue};
use drawdown_core::standard_variables::{
    VAR_CONV_REF_ANNUAL_WORLD_FIRST_COST, VAR_CONV_REF_INSTALL_COST_PER_IUNIT,
    VAR_CONV_REF_NEW_IUNITS, VAR_CONV_REF_TOT_IUNITS, VAR_SOLN_PDS_ANNUAL_WORLD_FIRST_COST,
    VAR_SOLN_PDS_CUMULATIVE_INSTALL, VAR_SOLN_PDS_INSTALL_COST_PER_IUNIT,
    VAR_SOLN_PDS_NEW_IUNITS_REQD, VAR_SOLN_PDS_TOT_IUNITS_REQD,
    VAR_SOLN_REF_ANNUAL_WORLD_FIRST_COST, VAR_SOLN_REF_INSTALL_COST_PER_IUNIT,
    VAR_SOLN_REF_NEW_IUNITS_REQD, VAR_SOLN_REF_TOT_IUNITS_REQD,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirstCostParameters {
    pub pds_2014_cost: FloatValue,
    pub ref_2014_cost: FloatValue,
    pub conv_2014_cost: FloatValue,
    pub soln_first_cost_efficiency_rate: FloatValue,
    pub conv_first_cost_efficiency_rate: FloatValue,
    /// When false the solution never costs less than the conventional technology
    pub soln_first_cost_below_conv: bool,
    /// Growth in installed units over which the efficiency rate applies, 2 for doublings
    pub soln_first_cost_learning_rate: FloatValue,
    pub conv_first_cost_learning_rate: FloatValue,
    /// Converts the scenario's cost unit into the reported cost unit
    pub fc_convert_iunit_factor: FloatValue,
}

impl FirstCostParameters {
    pub fn from_controls(ac: &AdvancedControls) -> Self {
        Self {
            pds_2014_cost: ac.pds_2014_cost,
            ref_2014_cost: ac.ref_2014_cost,
            conv_2014_cost: ac.conv_2014_cost,
            soln_first_cost_efficiency_rate: ac.soln_first_cost_efficiency_rate,
            conv_first_cost_efficiency_rate: ac.conv_first_cost_efficiency_rate,
            soln_first_cost_below_conv: ac.soln_first_cost_below_conv,
            soln_first_cost_learning_rate: 2.0,
            conv_first_cost_learning_rate: 2.0,
            fc_convert_iunit_factor: 1.0,
        }
    }
}

/// Exponent `b` of the learning curve `cost = base * (units / initial_units)^b`
pub fn learning_exponent(efficiency_rate: FloatValue, learning_rate: FloatValue) -> FloatValue {
    (1.0 - efficiency_rate).ln() / learning_rate.ln()
}

#[derive(Debug, Clone)]
pub struct FirstCost {
    parameters: FirstCostParameters,
}

impl FirstCost {
    pub fn from_parameters(parameters: FirstCostParameters) -> Self {
        Self { parameters }
    }

    /// Cost per unit in every region, following World installed units
    pub fn calculate_install_cost(
        &self,
        base_cost: FloatValue,
        efficiency_rate: FloatValue,
        learning_rate: FloatValue,
        tot_iunits: &AnnualRegionalSeries,
    ) -> ModelResult<AnnualRegionalSeries> {
        let exponent = learning_exponent(efficiency_rate, learning_rate);
        let mut cost = AnnualRegionalSeries::filled(tot_iunits.years().iter().copied(), base_cost);
        let initial = match tot_iunits.first_year() {
            Some(first) => tot_iunits.get(first, Region::World)?,
            None => return Ok(cost),
        };

        for (year, units) in tot_iunits.column_pairs(Region::World) {
            let ratio = units / initial;
            let factor = if ratio.is_finite() && ratio > 0.0 && exponent.is_finite() {
                ratio.powf(exponent)
            } else {
                1.0
            };
            let value = base_cost * factor * self.parameters.fc_convert_iunit_factor;
            for region in Region::ALL {
                cost.set(year, region, value)?;
            }
        }
        Ok(cost)
    }

    pub fn calculate_soln_pds_install_cost(
        &self,
        tot_iunits: &AnnualRegionalSeries,
        conv_cost: &AnnualRegionalSeries,
    ) -> ModelResult<AnnualRegionalSeries> {
        let p = &self.parameters;
        let cost = self.calculate_install_cost(
            p.pds_2014_cost,
            p.soln_first_cost_efficiency_rate,
            p.soln_first_cost_learning_rate,
            tot_iunits,
        )?;
        self.floor_at_conv(cost, conv_cost)
    }

    pub fn calculate_soln_ref_install_cost(
        &self,
        tot_iunits: &AnnualRegionalSeries,
        conv_cost: &AnnualRegionalSeries,
    ) -> ModelResult<AnnualRegionalSeries> {
        let p = &self.parameters;
        let cost = self.calculate_install_cost(
            p.ref_2014_cost,
            p.soln_first_cost_efficiency_rate,
            p.soln_first_cost_learning_rate,
            tot_iunits,
        )?;
        self.floor_at_conv(cost, conv_cost)
    }

    pub fn calculate_conv_install_cost(
        &self,
        tot_iunits: &AnnualRegionalSeries,
    ) -> ModelResult<AnnualRegionalSeries> {
        let p = &self.parameters;
        self.calculate_install_cost(
            p.conv_2014_cost,
            p.conv_first_cost_efficiency_rate,
            p.conv_first_cost_learning_rate,
            tot_iunits,
        )
    }

    fn floor_at_conv(
        &self,
        cost: AnnualRegionalSeries,
        conv_cost: &AnnualRegionalSeries,
    ) -> ModelResult<AnnualRegionalSeries> {
        if self.parameters.soln_first_cost_below_conv {
            return Ok(cost);
        }
        cost.zip_with(conv_cost, "soln_first_cost_below_conv", FloatValue::max)
    }

    pub fn calculate_annual_first_cost(
        &self,
        new_iunits: &AnnualRegionalSeries,
        cost_per_iunit: &AnnualRegionalSeries,
    ) -> ModelResult<AnnualRegionalSeries> {
        new_iunits.zip_with(cost_per_iunit, "annual_world_first_cost", |n, c| n * c)
    }
}

impl Component for FirstCost {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            VAR_SOLN_PDS_TOT_IUNITS_REQD.as_input(),
            VAR_SOLN_REF_TOT_IUNITS_REQD.as_input(),
            VAR_CONV_REF_TOT_IUNITS.as_input(),
            VAR_SOLN_PDS_NEW_IUNITS_REQD.as_input(),
            VAR_SOLN_REF_NEW_IUNITS_REQD.as_input(),
            VAR_CONV_REF_NEW_IUNITS.as_input(),
            VAR_SOLN_PDS_INSTALL_COST_PER_IUNIT.as_output(),
            VAR_SOLN_REF_INSTALL_COST_PER_IUNIT.as_output(),
            VAR_CONV_REF_INSTALL_COST_PER_IUNIT.as_output(),
            VAR_SOLN_PDS_ANNUAL_WORLD_FIRST_COST.as_output(),
            VAR_SOLN_REF_ANNUAL_WORLD_FIRST_COST.as_output(),
            VAR_CONV_REF_ANNUAL_WORLD_FIRST_COST.as_output(),
            VAR_SOLN_PDS_CUMULATIVE_INSTALL.as_output(),
        ]
    }

    fn solve(&self, input_state: &InputState) -> ModelResult<OutputState> {
        let pds_tot = input_state.get_series(VAR_SOLN_PDS_TOT_IUNITS_REQD.name)?;
        let ref_tot = input_state.get_series(VAR_SOLN_REF_TOT_IUNITS_REQD.name)?;
        let conv_tot = input_state.get_series(VAR_CONV_REF_TOT_IUNITS.name)?;
        let pds_new = input_state.get_series(VAR_SOLN_PDS_NEW_IUNITS_REQD.name)?;
        let ref_new = input_state.get_series(VAR_SOLN_REF_NEW_IUNITS_REQD.name)?;
        let conv_new = input_state.get_series(VAR_CONV_REF_NEW_IUNITS.name)?;

        let conv_cost = self.calculate_conv_install_cost(conv_tot)?;
        let pds_cost = self.calculate_soln_pds_install_cost(pds_tot, &conv_cost)?;
        let ref_cost = self.calculate_soln_ref_install_cost(ref_tot, &conv_cost)?;

        let pds_annual = self.calculate_annual_first_cost(pds_new, &pds_cost)?;
        let ref_annual = self.calculate_annual_first_cost(ref_new, &ref_cost)?;
        let conv_annual = self.calculate_annual_first_cost(conv_new, &conv_cost)?;
        let cumulative = pds_annual.cumulative_sum();

        Ok(OutputState::from([
            (VAR_SOLN_PDS_INSTALL_COST_PER_IUNIT.name.to_string(), pds_cost.into()),
            (VAR_SOLN_REF_INSTALL_COST_PER_IUNIT.name.to_string(), ref_cost.into()),
            (VAR_CONV_REF_INSTALL_COST_PER_IUNIT.name.to_string(), conv_cost.into()),
            (VAR_SOLN_PDS_ANNUAL_WORLD_FIRST_COST.name.to_string(), pds_annual.into()),
            (VAR_SOLN_REF_ANNUAL_WORLD_FIRST_COST.name.to_string(), ref_annual.into()),
            (VAR_CONV_REF_ANNUAL_WORLD_FIRST_COST.name.to_string(), conv_annual.into()),
            (VAR_SOLN_PDS_CUMULATIVE_INSTALL.name.to_string(), cumulative.into()),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    fn parameters() -> FirstCostParameters {
        FirstCostParameters {
            pds_2014_cost: 100.0,
            ref_2014_cost: 100.0,
            conv_2014_cost: 80.0,
            soln_first_cost_efficiency_rate: 0.2,
            conv_first_cost_efficiency_rate: 0.0,
            soln_first_cost_below_conv: true,
            soln_first_cost_learning_rate: 2.0,
            conv_first_cost_learning_rate: 2.0,
            fc_convert_iunit_factor: 1.0,
        }
    }

    fn units(values: &[f64]) -> AnnualRegionalSeries {
        AnnualRegionalSeries::from_fn(2014..=(2014 + values.len() as i32 - 1), |year, _| {
            values[(year - 2014) as usize]
        })
    }

    #[test]
    fn test_learning_exponent() {
        assert_eq!(learning_exponent(0.0, 2.0), 0.0);
        assert!(is_close!(2.0f64.powf(learning_exponent(0.2, 2.0)), 0.8));
    }

    #[test]
    fn test_cost_falls_per_doubling() {
        let fc = FirstCost::from_parameters(parameters());
        let cost = fc
            .calculate_install_cost(100.0, 0.2, 2.0, &units(&[10.0, 20.0, 40.0]))
            .unwrap();
        assert!(is_close!(cost.get(2015, Region::World).unwrap(), 80.0));
        assert!(is_close!(cost.get(2016, Region::World).unwrap(), 64.0));
        assert!(is_close!(cost.get(2016, Region::India).unwrap(), 64.0));
    }

    #[test]
    fn test_degenerate_ratios_keep_base_cost() {
        let fc = FirstCost::from_parameters(parameters());
        let cost = fc
            .calculate_install_cost(100.0, 0.2, 2.0, &units(&[0.0, 20.0, f64::NAN]))
            .unwrap();
        assert_eq!(cost.column(Region::World).to_vec(), vec![100.0, 100.0, 100.0]);
    }

    #[test]
    fn test_floor_at_conventional_cost() {
        let mut p = parameters();
        p.soln_first_cost_below_conv = false;
        let fc = FirstCost::from_parameters(p);
        let conv = fc.calculate_conv_install_cost(&units(&[1.0, 1.0, 1.0])).unwrap();
        let pds = fc
            .calculate_soln_pds_install_cost(&units(&[10.0, 20.0, 40.0]), &conv)
            .unwrap();
        assert!(is_close!(pds.get(2015, Region::World).unwrap(), 80.0));
        assert!(is_close!(pds.get(2016, Region::World).unwrap(), 80.0));
    }

    #[test]
    fn test_solve() {
        let fc = FirstCost::from_parameters(parameters());
        let tot: drawdown_core::component::StateValue = units(&[10.0, 20.0, 40.0]).into();
        let new: drawdown_core::component::StateValue = units(&[0.0, 10.0, 20.0]).into();
        let input_state = InputState::build(vec![
            (VAR_SOLN_PDS_TOT_IUNITS_REQD.name, &tot),
            (VAR_SOLN_REF_TOT_IUNITS_REQD.name, &tot),
            (VAR_CONV_REF_TOT_IUNITS.name, &tot),
            (VAR_SOLN_PDS_NEW_IUNITS_REQD.name, &new),
            (VAR_SOLN_REF_NEW_IUNITS_REQD.name, &new),
            (VAR_CONV_REF_NEW_IUNITS.name, &new),
        ]);
        let output = fc.solve(&input_state).unwrap();
        let annual = output[VAR_SOLN_PDS_ANNUAL_WORLD_FIRST_COST.name]
            .as_series()
            .unwrap();
        assert!(is_close!(annual.get(2016, Region::Usa).unwrap(), 20.0 * 64.0));

        let cumulative = output[VAR_SOLN_PDS_CUMULATIVE_INSTALL.name]
            .as_series()
            .unwrap();
        assert!(is_close!(
            cumulative.get(2016, Region::World).unwrap(),
            800.0 + 1280.0
        ));

        let conv = output[VAR_CONV_REF_ANNUAL_WORLD_FIRST_COST.name]
            .as_series()
            .unwrap();
        assert!(is_close!(conv.get(2015, Region::World).unwrap(), 800.0));
    }
}
