//! Standard variable definitions
//!
//! Names and units of the series exchanged between the stages of a solution model.
//! Components declare their requirements using these constants so that producers and
//! consumers always agree on a name and unit.
//!
//! ```rust
//! use drawdown_core::standard_variables::VAR_REF_TAM;
//!
//! assert_eq!(VAR_REF_TAM.name, "ref_tam_per_region");
//! ```

use crate::component::RequirementDefinition;

pub const UNIT_FUNCTIONAL: &str = "functional unit";
pub const UNIT_IMPLEMENTATION: &str = "implementation unit";
pub const UNIT_MONEY: &str = "US$2014";
pub const UNIT_MONEY_PER_IUNIT: &str = "US$2014 / implementation unit";
pub const UNIT_TWH: &str = "TWh";
pub const UNIT_T_CO2EQ: &str = "t CO2-eq";
pub const UNIT_MMT_CO2EQ: &str = "Mt CO2-eq";
pub const UNIT_MMT_CO2: &str = "Mt CO2";
pub const UNIT_T_CH4: &str = "t CH4";
pub const UNIT_PPB: &str = "ppb";
pub const UNIT_CO2_PER_KWH: &str = "kg CO2 / kWh";
pub const UNIT_FLAG: &str = "flag";

/// A named variable with its unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardVariable {
    pub name: &'static str,
    pub unit: &'static str,
}

impl StandardVariable {
    pub const fn new(name: &'static str, unit: &'static str) -> Self {
        Self { name, unit }
    }

    pub fn as_input(&self) -> RequirementDefinition {
        RequirementDefinition::input(self.name, self.unit)
    }

    pub fn as_output(&self) -> RequirementDefinition {
        RequirementDefinition::output(self.name, self.unit)
    }
}

// Total addressable market
pub const VAR_REF_TAM: StandardVariable = StandardVariable::new("ref_tam_per_region", UNIT_FUNCTIONAL);
pub const VAR_PDS_TAM: StandardVariable = StandardVariable::new("pds_tam_per_region", UNIT_FUNCTIONAL);
pub const VAR_TAM_FORECAST: StandardVariable =
    StandardVariable::new("forecast_data_per_region", UNIT_FUNCTIONAL);

// Adoption
pub const VAR_ADOPTION_DATA: StandardVariable =
    StandardVariable::new("adoption_data_per_region", UNIT_FUNCTIONAL);
pub const VAR_ADOPTION_TREND: StandardVariable =
    StandardVariable::new("adoption_trend_per_region", UNIT_FUNCTIONAL);
pub const VAR_ADOPTION_IS_SINGLE_SOURCE: StandardVariable =
    StandardVariable::new("adoption_is_single_source", UNIT_FLAG);
pub const VAR_REF_ADOPTION_CUSTOM: StandardVariable =
    StandardVariable::new("ref_adoption_custom_per_region", UNIT_FUNCTIONAL);
pub const VAR_SOLN_REF_FUNITS_ADOPTED: StandardVariable =
    StandardVariable::new("soln_ref_funits_adopted", UNIT_FUNCTIONAL);
pub const VAR_SOLN_PDS_FUNITS_ADOPTED: StandardVariable =
    StandardVariable::new("soln_pds_funits_adopted", UNIT_FUNCTIONAL);

// Unit adoption
pub const VAR_SOLN_REF_TOT_IUNITS_REQD: StandardVariable =
    StandardVariable::new("soln_ref_tot_iunits_reqd", UNIT_IMPLEMENTATION);
pub const VAR_SOLN_PDS_TOT_IUNITS_REQD: StandardVariable =
    StandardVariable::new("soln_pds_tot_iunits_reqd", UNIT_IMPLEMENTATION);
pub const VAR_CONV_REF_TOT_IUNITS: StandardVariable =
    StandardVariable::new("conv_ref_tot_iunits", UNIT_IMPLEMENTATION);
pub const VAR_CONV_REF_ANNUAL_TOT_IUNITS: StandardVariable =
    StandardVariable::new("conv_ref_annual_tot_iunits", UNIT_IMPLEMENTATION);
pub const VAR_SOLN_NET_ANNUAL_FUNITS_ADOPTED: StandardVariable =
    StandardVariable::new("soln_net_annual_funits_adopted", UNIT_FUNCTIONAL);
pub const VAR_SOLN_PDS_NEW_IUNITS_REQD: StandardVariable =
    StandardVariable::new("soln_pds_new_iunits_reqd", UNIT_IMPLEMENTATION);
pub const VAR_SOLN_REF_NEW_IUNITS_REQD: StandardVariable =
    StandardVariable::new("soln_ref_new_iunits_reqd", UNIT_IMPLEMENTATION);
pub const VAR_CONV_REF_NEW_IUNITS: StandardVariable =
    StandardVariable::new("conv_ref_new_iunits", UNIT_IMPLEMENTATION);
pub const VAR_SOLN_PDS_CUMULATIVE_IUNITS: StandardVariable =
    StandardVariable::new("soln_pds_cumulative_iunits", UNIT_IMPLEMENTATION);
pub const VAR_SOLN_PDS_NET_GRID_ELECTRICITY_UNITS_SAVED: StandardVariable =
    StandardVariable::new("soln_pds_net_grid_electricity_units_saved", UNIT_TWH);
pub const VAR_SOLN_PDS_NET_GRID_ELECTRICITY_UNITS_USED: StandardVariable =
    StandardVariable::new("soln_pds_net_grid_electricity_units_used", UNIT_TWH);
pub const VAR_SOLN_PDS_DIRECT_CO2_EMISSIONS_SAVED: StandardVariable =
    StandardVariable::new("soln_pds_direct_co2_emissions_saved", UNIT_T_CO2EQ);
pub const VAR_SOLN_PDS_DIRECT_CH4_CO2_EMISSIONS_SAVED: StandardVariable =
    StandardVariable::new("soln_pds_direct_ch4_co2_emissions_saved", UNIT_T_CO2EQ);
pub const VAR_SOLN_PDS_DIRECT_N2O_CO2_EMISSIONS_SAVED: StandardVariable =
    StandardVariable::new("soln_pds_direct_n2o_co2_emissions_saved", UNIT_T_CO2EQ);

// First cost
pub const VAR_SOLN_PDS_INSTALL_COST_PER_IUNIT: StandardVariable =
    StandardVariable::new("soln_pds_install_cost_per_iunit", UNIT_MONEY_PER_IUNIT);
pub const VAR_SOLN_REF_INSTALL_COST_PER_IUNIT: StandardVariable =
    StandardVariable::new("soln_ref_install_cost_per_iunit", UNIT_MONEY_PER_IUNIT);
pub const VAR_CONV_REF_INSTALL_COST_PER_IUNIT: StandardVariable =
    StandardVariable::new("conv_ref_install_cost_per_iunit", UNIT_MONEY_PER_IUNIT);
pub const VAR_SOLN_PDS_ANNUAL_WORLD_FIRST_COST: StandardVariable =
    StandardVariable::new("soln_pds_annual_world_first_cost", UNIT_MONEY);
pub const VAR_SOLN_REF_ANNUAL_WORLD_FIRST_COST: StandardVariable =
    StandardVariable::new("soln_ref_annual_world_first_cost", UNIT_MONEY);
pub const VAR_CONV_REF_ANNUAL_WORLD_FIRST_COST: StandardVariable =
    StandardVariable::new("conv_ref_annual_world_first_cost", UNIT_MONEY);
pub const VAR_SOLN_PDS_CUMULATIVE_INSTALL: StandardVariable =
    StandardVariable::new("soln_pds_cumulative_install", UNIT_MONEY);

// Operating cost
pub const VAR_SOLN_PDS_ANNUAL_OPERATING_COST: StandardVariable =
    StandardVariable::new("soln_pds_annual_operating_cost", UNIT_MONEY);
pub const VAR_CONV_REF_ANNUAL_OPERATING_COST: StandardVariable =
    StandardVariable::new("conv_ref_annual_operating_cost", UNIT_MONEY);
pub const VAR_MARGINAL_ANNUAL_OPERATING_COST: StandardVariable =
    StandardVariable::new("marginal_annual_operating_cost", UNIT_MONEY);
pub const VAR_SOLN_PDS_LIFETIME_OPERATING_COST: StandardVariable =
    StandardVariable::new("soln_pds_lifetime_operating_cost", UNIT_MONEY);
pub const VAR_CONV_REF_LIFETIME_OPERATING_COST: StandardVariable =
    StandardVariable::new("conv_ref_lifetime_operating_cost", UNIT_MONEY);

// Emissions
pub const VAR_CONV_REF_GRID_CO2_PER_KWH: StandardVariable =
    StandardVariable::new("conv_ref_grid_CO2_per_KWh", UNIT_CO2_PER_KWH);
pub const VAR_CONV_REF_GRID_CO2EQ_PER_KWH: StandardVariable =
    StandardVariable::new("conv_ref_grid_CO2eq_per_KWh", UNIT_CO2_PER_KWH);
pub const VAR_CH4_TONS_REDUCED: StandardVariable =
    StandardVariable::new("ch4_tons_reduced", UNIT_T_CH4);
pub const VAR_CH4_CO2EQ_TONS_REDUCED: StandardVariable =
    StandardVariable::new("ch4_co2eq_tons_reduced", UNIT_T_CO2EQ);
pub const VAR_CH4_PPB: StandardVariable = StandardVariable::new("ch4_ppb_calculator", UNIT_PPB);
pub const VAR_CO2EQ_MMT_REDUCED: StandardVariable =
    StandardVariable::new("co2eq_mmt_reduced", UNIT_MMT_CO2EQ);
pub const VAR_CO2_MMT_REDUCED: StandardVariable =
    StandardVariable::new("co2_mmt_reduced", UNIT_MMT_CO2);
pub const VAR_N2O_CO2EQ_REDUCED: StandardVariable =
    StandardVariable::new("n2o_co2eq_reduced", UNIT_MMT_CO2EQ);
pub const VAR_CO2EQ_REDUCED_GRID_EMISSIONS: StandardVariable =
    StandardVariable::new("co2eq_reduced_grid_emissions", UNIT_MMT_CO2EQ);
pub const VAR_CO2EQ_INCREASED_GRID_USAGE_EMISSIONS: StandardVariable =
    StandardVariable::new("co2eq_increased_grid_usage_emissions", UNIT_MMT_CO2EQ);
pub const VAR_CO2EQ_DIRECT_REDUCED_EMISSIONS: StandardVariable =
    StandardVariable::new("co2eq_direct_reduced_emissions", UNIT_MMT_CO2EQ);
pub const VAR_CO2EQ_REDUCED_FUEL_EMISSIONS: StandardVariable =
    StandardVariable::new("co2eq_reduced_fuel_emissions", UNIT_MMT_CO2EQ);
pub const VAR_CO2EQ_NET_INDIRECT_EMISSIONS: StandardVariable =
    StandardVariable::new("co2eq_net_indirect_emissions", UNIT_MMT_CO2EQ);
