//! Recycled Paper
//!
//! Paper produced from recovered fibre rather than virgin pulp. The implementation unit is
//! a million tonnes of recycled paper produced per year and the functional unit a million
//! tonnes of paper produced per year, so one implementation unit delivers one functional unit.
//!
//! The solution's data lives in `data/recycledpaper/`:
//!
//! * `scenarios.toml` : the scenario registry
//! * `tam_sources.toml`, `ad_sources.toml` : TAM and adoption prognostication catalogs
//! * `ca_pds_sources.toml` : hand-built PDS adoption scenarios

use super::{data_dir, load_catalog, load_custom_adoption_sources, load_scenarios, SolutionUnits};
use drawdown_components::components::{
    AdoptionData, AdoptionDataParameters, CH4Calcs, CH4CalcsParameters, CO2Calcs,
    CO2CalcsParameters, CustomAdoption, CustomAdoptionParameters, EmissionsFactors,
    EmissionsFactorsParameters, FirstCost, FirstCostParameters, ForecastConfig, HelperTables,
    HelperTablesParameters, OperatingCost, OperatingCostParameters, Tam, TamColumnConfig,
    TamParameters, UnitAdoption, UnitAdoptionParameters,
};
use drawdown_core::errors::{ModelError, ModelResult};
use drawdown_core::loader::TableCache;
use drawdown_core::model::{Model, ModelBuilder, C};
use drawdown_core::region::Region;
use drawdown_core::scenario::{AdvancedControls, PdsAdoptionBasis};
use drawdown_core::series::{AnnualRegionalSeries, FloatValue, RegionalValues, Year};
use drawdown_core::standard_variables::{
    VAR_ADOPTION_DATA, VAR_ADOPTION_IS_SINGLE_SOURCE, VAR_ADOPTION_TREND, VAR_CO2EQ_MMT_REDUCED,
    VAR_CONV_REF_ANNUAL_WORLD_FIRST_COST, VAR_MARGINAL_ANNUAL_OPERATING_COST, VAR_PDS_TAM,
    VAR_REF_TAM, VAR_SOLN_PDS_ANNUAL_OPERATING_COST, VAR_SOLN_PDS_ANNUAL_WORLD_FIRST_COST,
    VAR_SOLN_PDS_CUMULATIVE_IUNITS, VAR_SOLN_PDS_FUNITS_ADOPTED, VAR_SOLN_PDS_TOT_IUNITS_REQD,
    VAR_SOLN_REF_ANNUAL_WORLD_FIRST_COST, VAR_SOLN_REF_FUNITS_ADOPTED,
};
use drawdown_core::trend::{Growth, TrendKind};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub const NAME: &str = "Recycled Paper";

pub const UNITS: SolutionUnits = SolutionUnits {
    implementation_unit: "Million Metric Tonnes of Recycled Paper Produced",
    functional_unit: "Million Metric Tonnes of Paper Produced",
    first_cost: "US$B",
    operating_cost: "US$B",
};

/// Scenario used when none is requested
pub const DEFAULT_SCENARIO: &str = "PDS1-67p2050-Low Growth (Book Ed.1)";

/// Years covered by the TAM and adoption prognostications
const FIRST_YEAR: Year = 2012;
const LAST_YEAR: Year = 2060;
/// Years of the adoption datapoints
const INITIAL_YEAR: Year = 2014;
const FINAL_YEAR: Year = 2050;

/// Recycled paper produced in 2014, Mt
const ADOPTION_2014: [f64; 10] = [207.0, 125.0, 6.3, 78.0, 2.75, 12.21, 44.0, 3.0, 69.0, 46.5];

/// The displaced conventional emissions and the solution's own emissions are both counted
const DOUBLE_COUNT_ADJUSTMENT: bool = true;
const FUEL_IN_LITERS: bool = false;

fn tam_parameters(ac: &AdvancedControls) -> TamParameters {
    let medium = |trend| ForecastConfig::new(trend, Growth::Medium);
    let regions = Region::ALL
        .into_iter()
        .filter(|region| *region != Region::World)
        .map(|region| {
            let trend = match region {
                Region::Usa => TrendKind::Degree2,
                _ => TrendKind::Degree3,
            };
            let config = TamColumnConfig {
                source_until_2014: "ALL SOURCES".to_string(),
                source_after_2014: "ALL SOURCES".to_string(),
                forecast: medium(trend),
            };
            (region, config)
        })
        .collect();

    TamParameters {
        world: TamColumnConfig {
            source_until_2014: ac.source_until_2014.clone(),
            source_after_2014: ac.ref_source_post_2014.clone(),
            forecast: medium(TrendKind::Degree3),
        },
        pds_world: TamColumnConfig {
            source_until_2014: ac.source_until_2014.clone(),
            source_after_2014: ac.pds_source_post_2014.clone(),
            forecast: medium(TrendKind::Degree3),
        },
        regions,
        world_includes_regional: true,
        first_year: FIRST_YEAR,
        last_year: LAST_YEAR,
    }
}

fn adoption_data_parameters(ac: &AdvancedControls) -> ModelResult<AdoptionDataParameters> {
    let missing = |field| ModelError::invalid(field, "required for existing prognostications");
    let source = ac
        .soln_pds_adoption_prognostication_source
        .clone()
        .ok_or_else(|| missing("soln_pds_adoption_prognostication_source"))?;
    let trend = ac
        .soln_pds_adoption_prognostication_trend
        .ok_or_else(|| missing("soln_pds_adoption_prognostication_trend"))?;
    let growth = ac
        .soln_pds_adoption_prognostication_growth
        .ok_or_else(|| missing("soln_pds_adoption_prognostication_growth"))?;

    Ok(AdoptionDataParameters {
        source,
        world: ForecastConfig::new(trend, growth),
        regions: Region::ALL
            .into_iter()
            .filter(|region| *region != Region::World)
            .map(|region| (region, ForecastConfig::new(TrendKind::Degree3, Growth::Medium)))
            .collect(),
        first_year: FIRST_YEAR,
        last_year: LAST_YEAR,
    })
}

fn helper_tables_parameters(ac: &AdvancedControls) -> HelperTablesParameters {
    let initial = RegionalValues::from_array(ADOPTION_2014);
    HelperTablesParameters {
        initial_year: INITIAL_YEAR,
        final_year: FINAL_YEAR,
        report_end_year: ac.report_end_year,
        ref_adoption_initial: initial,
        pds_adoption_initial: initial,
        pds_adoption_final_percentage: ac.pds_final_percentage(),
        ref_adoption_basis: ac.soln_ref_adoption_basis,
        ref_adoption_regional_data: ac.soln_ref_adoption_regional_data,
        pds_adoption_regional_data: ac.soln_pds_adoption_regional_data,
    }
}

/// A solved Recycled Paper scenario
#[derive(Debug)]
pub struct RecycledPaper {
    scenario: String,
    controls: Arc<AdvancedControls>,
    model: Model,
    is_single_source: Option<bool>,
}

impl RecycledPaper {
    /// Solve a scenario from the data shipped with the crate, sharing the process-wide cache
    ///
    /// `None` selects the default scenario.
    pub fn new(scenario: Option<&str>) -> ModelResult<Self> {
        Self::from_data_dir(&data_dir("recycledpaper"), scenario, TableCache::global())
    }

    /// Solve a scenario from the files in `dir`
    pub fn from_data_dir(
        dir: &Path,
        scenario: Option<&str>,
        cache: Arc<TableCache>,
    ) -> ModelResult<Self> {
        let registry = load_scenarios(&dir.join("scenarios.toml"))?;
        let scenario = scenario
            .or(registry.default_name())
            .unwrap_or(DEFAULT_SCENARIO)
            .to_string();
        let controls = registry.get(&scenario)?;
        info!(solution = NAME, scenario = %scenario, "building solution model");

        let tam_catalog = load_catalog(&dir.join("tam_sources.toml"))?;
        let ac = controls.as_ref();

        let adoption: C = match ac.soln_pds_adoption_basis {
            PdsAdoptionBasis::FullyCustomized => {
                let name = ac.soln_pds_adoption_custom_name.clone().ok_or_else(|| {
                    ModelError::invalid(
                        "soln_pds_adoption_custom_name",
                        "required for a fully customized PDS",
                    )
                })?;
                debug!(basis = %ac.soln_pds_adoption_basis, name = %name, "custom PDS adoption");
                let sources = load_custom_adoption_sources(&dir.join("ca_pds_sources.toml"))?;
                Arc::new(CustomAdoption::from_parameters(
                    CustomAdoptionParameters { name, sources },
                    cache.clone(),
                ))
            }
            PdsAdoptionBasis::ExistingPrognostications => {
                debug!(basis = %ac.soln_pds_adoption_basis, "prognosticated PDS adoption");
                Arc::new(AdoptionData::from_parameters(
                    adoption_data_parameters(ac)?,
                    load_catalog(&dir.join("ad_sources.toml"))?,
                    cache.clone(),
                ))
            }
        };

        let mut model = ModelBuilder::new()
            .with_component(Arc::new(Tam::from_parameters(
                tam_parameters(ac),
                tam_catalog.clone(),
                tam_catalog,
                cache.clone(),
            )))
            .with_component(adoption)
            .with_component(Arc::new(HelperTables::from_parameters(
                helper_tables_parameters(ac),
            )))
            .with_component(Arc::new(UnitAdoption::from_parameters(
                UnitAdoptionParameters::from_controls(ac, DOUBLE_COUNT_ADJUSTMENT),
            )))
            .with_component(Arc::new(FirstCost::from_parameters(
                FirstCostParameters::from_controls(ac),
            )))
            .with_component(Arc::new(OperatingCost::from_parameters(
                OperatingCostParameters::from_controls(ac),
            )))
            .with_component(Arc::new(EmissionsFactors::from_parameters(
                EmissionsFactorsParameters::from_controls(ac, FIRST_YEAR, LAST_YEAR),
            )))
            .with_component(Arc::new(CH4Calcs::from_parameters(
                CH4CalcsParameters::from_controls(ac),
            )))
            .with_component(Arc::new(CO2Calcs::from_parameters(
                CO2CalcsParameters::from_controls(ac, FUEL_IN_LITERS),
            )))
            .build()?;
        model.run()?;

        let is_single_source = match ac.soln_pds_adoption_basis {
            PdsAdoptionBasis::FullyCustomized => None,
            PdsAdoptionBasis::ExistingPrognostications => {
                model.get_flag(VAR_ADOPTION_IS_SINGLE_SOURCE.name)?
            }
        };

        Ok(Self {
            scenario,
            controls,
            model,
            is_single_source,
        })
    }

    pub fn name(&self) -> &'static str {
        NAME
    }

    pub fn units(&self) -> SolutionUnits {
        UNITS
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    pub fn controls(&self) -> &AdvancedControls {
        &self.controls
    }

    /// Whether the PDS adoption came from a single named prognostication
    ///
    /// `None` when the adoption is fully customized.
    pub fn adoption_is_single_source(&self) -> Option<bool> {
        self.is_single_source
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Any series produced while solving, by variable name
    pub fn series(&self, name: &str) -> ModelResult<&AnnualRegionalSeries> {
        self.model.get_series(name)
    }

    pub fn ref_tam_per_region(&self) -> ModelResult<&AnnualRegionalSeries> {
        self.series(VAR_REF_TAM.name)
    }

    /// World reference market size in 2014, the total demand the solution is measured against
    pub fn total_energy_demand(&self) -> ModelResult<FloatValue> {
        self.ref_tam_per_region()?.get(INITIAL_YEAR, Region::World)
    }

    pub fn pds_tam_per_region(&self) -> ModelResult<&AnnualRegionalSeries> {
        self.series(VAR_PDS_TAM.name)
    }

    pub fn adoption_data_per_region(&self) -> ModelResult<&AnnualRegionalSeries> {
        self.series(VAR_ADOPTION_DATA.name)
    }

    pub fn adoption_trend_per_region(&self) -> ModelResult<&AnnualRegionalSeries> {
        self.series(VAR_ADOPTION_TREND.name)
    }

    pub fn soln_ref_funits_adopted(&self) -> ModelResult<&AnnualRegionalSeries> {
        self.series(VAR_SOLN_REF_FUNITS_ADOPTED.name)
    }

    pub fn soln_pds_funits_adopted(&self) -> ModelResult<&AnnualRegionalSeries> {
        self.series(VAR_SOLN_PDS_FUNITS_ADOPTED.name)
    }

    pub fn soln_pds_tot_iunits_reqd(&self) -> ModelResult<&AnnualRegionalSeries> {
        self.series(VAR_SOLN_PDS_TOT_IUNITS_REQD.name)
    }

    pub fn soln_pds_cumulative_iunits(&self) -> ModelResult<&AnnualRegionalSeries> {
        self.series(VAR_SOLN_PDS_CUMULATIVE_IUNITS.name)
    }

    pub fn soln_pds_annual_world_first_cost(&self) -> ModelResult<&AnnualRegionalSeries> {
        self.series(VAR_SOLN_PDS_ANNUAL_WORLD_FIRST_COST.name)
    }

    pub fn soln_ref_annual_world_first_cost(&self) -> ModelResult<&AnnualRegionalSeries> {
        self.series(VAR_SOLN_REF_ANNUAL_WORLD_FIRST_COST.name)
    }

    pub fn conv_ref_annual_world_first_cost(&self) -> ModelResult<&AnnualRegionalSeries> {
        self.series(VAR_CONV_REF_ANNUAL_WORLD_FIRST_COST.name)
    }

    pub fn soln_pds_annual_operating_cost(&self) -> ModelResult<&AnnualRegionalSeries> {
        self.series(VAR_SOLN_PDS_ANNUAL_OPERATING_COST.name)
    }

    pub fn marginal_annual_operating_cost(&self) -> ModelResult<&AnnualRegionalSeries> {
        self.series(VAR_MARGINAL_ANNUAL_OPERATING_COST.name)
    }

    pub fn co2eq_mmt_reduced(&self) -> ModelResult<&AnnualRegionalSeries> {
        self.series(VAR_CO2EQ_MMT_REDUCED.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawdown_core::scenario::ScenarioRegistry;

    fn shipped_registry() -> ScenarioRegistry {
        load_scenarios(&data_dir("recycledpaper").join("scenarios.toml")).unwrap()
    }

    #[test]
    fn shipped_scenarios_validate() {
        let registry = shipped_registry();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.default_name(), Some(DEFAULT_SCENARIO));
        let low = registry.get(DEFAULT_SCENARIO).unwrap();
        assert_eq!(
            low.soln_pds_adoption_basis,
            PdsAdoptionBasis::ExistingPrognostications
        );
        assert_eq!(low.soln_lifetime_replacement_rounded(), 1);
    }

    #[test]
    fn tam_columns_cover_every_region() {
        let ac = shipped_registry().get(DEFAULT_SCENARIO).unwrap();
        let parameters = tam_parameters(&ac);
        assert_eq!(parameters.regions.len(), Region::ALL.len() - 1);
        assert_eq!(parameters.regions[&Region::Usa].forecast.trend, TrendKind::Degree2);
        assert_eq!(parameters.world.source_after_2014, "Maximum Cases");
    }

    #[test]
    fn helper_tables_target_the_configured_share() {
        let registry = shipped_registry();
        let low = helper_tables_parameters(&registry.get(DEFAULT_SCENARIO).unwrap());
        let mean = helper_tables_parameters(&registry.get("PDS2-77p2050-Mean Growth (Book Ed.1)").unwrap());
        for region in Region::ALL {
            assert_eq!(low.pds_adoption_final_percentage[region], 0.67);
            assert_eq!(mean.pds_adoption_final_percentage[region], 0.77);
        }
    }

    #[test]
    fn prognostications_need_source_trend_and_growth() {
        let mut ac = (*shipped_registry().get(DEFAULT_SCENARIO).unwrap()).clone();
        ac.soln_pds_adoption_prognostication_growth = None;
        assert!(matches!(
            adoption_data_parameters(&ac),
            Err(ModelError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn shipped_catalogs_reference_existing_tables() {
        let dir = data_dir("recycledpaper");
        for catalog in ["tam_sources.toml", "ad_sources.toml"] {
            let catalog = load_catalog(&dir.join(catalog)).unwrap();
            for path in catalog.all_paths() {
                assert!(path.exists(), "{} is missing", path.display());
            }
        }
        for source in load_custom_adoption_sources(&dir.join("ca_pds_sources.toml")).unwrap() {
            assert!(source.path.exists(), "{} is missing", source.path.display());
        }
    }
}
