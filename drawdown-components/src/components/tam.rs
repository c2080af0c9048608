//! Total addressable market
//!
//! Builds the reference and solution-path market size per region from the prognostication
//! sources in a data-source catalog. Each column averages the selected sources, years up to
//! 2014 from one selection and later years from another, then fits the configured trend.
//!
//! # Outputs
//!
//! * `ref_tam_per_region` : reference market size
//! * `pds_tam_per_region` : solution-path market size; only World differs from the reference
//! * `forecast_data_per_region` : growth-adjusted source means behind the reference trend

use super::forecast::{load_source_columns, series_from_columns, ForecastConfig, SourceSummary};
use drawdown_core::component::{Component, InputState, OutputState, RequirementDefinition};
use drawdown_core::data_sources::{DataSourceCatalog, SourceSelector};
use drawdown_core::errors::ModelResult;
use drawdown_core::loader::TableCache;
use drawdown_core::region::Region;
use drawdown_core::series::{AnnualRegionalSeries, FloatValue, Year};
use drawdown_core::standard_variables::{VAR_PDS_TAM, VAR_REF_TAM, VAR_TAM_FORECAST};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Last year taken from the `source_until_2014` selection
const SOURCE_SWITCH_YEAR: Year = 2014;

/// Source selection and fit for one TAM column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TamColumnConfig {
    pub source_until_2014: String,
    pub source_after_2014: String,
    #[serde(flatten)]
    pub forecast: ForecastConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TamParameters {
    pub world: TamColumnConfig,
    pub pds_world: TamColumnConfig,
    /// Columns other than World; regions without an entry are absent
    pub regions: BTreeMap<Region, TamColumnConfig>,
    /// Sum the main regions into World where no World source reports
    pub world_includes_regional: bool,
    pub first_year: Year,
    pub last_year: Year,
}

/// The three TAM tables
#[derive(Debug, Clone, PartialEq)]
pub struct TamTables {
    pub reference: AnnualRegionalSeries,
    pub pds: AnnualRegionalSeries,
    pub forecast: AnnualRegionalSeries,
}

#[derive(Debug, Clone)]
pub struct Tam {
    parameters: TamParameters,
    ref_catalog: DataSourceCatalog,
    pds_catalog: DataSourceCatalog,
    cache: Arc<TableCache>,
}

impl Tam {
    pub fn from_parameters(
        parameters: TamParameters,
        ref_catalog: DataSourceCatalog,
        pds_catalog: DataSourceCatalog,
        cache: Arc<TableCache>,
    ) -> Self {
        Self {
            parameters,
            ref_catalog,
            pds_catalog,
            cache,
        }
    }

    fn summarise(
        &self,
        catalog: &DataSourceCatalog,
        region: Region,
        config: &TamColumnConfig,
    ) -> ModelResult<SourceSummary> {
        let until = SourceSelector::parse(&config.source_until_2014);
        let after = SourceSelector::parse(&config.source_after_2014);

        let mut columns = vec![];
        for column in load_source_columns(&self.cache, catalog, region, &until)? {
            columns.push(
                column
                    .into_iter()
                    .filter(|(year, _)| *year <= SOURCE_SWITCH_YEAR)
                    .collect(),
            );
        }
        for column in load_source_columns(&self.cache, catalog, region, &after)? {
            columns.push(
                column
                    .into_iter()
                    .filter(|(year, _)| *year > SOURCE_SWITCH_YEAR)
                    .collect(),
            );
        }
        Ok(SourceSummary::from_columns(&columns))
    }

    /// Fitted trend and growth-adjusted source data for one column
    pub fn calculate_column(
        &self,
        catalog: &DataSourceCatalog,
        region: Region,
        config: &TamColumnConfig,
    ) -> ModelResult<(Vec<FloatValue>, Vec<FloatValue>)> {
        let (first, last) = (self.parameters.first_year, self.parameters.last_year);
        let summary = self.summarise(catalog, region, config)?;
        if summary.is_empty() {
            debug!(
                region = %region,
                regional_catalog = catalog.has_regional_layer(region),
                "no TAM data for region"
            );
        }
        Ok((
            summary.trend(&config.forecast, first, last),
            summary.adjusted_over(&config.forecast, first, last),
        ))
    }

    pub fn calculate_tam(&self) -> ModelResult<TamTables> {
        let (first, last) = (self.parameters.first_year, self.parameters.last_year);
        let mut trends = BTreeMap::new();
        let mut forecasts = BTreeMap::new();

        let regional = self
            .parameters
            .regions
            .iter()
            .filter(|(region, _)| **region != Region::World)
            .map(|(region, config)| (*region, config));
        for (region, config) in std::iter::once((Region::World, &self.parameters.world)).chain(regional)
        {
            let (trend, forecast) = self.calculate_column(&self.ref_catalog, region, config)?;
            trends.insert(region, trend);
            forecasts.insert(region, forecast);
        }

        let mut reference = series_from_columns(first, last, &trends);
        let forecast = series_from_columns(first, last, &forecasts);

        let (pds_world, _) =
            self.calculate_column(&self.pds_catalog, Region::World, &self.parameters.pds_world)?;
        trends.insert(Region::World, pds_world);
        let mut pds = series_from_columns(first, last, &trends);

        if self.parameters.world_includes_regional {
            reference.world_from_main_regions();
            pds.world_from_main_regions();
        }

        Ok(TamTables {
            reference,
            pds,
            forecast,
        })
    }
}

impl Component for Tam {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            VAR_REF_TAM.as_output(),
            VAR_PDS_TAM.as_output(),
            VAR_TAM_FORECAST.as_output(),
        ]
    }

    fn solve(&self, _input_state: &InputState) -> ModelResult<OutputState> {
        let tables = self.calculate_tam()?;
        Ok(OutputState::from([
            (VAR_REF_TAM.name.to_string(), tables.reference.into()),
            (VAR_PDS_TAM.name.to_string(), tables.pds.into()),
            (VAR_TAM_FORECAST.name.to_string(), tables.forecast.into()),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawdown_core::trend::{Growth, TrendKind};
    use is_close::is_close;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_table(dir: &Path, name: &str, world: impl Fn(Year) -> f64) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut contents = String::from("Year,World,OECD90,USA\n");
        for year in 2012..=2020 {
            contents.push_str(&format!("{},{},{},{}\n", year, world(year), 1.0, 0.5));
        }
        fs::write(&path, contents).unwrap();
        path
    }

    fn column(until: &str, after: &str) -> TamColumnConfig {
        TamColumnConfig {
            source_until_2014: until.to_string(),
            source_after_2014: after.to_string(),
            forecast: ForecastConfig::new(TrendKind::Linear, Growth::Medium),
        }
    }

    fn parameters() -> TamParameters {
        TamParameters {
            world: column("ALL SOURCES", "Baseline Cases"),
            pds_world: column("ALL SOURCES", "Ambitious Cases"),
            regions: BTreeMap::from([(Region::Usa, column("ALL SOURCES", "ALL SOURCES"))]),
            world_includes_regional: false,
            first_year: 2012,
            last_year: 2030,
        }
    }

    fn catalog(dir: &Path) -> DataSourceCatalog {
        DataSourceCatalog::new()
            .with_source(
                "Baseline Cases",
                "flat",
                write_table(dir, "flat.csv", |_| 100.0),
            )
            .with_source(
                "Ambitious Cases",
                "rising",
                write_table(dir, "rising.csv", |y| 100.0 + 10.0 * (y - 2012) as f64),
            )
    }

    #[test]
    fn test_reference_and_pds_world_differ() {
        let dir = TempDir::new().unwrap();
        let catalog = catalog(dir.path());
        let tam = Tam::from_parameters(
            parameters(),
            catalog.clone(),
            catalog,
            Arc::new(TableCache::new()),
        );
        let tables = tam.calculate_tam().unwrap();

        assert_eq!(tables.reference.years().first(), Some(&2012));
        assert_eq!(tables.reference.years().last(), Some(&2030));
        assert!(
            tables.pds.get(2030, Region::World).unwrap()
                > tables.reference.get(2030, Region::World).unwrap()
        );
        assert!(is_close!(tables.pds.get(2030, Region::Usa).unwrap(), 0.5));
        assert!(is_close!(
            tables.pds.get(2030, Region::Usa).unwrap(),
            tables.reference.get(2030, Region::Usa).unwrap()
        ));
    }

    #[test]
    fn test_unconfigured_regions_are_absent() {
        let dir = TempDir::new().unwrap();
        let catalog = catalog(dir.path());
        let tam = Tam::from_parameters(
            parameters(),
            catalog.clone(),
            catalog,
            Arc::new(TableCache::new()),
        );
        let tables = tam.calculate_tam().unwrap();
        assert!(tables.reference.get(2020, Region::China).unwrap().is_nan());
        assert!(tables.forecast.get(2025, Region::World).unwrap().is_nan());
        assert!(is_close!(tables.forecast.get(2016, Region::World).unwrap(), 100.0));
    }

    #[test]
    fn test_sources_are_loaded_once() {
        let dir = TempDir::new().unwrap();
        let catalog = catalog(dir.path());
        let cache = Arc::new(TableCache::new());
        let tam = Tam::from_parameters(parameters(), catalog.clone(), catalog, cache.clone());
        tam.solve(&InputState::empty()).unwrap();
        assert_eq!(cache.len(), 2);
        assert!(cache.hits() > 0);
    }

    #[test]
    fn test_world_from_regions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("regional.csv");
        let mut contents = String::from("Year,OECD90,Eastern Europe,Asia (Sans Japan)\n");
        for year in 2012..=2020 {
            contents.push_str(&format!("{},1.0,2.0,3.0\n", year));
        }
        fs::write(&path, contents).unwrap();
        let catalog = DataSourceCatalog::new().with_source("Baseline Cases", "regional", path);

        let mut parameters = parameters();
        parameters.world_includes_regional = true;
        parameters.regions = [Region::Oecd90, Region::EasternEurope, Region::AsiaSansJapan]
            .into_iter()
            .map(|r| (r, column("ALL SOURCES", "ALL SOURCES")))
            .collect();

        let tam = Tam::from_parameters(
            parameters,
            catalog.clone(),
            catalog,
            Arc::new(TableCache::new()),
        );
        let tables = tam.calculate_tam().unwrap();
        assert!(is_close!(tables.reference.get(2030, Region::World).unwrap(), 6.0));
    }
}
