//! Adoption prognostications
//!
//! Candidate solution adoption per region, blended from the prognostication sources of a
//! data-source catalog. Every region uses the scenario's chosen source selector; World also
//! takes the scenario's trend and growth. A named source missing from a region's catalog
//! leaves that region absent.
//!
//! # Outputs
//!
//! * `adoption_data_per_region` : growth-adjusted per-year mean of the selected sources
//! * `adoption_trend_per_region` : trend fitted to that data
//! * `adoption_is_single_source` : whether the selector names a single source

use super::forecast::{load_source_columns, series_from_columns, ForecastConfig, SourceSummary};
use drawdown_core::component::{Component, InputState, OutputState, RequirementDefinition};
use drawdown_core::data_sources::{DataSourceCatalog, SourceSelector};
use drawdown_core::errors::ModelResult;
use drawdown_core::loader::TableCache;
use drawdown_core::region::Region;
use drawdown_core::series::{AnnualRegionalSeries, Year};
use drawdown_core::standard_variables::{
    VAR_ADOPTION_DATA, VAR_ADOPTION_IS_SINGLE_SOURCE, VAR_ADOPTION_TREND,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdoptionDataParameters {
    /// Source selector, e.g. `ALL SOURCES`, a case label or a source name
    pub source: String,
    pub world: ForecastConfig,
    /// Fit for regions other than World; regions without an entry are absent
    pub regions: BTreeMap<Region, ForecastConfig>,
    pub first_year: Year,
    pub last_year: Year,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdoptionTables {
    pub data: AnnualRegionalSeries,
    pub trend: AnnualRegionalSeries,
    pub is_single_source: bool,
}

#[derive(Debug, Clone)]
pub struct AdoptionData {
    parameters: AdoptionDataParameters,
    catalog: DataSourceCatalog,
    cache: Arc<TableCache>,
}

impl AdoptionData {
    pub fn from_parameters(
        parameters: AdoptionDataParameters,
        catalog: DataSourceCatalog,
        cache: Arc<TableCache>,
    ) -> Self {
        Self {
            parameters,
            catalog,
            cache,
        }
    }

    pub fn calculate_adoption(&self) -> ModelResult<AdoptionTables> {
        let (first, last) = (self.parameters.first_year, self.parameters.last_year);
        let selector = SourceSelector::parse(&self.parameters.source);

        let regional = self
            .parameters
            .regions
            .iter()
            .filter(|(region, _)| **region != Region::World)
            .map(|(region, config)| (*region, config));
        let columns = std::iter::once((Region::World, &self.parameters.world)).chain(regional);

        let mut data = BTreeMap::new();
        let mut trend = BTreeMap::new();
        for (region, config) in columns {
            let sources = load_source_columns(&self.cache, &self.catalog, region, &selector)?;
            let summary = SourceSummary::from_columns(&sources);
            data.insert(region, summary.adjusted_over(config, first, last));
            trend.insert(region, summary.trend(config, first, last));
        }

        Ok(AdoptionTables {
            data: series_from_columns(first, last, &data),
            trend: series_from_columns(first, last, &trend),
            is_single_source: selector.is_single_source(),
        })
    }
}

impl Component for AdoptionData {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            VAR_ADOPTION_DATA.as_output(),
            VAR_ADOPTION_TREND.as_output(),
            VAR_ADOPTION_IS_SINGLE_SOURCE.as_output(),
        ]
    }

    fn solve(&self, _input_state: &InputState) -> ModelResult<OutputState> {
        let tables = self.calculate_adoption()?;
        Ok(OutputState::from([
            (VAR_ADOPTION_DATA.name.to_string(), tables.data.into()),
            (VAR_ADOPTION_TREND.name.to_string(), tables.trend.into()),
            (
                VAR_ADOPTION_IS_SINGLE_SOURCE.name.to_string(),
                Some(tables.is_single_source).into(),
            ),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawdown_core::errors::ModelError;
    use drawdown_core::trend::{Growth, TrendKind};
    use is_close::is_close;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn write_table(dir: &Path, name: &str, scale: f64) -> PathBuf {
        let path = dir.join(name);
        let mut contents = String::from("Year,World,China,USA\n");
        for year in 2012..=2018 {
            let world = scale * (year - 2000) as f64;
            contents.push_str(&format!("{},{},{},{}\n", year, world, scale, scale));
        }
        fs::write(&path, contents).unwrap();
        path
    }

    fn adoption(dir: &Path, source: &str, growth: Growth) -> AdoptionData {
        let catalog = DataSourceCatalog::new()
            .with_source("Baseline Cases", "low", write_table(dir, "low.csv", 1.0))
            .with_source("Ambitious Cases", "high", write_table(dir, "high.csv", 3.0))
            .with_regional_source(
                Region::Usa,
                "Baseline Cases",
                "usa",
                write_table(dir, "usa.csv", 5.0),
            );
        let parameters = AdoptionDataParameters {
            source: source.to_string(),
            world: ForecastConfig::new(TrendKind::Linear, growth),
            regions: [Region::China, Region::Usa]
                .into_iter()
                .map(|r| (r, ForecastConfig::new(TrendKind::Linear, Growth::Medium)))
                .collect(),
            first_year: 2012,
            last_year: 2030,
        };
        AdoptionData::from_parameters(parameters, catalog, Arc::new(TableCache::new()))
    }

    #[test]
    fn test_all_sources_mean_and_trend() {
        let dir = TempDir::new().unwrap();
        let tables = adoption(dir.path(), "ALL SOURCES", Growth::Medium)
            .calculate_adoption()
            .unwrap();
        assert!(!tables.is_single_source);
        assert!(is_close!(tables.data.get(2014, Region::World).unwrap(), 28.0));
        assert!(tables.data.get(2020, Region::World).unwrap().is_nan());
        assert!(is_close!(tables.trend.get(2020, Region::World).unwrap(), 40.0));
        assert!(is_close!(tables.trend.get(2030, Region::China).unwrap(), 2.0));
        assert!(is_close!(tables.trend.get(2030, Region::Usa).unwrap(), 5.0));
        assert!(tables.trend.get(2030, Region::India).unwrap().is_nan());
    }

    #[test]
    fn test_low_growth_is_below_medium() {
        let dir = TempDir::new().unwrap();
        let medium = adoption(dir.path(), "ALL SOURCES", Growth::Medium)
            .calculate_adoption()
            .unwrap();
        let low = adoption(dir.path(), "ALL SOURCES", Growth::Low)
            .calculate_adoption()
            .unwrap();
        assert!(
            low.data.get(2016, Region::World).unwrap()
                < medium.data.get(2016, Region::World).unwrap()
        );
    }

    #[test]
    fn test_single_named_source() {
        let dir = TempDir::new().unwrap();
        let component = adoption(dir.path(), "high", Growth::Medium);
        let output = component.solve(&InputState::empty()).unwrap();
        assert_eq!(
            output[VAR_ADOPTION_IS_SINGLE_SOURCE.name].as_flag(),
            Some(Some(true))
        );
        let data = output[VAR_ADOPTION_DATA.name].as_series().unwrap();
        assert!(is_close!(data.get(2014, Region::World).unwrap(), 42.0));
        assert!(is_close!(data.get(2014, Region::China).unwrap(), 3.0));
        // the USA catalog has no source of that name
        assert!(data.get(2014, Region::Usa).unwrap().is_nan());
    }

    #[test]
    fn test_missing_world_source_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = adoption(dir.path(), "nowhere", Growth::Medium)
            .calculate_adoption()
            .unwrap_err();
        assert!(matches!(err, ModelError::MissingDataSource { .. }));
    }
}
