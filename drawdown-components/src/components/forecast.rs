//! Shared handling of prognostication sources
//!
//! TAM and adoption-data stages both combine several candidate source tables into one
//! column per region: the per-year mean across sources, shifted by a multiple of the
//! per-year standard deviation for low or high growth, then smoothed with a fitted trend.

use drawdown_core::data_sources::{DataSourceCatalog, SourceSelector};
use drawdown_core::errors::{ModelError, ModelResult};
use drawdown_core::loader::{LoadCall, TableCache};
use drawdown_core::region::Region;
use drawdown_core::series::{AnnualRegionalSeries, FloatValue, Year};
use drawdown_core::trend::{fit_trend, Growth, TrendKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Trend and growth settings for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub trend: TrendKind,
    pub growth: Growth,
    pub low_sd_mult: FloatValue,
    pub high_sd_mult: FloatValue,
}

impl ForecastConfig {
    pub fn new(trend: TrendKind, growth: Growth) -> Self {
        Self {
            trend,
            growth,
            low_sd_mult: 1.0,
            high_sd_mult: 1.0,
        }
    }
}

/// One source's values for a single region
pub type SourceColumn = Vec<(Year, FloatValue)>;

/// Per-year statistics across a set of source columns
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSummary {
    pub years: Vec<Year>,
    pub mean: Vec<FloatValue>,
    /// Sample standard deviation, zero where fewer than two sources report
    pub sd: Vec<FloatValue>,
}

impl SourceSummary {
    pub fn from_columns(columns: &[SourceColumn]) -> Self {
        let mut by_year: BTreeMap<Year, Vec<FloatValue>> = BTreeMap::new();
        for column in columns {
            for (year, value) in column {
                let values = by_year.entry(*year).or_default();
                if !value.is_nan() {
                    values.push(*value);
                }
            }
        }

        let mut summary = Self {
            years: vec![],
            mean: vec![],
            sd: vec![],
        };
        for (year, values) in by_year {
            let n = values.len() as FloatValue;
            let mean = if values.is_empty() {
                FloatValue::NAN
            } else {
                values.iter().sum::<FloatValue>() / n
            };
            let sd = if values.len() < 2 {
                0.0
            } else {
                (values.iter().map(|v| (v - mean).powi(2)).sum::<FloatValue>() / (n - 1.0)).sqrt()
            };
            summary.years.push(year);
            summary.mean.push(mean);
            summary.sd.push(sd);
        }
        summary
    }

    pub fn is_empty(&self) -> bool {
        self.mean.iter().all(|v| v.is_nan())
    }

    /// Per-year values for the configured growth
    pub fn adjusted(&self, config: &ForecastConfig) -> SourceColumn {
        let shift = match config.growth {
            Growth::Low => -config.low_sd_mult,
            Growth::Medium => 0.0,
            Growth::High => config.high_sd_mult,
        };
        self.years
            .iter()
            .zip(self.mean.iter().zip(&self.sd))
            .map(|(year, (mean, sd))| (*year, mean + shift * sd))
            .collect()
    }

    /// Growth-adjusted values laid out over `first..=last`, NaN where no source reports
    pub fn adjusted_over(&self, config: &ForecastConfig, first: Year, last: Year) -> Vec<FloatValue> {
        let mut out = vec![FloatValue::NAN; span_len(first, last)];
        for (year, value) in self.adjusted(config) {
            if (first..=last).contains(&year) {
                out[(year - first) as usize] = value;
            }
        }
        out
    }

    /// Fitted trend of the growth-adjusted values over `first..=last`
    ///
    /// All-NaN when there is nothing to fit.
    pub fn trend(&self, config: &ForecastConfig, first: Year, last: Year) -> Vec<FloatValue> {
        fit_trend(&self.adjusted(config), config.trend, first..=last)
            .unwrap_or_else(|| vec![FloatValue::NAN; span_len(first, last)])
    }
}

fn span_len(first: Year, last: Year) -> usize {
    (last - first + 1).max(0) as usize
}

/// Assemble per-region columns laid out over `first..=last` into a series
///
/// Regions without a column are NaN.
pub(crate) fn series_from_columns(
    first: Year,
    last: Year,
    columns: &BTreeMap<Region, Vec<FloatValue>>,
) -> AnnualRegionalSeries {
    AnnualRegionalSeries::from_fn(first..=last, |year, region| {
        columns
            .get(&region)
            .and_then(|column| column.get((year - first) as usize))
            .copied()
            .unwrap_or(FloatValue::NAN)
    })
}

/// Load one region's column from every source the selector picks
///
/// For regions other than World a named source that the catalog does not carry is treated
/// as legitimately absent.
pub(crate) fn load_source_columns(
    cache: &TableCache,
    catalog: &DataSourceCatalog,
    region: Region,
    selector: &SourceSelector,
) -> ModelResult<Vec<SourceColumn>> {
    let sources = match catalog.sources_for(region, selector) {
        Ok(sources) => sources,
        Err(ModelError::MissingDataSource { .. }) if region != Region::World => {
            debug!(region = %region, selector = %selector, "no matching source for region");
            return Ok(vec![]);
        }
        Err(e) => return Err(e),
    };

    sources
        .iter()
        .map(|(name, path)| {
            debug!(region = %region, source = %name, "loading source");
            let table = cache.read_csv(&LoadCall::new(path.as_path()))?;
            Ok(table.column_pairs(region).collect())
        })
        .collect()
}
