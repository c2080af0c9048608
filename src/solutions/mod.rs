//! Solution definitions
//!
//! A solution ships its scenarios and data-source catalogs as files under `data/<solution>/`
//! and wires the stages of `drawdown-components` into a [`Model`](drawdown_core::model::Model).

pub mod recycled_paper;

use drawdown_core::data_sources::{CustomAdoptionSource, DataSourceCatalog};
use drawdown_core::errors::{ModelError, ModelResult};
use drawdown_core::scenario::ScenarioRegistry;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub use recycled_paper::RecycledPaper;

/// Units reported alongside a solution's results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolutionUnits {
    pub implementation_unit: &'static str,
    pub functional_unit: &'static str,
    pub first_cost: &'static str,
    pub operating_cost: &'static str,
}

/// Directory holding the data files shipped with a solution
pub fn data_dir(solution: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join(solution)
}

fn read_to_string(path: &Path) -> ModelResult<String> {
    fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub(crate) fn load_scenarios(path: &Path) -> ModelResult<ScenarioRegistry> {
    ScenarioRegistry::from_toml_str(&read_to_string(path)?)
}

/// Read a catalog, resolving its table paths against the catalog's directory
pub(crate) fn load_catalog(path: &Path) -> ModelResult<DataSourceCatalog> {
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    DataSourceCatalog::from_toml_str(&read_to_string(path)?, base_dir)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CustomAdoptionFile {
    #[serde(default)]
    sources: Vec<CustomAdoptionSource>,
}

/// Read a custom adoption list, resolving its table paths against the list's directory
pub(crate) fn load_custom_adoption_sources(path: &Path) -> ModelResult<Vec<CustomAdoptionSource>> {
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file: CustomAdoptionFile =
        toml::from_str(&read_to_string(path)?).map_err(|e| ModelError::Parse(e.to_string()))?;
    Ok(file
        .sources
        .into_iter()
        .map(|source| CustomAdoptionSource {
            path: base_dir.join(&source.path),
            ..source
        })
        .collect())
}
