//! Data-source catalogs
//!
//! A catalog maps case labels (`Baseline Cases`, `Maximum Cases`, ...) to named source tables.
//! A region may carry its own catalog under a `Region: <name>` key which is used instead of
//! the global one when building that region's column.

use crate::errors::{ModelError, ModelResult};
use crate::region::Region;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

const ALL_SOURCES: &str = "ALL SOURCES";
const REGION_PREFIX: &str = "Region: ";

/// Which sources a configuration string selects
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceSelector {
    AllSources,
    /// Every source filed under a case label
    Case(String),
    /// A single named source
    Named(String),
}

impl SourceSelector {
    pub fn parse(selector: &str) -> Self {
        if selector == ALL_SOURCES {
            SourceSelector::AllSources
        } else if selector.ends_with(" Cases") {
            SourceSelector::Case(selector.to_string())
        } else {
            SourceSelector::Named(selector.to_string())
        }
    }

    pub fn is_single_source(&self) -> bool {
        matches!(self, SourceSelector::Named(_))
    }
}

impl fmt::Display for SourceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSelector::AllSources => f.write_str(ALL_SOURCES),
            SourceSelector::Case(name) | SourceSelector::Named(name) => f.write_str(name),
        }
    }
}

/// case label -> source name -> table path
pub type Cases = BTreeMap<String, BTreeMap<String, PathBuf>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSourceCatalog {
    global: Cases,
    regional: BTreeMap<Region, Cases>,
}

/// Raw catalog layout: either a case table or a `Region: <name>` table of cases
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogEntry {
    Case(BTreeMap<String, PathBuf>),
    Region(Cases),
}

impl DataSourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, case: &str, name: &str, path: impl Into<PathBuf>) -> Self {
        self.global
            .entry(case.to_string())
            .or_default()
            .insert(name.to_string(), path.into());
        self
    }

    pub fn with_regional_source(
        mut self,
        region: Region,
        case: &str,
        name: &str,
        path: impl Into<PathBuf>,
    ) -> Self {
        self.regional
            .entry(region)
            .or_default()
            .entry(case.to_string())
            .or_default()
            .insert(name.to_string(), path.into());
        self
    }

    /// Parse a catalog from TOML, resolving relative paths against `base_dir`
    ///
    /// ```toml
    /// ["Baseline Cases"]
    /// "Source A" = "tam_source_a.csv"
    ///
    /// ["Region: USA"."Baseline Cases"]
    /// "Source B" = "tam_source_b.csv"
    /// ```
    pub fn from_toml_str(contents: &str, base_dir: &Path) -> ModelResult<Self> {
        let raw: BTreeMap<String, CatalogEntry> =
            toml::from_str(contents).map_err(|e| ModelError::Parse(e.to_string()))?;

        let resolve = |sources: BTreeMap<String, PathBuf>| -> BTreeMap<String, PathBuf> {
            sources
                .into_iter()
                .map(|(name, path)| (name, base_dir.join(path)))
                .collect()
        };

        let mut catalog = Self::new();
        for (key, entry) in raw {
            match (key.strip_prefix(REGION_PREFIX), entry) {
                (Some(label), CatalogEntry::Region(cases)) => {
                    let region = Region::from_label(label)?;
                    let layer = catalog.regional.entry(region).or_default();
                    for (case, sources) in cases {
                        layer.insert(case, resolve(sources));
                    }
                }
                (None, CatalogEntry::Case(sources)) => {
                    catalog.global.insert(key, resolve(sources));
                }
                (_, _) => return Err(ModelError::unrecognized("data source catalog", key)),
            }
        }
        Ok(catalog)
    }

    /// Whether `region` has its own catalog
    pub fn has_regional_layer(&self, region: Region) -> bool {
        self.regional.contains_key(&region)
    }

    fn layer(&self, region: Region) -> &Cases {
        self.regional.get(&region).unwrap_or(&self.global)
    }

    /// Sources to use for a region under a selector
    ///
    /// The region's own catalog is consulted if it has one, otherwise the global one.
    /// A case label with no sources yields an empty list; a named source that cannot be
    /// found is an error.
    pub fn sources_for(
        &self,
        region: Region,
        selector: &SourceSelector,
    ) -> ModelResult<Vec<(String, PathBuf)>> {
        let layer = self.layer(region);
        let collect = |sources: &BTreeMap<String, PathBuf>| -> Vec<(String, PathBuf)> {
            sources
                .iter()
                .map(|(name, path)| (name.clone(), path.clone()))
                .collect()
        };

        match selector {
            SourceSelector::AllSources => Ok(layer.values().flat_map(collect).collect()),
            SourceSelector::Case(case) => Ok(layer.get(case).map(collect).unwrap_or_default()),
            SourceSelector::Named(name) => layer
                .values()
                .find_map(|sources| sources.get(name))
                .map(|path| vec![(name.clone(), path.clone())])
                .ok_or_else(|| ModelError::MissingDataSource {
                    selector: name.clone(),
                    region: region.to_string(),
                }),
        }
    }

    /// Every distinct table referenced by the catalog
    pub fn all_paths(&self) -> Vec<&Path> {
        let mut paths: Vec<&Path> = self
            .global
            .values()
            .chain(self.regional.values().flat_map(|cases| cases.values()))
            .flat_map(|sources| sources.values().map(|p| p.as_path()))
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.regional.is_empty()
    }
}

/// A user-supplied adoption series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomAdoptionSource {
    pub name: String,
    pub include: bool,
    pub path: PathBuf,
}
