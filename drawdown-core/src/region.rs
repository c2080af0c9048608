//! The fixed region set shared by every regional series.
//!
//! Regions are ordered; the order defines the column layout of
//! [`AnnualRegionalSeries`](crate::series::AnnualRegionalSeries).
//! The five main regions partition the world, while China, India, EU and USA
//! are special countries that overlap the main regions.

use crate::errors::{ModelError, ModelResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Number of columns in every regional series
pub const REGION_COUNT: usize = 10;

/// A reporting region
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    World = 0,
    Oecd90 = 1,
    EasternEurope = 2,
    AsiaSansJapan = 3,
    MiddleEastAndAfrica = 4,
    LatinAmerica = 5,
    China = 6,
    India = 7,
    Eu = 8,
    Usa = 9,
}

impl Region {
    /// All regions in column order
    pub const ALL: [Region; REGION_COUNT] = [
        Region::World,
        Region::Oecd90,
        Region::EasternEurope,
        Region::AsiaSansJapan,
        Region::MiddleEastAndAfrica,
        Region::LatinAmerica,
        Region::China,
        Region::India,
        Region::Eu,
        Region::Usa,
    ];

    /// Regions which partition the world
    pub const MAIN: [Region; 5] = [
        Region::Oecd90,
        Region::EasternEurope,
        Region::AsiaSansJapan,
        Region::MiddleEastAndAfrica,
        Region::LatinAmerica,
    ];

    /// Countries reported in addition to the main regions
    pub const SPECIAL: [Region; 4] = [Region::China, Region::India, Region::Eu, Region::Usa];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Region::World => "World",
            Region::Oecd90 => "OECD90",
            Region::EasternEurope => "Eastern Europe",
            Region::AsiaSansJapan => "Asia (Sans Japan)",
            Region::MiddleEastAndAfrica => "Middle East and Africa",
            Region::LatinAmerica => "Latin America",
            Region::China => "China",
            Region::India => "India",
            Region::Eu => "EU",
            Region::Usa => "USA",
        }
    }

    pub fn from_label(label: &str) -> ModelResult<Region> {
        Region::ALL
            .into_iter()
            .find(|r| r.label() == label.trim())
            .ok_or_else(|| ModelError::unrecognized("region", label))
    }

    pub fn is_main(self) -> bool {
        Region::MAIN.contains(&self)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<Region> for usize {
    fn from(r: Region) -> usize {
        r as usize
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Region {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Region::from_label(&label).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for region in Region::ALL {
            assert_eq!(Region::from_label(region.label()).unwrap(), region);
        }
    }

    #[test]
    fn column_order_matches_index() {
        for (i, region) in Region::ALL.iter().enumerate() {
            assert_eq!(region.index(), i);
        }
    }

    #[test]
    fn unknown_label() {
        assert!(matches!(
            Region::from_label("Antarctica"),
            Err(ModelError::UnrecognizedConfiguration { .. })
        ));
    }

    #[test]
    fn main_regions_exclude_world_and_countries() {
        assert!(!Region::World.is_main());
        assert!(!Region::China.is_main());
        assert!(Region::LatinAmerica.is_main());
    }
}
