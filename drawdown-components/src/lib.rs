//! Stages of a climate-solution projection
//!
//! Each stage implements [`drawdown_core::component::Component`] and is wired into a
//! [`drawdown_core::model::Model`] by a solution definition. Stages are grouped by what they
//! compute:
//! - market size and adoption: [`components::Tam`], [`components::AdoptionData`],
//!   [`components::CustomAdoption`], [`components::HelperTables`]
//! - installed units: [`components::UnitAdoption`]
//! - costs: [`components::FirstCost`], [`components::OperatingCost`]
//! - emissions: [`components::EmissionsFactors`], [`components::CH4Calcs`],
//!   [`components::CO2Calcs`]

pub mod components;
