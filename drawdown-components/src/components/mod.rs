mod adoption_data;
mod ch4_calcs;
mod co2_calcs;
mod custom_adoption;
pub mod emissions_factors;
pub mod first_cost;
pub mod forecast;
mod helper_tables;
pub mod operating_cost;
mod tam;
pub mod unit_adoption;

pub use adoption_data::{AdoptionData, AdoptionDataParameters, AdoptionTables};
pub use ch4_calcs::{CH4Calcs, CH4CalcsParameters, CH4_LIFETIME, CH4_TG_PER_PPB};
pub use co2_calcs::{CO2Calcs, CO2CalcsParameters};
pub use custom_adoption::{CustomAdoption, CustomAdoptionParameters};
pub use emissions_factors::{EmissionsFactors, EmissionsFactorsParameters};
pub use first_cost::{FirstCost, FirstCostParameters};
pub use forecast::ForecastConfig;
pub use helper_tables::{Datapoints, HelperTables, HelperTablesParameters};
pub use operating_cost::{OperatingCost, OperatingCostParameters};
pub use tam::{Tam, TamColumnConfig, TamParameters, TamTables};
pub use unit_adoption::{UnitAdoption, UnitAdoptionParameters};
