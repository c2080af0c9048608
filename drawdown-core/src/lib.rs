pub mod component;
pub mod data_sources;
pub mod errors;
pub mod loader;
pub mod model;
pub mod region;
pub mod scenario;
pub mod series;
pub mod series_collection;
pub mod standard_variables;
pub mod trend;
