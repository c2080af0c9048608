//! Regional adoption, cost and emissions projections for climate solutions
//!
//! A solution combines a scenario (its [`AdvancedControls`]) with the solution's
//! prognostication data and solves the projection stages of `drawdown-components`
//! as a single model:
//!
//! ```no_run
//! use drawdown::solutions::RecycledPaper;
//!
//! let solution = RecycledPaper::new(Some("PDS2-77p2050-Mean Growth (Book Ed.1)"))?;
//! let funits = solution.soln_pds_funits_adopted()?;
//! # Ok::<(), drawdown::ModelError>(())
//! ```
//!
//! Source tables are read through a shared [`TableCache`], so solving several scenarios of the
//! same solution reads each table once.

pub mod solutions;

pub use drawdown_core::errors::{ModelError, ModelResult};
pub use drawdown_core::loader::TableCache;
pub use drawdown_core::scenario::AdvancedControls;
pub use drawdown_core::series::AnnualRegionalSeries;
