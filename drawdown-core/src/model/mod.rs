//! A model consists of a series of coupled components which are solved together.
//!
//! The model orchestrates the passing of state between different components.
//! Each component is solved once, in an order determined by their dependencies, so that
//! every series a component reads has been produced before it is solved.
//!
//! The model also holds all of the exogenous variables required by the model.
//! The required variables are identified when building the model.
//! If a required exogenous variable isn't provided, then the build step will fail.

mod builder;
mod null_component;
mod runtime;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use builder::ModelBuilder;
pub use runtime::Model;
pub use types::{CGraph, C};
