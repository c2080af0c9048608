//! Integration tests for the model module.
//!
//! These tests verify the complete model building and execution workflow.

#[cfg(test)]
mod graph_validation;
