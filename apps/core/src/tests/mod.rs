//! Test Module
//!
//! Cross-module tests for the QueryLens core.
//!
//! ## Test Categories
//! - `brain_tests`: end-to-end scenarios and laws over `BatchAnalyzer`
//! - `actor_tests`: the analysis actor, fan-out parity and failure handling
//! - `integration_tests`: record files and environment through to a report

pub mod actor_tests;
pub mod integration_tests;
