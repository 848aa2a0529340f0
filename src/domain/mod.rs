//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - yearly observations and series (`YearValue`, `YearSeries`)
//! - reconciled rows and regression outputs (`ReconciledRow`, `RegressionResult`)
//! - the run configuration (`PipelineConfig`)

pub mod types;

pub use types::*;
