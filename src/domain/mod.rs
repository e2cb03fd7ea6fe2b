//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the pollutant identifier (`Pollutant`) and its unit conversions
//! - provider observations (`Location`, `Components`, `PollutionSample`)
//! - run configuration (`DashboardConfig`)

pub mod types;

pub use types::*;
