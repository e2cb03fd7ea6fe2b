//! Input/output helpers.
//!
//! - trend CSV and report JSON exports (`export`)

pub mod export;

pub use export::*;
