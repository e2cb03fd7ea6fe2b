//! AQI computation.
//!
//! - breakpoint tables per pollutant (`breakpoints`)
//! - concentration → index interpolation, categories and recommendations (`engine`)
//!
//! Everything here is a pure function over `'static` data and safe to call from
//! any thread.

pub mod breakpoints;
pub mod engine;

pub use breakpoints::*;
pub use engine::*;
