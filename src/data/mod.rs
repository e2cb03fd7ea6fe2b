//! Provider data access.
//!
//! - configuration (`config`)
//! - OpenWeatherMap client and the `PollutionSource` seam (`openweather`)

pub mod config;
pub mod openweather;

pub use config::OwmConfig;
pub use openweather::{OwmClient, PollutionSource};
