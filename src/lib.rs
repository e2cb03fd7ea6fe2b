//! `airvision` library crate.
//!
//! The binary (`aqi`) is a thin wrapper around this library so that:
//!
//! - the AQI engine is testable without spawning processes or touching the network
//! - the same report pipeline drives both the CLI and the TUI

pub mod app;
pub mod aqi;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
