//! Command-line parsing for the `aqi` dashboard.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! engine, the provider client and the presentation code.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

pub const DEFAULT_CITY: &str = "San Francisco";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "aqi", version, about = "Air Quality Index dashboard (OpenWeatherMap-based)")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the current AQI, category and recommendation for a city.
    Current(CityArgs),
    /// Summarize and plot the AQI trend over the last few days, optionally exporting it.
    History(HistoryArgs),
    /// Compute the AQI for a single pollutant concentration (offline).
    Calc(CalcArgs),
    /// Print the breakpoint table used by the engine.
    Bands,
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying report pipeline as `aqi history`, but
    /// renders results in a terminal UI using Ratatui.
    Tui(TuiArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct CityArgs {
    /// City to look up (resolved through OpenWeatherMap geocoding).
    #[arg(short, long, default_value = DEFAULT_CITY)]
    pub city: String,
}

#[derive(Debug, Parser, Clone)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub city: CityArgs,

    /// Number of days of history to fetch.
    #[arg(short, long, default_value_t = 7, value_parser = clap::value_parser!(u32).range(1..))]
    pub days: u32,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the trend to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the full report to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct CalcArgs {
    /// Pollutant name (PM2.5, PM10, O3, CO; case and punctuation are ignored).
    pub pollutant: String,

    /// Concentration in table units (µg/m³ for PM, ppb for O3, ppm for CO).
    #[arg(allow_negative_numbers = true)]
    pub concentration: f64,
}

#[derive(Debug, Parser, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub city: CityArgs,

    /// Number of days of history to chart (1-30).
    #[arg(short, long, default_value_t = 7, value_parser = clap::value_parser!(u32).range(1..))]
    pub days: u32,

    /// Write logs to this file (the TUI owns the terminal).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
