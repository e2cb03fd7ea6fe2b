//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs the log subscriber
//! - runs the report pipeline (city -> coordinates -> pollution -> AQI)
//! - prints reports/plots
//! - writes optional exports

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use tracing::Level;

use crate::cli::{CalcArgs, CityArgs, Command, HistoryArgs, TuiArgs};
use crate::domain::DashboardConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `aqi` binary.
pub fn run() -> Result<(), AppError> {
    // `aqi` and `aqi -c Oslo` behave like `aqi tui ...`; clap needs the
    // subcommand name, so argv is rewritten before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Current(args) => {
            init_stderr_tracing(cli.verbose);
            handle_current(args)
        }
        Command::History(args) => {
            init_stderr_tracing(cli.verbose);
            handle_history(args)
        }
        Command::Calc(args) => {
            init_stderr_tracing(cli.verbose);
            handle_calc(args)
        }
        Command::Bands => {
            print!("{}", crate::report::format_bands());
            Ok(())
        }
        Command::Tui(args) => {
            if let Some(path) = &args.log_file {
                init_file_tracing(cli.verbose, path)?;
            }
            handle_tui(args)
        }
    }
}

fn handle_current(args: CityArgs) -> Result<(), AppError> {
    let client = crate::data::OwmClient::from_env()?;
    let (location, current) = pipeline::run_current_with(&client, &args.city)?;
    print!("{}", crate::report::format_current(&location, &current));
    Ok(())
}

fn handle_history(args: HistoryArgs) -> Result<(), AppError> {
    let config = config_from_history_args(&args);
    let report = pipeline::run_report(&config)?;

    println!("{}", crate::report::format_current(&report.location, &report.current));
    println!(
        "{}",
        crate::report::format_trend_summary(&report.summary, report.history_days)
    );

    if config.plot {
        let plot =
            crate::plot::render_trend_plot(&report.trend, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_csv {
        crate::io::write_trend_csv(path, &report.trend)?;
    }
    if let Some(path) = &config.export_json {
        crate::io::write_report_json(path, &report)?;
    }

    Ok(())
}

fn handle_calc(args: CalcArgs) -> Result<(), AppError> {
    print!("{}", crate::report::format_calc(&args.pollutant, args.concentration));
    Ok(())
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    crate::tui::run(config_from_tui_args(&args))
}

pub fn config_from_history_args(args: &HistoryArgs) -> DashboardConfig {
    DashboardConfig {
        city: args.city.city.clone(),
        history_days: args.days,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
    }
}

pub fn config_from_tui_args(args: &TuiArgs) -> DashboardConfig {
    DashboardConfig {
        city: args.city.city.clone(),
        history_days: args.days.clamp(1, crate::tui::MAX_DAYS),
        ..DashboardConfig::default()
    }
}

fn level_for(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn init_stderr_tracing(verbose: u8) {
    // `try_init` only fails if a subscriber is already set.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level_for(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Log to a file; the TUI owns stdout/stderr while it runs.
fn init_file_tracing(verbose: u8, path: &Path) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::config(format!("Failed to create log file '{}': {e}", path.display()))
    })?;
    let _ = tracing_subscriber::fmt()
        // At least INFO: a log file was explicitly requested.
        .with_max_level(level_for(verbose.max(1)))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

const SUBCOMMANDS: [&str; 5] = ["current", "history", "calc", "bands", "tui"];

/// Flags whose next token is a value, never a subcommand.
const VALUE_FLAGS: [&str; 6] = ["-c", "--city", "-d", "--days", "--log-file", "--export"];

/// Rewrite argv so `aqi` defaults to `aqi tui`.
///
/// Rules:
/// - `aqi`                      -> `aqi tui`
/// - `aqi -c Oslo ...`          -> `aqi tui -c Oslo ...`
/// - `aqi -v current`           -> unchanged (subcommand after global flags)
/// - `aqi --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if has_subcommand(&argv[1..]) {
        return argv;
    }

    // Only flags: treat them as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

fn has_subcommand(args: &[String]) -> bool {
    let mut tokens = args.iter();
    while let Some(token) = tokens.next() {
        if VALUE_FLAGS.contains(&token.as_str()) {
            tokens.next();
            continue;
        }
        if SUBCOMMANDS.contains(&token.as_str()) {
            return true;
        }
    }
    false
}
