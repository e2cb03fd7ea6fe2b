//! Export trend rows to CSV and full reports to JSON.
//!
//! The CSV is meant to be easy to consume in spreadsheets or downstream scripts;
//! the JSON is the complete `CityReport`.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app::pipeline::CityReport;
use crate::domain::Pollutant;
use crate::error::AppError;
use crate::report::Assessment;

const CSV_HEADER: &str = "timestamp,provider_index,aqi,category,dominant,pm2_5,pm10,o3,co";

/// Write one CSV row per trend point.
pub fn write_trend_csv(path: &Path, trend: &[Assessment]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::config(format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    writeln!(file, "{CSV_HEADER}")
        .map_err(|e| AppError::config(format!("Failed to write export CSV header: {e}")))?;

    for a in trend {
        writeln!(file, "{}", csv_row(a))
            .map_err(|e| AppError::config(format!("Failed to write export CSV row: {e}")))?;
    }

    tracing::info!(path = %path.display(), rows = trend.len(), "wrote trend CSV");
    Ok(())
}

fn csv_row(a: &Assessment) -> String {
    let mut fields = vec![
        a.timestamp.to_rfc3339(),
        a.provider_index.to_string(),
        a.aqi.map(|v| v.to_string()).unwrap_or_default(),
        a.category().map(|c| c.label().to_string()).unwrap_or_default(),
        a.dominant.map(|p| p.display_name().to_string()).unwrap_or_default(),
    ];
    for pollutant in Pollutant::ALL {
        fields.push(
            a.sub_index(pollutant)
                .and_then(|s| s.concentration)
                .map(|c| format!("{c:.4}"))
                .unwrap_or_default(),
        );
    }
    fields.join(",")
}

/// Write the full report as pretty JSON.
pub fn write_report_json(path: &Path, report: &CityReport) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::config(format!("Failed to create report JSON '{}': {e}", path.display()))
    })?;

    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::config(format!("Failed to write report JSON: {e}")))?;

    tracing::info!(path = %path.display(), "wrote report JSON");
    Ok(())
}

/// Write a timestamped JSON snapshot under `dir` and return its path.
pub fn write_snapshot(dir: &Path, report: &CityReport) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| {
        AppError::config(format!("Failed to create export dir '{}': {e}", dir.display()))
    })?;

    let path = dir.join(snapshot_file_name(report));
    write_report_json(&path, report)?;
    Ok(path)
}

fn snapshot_file_name(report: &CityReport) -> String {
    let slug: String = report
        .location
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!(
        "aqi_{slug}_{}.json",
        report.fetched_at.format("%Y%m%d_%H%M%S")
    )
}
