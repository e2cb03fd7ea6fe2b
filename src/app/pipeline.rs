//! Shared "report pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! city -> coordinates -> current + history -> engine assessment -> trend summary
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::data::{OwmClient, PollutionSource};
use crate::domain::{DashboardConfig, Location};
use crate::error::AppError;
use crate::report::{Assessment, TrendSummary, assess, build_trend, summarize_trend};

/// All computed outputs for one city.
#[derive(Debug, Clone, Serialize)]
pub struct CityReport {
    pub query: String,
    pub location: Location,
    pub fetched_at: DateTime<Utc>,
    pub history_days: u32,
    pub current: Assessment,
    pub trend: Vec<Assessment>,
    pub summary: TrendSummary,
}

/// Execute the full pipeline against OpenWeatherMap.
pub fn run_report(config: &DashboardConfig) -> Result<CityReport, AppError> {
    let client = OwmClient::from_env()?;
    run_report_with(&client, &config.city, config.history_days, Utc::now())
}

/// Execute the full pipeline against any source.
///
/// History covers `[now - history_days, now]`.
pub fn run_report_with(
    source: &impl PollutionSource,
    city: &str,
    history_days: u32,
    now: DateTime<Utc>,
) -> Result<CityReport, AppError> {
    if history_days == 0 {
        return Err(AppError::config("History window must be at least one day."));
    }

    let start = Duration::try_days(i64::from(history_days))
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| {
            AppError::config(format!("History window of {history_days} days is out of range."))
        })?;

    let (location, current) = run_current_with(source, city)?;

    let samples = source.history(&location, start, now)?;
    let trend = build_trend(&samples);
    let summary = summarize_trend(&trend);
    tracing::info!(
        city,
        n = summary.n,
        defined = summary.n_defined,
        max = ?summary.max,
        "built trend"
    );

    Ok(CityReport {
        query: city.trim().to_string(),
        location,
        fetched_at: now,
        history_days,
        current,
        trend,
        summary,
    })
}

/// Resolve a city and assess its latest observation.
pub fn run_current_with(
    source: &impl PollutionSource,
    city: &str,
) -> Result<(Location, Assessment), AppError> {
    let location = source.locate(city)?;
    let sample = source.current(&location)?;
    let current = assess(&sample);
    tracing::info!(
        city,
        aqi = ?current.aqi,
        dominant = ?current.dominant,
        provider_index = current.provider_index,
        "assessed current conditions"
    );
    Ok((location, current))
}


#[cfg(test)]
mod tests {
    use super::fake::FakeSource;
    use super::*;

    #[test]
    fn report_assesses_current_and_history() {
        let source = FakeSource::new();
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let report = run_report_with(&source, " Oslo ", 7, now).unwrap();

        assert_eq!(report.query, "Oslo");
        assert_eq!(report.location.name, "Oslo");
        assert_eq!(report.current.aqi, Some(88));
        assert_eq!(report.trend.len(), 2);
        // Sorted ascending regardless of provider order.
        assert_eq!(report.trend[0].aqi, Some(25));
        assert_eq!(report.trend[1].aqi, Some(124));
        assert_eq!(report.summary.max, Some(124));

        let calls = source.history_calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, now);
        assert_eq!(calls[0].0, now - Duration::days(7));
    }

    #[test]
    fn unknown_city_propagates_provider_rejection() {
        let mut source = FakeSource::new();
        source.location = None;
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let err = run_report_with(&source, "Atlantis", 7, now).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.message(), "City 'Atlantis' not found");
        assert!(source.history_calls.borrow().is_empty());
    }

    #[test]
    fn oversized_window_is_a_config_error() {
        let source = FakeSource::new();
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let err = run_report_with(&source, "Oslo", 200_000_000, now).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.message(),
            "History window of 200000000 days is out of range."
        );
        assert!(source.history_calls.borrow().is_empty());
    }

    #[test]
    fn zero_day_window_is_rejected() {
        let source = FakeSource::new();
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let err = run_report_with(&source, "Oslo", 0, now).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
