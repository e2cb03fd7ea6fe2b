//! Reporting utilities: per-sample assessments, trends, and formatted terminal output.
//!
//! The headline AQI of a sample is always computed locally from its
//! concentrations (the highest defined sub-index). The provider's own 1–5 index
//! is carried along for display but never classified.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aqi::{calculate_aqi, Category};
use crate::domain::{Components, Pollutant, PollutionSample};

pub mod format;

pub use format::*;

/// AQI for a single pollutant of a sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubIndex {
    pub pollutant: Pollutant,
    /// Concentration in breakpoint-table units (`None` if not reported).
    pub concentration: Option<f64>,
    pub aqi: Option<i32>,
}

/// Engine output for one provider observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub timestamp: DateTime<Utc>,
    pub provider_index: u8,
    pub sub_indices: Vec<SubIndex>,
    /// Highest defined sub-index.
    pub aqi: Option<i32>,
    /// Pollutant that produced `aqi`.
    pub dominant: Option<Pollutant>,
    /// Raw provider concentrations the sub-indices came from.
    pub components: Components,
}

impl Assessment {
    pub fn category(&self) -> Option<Category> {
        self.aqi.map(Category::from_aqi)
    }

    pub fn recommendation(&self) -> Option<&'static str> {
        self.category().map(Category::recommendation)
    }

    pub fn sub_index(&self, pollutant: Pollutant) -> Option<&SubIndex> {
        self.sub_indices.iter().find(|s| s.pollutant == pollutant)
    }
}

/// Run every pollutant of a sample through the engine.
pub fn assess(sample: &PollutionSample) -> Assessment {
    let sub_indices: Vec<SubIndex> = Pollutant::ALL
        .into_iter()
        .map(|pollutant| {
            let concentration = sample.components.concentration(pollutant);
            let aqi = concentration.and_then(|c| calculate_aqi(pollutant, c));
            if aqi.is_none() {
                tracing::debug!(%pollutant, ?concentration, "sub-index undefined");
            }
            SubIndex {
                pollutant,
                concentration,
                aqi,
            }
        })
        .collect();

    // Strict comparison: on ties the earlier pollutant stays dominant.
    let mut best: Option<(i32, Pollutant)> = None;
    for s in &sub_indices {
        if let Some(aqi) = s.aqi {
            if best.is_none_or(|(b, _)| aqi > b) {
                best = Some((aqi, s.pollutant));
            }
        }
    }

    Assessment {
        timestamp: sample.timestamp,
        provider_index: sample.provider_index,
        sub_indices,
        aqi: best.map(|(aqi, _)| aqi),
        dominant: best.map(|(_, p)| p),
        components: sample.components,
    }
}

/// Assess every sample and order the result by time.
pub fn build_trend(samples: &[PollutionSample]) -> Vec<Assessment> {
    let mut trend: Vec<Assessment> = samples.iter().map(assess).collect();
    trend.sort_by_key(|a| a.timestamp);
    trend
}

/// Aggregate statistics over a trend. Undefined points are counted but
/// otherwise ignored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSummary {
    pub n: usize,
    pub n_defined: usize,
    pub min: Option<i32>,
    pub max: Option<i32>,
    pub mean: Option<f64>,
    /// Earliest point reaching `max`.
    pub worst: Option<Assessment>,
    pub counts: Vec<(Category, usize)>,
}

pub fn summarize_trend(trend: &[Assessment]) -> TrendSummary {
    let defined: Vec<(&Assessment, i32)> = trend
        .iter()
        .filter_map(|a| a.aqi.map(|aqi| (a, aqi)))
        .collect();

    let min = defined.iter().map(|&(_, aqi)| aqi).min();
    let max = defined.iter().map(|&(_, aqi)| aqi).max();
    let mean = if defined.is_empty() {
        None
    } else {
        let sum: f64 = defined.iter().map(|&(_, aqi)| aqi as f64).sum();
        Some(sum / defined.len() as f64)
    };

    let worst = max.and_then(|m| {
        defined
            .iter()
            .find(|&&(_, aqi)| aqi == m)
            .map(|&(a, _)| a.clone())
    });

    let counts = Category::ALL
        .into_iter()
        .map(|c| {
            let n = defined
                .iter()
                .filter(|&&(_, aqi)| Category::from_aqi(aqi) == c)
                .count();
            (c, n)
        })
        .collect();

    TrendSummary {
        n: trend.len(),
        n_defined: defined.len(),
        min,
        max,
        mean,
        worst,
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Components;

    fn sample(ts: i64, provider_index: u8, components: Components) -> PollutionSample {
        PollutionSample {
            timestamp: DateTime::from_timestamp(ts, 0).unwrap(),
            provider_index,
            components,
        }
    }

    fn pm(pm2_5: f64, pm10: f64) -> Components {
        Components {
            pm2_5: Some(pm2_5),
            pm10: Some(pm10),
            ..Components::default()
        }
    }

    #[test]
    fn assess_picks_highest_sub_index() {
        // PM2.5 30 → 88, PM10 100 → 73.
        let a = assess(&sample(0, 2, pm(30.0, 100.0)));
        assert_eq!(a.aqi, Some(88));
        assert_eq!(a.dominant, Some(Pollutant::Pm25));
        assert_eq!(a.category(), Some(Category::Moderate));
        assert_eq!(a.sub_index(Pollutant::Pm10).unwrap().aqi, Some(73));
        assert_eq!(a.sub_index(Pollutant::Co).unwrap().concentration, None);
        assert_eq!(a.provider_index, 2);
    }

    #[test]
    fn assess_ties_keep_first_pollutant() {
        // PM2.5 12 → 50 and PM10 54 → 50.
        let a = assess(&sample(0, 1, pm(12.0, 54.0)));
        assert_eq!(a.aqi, Some(50));
        assert_eq!(a.dominant, Some(Pollutant::Pm25));
    }

    #[test]
    fn assess_ignores_pollutants_outside_tables() {
        // PM2.5 above the table, PM10 defined.
        let a = assess(&sample(0, 5, pm(300.0, 60.0)));
        assert_eq!(a.sub_index(Pollutant::Pm25).unwrap().aqi, None);
        assert_eq!(a.aqi, Some(53));
        assert_eq!(a.dominant, Some(Pollutant::Pm10));
    }

    #[test]
    fn assess_without_defined_sub_indices_is_undefined() {
        let a = assess(&sample(0, 5, pm(300.0, 900.0)));
        assert_eq!(a.aqi, None);
        assert_eq!(a.dominant, None);
        assert_eq!(a.category(), None);
        assert_eq!(a.recommendation(), None);
    }

    #[test]
    fn provider_index_is_not_classified() {
        // A provider index of 5 ("very poor") does not override a Good local AQI.
        let a = assess(&sample(0, 5, pm(6.0, 10.0)));
        assert_eq!(a.aqi, Some(25));
        assert_eq!(a.category(), Some(Category::Good));
    }

    #[test]
    fn build_trend_sorts_by_time() {
        let trend = build_trend(&[
            sample(7200, 1, pm(6.0, 10.0)),
            sample(0, 1, pm(30.0, 10.0)),
            sample(3600, 1, pm(45.0, 10.0)),
        ]);
        let ts: Vec<i64> = trend.iter().map(|a| a.timestamp.timestamp()).collect();
        assert_eq!(ts, vec![0, 3600, 7200]);
    }

    #[test]
    fn summarize_trend_skips_undefined_points() {
        let trend = build_trend(&[
            sample(0, 1, pm(6.0, 10.0)),     // 25
            sample(3600, 2, pm(30.0, 10.0)), // 88
            sample(7200, 3, pm(45.0, 10.0)), // 124
            sample(10800, 5, pm(900.0, 900.0)),
            sample(14400, 3, pm(45.0, 10.0)), // 124 again, later
        ]);
        let s = summarize_trend(&trend);
        assert_eq!(s.n, 5);
        assert_eq!(s.n_defined, 4);
        assert_eq!(s.min, Some(25));
        assert_eq!(s.max, Some(124));
        assert!((s.mean.unwrap() - 90.25).abs() < 1e-9);
        assert_eq!(s.worst.as_ref().unwrap().timestamp.timestamp(), 7200);
        assert_eq!(
            s.counts,
            vec![
                (Category::Good, 1),
                (Category::Moderate, 1),
                (Category::Unhealthy, 2)
            ]
        );
    }

    #[test]
    fn summarize_empty_trend() {
        let s = summarize_trend(&[]);
        assert_eq!(s.n, 0);
        assert_eq!(s.min, None);
        assert_eq!(s.mean, None);
        assert!(s.worst.is_none());
        assert!(s.counts.iter().all(|&(_, n)| n == 0));
    }
}
