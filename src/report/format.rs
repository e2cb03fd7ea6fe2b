//! Formatted terminal output.
//!
//! Formatting code lives in one place so the engine stays free of presentation
//! concerns and output changes are localized.

use crate::aqi::{bands_for, calculate_aqi, categorize, recommend};
use crate::domain::{Components, Location, Pollutant, format_pollutant_name};
use crate::report::{Assessment, TrendSummary};

/// Current conditions: headline AQI, category, recommendation, per-pollutant table.
pub fn format_current(location: &Location, current: &Assessment) -> String {
    let mut out = String::new();

    out.push_str("=== airvision - Current Air Quality ===\n");
    out.push_str(&format!(
        "City: {} ({:.4}, {:.4})\n",
        location.label(),
        location.lat,
        location.lon
    ));
    out.push_str(&format!(
        "Observed: {}\n",
        current.timestamp.format("%Y-%m-%d %H:%M UTC")
    ));

    match current.aqi {
        Some(aqi) => {
            let (label, color) = categorize(aqi);
            let dominant = current
                .dominant
                .map(|p| p.display_name())
                .unwrap_or("-");
            out.push_str(&format!(
                "AQI: {aqi} ({label}, {color} {}) | dominant: {dominant}\n",
                color.hex()
            ));
            out.push_str(&format!("Recommendation: {}\n", recommend(aqi)));
        }
        None => {
            out.push_str("AQI: undefined (no reported pollutant falls within the breakpoint tables)\n");
        }
    }
    out.push_str(&format!(
        "Provider index: {}/5 (OpenWeatherMap scale, informational)\n",
        current.provider_index
    ));

    out.push_str("\nPollutant  Concentration          AQI\n");
    for s in &current.sub_indices {
        let conc = match s.concentration {
            Some(c) => format!("{c:>8.2} {}", s.pollutant.table_unit()),
            None => format!("{:>8} {}", "n/a", s.pollutant.table_unit()),
        };
        let aqi = match (s.concentration, s.aqi) {
            (_, Some(aqi)) => aqi.to_string(),
            (Some(_), None) => "outside table".to_string(),
            (None, None) => "-".to_string(),
        };
        out.push_str(&format!("{:<10} {:<22} {}\n", s.pollutant.display_name(), conc, aqi));
    }
    out.push_str(&format_components(&current.components));

    out
}

/// Raw provider components, e.g. `CO 230.31 | no 0.37 | PM2.5 5.50`.
pub fn format_components(components: &Components) -> String {
    let parts: Vec<String> = components
        .reported()
        .into_iter()
        .map(|(key, v)| format!("{} {v:.2}", format_pollutant_name(key)))
        .collect();
    if parts.is_empty() {
        "Provider components (µg/m³): none reported\n".to_string()
    } else {
        format!("Provider components (µg/m³): {}\n", parts.join(" | "))
    }
}

/// Trend statistics over the last `days` days.
pub fn format_trend_summary(summary: &TrendSummary, days: u32) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== AQI trend (last {days} day(s)) ===\n"));
    out.push_str(&format!(
        "Points: n={} | defined={}\n",
        summary.n, summary.n_defined
    ));

    match (summary.min, summary.max, summary.mean) {
        (Some(min), Some(max), Some(mean)) => {
            out.push_str(&format!("AQI: min={min} | max={max} | mean={mean:.1}\n"));
        }
        _ => out.push_str("AQI: no defined points\n"),
    }

    if let Some(worst) = &summary.worst {
        if let Some(aqi) = worst.aqi {
            let (label, _) = categorize(aqi);
            out.push_str(&format!(
                "Worst: {aqi} ({label}) at {}{}\n",
                worst.timestamp.format("%Y-%m-%d %H:%M UTC"),
                worst
                    .dominant
                    .map(|p| format!(", driven by {p}"))
                    .unwrap_or_default()
            ));
        }
    }

    let counts: Vec<String> = summary
        .counts
        .iter()
        .map(|(c, n)| format!("{}={n}", c.label()))
        .collect();
    out.push_str(&format!("Categories: {}\n", counts.join(" | ")));

    out
}

/// The breakpoint table, one row per band.
pub fn format_bands() -> String {
    let mut out = String::new();
    out.push_str("Pollutant  Unit   Concentration          AQI\n");
    for pollutant in Pollutant::ALL {
        for band in bands_for(pollutant) {
            out.push_str(&format!(
                "{:<10} {:<6} {:>8.2} - {:<8.2}   {:>3} - {:<3}\n",
                pollutant.display_name(),
                pollutant.table_unit(),
                band.concentration_low,
                band.concentration_high,
                band.index_low,
                band.index_high
            ));
        }
    }
    out.push_str("Concentrations between or above these bands have no AQI.\n");
    out
}

/// Engine result for a single `(pollutant, concentration)` pair.
pub fn format_calc(pollutant: &str, concentration: f64) -> String {
    let Some(p) = Pollutant::from_name(pollutant) else {
        let known: Vec<&str> = Pollutant::ALL.iter().map(|p| p.display_name()).collect();
        return format!(
            "AQI: undefined (unrecognized pollutant '{pollutant}'; known: {})\n",
            known.join(", ")
        );
    };

    let head = format!("{p} at {concentration:.2} {}", p.table_unit());
    match calculate_aqi(p, concentration) {
        Some(aqi) => {
            let (label, color) = categorize(aqi);
            format!("{head} -> AQI {aqi} ({label}, {color})\n{}\n", recommend(aqi))
        }
        None => format!("{head} -> AQI undefined (outside the breakpoint table)\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PollutionSample;
    use crate::report::{assess, build_trend, summarize_trend};
    use chrono::DateTime;

    fn location() -> Location {
        Location {
            name: "San Francisco".to_string(),
            country: Some("US".to_string()),
            state: Some("California".to_string()),
            lat: 37.7790262,
            lon: -122.419906,
        }
    }

    fn sample(ts: i64, pm2_5: f64) -> PollutionSample {
        PollutionSample {
            timestamp: DateTime::from_timestamp(ts, 0).unwrap(),
            provider_index: 2,
            components: Components {
                pm2_5: Some(pm2_5),
                ..Components::default()
            },
        }
    }

    #[test]
    fn calc_reports_value_category_and_advice() {
        assert_eq!(
            format_calc("pm2.5", 5.5),
            "PM2.5 at 5.50 µg/m³ -> AQI 22 (Good, green)\n\
             Air quality is satisfactory, and air pollution poses little or no risk.\n"
        );
        assert_eq!(
            format_calc("PM2.5", 1000.0),
            "PM2.5 at 1000.00 µg/m³ -> AQI undefined (outside the breakpoint table)\n"
        );
        assert_eq!(
            format_calc("unknown_pollutant", 10.0),
            "AQI: undefined (unrecognized pollutant 'unknown_pollutant'; known: PM2.5, PM10, O3, CO)\n"
        );
    }

    #[test]
    fn current_summary_uses_local_aqi() {
        let current = assess(&sample(1_700_000_000, 30.0));
        let txt = format_current(&location(), &current);
        assert!(txt.contains("City: San Francisco, California, US (37.7790, -122.4199)"));
        assert!(txt.contains("Observed: 2023-11-14 22:13 UTC"));
        assert!(txt.contains("AQI: 88 (Moderate, yellow #FFC107) | dominant: PM2.5"));
        assert!(txt.contains("Provider index: 2/5"));
        assert!(txt.contains("Recommendation: Air quality is acceptable."));
        assert!(txt.contains("PM10"));
        assert!(txt.ends_with("Provider components (µg/m³): PM2.5 30.00\n"));
    }

    #[test]
    fn components_line_uses_display_names_for_known_keys() {
        let c = Components {
            co: Some(230.31),
            no2: Some(14.22),
            pm2_5: Some(5.5),
            ..Components::default()
        };
        assert_eq!(
            format_components(&c),
            "Provider components (µg/m³): CO 230.31 | no2 14.22 | PM2.5 5.50\n"
        );
        assert_eq!(
            format_components(&Components::default()),
            "Provider components (µg/m³): none reported\n"
        );
    }

    #[test]
    fn current_summary_without_aqi() {
        let current = assess(&sample(1_700_000_000, 999.0));
        let txt = format_current(&location(), &current);
        assert!(txt.contains("AQI: undefined"));
        assert!(!txt.contains("Recommendation:"));
        assert!(txt.contains("outside table"));
    }

    #[test]
    fn trend_summary_lines() {
        let trend = build_trend(&[sample(0, 6.0), sample(3600, 45.0), sample(7200, 999.0)]);
        let txt = format_trend_summary(&summarize_trend(&trend), 7);
        assert!(txt.starts_with("=== AQI trend (last 7 day(s)) ===\n"));
        assert!(txt.contains("Points: n=3 | defined=2\n"));
        assert!(txt.contains("AQI: min=25 | max=124 | mean=74.5\n"));
        assert!(txt.contains("Worst: 124 (Unhealthy) at 1970-01-01 01:00 UTC, driven by PM2.5\n"));
        assert!(txt.contains("Categories: Good=1 | Moderate=0 | Unhealthy=1\n"));
    }

    #[test]
    fn bands_table_lists_every_band() {
        let txt = format_bands();
        // header + 4 pollutants × 3 bands + footer
        assert_eq!(txt.lines().count(), 14);
        assert!(txt.contains("PM2.5      µg/m³     12.10 - 35.40       51 - 100"));
    }
}
