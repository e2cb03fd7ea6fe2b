//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - passed from the provider client to the AQI engine
//! - exported to JSON/CSV
//! - rendered by the CLI and the TUI

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Molar volume of an ideal gas at 25 °C and 1 atm (litres).
const MOLAR_VOLUME_L: f64 = 24.45;
const O3_MOLECULAR_WEIGHT: f64 = 48.00;
const CO_MOLECULAR_WEIGHT: f64 = 28.01;

/// Pollutants with a breakpoint table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    #[serde(rename = "PM2.5")]
    Pm25,
    #[serde(rename = "PM10")]
    Pm10,
    #[serde(rename = "O3")]
    O3,
    #[serde(rename = "CO")]
    Co,
}

impl Pollutant {
    pub const ALL: [Pollutant; 4] = [Pollutant::Pm25, Pollutant::Pm10, Pollutant::O3, Pollutant::Co];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::O3 => "O3",
            Pollutant::Co => "CO",
        }
    }

    /// Key used by the provider's `components` object.
    pub fn provider_key(self) -> &'static str {
        match self {
            Pollutant::Pm25 => "pm2_5",
            Pollutant::Pm10 => "pm10",
            Pollutant::O3 => "o3",
            Pollutant::Co => "co",
        }
    }

    /// Concentration unit of the breakpoint table for this pollutant.
    pub fn table_unit(self) -> &'static str {
        match self {
            Pollutant::Pm25 | Pollutant::Pm10 => "µg/m³",
            Pollutant::O3 => "ppb",
            Pollutant::Co => "ppm",
        }
    }

    /// Parse a free-text identifier.
    ///
    /// Accepts display names and provider keys in any case (`"PM2.5"`, `"pm2_5"`,
    /// `"pm25"`, `"o3"`). Anything else is an unrecognized pollutant.
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .trim()
            .chars()
            .filter(|&c| !matches!(c, '.' | '_' | ' ' | '-'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "pm25" => Some(Pollutant::Pm25),
            "pm10" => Some(Pollutant::Pm10),
            "o3" => Some(Pollutant::O3),
            "co" => Some(Pollutant::Co),
            _ => None,
        }
    }

    /// Convert a provider reading (µg/m³) into the unit of the breakpoint table.
    ///
    /// Gas conversions assume 25 °C and 1 atm.
    pub fn from_provider_units(self, ug_m3: f64) -> f64 {
        match self {
            Pollutant::Pm25 | Pollutant::Pm10 => ug_m3,
            Pollutant::O3 => ug_m3 * MOLAR_VOLUME_L / O3_MOLECULAR_WEIGHT,
            Pollutant::Co => ug_m3 * MOLAR_VOLUME_L / (CO_MOLECULAR_WEIGHT * 1000.0),
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Map a provider component key to its display name.
///
/// Unknown keys are passed through unchanged.
pub fn format_pollutant_name(key: &str) -> &str {
    Pollutant::ALL
        .into_iter()
        .find(|p| p.provider_key() == key)
        .map(|p| p.display_name())
        .unwrap_or(key)
}

/// A geocoded city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: Option<String>,
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    /// `"San Francisco, California, US"`-style label.
    pub fn label(&self) -> String {
        let mut parts = vec![self.name.as_str()];
        if let Some(state) = self.state.as_deref() {
            parts.push(state);
        }
        if let Some(country) = self.country.as_deref() {
            parts.push(country);
        }
        parts.join(", ")
    }
}

/// Raw component concentrations as reported by the provider (µg/m³).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub co: Option<f64>,
    #[serde(default)]
    pub no: Option<f64>,
    #[serde(default)]
    pub no2: Option<f64>,
    #[serde(default)]
    pub o3: Option<f64>,
    #[serde(default)]
    pub so2: Option<f64>,
    #[serde(default)]
    pub pm2_5: Option<f64>,
    #[serde(default)]
    pub pm10: Option<f64>,
    #[serde(default)]
    pub nh3: Option<f64>,
}

impl Components {
    /// Raw provider value (µg/m³) for a pollutant with a breakpoint table.
    pub fn raw(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::Pm25 => self.pm2_5,
            Pollutant::Pm10 => self.pm10,
            Pollutant::O3 => self.o3,
            Pollutant::Co => self.co,
        }
    }

    /// Every reported component as `(provider key, µg/m³)`, in provider order.
    pub fn reported(&self) -> Vec<(&'static str, f64)> {
        [
            ("co", self.co),
            ("no", self.no),
            ("no2", self.no2),
            ("o3", self.o3),
            ("so2", self.so2),
            ("pm2_5", self.pm2_5),
            ("pm10", self.pm10),
            ("nh3", self.nh3),
        ]
        .into_iter()
        .filter_map(|(key, v)| v.map(|v| (key, v)))
        .collect()
    }

    /// Concentration in breakpoint-table units, if the provider reported it.
    pub fn concentration(&self, pollutant: Pollutant) -> Option<f64> {
        self.raw(pollutant)
            .filter(|v| v.is_finite())
            .map(|v| pollutant.from_provider_units(v))
    }
}

/// One provider observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollutionSample {
    pub timestamp: DateTime<Utc>,
    /// Provider's own 1–5 index. Informational only.
    pub provider_index: u8,
    pub components: Components,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub city: String,
    pub history_days: u32,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            city: "San Francisco".to_string(),
            history_days: 7,
            plot: true,
            plot_width: 100,
            plot_height: 20,
            export_csv: None,
            export_json: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pollutant_names_parse_loosely() {
        assert_eq!(Pollutant::from_name("PM2.5"), Some(Pollutant::Pm25));
        assert_eq!(Pollutant::from_name("pm2_5"), Some(Pollutant::Pm25));
        assert_eq!(Pollutant::from_name(" pm25 "), Some(Pollutant::Pm25));
        assert_eq!(Pollutant::from_name("PM10"), Some(Pollutant::Pm10));
        assert_eq!(Pollutant::from_name("o3"), Some(Pollutant::O3));
        assert_eq!(Pollutant::from_name("Co"), Some(Pollutant::Co));
        assert_eq!(Pollutant::from_name("unknown_pollutant"), None);
        assert_eq!(Pollutant::from_name("no2"), None);
        assert_eq!(Pollutant::from_name(""), None);
    }

    #[test]
    fn provider_keys_map_to_display_names() {
        assert_eq!(format_pollutant_name("pm2_5"), "PM2.5");
        assert_eq!(format_pollutant_name("pm10"), "PM10");
        assert_eq!(format_pollutant_name("o3"), "O3");
        assert_eq!(format_pollutant_name("co"), "CO");
        assert_eq!(format_pollutant_name("nh3"), "nh3");
    }

    #[test]
    fn gas_conversions_use_standard_molar_volume() {
        // 1 ppm CO ≈ 1145.6 µg/m³ at 25 °C.
        let ppm = Pollutant::Co.from_provider_units(1145.6);
        assert!((ppm - 1.0).abs() < 1e-3, "got {ppm}");

        // 1 ppb O3 ≈ 1.963 µg/m³ at 25 °C.
        let ppb = Pollutant::O3.from_provider_units(100.0);
        assert!((ppb - 50.9375).abs() < 1e-9, "got {ppb}");

        assert_eq!(Pollutant::Pm25.from_provider_units(12.5), 12.5);
        assert_eq!(Pollutant::Pm10.from_provider_units(40.0), 40.0);
    }

    #[test]
    fn components_skip_missing_and_non_finite_values() {
        let c = Components {
            pm2_5: Some(8.0),
            pm10: Some(f64::NAN),
            ..Components::default()
        };
        assert_eq!(c.concentration(Pollutant::Pm25), Some(8.0));
        assert_eq!(c.concentration(Pollutant::Pm10), None);
        assert_eq!(c.concentration(Pollutant::Co), None);
    }

    #[test]
    fn reported_components_skip_missing_keys() {
        let c = Components {
            co: Some(230.31),
            pm2_5: Some(5.5),
            nh3: Some(0.52),
            ..Components::default()
        };
        assert_eq!(c.reported(), vec![("co", 230.31), ("pm2_5", 5.5), ("nh3", 0.52)]);
        assert!(Components::default().reported().is_empty());
    }

    #[test]
    fn location_label_skips_missing_parts() {
        let loc = Location {
            name: "Paris".to_string(),
            country: Some("FR".to_string()),
            state: None,
            lat: 48.85,
            lon: 2.35,
        };
        assert_eq!(loc.label(), "Paris, FR");
    }
}
