//! Index computation, category classification and health recommendations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aqi::breakpoints::{bands_for, Band};
use crate::domain::Pollutant;

/// Display colors for each category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryColor {
    Green,
    Yellow,
    Red,
}

impl CategoryColor {
    pub fn name(self) -> &'static str {
        match self {
            CategoryColor::Green => "green",
            CategoryColor::Yellow => "yellow",
            CategoryColor::Red => "red",
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            CategoryColor::Green => "#28A745",
            CategoryColor::Yellow => "#FFC107",
            CategoryColor::Red => "#DC3545",
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            CategoryColor::Green => (0x28, 0xA7, 0x45),
            CategoryColor::Yellow => (0xFF, 0xC1, 0x07),
            CategoryColor::Red => (0xDC, 0x35, 0x45),
        }
    }
}

impl fmt::Display for CategoryColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Health-impact category of an AQI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Good,
    Moderate,
    Unhealthy,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Good, Category::Moderate, Category::Unhealthy];

    /// Three-way threshold split, total over all integers.
    pub fn from_aqi(aqi: i32) -> Self {
        if aqi <= 50 {
            Category::Good
        } else if aqi <= 100 {
            Category::Moderate
        } else {
            Category::Unhealthy
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Good => "Good",
            Category::Moderate => "Moderate",
            Category::Unhealthy => "Unhealthy",
        }
    }

    pub fn color(self) -> CategoryColor {
        match self {
            Category::Good => CategoryColor::Green,
            Category::Moderate => CategoryColor::Yellow,
            Category::Unhealthy => CategoryColor::Red,
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            Category::Good => "Air quality is satisfactory, and air pollution poses little or no risk.",
            Category::Moderate => "Air quality is acceptable. However, there may be a risk for some people.",
            Category::Unhealthy => "Everyone may begin to experience health effects.",
        }
    }
}

/// Calculate the AQI for a pollutant concentration.
///
/// # Arguments
///
/// * `pollutant` - The pollutant whose breakpoint table is used
/// * `concentration` - Concentration in the table's unit (see `Pollutant::table_unit`)
///
/// # Returns
///
/// `None` when the concentration falls outside every band (negative, in a gap
/// between bands, above the top band, or NaN). Otherwise the first band that
/// contains the concentration is interpolated linearly and the result is
/// truncated toward zero. On a boundary shared by two bands the lower band wins.
///
/// # Examples
///
/// ```
/// use airvision::aqi::calculate_aqi;
/// use airvision::domain::Pollutant;
///
/// assert_eq!(calculate_aqi(Pollutant::Pm25, 6.0), Some(25));
/// assert_eq!(calculate_aqi(Pollutant::Pm25, 5.5), Some(22));
/// assert_eq!(calculate_aqi(Pollutant::Pm25, 1000.0), None);
/// ```
pub fn calculate_aqi(pollutant: Pollutant, concentration: f64) -> Option<i32> {
    interpolate(bands_for(pollutant), concentration)
}

/// Same as [`calculate_aqi`], keyed by a free-text pollutant identifier.
///
/// Unrecognized identifiers yield `None`.
pub fn calculate_aqi_by_name(pollutant: &str, concentration: f64) -> Option<i32> {
    Pollutant::from_name(pollutant).and_then(|p| calculate_aqi(p, concentration))
}

fn interpolate(bands: &[Band], concentration: f64) -> Option<i32> {
    let band = bands.iter().find(|b| b.contains(concentration))?;

    // AQI = ((Ihigh - Ilow) / (Chigh - Clow)) * (C - Clow) + Ilow
    // Evaluated in this order; the endpoints of every band come out exact.
    let span = (band.index_high - band.index_low) as f64;
    let aqi = (span / (band.concentration_high - band.concentration_low))
        * (concentration - band.concentration_low)
        + band.index_low as f64;
    Some(aqi as i32)
}

/// Label and display color for an AQI value.
pub fn categorize(aqi: i32) -> (&'static str, CategoryColor) {
    let category = Category::from_aqi(aqi);
    (category.label(), category.color())
}

/// Fixed advisory sentence for an AQI value.
pub fn recommend(aqi: i32) -> &'static str {
    Category::from_aqi(aqi).recommendation()
}
