//! Breakpoint tables.
//!
//! Each pollutant maps to three bands covering "Good" through "Unhealthy". Bands
//! are ordered by increasing concentration and never overlap; the small gaps
//! between them (e.g. PM2.5 12.0..12.1) belong to no band.

use crate::domain::Pollutant;

/// One piecewise-linear segment of the concentration → index mapping.
///
/// Both concentration bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub concentration_low: f64,
    pub concentration_high: f64,
    pub index_low: i32,
    pub index_high: i32,
}

impl Band {
    const fn new(concentration_low: f64, concentration_high: f64, index_low: i32, index_high: i32) -> Self {
        Self {
            concentration_low,
            concentration_high,
            index_low,
            index_high,
        }
    }

    /// Whether `concentration` lies within `[concentration_low, concentration_high]`.
    ///
    /// NaN is never contained.
    pub fn contains(&self, concentration: f64) -> bool {
        self.concentration_low <= concentration && concentration <= self.concentration_high
    }
}

// µg/m³
const PM25_BANDS: [Band; 3] = [
    Band::new(0.0, 12.0, 0, 50),
    Band::new(12.1, 35.4, 51, 100),
    Band::new(35.5, 55.4, 101, 150),
];

// µg/m³
const PM10_BANDS: [Band; 3] = [
    Band::new(0.0, 54.0, 0, 50),
    Band::new(55.0, 154.0, 51, 100),
    Band::new(155.0, 254.0, 101, 150),
];

// ppb
const O3_BANDS: [Band; 3] = [
    Band::new(0.0, 54.0, 0, 50),
    Band::new(55.0, 70.0, 51, 100),
    Band::new(71.0, 85.0, 101, 150),
];

// ppm
const CO_BANDS: [Band; 3] = [
    Band::new(0.0, 4.4, 0, 50),
    Band::new(4.5, 9.4, 51, 100),
    Band::new(9.5, 12.4, 101, 150),
];

/// The ordered bands for `pollutant`.
pub fn bands_for(pollutant: Pollutant) -> &'static [Band] {
    match pollutant {
        Pollutant::Pm25 => &PM25_BANDS,
        Pollutant::Pm10 => &PM10_BANDS,
        Pollutant::O3 => &O3_BANDS,
        Pollutant::Co => &CO_BANDS,
    }
}

/// The ordered bands for a free-text pollutant identifier.
///
/// Unrecognized identifiers yield an empty slice, which callers treat as
/// "cannot compute".
pub fn bands_for_name(name: &str) -> &'static [Band] {
    Pollutant::from_name(name).map(bands_for).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_is_ordered_and_non_overlapping() {
        for pollutant in Pollutant::ALL {
            let bands = bands_for(pollutant);
            assert!(!bands.is_empty(), "{pollutant} has no bands");
            for band in bands {
                assert!(band.concentration_low <= band.concentration_high, "{pollutant}: {band:?}");
                assert!(band.index_low <= band.index_high, "{pollutant}: {band:?}");
            }
            for pair in bands.windows(2) {
                assert!(
                    pair[0].concentration_high <= pair[1].concentration_low,
                    "{pollutant}: {:?} overlaps {:?}",
                    pair[0],
                    pair[1]
                );
                assert!(pair[0].index_high < pair[1].index_low, "{pollutant}: index ranges overlap");
            }
        }
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(bands_for_name("PM2.5"), bands_for(Pollutant::Pm25));
        assert_eq!(bands_for_name("co"), bands_for(Pollutant::Co));
        assert!(bands_for_name("unknown_pollutant").is_empty());
    }

    #[test]
    fn contains_is_inclusive_and_rejects_nan() {
        let band = bands_for(Pollutant::Pm25)[0];
        assert!(band.contains(0.0));
        assert!(band.contains(12.0));
        assert!(!band.contains(12.05));
        assert!(!band.contains(-0.1));
        assert!(!band.contains(f64::NAN));
    }
}
