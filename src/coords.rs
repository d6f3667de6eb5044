//! Parsing of user-entered coordinate text.
//!
//! Accepts the handful of forms people type into a search box: a plain pair separated by a
//! comma, semicolon or whitespace, a labelled pair (`lat: 40.7, lng: -74.0`), and degrees
//! with hemisphere letters (`40.7128° N, 74.0060° W`).

use std::{str::FromStr, sync::LazyLock};

use regex::{Captures, Regex};
use thiserror::Error;

use crate::model::GeoPoint;

const NUMBER: &str = r"[-+]?(?:\d+(?:\.\d*)?|\.\d+)";
const UNSIGNED: &str = r"(?:\d+(?:\.\d*)?|\.\d+)";

static PLAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^({NUMBER})\s*°?\s*[,;\s]\s*({NUMBER})\s*°?$")).expect("valid regex")
});

static LABELLED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^(?:lat|latitude)\s*[:=]\s*({NUMBER})\s*[,;\s]\s*(?:lng|lon|long|longitude)\s*[:=]\s*({NUMBER})$"
    ))
    .expect("valid regex")
});

static HEMISPHERE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^({UNSIGNED})\s*°?\s*([NS])\s*[,;]?\s*({UNSIGNED})\s*°?\s*([EW])$"
    ))
    .expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("Please enter coordinates")]
    Empty,

    #[error("Invalid coordinate format \"{0}\". Try: '40.7128, -74.0060', '40.7128 -74.0060', 'lat: 40.7128, lng: -74.0060' or '40.7128° N, 74.0060° W'")]
    Malformed(String),

    #[error("coordinates out of range: latitude {lat} must be within [-90, 90] and longitude {lon} within [-180, 180]")]
    OutOfRange { lat: f64, lon: f64 },

    #[error("coordinates must be finite numbers")]
    NotFinite,
}

impl FromStr for GeoPoint {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(CoordinateError::Empty);
        }

        if let Some(caps) = PLAIN.captures(input).or_else(|| LABELLED.captures(input)) {
            let lat = number(&caps, 1, input)?;
            let lon = number(&caps, 2, input)?;
            return GeoPoint::new(lat, lon);
        }

        if let Some(caps) = HEMISPHERE.captures(input) {
            let mut lat = number(&caps, 1, input)?;
            let mut lon = number(&caps, 3, input)?;
            if caps[2].eq_ignore_ascii_case("s") {
                lat = -lat;
            }
            if caps[4].eq_ignore_ascii_case("w") {
                lon = -lon;
            }
            return GeoPoint::new(lat, lon);
        }

        Err(CoordinateError::Malformed(input.to_owned()))
    }
}

fn number(caps: &Captures, i: usize, input: &str) -> Result<f64, CoordinateError> {
    caps.get(i)
        .and_then(|x| x.as_str().parse().ok())
        .ok_or_else(|| CoordinateError::Malformed(input.to_owned()))
}
