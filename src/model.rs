use geo::Point;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::coords::CoordinateError;

/// A validated latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint")]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

/// Wire representation, validated into a [`GeoPoint`].
#[derive(Deserialize)]
struct RawPoint {
    #[serde(alias = "latitude")]
    lat: f64,
    #[serde(alias = "lng", alias = "longitude")]
    lon: f64,
}

impl TryFrom<RawPoint> for GeoPoint {
    type Error = CoordinateError;

    fn try_from(value: RawPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(value.lat, value.lon)
    }
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::OutOfRange { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl From<GeoPoint> for Point {
    fn from(value: GeoPoint) -> Self {
        Point::new(value.lon, value.lat)
    }
}

/// Radio access technology of a cell.
///
/// Anything that is not LTE, UMTS or GSM lands in `Other` rather than being rejected,
/// which includes NR since datasets disagree on how to label it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, AsRefStr, Display, EnumString,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum RadioTechnology {
    Lte,
    #[strum(to_string = "UMTS", serialize = "WCDMA")]
    Umts,
    Gsm,
    Other,
}

impl RadioTechnology {
    pub fn parse(value: &str) -> Self {
        value.trim().parse().unwrap_or(RadioTechnology::Other)
    }

    pub fn score(&self) -> f64 {
        match self {
            RadioTechnology::Lte => 3.0,
            RadioTechnology::Umts => 2.0,
            RadioTechnology::Gsm => 1.0,
            RadioTechnology::Other => 0.0,
        }
    }
}

impl Serialize for RadioTechnology {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_ref())
    }
}

impl<'de> Deserialize<'de> for RadioTechnology {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(RadioTechnology::parse(&raw))
    }
}

/// How busy a tower is. Missing telemetry is treated as `Medium`.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Congestion {
    Low,
    #[default]
    Medium,
    High,
    #[serde(other)]
    Unknown,
}

impl Congestion {
    pub fn score(&self) -> f64 {
        match self {
            Congestion::Low => 3.0,
            Congestion::Medium | Congestion::Unknown => 2.0,
            Congestion::High => 1.0,
        }
    }
}

/// Subscriber load on a tower.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Load {
    pub capacity: u32,
    pub current: u32,
}

impl Load {
    /// Fraction of capacity in use. A tower without capacity counts as full.
    pub fn ratio(&self) -> f64 {
        if self.capacity == 0 {
            1.0
        } else {
            f64::from(self.current) / f64::from(self.capacity)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tower {
    pub position: GeoPoint,
    /// Mobile network code of the operator.
    pub network: u16,
    pub radio: RadioTechnology,
    #[serde(default)]
    pub congestion: Congestion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Coverage radius in meters, when the dataset knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<f64>,
    /// Nominal signal strength as a percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load: Option<Load>,
}

impl Tower {
    pub fn new(position: GeoPoint, network: u16, radio: RadioTechnology) -> Self {
        Self {
            position,
            network,
            radio,
            congestion: Congestion::default(),
            label: None,
            range: None,
            strength: None,
            load: None,
        }
    }

    pub fn with_congestion(mut self, congestion: Congestion) -> Self {
        self.congestion = congestion;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = Some(strength);
        self
    }

    pub fn with_load(mut self, capacity: u32, current: u32) -> Self {
        self.load = Some(Load { capacity, current });
        self
    }

    pub fn load_ratio(&self) -> f64 {
        self.load.map_or(0.0, |x| x.ratio())
    }
}
