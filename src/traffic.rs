use std::{fmt, str::FromStr};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    distance::distance,
    model::{Congestion, GeoPoint},
};

/// How close to the center of a congested area counts as being inside it, in meters.
pub const AREA_RADIUS: f64 = 2_000.0;

#[derive(Debug, Error, PartialEq)]
#[error("invalid peak window \"{0}\", expected HH:MM-HH:MM")]
pub struct PeakWindowError(String);

/// Inclusive time-of-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeakWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl PeakWindow {
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= time && time <= self.end
        } else {
            // wraps past midnight
            time >= self.start || time <= self.end
        }
    }

    /// Parses a comma separated list such as `"07:00-09:00, 17:00-19:00"`.
    pub fn parse_list(s: &str) -> Result<Vec<Self>, PeakWindowError> {
        s.split(',')
            .map(str::trim)
            .filter(|x| !x.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl FromStr for PeakWindow {
    type Err = PeakWindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PeakWindowError(s.to_owned());
        let (start, end) = s.split_once('-').ok_or_else(err)?;
        let start = NaiveTime::parse_from_str(start.trim(), "%H:%M").map_err(|_| err())?;
        let end = NaiveTime::parse_from_str(end.trim(), "%H:%M").map_err(|_| err())?;
        Ok(Self { start, end })
    }
}

impl fmt::Display for PeakWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

impl Serialize for PeakWindow {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeakWindow {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficArea {
    pub name: String,
    pub position: GeoPoint,
    pub congestion: Congestion,
    #[serde(default)]
    pub peak_hours: Vec<PeakWindow>,
}

impl TrafficArea {
    pub fn is_peak(&self, time: NaiveTime) -> bool {
        self.peak_hours.iter().any(|x| x.contains(time))
    }
}

/// Whether `position` is inside a highly congested area during one of its peak windows.
pub fn is_high_traffic(position: GeoPoint, areas: &[TrafficArea], time: NaiveTime) -> bool {
    areas.iter().any(|area| {
        area.congestion == Congestion::High
            && area.is_peak(time)
            && distance(position, area.position) < AREA_RADIUS
    })
}
