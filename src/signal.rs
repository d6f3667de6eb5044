//! Signal strength estimation and "better signal" recommendations.

use serde::Serialize;
use strum::{AsRefStr, Display};

use crate::{
    distance::{bearing, distance},
    model::{GeoPoint, Tower},
};

/// Percentage points lost per kilometer from the tower.
const STRENGTH_LOSS_PER_KM: f64 = 15.0;
/// Share of the signal lost when a tower is at full capacity.
const MAX_LOAD_PENALTY: f64 = 0.3;
/// Towers at or above this load ratio are not recommended.
const AVAILABLE_LOAD_RATIO: f64 = 0.8;
const WALKING_SPEED_KMH: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalEstimate<'a> {
    /// Percentage within [0, 100].
    pub strength: f64,
    pub quality: SignalQuality,
    pub bars: u8,
    pub tower: &'a Tower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SignalQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl SignalQuality {
    pub fn from_strength(strength: f64) -> Self {
        if strength >= 80.0 {
            SignalQuality::Excellent
        } else if strength >= 60.0 {
            SignalQuality::Good
        } else if strength >= 40.0 {
            SignalQuality::Fair
        } else {
            SignalQuality::Poor
        }
    }
}

/// Number of lit bars out of four.
pub fn bars(strength: f64) -> u8 {
    (strength.clamp(0.0, 100.0) / 25.0).ceil() as u8
}

/// Expected strength at `position` from a single tower, or `None` when the tower does not
/// advertise a nominal strength.
pub fn tower_strength(position: GeoPoint, tower: &Tower) -> Option<f64> {
    let nominal = tower.strength?;
    let km = distance(position, tower.position) / 1000.0;
    let load_factor = 1.0 - tower.load_ratio().min(1.0) * MAX_LOAD_PENALTY;
    Some(((nominal - km * STRENGTH_LOSS_PER_KM) * load_factor).max(0.0))
}

/// Strongest signal available at `position`. Ties go to the earlier tower.
pub fn estimate(position: GeoPoint, towers: &[Tower]) -> Option<SignalEstimate<'_>> {
    let mut best: Option<(f64, &Tower)> = None;
    for tower in towers {
        let Some(strength) = tower_strength(position, tower) else {
            continue;
        };
        if best.map_or(true, |(x, _)| strength > x) {
            best = Some((strength, tower));
        }
    }

    best.map(|(strength, tower)| {
        let strength = strength.clamp(0.0, 100.0);
        SignalEstimate {
            strength,
            quality: SignalQuality::from_strength(strength),
            bars: bars(strength),
            tower,
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr, Display)]
pub enum Compass {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Compass {
    pub fn from_bearing(bearing: f64) -> Self {
        const POINTS: [Compass; 8] = [
            Compass::N,
            Compass::NE,
            Compass::E,
            Compass::SE,
            Compass::S,
            Compass::SW,
            Compass::W,
            Compass::NW,
        ];
        let i = (bearing.rem_euclid(360.0) / 45.0).round() as usize % 8;
        POINTS[i]
    }
}

/// Walking directions between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Meters.
    pub distance: f64,
    /// Degrees clockwise from north.
    pub bearing: f64,
    pub direction: Compass,
    pub eta_minutes: u32,
}

impl Route {
    pub fn between(from: GeoPoint, to: GeoPoint) -> Self {
        let d = distance(from, to);
        let b = bearing(from, to);
        let eta = (d / 1000.0 / WALKING_SPEED_KMH * 60.0).round();
        Self {
            distance: d,
            bearing: b,
            direction: Compass::from_bearing(b),
            eta_minutes: eta as u32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation<'a> {
    pub location: GeoPoint,
    /// The least loaded tower with spare capacity, if any.
    pub tower: Option<&'a Tower>,
    pub route: Route,
}

/// Suggest a spot with better service: next to the least loaded tower that still has
/// spare capacity. Towers without load telemetry are not considered. With nothing
/// available the user is told to stay where they are.
pub fn recommend(position: GeoPoint, towers: &[Tower]) -> Recommendation<'_> {
    let mut best: Option<(f64, &Tower)> = None;
    for tower in towers {
        let Some(load) = tower.load else {
            continue;
        };
        let ratio = load.ratio();
        if ratio >= AVAILABLE_LOAD_RATIO {
            continue;
        }
        if best.map_or(true, |(x, _)| ratio < x) {
            best = Some((ratio, tower));
        }
    }

    let tower = best.map(|(_, tower)| tower);
    let location = tower.map_or(position, |x| x.position);
    Recommendation {
        location,
        tower,
        route: Route::between(position, location),
    }
}
