//! Best tower selection.
//!
//! Towers are filtered to the preferred operator, scored as a weighted sum of radio
//! technology, congestion and distance, then ranked best first. The weights are chosen so
//! that radio technology always dominates congestion, and congestion dominates distance for
//! any tower within a few kilometers.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    distance::distance,
    model::{GeoPoint, Tower},
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightsError {
    #[error("{name} weight must be a finite, non-negative number, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("distance_divisor must be a finite, positive number, got {0}")]
    InvalidDivisor(f64),
}

/// Multipliers applied to each scoring factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWeights")]
pub struct Weights {
    /// Points per radio technology tier (LTE 3, UMTS 2, GSM 1, other 0).
    pub radio: f64,
    /// Points per congestion tier (low 3, medium 2, high 1).
    pub congestion: f64,
    /// Meters of distance that cost one point.
    pub distance_divisor: f64,
}

#[derive(Deserialize)]
#[serde(default)]
struct RawWeights {
    radio: f64,
    congestion: f64,
    distance_divisor: f64,
}

impl Default for RawWeights {
    fn default() -> Self {
        let Weights {
            radio,
            congestion,
            distance_divisor,
        } = Weights::DEFAULT;
        Self {
            radio,
            congestion,
            distance_divisor,
        }
    }
}

impl TryFrom<RawWeights> for Weights {
    type Error = WeightsError;

    fn try_from(value: RawWeights) -> Result<Self, Self::Error> {
        Weights::new(value.radio, value.congestion, value.distance_divisor)
    }
}

impl Weights {
    pub fn new(radio: f64, congestion: f64, distance_divisor: f64) -> Result<Self, WeightsError> {
        for (name, value) in [("radio", radio), ("congestion", congestion)] {
            if !value.is_finite() || value < 0.0 {
                return Err(WeightsError::InvalidWeight { name, value });
            }
        }
        if !distance_divisor.is_finite() || distance_divisor <= 0.0 {
            return Err(WeightsError::InvalidDivisor(distance_divisor));
        }
        Ok(Self {
            radio,
            congestion,
            distance_divisor,
        })
    }

    pub const DEFAULT: Weights = Weights {
        radio: 1000.0,
        congestion: 200.0,
        distance_divisor: 10.0,
    };

    pub fn score(&self, tower: &Tower, distance: f64) -> f64 {
        tower.radio.score() * self.radio + tower.congestion.score() * self.congestion
            - distance / self.distance_divisor
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredTower<'a> {
    #[serde(flatten)]
    pub tower: &'a Tower,
    /// Meters from the user.
    pub distance: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection<'a> {
    /// Candidates ordered best first. `roaming` is set when no tower belonged to the
    /// preferred operator and every operator was considered instead.
    Ranked {
        towers: Vec<ScoredTower<'a>>,
        roaming: bool,
    },
    /// Nothing on the preferred operator and roaming is not allowed.
    NoEligibleTower,
}

impl<'a> Selection<'a> {
    pub fn best(&self) -> Option<&ScoredTower<'a>> {
        match self {
            Selection::Ranked { towers, .. } => towers.first(),
            Selection::NoEligibleTower => None,
        }
    }

    pub fn towers(&self) -> &[ScoredTower<'a>] {
        match self {
            Selection::Ranked { towers, .. } => towers,
            Selection::NoEligibleTower => &[],
        }
    }

    pub fn is_roaming(&self) -> bool {
        matches!(self, Selection::Ranked { roaming: true, .. })
    }
}

/// Rank `towers` for a user at `user` with the default weights.
pub fn select_best(
    user: GeoPoint,
    towers: &[Tower],
    preferred_network: Option<u16>,
    allow_roaming: bool,
) -> Selection<'_> {
    select_best_with(&Weights::DEFAULT, user, towers, preferred_network, allow_roaming)
}

pub fn select_best_with<'a>(
    weights: &Weights,
    user: GeoPoint,
    towers: &'a [Tower],
    preferred_network: Option<u16>,
    allow_roaming: bool,
) -> Selection<'a> {
    let mut candidates: Vec<&Tower> = match preferred_network {
        Some(network) => towers.iter().filter(|x| x.network == network).collect(),
        None => towers.iter().collect(),
    };

    let mut roaming = false;
    if candidates.is_empty() {
        if let Some(network) = preferred_network {
            if !allow_roaming {
                debug!(network, "no tower on preferred network and roaming disabled");
                return Selection::NoEligibleTower;
            }
            debug!(network, "no tower on preferred network, considering all operators");
            candidates = towers.iter().collect();
            roaming = !candidates.is_empty();
        }
    }

    let mut ranked: Vec<ScoredTower> = candidates
        .into_iter()
        .map(|tower| {
            let distance = distance(user, tower.position);
            ScoredTower {
                tower,
                distance,
                score: weights.score(tower, distance),
            }
        })
        .collect();
    // sort_by is stable, equal scores keep their input order
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    Selection::Ranked {
        towers: ranked,
        roaming,
    }
}
