use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use cellscout::{
    source::{SourceError, TowerSource},
    traffic::TrafficArea,
    CoordinateError, GeoPoint, Weights,
};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

pub mod select;
pub mod signal;
pub mod towers;

/// Shared, read-only state for every request.
pub struct AppState {
    pub source: TowerSource,
    pub preferred_network: Option<u16>,
    pub allow_roaming: bool,
    /// Meters.
    pub search_radius: f64,
    pub nearest_limit: usize,
    pub weights: Weights,
    pub traffic_areas: Vec<TrafficArea>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("lat and lon are required")]
    MissingPosition,

    #[error(transparent)]
    Coordinate(#[from] CoordinateError),

    #[error("radius must be a positive number of kilometers")]
    InvalidRadius,

    #[error("invalid time \"{0}\", expected HH:MM")]
    InvalidTime(String),

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Source(SourceError::RadiusTooLarge) => StatusCode::BAD_REQUEST,
            ApiError::Source(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Source(e) = self {
            tracing::error!("failed to fetch cell towers: {e}");
        }
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

/// A position given either as `lat`/`lon` numbers or as coordinate text in `at`.
#[derive(Debug, Deserialize)]
pub struct PositionQuery {
    lat: Option<f64>,
    #[serde(alias = "lng")]
    lon: Option<f64>,
    at: Option<String>,
}

impl PositionQuery {
    pub fn resolve(&self) -> Result<GeoPoint, ApiError> {
        if let Some(at) = &self.at {
            return Ok(at.parse()?);
        }
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Ok(GeoPoint::new(lat, lon)?),
            _ => Err(ApiError::MissingPosition),
        }
    }
}

/// Converts an optional radius in kilometers into meters.
pub fn radius_meters(radius_km: Option<f64>, default: f64) -> Result<f64, ApiError> {
    match radius_km {
        None => Ok(default),
        Some(x) if x > 0.0 && x.is_finite() => Ok(x * 1000.0),
        Some(_) => Err(ApiError::InvalidRadius),
    }
}

#[cfg(test)]
pub(crate) fn test_state(source: TowerSource) -> AppState {
    AppState {
        source,
        preferred_network: Some(2),
        allow_roaming: false,
        search_radius: cellscout::source::DEFAULT_RADIUS,
        nearest_limit: 5,
        weights: Weights::DEFAULT,
        traffic_areas: Vec::new(),
    }
}
