//! Where candidate towers come from.

use std::path::PathBuf;

use thiserror::Error;

use crate::{
    coords::CoordinateError,
    distance::distance,
    model::{GeoPoint, Tower},
};

mod file;
mod opencellid;

pub use file::load_file;
pub use opencellid::{OpenCellIdClient, OpenCellIdConfig};

/// Search radius used when the caller does not give one, in meters.
pub const DEFAULT_RADIUS: f64 = 10_000.0;
/// Largest search radius accepted, in meters.
pub const MAX_RADIUS: f64 = 50_000.0;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported tower file format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("invalid tower record: {0}")]
    InvalidCoordinate(#[from] CoordinateError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("OpenCelliD API error: {0}")]
    Api(String),

    #[error("OpenCelliD API key not configured")]
    MissingApiKey,

    #[error("radius cannot exceed {} km", MAX_RADIUS / 1000.0)]
    RadiusTooLarge,
}

/// A tower provider shared by request handlers.
#[derive(Debug)]
pub enum TowerSource {
    /// Towers loaded once from a dataset file.
    Static(Vec<Tower>),
    OpenCellId(OpenCellIdClient),
}

impl TowerSource {
    /// Towers within `radius` meters of `center`.
    pub async fn towers_near(
        &self,
        center: GeoPoint,
        radius: f64,
    ) -> Result<Vec<Tower>, SourceError> {
        if radius > MAX_RADIUS {
            return Err(SourceError::RadiusTooLarge);
        }
        match self {
            TowerSource::Static(towers) => Ok(towers
                .iter()
                .filter(|x| distance(center, x.position) <= radius)
                .cloned()
                .collect()),
            TowerSource::OpenCellId(client) => client.towers_in_area(center, radius).await,
        }
    }
}

/// Towers paired with their distance from `center`, closest first, at most `limit` of them.
pub fn nearest(center: GeoPoint, towers: Vec<Tower>, limit: usize) -> Vec<(Tower, f64)> {
    let mut towers: Vec<_> = towers
        .into_iter()
        .map(|x| {
            let d = distance(center, x.position);
            (x, d)
        })
        .collect();
    towers.sort_by(|a, b| a.1.total_cmp(&b.1));
    towers.truncate(limit);
    towers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RadioTechnology;

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[tokio::test]
    async fn static_source_filters_by_radius() {
        let center = p(0.0, 0.0);
        let source = TowerSource::Static(vec![
            Tower::new(p(0.0, 0.01), 1, RadioTechnology::Lte),
            Tower::new(p(0.0, 0.5), 1, RadioTechnology::Lte),
        ]);

        let towers = source.towers_near(center, DEFAULT_RADIUS).await.unwrap();
        assert_eq!(towers.len(), 1);
        assert_eq!(towers[0].position.lon(), 0.01);

        assert!(matches!(
            source.towers_near(center, MAX_RADIUS + 1.0).await,
            Err(SourceError::RadiusTooLarge)
        ));
    }

    #[test]
    fn nearest_sorts_and_limits() {
        let center = p(0.0, 0.0);
        let towers = (1..=8)
            .rev()
            .map(|i| Tower::new(p(0.0, f64::from(i) * 0.001), 1, RadioTechnology::Gsm))
            .collect();
        let nearest = nearest(center, towers, 5);
        assert_eq!(nearest.len(), 5);
        assert_eq!(nearest[0].0.position.lon(), 0.001);
        assert!(nearest.windows(2).all(|x| x[0].1 <= x[1].1));
    }
}
