//! Client for the OpenCelliD `getInArea` API.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use super::{SourceError, MAX_RADIUS};
use crate::{
    distance::{distance, BoundingBox},
    model::{GeoPoint, RadioTechnology, Tower},
};

#[derive(Debug, Clone, Deserialize)]
pub struct OpenCellIdConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum number of cells requested per query.
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://opencellid.org/cell/getInArea".to_owned()
}

fn default_user_agent() -> String {
    concat!("cellscout/", env!("CARGO_PKG_VERSION")).to_owned()
}

fn default_limit() -> u32 {
    100
}

fn default_timeout() -> u64 {
    10
}

impl Default for OpenCellIdConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            limit: default_limit(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Deserialize)]
struct AreaResponse {
    #[serde(default)]
    cells: Vec<Cell>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct Cell {
    radio: RadioTechnology,
    mnc: u16,
    // older responses send coordinates as strings
    lat: Coordinate,
    lon: Coordinate,
    #[serde(default)]
    range: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    fn value(&self) -> Option<f64> {
        match self {
            Coordinate::Number(x) => Some(*x),
            Coordinate::Text(x) => x.trim().parse().ok(),
        }
    }
}

#[derive(Debug)]
pub struct OpenCellIdClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    limit: u32,
}

impl OpenCellIdClient {
    pub fn new(config: OpenCellIdConfig) -> Result<Self, SourceError> {
        let api_key = config
            .api_key
            .filter(|x| !x.is_empty())
            .ok_or(SourceError::MissingApiKey)?;
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_key,
            base_url: config.base_url,
            limit: config.limit,
        })
    }

    /// Cells within `radius` meters of `center`.
    pub async fn towers_in_area(
        &self,
        center: GeoPoint,
        radius: f64,
    ) -> Result<Vec<Tower>, SourceError> {
        if radius > MAX_RADIUS {
            return Err(SourceError::RadiusTooLarge);
        }

        let b = BoundingBox::around(center, radius);
        let bbox = format!("{},{},{},{}", b.min_lat, b.min_lon, b.max_lat, b.max_lon);
        let limit = self.limit.to_string();
        debug!(%bbox, limit = self.limit, "querying OpenCelliD");

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("BBOX", bbox.as_str()),
                ("format", "json"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.base_url.clone(),
            });
        }

        let body: AreaResponse = response.json().await?;
        if let Some(error) = body.error {
            return Err(SourceError::Api(error));
        }

        let mut towers = Vec::with_capacity(body.cells.len());
        for cell in body.cells {
            let position = match (cell.lat.value(), cell.lon.value()) {
                (Some(lat), Some(lon)) => GeoPoint::new(lat, lon),
                _ => {
                    warn!(mnc = cell.mnc, "skipping cell with unreadable coordinates");
                    continue;
                }
            };
            let position = match position {
                Ok(x) => x,
                Err(e) => {
                    warn!(mnc = cell.mnc, "skipping cell: {e}");
                    continue;
                }
            };
            if distance(center, position) > radius {
                continue;
            }
            let mut tower = Tower::new(position, cell.mnc, cell.radio);
            tower.range = cell.range;
            towers.push(tower);
        }

        debug!(count = towers.len(), "OpenCelliD cells in range");
        Ok(towers)
    }
}
