use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use cellscout::{
    source::{OpenCellIdConfig, DEFAULT_RADIUS},
    traffic::TrafficArea,
    Weights,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub http_port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Local tower dataset, JSON or CSV. Takes precedence over OpenCelliD.
    pub towers: Option<PathBuf>,
    pub opencellid: Option<OpenCellIdConfig>,

    /// Home operator (MNC) used when a request does not name one.
    pub preferred_network: Option<u16>,
    #[serde(default)]
    pub allow_roaming: bool,
    #[serde(default = "default_search_radius")]
    pub search_radius_km: f64,
    #[serde(default = "default_nearest_limit")]
    pub nearest_limit: usize,

    #[serde(default)]
    pub weights: Weights,
    #[serde(default)]
    pub traffic_areas: Vec<TrafficArea>,
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_search_radius() -> f64 {
    DEFAULT_RADIUS / 1000.0
}

fn default_nearest_limit() -> usize {
    5
}

pub fn load(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path).context("Failed to read config")?;
    let mut config: Config = toml::from_str(&data).context("Failed to parse config")?;

    // the environment overrides the file
    if let Ok(key) = env::var("OPENCELLID_API_KEY") {
        config
            .opencellid
            .get_or_insert_with(OpenCellIdConfig::default)
            .api_key = Some(key);
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal() {
        let config: Config = toml::from_str(r#"towers = "towers.json""#).unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.search_radius_km, 10.0);
        assert_eq!(config.nearest_limit, 5);
        assert_eq!(config.weights, Weights::DEFAULT);
        assert!(!config.allow_roaming);
    }

    #[test]
    fn full() {
        let config: Config = toml::from_str(
            r#"
            http_port = 9000
            log_level = "debug"
            preferred_network = 10
            allow_roaming = true

            [weights]
            congestion = 250.0

            [opencellid]
            api_key = "pk.test"
            limit = 20

            [[traffic_areas]]
            name = "Cape Town CBD"
            position = { lat = -33.9249, lng = 18.4241 }
            congestion = "high"
            peakHours = ["07:00-09:00", "17:00-19:00"]
            "#,
        )
        .unwrap();
        assert_eq!(config.preferred_network, Some(10));
        assert_eq!(config.weights.radio, 1000.0);
        assert_eq!(config.weights.congestion, 250.0);
        let opencellid = config.opencellid.unwrap();
        assert_eq!(opencellid.limit, 20);
        assert_eq!(opencellid.base_url, "https://opencellid.org/cell/getInArea");
        assert_eq!(config.traffic_areas.len(), 1);
    }

    #[test]
    fn rejects_unusable_weights() {
        let path = env::temp_dir().join(format!("cellscout-weights-{}.toml", std::process::id()));
        fs::write(&path, "[weights]\ndistance_divisor = 0.0\n").unwrap();
        let err = load(&path).unwrap_err();
        fs::remove_file(&path).ok();

        let message = format!("{err:#}");
        assert!(message.starts_with("Failed to parse config"), "{message}");
        assert!(message.contains("distance_divisor"), "{message}");
    }
}
