//! Tower datasets on disk.
//!
//! JSON files hold either tower objects as serialized by this crate or rows of the cell tower
//! dataset export (`"Radio Type"`, `MNC`, `Latitude`, ...). CSV files follow the OpenCelliD
//! export layout (`radio,mcc,net,area,cell,unit,lon,lat,range,...`) with optional
//! `congestion` and `label` columns.

use std::{fs, path::Path};

use serde::Deserialize;
use tracing::info;

use super::SourceError;
use crate::model::{Congestion, GeoPoint, RadioTechnology, Tower};

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonRecord {
    Native(Tower),
    Dataset(DatasetRow),
}

#[derive(Deserialize)]
struct DatasetRow {
    #[serde(rename = "Radio Type")]
    radio: RadioTechnology,
    #[serde(rename = "MNC")]
    network: u16,
    #[serde(rename = "Latitude")]
    lat: f64,
    #[serde(rename = "Longitude")]
    lon: f64,
    #[serde(rename = "Range (m)", default)]
    range: Option<f64>,
}

#[derive(Deserialize)]
struct CsvRecord {
    radio: RadioTechnology,
    net: u16,
    lon: f64,
    lat: f64,
    #[serde(default)]
    range: Option<f64>,
    #[serde(default)]
    congestion: Option<Congestion>,
    #[serde(default)]
    label: Option<String>,
}

pub fn load_file(path: &Path) -> Result<Vec<Tower>, SourceError> {
    let extension = path
        .extension()
        .and_then(|x| x.to_str())
        .map(str::to_ascii_lowercase);
    let towers = match extension.as_deref() {
        Some("json") => {
            let data = fs::read(path).map_err(|source| SourceError::Io {
                path: path.to_owned(),
                source,
            })?;
            parse_json(&data)?
        }
        Some("csv") => parse_csv(csv::Reader::from_path(path)?)?,
        _ => return Err(SourceError::UnsupportedFormat(path.to_owned())),
    };

    info!(count = towers.len(), path = %path.display(), "loaded towers");
    Ok(towers)
}

fn parse_json(data: &[u8]) -> Result<Vec<Tower>, SourceError> {
    let records: Vec<JsonRecord> = serde_json::from_slice(data)?;
    records
        .into_iter()
        .map(|record| -> Result<Tower, SourceError> {
            match record {
                JsonRecord::Native(tower) => Ok(tower),
                JsonRecord::Dataset(row) => {
                    let position = GeoPoint::new(row.lat, row.lon)?;
                    let mut tower = Tower::new(position, row.network, row.radio);
                    tower.range = row.range;
                    Ok(tower)
                }
            }
        })
        .collect()
}

fn parse_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<Tower>, SourceError> {
    let mut towers = Vec::new();
    for result in reader.deserialize() {
        let record: CsvRecord = result?;
        let position = GeoPoint::new(record.lat, record.lon)?;
        let mut tower = Tower::new(position, record.net, record.radio);
        tower.range = record.range;
        tower.congestion = record.congestion.unwrap_or_default();
        tower.label = record.label.filter(|x| !x.is_empty());
        towers.push(tower);
    }
    Ok(towers)
}
