//! Device types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Device row read from the uploaded CSV
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRow {
    /// 1-based data line number in the source file (header excluded)
    pub line: usize,
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Raw JSON text from the metadata column, `None` when the cell is empty
    pub metadata: Option<String>,
}

/// Device record as returned by `GET {base_url}/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDevice {
    pub id: i64,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub device_type: Value,
    pub application: ApplicationRef,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub comment_on_location: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub metadata: Option<String>,
    #[serde(default)]
    pub device_model: Option<Value>,
    #[serde(default)]
    pub lorawan_settings: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRef {
    pub id: Value,
}

/// GeoJSON point, coordinates in [longitude, latitude] order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

impl RemoteDevice {
    /// Longitude of the registered location, 0.0 when absent
    pub fn longitude(&self) -> f64 {
        self.coordinate(0)
    }

    /// Latitude of the registered location, 0.0 when absent
    pub fn latitude(&self) -> f64 {
        self.coordinate(1)
    }

    fn coordinate(&self, index: usize) -> f64 {
        self.location
            .as_ref()
            .and_then(|l| l.coordinates.get(index).copied())
            .unwrap_or(0.0)
    }
}
