//! In-memory registry for tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use super::DeviceRegistry;
use crate::error::{FetchError, UpdateError};
use crate::types::{ApplicationRef, Location, RemoteDevice, UpdatePayload, SUCCESS_STATUSES};

/// Devices keyed by id plus a scripted list of PUT statuses
#[derive(Default)]
pub struct MockRegistry {
    devices: HashMap<i64, RemoteDevice>,
    fetch_statuses: HashMap<i64, u16>,
    put_statuses: Mutex<VecDeque<u16>>,
    fetched: Mutex<Vec<i64>>,
    updates: Mutex<Vec<UpdatePayload>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, device: RemoteDevice) -> Self {
        self.devices.insert(device.id, device);
        self
    }

    /// Make `GET` for `id` answer with `status`
    pub fn with_fetch_status(mut self, id: i64, status: u16) -> Self {
        self.fetch_statuses.insert(id, status);
        self
    }

    /// Statuses returned by consecutive `PUT`s; 200 once exhausted
    pub fn with_put_statuses(self, statuses: &[u16]) -> Self {
        self.put_statuses.lock().unwrap().extend(statuses.iter().copied());
        self
    }

    pub fn fetched(&self) -> Vec<i64> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<UpdatePayload> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeviceRegistry for MockRegistry {
    async fn fetch_device(&self, id: i64) -> Result<RemoteDevice, FetchError> {
        self.fetched.lock().unwrap().push(id);

        if let Some(&status) = self.fetch_statuses.get(&id) {
            return Err(FetchError::Status { id, status });
        }

        self.devices
            .get(&id)
            .cloned()
            .ok_or(FetchError::Status { id, status: 404 })
    }

    async fn update_device(&self, payload: &UpdatePayload) -> Result<(), UpdateError> {
        self.updates.lock().unwrap().push(payload.clone());

        let status = self.put_statuses.lock().unwrap().pop_front().unwrap_or(200);
        if SUCCESS_STATUSES.contains(&status) {
            Ok(())
        } else {
            Err(UpdateError::Status { id: payload.id, status })
        }
    }

    fn name(&self) -> &str {
        "MockRegistry"
    }
}

/// Remote record with every passthrough field populated
pub fn remote_device(id: i64, name: &str, lat: f64, lon: f64, metadata: Option<&str>) -> RemoteDevice {
    RemoteDevice {
        id,
        name: Some(name.to_string()),
        device_type: json!("LORAWAN"),
        application: ApplicationRef { id: json!(12) },
        location: Some(Location { coordinates: vec![lon, lat] }),
        comment_on_location: Some("Mounted on lamp post".to_string()),
        comment: Some("Installed 2023".to_string()),
        metadata: metadata.map(str::to_string),
        device_model: Some(json!(3)),
        lorawan_settings: Some(json!({
            "devEUI": "70b3d57ed0000001",
            "deviceProfileID": "f1b9e2c4",
            "activationType": "OTAA"
        })),
    }
}
