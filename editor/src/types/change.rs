//! Reconciliation result types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Display status of a previewed row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    Changed,
    Unchanged,
}

impl ChangeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ChangeStatus::Changed => "Changed",
            ChangeStatus::Unchanged => "No change",
        }
    }
}

/// Before/after pair for a single field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange<T> {
    pub old: T,
    pub new: T,
}

/// One previewed device: the CSV row paired with its remote record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub id: i64,
    pub name: FieldChange<Option<String>>,
    pub latitude: FieldChange<f64>,
    pub longitude: FieldChange<f64>,
    /// Raw metadata text on both sides, as it was read
    pub metadata: FieldChange<Option<String>>,
    pub status: ChangeStatus,
}

impl ChangeRecord {
    pub fn is_changed(&self) -> bool {
        self.status == ChangeStatus::Changed
    }
}

/// Full-record body for `PUT {base_url}/{id}`
///
/// Field order matches what the registry documents for device updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayload {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: Value,
    pub application_id: Value,
    pub longitude: f64,
    pub latitude: f64,
    pub comment_on_location: Option<String>,
    pub comment: Option<String>,
    /// JSON-encoded metadata object, `null` when empty
    pub metadata: Option<String>,
    pub device_model_id: Option<Value>,
    pub lorawan_settings: Option<Value>,
}

/// Output of one reconciliation pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub preview: Vec<ChangeRecord>,
    pub payload: Vec<UpdatePayload>,
    pub changed_count: usize,
    /// Number of previewed rows (rows whose fetch succeeded)
    pub total_count: usize,
    pub rows_read: usize,
    pub skipped: usize,
}

impl ReconcileReport {
    pub fn has_changes(&self) -> bool {
        !self.payload.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_payload_serializes_camel_case_with_nulls() {
        let payload = UpdatePayload {
            id: 5,
            name: "Sensor A".to_string(),
            device_type: json!("LORAWAN"),
            application_id: json!(12),
            longitude: 12.0,
            latitude: 55.01,
            comment_on_location: None,
            comment: Some("north side".to_string()),
            metadata: None,
            device_model_id: Some(json!(3)),
            lorawan_settings: Some(json!({ "devEUI": "0011223344556677" })),
        };

        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["type"], json!("LORAWAN"));
        assert_eq!(value["applicationId"], json!(12));
        assert_eq!(value["commentOnLocation"], Value::Null);
        assert_eq!(value["metadata"], Value::Null);
        assert_eq!(value["deviceModelId"], json!(3));
        assert_eq!(value["lorawanSettings"]["devEUI"], json!("0011223344556677"));
        assert_eq!(value.as_object().unwrap().len(), 11);
    }

    #[test]
    fn test_change_status_labels() {
        assert_eq!(ChangeStatus::Changed.label(), "Changed");
        assert_eq!(ChangeStatus::Unchanged.label(), "No change");
    }
}
