//! Reconciler: compares CSV rows with the registry and builds the update payload
//!
//! One `GET` per row, strictly in file order. Rows whose fetch fails are left
//! out of both the preview and the payload without surfacing an error.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::services::metadata::compare_metadata;
use crate::services::registry::DeviceRegistry;
use crate::types::{
    ChangeRecord, ChangeStatus, DeviceRow, FieldChange, ReconcileReport, RemoteDevice, UpdatePayload,
};

/// Coordinate differences at or below this are round-trip noise
pub const FLOAT_TOLERANCE: f64 = 1e-9;

/// Result of comparing one row with its remote record
#[derive(Debug, Clone)]
pub struct RowDiff {
    pub record: ChangeRecord,
    pub payload: Option<UpdatePayload>,
}

/// `true` when two coordinates differ by more than the tolerance
pub fn coordinate_changed(remote: f64, local: f64) -> bool {
    (remote - local).abs() > FLOAT_TOLERANCE
}

/// Compare one CSV row with the remote record fetched for it
pub fn diff_row(row: &DeviceRow, remote: &RemoteDevice) -> RowDiff {
    let remote_lat = remote.latitude();
    let remote_lon = remote.longitude();

    let name_changed = remote.name.as_deref() != Some(row.name.as_str());
    let lat_changed = coordinate_changed(remote_lat, row.latitude);
    let lon_changed = coordinate_changed(remote_lon, row.longitude);
    let metadata = compare_metadata(row.id, remote.metadata.as_deref(), row.metadata.as_deref());

    let changed = name_changed || lat_changed || lon_changed || metadata.changed;

    if changed {
        debug!(
            "Device {} changed (name: {}, latitude: {}, longitude: {}, metadata: {})",
            row.id, name_changed, lat_changed, lon_changed, metadata.changed
        );
    }

    let payload = changed.then(|| UpdatePayload {
        id: remote.id,
        name: row.name.clone(),
        device_type: remote.device_type.clone(),
        application_id: remote.application.id.clone(),
        longitude: row.longitude,
        latitude: row.latitude,
        comment_on_location: remote.comment_on_location.clone(),
        comment: remote.comment.clone(),
        metadata: metadata.resolved.to_payload(),
        device_model_id: remote.device_model.clone(),
        lorawan_settings: remote.lorawan_settings.clone(),
    });

    let record = ChangeRecord {
        id: row.id,
        name: FieldChange { old: remote.name.clone(), new: Some(row.name.clone()) },
        latitude: FieldChange { old: remote_lat, new: row.latitude },
        longitude: FieldChange { old: remote_lon, new: row.longitude },
        metadata: FieldChange { old: remote.metadata.clone(), new: row.metadata.clone() },
        status: if changed { ChangeStatus::Changed } else { ChangeStatus::Unchanged },
    };

    RowDiff { record, payload }
}

/// Run one reconciliation pass over `rows`
pub async fn reconcile(registry: &dyn DeviceRegistry, rows: &[DeviceRow]) -> ReconcileReport {
    let start_time = Instant::now();
    let mut report = ReconcileReport {
        rows_read: rows.len(),
        ..Default::default()
    };

    info!("Reconciling {} rows against {}", rows.len(), registry.name());

    for row in rows {
        let remote = match registry.fetch_device(row.id).await {
            Ok(remote) => remote,
            Err(e @ FetchError::Status { .. }) => {
                debug!("Skipping line {}: {}", row.line, e);
                report.skipped += 1;
                continue;
            }
            Err(e) => {
                warn!("Skipping line {}: {}", row.line, e);
                report.skipped += 1;
                continue;
            }
        };

        let diff = diff_row(row, &remote);

        if let Some(payload) = diff.payload {
            report.changed_count += 1;
            report.payload.push(payload);
        }
        report.preview.push(diff.record);
    }

    report.total_count = report.preview.len();

    info!(
        "Reconciliation finished in {}ms: {} of {} devices change, {} of {} rows skipped",
        start_time.elapsed().as_millis(),
        report.changed_count,
        report.total_count,
        report.skipped,
        report.rows_read
    );

    report
}
