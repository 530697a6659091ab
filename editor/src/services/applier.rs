//! Applier: sends one full-record update per payload entry
//!
//! Updates go out strictly one after another with no retries. A failed
//! update is recorded and the loop moves on; devices updated before a
//! failure stay updated.

use std::time::Instant;

use tracing::{error, info};

use crate::error::UpdateError;
use crate::services::registry::DeviceRegistry;
use crate::types::{ApplyFailure, ApplySummary, FailureReason, UpdatePayload};

/// Apply `payload` to the registry and summarize the outcome
pub async fn apply_updates(registry: &dyn DeviceRegistry, payload: &[UpdatePayload]) -> ApplySummary {
    let start_time = Instant::now();
    let mut summary = ApplySummary::default();

    info!("Applying {} updates to {}", payload.len(), registry.name());

    for device in payload {
        match registry.update_device(device).await {
            Ok(()) => summary.succeeded += 1,
            Err(e) => {
                error!("Update failed: {}", e);
                summary.failures.push(failure_from(e));
            }
        }
    }

    info!(
        "Apply finished in {}ms: {} updated, {} failed",
        start_time.elapsed().as_millis(),
        summary.succeeded,
        summary.failures.len()
    );

    summary
}

fn failure_from(err: UpdateError) -> ApplyFailure {
    match err {
        UpdateError::Status { id, status } => ApplyFailure {
            id,
            reason: FailureReason::Status(status),
        },
        UpdateError::Transport { id, message } => ApplyFailure {
            id,
            reason: FailureReason::Transport(message),
        },
    }
}
