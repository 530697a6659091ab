//! Device registry access
//!
//! Uses the OS2IoT REST API in production, an in-memory registry for tests.

#[cfg(test)]
pub mod mock;
mod os2iot;

pub use os2iot::Os2iotClient;

use async_trait::async_trait;

use crate::error::{FetchError, UpdateError};
use crate::types::{RemoteDevice, UpdatePayload};

/// Registry trait for abstraction (OS2IoT, in-memory, etc.)
#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    /// Fetch the current record of device `id`
    async fn fetch_device(&self, id: i64) -> Result<RemoteDevice, FetchError>;

    /// Replace the full record of `payload.id`
    async fn update_device(&self, payload: &UpdatePayload) -> Result<(), UpdateError>;

    /// Get registry name for logging
    fn name(&self) -> &str;
}
