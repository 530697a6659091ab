//! OS2IoT device API client
//!
//! `GET {base_url}/{id}` returns the device record, `PUT {base_url}/{id}`
//! replaces it. Every request carries the static `X-API-KEY` header.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use tracing::debug;

use super::DeviceRegistry;
use crate::config::RegistryConfig;
use crate::error::{FetchError, UpdateError};
use crate::types::{RemoteDevice, UpdatePayload, SUCCESS_STATUSES};

// X-API-KEY; header names are case-insensitive
const API_KEY_HEADER: &str = "x-api-key";

/// OS2IoT registry client
pub struct Os2iotClient {
    client: Client,
    config: RegistryConfig,
}

impl Os2iotClient {
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let client = Client::builder()
            .default_headers(default_headers(&config.api_key)?)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }
}

fn default_headers(api_key: &str) -> Result<HeaderMap> {
    let mut key = HeaderValue::from_str(api_key).context("API key is not a valid header value")?;
    key.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(API_KEY_HEADER, key);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

#[async_trait]
impl DeviceRegistry for Os2iotClient {
    async fn fetch_device(&self, id: i64) -> Result<RemoteDevice, FetchError> {
        let url = self.config.device_url(id);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport { id, message: e.to_string() })?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(FetchError::Status { id, status });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport { id, message: e.to_string() })?;

        serde_json::from_slice(&body).map_err(|source| FetchError::Decode { id, source })
    }

    async fn update_device(&self, payload: &UpdatePayload) -> Result<(), UpdateError> {
        let id = payload.id;
        let url = self.config.device_url(id);
        debug!("PUT {}", url);

        let response = self
            .client
            .put(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| UpdateError::Transport { id, message: e.to_string() })?;

        let status = response.status().as_u16();
        if SUCCESS_STATUSES.contains(&status) {
            Ok(())
        } else {
            Err(UpdateError::Status { id, status })
        }
    }

    fn name(&self) -> &str {
        "OS2IoT"
    }
}
