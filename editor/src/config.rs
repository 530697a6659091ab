//! Configuration management

use anyhow::{self, Context, Result};

/// Connection settings for the OS2IoT device API
#[derive(Clone)]
pub struct RegistryConfig {
    /// Device endpoint, e.g. "https://os2iot.example.dk/api/v1/iot-device" (no trailing slash)
    pub base_url: String,

    /// Static key sent as `X-API-KEY`
    pub api_key: String,
}

impl RegistryConfig {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// URL of a single device record
    pub fn device_url(&self, id: i64) -> String {
        format!("{}/{}", self.base_url, id)
    }
}

// Hand-written so the key never ends up in logs
impl std::fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .finish()
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub registry: RegistryConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let base_url = env_with_fallback("OS2IOT_BASE_URL", "os2iot_BASE_URL")
            .context("OS2IOT_BASE_URL must be set")?
            .trim()
            .to_string();

        let api_key = env_with_fallback("OS2IOT_API_KEY", "os2iot_api")
            .context("OS2IOT_API_KEY must be set")?;

        if base_url.is_empty() {
            anyhow::bail!("OS2IOT_BASE_URL is empty");
        }

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            anyhow::bail!("OS2IOT_BASE_URL must start with http:// or https:// (got '{}')", base_url);
        }

        Ok(Self {
            registry: RegistryConfig::new(&base_url, api_key),
        })
    }
}

/// Log directory, read before the rest of the configuration so logging is up first
pub fn logs_dir_from_env() -> String {
    std::env::var("LOGS_DIR").unwrap_or_else(|_| "./logs".to_string())
}

fn env_with_fallback(name: &str, legacy: &str) -> Result<String, std::env::VarError> {
    std::env::var(name).or_else(|_| std::env::var(legacy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_config_trims_trailing_slash() {
        let config = RegistryConfig::new("https://iot.example.dk/api/v1/iot-device/", "key");
        assert_eq!(config.base_url, "https://iot.example.dk/api/v1/iot-device");
        assert_eq!(config.device_url(5), "https://iot.example.dk/api/v1/iot-device/5");
    }

    #[test]
    fn test_registry_config_debug_hides_key() {
        let config = RegistryConfig::new("https://iot.example.dk/api", "super-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("iot.example.dk"));
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_reads_legacy_variable_names() {
        std::env::remove_var("OS2IOT_BASE_URL");
        std::env::remove_var("OS2IOT_API_KEY");
        std::env::set_var("os2iot_BASE_URL", "https://legacy.example.dk/devices/");
        std::env::set_var("os2iot_api", "legacy-key");

        let config = Config::from_env().unwrap();
        assert_eq!(config.registry.base_url, "https://legacy.example.dk/devices");
        assert_eq!(config.registry.api_key, "legacy-key");

        // Cleanup
        std::env::remove_var("os2iot_BASE_URL");
        std::env::remove_var("os2iot_api");
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_rejects_url_without_scheme() {
        std::env::set_var("OS2IOT_BASE_URL", "iot.example.dk/devices");
        std::env::set_var("OS2IOT_API_KEY", "key");

        assert!(Config::from_env().is_err());

        // Cleanup
        std::env::remove_var("OS2IOT_BASE_URL");
        std::env::remove_var("OS2IOT_API_KEY");
    }
}
