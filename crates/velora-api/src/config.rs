use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_path: String,
    pub asset_host_url: String,
    pub asset_host_key: String,
    pub asset_host_secret: String,
    pub admin_session_token: String,
    pub gallery_page_size: u32,
    pub max_upload_bytes: u64,
    pub deletion_sweep_interval: Duration,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_path", &self.database_path)
            .field("asset_host_url", &self.asset_host_url)
            .field("asset_host_key", &self.asset_host_key)
            .field("asset_host_secret", &"[REDACTED]")
            .field("admin_session_token", &"[REDACTED]")
            .field("gallery_page_size", &self.gallery_page_size)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("deletion_sweep_interval", &self.deletion_sweep_interval)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = value_or_default(&lookup, "VELORA_BIND_ADDR", "127.0.0.1:8080");
        let database_path = value_or_default(&lookup, "VELORA_DB_PATH", "velora.db");

        let asset_host_url = required_trimmed(&lookup, "ASSET_HOST_URL")?;
        if !is_http_url(&asset_host_url) {
            return Err(ConfigError::Invalid(
                "ASSET_HOST_URL must start with http:// or https://".to_string(),
            ));
        }
        let asset_host_url = trim_trailing(&asset_host_url).to_string();

        let asset_host_key = required_trimmed(&lookup, "ASSET_HOST_KEY")?;
        let asset_host_secret = required_trimmed(&lookup, "ASSET_HOST_SECRET")?;

        let admin_session_token = required_trimmed(&lookup, "ADMIN_SESSION_TOKEN")?;
        if admin_session_token.len() < 16 {
            return Err(ConfigError::Invalid(
                "ADMIN_SESSION_TOKEN must be at least 16 characters".to_string(),
            ));
        }

        let gallery_page_size = value_or_default(&lookup, "GALLERY_PAGE_SIZE", "100")
            .parse::<u32>()
            .map_err(|_| {
                ConfigError::Invalid("GALLERY_PAGE_SIZE must be an integer in [1, 100]".to_string())
            })?;
        if !(1..=100).contains(&gallery_page_size) {
            return Err(ConfigError::Invalid(
                "GALLERY_PAGE_SIZE must be in [1, 100]".to_string(),
            ));
        }

        let max_upload_mib = value_or_default(&lookup, "MAX_UPLOAD_MIB", "25")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::Invalid("MAX_UPLOAD_MIB must be an integer in [1, 100]".to_string())
            })?;
        if !(1..=100).contains(&max_upload_mib) {
            return Err(ConfigError::Invalid(
                "MAX_UPLOAD_MIB must be in [1, 100]".to_string(),
            ));
        }

        let sweep_interval_secs = value_or_default(&lookup, "DELETION_SWEEP_INTERVAL_SECS", "300")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::Invalid(
                    "DELETION_SWEEP_INTERVAL_SECS must be an integer in [10, 86400]".to_string(),
                )
            })?;
        if !(10..=86_400).contains(&sweep_interval_secs) {
            return Err(ConfigError::Invalid(
                "DELETION_SWEEP_INTERVAL_SECS must be in [10, 86400]".to_string(),
            ));
        }

        Ok(Self {
            bind_addr,
            database_path,
            asset_host_url,
            asset_host_key,
            asset_host_secret,
            admin_session_token,
            gallery_page_size,
            max_upload_bytes: max_upload_mib * 1024 * 1024,
            deletion_sweep_interval: Duration::from_secs(sweep_interval_secs),
        })
    }
}

fn value_or_default(lookup: impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    optional_trimmed(lookup, name).unwrap_or_else(|| default.to_string())
}

fn required_trimmed(
    lookup: impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    optional_trimmed(lookup, name).ok_or(ConfigError::MissingVar(name))
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn trim_trailing(value: &str) -> &str {
    value.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn base_map() -> HashMap<&'static str, &'static str> {
        let mut map = HashMap::new();
        map.insert("ASSET_HOST_URL", "https://assets.example.com/");
        map.insert("ASSET_HOST_KEY", "api-key");
        map.insert("ASSET_HOST_SECRET", "sensitive-asset-secret");
        map.insert("ADMIN_SESSION_TOKEN", "sensitive-session-token");
        map
    }

    fn from_map(map: &HashMap<&str, &str>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|key| map.get(key).map(|value| (*value).to_string()))
    }

    #[test]
    fn config_requires_asset_host_credentials() {
        let map: HashMap<&str, &str> = HashMap::new();
        let err = from_map(&map).unwrap_err();
        assert!(err.to_string().contains("ASSET_HOST_URL"));
    }

    #[test]
    fn config_applies_defaults_and_trims_base_url() {
        let config = from_map(&base_map()).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.asset_host_url, "https://assets.example.com");
        assert_eq!(config.gallery_page_size, 100);
        assert_eq!(config.max_upload_bytes, 25 * 1024 * 1024);
    }

    #[test]
    fn config_rejects_short_session_token() {
        let mut map = base_map();
        map.insert("ADMIN_SESSION_TOKEN", "short");
        let err = from_map(&map).unwrap_err();
        assert!(err.to_string().contains("ADMIN_SESSION_TOKEN"));
    }

    #[test]
    fn config_rejects_oversized_page_size() {
        let mut map = base_map();
        map.insert("GALLERY_PAGE_SIZE", "500");
        let err = from_map(&map).unwrap_err();
        assert!(err.to_string().contains("GALLERY_PAGE_SIZE"));
    }

    #[test]
    fn config_redacts_sensitive_debug_fields() {
        let config = from_map(&base_map()).unwrap();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("sensitive-asset-secret"));
        assert!(!debug_output.contains("sensitive-session-token"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
