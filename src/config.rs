//! Client configuration

use crate::error::Result;
use std::time::Duration;
use url::Url;

/// Environment variable holding the API base URL
pub const BASE_URL_ENV: &str = "EXTRACTION_API_URL";

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_EXPORT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection and timeout configuration for [`crate::api::ApiClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root; endpoint paths are appended to it
    pub base_url: Url,
    /// Timeout for upload, schema and processing calls (default: 5 minutes)
    pub upload_timeout: Duration,
    /// Timeout for the export download (default: 1 minute)
    pub export_timeout: Duration,
}

impl ClientConfig {
    /// Build a configuration for the given base URL with default timeouts.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
            export_timeout: DEFAULT_EXPORT_TIMEOUT,
        })
    }

    /// Configuration for a backend on `http://localhost:5000/api`.
    pub fn local() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Read the base URL from `EXTRACTION_API_URL`, falling back to the default.
    pub fn from_env() -> Result<Self> {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::with_base_url(url.trim()),
            _ => Self::local(),
        }
    }

    /// Resolve an endpoint path (e.g. `schemas/abc`) against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        // Url::join drops the last segment unless the base ends in '/'
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        Ok(base.join(path.trim_start_matches('/'))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::local().unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:5000/api");
        assert_eq!(config.upload_timeout, Duration::from_secs(300));
        assert_eq!(config.export_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let config = ClientConfig::local().unwrap();
        assert_eq!(
            config.endpoint("/schemas").unwrap().as_str(),
            "http://localhost:5000/api/schemas"
        );
        assert_eq!(
            config.endpoint("export/r-1").unwrap().as_str(),
            "http://localhost:5000/api/export/r-1"
        );
    }

    #[test]
    fn test_endpoint_with_trailing_slash() {
        let config = ClientConfig::with_base_url("http://example.com/v1/").unwrap();
        assert_eq!(
            config.endpoint("reset/s-1").unwrap().as_str(),
            "http://example.com/v1/reset/s-1"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(ClientConfig::with_base_url("not a url").is_err());
    }
}
