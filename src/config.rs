use url::Url;

/// Environment variable holding the API base, read at runtime and captured at build time.
pub const API_BASE_ENV: &str = "DUPE_REFINER_API_BASE";

const BUILD_TIME_API_BASE: Option<&str> = option_env!("DUPE_REFINER_API_BASE");

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("DUPE_REFINER_API_BASE is not set")]
    MissingApiBase,

    #[error("invalid api base {value:?}: {reason}")]
    InvalidApiBase { value: String, reason: String },
}

/// Base endpoint of the duplicate-detection service.
///
/// Stored without a trailing slash so that endpoint URLs are plain
/// concatenations (`{base}/detect-duplicates`, `{base}/download/{filename}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base: String,
}

impl ApiConfig {
    pub fn new(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingApiBase);
        }

        let parsed = Url::parse(trimmed).map_err(|e| ConfigError::InvalidApiBase {
            value: trimmed.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidApiBase {
                value: trimmed.to_string(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }
        if parsed.cannot_be_a_base() {
            return Err(ConfigError::InvalidApiBase {
                value: trimmed.to_string(),
                reason: "url cannot be a base".to_string(),
            });
        }

        Ok(Self { base: trimmed.trim_end_matches('/').to_string() })
    }

    /// Picks the first configured source: explicit value (flag or runtime env,
    /// already merged by clap), then the value captured at build time.
    pub fn resolve(explicit: Option<&str>) -> Result<Self, ConfigError> {
        match explicit.or(BUILD_TIME_API_BASE) {
            Some(raw) => Self::new(raw),
            None => Err(ConfigError::MissingApiBase),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn detect_url(&self) -> String {
        format!("{}/detect-duplicates", self.base)
    }

    pub fn download_url(&self, filename: &str) -> String {
        format!("{}/download/{}", self.base, filename)
    }
}
