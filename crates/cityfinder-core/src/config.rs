// crates/cityfinder-core/src/config.rs

//! Runtime settings, loadable from a TOML file.
//!
//! ```toml
//! dataset_url = "https://example.com/cities.json"
//! max_retries = 5
//! retry_delay_ms = 500
//! timeout_secs = 10
//! favorites_key = "FavoriteCityIds"
//! folding = "transliterate"
//! ```
//!
//! Every field is optional; missing fields take the [`Config::default`] value.

use crate::error::Result;
use crate::favorites::FAVORITES_KEY;
use crate::source::{RetryPolicy, DATASET_URL};
use crate::text::Folding;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where the dataset is downloaded from.
    pub dataset_url: String,
    /// Retries after the first failed attempt.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    /// Per-request HTTP timeout.
    pub timeout_secs: u64,
    /// Storage key of the favorites blob.
    pub favorites_key: String,
    /// Case folding for sorting and matching.
    pub folding: Folding,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset_url: DATASET_URL.to_string(),
            max_retries: 3,
            retry_delay_ms: 2_000,
            timeout_secs: 30,
            favorites_key: FAVORITES_KEY.to_string(),
            folding: Folding::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CityError;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn partial_override() {
        let config = Config::from_toml_str(
            r#"
            max_retries = 5
            folding = "transliterate"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.folding, Folding::Transliterate);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(
            config.retry_policy(),
            RetryPolicy {
                max_retries: 5,
                delay: Duration::from_secs(2),
            }
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("max_retires = 5").unwrap_err();
        assert!(matches!(err, CityError::Config(_)));
    }

    #[test]
    fn loads_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("cityfinder.toml");
        std::fs::write(&path, "timeout_secs = 3\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(3));
    }
}
