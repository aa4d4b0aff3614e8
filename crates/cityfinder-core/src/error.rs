// crates/cityfinder-core/src/error.rs
use thiserror::Error;

/// Crate-wide error for loading configuration, datasets and caches.
#[derive(Debug, Error)]
pub enum CityError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, CityError>;

/// Why a dataset fetch failed.
///
/// These are surfaced to the [`crate::CityCoordinator`], which moves to the
/// failed state and waits for an explicit reload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Invalid source location: {0}")]
    InvalidUrl(String),

    #[error("No data received")]
    NoData,

    #[error("Failed to decode data: {0}")]
    Decode(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Maximum retry attempts exceeded after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<FetchError> },
}

impl FetchError {
    /// Whether another attempt may succeed.
    ///
    /// A malformed location or payload will fail the same way again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::NoData
                | FetchError::Timeout
                | FetchError::Transport(_)
                | FetchError::Io(_)
        )
    }

    /// Short user-facing hint for a retry prompt.
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FetchError::InvalidUrl(_) => "Please check the source configuration",
            FetchError::NoData | FetchError::Transport(_) => {
                "Please check your internet connection and try again"
            }
            FetchError::Decode(_) => "The data format has changed. Please update the app",
            FetchError::Timeout => "The request is taking too long. Please try again",
            FetchError::Io(_) => "Please check that the dataset file is readable",
            FetchError::RetriesExhausted { .. } => {
                "Please check your connection and try again later"
            }
        }
    }
}

/// Failure of the key-value store backing the favorites.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("Storage I/O failed for {key:?}: {message}")]
    Io { key: String, message: String },

    #[error("Serialization failed: {0}")]
    Serialize(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(FetchError::Timeout.is_transient());
        assert!(FetchError::NoData.is_transient());
        assert!(FetchError::Transport("reset".into()).is_transient());
        assert!(!FetchError::InvalidUrl("::".into()).is_transient());
        assert!(!FetchError::Decode("eof".into()).is_transient());
        let exhausted = FetchError::RetriesExhausted {
            attempts: 4,
            last: Box::new(FetchError::Timeout),
        };
        assert!(!exhausted.is_transient());
    }

    #[test]
    fn messages_name_the_cause() {
        let e = FetchError::RetriesExhausted {
            attempts: 4,
            last: Box::new(FetchError::Timeout),
        };
        assert_eq!(
            e.to_string(),
            "Maximum retry attempts exceeded after 4 attempts: Request timed out"
        );
        let wrapped: CityError = e.into();
        assert!(wrapped.to_string().starts_with("Maximum retry attempts"));
    }
}
