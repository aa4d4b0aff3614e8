// crates/cityfinder-core/src/source/mod.rs

//! # Data Sources
//!
//! Everything that delivers a raw city list to the coordinator: JSON files
//! (optionally gzipped), the HTTP endpoint, the binary dataset cache, and the
//! bounded-retry wrapper around any of them.
//!
//! Sources are blocking. [`spawn_fetch`] runs one on a worker thread and hands
//! the outcome back over a channel, tagged with the reload token it was
//! started for.

use crate::coordinator::{FetchCompletion, ReloadToken};
use crate::error::FetchError;
use crate::model::{City, CityRecord};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

pub mod cache;
#[cfg(feature = "json")]
pub mod file;
#[cfg(feature = "fetch")]
pub mod http;

pub use cache::CachedSource;
#[cfg(feature = "json")]
pub use file::JsonFileSource;
#[cfg(feature = "fetch")]
pub use http::HttpSource;

/// Public gist the dataset is published at.
pub const DATASET_URL: &str = "https://gist.githubusercontent.com/hernan-uala/dce8843a8edbe0b0018b32e137bc2b3a/raw/0996accf70cb0ca0e16f9a99e0ee185fafca7af1/cities.json";

/// Something that can produce the full, unsorted city list.
pub trait CitySource {
    fn fetch(&self) -> Result<Vec<City>, FetchError>;
}

impl<S: CitySource + ?Sized> CitySource for Box<S> {
    fn fetch(&self) -> Result<Vec<City>, FetchError> {
        (**self).fetch()
    }
}

impl<S: CitySource + ?Sized> CitySource for Arc<S> {
    fn fetch(&self) -> Result<Vec<City>, FetchError> {
        (**self).fetch()
    }
}

/// A fixed list, handy for tests and demos.
impl CitySource for Vec<City> {
    fn fetch(&self) -> Result<Vec<City>, FetchError> {
        Ok(self.clone())
    }
}

/// Decodes a JSON array of transport records (`_id`, `name`, `country`, `coord`).
///
/// An empty payload is [`FetchError::NoData`]; anything else that fails to
/// parse is [`FetchError::Decode`].
pub fn decode_records(bytes: &[u8]) -> Result<Vec<City>, FetchError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(FetchError::NoData);
    }
    let records: Vec<CityRecord> =
        serde_json::from_slice(bytes).map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(records.into_iter().map(City::from).collect())
}

/// Opens a file, buffers it, and wraps it in a Gzip decoder when the name
/// ends in `.gz`.
pub(crate) fn open_stream(path: &Path) -> std::io::Result<Box<dyn Read>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let gzipped = path.extension().is_some_and(|ext| ext == "gz");
    if gzipped {
        #[cfg(feature = "compact")]
        {
            use flate2::read::GzDecoder;
            return Ok(Box::new(GzDecoder::new(reader)));
        }
        #[cfg(not(feature = "compact"))]
        {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "gzip input requires the 'compact' feature",
            ));
        }
    }
    Ok(Box::new(reader))
}

// -----------------------------------------------------------------------------
// RETRY
// -----------------------------------------------------------------------------

/// How many times a failed fetch is retried, and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// Retries transient failures of `S` up to [`RetryPolicy::max_retries`] times.
///
/// Non-transient errors are returned immediately. When the budget runs out
/// the last error is wrapped in [`FetchError::RetriesExhausted`].
#[derive(Debug, Clone)]
pub struct Retrying<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: CitySource> Retrying<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: CitySource> CitySource for Retrying<S> {
    fn fetch(&self) -> Result<Vec<City>, FetchError> {
        let attempts = self.policy.max_retries.saturating_add(1);
        let mut attempt = 1;
        loop {
            match self.inner.fetch() {
                Ok(cities) => {
                    if attempt > 1 {
                        tracing::info!(attempt, "fetch succeeded after retry");
                    }
                    return Ok(cities);
                }
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) if attempt >= attempts => {
                    tracing::warn!(attempts, error = %e, "retry budget exhausted");
                    return Err(FetchError::RetriesExhausted {
                        attempts,
                        last: Box::new(e),
                    });
                }
                Err(e) => {
                    tracing::warn!(attempt, attempts, error = %e, "fetch failed, retrying");
                    if !self.policy.delay.is_zero() {
                        std::thread::sleep(self.policy.delay);
                    }
                    attempt += 1;
                }
            }
        }
    }
}

// -----------------------------------------------------------------------------
// OFF-THREAD HANDOFF
// -----------------------------------------------------------------------------

/// Runs `source` on a worker thread and sends the outcome, tagged with
/// `token`, to the coordinator's thread.
///
/// The worker never touches coordinator state; the owning thread applies the
/// completion with [`crate::CityCoordinator::complete_reload`] or
/// [`crate::CityCoordinator::pump`].
pub fn spawn_fetch<S>(
    source: S,
    token: ReloadToken,
    tx: Sender<FetchCompletion>,
) -> JoinHandle<()>
where
    S: CitySource + Send + 'static,
{
    std::thread::spawn(move || {
        let outcome = source.fetch();
        // The receiver is gone when the coordinator was dropped; nothing to do.
        let _ = tx.send(FetchCompletion { token, outcome });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinates;
    use std::cell::{Cell, RefCell};

    /// Replays a scripted sequence of outcomes.
    struct Scripted {
        outcomes: RefCell<Vec<Result<Vec<City>, FetchError>>>,
        calls: Cell<u32>,
    }

    impl Scripted {
        fn new(mut outcomes: Vec<Result<Vec<City>, FetchError>>) -> Self {
            outcomes.reverse();
            Self {
                outcomes: RefCell::new(outcomes),
                calls: Cell::new(0),
            }
        }
    }

    impl CitySource for Scripted {
        fn fetch(&self) -> Result<Vec<City>, FetchError> {
            self.calls.set(self.calls.get() + 1);
            self.outcomes
                .borrow_mut()
                .pop()
                .unwrap_or(Err(FetchError::NoData))
        }
    }

    fn no_delay(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            delay: Duration::ZERO,
        }
    }

    fn one_city() -> Vec<City> {
        vec![City::new(1, "Hurzuf", "UA", Coordinates::new(44.55, 34.28))]
    }

    #[test]
    fn decodes_transport_records() {
        let json = br#"[
            {"country":"UA","name":"Hurzuf","_id":707860,"coord":{"lon":34.283333,"lat":44.549999}},
            {"country":"RU","name":"Novinki","_id":519188,"coord":{"lon":37.666668,"lat":55.683334}}
        ]"#;
        let cities = decode_records(json).unwrap();
        assert_eq!(cities.len(), 2);
        assert_eq!(cities[1].id(), 519188);
        assert_eq!(cities[1].name(), "Novinki");
    }

    #[test]
    fn empty_payload_is_no_data() {
        assert_eq!(decode_records(b""), Err(FetchError::NoData));
        assert_eq!(decode_records(b"  \n"), Err(FetchError::NoData));
    }

    #[test]
    fn schema_mismatch_is_decode_error() {
        let err = decode_records(br#"[{"id": 1, "name": "x"}]"#).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn retry_recovers_from_transient_failures() {
        let source = Retrying::new(
            Scripted::new(vec![Err(FetchError::Timeout), Err(FetchError::NoData), Ok(one_city())]),
            no_delay(3),
        );
        assert_eq!(source.fetch().unwrap().len(), 1);
        assert_eq!(source.inner().calls.get(), 3);
    }

    #[test]
    fn retry_budget_is_bounded() {
        let source = Retrying::new(Scripted::new(vec![]), no_delay(3));
        let err = source.fetch().unwrap_err();
        assert_eq!(
            err,
            FetchError::RetriesExhausted {
                attempts: 4,
                last: Box::new(FetchError::NoData),
            }
        );
        assert_eq!(source.inner().calls.get(), 4);
    }

    #[test]
    fn huge_retry_budget_does_not_overflow() {
        let source = Retrying::new(
            Scripted::new(vec![Err(FetchError::Timeout), Ok(one_city())]),
            no_delay(u32::MAX),
        );
        assert_eq!(source.fetch().unwrap().len(), 1);
        assert_eq!(source.inner().calls.get(), 2);
    }

    #[test]
    fn permanent_errors_are_not_retried() {
        let source = Retrying::new(
            Scripted::new(vec![Err(FetchError::Decode("bad".into()))]),
            no_delay(3),
        );
        assert_eq!(source.fetch(), Err(FetchError::Decode("bad".into())));
        assert_eq!(source.inner().calls.get(), 1);
    }

    #[test]
    fn spawn_fetch_delivers_tagged_completion() {
        let (tx, rx) = std::sync::mpsc::channel();
        let handle = spawn_fetch(one_city(), ReloadToken::new(9), tx);
        handle.join().unwrap();
        let completion = rx.recv().unwrap();
        assert_eq!(completion.token, ReloadToken::new(9));
        assert_eq!(completion.outcome.unwrap().len(), 1);
    }
}
