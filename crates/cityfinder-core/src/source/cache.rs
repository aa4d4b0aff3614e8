// crates/cityfinder-core/src/source/cache.rs

//! Binary snapshot of a decoded dataset.
//!
//! Parsing a large JSON dataset dominates start-up, so the decoded city list
//! is written next to the source file with bincode and reused while it is
//! newer than the source. A cache hit still goes through the sorter like any
//! other fetch; only the decoding step is skipped.

use super::CitySource;
use crate::error::{CityError, FetchError, Result};
use crate::model::City;
use bincode::Options;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

#[cfg(not(feature = "compact"))]
pub const CACHE_SUFFIX: &str = "cities.bin";
#[cfg(feature = "compact")]
pub const CACHE_SUFFIX: &str = "comp.cities.bin";

/// Upper bound on a cache file we are willing to deserialize.
const CACHE_LIMIT: u64 = 256 * 1024 * 1024;

fn options() -> impl Options {
    bincode::DefaultOptions::new().with_limit(CACHE_LIMIT)
}

/// `cities.json` → `cities.json.comp.cities.bin`
pub fn get_cache_path(source_path: &Path, suffix: &str) -> PathBuf {
    let filename = source_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());
    source_path.with_file_name(format!("{filename}.{suffix}"))
}

/// Writes `cities` to `path` (gzip-compressed with the `compact` feature).
pub fn write_cache(path: &Path, cities: &[City]) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);

    #[cfg(feature = "compact")]
    let mut encoder: Box<dyn Write> = Box::new(flate2::write::GzEncoder::new(
        writer,
        flate2::Compression::default(),
    ));
    #[cfg(not(feature = "compact"))]
    let mut encoder: Box<dyn Write> = Box::new(writer);

    options().serialize_into(&mut encoder, cities)?;
    encoder.flush()?;
    Ok(())
}

/// Reads a city list previously written by [`write_cache`].
pub fn read_cache(path: &Path) -> Result<Vec<City>> {
    let file = File::open(path)
        .map_err(|e| CityError::NotFound(format!("Cache not found at {}: {e}", path.display())))?;
    let reader = BufReader::new(file);

    #[cfg(feature = "compact")]
    let decoder: Box<dyn Read> = Box::new(flate2::read::GzDecoder::new(reader));
    #[cfg(not(feature = "compact"))]
    let decoder: Box<dyn Read> = Box::new(reader);

    Ok(options().deserialize_from(decoder)?)
}

/// `true` if `cache_path` exists and is at least as new as `source_path`.
pub fn is_cache_fresh(source_path: &Path, cache_path: &Path) -> bool {
    let cache_time = match fs::metadata(cache_path).and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(_) => return false,
    };
    match fs::metadata(source_path).and_then(|m| m.modified()) {
        Ok(source_time) => source_time <= cache_time,
        Err(_) => false,
    }
}

/// Wraps a source backed by a local file and caches its decoded output.
#[derive(Debug, Clone)]
pub struct CachedSource<S> {
    inner: S,
    source_path: PathBuf,
    cache_path: PathBuf,
}

impl<S: CitySource> CachedSource<S> {
    /// Caches next to `source_path` using [`CACHE_SUFFIX`].
    pub fn new(inner: S, source_path: impl Into<PathBuf>) -> Self {
        let source_path = source_path.into();
        let cache_path = get_cache_path(&source_path, CACHE_SUFFIX);
        Self::with_cache_path(inner, source_path, cache_path)
    }

    pub fn with_cache_path(
        inner: S,
        source_path: impl Into<PathBuf>,
        cache_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            inner,
            source_path: source_path.into(),
            cache_path: cache_path.into(),
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }
}

impl<S: CitySource> CitySource for CachedSource<S> {
    fn fetch(&self) -> std::result::Result<Vec<City>, FetchError> {
        if is_cache_fresh(&self.source_path, &self.cache_path) {
            match read_cache(&self.cache_path) {
                Ok(cities) => {
                    tracing::debug!(path = %self.cache_path.display(), count = cities.len(), "dataset cache hit");
                    return Ok(cities);
                }
                Err(e) => {
                    tracing::warn!(path = %self.cache_path.display(), error = %e, "unreadable dataset cache, rebuilding");
                }
            }
        }

        let cities = self.inner.fetch()?;
        if let Err(e) = write_cache(&self.cache_path, &cities) {
            tracing::warn!(path = %self.cache_path.display(), error = %e, "failed to write dataset cache");
        }
        Ok(cities)
    }
}
