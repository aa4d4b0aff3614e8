// crates/cityfinder-core/src/source/file.rs

// ---------------------------------------------------------------------------
// FILE GUARD: This entire file is skipped if 'json' feature is missing.
// ---------------------------------------------------------------------------
#![cfg(feature = "json")]

use super::{decode_records, open_stream, CitySource};
use crate::error::FetchError;
use crate::model::City;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Reads a JSON array of city records from disk (`.json` or `.json.gz`).
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CitySource for JsonFileSource {
    fn fetch(&self) -> Result<Vec<City>, FetchError> {
        let mut reader = open_stream(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                FetchError::InvalidUrl(format!("{}: {e}", self.path.display()))
            }
            _ => FetchError::Io(e.to_string()),
        })?;

        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| FetchError::Io(e.to_string()))?;

        let cities = decode_records(&bytes)?;
        tracing::info!(path = %self.path.display(), count = cities.len(), "dataset read");
        Ok(cities)
    }
}
