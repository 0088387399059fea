#![forbid(unsafe_code)]

//! Flat-file JSON array persistence.
//!
//! Every collection in the dashboard (layout, tasks, links, reminders,
//! automation presets) lives in one `*.json` file holding a single JSON
//! array. [`JsonFileStore`] reads and writes those files, normalizing the
//! legacy shapes older backends produced on read:
//!
//! - `{"value": [...]}` (a wrapper some serializers emit) unwraps to the
//!   inner array;
//! - a bare object wraps into a one-element array;
//! - `null` and a missing file both load as the empty list.
//!
//! Writes are atomic: the array is serialized to a sibling temp file which
//! is then renamed over the target, so a crash mid-write never leaves a
//! torn file behind.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// A directory of flat JSON array files.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at the given data directory.
    ///
    /// The directory is created on first save, not here.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The store's data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load a named file as a list of `T`.
    ///
    /// A missing file is an empty list, not an error. Malformed JSON or a
    /// shape mismatch is a [`StoreError::Malformed`].
    pub fn load<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, StoreError> {
        let path = self.dir.join(file);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(file, "data file missing, loading empty list");
                return Ok(Vec::new());
            }
            Err(err) => {
                warn!(file, %err, "data file read failed");
                return Err(StoreError::Io {
                    path,
                    source: err,
                });
            }
        };

        let value: Value = serde_json::from_str(&raw).map_err(|err| {
            warn!(file, %err, "data file is not valid JSON");
            StoreError::Malformed {
                path: path.clone(),
                source: err,
            }
        })?;

        serde_json::from_value(normalize(value)).map_err(|err| {
            warn!(file, %err, "data file has unexpected shape");
            StoreError::Malformed { path, source: err }
        })
    }

    /// Save a list of `T` to a named file, atomically.
    pub fn save<T: Serialize>(&self, file: &str, items: &[T]) -> Result<(), StoreError> {
        let path = self.dir.join(file);
        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let json = serde_json::to_string_pretty(items).map_err(|err| StoreError::Malformed {
            path: path.clone(),
            source: err,
        })?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)?;
        debug!(file, count = items.len(), "data file saved");
        Ok(())
    }
}

/// Unwrap legacy container shapes down to a JSON array.
fn normalize(value: Value) -> Value {
    match value {
        Value::Array(_) => value,
        Value::Null => Value::Array(Vec::new()),
        Value::Object(ref map) => {
            if let Some(inner @ Value::Array(_)) = map.get("value") {
                inner.clone()
            } else {
                Value::Array(vec![value])
            }
        }
        other => Value::Array(vec![other]),
    }
}

/// Failures reading or writing a data file.
#[derive(Debug)]
pub enum StoreError {
    /// Filesystem failure.
    Io { path: PathBuf, source: io::Error },
    /// The file exists but is not the expected JSON shape.
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "io error on {}: {source}", path.display())
            }
            Self::Malformed { path, source } => {
                write!(f, "malformed data in {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Malformed { source, .. } => Some(source),
        }
    }
}
