//! Metadata sidecar decoding.
//!
//! A sidecar is a JSON object describing one clip. Keys may carry leading
//! underscores (`_title` == `title`) and only string values are taken.
//!
//! ```text
//! {
//!   "_id": "show-01",
//!   "filename": "show.mp4",
//!   "title": "My Show",
//!   "thumbnail": "show_cover.png"
//! }
//! ```
//!
//! Decoding performs no validation; the library applies its rules to the
//! decoded fields.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while reading a sidecar
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Failed to read metadata {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse metadata JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Metadata is not a JSON object")]
    NotAnObject,
}

/// Clip fields extracted from a sidecar
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipMetadata {
    /// From `id` or `uid`
    pub uid: Option<String>,

    pub filename: Option<String>,

    pub title: Option<String>,

    /// From `thumbnail_filename` or `thumbnail`
    pub thumbnail: Option<String>,
}

impl ClipMetadata {
    /// Decode a sidecar document.
    ///
    /// When a field appears under several keys the last one in document
    /// order wins.
    pub fn from_json(json: &str) -> Result<Self, MetadataError> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(map) = value else {
            return Err(MetadataError::NotAnObject);
        };

        tracing::debug!("Got {} keys worth of json", map.len());

        let mut metadata = Self::default();
        for (key, val) in map {
            let Value::String(val) = val else {
                continue;
            };

            match key.trim_start_matches('_') {
                "id" | "uid" => metadata.uid = Some(val),
                "filename" => metadata.filename = Some(val),
                "title" => metadata.title = Some(val),
                "thumbnail_filename" | "thumbnail" => metadata.thumbnail = Some(val),
                _ => {}
            }
        }

        Ok(metadata)
    }

    /// Read and decode a sidecar file
    pub fn from_file(path: &Path) -> Result<Self, MetadataError> {
        let content = std::fs::read_to_string(path).map_err(|e| MetadataError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }
}
