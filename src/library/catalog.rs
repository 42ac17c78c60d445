//! Library discovery over a media directory.
//!
//! Discovery runs in two passes over a single recursive listing of the root:
//!
//! 1. **Metadata pass**: every sidecar (`*.json` by default) is decoded and
//!    turned into a clip. Bad sidecars are logged and skipped.
//! 2. **Raw pass**: every raw media file (`*.mp4` by default) whose relative
//!    path was not claimed by a sidecar becomes a bare clip.
//!
//! Clips without a thumbnail get one inferred from the images under the root.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::metadata::ClipMetadata;
use super::scan::{self, FileEntry};
use crate::domain::clip::{Clip, ThumbnailCandidates, IMAGE_EXTENSIONS};
use crate::domain::safe_string::SafeCharset;

/// Errors that abort a discovery pass
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Library root does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("Library root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to read library root {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Discovery settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryOptions {
    /// Alphabet every clip string must stay within
    pub charset: SafeCharset,

    /// Extension of metadata sidecars (default: json)
    pub metadata_extension: String,

    /// Extensions picked up by the raw pass (default: mp4)
    pub raw_extensions: Vec<String>,

    /// A censored title must be longer than this to be used (default: 5)
    pub min_censored_title_len: usize,
}

impl Default for LibraryOptions {
    fn default() -> Self {
        Self {
            charset: SafeCharset::default(),
            metadata_extension: "json".to_string(),
            raw_extensions: vec!["mp4".to_string()],
            min_censored_title_len: 5,
        }
    }
}

/// Counts from the last discovery pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryReport {
    pub metadata_clips: usize,
    pub raw_clips: usize,
    pub skipped_metadata: usize,
    pub skipped_raw: usize,
}

impl DiscoveryReport {
    pub fn total_clips(&self) -> usize {
        self.metadata_clips + self.raw_clips
    }
}

/// Clips discovered under a root directory
#[derive(Debug, Clone)]
pub struct Library {
    root: PathBuf,
    options: LibraryOptions,
    clips: Vec<Clip>,
    thumbnails: ThumbnailCandidates,
    report: DiscoveryReport,
    scanned_at: DateTime<Utc>,
}

impl Library {
    /// Open a library with default options and discover its clips
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, LibraryError> {
        Self::with_options(root, LibraryOptions::default())
    }

    /// Open a library with custom options and discover its clips
    pub fn with_options(
        root: impl Into<PathBuf>,
        options: LibraryOptions,
    ) -> Result<Self, LibraryError> {
        let mut library = Self {
            root: root.into(),
            options,
            clips: Vec::new(),
            thumbnails: ThumbnailCandidates::default(),
            report: DiscoveryReport::default(),
            scanned_at: Utc::now(),
        };
        library.discover()?;
        Ok(library)
    }

    /// Rebuild the clip list from the filesystem
    pub fn discover(&mut self) -> Result<DiscoveryReport, LibraryError> {
        scan::check_root(&self.root)?;

        let files = scan::list_files(&self.root);
        let candidates = ThumbnailCandidates::from_entries(&files);

        let mut report = DiscoveryReport::default();
        let mut clips = Vec::new();
        let mut claimed = HashSet::new();

        let metadata_ext = [self.options.metadata_extension.as_str()];
        for entry in files.iter().filter(|e| scan::has_extension(&e.path, &metadata_ext)) {
            let Some(clip) = self.clip_from_metadata(entry, &candidates) else {
                report.skipped_metadata += 1;
                continue;
            };

            if !claimed.insert(clip.filename().to_string()) {
                tracing::warn!(
                    "Skipping {}: {} is already described by another sidecar",
                    entry.path.display(),
                    clip.filename()
                );
                report.skipped_metadata += 1;
                continue;
            }

            clips.push(clip);
            report.metadata_clips += 1;
        }

        let raw_exts: Vec<&str> = self.options.raw_extensions.iter().map(String::as_str).collect();
        for entry in files.iter().filter(|e| scan::has_extension(&e.path, &raw_exts)) {
            let name = entry.relative_str();
            if claimed.contains(&name) {
                continue;
            }

            match self.clip_from_raw(&name, &candidates) {
                Some(clip) => {
                    claimed.insert(name);
                    clips.push(clip);
                    report.raw_clips += 1;
                }
                None => report.skipped_raw += 1,
            }
        }

        tracing::info!(
            "Discovered {} clips in {} ({} from metadata, {} raw, {} skipped)",
            report.total_clips(),
            self.root.display(),
            report.metadata_clips,
            report.raw_clips,
            report.skipped_metadata + report.skipped_raw
        );

        self.clips = clips;
        self.thumbnails = candidates;
        self.report = report;
        self.scanned_at = Utc::now();

        Ok(report)
    }

    /// Build a clip from a sidecar, or `None` if the record is unusable
    fn clip_from_metadata(&self, entry: &FileEntry, candidates: &ThumbnailCandidates) -> Option<Clip> {
        let metadata = match ClipMetadata::from_file(&entry.path) {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!("Failed to read json from file {}: {}", entry.path.display(), e);
                return None;
            }
        };

        let Some(filename) = metadata.filename.as_deref() else {
            tracing::warn!("Failed to extract filename from {}", entry.path.display());
            return None;
        };

        let title = self.usable_title(metadata.title.as_deref());
        let thumbnail = self.usable_thumbnail(metadata.thumbnail.as_deref());

        let mut clip = match Clip::with_charset(
            self.options.charset,
            metadata.uid.as_deref(),
            Some(filename),
            title.as_deref(),
            thumbnail,
        ) {
            Ok(clip) => clip,
            Err(e) => {
                tracing::warn!("Failed to create clip for filename {:?}: {}", filename, e);
                return None;
            }
        };

        if !clip.has_thumbnail() {
            clip.infer_thumbnail_from(candidates);
        }

        Some(clip)
    }

    /// Build a bare clip for a raw media file
    fn clip_from_raw(&self, name: &str, candidates: &ThumbnailCandidates) -> Option<Clip> {
        match Clip::with_charset(self.options.charset, Some(name), Some(name), Some(name), None) {
            Ok(mut clip) => {
                clip.infer_thumbnail_from(candidates);
                Some(clip)
            }
            Err(e) => {
                tracing::warn!("Failed to create clip for raw file {:?}: {}", name, e);
                None
            }
        }
    }

    /// Title as declared, or a censored version if long enough to be useful
    fn usable_title(&self, title: Option<&str>) -> Option<String> {
        let title = title?;
        let charset = self.options.charset;

        if charset.is_safe(title) {
            return Some(title.to_string());
        }

        let alternate = charset.censor(title);
        if alternate.len() > self.options.min_censored_title_len {
            tracing::info!("Title {:?} has alternate {:?}", title, alternate);
            Some(alternate)
        } else {
            tracing::warn!("Dropping title {:?}: nothing usable after censoring", title);
            None
        }
    }

    /// Thumbnail as declared, if it names a safe image file
    fn usable_thumbnail<'a>(&self, thumbnail: Option<&'a str>) -> Option<&'a str> {
        let thumbnail = thumbnail?;

        if !thumbnail.contains('.') || !scan::has_extension(Path::new(thumbnail), &IMAGE_EXTENSIONS) {
            tracing::warn!("Ignoring thumbnail {:?}: not an image filename", thumbnail);
            return None;
        }

        if !self.options.charset.is_safe(thumbnail) {
            tracing::warn!("Ignoring thumbnail {:?}: unsafe characters", thumbnail);
            return None;
        }

        Some(thumbnail)
    }

    /// All clips, metadata clips first, in discovery order
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    /// Filenames of all clips, in discovery order
    pub fn clip_filenames(&self) -> Vec<&str> {
        self.clips.iter().map(Clip::filename).collect()
    }

    /// Find a clip by filename
    pub fn find(&self, filename: &str) -> Option<&Clip> {
        self.clips.iter().find(|c| c.filename() == filename)
    }

    /// Find a clip by uid
    pub fn find_by_uid(&self, uid: &str) -> Option<&Clip> {
        self.clips.iter().find(|c| c.uid() == Some(uid))
    }

    /// Case-insensitive substring match over title, filename and uid
    pub fn search(&self, query: &str) -> Vec<&Clip> {
        let query_lower = query.to_lowercase();

        self.clips
            .iter()
            .filter(|clip| {
                clip.title().to_lowercase().contains(&query_lower)
                    || clip.filename().to_lowercase().contains(&query_lower)
                    || clip
                        .uid()
                        .map(|uid| uid.to_lowercase().contains(&query_lower))
                        .unwrap_or(false)
            })
            .collect()
    }

    /// Map a requested name to a file under the root.
    ///
    /// Only clip filenames and stored thumbnail filenames resolve, and only
    /// if the file is still there. Thumbnails are stored by base name, so
    /// they resolve to wherever the last discovery pass found that image.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = if self.clips.iter().any(|clip| clip.filename() == name) {
            Path::new(name)
        } else if self
            .clips
            .iter()
            .any(|clip| clip.has_thumbnail() && clip.thumbnail_filename() == name)
        {
            self.thumbnails.location(name).unwrap_or(Path::new(name))
        } else {
            tracing::debug!("Refusing to resolve {:?}: not in catalog", name);
            return None;
        };

        let path = self.root.join(relative);
        if path.is_file() {
            Some(path)
        } else {
            tracing::warn!("Cataloged file {} is gone", path.display());
            None
        }
    }

    /// Directory the library was opened on, as given
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Options discovery runs with
    pub fn options(&self) -> &LibraryOptions {
        &self.options
    }

    /// Counts from the last discovery pass
    pub fn report(&self) -> DiscoveryReport {
        self.report
    }

    /// When the last discovery pass finished
    pub fn scanned_at(&self) -> DateTime<Utc> {
        self.scanned_at
    }

    /// Number of discovered clips
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Whether discovery found no clips
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}
