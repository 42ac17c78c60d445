//! Clip records and thumbnail inference.
//!
//! A clip is one addressable media item. All string fields are validated
//! against a [`SafeCharset`] at construction; absent fields fall back to
//! sentinels when read.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::safe_string::{ClipField, SafeCharset, ValidationError};
use crate::library::scan::{self, FileEntry};

/// Route the serving layer uses for library content
pub const CONTENT_ROUTE: &str = "serve_content";

/// Route the serving layer uses for bundled static assets
pub const STATIC_ROUTE: &str = "static";

/// Filename reported for a clip without one
pub const MISSING_FILE: &str = "MISSING FILE";

/// Placeholder image for clips without a thumbnail
pub const MISSING_THUMBNAIL: &str = "missing_media.jpg";

/// Image extensions accepted as thumbnails, in match priority order
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// A validated media item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clip {
    uid: Option<String>,
    filename: Option<String>,
    title: Option<String>,
    thumbnail_filename: Option<String>,
    charset: SafeCharset,
}

impl Clip {
    /// Create a clip using the default charset
    pub fn new(
        uid: Option<&str>,
        filename: Option<&str>,
        title: Option<&str>,
        thumbnail_filename: Option<&str>,
    ) -> Result<Self, ValidationError> {
        Self::with_charset(SafeCharset::default(), uid, filename, title, thumbnail_filename)
    }

    /// Create a clip, validating every present field against `charset`
    pub fn with_charset(
        charset: SafeCharset,
        uid: Option<&str>,
        filename: Option<&str>,
        title: Option<&str>,
        thumbnail_filename: Option<&str>,
    ) -> Result<Self, ValidationError> {
        charset.validate_optional(ClipField::Filename, filename)?;
        charset.validate_optional(ClipField::Uid, uid)?;
        charset.validate_optional(ClipField::Title, title)?;
        charset.validate_optional(ClipField::ThumbnailFilename, thumbnail_filename)?;

        Ok(Self {
            uid: uid.map(str::to_string),
            filename: filename.map(str::to_string),
            title: title.map(str::to_string),
            thumbnail_filename: thumbnail_filename.map(str::to_string),
            charset,
        })
    }

    /// Stored uid, without fallback
    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    /// Filename, or [`MISSING_FILE`]
    pub fn filename(&self) -> &str {
        self.filename.as_deref().unwrap_or(MISSING_FILE)
    }

    /// Title, falling back to the filename (useful for raw clips)
    pub fn title(&self) -> &str {
        match &self.title {
            Some(title) => title,
            None => self.filename(),
        }
    }

    /// Thumbnail filename, or [`MISSING_THUMBNAIL`]
    pub fn thumbnail_filename(&self) -> &str {
        self.thumbnail_filename.as_deref().unwrap_or(MISSING_THUMBNAIL)
    }

    /// Whether a thumbnail is stored (declared or inferred)
    pub fn has_thumbnail(&self) -> bool {
        self.thumbnail_filename.is_some()
    }

    /// Reference the serving layer can embed for this clip's thumbnail
    pub fn thumbnail_reference(&self) -> String {
        match &self.thumbnail_filename {
            Some(thumb) => format!("{}?fkey={}", CONTENT_ROUTE, thumb),
            None => format!("{}?{}", STATIC_ROUTE, MISSING_THUMBNAIL),
        }
    }

    /// Look for a thumbnail anywhere under `dir` and adopt it.
    ///
    /// Returns true if a thumbnail was adopted. Never fails; a clip that
    /// already has a thumbnail is left alone.
    pub fn infer_thumbnail(&mut self, dir: &Path) -> bool {
        if self.has_thumbnail() {
            return false;
        }
        let candidates = ThumbnailCandidates::collect(dir);
        self.infer_thumbnail_from(&candidates)
    }

    /// Same as [`Clip::infer_thumbnail`] against a pre-collected candidate set
    pub fn infer_thumbnail_from(&mut self, candidates: &ThumbnailCandidates) -> bool {
        if self.has_thumbnail() {
            return false;
        }

        // A lone image covers the whole directory (album art, podcast cover)
        let chosen = match candidates.single() {
            Some(only) => Some(only.to_string()),
            None => self
                .stem()
                .and_then(|stem| candidates.match_stem(stem).map(str::to_string)),
        };

        let Some(chosen) = chosen else {
            tracing::debug!("No thumbnail found for {}", self.filename());
            return false;
        };

        if let Err(e) = self.charset.check(ClipField::ThumbnailFilename, &chosen) {
            tracing::warn!("Ignoring inferred thumbnail for {}: {}", self.filename(), e);
            return false;
        }

        tracing::debug!("Inferred thumbnail {} for {}", chosen, self.filename());
        self.thumbnail_filename = Some(chosen);
        true
    }

    /// Filename without its final extension
    fn stem(&self) -> Option<&str> {
        let filename = self.filename.as_deref()?;
        Path::new(filename).file_stem().and_then(|s| s.to_str())
    }
}

/// Image base names found under a directory, with where each one lives
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThumbnailCandidates {
    /// (base name, path relative to the scanned directory)
    entries: Vec<(String, PathBuf)>,
}

impl ThumbnailCandidates {
    /// Recursively collect image base names under `dir`.
    ///
    /// Names are de-duplicated; enumeration problems are logged and yield
    /// fewer candidates rather than an error.
    pub fn collect(dir: &Path) -> Self {
        Self::from_entries(&scan::list_files(dir))
    }

    /// Pick the images out of an existing listing.
    ///
    /// When the same base name appears in several places, the first one
    /// listed is where it resolves to.
    pub fn from_entries(entries: &[FileEntry]) -> Self {
        let mut set = Self::default();
        for entry in entries {
            if !scan::has_extension(&entry.path, &IMAGE_EXTENSIONS) {
                continue;
            }
            if let Some(name) = entry.file_name() {
                set.insert(name, entry.relative.clone());
            }
        }
        set
    }

    /// Build a candidate set from names living directly in the directory
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for name in names {
            let name = name.into();
            let location = PathBuf::from(&name);
            set.insert(name, location);
        }
        set
    }

    fn insert(&mut self, name: String, location: PathBuf) {
        if !self.contains(&name) {
            self.entries.push((name, location));
        }
    }

    /// Whether an image with this base name was found
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Where the image with this base name lives, relative to the directory
    pub fn location(&self, name: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, location)| location.as_path())
    }

    /// The only candidate, if there is exactly one
    pub fn single(&self) -> Option<&str> {
        match self.entries.as_slice() {
            [(only, _)] => Some(only.as_str()),
            _ => None,
        }
    }

    /// First of `<stem>.jpg`, `<stem>.jpeg`, `<stem>.png`, `<stem>.gif` present
    pub fn match_stem(&self, stem: &str) -> Option<&str> {
        IMAGE_EXTENSIONS.iter().find_map(|ext| {
            let wanted = format!("{}.{}", stem, ext);
            self.entries
                .iter()
                .find(|(n, _)| *n == wanted)
                .map(|(n, _)| n.as_str())
        })
    }

    /// Number of distinct base names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no images were found
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Serializable, read-only view of a clip with fallbacks applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipSummary {
    pub uid: Option<String>,
    pub filename: String,
    pub title: String,
    pub thumbnail_filename: String,
    pub thumbnail_reference: String,
}

impl From<&Clip> for ClipSummary {
    fn from(clip: &Clip) -> Self {
        Self {
            uid: clip.uid().map(str::to_string),
            filename: clip.filename().to_string(),
            title: clip.title().to_string(),
            thumbnail_filename: clip.thumbnail_filename().to_string(),
            thumbnail_reference: clip.thumbnail_reference(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_thumbnail() {
        assert!(Clip::new(Some("foo"), Some("foo"), Some("foo"), Some("foo/x.jpg")).is_err());

        let exists = Clip::new(Some("foo"), Some("foo"), Some("foo"), Some("foo.jpg")).unwrap();
        let missing = Clip::new(Some("foo"), Some("foo"), Some("foo"), None).unwrap();

        assert_eq!(exists.thumbnail_filename(), "foo.jpg");
        assert_eq!(missing.thumbnail_filename(), "missing_media.jpg");
        assert_eq!(exists.thumbnail_reference(), "serve_content?fkey=foo.jpg");
        assert_eq!(missing.thumbnail_reference(), "static?missing_media.jpg");
    }

    #[test]
    fn test_rejects_html_in_title() {
        assert!(Clip::new(Some("foo"), Some("foo"), Some("fo<o"), Some("foo.jpg")).is_err());
        assert!(Clip::new(Some("foo"), Some("foo"), Some("fo&o"), Some("foo.jpg")).is_err());
    }

    #[test]
    fn test_fallbacks() {
        let clip = Clip::new(None, None, None, None).unwrap();
        assert_eq!(clip.uid(), None);
        assert_eq!(clip.filename(), MISSING_FILE);
        assert_eq!(clip.title(), MISSING_FILE);

        let clip = Clip::new(None, Some("a.mp4"), None, None).unwrap();
        assert_eq!(clip.title(), "a.mp4");
    }

    #[test]
    fn test_empty_field_rejected() {
        let err = Clip::new(Some(""), Some("a.mp4"), None, None).unwrap_err();
        assert_eq!(err.field(), ClipField::Uid);
    }

    #[test]
    fn test_strict_charset_rejects_hash() {
        assert!(Clip::new(None, Some("#1.mp4"), None, None).is_ok());
        assert!(Clip::with_charset(SafeCharset::strict(), None, Some("#1.mp4"), None, None).is_err());
    }

    #[test]
    fn test_single_candidate_adopted() {
        let mut clip = Clip::new(None, Some("episode.mp3"), None, None).unwrap();
        let candidates = ThumbnailCandidates::from_names(["cover.jpg"]);
        assert!(clip.infer_thumbnail_from(&candidates));
        assert_eq!(clip.thumbnail_filename(), "cover.jpg");
    }

    #[test]
    fn test_stem_match_priority() {
        let mut clip = Clip::new(None, Some("video.mp4"), None, None).unwrap();
        let candidates =
            ThumbnailCandidates::from_names(["video.gif", "video.png", "other.jpg"]);
        assert!(clip.infer_thumbnail_from(&candidates));
        assert_eq!(clip.thumbnail_filename(), "video.png");
    }

    #[test]
    fn test_existing_thumbnail_untouched() {
        let mut clip = Clip::new(None, Some("video.mp4"), None, Some("set.png")).unwrap();
        let candidates = ThumbnailCandidates::from_names(["video.jpg"]);
        assert!(!clip.infer_thumbnail_from(&candidates));
        assert!(!clip.infer_thumbnail_from(&candidates));
        assert_eq!(clip.thumbnail_filename(), "set.png");
    }

    #[test]
    fn test_unsafe_candidate_not_adopted() {
        let mut clip = Clip::new(None, Some("video.mp4"), None, None).unwrap();
        let candidates = ThumbnailCandidates::from_names(["a&b.jpg"]);
        assert!(!clip.infer_thumbnail_from(&candidates));
        assert!(!clip.has_thumbnail());
    }

    #[test]
    fn test_infer_from_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.mp4"), b"video").unwrap();
        std::fs::create_dir(temp.path().join("art")).unwrap();
        std::fs::write(temp.path().join("art").join("cover.JPG"), b"img").unwrap();

        let mut clip = Clip::new(Some("a.mp4"), Some("a.mp4"), None, None).unwrap();
        assert!(clip.infer_thumbnail(temp.path()));
        assert_eq!(clip.thumbnail_filename(), "cover.JPG");
    }

    #[test]
    fn test_candidates_remember_location() {
        let entries = vec![
            FileEntry {
                relative: PathBuf::from("a.mp4"),
                path: PathBuf::from("/lib/a.mp4"),
            },
            FileEntry {
                relative: Path::new("art").join("cover.jpg"),
                path: Path::new("/lib/art").join("cover.jpg"),
            },
            FileEntry {
                relative: Path::new("zzz").join("cover.jpg"),
                path: Path::new("/lib/zzz").join("cover.jpg"),
            },
        ];

        let candidates = ThumbnailCandidates::from_entries(&entries);
        assert_eq!(candidates.single(), Some("cover.jpg"));
        assert_eq!(
            candidates.location("cover.jpg"),
            Some(Path::new("art").join("cover.jpg").as_path())
        );
        assert_eq!(candidates.location("a.mp4"), None);
    }

    #[test]
    fn test_candidates_deduplicate() {
        let candidates = ThumbnailCandidates::from_names(["cover.jpg", "cover.jpg"]);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates.single(), Some("cover.jpg"));
    }

    #[test]
    fn test_summary_applies_fallbacks() {
        let clip = Clip::new(Some("id1"), Some("a.mp4"), None, None).unwrap();
        let summary = ClipSummary::from(&clip);
        assert_eq!(summary.title, "a.mp4");
        assert_eq!(summary.thumbnail_reference, "static?missing_media.jpg");
    }
}
