//! Media library discovery.
//!
//! A library is a directory tree of media files, optionally described by
//! JSON sidecars. It is re-read in full on every discovery pass; nothing is
//! persisted.
//!
//! # Layout
//!
//! ```text
//! media/
//! ├── show.json          # {"id": "show", "filename": "show.mp4", "title": "My Show"}
//! ├── show.mp4           # claimed by show.json
//! ├── show.png           # inferred thumbnail for show.mp4
//! └── holiday.mp4        # raw clip, titled by its filename
//! ```

pub mod catalog;
pub mod metadata;
pub mod scan;

pub use catalog::{DiscoveryReport, Library, LibraryError, LibraryOptions};
pub use metadata::{ClipMetadata, MetadataError};
pub use scan::FileEntry;
