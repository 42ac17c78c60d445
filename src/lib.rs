//! clipshelf - Media clip catalog
//!
//! Turns a directory tree of media files into addressable, safely-nameable
//! clip records, and resolves those records back to files for serving.
//!
//! # Discovery
//!
//! - JSON sidecars describe clips explicitly (uid, filename, title, thumbnail)
//! - Raw media files not described by a sidecar become bare clips
//! - Clips without a thumbnail get one inferred from nearby images
//!
//! # Modules
//!
//! - `domain`: Data structures (Clip, SafeCharset)
//! - `library`: Discovery engine (Library, sidecar decoding, scanning)
//! - `config`: Config file and environment resolution
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # List clips under ./media
//! clipshelf scan
//!
//! # Resolve a thumbnail reference to its file
//! clipshelf --root /srv/media resolve show.png
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod library;

// Re-export main types at crate root for convenience
pub use domain::{Clip, ClipField, ClipSummary, SafeCharset, ThumbnailCandidates, ValidationError};
pub use library::{
    ClipMetadata, DiscoveryReport, Library, LibraryError, LibraryOptions, MetadataError,
};
