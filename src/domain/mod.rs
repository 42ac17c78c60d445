//! Domain types for clipshelf.
//!
//! This module contains the core data structures:
//! - Clip: One validated media item with thumbnail inference
//! - SafeCharset: The string validation shared by every clip field

pub mod clip;
pub mod safe_string;

// Re-export commonly used types
pub use clip::{
    Clip, ClipSummary, ThumbnailCandidates, CONTENT_ROUTE, IMAGE_EXTENSIONS, MISSING_FILE,
    MISSING_THUMBNAIL, STATIC_ROUTE,
};
pub use safe_string::{ClipField, SafeCharset, ValidationError};
