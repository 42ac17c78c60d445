//! Command-line interface for clipshelf.
//!
//! Provides commands for scanning a media directory, inspecting and
//! searching the discovered clips, and resolving names to files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config;
use crate::domain::{Clip, ClipField, ClipSummary};
use crate::library::{DiscoveryReport, Library};

/// clipshelf - Catalog a directory of media clips
#[derive(Parser, Debug)]
#[command(name = "clipshelf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Library root (overrides the config file)
    #[arg(short, long, global = true, env = "CLIPSHELF_ROOT")]
    pub root: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan the library and list its clips
    Scan,

    /// List clip filenames
    Filenames,

    /// Show details of a clip
    Show {
        /// Clip filename
        filename: String,
    },

    /// Search clips by title, filename or uid
    Search {
        /// Search query
        query: String,
    },

    /// Resolve a clip or thumbnail name to its file
    Resolve {
        /// Filename as referenced by a clip
        name: String,
    },

    /// Check whether a string is safe to use in a clip
    Check {
        /// Text to check
        text: String,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// JSON shape of `scan`
#[derive(Debug, Serialize)]
struct ScanOutput {
    root: PathBuf,
    scanned_at: DateTime<Utc>,
    report: DiscoveryReport,
    clips: Vec<ClipSummary>,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Scan => scan(self.root, self.json),
            Commands::Filenames => list_filenames(self.root, self.json),
            Commands::Show { filename } => show_clip(self.root, &filename, self.json),
            Commands::Search { query } => search(self.root, &query, self.json),
            Commands::Resolve { name } => resolve(self.root, &name),
            Commands::Check { text } => check(&text),
            Commands::Config => show_config(self.root),
        }
    }
}

/// Open the configured library, honoring a --root override
fn open_library(root: Option<PathBuf>) -> Result<Library> {
    let cfg = config::config()?;
    let root = root.unwrap_or_else(|| cfg.root.clone());

    Library::with_options(&root, cfg.options.clone())
        .with_context(|| format!("Failed to open library at {}", root.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let cut: String = s.chars().take(width - 3).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}

/// Print clips as a table
fn print_clips<'a>(clips: impl IntoIterator<Item = &'a Clip>) {
    println!("{:<24} {:<40} {:<30}", "UID", "TITLE", "THUMBNAIL");
    println!("{}", "-".repeat(96));

    for clip in clips {
        println!(
            "{:<24} {:<40} {:<30}",
            truncate(clip.uid().unwrap_or("-"), 24),
            truncate(clip.title(), 40),
            truncate(clip.thumbnail_filename(), 30)
        );
    }
}

/// Scan the library
fn scan(root: Option<PathBuf>, json: bool) -> Result<()> {
    let library = open_library(root)?;

    if json {
        return print_json(&ScanOutput {
            root: library.root().to_path_buf(),
            scanned_at: library.scanned_at(),
            report: library.report(),
            clips: library.clips().iter().map(ClipSummary::from).collect(),
        });
    }

    if library.is_empty() {
        println!("No clips found in {}", library.root().display());
        return Ok(());
    }

    print_clips(library.clips());

    let report = library.report();
    println!(
        "\nTotal: {} clips ({} from metadata, {} raw, {} skipped)",
        report.total_clips(),
        report.metadata_clips,
        report.raw_clips,
        report.skipped_metadata + report.skipped_raw
    );

    Ok(())
}

/// List clip filenames
fn list_filenames(root: Option<PathBuf>, json: bool) -> Result<()> {
    let library = open_library(root)?;
    let filenames = library.clip_filenames();

    if json {
        return print_json(&filenames);
    }

    for filename in filenames {
        println!("{}", filename);
    }

    Ok(())
}

/// Show details of a single clip
fn show_clip(root: Option<PathBuf>, filename: &str, json: bool) -> Result<()> {
    let library = open_library(root)?;

    let clip = library
        .find(filename)
        .with_context(|| format!("Clip not found: {}", filename))?;

    if json {
        return print_json(&ClipSummary::from(clip));
    }

    println!("Filename:  {}", clip.filename());
    println!("Title:     {}", clip.title());
    println!("UID:       {}", clip.uid().unwrap_or("(none)"));
    println!("Thumbnail: {}", clip.thumbnail_filename());
    println!("Reference: {}", clip.thumbnail_reference());

    if let Some(path) = library.resolve(clip.filename()) {
        println!("Path:      {}", path.display());
    }

    Ok(())
}

/// Search the library
fn search(root: Option<PathBuf>, query: &str, json: bool) -> Result<()> {
    let library = open_library(root)?;
    let results = library.search(query);

    if json {
        let summaries: Vec<ClipSummary> = results.into_iter().map(ClipSummary::from).collect();
        return print_json(&summaries);
    }

    if results.is_empty() {
        println!("No results found for: {}", query);
        return Ok(());
    }

    let count = results.len();
    print_clips(results);
    println!("\nFound {} clips", count);

    Ok(())
}

/// Resolve a name through the catalog whitelist
fn resolve(root: Option<PathBuf>, name: &str) -> Result<()> {
    let library = open_library(root)?;

    match library.resolve(name) {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => anyhow::bail!("{} is not a cataloged file", name),
    }
}

/// Check a string against the configured charset
fn check(text: &str) -> Result<()> {
    let charset = config::config()?.options.charset;

    match charset.check(ClipField::Title, text) {
        Ok(()) => println!("ok: {:?} is safe", text),
        Err(e) => {
            println!("rejected: {}", e);
            println!("censored: {:?}", charset.censor(text));
        }
    }

    Ok(())
}

/// Show resolved configuration
fn show_config(root: Option<PathBuf>) -> Result<()> {
    let cfg = config::config()?;

    println!("clipshelf configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Library:");
    match root {
        Some(root) => println!("  Root:                {} (--root or {})", root.display(), config::ROOT_ENV),
        None => println!("  Root:                {}", cfg.root.display()),
    }
    println!("  Metadata extension:  {}", cfg.options.metadata_extension);
    println!("  Raw extensions:      {}", cfg.options.raw_extensions.join(", "));
    println!("  Allow '#':           {}", cfg.options.charset.allow_hash);
    println!("  Censored titles:     > {} chars", cfg.options.min_censored_title_len);

    Ok(())
}
