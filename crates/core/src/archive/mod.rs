//! Archiver module for packaging generated cards.
//!
//! This module provides the `Archiver` trait and a zip implementation that
//! bundles one run's documents into a single timestamped archive.
//!
//! # Features
//!
//! - Deflate-compressed zip named `{prefix}_{YYYYmmdd_HHMMSS}.zip`
//! - Never overwrites an existing archive (`-2`, `-3`, ... suffixes)
//! - Reopens the archive and checks its entries before touching sources
//! - SHA-256 of the finished archive in the manifest
//! - Sources removed only after verification; kept on any failure
//!
//! # Example
//!
//! ```ignore
//! use accredit_core::archive::{ArchiveJob, Archiver, ZipArchiver};
//!
//! let archiver = ZipArchiver::new();
//! let manifest = archiver
//!     .package(ArchiveJob {
//!         documents: generated.iter().map(|d| d.path.clone()).collect(),
//!         destination_dir: PathBuf::from("output"),
//!         prefix: "attendees".to_string(),
//!         completed_at: chrono::Local::now(),
//!         cleanup_sources: true,
//!     })
//!     .await?;
//! println!("{} ({} entries)", manifest.path.display(), manifest.entries.len());
//! ```

mod error;
mod traits;
mod types;
mod zip_archiver;

pub use error::PackagingError;
pub use traits::Archiver;
pub use types::{archive_file_name, ArchiveJob, ArchiveManifest};
pub use zip_archiver::ZipArchiver;
