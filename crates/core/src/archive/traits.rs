//! Trait definitions for the archive module.

use async_trait::async_trait;

use super::error::PackagingError;
use super::types::{ArchiveJob, ArchiveManifest};

/// Bundles generated documents into one archive.
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Returns the name of this archiver implementation.
    fn name(&self) -> &str;

    /// Writes the archive and, when requested, removes the sources.
    ///
    /// On error the sources are untouched and no partial archive remains.
    async fn package(&self, job: ArchiveJob) -> Result<ArchiveManifest, PackagingError>;
}
