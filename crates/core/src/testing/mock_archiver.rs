//! Mock archiver for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::archive::{archive_file_name, ArchiveJob, ArchiveManifest, Archiver, PackagingError};

/// Mock implementation of the Archiver trait.
///
/// Records every job and returns a manifest without writing anything, or
/// fails when told to. Sources are never touched.
#[derive(Debug, Default)]
pub struct MockArchiver {
    /// Recorded packaging jobs.
    jobs: Arc<RwLock<Vec<ArchiveJob>>>,
    /// If set, the next package call will fail with this error.
    next_error: Arc<RwLock<Option<PackagingError>>>,
}

impl MockArchiver {
    /// Create a new mock archiver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next package call fail with `error`.
    pub async fn set_next_error(&self, error: PackagingError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get all recorded jobs.
    pub async fn recorded_jobs(&self) -> Vec<ArchiveJob> {
        self.jobs.read().await.clone()
    }
}

#[async_trait]
impl Archiver for MockArchiver {
    fn name(&self) -> &str {
        "mock"
    }

    async fn package(&self, job: ArchiveJob) -> Result<ArchiveManifest, PackagingError> {
        self.jobs.write().await.push(job.clone());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        let file_name = archive_file_name(&job.prefix, &job.completed_at, 1);
        Ok(ArchiveManifest {
            path: job.destination_dir.join(&file_name),
            file_name,
            entries: job
                .documents
                .iter()
                .filter_map(|d| d.file_name())
                .map(|n| n.to_string_lossy().to_string())
                .collect(),
            size_bytes: 0,
            sha256: String::new(),
            sources_removed: 0,
            created_at: job.completed_at,
        })
    }
}
