//! Zip archiver implementation.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::error::PackagingError;
use super::traits::Archiver;
use super::types::{archive_file_name, ArchiveJob, ArchiveManifest};

/// Upper bound on same-second name collisions before giving up.
const MAX_NAME_ATTEMPTS: usize = 100;

/// Writes deflate-compressed zip archives with the standard library's
/// blocking I/O, off the async runtime.
#[derive(Debug, Clone)]
pub struct ZipArchiver {
    compression: CompressionMethod,
}

impl Default for ZipArchiver {
    fn default() -> Self {
        Self::new()
    }
}

impl ZipArchiver {
    pub fn new() -> Self {
        Self {
            compression: CompressionMethod::Deflated,
        }
    }

    fn entry_options(&self) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(self.compression)
            .unix_permissions(0o644)
    }

    fn package_blocking(&self, job: ArchiveJob) -> Result<ArchiveManifest, PackagingError> {
        let start = Instant::now();
        let entries = entry_names(&job.documents)?;

        fs::create_dir_all(&job.destination_dir).map_err(|e| {
            PackagingError::DestinationUnavailable {
                path: job.destination_dir.clone(),
                source: e,
            }
        })?;

        let (path, file) = create_archive_file(&job)?;
        let written = self
            .write_entries(file, &path, &job.documents, &entries)
            .and_then(|_| verify(&path, &entries));
        if let Err(e) = written {
            if let Err(rm) = fs::remove_file(&path) {
                tracing::warn!(
                    "Failed to remove partial archive {}: {}",
                    path.display(),
                    rm
                );
            }
            return Err(e);
        }

        let (size_bytes, sha256) = digest(&path)?;

        let sources_removed = if job.cleanup_sources {
            remove_sources(&job.documents)
        } else {
            0
        };

        tracing::info!(
            "Archived {} documents into {} ({} bytes, {} ms)",
            entries.len(),
            path.display(),
            size_bytes,
            start.elapsed().as_millis()
        );

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(ArchiveManifest {
            path,
            file_name,
            entries,
            size_bytes,
            sha256,
            sources_removed,
            created_at: job.completed_at,
        })
    }

    fn write_entries(
        &self,
        file: File,
        path: &Path,
        documents: &[PathBuf],
        entries: &[String],
    ) -> Result<(), PackagingError> {
        let mut writer = ZipWriter::new(file);

        for (document, name) in documents.iter().zip(entries) {
            writer
                .start_file(name.as_str(), self.entry_options())
                .map_err(|e| PackagingError::write(path, e))?;
            let mut source = BufReader::new(
                File::open(document).map_err(|e| PackagingError::io(document, e))?,
            );
            io::copy(&mut source, &mut writer).map_err(|e| PackagingError::io(document, e))?;
        }

        let file = writer
            .finish()
            .map_err(|e| PackagingError::write(path, e))?;
        file.sync_all().map_err(|e| PackagingError::io(path, e))
    }
}

#[async_trait]
impl Archiver for ZipArchiver {
    fn name(&self) -> &str {
        "zip"
    }

    async fn package(&self, job: ArchiveJob) -> Result<ArchiveManifest, PackagingError> {
        let archiver = self.clone();
        tokio::task::spawn_blocking(move || archiver.package_blocking(job))
            .await
            .map_err(|e| PackagingError::TaskFailed {
                reason: e.to_string(),
            })?
    }
}

/// Entry name per document, checking that every source exists and that no
/// two documents collide.
fn entry_names(documents: &[PathBuf]) -> Result<Vec<String>, PackagingError> {
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(documents.len());

    for document in documents {
        if !document.is_file() {
            return Err(PackagingError::SourceMissing {
                path: document.clone(),
            });
        }
        let name = document
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| PackagingError::SourceMissing {
                path: document.clone(),
            })?;
        if !seen.insert(name.clone()) {
            return Err(PackagingError::DuplicateEntry { name });
        }
        names.push(name);
    }

    Ok(names)
}

/// Creates the archive file, never replacing an existing one.
fn create_archive_file(job: &ArchiveJob) -> Result<(PathBuf, File), PackagingError> {
    for attempt in 1..=MAX_NAME_ATTEMPTS {
        let path = job
            .destination_dir
            .join(archive_file_name(&job.prefix, &job.completed_at, attempt));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                tracing::debug!("Archive {} exists, trying next suffix", path.display());
            }
            Err(e) => {
                return Err(PackagingError::DestinationUnavailable {
                    path: job.destination_dir.clone(),
                    source: e,
                })
            }
        }
    }

    Err(PackagingError::DestinationUnavailable {
        path: job.destination_dir.clone(),
        source: io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} archives with the same timestamp", MAX_NAME_ATTEMPTS),
        ),
    })
}

/// Reopens the archive and checks it holds exactly `expected`.
fn verify(path: &Path, expected: &[String]) -> Result<(), PackagingError> {
    let file = File::open(path).map_err(|e| PackagingError::io(path, e))?;
    let archive = ZipArchive::new(file).map_err(|e| PackagingError::VerificationFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut found: Vec<&str> = archive.file_names().collect();
    let mut wanted: Vec<&str> = expected.iter().map(String::as_str).collect();
    found.sort_unstable();
    wanted.sort_unstable();

    if found != wanted {
        return Err(PackagingError::VerificationFailed {
            path: path.to_path_buf(),
            reason: format!(
                "expected {} entries, found {}",
                wanted.len(),
                found.len()
            ),
        });
    }

    Ok(())
}

fn digest(path: &Path) -> Result<(u64, String), PackagingError> {
    let mut file = File::open(path).map_err(|e| PackagingError::io(path, e))?;
    let mut hasher = Sha256::new();
    let size = io::copy(&mut file, &mut hasher).map_err(|e| PackagingError::io(path, e))?;
    Ok((size, format!("{:x}", hasher.finalize())))
}

/// Deletes bundled sources. Failures are logged; the archive already holds
/// every document.
fn remove_sources(documents: &[PathBuf]) -> usize {
    let mut removed = 0;
    for document in documents {
        match fs::remove_file(document) {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!(
                "Failed to remove archived document {}: {}",
                document.display(),
                e
            ),
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use std::io::Read;
    use tempfile::TempDir;

    fn documents(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| {
                let path = dir.join(name);
                fs::write(&path, format!("%PDF-1.5 {}", name)).unwrap();
                path
            })
            .collect()
    }

    fn job(documents: Vec<PathBuf>, destination: &Path) -> ArchiveJob {
        ArchiveJob {
            documents,
            destination_dir: destination.to_path_buf(),
            prefix: "attendees".to_string(),
            completed_at: Local.with_ymd_and_hms(2025, 3, 7, 18, 30, 0).unwrap(),
            cleanup_sources: true,
        }
    }

    #[tokio::test]
    async fn test_package_bundles_and_removes_sources() {
        let temp = TempDir::new().unwrap();
        let docs = documents(temp.path(), &["attendee-A1.pdf", "attendee-A2.pdf"]);

        let manifest = ZipArchiver::new()
            .package(job(docs.clone(), temp.path()))
            .await
            .unwrap();

        assert_eq!(manifest.file_name, "attendees_20250307_183000.zip");
        assert_eq!(manifest.entries, vec!["attendee-A1.pdf", "attendee-A2.pdf"]);
        assert_eq!(manifest.sources_removed, 2);
        assert_eq!(manifest.sha256.len(), 64);
        assert_eq!(fs::metadata(&manifest.path).unwrap().len(), manifest.size_bytes);
        for doc in &docs {
            assert!(!doc.exists());
        }

        let mut archive = ZipArchive::new(File::open(&manifest.path).unwrap()).unwrap();
        let mut content = String::new();
        archive
            .by_name("attendee-A2.pdf")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "%PDF-1.5 attendee-A2.pdf");
    }

    #[tokio::test]
    async fn test_existing_archive_is_not_overwritten() {
        let temp = TempDir::new().unwrap();
        let first = ZipArchiver::new()
            .package(job(documents(temp.path(), &["a.pdf"]), temp.path()))
            .await
            .unwrap();
        let second = ZipArchiver::new()
            .package(job(documents(temp.path(), &["b.pdf"]), temp.path()))
            .await
            .unwrap();

        assert_eq!(second.file_name, "attendees_20250307_183000-2.zip");
        assert!(first.path.exists());
        assert_ne!(first.sha256, second.sha256);
    }

    #[tokio::test]
    async fn test_unwritable_destination_keeps_sources() {
        let temp = TempDir::new().unwrap();
        let docs = documents(temp.path(), &["attendee-A1.pdf"]);
        // A regular file where the destination folder should be
        let blocked = temp.path().join("archive");
        fs::write(&blocked, "not a folder").unwrap();

        let err = ZipArchiver::new()
            .package(job(docs.clone(), &blocked))
            .await
            .unwrap_err();

        assert!(matches!(err, PackagingError::DestinationUnavailable { .. }));
        assert!(docs[0].exists());
    }

    #[tokio::test]
    async fn test_missing_source_fails_before_writing() {
        let temp = TempDir::new().unwrap();
        let mut docs = documents(temp.path(), &["attendee-A1.pdf"]);
        docs.push(temp.path().join("attendee-gone.pdf"));
        let out = temp.path().join("out");

        let err = ZipArchiver::new()
            .package(job(docs.clone(), &out))
            .await
            .unwrap_err();

        assert!(matches!(err, PackagingError::SourceMissing { .. }));
        assert!(docs[0].exists());
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_keep_sources_when_cleanup_disabled() {
        let temp = TempDir::new().unwrap();
        let docs = documents(temp.path(), &["attendee-A1.pdf"]);
        let mut job = job(docs.clone(), &temp.path().join("out"));
        job.cleanup_sources = false;

        let manifest = ZipArchiver::new().package(job).await.unwrap();
        assert_eq!(manifest.sources_removed, 0);
        assert!(docs[0].exists());
    }

    #[tokio::test]
    async fn test_empty_job_writes_empty_archive() {
        let temp = TempDir::new().unwrap();
        let manifest = ZipArchiver::new()
            .package(job(Vec::new(), temp.path()))
            .await
            .unwrap();
        assert!(manifest.entries.is_empty());
        assert_eq!(ZipArchive::new(File::open(&manifest.path).unwrap()).unwrap().len(), 0);
    }

    #[test]
    fn test_duplicate_entry_names_rejected() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("x")).unwrap();
        let a = documents(temp.path(), &["same.pdf"]);
        let b = documents(&temp.path().join("x"), &["same.pdf"]);

        let err = entry_names(&[a[0].clone(), b[0].clone()]).unwrap_err();
        assert!(matches!(err, PackagingError::DuplicateEntry { .. }));
    }
}
