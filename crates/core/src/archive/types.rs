//! Types for the archive module.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A packaging request.
#[derive(Debug, Clone)]
pub struct ArchiveJob {
    /// Documents to bundle, stored under their file names.
    pub documents: Vec<PathBuf>,
    /// Folder the archive is written to.
    pub destination_dir: PathBuf,
    /// Archive name prefix.
    pub prefix: String,
    /// Completion time stamped into the archive name.
    pub completed_at: DateTime<Local>,
    /// Whether to delete the documents once the archive is verified.
    pub cleanup_sources: bool,
}

/// A written and verified archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveManifest {
    pub path: PathBuf,
    pub file_name: String,
    /// Entry names, in the order they were written.
    pub entries: Vec<String>,
    pub size_bytes: u64,
    /// Hex SHA-256 of the archive file.
    pub sha256: String,
    /// Number of source documents deleted after packaging.
    pub sources_removed: usize,
    pub created_at: DateTime<Local>,
}

/// `{prefix}_{YYYYmmdd_HHMMSS}.zip`, or `{prefix}_{YYYYmmdd_HHMMSS}-{n}.zip`
/// for `attempt` > 1.
pub fn archive_file_name(prefix: &str, completed_at: &DateTime<Local>, attempt: usize) -> String {
    let stamp = completed_at.format("%Y%m%d_%H%M%S");
    if attempt <= 1 {
        format!("{}_{}.zip", prefix, stamp)
    } else {
        format!("{}_{}-{}.zip", prefix, stamp, attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_archive_file_name() {
        let at = Local.with_ymd_and_hms(2025, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(
            archive_file_name("attendees", &at, 1),
            "attendees_20250307_090502.zip"
        );
        assert_eq!(
            archive_file_name("attendees", &at, 3),
            "attendees_20250307_090502-3.zip"
        );
    }
}
