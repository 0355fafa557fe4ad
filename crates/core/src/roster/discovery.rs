//! Input file discovery.

use regex_lite::Regex;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::error::NoInputFileError;

/// Returns `explicit` when given (it must exist), otherwise the latest
/// matching file in `folder`.
pub fn resolve_input(
    explicit: Option<&Path>,
    folder: &Path,
    pattern: &Regex,
) -> Result<PathBuf, NoInputFileError> {
    match explicit {
        Some(path) if path.is_file() => Ok(path.to_path_buf()),
        Some(path) => Err(NoInputFileError::NotFound {
            path: path.to_path_buf(),
        }),
        None => latest_input_file(folder, pattern),
    }
}

/// Picks the most recently modified file in `folder` whose name matches
/// `pattern`. Ties are broken by file name, the greater name wins.
///
/// Hidden files and office lock files (`~$...`) are never candidates.
pub fn latest_input_file(folder: &Path, pattern: &Regex) -> Result<PathBuf, NoInputFileError> {
    let entries = std::fs::read_dir(folder).map_err(|e| NoInputFileError::FolderUnreadable {
        folder: folder.to_path_buf(),
        source: e,
    })?;

    let mut latest: Option<(SystemTime, String, PathBuf)> = None;

    for entry in entries {
        let entry = entry.map_err(|e| NoInputFileError::FolderUnreadable {
            folder: folder.to_path_buf(),
            source: e,
        })?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') || name.starts_with("~$") || !pattern.is_match(&name) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) if m.is_file() => m,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        let newer = match &latest {
            None => true,
            Some((best_time, best_name, _)) => {
                (modified, name.as_str()) > (*best_time, best_name.as_str())
            }
        };
        if newer {
            latest = Some((modified, name, entry.path()));
        }
    }

    match latest {
        Some((_, _, path)) => {
            tracing::debug!("Selected latest input file {}", path.display());
            Ok(path)
        }
        None => Err(NoInputFileError::NoCandidates {
            folder: folder.to_path_buf(),
            pattern: pattern.as_str().to_string(),
        }),
    }
}
