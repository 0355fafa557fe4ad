//! Error types for the roster module.

use std::path::PathBuf;
use thiserror::Error;

/// No roster file was given or found.
#[derive(Debug, Error)]
pub enum NoInputFileError {
    /// An explicitly named input file does not exist.
    #[error("Input file not found: {path}")]
    NotFound { path: PathBuf },

    /// The input folder could not be listed.
    #[error("Input folder is not readable: {folder}")]
    FolderUnreadable {
        folder: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input folder holds no file matching the discovery pattern.
    #[error("No input file matching '{pattern}' in {folder}")]
    NoCandidates { folder: PathBuf, pattern: String },
}

/// Fatal errors opening or parsing a roster. The batch cannot start.
#[derive(Debug, Error)]
pub enum RosterError {
    /// File extension is not a supported tabular format.
    #[error("Unsupported roster format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// I/O error opening the file.
    #[error("Failed to open roster {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Spreadsheet could not be parsed.
    #[error("Failed to read spreadsheet {path}: {reason}")]
    Spreadsheet { path: PathBuf, reason: String },

    /// Delimited file could not be parsed.
    #[error("Failed to read CSV {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The workbook has no worksheet or the sheet is empty.
    #[error("Roster {path} has no header row")]
    MissingHeader { path: PathBuf },

    /// A mapped column is not present in the header row.
    #[error("Column '{header}' (for {field}) not found in roster {path}")]
    MissingColumn {
        path: PathBuf,
        field: &'static str,
        header: String,
    },
}

/// A single row was rejected. The batch continues.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordValidationError {
    /// The identifier cell is empty.
    #[error("row {row}: attendee identifier is empty")]
    MissingId { row: usize },

    /// The identifier (or the file name derived from it) was already used.
    #[error("row {row}: duplicate attendee identifier '{id}' (first seen on row {first_row})")]
    DuplicateId {
        row: usize,
        id: String,
        first_row: usize,
    },

    /// The row could not be decoded.
    #[error("row {row}: malformed row: {reason}")]
    MalformedRow { row: usize, reason: String },
}

impl RecordValidationError {
    /// Sheet row the error refers to.
    pub fn row(&self) -> usize {
        match self {
            Self::MissingId { row } | Self::DuplicateId { row, .. } | Self::MalformedRow { row, .. } => {
                *row
            }
        }
    }

    /// Identifier involved, when there is one.
    pub fn attendee_id(&self) -> Option<&str> {
        match self {
            Self::DuplicateId { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Short label for metrics and summaries.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingId { .. } => "missing_id",
            Self::DuplicateId { .. } => "duplicate_id",
            Self::MalformedRow { .. } => "malformed_row",
        }
    }
}
