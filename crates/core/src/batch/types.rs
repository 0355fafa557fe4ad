//! Types for the batch module.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::archive::ArchiveManifest;
use crate::render::{GeneratedDocument, RenderError};
use crate::role::Role;
use crate::roster::RecordValidationError;

/// Lifecycle of a batch run.
///
/// `Idle → Reading → Processing → Packaging → Done`, or `Failed` from any
/// phase on a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPhase {
    Idle,
    Reading,
    Processing,
    Packaging,
    Done,
    Failed,
}

impl BatchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchPhase::Idle => "idle",
            BatchPhase::Reading => "reading",
            BatchPhase::Processing => "processing",
            BatchPhase::Packaging => "packaging",
            BatchPhase::Done => "done",
            BatchPhase::Failed => "failed",
        }
    }

    /// Whether the run has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchPhase::Done | BatchPhase::Failed)
    }
}

impl fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Rejected while reading (missing or duplicate identifier, bad row).
    Validation,
    /// Accepted but the card could not be produced.
    Render,
}

/// One record that did not produce a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFailure {
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendee_id: Option<String>,
    pub kind: FailureKind,
    /// Short machine-readable reason.
    pub reason: String,
    pub message: String,
}

impl RecordFailure {
    pub fn validation(error: &RecordValidationError) -> Self {
        Self {
            row: error.row(),
            attendee_id: error.attendee_id().map(str::to_string),
            kind: FailureKind::Validation,
            reason: error.reason().to_string(),
            message: error.to_string(),
        }
    }

    pub fn render(row: usize, attendee_id: &str, error: &RenderError) -> Self {
        Self {
            row,
            attendee_id: Some(attendee_id.to_string()),
            kind: FailureKind::Render,
            reason: error.reason().to_string(),
            message: error.to_string(),
        }
    }
}

/// Result of processing one row.
#[derive(Debug, Clone)]
pub enum RecordOutcome {
    Rendered(GeneratedDocument),
    Rejected(RecordFailure),
}

/// Running totals folded over the record stream, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchTally {
    pub total_processed: usize,
    pub role_counts: BTreeMap<Role, usize>,
    pub documents: Vec<GeneratedDocument>,
    pub failures: Vec<RecordFailure>,
}

impl BatchTally {
    pub fn new() -> Self {
        Self {
            role_counts: Role::ALL.iter().map(|role| (*role, 0)).collect(),
            ..Self::default()
        }
    }

    /// Adds one outcome to the totals.
    pub fn absorb(mut self, outcome: RecordOutcome) -> Self {
        self.total_processed += 1;
        match outcome {
            RecordOutcome::Rendered(document) => {
                *self.role_counts.entry(document.role).or_insert(0) += 1;
                self.documents.push(document);
            }
            RecordOutcome::Rejected(failure) => self.failures.push(failure),
        }
        self
    }
}

/// Summary of a finished batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub run_id: Uuid,
    pub input_path: PathBuf,
    pub started_at: DateTime<Local>,
    pub completed_at: DateTime<Local>,
    pub duration_ms: u64,
    /// Rows read, including rejected ones. Blank rows are not counted.
    pub total_processed: usize,
    /// Cards generated (and archived).
    pub generated: usize,
    /// Cards per role; every role is present, possibly with 0.
    pub role_counts: BTreeMap<Role, usize>,
    pub failures: Vec<RecordFailure>,
    pub archive: ArchiveManifest,
}

impl BatchResult {
    /// Cards generated for `role`.
    pub fn count(&self, role: Role) -> usize {
        self.role_counts.get(&role).copied().unwrap_or(0)
    }

    /// Rows that did not produce a card.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn archive_path(&self) -> &std::path::Path {
        &self.archive.path
    }
}
