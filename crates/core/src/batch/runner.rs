//! Batch orchestrator: roster in, one archive out.

use chrono::Local;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

use crate::archive::{ArchiveJob, Archiver, PackagingError};
use crate::config::{ConfigError, ResolvedConfig};
use crate::metrics;
use crate::render::{output_file_name, CardRenderer, RenderJob};
use crate::role::classify;
use crate::roster::{
    resolve_input, NoInputFileError, RecordValidationError, RosterError, RosterReader, RowResult,
};

use super::types::{BatchPhase, BatchResult, BatchTally, RecordFailure, RecordOutcome};

/// Fatal errors. Any of these ends the run in [`BatchPhase::Failed`].
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    NoInputFile(#[from] NoInputFileError),

    #[error(transparent)]
    Roster(#[from] RosterError),

    /// The output folder could not be created.
    #[error("Cannot create output folder {path}")]
    OutputFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Packaging failed. The generated documents are still in the output
    /// folder and `tally` holds what the run produced.
    #[error("Packaging failed, {} generated cards kept", .tally.documents.len())]
    Packaging {
        tally: Box<BatchTally>,
        #[source]
        source: PackagingError,
    },
}

impl BatchError {
    /// Totals of a run that got as far as packaging.
    pub fn tally(&self) -> Option<&BatchTally> {
        match self {
            BatchError::Packaging { tally, .. } => Some(tally),
            _ => None,
        }
    }
}

/// Runs batches over resolved settings with the given renderer and archiver.
///
/// Records are processed one at a time in input order. Per-record problems
/// are collected in the result; only errors that make the whole run
/// meaningless are returned as [`BatchError`].
pub struct BatchRunner<R: CardRenderer, A: Archiver> {
    settings: ResolvedConfig,
    renderer: Arc<R>,
    archiver: Arc<A>,
    phase: BatchPhase,
}

impl<R: CardRenderer, A: Archiver> BatchRunner<R, A> {
    pub fn new(settings: ResolvedConfig, renderer: Arc<R>, archiver: Arc<A>) -> Self {
        Self {
            settings,
            renderer,
            archiver,
            phase: BatchPhase::Idle,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    pub fn settings(&self) -> &ResolvedConfig {
        &self.settings
    }

    /// Processes `input`, or the latest roster in the input folder when
    /// `None`, and packages the cards.
    pub async fn run(&mut self, input: Option<&Path>) -> Result<BatchResult, BatchError> {
        self.phase = BatchPhase::Idle;
        let run_id = Uuid::new_v4();
        tracing::info!(
            "Starting batch run {} (renderer: {}, archiver: {})",
            run_id,
            self.renderer.name(),
            self.archiver.name()
        );

        let result = self.execute(run_id, input).await;
        match &result {
            Ok(summary) => {
                self.transition(BatchPhase::Done);
                metrics::BATCH_RUNS.with_label_values(&["done"]).inc();
                tracing::info!(
                    "Batch run {} done: {} of {} records rendered, archive {}",
                    run_id,
                    summary.generated,
                    summary.total_processed,
                    summary.archive.path.display()
                );
            }
            Err(e) => {
                self.transition(BatchPhase::Failed);
                metrics::BATCH_RUNS.with_label_values(&["failed"]).inc();
                tracing::error!("Batch run {} failed: {}", run_id, e);
            }
        }
        result
    }

    async fn execute(
        &mut self,
        run_id: Uuid,
        input: Option<&Path>,
    ) -> Result<BatchResult, BatchError> {
        let started_at = Local::now();
        let start = Instant::now();

        self.transition(BatchPhase::Reading);
        let input_path = resolve_input(
            input,
            &self.settings.input_folder,
            &self.settings.input_pattern,
        )?;
        let reader = RosterReader::open(&input_path, &self.settings.columns)?;

        let output_folder = self.settings.output_folder.clone();
        tokio::fs::create_dir_all(&output_folder)
            .await
            .map_err(|e| BatchError::OutputFolder {
                path: output_folder.clone(),
                source: e,
            })?;

        self.transition(BatchPhase::Processing);
        let mut guard = IdentityGuard::default();
        let renderer = self.renderer.as_ref();
        let settings = &self.settings;
        let tally = stream::iter(reader.map(move |row| guard.admit(row)))
            .then(|row| process_row(renderer, settings, row))
            .fold(BatchTally::new(), |tally, outcome| async move {
                tally.absorb(outcome)
            })
            .await;

        self.transition(BatchPhase::Packaging);
        let completed_at = Local::now();
        let generated = tally.documents.len();
        let job = ArchiveJob {
            documents: tally.documents.iter().map(|d| d.path.clone()).collect(),
            destination_dir: self.settings.archive_folder.clone(),
            prefix: self.settings.archive_prefix.clone(),
            completed_at,
            cleanup_sources: true,
        };

        let archive = match self.archiver.package(job).await {
            Ok(manifest) => {
                metrics::ARCHIVES_WRITTEN.with_label_values(&["success"]).inc();
                metrics::DOCUMENTS_ARCHIVED.inc_by(manifest.entries.len() as u64);
                manifest
            }
            Err(e) => {
                metrics::ARCHIVES_WRITTEN.with_label_values(&["failed"]).inc();
                tracing::error!(
                    "Packaging failed, {} generated documents kept in {}",
                    generated,
                    output_folder.display()
                );
                return Err(BatchError::Packaging {
                    tally: Box::new(tally),
                    source: e,
                });
            }
        };

        Ok(BatchResult {
            run_id,
            input_path,
            started_at,
            completed_at,
            duration_ms: start.elapsed().as_millis() as u64,
            total_processed: tally.total_processed,
            generated,
            role_counts: tally.role_counts,
            failures: tally.failures,
            archive,
        })
    }

    fn transition(&mut self, next: BatchPhase) {
        tracing::debug!("Batch phase {} -> {}", self.phase, next);
        self.phase = next;
    }
}

/// Classifies and renders one admitted row. Never fails: problems become
/// [`RecordOutcome::Rejected`].
async fn process_row<R: CardRenderer + ?Sized>(
    renderer: &R,
    settings: &ResolvedConfig,
    row: RowResult,
) -> RecordOutcome {
    metrics::RECORDS_READ.inc();

    let record = match row {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!("Skipping {}", e);
            metrics::RECORDS_REJECTED
                .with_label_values(&[e.reason()])
                .inc();
            return RecordOutcome::Rejected(RecordFailure::validation(&e));
        }
    };

    let role = classify(&record.ticket_type, &settings.roles);
    let row = record.row;
    let attendee_id = record.id.clone();
    let job = RenderJob {
        template: settings.roles.template(role).to_path_buf(),
        output_path: settings.output_folder.join(output_file_name(&record.id)),
        role,
        record,
    };

    let timer = metrics::RENDER_DURATION
        .with_label_values(&[role.as_str()])
        .start_timer();
    match renderer.render(job).await {
        Ok(document) => {
            timer.observe_duration();
            metrics::CARDS_RENDERED
                .with_label_values(&[role.as_str()])
                .inc();
            tracing::info!(
                "Row {}: {} ({}) -> {}",
                row,
                attendee_id,
                role,
                document.path.display()
            );
            RecordOutcome::Rendered(document)
        }
        Err(e) => {
            timer.stop_and_discard();
            metrics::RENDER_FAILURES
                .with_label_values(&[e.reason()])
                .inc();
            tracing::warn!("Row {}: card for {} failed: {}", row, attendee_id, e);
            RecordOutcome::Rejected(RecordFailure::render(row, &attendee_id, &e))
        }
    }
}

/// Rejects rows whose output file name was already claimed earlier in the
/// run, which keeps identifier to file name injective.
#[derive(Debug, Default)]
struct IdentityGuard {
    claimed: HashMap<String, usize>,
}

impl IdentityGuard {
    fn admit(&mut self, row: RowResult) -> RowResult {
        let record = row?;
        let file_name = output_file_name(&record.id);
        if let Some(first_row) = self.claimed.get(&file_name) {
            return Err(RecordValidationError::DuplicateId {
                row: record.row,
                id: record.id,
                first_row: *first_row,
            });
        }
        self.claimed.insert(file_name, record.row);
        Ok(record)
    }
}
