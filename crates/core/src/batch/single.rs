//! Single-card mode: one explicit record, no roster and no archive.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ResolvedConfig;
use crate::render::{output_file_name, CardRenderer, GeneratedDocument, RenderError, RenderJob};
use crate::role::{classify, Role};
use crate::roster::{AttendeeRecord, RecordValidationError};

#[derive(Debug, Error)]
pub enum SingleCardError {
    #[error(transparent)]
    Invalid(#[from] RecordValidationError),

    #[error("Cannot create output folder {path}")]
    OutputFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Renders one card into the output folder.
///
/// The role comes from `role` when given, otherwise from classifying the
/// record's ticket type.
pub async fn render_single<R: CardRenderer + ?Sized>(
    settings: &ResolvedConfig,
    renderer: &R,
    record: AttendeeRecord,
    role: Option<Role>,
) -> Result<GeneratedDocument, SingleCardError> {
    if record.id.trim().is_empty() {
        return Err(RecordValidationError::MissingId { row: record.row }.into());
    }

    let role = role.unwrap_or_else(|| classify(&record.ticket_type, &settings.roles));

    tokio::fs::create_dir_all(&settings.output_folder)
        .await
        .map_err(|e| SingleCardError::OutputFolder {
            path: settings.output_folder.clone(),
            source: e,
        })?;

    let job = RenderJob {
        template: settings.roles.template(role).to_path_buf(),
        output_path: settings.output_folder.join(output_file_name(&record.id)),
        role,
        record,
    };

    let document = renderer.render(job).await?;
    tracing::info!(
        "Generated {} card for {} at {}",
        document.role,
        document.attendee_id,
        document.path.display()
    );
    Ok(document)
}
