//! Error types for the render module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors producing a single card. The batch records them and moves on.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Template could not be read or parsed as a PDF.
    #[error("Failed to load template {path}: {reason}")]
    TemplateLoad { path: PathBuf, reason: String },

    /// Template parsed but has no page to draw on.
    #[error("Template {path} has no pages")]
    EmptyTemplate { path: PathBuf },

    /// The identifier does not fit in a QR code.
    #[error("Failed to encode QR code: {reason}")]
    QrEncoding { reason: String },

    /// Building or serializing the output document failed.
    #[error("PDF error: {reason}")]
    Pdf { reason: String },

    /// Output directory is missing or not writable.
    #[error("Cannot write card to {path}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error during rendering.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking render task panicked or was cancelled.
    #[error("Render task failed: {reason}")]
    TaskFailed { reason: String },
}

impl RenderError {
    /// Creates a new template load error.
    pub fn template_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::TemplateLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a new PDF error.
    pub fn pdf(reason: impl ToString) -> Self {
        Self::Pdf {
            reason: reason.to_string(),
        }
    }

    /// Short label for metrics and summaries.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::TemplateLoad { .. } | Self::EmptyTemplate { .. } => "template",
            Self::QrEncoding { .. } => "qr_encoding",
            Self::Pdf { .. } => "pdf",
            Self::Output { .. } | Self::Io(_) => "io",
            Self::TaskFailed { .. } => "task_failed",
        }
    }
}
