//! Trait definitions for the render module.

use async_trait::async_trait;

use super::error::RenderError;
use super::types::{GeneratedDocument, RenderJob};

/// Produces one card document per attendee.
#[async_trait]
pub trait CardRenderer: Send + Sync {
    /// Returns the name of this renderer implementation.
    fn name(&self) -> &str;

    /// Renders the job's card to `job.output_path`.
    ///
    /// Either the whole file is written or nothing is: a failed render never
    /// leaves a partial document behind.
    async fn render(&self, job: RenderJob) -> Result<GeneratedDocument, RenderError>;

    /// Validates that the renderer is ready to run.
    async fn validate(&self) -> Result<(), RenderError>;
}
