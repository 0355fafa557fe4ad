//! Mock card renderer for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::render::{CardRenderer, GeneratedDocument, RenderError, RenderJob};

/// A recorded render job for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedRender {
    /// The job that was submitted.
    pub job: RenderJob,
    /// Whether the render succeeded.
    pub success: bool,
}

/// Mock implementation of the CardRenderer trait.
///
/// Provides controllable behavior for testing:
/// - Track render jobs for assertions
/// - Fail for chosen attendee identifiers
/// - Write small placeholder files so archiving has something to bundle
///
/// # Example
///
/// ```rust,ignore
/// use accredit_core::testing::MockRenderer;
///
/// let renderer = MockRenderer::new();
/// renderer.fail_for("A2").await;
///
/// let result = runner.run(None).await?;
///
/// let renders = renderer.recorded_renders().await;
/// assert_eq!(renders.len(), 3);
/// assert!(!renders[1].success);
/// ```
#[derive(Debug)]
pub struct MockRenderer {
    /// Recorded renders, in call order.
    renders: Arc<RwLock<Vec<RecordedRender>>>,
    /// Identifiers whose render always fails.
    failing_ids: Arc<RwLock<HashSet<String>>>,
    /// If set, the next render will fail with this error.
    next_error: Arc<RwLock<Option<RenderError>>>,
    /// Whether to write a placeholder file at the output path.
    write_files: bool,
}

impl Default for MockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRenderer {
    /// Create a new mock renderer that writes placeholder files.
    pub fn new() -> Self {
        Self {
            renders: Arc::new(RwLock::new(Vec::new())),
            failing_ids: Arc::new(RwLock::new(HashSet::new())),
            next_error: Arc::new(RwLock::new(None)),
            write_files: true,
        }
    }

    /// Create a mock that only records jobs and touches no files.
    pub fn without_files() -> Self {
        Self {
            write_files: false,
            ..Self::new()
        }
    }

    /// Make every render for `attendee_id` fail.
    pub async fn fail_for(&self, attendee_id: impl Into<String>) {
        self.failing_ids.write().await.insert(attendee_id.into());
    }

    /// Make the next render fail with `error`.
    pub async fn set_next_error(&self, error: RenderError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get all recorded renders.
    pub async fn recorded_renders(&self) -> Vec<RecordedRender> {
        self.renders.read().await.clone()
    }

    /// Identifiers rendered successfully, in call order.
    pub async fn rendered_ids(&self) -> Vec<String> {
        self.renders
            .read()
            .await
            .iter()
            .filter(|r| r.success)
            .map(|r| r.job.record.id.clone())
            .collect()
    }

    /// Clear recorded renders.
    pub async fn clear(&self) {
        self.renders.write().await.clear();
    }

    async fn attempt(&self, job: &RenderJob) -> Result<GeneratedDocument, RenderError> {
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        if self.failing_ids.read().await.contains(&job.record.id) {
            return Err(RenderError::QrEncoding {
                reason: format!("mock failure for {}", job.record.id),
            });
        }

        let size_bytes = if self.write_files {
            let content = format!("%PDF-mock {} {}", job.role, job.record.id);
            tokio::fs::write(&job.output_path, &content)
                .await
                .map_err(|e| RenderError::Output {
                    path: job.output_path.clone(),
                    source: e,
                })?;
            content.len() as u64
        } else {
            0
        };

        Ok(GeneratedDocument {
            attendee_id: job.record.id.clone(),
            role: job.role,
            path: job.output_path.clone(),
            size_bytes,
        })
    }
}

#[async_trait]
impl CardRenderer for MockRenderer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn render(&self, job: RenderJob) -> Result<GeneratedDocument, RenderError> {
        let result = self.attempt(&job).await;
        self.renders.write().await.push(RecordedRender {
            job,
            success: result.is_ok(),
        });
        result
    }

    async fn validate(&self) -> Result<(), RenderError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;
    use crate::roster::AttendeeRecord;
    use tempfile::TempDir;

    fn job(temp: &TempDir, id: &str) -> RenderJob {
        RenderJob {
            record: AttendeeRecord::new(2, id, "Ana", "Ruiz"),
            role: Role::Attendee,
            template: temp.path().join("template.pdf"),
            output_path: temp.path().join(format!("attendee-{}.pdf", id)),
        }
    }

    #[tokio::test]
    async fn test_mock_writes_and_records() {
        let temp = TempDir::new().unwrap();
        let renderer = MockRenderer::new();

        let doc = renderer.render(job(&temp, "A1")).await.unwrap();
        assert!(doc.path.exists());
        assert!(doc.size_bytes > 0);
        assert_eq!(renderer.rendered_ids().await, vec!["A1"]);
    }

    #[tokio::test]
    async fn test_mock_failures() {
        let temp = TempDir::new().unwrap();
        let renderer = MockRenderer::without_files();
        renderer.fail_for("A2").await;
        renderer
            .set_next_error(RenderError::pdf("boom"))
            .await;

        assert!(matches!(
            renderer.render(job(&temp, "A1")).await,
            Err(RenderError::Pdf { .. })
        ));
        assert!(renderer.render(job(&temp, "A1")).await.is_ok());
        assert!(renderer.render(job(&temp, "A2")).await.is_err());

        let renders = renderer.recorded_renders().await;
        assert_eq!(renders.len(), 3);
        assert_eq!(
            renders.iter().map(|r| r.success).collect::<Vec<_>>(),
            vec![false, true, false]
        );
        assert!(!temp.path().join("attendee-A1.pdf").exists());
    }
}
