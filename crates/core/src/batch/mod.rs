//! Batch orchestration.
//!
//! A batch run reads one roster, renders a card per valid row and packages
//! every card produced into a single archive.
//!
//! # Features
//!
//! - Explicit lifecycle (`Idle → Reading → Processing → Packaging → Done`/`Failed`)
//! - Sequential, input-ordered processing over a lazy row stream
//! - Partial failure: bad rows and failed renders are tallied, not fatal
//! - Duplicate identifiers rejected so output names stay unique
//! - Per-role counts, failures and archive manifest in the result
//! - Single-card mode without an archive
//! - Repackaging of cards kept after a failed packaging step
//!
//! # Example
//!
//! ```ignore
//! use accredit_core::batch::BatchRunner;
//! use accredit_core::archive::ZipArchiver;
//! use accredit_core::render::PdfCardRenderer;
//!
//! let settings = ResolvedConfig::resolve(load_config(Path::new("accredit.toml"))?)?;
//! let renderer = Arc::new(PdfCardRenderer::from_config(&settings));
//! let mut runner = BatchRunner::new(settings, renderer, Arc::new(ZipArchiver::new()));
//!
//! let result = runner.run(None).await?;
//! println!("{} cards in {}", result.generated, result.archive.path.display());
//! for failure in &result.failures {
//!     println!("row {}: {}", failure.row, failure.message);
//! }
//! ```

mod package;
mod runner;
mod single;
mod types;

pub use package::{package_pending, pending_documents};
pub use runner::{BatchError, BatchRunner};
pub use single::{render_single, SingleCardError};
pub use types::{
    BatchPhase, BatchResult, BatchTally, FailureKind, RecordFailure, RecordOutcome,
};
