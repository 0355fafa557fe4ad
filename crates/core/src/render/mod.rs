//! Card renderer module.
//!
//! This module provides the `CardRenderer` trait and a PDF implementation that
//! overlays a scannable code and the attendee's name onto a role template.
//!
//! # Features
//!
//! - High error-correction QR codes drawn as vector paths
//! - Uppercase first and last name lines, each shrunk to fit a width budget
//! - Optional company line under the name block
//! - Template page content left untouched, overlay drawn on top
//! - Atomic output writes (temporary file, then rename)
//!
//! # Example
//!
//! ```ignore
//! use accredit_core::render::{CardRenderer, PdfCardRenderer, QrGeometry, RenderJob, TextLayout};
//!
//! let renderer = PdfCardRenderer::new(
//!     QrGeometry { x: 40.0, y: 40.0, size: 150.0 },
//!     TextLayout::default(),
//! );
//!
//! let doc = renderer
//!     .render(RenderJob {
//!         record,
//!         role: Role::Speaker,
//!         template: PathBuf::from("templates/speaker.pdf"),
//!         output_path: PathBuf::from("output/attendee-A1.pdf"),
//!     })
//!     .await?;
//! println!("Wrote {} bytes", doc.size_bytes);
//! ```

mod error;
mod overlay;
mod pdf;
mod qr;
mod text;
mod traits;
mod types;

pub use error::RenderError;
pub use overlay::OverlayLayout;
pub use pdf::PdfCardRenderer;
pub use qr::QrMatrix;
pub use text::{fit_font_size, text_width};
pub use traits::CardRenderer;
pub use types::{
    output_file_name, FontSizing, GeneratedDocument, QrGeometry, RenderJob, TextLayout,
    OUTPUT_FILE_PREFIX,
};
