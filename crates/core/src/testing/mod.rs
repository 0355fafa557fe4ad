//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the renderer and archiver
//! traits plus fixtures for rosters, templates and run settings, so the
//! batch pipeline can be exercised end to end in a temporary directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use accredit_core::testing::{fixtures, MockArchiver, MockRenderer};
//!
//! let temp = tempfile::TempDir::new()?;
//! let settings = fixtures::resolved_config(temp.path())?;
//! fixtures::write_csv_roster(&settings.input_folder.join("roster.csv"), &[
//!     ["A1", "Ana", "Ruiz", "Helpers"],
//! ])?;
//!
//! let mut runner = BatchRunner::new(settings, Arc::new(MockRenderer::new()), Arc::new(MockArchiver::new()));
//! ```

mod mock_archiver;
mod mock_renderer;

pub use mock_archiver::MockArchiver;
pub use mock_renderer::{MockRenderer, RecordedRender};

/// Test fixtures and helper functions.
pub mod fixtures {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};
    use std::fs;
    use std::io;
    use std::path::Path;

    use crate::config::{load_config_from_str, ResolvedConfig};

    /// Header row of the default English export.
    pub const DEFAULT_HEADERS: [&str; 4] = [
        "Attendee #",
        "Final Attendee First Name",
        "Final Attendee Last Name",
        "Ticket Type",
    ];

    fn other(e: impl std::fmt::Display) -> io::Error {
        io::Error::other(e.to_string())
    }

    /// Write a one-page PDF of `width` x `height` points with a framed border.
    ///
    /// The media box and resources sit on the page tree node, so the page
    /// inherits them.
    pub fn blank_template_pdf(path: &Path, width: f32, height: f32) -> io::Result<()> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let border = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new("RG", vec![0.2f32.into(), 0.2f32.into(), 0.2f32.into()]),
                Operation::new(
                    "re",
                    vec![
                        10.0f32.into(),
                        10.0f32.into(),
                        (width - 20.0).into(),
                        (height - 20.0).into(),
                    ],
                ),
                Operation::new("S", vec![]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            border.encode().map_err(other)?,
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1i64,
            "MediaBox" => vec![0.0f32.into(), 0.0f32.into(), width.into(), height.into()],
            "Resources" => dictionary! {},
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut file = fs::File::create(path)?;
        doc.save_to(&mut file).map_err(other)
    }

    /// Write a CSV roster with [`DEFAULT_HEADERS`] and one line per row
    /// (`[id, first name, last name, ticket type]`).
    pub fn write_csv_roster(path: &Path, rows: &[[&str; 4]]) -> io::Result<()> {
        let mut writer = csv::Writer::from_path(path).map_err(other)?;
        writer.write_record(DEFAULT_HEADERS).map_err(other)?;
        for row in rows {
            writer.write_record(row).map_err(other)?;
        }
        writer.flush()
    }

    /// Create `input/`, `output/` and `templates/` under `root`, write an
    /// attendee and a staff template, and resolve settings pointing at them.
    ///
    /// The speaker role falls back to the attendee template.
    pub fn resolved_config(root: &Path) -> io::Result<ResolvedConfig> {
        let templates = root.join("templates");
        fs::create_dir_all(root.join("input"))?;
        fs::create_dir_all(&templates)?;
        blank_template_pdf(&templates.join("attendee.pdf"), 842.0, 595.0)?;
        blank_template_pdf(&templates.join("staff.pdf"), 842.0, 595.0)?;

        let toml = format!(
            r#"
[folders]
input = '{root}/input'
output = '{root}/output'

[templates]
attendee = '{root}/templates/attendee.pdf'
staff = '{root}/templates/staff.pdf'

[ticket_types]
staff = ["Helpers"]
speaker = ["Speakers"]

[qr]
position = "40,40"
size = 150
"#,
            root = root.display()
        );

        let config = load_config_from_str(&toml).map_err(other)?;
        ResolvedConfig::resolve(config).map_err(other)
    }
}
