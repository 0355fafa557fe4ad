//! Types for the render module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::role::Role;
use crate::roster::AttendeeRecord;

/// Placement of the scannable code, in page units with a lower-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QrGeometry {
    pub x: f32,
    pub y: f32,
    /// Side length of the square code, quiet zone included.
    pub size: f32,
}

/// Bounds for the auto-shrinking name font.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontSizing {
    pub max_width: f32,
    pub max_size: f32,
    pub min_size: f32,
    pub step: f32,
}

impl Default for FontSizing {
    fn default() -> Self {
        Self {
            max_width: 300.0,
            max_size: 30.0,
            min_size: 10.0,
            step: 1.0,
        }
    }
}

impl FontSizing {
    /// Same bounds with a lower ceiling.
    pub fn capped(self, max_size: f32) -> Self {
        Self {
            max_size: self.max_size.min(max_size),
            min_size: self.min_size.min(max_size),
            ..self
        }
    }
}

/// Name block layout next to the code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextLayout {
    pub sizing: FontSizing,
    /// Horizontal space between the code and the text.
    pub gap: f32,
    pub show_company: bool,
    /// Ceiling for the company line font.
    pub company_max_size: f32,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            sizing: FontSizing::default(),
            gap: 10.0,
            show_company: true,
            company_max_size: 18.0,
        }
    }
}

/// One card to render.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub record: AttendeeRecord,
    pub role: Role,
    pub template: PathBuf,
    pub output_path: PathBuf,
}

/// A card written to the output folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedDocument {
    pub attendee_id: String,
    pub role: Role,
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl GeneratedDocument {
    /// File name inside the output folder and archive.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| output_file_name(&self.attendee_id))
    }
}

/// File name prefix of every generated card.
pub const OUTPUT_FILE_PREFIX: &str = "attendee-";

/// Output file name for an attendee: `attendee-{id}.pdf`, with anything
/// outside `[A-Za-z0-9._-]` replaced by `_`.
pub fn output_file_name(attendee_id: &str) -> String {
    let safe: String = attendee_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}{}.pdf", OUTPUT_FILE_PREFIX, safe)
}
