//! Attendee roster reading.
//!
//! This module turns a tabular export from the ticketing system into a lazy,
//! single-pass sequence of [`AttendeeRecord`]s.
//!
//! # Features
//!
//! - Spreadsheets (`.xlsx`, `.xlsm`, `.xls`, `.ods`) via calamine, first worksheet
//! - Delimited text (`.csv`)
//! - Logical-to-physical column mapping for locale-variant headers
//! - Header suggestions from known Eventbrite exports (Spanish and English)
//! - Latest-file discovery when no input is given
//! - Per-row validation: rows without an identifier are reported, not dropped
//!
//! # Example
//!
//! ```ignore
//! use accredit_core::roster::{resolve_input, ColumnMapping, RosterReader};
//!
//! let path = resolve_input(None, Path::new("input"), &pattern)?;
//! let reader = RosterReader::open(&path, &ColumnMapping::default())?;
//!
//! for row in reader {
//!     match row {
//!         Ok(record) => println!("{} {}", record.id, record.first_name),
//!         Err(e) => eprintln!("skipped: {}", e),
//!     }
//! }
//! ```

mod columns;
mod discovery;
mod error;
mod reader;
mod types;

pub use columns::{suggest_column_mapping, ColumnMapping};
pub use discovery::{latest_input_file, resolve_input};
pub use error::{NoInputFileError, RecordValidationError, RosterError};
pub use reader::{RosterFormat, RosterReader, RowResult};
pub use types::AttendeeRecord;
