//! Lazy roster reader over spreadsheets and CSV files.

use calamine::{open_workbook_auto, Data, Range, Reader};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::columns::ColumnMapping;
use super::error::{RecordValidationError, RosterError};
use super::types::AttendeeRecord;

/// Outcome of reading one row.
pub type RowResult = Result<AttendeeRecord, RecordValidationError>;

/// Physical roster format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterFormat {
    /// Excel or OpenDocument workbook, first worksheet.
    Spreadsheet,
    /// Comma or semicolon separated text.
    Delimited,
}

impl RosterFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Self::Spreadsheet),
            "csv" | "txt" => Some(Self::Delimited),
            _ => None,
        }
    }
}

/// Rows left to read. Spreadsheets are decoded by calamine as a whole sheet;
/// CSV rows are pulled from the file as they are consumed.
enum RowSource {
    Sheet {
        range: Range<Data>,
        next: usize,
        first_row: usize,
    },
    Delimited {
        records: csv::StringRecordsIntoIter<File>,
        next_row: usize,
    },
}

impl RowSource {
    /// Returns the 1-based sheet row number and the normalized cells.
    fn next_row(&mut self) -> Option<(usize, Result<Vec<String>, String>)> {
        match self {
            RowSource::Sheet {
                range,
                next,
                first_row,
            } => {
                if *next >= range.height() {
                    return None;
                }
                let row = *next;
                *next += 1;
                let cells = (0..range.width())
                    .map(|col| range.get((row, col)).map(cell_text).unwrap_or_default())
                    .collect();
                Some((*first_row + row + 1, Ok(cells)))
            }
            RowSource::Delimited { records, next_row } => {
                let record = records.next()?;
                let row = *next_row;
                *next_row += 1;
                Some((
                    row,
                    record
                        .map(|r| r.iter().map(normalize).collect())
                        .map_err(|e| e.to_string()),
                ))
            }
        }
    }
}

/// Header indices for each logical field.
#[derive(Debug, Clone)]
struct ColumnIndices {
    attendee_id: usize,
    first_name: usize,
    last_name: usize,
    ticket_type: Option<usize>,
    company: Option<usize>,
}

impl ColumnIndices {
    fn resolve(path: &Path, headers: &[String], mapping: &ColumnMapping) -> Result<Self, RosterError> {
        let required = |field: &'static str, header: &str| {
            ColumnMapping::locate(headers, header).ok_or_else(|| RosterError::MissingColumn {
                path: path.to_path_buf(),
                field,
                header: header.to_string(),
            })
        };

        let ticket_type = ColumnMapping::locate(headers, &mapping.ticket_type);
        if ticket_type.is_none() {
            tracing::warn!(
                "Ticket type column '{}' not found in {}; every attendee gets the default role",
                mapping.ticket_type,
                path.display()
            );
        }

        let company = match &mapping.company {
            Some(header) => {
                let index = ColumnMapping::locate(headers, header);
                if index.is_none() {
                    tracing::warn!(
                        "Company column '{}' not found in {}",
                        header,
                        path.display()
                    );
                }
                index
            }
            None => None,
        };

        Ok(Self {
            attendee_id: required("attendee_id", &mapping.attendee_id)?,
            first_name: required("first_name", &mapping.first_name)?,
            last_name: required("last_name", &mapping.last_name)?,
            ticket_type,
            company,
        })
    }

    fn extract(&self, row: usize, cells: &[String]) -> RowResult {
        let cell = |index: usize| cells.get(index).cloned().unwrap_or_default();

        let id = cell(self.attendee_id);
        if id.is_empty() {
            return Err(RecordValidationError::MissingId { row });
        }

        Ok(AttendeeRecord {
            row,
            id,
            first_name: cell(self.first_name),
            last_name: cell(self.last_name),
            ticket_type: self.ticket_type.map(cell).unwrap_or_default(),
            company: self.company.map(cell).filter(|c| !c.is_empty()),
        })
    }
}

/// Single-pass iterator over the attendee rows of one roster file.
///
/// The header row is consumed on open. Completely blank rows are skipped;
/// rows without an identifier yield [`RecordValidationError::MissingId`].
pub struct RosterReader {
    path: PathBuf,
    format: RosterFormat,
    headers: Vec<String>,
    columns: ColumnIndices,
    rows: RowSource,
}

impl RosterReader {
    /// Opens `path` and resolves `mapping` against its header row.
    pub fn open(path: &Path, mapping: &ColumnMapping) -> Result<Self, RosterError> {
        let (format, headers, rows) = open_rows(path)?;
        let columns = ColumnIndices::resolve(path, &headers, mapping)?;

        tracing::info!(
            "Opened roster {} ({} columns)",
            path.display(),
            headers.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            format,
            headers,
            columns,
            rows,
        })
    }

    /// Reads only the header row of `path`.
    pub fn read_headers(path: &Path) -> Result<Vec<String>, RosterError> {
        let (_, headers, _) = open_rows(path)?;
        Ok(headers)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> RosterFormat {
        self.format
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl Iterator for RosterReader {
    type Item = RowResult;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (row, cells) = self.rows.next_row()?;
            let cells = match cells {
                Ok(cells) => cells,
                Err(reason) => return Some(Err(RecordValidationError::MalformedRow { row, reason })),
            };

            if cells.iter().all(String::is_empty) {
                tracing::trace!("Skipping blank row {}", row);
                continue;
            }

            return Some(self.columns.extract(row, &cells));
        }
    }
}

fn open_rows(path: &Path) -> Result<(RosterFormat, Vec<String>, RowSource), RosterError> {
    let format = RosterFormat::from_path(path).ok_or_else(|| RosterError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    match format {
        RosterFormat::Spreadsheet => {
            let (headers, rows) = open_sheet(path)?;
            Ok((format, headers, rows))
        }
        RosterFormat::Delimited => {
            let (headers, rows) = open_delimited(path)?;
            Ok((format, headers, rows))
        }
    }
}

fn open_sheet(path: &Path) -> Result<(Vec<String>, RowSource), RosterError> {
    let spreadsheet_error = |reason: String| RosterError::Spreadsheet {
        path: path.to_path_buf(),
        reason,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| RosterError::MissingHeader {
            path: path.to_path_buf(),
        })?
        .map_err(|e| spreadsheet_error(e.to_string()))?;

    if range.is_empty() {
        return Err(RosterError::MissingHeader {
            path: path.to_path_buf(),
        });
    }

    let headers = (0..range.width())
        .map(|col| range.get((0, col)).map(cell_text).unwrap_or_default())
        .collect();
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);

    Ok((
        headers,
        RowSource::Sheet {
            range,
            next: 1,
            first_row,
        },
    ))
}

fn open_delimited(path: &Path) -> Result<(Vec<String>, RowSource), RosterError> {
    let delimiter = sniff_delimiter(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| RosterError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| RosterError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(RosterError::MissingHeader {
            path: path.to_path_buf(),
        });
    }

    Ok((
        headers,
        RowSource::Delimited {
            records: reader.into_records(),
            next_row: 2,
        },
    ))
}

/// Semicolon when the header line has more semicolons than commas
/// (spreadsheet exports in comma-decimal locales), comma otherwise.
fn sniff_delimiter(path: &Path) -> Result<u8, RosterError> {
    let file = File::open(path).map_err(|e| RosterError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut first_line = String::new();
    BufReader::new(file)
        .read_line(&mut first_line)
        .map_err(|e| RosterError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;

    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    Ok(if semicolons > commas { b';' } else { b',' })
}

/// Cell value as text. Whole floats print without a fraction so that
/// numeric identifiers survive spreadsheet round-trips.
fn cell_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) => normalize(s),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => normalize(&other.to_string()),
    }
}

/// Trims and maps placeholder strings left by dataframe exports to empty.
fn normalize(value: &str) -> String {
    let value = value.trim();
    if value.eq_ignore_ascii_case("nan") || value.eq_ignore_ascii_case("none") {
        String::new()
    } else {
        value.to_string()
    }
}
