//! Logical field to source column mapping.
//!
//! Ticketing exports name their columns differently per locale, so fields are
//! looked up through a declarative table instead of per-language code paths.

use serde::{Deserialize, Serialize};

use crate::config::ColumnsConfig;

/// Known headers per logical field, most specific first.
const KNOWN_ID_HEADERS: &[&str] = &[
    "Número de código de barras",
    "Attendee #",
    "Order #",
    "Barcode",
];
const KNOWN_FIRST_NAME_HEADERS: &[&str] = &[
    "Nombre del asistente",
    "Final Attendee First Name",
    "First Name",
    "Nombre",
];
const KNOWN_LAST_NAME_HEADERS: &[&str] = &[
    "Apellidos del asistente",
    "Final Attendee Last Name",
    "Last Name",
    "Apellidos",
];
const KNOWN_TICKET_TYPE_HEADERS: &[&str] = &["Tipo de entrada", "Ticket Type", "Ticket Class Name"];
const KNOWN_COMPANY_HEADERS: &[&str] = &["Empresa", "Company", "Organization"];

/// Source column header for each logical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub attendee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub ticket_type: String,
    /// Optional; absent when the export has no company column.
    pub company: Option<String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self::from(&ColumnsConfig::default())
    }
}

impl From<&ColumnsConfig> for ColumnMapping {
    fn from(config: &ColumnsConfig) -> Self {
        Self {
            attendee_id: config.attendee_id.trim().to_string(),
            first_name: config.first_name.trim().to_string(),
            last_name: config.last_name.trim().to_string(),
            ticket_type: config.ticket_type.trim().to_string(),
            company: config
                .company
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        }
    }
}

impl ColumnMapping {
    /// Finds the index of `header` in `headers`: exact match first, then
    /// case-insensitive.
    pub fn locate(headers: &[String], header: &str) -> Option<usize> {
        let header = header.trim();
        headers
            .iter()
            .position(|h| h.trim() == header)
            .or_else(|| {
                headers
                    .iter()
                    .position(|h| h.trim().eq_ignore_ascii_case(header))
            })
    }
}

/// Suggests a mapping for a header row using known export headers.
///
/// Each field takes the first known header present verbatim, then the first
/// header containing a known name case-insensitively, and otherwise keeps
/// the most common name so the caller sees what was expected.
pub fn suggest_column_mapping(headers: &[String]) -> ColumnMapping {
    let company = best_match(headers, KNOWN_COMPANY_HEADERS);
    ColumnMapping {
        attendee_id: best_match(headers, KNOWN_ID_HEADERS)
            .unwrap_or_else(|| KNOWN_ID_HEADERS[0].to_string()),
        first_name: best_match(headers, KNOWN_FIRST_NAME_HEADERS)
            .unwrap_or_else(|| KNOWN_FIRST_NAME_HEADERS[0].to_string()),
        last_name: best_match(headers, KNOWN_LAST_NAME_HEADERS)
            .unwrap_or_else(|| KNOWN_LAST_NAME_HEADERS[0].to_string()),
        ticket_type: best_match(headers, KNOWN_TICKET_TYPE_HEADERS)
            .unwrap_or_else(|| KNOWN_TICKET_TYPE_HEADERS[0].to_string()),
        company,
    }
}

fn best_match(headers: &[String], candidates: &[&str]) -> Option<String> {
    if let Some(exact) = candidates
        .iter()
        .find(|c| headers.iter().any(|h| h.trim() == **c))
    {
        return Some((*exact).to_string());
    }

    candidates.iter().find_map(|candidate| {
        let needle = candidate.to_lowercase();
        headers
            .iter()
            .find(|h| h.to_lowercase().contains(&needle))
            .map(|h| h.trim().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_mapping_matches_english_export() {
        let mapping = ColumnMapping::default();
        assert_eq!(mapping.attendee_id, "Attendee #");
        assert_eq!(mapping.first_name, "Final Attendee First Name");
        assert_eq!(mapping.last_name, "Final Attendee Last Name");
        assert_eq!(mapping.ticket_type, "Ticket Type");
        assert!(mapping.company.is_none());
    }

    #[test]
    fn test_from_config_drops_blank_company() {
        let config = ColumnsConfig {
            company: Some("  ".to_string()),
            ..ColumnsConfig::default()
        };
        assert!(ColumnMapping::from(&config).company.is_none());
    }

    #[test]
    fn test_suggest_spanish_export() {
        let mapping = suggest_column_mapping(&headers(&[
            "Número de pedido",
            "Número de código de barras",
            "Nombre del asistente",
            "Apellidos del asistente",
            "Tipo de entrada",
            "Empresa",
        ]));
        assert_eq!(mapping.attendee_id, "Número de código de barras");
        assert_eq!(mapping.first_name, "Nombre del asistente");
        assert_eq!(mapping.last_name, "Apellidos del asistente");
        assert_eq!(mapping.ticket_type, "Tipo de entrada");
        assert_eq!(mapping.company.as_deref(), Some("Empresa"));
    }

    #[test]
    fn test_suggest_english_export() {
        let mapping = suggest_column_mapping(&headers(&[
            "Order #",
            "Attendee #",
            "Final Attendee First Name",
            "Final Attendee Last Name",
            "Ticket Type",
        ]));
        // "Attendee #" precedes "Order #" in the known list
        assert_eq!(mapping.attendee_id, "Attendee #");
        assert_eq!(mapping.first_name, "Final Attendee First Name");
        assert_eq!(mapping.ticket_type, "Ticket Type");
        assert!(mapping.company.is_none());
    }

    #[test]
    fn test_suggest_partial_match() {
        let mapping = suggest_column_mapping(&headers(&["Attendee Barcode", "Guest first name"]));
        assert_eq!(mapping.attendee_id, "Attendee Barcode");
        assert_eq!(mapping.first_name, "Guest first name");
        // Nothing matched: falls back to the most common name
        assert_eq!(mapping.last_name, "Apellidos del asistente");
    }

    #[test]
    fn test_locate_exact_then_case_insensitive() {
        let row = headers(&["Attendee #", "ticket type", " Ticket Type "]);
        assert_eq!(ColumnMapping::locate(&row, "Ticket Type"), Some(2));
        assert_eq!(ColumnMapping::locate(&row, "TICKET TYPE"), Some(1));
        assert_eq!(ColumnMapping::locate(&row, "Company"), None);
    }
}
