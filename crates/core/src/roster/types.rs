//! Types for the roster module.

use serde::{Deserialize, Serialize};

/// One attendee row, normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeRecord {
    /// Sheet row number (1-based, header is row 1).
    pub row: usize,
    /// Scannable identifier. Never empty.
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Raw ticket-type value from the source.
    pub ticket_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl AttendeeRecord {
    /// Creates a record with no ticket type or company.
    pub fn new(
        row: usize,
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            row,
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            ticket_type: String::new(),
            company: None,
        }
    }

    /// Sets the ticket type.
    pub fn with_ticket_type(mut self, ticket_type: impl Into<String>) -> Self {
        self.ticket_type = ticket_type.into();
        self
    }

    /// Sets the company.
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// First and last name joined for log output.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
