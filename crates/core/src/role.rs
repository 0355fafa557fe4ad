//! Attendee roles and ticket-type classification.
//!
//! Every attendee is assigned exactly one [`Role`]. The role selects the card
//! template. Classification checks the configured ticket-type sets in a fixed
//! priority order ([`Role::PRIORITY`]) and falls back to [`Role::DEFAULT`], so
//! it is total over all possible ticket-type strings.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Category of attendee, determining the card template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Staff,
    Speaker,
    Attendee,
}

impl Role {
    /// All roles, in display order.
    pub const ALL: [Role; 3] = [Role::Staff, Role::Speaker, Role::Attendee];

    /// Roles whose ticket-type sets are checked, first match wins.
    pub const PRIORITY: [Role; 2] = [Role::Staff, Role::Speaker];

    /// Role assigned when no ticket-type set matches.
    pub const DEFAULT: Role = Role::Attendee;

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::Speaker => "speaker",
            Role::Attendee => "attendee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "staff" => Ok(Role::Staff),
            "speaker" => Ok(Role::Speaker),
            "attendee" => Ok(Role::Attendee),
            other => Err(format!(
                "unknown role '{}' (expected staff, speaker or attendee)",
                other
            )),
        }
    }
}

/// Role -> template document and ticket-type membership sets.
///
/// Immutable once built. Roles without an explicit template use the default
/// role's template.
#[derive(Debug, Clone)]
pub struct RoleMapping {
    default_template: PathBuf,
    templates: BTreeMap<Role, PathBuf>,
    ticket_types: BTreeMap<Role, HashSet<String>>,
}

impl RoleMapping {
    /// Creates a mapping where every role uses `default_template` and no
    /// ticket types are assigned.
    pub fn new(default_template: impl Into<PathBuf>) -> Self {
        Self {
            default_template: default_template.into(),
            templates: BTreeMap::new(),
            ticket_types: BTreeMap::new(),
        }
    }

    /// Sets the template for a role. Setting the default role's template
    /// replaces the fallback for every other role too.
    pub fn with_template(mut self, role: Role, template: impl Into<PathBuf>) -> Self {
        let template = template.into();
        if role == Role::DEFAULT {
            self.default_template = template;
        } else {
            self.templates.insert(role, template);
        }
        self
    }

    /// Adds ticket-type strings that select `role`.
    pub fn with_ticket_types<I, S>(mut self, role: Role, ticket_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = self.ticket_types.entry(role).or_default();
        for ticket_type in ticket_types {
            let ticket_type = ticket_type.into();
            let trimmed = ticket_type.trim();
            if !trimmed.is_empty() {
                set.insert(trimmed.to_string());
            }
        }
        self
    }

    /// Template document for `role`.
    pub fn template(&self, role: Role) -> &Path {
        self.templates
            .get(&role)
            .unwrap_or(&self.default_template)
    }

    /// Whether `role` has its own template rather than the fallback.
    pub fn has_own_template(&self, role: Role) -> bool {
        role == Role::DEFAULT || self.templates.contains_key(&role)
    }

    /// Ticket types assigned to `role`, sorted.
    pub fn ticket_types(&self, role: Role) -> Vec<&str> {
        let mut types: Vec<&str> = self
            .ticket_types
            .get(&role)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default();
        types.sort_unstable();
        types
    }

    fn selects(&self, role: Role, ticket_type: &str) -> bool {
        self.ticket_types
            .get(&role)
            .is_some_and(|set| set.contains(ticket_type))
    }
}

/// Resolves a raw ticket-type value to a role.
///
/// Sets are checked in [`Role::PRIORITY`] order and the first match wins. A
/// value in no set resolves to [`Role::DEFAULT`]. Matching is exact after
/// trimming surrounding whitespace.
pub fn classify(ticket_type: &str, mapping: &RoleMapping) -> Role {
    let ticket_type = ticket_type.trim();
    Role::PRIORITY
        .into_iter()
        .find(|role| mapping.selects(*role, ticket_type))
        .unwrap_or(Role::DEFAULT)
}
