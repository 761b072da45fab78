//! Domain models for the person grouping pipeline.
//!
//! - [`MatchMode`] - Which keys participate in grouping
//! - [`HeaderSet`] - Ordered column names from the first row
//! - [`Record`] - One data row with its resolved group
//! - [`GroupId`] - Person identifier shared by a group

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Group identifier, assigned from 1 in file order.
pub type GroupId = u64;

// =============================================================================
// Matching Mode
// =============================================================================

/// Selects which normalized keys link records together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Records sharing an email address.
    #[default]
    SameEmail,
    /// Records sharing a phone number.
    SamePhone,
    /// Records sharing an email address or a phone number.
    SameEmailOrPhone,
}

impl MatchMode {
    pub const ALL: [MatchMode; 3] = [
        MatchMode::SameEmail,
        MatchMode::SamePhone,
        MatchMode::SameEmailOrPhone,
    ];

    /// Literal accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SameEmail => "same_email",
            Self::SamePhone => "same_phone",
            Self::SameEmailOrPhone => "same_email_or_phone",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::SameEmail => "group records that share an email address (case-insensitive)",
            Self::SamePhone => "group records that share a phone number (trimmed, verbatim)",
            Self::SameEmailOrPhone => {
                "group records that share an email address or a phone number, transitively"
            }
        }
    }

    pub fn uses_email(&self) -> bool {
        matches!(self, Self::SameEmail | Self::SameEmailOrPhone)
    }

    pub fn uses_phone(&self) -> bool {
        matches!(self, Self::SamePhone | Self::SameEmailOrPhone)
    }
}

impl FromStr for MatchMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MatchMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownMode(s.to_string()))
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Header Set
// =============================================================================

/// Ordered column names; every data row must have the same length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HeaderSet {
    names: Vec<String>,
}

impl HeaderSet {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Column names at the given positions, in order.
    pub fn select(&self, columns: &[usize]) -> Vec<String> {
        columns
            .iter()
            .filter_map(|&i| self.names.get(i).cloned())
            .collect()
    }
}

// =============================================================================
// Record
// =============================================================================

/// One data row. Values are kept verbatim for output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based physical line where the row starts.
    pub line: u64,
    pub values: Vec<String>,
    pub group_id: Option<GroupId>,
}

impl Record {
    pub fn new(line: u64, values: Vec<String>) -> Self {
        Self {
            line,
            values,
            group_id: None,
        }
    }

    /// Raw value at a column position, if present.
    pub fn value(&self, column: usize) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_roundtrip_literals() {
        for mode in MatchMode::ALL {
            assert_eq!(mode.as_str().parse::<MatchMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let err = "same_name".parse::<MatchMode>().unwrap_err();
        assert!(err.to_string().contains("same_name"));
        // literals are case-sensitive
        assert!("SAME_EMAIL".parse::<MatchMode>().is_err());
    }

    #[test]
    fn test_mode_key_types() {
        assert!(MatchMode::SameEmail.uses_email());
        assert!(!MatchMode::SameEmail.uses_phone());
        assert!(MatchMode::SamePhone.uses_phone());
        assert!(MatchMode::SameEmailOrPhone.uses_email());
        assert!(MatchMode::SameEmailOrPhone.uses_phone());
    }

    #[test]
    fn test_mode_serde_literal() {
        let json = serde_json::to_string(&MatchMode::SameEmailOrPhone).unwrap();
        assert_eq!(json, "\"same_email_or_phone\"");
    }

    #[test]
    fn test_header_select() {
        let headers = HeaderSet::new(vec!["FirstName".into(), "Email".into(), "Phone".into()]);
        assert_eq!(headers.select(&[2, 1]), vec!["Phone", "Email"]);
        assert_eq!(headers.len(), 3);
    }
}
