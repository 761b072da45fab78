//! Match key extraction.
//!
//! Emails are trimmed and lowercased. Phones are trimmed only: no digit
//! canonicalization, so `(555) 123-4567` and `555-123-4567` stay distinct.

use crate::models::{MatchMode, Record};
use crate::validation::ColumnLayout;

/// Normalized keys of one record, each list in header order.
///
/// Duplicates within a record are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchKeys {
    pub emails: Vec<String>,
    pub phones: Vec<String>,
}

impl MatchKeys {
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.phones.is_empty()
    }
}

pub fn normalize_email(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

pub fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn collect_keys(
    record: &Record,
    columns: &[usize],
    normalize: fn(&str) -> Option<String>,
) -> Vec<String> {
    columns
        .iter()
        .filter_map(|&column| record.value(column))
        .filter_map(normalize)
        .collect()
}

/// Keys of the types the mode groups on; the other list stays empty.
pub fn extract_keys(record: &Record, layout: &ColumnLayout, mode: MatchMode) -> MatchKeys {
    let emails = if mode.uses_email() {
        collect_keys(record, &layout.email_columns, normalize_email)
    } else {
        Vec::new()
    };
    let phones = if mode.uses_phone() {
        collect_keys(record, &layout.phone_columns, normalize_phone)
    } else {
        Vec::new()
    };
    MatchKeys { emails, phones }
}
