//! Assign a group id to each record by shared match keys.
//!
//! Records are processed one at a time in file order. Each key type has its
//! own index mapping a normalized key to the group it was last registered
//! under.
//!
//! # Algorithm
//!
//! ```text
//! for each record:
//!     id = first email key found in the email index
//!       or first phone key found in the phone index
//!       or a fresh id (next_id, then increment)
//!     register every email key and every phone key of the record under id
//! ```
//!
//! The first hit is final. Keys are never re-pointed afterwards except by a
//! later record registering them again, and groups are never merged: this is
//! a direct key-to-group map, not a union-find with path compression. Id
//! numbering therefore depends only on file order.

use std::collections::HashMap;

use crate::error::{CsvError, PipelineResult};
use crate::models::{GroupId, MatchMode, Record};
use crate::validation::validate_headers;

use super::normalize::{extract_keys, MatchKeys};

/// Map from normalized key to group id for one key type.
#[derive(Debug, Default, Clone)]
pub struct KeyIndex {
    groups: HashMap<String, GroupId>,
}

impl KeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<GroupId> {
        self.groups.get(key).copied()
    }

    /// Group of the first key already present, scanning in order.
    pub fn first_match(&self, keys: &[String]) -> Option<GroupId> {
        keys.iter().find_map(|key| self.get(key))
    }

    /// Point every key at `id`, overwriting earlier registrations.
    pub fn register(&mut self, keys: &[String], id: GroupId) {
        for key in keys {
            self.groups.insert(key.clone(), id);
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Stateful grouper owning both key indices and the id counter.
#[derive(Debug, Clone)]
pub struct Grouper {
    mode: MatchMode,
    emails: KeyIndex,
    phones: KeyIndex,
    next_id: GroupId,
}

impl Grouper {
    pub fn new(mode: MatchMode) -> Self {
        Self {
            mode,
            emails: KeyIndex::new(),
            phones: KeyIndex::new(),
            next_id: 1,
        }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Resolve the group of the next record and register its keys.
    ///
    /// Key types the mode does not use are ignored.
    pub fn assign(&mut self, keys: &MatchKeys) -> GroupId {
        let emails: &[String] = if self.mode.uses_email() { &keys.emails } else { &[] };
        let phones: &[String] = if self.mode.uses_phone() { &keys.phones } else { &[] };

        let matched = self
            .emails
            .first_match(emails)
            .or_else(|| self.phones.first_match(phones));

        let id = match matched {
            Some(id) => id,
            None => {
                let id = self.next_id;
                self.next_id += 1;
                id
            }
        };

        self.emails.register(emails, id);
        self.phones.register(phones, id);
        id
    }

    /// Number of group ids handed out so far.
    pub fn group_count(&self) -> u64 {
        self.next_id - 1
    }

    pub fn email_index(&self) -> &KeyIndex {
        &self.emails
    }

    pub fn phone_index(&self) -> &KeyIndex {
        &self.phones
    }
}

/// Group in-memory rows: header validation, row-shape check, then one id
/// per row in input order.
///
/// Row line numbers assume one physical line per row, starting after the
/// header.
pub fn group_rows(
    headers: &[String],
    rows: &[Vec<String>],
    mode: MatchMode,
) -> PipelineResult<Vec<GroupId>> {
    let layout = validate_headers(headers, mode)?;
    let mut grouper = Grouper::new(mode);
    let mut ids = Vec::with_capacity(rows.len());

    for (i, values) in rows.iter().enumerate() {
        let line = i as u64 + 2;
        if values.len() != headers.len() {
            return Err(CsvError::RowShape {
                line,
                actual: values.len(),
                expected: headers.len(),
            }
            .into());
        }
        let record = Record::new(line, values.clone());
        ids.push(grouper.assign(&extract_keys(&record, &layout, mode)));
    }

    Ok(ids)
}
