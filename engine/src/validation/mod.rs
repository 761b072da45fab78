//! Header validation for the selected matching mode.
//!
//! Recognized column names are case-sensitive:
//!
//! - `FirstName`, `LastName` - required in every mode
//! - `Email`, `Email1`, `Email10`, ... - email keys
//! - `Phone`, `Phone1`, `Phone10`, ... - phone keys
//!
//! Validation is a pure check on the header row. It runs before any data
//! row is read, so a header-only file is valid.
//!
//! # Example
//!
//! ```rust,ignore
//! use persongroup::{validate_headers, MatchMode};
//!
//! let headers = ["FirstName", "LastName", "Email", "Email2"].map(String::from);
//! let layout = validate_headers(&headers, MatchMode::SameEmail)?;
//! assert_eq!(layout.email_columns, vec![2, 3]);
//! ```

use serde::Serialize;

use crate::error::{SchemaError, SchemaResult};
use crate::models::MatchMode;

pub const FIRST_NAME: &str = "FirstName";
pub const LAST_NAME: &str = "LastName";
pub const EMAIL_PREFIX: &str = "Email";
pub const PHONE_PREFIX: &str = "Phone";

/// Role a header column plays in grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    FirstName,
    LastName,
    Email,
    Phone,
    Other,
}

/// Positions of key columns, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnLayout {
    pub email_columns: Vec<usize>,
    pub phone_columns: Vec<usize>,
}

/// `prefix` alone, or `prefix` followed only by ASCII digits.
pub fn is_numbered_field(name: &str, prefix: &str) -> bool {
    match name.strip_prefix(prefix) {
        Some(suffix) => suffix.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

pub fn is_email_field(name: &str) -> bool {
    is_numbered_field(name, EMAIL_PREFIX)
}

pub fn is_phone_field(name: &str) -> bool {
    is_numbered_field(name, PHONE_PREFIX)
}

pub fn classify_column(name: &str) -> ColumnRole {
    if name == FIRST_NAME {
        ColumnRole::FirstName
    } else if name == LAST_NAME {
        ColumnRole::LastName
    } else if is_email_field(name) {
        ColumnRole::Email
    } else if is_phone_field(name) {
        ColumnRole::Phone
    } else {
        ColumnRole::Other
    }
}

/// Locate email and phone columns without checking requirements.
pub fn column_layout(headers: &[String]) -> ColumnLayout {
    let mut layout = ColumnLayout::default();
    for (i, name) in headers.iter().enumerate() {
        match classify_column(name) {
            ColumnRole::Email => layout.email_columns.push(i),
            ColumnRole::Phone => layout.phone_columns.push(i),
            _ => {}
        }
    }
    layout
}

/// Check the header row against the mode and return the key column layout.
///
/// Name columns are checked first; missing ones are reported together,
/// FirstName before LastName.
pub fn validate_headers(headers: &[String], mode: MatchMode) -> SchemaResult<ColumnLayout> {
    let missing: Vec<&'static str> = [FIRST_NAME, LAST_NAME]
        .into_iter()
        .filter(|required| !headers.iter().any(|h| h == required))
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingRequired(missing));
    }

    let layout = column_layout(headers);
    let has_email = !layout.email_columns.is_empty();
    let has_phone = !layout.phone_columns.is_empty();

    match mode {
        MatchMode::SameEmail if !has_email => Err(SchemaError::NoEmailField),
        MatchMode::SamePhone if !has_phone => Err(SchemaError::NoPhoneField),
        MatchMode::SameEmailOrPhone if !has_email && !has_phone => {
            Err(SchemaError::NoEmailOrPhoneField)
        }
        _ => Ok(layout),
    }
}

/// Modes the header row can be grouped with.
pub fn supported_modes(headers: &[String]) -> Vec<MatchMode> {
    MatchMode::ALL
        .into_iter()
        .filter(|&mode| validate_headers(headers, mode).is_ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_numbered_field_predicate() {
        assert!(is_email_field("Email"));
        assert!(is_email_field("Email1"));
        assert!(is_email_field("Email10"));
        assert!(!is_email_field("email"));
        assert!(!is_email_field("Email_1"));
        assert!(!is_email_field("EmailAddress"));
        assert!(!is_email_field("WorkEmail"));
        assert!(is_phone_field("Phone3"));
        assert!(!is_phone_field("Phone 3"));
    }

    #[test]
    fn test_classify_column() {
        assert_eq!(classify_column("FirstName"), ColumnRole::FirstName);
        assert_eq!(classify_column("LastName"), ColumnRole::LastName);
        assert_eq!(classify_column("Email2"), ColumnRole::Email);
        assert_eq!(classify_column("Phone"), ColumnRole::Phone);
        assert_eq!(classify_column("Firstname"), ColumnRole::Other);
    }

    #[test]
    fn test_layout_in_header_order() {
        let h = headers(&["Phone5", "FirstName", "Email1", "LastName", "Email", "Phone3"]);
        let layout = validate_headers(&h, MatchMode::SameEmailOrPhone).unwrap();
        assert_eq!(layout.email_columns, vec![2, 4]);
        assert_eq!(layout.phone_columns, vec![0, 5]);
    }

    #[test]
    fn test_missing_both_names() {
        let h = headers(&["Email", "Phone"]);
        let err = validate_headers(&h, MatchMode::SameEmail).unwrap_err();
        assert_eq!(err, SchemaError::MissingRequired(vec!["FirstName", "LastName"]));
        assert_eq!(err.to_string(), "Required fields missing: FirstName, LastName");
    }

    #[test]
    fn test_missing_last_name_only() {
        let h = headers(&["FirstName", "Email"]);
        let err = validate_headers(&h, MatchMode::SameEmail).unwrap_err();
        assert_eq!(err.to_string(), "Required fields missing: LastName");
    }

    #[test]
    fn test_mode_specific_fields() {
        let email_only = headers(&["FirstName", "LastName", "Email"]);
        let phone_only = headers(&["FirstName", "LastName", "Phone"]);
        let neither = headers(&["FirstName", "LastName", "Zip"]);

        assert!(validate_headers(&email_only, MatchMode::SameEmail).is_ok());
        assert_eq!(
            validate_headers(&email_only, MatchMode::SamePhone),
            Err(SchemaError::NoPhoneField)
        );
        assert_eq!(
            validate_headers(&phone_only, MatchMode::SameEmail),
            Err(SchemaError::NoEmailField)
        );
        assert!(validate_headers(&phone_only, MatchMode::SameEmailOrPhone).is_ok());
        assert!(validate_headers(&email_only, MatchMode::SameEmailOrPhone).is_ok());
        assert_eq!(
            validate_headers(&neither, MatchMode::SameEmailOrPhone),
            Err(SchemaError::NoEmailOrPhoneField)
        );
    }

    #[test]
    fn test_supported_modes() {
        let h = headers(&["FirstName", "LastName", "Phone1"]);
        assert_eq!(
            supported_modes(&h),
            vec![MatchMode::SamePhone, MatchMode::SameEmailOrPhone]
        );
        assert!(supported_modes(&headers(&["Email"])).is_empty());
    }
}
