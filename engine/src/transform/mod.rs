//! Grouping module.
//!
//! This module turns validated rows into person ids:
//! - Normalize: Match key extraction (emails, phones)
//! - Grouper: Key indices and group id assignment
//! - Pipeline: Read, group, and publish output

pub mod grouper;
pub mod normalize;
pub mod pipeline;

pub use grouper::{group_rows, Grouper, KeyIndex};
pub use normalize::{extract_keys, normalize_email, normalize_phone, MatchKeys};
pub use pipeline::*;
