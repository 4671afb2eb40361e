//! Project name normalization.
//!
//! # Design Decisions
//! - Names compare by their PEP 503 normalized form only
//! - Validation uses the PEP 508 name grammar (ASCII letters, digits, `-_.`)

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^([a-z0-9]|[a-z0-9][a-z0-9._-]*[a-z0-9])$").unwrap());

static SEPARATOR_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-_.]+").unwrap());

/// A normalized project name (e.g. `My_Package` becomes `my-package`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectName(String);

impl ProjectName {
    /// Parse and normalize a project name.
    ///
    /// Returns `None` when the name is not a valid PEP 508 project name.
    pub fn parse(raw: &str) -> Option<Self> {
        if !NAME_REGEX.is_match(raw) {
            return None;
        }
        Some(Self(normalize(raw)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lower-case the name and collapse runs of `-`, `_` and `.` into a single `-`.
pub fn normalize(raw: &str) -> String {
    SEPARATOR_RUN.replace_all(raw, "-").to_ascii_lowercase()
}
