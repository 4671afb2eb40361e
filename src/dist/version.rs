//! PEP 440 version validation.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

// Public version identifier grammar, anchored, case-insensitive.
static VERSION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?xi)
        ^v?
        (?:[0-9]+!)?
        [0-9]+(?:\.[0-9]+)*
        (?:[-_.]?(?:a|b|c|rc|alpha|beta|pre|preview)[-_.]?[0-9]*)?
        (?:-[0-9]+|[-_.]?(?:post|rev|r)[-_.]?[0-9]*)?
        (?:[-_.]?dev[-_.]?[0-9]*)?
        (?:\+[a-z0-9]+(?:[-_.][a-z0-9]+)*)?
        $",
    )
    .unwrap()
});

/// A version string known to conform to PEP 440.
///
/// The original spelling is kept; no ordering is defined.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(String);

impl Version {
    pub fn parse(raw: &str) -> Option<Self> {
        VERSION_REGEX.is_match(raw).then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_versions() {
        for v in [
            "1.0", "1", "2!1.0", "1.0a1", "1.0.rc2", "1.0-post1", "1.0.post", "1.0-1",
            "1.0.dev0", "1.0+local.7", "v3.2", "1.0b2.post345.dev456",
        ] {
            assert!(Version::parse(v).is_some(), "{v} should be valid");
        }
    }

    #[test]
    fn test_invalid_versions() {
        for v in ["", "one", "1.0-", "1..0", "1.0+", "1.0 ", "1.0/../2", "latest"] {
            assert!(Version::parse(v).is_none(), "{v} should be invalid");
        }
    }
}
