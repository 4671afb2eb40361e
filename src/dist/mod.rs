//! Distribution filename classification.
//!
//! # Data Flow
//! ```text
//! filesystem entry name
//!     → wheel grammar   ({name}-{version}(-{build})?-{py}-{abi}-{plat}.whl)
//!     → sdist grammar   ({name}-{version}.tar.gz | .zip)
//!     → Distribution { project, version, kind } or None
//! ```
//!
//! # Design Decisions
//! - Classification is total: malformed input yields `None`, never an error
//! - Names are normalized (PEP 503) so files of one project compare equal
//! - Only ASCII names are accepted, which also keeps file names safe to
//!   embed in generated HTML without escaping

pub mod name;
pub mod version;

pub use name::ProjectName;
pub use version::Version;

/// Kind of distribution artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DistKind {
    /// Source archive (`.tar.gz` or `.zip`).
    Sdist,
    /// Built distribution (`.whl`).
    Wheel,
}

/// Identity parsed from a distribution filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    pub project: ProjectName,
    pub version: Version,
    pub kind: DistKind,
}

const SDIST_SUFFIXES: [&str; 2] = [".tar.gz", ".zip"];

/// Classify a filename as a wheel or source distribution.
pub fn classify(filename: &str) -> Option<Distribution> {
    parse_wheel_filename(filename).or_else(|| parse_sdist_filename(filename))
}

/// Returns true if the filename names a distribution artifact.
pub fn is_distribution(filename: &str) -> bool {
    classify(filename).is_some()
}

/// Parse a wheel filename.
pub fn parse_wheel_filename(filename: &str) -> Option<Distribution> {
    let stem = filename.strip_suffix(".whl")?;
    let parts: Vec<&str> = stem.split('-').collect();
    if parts.len() != 5 && parts.len() != 6 {
        return None;
    }

    let raw_name = parts[0];
    if raw_name.contains("__")
        || !raw_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        return None;
    }
    let project = ProjectName::parse(raw_name)?;
    let version = Version::parse(parts[1])?;

    if parts.len() == 6 {
        let build = parts[2];
        if !build.starts_with(|c: char| c.is_ascii_digit()) || !is_tag(build) {
            return None;
        }
    }
    // python, abi and platform tags
    if !parts[parts.len() - 3..].iter().all(|tag| is_tag(tag)) {
        return None;
    }

    Some(Distribution {
        project,
        version,
        kind: DistKind::Wheel,
    })
}

/// Parse a source distribution filename.
///
/// The stem is split at its last dash; everything before is the name.
pub fn parse_sdist_filename(filename: &str) -> Option<Distribution> {
    let stem = SDIST_SUFFIXES
        .iter()
        .find_map(|suffix| filename.strip_suffix(suffix))?;
    let (raw_name, raw_version) = stem.rsplit_once('-')?;

    Some(Distribution {
        project: ProjectName::parse(raw_name)?,
        version: Version::parse(raw_version)?,
        kind: DistKind::Sdist,
    })
}

fn is_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}
