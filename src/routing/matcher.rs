//! Route key matching logic.
//!
//! # Responsibilities
//! - Match request path segments against a route key
//! - Capture placeholder values as path parameters
//! - Classify the request as page, file, or missing trailing slash
//!
//! # Design Decisions
//! - Path matching is case-sensitive and segment-wise
//! - A placeholder captures exactly one non-empty segment; `.` and `..`
//!   are never captured
//! - No regex to guarantee O(n) matching

use crate::routing::template::{Params, Template};

/// What a matched request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// `/{key}/`: the project page.
    Page,
    /// `/{key}/{filename}`: a distribution file.
    File(String),
    /// `/{key}`: the page URL without its trailing slash.
    AddSlash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// Compiled matcher for one route key.
#[derive(Debug, Clone)]
pub struct KeyMatcher {
    segments: Vec<Segment>,
}

impl KeyMatcher {
    /// Compile a validated route key.
    pub fn new(key: &Template) -> Self {
        let segments = key
            .as_str()
            .split('/')
            .map(|raw| match Template::parse(raw) {
                Ok(segment) => match segment.placeholders().next() {
                    Some(name) => Segment::Placeholder(name.to_string()),
                    None => Segment::Literal(segment.literals().collect()),
                },
                Err(_) => Segment::Literal(raw.to_string()),
            })
            .collect();
        Self { segments }
    }

    /// Number of literal segments; more literals means a more specific key.
    pub fn specificity(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    /// Match decoded request segments.
    ///
    /// `trailing_slash` tells whether the request path ended with `/`; the
    /// empty segment after it must already be removed.
    pub fn matches(&self, segments: &[&str], trailing_slash: bool) -> Option<(Params, Target)> {
        let n = self.segments.len();
        if segments.len() == n {
            let params = self.capture(segments)?;
            let target = if trailing_slash {
                Target::Page
            } else {
                Target::AddSlash
            };
            return Some((params, target));
        }
        if segments.len() == n + 1 && !trailing_slash {
            let filename = segments[n];
            if filename.is_empty() {
                return None;
            }
            let params = self.capture(&segments[..n])?;
            return Some((params, Target::File(filename.to_string())));
        }
        None
    }

    fn capture(&self, segments: &[&str]) -> Option<Params> {
        let mut params = Params::new();
        for (expected, actual) in self.segments.iter().zip(segments) {
            match expected {
                Segment::Literal(text) if text == actual => {}
                Segment::Literal(_) => return None,
                Segment::Placeholder(name) => {
                    if actual.is_empty() || *actual == "." || *actual == ".." {
                        return None;
                    }
                    params.insert(name.clone(), actual.to_string());
                }
            }
        }
        Some(params)
    }
}

/// Split a request path into segments and its trailing-slash flag.
pub fn split_path(path: &str) -> (Vec<&str>, bool) {
    let (path, trailing_slash) = match path.strip_suffix('/') {
        Some(stripped) => (stripped, true),
        None => (path, false),
    };
    let path = path.strip_prefix('/').unwrap_or(path);
    if path.is_empty() {
        return (Vec::new(), trailing_slash);
    }
    (path.split('/').collect(), trailing_slash)
}
