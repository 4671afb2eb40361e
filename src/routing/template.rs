//! Placeholder templates for route keys and `to` targets.
//!
//! # Responsibilities
//! - Parse `{name}` / `{name:convertor}` placeholders (`{{` and `}}` escape braces)
//! - Substitute path parameters into a `to` target
//! - Describe route keys for matching and collision checks
//!
//! # Design Decisions
//! - Templates are parsed once at startup; rendering never mutates them
//! - Substituted values are not sanitized here; callers validate the result

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Path parameters captured for one request.
pub type Params = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unclosed '{{' in template {0:?}")]
    Unclosed(String),
    #[error("unmatched '}}' in template {0:?}")]
    Unmatched(String),
    #[error("invalid placeholder name {0:?}")]
    InvalidName(String),
    #[error("missing value for placeholder {0:?}")]
    MissingParam(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Placeholder {
        name: String,
        convertor: Option<String>,
    },
}

/// A parsed template string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    parts: Vec<Part>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(TemplateError::Unmatched(source.to_string())),
                '{' => {
                    let mut inner = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') | None => {
                                return Err(TemplateError::Unclosed(source.to_string()))
                            }
                            Some(c) => inner.push(c),
                        }
                    }
                    let (name, convertor) = match inner.split_once(':') {
                        Some((name, conv)) => (name, Some(conv.to_string())),
                        None => (inner.as_str(), None),
                    };
                    if !is_identifier(name) {
                        return Err(TemplateError::InvalidName(inner.clone()));
                    }
                    if !literal.is_empty() {
                        parts.push(Part::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(Part::Placeholder {
                        name: name.to_string(),
                        convertor,
                    });
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            parts,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholder names in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            Part::Placeholder { name, .. } => Some(name.as_str()),
            Part::Literal(_) => None,
        })
    }

    /// Convertor suffixes (`{name:conv}`), paired with their placeholder.
    pub fn convertors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parts.iter().filter_map(|part| match part {
            Part::Placeholder {
                name,
                convertor: Some(conv),
            } => Some((name.as_str(), conv.as_str())),
            _ => None,
        })
    }

    /// Literal text with placeholders removed (escapes already resolved).
    pub fn literals(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            Part::Literal(text) => Some(text.as_str()),
            Part::Placeholder { .. } => None,
        })
    }

    /// Substitute parameters into the template.
    pub fn render(&self, params: &Params) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.source.len());
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Placeholder { name, .. } => {
                    let value = params
                        .get(name)
                        .ok_or_else(|| TemplateError::MissingParam(name.clone()))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }

    /// True when every placeholder spans a whole `/`-separated segment.
    pub fn placeholders_span_segments(&self) -> bool {
        self.parts.iter().enumerate().all(|(i, part)| {
            if !matches!(part, Part::Placeholder { .. }) {
                return true;
            }
            let before_ok = match i.checked_sub(1).map(|j| &self.parts[j]) {
                None => true,
                Some(Part::Literal(text)) => text.ends_with('/'),
                Some(Part::Placeholder { .. }) => false,
            };
            let after_ok = match self.parts.get(i + 1) {
                None => true,
                Some(Part::Literal(text)) => text.starts_with('/'),
                Some(Part::Placeholder { .. }) => false,
            };
            before_ok && after_ok
        })
    }

    /// The pattern with all placeholder names erased; two keys with the same
    /// shape match the same requests.
    pub fn shape(&self) -> String {
        self.parts
            .iter()
            .map(|part| match part {
                Part::Literal(text) => text.as_str(),
                Part::Placeholder { .. } => "{}",
            })
            .collect()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
