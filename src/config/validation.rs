//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check route keys and `to` templates parse and agree on placeholders
//! - Validate value ranges (timeouts > 0, port non-zero)
//! - Detect colliding route keys
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: IndexConfig → Result<(), Vec<ValidationError>>
//! - Runs before any route is constructed

use std::collections::HashMap;
use std::path::{Component, Path};

use thiserror::Error;

use crate::config::schema::{IndexConfig, RouteConfig, RouteSource};
use crate::routing::template::{Template, TemplateError};

/// Placeholder names starting with this prefix are reserved for the server.
pub const RESERVED_PREFIX: &str = "__";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route key {key:?}: {source}")]
    InvalidKey { key: String, source: TemplateError },

    #[error("route key {key:?}: {reason}")]
    MalformedKey { key: String, reason: String },

    #[error("route {key:?}: invalid 'to' template: {source}")]
    InvalidTarget { key: String, source: TemplateError },

    #[error("route {key:?}: placeholder {name:?} in 'to' is not captured by the route key")]
    UncapturedPlaceholder { key: String, name: String },

    #[error(
        "route {key:?}: path target {to:?} must be relative and stay inside the config directory"
    )]
    EscapingPath { key: String, to: String },

    #[error("route {key:?}: {to:?} is not an http(s) URL template")]
    InvalidUrl { key: String, to: String },

    #[error("route keys {first:?} and {second:?} match the same requests")]
    KeyCollision { first: String, second: String },

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &IndexConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.port == 0 {
        errors.push(ValidationError::NotPositive { field: "server.port" });
    }
    for (field, value) in [
        ("server.request_timeout_secs", config.server.request_timeout_secs),
        ("upstream.connect_timeout_secs", config.upstream.connect_timeout_secs),
        ("upstream.read_timeout_secs", config.upstream.read_timeout_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::NotPositive { field });
        }
    }

    let mut shapes: HashMap<String, &str> = HashMap::new();
    for (key, route) in &config.routes {
        let Some(key_template) = validate_key(key, &mut errors) else {
            continue;
        };
        if let Some(first) = shapes.insert(key_template.shape(), key) {
            errors.push(ValidationError::KeyCollision {
                first: first.to_string(),
                second: key.clone(),
            });
        }
        validate_target(key, &key_template, route, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parse and check a route key.
pub fn validate_key(key: &str, errors: &mut Vec<ValidationError>) -> Option<Template> {
    let malformed = |reason: &str| ValidationError::MalformedKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if key.is_empty() {
        errors.push(malformed("must not be empty"));
        return None;
    }
    if key.starts_with('/') || key.ends_with('/') {
        errors.push(malformed("must not start or end with '/'"));
        return None;
    }
    if key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..") {
        errors.push(malformed("contains an empty, '.' or '..' segment"));
        return None;
    }

    let template = match Template::parse(key) {
        Ok(template) => template,
        Err(source) => {
            errors.push(ValidationError::InvalidKey {
                key: key.to_string(),
                source,
            });
            return None;
        }
    };

    let mut ok = true;
    if !template.placeholders_span_segments() {
        errors.push(malformed("placeholders must span whole path segments"));
        ok = false;
    }
    let mut seen = Vec::new();
    for name in template.placeholders() {
        if name.starts_with(RESERVED_PREFIX) {
            errors.push(malformed(&format!("placeholder {name:?} uses a reserved name")));
            ok = false;
        }
        if seen.contains(&name) {
            errors.push(malformed(&format!("placeholder {name:?} appears twice")));
            ok = false;
        }
        seen.push(name);
    }
    for (name, convertor) in template.convertors() {
        if convertor != "str" {
            errors.push(malformed(&format!(
                "placeholder {name:?} uses unsupported convertor {convertor:?}"
            )));
            ok = false;
        }
    }
    if template.literals().any(|text| text.contains(['{', '}'])) {
        errors.push(malformed("literal text must not contain escaped braces"));
        ok = false;
    }

    ok.then_some(template)
}

fn validate_target(
    key: &str,
    key_template: &Template,
    route: &RouteConfig,
    errors: &mut Vec<ValidationError>,
) {
    let to = match Template::parse(&route.to) {
        Ok(to) => to,
        Err(source) => {
            errors.push(ValidationError::InvalidTarget {
                key: key.to_string(),
                source,
            });
            return;
        }
    };

    for name in to.placeholders() {
        if !key_template.placeholders().any(|captured| captured == name) {
            errors.push(ValidationError::UncapturedPlaceholder {
                key: key.to_string(),
                name: name.to_string(),
            });
        }
    }

    match route.source {
        RouteSource::Path => {
            let escapes = route.to.is_empty()
                || to.literals().any(|text| {
                    Path::new(text).components().any(|c| {
                        matches!(
                            c,
                            Component::ParentDir | Component::RootDir | Component::Prefix(_)
                        )
                    })
                });
            if escapes {
                errors.push(ValidationError::EscapingPath {
                    key: key.to_string(),
                    to: route.to.clone(),
                });
            }
        }
        RouteSource::Http | RouteSource::Proxy => {
            let lower = route.to.to_ascii_lowercase();
            if !(lower.starts_with("http://") || lower.starts_with("https://")) {
                errors.push(ValidationError::InvalidUrl {
                    key: key.to_string(),
                    to: route.to.clone(),
                });
            }
        }
    }
}
