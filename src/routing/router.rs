//! Route table and request dispatch.
//!
//! # Responsibilities
//! - Build one `Route` per configured key at startup
//! - Dispatch page and file requests by route key
//! - Record per-request logs and metrics
//!
//! # Design Decisions
//! - Immutable after construction (shared across tasks without locks)
//! - One outbound client shared by every proxy route
//! - Unknown keys are a startup concern; at request time they are a plain 404

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use thiserror::Error;

use crate::config::{IndexConfig, RouteSource};
use crate::http::response::IndexResponse;
use crate::observability::metrics;
use crate::resilience::timeouts;
use crate::routing::matcher::{split_path, KeyMatcher, Target};
use crate::routing::path::PathRoute;
use crate::routing::proxy::ProxyRoute;
use crate::routing::redirect::RedirectRoute;
use crate::routing::route::Route;
use crate::routing::template::{Params, Template, TemplateError};

#[derive(Debug, Error)]
pub enum RouteTableError {
    #[error("route {key:?}: {source}")]
    Template { key: String, source: TemplateError },

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// A route and its compiled key.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub matcher: KeyMatcher,
    pub route: Route,
}

/// Result of matching a request path against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub key: &'a str,
    pub params: Params,
    pub target: Target,
}

/// Route key to backend mapping, read-only after startup.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: BTreeMap<String, RouteEntry>,
}

impl RouteTable {
    /// Build the table from a validated configuration.
    ///
    /// `root` is the directory path routes resolve against.
    pub fn from_config(config: &IndexConfig, root: &Path) -> Result<Self, RouteTableError> {
        let mut client: Option<reqwest::Client> = None;

        let mut entries = BTreeMap::new();
        for (key, route_config) in &config.routes {
            let template_error = |source| RouteTableError::Template {
                key: key.clone(),
                source,
            };
            let key_template = Template::parse(key).map_err(template_error)?;
            let to = Template::parse(&route_config.to).map_err(template_error)?;

            let route = match route_config.source {
                RouteSource::Path => Route::Path(PathRoute::new(root, to)),
                RouteSource::Http => Route::Redirect(RedirectRoute::new(to)),
                RouteSource::Proxy => {
                    let shared = match client.clone() {
                        Some(shared) => shared,
                        None => {
                            let built = timeouts::build_client(&config.upstream)?;
                            client = Some(built.clone());
                            built
                        }
                    };
                    Route::Proxy(ProxyRoute::new(
                        to,
                        shared,
                        config.upstream.buffer_limit_bytes,
                    ))
                }
            };

            tracing::info!(
                key = %key,
                kind = route.kind(),
                to = %route_config.to,
                "Route registered"
            );
            entries.insert(
                key.clone(),
                RouteEntry {
                    matcher: KeyMatcher::new(&key_template),
                    route,
                },
            );
        }

        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&RouteEntry> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the route serving `path`.
    ///
    /// Keys with more literal segments win; on a tie a page or file match
    /// beats a missing-slash match, then the lowest key wins.
    pub fn match_path(&self, path: &str) -> Option<RouteMatch<'_>> {
        let (segments, trailing_slash) = split_path(path);
        let mut best: Option<((usize, bool), RouteMatch<'_>)> = None;

        for (key, entry) in &self.entries {
            let Some((params, target)) = entry.matcher.matches(&segments, trailing_slash) else {
                continue;
            };
            let rank = (entry.matcher.specificity(), target != Target::AddSlash);
            if best.as_ref().is_some_and(|(best_rank, _)| *best_rank >= rank) {
                continue;
            }
            best = Some((
                rank,
                RouteMatch {
                    key: key.as_str(),
                    params,
                    target,
                },
            ));
        }
        best.map(|(_, found)| found)
    }

    /// Resolve the project page for `key`.
    pub async fn resolve_page(&self, key: &str, params: &Params) -> IndexResponse {
        let start = Instant::now();
        let Some(entry) = self.entries.get(key) else {
            tracing::warn!(key = %key, "No route for key");
            return IndexResponse::not_found();
        };

        let response = entry.route.resolve_page(params).await;
        tracing::debug!(
            key = %key,
            kind = entry.route.kind(),
            status = response.status.as_u16(),
            streamed = response.is_streamed(),
            "Resolved page"
        );
        metrics::record_request(key, "page", response.status.as_u16(), start);
        response
    }

    /// Resolve `filename` for `key`.
    pub async fn resolve_file(&self, key: &str, params: &Params, filename: &str) -> IndexResponse {
        let start = Instant::now();
        let Some(entry) = self.entries.get(key) else {
            tracing::warn!(key = %key, "No route for key");
            return IndexResponse::not_found();
        };

        let response = entry.route.resolve_file(params, filename).await;
        tracing::debug!(
            key = %key,
            kind = entry.route.kind(),
            filename = %filename,
            status = response.status.as_u16(),
            streamed = response.is_streamed(),
            "Resolved file"
        );
        metrics::record_request(key, "file", response.status.as_u16(), start);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use axum::http::{header, StatusCode};
    use tempfile::TempDir;

    const CONFIG: &str = r#"
[routes."{project}"]
source = "path"
to = "{project}"

[routes."upstream/{project}"]
source = "http"
to = "https://example.org/simple/{project}/"

[routes.mirror]
source = "proxy"
to = "http://127.0.0.1:9/simple/"
"#;

    #[tokio::test]
    async fn test_dispatch_by_key() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("pkg");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("pkg-1.0.tar.gz"), b"sdist").unwrap();

        let config = parse_config(CONFIG).unwrap();
        let table = RouteTable::from_config(&config, tmp.path()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("mirror").unwrap().route.kind(), "proxy");

        let params = Params::from([("project".to_string(), "pkg".to_string())]);
        let response = table.resolve_page("{project}", &params).await;
        assert_eq!(response.status, StatusCode::OK);

        let response = table.resolve_file("{project}", &params, "pkg-1.0.tar.gz").await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.content().unwrap().as_ref(), b"sdist");

        let response = table.resolve_page("upstream/{project}", &params).await;
        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.headers[header::LOCATION], "https://example.org/simple/pkg/");

        let response = table.resolve_page("unknown", &params).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_match_prefers_literal_segments() {
        let tmp = TempDir::new().unwrap();
        let config = parse_config(CONFIG).unwrap();
        let table = RouteTable::from_config(&config, tmp.path()).unwrap();

        let found = table.match_path("/mirror/").unwrap();
        assert_eq!(found.key, "mirror");
        assert_eq!(found.target, Target::Page);

        let found = table.match_path("/pkg/pkg-1.0.tar.gz").unwrap();
        assert_eq!(found.key, "{project}");
        assert_eq!(found.params["project"], "pkg");
        assert_eq!(found.target, Target::File("pkg-1.0.tar.gz".into()));

        let found = table.match_path("/upstream/foo").unwrap();
        assert_eq!(found.key, "upstream/{project}");
        assert_eq!(found.target, Target::AddSlash);

        let found = table.match_path("/upstream/").unwrap();
        assert_eq!(found.key, "{project}");
        assert_eq!(found.params["project"], "upstream");

        assert!(table.match_path("/").is_none());
        assert!(table.match_path("/a/b/c/d").is_none());
    }
}
