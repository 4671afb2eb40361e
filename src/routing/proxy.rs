//! Routes that forward to an upstream index.
//!
//! # Responsibilities
//! - Substitute parameters into the upstream URL and GET it
//! - Relay upstream status, media type and end-to-end headers
//! - Stream large or unsized bodies instead of buffering them
//!
//! # Design Decisions
//! - Upstream redirects are relayed, not followed
//! - Hop-by-hop headers are stripped
//! - Unreachable upstreams produce 502/504 with a plain-text diagnostic

use std::io;

use axum::http::{header, HeaderMap};
use futures_util::TryStreamExt;
use url::Url;

use crate::http::response::IndexResponse;
use crate::observability::metrics;
use crate::resilience::timeouts;
use crate::routing::template::{Params, Template};

const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub struct ProxyRoute {
    to: Template,
    client: reqwest::Client,
    buffer_limit: u64,
}

impl ProxyRoute {
    /// `buffer_limit` is the largest declared body size relayed buffered.
    pub fn new(to: Template, client: reqwest::Client, buffer_limit: u64) -> Self {
        Self {
            to,
            client,
            buffer_limit,
        }
    }

    pub fn to(&self) -> &Template {
        &self.to
    }

    pub async fn resolve_page(&self, params: &Params) -> IndexResponse {
        match self.to.render(params) {
            Ok(url) => self.forward(&url).await,
            Err(_) => IndexResponse::not_found(),
        }
    }

    pub async fn resolve_file(&self, params: &Params, filename: &str) -> IndexResponse {
        if !is_url_segment(filename) {
            return IndexResponse::not_found();
        }
        match self.to.render(params) {
            Ok(base) => self.forward(&join_url(&base, filename)).await,
            Err(_) => IndexResponse::not_found(),
        }
    }

    async fn forward(&self, target: &str) -> IndexResponse {
        let url = match Url::parse(target) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ => {
                tracing::error!(target = %target, "Route produced an invalid upstream URL");
                return IndexResponse::bad_gateway(format!("invalid upstream url: {target}"));
            }
        };

        tracing::debug!(url = %url, "Forwarding to upstream");
        match self.client.get(url.clone()).send().await {
            Ok(upstream) => relay(upstream, self.buffer_limit).await,
            Err(e) => timeouts::upstream_failure(&url, &e),
        }
    }
}

/// Convert an upstream answer into a route response.
async fn relay(upstream: reqwest::Response, buffer_limit: u64) -> IndexResponse {
    let status = upstream.status();
    let media_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_MEDIA_TYPE)
        .to_string();
    let headers = end_to_end_headers(upstream.headers());

    let response = match upstream.content_length() {
        Some(len) if len <= buffer_limit => match upstream.bytes().await {
            Ok(content) => IndexResponse::buffered(content, media_type),
            Err(e) => {
                metrics::record_upstream_failure("body");
                tracing::error!(error = %e, "Upstream body read failed");
                return IndexResponse::bad_gateway(format!("upstream body read failed: {e}"));
            }
        },
        _ => {
            let stream = upstream.bytes_stream().map_err(io::Error::other);
            IndexResponse::streamed(Box::pin(stream), media_type)
        }
    };
    response.with_status(status).with_headers(headers)
}

fn end_to_end_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = upstream.clone();
    // Connection may name further hop-by-hop headers
    let named: Vec<String> = upstream
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .collect();
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
    for name in &named {
        headers.remove(name.as_str());
    }
    headers.remove(header::CONTENT_TYPE);
    headers
}

fn is_url_segment(filename: &str) -> bool {
    !filename.is_empty()
        && filename != "."
        && filename != ".."
        && !filename.contains(['/', '\\', '?', '#'])
}

fn join_url(base: &str, filename: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{filename}")
    } else {
        format!("{base}/{filename}")
    }
}
