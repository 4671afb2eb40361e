//! Timeout enforcement for upstream calls.
//!
//! # Responsibilities
//! - Build the shared outbound client with connect and read deadlines
//! - Map outbound failures to gateway responses
//!
//! # Design Decisions
//! - Timed-out requests return 504 Gateway Timeout
//! - Any other transport failure returns 502 Bad Gateway
//! - No retries; clients decide whether to try again

use std::time::Duration;

use url::Url;

use crate::config::UpstreamConfig;
use crate::http::response::IndexResponse;
use crate::observability::metrics;

/// Build the outbound client shared by all proxy routes.
///
/// Redirects are not followed so that upstream redirects reach the client.
pub fn build_client(config: &UpstreamConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .read_timeout(Duration::from_secs(config.read_timeout_secs))
        .redirect(reqwest::redirect::Policy::none())
        .user_agent(config.user_agent.clone())
        .build()
}

/// Response for an upstream request that produced no HTTP answer.
pub fn upstream_failure(url: &Url, error: &reqwest::Error) -> IndexResponse {
    if error.is_timeout() {
        metrics::record_upstream_failure("timeout");
        tracing::warn!(url = %url, error = %error, "Upstream timed out");
        IndexResponse::gateway_timeout(format!("upstream timed out: {url}"))
    } else {
        metrics::record_upstream_failure("transport");
        tracing::error!(url = %url, error = %error, "Upstream request failed");
        IndexResponse::bad_gateway(format!("upstream unreachable: {url}: {error}"))
    }
}
