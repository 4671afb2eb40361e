//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Dispatch requests to the route table
//! - Convert route results into wire responses

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, Uri},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response::IndexResponse;
use crate::routing::{RouteTable, Target};

/// HTTP front end for the route table.
pub struct HttpServer {
    router: Router,
    table: Arc<RouteTable>,
}

impl HttpServer {
    /// Create a new HTTP server serving `table`.
    pub fn new(table: RouteTable, config: &ServerConfig) -> Self {
        let table = Arc::new(table);
        let router = Self::build_router(
            table.clone(),
            Duration::from_secs(config.request_timeout_secs),
        );
        Self { router, table }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(table: Arc<RouteTable>, request_timeout: Duration) -> Router {
        Router::new()
            .route("/{*path}", get(dispatch_handler))
            .fallback(not_found_handler)
            .with_state(table)
            .layer(propagate_request_id_layer())
            .layer(TimeoutLayer::new(request_timeout))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id = %request_id(request),
                    )
                }),
            )
            .layer(set_request_id_layer())
    }

    /// A clone of the router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.table.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Match the request path and hand it to the route.
async fn dispatch_handler(
    State(table): State<Arc<RouteTable>>,
    uri: Uri,
    Path(path): Path<String>,
) -> Response {
    // the capture is percent-decoded; the raw URI tells whether a slash ended it
    let path = if uri.path().ends_with('/') && !path.ends_with('/') {
        format!("{path}/")
    } else {
        path
    };

    let Some(found) = table.match_path(&path) else {
        tracing::debug!(path = %uri.path(), "No route matched");
        return IndexResponse::not_found().into_response();
    };

    match found.target {
        Target::Page => table
            .resolve_page(found.key, &found.params)
            .await
            .into_response(),
        Target::File(filename) => table
            .resolve_file(found.key, &found.params, &filename)
            .await
            .into_response(),
        Target::AddSlash => Redirect::permanent(&add_slash_location(&uri)).into_response(),
    }
}

/// Same-origin `Location` for the slash-terminated form of `uri`.
///
/// Leading slashes are collapsed so the result is never protocol-relative.
fn add_slash_location(uri: &Uri) -> String {
    let path = uri.path().trim_start_matches(['/', '\\']);
    match uri.query() {
        Some(query) => format!("/{path}/?{query}"),
        None => format!("/{path}/"),
    }
}

async fn not_found_handler() -> IndexResponse {
    IndexResponse::not_found()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_slash_location_stays_on_origin() {
        let location = |uri: &str| add_slash_location(&uri.parse::<Uri>().unwrap());
        assert_eq!(location("/pkg"), "/pkg/");
        assert_eq!(location("/pkg?a=1"), "/pkg/?a=1");
        assert_eq!(location("//evil.example"), "/evil.example/");
        assert_eq!(location("///evil.example?x"), "/evil.example/?x");
    }
}
