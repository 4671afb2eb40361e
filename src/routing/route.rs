//! The route contract shared by all backends.

use crate::http::response::IndexResponse;
use crate::routing::path::PathRoute;
use crate::routing::proxy::ProxyRoute;
use crate::routing::redirect::RedirectRoute;
use crate::routing::template::{Params, Template};

/// A configured backend able to answer page and file requests.
///
/// Immutable after construction and shared by all in-flight requests.
#[derive(Debug, Clone)]
pub enum Route {
    /// Local directory tree.
    Path(PathRoute),
    /// Forward to an upstream index and relay its answer.
    Proxy(ProxyRoute),
    /// Redirect clients to an upstream index.
    Redirect(RedirectRoute),
}

impl Route {
    /// Short backend name for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Route::Path(_) => "path",
            Route::Proxy(_) => "proxy",
            Route::Redirect(_) => "redirect",
        }
    }

    pub fn to(&self) -> &Template {
        match self {
            Route::Path(route) => route.to(),
            Route::Proxy(route) => route.to(),
            Route::Redirect(route) => route.to(),
        }
    }

    /// Produce the project index page.
    pub async fn resolve_page(&self, params: &Params) -> IndexResponse {
        match self {
            Route::Path(route) => route.resolve_page(params).await,
            Route::Proxy(route) => route.resolve_page(params).await,
            Route::Redirect(route) => route.resolve_page(params).await,
        }
    }

    /// Produce the content of `filename` for the project.
    pub async fn resolve_file(&self, params: &Params, filename: &str) -> IndexResponse {
        match self {
            Route::Path(route) => route.resolve_file(params, filename).await,
            Route::Proxy(route) => route.resolve_file(params, filename).await,
            Route::Redirect(route) => route.resolve_file(params, filename).await,
        }
    }
}
