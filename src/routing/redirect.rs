//! Routes that send clients to another index.

use crate::http::response::IndexResponse;
use crate::routing::template::{Params, Template};

/// Answers page requests with a 302 to the substituted `to` URL.
///
/// File requests are not supported and return 404.
#[derive(Debug, Clone)]
pub struct RedirectRoute {
    to: Template,
}

impl RedirectRoute {
    pub fn new(to: Template) -> Self {
        Self { to }
    }

    pub fn to(&self) -> &Template {
        &self.to
    }

    pub async fn resolve_page(&self, params: &Params) -> IndexResponse {
        match self.to.render(params) {
            Ok(url) => IndexResponse::redirect(&url),
            Err(_) => IndexResponse::not_found(),
        }
    }

    pub async fn resolve_file(&self, _params: &Params, _filename: &str) -> IndexResponse {
        IndexResponse::not_found()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};

    #[tokio::test]
    async fn test_redirect_page() {
        let route =
            RedirectRoute::new(Template::parse("https://example.org/simple/{project}/").unwrap());
        let params = Params::from([("project".to_string(), "foo".to_string())]);

        let response = route.resolve_page(&params).await;
        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.headers[header::LOCATION], "https://example.org/simple/foo/");

        let response = route.resolve_file(&params, "foo-1.0.tar.gz").await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }
}
