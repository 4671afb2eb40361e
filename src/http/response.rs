//! Route results, independent of the HTTP server.
//!
//! # Responsibilities
//! - Carry status, media type, headers and body from a route to the transport
//! - Represent both fully buffered bodies and one-shot streamed bodies
//! - Convert into an axum response at the transport boundary
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire upstream bodies
//! - A streamed body is consumed at most once; the type is not `Clone`
//! - The media type always wins over a `Content-Type` in `headers`

use std::fmt;
use std::io;

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use bytes::Bytes;
use futures_util::stream::BoxStream;

/// Single-pass sequence of body chunks.
pub type BodyStream = BoxStream<'static, Result<Bytes, io::Error>>;

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";

/// Response body payload.
pub enum Body {
    Buffered(Bytes),
    Streamed(BodyStream),
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Buffered(bytes) => f.debug_tuple("Buffered").field(&bytes.len()).finish(),
            Body::Streamed(_) => f.write_str("Streamed(..)"),
        }
    }
}

/// A protocol-facing result produced by a route.
#[derive(Debug)]
pub struct IndexResponse {
    pub status: StatusCode,
    pub media_type: String,
    pub headers: HeaderMap,
    pub body: Body,
}

impl Default for IndexResponse {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            media_type: TEXT_PLAIN.to_string(),
            headers: HeaderMap::new(),
            body: Body::Buffered(Bytes::new()),
        }
    }
}

impl IndexResponse {
    /// A buffered 200 response.
    pub fn buffered(content: impl Into<Bytes>, media_type: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            body: Body::Buffered(content.into()),
            ..Self::default()
        }
    }

    /// A streamed 200 response.
    pub fn streamed(stream: BodyStream, media_type: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            body: Body::Streamed(stream),
            ..Self::default()
        }
    }

    pub fn html(content: impl Into<Bytes>) -> Self {
        Self::buffered(content, TEXT_HTML)
    }

    pub fn not_found() -> Self {
        Self::buffered("not found", TEXT_PLAIN).with_status(StatusCode::NOT_FOUND)
    }

    /// A 302 pointing the client at `location`.
    ///
    /// Falls back to 502 if `location` cannot be carried in a header.
    pub fn redirect(location: &str) -> Self {
        match HeaderValue::from_str(location) {
            Ok(value) => {
                let mut response = Self::default().with_status(StatusCode::FOUND);
                response.headers.insert(header::LOCATION, value);
                response
            }
            Err(_) => Self::bad_gateway(format!("invalid redirect target: {location}")),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::buffered(message.into(), TEXT_PLAIN).with_status(StatusCode::BAD_GATEWAY)
    }

    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::buffered(message.into(), TEXT_PLAIN).with_status(StatusCode::GATEWAY_TIMEOUT)
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn is_streamed(&self) -> bool {
        matches!(self.body, Body::Streamed(_))
    }

    /// Buffered content, if the body is not streamed.
    pub fn content(&self) -> Option<&Bytes> {
        match &self.body {
            Body::Buffered(bytes) => Some(bytes),
            Body::Streamed(_) => None,
        }
    }
}

impl IntoResponse for IndexResponse {
    fn into_response(self) -> axum::response::Response {
        let body = match self.body {
            Body::Buffered(bytes) => axum::body::Body::from(bytes),
            Body::Streamed(stream) => axum::body::Body::from_stream(stream),
        };

        let mut response = axum::response::Response::new(body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;

        match HeaderValue::from_str(&self.media_type) {
            Ok(value) => {
                response.headers_mut().insert(header::CONTENT_TYPE, value);
            }
            Err(_) => {
                tracing::warn!(
                    media_type = %self.media_type,
                    "Dropping unrepresentable media type"
                );
            }
        }
        response
    }
}
