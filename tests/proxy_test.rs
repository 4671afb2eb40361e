//! Proxy route tests against a mock upstream.

use std::time::Duration;

use axum::http::{header, StatusCode};
use simpleindex::routing::Params;
use tempfile::TempDir;
use tokio::net::TcpListener;

mod common;

use common::MockResponse;

fn project(name: &str) -> Params {
    Params::from([("project".to_string(), name.to_string())])
}

fn proxy_config(upstream: &str, extra: &str) -> String {
    format!(
        r#"
[upstream]
buffer_limit_bytes = 64
{extra}

[routes."{{project}}"]
source = "proxy"
to = "http://{upstream}/simple/{{project}}/"
"#
    )
}

#[tokio::test]
async fn test_page_is_relayed() {
    let upstream = common::start_mock_upstream(|path| match path {
        "/simple/foo/" => {
            MockResponse::ok("text/html", "<a href=\"foo-1.0.tar.gz\">foo-1.0.tar.gz</a>")
                .header("ETag", "\"v1\"")
                .header("X-Hop", "1")
                .header("Connection", "close, X-Hop")
        }
        _ => MockResponse::status(404, "missing"),
    })
    .await;

    let tmp = TempDir::new().unwrap();
    let table = common::route_table(&proxy_config(&upstream.to_string(), ""), tmp.path());

    let response = table.resolve_page("{project}", &project("foo")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.media_type, "text/html");
    assert_eq!(response.headers[header::ETAG], "\"v1\"");
    assert!(response.headers.get("x-hop").is_none());
    assert!(response.headers.get(header::CONNECTION).is_none());
    assert!(!response.is_streamed());
    assert_eq!(
        response.content().unwrap().as_ref(),
        b"<a href=\"foo-1.0.tar.gz\">foo-1.0.tar.gz</a>"
    );
}

#[tokio::test]
async fn test_file_url_is_joined() {
    let upstream = common::start_mock_upstream(|path| match path {
        "/simple/foo/foo-1.0.tar.gz" => MockResponse::ok("application/x-tar", "sdist"),
        _ => MockResponse::status(404, "missing"),
    })
    .await;

    let tmp = TempDir::new().unwrap();
    let table = common::route_table(&proxy_config(&upstream.to_string(), ""), tmp.path());

    let response = table
        .resolve_file("{project}", &project("foo"), "foo-1.0.tar.gz")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.media_type, "application/x-tar");
    assert_eq!(response.content().unwrap().as_ref(), b"sdist");
}

#[tokio::test]
async fn test_large_body_is_streamed() {
    let payload: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
    let expected = payload.clone();
    let upstream = common::start_mock_upstream(move |_| {
        MockResponse::ok("application/octet-stream", payload.clone())
    })
    .await;

    let tmp = TempDir::new().unwrap();
    let table = common::route_table(&proxy_config(&upstream.to_string(), ""), tmp.path());

    let response = table
        .resolve_file("{project}", &project("foo"), "foo-1.0-py3-none-any.whl")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.is_streamed());

    let response = axum::response::IntoResponse::into_response(response);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(body.as_ref(), expected.as_slice());
}

#[tokio::test]
async fn test_upstream_error_status_is_relayed() {
    let upstream =
        common::start_mock_upstream(|_| MockResponse::status(404, "no such project")).await;

    let tmp = TempDir::new().unwrap();
    let table = common::route_table(&proxy_config(&upstream.to_string(), ""), tmp.path());

    let response = table.resolve_page("{project}", &project("missing")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.content().unwrap().as_ref(), b"no such project");
}

#[tokio::test]
async fn test_upstream_redirect_is_not_followed() {
    let upstream = common::start_mock_upstream(|path| match path {
        "/simple/foo/" => {
            MockResponse::status(302, "").header("Location", "https://elsewhere.invalid/foo/")
        }
        _ => MockResponse::ok("text/html", "followed"),
    })
    .await;

    let tmp = TempDir::new().unwrap();
    let table = common::route_table(&proxy_config(&upstream.to_string(), ""), tmp.path());

    let response = table.resolve_page("{project}", &project("foo")).await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.headers[header::LOCATION], "https://elsewhere.invalid/foo/");
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let upstream = common::closed_port().await;

    let tmp = TempDir::new().unwrap();
    let table = common::route_table(&proxy_config(&upstream.to_string(), ""), tmp.path());

    let response = table.resolve_page("{project}", &project("foo")).await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.media_type, "text/plain");
}

#[tokio::test]
async fn test_stalled_upstream_is_gateway_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let tmp = TempDir::new().unwrap();
    let config = proxy_config(&upstream.to_string(), "read_timeout_secs = 1");
    let table = common::route_table(&config, tmp.path());

    let response = tokio::time::timeout(
        Duration::from_secs(10),
        table.resolve_page("{project}", &project("foo")),
    )
    .await
    .expect("read timeout did not fire");
    assert!(
        matches!(
            response.status,
            StatusCode::GATEWAY_TIMEOUT | StatusCode::BAD_GATEWAY
        ),
        "unexpected status {}",
        response.status
    );
}
