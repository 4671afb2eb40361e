//! PEP 503 simple repository front end.
//!
//! Serves package index pages and distribution files from a set of
//! configured routes: local directories, upstream redirects and
//! upstream proxies.

pub mod config;
pub mod dist;
pub mod http;
pub mod index;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;

pub use config::schema::IndexConfig;
pub use http::{HttpServer, IndexResponse};
pub use lifecycle::Shutdown;
pub use routing::RouteTable;
