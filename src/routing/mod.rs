//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (route lookup)
//!     → matcher.rs (segment match, placeholder capture)
//!     → route.rs (Path | Proxy | Redirect)
//!     → IndexResponse
//!
//! Route Compilation (at startup):
//!     IndexConfig.routes
//!     → template.rs (parse keys and `to` targets)
//!     → Build one Route per key
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Closed set of backends; no runtime plugin lookup
//! - Deterministic: same input always matches same route
//! - Most literal segments wins

pub mod matcher;
pub mod path;
pub mod proxy;
pub mod redirect;
pub mod route;
pub mod router;
pub mod template;

pub use matcher::Target;
pub use route::Route;
pub use router::{RouteMatch, RouteTable, RouteTableError};
pub use template::{Params, Template, TemplateError};
