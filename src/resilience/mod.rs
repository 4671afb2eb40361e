//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Proxy route request to upstream:
//!     → timeouts.rs (connect / read deadlines on the shared client)
//!     → On failure: timeouts.rs maps the error to 502 / 504
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Failed fetches are answered immediately, never retried
//! - Dropping a request future aborts its outbound call

pub mod timeouts;
