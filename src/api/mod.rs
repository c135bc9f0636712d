//! HTTP status API.
//!
//! Served only when [`Config::api_bind_addr`][`crate::config::Config::api_bind_addr`] is set.
//!
//! # API Endpoints
//!
//! ## `/healthcheck` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"ok":"healthy"}` when the service is operational.
//!
//! ## `/status` (GET)
//!
//!   Returns the snapshot resolvers are currently answering from, and when it was published:
//!
//!   ```json
//!   { "last_refresh": "2024-05-01T12:00:00Z", "jobs": { "web": ["10.0.0.5", "10.0.0.6"] } }
//!   ```
//!
//!   `last_refresh` is `null` until the first refresh succeeds. A `last_refresh` that stops
//!   advancing means Nomad has been unreachable since then and answers are getting stale.
//!
//! ## `/metrics` (GET)
//!
//!   Prometheus text exposition of the counters and gauges described in [`crate::metrics`].

mod model;
mod routes;
pub mod server;

pub use server::new;
