//! DNS server for Nomad job addresses.
//!
//! # A Records
//!
//! nomad-dns will serve a response to `A` class queries for `<job>` followed by the configured
//! [`Config::domain`][`crate::config::Config::domain`], listing the address of the node behind
//! every running allocation of the job as of the last successful refresh.
//!
//! E.g. with config:
//! ```json
//! {
//!   "nomad_addr": "http://hedwig:4646",
//!   "domain": ".service.nomad",
//!   "dns_ttl": 60
//! }
//! ```
//!
//! If job `web` has running allocations on nodes with addresses `10.0.0.5` and `10.0.0.6`, an `A`
//! class query for `web.service.nomad` would return:
//!
//! ```bash
//! ❯ dig @127.0.0.1 -p 5333 +short web.service.nomad A
//! 10.0.0.5
//! 10.0.0.6
//! ```
//!
//! # Negative Responses
//!
//! Queries for jobs with no running allocations, for names outside the configured domain, and for
//! any record type other than `A` are answered with `NXDOMAIN` and no records. Requests that
//! aren't queries get `NOTIMP`.

mod handlers;
pub mod server;

pub use handlers::Handler;
pub use server::{new, with_socket};
