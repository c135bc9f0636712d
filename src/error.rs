//! Error types.

use reqwest::StatusCode;
use trust_dns_server::proto::error::ProtoError;

/// Error enumerates the possible nomad-dns error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when a [`Config`][`crate::config::Config`] value is syntactically valid JSON
    /// but can't be used, e.g. a zero [`refresh_interval`][`crate::config::Config::refresh_interval`]
    /// or a [`domain`][`crate::config::Config::domain`] with no labels.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Returned when the Nomad API can't be reached, times out, or returns a body that doesn't
    /// decode as the expected JSON.
    #[error("nomad request failed: {0}")]
    Nomad(#[from] reqwest::Error),

    /// Returned when the Nomad API answers with a non-success HTTP status.
    #[error("nomad returned {status} for {url}")]
    NomadStatus { status: StatusCode, url: String },

    /// Returned by the [`StaticOrchestrator`][`crate::orchestrator::StaticOrchestrator`] when it
    /// has been told to fail.
    #[error("orchestrator unavailable: {0}")]
    Unavailable(String),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when [trying to load a `Config`][crate::config::Config::try_from_file] fails due to
    /// invalid JSON content.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),

    /// Returned when the DNS server encounters a generic DNS protocol error.
    #[error("DNS error")]
    DNSError(#[from] ProtoError),
}
