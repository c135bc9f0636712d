use crate::error::Error;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub type SharedConfig = Arc<Config>;

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_nomad_addr")]
    pub nomad_addr: String,
    #[serde(default)]
    pub nomad_token: Option<String>,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_nomad_timeout")]
    pub nomad_timeout: Duration,
    #[serde(default = "default_dns_udp_bind_addr")]
    pub dns_udp_bind_addr: SocketAddr,
    #[serde(default)]
    pub dns_tcp_bind_addr: Option<SocketAddr>,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_dns_tcp_timeout")]
    pub dns_tcp_timeout: Duration,
    #[serde(default = "default_dns_ttl")]
    pub dns_ttl: u32,
    #[serde(default = "DomainSuffix::default")]
    pub domain: DomainSuffix,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: Duration,
    #[serde(default)]
    pub api_bind_addr: Option<SocketAddr>,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_api_timeout")]
    pub api_timeout: Duration,
}

fn default_nomad_addr() -> String {
    "http://127.0.0.1:4646".to_string()
}

fn default_nomad_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_dns_udp_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5333))
}

fn default_dns_tcp_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_dns_ttl() -> u32 {
    3600
}

fn default_refresh_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_api_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Default for Config {
    fn default() -> Self {
        Config {
            nomad_addr: default_nomad_addr(),
            nomad_token: None,
            nomad_timeout: default_nomad_timeout(),
            dns_udp_bind_addr: default_dns_udp_bind_addr(),
            dns_tcp_bind_addr: None,
            dns_tcp_timeout: default_dns_tcp_timeout(),
            dns_ttl: default_dns_ttl(),
            domain: DomainSuffix::default(),
            refresh_interval: default_refresh_interval(),
            api_bind_addr: None,
            api_timeout: default_api_timeout(),
        }
    }
}

impl Config {
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        conf.validate()?;
        Ok(conf)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.refresh_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "refresh_interval must be at least one second".to_string(),
            ));
        }
        if self.nomad_timeout.is_zero() {
            return Err(Error::InvalidConfig(
                "nomad_timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}

/// The DNS suffix every served name lives under, held in one canonical form: lowercase, exactly
/// one leading dot and no trailing dot (`.service.nomad`).
///
/// Configured values are accepted with or without the leading dot and with or without a trailing
/// root dot; `service.nomad`, `.service.nomad` and `.service.nomad.` all normalize to the same
/// suffix.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(try_from = "String")]
pub struct DomainSuffix(String);

impl DomainSuffix {
    /// Normalize a configured suffix, or return [`Error::InvalidConfig`] when it has no labels or
    /// contains an empty label (`service..nomad`).
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let trimmed = raw.trim().trim_matches('.');
        if trimmed.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "domain \"{raw}\" has no labels"
            )));
        }
        if trimmed.split('.').any(str::is_empty) {
            return Err(Error::InvalidConfig(format!(
                "domain \"{raw}\" contains an empty label"
            )));
        }
        Ok(DomainSuffix(format!(".{}", trimmed.to_ascii_lowercase())))
    }

    /// The canonical suffix, including its leading dot.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Strip the suffix from a query name, returning the service name in front of it.
    ///
    /// The name may carry a trailing root dot. Matching is ASCII case-insensitive and aligned to
    /// label boundaries: with suffix `.service.nomad`, `web.service.nomad.` yields `web`,
    /// `service.nomad` yields the empty service name, and `evilservice.nomad` yields `None`.
    #[must_use]
    pub fn strip<'a>(&self, name: &'a str) -> Option<&'a str> {
        let name = name.strip_suffix('.').unwrap_or(name);
        let bare = &self.0[1..];
        if name.eq_ignore_ascii_case(bare) {
            return Some("");
        }
        let split = name.len().checked_sub(self.0.len())?;
        let tail = name.get(split..)?;
        if tail.eq_ignore_ascii_case(&self.0) {
            name.get(..split)
        } else {
            None
        }
    }
}

impl Default for DomainSuffix {
    fn default() -> Self {
        DomainSuffix(".service.nomad".to_string())
    }
}

impl TryFrom<String> for DomainSuffix {
    type Error = Error;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        DomainSuffix::parse(&raw)
    }
}

impl fmt::Display for DomainSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
