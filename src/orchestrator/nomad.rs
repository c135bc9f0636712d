//! A [Nomad] HTTP API implementation of the [`OrchestratorClient`][super::OrchestratorClient]
//! trait.
//!
//! [Nomad]: https://developer.hashicorp.com/nomad/api-docs
use crate::config::Config;
use crate::error::Error;
use crate::orchestrator::{AllocationDescriptor, JobDescriptor, NodeDescriptor, OrchestratorClient};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Url;
use serde::de::DeserializeOwned;

const TOKEN_HEADER: &str = "X-Nomad-Token";

/// Lists nodes, jobs and allocations from a Nomad agent's `/v1` API.
#[derive(Debug, Clone)]
pub struct NomadClient {
    base: Url,
    http: reqwest::Client,
}

impl NomadClient {
    /// Build a client for the Nomad agent configured in [`Config::nomad_addr`], applying
    /// [`Config::nomad_timeout`] to every request and sending [`Config::nomad_token`] if set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the address isn't an absolute `http(s)` URL or the
    /// token isn't a valid header value.
    ///
    /// Returns [`Error::Nomad`] if the HTTP client can't be constructed.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let base = Url::parse(&config.nomad_addr)
            .map_err(|err| Error::InvalidConfig(format!("nomad_addr: {err}")))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(Error::InvalidConfig(format!(
                "nomad_addr \"{base}\" is not an http(s) URL"
            )));
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.nomad_token {
            let mut value = HeaderValue::from_str(token)
                .map_err(|err| Error::InvalidConfig(format!("nomad_token: {err}")))?;
            value.set_sensitive(true);
            headers.insert(TOKEN_HEADER, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.nomad_timeout)
            .default_headers(headers)
            .build()?;
        Ok(NomadClient { base, http })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // NB: new() rejects cannot-be-a-base URLs, so path_segments_mut always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        tracing::trace!("GET {url}");
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::NomadStatus {
                status,
                url: url.to_string(),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl OrchestratorClient for NomadClient {
    async fn list_nodes(&self) -> Result<Vec<NodeDescriptor>, Error> {
        self.get(self.endpoint(&["v1", "nodes"])).await
    }

    async fn list_jobs(&self) -> Result<Vec<JobDescriptor>, Error> {
        self.get(self.endpoint(&["v1", "jobs"])).await
    }

    async fn list_allocations(&self, job_id: &str) -> Result<Vec<AllocationDescriptor>, Error> {
        self.get(self.endpoint(&["v1", "job", job_id, "allocations"]))
            .await
    }
}
