use std::time::Duration;

use anyhow::{Context, Result};

/// Shared `reqwest` client bound to the backend base URL.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build backend http client")?;
        Ok(Self::with_client(http, api_url))
    }

    /// Use an existing client, e.g. one shared with other adapters.
    pub fn with_client(http: reqwest::Client, api_url: &str) -> Self {
        Self {
            http,
            base_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
