//! Blocking HTTP(S) fetcher for remote documents.

use std::time::Duration;

use oasgen_compiler::document::{FetchError, Fetcher};
use url::Url;

const TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(TIMEOUT)
            .user_agent(concat!("oasgen/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        tracing::debug!(url = %url, "fetching remote document");
        let response = self
            .client
            .get(url.as_str())
            .send()
            .map_err(|e| FetchError::new(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(format!("server responded with {}", status)));
        }
        let body = response
            .bytes()
            .map_err(|e| FetchError::new(e.to_string()))?;
        tracing::trace!(url = %url, bytes = body.len(), "remote document fetched");
        Ok(body.to_vec())
    }
}
