use std::time::Duration;

use crate::loader::{FetchText, LoadError};

const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Blocking HTTP fetcher for the CSV export endpoint.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, LoadError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("refuge_catalog/", env!("CARGO_PKG_VERSION")))
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(HttpFetcher { client })
    }
}

impl FetchText for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, LoadError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                code: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text()?)
    }
}
