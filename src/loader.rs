use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use crate::decode::{self, DecodeError, DecodeOptions};
use crate::record::CatalogSnapshot;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetch failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned HTTP {code}")]
    Status { code: u16, url: String },
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Fetches the raw text body behind a URL. The HTTP implementation lives in
/// `fetch`; tests substitute counting fakes.
pub trait FetchText {
    fn fetch(&self, url: &str) -> Result<String, LoadError>;
}

struct CacheEntry {
    snapshot: Arc<CatalogSnapshot>,
    fetched_at: Instant,
}

/// Read-through memo cache over the fetch + decode pipeline.
///
/// At most one entry per source URL, valid for `ttl`. Expiry is lazy,
/// checked on access; there is no background refresh and no retry. A failed
/// load also occupies the TTL window (as an empty snapshot), so a broken
/// source is not re-fetched on every access.
pub struct CatalogCache {
    ttl: Duration,
    options: DecodeOptions,
    entries: HashMap<String, CacheEntry>,
}

impl CatalogCache {
    pub fn new(ttl: Duration, options: DecodeOptions) -> Self {
        CatalogCache {
            ttl,
            options,
            entries: HashMap::new(),
        }
    }

    /// Return the cached snapshot when still fresh, otherwise fetch and
    /// decode a new one. Errors are the caller's policy decision; the cache
    /// itself never turns a failure into data.
    pub fn load(
        &mut self,
        fetcher: &dyn FetchText,
        url: &str,
    ) -> Result<Arc<CatalogSnapshot>, LoadError> {
        if let Some(entry) = self.entries.get(url) {
            if entry.fetched_at.elapsed() < self.ttl {
                let age = entry.snapshot.loaded_at().elapsed().unwrap_or_default();
                debug!(
                    url,
                    rows = entry.snapshot.len(),
                    age_secs = age.as_secs(),
                    "catalog served from cache"
                );
                return Ok(Arc::clone(&entry.snapshot));
            }
        }
        self.reload(fetcher, url)
    }

    /// The manual refresh trigger: drop the entry and load again, even
    /// inside the TTL window.
    pub fn refresh(
        &mut self,
        fetcher: &dyn FetchText,
        url: &str,
    ) -> Result<Arc<CatalogSnapshot>, LoadError> {
        self.invalidate(url);
        self.reload(fetcher, url)
    }

    pub fn invalidate(&mut self, url: &str) {
        self.entries.remove(url);
    }

    fn reload(
        &mut self,
        fetcher: &dyn FetchText,
        url: &str,
    ) -> Result<Arc<CatalogSnapshot>, LoadError> {
        match self.fetch_and_decode(fetcher, url) {
            Ok(snapshot) => {
                info!(url, rows = snapshot.len(), "catalog loaded");
                self.insert(url, Arc::clone(&snapshot));
                Ok(snapshot)
            }
            Err(err) => {
                self.insert(url, Arc::new(CatalogSnapshot::empty()));
                Err(err)
            }
        }
    }

    fn fetch_and_decode(
        &self,
        fetcher: &dyn FetchText,
        url: &str,
    ) -> Result<Arc<CatalogSnapshot>, LoadError> {
        let body = fetcher.fetch(url)?;
        let records = decode::decode_catalog(&body, &self.options)?;
        Ok(Arc::new(CatalogSnapshot::new(records)))
    }

    fn insert(&mut self, url: &str, snapshot: Arc<CatalogSnapshot>) {
        self.entries.insert(
            url.to_string(),
            CacheEntry {
                snapshot,
                fetched_at: Instant::now(),
            },
        );
    }
}
