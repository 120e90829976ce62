//! Cache-first access to trophy datasets
//!
//! `TrophyProvider` answers "give me the data for this profile": a fresh cache
//! entry is returned as-is, otherwise the scraper runs and its result is
//! written back before being returned. This check-then-fetch flow is what keeps
//! the upstream from being scraped more than once per freshness window.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::cache::CacheStore;
use crate::data::{ProfileId, TrophyDataset};
use crate::scrape::{HttpSource, PageSource, ScrapeError, Scraper};

/// Where a dataset came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// A fresh cache entry
    Cache,
    /// A scrape performed for this request
    Live,
}

/// A dataset together with its provenance
#[derive(Debug, Clone)]
pub struct Loaded {
    pub dataset: TrophyDataset,
    /// When the dataset was scraped
    pub fetched_at: DateTime<Utc>,
    pub source: DataSource,
}

/// Combines a scraper with an optional cache store
#[derive(Debug)]
pub struct TrophyProvider<S = HttpSource> {
    scraper: Scraper<S>,
    cache: Option<CacheStore>,
}

impl<S: PageSource> TrophyProvider<S> {
    /// Creates a provider; without a cache every request scrapes
    pub fn new(scraper: Scraper<S>, cache: Option<CacheStore>) -> Self {
        Self { scraper, cache }
    }

    /// The scraper used on cache misses
    pub fn scraper(&self) -> &Scraper<S> {
        &self.scraper
    }

    /// Returns the cached dataset if fresh, otherwise scrapes and caches
    ///
    /// # Returns
    /// * `Ok(Loaded)` - from cache (`DataSource::Cache`) or a new scrape (`DataSource::Live`)
    /// * `Err(ScrapeError)` - the scrape failed; cache trouble is never reported here
    pub async fn load(&self, id: &ProfileId) -> Result<Loaded, ScrapeError> {
        if let Some(ref cache) = self.cache {
            match cache.get(id) {
                Some(entry) if CacheStore::is_fresh(&entry) => {
                    info!(profile = %id, fetched_at = %entry.fetched_at, "cache hit");
                    return Ok(Loaded {
                        dataset: entry.dataset,
                        fetched_at: entry.fetched_at,
                        source: DataSource::Cache,
                    });
                }
                Some(entry) => {
                    info!(profile = %id, fetched_at = %entry.fetched_at, "cache entry stale")
                }
                None => info!(profile = %id, "cache miss"),
            }
        }

        self.refresh(id).await
    }

    /// Scrapes unconditionally and stores the result
    pub async fn refresh(&self, id: &ProfileId) -> Result<Loaded, ScrapeError> {
        self.refresh_with_progress(id, |_, _| {}).await
    }

    /// Like [`TrophyProvider::refresh`], reporting scrape progress per page
    pub async fn refresh_with_progress<F>(
        &self,
        id: &ProfileId,
        on_page: F,
    ) -> Result<Loaded, ScrapeError>
    where
        F: FnMut(u32, usize),
    {
        let dataset = self.scraper.fetch_with_progress(id, on_page).await?;
        let fetched_at = Utc::now();

        if let Some(ref cache) = self.cache {
            cache.put_at(id, &dataset, fetched_at);
        }

        Ok(Loaded {
            dataset,
            fetched_at,
            source: DataSource::Live,
        })
    }
}
