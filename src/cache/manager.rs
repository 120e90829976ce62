//! Cache store for persisting scraped trophy datasets to disk
//!
//! Provides a `CacheStore` that keeps the most recent dataset per profile as a
//! JSON file alongside the time it was fetched, and decides whether an entry is
//! still fresh.

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

use crate::data::{ProfileId, TrophyDataset};

/// How long a cache entry stays fresh
pub const FRESHNESS_WINDOW_HOURS: i64 = 24;

/// Storage failures inside the cache
///
/// These never leave this module: every public operation downgrades them to a
/// cache miss after logging.
#[derive(Debug, Error)]
enum CacheError {
    #[error("cache I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache entry {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode cache entry: {0}")]
    Encode(#[source] serde_json::Error),
}

/// A dataset together with when it was fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The cached dataset
    pub dataset: TrophyDataset,
    /// When the dataset was scraped
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Age of the entry at `now`
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }
}

/// Manages reading and writing cached datasets to disk
///
/// Entries are stored as `<key>.json` in an XDG-compliant cache directory
/// (`~/.cache/trophyhunter/` on Linux), where `<key>` is the lowercased
/// profile ID. Writes go to a temporary file in the same directory and are
/// renamed into place, so readers see either the old entry or the new one.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

static SHARED: OnceLock<Option<CacheStore>> = OnceLock::new();

impl CacheStore {
    /// Creates a new CacheStore using the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "trophyhunter")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new CacheStore with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Process-wide default store, resolved on first access
    pub fn shared() -> Option<&'static CacheStore> {
        SHARED.get_or_init(CacheStore::new).as_ref()
    }

    /// Directory this store writes to
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to the cache file for a profile
    fn cache_path(&self, id: &ProfileId) -> PathBuf {
        self.cache_dir.join(format!("{}.json", id.cache_key()))
    }

    /// Reads the cached entry for a profile
    ///
    /// Returns `None` if nothing was stored yet, or if the file cannot be read
    /// or parsed. Freshness is not checked here; see [`CacheStore::is_fresh`].
    pub fn get(&self, id: &ProfileId) -> Option<CacheEntry> {
        match self.try_read(id) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(profile = %id, error = %e, "ignoring unreadable cache entry");
                None
            }
        }
    }

    /// Stores a dataset for a profile, stamped with the current time
    ///
    /// Overwrites any previous entry. Failures are logged and swallowed; a
    /// broken cache must not stop the caller from using live data.
    pub fn put(&self, id: &ProfileId, dataset: &TrophyDataset) {
        self.put_at(id, dataset, Utc::now());
    }

    /// Stores a dataset with an explicit fetch timestamp
    pub fn put_at(&self, id: &ProfileId, dataset: &TrophyDataset, fetched_at: DateTime<Utc>) {
        match self.try_write(id, dataset, fetched_at) {
            Ok(path) => debug!(profile = %id, path = %path.display(), "cache entry written"),
            Err(e) => warn!(profile = %id, error = %e, "failed to write cache entry"),
        }
    }

    /// Whether an entry is younger than the freshness window right now
    pub fn is_fresh(entry: &CacheEntry) -> bool {
        Self::is_fresh_at(entry, Utc::now())
    }

    /// Whether an entry is younger than the freshness window at `now`
    ///
    /// An entry exactly 24 hours old is stale.
    pub fn is_fresh_at(entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        entry.age_at(now) < Duration::hours(FRESHNESS_WINDOW_HOURS)
    }

    fn try_read(&self, id: &ProfileId) -> Result<Option<CacheEntry>, CacheError> {
        let path = self.cache_path(id);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CacheError::Io { path, source }),
        };
        let entry = serde_json::from_str(&content)
            .map_err(|source| CacheError::Corrupt { path, source })?;
        Ok(Some(entry))
    }

    fn try_write(
        &self,
        id: &ProfileId,
        dataset: &TrophyDataset,
        fetched_at: DateTime<Utc>,
    ) -> Result<PathBuf, CacheError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| CacheError::Io { path, source }
        };

        fs::create_dir_all(&self.cache_dir).map_err(io_err(&self.cache_dir))?;

        #[derive(Serialize)]
        struct EntryRef<'a> {
            dataset: &'a TrophyDataset,
            fetched_at: DateTime<Utc>,
        }

        let json = serde_json::to_string_pretty(&EntryRef {
            dataset,
            fetched_at,
        })
        .map_err(CacheError::Encode)?;

        let path = self.cache_path(id);
        let mut tmp = NamedTempFile::new_in(&self.cache_dir).map_err(io_err(&self.cache_dir))?;
        tmp.write_all(json.as_bytes()).map_err(io_err(tmp.path()))?;
        tmp.as_file().sync_all().map_err(io_err(tmp.path()))?;
        tmp.persist(&path).map_err(|e| CacheError::Io {
            path: path.clone(),
            source: e.error,
        })?;
        Ok(path)
    }
}
