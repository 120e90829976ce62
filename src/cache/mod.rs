//! Cache module for storing scraped trophy data on disk
//!
//! This module provides a cache store that persists one dataset per profile to
//! the filesystem together with its fetch time. Entries stay fresh for 24 hours;
//! storage failures are logged and treated as misses so a broken cache never
//! blocks a live fetch.

mod manager;

pub use manager::{CacheEntry, CacheStore, FRESHNESS_WINDOW_HOURS};
