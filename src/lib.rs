//! Trophy Hunter library
//!
//! Scrapes public PSNProfiles trophy logs, caches them on disk for a day and
//! derives statistics from them. The binary is a thin shell over these modules.

pub mod analytics;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod export;
pub mod provider;
pub mod report;
pub mod scrape;
