//! Scraping of public PSNProfiles pages
//!
//! This module turns a profile ID into a [`TrophyDataset`](crate::data::TrophyDataset):
//! `source` fetches pages, `parse` reads them, and `client` drives the
//! pagination and error classification.

mod client;
mod error;
pub mod parse;
mod source;

#[cfg(test)]
pub(crate) mod fixtures;

pub use client::Scraper;
pub use error::{FetchError, ParseError, ScrapeError};
pub use parse::{LogPage, RowOutcome, Schema};
pub use source::{HttpSource, Page, PageSource};
