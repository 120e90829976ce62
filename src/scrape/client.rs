//! Profile scraper
//!
//! Fetches a profile page and then walks its trophy log page by page until the
//! upstream runs out of pages, producing one normalized `TrophyDataset`.

use std::time::Instant;
use tracing::{debug, info, warn};

use super::parse::{parse_log_page, parse_profile_summary, Schema};
use super::{FetchError, HttpSource, PageSource, ParseError, ScrapeError};
use crate::config::ScraperConfig;
use crate::data::{ProfileId, TrophyDataset};

/// Scrapes trophy data for one profile at a time
///
/// Each call to [`Scraper::fetch`] issues one sequential run of requests. How
/// often it is called is up to the caller; see [`crate::provider`].
#[derive(Debug)]
pub struct Scraper<S = HttpSource> {
    source: S,
    config: ScraperConfig,
    schema: Schema,
}

impl Scraper<HttpSource> {
    /// Creates a scraper that talks HTTP to the configured site
    pub fn new(config: ScraperConfig) -> Result<Self, ScrapeError> {
        let source = HttpSource::new(&config)?;
        Ok(Self::with_source(source, config)?)
    }
}

impl<S: PageSource> Scraper<S> {
    /// Creates a scraper reading pages from `source`
    ///
    /// Fails if any configured selector is invalid.
    pub fn with_source(source: S, config: ScraperConfig) -> Result<Self, ParseError> {
        let schema = Schema::compile(&config.selectors)?;
        Ok(Self {
            source,
            config,
            schema,
        })
    }

    /// Underlying page source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetches and parses the full trophy log for a profile
    ///
    /// # Returns
    /// * `Ok(TrophyDataset)` - summary plus every readable trophy row
    /// * `Err(ScrapeError::Fetch)` - network trouble, bad status, or unknown profile
    /// * `Err(ScrapeError::Parse)` - the pages no longer match the selector schema
    pub async fn fetch(&self, id: &ProfileId) -> Result<TrophyDataset, ScrapeError> {
        self.fetch_with_progress(id, |_, _| {}).await
    }

    /// Like [`Scraper::fetch`], calling `on_page(page, trophies_on_page)` after
    /// each trophy log page
    pub async fn fetch_with_progress<F>(
        &self,
        id: &ProfileId,
        mut on_page: F,
    ) -> Result<TrophyDataset, ScrapeError>
    where
        F: FnMut(u32, usize),
    {
        let started = Instant::now();
        let profile_url = self.config.profile_url(id.as_str());

        let page = self.source.get(&profile_url, None).await?;
        if page.status == 404 {
            return Err(FetchError::ProfileNotFound(id.to_string()).into());
        }
        if !page.is_success() {
            return Err(FetchError::Status {
                url: profile_url,
                status: page.status,
            }
            .into());
        }

        let Some(mut summary) = parse_profile_summary(&page.body, &self.schema)? else {
            return Err(FetchError::ProfileNotFound(id.to_string()).into());
        };
        if summary.username.is_empty() {
            summary.username = id.to_string();
        }
        debug!(profile = %id, total = summary.totals.total, "profile summary parsed");

        let mut records = Vec::new();
        let mut pages_scraped = 0;
        let mut rows_skipped = 0;

        if summary.totals.total > 0 {
            for page_no in 1..=self.config.max_pages {
                if page_no > 1 && !self.config.page_delay.is_zero() {
                    tokio::time::sleep(self.config.page_delay).await;
                }

                let url = self.config.log_url(id.as_str(), page_no);
                let page = self.source.get(&url, Some(&profile_url)).await?;

                // Past the last page the upstream answers 404
                if page.status == 404 {
                    break;
                }
                if !page.is_success() {
                    return Err(FetchError::Status {
                        url,
                        status: page.status,
                    }
                    .into());
                }

                let Some(log) = parse_log_page(&page.body, &self.schema, &self.config.rarity)
                else {
                    if page_no == 1 {
                        return Err(ParseError::MissingContainer {
                            url,
                            selector: self.schema.config().trophy_table.clone(),
                        }
                        .into());
                    }
                    break;
                };

                if !log.skipped.is_empty() {
                    warn!(
                        profile = %id,
                        page = page_no,
                        skipped = log.skipped.len(),
                        reason = %log.skipped[0],
                        "skipped malformed trophy rows"
                    );
                    rows_skipped += log.skipped.len();
                }

                if log.records.is_empty() {
                    if page_no == 1 && !log.skipped.is_empty() {
                        return Err(ParseError::NoReadableRows {
                            url,
                            skipped: log.skipped.len(),
                        }
                        .into());
                    }
                    break;
                }

                debug!(profile = %id, page = page_no, trophies = log.records.len(), "trophy log page parsed");
                on_page(page_no, log.records.len());
                records.extend(log.records);
                pages_scraped = page_no;

                if page_no == self.config.max_pages {
                    warn!(profile = %id, max_pages = page_no, "stopped at page limit");
                }
            }
        }

        // A profile that claims trophies must yield some
        if records.is_empty() && summary.totals.total > 0 {
            return Err(ParseError::EmptyLog {
                url: self.config.log_url(id.as_str(), 1),
                claimed: summary.totals.total,
            }
            .into());
        }

        info!(
            event = "scrape_complete",
            profile = %id,
            duration_seconds = started.elapsed().as_secs_f64(),
            pages_scraped,
            trophies_found = records.len(),
            rows_skipped,
            "scrape complete"
        );

        Ok(TrophyDataset { summary, records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{RarityTier, TrophyType};
    use crate::scrape::fixtures::{self, FakeSource};
    use crate::scrape::Page;
    use std::time::Duration;

    fn test_config() -> ScraperConfig {
        ScraperConfig {
            base_url: fixtures::BASE_URL.to_string(),
            page_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    fn scraper(source: FakeSource) -> Scraper<FakeSource> {
        Scraper::with_source(source, test_config()).expect("default selectors compile")
    }

    fn id(s: &str) -> ProfileId {
        ProfileId::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_walks_pages_until_404() {
        let source = FakeSource::new()
            .with_page(fixtures::profile_url("Hakoom"), Page::ok(fixtures::profile_page("Hakoom", 5)))
            .with_page(fixtures::log_url("Hakoom", 1), Page::ok(fixtures::log_page(&fixtures::rows_for("Astro Bot", 3))))
            .with_page(fixtures::log_url("Hakoom", 2), Page::ok(fixtures::log_page(&fixtures::rows_for("Hades", 2))));
        let scraper = scraper(source);

        let dataset = scraper.fetch(&id("Hakoom")).await.expect("fetch succeeds");

        assert_eq!(dataset.summary.username, "Hakoom");
        assert_eq!(dataset.summary.totals.total, 5);
        assert_eq!(dataset.summary.stats.get("Games Played").map(String::as_str), Some("7"));
        assert_eq!(dataset.len(), 5);
        assert_eq!(dataset.records[0].name, "Astro Bot 0");
        assert_eq!(dataset.records[0].trophy_type, TrophyType::Platinum);
        assert_eq!(dataset.records[3].game, "Hades");

        assert_eq!(
            scraper.source().requested(),
            vec![
                fixtures::profile_url("Hakoom"),
                fixtures::log_url("Hakoom", 1),
                fixtures::log_url("Hakoom", 2),
                fixtures::log_url("Hakoom", 3),
            ]
        );
    }

    #[tokio::test]
    async fn test_log_requests_carry_profile_referer() {
        let source = FakeSource::new()
            .with_page(fixtures::profile_url("a"), Page::ok(fixtures::profile_page("a", 1)))
            .with_page(fixtures::log_url("a", 1), Page::ok(fixtures::log_page(&fixtures::rows_for("G", 1))));
        let scraper = scraper(source);
        scraper.fetch(&id("a")).await.unwrap();

        let referers = scraper.source().referers();
        assert_eq!(referers[0], None);
        assert_eq!(referers[1].as_deref(), Some(fixtures::profile_url("a").as_str()));
    }

    #[tokio::test]
    async fn test_malformed_row_does_not_sink_the_page() {
        let mut rows = fixtures::rows_for("Game", 10);
        rows.insert(4, "<tr><td>broken</td><td>row</td><td>here</td></tr>".to_string());

        let source = FakeSource::new()
            .with_page(fixtures::profile_url("p"), Page::ok(fixtures::profile_page("p", 10)))
            .with_page(fixtures::log_url("p", 1), Page::ok(fixtures::log_page(&rows)));

        let dataset = scraper(source).fetch(&id("p")).await.expect("fetch succeeds");
        assert_eq!(dataset.len(), 10);
    }

    #[tokio::test]
    async fn test_undated_trophies_are_kept() {
        let rows = vec![
            fixtures::trophy_row("G", "Dated", "1st Jan 2024|1:00:00 PM", "3%", "Gold"),
            fixtures::trophy_row("G", "Not synced", "", "3%", "Gold"),
        ];
        let source = FakeSource::new()
            .with_page(fixtures::profile_url("p"), Page::ok(fixtures::profile_page("p", 2)))
            .with_page(fixtures::log_url("p", 1), Page::ok(fixtures::log_page(&rows)));

        let dataset = scraper(source).fetch(&id("p")).await.unwrap();
        assert_eq!(dataset.len(), 2);
        assert!(dataset.records[0].earned_at.is_some());
        assert!(dataset.records[1].earned_at.is_none());
        assert_eq!(dataset.records[1].rarity_tier, Some(RarityTier::UltraRare));
    }

    #[tokio::test]
    async fn test_unknown_profile_404_is_fetch_error() {
        let source = FakeSource::new();
        let err = scraper(source).fetch(&id("ghost")).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch(FetchError::ProfileNotFound(ref p)) if p == "ghost"));
    }

    #[tokio::test]
    async fn test_unknown_profile_search_page_is_fetch_error() {
        let source = FakeSource::new()
            .with_page(fixtures::profile_url("ghost"), Page::ok(fixtures::search_page()));
        let err = scraper(source).fetch(&id("ghost")).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch(FetchError::ProfileNotFound(_))));
    }

    #[tokio::test]
    async fn test_missing_trophy_table_is_parse_error() {
        let source = FakeSource::new()
            .with_page(fixtures::profile_url("p"), Page::ok(fixtures::profile_page("p", 3)))
            .with_page(fixtures::log_url("p", 1), Page::ok("<html><body><div>redesigned</div></body></html>"));

        let err = scraper(source).fetch(&id("p")).await.unwrap_err();
        match err {
            ScrapeError::Parse(ParseError::MissingContainer { url, selector }) => {
                assert_eq!(url, fixtures::log_url("p", 1));
                assert_eq!(selector, "table.zebra");
            }
            other => panic!("expected MissingContainer, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreadable_first_page_is_parse_error() {
        let rows = vec!["<tr><td>a</td></tr>".to_string(), "<tr><td>b</td></tr>".to_string()];
        let source = FakeSource::new()
            .with_page(fixtures::profile_url("p"), Page::ok(fixtures::profile_page("p", 2)))
            .with_page(fixtures::log_url("p", 1), Page::ok(fixtures::log_page(&rows)));

        let err = scraper(source).fetch(&id("p")).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Parse(ParseError::NoReadableRows { skipped: 2, .. })));
    }

    #[tokio::test]
    async fn test_missing_table_after_first_page_ends_pagination() {
        let source = FakeSource::new()
            .with_page(fixtures::profile_url("p"), Page::ok(fixtures::profile_page("p", 2)))
            .with_page(fixtures::log_url("p", 1), Page::ok(fixtures::log_page(&fixtures::rows_for("G", 2))))
            .with_page(fixtures::log_url("p", 2), Page::ok("<html><body>No more trophies</body></html>"));

        let dataset = scraper(source).fetch(&id("p")).await.unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[tokio::test]
    async fn test_server_error_is_fetch_error() {
        let source = FakeSource::new()
            .with_page(fixtures::profile_url("p"), Page::ok(fixtures::profile_page("p", 2)))
            .with_page(fixtures::log_url("p", 1), Page::status(503));

        let err = scraper(source).fetch(&id("p")).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch(FetchError::Status { status: 503, .. })));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_profile_page_server_error_is_fetch_error() {
        let source = FakeSource::new().with_page(fixtures::profile_url("p"), Page::status(500));
        let err = scraper(source).fetch(&id("p")).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch(FetchError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_profile_without_trophies_skips_log() {
        let source = FakeSource::new()
            .with_page(fixtures::profile_url("new"), Page::ok(fixtures::profile_page("new", 0)));
        let scraper = scraper(source);

        let dataset = scraper.fetch(&id("new")).await.unwrap();
        assert!(dataset.is_empty());
        assert_eq!(scraper.source().requested().len(), 1);
    }

    #[tokio::test]
    async fn test_claimed_trophies_with_missing_log_is_parse_error() {
        let source = FakeSource::new()
            .with_page(fixtures::profile_url("p"), Page::ok(fixtures::profile_page("p", 120)));

        let err = scraper(source).fetch(&id("p")).await.unwrap_err();
        match err {
            ScrapeError::Parse(ParseError::EmptyLog { url, claimed }) => {
                assert_eq!(url, fixtures::log_url("p", 1));
                assert_eq!(claimed, 120);
            }
            other => panic!("expected EmptyLog, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_claimed_trophies_with_empty_table_is_parse_error() {
        let source = FakeSource::new()
            .with_page(fixtures::profile_url("p"), Page::ok(fixtures::profile_page("p", 3)))
            .with_page(fixtures::log_url("p", 1), Page::ok(fixtures::log_page(&[])));

        let err = scraper(source).fetch(&id("p")).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Parse(ParseError::EmptyLog { claimed: 3, .. })));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_zero_page_budget_is_parse_error() {
        let source = FakeSource::new()
            .with_page(fixtures::profile_url("p"), Page::ok(fixtures::profile_page("p", 5)));
        let config = ScraperConfig {
            max_pages: 0,
            ..test_config()
        };
        let scraper = Scraper::with_source(source, config).unwrap();

        let err = scraper.fetch(&id("p")).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Parse(ParseError::EmptyLog { .. })));
        assert_eq!(scraper.source().requested().len(), 1);
    }

    #[tokio::test]
    async fn test_max_pages_limits_requests() {
        let mut source = FakeSource::new()
            .with_page(fixtures::profile_url("p"), Page::ok(fixtures::profile_page("p", 100)));
        for page in 1..=5 {
            source = source.with_page(
                fixtures::log_url("p", page),
                Page::ok(fixtures::log_page(&fixtures::rows_for("G", 2))),
            );
        }
        let config = ScraperConfig {
            max_pages: 2,
            ..test_config()
        };
        let scraper = Scraper::with_source(source, config).unwrap();

        let dataset = scraper.fetch(&id("p")).await.unwrap();
        assert_eq!(dataset.len(), 4);
        assert_eq!(scraper.source().requested().len(), 3);
    }

    #[tokio::test]
    async fn test_progress_reports_each_page() {
        let source = FakeSource::new()
            .with_page(fixtures::profile_url("p"), Page::ok(fixtures::profile_page("p", 5)))
            .with_page(fixtures::log_url("p", 1), Page::ok(fixtures::log_page(&fixtures::rows_for("G", 3))))
            .with_page(fixtures::log_url("p", 2), Page::ok(fixtures::log_page(&fixtures::rows_for("H", 2))));

        let mut seen = Vec::new();
        scraper(source)
            .fetch_with_progress(&id("p"), |page, n| seen.push((page, n)))
            .await
            .unwrap();
        assert_eq!(seen, vec![(1, 3), (2, 2)]);
    }

    #[tokio::test]
    async fn test_identical_content_gives_identical_datasets() {
        let source = FakeSource::new()
            .with_page(fixtures::profile_url("p"), Page::ok(fixtures::profile_page("p", 4)))
            .with_page(fixtures::log_url("p", 1), Page::ok(fixtures::log_page(&fixtures::rows_for("G", 4))));
        let scraper = scraper(source);

        let first = scraper.fetch(&id("p")).await.unwrap();
        let second = scraper.fetch(&id("p")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_invalid_selector_rejected_at_construction() {
        let mut config = test_config();
        config.selectors.row = "tr[".to_string();
        let result = Scraper::with_source(FakeSource::new(), config);
        assert!(matches!(result, Err(ParseError::InvalidSelector { .. })));
    }
}
