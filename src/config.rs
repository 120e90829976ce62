//! Scraper configuration
//!
//! Everything that depends on the upstream site's markup or etiquette lives
//! here: URLs, timeouts, pacing, CSS selectors and the rarity threshold table.
//! Defaults target PSNProfiles; environment variables and a JSON selector file
//! can override them without a rebuild.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::data::RarityThresholds;
use crate::scrape::{ParseError, Schema};

/// Default upstream site
pub const DEFAULT_BASE_URL: &str = "https://psnprofiles.com";

/// Default User-Agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("trophyhunter/", env!("CARGO_PKG_VERSION"));

/// Errors raised while building configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value of the wrong shape
    #[error("Invalid value '{value}' for {var}")]
    InvalidValue { var: &'static str, value: String },

    /// The selector file could not be read
    #[error("Failed to read selector file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The selector file is not valid JSON for `SelectorConfig`
    #[error("Invalid selector file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A configured selector is not valid CSS
    #[error("Invalid selector configuration: {0}")]
    Selector(#[source] ParseError),

    /// Rarity thresholds are not strictly ascending
    #[error("Rarity thresholds must be strictly ascending")]
    UnorderedThresholds,
}

/// CSS selectors and column positions used to read upstream pages
///
/// Row-level selectors are evaluated inside the table cell at the given
/// column index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Container holding the profile header; its absence means "no such profile"
    pub user_bar: String,
    pub username: String,
    pub avatar: String,
    pub total: String,
    pub platinum: String,
    pub gold: String,
    pub silver: String,
    pub bronze: String,
    /// Individual profile statistics; the label is a nested element
    pub stat: String,
    pub stat_label: String,

    /// Trophy log table; its absence on the first page is a format change
    pub trophy_table: String,
    pub row: String,
    pub cell: String,
    /// Rows with fewer data cells are malformed
    pub min_cells: usize,

    pub game_column: usize,
    /// Element whose `title` attribute holds the game name
    pub game: String,
    pub icon_column: usize,
    pub icon: String,
    pub title_column: usize,
    pub title: String,
    pub date_column: usize,
    pub date: String,
    pub time: String,
    pub rarity_column: usize,
    pub rarity: String,
    pub grade_column: usize,
    /// Element whose `title` attribute holds the grade name
    pub grade: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            user_bar: "#user-bar".to_string(),
            username: "span.username".to_string(),
            avatar: "div.avatar img".to_string(),
            total: "li.total".to_string(),
            platinum: "li.platinum".to_string(),
            gold: "li.gold".to_string(),
            silver: "li.silver".to_string(),
            bronze: "li.bronze".to_string(),
            stat: "div.stats span.stat".to_string(),
            stat_label: "span".to_string(),

            trophy_table: "table.zebra".to_string(),
            row: "tr".to_string(),
            cell: "td".to_string(),
            min_cells: 10,

            game_column: 0,
            game: "img".to_string(),
            icon_column: 1,
            icon: "img".to_string(),
            title_column: 2,
            title: "a.title".to_string(),
            date_column: 5,
            date: "span.typo-top-date".to_string(),
            time: "span.typo-bottom-date".to_string(),
            rarity_column: 8,
            rarity: "span.typo-top".to_string(),
            grade_column: 9,
            grade: "img".to_string(),
        }
    }
}

impl SelectorConfig {
    /// Loads selectors from a JSON file; omitted fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: display,
            source,
        })
    }
}

/// Settings for a scraper instance
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Site root, without trailing slash
    pub base_url: String,
    /// User-Agent header
    pub user_agent: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Pause between trophy log pages
    pub page_delay: Duration,
    /// Upper bound on trophy log pages fetched per profile
    pub max_pages: u32,
    /// Markup schema
    pub selectors: SelectorConfig,
    /// Rarity tier cut-offs
    pub rarity: RarityThresholds,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(15),
            page_delay: Duration::from_millis(1500),
            max_pages: 200,
            selectors: SelectorConfig::default(),
            rarity: RarityThresholds::default(),
        }
    }
}

impl ScraperConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                  |
    /// |------------------------------|--------------------------|
    /// | `TROPHYHUNTER_BASE_URL`      | `https://psnprofiles.com`|
    /// | `TROPHYHUNTER_TIMEOUT_SECS`  | `15`                     |
    /// | `TROPHYHUNTER_PAGE_DELAY_MS` | `1500`                   |
    /// | `TROPHYHUNTER_MAX_PAGES`     | `200`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`ScraperConfig::from_env`] with a custom variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup("TROPHYHUNTER_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "TROPHYHUNTER_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "TROPHYHUNTER_PAGE_DELAY_MS")? {
            config.page_delay = Duration::from_millis(ms);
        }
        if let Some(pages) = parse_var::<u32>(&lookup, "TROPHYHUNTER_MAX_PAGES")? {
            config.max_pages = pages;
        }

        Ok(config)
    }

    /// Rejects settings that would make the scraper misbehave
    ///
    /// Also compiles the selectors, so a bad selector file is reported as
    /// configuration trouble rather than as an upstream format change.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                var: "TROPHYHUNTER_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }
        if self.max_pages == 0 {
            return Err(ConfigError::InvalidValue {
                var: "TROPHYHUNTER_MAX_PAGES",
                value: "0".to_string(),
            });
        }
        if !self.rarity.is_ordered() {
            return Err(ConfigError::UnorderedThresholds);
        }
        Schema::compile(&self.selectors).map_err(ConfigError::Selector)?;
        Ok(())
    }

    /// URL of a profile's main page
    pub fn profile_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), id)
    }

    /// URL of one page of a profile's trophy log (1-based)
    pub fn log_url(&self, id: &str, page: u32) -> String {
        format!("{}/log?page={}", self.profile_url(id), page)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value }),
    }
}
