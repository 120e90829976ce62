//! Command-line interface parsing for trophyhunter
//!
//! This module handles parsing of CLI arguments using clap and resolves them,
//! together with environment overrides, into a `StartupConfig`.

use chrono::NaiveDate;
use clap::Parser;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::analytics::TrophyFilter;
use crate::config::{ConfigError, ScraperConfig, SelectorConfig};
use crate::data::{IdError, ProfileId, TrophyType};

/// Environment variable naming a cache directory
pub const CACHE_DIR_ENV: &str = "TROPHYHUNTER_CACHE_DIR";

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The username is not a valid PSN online ID
    #[error("Invalid username: {0}")]
    InvalidProfile(#[from] IdError),

    /// Configuration could not be assembled
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A zero timeout would fail every request
    #[error("Invalid timeout: must be at least 1 second")]
    InvalidTimeout,

    /// `--from` falls after `--to`
    #[error("Invalid date range: {from} is after {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },
}

/// Trophy Hunter - cached PSNProfiles trophy analytics
#[derive(Parser, Debug)]
#[command(name = "trophyhunter")]
#[command(about = "Fetch, cache and analyse a public PSNProfiles trophy log")]
#[command(version)]
pub struct Cli {
    /// PSN online ID of the profile to analyse
    #[arg(value_name = "USERNAME")]
    pub username: String,

    /// Scrape even if a fresh cache entry exists
    #[arg(long)]
    pub refresh: bool,

    /// Write every trophy as CSV to this file
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Cache directory (default: XDG cache dir, or $TROPHYHUNTER_CACHE_DIR)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Do not read or write the cache
    #[arg(long, conflicts_with = "cache_dir")]
    pub no_cache: bool,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// JSON file overriding the HTML selectors
    #[arg(long, value_name = "FILE")]
    pub selectors: Option<PathBuf>,

    /// Number of entries in each ranked list
    #[arg(long, value_name = "N", default_value_t = 5)]
    pub top: usize,

    /// Export only games whose title contains this text (case-insensitive)
    #[arg(long, value_name = "TEXT", requires = "csv")]
    pub game: Option<String>,

    /// Export only this grade; repeat for several
    #[arg(long = "grade", value_name = "GRADE", value_parser = parse_grade, requires = "csv")]
    pub grades: Vec<TrophyType>,

    /// Export only trophies earned on or after this day
    #[arg(long, value_name = "YYYY-MM-DD", requires = "csv")]
    pub from: Option<NaiveDate>,

    /// Export only trophies earned on or before this day
    #[arg(long, value_name = "YYYY-MM-DD", requires = "csv")]
    pub to: Option<NaiveDate>,
}

fn parse_grade(s: &str) -> Result<TrophyType, String> {
    TrophyType::from_label(s)
        .ok_or_else(|| format!("unknown grade '{s}' (expected platinum, gold, silver or bronze)"))
}

/// Where the cache lives for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheChoice {
    /// The platform cache directory
    Default,
    /// An explicit directory
    Dir(PathBuf),
    /// No caching
    Disabled,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub profile: ProfileId,
    pub scraper: ScraperConfig,
    pub cache: CacheChoice,
    pub refresh: bool,
    pub csv: Option<PathBuf>,
    /// Applied to the CSV export
    pub filter: TrophyFilter,
    pub top: usize,
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments and the process environment.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        Self::from_cli_with(cli, |var| std::env::var(var).ok())
    }

    /// Same as [`StartupConfig::from_cli`] with a custom environment
    ///
    /// Command-line flags win over environment variables.
    pub fn from_cli_with(
        cli: &Cli,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, CliError> {
        let profile = ProfileId::parse(&cli.username)?;

        let cache = if cli.no_cache {
            CacheChoice::Disabled
        } else if let Some(ref dir) = cli.cache_dir {
            CacheChoice::Dir(dir.clone())
        } else if let Some(dir) = lookup(CACHE_DIR_ENV).filter(|d| !d.is_empty()) {
            CacheChoice::Dir(PathBuf::from(dir))
        } else {
            CacheChoice::Default
        };

        let mut scraper = ScraperConfig::from_lookup(&lookup)?;
        if let Some(secs) = cli.timeout {
            if secs == 0 {
                return Err(CliError::InvalidTimeout);
            }
            scraper.request_timeout = Duration::from_secs(secs);
        }
        if let Some(ref path) = cli.selectors {
            scraper.selectors = SelectorConfig::from_file(path)?;
        }
        scraper.validate()?;

        if let (Some(from), Some(to)) = (cli.from, cli.to) {
            if from > to {
                return Err(CliError::InvalidDateRange { from, to });
            }
        }
        let filter = TrophyFilter {
            from: cli.from,
            to: cli.to,
            grades: (!cli.grades.is_empty())
                .then(|| cli.grades.iter().copied().collect::<BTreeSet<_>>()),
            game_query: cli.game.clone().filter(|q| !q.trim().is_empty()),
        };

        Ok(Self {
            profile,
            scraper,
            cache,
            refresh: cli.refresh,
            csv: cli.csv.clone(),
            filter,
            top: cli.top,
        })
    }
}
