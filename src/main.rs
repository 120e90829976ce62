//! Trophy Hunter - cached PSNProfiles trophy analytics
//!
//! Loads a profile's trophy log (from cache when fresh, otherwise by scraping)
//! and prints a summary report, optionally exporting every trophy as CSV.

use std::io;
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use trophyhunter::cache::CacheStore;
use trophyhunter::cli::{CacheChoice, Cli, StartupConfig};
use trophyhunter::export;
use trophyhunter::provider::TrophyProvider;
use trophyhunter::report;
use trophyhunter::scrape::Scraper;

/// Logs go to stderr so the report on stdout stays clean.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "trophyhunter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn cache_for(choice: &CacheChoice) -> Option<CacheStore> {
    match choice {
        CacheChoice::Disabled => None,
        CacheChoice::Dir(dir) => Some(CacheStore::with_dir(dir.clone())),
        CacheChoice::Default => CacheStore::shared().cloned(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let startup = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };

    match run(startup).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(startup: StartupConfig) -> Result<(), String> {
    let scraper = Scraper::new(startup.scraper).map_err(|e| e.user_message())?;
    let provider = TrophyProvider::new(scraper, cache_for(&startup.cache));

    let result = if startup.refresh {
        provider
            .refresh_with_progress(&startup.profile, |page, rows| {
                info!(page, rows, "scraped page");
            })
            .await
    } else {
        provider.load(&startup.profile).await
    };
    let loaded = result.map_err(|e| {
        error!(
            profile = %startup.profile,
            error = %e,
            retryable = e.is_retryable(),
            "load failed"
        );
        e.user_message()
    })?;

    print!(
        "{}",
        report::render(&loaded, startup.top, Local::now().date_naive())
    );

    if let Some(ref path) = startup.csv {
        let records = startup.filter.apply(&loaded.dataset);
        let rows = records.len();
        export::write_csv_file(path, records)
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
        info!(
            path = %path.display(),
            rows,
            filtered_out = loaded.dataset.len() - rows,
            "csv written"
        );
    }

    Ok(())
}
