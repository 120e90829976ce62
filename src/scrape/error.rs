//! Scrape error taxonomy
//!
//! `FetchError` covers everything that went wrong getting a page (usually worth
//! retrying later); `ParseError` means the page arrived but no longer looks like
//! what the parser expects (needs a code or selector update).

use thiserror::Error;

/// Failures retrieving upstream pages
#[derive(Debug, Error)]
pub enum FetchError {
    /// The upstream has no public profile with this ID
    #[error("Profile '{0}' was not found")]
    ProfileNotFound(String),

    /// The upstream answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The request did not complete within the configured timeout
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// Connection, TLS or body read failure
    #[error("HTTP request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Upstream markup no longer matches the configured schema
#[derive(Debug, Error)]
pub enum ParseError {
    /// A container the parser relies on is absent
    #[error("Expected '{selector}' on {url} but it was not there")]
    MissingContainer { url: String, selector: String },

    /// A required field is absent from an otherwise recognisable page
    #[error("Expected {field} on the page but it was not there")]
    MissingField { field: &'static str },

    /// A numeric field held something that is not a number
    #[error("Could not read {field} from '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    /// The trophy table was found but none of its rows could be read
    #[error("None of the {skipped} trophy rows on {url} could be read")]
    NoReadableRows { url: String, skipped: usize },

    /// The profile reports trophies but its log yielded none
    #[error("Profile reports {claimed} trophies but the trophy log at {url} listed none")]
    EmptyLog { url: String, claimed: u32 },

    /// A configured selector is not valid CSS
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Any failure of a scrape
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl ScrapeError {
    /// Whether trying again later might succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ScrapeError::Fetch(FetchError::ProfileNotFound(_)) => false,
            ScrapeError::Fetch(FetchError::Client(_)) => false,
            ScrapeError::Fetch(_) => true,
            ScrapeError::Parse(_) => false,
        }
    }

    /// Message suitable for showing to the end user
    pub fn user_message(&self) -> String {
        match self {
            ScrapeError::Fetch(FetchError::ProfileNotFound(id)) => format!(
                "Could not find profile for '{id}'. Please check the username and try again."
            ),
            ScrapeError::Fetch(e) => {
                format!("A network error occurred, please try again later. ({e})")
            }
            ScrapeError::Parse(e) => format!(
                "The trophy site's format seems to have changed; this tool needs updating. Please report it. ({e})"
            ),
        }
    }
}
