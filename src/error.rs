//! Error taxonomy for the vacancy pipeline

use thiserror::Error;

/// A page could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// A page was retrieved but the structure the run depends on is missing.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("pagination control not found")]
    MissingPagination,

    #[error("pagination label `{0}` is not a positive page count")]
    InvalidPageCount(String),
}

/// Conditions that abort a whole run.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("could not fetch the listing page: {0}")]
    BootstrapFetch(#[from] FetchError),

    #[error("could not determine the number of listing pages: {0}")]
    BootstrapParse(#[from] ParseError),
}
