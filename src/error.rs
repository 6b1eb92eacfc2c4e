use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("navigation to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },
    #[error("session cookie is not a valid header value: {0}")]
    Cookie(String),
}

/// Failures of the search-form fallback.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("search form not found on page")]
    FormNotFound,
    #[error("form field #{0} not found")]
    MissingField(String),
    #[error("invalid form action: {0}")]
    Action(String),
}

/// A per-person search failure. Caught by the batch driver.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("must be logged in before searching")]
    NotLoggedIn,
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("manual form submission failed: {0}")]
    Form(#[from] FormError),
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("could not read login confirmation: {0}")]
    Io(#[from] std::io::Error),
    #[error("login failed: {0}")]
    Fetch(#[from] FetchError),
}
