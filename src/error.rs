use thiserror::Error;

/// Failure kinds that callers need to tell apart.
///
/// Gateway and handler code returns `anyhow::Result` and raises one of these
/// where the HTTP layer maps the failure to a specific status code; anything
/// else collapses to a generic internal error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Participant store is unavailable: {0}")]
    StoreUnavailable(String),

    #[error("{0}")]
    InvalidRegistration(String),

    #[error("Cannot draw {requested} winners from a roster of {available}")]
    DrawTooLarge { requested: usize, available: usize },

    #[error("HTTP Error: {0}")]
    Http(#[from] reqwest::Error),
}
