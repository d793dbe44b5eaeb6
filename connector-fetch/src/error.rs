use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("unexpected response status code: {0}")]
    UnexpectedStatus(u16),

    #[error("unmarshal response body: {0}")]
    DecodeError(#[from] serde_json::Error),

    #[error("GET {url} giving up after {attempts} attempt(s): {last_error}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },
}

pub type Result<T> = std::result::Result<T, FetchError>;
