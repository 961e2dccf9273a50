use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("term store returned {status} for {url}: {body}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
        body: String,
    },

    #[error("invalid term store response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid identifier: {0:?}")]
    InvalidId(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TaxonomyError>;
