use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid api base url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("api base url '{0}' cannot carry a path")]
    OpaqueBaseUrl(String),
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
