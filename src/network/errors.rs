use thiserror::Error;

// * Unified Error type for the Network Layer.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("HTTP {0} Forbidden/Blocked")]
    Blocked(u16),

    #[error("HTTP {0} returned by server")]
    Status(u16),

    #[error("Empty response body")]
    EmptyResponse,

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}
