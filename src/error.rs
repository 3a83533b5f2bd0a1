//! Error types for the remote client and the reader.

use thiserror::Error;

/// Failures talking to the profile feed endpoint.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReaderError {
    /// Another `show_data` call still holds the reader.
    #[error("A load is already in progress")]
    Busy,
}
