//! Error types for Hooktap.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed body: {0}")]
    MalformedBody(String),

    #[error("body of {size} bytes exceeds the {limit} byte limit")]
    BodyTooLarge { size: usize, limit: usize },

    #[error("unknown service '{0}' (expected generic, pre-send, or post-send)")]
    UnknownService(String),
}
