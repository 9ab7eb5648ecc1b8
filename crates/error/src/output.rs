//! Error types and utilities to do with capturing the direct output of a
//! function.

use std::string::FromUtf8Error;

use thiserror::Error;

/// The result type for use when working with output channels.
pub type Result<T> = std::result::Result<T, Error>;

/// This error type is for failures while writing to, or capturing from, an
/// output channel.
#[derive(Debug, Error)]
pub enum Error {
    /// The captured bytes could not be interpreted as UTF-8 text.
    #[error("Captured output was not valid UTF-8: {_0}")]
    NonUtf8Output(#[from] FromUtf8Error),

    /// An error when writing to the sink underlying an output channel.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Gets the raw bytes that were captured, if the failure was that they
    /// were not valid UTF-8.
    #[must_use]
    pub fn captured_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::NonUtf8Output(e) => Some(e.as_bytes()),
            Self::Io(_) => None,
        }
    }
}
