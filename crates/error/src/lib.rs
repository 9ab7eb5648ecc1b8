//! Error handling types and utilities.
//!
//! # Error Conventions
//!
//! As we are providing a library that others may want to interact with from
//! _code_, we keep our errors strongly typed at all times. While libraries like
//! [anyhow](https://docs.rs/anyhow/latest/anyhow/) are well-suited for
//! application code, they make it more difficult than is necessary to handle
//! specific errors in library code. This matters doubly here, as the whole
//! point of a converted diagnostic is that the caller can match on it and
//! inspect where it came from.
//!
//! The errors are split by concern:
//!
//! - [`diagnostic`] contains the errors raised when a reported diagnostic is
//!   turned into a failure by a handler, along with the [`Severity`] and
//!   [`Location`] data that those errors carry.
//! - [`output`] contains the errors that can occur while capturing the direct
//!   output of a function.

#![warn(clippy::all, clippy::cargo, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)] // Allows for better API naming
#![allow(clippy::multiple_crate_versions)] // Enforced by our dependencies

pub mod diagnostic;
pub mod output;

use thiserror::Error;

pub use crate::diagnostic::{ConvertedDiagnostic, Location, Severity};

/// The result type to be used at the boundaries of the library.
pub type Result<T> = std::result::Result<T, Error>;

/// The root of the error hierarchy for this crate.
///
/// All errors should be able to be implicitly converted to this error type as
/// this is the type that is used at the boundaries of the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Diagnostic(#[from] diagnostic::Error),

    #[error(transparent)]
    Output(#[from] output::Error),
}

impl Error {
    /// Gets the converted diagnostic underlying this error, if it is one.
    #[must_use]
    pub fn as_converted(&self) -> Option<&ConvertedDiagnostic> {
        match self {
            Self::Diagnostic(diagnostic::Error::Converted(converted)) => Some(converted),
            _ => None,
        }
    }
}

impl From<ConvertedDiagnostic> for Error {
    fn from(value: ConvertedDiagnostic) -> Self {
        Self::Diagnostic(value.into())
    }
}
