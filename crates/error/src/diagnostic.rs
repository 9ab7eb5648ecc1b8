//! Error types and utilities to do with converting reported diagnostics into
//! errors.
//!
//! A diagnostic is a condition reported by running code (a warning, a notice, a
//! deprecation and so on) that does not, by itself, stop execution. When a
//! converting handler is installed on a policy, any diagnostic whose severity
//! is enabled becomes a [`ConvertedDiagnostic`] that propagates through the
//! normal [`Result`] machinery instead.

use std::{
    fmt::{Display, Formatter},
    path::{Path, PathBuf},
};

use thiserror::Error;

/// The result type for use when reporting diagnostics.
pub type Result<T> = std::result::Result<T, Error>;

/// This error type is for failures that arise while a diagnostic is being
/// reported through a policy.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A diagnostic of an enabled severity, converted into an error by the
    /// default handler.
    #[error(transparent)]
    Converted(#[from] ConvertedDiagnostic),

    /// A failure raised by a user-supplied handler that does not correspond to
    /// a single converted diagnostic.
    #[error("Diagnostic handler failed: {_0}")]
    Handler(String),
}

/// The error produced when a reported diagnostic is converted into a failure.
///
/// It carries everything that was known about the diagnostic at the point it
/// was reported, so that the code that eventually handles the error can tell
/// exactly what happened and where.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{severity}: {message} in {} on line {}", .location.file.display(), .location.line)]
pub struct ConvertedDiagnostic {
    /// The human-readable message of the diagnostic.
    pub message: String,

    /// The error code. Converted diagnostics always carry `0`.
    pub code: i64,

    /// The severity with which the diagnostic was reported.
    pub severity: Severity,

    /// Where the diagnostic originated.
    pub location: Location,
}

impl ConvertedDiagnostic {
    /// Creates a converted diagnostic with the provided `message`, `severity`
    /// and `location`, and the zero error code.
    #[must_use]
    pub fn new(message: impl Into<String>, severity: Severity, location: Location) -> Self {
        let message = message.into();
        let code = 0;
        Self {
            message,
            code,
            severity,
            location,
        }
    }
}

/// A source location that a diagnostic can be attributed to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Location {
    /// The path of the originating file.
    pub file: PathBuf,

    /// The originating line number within `file`.
    pub line: u32,
}

impl Location {
    /// Creates a new location pointing at `line` in `file`.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        let file = file.into();
        Self { file, line }
    }

    /// Gets the path of the originating file.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// The level with which a diagnostic is reported.
///
/// Each severity occupies a single bit, allowing sets of them to be described
/// by a reporting mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum Severity {
    Error = 1,
    Warning = 1 << 1,
    Parse = 1 << 2,
    Notice = 1 << 3,
    CoreError = 1 << 4,
    CoreWarning = 1 << 5,
    CompileError = 1 << 6,
    CompileWarning = 1 << 7,
    UserError = 1 << 8,
    UserWarning = 1 << 9,
    UserNotice = 1 << 10,
    Strict = 1 << 11,
    RecoverableError = 1 << 12,
    Deprecated = 1 << 13,
    UserDeprecated = 1 << 14,
}

impl Severity {
    /// Every severity, in ascending order of bit value.
    pub const ALL: [Severity; 15] = [
        Self::Error,
        Self::Warning,
        Self::Parse,
        Self::Notice,
        Self::CoreError,
        Self::CoreWarning,
        Self::CompileError,
        Self::CompileWarning,
        Self::UserError,
        Self::UserWarning,
        Self::UserNotice,
        Self::Strict,
        Self::RecoverableError,
        Self::Deprecated,
        Self::UserDeprecated,
    ];

    /// Gets the bit that represents this severity.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self as u32
    }

    /// Gets the severity represented by exactly the single bit in `bits`,
    /// returning [`None`] if `bits` does not name a severity.
    #[must_use]
    pub fn from_bits(bits: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.bits() == bits)
    }

    /// Gets the label with which diagnostics of this severity are displayed.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Error | Self::CoreError | Self::CompileError | Self::UserError => "Fatal error",
            Self::RecoverableError => "Recoverable fatal error",
            Self::Warning | Self::CoreWarning | Self::CompileWarning | Self::UserWarning => {
                "Warning"
            }
            Self::Parse => "Parse error",
            Self::Notice | Self::UserNotice => "Notice",
            Self::Strict => "Strict Standards",
            Self::Deprecated | Self::UserDeprecated => "Deprecated",
        }
    }

    /// Checks whether diagnostics of this severity are raised during startup,
    /// before any user code has had a chance to run.
    #[must_use]
    pub const fn is_startup(self) -> bool {
        matches!(self, Self::CoreError | Self::CoreWarning)
    }

    /// Checks whether this severity denotes a fatal condition.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(
            self,
            Self::Error
                | Self::Parse
                | Self::CoreError
                | Self::CompileError
                | Self::UserError
                | Self::RecoverableError
        )
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
