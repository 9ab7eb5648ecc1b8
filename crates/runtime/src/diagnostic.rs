//! The diagnostic value that running code reports through a policy.

use std::fmt::{Display, Formatter};

use diagshim_errors::{ConvertedDiagnostic, Location, Severity};

/// A condition reported by running code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// The level with which the diagnostic is reported.
    pub severity: Severity,

    /// The human-readable message.
    pub message: String,

    /// Where the diagnostic was raised.
    pub location: Location,
}

impl Diagnostic {
    /// Creates a new diagnostic of the given `severity`, carrying `message`
    /// and attributed to `location`.
    #[must_use]
    pub fn new(severity: Severity, message: impl Into<String>, location: Location) -> Self {
        let message = message.into();
        Self {
            severity,
            message,
            location,
        }
    }

    /// Converts the diagnostic into the error that represents it when it is
    /// turned into a failure.
    #[must_use]
    pub fn to_converted(&self) -> ConvertedDiagnostic {
        ConvertedDiagnostic::new(self.message.clone(), self.severity, self.location.clone())
    }
}

impl Display for Diagnostic {
    /// Renders the diagnostic the way it is displayed on an output channel.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} in {} on line {}",
            self.severity,
            self.message,
            self.location.file.display(),
            self.location.line
        )
    }
}

/// Builds a [`Diagnostic`] attributed to the file and line at which the macro
/// is invoked.
///
/// ```
/// use diagshim::{diagnostic, errors::Severity};
///
/// let diag = diagnostic!(Severity::Notice, "Undefined index: {}", "name");
///
/// assert_eq!(diag.message, "Undefined index: name");
/// assert!(diag.location.line > 0);
/// ```
#[macro_export]
macro_rules! diagnostic {
    ($severity:expr, $($arg:tt)+) => {
        $crate::Diagnostic::new(
            $severity,
            format!($($arg)+),
            $crate::errors::Location::new(file!(), line!()),
        )
    };
}
