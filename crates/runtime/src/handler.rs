//! Diagnostic handlers are the objects that a [`crate::DiagnosticPolicy`]
//! hands every reported diagnostic to.
//!
//! A handler answers a single question: given a diagnostic and the reporting
//! mask in effect, has it dealt with the diagnostic? It can answer in three
//! ways:
//!
//! - `Ok(true)` means the diagnostic was handled and nothing further happens.
//! - `Ok(false)` means it was not handled, and the policy falls through to the
//!   default behaviour (see [`crate::policy`]).
//! - `Err(_)` means the diagnostic was turned into a failure that propagates to
//!   the code that reported it.
//!
//! The handler used by default is [`ConvertToError`], which fails fast on any
//! diagnostic enabled by the mask and ignores the rest. Any closure with the
//! right signature is a handler as well; [`from_fn`] is the easiest way to
//! build one.

use std::{any::Any, sync::Arc};

use diagshim_errors::diagnostic::Result;
use downcast_rs::Downcast;

use crate::{diagnostic::Diagnostic, mask::ReportingMask};

/// A shared reference to an installed handler.
///
/// Handlers are compared by identity, so the same `Handler` that was installed
/// is the one that is handed back when it is replaced.
pub type Handler = Arc<dyn DiagnosticHandler>;

/// The operations that we expect of a diagnostic handler.
///
/// # Self Bounds
///
/// - [`Any`] and [`Downcast`] allow checking which concrete handler is
///   installed, and getting at it if needed.
/// - [`Send`] and [`Sync`] allow a policy to be moved to, and shared with,
///   other threads.
pub trait DiagnosticHandler
where
    Self: Any + Downcast + Send + Sync,
{
    /// Handles the reported `diagnostic` under the reporting `mask` that is
    /// currently in effect, returning whether it was handled.
    ///
    /// # Errors
    ///
    /// - [`diagshim_errors::diagnostic::Error`] if the handler decides that
    ///   the diagnostic should become a failure.
    fn handle(&self, diagnostic: &Diagnostic, mask: ReportingMask) -> Result<bool>;
}

/// Operations implemented on `dyn DiagnosticHandler` are **only** available on
/// the trait object.
impl dyn DiagnosticHandler {
    /// Checks if the handler is an instance of the concrete handler `T`,
    /// returning `true` if it is and `false` otherwise.
    pub fn is<T: DiagnosticHandler>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Allows you to view the dynamic handler `self` as the concrete handler
    /// type `T`, returning a `&T` if possible and `None` otherwise.
    pub fn view_as<T: DiagnosticHandler>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

impl<F> DiagnosticHandler for F
where
    F: Fn(&Diagnostic, ReportingMask) -> Result<bool> + Send + Sync + 'static,
{
    fn handle(&self, diagnostic: &Diagnostic, mask: ReportingMask) -> Result<bool> {
        self(diagnostic, mask)
    }
}

/// Wraps the provided function `f` into a [`Handler`] that can be installed.
///
/// ```
/// use diagshim::{handler, DiagnosticPolicy};
///
/// let mut policy = DiagnosticPolicy::default();
/// policy.set_error_handler(Some(handler::from_fn(|_, _| Ok(true))));
///
/// assert!(policy.handler().is_some());
/// ```
pub fn from_fn<F>(f: F) -> Handler
where
    F: Fn(&Diagnostic, ReportingMask) -> Result<bool> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// The default handler, converting every diagnostic enabled by the reporting
/// mask into a [`diagshim_errors::ConvertedDiagnostic`].
///
/// This is a fail-fast policy: there is no recovery inside the handler, and
/// the error is left to propagate to whatever code reported the diagnostic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConvertToError;

impl ConvertToError {
    /// The name under which the default handler is known.
    pub const NAME: &'static str = "error_handler";

    /// Creates a new instance of the default handler ready for installation.
    #[must_use]
    pub fn handler() -> Handler {
        Arc::new(Self)
    }
}

impl DiagnosticHandler for ConvertToError {
    fn handle(&self, diagnostic: &Diagnostic, mask: ReportingMask) -> Result<bool> {
        error_handler(diagnostic, mask)
    }
}

/// The default handler implementation.
///
/// If the severity of `diagnostic` is not included in `mask` it returns
/// `Ok(false)`, signalling that it was not handled. This allows callers to
/// suppress particular severities through the mask while the handler stays
/// installed.
///
/// Being a plain function, it is also usable directly as a handler via
/// [`from_fn`].
///
/// # Errors
///
/// - [`diagshim_errors::diagnostic::Error::Converted`] carrying the message,
///   a zero code, the severity and the location of `diagnostic`, whenever its
///   severity is included in `mask`.
pub fn error_handler(diagnostic: &Diagnostic, mask: ReportingMask) -> Result<bool> {
    if !mask.contains(diagnostic.severity) {
        return Ok(false);
    }

    Err(diagnostic.to_converted().into())
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use diagshim_errors::{diagnostic::Error, Location, Severity};

    use crate::{
        diagnostic::Diagnostic,
        handler::{error_handler, from_fn, ConvertToError, Handler},
        mask::ReportingMask,
    };

    fn diagnostic_of(severity: Severity) -> Diagnostic {
        Diagnostic::new(severity, "Something odd", Location::new("src/app.php", 99))
    }

    #[test]
    fn enabled_severities_are_converted() {
        for severity in Severity::ALL {
            let diag = diagnostic_of(severity);
            let Err(Error::Converted(converted)) = error_handler(&diag, ReportingMask::ALL) else {
                panic!("{severity:?} was not converted");
            };

            assert_eq!(converted.message, "Something odd");
            assert_eq!(converted.code, 0);
            assert_eq!(converted.severity, severity);
            assert_eq!(converted.location, Location::new("src/app.php", 99));
        }
    }

    #[test]
    fn disabled_severities_are_not_handled() {
        for severity in Severity::ALL {
            let mask = ReportingMask::ALL.without(severity);
            let diag = diagnostic_of(severity);

            assert_eq!(error_handler(&diag, mask), Ok(false));
            assert_eq!(error_handler(&diag, ReportingMask::NONE), Ok(false));
        }
    }

    #[test]
    fn handler_objects_behave_like_the_function() {
        let by_object = ConvertToError::handler();
        let by_function = from_fn(error_handler);
        let diag = diagnostic_of(Severity::Notice);
        let mask = ReportingMask::from(Severity::Warning);

        assert_eq!(by_object.handle(&diag, mask), Ok(false));
        assert_eq!(by_function.handle(&diag, mask), Ok(false));
        assert_eq!(
            by_object.handle(&diag, ReportingMask::ALL),
            by_function.handle(&diag, ReportingMask::ALL)
        );
    }

    #[test]
    fn handlers_can_be_identified() {
        let default: Handler = ConvertToError::handler();
        let custom: Handler = from_fn(|_, _| Ok(true));

        assert!(default.is::<ConvertToError>());
        assert!(default.view_as::<ConvertToError>().is_some());
        assert!(!custom.is::<ConvertToError>());
        assert!(!Arc::ptr_eq(&default, &ConvertToError::handler()));
    }
}
