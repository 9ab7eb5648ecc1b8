//! The diagnostic policy decides what happens to every diagnostic reported by
//! running code.
//!
//! # Reporting
//!
//! When a diagnostic is [reported](DiagnosticPolicy::report), the policy first
//! hands it to the installed handler, if any. Should the handler decline it
//! (or should there be no handler at all), the default behaviour applies:
//!
//! 1. Diagnostics whose severity is not in the reporting mask are suppressed.
//! 2. Everything else is logged, and additionally written to the output
//!    channel if the settings ask for diagnostics of its class to be
//!    displayed.
//!
//! # The Handler Slot
//!
//! A policy holds at most one active handler, plus the single handler that it
//! displaced. Installing a handler always returns the one it replaced, so
//! callers can put things back exactly as they were, and
//! [`DiagnosticPolicy::restore_error_handler`] does this for them.

use std::fmt::Formatter;

use derivative::Derivative;
use diagshim_errors::{Result, Severity};
use tracing::{debug, error, info, trace, warn};

use crate::{
    diagnostic::Diagnostic,
    handler::{ConvertToError, Handler},
    mask::ReportingMask,
    output::OutputChannel,
    settings::ReportingSettings,
};

/// What became of a reported diagnostic that did not turn into an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// The installed handler dealt with the diagnostic.
    Handled,

    /// The diagnostic was logged and written to the output channel.
    Displayed,

    /// The diagnostic was logged only.
    Logged,

    /// The diagnostic was not enabled by the reporting mask.
    Suppressed,
}

/// The explicit context object that holds reporting settings and the handler
/// slot, in place of process-wide state.
#[derive(Clone, Derivative, Default)]
#[derivative(Debug)]
pub struct DiagnosticPolicy {
    settings: ReportingSettings,

    #[derivative(Debug(format_with = "fmt_handler"))]
    handler: Option<Handler>,

    #[derivative(Debug(format_with = "fmt_handler"))]
    previous: Option<Handler>,
}

impl DiagnosticPolicy {
    /// Creates a policy with the provided `settings` and no handler installed.
    #[must_use]
    pub fn new(settings: ReportingSettings) -> Self {
        let handler = None;
        let previous = None;
        Self {
            settings,
            handler,
            previous,
        }
    }

    /// Gets the current reporting settings.
    #[must_use]
    pub fn settings(&self) -> &ReportingSettings {
        &self.settings
    }

    /// Replaces the reporting settings, returning the ones that were in effect.
    pub fn set_settings(&mut self, settings: ReportingSettings) -> ReportingSettings {
        std::mem::replace(&mut self.settings, settings)
    }

    /// Gets the current reporting mask.
    #[must_use]
    pub fn mask(&self) -> ReportingMask {
        self.settings.mask
    }

    /// Sets the reporting mask, returning the mask that was in effect.
    pub fn set_mask(&mut self, mask: ReportingMask) -> ReportingMask {
        debug!(%mask, "Setting reporting mask");
        std::mem::replace(&mut self.settings.mask, mask)
    }

    /// Gets the active handler, if there is one.
    #[must_use]
    pub fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    /// Checks whether the active handler is the default [`ConvertToError`]
    /// handler.
    #[must_use]
    pub fn is_converting(&self) -> bool {
        self.handler.as_ref().is_some_and(|h| h.is::<ConvertToError>())
    }

    /// Makes every diagnostic both reported and displayed, startup ones
    /// included.
    pub fn show_all_errors(&mut self) {
        debug!("Showing all diagnostics");
        self.settings = ReportingSettings::show_all();
    }

    /// Installs the default [`ConvertToError`] handler, returning the handler
    /// that it replaced.
    pub fn convert_all_errors(&mut self) -> Option<Handler> {
        self.set_error_handler(Some(ConvertToError::handler()))
    }

    /// Shows all diagnostics and converts all of them into errors.
    ///
    /// Calling this repeatedly leaves the policy in the same state, apart from
    /// the saved previous handler.
    pub fn set_default_error_handling(&mut self) -> Option<Handler> {
        self.show_all_errors();
        self.convert_all_errors()
    }

    /// Installs `handler` as the active handler, or reverts to the default
    /// behaviour if it is [`None`].
    ///
    /// Returns the handler that was active before, which is also saved so that
    /// [`Self::restore_error_handler`] can reinstate it.
    pub fn set_error_handler(&mut self, handler: Option<Handler>) -> Option<Handler> {
        debug!(
            installing = handler.is_some(),
            replacing = self.handler.is_some(),
            "Setting diagnostic handler"
        );
        let displaced = std::mem::replace(&mut self.handler, handler);
        self.previous.clone_from(&displaced);
        displaced
    }

    /// Removes the active handler, restoring the default behaviour, and
    /// returns the handler that was removed.
    ///
    /// This does not reinstate any earlier handler: after installing `g` and
    /// then `h`, unsetting leaves no handler active. Use
    /// [`Self::restore_error_handler`] to put `g` back instead.
    pub fn unset_error_handler(&mut self) -> Option<Handler> {
        self.set_error_handler(None)
    }

    /// Reinstates the handler that was active before the last call to
    /// [`Self::set_error_handler`], returning the handler that it displaces.
    ///
    /// Only one previous handler is remembered. Once it has been restored,
    /// restoring again reverts to the default behaviour.
    pub fn restore_error_handler(&mut self) -> Option<Handler> {
        let previous = self.previous.take();
        debug!(restoring = previous.is_some(), "Restoring diagnostic handler");
        std::mem::replace(&mut self.handler, previous)
    }

    /// Reports `diagnostic` through the policy, writing it to `output` if it
    /// falls through to the default behaviour and is to be displayed.
    ///
    /// # Errors
    ///
    /// - [`diagshim_errors::diagnostic::Error`] if the active handler turns the
    ///   diagnostic into a failure.
    /// - [`diagshim_errors::output::Error`] if the diagnostic could not be
    ///   written to `output`.
    pub fn report(&self, diagnostic: &Diagnostic, output: &mut OutputChannel) -> Result<Disposition> {
        let mask = self.mask();
        if let Some(handler) = &self.handler {
            if handler.handle(diagnostic, mask)? {
                return Ok(Disposition::Handled);
            }
        }

        if !mask.contains(diagnostic.severity) {
            trace!(severity = ?diagnostic.severity, %mask, "Suppressed diagnostic");
            return Ok(Disposition::Suppressed);
        }

        log_diagnostic(diagnostic);
        if self.settings.displays(diagnostic.severity) {
            output.print(format!("{diagnostic}\n"))?;
            Ok(Disposition::Displayed)
        } else {
            Ok(Disposition::Logged)
        }
    }
}

/// Emits `diagnostic` as a log event at a level matching its severity.
fn log_diagnostic(diagnostic: &Diagnostic) {
    let Diagnostic {
        severity,
        message,
        location,
    } = diagnostic;
    match severity {
        s if s.is_fatal() => error!(severity = ?s, %location, "{message}"),
        Severity::Warning
        | Severity::CoreWarning
        | Severity::CompileWarning
        | Severity::UserWarning => warn!(severity = ?severity, %location, "{message}"),
        _ => info!(severity = ?severity, %location, "{message}"),
    }
}

fn fmt_handler(handler: &Option<Handler>, f: &mut Formatter<'_>) -> std::fmt::Result {
    match handler {
        None => f.write_str("None"),
        Some(h) if h.is::<ConvertToError>() => write!(f, "Some({})", ConvertToError::NAME),
        Some(_) => f.write_str("Some(<custom>)"),
    }
}
