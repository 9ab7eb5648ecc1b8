//! This library provides a small set of helpers for normalizing how running
//! code reports problems, and for capturing what it writes.
//!
//! It addresses two recurring needs:
//!
//! 1. Turning _diagnostics_ (warnings, notices, deprecations and the like,
//!    which on their own do not stop execution) into proper errors, so that
//!    code can fail fast on anything it has been told to care about.
//! 2. Running a function while redirecting its direct output into a string.
//!
//! # Explicit Context
//!
//! Neither of these relies on process-wide state. Reporting configuration and
//! the active handler live in a [`DiagnosticPolicy`] value, and output goes to
//! an [`OutputChannel`] value, both of which are threaded through the program
//! by the caller. This keeps behaviour local and easy to test, and means that
//! the restore-on-exit discipline of captures is enforced by the borrow
//! checker and [`Drop`] rather than by convention.
//!
//! # Usage
//!
//! ```
//! use diagshim::{catch_output, diagnostic, errors::Severity, DiagnosticPolicy, OutputChannel};
//!
//! let mut policy = DiagnosticPolicy::default();
//! policy.set_default_error_handling();
//!
//! let mut output = OutputChannel::buffer();
//! let result = policy.report(&diagnostic!(Severity::Notice, "Undefined offset: 3"), &mut output);
//! assert!(result.unwrap_err().as_converted().is_some());
//!
//! let text = catch_output(&mut output, |out| out.print("hello")).unwrap();
//! assert_eq!(text, "hello");
//! ```

#![warn(clippy::all, clippy::cargo, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)] // Allows for better API naming
#![allow(clippy::multiple_crate_versions)] // Enforced by our dependencies

pub mod diagnostic;
pub mod handler;
pub mod mask;
pub mod output;
pub mod policy;
pub mod settings;

pub use diagshim_errors as errors;

pub use crate::{
    diagnostic::Diagnostic,
    handler::{error_handler, ConvertToError, DiagnosticHandler, Handler},
    mask::ReportingMask,
    output::{catch_output, catch_output_with, OutputCapture, OutputChannel},
    policy::{DiagnosticPolicy, Disposition},
    settings::ReportingSettings,
};
