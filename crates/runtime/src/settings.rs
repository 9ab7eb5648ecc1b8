//! Configuration for how reported diagnostics are treated when no handler
//! deals with them.

use diagshim_errors::Severity;

use crate::mask::ReportingMask;

/// The reporting configuration of a [`crate::DiagnosticPolicy`].
///
/// The mask decides which severities are enabled at all, while the display
/// toggles decide whether enabled diagnostics that fall through to the default
/// behaviour are written to the output channel.
///
/// # API Style
///
/// The `with_*` methods consume `self` and are hence designed to have calls
/// chained in the "fluent" API style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReportingSettings {
    /// The severities currently enabled for reporting.
    pub mask: ReportingMask,

    /// Whether enabled diagnostics are displayed on the output channel.
    pub display_errors: bool,

    /// Whether enabled diagnostics raised during startup are displayed on the
    /// output channel.
    pub display_startup_errors: bool,
}

impl ReportingSettings {
    /// Creates settings that report and display every severity.
    #[must_use]
    pub fn show_all() -> Self {
        Self::default()
            .with_mask(ReportingMask::ALL)
            .with_display_errors(true)
            .with_display_startup_errors(true)
    }

    /// Specifies the reporting mask.
    #[must_use]
    pub fn with_mask(mut self, mask: ReportingMask) -> Self {
        self.mask = mask;
        self
    }

    /// Specifies whether diagnostics are displayed.
    #[must_use]
    pub fn with_display_errors(mut self, display: bool) -> Self {
        self.display_errors = display;
        self
    }

    /// Specifies whether startup diagnostics are displayed.
    #[must_use]
    pub fn with_display_startup_errors(mut self, display: bool) -> Self {
        self.display_startup_errors = display;
        self
    }

    /// Checks whether an enabled diagnostic of the given `severity` should be
    /// written to the output channel.
    #[must_use]
    pub fn displays(&self, severity: Severity) -> bool {
        if severity.is_startup() {
            self.display_startup_errors
        } else {
            self.display_errors
        }
    }
}

impl Default for ReportingSettings {
    /// Returns the runtime defaults: the [`ReportingMask::RUNTIME_DEFAULT`]
    /// mask with display turned off.
    fn default() -> Self {
        Self {
            mask: ReportingMask::RUNTIME_DEFAULT,
            display_errors: false,
            display_startup_errors: false,
        }
    }
}

#[cfg(test)]
mod test {
    use diagshim_errors::Severity;

    use crate::{mask::ReportingMask, settings::ReportingSettings};

    #[test]
    fn defaults_display_nothing() {
        let settings = ReportingSettings::default();

        assert_eq!(settings.mask, ReportingMask::RUNTIME_DEFAULT);
        assert!(!settings.displays(Severity::Warning));
        assert!(!settings.displays(Severity::CoreWarning));
    }

    #[test]
    fn startup_display_is_toggled_separately() {
        let settings = ReportingSettings::default().with_display_errors(true);

        assert!(settings.displays(Severity::Warning));
        assert!(!settings.displays(Severity::CoreError));

        let settings = settings.with_display_startup_errors(true);
        assert!(settings.displays(Severity::CoreError));
    }

    #[test]
    fn show_all_enables_everything() {
        let settings = ReportingSettings::show_all();

        assert_eq!(settings.mask, ReportingMask::ALL);
        assert!(settings.display_errors);
        assert!(settings.display_startup_errors);
    }
}
