//! The reporting mask describes the set of severities that are currently
//! considered enabled for reporting.

use std::{
    fmt::{Display, Formatter},
    ops::{BitOr, BitOrAssign},
};

use diagshim_errors::Severity;
use itertools::Itertools;

/// A set of [`Severity`] values, stored as the union of their bits.
///
/// Bits that do not correspond to any severity are never stored, so two masks
/// compare equal exactly when they enable the same severities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ReportingMask {
    bits: u32,
}

impl ReportingMask {
    /// The mask that enables every severity.
    pub const ALL: Self = Self { bits: 0x7fff };

    /// The mask that enables no severity at all.
    pub const NONE: Self = Self { bits: 0 };

    /// The mask in effect before anything has been configured: everything but
    /// notices, strict-standards hints and deprecations.
    pub const RUNTIME_DEFAULT: Self = Self::ALL
        .without(Severity::Notice)
        .without(Severity::Strict)
        .without(Severity::Deprecated);

    /// Creates a mask from raw `bits`, dropping any bit that does not name a
    /// severity.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self {
            bits: bits & Self::ALL.bits,
        }
    }

    /// Gets the raw bits of the mask.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.bits
    }

    /// Checks whether `severity` is enabled by this mask.
    #[must_use]
    pub const fn contains(self, severity: Severity) -> bool {
        self.bits & severity.bits() != 0
    }

    /// Returns a copy of this mask with `severity` enabled.
    #[must_use]
    pub const fn with(self, severity: Severity) -> Self {
        Self {
            bits: self.bits | severity.bits(),
        }
    }

    /// Returns a copy of this mask with `severity` disabled.
    #[must_use]
    pub const fn without(self, severity: Severity) -> Self {
        Self {
            bits: self.bits & !severity.bits(),
        }
    }

    /// Checks whether the mask enables no severities.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Iterates over the enabled severities in ascending order of bit value.
    pub fn severities(self) -> impl Iterator<Item = Severity> {
        Severity::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

impl From<Severity> for ReportingMask {
    fn from(value: Severity) -> Self {
        Self::NONE.with(value)
    }
}

impl FromIterator<Severity> for ReportingMask {
    fn from_iter<T: IntoIterator<Item = Severity>>(iter: T) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}

impl BitOr for ReportingMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.bits | rhs.bits)
    }
}

impl BitOr<Severity> for ReportingMask {
    type Output = Self;

    fn bitor(self, rhs: Severity) -> Self::Output {
        self.with(rhs)
    }
}

impl BitOrAssign<Severity> for ReportingMask {
    fn bitor_assign(&mut self, rhs: Severity) {
        *self = self.with(rhs);
    }
}

impl Display for ReportingMask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("None");
        }
        let names = self.severities().map(|s| format!("{s:?}")).join(" | ");
        f.write_str(&names)
    }
}
