//! # Constants and type definitions for cosinor
//!
//! This module centralizes the **fixed model constants** and the **common type
//! definitions** used throughout the crate.
//!
//! ## Overview
//!
//! - The circadian fundamental period and the size of the two-harmonic basis
//! - Unit aliases (hours, radians)
//! - Subject identifiers and group labels
//!
//! These definitions are shared by the regression fitter, the polar extractor,
//! the curve reconstructor and the subject aggregator.

use std::convert::Infallible;
use std::fmt;

// -------------------------------------------------------------------------------------------------
// Model constants
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Fundamental period of the circadian harmonic (hours)
pub const CIRCADIAN_PERIOD_H: Hour = 24.0;

/// Angular frequency of the 24 h fundamental (radians per hour)
pub const OMEGA_24: f64 = DPI / CIRCADIAN_PERIOD_H;

/// Number of free parameters of the model: mesor + 2 harmonics × (cos, sin)
pub const N_COEFFS: usize = 5;

/// Minimum number of measurements for a well-posed fit
pub const MIN_MEASUREMENTS: usize = N_COEFFS;

/// Number of samples used when reconstructing a dense curve for plotting
pub const DEFAULT_CURVE_POINTS: usize = 300;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Clock time or elapsed time in hours
pub type Hour = f64;
/// Angle in radians
pub type Radian = f64;
/// One regressor row of the two-harmonic design: `[1, cos ωt, sin ωt, cos 2ωt, sin 2ωt]`
pub type BasisRow = [f64; N_COEFFS];

// -------------------------------------------------------------------------------------------------
// Identifiers
// -------------------------------------------------------------------------------------------------

/// Identifier of a subject.
///
/// Datasets use either plain integer ids (`17`) or coded labels (`"S017"`).
/// Both are kept as given; only equality and ordering matter to the core.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubjectId {
    /// Integer identifier (e.g. 1, 42…)
    Int(u32),
    /// Free-form label
    String(String),
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectId::Int(n) => write!(f, "{n}"),
            SubjectId::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<u32> for SubjectId {
    fn from(n: u32) -> Self {
        SubjectId::Int(n)
    }
}

impl From<String> for SubjectId {
    fn from(s: String) -> Self {
        SubjectId::String(s)
    }
}

impl From<&str> for SubjectId {
    fn from(s: &str) -> Self {
        SubjectId::String(s.to_string())
    }
}

impl std::str::FromStr for SubjectId {
    type Err = Infallible;

    /// Parse a `SubjectId` from a table cell.
    /// - Digits fitting in a `u32` → `Int(u32)`
    /// - Anything else (trimmed) → `String(String)`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<u32>() {
            Ok(n) => SubjectId::Int(n),
            Err(_) => SubjectId::String(s.to_string()),
        })
    }
}

/// Cohort label of a subject (e.g. `"HC"`, `"MDD"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Group(String);

impl Group {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Group {
    fn from(s: &str) -> Self {
        Group(s.to_string())
    }
}

impl From<String> for Group {
    fn from(s: String) -> Self {
        Group(s)
    }
}
