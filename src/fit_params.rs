//! # Harmonic fit parameters
//!
//! This module defines the [`FitParams`] configuration struct and its builder, which
//! control how the core fits the two-harmonic cosinor model to each subject and how
//! it reconstructs the fitted curve.
//!
//! ## Purpose
//!
//! The core itself needs very little configuration: the fundamental period is fixed at
//! 24 h by default. Everything else here concerns numerical tolerances and the dense
//! curve handed to plotting code:
//!
//! - `period_h` – fundamental period of the first harmonic (the second harmonic is `period_h / 2`),
//! - `min_measurements` – minimum number of samples per subject (never below 5),
//! - `rank_tolerance` – relative singular-value cutoff used for rank detection,
//! - `max_condition_number` – above it, an ill-conditioning warning is attached to the fit,
//! - `r2_tolerance` – slack allowed on R² before an out-of-range warning is raised,
//! - `curve_points` / `curve_range_h` – sampling of the reconstructed curve.
//!
//! ## Example
//!
//! ```rust
//! use cosinor::fit_params::FitParams;
//!
//! let params = FitParams::builder()
//!     .curve_points(500)
//!     .max_condition_number(1e6)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(params.period_h, 24.0);
//! assert_eq!(params.curve_range_h, (0.0, 24.0));
//! ```
use std::cmp::Ordering::{Equal, Greater, Less};
use std::fmt;

use crate::constants::{Hour, CIRCADIAN_PERIOD_H, DEFAULT_CURVE_POINTS, MIN_MEASUREMENTS};
use crate::cosinor_errors::CosinorError;

/// Configuration of the per-subject harmonic fit.
///
/// Defaults
/// -----------------
/// * `period_h`: 24.0 h
/// * `min_measurements`: 5
/// * `rank_tolerance`: 1e-10 (relative to the largest singular value)
/// * `max_condition_number`: 1e8
/// * `r2_tolerance`: 1e-9
/// * `curve_points`: 300
/// * `curve_range_h`: `(0.0, period_h)`
///
/// Validation
/// -----------------
/// * `period_h > 0`, `min_measurements ≥ 5`, `rank_tolerance > 0`,
///   `max_condition_number > 1`, `r2_tolerance ≥ 0`, `curve_points ≥ 2`,
///   finite `curve_range_h` with `start < end`.
#[derive(Debug, Clone, PartialEq)]
pub struct FitParams {
    pub period_h: Hour,
    pub min_measurements: usize,
    pub rank_tolerance: f64,
    pub max_condition_number: f64,
    pub r2_tolerance: f64,
    pub curve_points: usize,
    pub curve_range_h: (Hour, Hour),
}

impl FitParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> FitParamsBuilder {
        FitParamsBuilder::new()
    }
}

impl Default for FitParams {
    fn default() -> Self {
        FitParams {
            period_h: CIRCADIAN_PERIOD_H,
            min_measurements: MIN_MEASUREMENTS,
            rank_tolerance: 1e-10,
            max_condition_number: 1e8,
            r2_tolerance: 1e-9,
            curve_points: DEFAULT_CURVE_POINTS,
            curve_range_h: (0.0, CIRCADIAN_PERIOD_H),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FitParamsBuilder {
    params: FitParams,
    curve_range_set: bool,
}

impl Default for FitParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FitParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: FitParams::default(),
            curve_range_set: false,
        }
    }

    pub fn period_h(mut self, v: Hour) -> Self {
        self.params.period_h = v;
        self
    }
    pub fn min_measurements(mut self, v: usize) -> Self {
        self.params.min_measurements = v;
        self
    }
    pub fn rank_tolerance(mut self, v: f64) -> Self {
        self.params.rank_tolerance = v;
        self
    }
    pub fn max_condition_number(mut self, v: f64) -> Self {
        self.params.max_condition_number = v;
        self
    }
    pub fn r2_tolerance(mut self, v: f64) -> Self {
        self.params.r2_tolerance = v;
        self
    }
    pub fn curve_points(mut self, v: usize) -> Self {
        self.params.curve_points = v;
        self
    }

    /// Explicit sampling window of the reconstructed curve.
    /// When never called, the window follows `period_h`.
    pub fn curve_range_h(mut self, start: Hour, end: Hour) -> Self {
        self.params.curve_range_h = (start, end);
        self.curve_range_set = true;
        self
    }

    // ---- Numeric helpers for PartialOrd (handle NaN as invalid) ----

    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    #[inline]
    fn ge0(x: f64) -> bool {
        matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    #[inline]
    fn lt(a: f64, b: f64) -> bool {
        a.partial_cmp(&b) == Some(Less)
    }

    pub fn build(mut self) -> Result<FitParams, CosinorError> {
        if !self.curve_range_set {
            self.params.curve_range_h = (0.0, self.params.period_h);
        }
        let p = &self.params;

        if !Self::gt0(p.period_h) || !p.period_h.is_finite() {
            return Err(CosinorError::InvalidFitParameter(
                "period_h must be finite and > 0".into(),
            ));
        }
        if p.min_measurements < MIN_MEASUREMENTS {
            return Err(CosinorError::InvalidFitParameter(format!(
                "min_measurements must be >= {MIN_MEASUREMENTS}"
            )));
        }
        if !Self::gt0(p.rank_tolerance) {
            return Err(CosinorError::InvalidFitParameter(
                "rank_tolerance must be > 0".into(),
            ));
        }
        if !Self::lt(1.0, p.max_condition_number) {
            return Err(CosinorError::InvalidFitParameter(
                "max_condition_number must be > 1".into(),
            ));
        }
        if !Self::ge0(p.r2_tolerance) {
            return Err(CosinorError::InvalidFitParameter(
                "r2_tolerance must be >= 0".into(),
            ));
        }
        if p.curve_points < 2 {
            return Err(CosinorError::InvalidFitParameter(
                "curve_points must be >= 2".into(),
            ));
        }
        let (start, end) = p.curve_range_h;
        if !start.is_finite() || !end.is_finite() || !Self::lt(start, end) {
            return Err(CosinorError::InvalidFitParameter(
                "curve_range_h must be finite with start < end".into(),
            ));
        }

        Ok(self.params)
    }
}

impl fmt::Display for FitParams {
    /// Compact by default; aligned multi-line table with `{:#}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Harmonic fit parameters")?;
            writeln!(f, "-----------------------")?;
            writeln!(f, "period_h             = {:.3} h", self.period_h)?;
            writeln!(f, "min_measurements     = {}", self.min_measurements)?;
            writeln!(f, "rank_tolerance       = {:.1e}", self.rank_tolerance)?;
            writeln!(f, "max_condition_number = {:.1e}", self.max_condition_number)?;
            writeln!(f, "r2_tolerance         = {:.1e}", self.r2_tolerance)?;
            writeln!(f, "curve_points         = {}", self.curve_points)?;
            write!(
                f,
                "curve_range_h        = [{:.2}, {:.2}] h",
                self.curve_range_h.0, self.curve_range_h.1
            )
        } else {
            write!(
                f,
                "FitParams(period={:.2}h, min_n={}, rank_tol={:.1e}, max_cond={:.1e}, curve={}pts@[{:.2},{:.2}]h)",
                self.period_h,
                self.min_measurements,
                self.rank_tolerance,
                self.max_condition_number,
                self.curve_points,
                self.curve_range_h.0,
                self.curve_range_h.1,
            )
        }
    }
}
