//! # Harmonic basis
//!
//! Regressors of the two-harmonic cosinor model
//!
//! ```text
//! y(t) = M + β₁ cos(ωt) + γ₁ sin(ωt) + β₂ cos(2ωt) + γ₂ sin(2ωt),    ω = 2π / P
//! ```
//!
//! Times are used as given: values beyond one period (multi-day recordings,
//! elapsed hours) are **not** wrapped before the trigonometric call.
use nalgebra::DMatrix;

use crate::constants::{BasisRow, Hour, CIRCADIAN_PERIOD_H, DPI, N_COEFFS};

/// Angular frequency (radians per hour) of a harmonic with period `period_h`.
#[inline]
pub fn angular_frequency(period_h: Hour) -> f64 {
    DPI / period_h
}

/// `(cos ωt, sin ωt)` for a single harmonic of period `period_h`.
#[inline]
pub fn basis(time_h: Hour, period_h: Hour) -> (f64, f64) {
    let (s, c) = (angular_frequency(period_h) * time_h).sin_cos();
    (c, s)
}

/// Full regressor row `[1, cos ωt, sin ωt, cos 2ωt, sin 2ωt]` with the 24 h fundamental.
#[inline]
pub fn basis_full(time_h: Hour) -> BasisRow {
    basis_row(time_h, CIRCADIAN_PERIOD_H)
}

/// Full regressor row for an arbitrary fundamental period.
///
/// The second harmonic is evaluated as `2·ω·t` so both harmonics share the
/// same angular frequency.
#[inline]
pub fn basis_row(time_h: Hour, period_h: Hour) -> BasisRow {
    let w = angular_frequency(period_h);
    let (s1, c1) = (w * time_h).sin_cos();
    let (s2, c2) = (2.0 * w * time_h).sin_cos();
    [1.0, c1, s1, c2, s2]
}

/// Stack basis rows for every sample time into an `n × 5` design matrix.
pub fn design_matrix(times_h: &[Hour], period_h: Hour) -> DMatrix<f64> {
    let rows: Vec<BasisRow> = times_h.iter().map(|&t| basis_row(t, period_h)).collect();
    rows_to_matrix(&rows)
}

pub(crate) fn rows_to_matrix(rows: &[BasisRow]) -> DMatrix<f64> {
    DMatrix::from_fn(rows.len(), N_COEFFS, |i, j| rows[i][j])
}
