//! # Fitted curve reconstruction
//!
//! Evaluate the fitted two-harmonic function at arbitrary times, sample it
//! densely for plotting, and assemble the per-subject payload handed to
//! rendering code ([`PlotData`]).
//!
//! The reconstruction uses the same regressors as the fit
//! ([`basis_row`]), so `evaluate` at a sample time reproduces the fitted
//! value of that sample exactly.
use crate::constants::{Group, Hour, SubjectId};
use crate::fit_params::FitParams;
use crate::harmonic_basis::{angular_frequency, basis_row};
use crate::regression::HarmonicCoefficients;

/// A fitted two-harmonic function of time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarmonicCurve {
    pub coefficients: HarmonicCoefficients,
    pub period_h: Hour,
}

impl HarmonicCurve {
    pub fn new(coefficients: HarmonicCoefficients, period_h: Hour) -> Self {
        HarmonicCurve {
            coefficients,
            period_h,
        }
    }

    /// `mesor + β₁ cos ωt + γ₁ sin ωt + β₂ cos 2ωt + γ₂ sin 2ωt`
    #[inline]
    pub fn evaluate(&self, t: Hour) -> f64 {
        self.coefficients.dot(&basis_row(t, self.period_h))
    }

    pub fn evaluate_many(&self, ts: &[Hour]) -> Vec<f64> {
        ts.iter().map(|&t| self.evaluate(t)).collect()
    }

    /// Value of the fundamental component alone (mesor excluded).
    #[inline]
    pub fn fundamental(&self, t: Hour) -> f64 {
        let row = basis_row(t, self.period_h);
        self.coefficients.cos1 * row[1] + self.coefficients.sin1 * row[2]
    }

    /// Time derivative of the fundamental component.
    #[inline]
    pub fn fundamental_derivative(&self, t: Hour) -> f64 {
        let w = angular_frequency(self.period_h);
        let row = basis_row(t, self.period_h);
        w * (self.coefficients.sin1 * row[1] - self.coefficients.cos1 * row[2])
    }

    /// `n` evenly spaced `(t, value)` pairs over `[start, end]`, both ends included.
    pub fn sample(&self, start: Hour, end: Hour, n: usize) -> Vec<(Hour, f64)> {
        linspace(start, end, n)
            .into_iter()
            .map(|t| (t, self.evaluate(t)))
            .collect()
    }
}

/// Free-function form of [`HarmonicCurve::evaluate`].
#[inline]
pub fn evaluate(coeffs: &HarmonicCoefficients, period_h: Hour, t: Hour) -> f64 {
    HarmonicCurve::new(*coeffs, period_h).evaluate(t)
}

/// `n` evenly spaced values over `[start, end]`, endpoints included.
///
/// `n = 0` yields an empty vector and `n = 1` yields `[start]`.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| {
                    if i == n - 1 {
                        end
                    } else {
                        start + step * i as f64
                    }
                })
                .collect()
        }
    }
}

/// Everything a renderer needs to draw one subject's figure.
///
/// Fields
/// -----------------
/// * `raw` – observed `(time_h, value)` pairs, in input order.
/// * `curve` – dense reconstruction over `FitParams::curve_range_h`.
/// * `acrophase_point` – `(acrophase24_h, fitted value)` used to anchor the subject label.
/// * `peak_point` – `(peak24_h, fitted value)` at the maximum of the 24 h component.
/// * `r_squared` – goodness of fit, usually printed in a corner of the plot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotData {
    pub subject_id: SubjectId,
    pub group: Group,
    pub raw: Vec<(Hour, f64)>,
    pub curve: Vec<(Hour, f64)>,
    pub acrophase_point: (Hour, f64),
    pub peak_point: (Hour, f64),
    pub r_squared: f64,
}

impl PlotData {
    /// Title in the `Subject <id> (<group>)` form.
    pub fn title(&self) -> String {
        format!("Subject {} ({})", self.subject_id, self.group)
    }

    /// Suggested output file stem.
    pub fn file_stem(&self) -> String {
        format!("Subject_{}_cosinor", self.subject_id)
    }

    /// R² annotation text with two decimals.
    pub fn r_squared_label(&self) -> String {
        format!("R² = {:.2}", self.r_squared)
    }
}

/// Dense curve over the configured window.
pub(crate) fn dense_curve(curve: &HarmonicCurve, params: &FitParams) -> Vec<(Hour, f64)> {
    let (start, end) = params.curve_range_h;
    curve.sample(start, end, params.curve_points)
}
