//! # Per-subject harmonic regression
//!
//! Ordinary least-squares fit of one subject's samples against the
//! two-harmonic basis of [`crate::harmonic_basis`].
//!
//! ## Numerical method
//! -----------------
//! The `n × 5` design matrix is decomposed once with a thin SVD
//! ([`nalgebra::linalg::SVD`]). The singular values give:
//!
//! * the **numerical rank**: singular values below `rank_tolerance × σ_max`
//!   are treated as zero; a rank below 5 is a
//!   [`DegenerateReason::RankDeficient`] failure,
//! * the **condition number** `σ_max / σ_min`; above `max_condition_number`
//!   the fit is still returned but carries a [`NumericWarning::IllConditioned`].
//!
//! The coefficients are obtained from the same decomposition, never from an
//! explicit inverse of `XᵀX`.
//!
//! ## Goodness of fit
//! -----------------
//! `R² = 1 − SS_res / SS_tot`, with `SS_tot` taken around the sample mean.
//! When every observed value equals the sample mean to within a few ulps of
//! `max|y|`, the signal has no variance: R² is reported as 1.0 and the fit
//! carries a [`NumericWarning::ConstantSignal`]. A constant offset added to
//! the values therefore leaves R² unchanged.
use nalgebra::DVector;

use crate::constants::{BasisRow, Hour, N_COEFFS};
use crate::cosinor_errors::{CosinorError, DegenerateReason, NumericWarning};
use crate::fit_params::FitParams;
use crate::harmonic_basis::{basis_row, rows_to_matrix};

/// Raw regression coefficients of the two-harmonic model.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HarmonicCoefficients {
    /// Intercept
    pub mesor: f64,
    /// Coefficient of `cos ωt`
    pub cos1: f64,
    /// Coefficient of `sin ωt`
    pub sin1: f64,
    /// Coefficient of `cos 2ωt`
    pub cos2: f64,
    /// Coefficient of `sin 2ωt`
    pub sin2: f64,
}

impl HarmonicCoefficients {
    pub fn from_array(a: [f64; N_COEFFS]) -> Self {
        HarmonicCoefficients {
            mesor: a[0],
            cos1: a[1],
            sin1: a[2],
            cos2: a[3],
            sin2: a[4],
        }
    }

    pub fn as_array(&self) -> [f64; N_COEFFS] {
        [self.mesor, self.cos1, self.sin1, self.cos2, self.sin2]
    }

    /// Model value for one regressor row.
    #[inline]
    pub fn dot(&self, row: &BasisRow) -> f64 {
        self.mesor * row[0]
            + self.cos1 * row[1]
            + self.sin1 * row[2]
            + self.cos2 * row[3]
            + self.sin2 * row[4]
    }

    fn is_finite(&self) -> bool {
        self.as_array().iter().all(|c| c.is_finite())
    }
}

/// Outcome of a successful least-squares fit.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionFit {
    pub coefficients: HarmonicCoefficients,
    pub n_samples: usize,
    pub fitted: Vec<f64>,
    pub residuals: Vec<f64>,
    pub ss_residual: f64,
    pub ss_total: f64,
    pub r_squared: f64,
    pub condition_number: f64,
    pub warnings: Vec<NumericWarning>,
}

impl RegressionFit {
    /// Residual degrees of freedom `n − 5`.
    #[inline]
    pub fn degrees_of_freedom(&self) -> usize {
        self.n_samples - N_COEFFS
    }

    /// Adjusted R², undefined for a saturated fit (`n = 5`).
    pub fn adjusted_r_squared(&self) -> Option<f64> {
        let df = self.degrees_of_freedom();
        if df == 0 {
            return None;
        }
        let n = self.n_samples as f64;
        Some(1.0 - (1.0 - self.r_squared) * (n - 1.0) / df as f64)
    }

    /// Residual standard error `sqrt(SS_res / (n − 5))`, undefined for `n = 5`.
    pub fn residual_std_error(&self) -> Option<f64> {
        let df = self.degrees_of_freedom();
        (df > 0).then(|| (self.ss_residual / df as f64).sqrt())
    }
}

/// Fit `value ≈ row · coeffs` in the least-squares sense.
///
/// Arguments
/// -----------------
/// * `samples`: `(basis row, observed value)` pairs of one subject, in any order.
/// * `params`: tolerances (`min_measurements`, `rank_tolerance`, `max_condition_number`, `r2_tolerance`).
///
/// Return
/// ----------
/// * `Ok(RegressionFit)` – coefficients, residuals, R² and advisory warnings.
/// * `Err(CosinorError::DegenerateFit(_))` – fewer than `min_measurements` samples or a rank-deficient design.
/// * `Err(CosinorError::InvalidInput(_))` – a non-finite regressor or value.
pub fn fit_least_squares(
    samples: &[(BasisRow, f64)],
    params: &FitParams,
) -> Result<RegressionFit, CosinorError> {
    let n = samples.len();
    if n < params.min_measurements {
        return Err(DegenerateReason::TooFewMeasurements {
            found: n,
            required: params.min_measurements,
        }
        .into());
    }
    if samples
        .iter()
        .any(|(row, y)| !y.is_finite() || row.iter().any(|x| !x.is_finite()))
    {
        return Err(CosinorError::InvalidInput(
            "non-finite regressor or observed value".into(),
        ));
    }

    let rows: Vec<BasisRow> = samples.iter().map(|(row, _)| *row).collect();
    let design = rows_to_matrix(&rows);
    let y = DVector::from_iterator(n, samples.iter().map(|(_, v)| *v));

    let svd = design.svd(true, true);
    let sigma_max = svd.singular_values.max();
    let sigma_min = svd.singular_values.min();
    let cutoff = params.rank_tolerance * sigma_max;
    let rank = svd.singular_values.iter().filter(|&&s| s > cutoff).count();
    if rank < N_COEFFS {
        return Err(DegenerateReason::RankDeficient {
            rank,
            required: N_COEFFS,
        }
        .into());
    }

    let beta = svd
        .solve(&y, cutoff)
        .map_err(|e| CosinorError::LinearAlgebra(e.to_string()))?;
    let coefficients =
        HarmonicCoefficients::from_array([beta[0], beta[1], beta[2], beta[3], beta[4]]);
    if !coefficients.is_finite() {
        return Err(CosinorError::LinearAlgebra(
            "least-squares solution is not finite".into(),
        ));
    }

    let mut warnings = Vec::new();
    let condition_number = sigma_max / sigma_min;
    if condition_number > params.max_condition_number {
        warnings.push(NumericWarning::IllConditioned { condition_number });
    }

    let fitted: Vec<f64> = rows.iter().map(|row| coefficients.dot(row)).collect();
    let residuals: Vec<f64> = samples
        .iter()
        .zip(&fitted)
        .map(|((_, v), f)| v - f)
        .collect();
    let ss_residual: f64 = residuals.iter().map(|r| r * r).sum();

    let mean = y.mean();
    let ss_total: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
    // Values that differ from their mean by no more than a few ulps carry no variance.
    let ulp_floor = 4.0 * f64::EPSILON * y.amax();
    let is_constant = y.iter().all(|v| (v - mean).abs() <= ulp_floor);

    let r_squared = if is_constant {
        warnings.push(NumericWarning::ConstantSignal);
        1.0
    } else {
        let r2 = 1.0 - ss_residual / ss_total;
        if r2 < -params.r2_tolerance || r2 > 1.0 + params.r2_tolerance {
            warnings.push(NumericWarning::RSquaredOutOfRange(r2));
        }
        r2
    };

    Ok(RegressionFit {
        coefficients,
        n_samples: n,
        fitted,
        residuals,
        ss_residual,
        ss_total,
        r_squared,
        condition_number,
        warnings,
    })
}

/// Build the basis rows for `times_h` and fit them against `values`.
///
/// See [`fit_least_squares`] for the failure modes. Slices of different
/// lengths are an [`CosinorError::InvalidInput`].
pub fn fit_harmonic_regression(
    times_h: &[Hour],
    values: &[f64],
    params: &FitParams,
) -> Result<RegressionFit, CosinorError> {
    if times_h.len() != values.len() {
        return Err(CosinorError::InvalidInput(format!(
            "{} sample times for {} values",
            times_h.len(),
            values.len()
        )));
    }
    let samples: Vec<(BasisRow, f64)> = times_h
        .iter()
        .zip(values)
        .map(|(&t, &v)| (basis_row(t, params.period_h), v))
        .collect();
    fit_least_squares(&samples, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const HOURS: [f64; 7] = [1.0, 3.0, 6.0, 10.0, 14.0, 16.0, 24.0];

    fn model(c: &HarmonicCoefficients, t: f64) -> f64 {
        c.dot(&basis_row(t, 24.0))
    }

    #[test]
    fn recovers_exact_coefficients() {
        let truth = HarmonicCoefficients {
            mesor: 5.0,
            cos1: 2.0,
            sin1: 1.0,
            cos2: 0.5,
            sin2: -0.5,
        };
        let values: Vec<f64> = HOURS.iter().map(|&t| model(&truth, t)).collect();
        let fit = fit_harmonic_regression(&HOURS, &values, &FitParams::default()).unwrap();

        for (a, b) in fit.coefficients.as_array().iter().zip(truth.as_array()) {
            assert_abs_diff_eq!(*a, b, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(fit.r_squared, 1.0, epsilon = 1e-9);
        assert!(fit.ss_residual < 1e-18);
        assert_eq!(fit.n_samples, 7);
        assert_eq!(fit.degrees_of_freedom(), 2);
        assert!(fit.warnings.is_empty());
    }

    #[test]
    fn noisy_fit_has_r2_in_unit_interval() {
        let values = [10.2, 11.9, 13.1, 9.7, 8.4, 8.9, 10.6];
        let fit = fit_harmonic_regression(&HOURS, &values, &FitParams::default()).unwrap();
        assert!(fit.r_squared >= 0.0 && fit.r_squared <= 1.0);
        assert_abs_diff_eq!(
            fit.residuals.iter().sum::<f64>(),
            0.0,
            epsilon = 1e-9
        );
        let adj = fit.adjusted_r_squared().unwrap();
        assert!(adj <= fit.r_squared);
        assert!(fit.residual_std_error().unwrap() > 0.0);
    }

    #[test]
    fn four_samples_are_too_few() {
        let err = fit_harmonic_regression(
            &[0.0, 6.0, 12.0, 18.0],
            &[10.0, 12.0, 10.0, 8.0],
            &FitParams::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            CosinorError::DegenerateFit(DegenerateReason::TooFewMeasurements {
                found: 4,
                required: 5
            })
        );
    }

    #[test]
    fn five_distinct_samples_are_saturated() {
        let times = [0.0, 3.0, 6.0, 12.0, 18.0];
        let values = [10.0, 11.0, 12.0, 10.0, 8.0];
        let fit = fit_harmonic_regression(&times, &values, &FitParams::default()).unwrap();
        assert_abs_diff_eq!(fit.r_squared, 1.0, epsilon = 1e-9);
        assert_eq!(fit.adjusted_r_squared(), None);
        assert_eq!(fit.residual_std_error(), None);
    }

    #[test]
    fn identical_times_are_rank_deficient() {
        let err = fit_harmonic_regression(
            &[8.0; 6],
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            &FitParams::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            CosinorError::DegenerateFit(DegenerateReason::RankDeficient {
                rank: 1,
                required: 5
            })
        );
    }

    #[test]
    fn six_hourly_grid_aliases_second_harmonic() {
        // sin(2ωt) vanishes at every multiple of 6 h, and t = 24 repeats t = 0.
        let err = fit_harmonic_regression(
            &[0.0, 6.0, 12.0, 18.0, 24.0],
            &[10.0, 12.0, 10.0, 8.0, 10.0],
            &FitParams::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            CosinorError::DegenerateFit(DegenerateReason::RankDeficient {
                rank: 4,
                required: 5
            })
        );
    }

    #[test]
    fn constant_signal_is_flagged() {
        let fit = fit_harmonic_regression(&HOURS, &[3.0; 7], &FitParams::default()).unwrap();
        assert_eq!(fit.r_squared, 1.0);
        assert!(fit.warnings.contains(&NumericWarning::ConstantSignal));
        assert_abs_diff_eq!(fit.coefficients.mesor, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.coefficients.cos1, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn r_squared_ignores_constant_offset() {
        let noise = [0.0, 3e-3, -2e-3, 1e-3, 4e-3, -1e-3, 2e-3];
        let shifted: Vec<f64> = noise.iter().map(|v| v + 1e6).collect();
        let params = FitParams::default();

        let centred = fit_harmonic_regression(&HOURS, &noise, &params).unwrap();
        let offset = fit_harmonic_regression(&HOURS, &shifted, &params).unwrap();

        assert!(centred.r_squared < 0.99);
        assert_abs_diff_eq!(offset.r_squared, centred.r_squared, epsilon = 1e-4);
        assert!(!offset.warnings.contains(&NumericWarning::ConstantSignal));
        assert_abs_diff_eq!(offset.coefficients.mesor - 1e6, centred.coefficients.mesor, epsilon = 1e-6);
    }

    #[test]
    fn clustered_times_warn_about_conditioning() {
        // Six samples squeezed into a 5 h window: solvable but far from orthogonal.
        let times = [8.0, 9.0, 10.0, 11.0, 12.0, 13.0];
        let values = [1.0, 1.1, 0.9, 1.05, 0.95, 1.0];
        let params = FitParams::builder()
            .max_condition_number(10.0)
            .build()
            .unwrap();
        let fit = fit_harmonic_regression(&times, &values, &params).unwrap();
        assert!(fit.condition_number > 10.0);
        assert!(fit
            .warnings
            .iter()
            .any(|w| matches!(w, NumericWarning::IllConditioned { .. })));
    }

    #[test]
    fn rejects_mismatched_or_non_finite_input() {
        let params = FitParams::default();
        assert!(matches!(
            fit_harmonic_regression(&HOURS, &[1.0; 6], &params),
            Err(CosinorError::InvalidInput(_))
        ));
        let mut values = [1.0, 2.0, 3.0, 2.0, 1.0, 0.0, 1.0];
        values[3] = f64::NAN;
        assert!(matches!(
            fit_harmonic_regression(&HOURS, &values, &params),
            Err(CosinorError::InvalidInput(_))
        ));
    }
}
