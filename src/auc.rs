//! # Incremental area under the curve
//!
//! AUC with respect to increase (AUCi) of a sampled profile, e.g. a hormone
//! series collected at fixed sampling times.
//!
//! ## Procedure
//! -----------------
//! 1. Missing samples (`None` or `NaN`) are filled by linear interpolation
//!    over the present ones. Outside the first/last present sample the
//!    nearest present value is repeated.
//! 2. The first (interpolated) value is taken as baseline and subtracted
//!    from every sample.
//! 3. The baseline-corrected profile is integrated with the trapezoidal rule:
//!
//! ```text
//! AUCi ≈ Σ_{j=1}^{m-1} (x_j − x_{j−1}) · (y_j + y_{j−1}) / 2
//! ```
//!
//! A profile with fewer than two present samples has no AUCi (`None`).
use crate::cosinor_errors::CosinorError;
use crate::parallel::iter_maybe_parallel;
#[cfg(feature = "parallel")]
use rayon::iter::ParallelIterator;

fn check_abscissa(x: &[f64]) -> Result<(), CosinorError> {
    if x.iter().any(|v| !v.is_finite()) {
        return Err(CosinorError::InvalidInput(
            "sampling times must be finite".into(),
        ));
    }
    if x.windows(2).any(|w| w[1] < w[0]) {
        return Err(CosinorError::InvalidInput(
            "sampling times must be non-decreasing".into(),
        ));
    }
    Ok(())
}

/// Linear interpolation at `t` over the knots `(xp, fp)`, constant beyond the ends.
///
/// `xp` is non-decreasing and non-empty.
fn interp(xp: &[f64], fp: &[f64], t: f64) -> f64 {
    let last = xp.len() - 1;
    if t <= xp[0] {
        return fp[0];
    }
    if t >= xp[last] {
        return fp[last];
    }

    let idx = xp.partition_point(|&k| k <= t);
    let (x0, x1) = (xp[idx - 1], xp[idx]);
    let (y0, y1) = (fp[idx - 1], fp[idx]);
    y0 + (y1 - y0) * (t - x0) / (x1 - x0)
}

fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xw, yw)| 0.5 * (xw[1] - xw[0]) * (yw[1] + yw[0]))
        .sum()
}

/// AUCi of one profile.
///
/// Arguments
/// -----------------
/// * `x`: sampling times, non-decreasing.
/// * `y`: observed values aligned with `x`; `None` or `NaN` marks a missing sample.
///
/// Return
/// ----------
/// * `Ok(Some(area))` when at least two samples are present.
/// * `Ok(None)` otherwise.
/// * `Err(CosinorError::InvalidInput)` if the slices differ in length or `x`
///   is not finite and non-decreasing.
pub fn auc_increment(x: &[f64], y: &[Option<f64>]) -> Result<Option<f64>, CosinorError> {
    if x.len() != y.len() {
        return Err(CosinorError::InvalidInput(format!(
            "{} sampling times for {} values",
            x.len(),
            y.len()
        )));
    }
    check_abscissa(x)?;

    let (xp, fp): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter_map(|(&t, &v)| v.filter(|v| !v.is_nan()).map(|v| (t, v)))
        .unzip();
    if xp.len() < 2 {
        return Ok(None);
    }

    let filled: Vec<f64> = x.iter().map(|&t| interp(&xp, &fp, t)).collect();
    let baseline = filled[0];
    let net: Vec<f64> = filled.iter().map(|v| v - baseline).collect();
    Ok(Some(trapezoid(x, &net)))
}

/// AUCi of several profiles sharing the same sampling times, in input order.
///
/// The first malformed profile aborts the computation.
pub fn auc_increments(
    x: &[f64],
    profiles: &[Vec<Option<f64>>],
) -> Result<Vec<Option<f64>>, CosinorError> {
    iter_maybe_parallel!(profiles)
        .map(|y| auc_increment(x, y))
        .collect()
}
