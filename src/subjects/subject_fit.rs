//! # Batch harmonic fitting over subject sets
//!
//! Run the two-harmonic cosinor fit over every subject of a [`SubjectSet`],
//! collect **per-subject outcomes**, and expose helpers to summarize
//! measurement counts and to build plotting payloads.
//!
//! ## Overview
//! -----------------
//! This module implements the [`SubjectFit`] trait on `SubjectSet`, providing:
//!
//! * `fit_all_subjects` – fit **every subject** and assemble a [`FitTable`],
//! * `total_measurements` / `number_of_subjects` – quick set-level metrics,
//! * `measurement_count_stats` – summary statistics on per-subject sample counts,
//! * `plot_data` – one [`PlotData`] per fitted subject.
//!
//! ## Error Semantics
//! -----------------
//! * A **degenerate** subject (too few measurements, rank-deficient design) is
//!   recorded as a [`SkipRecord`] and logged at `warn` level; the run continues.
//! * Any other failure is structural and aborts the run with that error.
//! * Numerical warnings attached to a successful fit are logged at `warn` level
//!   and kept on the [`FitResult`].
//!
//! ## Execution
//! -----------------
//! Subjects share no state. With the `parallel` feature each subject is fitted
//! on the rayon pool; outcomes are collected in subject order and logged
//! afterwards, so the table and the log sequence are the same in both modes.
//!
//! ## Example
//! -----------------
//! ```rust
//! use cosinor::fit_params::FitParams;
//! use cosinor::measurements::Measurement;
//! use cosinor::subjects::subject_fit::fit_subjects;
//!
//! let mut rows = Vec::new();
//! for &t in &[1.0, 3.0, 6.0, 10.0, 14.0, 16.0, 24.0] {
//!     rows.push(Measurement::new(1u32, "HC", t, 5.0 + (t / 4.0).sin()));
//! }
//! rows.push(Measurement::new(2u32, "MDD", 1.0, 3.0));
//!
//! let table = fit_subjects(&rows, &FitParams::default()).unwrap();
//! assert_eq!(table.results.len(), 1);
//! assert_eq!(table.skipped.len(), 1);
//! ```
use std::fmt;

#[cfg(feature = "parallel")]
use rayon::iter::ParallelIterator;
use tracing::{debug, info, warn};

use crate::cosinor_errors::CosinorError;
use crate::curve::{dense_curve, HarmonicCurve, PlotData};
use crate::fit_params::FitParams;
use crate::measurements::Measurement;
use crate::parallel::iter_maybe_parallel;
use crate::polar::extract_rhythm;
use crate::regression::fit_harmonic_regression;
use crate::subjects::fit_table::{FitResult, FitTable, SkipRecord};
use crate::subjects::{Subject, SubjectSet};

/// Summary statistics of per-subject measurement counts.
///
/// Percentiles use the *nearest-rank* method: index `round(q × (N-1))`,
/// clamped to the valid range.
///
/// Display
/// -----------------
/// * `{}` – `min=4, p25=7, median=7, p95=7, max=7`
/// * `{:#}` – aligned multi-line table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementCountStats {
    pub min: usize,
    pub p25: usize,
    pub median: usize,
    pub p95: usize,
    pub max: usize,
}

impl fmt::Display for MeasurementCountStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Measurements per subject - summary")?;
            writeln!(f, "----------------------------------")?;
            writeln!(f, "min    : {}", self.min)?;
            writeln!(f, "p25    : {}", self.p25)?;
            writeln!(f, "median : {}", self.median)?;
            writeln!(f, "p95    : {}", self.p95)?;
            write!(f, "max    : {}", self.max)
        } else {
            write!(
                f,
                "min={}, p25={}, median={}, p95={}, max={}",
                self.min, self.p25, self.median, self.p95, self.max
            )
        }
    }
}

/// Fit one subject: regression, then polar extraction.
///
/// Return
/// ----------
/// * `Err(CosinorError::DegenerateFit(_))` for too few samples or a rank-deficient design.
pub fn fit_subject(subject: &Subject, params: &FitParams) -> Result<FitResult, CosinorError> {
    let fit = fit_harmonic_regression(&subject.times_h, &subject.values, params)?;
    let rhythm = extract_rhythm(&fit.coefficients, params.period_h);
    Ok(FitResult::new(subject, &fit, &rhythm))
}

/// Plotting payload for one fitted subject.
pub fn plot_data_for(subject: &Subject, result: &FitResult, params: &FitParams) -> PlotData {
    let curve = HarmonicCurve::new(result.coefficients, params.period_h);
    PlotData {
        subject_id: subject.id.clone(),
        group: subject.group.clone(),
        raw: subject.samples().collect(),
        curve: dense_curve(&curve, params),
        acrophase_point: (result.acrophase24_h, curve.evaluate(result.acrophase24_h)),
        peak_point: (result.peak24_h, curve.evaluate(result.peak24_h)),
        r_squared: result.r_squared,
    }
}

/// Group `measurements` by subject and fit them all.
///
/// Structural input errors (see [`SubjectSet::from_measurements`]) are returned
/// before any fitting happens.
pub fn fit_subjects(
    measurements: &[Measurement],
    params: &FitParams,
) -> Result<FitTable, CosinorError> {
    SubjectSet::from_measurements(measurements)?.fit_all_subjects(params)
}

pub trait SubjectFit {
    /// Fit every subject of the set and collect the results.
    ///
    /// Arguments
    /// -----------------
    /// * `params`: fit configuration shared by all subjects.
    ///
    /// Return
    /// ----------
    /// * A [`FitTable`] holding one [`FitResult`] per fitted subject and one
    ///   [`SkipRecord`] per degenerate subject, both in set order.
    /// * `Err(CosinorError)` only for non-degenerate failures.
    fn fit_all_subjects(&self, params: &FitParams) -> Result<FitTable, CosinorError>;

    /// Total number of measurements across all subjects.
    fn total_measurements(&self) -> usize;

    /// Number of distinct subjects.
    fn number_of_subjects(&self) -> usize;

    /// Distribution of per-subject measurement counts, `None` for an empty set.
    fn measurement_count_stats(&self) -> Option<MeasurementCountStats>;

    /// Plotting payloads for every subject present in `table.results`, in set order.
    fn plot_data(&self, table: &FitTable, params: &FitParams) -> Vec<PlotData>;
}

impl SubjectFit for SubjectSet {
    fn fit_all_subjects(&self, params: &FitParams) -> Result<FitTable, CosinorError> {
        let outcomes: Vec<Result<FitResult, CosinorError>> =
            iter_maybe_parallel!(self.subjects())
                .map(|subject| fit_subject(subject, params))
                .collect();

        let mut table = FitTable::default();
        for (subject, outcome) in self.iter().zip(outcomes) {
            match outcome {
                Ok(result) => {
                    for warning in &result.warnings {
                        warn!(subject = %subject.id, %warning, "numerical warning");
                    }
                    debug!(
                        subject = %subject.id,
                        n = result.n_measurements,
                        r2 = result.r_squared,
                        "subject fitted"
                    );
                    table.results.push(result);
                }
                Err(CosinorError::DegenerateFit(reason)) => {
                    warn!(subject = %subject.id, %reason, "subject skipped");
                    table.skipped.push(SkipRecord {
                        subject_id: subject.id.clone(),
                        group: subject.group.clone(),
                        n_measurements: subject.len(),
                        reason,
                    });
                }
                Err(other) => return Err(other),
            }
        }

        info!(
            fitted = table.results.len(),
            skipped = table.skipped.len(),
            "cosinor run complete"
        );
        Ok(table)
    }

    #[inline]
    fn total_measurements(&self) -> usize {
        self.iter().map(Subject::len).sum()
    }

    #[inline]
    fn number_of_subjects(&self) -> usize {
        self.len()
    }

    fn measurement_count_stats(&self) -> Option<MeasurementCountStats> {
        let mut counts: Vec<usize> = self.iter().map(Subject::len).collect();
        if counts.is_empty() {
            return None;
        }
        counts.sort_unstable();

        #[inline]
        fn q_index(n: usize, q: f64) -> usize {
            let pos = q * (n as f64 - 1.0);
            let idx = pos.round() as isize;
            idx.clamp(0, (n as isize) - 1) as usize
        }

        let n = counts.len();
        Some(MeasurementCountStats {
            min: counts[0],
            p25: counts[q_index(n, 0.25)],
            median: counts[q_index(n, 0.50)],
            p95: counts[q_index(n, 0.95)],
            max: counts[n - 1],
        })
    }

    fn plot_data(&self, table: &FitTable, params: &FitParams) -> Vec<PlotData> {
        self.iter()
            .filter_map(|subject| {
                table
                    .get(&subject.id)
                    .map(|result| plot_data_for(subject, result, params))
            })
            .collect()
    }
}
