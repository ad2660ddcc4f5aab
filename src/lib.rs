//! # cosinor
//!
//! Two-harmonic (24 h + 12 h) cosinor regression of sparse, irregularly
//! sampled physiological time series.
//!
//! Each subject's samples are fitted with ordinary least squares against
//!
//! ```text
//! y(t) = M + β₁cos(ωt) + γ₁sin(ωt) + β₂cos(2ωt) + γ₂sin(2ωt),   ω = 2π/24
//! ```
//!
//! and the coefficients are reduced to rhythm descriptors: mesor, 24 h and
//! 12 h amplitudes, acrophases and peak times, plus R².
//!
//! Pipeline
//! -----------------
//! 1. [`measurements`] – load long-format records (CSV or in memory).
//! 2. [`subjects`] – group records by subject, in first-encountered order.
//! 3. [`subjects::subject_fit`] – fit every subject; degenerate subjects are
//!    skipped with an explicit reason instead of aborting the run.
//! 4. [`subjects::table_writer`] – persist the parameter and skip tables.
//!
//! The numerical core lives in [`harmonic_basis`], [`regression`], [`polar`]
//! and [`curve`]. [`auc`] holds the incremental-AUC utility used on the same
//! kind of profiles.
//!
//! Features
//! -----------------
//! * `parallel` – fit subjects on the rayon thread pool. Results are identical
//!   to the sequential run.
pub mod auc;
pub mod constants;
pub mod cosinor_errors;
pub mod curve;
pub mod fit_params;
pub mod harmonic_basis;
pub mod measurements;
mod parallel;
pub mod polar;
pub mod regression;
pub mod subjects;

pub use cosinor_errors::{CosinorError, DegenerateReason, NumericWarning};
pub use fit_params::FitParams;
pub use measurements::Measurement;
pub use subjects::fit_table::{FitResult, FitTable, SkipRecord};
pub use subjects::subject_fit::{fit_subjects, SubjectFit};
pub use subjects::SubjectSet;
