//! Per-subject fit results and the aggregated table produced by a run.
use std::fmt;

use itertools::Itertools;

use crate::constants::{Group, Hour, SubjectId};
use crate::cosinor_errors::{DegenerateReason, NumericWarning};
use crate::polar::RhythmParameters;
use crate::regression::{HarmonicCoefficients, RegressionFit};
use crate::subjects::Subject;

/// Rhythm descriptors of one subject.
///
/// Fields
/// -----------------
/// * `coefficients` – raw regression coefficients (`mesor`, `cos1`, `sin1`, `cos2`, `sin2`).
/// * `amp24`, `acrophase24_h` – 24 h amplitude and acrophase, `acrophase24_h ∈ [0, 24)`.
/// * `amp12`, `acrophase12_h` – 12 h amplitude and acrophase, `acrophase12_h ∈ [0, 12)`.
/// * `peak24_h`, `peak12_h` – time of maximum of each harmonic (see [`crate::polar`]).
/// * `r_squared` – coefficient of determination of the full model.
/// * `warnings` – advisory numerical diagnostics; empty for a clean fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub subject_id: SubjectId,
    pub group: Group,
    pub n_measurements: usize,
    pub mesor: f64,
    pub coefficients: HarmonicCoefficients,
    pub amp24: f64,
    pub acrophase24_h: Hour,
    pub peak24_h: Hour,
    pub amp12: f64,
    pub acrophase12_h: Hour,
    pub peak12_h: Hour,
    pub r_squared: f64,
    pub adjusted_r_squared: Option<f64>,
    pub condition_number: f64,
    pub warnings: Vec<NumericWarning>,
}

impl FitResult {
    pub(crate) fn new(subject: &Subject, fit: &RegressionFit, rhythm: &RhythmParameters) -> Self {
        FitResult {
            subject_id: subject.id.clone(),
            group: subject.group.clone(),
            n_measurements: fit.n_samples,
            mesor: rhythm.mesor,
            coefficients: fit.coefficients,
            amp24: rhythm.amp24,
            acrophase24_h: rhythm.acrophase24_h,
            peak24_h: rhythm.peak24_h,
            amp12: rhythm.amp12,
            acrophase12_h: rhythm.acrophase12_h,
            peak12_h: rhythm.peak12_h,
            r_squared: fit.r_squared,
            adjusted_r_squared: fit.adjusted_r_squared(),
            condition_number: fit.condition_number,
            warnings: fit.warnings.clone(),
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A subject that could not be fitted, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkipRecord {
    pub subject_id: SubjectId,
    pub group: Group,
    pub n_measurements: usize,
    pub reason: DegenerateReason,
}

impl fmt::Display for SkipRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "subject {} ({}, n={}): {}",
            self.subject_id, self.group, self.n_measurements, self.reason
        )
    }
}

/// Descriptive per-group means over the fitted subjects.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub group: Group,
    pub n_subjects: usize,
    pub mean_mesor: f64,
    pub mean_amp24: f64,
    pub mean_amp12: f64,
    pub mean_r_squared: f64,
}

/// Outcome of a full run: fitted subjects plus the explicit list of skipped ones.
///
/// Both vectors follow the subject order of the input set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitTable {
    pub results: Vec<FitResult>,
    pub skipped: Vec<SkipRecord>,
}

impl FitTable {
    /// Number of subjects seen by the run (fitted + skipped).
    pub fn len(&self) -> usize {
        self.results.len() + self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty() && self.skipped.is_empty()
    }

    pub fn get(&self, id: &SubjectId) -> Option<&FitResult> {
        self.results.iter().find(|r| &r.subject_id == id)
    }

    pub fn skip_record(&self, id: &SubjectId) -> Option<&SkipRecord> {
        self.skipped.iter().find(|s| &s.subject_id == id)
    }

    pub fn by_group<'a>(&'a self, group: &'a Group) -> impl Iterator<Item = &'a FitResult> + 'a {
        self.results.iter().filter(move |r| &r.group == group)
    }

    /// Per-group means, groups sorted by label.
    pub fn group_summary(&self) -> Vec<GroupSummary> {
        self.results
            .iter()
            .into_group_map_by(|r| r.group.clone())
            .into_iter()
            .sorted_by(|a, b| a.0.cmp(&b.0))
            .map(|(group, rows)| {
                let n = rows.len() as f64;
                let mean = |f: fn(&FitResult) -> f64| rows.iter().map(|r| f(r)).sum::<f64>() / n;
                GroupSummary {
                    n_subjects: rows.len(),
                    mean_mesor: mean(|r| r.mesor),
                    mean_amp24: mean(|r| r.amp24),
                    mean_amp12: mean(|r| r.amp12),
                    mean_r_squared: mean(|r| r.r_squared),
                    group,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: u32, group: &str, mesor: f64, amp24: f64) -> FitResult {
        FitResult {
            subject_id: SubjectId::Int(id),
            group: Group::from(group),
            n_measurements: 7,
            mesor,
            coefficients: HarmonicCoefficients::default(),
            amp24,
            acrophase24_h: 0.0,
            peak24_h: 0.0,
            amp12: 0.0,
            acrophase12_h: 0.0,
            peak12_h: 0.0,
            r_squared: 0.5,
            adjusted_r_squared: None,
            condition_number: 2.0,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn group_summary_sorted_by_label() {
        let table = FitTable {
            results: vec![
                result(1, "MDD", 4.0, 1.0),
                result(2, "HC", 2.0, 3.0),
                result(3, "MDD", 6.0, 2.0),
            ],
            skipped: vec![],
        };
        let summary = table.group_summary();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].group, Group::from("HC"));
        assert_eq!(summary[0].n_subjects, 1);
        assert_eq!(summary[1].n_subjects, 2);
        assert_eq!(summary[1].mean_mesor, 5.0);
        assert_eq!(summary[1].mean_amp24, 1.5);
        assert_eq!(table.by_group(&Group::from("MDD")).count(), 2);
    }

    #[test]
    fn lookup_and_display() {
        let table = FitTable {
            results: vec![result(1, "HC", 1.0, 1.0)],
            skipped: vec![SkipRecord {
                subject_id: SubjectId::Int(2),
                group: Group::from("MDD"),
                n_measurements: 4,
                reason: DegenerateReason::TooFewMeasurements {
                    found: 4,
                    required: 5,
                },
            }],
        };
        assert_eq!(table.len(), 2);
        assert!(table.get(&SubjectId::Int(1)).is_some());
        assert!(table.get(&SubjectId::Int(2)).is_none());
        assert_eq!(
            table.skip_record(&SubjectId::Int(2)).unwrap().to_string(),
            "subject 2 (MDD, n=4): too few measurements (4 found, 5 required)"
        );
    }
}
