//! # Subjects: grouping, batch fitting, and tabular output
//!
//! High-level facilities to **group** measurements by subject, **fit** every
//! subject independently, and **persist** the resulting parameter table. The
//! central type is [`SubjectSet`], an insertion-ordered collection of
//! [`Subject`]s keyed by [`SubjectId`].
//!
//! Modules
//! -----------------
//! * [`fit_table`] – per-subject results ([`fit_table::FitResult`]), skip records,
//!   and the aggregated [`fit_table::FitTable`].
//! * [`subject_fit`] – batch fitting over a set (`SubjectFit` trait), count statistics,
//!   and plot payloads.
//! * [`table_writer`] – CSV output of the parameter and skip tables.
//!
//! Ordering
//! -----------------
//! Subjects keep the order in which their first measurement was encountered.
//! Every table derived from a set follows that order, whether or not fitting
//! runs in parallel.
//!
//! Quick-Start
//! -----------------
//! ```rust
//! use cosinor::fit_params::FitParams;
//! use cosinor::measurements::Measurement;
//! use cosinor::subjects::SubjectSet;
//! use cosinor::subjects::subject_fit::SubjectFit;
//!
//! let hours = [1.0, 3.0, 6.0, 10.0, 14.0, 16.0, 24.0];
//! let rows: Vec<Measurement> = hours
//!     .iter()
//!     .map(|&t| Measurement::new(1u32, "HC", t, 10.0 + (t / 24.0 * std::f64::consts::TAU).cos()))
//!     .collect();
//!
//! let set = SubjectSet::from_measurements(&rows).unwrap();
//! let table = set.fit_all_subjects(&FitParams::default()).unwrap();
//! assert_eq!(table.results.len(), 1);
//! assert!(table.skipped.is_empty());
//! ```
use std::collections::HashMap;

use ahash::RandomState;

use crate::constants::{Group, Hour, SubjectId};
use crate::cosinor_errors::CosinorError;
use crate::measurements::Measurement;

pub mod fit_table;
pub mod subject_fit;
pub mod table_writer;

/// All measurements of one subject, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Subject {
    pub id: SubjectId,
    pub group: Group,
    pub times_h: Vec<Hour>,
    pub values: Vec<f64>,
}

impl Subject {
    pub fn new(id: SubjectId, group: Group) -> Self {
        Subject {
            id,
            group,
            times_h: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.times_h.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times_h.is_empty()
    }

    /// `(time_h, value)` pairs in input order.
    pub fn samples(&self) -> impl Iterator<Item = (Hour, f64)> + '_ {
        self.times_h.iter().copied().zip(self.values.iter().copied())
    }
}

/// Measurements grouped by subject, in first-encountered order.
#[derive(Debug, Clone, Default)]
pub struct SubjectSet {
    subjects: Vec<Subject>,
    index: HashMap<SubjectId, usize, RandomState>,
}

impl SubjectSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group measurements by subject.
    ///
    /// Return
    /// ----------
    /// * `Err(CosinorError::InvalidInput)` on a non-finite or negative time, a
    ///   non-finite value, or a subject whose rows disagree on the group label.
    pub fn from_measurements(measurements: &[Measurement]) -> Result<Self, CosinorError> {
        let mut set = SubjectSet::new();
        for m in measurements {
            set.push(m)?;
        }
        Ok(set)
    }

    /// Append one measurement to its subject, creating the subject if needed.
    pub fn push(&mut self, m: &Measurement) -> Result<(), CosinorError> {
        m.validate()?;

        let slot = match self.index.get(&m.subject_id) {
            Some(&i) => i,
            None => {
                self.subjects
                    .push(Subject::new(m.subject_id.clone(), m.group.clone()));
                self.index.insert(m.subject_id.clone(), self.subjects.len() - 1);
                self.subjects.len() - 1
            }
        };

        let subject = &mut self.subjects[slot];
        if subject.group != m.group {
            return Err(CosinorError::InvalidInput(format!(
                "subject {} appears in groups '{}' and '{}'",
                subject.id, subject.group, m.group
            )));
        }
        subject.times_h.push(m.time_h);
        subject.values.push(m.value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn get(&self, id: &SubjectId) -> Option<&Subject> {
        self.index.get(id).map(|&i| &self.subjects[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Subject> {
        self.subjects.iter()
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// Reorder subjects by identifier instead of first appearance.
    pub fn sort_by_id(&mut self) {
        self.subjects.sort_by(|a, b| a.id.cmp(&b.id));
        self.index = self
            .subjects
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
    }
}

impl<'a> IntoIterator for &'a SubjectSet {
    type Item = &'a Subject;
    type IntoIter = std::slice::Iter<'a, Subject>;

    fn into_iter(self) -> Self::IntoIter {
        self.subjects.iter()
    }
}
