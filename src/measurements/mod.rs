//! # Measurements
//!
//! A [`Measurement`] is one observed value for one subject at one clock time.
//! Measurements reach the core already cleaned: values are present, times are
//! expressed in hours, and every record carries its subject's cohort label.
//!
//! Two ingestion paths are provided:
//!
//! * [`csv_reader`] – file loading driven by a [`csv_reader::LoadConfig`]
//!   (column names, condition filter, time-point → hour mapping, group codes).
//! * [`MeasurementBatch`] – column slices already held in memory.
//!
//! ## Units & Conventions
//! -----------------
//! - **Time:** hours, `time_h ≥ 0`, not wrapped to `[0, 24)`. Multi-day values are
//!   elapsed time since a reference and are valid.
//! - **Value:** any finite real; missing values never reach this module's outputs.
use std::borrow::Cow;

use crate::constants::{Group, Hour, SubjectId};
use crate::cosinor_errors::CosinorError;

pub mod csv_reader;

#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub subject_id: SubjectId,
    pub group: Group,
    pub time_h: Hour,
    pub value: f64,
}

impl Measurement {
    pub fn new(
        subject_id: impl Into<SubjectId>,
        group: impl Into<Group>,
        time_h: Hour,
        value: f64,
    ) -> Self {
        Measurement {
            subject_id: subject_id.into(),
            group: group.into(),
            time_h,
            value,
        }
    }

    /// Structural validity: finite, non-negative time and finite value.
    pub fn validate(&self) -> Result<(), CosinorError> {
        if !self.time_h.is_finite() || self.time_h < 0.0 {
            return Err(CosinorError::InvalidInput(format!(
                "subject {}: time_h must be finite and >= 0, got {}",
                self.subject_id, self.time_h
            )));
        }
        if !self.value.is_finite() {
            return Err(CosinorError::InvalidInput(format!(
                "subject {}: non-finite value at t = {} h",
                self.subject_id, self.time_h
            )));
        }
        Ok(())
    }
}

/// Column-oriented batch of measurements.
///
/// Invariants
/// -----------------
/// * `subject_id.len() == group.len() == time_h.len() == value.len()`
/// * Times are in **hours**.
///
/// Construction
/// -----------------
/// * [`MeasurementBatch::from_hours_borrowed`] – zero-copy when times are already hours.
/// * [`MeasurementBatch::from_time_points_owned`] – maps sampling-occasion labels to hours once.
#[derive(Debug, Clone)]
pub struct MeasurementBatch<'a> {
    pub subject_id: Cow<'a, [SubjectId]>,
    pub group: Cow<'a, [Group]>,
    pub time_h: Cow<'a, [Hour]>,
    pub value: Cow<'a, [f64]>,
}

impl<'a> MeasurementBatch<'a> {
    /// Borrow column slices whose times are already in hours.
    ///
    /// Return
    /// ----------
    /// * `Err(CosinorError::InvalidInput)` if the slice lengths differ.
    pub fn from_hours_borrowed(
        subject_id: &'a [SubjectId],
        group: &'a [Group],
        time_h: &'a [Hour],
        value: &'a [f64],
    ) -> Result<Self, CosinorError> {
        check_lengths(subject_id.len(), group.len(), time_h.len(), value.len())?;
        Ok(Self {
            subject_id: Cow::Borrowed(subject_id),
            group: Cow::Borrowed(group),
            time_h: Cow::Borrowed(time_h),
            value: Cow::Borrowed(value),
        })
    }

    /// Build a batch from sampling-occasion labels (`1..=7` in the reference
    /// protocol), converting each label to hours with `hour_of`.
    ///
    /// Arguments
    /// -----------------
    /// * `hour_of` – mapping from occasion label to clock hour; `None` marks
    ///   an unknown label, which is an input error.
    pub fn from_time_points_owned(
        subject_id: &[SubjectId],
        group: &[Group],
        time_point: &[u32],
        value: &[f64],
        hour_of: impl Fn(u32) -> Option<Hour>,
    ) -> Result<MeasurementBatch<'static>, CosinorError> {
        check_lengths(subject_id.len(), group.len(), time_point.len(), value.len())?;
        let time_h = time_point
            .iter()
            .map(|&tp| {
                hour_of(tp).ok_or_else(|| {
                    CosinorError::InvalidInput(format!("unknown time point label {tp}"))
                })
            })
            .collect::<Result<Vec<Hour>, _>>()?;

        Ok(MeasurementBatch {
            subject_id: Cow::Owned(subject_id.to_vec()),
            group: Cow::Owned(group.to_vec()),
            time_h: Cow::Owned(time_h),
            value: Cow::Owned(value.to_vec()),
        })
    }

    pub fn len(&self) -> usize {
        self.time_h.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_h.is_empty()
    }

    /// Expand the batch into row records, validating each of them.
    pub fn to_measurements(&self) -> Result<Vec<Measurement>, CosinorError> {
        (0..self.len())
            .map(|i| {
                let m = Measurement {
                    subject_id: self.subject_id[i].clone(),
                    group: self.group[i].clone(),
                    time_h: self.time_h[i],
                    value: self.value[i],
                };
                m.validate().map(|_| m)
            })
            .collect()
    }
}

fn check_lengths(ids: usize, groups: usize, times: usize, values: usize) -> Result<(), CosinorError> {
    if ids == groups && groups == times && times == values {
        Ok(())
    } else {
        Err(CosinorError::InvalidInput(format!(
            "column length mismatch: {ids} ids, {groups} groups, {times} times, {values} values"
        )))
    }
}
