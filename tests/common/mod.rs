#![allow(dead_code)]

use approx::assert_abs_diff_eq;
use cosinor::constants::{Hour, OMEGA_24};
use cosinor::{FitResult, Measurement};

/// Sampling hours of the reference protocol.
pub const PROTOCOL_HOURS: [Hour; 7] = [1.0, 3.0, 6.0, 10.0, 14.0, 16.0, 24.0];

pub const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/melatonin_long.csv");

/// Ground truth of a synthetic two-harmonic profile.
///
/// `peak24_h` and `peak12_h` are the times of maximum of each component.
#[derive(Debug, Clone, Copy)]
pub struct Rhythm {
    pub mesor: f64,
    pub amp24: f64,
    pub peak24_h: Hour,
    pub amp12: f64,
    pub peak12_h: Hour,
}

impl Rhythm {
    pub fn circadian(mesor: f64, amp24: f64, peak24_h: Hour) -> Self {
        Rhythm {
            mesor,
            amp24,
            peak24_h,
            amp12: 0.0,
            peak12_h: 0.0,
        }
    }

    pub fn value_at(&self, t: Hour) -> f64 {
        self.mesor
            + self.amp24 * (OMEGA_24 * (t - self.peak24_h)).cos()
            + self.amp12 * (2.0 * OMEGA_24 * (t - self.peak12_h)).cos()
    }

    pub fn measurements(&self, id: u32, group: &str, hours: &[Hour]) -> Vec<Measurement> {
        hours
            .iter()
            .map(|&t| Measurement::new(id, group, t, self.value_at(t)))
            .collect()
    }
}

/// Shortest distance between two clock times on a circle of `period` hours.
pub fn circular_distance(a: Hour, b: Hour, period: Hour) -> Hour {
    let d = (a - b).rem_euclid(period);
    d.min(period - d)
}

/// Check a fitted subject against the profile it was generated from.
pub fn assert_rhythm_close(result: &FitResult, truth: &Rhythm, epsilon: f64) {
    assert_abs_diff_eq!(result.mesor, truth.mesor, epsilon = epsilon);
    assert_abs_diff_eq!(result.amp24, truth.amp24, epsilon = epsilon);
    assert_abs_diff_eq!(result.amp12, truth.amp12, epsilon = epsilon);
    assert!(
        circular_distance(result.peak24_h, truth.peak24_h, 24.0) < epsilon,
        "peak24 {} vs {}",
        result.peak24_h,
        truth.peak24_h
    );
    assert!(
        circular_distance(result.acrophase24_h, 24.0 - truth.peak24_h, 24.0) < epsilon,
        "acrophase24 {} vs {}",
        result.acrophase24_h,
        24.0 - truth.peak24_h
    );
    if truth.amp12 > 0.0 {
        assert!(
            circular_distance(result.peak12_h, truth.peak12_h, 12.0) < epsilon,
            "peak12 {} vs {}",
            result.peak12_h,
            truth.peak12_h
        );
    }
    assert_abs_diff_eq!(result.r_squared, 1.0, epsilon = epsilon);
}
