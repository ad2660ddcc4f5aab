//! # Polar rhythm parameters
//!
//! Conversion of the Cartesian regression coefficients `(β, γ)` of each harmonic
//! into an **amplitude** and an **acrophase** expressed in hours.
//!
//! ## Convention
//! -----------------
//! For a harmonic of period `P` with coefficients `cos` and `sin`:
//!
//! ```text
//! amplitude   = hypot(cos, sin)
//! φ           = atan2(−sin, cos)
//! acrophase_h = (φ / 2π × P) mod P        ∈ [0, P)
//! ```
//!
//! This is the classical negative-angle cosinor convention, where the harmonic
//! reads `A·cos(ωt + φ)`. It is kept exactly so that parameter tables stay
//! comparable with previously published outputs. Under this convention the
//! harmonic reaches its maximum at `t = −φ/ω`, which is reported separately as
//! [`HarmonicPolar::peak_h`]:
//!
//! ```text
//! peak_h = (P − acrophase_h) mod P        ∈ [0, P)
//! ```
//!
//! ## Zero amplitude
//! -----------------
//! When both coefficients are exactly zero the phase is undefined;
//! acrophase and peak are then reported as `0.0`.
use crate::constants::{Hour, Radian, DPI};
use crate::regression::HarmonicCoefficients;

/// Amplitude and phase of one harmonic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarmonicPolar {
    pub amplitude: f64,
    /// Phase angle `atan2(−sin, cos)` in `(−π, π]`
    pub phase_rad: Radian,
    /// Acrophase in hours, in `[0, period)`
    pub acrophase_h: Hour,
    /// Time of the harmonic's maximum in hours, in `[0, period)`
    pub peak_h: Hour,
}

/// Descriptors derived from a two-harmonic fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RhythmParameters {
    pub mesor: f64,
    pub amp24: f64,
    pub acrophase24_h: Hour,
    pub peak24_h: Hour,
    pub amp12: f64,
    pub acrophase12_h: Hour,
    pub peak12_h: Hour,
}

/// Reduce `x` into `[0, period)`.
///
/// `rem_euclid` can round a tiny negative value up to exactly `period`, and
/// keeps the sign of a negative zero; both are folded onto `0.0`.
#[inline]
pub fn wrap_hours(x: Hour, period_h: Hour) -> Hour {
    let r = x.rem_euclid(period_h);
    if r >= period_h || r == 0.0 {
        0.0
    } else {
        r
    }
}

/// Acrophase (hours) of one harmonic with period `period_h`.
#[inline]
pub fn acrophase_hours(cos_coef: f64, sin_coef: f64, period_h: Hour) -> Hour {
    to_polar(cos_coef, sin_coef, period_h).acrophase_h
}

/// Convert one harmonic's `(cos, sin)` coefficients to polar form.
pub fn to_polar(cos_coef: f64, sin_coef: f64, period_h: Hour) -> HarmonicPolar {
    let amplitude = cos_coef.hypot(sin_coef);
    if amplitude == 0.0 {
        return HarmonicPolar {
            amplitude,
            phase_rad: 0.0,
            acrophase_h: 0.0,
            peak_h: 0.0,
        };
    }

    let phase_rad = (-sin_coef).atan2(cos_coef);
    let acrophase_h = wrap_hours(phase_rad / DPI * period_h, period_h);
    let peak_h = wrap_hours(period_h - acrophase_h, period_h);

    HarmonicPolar {
        amplitude,
        phase_rad,
        acrophase_h,
        peak_h,
    }
}

/// Derive mesor, 24 h and 12 h parameters from the fitted coefficients.
///
/// Arguments
/// -----------------
/// * `coeffs`: the five regression coefficients.
/// * `period_h`: fundamental period (24 h for circadian data); the second
///   harmonic uses `period_h / 2`.
pub fn extract_rhythm(coeffs: &HarmonicCoefficients, period_h: Hour) -> RhythmParameters {
    let h1 = to_polar(coeffs.cos1, coeffs.sin1, period_h);
    let h2 = to_polar(coeffs.cos2, coeffs.sin2, period_h / 2.0);

    RhythmParameters {
        mesor: coeffs.mesor,
        amp24: h1.amplitude,
        acrophase24_h: h1.acrophase_h,
        peak24_h: h1.peak_h,
        amp12: h2.amplitude,
        acrophase12_h: h2.acrophase_h,
        peak12_h: h2.peak_h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn quadrants() {
        // sin < 0 → φ in (0, π) → acrophase in (0, 12)
        let p = to_polar(0.0, -1.0, 24.0);
        assert_abs_diff_eq!(p.amplitude, 1.0);
        assert_abs_diff_eq!(p.acrophase_h, 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.peak_h, 18.0, epsilon = 1e-12);

        // sin > 0 → raw φ negative, wrapped into (12, 24)
        let p = to_polar(0.0, 1.0, 24.0);
        assert_abs_diff_eq!(p.acrophase_h, 18.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.peak_h, 6.0, epsilon = 1e-12);

        // cos < 0, sin = 0 → φ = π
        let p = to_polar(-2.0, 0.0, 24.0);
        assert_abs_diff_eq!(p.amplitude, 2.0);
        assert_abs_diff_eq!(p.acrophase_h, 12.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.peak_h, 12.0, epsilon = 1e-12);

        // third quadrant of (cos, −sin)
        let p = to_polar(-1.0, 1.0, 24.0);
        assert_abs_diff_eq!(p.acrophase_h, 15.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.peak_h, 9.0, epsilon = 1e-12);
    }

    #[test]
    fn positive_cos_zero_sin_is_midnight() {
        let p = to_polar(3.0, 0.0, 24.0);
        assert_eq!(p.acrophase_h, 0.0);
        assert_eq!(p.peak_h, 0.0);

        // −0.0 in the sine slot must not leak a negative zero
        let p = to_polar(3.0, -0.0, 24.0);
        assert!(p.acrophase_h.is_sign_positive());
    }

    #[test]
    fn zero_amplitude_reports_zero_phase() {
        for (c, s) in [(0.0, 0.0), (-0.0, 0.0), (-0.0, -0.0), (0.0, -0.0)] {
            let p = to_polar(c, s, 24.0);
            assert_eq!(p.amplitude, 0.0);
            assert_eq!(p.acrophase_h, 0.0);
            assert_eq!(p.peak_h, 0.0);
        }
    }

    #[test]
    fn wrap_folds_edge_values() {
        assert_eq!(wrap_hours(-1e-17, 24.0), 0.0);
        assert_eq!(wrap_hours(24.0, 24.0), 0.0);
        assert_abs_diff_eq!(wrap_hours(-6.0, 24.0), 18.0);
        assert_abs_diff_eq!(wrap_hours(50.0, 24.0), 2.0);
    }

    #[test]
    fn second_harmonic_uses_half_period() {
        let coeffs = HarmonicCoefficients {
            mesor: 1.0,
            cos1: 0.0,
            sin1: 0.0,
            cos2: 0.0,
            sin2: -1.0,
        };
        let r = extract_rhythm(&coeffs, 24.0);
        assert_eq!(r.mesor, 1.0);
        assert_eq!(r.amp24, 0.0);
        assert_eq!(r.acrophase24_h, 0.0);
        assert_abs_diff_eq!(r.amp12, 1.0);
        assert_abs_diff_eq!(r.acrophase12_h, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.peak12_h, 9.0, epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn amplitudes_and_phase_ranges(
            c1 in -100.0f64..100.0, s1 in -100.0f64..100.0,
            c2 in -100.0f64..100.0, s2 in -100.0f64..100.0,
        ) {
            let coeffs = HarmonicCoefficients { mesor: 0.0, cos1: c1, sin1: s1, cos2: c2, sin2: s2 };
            let r = extract_rhythm(&coeffs, 24.0);
            prop_assert_eq!(r.amp24, c1.hypot(s1));
            prop_assert_eq!(r.amp12, c2.hypot(s2));
            prop_assert!(r.amp24 >= 0.0 && r.amp12 >= 0.0);
            prop_assert!((0.0..24.0).contains(&r.acrophase24_h));
            prop_assert!((0.0..12.0).contains(&r.acrophase12_h));
            prop_assert!((0.0..24.0).contains(&r.peak24_h));
            prop_assert!((0.0..12.0).contains(&r.peak12_h));
        }

        #[test]
        fn coefficients_are_recovered_from_polar_form(
            amp in 0.01f64..50.0, acro in 0.0f64..24.0,
        ) {
            // A·cos(ωt + φ) = A cos φ · cos ωt − A sin φ · sin ωt
            let phi = acro / 24.0 * DPI;
            let p = to_polar(amp * phi.cos(), -amp * phi.sin(), 24.0);
            prop_assert!((p.amplitude - amp).abs() < 1e-9);
            let d = (p.acrophase_h - acro).abs();
            prop_assert!(d.min(24.0 - d) < 1e-9);
        }
    }
}
