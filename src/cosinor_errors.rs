use std::fmt;

use thiserror::Error;

/// Why a subject could not be fitted.
///
/// Carried by [`CosinorError::DegenerateFit`] and by the skip records of the
/// subject aggregator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DegenerateReason {
    #[error("too few measurements ({found} found, {required} required)")]
    TooFewMeasurements { found: usize, required: usize },

    #[error("rank-deficient design matrix (rank {rank}, {required} required)")]
    RankDeficient { rank: usize, required: usize },
}

#[derive(Error, Debug)]
pub enum CosinorError {
    #[error("Degenerate harmonic fit: {0}")]
    DegenerateFit(DegenerateReason),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid fit parameter: {0}")]
    InvalidFitParameter(String),

    #[error("Invalid load configuration: {0}")]
    InvalidLoadConfig(String),

    #[error("Linear algebra failure: {0}")]
    LinearAlgebra(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl From<DegenerateReason> for CosinorError {
    fn from(reason: DegenerateReason) -> Self {
        CosinorError::DegenerateFit(reason)
    }
}

impl PartialEq for CosinorError {
    fn eq(&self, other: &Self) -> bool {
        use CosinorError::*;
        match (self, other) {
            (DegenerateFit(a), DegenerateFit(b)) => a == b,
            (InvalidInput(a), InvalidInput(b)) => a == b,
            (InvalidFitParameter(a), InvalidFitParameter(b)) => a == b,
            (InvalidLoadConfig(a), InvalidLoadConfig(b)) => a == b,
            (LinearAlgebra(a), LinearAlgebra(b)) => a == b,

            // Not comparable: equal when the variant matches
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            _ => false,
        }
    }
}

/// Advisory diagnostics attached to a successful fit.
///
/// A warning never prevents a result from being returned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericWarning {
    /// R² fell outside `[0, 1]` by more than the configured tolerance.
    RSquaredOutOfRange(f64),
    /// The design matrix is close to rank-deficient.
    IllConditioned { condition_number: f64 },
    /// The observed values have zero variance; R² is reported as 1.0.
    ConstantSignal,
}

impl fmt::Display for NumericWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericWarning::RSquaredOutOfRange(r2) => write!(f, "r2_out_of_range({r2:.3e})"),
            NumericWarning::IllConditioned { condition_number } => {
                write!(f, "ill_conditioned(cond={condition_number:.3e})")
            }
            NumericWarning::ConstantSignal => write!(f, "constant_signal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_reason_messages() {
        let r = DegenerateReason::TooFewMeasurements {
            found: 4,
            required: 5,
        };
        assert_eq!(r.to_string(), "too few measurements (4 found, 5 required)");

        let e: CosinorError = DegenerateReason::RankDeficient {
            rank: 1,
            required: 5,
        }
        .into();
        assert_eq!(
            e.to_string(),
            "Degenerate harmonic fit: rank-deficient design matrix (rank 1, 5 required)"
        );
    }

    #[test]
    fn io_errors_compare_by_variant() {
        let a = CosinorError::from(std::io::Error::other("a"));
        let b = CosinorError::from(std::io::Error::other("b"));
        assert_eq!(a, b);
        assert_ne!(a, CosinorError::InvalidInput("a".into()));
    }
}
