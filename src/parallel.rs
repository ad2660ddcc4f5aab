//! Conditional parallel iteration.
//!
//! With the `parallel` feature, per-subject work runs on the rayon pool;
//! without it, iteration is sequential. Indexed rayon iterators collect in
//! input order, so both paths yield identical outputs.

/// `into_par_iter()` with the `parallel` feature, `into_iter()` otherwise.
macro_rules! iter_maybe_parallel {
    ($expr:expr) => {{
        #[cfg(feature = "parallel")]
        {
            use rayon::iter::IntoParallelIterator;

            IntoParallelIterator::into_par_iter($expr)
        }
        #[cfg(not(feature = "parallel"))]
        {
            IntoIterator::into_iter($expr)
        }
    }};
}

pub(crate) use iter_maybe_parallel;
