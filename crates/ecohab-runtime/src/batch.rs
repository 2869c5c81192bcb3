//! Evaluation of independent work units.
//!
//! Units run on the rayon pool when the `parallel` feature is on and in a
//! plain loop otherwise. Results always come back in unit order, so merging
//! them is deterministic either way.

use ecohab_core::error::Result;
use serde::Serialize;
use tracing::warn;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A work unit that failed and was left out of the result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub unit: String,
    pub error: String,
}

/// Run `f` over every unit, keeping order.
pub fn evaluate<U, T, F>(units: &[U], f: F) -> Vec<Result<T>>
where
    U: Sync,
    T: Send,
    F: Fn(&U) -> Result<T> + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        units.par_iter().map(&f).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        units.iter().map(&f).collect()
    }
}

/// Split unit results into successes and diagnostics, logging each failure.
pub fn partition<U, T>(
    units: &[U],
    results: Vec<Result<T>>,
    describe: impl Fn(&U) -> String,
) -> (Vec<(usize, T)>, Vec<Diagnostic>) {
    let mut ok = Vec::with_capacity(results.len());
    let mut diagnostics = Vec::new();
    for (i, (unit, result)) in units.iter().zip(results).enumerate() {
        match result {
            Ok(value) => ok.push((i, value)),
            Err(e) => {
                let unit = describe(unit);
                warn!(unit = %unit, error = %e, "work unit failed, skipped");
                diagnostics.push(Diagnostic {
                    unit,
                    error: e.to_string(),
                });
            }
        }
    }
    (ok, diagnostics)
}
