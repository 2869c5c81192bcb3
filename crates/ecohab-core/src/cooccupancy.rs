//! Observed versus expected time two mice spend in the same compartment.

use crate::error::{EcohabError, Result};
use crate::interval::IntervalSet;
use crate::types::Compartment;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-compartment occupancy of one mouse.
pub type Occupancy = BTreeMap<Compartment, IntervalSet>;

fn check_total_time(total_time: f64) -> Result<()> {
    if total_time > 0.0 {
        Ok(())
    } else {
        Err(EcohabError::precondition(format!(
            "total_time must be positive, got {total_time}"
        )))
    }
}

/// Fraction of `total_time` both mice spent together in one compartment.
pub fn observed_fraction(a: &IntervalSet, b: &IntervalSet, total_time: f64) -> Result<f64> {
    check_total_time(total_time)?;
    Ok(a.overlap_duration(b) / total_time)
}

/// Fraction expected if the two presences were independent.
pub fn expected_fraction(a: &IntervalSet, b: &IntervalSet, total_time: f64) -> Result<f64> {
    check_total_time(total_time)?;
    Ok(a.total_duration() / total_time * b.total_duration() / total_time)
}

/// Whole-cage togetherness of one pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PairOccupancy {
    pub observed: f64,
    pub expected: f64,
}

impl PairOccupancy {
    /// Social-attraction signal: observed minus expected.
    pub fn excess(&self) -> f64 {
        self.observed - self.expected
    }
}

/// Sum observed and expected fractions over `compartments`.
///
/// A compartment missing from either side counts as no occupancy.
pub fn pair_fractions(
    a: &Occupancy,
    b: &Occupancy,
    compartments: &[Compartment],
    total_time: f64,
) -> Result<PairOccupancy> {
    check_total_time(total_time)?;
    let empty = IntervalSet::new();
    let mut out = PairOccupancy::default();
    for compartment in compartments {
        let ints_a = a.get(compartment).unwrap_or(&empty);
        let ints_b = b.get(compartment).unwrap_or(&empty);
        out.observed += observed_fraction(ints_a, ints_b, total_time)?;
        out.expected += expected_fraction(ints_a, ints_b, total_time)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn set(pairs: &[(f64, f64)]) -> IntervalSet {
        IntervalSet::from_pairs(pairs.iter().copied()).unwrap()
    }

    #[test]
    fn independence_check() {
        let a = set(&[(0.0, 100.0)]);
        let b = set(&[(0.0, 50.0)]);
        let expected = expected_fraction(&a, &b, 100.0).unwrap();
        let observed = observed_fraction(&a, &b, 100.0).unwrap();
        assert_relative_eq!(expected, 0.5);
        assert_relative_eq!(observed, 0.5);
        assert_relative_eq!(observed - expected, 0.0);
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = set(&[(0.0, 10.0), (30.0, 60.0)]);
        let b = set(&[(5.0, 35.0)]);
        assert_relative_eq!(
            observed_fraction(&a, &b, 60.0).unwrap(),
            observed_fraction(&b, &a, 60.0).unwrap()
        );
    }

    #[test]
    fn non_positive_total_time_is_a_precondition_error() {
        let a = set(&[(0.0, 10.0)]);
        assert!(matches!(
            observed_fraction(&a, &a, 0.0),
            Err(EcohabError::Precondition(_))
        ));
        assert!(expected_fraction(&a, &a, -5.0).is_err());
    }

    #[test]
    fn whole_cage_sums_compartments() {
        let mut a = Occupancy::new();
        let mut b = Occupancy::new();
        a.insert(Compartment(1), set(&[(0.0, 50.0)]));
        a.insert(Compartment(2), set(&[(50.0, 100.0)]));
        b.insert(Compartment(1), set(&[(25.0, 50.0)]));
        b.insert(Compartment(3), set(&[(50.0, 100.0)]));

        let pair = pair_fractions(&a, &b, &Compartment::standard(), 100.0).unwrap();
        assert_relative_eq!(pair.observed, 0.25);
        // compartment 1: 0.5 * 0.25; others contribute nothing
        assert_relative_eq!(pair.expected, 0.125);
        assert_relative_eq!(pair.excess(), 0.125);
    }
}
