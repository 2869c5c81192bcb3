//! Occupancy intervals of one mouse in one compartment.
//!
//! An [`IntervalSet`] keeps starts and ends as two parallel, time-ordered
//! sequences of half-open spans. Every constructor validates that the spans
//! are non-empty and non-overlapping, and every operation preserves it.

use crate::error::{IntervalError, Result};
use crate::types::Interval;
use serde::{Deserialize, Serialize};

/// Overlap length of two half-open intervals (0 when disjoint).
pub fn interval_overlap(a: Interval, b: Interval) -> f64 {
    (a.end.min(b.end) - a.start.max(b.start)).max(0.0)
}

/// Ordered, non-overlapping occupancy spans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawIntervals", into = "RawIntervals")]
pub struct IntervalSet {
    starts: Vec<f64>,
    ends: Vec<f64>,
}

/// Wire shape used by serde; validated on the way in.
#[derive(Serialize, Deserialize)]
struct RawIntervals {
    starts: Vec<f64>,
    ends: Vec<f64>,
}

impl TryFrom<RawIntervals> for IntervalSet {
    type Error = crate::error::EcohabError;

    fn try_from(raw: RawIntervals) -> Result<Self> {
        IntervalSet::from_parallel(raw.starts, raw.ends)
    }
}

impl From<IntervalSet> for RawIntervals {
    fn from(set: IntervalSet) -> Self {
        RawIntervals {
            starts: set.starts,
            ends: set.ends,
        }
    }
}

impl IntervalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from parallel start/end sequences, validating the ordering invariant.
    pub fn from_parallel(starts: Vec<f64>, ends: Vec<f64>) -> Result<Self> {
        if starts.len() != ends.len() {
            return Err(IntervalError::LengthMismatch {
                starts: starts.len(),
                ends: ends.len(),
            }
            .into());
        }
        for (index, (&start, &end)) in starts.iter().zip(&ends).enumerate() {
            if !start.is_finite() || !end.is_finite() {
                return Err(IntervalError::NonFinite(index).into());
            }
            if start < 0.0 {
                return Err(IntervalError::NegativeStart { index, start }.into());
            }
            if start >= end {
                return Err(IntervalError::Inverted { index, start, end }.into());
            }
            if index > 0 && start < ends[index - 1] {
                return Err(IntervalError::Unordered {
                    index,
                    start,
                    previous_end: ends[index - 1],
                }
                .into());
            }
        }
        Ok(Self { starts, ends })
    }

    /// Build from `(start, end)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let (starts, ends) = pairs.into_iter().unzip();
        Self::from_parallel(starts, ends)
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    pub fn starts(&self) -> &[f64] {
        &self.starts
    }

    pub fn ends(&self) -> &[f64] {
        &self.ends
    }

    pub fn get(&self, idx: usize) -> Option<Interval> {
        Some(Interval::new(*self.starts.get(idx)?, *self.ends.get(idx)?))
    }

    pub fn iter(&self) -> impl Iterator<Item = Interval> + '_ {
        self.starts
            .iter()
            .zip(&self.ends)
            .map(|(&s, &e)| Interval::new(s, e))
    }

    /// `(start, end)` pairs, mostly for assertions.
    pub fn to_pairs(&self) -> Vec<(f64, f64)> {
        self.iter().map(|i| (i.start, i.end)).collect()
    }

    /// Sum of span lengths.
    pub fn total_duration(&self) -> f64 {
        self.iter().map(|i| i.duration()).sum()
    }

    /// Total time during which both sets are occupied.
    ///
    /// Equals the sum of pairwise overlaps; both sides are disjoint so a
    /// single merge pass is enough.
    pub fn overlap_duration(&self, other: &IntervalSet) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut total = 0.0;
        while i < self.len() && j < other.len() {
            let a = Interval::new(self.starts[i], self.ends[i]);
            let b = Interval::new(other.starts[j], other.ends[j]);
            total += interval_overlap(a, b);
            if a.end <= b.end {
                i += 1;
            } else {
                j += 1;
            }
        }
        total
    }

    /// Remove every sub-span during which `other` is also occupied.
    ///
    /// One forward sweep over `self`: for each span a cursor starts at its
    /// start and walks across the `other` spans it meets. A gap before an
    /// `other` span is emitted (start clipped, or the left half of a split),
    /// the cursor jumps to that span's end (start clipped to `oe`), and
    /// whatever is left after the last blocker is emitted as the tail (end
    /// clipped to `os`, or the right half of a split). Fully covered spans
    /// emit nothing. Strict comparisons keep zero-length pieces out.
    pub fn subtract(&mut self, other: &IntervalSet) {
        if self.is_empty() || other.is_empty() {
            return;
        }

        let mut starts = Vec::with_capacity(self.len());
        let mut ends = Vec::with_capacity(self.len());
        // First `other` span that can still touch the current or any later span.
        let mut j = 0;

        for (&s, &e) in self.starts.iter().zip(&self.ends) {
            while j < other.len() && other.ends[j] <= s {
                j += 1;
            }

            let mut cursor = s;
            let mut k = j;
            while k < other.len() && other.starts[k] < e {
                let (os, oe) = (other.starts[k], other.ends[k]);
                if os > cursor {
                    starts.push(cursor);
                    ends.push(os);
                }
                cursor = cursor.max(oe);
                if cursor >= e {
                    break;
                }
                k += 1;
            }

            if cursor < e {
                starts.push(cursor);
                ends.push(e);
            }
        }

        self.starts = starts;
        self.ends = ends;
    }

    /// Non-mutating [`subtract`](Self::subtract).
    pub fn difference(&self, other: &IntervalSet) -> IntervalSet {
        let mut out = self.clone();
        out.subtract(other);
        out
    }

    /// Restrict to `[start, end)`, trimming spans that cross the window edges.
    pub fn clipped(&self, start: f64, end: f64) -> IntervalSet {
        let mut out = IntervalSet::new();
        for iv in self.iter() {
            let s = iv.start.max(start);
            let e = iv.end.min(end);
            if s < e {
                out.starts.push(s);
                out.ends.push(e);
            }
        }
        out
    }

    /// Append a later set, e.g. the next phase of a phase collection.
    ///
    /// Spans of `later` that would break the ordering are trimmed to start
    /// at the current last end; spans swallowed entirely are dropped.
    pub fn extend(&mut self, later: &IntervalSet) {
        for iv in later.iter() {
            let floor = self.ends.last().copied().unwrap_or(f64::NEG_INFINITY);
            let s = iv.start.max(floor);
            if s < iv.end {
                self.starts.push(s);
                self.ends.push(iv.end);
            }
        }
    }

    /// Number of entries (visits).
    pub fn visits(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn set(pairs: &[(f64, f64)]) -> IntervalSet {
        IntervalSet::from_pairs(pairs.iter().copied()).unwrap()
    }

    #[test]
    fn construction_rejects_bad_spans() {
        assert!(IntervalSet::from_parallel(vec![1.0], vec![]).is_err());
        assert!(IntervalSet::from_pairs([(5.0, 5.0)]).is_err());
        assert!(IntervalSet::from_pairs([(5.0, 4.0)]).is_err());
        assert!(IntervalSet::from_pairs([(-1.0, 4.0)]).is_err());
        assert!(IntervalSet::from_pairs([(0.0, 4.0), (3.0, 6.0)]).is_err());
        assert!(IntervalSet::from_pairs([(0.0, f64::NAN)]).is_err());
        // Touching spans are fine.
        assert!(IntervalSet::from_pairs([(0.0, 4.0), (4.0, 6.0)]).is_ok());
    }

    #[test]
    fn full_containment_deletes() {
        let mut a = set(&[(10.0, 20.0)]);
        a.subtract(&set(&[(5.0, 25.0)]));
        assert!(a.is_empty());
    }

    #[test]
    fn contained_other_splits() {
        let mut a = set(&[(10.0, 20.0)]);
        a.subtract(&set(&[(13.0, 16.0)]));
        assert_eq!(a.to_pairs(), vec![(10.0, 13.0), (16.0, 20.0)]);
    }

    #[test]
    fn start_inside_other_clips_start() {
        let mut a = set(&[(10.0, 20.0)]);
        a.subtract(&set(&[(5.0, 12.0)]));
        assert_eq!(a.to_pairs(), vec![(12.0, 20.0)]);
    }

    #[test]
    fn end_inside_other_clips_end() {
        let mut a = set(&[(10.0, 20.0)]);
        a.subtract(&set(&[(15.0, 30.0)]));
        assert_eq!(a.to_pairs(), vec![(10.0, 15.0)]);
    }

    #[test]
    fn shared_start_drops_empty_left_remnant() {
        let mut a = set(&[(10.0, 20.0)]);
        a.subtract(&set(&[(10.0, 14.0)]));
        assert_eq!(a.to_pairs(), vec![(14.0, 20.0)]);
    }

    #[test]
    fn shared_end_drops_empty_right_remnant() {
        let mut a = set(&[(10.0, 20.0)]);
        a.subtract(&set(&[(14.0, 20.0)]));
        assert_eq!(a.to_pairs(), vec![(10.0, 14.0)]);
    }

    #[test]
    fn touching_spans_do_not_overlap() {
        let mut a = set(&[(10.0, 20.0)]);
        a.subtract(&set(&[(0.0, 10.0), (20.0, 30.0)]));
        assert_eq!(a.to_pairs(), vec![(10.0, 20.0)]);
    }

    #[test]
    fn one_span_against_many() {
        let mut a = set(&[(0.0, 100.0)]);
        a.subtract(&set(&[(10.0, 20.0), (30.0, 40.0), (90.0, 120.0)]));
        assert_eq!(
            a.to_pairs(),
            vec![(0.0, 10.0), (20.0, 30.0), (40.0, 90.0)]
        );
    }

    #[test]
    fn one_other_span_across_many() {
        let mut a = set(&[(0.0, 5.0), (6.0, 8.0), (9.0, 12.0), (20.0, 25.0)]);
        a.subtract(&set(&[(4.0, 10.0)]));
        assert_eq!(a.to_pairs(), vec![(0.0, 4.0), (10.0, 12.0), (20.0, 25.0)]);
    }

    #[test]
    fn empty_inputs_are_no_ops() {
        let mut a = set(&[(1.0, 2.0)]);
        a.subtract(&IntervalSet::new());
        assert_eq!(a.to_pairs(), vec![(1.0, 2.0)]);

        let mut empty = IntervalSet::new();
        empty.subtract(&a);
        assert!(empty.is_empty());
    }

    #[test]
    fn overlap_matches_pairwise_sum() {
        let a = set(&[(0.0, 10.0), (20.0, 30.0)]);
        let b = set(&[(5.0, 25.0), (28.0, 40.0)]);
        let pairwise: f64 = a
            .iter()
            .flat_map(|x| b.iter().map(move |y| interval_overlap(x, y)))
            .sum();
        assert_relative_eq!(a.overlap_duration(&b), pairwise);
        assert_relative_eq!(a.overlap_duration(&b), 12.0);
    }

    #[test]
    fn clipping_to_window() {
        let a = set(&[(0.0, 10.0), (20.0, 30.0), (40.0, 50.0)]);
        assert_eq!(a.clipped(5.0, 25.0).to_pairs(), vec![(5.0, 10.0), (20.0, 25.0)]);
        assert!(a.clipped(10.0, 20.0).is_empty());
    }

    #[test]
    fn extend_keeps_order() {
        let mut a = set(&[(0.0, 10.0)]);
        a.extend(&set(&[(5.0, 15.0), (20.0, 30.0)]));
        assert_eq!(a.to_pairs(), vec![(0.0, 10.0), (10.0, 15.0), (20.0, 30.0)]);
    }

    #[test]
    fn serde_validates() {
        let ok: IntervalSet = serde_json::from_str(r#"{"starts":[1.0],"ends":[2.0]}"#).unwrap();
        assert_eq!(ok.to_pairs(), vec![(1.0, 2.0)]);
        let bad = serde_json::from_str::<IntervalSet>(r#"{"starts":[3.0],"ends":[2.0]}"#);
        assert!(bad.is_err());
    }
}
