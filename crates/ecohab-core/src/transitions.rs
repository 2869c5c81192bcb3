//! Timing between consecutive antenna registrations.

use crate::types::Registration;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Durations keyed by antenna pair, e.g. `"1 2"`.
pub type TransitionDurations = BTreeMap<String, Vec<f64>>;

/// Time between each pair of consecutive registrations of one mouse.
pub fn antenna_transitions(registrations: &[Registration]) -> TransitionDurations {
    let mut out = TransitionDurations::new();
    for pair in registrations.windows(2) {
        let (first, second) = (pair[0], pair[1]);
        out.entry(format!("{} {}", first.antenna, second.antenna))
            .or_default()
            .push(second.time - first.time);
    }
    out
}

/// Append every duration of `other` to `into`.
pub fn merge_transitions(into: &mut TransitionDurations, other: TransitionDurations) {
    for (key, durations) in other {
        into.entry(key).or_default().extend(durations);
    }
}

/// Runs of more than two consecutive reads at the same antenna.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegistrationTrains {
    /// Per antenna: last read minus first read of each train.
    pub durations: BTreeMap<u8, Vec<f64>>,
    /// Per antenna: number of reads in each train.
    pub counts: BTreeMap<u8, Vec<u32>>,
}

impl RegistrationTrains {
    pub fn merge(&mut self, other: RegistrationTrains) {
        for (antenna, d) in other.durations {
            self.durations.entry(antenna).or_default().extend(d);
        }
        for (antenna, c) in other.counts {
            self.counts.entry(antenna).or_default().extend(c);
        }
    }

    pub fn train_count(&self) -> usize {
        self.counts.values().map(Vec::len).sum()
    }

    fn push(&mut self, antenna: u8, duration: f64, count: u32) {
        self.durations.entry(antenna).or_default().push(duration);
        self.counts.entry(antenna).or_default().push(count);
    }
}

const MIN_TRAIN: u32 = 3;

/// Find registration trains in one mouse's reads.
///
/// A mouse sitting under an antenna produces bursts of reads there; the
/// trailing run is included.
pub fn registration_trains(registrations: &[Registration]) -> RegistrationTrains {
    let mut out = RegistrationTrains::default();
    let Some(first) = registrations.first() else {
        return out;
    };

    let mut run_start = *first;
    let mut last = *first;
    let mut count = 1u32;
    for &reg in &registrations[1..] {
        if reg.antenna == run_start.antenna {
            count += 1;
        } else {
            if count >= MIN_TRAIN {
                out.push(run_start.antenna, last.time - run_start.time, count);
            }
            run_start = reg;
            count = 1;
        }
        last = reg;
    }
    if count >= MIN_TRAIN {
        out.push(run_start.antenna, last.time - run_start.time, count);
    }
    out
}

/// `key;v;v;...` lines, one per key, values with six decimals.
pub fn format_duration_log<K, V>(entries: &BTreeMap<K, Vec<V>>) -> String
where
    K: std::fmt::Display,
    V: Copy + Into<f64>,
{
    let mut out = String::new();
    for (key, values) in entries {
        let _ = write!(out, "{key};");
        for &v in values {
            let _ = write!(out, "{:.6};", v.into());
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn regs(raw: &[(f64, u8)]) -> Vec<Registration> {
        raw.iter().map(|&(t, a)| Registration::new(t, a)).collect()
    }

    #[test]
    fn transitions_keyed_by_antenna_pair() {
        let r = regs(&[(0.0, 1), (2.5, 2), (3.0, 2), (10.0, 1)]);
        let out = antenna_transitions(&r);
        assert_eq!(out["1 2"], vec![2.5]);
        assert_eq!(out["2 2"], vec![0.5]);
        assert_eq!(out["2 1"], vec![7.0]);
        assert!(antenna_transitions(&r[..1]).is_empty());
    }

    #[test]
    fn merging_appends() {
        let mut a = antenna_transitions(&regs(&[(0.0, 1), (1.0, 2)]));
        let b = antenna_transitions(&regs(&[(5.0, 1), (8.0, 2), (9.0, 3)]));
        merge_transitions(&mut a, b);
        assert_eq!(a["1 2"], vec![1.0, 3.0]);
        assert_eq!(a["2 3"], vec![1.0]);
    }

    #[test]
    fn trains_need_three_reads() {
        let r = regs(&[
            (0.0, 1),
            (1.0, 1),
            (2.0, 2),
            (3.0, 2),
            (4.5, 2),
            (6.0, 3),
            (7.0, 4),
            (7.5, 4),
            (9.0, 4),
            (9.5, 4),
        ]);
        let trains = registration_trains(&r);
        assert_eq!(trains.counts[&2], vec![3]);
        assert_relative_eq!(trains.durations[&2][0], 2.5);
        // trailing run
        assert_eq!(trains.counts[&4], vec![4]);
        assert_relative_eq!(trains.durations[&4][0], 2.5);
        assert!(!trains.counts.contains_key(&1));
        assert_eq!(trains.train_count(), 2);
    }

    #[test]
    fn duration_log_format() {
        let mut map = TransitionDurations::new();
        map.insert("1 2".into(), vec![1.0, 2.5]);
        map.insert("2 1".into(), vec![]);
        assert_eq!(format_duration_log(&map), "1 2;1.000000;2.500000;\n2 1;\n");

        let mut counts: BTreeMap<u8, Vec<u32>> = BTreeMap::new();
        counts.insert(3, vec![4]);
        assert_eq!(format_duration_log(&counts), "3;4.000000;\n");
    }
}
