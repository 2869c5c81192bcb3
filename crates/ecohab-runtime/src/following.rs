//! Following / avoidance across every ordered pair and phase.
//!
//! Each (phase, leader, follower) triple is an independent work unit; the
//! only join is merging the per-unit [`PairDetection`]s into the tensor.

use crate::batch::{evaluate, partition, Diagnostic};
use crate::dataset::Dataset;
use crate::timeline::Phase;
use ecohab_core::error::{EcohabError, Result};
use ecohab_core::patterns::{
    DetectorConfig, EventRecord, LagHistogram, PairDetection, PatternDetector, PreferenceTable,
    SampleWindow, CANONICAL_TRANSITIONS,
};
use ecohab_core::significance::SignificanceTester;
use ecohab_core::types::{MouseId, PositionSignal};
use ndarray::{s, Array3, Array5, Axis};
use serde::Serialize;
use tracing::{debug, info};

/// An event tagged with where it happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairEvent {
    pub phase: String,
    pub leader: MouseId,
    pub follower: MouseId,
    #[serde(flatten)]
    pub event: EventRecord,
}

/// Event counts indexed `[phase, leader, follower, transition, k]` with
/// `k` = followed, avoided, follower's baseline preference.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionTensor {
    pub mice: Vec<MouseId>,
    pub phases: Vec<String>,
    pub transitions: Vec<String>,
    pub counts: Array5<f64>,
    pub events: Vec<PairEvent>,
    pub follow_lags: LagHistogram,
    pub avoid_lags: LagHistogram,
    pub undetermined: usize,
    pub out_of_range: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl InteractionTensor {
    /// `(followed, avoided)` of one ordered pair in one phase.
    pub fn totals(&self, phase: usize, leader: usize, follower: usize) -> (u64, u64) {
        let pair = self.counts.slice(s![phase, leader, follower, .., ..]);
        let followed = pair.column(0).sum();
        let avoided = pair.column(1).sum();
        (followed as u64, avoided as u64)
    }
}

fn missing_signal(mouse: &MouseId) -> EcohabError {
    EcohabError::precondition(format!("mouse {mouse} has no position signal"))
}

/// Run the detector over every ordered pair of distinct mice in each phase.
pub fn interaction_tensor(
    dataset: &Dataset,
    phases: &[Phase],
    config: DetectorConfig,
) -> Result<InteractionTensor> {
    config.validate()?;
    let mice = dataset.mouse_ids();
    let n = mice.len();

    let signals: Vec<Option<&PositionSignal>> = mice
        .iter()
        .map(|m| dataset.mouse(m).map(|r| r.signal.as_ref()))
        .collect::<Result<_>>()?;
    let preferences: Vec<PreferenceTable> = mice
        .iter()
        .map(|m| dataset.mouse(m).map(|r| r.preferences()))
        .collect::<Result<_>>()?;
    let detectors: Vec<Option<PatternDetector<'_>>> = signals
        .iter()
        .map(|s| s.map(|sig| PatternDetector::new(sig, config)).transpose())
        .collect::<Result<_>>()?;

    let units: Vec<(usize, usize, usize)> = (0..phases.len())
        .flat_map(|p| {
            (0..n).flat_map(move |i| (0..n).filter(move |&j| j != i).map(move |j| (p, i, j)))
        })
        .collect();

    let results = evaluate(&units, |&(p, i, j)| -> Result<PairDetection> {
        let detector = detectors[i].as_ref().ok_or_else(|| missing_signal(&mice[i]))?;
        let follower = signals[j].ok_or_else(|| missing_signal(&mice[j]))?;
        let window = SampleWindow::from_epoch(follower, phases[p].start, phases[p].end);
        detector.detect(follower, &preferences[j], window)
    });

    let (ok, diagnostics) = partition(&units, results, |&(p, i, j)| {
        format!("following phase={} {} -> {}", phases[p].name, mice[i], mice[j])
    });

    let mut tensor = InteractionTensor {
        mice: mice.clone(),
        phases: phases.iter().map(|p| p.name.clone()).collect(),
        transitions: CANONICAL_TRANSITIONS.iter().map(|t| t.key()).collect(),
        counts: Array5::zeros((phases.len(), n, n, CANONICAL_TRANSITIONS.len(), 3)),
        events: Vec::new(),
        follow_lags: LagHistogram::new(config.lag_bins()),
        avoid_lags: LagHistogram::new(config.lag_bins()),
        undetermined: 0,
        out_of_range: 0,
        diagnostics,
    };

    for (idx, detection) in ok {
        let (p, i, j) = units[idx];
        for (t, row) in detection.counts.to_array().iter().enumerate() {
            for (k, v) in row.iter().enumerate() {
                tensor.counts[[p, i, j, t, k]] = *v;
            }
        }
        if detection.out_of_range > 0 {
            debug!(
                phase = %phases[p].name,
                leader = %mice[i],
                follower = %mice[j],
                skipped = detection.out_of_range,
                "events with windows off the signal"
            );
        }
        tensor.undetermined += detection.undetermined;
        tensor.out_of_range += detection.out_of_range;
        tensor.follow_lags.merge(&detection.follow_lags);
        tensor.avoid_lags.merge(&detection.avoid_lags);
        tensor.events.extend(detection.events.into_iter().map(|event| PairEvent {
            phase: phases[p].name.clone(),
            leader: mice[i].clone(),
            follower: mice[j].clone(),
            event,
        }));
    }

    info!(
        mice = n,
        phases = phases.len(),
        events = tensor.events.len(),
        failed = tensor.diagnostics.len(),
        "interaction tensor computed"
    );
    Ok(tensor)
}

/// Signed significance scores indexed `[phase, leader, follower]`.
#[derive(Debug, Clone, Serialize)]
pub struct SignificanceMatrix {
    pub mice: Vec<MouseId>,
    pub phases: Vec<String>,
    pub tester: SignificanceTester,
    pub scores: Array3<f64>,
}

pub fn significance_matrix(
    tensor: &InteractionTensor,
    tester: &SignificanceTester,
) -> SignificanceMatrix {
    let (n_p, n) = (tensor.phases.len(), tensor.mice.len());
    let mut scores = Array3::zeros((n_p, n, n));
    for p in 0..n_p {
        for i in 0..n {
            for j in (0..n).filter(|&j| j != i) {
                let (followed, avoided) = tensor.totals(p, i, j);
                scores[[p, i, j]] = tester.score(followed, avoided);
            }
        }
    }
    SignificanceMatrix {
        mice: tensor.mice.clone(),
        phases: tensor.phases.clone(),
        tester: *tester,
        scores,
    }
}

fn per_pair(tensor: &InteractionTensor, columns: std::ops::Range<usize>) -> Array3<f64> {
    tensor
        .counts
        .slice(s![.., .., .., .., columns])
        .sum_axis(Axis(4))
        .sum_axis(Axis(3))
}

/// Followed plus avoided events, `[phase, leader, follower]`.
pub fn interactions_per_pair(tensor: &InteractionTensor) -> Array3<f64> {
    per_pair(tensor, 0..2)
}

pub fn following_per_pair(tensor: &InteractionTensor) -> Array3<f64> {
    per_pair(tensor, 0..1)
}

pub fn avoiding_per_pair(tensor: &InteractionTensor) -> Array3<f64> {
    per_pair(tensor, 1..2)
}

/// How stable a following relationship is across phases.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairPersistence {
    pub first: MouseId,
    pub second: MouseId,
    /// Longest run of consecutive phases with significant following in
    /// either direction.
    pub longest_run: usize,
    pub active_phases: usize,
    /// Same, counting only even-indexed (dark) phases.
    pub longest_run_dark: usize,
    pub active_phases_dark: usize,
}

#[derive(Default)]
struct Run {
    current: usize,
    longest: usize,
    active: usize,
}

impl Run {
    fn step(&mut self, active: bool) {
        if active {
            self.current += 1;
            self.active += 1;
            self.longest = self.longest.max(self.current);
        } else {
            self.current = 0;
        }
    }
}

/// One entry per unordered pair `i <= j`.
pub fn relationship_persistence(sig: &SignificanceMatrix) -> Vec<PairPersistence> {
    let n = sig.mice.len();
    let n_p = sig.phases.len();
    let mut out = Vec::with_capacity(n * (n + 1) / 2);
    for i in 0..n {
        for j in i..n {
            let mut all = Run::default();
            let mut dark = Run::default();
            for p in 0..n_p {
                let active = sig.scores[[p, i, j]] > 0.0 || sig.scores[[p, j, i]] > 0.0;
                all.step(active);
                if p % 2 == 0 {
                    dark.step(active);
                }
            }
            out.push(PairPersistence {
                first: sig.mice[i].clone(),
                second: sig.mice[j].clone(),
                longest_run: all.longest,
                active_phases: all.active,
                longest_run_dark: dark.longest,
                active_phases_dark: dark.active,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(scores: Array3<f64>) -> SignificanceMatrix {
        let (n_p, n, _) = scores.dim();
        SignificanceMatrix {
            mice: (0..n).map(|i| MouseId::new(format!("m{i}"))).collect(),
            phases: (0..n_p).map(|p| format!("{p}")).collect(),
            tester: SignificanceTester::default(),
            scores,
        }
    }

    #[test]
    fn persistence_counts_runs_in_either_direction() {
        let mut scores = Array3::zeros((6, 2, 2));
        // phases 0, 1, 2 and 4 active; 1 only in the reverse direction
        scores[[0, 0, 1]] = 0.99;
        scores[[1, 1, 0]] = 0.97;
        scores[[2, 0, 1]] = 0.98;
        scores[[4, 0, 1]] = 0.99;
        // avoiding does not count
        scores[[5, 0, 1]] = -0.99;

        let out = relationship_persistence(&matrix(scores));
        assert_eq!(out.len(), 3);
        let pair = out.iter().find(|p| p.first.as_str() == "m0" && p.second.as_str() == "m1");
        let pair = pair.unwrap();
        assert_eq!(pair.longest_run, 3);
        assert_eq!(pair.active_phases, 4);
        // dark phases 0, 2, 4 all active
        assert_eq!(pair.longest_run_dark, 3);
        assert_eq!(pair.active_phases_dark, 3);

        let diag = &out[0];
        assert_eq!((diag.longest_run, diag.active_phases), (0, 0));
    }

    #[test]
    fn trailing_run_is_counted() {
        let mut scores = Array3::zeros((3, 2, 2));
        scores[[1, 0, 1]] = 0.99;
        scores[[2, 0, 1]] = 0.99;
        let out = relationship_persistence(&matrix(scores));
        assert_eq!(out[1].longest_run, 2);
    }
}
