//! Following / avoidance detection between two mice.
//!
//! The leader's signal is scanned for change points. Every change that
//! carries a net move between two compartments is an event; the follower's
//! signal around the event decides whether the follower went the same way
//! (followed), the opposite way (avoided), or neither.
//!
//! A detection pass returns its own [`PairDetection`]; callers running many
//! passes merge those results instead of sharing accumulators.

use crate::error::{EcohabError, Result, SignalError};
use crate::types::{PositionSignal, State};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::trace;

/// A directed move between two neighbouring compartments on the antenna ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Transition {
    pub from: State,
    pub to: State,
}

/// The eight directed moves of the ring, in output order.
pub const CANONICAL_TRANSITIONS: [Transition; 8] = [
    Transition::new(2, 4),
    Transition::new(4, 2),
    Transition::new(4, 6),
    Transition::new(6, 4),
    Transition::new(6, 8),
    Transition::new(8, 6),
    Transition::new(8, 2),
    Transition::new(2, 8),
];

impl Transition {
    pub const fn new(from: u8, to: u8) -> Self {
        Self {
            from: State(from),
            to: State(to),
        }
    }

    /// Key such as `"24"`.
    pub fn key(&self) -> String {
        format!("{}{}", self.from.0, self.to.0)
    }

    /// Position in [`CANONICAL_TRANSITIONS`].
    pub fn canonical_index(&self) -> Option<usize> {
        CANONICAL_TRANSITIONS.iter().position(|t| t == self)
    }

    /// 0 for the ascending direction around the ring (including 8 -> 2),
    /// 1 for the descending one (including 2 -> 8).
    pub fn direction(&self) -> usize {
        match (self.from.0, self.to.0) {
            (8, 2) => 0,
            (2, 8) => 1,
            (a, b) if a < b => 0,
            _ => 1,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from.0, self.to.0)
    }
}

/// How often a mouse left each compartment in each ring direction.
///
/// Collected independently of the detector; only used to annotate counts
/// with the follower's unconditional preference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceTable {
    #[serde(default)]
    pub departures: BTreeMap<State, [u32; 2]>,
}

impl PreferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_departures(mut self, from: State, ascending: u32, descending: u32) -> Self {
        self.departures.insert(from, [ascending, descending]);
        self
    }

    /// Count departures between neighbouring compartments in a signal.
    ///
    /// Pipes are passed through; an unknown sample breaks the chain so no
    /// move is inferred across a gap in the data.
    pub fn from_signal(signal: &PositionSignal) -> Self {
        let mut table = Self::new();
        let mut last: Option<State> = None;
        for &state in &signal.states {
            if state.is_unknown() {
                last = None;
                continue;
            }
            if state.is_transit() || Some(state) == last {
                continue;
            }
            if let Some(from) = last {
                let t = Transition { from, to: state };
                if t.canonical_index().is_some() {
                    table.departures.entry(from).or_insert([0, 0])[t.direction()] += 1;
                }
            }
            last = Some(state);
        }
        table
    }

    /// Empirical probability of leaving `t.from` in `t`'s direction.
    ///
    /// 0.5 when no departures from `t.from` were observed.
    pub fn baseline(&self, t: Transition) -> f64 {
        match self.departures.get(&t.from) {
            Some(row) if row[0] + row[1] > 0 => {
                f64::from(row[t.direction()]) / f64::from(row[0] + row[1])
            }
            _ => 0.5,
        }
    }
}

/// Detector parameters, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Forward window in which the follower has to react.
    pub threshold_secs: f64,
    /// How far back the follower must have been at the leader's start.
    pub lookback_secs: f64,
    /// Short lookback in which the follower must not already have arrived.
    pub guard_secs: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold_secs: 3.0,
            lookback_secs: 2.0,
            guard_secs: 0.1,
        }
    }
}

impl DetectorConfig {
    /// Longest window any parameter may describe: one day.
    pub const MAX_WINDOW_SECS: f64 = 86_400.0;

    pub fn with_threshold(mut self, secs: f64) -> Self {
        self.threshold_secs = secs;
        self
    }

    pub fn with_lookback(mut self, secs: f64) -> Self {
        self.lookback_secs = secs;
        self
    }

    pub fn with_guard(mut self, secs: f64) -> Self {
        self.guard_secs = secs;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("threshold_secs", self.threshold_secs),
            ("lookback_secs", self.lookback_secs),
            ("guard_secs", self.guard_secs),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(EcohabError::invalid_config(
                    field,
                    value.to_string(),
                    "must be a non-negative number of seconds",
                ));
            }
            if value > Self::MAX_WINDOW_SECS {
                return Err(EcohabError::out_of_range(
                    field,
                    0.0,
                    Self::MAX_WINDOW_SECS,
                    value,
                ));
            }
        }
        if self.threshold_secs == 0.0 {
            return Err(EcohabError::invalid_config(
                "threshold_secs",
                "0",
                "forward window cannot be empty",
            ));
        }
        Ok(())
    }

    /// Number of lag-histogram bins: one per whole second plus the zero bin.
    pub fn lag_bins(&self) -> usize {
        self.threshold_secs.ceil() as usize + 1
    }
}

/// Classification of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Followed,
    Avoided,
    Undetermined,
}

/// One eligible move of the leader and what the follower did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    /// Sample index of the leader's arrival.
    pub sample: usize,
    pub transition: Transition,
    pub outcome: Outcome,
    /// Follower's reaction time within the forward window.
    pub lag_samples: Option<usize>,
    pub lag_secs: Option<f64>,
}

/// `[#followed, #avoided, baseline preference]` for one transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TransitionCounts {
    pub followed: u32,
    pub avoided: u32,
    pub baseline: f64,
}

impl TransitionCounts {
    pub fn to_array(&self) -> [f64; 3] {
        [f64::from(self.followed), f64::from(self.avoided), self.baseline]
    }
}

/// Event counts of one ordered pair, one slot per canonical transition.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PairCountMatrix {
    counts: [TransitionCounts; 8],
}

impl PairCountMatrix {
    /// Empty counts annotated with the follower's baseline preferences.
    pub fn with_baselines(preferences: &PreferenceTable) -> Self {
        let mut counts = [TransitionCounts::default(); 8];
        for (slot, t) in counts.iter_mut().zip(CANONICAL_TRANSITIONS) {
            slot.baseline = preferences.baseline(t);
        }
        Self { counts }
    }

    pub fn get(&self, t: Transition) -> Option<&TransitionCounts> {
        t.canonical_index().map(|i| &self.counts[i])
    }

    /// Count a classified event. Undetermined events and moves off the ring
    /// are ignored; returns whether anything was counted.
    pub fn record(&mut self, t: Transition, outcome: Outcome) -> bool {
        let Some(i) = t.canonical_index() else {
            return false;
        };
        match outcome {
            Outcome::Followed => self.counts[i].followed += 1,
            Outcome::Avoided => self.counts[i].avoided += 1,
            Outcome::Undetermined => return false,
        }
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (Transition, &TransitionCounts)> {
        CANONICAL_TRANSITIONS.into_iter().zip(self.counts.iter())
    }

    pub fn followed_total(&self) -> u32 {
        self.counts.iter().map(|c| c.followed).sum()
    }

    pub fn avoided_total(&self) -> u32 {
        self.counts.iter().map(|c| c.avoided).sum()
    }

    /// Add another pass's counts; baselines of `self` are kept.
    pub fn merge(&mut self, other: &PairCountMatrix) {
        for (mine, theirs) in self.counts.iter_mut().zip(&other.counts) {
            mine.followed += theirs.followed;
            mine.avoided += theirs.avoided;
        }
    }

    /// `8 x 3` numeric form in canonical order.
    pub fn to_array(&self) -> [[f64; 3]; 8] {
        self.counts.map(|c| c.to_array())
    }
}

/// Reaction times binned by whole seconds (rounded up).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LagHistogram {
    pub bins: Vec<u64>,
}

impl LagHistogram {
    pub fn new(n_bins: usize) -> Self {
        Self {
            bins: vec![0; n_bins.max(1)],
        }
    }

    pub fn record(&mut self, lag_secs: f64) {
        let last = self.bins.len() - 1;
        let idx = (lag_secs.ceil().max(0.0) as usize).min(last);
        self.bins[idx] += 1;
    }

    pub fn merge(&mut self, other: &LagHistogram) {
        if other.bins.len() > self.bins.len() {
            self.bins.resize(other.bins.len(), 0);
        }
        for (mine, theirs) in self.bins.iter_mut().zip(&other.bins) {
            *mine += theirs;
        }
    }

    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }
}

/// Result of one leader/follower pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PairDetection {
    pub counts: PairCountMatrix,
    /// Followed and avoided events, in scan order.
    pub events: Vec<EventRecord>,
    pub undetermined: usize,
    /// Events whose windows ran off either signal.
    pub out_of_range: usize,
    pub follow_lags: LagHistogram,
    pub avoid_lags: LagHistogram,
}

impl PairDetection {
    fn new(preferences: &PreferenceTable, lag_bins: usize) -> Self {
        Self {
            counts: PairCountMatrix::with_baselines(preferences),
            events: Vec::new(),
            undetermined: 0,
            out_of_range: 0,
            follow_lags: LagHistogram::new(lag_bins),
            avoid_lags: LagHistogram::new(lag_bins),
        }
    }

    pub fn merge(&mut self, other: PairDetection) {
        self.counts.merge(&other.counts);
        self.events.extend(other.events);
        self.undetermined += other.undetermined;
        self.out_of_range += other.out_of_range;
        self.follow_lags.merge(&other.follow_lags);
        self.avoid_lags.merge(&other.avoid_lags);
    }

    pub fn followed(&self) -> u32 {
        self.counts.followed_total()
    }

    pub fn avoided(&self) -> u32 {
        self.counts.avoided_total()
    }
}

/// Open sample range `(start, end)` in which leader events are considered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleWindow {
    pub start: f64,
    pub end: f64,
}

impl SampleWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn unbounded() -> Self {
        Self {
            start: f64::NEG_INFINITY,
            end: f64::INFINITY,
        }
    }

    /// Window for epoch seconds `[t_start, t_end]` on `signal`'s time base.
    pub fn from_epoch(signal: &PositionSignal, t_start: f64, t_end: f64) -> Self {
        Self {
            start: signal.sample_at(t_start),
            end: signal.sample_at(t_end),
        }
    }

    pub fn contains(&self, sample: usize) -> bool {
        let s = sample as f64;
        self.start < s && s < self.end
    }
}

/// Window lengths in samples.
#[derive(Debug, Clone, Copy)]
struct Windows {
    forward: usize,
    lookback: usize,
    guard: usize,
}

enum Scan {
    /// Carries no directional information, or the follower was not in a
    /// position to follow.
    Ineligible,
    OutOfRange,
    Event(EventRecord),
}

/// Indices where a state differs from the one before it.
///
/// The series is treated as circular: sample 0 counts as a change only when
/// it differs from the last sample.
fn change_points(states: &[State]) -> Vec<usize> {
    let Some(&last) = states.last() else {
        return Vec::new();
    };
    (0..states.len())
        .filter(|&i| {
            let previous = if i == 0 { last } else { states[i - 1] };
            states[i] != previous
        })
        .collect()
}

/// Scans one leader's signal against any number of followers.
///
/// Change points are found once at construction.
#[derive(Debug, Clone)]
pub struct PatternDetector<'a> {
    leader: &'a PositionSignal,
    change_points: Vec<usize>,
    config: DetectorConfig,
}

impl<'a> PatternDetector<'a> {
    pub fn new(leader: &'a PositionSignal, config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        let change_points = change_points(&leader.states);
        Ok(Self {
            leader,
            change_points,
            config,
        })
    }

    pub fn change_points(&self) -> &[usize] {
        &self.change_points
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    fn windows(&self) -> Windows {
        let fs = f64::from(self.leader.fs);
        Windows {
            forward: (self.config.threshold_secs * fs).round() as usize,
            lookback: (self.config.lookback_secs * fs).round() as usize,
            guard: (self.config.guard_secs * fs).floor() as usize,
        }
    }

    /// Classify every leader event inside `window` against `follower`.
    pub fn detect(
        &self,
        follower: &PositionSignal,
        preferences: &PreferenceTable,
        window: SampleWindow,
    ) -> Result<PairDetection> {
        if !self.leader.aligned_with(follower) {
            return Err(SignalError::Misaligned(format!(
                "leader fs={} origin={}, follower fs={} origin={}",
                self.leader.fs, self.leader.origin, follower.fs, follower.origin
            ))
            .into());
        }

        let windows = self.windows();
        let mut out = PairDetection::new(preferences, self.config.lag_bins());

        for k in 2..self.change_points.len() {
            let s = self.change_points[k];
            if !window.contains(s) {
                continue;
            }
            match self.scan(k, follower, windows) {
                Scan::Ineligible => {}
                Scan::OutOfRange => {
                    trace!(sample = s, "follower windows out of range, event skipped");
                    out.out_of_range += 1;
                }
                Scan::Event(event) => match event.outcome {
                    Outcome::Undetermined => out.undetermined += 1,
                    outcome => {
                        out.counts.record(event.transition, outcome);
                        if let Some(lag) = event.lag_secs {
                            match outcome {
                                Outcome::Followed => out.follow_lags.record(lag),
                                _ => out.avoid_lags.record(lag),
                            }
                        }
                        out.events.push(event);
                    }
                },
            }
        }

        Ok(out)
    }

    fn scan(&self, k: usize, follower: &PositionSignal, w: Windows) -> Scan {
        let a = &self.leader.states;
        let s = self.change_points[k];
        let start = a[self.change_points[k - 2]];
        let middle = a[self.change_points[k - 1]];
        let end = a[s];

        if start.is_unknown() || middle.is_unknown() || end.is_unknown() {
            return Scan::Ineligible;
        }
        if end.is_transit() || start == end {
            return Scan::Ineligible;
        }

        let b = &follower.states;
        if s < w.lookback || s >= b.len() {
            return Scan::OutOfRange;
        }
        let lookback = &b[s - w.lookback..s];
        let guard = &b[s - w.guard.min(s)..s];
        let forward = &b[s..s.saturating_add(w.forward).min(b.len())];

        let opposite = State::opposite(start, end);
        let same_start = lookback.contains(&start);
        let first_m1 = !guard.contains(&end) && !guard.contains(&opposite);
        if !(same_start && first_m1) {
            return Scan::Ineligible;
        }

        let to_end = forward.iter().position(|&x| x == end);
        let to_opposite = forward.iter().position(|&x| x == opposite);
        let (outcome, lag) = match (to_end, to_opposite) {
            (Some(f), Some(o)) if f < o => (Outcome::Followed, Some(f)),
            (Some(f), None) => (Outcome::Followed, Some(f)),
            (_, Some(o)) => (Outcome::Avoided, Some(o)),
            (None, None) => (Outcome::Undetermined, None),
        };

        Scan::Event(EventRecord {
            sample: s,
            transition: Transition { from: start, to: end },
            outcome,
            lag_samples: lag,
            lag_secs: lag.map(|l| l as f64 / f64::from(self.leader.fs)),
        })
    }
}
