//! Shared types used across all EcoHAB analyses.

use crate::error::{Result, SignalError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a tracked animal (usually its RFID tag).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MouseId(pub String);

impl MouseId {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MouseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MouseId {
    fn from(tag: &str) -> Self {
        Self(tag.to_string())
    }
}

/// A living chamber of the habitat, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Compartment(pub u8);

impl Compartment {
    /// The standard four-chamber cage.
    pub fn standard() -> Vec<Compartment> {
        (1..=4).map(Compartment).collect()
    }
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A discretized position state.
///
/// `0` means no signal. Even values are compartments on the antenna ring,
/// odd values are the pipes between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(pub u8);

impl State {
    pub const UNKNOWN: State = State(0);

    pub fn is_unknown(self) -> bool {
        self.0 == 0
    }

    /// In a connecting pipe.
    pub fn is_transit(self) -> bool {
        self.0 % 2 == 1
    }

    /// State diametrically opposite `end` as seen from `start` on the
    /// eight-state ring.
    pub fn opposite(start: State, end: State) -> State {
        let raw = 2 * i32::from(start.0) - i32::from(end.0) - 1;
        State((raw.rem_euclid(8) + 1) as u8)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A half-open time span `[start, end)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

impl From<(f64, f64)> for Interval {
    fn from((start, end): (f64, f64)) -> Self {
        Self { start, end }
    }
}

/// A mouse's state sampled at a fixed rate.
///
/// Sample `i` was taken at `origin + i / fs` epoch seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSignal")]
pub struct PositionSignal {
    /// Samples per second.
    pub fs: u32,
    /// Epoch second of sample 0.
    pub origin: f64,
    pub states: Vec<State>,
}

#[derive(Deserialize)]
struct RawSignal {
    fs: u32,
    origin: f64,
    states: Vec<State>,
}

impl TryFrom<RawSignal> for PositionSignal {
    type Error = crate::error::EcohabError;

    fn try_from(raw: RawSignal) -> Result<Self> {
        PositionSignal::new(raw.fs, raw.origin, raw.states)
    }
}

impl PositionSignal {
    pub fn new(fs: u32, origin: f64, states: Vec<State>) -> Result<Self> {
        if fs == 0 {
            return Err(SignalError::InvalidSamplingRate(fs).into());
        }
        Ok(Self { fs, origin, states })
    }

    /// Convenience for tests and synthetic data.
    pub fn from_raw(fs: u32, origin: f64, raw: &[u8]) -> Result<Self> {
        Self::new(fs, origin, raw.iter().copied().map(State).collect())
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Sample index at (or just after) an epoch second, not clamped.
    pub fn sample_at(&self, epoch_secs: f64) -> f64 {
        (epoch_secs - self.origin) * f64::from(self.fs)
    }

    /// Whether two signals share sampling rate and origin.
    pub fn aligned_with(&self, other: &PositionSignal) -> bool {
        self.fs == other.fs && self.origin == other.origin
    }
}

/// A single antenna read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub time: f64,
    pub antenna: u8,
}

impl Registration {
    pub fn new(time: f64, antenna: u8) -> Self {
        Self { time, antenna }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_state_on_ring() {
        // Leaving 2 for 4, the opposite neighbour of 2 is 8.
        assert_eq!(State::opposite(State(2), State(4)), State(8));
        assert_eq!(State::opposite(State(4), State(2)), State(6));
        assert_eq!(State::opposite(State(8), State(2)), State(6));
        assert_eq!(State::opposite(State(2), State(8)), State(4));
        assert_eq!(State::opposite(State(6), State(8)), State(4));
    }

    #[test]
    fn state_classes() {
        assert!(State::UNKNOWN.is_unknown());
        assert!(State(3).is_transit());
        assert!(!State(4).is_transit());
    }

    #[test]
    fn zero_sampling_rate_rejected() {
        assert!(PositionSignal::from_raw(0, 0.0, &[2, 2]).is_err());
    }

    #[test]
    fn zero_sampling_rate_rejected_when_deserializing() {
        let bad = serde_json::from_str::<PositionSignal>(r#"{"fs":0,"origin":0.0,"states":[2,2]}"#);
        assert!(bad.is_err());

        let ok: PositionSignal =
            serde_json::from_str(r#"{"fs":10,"origin":5.0,"states":[2,3,4]}"#).unwrap();
        assert_eq!(ok.fs, 10);
        assert_eq!(ok.states, vec![State(2), State(3), State(4)]);
    }

    #[test]
    fn sample_index_from_epoch() {
        let sig = PositionSignal::from_raw(10, 100.0, &[2; 50]).unwrap();
        assert_eq!(sig.sample_at(102.5), 25.0);
    }
}
