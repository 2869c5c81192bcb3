//! The cleaned per-mouse inputs of one experiment.

use crate::timeline::{PhaseSelection, Timeline};
use ecohab_core::cooccupancy::Occupancy;
use ecohab_core::error::{DataError, EcohabError, Result, SignalError};
use ecohab_core::interval::IntervalSet;
use ecohab_core::patterns::PreferenceTable;
use ecohab_core::types::{Compartment, MouseId, PositionSignal, Registration};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

fn default_compartments() -> Vec<Compartment> {
    Compartment::standard()
}

/// Everything known about one mouse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MouseRecord {
    #[serde(default)]
    pub occupancy: Occupancy,
    #[serde(default)]
    pub signal: Option<PositionSignal>,
    /// Supplied departure counts; derived from `signal` when absent.
    #[serde(default)]
    pub preferences: Option<PreferenceTable>,
    #[serde(default)]
    pub registrations: Vec<Registration>,
}

impl MouseRecord {
    pub fn preferences(&self) -> PreferenceTable {
        match (&self.preferences, &self.signal) {
            (Some(p), _) => p.clone(),
            (None, Some(signal)) => PreferenceTable::from_signal(signal),
            (None, None) => PreferenceTable::default(),
        }
    }

    /// Entries into any compartment.
    pub fn visits(&self) -> usize {
        self.occupancy.values().map(IntervalSet::visits).sum()
    }
}

/// One experiment: cage layout, phases and mice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default = "default_compartments")]
    pub compartments: Vec<Compartment>,
    pub timeline: Timeline,
    pub mice: BTreeMap<MouseId, MouseRecord>,
}

impl Dataset {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            compartments: default_compartments(),
            timeline,
            mice: BTreeMap::new(),
        }
    }

    pub fn with_compartments(mut self, compartments: Vec<Compartment>) -> Self {
        self.compartments = compartments;
        self
    }

    pub fn with_mouse(mut self, id: impl Into<MouseId>, record: MouseRecord) -> Self {
        self.mice.insert(id.into(), record);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let dataset: Dataset = serde_json::from_str(json)?;
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let dataset = Self::from_json(&text)?;
        debug!(
            path = %path.display(),
            mice = dataset.mice.len(),
            phases = dataset.timeline.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    /// Check the dataset is usable as a whole.
    pub fn validate(&self) -> Result<()> {
        if self.mice.is_empty() {
            return Err(DataError::NoMice.into());
        }
        self.timeline.validate()?;

        let mut time_base: Option<(&MouseId, &PositionSignal)> = None;
        for (id, record) in &self.mice {
            for compartment in record.occupancy.keys() {
                if !self.compartments.contains(compartment) {
                    return Err(DataError::UnknownCompartment {
                        mouse: id.to_string(),
                        compartment: compartment.0,
                    }
                    .into());
                }
            }
            if let Some(signal) = &record.signal {
                if signal.fs == 0 {
                    return Err(SignalError::InvalidSamplingRate(signal.fs).into());
                }
                match time_base {
                    None => time_base = Some((id, signal)),
                    Some((first, base)) if !base.aligned_with(signal) => {
                        return Err(SignalError::Misaligned(format!(
                            "{first} has fs={} origin={}, {id} has fs={} origin={}",
                            base.fs, base.origin, signal.fs, signal.origin
                        ))
                        .into());
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }

    /// Mice in stable (sorted) order; indexes every result tensor.
    pub fn mouse_ids(&self) -> Vec<MouseId> {
        self.mice.keys().cloned().collect()
    }

    pub fn mouse(&self, id: &MouseId) -> Result<&MouseRecord> {
        self.mice
            .get(id)
            .ok_or_else(|| EcohabError::unknown_mouse(id.as_str()))
    }

    /// Occupancy of one compartment restricted to a selection, member phases
    /// concatenated in order.
    pub fn occupancy_in(
        &self,
        mouse: &MouseId,
        compartment: Compartment,
        selection: &PhaseSelection,
    ) -> Result<IntervalSet> {
        let record = self.mouse(mouse)?;
        let mut out = IntervalSet::new();
        if let Some(intervals) = record.occupancy.get(&compartment) {
            for phase in selection.phases() {
                out.extend(&intervals.clipped(phase.start, phase.end));
            }
        }
        Ok(out)
    }

    /// Whole-cage occupancy of one mouse restricted to a selection.
    pub fn occupancy_map(&self, mouse: &MouseId, selection: &PhaseSelection) -> Result<Occupancy> {
        self.compartments
            .iter()
            .map(|&c| Ok((c, self.occupancy_in(mouse, c, selection)?)))
            .collect()
    }

    /// Mice that entered compartments at least `min_visits` times.
    pub fn mice_with_min_visits(&self, min_visits: usize) -> Vec<MouseId> {
        self.mice
            .iter()
            .filter(|(_, r)| r.visits() >= min_visits)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Copy keeping only `keep`.
    pub fn retain_mice(&self, keep: &[MouseId]) -> Dataset {
        Dataset {
            compartments: self.compartments.clone(),
            timeline: self.timeline.clone(),
            mice: self
                .mice
                .iter()
                .filter(|(id, _)| keep.contains(id))
                .map(|(id, r)| (id.clone(), r.clone()))
                .collect(),
        }
    }

    /// Registrations of one mouse inside `[start, end)`.
    pub fn registrations_between(
        &self,
        mouse: &MouseId,
        start: f64,
        end: f64,
    ) -> Result<Vec<Registration>> {
        Ok(self
            .mouse(mouse)?
            .registrations
            .iter()
            .filter(|r| start <= r.time && r.time < end)
            .copied()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::Phase;
    use approx::assert_relative_eq;

    fn set(pairs: &[(f64, f64)]) -> IntervalSet {
        IntervalSet::from_pairs(pairs.iter().copied()).unwrap()
    }

    fn dataset() -> Dataset {
        let timeline = Timeline::new(vec![
            Phase::new("1 dark", 0.0, 100.0).unwrap(),
            Phase::new("1 light", 100.0, 200.0).unwrap(),
            Phase::new("2 dark", 200.0, 300.0).unwrap(),
        ])
        .unwrap();
        let mut a = MouseRecord::default();
        a.occupancy.insert(Compartment(1), set(&[(50.0, 150.0), (250.0, 260.0)]));
        let mut b = MouseRecord::default();
        b.occupancy.insert(Compartment(2), set(&[(0.0, 10.0)]));
        Dataset::new(timeline).with_mouse("a", a).with_mouse("b", b)
    }

    #[test]
    fn occupancy_clipped_to_collection() {
        let ds = dataset();
        let dark = PhaseSelection::collection("ALL DARK", ds.timeline.dark()).unwrap();
        let ints = ds
            .occupancy_in(&MouseId::from("a"), Compartment(1), &dark)
            .unwrap();
        assert_eq!(ints.to_pairs(), vec![(50.0, 100.0), (250.0, 260.0)]);
        assert_relative_eq!(ints.total_duration(), 60.0);
    }

    #[test]
    fn validation_catches_unknown_compartment() {
        let mut ds = dataset();
        assert!(ds.validate().is_ok());
        ds.compartments = vec![Compartment(1)];
        assert!(matches!(
            ds.validate(),
            Err(EcohabError::Data(DataError::UnknownCompartment { .. }))
        ));
    }

    #[test]
    fn validation_catches_misaligned_signals() {
        let mut ds = dataset();
        for (i, record) in ds.mice.values_mut().enumerate() {
            record.signal = Some(PositionSignal::from_raw(10, i as f64, &[2, 2]).unwrap());
        }
        assert!(matches!(ds.validate(), Err(EcohabError::Signal(_))));
    }

    #[test]
    fn zero_sampling_rate_rejected() {
        let mut ds = dataset();
        if let Some(a) = ds.mice.get_mut(&MouseId::from("a")) {
            a.signal = Some(PositionSignal::from_raw(10, 0.0, &[2, 3, 4]).unwrap());
        }
        let json = serde_json::to_string(&ds).unwrap();
        assert!(Dataset::from_json(&json).is_ok());

        let broken = json.replace(r#""fs":10"#, r#""fs":0"#);
        assert_ne!(broken, json);
        assert!(Dataset::from_json(&broken).is_err());

        if let Some(signal) = ds.mice.get_mut(&MouseId::from("a")).and_then(|a| a.signal.as_mut()) {
            signal.fs = 0;
        }
        assert!(matches!(
            ds.validate(),
            Err(EcohabError::Signal(SignalError::InvalidSamplingRate(0)))
        ));
    }

    #[test]
    fn empty_dataset_rejected() {
        let ds = Dataset::new(Timeline::default());
        assert!(matches!(ds.validate(), Err(EcohabError::Data(DataError::NoMice))));
    }

    #[test]
    fn visit_filter() {
        let ds = dataset();
        assert_eq!(ds.mice_with_min_visits(2), vec![MouseId::from("a")]);
        assert_eq!(ds.mice_with_min_visits(1).len(), 2);
        let only_a = ds.retain_mice(&ds.mice_with_min_visits(2));
        assert_eq!(only_a.mouse_ids(), vec![MouseId::from("a")]);
    }

    #[test]
    fn json_round_trip_keeps_compartment_keys() {
        let ds = dataset();
        let json = serde_json::to_string(&ds).unwrap();
        let back = Dataset::from_json(&json).unwrap();
        assert_eq!(back, ds);
    }
}
