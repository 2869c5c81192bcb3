//! Experiment phases on the epoch-second axis.

use ecohab_core::error::{DataError, EcohabError, Result};
use serde::{Deserialize, Serialize};

/// A named span of the experiment, e.g. `"1 dark"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    pub start: f64,
    pub end: f64,
}

impl Phase {
    pub fn new(name: impl Into<String>, start: f64, end: f64) -> Result<Self> {
        let phase = Self {
            name: name.into(),
            start,
            end,
        };
        phase.validate()?;
        Ok(phase)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start.is_finite() && self.end.is_finite() && self.start < self.end {
            Ok(())
        } else {
            Err(DataError::InvalidPhase {
                name: self.name.clone(),
                start: self.start,
                end: self.end,
            }
            .into())
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_dark(&self) -> bool {
        self.name.to_lowercase().contains("dark")
    }

    pub fn is_light(&self) -> bool {
        self.name.to_lowercase().contains("light")
    }

    /// Consecutive bins of `bin_secs`; the last one ends at the phase end.
    ///
    /// Bin `k` starts at `start + k * bin_secs`. At most [`MAX_BINS`] bins are
    /// produced, and bins too narrow to be represented at the phase's epoch
    /// magnitude are rejected.
    pub fn bins(&self, bin_secs: f64) -> Result<Vec<Phase>> {
        if !(bin_secs.is_finite() && bin_secs > 0.0) {
            return Err(EcohabError::invalid_config(
                "bin_secs",
                bin_secs.to_string(),
                "must be a positive number of seconds",
            ));
        }
        let count = (self.duration() / bin_secs).ceil();
        if !(count <= MAX_BINS as f64) || self.start + bin_secs <= self.start {
            return Err(EcohabError::invalid_config(
                "bin_secs",
                bin_secs.to_string(),
                format!("too small for phase {:?}", self.name),
            ));
        }

        let mut out = Vec::with_capacity(count as usize);
        for k in 0..count as usize {
            let start = self.start + k as f64 * bin_secs;
            let end = (start + bin_secs).min(self.end);
            if start >= end {
                break;
            }
            out.push(Phase {
                name: format!("{} {:.2}h", self.name, (start - self.start) / 3600.0),
                start,
                end,
            });
        }
        Ok(out)
    }
}

/// Upper limit on the number of bins one phase may be split into.
pub const MAX_BINS: usize = 1_000_000;

/// The ordered phases of one experiment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub phases: Vec<Phase>,
}

impl Timeline {
    pub fn new(phases: Vec<Phase>) -> Result<Self> {
        let timeline = Self { phases };
        timeline.validate()?;
        Ok(timeline)
    }

    pub fn validate(&self) -> Result<()> {
        self.phases.iter().try_for_each(Phase::validate)
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn get(&self, name: &str) -> Result<&Phase> {
        self.phases
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| EcohabError::unknown_phase(name))
    }

    pub fn dark(&self) -> Vec<Phase> {
        self.phases.iter().filter(|p| p.is_dark()).cloned().collect()
    }

    pub fn light(&self) -> Vec<Phase> {
        self.phases.iter().filter(|p| p.is_light()).cloned().collect()
    }

    /// Earliest start and latest end.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        bounds_of(&self.phases)
    }

    /// Every phase split into bins of `bin_secs`.
    pub fn binned(&self, bin_secs: f64) -> Result<Vec<(Phase, Vec<Phase>)>> {
        self.phases
            .iter()
            .map(|p| Ok((p.clone(), p.bins(bin_secs)?)))
            .collect()
    }

    /// Equal windows of `width_secs` covering `[start, end)`, last one truncated.
    pub fn fixed_windows(start: f64, end: f64, width_secs: f64) -> Result<Vec<Phase>> {
        let span = Phase::new("window", start, end)?;
        let mut windows = span.bins(width_secs)?;
        for (i, w) in windows.iter_mut().enumerate() {
            w.name = format!("{}", i + 1);
        }
        Ok(windows)
    }
}

fn bounds_of(phases: &[Phase]) -> Option<(f64, f64)> {
    let start = phases.iter().map(|p| p.start).reduce(f64::min)?;
    let end = phases.iter().map(|p| p.end).reduce(f64::max)?;
    Some((start, end))
}

/// What an analysis runs over: one phase, or several pooled under a label
/// (e.g. all dark phases).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhaseSelection {
    Single(Phase),
    Collection { label: String, phases: Vec<Phase> },
}

impl PhaseSelection {
    pub fn collection(label: impl Into<String>, phases: Vec<Phase>) -> Result<Self> {
        let label = label.into();
        if phases.is_empty() {
            return Err(DataError::EmptySelection(label).into());
        }
        Ok(PhaseSelection::Collection { label, phases })
    }

    pub fn label(&self) -> &str {
        match self {
            PhaseSelection::Single(p) => &p.name,
            PhaseSelection::Collection { label, .. } => label,
        }
    }

    pub fn phases(&self) -> &[Phase] {
        match self {
            PhaseSelection::Single(p) => std::slice::from_ref(p),
            PhaseSelection::Collection { phases, .. } => phases,
        }
    }

    /// Summed length of the member phases.
    pub fn total_time(&self) -> f64 {
        self.phases().iter().map(Phase::duration).sum()
    }

    pub fn bounds(&self) -> Option<(f64, f64)> {
        bounds_of(self.phases())
    }

    pub fn contains(&self, t: f64) -> bool {
        self.phases().iter().any(|p| p.start <= t && t < p.end)
    }
}

impl From<Phase> for PhaseSelection {
    fn from(phase: Phase) -> Self {
        PhaseSelection::Single(phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn timeline() -> Timeline {
        Timeline::new(vec![
            Phase::new("1 dark", 0.0, 43_200.0).unwrap(),
            Phase::new("1 light", 43_200.0, 86_400.0).unwrap(),
            Phase::new("2 DARK", 86_400.0, 129_600.0).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn dark_and_light_filters() {
        let t = timeline();
        let dark: Vec<_> = t.dark().into_iter().map(|p| p.name).collect();
        assert_eq!(dark, ["1 dark", "2 DARK"]);
        assert_eq!(t.light().len(), 1);
        assert_eq!(t.bounds(), Some((0.0, 129_600.0)));
        assert!(t.get("3 dark").is_err());
    }

    #[test]
    fn invalid_phase_rejected() {
        assert!(Phase::new("x", 10.0, 10.0).is_err());
        assert!(Phase::new("x", 10.0, 5.0).is_err());
    }

    #[test]
    fn bins_truncate_at_phase_end() {
        let p = Phase::new("1 dark", 0.0, 10_000.0).unwrap();
        let bins = p.bins(3600.0).unwrap();
        assert_eq!(bins.len(), 3);
        assert_relative_eq!(bins[2].start, 7200.0);
        assert_relative_eq!(bins[2].end, 10_000.0);
        assert!(p.bins(0.0).is_err());
    }

    #[test]
    fn bins_too_fine_for_epoch_times_rejected() {
        let p = Phase::new("1 dark", 1.7e9, 1.7e9 + 43_200.0).unwrap();
        assert!(p.bins(1e-7).is_err());
        // under the float spacing at this magnitude, even for a short phase
        let short = Phase::new("1 dark", 1.7e9, 1.7e9 + 1.0).unwrap();
        assert!(short.bins(1e-7).is_err());

        let hours = p.bins(3600.0).unwrap();
        assert_eq!(hours.len(), 12);
        assert_relative_eq!(hours[11].start, 1.7e9 + 39_600.0);
        assert_relative_eq!(hours[11].end, p.end);
    }

    #[test]
    fn fixed_windows_cover_span() {
        let w = Timeline::fixed_windows(0.0, 100.0, 30.0).unwrap();
        assert_eq!(w.len(), 4);
        assert_eq!(w[0].name, "1");
        assert_relative_eq!(w[3].duration(), 10.0);
    }

    #[test]
    fn collection_pools_phases() {
        let t = timeline();
        let all_dark = PhaseSelection::collection("ALL DARK", t.dark()).unwrap();
        assert_eq!(all_dark.label(), "ALL DARK");
        assert_relative_eq!(all_dark.total_time(), 86_400.0);
        assert_eq!(all_dark.bounds(), Some((0.0, 129_600.0)));
        assert!(all_dark.contains(100_000.0));
        assert!(!all_dark.contains(50_000.0));
        assert!(PhaseSelection::collection("none", vec![]).is_err());
    }

    #[test]
    fn selection_serde_is_tagged() {
        let single = PhaseSelection::from(Phase::new("1 dark", 0.0, 1.0).unwrap());
        let json = serde_json::to_value(&single).unwrap();
        assert_eq!(json["kind"], "single");
        let back: PhaseSelection = serde_json::from_value(json).unwrap();
        assert_eq!(back, single);
    }
}
