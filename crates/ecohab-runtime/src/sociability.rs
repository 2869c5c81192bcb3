//! In-cohort sociability: time pairs spend together versus chance.

use crate::batch::{evaluate, partition, Diagnostic};
use crate::dataset::Dataset;
use crate::timeline::{Phase, PhaseSelection};
use ecohab_core::cooccupancy::{pair_fractions, Occupancy};
use ecohab_core::error::{EcohabError, Result};
use ecohab_core::types::MouseId;
use ndarray::Array2;
use serde::Serialize;
use tracing::info;

/// Upper-triangular pair matrices for one stretch of time.
#[derive(Debug, Clone, Serialize)]
pub struct BinCoOccupancy {
    pub label: String,
    pub total_time: f64,
    pub observed: Array2<f64>,
    pub expected: Array2<f64>,
    pub excess: Array2<f64>,
}

/// All bins of one selection.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionCoOccupancy {
    pub label: String,
    /// In bin order; `None` where the bin failed (see the tensor's diagnostics).
    pub bins: Vec<Option<BinCoOccupancy>>,
}

impl SelectionCoOccupancy {
    /// Bins that were computed, in order.
    pub fn computed(&self) -> impl Iterator<Item = &BinCoOccupancy> {
        self.bins.iter().flatten()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CoOccupancyTensor {
    pub mice: Vec<MouseId>,
    pub selections: Vec<SelectionCoOccupancy>,
    pub diagnostics: Vec<Diagnostic>,
}

/// One matrix set per selection, each selection taken as a whole.
pub fn cooccupancy(dataset: &Dataset, selections: &[PhaseSelection]) -> CoOccupancyTensor {
    let groups: Vec<(String, Vec<PhaseSelection>)> = selections
        .iter()
        .map(|s| (s.label().to_string(), vec![s.clone()]))
        .collect();
    run(dataset, groups)
}

/// Every phase split into bins of `bin_secs`, one matrix set per bin.
pub fn binned_cooccupancy(
    dataset: &Dataset,
    phases: &[Phase],
    bin_secs: f64,
) -> Result<CoOccupancyTensor> {
    let groups: Vec<(String, Vec<PhaseSelection>)> = phases
        .iter()
        .map(|p| {
            let bins = p.bins(bin_secs)?;
            Ok((p.name.clone(), bins.into_iter().map(PhaseSelection::Single).collect()))
        })
        .collect::<Result<_>>()?;
    Ok(run(dataset, groups))
}

fn run(dataset: &Dataset, groups: Vec<(String, Vec<PhaseSelection>)>) -> CoOccupancyTensor {
    let mice = dataset.mouse_ids();

    let units: Vec<(usize, usize)> = groups
        .iter()
        .enumerate()
        .flat_map(|(g, (_, bins))| (0..bins.len()).map(move |b| (g, b)))
        .collect();

    let results = evaluate(&units, |&(g, b)| pair_matrices(dataset, &mice, &groups[g].1[b]));

    let (ok, diagnostics) = partition(&units, results, |&(g, b)| {
        format!("sociability {} bin={}", groups[g].1[b].label(), b)
    });

    let mut selections: Vec<SelectionCoOccupancy> = groups
        .iter()
        .map(|(label, bins)| SelectionCoOccupancy {
            label: label.clone(),
            bins: vec![None; bins.len()],
        })
        .collect();
    for (i, bin) in ok {
        let (g, b) = units[i];
        selections[g].bins[b] = Some(bin);
    }

    info!(
        mice = mice.len(),
        units = units.len(),
        failed = diagnostics.len(),
        "co-occupancy computed"
    );

    CoOccupancyTensor {
        mice,
        selections,
        diagnostics,
    }
}

fn pair_matrices(
    dataset: &Dataset,
    mice: &[MouseId],
    selection: &PhaseSelection,
) -> Result<BinCoOccupancy> {
    let total_time = selection.total_time();
    if total_time <= 0.0 {
        return Err(EcohabError::precondition(format!(
            "selection {} has no duration",
            selection.label()
        )));
    }

    let occupancy: Vec<Occupancy> = mice
        .iter()
        .map(|m| dataset.occupancy_map(m, selection))
        .collect::<Result<_>>()?;

    let n = mice.len();
    let mut observed = Array2::zeros((n, n));
    let mut expected = Array2::zeros((n, n));
    for i in 0..n {
        for j in i + 1..n {
            let pair = pair_fractions(
                &occupancy[i],
                &occupancy[j],
                &dataset.compartments,
                total_time,
            )?;
            observed[[i, j]] = pair.observed;
            expected[[i, j]] = pair.expected;
        }
    }
    let excess = &observed - &expected;

    Ok(BinCoOccupancy {
        label: selection.label().to_string(),
        total_time,
        observed,
        expected,
        excess,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::MouseRecord;
    use crate::timeline::Timeline;
    use approx::assert_relative_eq;
    use ecohab_core::interval::IntervalSet;
    use ecohab_core::types::Compartment;

    fn dataset() -> Dataset {
        let timeline = Timeline::new(vec![Phase::new("1 dark", 0.0, 30.0).unwrap()]).unwrap();
        let mut a = MouseRecord::default();
        a.occupancy
            .insert(Compartment(1), IntervalSet::from_pairs([(0.0, 30.0)]).unwrap());
        let mut b = MouseRecord::default();
        b.occupancy
            .insert(Compartment(1), IntervalSet::from_pairs([(20.0, 30.0)]).unwrap());
        Dataset::new(timeline).with_mouse("a", a).with_mouse("b", b)
    }

    #[test]
    fn failed_bin_keeps_its_slot() {
        let ds = dataset();
        let bin = |start: f64, end: f64| {
            PhaseSelection::Single(Phase {
                name: format!("bin {start}"),
                start,
                end,
            })
        };
        // the middle bin has no duration and fails
        let groups = vec![(
            "1 dark".to_string(),
            vec![bin(0.0, 10.0), bin(10.0, 10.0), bin(20.0, 30.0)],
        )];
        let tensor = run(&ds, groups);

        assert_eq!(tensor.diagnostics.len(), 1);
        let bins = &tensor.selections[0].bins;
        assert_eq!(bins.len(), 3);
        assert!(bins[1].is_none());
        let last = bins[2].as_ref().unwrap();
        assert_eq!(last.label, "bin 20");
        assert_relative_eq!(last.observed[[0, 1]], 1.0);
        assert_eq!(tensor.selections[0].computed().count(), 2);
    }
}
