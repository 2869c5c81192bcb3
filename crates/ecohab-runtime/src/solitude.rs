//! Alone time of every mouse, per compartment and phase.

use crate::batch::{evaluate, partition, Diagnostic};
use crate::dataset::Dataset;
use crate::timeline::{Phase, PhaseSelection};
use ecohab_core::error::Result;
use ecohab_core::interval::IntervalSet;
use ecohab_core::solitude::alone_durations;
use ecohab_core::types::{Compartment, MouseId};
use ndarray::{s, Array3, Axis};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Alone seconds indexed `[compartment, mouse, phase]`.
///
/// The last phase column holds the sum over all phases under
/// `aggregate_label`.
#[derive(Debug, Clone, Serialize)]
pub struct SolitudeTable {
    pub compartments: Vec<Compartment>,
    pub mice: Vec<MouseId>,
    pub phases: Vec<String>,
    pub aggregate_label: String,
    pub values: Array3<f64>,
    pub diagnostics: Vec<Diagnostic>,
}

impl SolitudeTable {
    /// Alone seconds of `mouse` in `compartment` summed over all phases.
    pub fn total(&self, compartment: Compartment, mouse: &MouseId) -> Option<f64> {
        let c = self.compartments.iter().position(|&x| x == compartment)?;
        let m = self.mice.iter().position(|x| x == mouse)?;
        Some(self.values[[c, m, self.phases.len()]])
    }
}

/// Alone time of every mouse in every compartment for each of `phases`.
///
/// One work unit per (phase, compartment).
pub fn solitude_table(dataset: &Dataset, phases: &[Phase], aggregate_label: &str) -> SolitudeTable {
    let mice = dataset.mouse_ids();
    let compartments = dataset.compartments.clone();
    let (n_c, n_m, n_p) = (compartments.len(), mice.len(), phases.len());

    let units: Vec<(usize, usize)> = (0..n_p)
        .flat_map(|p| (0..n_c).map(move |c| (p, c)))
        .collect();

    let results = evaluate(&units, |&(p, c)| -> Result<Vec<f64>> {
        let selection = PhaseSelection::Single(phases[p].clone());
        let cage: BTreeMap<MouseId, IntervalSet> = mice
            .iter()
            .map(|m| Ok((m.clone(), dataset.occupancy_in(m, compartments[c], &selection)?)))
            .collect::<Result<_>>()?;
        let alone = alone_durations(&cage);
        Ok(mice.iter().map(|m| alone.get(m).copied().unwrap_or(0.0)).collect())
    });

    let (ok, diagnostics) = partition(&units, results, |&(p, c)| {
        format!("solitude phase={} compartment={}", phases[p].name, compartments[c])
    });

    let mut values = Array3::<f64>::zeros((n_c, n_m, n_p + 1));
    for (i, per_mouse) in ok {
        let (p, c) = units[i];
        for (m, v) in per_mouse.into_iter().enumerate() {
            values[[c, m, p]] = v;
        }
    }
    let summed = values.slice(s![.., .., ..n_p]).sum_axis(Axis(2));
    values.slice_mut(s![.., .., n_p]).assign(&summed);

    info!(
        mice = n_m,
        phases = n_p,
        failed = diagnostics.len(),
        "solitude table computed"
    );

    SolitudeTable {
        compartments,
        mice,
        phases: phases.iter().map(|p| p.name.clone()).collect(),
        aggregate_label: aggregate_label.to_string(),
        values,
        diagnostics,
    }
}
