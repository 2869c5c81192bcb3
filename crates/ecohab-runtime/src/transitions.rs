//! Antenna-transition timing pooled over mice.

use crate::dataset::Dataset;
use crate::timeline::PhaseSelection;
use ecohab_core::error::Result;
use ecohab_core::transitions::{
    antenna_transitions, merge_transitions, registration_trains, RegistrationTrains,
    TransitionDurations,
};

/// Durations between consecutive registrations of every mouse inside
/// `selection`. Pairs spanning two member phases are not counted.
pub fn transition_durations(
    dataset: &Dataset,
    selection: &PhaseSelection,
) -> Result<TransitionDurations> {
    let mut out = TransitionDurations::new();
    for mouse in dataset.mice.keys() {
        for phase in selection.phases() {
            let regs = dataset.registrations_between(mouse, phase.start, phase.end)?;
            merge_transitions(&mut out, antenna_transitions(&regs));
        }
    }
    Ok(out)
}

/// Registration trains of all mice over the whole recording.
pub fn dataset_registration_trains(dataset: &Dataset) -> RegistrationTrains {
    let mut out = RegistrationTrains::default();
    for record in dataset.mice.values() {
        out.merge(registration_trains(&record.registrations));
    }
    out
}
