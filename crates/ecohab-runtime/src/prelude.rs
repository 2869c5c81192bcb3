//! Convenience re-exports for common runtime usage.

pub use crate::batch::Diagnostic;
pub use crate::dataset::{Dataset, MouseRecord};
pub use crate::following::{
    avoiding_per_pair, following_per_pair, interaction_tensor, interactions_per_pair,
    relationship_persistence, significance_matrix, InteractionTensor, PairEvent,
    PairPersistence, SignificanceMatrix,
};
pub use crate::sociability::{
    binned_cooccupancy, cooccupancy, BinCoOccupancy, CoOccupancyTensor, SelectionCoOccupancy,
};
pub use crate::solitude::{solitude_table, SolitudeTable};
pub use crate::timeline::{Phase, PhaseSelection, Timeline};
pub use crate::transitions::{dataset_registration_trains, transition_durations};
