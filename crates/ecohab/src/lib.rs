//! # EcoHAB
//!
//! Social-structure analysis for mice tracked by RFID antennas in a
//! multi-compartment habitat.
//!
//! ## Quick Start
//!
//! ```rust
//! use ecohab::prelude::*;
//!
//! let timeline = Timeline::new(vec![Phase::new("1 dark", 0.0, 100.0).unwrap()]).unwrap();
//!
//! let mut a = MouseRecord::default();
//! a.occupancy.insert(Compartment(1), IntervalSet::from_pairs([(0.0, 60.0)]).unwrap());
//! let mut b = MouseRecord::default();
//! b.occupancy.insert(Compartment(1), IntervalSet::from_pairs([(40.0, 100.0)]).unwrap());
//!
//! let dataset = Dataset::new(timeline).with_mouse("a", a).with_mouse("b", b);
//! let table = solitude_table(&dataset, &dataset.timeline.dark(), "ALL DARK");
//!
//! // a is alone for 40 s, b for 40 s
//! assert_eq!(table.total(Compartment(1), &MouseId::from("a")), Some(40.0));
//! ```
//!
//! ## Architecture
//!
//! - [`ecohab_core`] - interval arithmetic, solitude, co-occupancy, pattern
//!   detection, significance testing, antenna-transition statistics
//! - [`ecohab_runtime`] - dataset, phase timeline and the batch runners that
//!   turn them into result tensors
//!
//! ## Analyses
//!
//! | Analysis | Runner | Output |
//! |----------|--------|--------|
//! | Solitude | `solitude_table` | `[compartment, mouse, phase]` alone seconds |
//! | In-cohort sociability | `cooccupancy`, `binned_cooccupancy` | observed / expected / excess pair matrices |
//! | Following | `interaction_tensor` | `[phase, leader, follower, transition, 3]` counts |
//! | Significance | `significance_matrix` | signed `[phase, leader, follower]` scores |
//! | Transitions | `transition_durations` | durations keyed by antenna pair |

pub use ecohab_core as core;
pub use ecohab_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust
/// use ecohab::prelude::*;
/// ```
pub mod prelude {
    pub use ecohab_core::prelude::*;
    pub use ecohab_runtime::prelude::*;
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
