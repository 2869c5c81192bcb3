//! EcoHAB Core Prelude — convenient imports for common usage.
//!
//! ```rust
//! use ecohab_core::prelude::*;
//! ```

pub use crate::types::{Compartment, Interval, MouseId, PositionSignal, Registration, State};

pub use crate::interval::{interval_overlap, IntervalSet};

pub use crate::solitude::{alone_durations, alone_intervals};

pub use crate::cooccupancy::{
    expected_fraction, observed_fraction, pair_fractions, Occupancy, PairOccupancy,
};

pub use crate::patterns::{
    DetectorConfig, EventRecord, LagHistogram, Outcome, PairCountMatrix, PairDetection,
    PatternDetector, PreferenceTable, SampleWindow, Transition, TransitionCounts,
    CANONICAL_TRANSITIONS,
};

pub use crate::significance::{
    binomial_survival, ScoreConvention, SignificanceResult, SignificanceTester, Verdict,
};

pub use crate::transitions::{
    antenna_transitions, format_duration_log, merge_transitions, registration_trains,
    RegistrationTrains, TransitionDurations,
};

pub use crate::error::{EcohabError, Result};
