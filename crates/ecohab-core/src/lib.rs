//! # EcoHAB Core
//!
//! Pure analysis algorithms for RFID-tracked mice living in a
//! multi-compartment habitat:
//!
//! - [`interval`]: ordered occupancy spans and overlap subtraction
//! - [`solitude`]: time each mouse spends alone in a compartment
//! - [`cooccupancy`]: observed versus independence-expected time together
//! - [`patterns`]: following / avoidance detection between two mice
//! - [`significance`]: one-sided exact binomial test on the event counts
//! - [`transitions`]: timing of consecutive antenna registrations
//!
//! Nothing here schedules work or touches the filesystem; see
//! `ecohab-runtime` for batch analyses over a whole experiment.
//!
//! ## Quick Start
//!
//! ```rust
//! use ecohab_core::prelude::*;
//!
//! let mut alone = IntervalSet::from_pairs([(10.0, 20.0)]).unwrap();
//! alone.subtract(&IntervalSet::from_pairs([(13.0, 16.0)]).unwrap());
//! assert_eq!(alone.to_pairs(), vec![(10.0, 13.0), (16.0, 20.0)]);
//!
//! let tester = SignificanceTester::default();
//! assert!(tester.score(9, 1) > 0.0);
//! ```

pub mod cooccupancy;
pub mod error;
pub mod interval;
pub mod patterns;
pub mod prelude;
pub mod significance;
pub mod solitude;
pub mod transitions;
pub mod types;
