//! # EcoHAB Runtime
//!
//! Batch analyses over a whole experiment.
//!
//! A [`Dataset`](dataset::Dataset) holds the cleaned per-mouse inputs and the
//! phase [`Timeline`](timeline::Timeline). Each runner splits its job into
//! independent work units (a phase and compartment, a bin, a leader and
//! follower pair), evaluates them in parallel, and merges the partial
//! results into `ndarray` tensors. A unit that fails is logged, recorded in
//! the result's `diagnostics`, and left out.

pub mod batch;
pub mod dataset;
pub mod export;
pub mod following;
pub mod prelude;
pub mod sociability;
pub mod solitude;
pub mod timeline;
pub mod transitions;
