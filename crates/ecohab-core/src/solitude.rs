//! Time each mouse spends alone in a compartment.
//!
//! A mouse's alone time is what remains of its occupancy once every other
//! mouse's occupancy of the same compartment has been subtracted.

use crate::interval::IntervalSet;
use crate::types::MouseId;
use std::collections::BTreeMap;

/// Residual intervals during which `mouse` had the compartment to itself.
///
/// Returns an empty set for a mouse absent from the map.
pub fn alone_intervals(
    mouse: &MouseId,
    intervals_by_mouse: &BTreeMap<MouseId, IntervalSet>,
) -> IntervalSet {
    let Some(own) = intervals_by_mouse.get(mouse) else {
        return IntervalSet::new();
    };
    let mut alone = own.clone();
    for (other, intervals) in intervals_by_mouse {
        if other == mouse {
            continue;
        }
        if alone.is_empty() {
            break;
        }
        alone.subtract(intervals);
    }
    alone
}

/// Alone time in seconds for every mouse in one compartment.
pub fn alone_durations(
    intervals_by_mouse: &BTreeMap<MouseId, IntervalSet>,
) -> BTreeMap<MouseId, f64> {
    intervals_by_mouse
        .keys()
        .map(|mouse| {
            let alone = alone_intervals(mouse, intervals_by_mouse);
            (mouse.clone(), alone.total_duration())
        })
        .collect()
}
