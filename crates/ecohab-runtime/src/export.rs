//! Plain-text renderings of analysis results.
//!
//! JSON output goes through serde directly; these are the delimited tables
//! that downstream spreadsheets expect.

use crate::following::SignificanceMatrix;
use crate::solitude::SolitudeTable;
use crate::sociability::BinCoOccupancy;
use ecohab_core::types::MouseId;
use ndarray::{ArrayView2, Axis};
use std::fmt::Write as _;

/// One block per compartment: a header row of phases, then one row per mouse.
pub fn solitude_csv(table: &SolitudeTable) -> String {
    let mut out = String::new();
    for (c, compartment) in table.compartments.iter().enumerate() {
        let _ = write!(out, "compartment {compartment}");
        for phase in table.phases.iter().chain(std::iter::once(&table.aggregate_label)) {
            let _ = write!(out, ";{phase}");
        }
        out.push('\n');
        for (m, mouse) in table.mice.iter().enumerate() {
            let _ = write!(out, "{mouse}");
            for v in table.values.index_axis(Axis(0), c).row(m) {
                let _ = write!(out, ";{v:.3}");
            }
            out.push('\n');
        }
    }
    out
}

/// Square mouse-by-mouse matrix with labelled rows and columns.
pub fn matrix_csv(mice: &[MouseId], values: ArrayView2<'_, f64>) -> String {
    let mut out = String::from("mouse");
    for mouse in mice {
        let _ = write!(out, ";{mouse}");
    }
    out.push('\n');
    for (mouse, row) in mice.iter().zip(values.rows()) {
        let _ = write!(out, "{mouse}");
        for v in row {
            let _ = write!(out, ";{v:.3}");
        }
        out.push('\n');
    }
    out
}

/// Observed, expected and excess matrices of one bin, one after another.
pub fn cooccupancy_csv(mice: &[MouseId], bin: &BinCoOccupancy) -> String {
    let mut out = String::new();
    for (name, values) in [
        ("observed", &bin.observed),
        ("expected", &bin.expected),
        ("excess", &bin.excess),
    ] {
        let _ = writeln!(out, "# {} {}", bin.label, name);
        out.push_str(&matrix_csv(mice, values.view()));
    }
    out
}

/// One matrix per phase.
pub fn significance_csv(sig: &SignificanceMatrix) -> String {
    let mut out = String::new();
    for (p, phase) in sig.phases.iter().enumerate() {
        let _ = writeln!(out, "# {phase}");
        out.push_str(&matrix_csv(&sig.mice, sig.scores.index_axis(Axis(0), p)));
    }
    out
}
