//! In-cohort sociability: observed versus expected time together.

use anyhow::{Context as _, Result};
use colored::Colorize;
use ecohab::prelude::*;
use ecohab::runtime::export::cooccupancy_csv;

use super::{print_diagnostics, slug, Context};

pub fn run(ctx: &Context, bin_secs: Option<f64>) -> Result<()> {
    let (config, dataset) = ctx.load()?;
    let bin_secs = bin_secs.unwrap_or(config.sociability.bin_secs);

    let mut selections: Vec<PhaseSelection> = dataset
        .timeline
        .phases
        .iter()
        .cloned()
        .map(PhaseSelection::Single)
        .collect();
    for (label, phases) in [
        ("ALL DARK", dataset.timeline.dark()),
        ("ALL LIGHT", dataset.timeline.light()),
    ] {
        if !phases.is_empty() {
            selections.push(PhaseSelection::collection(label, phases)?);
        }
    }

    println!(
        "{} Co-occupancy over {} selections...",
        "→".blue(),
        selections.len().to_string().cyan()
    );
    let whole = cooccupancy(&dataset, &selections);
    print_diagnostics(&whole.diagnostics);
    ctx.write_json("sociability.json", &whole)?;
    for selection in &whole.selections {
        for bin in selection.computed() {
            ctx.write_text(
                &format!("sociability_{}.csv", slug(&selection.label)),
                &cooccupancy_csv(&whole.mice, bin),
            )?;
        }
    }

    println!(
        "{} Binned co-occupancy, {} s bins...",
        "→".blue(),
        bin_secs.to_string().cyan()
    );
    let binned = binned_cooccupancy(&dataset, &dataset.timeline.phases, bin_secs)
        .context("Failed to bin phases")?;
    print_diagnostics(&binned.diagnostics);
    ctx.write_json("sociability_binned.json", &binned)?;

    print_top_pairs(&whole);
    println!();
    println!("{} Results in {}", "✓".green().bold(), ctx.output.display());
    Ok(())
}

fn print_top_pairs(tensor: &CoOccupancyTensor) {
    let Some(bin) = tensor
        .selections
        .iter()
        .find(|s| s.label == "ALL DARK")
        .or_else(|| tensor.selections.first())
        .and_then(|s| s.computed().next())
    else {
        return;
    };

    let n = tensor.mice.len();
    let mut pairs: Vec<(usize, usize, f64)> = (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .map(|(i, j)| (i, j, bin.excess[[i, j]]))
        .collect();
    pairs.sort_by(|a, b| b.2.total_cmp(&a.2));

    println!();
    println!("{}", format!("Excess time together, {}", bin.label).white().bold());
    println!("{}", "═".repeat(40).dimmed());
    for (i, j, excess) in pairs.into_iter().take(10) {
        let value = format!("{excess:+.4}");
        let value = if excess > 0.0 { value.green() } else { value.red() };
        println!("  {} - {}  {}", tensor.mice[i], tensor.mice[j], value);
    }
}
