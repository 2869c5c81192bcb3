//! Antenna-transition durations per phase and registration trains.

use anyhow::Result;
use colored::Colorize;
use ecohab::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};

use super::{slug, Context};

pub fn run(ctx: &Context) -> Result<()> {
    let (_config, dataset) = ctx.load()?;
    let phases = dataset.timeline.phases.clone();

    println!(
        "{} Transition durations in {} phases...",
        "→".blue(),
        phases.len().to_string().cyan()
    );

    let pb = ProgressBar::new(phases.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut total = 0usize;
    for phase in phases {
        pb.set_message(phase.name.clone());
        let name = format!("transition_durations_{}.csv", slug(&phase.name));
        let durations = transition_durations(&dataset, &PhaseSelection::Single(phase))?;
        total += durations.values().map(Vec::len).sum::<usize>();
        ctx.write_text(&name, &format_duration_log(&durations))?;
        pb.inc(1);
    }
    pb.finish_with_message("done");

    let trains = dataset_registration_trains(&dataset);
    ctx.write_text("train_durations.csv", &format_duration_log(&trains.durations))?;
    ctx.write_text("counts_in_trains.csv", &format_duration_log(&trains.counts))?;

    println!();
    println!("  Transitions:       {}", total.to_string().cyan());
    println!(
        "  Registration trains: {}",
        trains.train_count().to_string().cyan()
    );
    println!();
    println!("{} Results in {}", "✓".green().bold(), ctx.output.display());
    Ok(())
}
