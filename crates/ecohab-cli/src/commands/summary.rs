//! Show dataset statistics.

use anyhow::Result;
use colored::Colorize;
use ecohab::prelude::*;

use super::Context;

pub fn run(ctx: &Context) -> Result<()> {
    let (config, dataset) = ctx.load()?;

    println!();
    println!("{}", "EcoHAB Dataset".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    println!("{}", "Timeline".blue().bold());
    for phase in &dataset.timeline.phases {
        println!(
            "  {:<16} {:>10.0} s  {}",
            phase.name,
            phase.duration(),
            if phase.is_dark() { "dark".dimmed() } else { "".normal() }
        );
    }
    println!();

    println!("{}", "Mice".blue().bold());
    for (id, record) in &dataset.mice {
        let samples = record.signal.as_ref().map(PositionSignal::len).unwrap_or(0);
        println!(
            "  {:<16} visits {:>6}  samples {:>8}  reads {:>6}",
            id.to_string().cyan(),
            record.visits(),
            samples,
            record.registrations.len()
        );
    }
    println!();

    println!("{}", "Configuration".blue().bold());
    println!(
        "  Detector:          {} s forward, {} s lookback, {} s guard",
        config.detector.threshold_secs, config.detector.lookback_secs, config.detector.guard_secs
    );
    println!(
        "  Significance:      alpha {} ({:?})",
        config.significance.alpha, config.significance.convention
    );
    println!();
    println!("{}", "═".repeat(40).dimmed());
    Ok(())
}
