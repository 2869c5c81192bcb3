//! Alone time per mouse, compartment and dark phase.

use anyhow::Result;
use colored::Colorize;
use ecohab::prelude::*;
use ecohab::runtime::export::solitude_csv;

use super::{dark_or_all, print_diagnostics, Context};

pub fn run(ctx: &Context) -> Result<()> {
    let (config, dataset) = ctx.load()?;
    let phases = dark_or_all(&dataset);

    println!(
        "{} Computing solitude over {} phases...",
        "→".blue(),
        phases.len().to_string().cyan()
    );
    let table = solitude_table(&dataset, &phases, &config.solitude.aggregate_label);
    print_diagnostics(&table.diagnostics);

    ctx.write_json("solitude.json", &table)?;
    ctx.write_text("solitude.csv", &solitude_csv(&table))?;

    println!();
    println!(
        "{}",
        format!("Alone time, {} (s)", table.aggregate_label).white().bold()
    );
    println!("{}", "═".repeat(40).dimmed());
    for (m, mouse) in table.mice.iter().enumerate() {
        let per_compartment: Vec<String> = table
            .compartments
            .iter()
            .enumerate()
            .map(|(c, _)| format!("{:>10.1}", table.values[[c, m, table.phases.len()]]))
            .collect();
        println!("  {:<16}{}", mouse.to_string().cyan(), per_compartment.join(""));
    }
    println!();
    println!("{} Results in {}", "✓".green().bold(), ctx.output.display());
    Ok(())
}
