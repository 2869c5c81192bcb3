//! Following / avoidance between every pair of mice.

use anyhow::{Context as _, Result};
use colored::Colorize;
use ecohab::prelude::*;
use ecohab::runtime::export::significance_csv;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

use super::{print_diagnostics, Context};

/// Per-pair sums written next to the full tensor.
#[derive(Serialize)]
struct PairTotals {
    mice: Vec<MouseId>,
    phases: Vec<String>,
    following: ndarray::Array3<f64>,
    avoiding: ndarray::Array3<f64>,
    interactions: ndarray::Array3<f64>,
}

pub fn run(ctx: &Context, threshold: Option<f64>) -> Result<()> {
    let (config, dataset) = ctx.load()?;
    let mut detector = config.detector.to_detector_config();
    if let Some(secs) = threshold {
        detector = detector.with_threshold(secs);
    }
    let tester = config.significance.to_tester()?;
    let phases = dataset.timeline.phases.clone();
    let n = dataset.mice.len();

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!(
        "Scanning {} ordered pairs in {} phases...",
        n * n.saturating_sub(1),
        phases.len()
    ));
    let tensor = interaction_tensor(&dataset, &phases, detector)
        .context("Following analysis failed")?;
    pb.finish_with_message("done");
    print_diagnostics(&tensor.diagnostics);

    let sig = significance_matrix(&tensor, &tester);
    let persistence = relationship_persistence(&sig);
    let totals = PairTotals {
        mice: tensor.mice.clone(),
        phases: tensor.phases.clone(),
        following: following_per_pair(&tensor),
        avoiding: avoiding_per_pair(&tensor),
        interactions: interactions_per_pair(&tensor),
    };

    ctx.write_json("interactions.json", &tensor)?;
    ctx.write_json("pair_totals.json", &totals)?;
    ctx.write_json("significance.json", &sig)?;
    ctx.write_text("significance.csv", &significance_csv(&sig))?;
    ctx.write_json("persistence.json", &persistence)?;

    println!();
    println!("{}", "Following Analysis".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!(
        "  Events:            {}",
        tensor.events.len().to_string().cyan()
    );
    println!("  Undetermined:      {}", tensor.undetermined);
    println!("  Out of range:      {}", tensor.out_of_range);
    println!();

    println!("{}", "Significant Pairs".blue().bold());
    let mut any = false;
    for (p, phase) in sig.phases.iter().enumerate() {
        for (i, leader) in sig.mice.iter().enumerate() {
            for (j, follower) in sig.mice.iter().enumerate() {
                let score = sig.scores[[p, i, j]];
                if score == 0.0 {
                    continue;
                }
                any = true;
                let label = if score > 0.0 {
                    "follows".green()
                } else {
                    "avoids".red()
                };
                println!(
                    "  {:<12} {} {} {}  {:+.3}",
                    phase.dimmed(),
                    follower.to_string().cyan(),
                    label,
                    leader.to_string().cyan(),
                    score
                );
            }
        }
    }
    if !any {
        println!("  none at alpha = {}", tester.alpha);
    }

    println!();
    println!("{} Results in {}", "✓".green().bold(), ctx.output.display());
    Ok(())
}
