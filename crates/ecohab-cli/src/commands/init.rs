//! Write a default analysis configuration.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::{Config, CONFIG_FILE};

pub fn run(path: Option<PathBuf>) -> Result<()> {
    let base_path = match path {
        Some(p) => p,
        None => std::env::current_dir().context("Failed to resolve current directory")?,
    };

    println!("{} Initializing EcoHAB analysis...", "→".blue());

    std::fs::create_dir_all(&base_path)
        .with_context(|| format!("Failed to create {}", base_path.display()))?;

    let config_path = base_path.join(CONFIG_FILE);
    if !config_path.exists() {
        Config::default().save(&config_path)?;
        println!("  {} Created {}", "✓".green(), config_path.display());
    } else {
        println!("  {} {} already exists", "•".yellow(), config_path.display());
    }

    println!();
    println!("{} Ready.", "✓".green().bold());
    println!();
    println!("Next steps:");
    println!("  {} ecohab --data <dataset.json> summary", "1.".blue());
    println!("  {} ecohab --data <dataset.json> solitude", "2.".blue());
    println!("  {} ecohab --data <dataset.json> following", "3.".blue());

    Ok(())
}
