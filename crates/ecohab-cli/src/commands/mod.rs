//! CLI command implementations.

pub mod following;
pub mod init;
pub mod sociability;
pub mod solitude;
pub mod summary;
pub mod transitions;

use anyhow::{bail, Context as _, Result};
use colored::Colorize;
use ecohab::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Global options shared by every analysis command.
pub struct Context {
    pub data: PathBuf,
    pub output: PathBuf,
    pub verbose: bool,
}

impl Context {
    /// Load config and dataset, applying the visit filter.
    pub fn load(&self) -> Result<(Config, Dataset)> {
        let config = Config::load()?;
        if !self.data.exists() {
            bail!(
                "Dataset not found: {} (pass one with {})",
                self.data.display(),
                "--data".cyan()
            );
        }
        let mut dataset = Dataset::load(&self.data)
            .with_context(|| format!("Failed to load dataset: {}", self.data.display()))?;

        if config.dataset.min_visits > 0 {
            let keep = dataset.mice_with_min_visits(config.dataset.min_visits);
            let dropped = dataset.mice.len() - keep.len();
            if keep.is_empty() {
                bail!(
                    "No mouse has at least {} visits",
                    config.dataset.min_visits
                );
            }
            if dropped > 0 {
                println!(
                    "  {} {} mice below {} visits left out",
                    "•".yellow(),
                    dropped,
                    config.dataset.min_visits
                );
            }
            dataset = dataset.retain_mice(&keep);
        }

        println!(
            "{} Loaded {} mice, {} phases from {}",
            "→".blue(),
            dataset.mice.len().to_string().cyan(),
            dataset.timeline.len().to_string().cyan(),
            self.data.display()
        );
        Ok((config, dataset))
    }

    pub fn output_dir(&self) -> Result<&Path> {
        std::fs::create_dir_all(&self.output)
            .with_context(|| format!("Failed to create {}", self.output.display()))?;
        Ok(&self.output)
    }

    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf> {
        let path = self.output_dir()?.join(name);
        let text = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize {name}"))?;
        std::fs::write(&path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        self.report_written(&path);
        Ok(path)
    }

    pub fn write_text(&self, name: &str, text: &str) -> Result<PathBuf> {
        let path = self.output_dir()?.join(name);
        std::fs::write(&path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        self.report_written(&path);
        Ok(path)
    }

    fn report_written(&self, path: &Path) {
        if self.verbose {
            println!("  {} Wrote {}", "✓".green(), path.display());
        }
    }
}

/// Dark phases, or every phase when none is named dark.
pub fn dark_or_all(dataset: &Dataset) -> Vec<Phase> {
    let dark = dataset.timeline.dark();
    if dark.is_empty() {
        tracing::warn!("no dark phases in timeline, using all phases");
        dataset.timeline.phases.clone()
    } else {
        dark
    }
}

/// File-name friendly version of a phase label.
pub fn slug(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    println!(
        "  {} {} work units skipped",
        "!".yellow().bold(),
        diagnostics.len()
    );
    for d in diagnostics.iter().take(5) {
        println!("    {}: {}", d.unit.dimmed(), d.error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_replaces_separators() {
        assert_eq!(slug("ALL DARK"), "ALL_DARK");
        assert_eq!(slug("1 dark 0.00h"), "1_dark_0_00h");
    }
}
