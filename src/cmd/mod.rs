pub mod report;
pub mod rules;
pub mod schema;
pub mod validate;

use crate::core::{calculate, RateSchedule, TaxReport};
use crate::input;
use anyhow::Context;
use clap::Args;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Arguments shared by the commands that compute tax
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Transactions file (CSV, XLSX or XLS). Reads CSV from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// TOML file with the rate schedule (defaults to the Budget 2024 rates)
    #[arg(short, long)]
    rules: Option<PathBuf>,
}

impl InputArgs {
    /// Load the input table and compute every row
    pub fn calculate(&self) -> anyhow::Result<TaxReport> {
        let schedule = read_schedule(self.rules.as_deref())?;
        let table = input::load(&self.file)?;
        let rows = table
            .transaction_rows()
            .with_context(|| format!("Invalid input file {}", self.file.display()))?;
        Ok(calculate(&rows, &schedule))
    }
}

/// Read the rate schedule from a TOML file, or use the built-in one
pub fn read_schedule(path: Option<&Path>) -> anyhow::Result<RateSchedule> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open rules file {}", path.display()))?;
            let schedule = RateSchedule::read_toml(file)
                .with_context(|| format!("Invalid rules file {}", path.display()))?;
            log::info!(
                "Loaded {} regime(s) from {}",
                schedule.regimes().len(),
                path.display()
            );
            Ok(schedule)
        }
        None => Ok(RateSchedule::default()),
    }
}
