//! Rules command - show the rate schedule in force

use crate::cmd::read_schedule;
use crate::core::{RateSchedule, Regime};
use clap::Args;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

#[derive(Args, Debug)]
pub struct RulesCommand {
    /// TOML file with the rate schedule (defaults to the Budget 2024 rates)
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Print as TOML, suitable as a starting point for a rules file
    #[arg(long)]
    toml: bool,
}

#[derive(Debug, Tabled)]
struct RegimeRow {
    #[tabled(rename = "Sold From")]
    from: String,
    #[tabled(rename = "STCG Rate (%)")]
    stcg_rate: String,
    #[tabled(rename = "LTCG Rate (%)")]
    ltcg_rate: String,
    #[tabled(rename = "LTCG Exemption")]
    ltcg_exemption: String,
}

impl From<&Regime> for RegimeRow {
    fn from(regime: &Regime) -> Self {
        RegimeRow {
            from: regime.display_from(),
            stcg_rate: regime.stcg_rate.normalize().to_string(),
            ltcg_rate: regime.ltcg_rate.normalize().to_string(),
            ltcg_exemption: format!("{:.2}", regime.ltcg_exemption),
        }
    }
}

impl RulesCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let schedule = read_schedule(self.rules.as_deref())?;
        if self.toml {
            print!("{}", schedule.to_toml()?);
        } else {
            print_schedule(&schedule);
        }
        Ok(())
    }
}

fn print_schedule(schedule: &RateSchedule) {
    let rows: Vec<RegimeRow> = schedule.regimes().iter().map(RegimeRow::from).collect();
    println!();
    println!(
        "Gains held for more than {} days are long term.",
        schedule.long_term_after_days
    );
    println!();
    println!("{}", Table::new(rows).with(Style::rounded()));
    println!();
}
