//! Report command - per-sale tax table, totals and export

use crate::cmd::InputArgs;
use crate::core::{RowError, TaxReport, TaxResult, Totals};
use crate::export;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ReportCommand {
    #[command(flatten)]
    input: InputArgs,

    /// Export results to a file (.xlsx, otherwise CSV)
    #[arg(
        short,
        long,
        num_args = 0..=1,
        default_missing_value = export::DEFAULT_FILE_NAME
    )]
    output: Option<PathBuf>,

    /// Open the exported file when done
    #[arg(long, requires = "output")]
    open: bool,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Tabled)]
struct ResultRow {
    #[tabled(rename = "#")]
    row: usize,
    #[tabled(rename = "Purchase Date")]
    purchase_date: String,
    #[tabled(rename = "Sell Date")]
    sell_date: String,
    #[tabled(rename = "Type")]
    gain_type: &'static str,
    #[tabled(rename = "Net Gain")]
    net_gain: String,
    #[tabled(rename = "Taxable Gain")]
    taxable_gain: String,
    #[tabled(rename = "Rate (%)")]
    rate: String,
    #[tabled(rename = "Tax Amount")]
    tax_amount: String,
}

impl From<&TaxResult> for ResultRow {
    fn from(result: &TaxResult) -> Self {
        ResultRow {
            row: result.row,
            purchase_date: result.purchase_date.format("%Y-%m-%d").to_string(),
            sell_date: result.sell_date.format("%Y-%m-%d").to_string(),
            gain_type: result.gain_type.display(),
            net_gain: format!("{:.2}", result.net_gain),
            taxable_gain: format!("{:.2}", result.taxable_gain),
            rate: result.rate.normalize().to_string(),
            tax_amount: format!("{:.2}", result.tax_amount),
        }
    }
}

#[derive(Debug, Serialize)]
struct ReportOutput<'a> {
    results: &'a [TaxResult],
    errors: &'a [RowError],
    /// `null` when the amounts are too large to sum
    totals: Option<Totals>,
}

impl ReportCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let report = self.input.calculate()?;

        if self.json {
            self.print_json(&report)?;
        } else {
            self.print_report(&report);
        }

        if let Some(ref path) = self.output {
            export::write_file(&report.results, path)?;
            if !self.json {
                println!("Results written to {}", path.display());
            }
            if self.open {
                opener::open(path)?;
            }
        }
        Ok(())
    }

    fn print_report(&self, report: &TaxReport) {
        println!();
        println!("EQUITY CAPITAL GAINS TAX");
        println!();

        if report.results.is_empty() {
            println!("No transactions could be processed");
        } else {
            let rows: Vec<ResultRow> = report.results.iter().map(ResultRow::from).collect();
            let table = Table::new(rows)
                .with(Style::rounded())
                .with(Modify::new(Columns::new(4..)).with(Alignment::right()))
                .to_string();
            println!("{}", table);

            println!();
            match report.totals() {
                Some(totals) => {
                    println!(
                        "  Disposals:      {} ({} short term, {} long term)",
                        totals.short_term_count + totals.long_term_count,
                        totals.short_term_count,
                        totals.long_term_count
                    );
                    println!("  Net gain:       {:.2}", totals.net_gain);
                    println!("  Taxable gain:   {:.2}", totals.taxable_gain);
                    println!("  Tax payable:    {:.2}", totals.tax_amount);
                }
                None => {
                    println!("  Disposals:      {}", report.results.len());
                    println!("  Totals unavailable: amounts too large to sum");
                }
            }
        }

        if !report.errors.is_empty() {
            println!();
            println!("\u{26A0} {} row(s) could not be processed:", report.errors.len());
            for error in &report.errors {
                println!("  - {}", error);
            }
        }
        println!();
    }

    fn print_json(&self, report: &TaxReport) -> anyhow::Result<()> {
        let output = ReportOutput {
            results: &report.results,
            errors: &report.errors,
            totals: report.totals(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}
