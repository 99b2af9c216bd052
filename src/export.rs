//! Writing results to CSV and Excel files

use crate::core::TaxResult;
use anyhow::anyhow;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const DEFAULT_FILE_NAME: &str = "Equity_Tax_Results.xlsx";

pub const HEADERS: [&str; 7] = [
    "Purchase Date",
    "Sell Date",
    "Type",
    "Net Gain",
    "Taxable Gain",
    "Rate (%)",
    "Tax Amount",
];

#[derive(Debug, Serialize)]
struct ResultRecord {
    #[serde(rename = "Purchase Date")]
    purchase_date: String,
    #[serde(rename = "Sell Date")]
    sell_date: String,
    #[serde(rename = "Type")]
    gain_type: &'static str,
    #[serde(rename = "Net Gain")]
    net_gain: Decimal,
    #[serde(rename = "Taxable Gain")]
    taxable_gain: Decimal,
    #[serde(rename = "Rate (%)")]
    rate: Decimal,
    #[serde(rename = "Tax Amount")]
    tax_amount: Decimal,
}

impl From<&TaxResult> for ResultRecord {
    fn from(result: &TaxResult) -> Self {
        ResultRecord {
            purchase_date: result.purchase_date.format("%Y-%m-%d").to_string(),
            sell_date: result.sell_date.format("%Y-%m-%d").to_string(),
            gain_type: result.gain_type.display(),
            net_gain: result.net_gain.normalize(),
            taxable_gain: result.taxable_gain.normalize(),
            rate: result.rate.normalize(),
            tax_amount: result.tax_amount.normalize(),
        }
    }
}

/// Write results as an `.xlsx` workbook, or CSV for any other extension
pub fn write_file(results: &[TaxResult], path: &Path) -> anyhow::Result<()> {
    let is_xlsx = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
    if is_xlsx {
        write_xlsx(results, path)?;
    } else {
        write_csv(results, File::create(path)?)?;
    }
    log::info!("Wrote {} result(s) to {}", results.len(), path.display());
    Ok(())
}

pub fn write_csv<W: Write>(results: &[TaxResult], writer: W) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if results.is_empty() {
        wtr.write_record(HEADERS)?;
    }
    for result in results {
        wtr.serialize(ResultRecord::from(result))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_xlsx(results: &[TaxResult], path: &Path) -> anyhow::Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Tax Results")?;

    let header = Format::new().set_bold();
    let money = Format::new().set_num_format("#,##0.00");

    for (col, title) in HEADERS.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, *title, &header)?;
        worksheet.set_column_width(col, 16)?;
    }

    for (i, result) in results.iter().enumerate() {
        let row = i as u32 + 1;
        worksheet.write_string(row, 0, result.purchase_date.format("%Y-%m-%d").to_string())?;
        worksheet.write_string(row, 1, result.sell_date.format("%Y-%m-%d").to_string())?;
        worksheet.write_string(row, 2, result.gain_type.display())?;
        worksheet.write_number_with_format(row, 3, to_f64(result.net_gain)?, &money)?;
        worksheet.write_number_with_format(row, 4, to_f64(result.taxable_gain)?, &money)?;
        worksheet.write_number(row, 5, to_f64(result.rate)?)?;
        worksheet.write_number_with_format(row, 6, to_f64(result.tax_amount)?, &money)?;
    }

    workbook.save(path)?;
    Ok(())
}

fn to_f64(value: Decimal) -> anyhow::Result<f64> {
    value
        .to_f64()
        .ok_or_else(|| anyhow!("{} cannot be written as a spreadsheet number", value))
}
