//! Loading transaction tables from CSV files and spreadsheets

pub mod delimited;
pub mod workbook;

use crate::core::{Cell, Column, TransactionRow};
use anyhow::Context;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("input has no header row")]
    NoHeader,
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Raw input table with normalised header names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: impl IntoIterator<Item = impl AsRef<str>>, rows: Vec<Vec<Cell>>) -> Self {
        Table {
            headers: headers
                .into_iter()
                .map(|h| normalize_header(h.as_ref()))
                .collect(),
            rows,
        }
    }

    /// Check the required columns are present and pick them out of each row.
    ///
    /// Rows with every cell empty are skipped. Row numbers still follow the
    /// position in the file so they can be found in the source.
    pub fn transaction_rows(&self) -> Result<Vec<TransactionRow>, SchemaError> {
        let columns = ColumnMap::from_headers(&self.headers)?;
        Ok(self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, cells)| !cells.iter().all(Cell::is_empty))
            .map(|(i, cells)| columns.row(i + 1, cells))
            .collect())
    }
}

/// Header names are compared trimmed and lower case
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Position of each required column in the header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    purchase_date: usize,
    sell_date: usize,
    purchase_price: usize,
    sell_price: usize,
    charges: usize,
}

impl ColumnMap {
    pub fn from_headers(headers: &[String]) -> Result<Self, SchemaError> {
        if headers.iter().all(|h| h.is_empty()) {
            return Err(SchemaError::NoHeader);
        }
        let find = |column: Column| headers.iter().position(|h| h == column.header());

        let missing: Vec<String> = Column::ALL
            .iter()
            .filter(|c| find(**c).is_none())
            .map(|c| c.header().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns(missing));
        }

        let index = |column: Column| find(column).unwrap_or_default();
        Ok(ColumnMap {
            purchase_date: index(Column::PurchaseDate),
            sell_date: index(Column::SellDate),
            purchase_price: index(Column::PurchasePrice),
            sell_price: index(Column::SellPrice),
            charges: index(Column::Charges),
        })
    }

    fn row(&self, row: usize, cells: &[Cell]) -> TransactionRow {
        let cell = |i: usize| cells.get(i).cloned().unwrap_or(Cell::Empty);
        TransactionRow {
            row,
            purchase_date: cell(self.purchase_date),
            sell_date: cell(self.sell_date),
            purchase_price: cell(self.purchase_price),
            sell_price: cell(self.sell_price),
            charges: cell(self.charges),
        }
    }
}

/// Read a table from a file, or CSV from stdin with "-"
pub fn load(path: &Path) -> anyhow::Result<Table> {
    let table = if path.as_os_str() == "-" {
        read_from_stdin()?
    } else {
        read_from_file(path)?
    };
    log::info!("Read {} rows from {}", table.rows.len(), path.display());
    Ok(table)
}

fn read_from_file(path: &Path) -> anyhow::Result<Table> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    match extension.as_deref() {
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => workbook::read_workbook(path),
        _ => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            delimited::read_csv(BufReader::new(file))
        }
    }
}

fn read_from_stdin() -> anyhow::Result<Table> {
    let mut buffer = Vec::new();
    io::stdin().lock().read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe CSV data to stdin.");
    }
    delimited::read_csv(io::Cursor::new(buffer))
}
