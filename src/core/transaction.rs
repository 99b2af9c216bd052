use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Required input columns, named as they appear (normalised) in the header row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    #[serde(rename = "purchase date")]
    PurchaseDate,
    #[serde(rename = "sell date")]
    SellDate,
    #[serde(rename = "purchase price")]
    PurchasePrice,
    #[serde(rename = "sell price")]
    SellPrice,
    #[serde(rename = "brokerage & other charges")]
    Charges,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::PurchaseDate,
        Column::SellDate,
        Column::PurchasePrice,
        Column::SellPrice,
        Column::Charges,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::PurchaseDate => "purchase date",
            Column::SellDate => "sell date",
            Column::PurchasePrice => "purchase price",
            Column::SellPrice => "sell price",
            Column::Charges => "brokerage & other charges",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Column::PurchaseDate => "Date the shares were bought",
            Column::SellDate => "Date the shares were sold",
            Column::PurchasePrice => "Total purchase cost",
            Column::SellPrice => "Total sale proceeds",
            Column::Charges => "Brokerage, STT and other transaction charges",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header())
    }
}

/// A single cell as read from the input table
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(Decimal),
    Date(NaiveDate),
}

impl Cell {
    /// Text cell, or `Empty` if the text is only whitespace
    pub fn text(s: &str) -> Cell {
        let s = s.trim();
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// The required cells of one input row, before parsing
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    /// 1-based data row number (the header is not counted)
    pub row: usize,
    pub purchase_date: Cell,
    pub sell_date: Cell,
    pub purchase_price: Cell,
    pub sell_price: Cell,
    pub charges: Cell,
}

impl TransactionRow {
    pub fn cell(&self, column: Column) -> &Cell {
        match column {
            Column::PurchaseDate => &self.purchase_date,
            Column::SellDate => &self.sell_date,
            Column::PurchasePrice => &self.purchase_price,
            Column::SellPrice => &self.sell_price,
            Column::Charges => &self.charges,
        }
    }
}

/// A sale of equity shares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub purchase_date: NaiveDate,
    pub sell_date: NaiveDate,
    pub purchase_price: Decimal,
    pub sell_price: Decimal,
    pub charges: Decimal,
}

impl TryFrom<&TransactionRow> for TransactionRecord {
    type Error = RowFailure;

    fn try_from(row: &TransactionRow) -> Result<Self, Self::Error> {
        Ok(TransactionRecord {
            purchase_date: parse_date(Column::PurchaseDate, &row.purchase_date)?,
            sell_date: parse_date(Column::SellDate, &row.sell_date)?,
            purchase_price: parse_amount(Column::PurchasePrice, &row.purchase_price)?,
            sell_price: parse_amount(Column::SellPrice, &row.sell_price)?,
            charges: parse_amount(Column::Charges, &row.charges)?,
        })
    }
}

/// Why a single row could not be processed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(tag = "type")]
pub enum RowFailure {
    #[error("missing value for '{column}'")]
    MissingValue { column: Column },
    #[error("invalid date '{value}' for '{column}'")]
    InvalidDate { column: Column, value: String },
    #[error("invalid number '{value}' for '{column}'")]
    InvalidNumber { column: Column, value: String },
    #[error("arithmetic overflow computing {step}")]
    Overflow { step: &'static str },
}

/// A row excluded from the results
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[error("row {row}: {failure}")]
pub struct RowError {
    pub row: usize,
    #[serde(flatten)]
    pub failure: RowFailure,
}

// Ambiguous numeric dates are month first; day first only when that fails,
// e.g. 13/01/2024.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m-%d-%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
];

/// Parse a date, dropping any time of day
pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parse an amount, ignoring thousands separators and a rupee marker
pub fn parse_amount_str(s: &str) -> Option<Decimal> {
    let mut s = s.trim();
    for marker in ["₹", "INR", "Rs.", "Rs"] {
        if let Some(rest) = s.strip_prefix(marker) {
            s = rest;
            break;
        }
    }
    let cleaned: String = s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

fn parse_date(column: Column, cell: &Cell) -> Result<NaiveDate, RowFailure> {
    match cell {
        Cell::Empty => Err(RowFailure::MissingValue { column }),
        Cell::Date(date) => Ok(*date),
        Cell::Text(s) => parse_date_str(s).ok_or_else(|| RowFailure::InvalidDate {
            column,
            value: s.clone(),
        }),
        Cell::Number(_) => Err(RowFailure::InvalidDate {
            column,
            value: cell.to_string(),
        }),
    }
}

fn parse_amount(column: Column, cell: &Cell) -> Result<Decimal, RowFailure> {
    match cell {
        Cell::Empty => Err(RowFailure::MissingValue { column }),
        Cell::Number(n) => Ok(*n),
        Cell::Text(s) => parse_amount_str(s).ok_or_else(|| RowFailure::InvalidNumber {
            column,
            value: s.clone(),
        }),
        Cell::Date(_) => Err(RowFailure::InvalidNumber {
            column,
            value: cell.to_string(),
        }),
    }
}
