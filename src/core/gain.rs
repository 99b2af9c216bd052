use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use super::rules::RateSchedule;
use super::transaction::{RowError, RowFailure, TransactionRecord, TransactionRow};
use super::warnings::Warning;

/// Short or long term capital gain, decided by the holding period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GainType {
    ShortTerm,
    LongTerm,
}

impl GainType {
    /// Label used in reports
    pub fn display(&self) -> &'static str {
        match self {
            GainType::ShortTerm => "STCG",
            GainType::LongTerm => "LTCG",
        }
    }
}

impl fmt::Display for GainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Tax computed for one sale
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxResult {
    pub row: usize,
    pub purchase_date: NaiveDate,
    pub sell_date: NaiveDate,
    pub holding_period_days: i64,
    pub gain_type: GainType,
    pub net_gain: Decimal,
    pub taxable_gain: Decimal,
    /// Percentage, e.g. 12.5
    pub rate: Decimal,
    pub tax_amount: Decimal,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl TaxResult {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Compute the tax due on a single sale.
///
/// Short term gains are taxed in full, including losses, which give a
/// negative tax amount. Long term gains are reduced by the exemption and
/// floored at zero.
pub fn compute(
    row: usize,
    record: &TransactionRecord,
    schedule: &RateSchedule,
) -> Result<TaxResult, RowFailure> {
    let holding_period_days = record
        .sell_date
        .signed_duration_since(record.purchase_date)
        .num_days();

    let net_gain = record
        .sell_price
        .checked_sub(record.purchase_price)
        .and_then(|g| g.checked_sub(record.charges))
        .ok_or(RowFailure::Overflow { step: "net gain" })?;

    let gain_type = schedule.classify(holding_period_days);
    let regime = schedule.regime_for(record.sell_date);
    let rate = regime.rate(gain_type);

    let taxable_gain = match gain_type {
        GainType::ShortTerm => net_gain,
        GainType::LongTerm => net_gain
            .checked_sub(regime.exemption(gain_type))
            .ok_or(RowFailure::Overflow {
                step: "taxable gain",
            })?
            .max(Decimal::ZERO),
    };

    let tax_amount = taxable_gain
        .checked_mul(rate)
        .and_then(|t| t.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(RowFailure::Overflow { step: "tax amount" })?;

    let mut warnings = Vec::new();
    if holding_period_days < 0 {
        warnings.push(Warning::SellBeforePurchase {
            days: holding_period_days,
        });
    }
    if tax_amount.is_sign_negative() && !tax_amount.is_zero() {
        warnings.push(Warning::NegativeShortTermTax);
    }

    log::debug!(
        "Row {}: held {} days, {} net={} taxable={} rate={}% tax={}",
        row,
        holding_period_days,
        gain_type,
        net_gain,
        taxable_gain,
        rate,
        tax_amount
    );

    Ok(TaxResult {
        row,
        purchase_date: record.purchase_date,
        sell_date: record.sell_date,
        holding_period_days,
        gain_type,
        net_gain: net_gain.normalize(),
        taxable_gain: taxable_gain.normalize(),
        rate,
        tax_amount: tax_amount.normalize(),
        warnings,
    })
}

/// Parse and compute a single input row
pub fn process_row(row: &TransactionRow, schedule: &RateSchedule) -> Result<TaxResult, RowError> {
    TransactionRecord::try_from(row)
        .and_then(|record| compute(row.row, &record, schedule))
        .map_err(|failure| RowError {
            row: row.row,
            failure,
        })
}

/// Results of a calculation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaxReport {
    pub results: Vec<TaxResult>,
    pub errors: Vec<RowError>,
}

/// Compute every row; failed rows are collected as errors, in input order
pub fn calculate<'a, I>(rows: I, schedule: &RateSchedule) -> TaxReport
where
    I: IntoIterator<Item = &'a TransactionRow>,
{
    let (results, errors): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .map(|row| process_row(row, schedule))
        .partition(Result::is_ok);

    let results: Vec<TaxResult> = results.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<RowError> = errors.into_iter().filter_map(Result::err).collect();

    for error in &errors {
        log::warn!("Skipping {}", error);
    }
    for result in results.iter().filter(|r| r.has_warnings()) {
        for warning in &result.warnings {
            log::warn!("Row {}: {}", result.row, warning);
        }
    }
    log::info!(
        "Computed {} row(s), {} failed",
        results.len(),
        errors.len()
    );

    TaxReport { results, errors }
}

/// Aggregated totals over a set of results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub short_term_count: usize,
    pub long_term_count: usize,
    pub net_gain: Decimal,
    pub taxable_gain: Decimal,
    pub tax_amount: Decimal,
}

impl TaxReport {
    /// Sum the results, or `None` if an amount overflows
    pub fn totals(&self) -> Option<Totals> {
        self.results.iter().try_fold(Totals::default(), |mut t, r| {
            match r.gain_type {
                GainType::ShortTerm => t.short_term_count += 1,
                GainType::LongTerm => t.long_term_count += 1,
            }
            t.net_gain = t.net_gain.checked_add(r.net_gain)?;
            t.taxable_gain = t.taxable_gain.checked_add(r.taxable_gain)?;
            t.tax_amount = t.tax_amount.checked_add(r.tax_amount)?;
            Some(t)
        })
    }

    pub fn has_issues(&self) -> bool {
        !self.errors.is_empty() || self.results.iter().any(TaxResult::has_warnings)
    }
}
