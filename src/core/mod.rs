pub mod gain;
pub mod rules;
pub mod transaction;
pub mod warnings;

// Flat public surface for domain types and functions.
pub use gain::{calculate, TaxReport, TaxResult, Totals};
#[allow(unused_imports)]
pub use gain::{compute, process_row, GainType};
pub use rules::{RateSchedule, Regime};
#[allow(unused_imports)]
pub use rules::ScheduleError;
pub use transaction::{Cell, Column, RowError, RowFailure, TransactionRow};
#[allow(unused_imports)]
pub use transaction::TransactionRecord;
#[allow(unused_imports)]
pub use warnings::Warning;
