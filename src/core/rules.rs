use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;

use super::gain::GainType;

/// Holding period (in days) up to which a gain is short term.
pub const DEFAULT_LONG_TERM_AFTER_DAYS: i64 = 365;

/// Date from which the Budget 2024 rates apply to equity sales.
pub const BUDGET_2024_CUTOVER: NaiveDate = match NaiveDate::from_ymd_opt(2024, 7, 23) {
    Some(date) => date,
    None => panic!("invalid cutover date"),
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("rate schedule has no regimes")]
    Empty,
    #[error("rate schedule needs exactly one baseline regime without effective_from, found {0}")]
    Baseline(usize),
    #[error("more than one regime is effective from {0}")]
    DuplicateEffectiveDate(NaiveDate),
    #[error("negative {field} in regime effective from {from}")]
    Negative { field: &'static str, from: String },
    #[error("long_term_after_days must not be negative: {0}")]
    NegativeThreshold(i64),
}

/// Rates and exemption in force from a given sale date.
///
/// Rates are percentages, so `12.5` means 12.5%.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Regime {
    /// First sale date the regime applies to. Omitted for the baseline regime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub effective_from: Option<NaiveDate>,
    /// Short term capital gains rate (%)
    #[schemars(with = "f64")]
    pub stcg_rate: Decimal,
    /// Long term capital gains rate (%)
    #[schemars(with = "f64")]
    pub ltcg_rate: Decimal,
    /// Long term gain exempt from tax, per transaction
    #[schemars(with = "f64")]
    pub ltcg_exemption: Decimal,
}

impl Regime {
    pub fn rate(&self, gain_type: GainType) -> Decimal {
        match gain_type {
            GainType::ShortTerm => self.stcg_rate,
            GainType::LongTerm => self.ltcg_rate,
        }
    }

    pub fn exemption(&self, gain_type: GainType) -> Decimal {
        match gain_type {
            GainType::ShortTerm => Decimal::ZERO,
            GainType::LongTerm => self.ltcg_exemption,
        }
    }

    /// Display the start of the regime, "baseline" when it has none
    pub fn display_from(&self) -> String {
        self.effective_from
            .map_or("baseline".to_string(), |d| d.format("%Y-%m-%d").to_string())
    }
}

/// Ordered table of tax regimes keyed by the date they take effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RateSchedule {
    /// Gains held for more than this many days are long term
    #[serde(default = "default_long_term_after_days")]
    pub long_term_after_days: i64,
    #[serde(rename = "regime")]
    regimes: Vec<Regime>,
}

fn default_long_term_after_days() -> i64 {
    DEFAULT_LONG_TERM_AFTER_DAYS
}

impl Default for RateSchedule {
    fn default() -> Self {
        RateSchedule {
            long_term_after_days: DEFAULT_LONG_TERM_AFTER_DAYS,
            regimes: vec![
                Regime {
                    effective_from: None,
                    stcg_rate: dec!(15),
                    ltcg_rate: dec!(10),
                    ltcg_exemption: dec!(100000),
                },
                Regime {
                    effective_from: Some(BUDGET_2024_CUTOVER),
                    stcg_rate: dec!(20),
                    ltcg_rate: dec!(12.5),
                    ltcg_exemption: dec!(125000),
                },
            ],
        }
    }
}

impl RateSchedule {
    /// Build a schedule, ordering the regimes by effective date.
    pub fn new(long_term_after_days: i64, regimes: Vec<Regime>) -> Result<Self, ScheduleError> {
        let schedule = RateSchedule {
            long_term_after_days,
            regimes,
        };
        schedule.validated()
    }

    /// Parse a schedule from TOML
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        let schedule: RateSchedule = toml::from_str(s)?;
        Ok(Self::new(schedule.long_term_after_days, schedule.regimes)?)
    }

    pub fn read_toml<R: Read>(mut reader: R) -> anyhow::Result<Self> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Self::from_toml(&buf)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn regimes(&self) -> &[Regime] {
        &self.regimes
    }

    /// The regime in force for a sale on `sell_date`.
    ///
    /// A regime applies from its effective date inclusive, so a sale on the
    /// cutover day already uses the new rates.
    pub fn regime_for(&self, sell_date: NaiveDate) -> &Regime {
        self.regimes
            .iter()
            .rev()
            .find(|r| r.effective_from.is_none_or(|from| from <= sell_date))
            .unwrap_or(&self.regimes[0])
    }

    pub fn classify(&self, holding_period_days: i64) -> GainType {
        if holding_period_days <= self.long_term_after_days {
            GainType::ShortTerm
        } else {
            GainType::LongTerm
        }
    }

    fn validated(mut self) -> Result<Self, ScheduleError> {
        if self.regimes.is_empty() {
            return Err(ScheduleError::Empty);
        }
        if self.long_term_after_days < 0 {
            return Err(ScheduleError::NegativeThreshold(self.long_term_after_days));
        }
        let baselines = self
            .regimes
            .iter()
            .filter(|r| r.effective_from.is_none())
            .count();
        if baselines != 1 {
            return Err(ScheduleError::Baseline(baselines));
        }
        for regime in &self.regimes {
            let fields = [
                ("stcg_rate", regime.stcg_rate),
                ("ltcg_rate", regime.ltcg_rate),
                ("ltcg_exemption", regime.ltcg_exemption),
            ];
            if let Some((field, _)) = fields.iter().find(|(_, v)| v.is_sign_negative()) {
                return Err(ScheduleError::Negative {
                    field: *field,
                    from: regime.display_from(),
                });
            }
        }

        // None sorts before Some, so the baseline comes first
        self.regimes.sort_by_key(|r| r.effective_from);
        for pair in self.regimes.windows(2) {
            if let (Some(a), Some(b)) = (pair[0].effective_from, pair[1].effective_from) {
                if a == b {
                    return Err(ScheduleError::DuplicateEffectiveDate(a));
                }
            }
        }
        Ok(self)
    }
}
