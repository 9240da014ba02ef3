use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::instrument::{Category, Instrument};

/// How the residual acquisition fee of a lot is split when only part of the
/// lot is sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeeAllocation {
    /// Fee follows quantity: a slice of the lot carries the same share of the fee.
    #[default]
    Proportional,
    /// The first sale out of a lot absorbs the whole remaining fee.
    FrontLoaded,
}

/// User-configurable settings, passed explicitly into every computation
/// that depends on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Label of the currency all values are already expressed in (e.g., "EUR").
    pub reporting_currency: String,

    /// Master switch for ongoing-cost (TER) accrual.
    pub ongoing_costs_enabled: bool,

    /// TER used for flagged instruments without an override.
    pub default_ter_percent: Decimal,

    /// Per-ticker TER. Presence of an entry also flags the instrument.
    pub ter_overrides: HashMap<String, Decimal>,

    pub fee_allocation: FeeAllocation,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reporting_currency: "EUR".to_string(),
            ongoing_costs_enabled: false,
            default_ter_percent: Decimal::ZERO,
            ter_overrides: HashMap::new(),
            fee_allocation: FeeAllocation::default(),
        }
    }
}

impl Settings {
    /// Set a TER for one ticker. Tickers are stored uppercased.
    pub fn set_ter(&mut self, ticker: &str, percent: Decimal) {
        self.ter_overrides.insert(ticker.trim().to_uppercase(), percent);
    }

    pub fn clear_ter(&mut self, ticker: &str) -> bool {
        self.ter_overrides
            .remove(&ticker.trim().to_uppercase())
            .is_some()
    }

    /// Uppercase every override key, merging keys that differ only in case.
    pub fn normalize_ter_overrides(&mut self) {
        self.ter_overrides = self
            .ter_overrides
            .drain()
            .map(|(ticker, ter)| (ticker.trim().to_uppercase(), ter))
            .collect();
    }

    fn override_for(&self, ticker: &str) -> Option<Decimal> {
        self.ter_overrides.get(ticker).copied().or_else(|| {
            self.ter_overrides
                .iter()
                .find(|(key, _)| key.trim().eq_ignore_ascii_case(ticker))
                .map(|(_, ter)| *ter)
        })
    }

    /// Effective TER for an instrument, or `None` when it accrues no ongoing cost.
    ///
    /// Only stocks can carry ongoing costs; crypto and commodities never do.
    pub fn ter_for(&self, instrument: &Instrument) -> Option<Decimal> {
        if !self.ongoing_costs_enabled || instrument.category != Category::Stock {
            return None;
        }
        if let Some(ter) = self.override_for(&instrument.ticker) {
            return Some(ter);
        }
        if instrument.flagged_for_ongoing_costs() {
            return Some(self.default_ter_percent);
        }
        None
    }
}
