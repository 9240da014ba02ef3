use rust_decimal::Decimal;

use crate::models::instrument::{Category, Instrument};
use crate::models::ledger::LedgerResult;
use crate::models::settings::Settings;

/// Ongoing-cost (TER) accrual for fund-like instruments.
///
/// This is a flat charge of `terPercent` against today's market value. It is
/// an approximation: it neither weights by holding period nor averages the
/// balance over the year, and it does not compound.
#[derive(Debug, Clone, Copy, Default)]
pub struct CostAccrual;

impl CostAccrual {
    pub fn new() -> Self {
        Self
    }

    /// `quantity × price × terPercent / 100`. Crypto and commodities never accrue.
    pub fn accrue(
        &self,
        instrument: &Instrument,
        ter_percent: Decimal,
        current_quantity: Decimal,
        current_price: Decimal,
    ) -> Decimal {
        if instrument.category != Category::Stock {
            return Decimal::ZERO;
        }
        current_quantity * current_price * (ter_percent / Decimal::ONE_HUNDRED)
    }

    /// Accrual driven by the settings; zero when the instrument is not flagged
    /// or ongoing costs are switched off.
    pub fn accrue_with_settings(
        &self,
        instrument: &Instrument,
        settings: &Settings,
        ledger: &LedgerResult,
    ) -> Decimal {
        match settings.ter_for(instrument) {
            Some(ter) => self.accrue(
                instrument,
                ter,
                ledger.current_quantity,
                instrument.current_price,
            ),
            None => Decimal::ZERO,
        }
    }
}
