use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::math::ratio;

/// An open batch of units, alive only for the duration of a replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    /// Date of the transaction that opened the lot
    pub acquired: DateTime<Utc>,

    /// Units still open in this lot
    pub quantity: Decimal,

    /// Purchase price per unit (zero for staking rewards)
    pub price_per_unit: Decimal,

    /// Acquisition fee still attached to the open quantity
    pub fee: Decimal,
}

impl Lot {
    pub fn new(acquired: DateTime<Utc>, quantity: Decimal, price_per_unit: Decimal, fee: Decimal) -> Self {
        Self {
            acquired,
            quantity,
            price_per_unit,
            fee,
        }
    }

    /// Price plus the per-unit share of the remaining fee.
    pub fn unit_cost(&self) -> Decimal {
        self.price_per_unit + ratio(self.fee, self.quantity)
    }

    /// Total cost still carried by the open quantity.
    pub fn cost_basis(&self) -> Decimal {
        self.quantity * self.price_per_unit + self.fee
    }
}

/// Outcome of replaying one instrument's transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerResult {
    /// Profit locked in by sells and income events
    pub realized: Decimal,

    /// Paper profit on open lots against the supplied price
    pub unrealized: Decimal,

    /// Units still held
    pub current_quantity: Decimal,

    /// Acquisition cost attributed to the open lots
    pub cost_basis: Decimal,

    /// Total cash ever spent on buys, fees included
    pub invested: Decimal,

    /// Units sold beyond what was held; treated as acquired at zero cost
    pub oversold_quantity: Decimal,

    /// Lots still open after the replay, oldest first
    pub open_lots: Vec<Lot>,
}

impl LedgerResult {
    pub fn empty() -> Self {
        Self {
            realized: Decimal::ZERO,
            unrealized: Decimal::ZERO,
            current_quantity: Decimal::ZERO,
            cost_basis: Decimal::ZERO,
            invested: Decimal::ZERO,
            oversold_quantity: Decimal::ZERO,
            open_lots: Vec::new(),
        }
    }

    /// Market value of the open quantity at `price`.
    pub fn market_value(&self, price: Decimal) -> Decimal {
        self.current_quantity * price
    }

    pub fn is_oversold(&self) -> bool {
        self.oversold_quantity > Decimal::ZERO
    }
}

impl Default for LedgerResult {
    fn default() -> Self {
        Self::empty()
    }
}

/// Realized profit attributed to one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRealized {
    pub year: i32,

    pub total_realized: Decimal,

    /// Input index of each in-year Sell/Dividend/StakingReward → its realized profit
    pub per_transaction_profit: BTreeMap<usize, Decimal>,
}
