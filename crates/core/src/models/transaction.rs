use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of instrument transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Acquiring units at a price (opens a lot)
    Buy,
    /// Disposing of units (relieves lots oldest-first)
    Sell,
    /// Cash income; no units change hands
    Dividend,
    /// Units received at zero cost basis, optionally with a realized cash value
    StakingReward,
}

impl TransactionKind {
    /// True for kinds whose profit is attributed to the year they happen in.
    pub fn is_profit_event(self) -> bool {
        matches!(
            self,
            TransactionKind::Sell | TransactionKind::Dividend | TransactionKind::StakingReward
        )
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Buy => write!(f, "Buy"),
            TransactionKind::Sell => write!(f, "Sell"),
            TransactionKind::Dividend => write!(f, "Dividend"),
            TransactionKind::StakingReward => write!(f, "StakingReward"),
        }
    }
}

/// A single buy/sell/income record belonging to one instrument.
///
/// All monetary values are already in the reporting currency. The engine
/// never mutates a transaction; edits replace it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: Uuid,

    /// When the transaction happened
    pub date: DateTime<Utc>,

    pub kind: TransactionKind,

    /// Units moved. Zero for dividends.
    pub quantity: Decimal,

    /// Price per unit. Meaningless for Dividend and StakingReward.
    pub price_per_unit: Decimal,

    /// Transaction fees, if any
    #[serde(default)]
    pub fees: Option<Decimal>,

    /// Realized cash value for Dividend / StakingReward
    #[serde(default)]
    pub euro_value: Option<Decimal>,

    /// Marks a Buy/Sell of a fund-like product that carries ongoing costs
    #[serde(default)]
    pub has_ongoing_costs: Option<bool>,

    /// Optional free-text notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl Transaction {
    pub fn new(
        kind: TransactionKind,
        date: DateTime<Utc>,
        quantity: Decimal,
        price_per_unit: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            kind,
            quantity,
            price_per_unit,
            fees: None,
            euro_value: None,
            has_ongoing_costs: None,
            notes: None,
        }
    }

    pub fn buy(date: DateTime<Utc>, quantity: Decimal, price_per_unit: Decimal) -> Self {
        Self::new(TransactionKind::Buy, date, quantity, price_per_unit)
    }

    pub fn sell(date: DateTime<Utc>, quantity: Decimal, price_per_unit: Decimal) -> Self {
        Self::new(TransactionKind::Sell, date, quantity, price_per_unit)
    }

    pub fn dividend(date: DateTime<Utc>, euro_value: Decimal) -> Self {
        Self::new(TransactionKind::Dividend, date, Decimal::ZERO, Decimal::ZERO)
            .with_euro_value(euro_value)
    }

    /// Staking reward of `quantity` units. `euro_value` is the value at receipt.
    pub fn staking_reward(
        date: DateTime<Utc>,
        quantity: Decimal,
        euro_value: Option<Decimal>,
    ) -> Self {
        let mut tx = Self::new(TransactionKind::StakingReward, date, quantity, Decimal::ZERO);
        tx.euro_value = euro_value;
        tx
    }

    #[must_use]
    pub fn with_fees(mut self, fees: Decimal) -> Self {
        self.fees = Some(fees);
        self
    }

    #[must_use]
    pub fn with_euro_value(mut self, euro_value: Decimal) -> Self {
        self.euro_value = Some(euro_value);
        self
    }

    #[must_use]
    pub fn with_ongoing_costs(mut self, flag: bool) -> Self {
        self.has_ongoing_costs = Some(flag);
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Fees, defaulting to zero.
    pub fn fee_amount(&self) -> Decimal {
        self.fees.unwrap_or(Decimal::ZERO)
    }

    /// Income value, defaulting to zero.
    pub fn income_value(&self) -> Decimal {
        self.euro_value.unwrap_or(Decimal::ZERO)
    }

    /// Gross notional: quantity × price.
    pub fn notional(&self) -> Decimal {
        self.quantity * self.price_per_unit
    }

    /// Cash paid for a buy: notional plus fees.
    pub fn buy_cost(&self) -> Decimal {
        self.notional() + self.fee_amount()
    }

    /// Cash received for a sell: notional minus fees.
    pub fn net_revenue(&self) -> Decimal {
        self.notional() - self.fee_amount()
    }

    /// Calendar year of the transaction (UTC).
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// Stable date-ascending ordering that keeps each transaction's input index.
///
/// Ties keep their original input order.
pub fn chronological(transactions: &[Transaction]) -> Vec<(usize, &Transaction)> {
    let mut ordered: Vec<(usize, &Transaction)> = transactions.iter().enumerate().collect();
    ordered.sort_by_key(|(_, tx)| tx.date);
    ordered
}
