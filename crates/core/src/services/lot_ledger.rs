use chrono::{DateTime, Utc};
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::VecDeque;

use crate::models::ledger::{LedgerResult, Lot};
use crate::models::settings::FeeAllocation;
use crate::models::transaction::{chronological, Transaction, TransactionKind};

/// Portion of a lot's remaining fee that goes with `taken` units.
///
/// Selling the whole lot always takes the whole fee, so the queue never keeps
/// a fee without quantity.
pub fn allocate_fee(lot: &Lot, taken: Decimal, policy: FeeAllocation) -> Decimal {
    if taken >= lot.quantity {
        return lot.fee;
    }
    match policy {
        FeeAllocation::Proportional => lot.fee * taken / lot.quantity,
        FeeAllocation::FrontLoaded => lot.fee,
    }
}

/// Result of relieving quantity from the lot queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Relief {
    /// Acquisition cost of the units taken out of lots
    pub cost: Decimal,
    /// Quantity no lot could cover
    pub uncovered: Decimal,
}

/// FIFO queue of open lots, oldest at the front.
#[derive(Debug, Clone)]
pub(crate) struct LotQueue {
    lots: VecDeque<Lot>,
    policy: FeeAllocation,
}

impl LotQueue {
    pub fn new(policy: FeeAllocation) -> Self {
        Self {
            lots: VecDeque::new(),
            policy,
        }
    }

    pub fn open(&mut self, lot: Lot) {
        debug!(
            "Opening lot of {} @ {} (fee {}) acquired {}",
            lot.quantity, lot.price_per_unit, lot.fee, lot.acquired
        );
        self.lots.push_back(lot);
    }

    /// Take `quantity` units out of the oldest lots first.
    pub fn relieve(&mut self, quantity: Decimal) -> Relief {
        let mut remaining = quantity;
        let mut cost = Decimal::ZERO;

        while remaining > Decimal::ZERO {
            let Some(front) = self.lots.front_mut() else {
                break;
            };
            if front.quantity <= Decimal::ZERO {
                // No units to take, but its fee still leaves the cost basis.
                cost += front.fee;
                self.lots.pop_front();
                continue;
            }

            let taken = remaining.min(front.quantity);
            let fee_part = allocate_fee(front, taken, self.policy);
            cost += taken * front.price_per_unit + fee_part;
            remaining -= taken;

            if taken >= front.quantity {
                self.lots.pop_front();
            } else {
                front.quantity -= taken;
                front.fee -= fee_part;
            }
        }

        Relief {
            cost,
            uncovered: remaining.max(Decimal::ZERO),
        }
    }

    pub fn quantity(&self) -> Decimal {
        self.lots.iter().map(|lot| lot.quantity).sum()
    }

    pub fn cost_basis(&self) -> Decimal {
        self.lots.iter().map(Lot::cost_basis).sum()
    }

    pub fn lots(&self) -> impl Iterator<Item = &Lot> {
        self.lots.iter()
    }
}

/// Running state of a FIFO walk over one instrument.
#[derive(Debug, Clone)]
pub(crate) struct LedgerState {
    pub queue: LotQueue,
    pub realized: Decimal,
    pub invested: Decimal,
    pub oversold: Decimal,
}

impl LedgerState {
    pub fn new(policy: FeeAllocation) -> Self {
        Self {
            queue: LotQueue::new(policy),
            realized: Decimal::ZERO,
            invested: Decimal::ZERO,
            oversold: Decimal::ZERO,
        }
    }

    /// Apply one transaction and return the profit it realizes.
    pub fn apply(&mut self, tx: &Transaction) -> Decimal {
        let profit = match tx.kind {
            TransactionKind::Buy => {
                self.invested += tx.buy_cost();
                self.queue
                    .open(Lot::new(tx.date, tx.quantity, tx.price_per_unit, tx.fee_amount()));
                Decimal::ZERO
            }
            TransactionKind::Sell => {
                let relief = self.queue.relieve(tx.quantity);
                if relief.uncovered > Decimal::ZERO {
                    warn!(
                        "Sell of {} on {} exceeds open lots by {}; uncovered units counted at zero cost",
                        tx.quantity, tx.date, relief.uncovered
                    );
                    self.oversold += relief.uncovered;
                }
                tx.net_revenue() - relief.cost
            }
            TransactionKind::Dividend => tx.income_value(),
            TransactionKind::StakingReward => {
                self.queue
                    .open(Lot::new(tx.date, tx.quantity, Decimal::ZERO, Decimal::ZERO));
                tx.income_value()
            }
        };
        self.realized += profit;
        profit
    }

    pub fn into_result(self, current_price: Decimal) -> LedgerResult {
        let current_quantity = self.queue.quantity();
        let cost_basis = self.queue.cost_basis();
        LedgerResult {
            realized: self.realized,
            unrealized: current_quantity * current_price - cost_basis,
            current_quantity,
            cost_basis,
            invested: self.invested,
            oversold_quantity: self.oversold,
            open_lots: self.queue.lots().cloned().collect(),
        }
    }
}

/// FIFO lot engine for a single instrument.
///
/// Pure business logic: every call re-sorts and replays the full
/// transaction list from scratch.
#[derive(Debug, Clone, Copy, Default)]
pub struct LotLedger {
    fee_allocation: FeeAllocation,
}

impl LotLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fee_allocation(fee_allocation: FeeAllocation) -> Self {
        Self { fee_allocation }
    }

    pub fn fee_allocation(&self) -> FeeAllocation {
        self.fee_allocation
    }

    /// Replay every transaction and value the open lots at `current_price`.
    pub fn replay(&self, transactions: &[Transaction], current_price: Decimal) -> LedgerResult {
        let mut state = LedgerState::new(self.fee_allocation);
        for (_, tx) in chronological(transactions) {
            state.apply(tx);
        }
        let result = state.into_result(current_price);
        debug!(
            "Replayed {} transactions: realized {}, quantity {}, cost basis {}",
            transactions.len(),
            result.realized,
            result.current_quantity,
            result.cost_basis
        );
        result
    }

    /// Replay only transactions dated at or before `cutoff`.
    pub fn replay_until(
        &self,
        transactions: &[Transaction],
        current_price: Decimal,
        cutoff: DateTime<Utc>,
    ) -> LedgerResult {
        let mut state = LedgerState::new(self.fee_allocation);
        for (_, tx) in chronological(transactions)
            .into_iter()
            .take_while(|(_, tx)| tx.date <= cutoff)
        {
            state.apply(tx);
        }
        state.into_result(current_price)
    }

    /// Units held right after everything dated at or before `at`.
    pub fn quantity_at(&self, transactions: &[Transaction], at: DateTime<Utc>) -> Decimal {
        self.replay_until(transactions, Decimal::ZERO, at).current_quantity
    }
}
