use chrono::Datelike;
use log::debug;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::analytics::{InstrumentYearRow, LoanYearRow, YearReport, YearTotals};
use crate::models::instrument::{Category, Instrument};
use crate::models::ledger::YearRealized;
use crate::models::portfolio::Portfolio;
use crate::models::settings::FeeAllocation;
use crate::models::transaction::{chronological, Transaction, TransactionKind};
use crate::services::cost_accrual::CostAccrual;
use crate::services::loan_ledger::LoanLedger;
use crate::services::lot_ledger::{LedgerState, LotLedger};

/// Replays an instrument's history bounded by a calendar year.
///
/// Lot consumption honours every transaction up to the end of the year, so a
/// sale in year Y can relieve a lot bought years earlier; only profit events
/// dated inside the year are counted towards it.
#[derive(Debug, Clone, Copy, Default)]
pub struct YearReplay {
    ledger: LotLedger,
}

impl YearReplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fee_allocation(fee_allocation: FeeAllocation) -> Self {
        Self {
            ledger: LotLedger::with_fee_allocation(fee_allocation),
        }
    }

    /// Realized profit of `year`, with the contribution of each in-year
    /// Sell/Dividend/StakingReward keyed by its index in `transactions`.
    pub fn realized_in_year(&self, transactions: &[Transaction], year: i32) -> YearRealized {
        let mut state = LedgerState::new(self.ledger.fee_allocation());
        let mut per_transaction_profit = BTreeMap::new();
        let mut total_realized = Decimal::ZERO;

        for (index, tx) in chronological(transactions) {
            if tx.year() > year {
                break;
            }
            let profit = state.apply(tx);
            if tx.kind.is_profit_event() && tx.year() == year {
                total_realized += profit;
                per_transaction_profit.insert(index, profit);
            }
        }

        YearRealized {
            year,
            total_realized,
            per_transaction_profit,
        }
    }

    /// Distinct years in which any of `transactions` happened, ascending.
    pub fn years(&self, transactions: &[Transaction]) -> Vec<i32> {
        transactions
            .iter()
            .map(Transaction::year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Per-year report over the whole portfolio.
    ///
    /// Unrealized figures always come from an unbounded replay at the current
    /// price: a position held across years has a single, present-day paper gain.
    pub fn year_report(&self, portfolio: &Portfolio, year: i32) -> YearReport {
        let accrual = CostAccrual::new();
        let loan_ledger = LoanLedger::new();

        let mut instruments = Vec::new();
        let mut stocks = YearTotals::default();
        let mut crypto = YearTotals::default();
        let mut commodities = YearTotals::default();

        for instrument in &portfolio.instruments {
            if !instrument.transactions.iter().any(|tx| tx.year() <= year) {
                continue;
            }
            let row = self.instrument_row(instrument, year, &accrual, portfolio);
            let totals = match instrument.category {
                Category::Stock => &mut stocks,
                Category::Crypto => &mut crypto,
                Category::Commodity => &mut commodities,
            };
            add_row(totals, &row);
            instruments.push(row);
        }

        let loans: Vec<LoanYearRow> = portfolio
            .loans
            .iter()
            .filter(|loan| loan.start_date.year() <= year)
            .map(|loan| LoanYearRow {
                id: loan.id.clone(),
                name: loan.name.clone(),
                interest_in_year: loan_ledger.interest_in_year(loan, year),
                repaid_in_year: loan_ledger.repaid_in_year(loan, year),
                outstanding_at_year_end: loan_ledger.outstanding_at_year_end(loan, year),
            })
            .collect();
        let loan_interest: Decimal = loans.iter().map(|l| l.interest_in_year).sum();

        let mut total = YearTotals::default();
        for part in [&stocks, &crypto, &commodities] {
            total.realized_in_year += part.realized_in_year;
            total.unrealized_now += part.unrealized_now;
            total.income_in_year += part.income_in_year;
            total.fees_in_year += part.fees_in_year;
            total.ongoing_costs_now += part.ongoing_costs_now;
        }
        total.realized_in_year += loan_interest;
        total.income_in_year += loan_interest;

        debug!(
            "Year {} report: {} instruments, {} loans, realized {}",
            year,
            instruments.len(),
            loans.len(),
            total.realized_in_year
        );

        YearReport {
            year,
            instruments,
            loans,
            stocks,
            crypto,
            commodities,
            loan_interest,
            total,
        }
    }

    fn instrument_row(
        &self,
        instrument: &Instrument,
        year: i32,
        accrual: &CostAccrual,
        portfolio: &Portfolio,
    ) -> InstrumentYearRow {
        let realized = self.realized_in_year(&instrument.transactions, year);
        let full = self
            .ledger
            .replay(&instrument.transactions, instrument.current_price);
        let ongoing_cost_now = accrual.accrue_with_settings(instrument, &portfolio.settings, &full);

        let mut income_in_year = Decimal::ZERO;
        let mut fees_in_year = Decimal::ZERO;
        let mut bought_in_year = Decimal::ZERO;
        let mut sold_in_year = Decimal::ZERO;
        for tx in instrument.transactions.iter().filter(|tx| tx.year() == year) {
            fees_in_year += tx.fee_amount();
            match tx.kind {
                TransactionKind::Buy => bought_in_year += tx.buy_cost(),
                TransactionKind::Sell => sold_in_year += tx.net_revenue(),
                TransactionKind::Dividend | TransactionKind::StakingReward => {
                    income_in_year += tx.income_value()
                }
            }
        }

        InstrumentYearRow {
            ticker: instrument.ticker.clone(),
            name: instrument.name.clone(),
            category: instrument.category,
            realized_in_year: realized.total_realized,
            unrealized_now: full.unrealized,
            income_in_year,
            fees_in_year,
            bought_in_year,
            sold_in_year,
            ongoing_cost_now,
        }
    }
}

fn add_row(totals: &mut YearTotals, row: &InstrumentYearRow) {
    totals.realized_in_year += row.realized_in_year;
    totals.unrealized_now += row.unrealized_now;
    totals.income_in_year += row.income_in_year;
    totals.fees_in_year += row.fees_in_year;
    totals.ongoing_costs_now += row.ongoing_cost_now;
}
