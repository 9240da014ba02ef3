use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use log::debug;
use rust_decimal::Decimal;

use crate::models::chart::MonthlySnapshot;
use crate::models::instrument::Instrument;
use crate::models::loan::Loan;
use crate::models::settings::FeeAllocation;
use crate::models::transaction::{chronological, Transaction, TransactionKind};
use crate::services::loan_ledger::LoanLedger;
use crate::services::lot_ledger::LotLedger;

/// Builds month-end points for the portfolio chart.
///
/// Each point values the holdings of that month end at TODAY's price. The
/// series answers "what would this position be worth now", not "what was it
/// worth then".
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeSeriesComposer {
    ledger: LotLedger,
    loan_ledger: LoanLedger,
}

impl TimeSeriesComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fee_allocation(fee_allocation: FeeAllocation) -> Self {
        Self {
            ledger: LotLedger::with_fee_allocation(fee_allocation),
            loan_ledger: LoanLedger::new(),
        }
    }

    /// One point per calendar month, from the month of the earliest
    /// transaction or loan start through the month containing `today`.
    pub fn monthly_series(
        &self,
        instruments: &[Instrument],
        loans: &[Loan],
        today: NaiveDate,
    ) -> Vec<MonthlySnapshot> {
        let Some(earliest) = earliest_date(instruments, loans) else {
            return Vec::new();
        };

        let last_month = first_of_month(today);
        let mut month = first_of_month(earliest);
        let mut series = Vec::new();

        while month <= last_month {
            let Some(next) = next_month(month) else {
                break;
            };
            let cutoff = start_of_day(next) - Duration::nanoseconds(1);
            let month_end = next.pred_opt().unwrap_or(month);
            series.push(self.snapshot(instruments, loans, month_end, cutoff));
            month = next;
        }

        debug!(
            "Composed {} monthly points from {} to {}",
            series.len(),
            first_of_month(earliest),
            last_month
        );
        series
    }

    fn snapshot(
        &self,
        instruments: &[Instrument],
        loans: &[Loan],
        month_end: NaiveDate,
        cutoff: DateTime<Utc>,
    ) -> MonthlySnapshot {
        let mut value = Decimal::ZERO;
        let mut contribution = Decimal::ZERO;

        for instrument in instruments {
            let quantity = self.ledger.quantity_at(&instrument.transactions, cutoff);
            value += quantity * instrument.current_price;
            contribution += approximate_contribution(&instrument.transactions, cutoff);
        }
        for loan in loans {
            let outstanding = self.loan_ledger.outstanding_at(loan, cutoff);
            value += outstanding;
            contribution += outstanding;
        }

        MonthlySnapshot {
            month_end,
            approximate_historical_value: value,
            net_contribution: contribution,
        }
    }
}

/// Running net contribution up to `cutoff`.
///
/// Buys add their full cost. A sell removes the same fraction of the running
/// contribution as it removes from the units held at that moment. This is not
/// the FIFO cost basis: it ignores which lots were sold.
pub fn approximate_contribution(transactions: &[Transaction], cutoff: DateTime<Utc>) -> Decimal {
    let mut contribution = Decimal::ZERO;
    let mut held = Decimal::ZERO;

    for (_, tx) in chronological(transactions)
        .into_iter()
        .take_while(|(_, tx)| tx.date <= cutoff)
    {
        match tx.kind {
            TransactionKind::Buy => {
                contribution += tx.buy_cost();
                held += tx.quantity;
            }
            TransactionKind::StakingReward => held += tx.quantity,
            TransactionKind::Sell => {
                if held > Decimal::ZERO {
                    let fraction = (tx.quantity / held).min(Decimal::ONE);
                    contribution -= contribution * fraction;
                }
                held = (held - tx.quantity).max(Decimal::ZERO);
            }
            TransactionKind::Dividend => {}
        }
    }
    contribution
}

fn earliest_date(instruments: &[Instrument], loans: &[Loan]) -> Option<NaiveDate> {
    let tx_dates = instruments
        .iter()
        .flat_map(|i| i.transactions.iter().map(|tx| tx.date));
    let loan_dates = loans.iter().map(|l| l.start_date);
    tx_dates.chain(loan_dates).min().map(|d| d.date_naive())
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn next_month(month_start: NaiveDate) -> Option<NaiveDate> {
    if month_start.month() == 12 {
        NaiveDate::from_ymd_opt(month_start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(month_start.year(), month_start.month() + 1, 1)
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}
