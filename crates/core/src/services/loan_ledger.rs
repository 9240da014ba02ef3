use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use log::warn;
use rust_decimal::Decimal;

use crate::math::percent;
use crate::models::analytics::LoanSummary;
use crate::models::loan::{Loan, LoanTransaction, LoanTransactionKind};

/// Principal-and-interest accounting for peer loans. No lots, no FIFO.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoanLedger;

impl LoanLedger {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(&self, loan: &Loan) -> LoanSummary {
        let total_repaid = sum_of(loan.transactions.iter(), LoanTransactionKind::RepaymentReceived);
        let total_interest = sum_of(loan.transactions.iter(), LoanTransactionKind::InterestReceived);

        if total_repaid > loan.loaned_amount {
            warn!(
                "Loan {} repaid {} exceeds principal {}; outstanding floored at zero",
                loan.id, total_repaid, loan.loaned_amount
            );
        }

        LoanSummary {
            id: loan.id.clone(),
            name: loan.name.clone(),
            status: loan.status,
            loaned_amount: loan.loaned_amount,
            outstanding: (loan.loaned_amount - total_repaid).max(Decimal::ZERO),
            total_interest,
            total_repaid,
            return_pct: percent(total_interest, loan.loaned_amount),
        }
    }

    /// Principal still out right after everything dated at or before `at`.
    /// Zero before the loan started.
    pub fn outstanding_at(&self, loan: &Loan, at: DateTime<Utc>) -> Decimal {
        if loan.start_date > at {
            return Decimal::ZERO;
        }
        let repaid = sum_of(
            loan.transactions.iter().filter(|tx| tx.date <= at),
            LoanTransactionKind::RepaymentReceived,
        );
        (loan.loaned_amount - repaid).max(Decimal::ZERO)
    }

    pub fn outstanding_at_year_end(&self, loan: &Loan, year: i32) -> Decimal {
        match Utc.with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0).single() {
            Some(next_year) => self.outstanding_at(loan, next_year - Duration::nanoseconds(1)),
            None => self.summarize(loan).outstanding,
        }
    }

    pub fn interest_in_year(&self, loan: &Loan, year: i32) -> Decimal {
        sum_of(
            loan.transactions.iter().filter(|tx| tx.date.year() == year),
            LoanTransactionKind::InterestReceived,
        )
    }

    pub fn repaid_in_year(&self, loan: &Loan, year: i32) -> Decimal {
        sum_of(
            loan.transactions.iter().filter(|tx| tx.date.year() == year),
            LoanTransactionKind::RepaymentReceived,
        )
    }
}

fn sum_of<'a>(
    transactions: impl Iterator<Item = &'a LoanTransaction>,
    kind: LoanTransactionKind,
) -> Decimal {
    transactions
        .filter(|tx| tx.kind == kind)
        .map(|tx| tx.amount)
        .sum()
}
