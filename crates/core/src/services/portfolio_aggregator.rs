use log::debug;
use rust_decimal::Decimal;

use crate::math::percent;
use crate::models::analytics::{CategorySummary, InstrumentSummary, LoanSummary, PortfolioSummary};
use crate::models::instrument::{Category, Instrument};
use crate::models::loan::Loan;
use crate::models::portfolio::Portfolio;
use crate::models::settings::Settings;
use crate::services::cost_accrual::CostAccrual;
use crate::services::loan_ledger::LoanLedger;
use crate::services::lot_ledger::LotLedger;

/// Composes per-instrument ledgers and per-loan summaries into category
/// totals and a grand total.
///
/// Loans contribute their principal to "invested" and the outstanding
/// principal to "current value"; interest received is their whole return.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortfolioAggregator {
    accrual: CostAccrual,
    loan_ledger: LoanLedger,
}

impl PortfolioAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summarize_portfolio(&self, portfolio: &Portfolio) -> PortfolioSummary {
        self.summarize(&portfolio.instruments, &portfolio.loans, &portfolio.settings)
    }

    /// Full summary. Settings decide fee allocation and ongoing-cost accrual.
    pub fn summarize(
        &self,
        instruments: &[Instrument],
        loans: &[Loan],
        settings: &Settings,
    ) -> PortfolioSummary {
        let ledger = LotLedger::with_fee_allocation(settings.fee_allocation);

        // 1. Per-instrument rows
        let mut rows: Vec<InstrumentSummary> = instruments
            .iter()
            .map(|instrument| self.instrument_summary(&ledger, instrument, settings))
            .collect();

        let instruments_value: Decimal = rows.iter().map(|r| r.current_value).sum();
        for row in &mut rows {
            row.allocation_pct = percent(row.current_value, instruments_value);
        }
        rows.sort_by(|a, b| {
            b.allocation_pct
                .cmp(&a.allocation_pct)
                .then_with(|| a.ticker.cmp(&b.ticker))
        });

        // 2. Category buckets
        let stocks = category_totals(rows.iter().filter(|r| r.category == Category::Stock));
        let crypto = category_totals(rows.iter().filter(|r| r.category == Category::Crypto));
        let commodities =
            category_totals(rows.iter().filter(|r| r.category == Category::Commodity));

        // 3. Loans
        let loan_details: Vec<LoanSummary> =
            loans.iter().map(|loan| self.loan_ledger.summarize(loan)).collect();
        let loans_total = loan_totals(&loan_details);

        // 4. Grand total
        let total = combine(&[&stocks, &crypto, &commodities, &loans_total]);

        debug!(
            "Portfolio summary: {} instruments, {} loans, invested {}, value {}, return {}",
            rows.len(),
            loan_details.len(),
            total.invested,
            total.current_value,
            total.total_return
        );

        PortfolioSummary {
            stocks,
            crypto,
            commodities,
            loans: loans_total,
            total,
            instruments: rows,
            loan_details,
        }
    }

    fn instrument_summary(
        &self,
        ledger: &LotLedger,
        instrument: &Instrument,
        settings: &Settings,
    ) -> InstrumentSummary {
        let result = ledger.replay(&instrument.transactions, instrument.current_price);
        let ongoing_cost = self.accrual.accrue_with_settings(instrument, settings, &result);
        let total_return = result.realized + result.unrealized - ongoing_cost;

        InstrumentSummary {
            ticker: instrument.ticker.clone(),
            name: instrument.name.clone(),
            category: instrument.category,
            quantity: result.current_quantity,
            current_price: instrument.current_price,
            current_value: result.market_value(instrument.current_price),
            invested: result.invested,
            cost_basis: result.cost_basis,
            realized: result.realized,
            unrealized: result.unrealized,
            ongoing_cost,
            total_return,
            return_pct: percent(total_return, result.invested),
            allocation_pct: Decimal::ZERO, // filled once all values are known
            oversold_quantity: result.oversold_quantity,
        }
    }
}

fn category_totals<'a>(rows: impl Iterator<Item = &'a InstrumentSummary>) -> CategorySummary {
    let mut summary = CategorySummary::default();
    for row in rows {
        summary.invested += row.invested;
        summary.current_value += row.current_value;
        summary.realized += row.realized;
        summary.unrealized += row.unrealized;
        summary.ongoing_costs += row.ongoing_cost;
    }
    finish(summary)
}

fn loan_totals(loans: &[LoanSummary]) -> CategorySummary {
    let mut summary = CategorySummary::default();
    for loan in loans {
        summary.invested += loan.loaned_amount;
        summary.current_value += loan.outstanding;
        summary.realized += loan.total_interest;
    }
    finish(summary)
}

fn combine(parts: &[&CategorySummary]) -> CategorySummary {
    let mut summary = CategorySummary::default();
    for part in parts {
        summary.invested += part.invested;
        summary.current_value += part.current_value;
        summary.realized += part.realized;
        summary.unrealized += part.unrealized;
        summary.ongoing_costs += part.ongoing_costs;
    }
    finish(summary)
}

fn finish(mut summary: CategorySummary) -> CategorySummary {
    summary.total_return = summary.realized + summary.unrealized - summary.ongoing_costs;
    summary.return_pct = percent(summary.total_return, summary.invested);
    summary
}
