use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::instrument::Category;
use super::loan::LoanStatus;

/// Per-loan figures. Loans have no unrealized leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub id: String,
    pub name: String,
    pub status: LoanStatus,
    pub loaned_amount: Decimal,
    /// Principal not yet repaid, floored at zero
    pub outstanding: Decimal,
    /// Interest received; the loan's realized figure
    pub total_interest: Decimal,
    pub total_repaid: Decimal,
    /// total_interest / loaned_amount × 100
    pub return_pct: Decimal,
}

/// Summary of a single instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSummary {
    pub ticker: String,
    pub name: String,
    pub category: Category,
    pub quantity: Decimal,
    pub current_price: Decimal,
    pub current_value: Decimal,
    pub invested: Decimal,
    pub cost_basis: Decimal,
    pub realized: Decimal,
    pub unrealized: Decimal,
    /// Flat ongoing-cost accrual; zero when not applicable
    pub ongoing_cost: Decimal,
    /// realized + unrealized - ongoing_cost
    pub total_return: Decimal,
    pub return_pct: Decimal,
    /// Share of this instrument in the value of all instruments × 100
    pub allocation_pct: Decimal,
    /// Units sold beyond holdings, counted at zero cost
    pub oversold_quantity: Decimal,
}

/// Aggregated figures for one category (or the whole portfolio).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub invested: Decimal,
    pub current_value: Decimal,
    pub realized: Decimal,
    pub unrealized: Decimal,
    pub ongoing_costs: Decimal,
    /// realized + unrealized - ongoing_costs
    pub total_return: Decimal,
    /// total_return / invested × 100, zero when nothing was invested
    pub return_pct: Decimal,
}

/// Portfolio-wide breakdown by category plus a grand total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub stocks: CategorySummary,
    pub crypto: CategorySummary,
    pub commodities: CategorySummary,
    pub loans: CategorySummary,
    pub total: CategorySummary,
    /// Sorted by allocation, largest first
    pub instruments: Vec<InstrumentSummary>,
    pub loan_details: Vec<LoanSummary>,
}

impl PortfolioSummary {
    pub fn category(&self, category: Category) -> &CategorySummary {
        match category {
            Category::Stock => &self.stocks,
            Category::Crypto => &self.crypto,
            Category::Commodity => &self.commodities,
        }
    }
}

/// One instrument's row in a yearly report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentYearRow {
    pub ticker: String,
    pub name: String,
    pub category: Category,
    /// Realized by sells and income dated inside the year
    pub realized_in_year: Decimal,
    /// Unrealized as of now, from a full replay
    pub unrealized_now: Decimal,
    /// Dividend and staking income dated inside the year
    pub income_in_year: Decimal,
    pub fees_in_year: Decimal,
    /// Cash spent on buys inside the year, fees included
    pub bought_in_year: Decimal,
    /// Net revenue of sells inside the year
    pub sold_in_year: Decimal,
    /// Flat TER accrual on today's value. Not attributed to the year: every
    /// report repeats it, even for years after the position was closed.
    pub ongoing_cost_now: Decimal,
}

/// One loan's row in a yearly report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanYearRow {
    pub id: String,
    pub name: String,
    pub interest_in_year: Decimal,
    pub repaid_in_year: Decimal,
    pub outstanding_at_year_end: Decimal,
}

/// Totals of a yearly report for one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearTotals {
    pub realized_in_year: Decimal,
    pub unrealized_now: Decimal,
    pub income_in_year: Decimal,
    pub fees_in_year: Decimal,
    /// Sum of the rows' `ongoing_cost_now`
    pub ongoing_costs_now: Decimal,
}

/// Everything reported for one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearReport {
    pub year: i32,
    pub instruments: Vec<InstrumentYearRow>,
    pub loans: Vec<LoanYearRow>,
    pub stocks: YearTotals,
    pub crypto: YearTotals,
    pub commodities: YearTotals,
    /// Loan interest received in the year
    pub loan_interest: Decimal,
    pub total: YearTotals,
}
