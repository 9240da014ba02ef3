use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single month-end point for the portfolio chart.
///
/// The value is NOT a historical NAV: holdings as of the month end are valued
/// at today's prices, because no historical price series is available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySnapshot {
    /// Last calendar day of the month
    pub month_end: NaiveDate,

    /// Holdings at month end × today's price, plus loan principal outstanding
    pub approximate_historical_value: Decimal,

    /// Running net contribution ("inleg"): buy cost reduced proportionally on
    /// sells, plus loan principal not yet repaid. Not the FIFO cost basis.
    pub net_contribution: Decimal,
}
