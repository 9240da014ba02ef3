pub mod cost_accrual;
pub mod loan_ledger;
pub mod lot_ledger;
pub mod portfolio_aggregator;
pub mod portfolio_service;
pub mod time_series;
pub mod year_replay;
