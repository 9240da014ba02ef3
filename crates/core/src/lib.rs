pub mod errors;
pub mod math;
pub mod models;
pub mod services;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use models::{
    analytics::{PortfolioSummary, YearReport},
    chart::MonthlySnapshot,
    instrument::{Category, Instrument},
    ledger::{LedgerResult, YearRealized},
    loan::{Loan, LoanStatus, LoanTransaction},
    portfolio::Portfolio,
    settings::Settings,
    transaction::Transaction,
};
use rust_decimal::Decimal;
use services::{
    lot_ledger::LotLedger, portfolio_aggregator::PortfolioAggregator,
    portfolio_service::PortfolioService, time_series::TimeSeriesComposer,
    year_replay::YearReplay,
};
use std::collections::BTreeSet;
use uuid::Uuid;

use errors::CoreError;

/// Main entry point for the portfolio ledger core library.
///
/// Holds the portfolio in memory and recomputes every figure from scratch on
/// request; nothing is cached between calls.
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct PortfolioTracker {
    portfolio: Portfolio,
    portfolio_service: PortfolioService,
    aggregator: PortfolioAggregator,
}

impl PortfolioTracker {
    /// Create an empty portfolio with default settings.
    pub fn create_new() -> Self {
        Self::default()
    }

    /// Wrap an existing portfolio (e.g., one handed over by a data service).
    pub fn from_portfolio(mut portfolio: Portfolio) -> Self {
        portfolio.settings.normalize_ter_overrides();
        Self {
            portfolio,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    // ── Instruments ─────────────────────────────────────────────────

    pub fn add_instrument(&mut self, instrument: Instrument) -> Result<(), CoreError> {
        self.portfolio_service
            .add_instrument(&mut self.portfolio, instrument)
    }

    pub fn remove_instrument(&mut self, ticker: &str) -> Result<Instrument, CoreError> {
        self.portfolio_service
            .remove_instrument(&mut self.portfolio, ticker)
    }

    #[must_use]
    pub fn get_instrument(&self, ticker: &str) -> Option<&Instrument> {
        self.portfolio.instrument(ticker)
    }

    /// Store the latest externally fetched price for an instrument.
    pub fn set_current_price(&mut self, ticker: &str, price: Decimal) -> Result<(), CoreError> {
        if price < Decimal::ZERO {
            return Err(CoreError::ValidationError(format!(
                "Price {price} for {ticker} must not be negative"
            )));
        }
        self.instrument_mut(ticker)?.current_price = price;
        Ok(())
    }

    /// Reclassify an instrument (e.g., a stock-listed gold ETC as Commodity).
    pub fn set_category(&mut self, ticker: &str, category: Category) -> Result<(), CoreError> {
        self.instrument_mut(ticker)?.category = category;
        Ok(())
    }

    // ── Transactions ────────────────────────────────────────────────

    /// Add a transaction to an instrument. Sells beyond the held quantity
    /// are rejected here, even though the engine would tolerate them.
    pub fn add_transaction(
        &mut self,
        ticker: &str,
        transaction: Transaction,
    ) -> Result<Uuid, CoreError> {
        self.portfolio_service
            .add_transaction(&mut self.portfolio, ticker, transaction)
    }

    pub fn remove_transaction(
        &mut self,
        ticker: &str,
        transaction_id: Uuid,
    ) -> Result<Transaction, CoreError> {
        self.portfolio_service
            .remove_transaction(&mut self.portfolio, ticker, transaction_id)
    }

    pub fn update_transaction(
        &mut self,
        ticker: &str,
        transaction_id: Uuid,
        updated: Transaction,
    ) -> Result<(), CoreError> {
        self.portfolio_service
            .update_transaction(&mut self.portfolio, ticker, transaction_id, updated)
    }

    /// Units held at `at`, e.g. to check a sell before submitting it.
    pub fn available_quantity(&self, ticker: &str, at: DateTime<Utc>) -> Result<Decimal, CoreError> {
        self.portfolio_service
            .available_quantity(&self.portfolio, ticker, at)
    }

    // ── Loans ───────────────────────────────────────────────────────

    pub fn add_loan(&mut self, loan: Loan) -> Result<(), CoreError> {
        self.portfolio_service.add_loan(&mut self.portfolio, loan)
    }

    pub fn remove_loan(&mut self, loan_id: &str) -> Result<Loan, CoreError> {
        self.portfolio_service.remove_loan(&mut self.portfolio, loan_id)
    }

    pub fn add_loan_transaction(
        &mut self,
        loan_id: &str,
        transaction: LoanTransaction,
    ) -> Result<Uuid, CoreError> {
        self.portfolio_service
            .add_loan_transaction(&mut self.portfolio, loan_id, transaction)
    }

    pub fn set_loan_status(&mut self, loan_id: &str, status: LoanStatus) -> Result<(), CoreError> {
        let loan = self
            .portfolio
            .loan_mut(loan_id)
            .ok_or_else(|| CoreError::LoanNotFound(loan_id.to_string()))?;
        loan.status = status;
        Ok(())
    }

    #[must_use]
    pub fn get_loan(&self, loan_id: &str) -> Option<&Loan> {
        self.portfolio.loan(loan_id)
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.portfolio.settings
    }

    /// Replace the settings. TER override keys are stored uppercased.
    pub fn set_settings(&mut self, mut settings: Settings) {
        settings.normalize_ter_overrides();
        self.portfolio.settings = settings;
    }

    // ── Analytics ───────────────────────────────────────────────────

    /// Full FIFO replay of one instrument at its current price.
    pub fn instrument_ledger(&self, ticker: &str) -> Result<LedgerResult, CoreError> {
        let instrument = self.instrument(ticker)?;
        Ok(self
            .lot_ledger()
            .replay(&instrument.transactions, instrument.current_price))
    }

    /// Category totals, grand total and per-instrument / per-loan rows.
    pub fn portfolio_summary(&self) -> PortfolioSummary {
        self.aggregator.summarize_portfolio(&self.portfolio)
    }

    /// Realized profit of one instrument within `year`.
    pub fn realized_in_year(&self, ticker: &str, year: i32) -> Result<YearRealized, CoreError> {
        let instrument = self.instrument(ticker)?;
        Ok(self
            .year_replay()
            .realized_in_year(&instrument.transactions, year))
    }

    pub fn year_report(&self, year: i32) -> YearReport {
        self.year_replay().year_report(&self.portfolio, year)
    }

    /// Years with any instrument transaction, loan start or loan transaction.
    #[must_use]
    pub fn active_years(&self) -> Vec<i32> {
        let replay = self.year_replay();
        let mut years: BTreeSet<i32> = self
            .portfolio
            .instruments
            .iter()
            .flat_map(|i| replay.years(&i.transactions))
            .collect();
        for loan in &self.portfolio.loans {
            years.insert(loan.start_date.year());
            years.extend(loan.transactions.iter().map(LoanTransaction::year));
        }
        years.into_iter().collect()
    }

    /// Month-end chart points through the month containing `today`.
    pub fn monthly_series(&self, today: NaiveDate) -> Vec<MonthlySnapshot> {
        TimeSeriesComposer::with_fee_allocation(self.portfolio.settings.fee_allocation)
            .monthly_series(&self.portfolio.instruments, &self.portfolio.loans, today)
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Serialize the whole portfolio to pretty JSON.
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.portfolio)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize portfolio: {e}")))
    }

    /// Load a portfolio from JSON. Tickers and TER override keys are
    /// normalized to uppercase.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let mut portfolio: Portfolio = serde_json::from_str(json)?;
        for instrument in &mut portfolio.instruments {
            instrument.ticker = instrument.ticker.trim().to_uppercase();
        }
        Ok(Self::from_portfolio(portfolio))
    }

    // ── Internal ────────────────────────────────────────────────────

    fn instrument(&self, ticker: &str) -> Result<&Instrument, CoreError> {
        self.portfolio
            .instrument(ticker)
            .ok_or_else(|| CoreError::InstrumentNotFound(ticker.to_uppercase()))
    }

    fn instrument_mut(&mut self, ticker: &str) -> Result<&mut Instrument, CoreError> {
        self.portfolio
            .instrument_mut(ticker)
            .ok_or_else(|| CoreError::InstrumentNotFound(ticker.to_uppercase()))
    }

    fn lot_ledger(&self) -> LotLedger {
        LotLedger::with_fee_allocation(self.portfolio.settings.fee_allocation)
    }

    fn year_replay(&self) -> YearReplay {
        YearReplay::with_fee_allocation(self.portfolio.settings.fee_allocation)
    }
}
