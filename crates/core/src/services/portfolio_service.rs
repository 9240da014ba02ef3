use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::instrument::Instrument;
use crate::models::loan::{Loan, LoanTransaction};
use crate::models::portfolio::Portfolio;
use crate::models::transaction::{chronological, Transaction, TransactionKind};
use crate::services::lot_ledger::LotLedger;

/// Manages instruments, transactions and loans inside a [`Portfolio`].
///
/// This is the validation layer that sits in front of the engine: the engine
/// tolerates oversells and odd inputs, this service refuses them.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortfolioService {
    ledger: LotLedger,
}

impl PortfolioService {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Instruments ─────────────────────────────────────────────────

    pub fn add_instrument(
        &self,
        portfolio: &mut Portfolio,
        instrument: Instrument,
    ) -> Result<(), CoreError> {
        if instrument.ticker.is_empty() {
            return Err(CoreError::ValidationError("Ticker must not be empty".into()));
        }
        if instrument.current_price < Decimal::ZERO {
            return Err(CoreError::ValidationError(format!(
                "Current price of {} must not be negative",
                instrument.ticker
            )));
        }
        if portfolio.instrument(&instrument.ticker).is_some() {
            return Err(CoreError::DuplicateInstrument(instrument.ticker));
        }
        for tx in &instrument.transactions {
            Self::validate_fields(tx)?;
        }
        self.validate_consistency(&instrument.ticker, &instrument.transactions)?;
        portfolio.instruments.push(instrument);
        Ok(())
    }

    pub fn remove_instrument(
        &self,
        portfolio: &mut Portfolio,
        ticker: &str,
    ) -> Result<Instrument, CoreError> {
        let upper = ticker.trim().to_uppercase();
        let idx = portfolio
            .instruments
            .iter()
            .position(|i| i.ticker == upper)
            .ok_or_else(|| CoreError::InstrumentNotFound(upper.clone()))?;
        Ok(portfolio.instruments.remove(idx))
    }

    // ── Transactions ────────────────────────────────────────────────

    /// Add a transaction. Rejects sells that exceed the quantity held at
    /// the sell date.
    pub fn add_transaction(
        &self,
        portfolio: &mut Portfolio,
        ticker: &str,
        transaction: Transaction,
    ) -> Result<Uuid, CoreError> {
        Self::validate_fields(&transaction)?;
        let instrument = portfolio
            .instrument_mut(ticker)
            .ok_or_else(|| CoreError::InstrumentNotFound(ticker.to_uppercase()))?;

        let id = transaction.id;
        instrument.transactions.push(transaction);
        if let Err(e) = self.validate_consistency(&instrument.ticker, &instrument.transactions) {
            instrument.transactions.pop();
            return Err(e);
        }
        Ok(id)
    }

    /// Remove a transaction. Rolls back if a later sell would be left uncovered.
    pub fn remove_transaction(
        &self,
        portfolio: &mut Portfolio,
        ticker: &str,
        transaction_id: Uuid,
    ) -> Result<Transaction, CoreError> {
        let instrument = portfolio
            .instrument_mut(ticker)
            .ok_or_else(|| CoreError::InstrumentNotFound(ticker.to_uppercase()))?;
        let idx = instrument
            .transactions
            .iter()
            .position(|tx| tx.id == transaction_id)
            .ok_or_else(|| CoreError::TransactionNotFound(transaction_id.to_string()))?;

        let removed = instrument.transactions.remove(idx);
        if let Err(e) = self.validate_consistency(&instrument.ticker, &instrument.transactions) {
            instrument.transactions.insert(idx, removed);
            return Err(e);
        }
        Ok(removed)
    }

    /// Replace a transaction, keeping its id. Rolls back on any validation error.
    pub fn update_transaction(
        &self,
        portfolio: &mut Portfolio,
        ticker: &str,
        transaction_id: Uuid,
        mut updated: Transaction,
    ) -> Result<(), CoreError> {
        Self::validate_fields(&updated)?;
        let instrument = portfolio
            .instrument_mut(ticker)
            .ok_or_else(|| CoreError::InstrumentNotFound(ticker.to_uppercase()))?;
        let idx = instrument
            .transactions
            .iter()
            .position(|tx| tx.id == transaction_id)
            .ok_or_else(|| CoreError::TransactionNotFound(transaction_id.to_string()))?;

        updated.id = transaction_id;
        let old = std::mem::replace(&mut instrument.transactions[idx], updated);
        if let Err(e) = self.validate_consistency(&instrument.ticker, &instrument.transactions) {
            instrument.transactions[idx] = old;
            return Err(e);
        }
        Ok(())
    }

    /// Units of `ticker` held right after everything dated at or before `at`.
    pub fn available_quantity(
        &self,
        portfolio: &Portfolio,
        ticker: &str,
        at: DateTime<Utc>,
    ) -> Result<Decimal, CoreError> {
        let instrument = portfolio
            .instrument(ticker)
            .ok_or_else(|| CoreError::InstrumentNotFound(ticker.to_uppercase()))?;
        Ok(self.ledger.quantity_at(&instrument.transactions, at))
    }

    // ── Loans ───────────────────────────────────────────────────────

    pub fn add_loan(&self, portfolio: &mut Portfolio, loan: Loan) -> Result<(), CoreError> {
        if loan.id.trim().is_empty() {
            return Err(CoreError::ValidationError("Loan id must not be empty".into()));
        }
        if loan.loaned_amount < Decimal::ZERO {
            return Err(CoreError::ValidationError(format!(
                "Loaned amount of {} must not be negative",
                loan.id
            )));
        }
        if portfolio.loan(&loan.id).is_some() {
            return Err(CoreError::DuplicateLoan(loan.id));
        }
        for tx in &loan.transactions {
            Self::validate_loan_transaction(tx)?;
        }
        portfolio.loans.push(loan);
        Ok(())
    }

    pub fn add_loan_transaction(
        &self,
        portfolio: &mut Portfolio,
        loan_id: &str,
        transaction: LoanTransaction,
    ) -> Result<Uuid, CoreError> {
        Self::validate_loan_transaction(&transaction)?;
        let loan = portfolio
            .loan_mut(loan_id)
            .ok_or_else(|| CoreError::LoanNotFound(loan_id.to_string()))?;
        let id = transaction.id;
        loan.transactions.push(transaction);
        Ok(id)
    }

    pub fn remove_loan(&self, portfolio: &mut Portfolio, loan_id: &str) -> Result<Loan, CoreError> {
        let idx = portfolio
            .loans
            .iter()
            .position(|l| l.id == loan_id)
            .ok_or_else(|| CoreError::LoanNotFound(loan_id.to_string()))?;
        Ok(portfolio.loans.remove(idx))
    }

    // ── Validation ──────────────────────────────────────────────────

    /// Field-level rules:
    /// - Buy/Sell/StakingReward need a positive quantity
    /// - prices, fees and income values must not be negative
    fn validate_fields(tx: &Transaction) -> Result<(), CoreError> {
        let needs_quantity = matches!(
            tx.kind,
            TransactionKind::Buy | TransactionKind::Sell | TransactionKind::StakingReward
        );
        if needs_quantity && tx.quantity <= Decimal::ZERO {
            return Err(CoreError::ValidationError(format!(
                "{} quantity must be positive",
                tx.kind
            )));
        }
        if tx.quantity < Decimal::ZERO {
            return Err(CoreError::ValidationError("Quantity must not be negative".into()));
        }
        if tx.price_per_unit < Decimal::ZERO {
            return Err(CoreError::ValidationError("Price must not be negative".into()));
        }
        if tx.fee_amount() < Decimal::ZERO {
            return Err(CoreError::ValidationError("Fees must not be negative".into()));
        }
        if tx.income_value() < Decimal::ZERO {
            return Err(CoreError::ValidationError("Income value must not be negative".into()));
        }
        Ok(())
    }

    fn validate_loan_transaction(tx: &LoanTransaction) -> Result<(), CoreError> {
        if tx.amount < Decimal::ZERO {
            return Err(CoreError::ValidationError(format!(
                "{} amount must not be negative",
                tx.kind
            )));
        }
        Ok(())
    }

    /// Walk the history in date order and make sure no sell exceeds the
    /// quantity held at that moment.
    fn validate_consistency(
        &self,
        ticker: &str,
        transactions: &[Transaction],
    ) -> Result<(), CoreError> {
        let mut held = Decimal::ZERO;
        for (_, tx) in chronological(transactions) {
            match tx.kind {
                TransactionKind::Buy | TransactionKind::StakingReward => held += tx.quantity,
                TransactionKind::Sell => {
                    if tx.quantity > held {
                        return Err(CoreError::InsufficientQuantity {
                            ticker: ticker.to_string(),
                            requested: tx.quantity.to_string(),
                            available: held.to_string(),
                            date: tx.date.to_rfc3339(),
                        });
                    }
                    held -= tx.quantity;
                }
                TransactionKind::Dividend => {}
            }
        }
        Ok(())
    }
}
