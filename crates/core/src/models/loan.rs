use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a peer loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    Active,
    Repaid,
    Defaulted,
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoanStatus::Active => write!(f, "Active"),
            LoanStatus::Repaid => write!(f, "Repaid"),
            LoanStatus::Defaulted => write!(f, "Defaulted"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanTransactionKind {
    InterestReceived,
    RepaymentReceived,
}

impl std::fmt::Display for LoanTransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoanTransactionKind::InterestReceived => write!(f, "InterestReceived"),
            LoanTransactionKind::RepaymentReceived => write!(f, "RepaymentReceived"),
        }
    }
}

/// Cash received back from a borrower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTransaction {
    pub id: Uuid,
    pub kind: LoanTransactionKind,
    pub date: DateTime<Utc>,
    pub amount: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

impl LoanTransaction {
    pub fn new(kind: LoanTransactionKind, date: DateTime<Utc>, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            date,
            amount,
            notes: None,
        }
    }

    pub fn interest(date: DateTime<Utc>, amount: Decimal) -> Self {
        Self::new(LoanTransactionKind::InterestReceived, date, amount)
    }

    pub fn repayment(date: DateTime<Utc>, amount: Decimal) -> Self {
        Self::new(LoanTransactionKind::RepaymentReceived, date, amount)
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// A peer-to-peer loan. Tracked by principal and cash received, not by lots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub name: String,
    /// Principal lent out
    pub loaned_amount: Decimal,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_months: Option<u32>,
    #[serde(default)]
    pub interest_rate_percent: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: LoanStatus,
    #[serde(default)]
    pub transactions: Vec<LoanTransaction>,
}

impl Loan {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        loaned_amount: Decimal,
        start_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            loaned_amount,
            start_date,
            end_date: None,
            duration_months: None,
            interest_rate_percent: None,
            notes: None,
            status: LoanStatus::Active,
            transactions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_transactions(mut self, transactions: Vec<LoanTransaction>) -> Self {
        self.transactions = transactions;
        self
    }

    #[must_use]
    pub fn with_interest_rate(mut self, percent: Decimal) -> Self {
        self.interest_rate_percent = Some(percent);
        self
    }

    #[must_use]
    pub fn with_duration(mut self, months: u32) -> Self {
        self.duration_months = Some(months);
        self
    }
}
