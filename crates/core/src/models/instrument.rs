use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction::{Transaction, TransactionKind};

/// Reporting category of an instrument.
///
/// Commodity is a first-class case here, chosen once when the instrument is
/// added, even though the market-data side treats commodities as stocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Stock,
    Crypto,
    Commodity,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Stock => write!(f, "Stock"),
            Category::Crypto => write!(f, "Crypto"),
            Category::Commodity => write!(f, "Commodity"),
        }
    }
}

/// A tradable instrument with its transaction history.
///
/// `ticker` is the unique key. Transactions are kept in whatever order the
/// caller supplied; every computation re-sorts them by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Ticker symbol, uppercased (e.g., "AAPL", "BTC", "GLD")
    pub ticker: String,

    /// Human-readable name
    pub name: String,

    pub category: Category,

    /// Latest known market price in the reporting currency
    pub current_price: Decimal,

    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Instrument {
    pub fn new(
        ticker: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        current_price: Decimal,
    ) -> Self {
        Self {
            ticker: ticker.into().trim().to_uppercase(),
            name: name.into(),
            category,
            current_price,
            transactions: Vec::new(),
        }
    }

    pub fn stock(ticker: impl Into<String>, name: impl Into<String>, price: Decimal) -> Self {
        Self::new(ticker, name, Category::Stock, price)
    }

    pub fn crypto(ticker: impl Into<String>, name: impl Into<String>, price: Decimal) -> Self {
        Self::new(ticker, name, Category::Crypto, price)
    }

    pub fn commodity(ticker: impl Into<String>, name: impl Into<String>, price: Decimal) -> Self {
        Self::new(ticker, name, Category::Commodity, price)
    }

    #[must_use]
    pub fn with_transactions(mut self, transactions: Vec<Transaction>) -> Self {
        self.transactions = transactions;
        self
    }

    /// True when any buy or sell was flagged as a fund with ongoing costs.
    pub fn flagged_for_ongoing_costs(&self) -> bool {
        self.transactions.iter().any(|tx| {
            matches!(tx.kind, TransactionKind::Buy | TransactionKind::Sell)
                && tx.has_ongoing_costs == Some(true)
        })
    }
}
