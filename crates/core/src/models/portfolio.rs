use serde::{Deserialize, Serialize};

use super::instrument::Instrument;
use super::loan::Loan;
use super::settings::Settings;

/// The main data container: every instrument with its transactions,
/// every loan, and the settings that shape the analytics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub instruments: Vec<Instrument>,

    #[serde(default)]
    pub loans: Vec<Loan>,

    #[serde(default)]
    pub settings: Settings,
}

impl Portfolio {
    pub fn instrument(&self, ticker: &str) -> Option<&Instrument> {
        let upper = ticker.trim().to_uppercase();
        self.instruments.iter().find(|i| i.ticker == upper)
    }

    pub fn instrument_mut(&mut self, ticker: &str) -> Option<&mut Instrument> {
        let upper = ticker.trim().to_uppercase();
        self.instruments.iter_mut().find(|i| i.ticker == upper)
    }

    pub fn loan(&self, id: &str) -> Option<&Loan> {
        self.loans.iter().find(|l| l.id == id)
    }

    pub fn loan_mut(&mut self, id: &str) -> Option<&mut Loan> {
        self.loans.iter_mut().find(|l| l.id == id)
    }
}
