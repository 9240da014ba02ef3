pub mod analytics;
pub mod chart;
pub mod instrument;
pub mod ledger;
pub mod loan;
pub mod portfolio;
pub mod settings;
pub mod transaction;
