// ═══════════════════════════════════════════════════════════════════
// Integration Tests — PortfolioTracker facade end to end
// ═══════════════════════════════════════════════════════════════════

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use portfolio_ledger_core::errors::CoreError;
use portfolio_ledger_core::models::instrument::{Category, Instrument};
use portfolio_ledger_core::models::loan::{Loan, LoanStatus, LoanTransaction};
use portfolio_ledger_core::models::settings::{FeeAllocation, Settings};
use portfolio_ledger_core::models::transaction::Transaction;
use portfolio_ledger_core::PortfolioTracker;

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 15, 30, 0).unwrap()
}

/// Stock bought in 2021 and partly sold in 2022 and 2023, a staked coin,
/// a gold ETC and one loan.
fn tracker() -> PortfolioTracker {
    let mut t = PortfolioTracker::create_new();

    t.add_instrument(Instrument::stock("ASML", "ASML Holding", dec!(700))).unwrap();
    t.add_transaction("ASML", Transaction::buy(at(2021, 3, 1), dec!(10), dec!(400)).with_fees(dec!(10)))
        .unwrap();
    t.add_transaction("ASML", Transaction::sell(at(2022, 5, 1), dec!(4), dec!(600)).with_fees(dec!(4)))
        .unwrap();
    t.add_transaction("ASML", Transaction::dividend(at(2023, 4, 20), dec!(15)))
        .unwrap();
    t.add_transaction("ASML", Transaction::sell(at(2023, 9, 1), dec!(2), dec!(650)))
        .unwrap();

    t.add_instrument(Instrument::crypto("DOT", "Polkadot", dec!(6))).unwrap();
    t.add_transaction("DOT", Transaction::buy(at(2022, 1, 10), dec!(100), dec!(20)))
        .unwrap();
    t.add_transaction("DOT", Transaction::staking_reward(at(2023, 1, 10), dec!(10), Some(dec!(50))))
        .unwrap();

    t.add_instrument(Instrument::stock("SGLD", "Gold ETC", dec!(180))).unwrap();
    t.set_category("SGLD", Category::Commodity).unwrap();
    t.add_transaction("SGLD", Transaction::buy(at(2023, 2, 1), dec!(2), dec!(160)))
        .unwrap();

    t.add_loan(Loan::new("P2P-1", "Peer loan", dec!(1000), at(2022, 6, 1))).unwrap();
    t.add_loan_transaction("P2P-1", LoanTransaction::interest(at(2022, 12, 1), dec!(30)))
        .unwrap();
    t.add_loan_transaction("P2P-1", LoanTransaction::repayment(at(2023, 6, 1), dec!(400)))
        .unwrap();
    t.add_loan_transaction("P2P-1", LoanTransaction::interest(at(2023, 6, 1), dec!(20)))
        .unwrap();
    t
}

mod ledger {
    use super::*;

    #[test]
    fn instrument_ledger_all_time() {
        let r = tracker().instrument_ledger("asml").unwrap();
        // unit cost 401; 2022: 4 × 600 - 4 - 1604 = 792; 2023: 15 + 1300 - 802 = 513
        assert_eq!(r.realized, dec!(1305));
        assert_eq!(r.current_quantity, dec!(4));
        assert_eq!(r.cost_basis, dec!(1604));
        assert_eq!(r.unrealized, dec!(1196));
        assert_eq!(r.invested, dec!(4010));
    }

    #[test]
    fn realized_by_year_matches_all_time() {
        let t = tracker();
        let y2022 = t.realized_in_year("ASML", 2022).unwrap();
        let y2023 = t.realized_in_year("ASML", 2023).unwrap();
        assert_eq!(y2022.total_realized, dec!(792));
        assert_eq!(y2023.total_realized, dec!(513));
        assert_eq!(
            y2022.total_realized + y2023.total_realized,
            t.instrument_ledger("ASML").unwrap().realized
        );
    }

    #[test]
    fn unknown_ticker() {
        assert!(matches!(
            tracker().instrument_ledger("NOPE"),
            Err(CoreError::InstrumentNotFound(_))
        ));
    }

    #[test]
    fn price_update_changes_only_unrealized() {
        let mut t = tracker();
        let before = t.instrument_ledger("DOT").unwrap();
        t.set_current_price("DOT", dec!(10)).unwrap();
        let after = t.instrument_ledger("DOT").unwrap();
        assert_eq!(before.realized, after.realized);
        assert_eq!(after.unrealized, dec!(110) * dec!(10) - dec!(2000));
        assert!(t.set_current_price("DOT", dec!(-1)).is_err());
    }

    #[test]
    fn fee_allocation_setting_is_honoured() {
        let mut t = PortfolioTracker::create_new();
        t.add_instrument(Instrument::stock("X", "x", dec!(10))).unwrap();
        t.add_transaction("X", Transaction::buy(at(2023, 1, 1), dec!(4), dec!(10)).with_fees(dec!(2)))
            .unwrap();
        t.add_transaction("X", Transaction::sell(at(2023, 2, 1), dec!(1), dec!(20)))
            .unwrap();
        assert_eq!(t.instrument_ledger("X").unwrap().realized, dec!(9.5));

        t.set_settings(Settings {
            fee_allocation: FeeAllocation::FrontLoaded,
            ..Settings::default()
        });
        assert_eq!(t.instrument_ledger("X").unwrap().realized, dec!(8));
    }
}

mod summary {
    use super::*;

    #[test]
    fn categories_and_total() {
        let s = tracker().portfolio_summary();

        assert_eq!(s.stocks.invested, dec!(4010));
        assert_eq!(s.stocks.realized, dec!(1305));
        assert_eq!(s.crypto.invested, dec!(2000));
        assert_eq!(s.crypto.realized, dec!(50));
        // 110 × 6 - 2000
        assert_eq!(s.crypto.unrealized, dec!(-1340));
        assert_eq!(s.commodities.current_value, dec!(360));
        assert_eq!(s.loans.current_value, dec!(600));
        assert_eq!(s.loans.realized, dec!(50));

        assert_eq!(s.total.invested, dec!(4010) + dec!(2000) + dec!(320) + dec!(1000));
        assert_eq!(
            s.total.total_return,
            s.stocks.total_return + s.crypto.total_return + s.commodities.total_return + s.loans.total_return
        );
        assert_eq!(s.loan_details.len(), 1);
        assert_eq!(s.instruments.len(), 3);
    }

    #[test]
    fn reclassification_moves_instrument_between_buckets() {
        let mut t = tracker();
        t.set_category("SGLD", Category::Stock).unwrap();
        let s = t.portfolio_summary();
        assert_eq!(s.commodities.invested, Decimal::ZERO);
        assert_eq!(s.stocks.invested, dec!(4330));
    }
}

mod validation {
    use super::*;

    #[test]
    fn oversell_rejected_at_facade() {
        let mut t = tracker();
        let err = t
            .add_transaction("DOT", Transaction::sell(at(2023, 2, 1), dec!(200), dec!(6)))
            .unwrap_err();
        assert!(matches!(err, CoreError::InsufficientQuantity { .. }));
    }

    #[test]
    fn available_quantity_helps_callers() {
        let t = tracker();
        assert_eq!(t.available_quantity("DOT", at(2022, 12, 31)).unwrap(), dec!(100));
        assert_eq!(t.available_quantity("DOT", at(2023, 12, 31)).unwrap(), dec!(110));
    }

    #[test]
    fn remove_and_update_transactions() {
        let mut t = tracker();
        let div_id = t.get_instrument("ASML").unwrap().transactions[2].id;
        let removed = t.remove_transaction("ASML", div_id).unwrap();
        assert_eq!(removed.id, div_id);
        assert_eq!(t.instrument_ledger("ASML").unwrap().realized, dec!(1290));

        let buy_id = t.get_instrument("ASML").unwrap().transactions[0].id;
        assert!(t
            .update_transaction("ASML", buy_id, Transaction::buy(at(2021, 3, 1), dec!(5), dec!(400)))
            .is_err());
    }

    #[test]
    fn remove_instrument_and_loan() {
        let mut t = tracker();
        assert_eq!(t.remove_instrument("dot").unwrap().ticker, "DOT");
        assert!(t.get_instrument("DOT").is_none());
        assert!(t.remove_loan("P2P-1").is_ok());
        assert!(matches!(t.remove_loan("P2P-1"), Err(CoreError::LoanNotFound(_))));
    }

    #[test]
    fn loan_status() {
        let mut t = tracker();
        t.set_loan_status("P2P-1", LoanStatus::Defaulted).unwrap();
        assert_eq!(t.get_loan("P2P-1").unwrap().status, LoanStatus::Defaulted);
        assert!(t.set_loan_status("nope", LoanStatus::Repaid).is_err());
    }
}

mod reports {
    use super::*;

    #[test]
    fn active_years() {
        assert_eq!(tracker().active_years(), vec![2021, 2022, 2023]);
    }

    #[test]
    fn year_report_2023() {
        let r = tracker().year_report(2023);
        assert_eq!(r.year, 2023);
        assert_eq!(r.instruments.len(), 3);

        let asml = r.instruments.iter().find(|row| row.ticker == "ASML").unwrap();
        assert_eq!(asml.realized_in_year, dec!(513));
        assert_eq!(asml.income_in_year, dec!(15));
        assert_eq!(asml.sold_in_year, dec!(1300));
        assert_eq!(asml.unrealized_now, dec!(1196));

        let dot = r.instruments.iter().find(|row| row.ticker == "DOT").unwrap();
        assert_eq!(dot.realized_in_year, dec!(50));

        assert_eq!(r.stocks.realized_in_year, dec!(513));
        assert_eq!(r.crypto.realized_in_year, dec!(50));
        assert_eq!(r.loan_interest, dec!(20));
        assert_eq!(r.loans[0].outstanding_at_year_end, dec!(600));
        assert_eq!(r.total.realized_in_year, dec!(583));
    }

    #[test]
    fn ongoing_cost_now_is_the_same_in_every_year() {
        let mut t = tracker();
        let mut settings = Settings {
            ongoing_costs_enabled: true,
            ..Settings::default()
        };
        settings.set_ter("ASML", dec!(0.5));
        t.set_settings(settings);

        // 4 units × 700 × 0.5%
        for year in [2021, 2023] {
            let r = t.year_report(year);
            let asml = r.instruments.iter().find(|row| row.ticker == "ASML").unwrap();
            assert_eq!(asml.ongoing_cost_now, dec!(14));
            assert_eq!(r.stocks.ongoing_costs_now, dec!(14));
        }
    }

    #[test]
    fn year_report_skips_instruments_not_yet_bought() {
        let r = tracker().year_report(2021);
        assert_eq!(r.instruments.len(), 1);
        assert_eq!(r.instruments[0].ticker, "ASML");
        assert_eq!(r.instruments[0].bought_in_year, dec!(4010));
        assert_eq!(r.instruments[0].fees_in_year, dec!(10));
        assert!(r.loans.is_empty());
    }

    #[test]
    fn monthly_series_covers_history() {
        let series = tracker().monthly_series(NaiveDate::from_ymd_opt(2023, 12, 5).unwrap());
        // March 2021 through December 2023
        assert_eq!(series.len(), 34);
        assert_eq!(series[0].month_end, NaiveDate::from_ymd_opt(2021, 3, 31).unwrap());
        assert_eq!(series[0].approximate_historical_value, dec!(7000));
        assert_eq!(series[0].net_contribution, dec!(4010));
        let last = series.last().unwrap();
        // ASML 4 × 700, DOT 110 × 6, SGLD 2 × 180, loan 600
        assert_eq!(last.approximate_historical_value, dec!(4420));
    }
}

mod json {
    use super::*;

    #[test]
    fn round_trip() {
        let t = tracker();
        let json = t.to_json().unwrap();
        let back = PortfolioTracker::from_json(&json).unwrap();
        assert_eq!(back.portfolio(), t.portfolio());
        assert_eq!(back.portfolio_summary(), t.portfolio_summary());
    }

    #[test]
    fn lowercase_ter_override_survives_import() {
        let mut t = PortfolioTracker::create_new();
        t.add_instrument(Instrument::stock("VWRL", "All-World", dec!(100))).unwrap();
        t.add_transaction("VWRL", Transaction::buy(at(2023, 1, 1), dec!(10), dec!(100)))
            .unwrap();
        t.set_settings(Settings {
            ongoing_costs_enabled: true,
            ..Settings::default()
        });

        let mut value: serde_json::Value = serde_json::from_str(&t.to_json().unwrap()).unwrap();
        value["instruments"][0]["ticker"] = serde_json::json!("vwrl");
        value["settings"]["ter_overrides"] = serde_json::json!({ "vwrl": "0.22" });

        let back = PortfolioTracker::from_json(&value.to_string()).unwrap();
        assert_eq!(back.settings().ter_overrides.get("VWRL"), Some(&dec!(0.22)));
        let summary = back.portfolio_summary();
        assert_eq!(summary.instruments[0].ticker, "VWRL");
        assert_eq!(summary.instruments[0].ongoing_cost, dec!(2.2));
    }

    #[test]
    fn set_settings_uppercases_ter_keys() {
        let mut t = PortfolioTracker::create_new();
        let mut settings = Settings::default();
        settings.ter_overrides.insert("vwrl".to_string(), dec!(0.22));
        t.set_settings(settings);
        assert_eq!(t.settings().ter_overrides.get("VWRL"), Some(&dec!(0.22)));
        assert!(!t.settings().ter_overrides.contains_key("vwrl"));
    }

    #[test]
    fn invalid_json() {
        assert!(matches!(
            PortfolioTracker::from_json("{"),
            Err(CoreError::Deserialization(_))
        ));
    }
}
