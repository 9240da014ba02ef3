// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use portfolio_ledger_core::errors::CoreError;

mod display {
    use super::*;

    #[test]
    fn serialization() {
        let err = CoreError::Serialization("bad float".into());
        assert_eq!(err.to_string(), "Serialization error: bad float");
    }

    #[test]
    fn deserialization() {
        let err = CoreError::Deserialization("unexpected EOF".into());
        assert_eq!(err.to_string(), "Deserialization error: unexpected EOF");
    }

    #[test]
    fn instrument_not_found() {
        let err = CoreError::InstrumentNotFound("AAPL".into());
        assert_eq!(err.to_string(), "Instrument not found: AAPL");
    }

    #[test]
    fn duplicate_instrument() {
        let err = CoreError::DuplicateInstrument("BTC".into());
        assert_eq!(err.to_string(), "Instrument already exists: BTC");
    }

    #[test]
    fn transaction_not_found() {
        let err = CoreError::TransactionNotFound("abc".into());
        assert_eq!(err.to_string(), "Transaction not found: abc");
    }

    #[test]
    fn loan_errors() {
        assert_eq!(CoreError::LoanNotFound("L-1".into()).to_string(), "Loan not found: L-1");
        assert_eq!(CoreError::DuplicateLoan("L-1".into()).to_string(), "Loan already exists: L-1");
    }

    #[test]
    fn validation() {
        let err = CoreError::ValidationError("Fees must not be negative".into());
        assert_eq!(err.to_string(), "Validation failed: Fees must not be negative");
    }

    #[test]
    fn insufficient_quantity() {
        let err = CoreError::InsufficientQuantity {
            ticker: "ETH".into(),
            requested: "5".into(),
            available: "3".into(),
            date: "2023-02-01".into(),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient quantity of ETH: selling 5, holding 3 on 2023-02-01"
        );
    }
}

mod conversions {
    use super::*;

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn question_mark_propagates() {
        fn parse(input: &str) -> Result<serde_json::Value, CoreError> {
            Ok(serde_json::from_str(input)?)
        }
        assert!(parse("[1, 2]").is_ok());
        assert!(matches!(parse("]"), Err(CoreError::Deserialization(_))));
    }

    #[test]
    fn is_std_error() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<CoreError>();
    }
}
