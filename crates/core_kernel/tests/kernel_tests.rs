//! Tests for core_kernel public surface

use core_kernel::{ClaimId, CoreError, Money, MoneyError, TaskId, TemporalError};
use rust_decimal_macros::dec;

mod error_tests {
    use super::*;

    #[test]
    fn test_core_error_validation() {
        let error = CoreError::validation("Invalid input");

        match error {
            CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn test_core_error_from_money_error() {
        let money_error = MoneyError::CurrencyMismatch("USD".to_string(), "EUR".to_string());
        let core_error: CoreError = money_error.into();

        assert!(matches!(core_error, CoreError::Money(_)));
    }

    #[test]
    fn test_core_error_from_temporal_error() {
        let core_error: CoreError = TemporalError::UnknownTimezone("Nowhere".into()).into();
        assert!(core_error.to_string().contains("Nowhere"));
    }

    #[test]
    fn test_id_parse_error_is_validation() {
        let err = "TSK-x".parse::<TaskId>().unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}

mod serde_tests {
    use super::*;

    #[test]
    fn test_claim_id_is_transparent_integer() {
        let json = serde_json::to_string(&ClaimId::new(1042)).unwrap();
        assert_eq!(json, "1042");

        let back: ClaimId = serde_json::from_str("1042").unwrap();
        assert_eq!(back, ClaimId::new(1042));
    }

    #[test]
    fn test_money_round_trips_through_json() {
        let money = Money::usd(dec!(185.00));
        let json = serde_json::to_string(&money).unwrap();
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, money);
    }

    #[test]
    fn test_money_parses_string_amount() {
        let money: Money = serde_json::from_str(r#"{"amount":"420.50","currency":"USD"}"#).unwrap();
        assert_eq!(money.amount(), dec!(420.50));
    }
}
