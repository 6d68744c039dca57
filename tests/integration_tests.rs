//! Integration tests for cash-reconciliation

use bigdecimal::BigDecimal;
use cash_reconciliation::{
    format_currency, parse_locale_number, CashCount, CashSettings, ClosingBuilder, ClosingError,
    ClosingFilter, ClosingManager, ClosingRecord, ClosingStorage, EnhancedClosingValidator,
    FallbackStorage, FormatOptions, JustificationEntry, MemoryStorage, ReconConfig, Severity,
    ValidationStatus,
};
use chrono::NaiveDate;
use std::str::FromStr;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

fn justification(date: NaiveDate, reason: &str, amount: &str) -> JustificationEntry {
    JustificationEntry::new(date, "ana".to_string(), reason.to_string(), amount)
}

/// Bills worth 54.500, float 10.000 and a 5.000 deposit: 49.500 collected
fn register_count() -> CashCount {
    let mut count = CashCount::from_settings(&CashSettings::default());
    count.set_quantity(20000, 2).unwrap();
    count.set_quantity_input(10000, "1").unwrap();
    count.set_quantity_input(2000, "2").unwrap();
    count.set_quantity(500, 1).unwrap();
    count.add_deposit("BRK-0042".to_string(), "5.000,00");
    count
}

#[tokio::test]
async fn test_complete_closing_workflow() {
    let storage = MemoryStorage::new();
    let mut manager = ClosingManager::new(storage.clone());

    let closing = ClosingBuilder::new("Centro".to_string(), "ana".to_string(), day(6))
        .cash("50.000,00", register_count())
        .payment("Visa".to_string(), "12.345,67", "12.345,67")
        .responsible("Marta".to_string())
        .build()
        .unwrap();

    assert_eq!(closing.payment_methods[0].collected, BigDecimal::from(49500));
    assert_eq!(closing.grand_difference_total, BigDecimal::from(-500));
    assert_eq!(closing.severity(), Severity::MinorDifference);

    // Unexplained discrepancies block submission
    match manager.submit_closing(closing.clone()).await {
        Err(ClosingError::Unsquared { balance }) => assert_eq!(balance, BigDecimal::from(-500)),
        other => panic!("expected Unsquared, got {:?}", other),
    }
    assert!(storage.is_empty());

    let mut closing = closing;
    closing.add_justification(
        justification(day(6), "Missing voucher", "-500,00").with_payment_method("Cash".to_string()),
    );
    assert_eq!(closing.balance_outstanding(), BigDecimal::from(0));

    let submitted = manager.submit_closing(closing).await.unwrap();
    assert_eq!(submitted.validated, ValidationStatus::Unvalidated);
    assert_eq!(storage.len(), 1);

    let validated = manager.validate_closing(&submitted.id, "marta").await.unwrap();
    assert_eq!(validated.validated, ValidationStatus::Validated);

    // Validated closings stay squared and cannot be amended
    let justification_id = validated.justifications[0].id.clone();
    assert!(matches!(
        manager.remove_justification(&submitted.id, &justification_id).await,
        Err(ClosingError::Unsquared { .. })
    ));
    assert!(matches!(
        manager
            .amend_payment_methods(&submitted.id, Vec::new())
            .await,
        Err(ClosingError::Validation(_))
    ));

    let stored = manager.get_closing_required(&submitted.id).await.unwrap();
    assert_eq!(stored.validated, ValidationStatus::Validated);
    assert_eq!(stored.justifications.len(), 1);
}

#[tokio::test]
async fn test_duplicate_closing_rejected() {
    let mut manager = ClosingManager::new(MemoryStorage::new());

    let first = ClosingBuilder::new("Norte".to_string(), "luis".to_string(), day(7))
        .payment("Visa".to_string(), 1000, 1000)
        .build()
        .unwrap();
    manager.submit_closing(first).await.unwrap();

    let second = ClosingBuilder::new("Norte".to_string(), "luis".to_string(), day(7))
        .payment("Visa".to_string(), 2000, 2000)
        .build()
        .unwrap();
    assert!(matches!(
        manager.submit_closing(second).await,
        Err(ClosingError::DuplicateClosing { .. })
    ));

    // Another employee on the same day is a separate closing
    let other_user = ClosingBuilder::new("Norte".to_string(), "sofia".to_string(), day(7))
        .build()
        .unwrap();
    assert!(manager.submit_closing(other_user).await.is_ok());
}

#[tokio::test]
async fn test_flag_and_revalidate() {
    let mut manager = ClosingManager::new(MemoryStorage::new());
    let closing = ClosingBuilder::new("Sur".to_string(), "ana".to_string(), day(8))
        .payment("Transfer".to_string(), "3.000,00", "3.000,00")
        .build()
        .unwrap();
    let id = manager.submit_closing(closing).await.unwrap().id;

    let validated = manager.validate_closing(&id, "marta").await.unwrap();
    assert_eq!(validated.validated_by.as_deref(), Some("marta"));
    assert!(validated.validated_at.is_some());

    let flagged = manager.flag_for_review(&id, "marta").await.unwrap();
    assert_eq!(flagged.validated, ValidationStatus::FlaggedForReview);
    assert!(flagged.validated_by.is_none());
    assert!(flagged.validated_at.is_none());

    // Flagged closings can be corrected by the store
    let amended = manager
        .amend_payment_methods(
            &id,
            vec![cash_reconciliation::PaymentMethodEntry::from_input(
                "Transfer".to_string(),
                "3.000,00",
                "2.900,00",
            )],
        )
        .await
        .unwrap();
    assert_eq!(amended.grand_difference_total, BigDecimal::from(-100));

    assert!(matches!(
        manager.validate_closing(&id, "marta").await,
        Err(ClosingError::Unsquared { .. })
    ));
    manager
        .add_justification(&id, justification(day(8), "Card terminal error", "-100"))
        .await
        .unwrap();

    let revalidated = manager.validate_closing(&id, "jorge").await.unwrap();
    assert_eq!(revalidated.validated, ValidationStatus::Validated);
    assert_eq!(revalidated.validated_by.as_deref(), Some("jorge"));

    assert!(matches!(
        manager.validate_closing(&id, "marta").await,
        Err(ClosingError::InvalidTransition { .. })
    ));
    assert!(matches!(
        manager.flag_for_review("missing", "marta").await,
        Err(ClosingError::ClosingNotFound(_))
    ));
}

#[tokio::test]
async fn test_reason_list_enforced() {
    let config = ReconConfig::from_toml_str(
        r#"adjustment_reasons = ["Missing voucher", "Card terminal error"]"#,
    )
    .unwrap();
    let mut manager = ClosingManager::from_config(MemoryStorage::new(), &config);

    let closing = ClosingBuilder::new("Centro".to_string(), "ana".to_string(), day(9))
        .payment("Visa".to_string(), 1000, 900)
        .justification(justification(day(9), "Because", "-100"))
        .build()
        .unwrap();
    assert!(matches!(
        manager.submit_closing(closing).await,
        Err(ClosingError::Validation(_))
    ));

    let closing = ClosingBuilder::new("Centro".to_string(), "ana".to_string(), day(9))
        .payment("Visa".to_string(), 1000, 900)
        .justification(justification(day(9), "Card terminal error", "-100"))
        .build()
        .unwrap();
    let id = manager.submit_closing(closing).await.unwrap().id;

    assert!(matches!(
        manager
            .add_justification(&id, justification(day(9), "Other", "10"))
            .await,
        Err(ClosingError::Validation(_))
    ));
    assert!(matches!(
        manager.remove_justification(&id, "no-such-id").await,
        Err(ClosingError::JustificationNotFound(_))
    ));
}

#[tokio::test]
async fn test_statistics_and_monthly_summary() {
    let mut manager = ClosingManager::new(MemoryStorage::new());

    let rows = [
        ("Centro", "ana", 2, "1000", "1000"),
        ("Centro", "luis", 2, "1000", "500"),
        ("Norte", "ana", 3, "30.000,00", "10.000,00"),
        ("Norte", "ana", 4, "100", "100"),
    ];
    for (store, user, date, billed, collected) in rows {
        let mut closing = ClosingBuilder::new(store.to_string(), user.to_string(), day(date))
            .payment("Cash".to_string(), billed, collected)
            .build()
            .unwrap();
        let difference = closing.grand_difference_total.to_string();
        if closing.severity().has_difference() {
            closing.add_justification(justification(day(date), "Missing voucher", &difference));
        }
        manager.submit_closing(closing).await.unwrap();
    }

    let stats = manager.statistics(None, None).await.unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.correct, 2);
    assert_eq!(stats.minor_differences, 1);
    assert_eq!(stats.severe_differences, 1);
    assert_eq!(stats.absolute_difference_total, BigDecimal::from(20500));

    let early = manager.statistics(Some(day(1)), Some(day(2))).await.unwrap();
    assert_eq!(early.total, 2);

    let stores = vec!["Centro".to_string(), "Norte".to_string(), "Sur".to_string()];
    let summary = manager.monthly_summary(&stores, 2024, 5).await.unwrap();
    assert_eq!(summary.len(), 3);
    assert_eq!(summary[0].total_closings, 2);
    assert_eq!(summary[0].closings_with_differences, 1);
    assert_eq!(summary[1].difference_total, BigDecimal::from(-20000));
    assert_eq!(summary[2].total_closings, 0);

    let june = manager.monthly_summary(&stores, 2024, 6).await.unwrap();
    assert!(june.iter().all(|s| s.total_closings == 0));

    let closings = manager.list_closings(None, None).await.unwrap();
    let severe = ClosingFilter::new()
        .severities([Severity::SevereDifference])
        .apply(&closings);
    assert_eq!(severe.len(), 1);
    assert_eq!(severe[0].store, "Norte");
}

#[test]
fn test_backend_json_shape() {
    let json = r#"{
        "id": "c-1",
        "date": "2024-05-10",
        "store": "Centro",
        "user": "ana",
        "paymentMethods": [
            {"method": "Cash", "billed": "50.000,00", "collected": 49500, "differenceValue": "-500"}
        ],
        "justifications": [
            {
                "date": "2024-05-10",
                "user": "ana",
                "reason": "Missing voucher",
                "adjustmentAmount": "-500,00"
            }
        ],
        "grandDifferenceTotal": -500,
        "validated": 2
    }"#;

    let closing: ClosingRecord = serde_json::from_str(json).unwrap();
    assert_eq!(closing.validated, ValidationStatus::FlaggedForReview);
    assert_eq!(closing.payment_methods[0].billed, BigDecimal::from(50000));
    assert!(closing.check_invariants().is_ok());
    assert!(closing.is_squared());
    assert!(!closing.justifications[0].id.is_empty());

    let value = serde_json::to_value(&closing).unwrap();
    assert_eq!(value["validated"], 2);
    assert_eq!(value["grandDifferenceTotal"], "-500");
    assert_eq!(value["justifications"][0]["adjustmentAmount"], "-500,00");
    assert!(value.get("cashCount").is_none());
}

#[tokio::test]
async fn test_manager_over_fallback_storage() {
    let primary = MemoryStorage::new();
    let secondary = MemoryStorage::new();
    let storage = FallbackStorage::new()
        .with_backend("http://localhost:3001", primary.clone())
        .with_backend("http://192.168.1.10:3001", secondary.clone());
    let mut manager = ClosingManager::with_validator(storage, Box::new(EnhancedClosingValidator));

    let closing = ClosingBuilder::new("Centro".to_string(), "ana".to_string(), day(10))
        .payment("Visa".to_string(), 100, 100)
        .build()
        .unwrap();
    let id = manager.submit_closing(closing).await.unwrap().id;

    assert_eq!(primary.len(), 1);
    assert!(secondary.is_empty());
    assert!(manager.storage().get_closing(&id).await.unwrap().is_some());
}

#[test]
fn test_normalize_and_format_round_trip() {
    let options = FormatOptions::default();
    for text in ["$ 1.234,56", "-987,10", "0,05", "1.000.000,00"] {
        let value = parse_locale_number(text);
        let formatted = format_currency(&value, &options);
        assert_eq!(parse_locale_number(formatted.as_str()), value);
    }

    assert_eq!(
        parse_locale_number("$ 1.234,56"),
        BigDecimal::from_str("1234.56").unwrap()
    );
}

#[tokio::test]
async fn test_reused_closing_id_rejected() {
    let storage = MemoryStorage::new();
    let mut manager = ClosingManager::new(storage.clone());

    let original = ClosingBuilder::new("Centro".to_string(), "ana".to_string(), day(1))
        .id("c-1".to_string())
        .payment("Visa".to_string(), 1000, 1000)
        .build()
        .unwrap();
    manager.submit_closing(original).await.unwrap();
    manager.validate_closing("c-1", "marta").await.unwrap();

    let reused = ClosingBuilder::new("Norte".to_string(), "luis".to_string(), day(2))
        .id("c-1".to_string())
        .payment("Visa".to_string(), 500, 500)
        .build()
        .unwrap();
    assert!(matches!(
        manager.submit_closing(reused).await,
        Err(ClosingError::ClosingExists(id)) if id == "c-1"
    ));

    let stored = manager.get_closing_required("c-1").await.unwrap();
    assert_eq!(storage.len(), 1);
    assert_eq!(stored.store, "Centro");
    assert_eq!(stored.validated, ValidationStatus::Validated);
    assert_eq!(stored.validated_by.as_deref(), Some("marta"));
}

#[tokio::test]
async fn test_bulk_validation() {
    let mut manager = ClosingManager::new(MemoryStorage::new());

    let mut ids = Vec::new();
    for (store, collected) in [("Centro", "1000"), ("Norte", "1000"), ("Sur", "900")] {
        let mut closing = ClosingBuilder::new(store.to_string(), "ana".to_string(), day(11))
            .payment("Visa".to_string(), "1000", collected)
            .build()
            .unwrap();
        if closing.severity().has_difference() {
            closing.add_justification(justification(day(11), "Missing voucher", "-100"));
        }
        ids.push(manager.submit_closing(closing).await.unwrap().id);
    }

    // A missing closing aborts the whole batch
    let mut with_missing = ids.clone();
    with_missing.push("missing".to_string());
    assert!(matches!(
        manager.validate_closings(&with_missing, "marta").await,
        Err(ClosingError::ClosingNotFound(_))
    ));
    let untouched = manager.list_closings(None, None).await.unwrap();
    assert!(untouched
        .iter()
        .all(|c| c.validated == ValidationStatus::Unvalidated && c.validated_by.is_none()));

    assert!(matches!(
        manager.validate_closings(&ids, " ").await,
        Err(ClosingError::Validation(_))
    ));

    let validated = manager.validate_closings(&ids, "marta").await.unwrap();
    assert_eq!(validated.len(), 3);
    for closing in manager.list_closings(None, None).await.unwrap() {
        assert_eq!(closing.validated, ValidationStatus::Validated);
        assert_eq!(closing.validated_by.as_deref(), Some("marta"));
        assert!(closing.validated_at.is_some());
    }

    let value = serde_json::to_value(&validated[0]).unwrap();
    assert_eq!(value["validatedBy"], "marta");
    assert!(value["validatedAt"].is_string());
}
