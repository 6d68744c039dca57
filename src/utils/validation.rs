//! Validation utilities

use bigdecimal::BigDecimal;
use std::collections::HashSet;

use crate::traits::*;
use crate::types::*;

/// Validate a store or user identifier
pub fn validate_identifier(kind: &str, value: &str) -> ClosingResult<()> {
    if value.trim().is_empty() {
        return Err(ClosingError::Validation(format!("{} cannot be empty", kind)));
    }

    if value.len() > 50 {
        return Err(ClosingError::Validation(format!(
            "{} cannot exceed 50 characters",
            kind
        )));
    }

    Ok(())
}

/// Validate that a payment amount is not negative
pub fn validate_non_negative_amount(
    method: &str,
    label: &str,
    amount: &BigDecimal,
) -> ClosingResult<()> {
    if *amount < BigDecimal::from(0) {
        Err(ClosingError::Validation(format!(
            "{} amount for '{}' cannot be negative",
            label, method
        )))
    } else {
        Ok(())
    }
}

/// Validate free-text comments
pub fn validate_comments(comments: &str) -> ClosingResult<()> {
    if comments.len() > 500 {
        return Err(ClosingError::Validation(
            "Comments cannot exceed 500 characters".to_string(),
        ));
    }

    Ok(())
}

/// Stricter closing validator with per-row checks
pub struct EnhancedClosingValidator;

impl ClosingValidator for EnhancedClosingValidator {
    fn validate_closing(&self, closing: &ClosingRecord) -> ClosingResult<()> {
        // Basic validation
        DefaultClosingValidator.validate_closing(closing)?;

        validate_identifier("Store", &closing.store)?;
        validate_identifier("User", &closing.user)?;
        if let Some(comments) = &closing.comments {
            validate_comments(comments)?;
        }

        let mut methods = HashSet::new();
        for entry in &closing.payment_methods {
            if entry.method.trim().is_empty() {
                return Err(ClosingError::Validation(
                    "Payment method name cannot be empty".to_string(),
                ));
            }
            if !methods.insert(entry.method.trim().to_lowercase()) {
                return Err(ClosingError::Validation(format!(
                    "Payment method '{}' appears more than once",
                    entry.method
                )));
            }
            validate_non_negative_amount(&entry.method, "Billed", &entry.billed)?;
            validate_non_negative_amount(&entry.method, "Collected", &entry.collected)?;
        }

        for justification in &closing.justifications {
            self.validate_justification(justification)?;
        }

        Ok(())
    }

    fn validate_justification(&self, justification: &JustificationEntry) -> ClosingResult<()> {
        DefaultClosingValidator.validate_justification(justification)?;
        validate_identifier("Justification user", &justification.user)?;

        if justification.adjustment() == BigDecimal::from(0) {
            return Err(ClosingError::Validation(
                "Justification adjustment cannot be zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::closing::ClosingBuilder;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
    }

    #[test]
    fn test_enhanced_validator_accepts_regular_closing() {
        let closing = ClosingBuilder::new("Centro".to_string(), "ana".to_string(), date())
            .payment("Visa".to_string(), 1000, 1000)
            .payment("Debit".to_string(), 500, 450)
            .build_with(&EnhancedClosingValidator);
        assert!(closing.is_ok());
    }

    #[test]
    fn test_enhanced_validator_rejects_duplicate_methods() {
        let closing = ClosingBuilder::new("Centro".to_string(), "ana".to_string(), date())
            .payment("Visa".to_string(), 1000, 1000)
            .payment("visa ".to_string(), 10, 10)
            .build_with(&EnhancedClosingValidator);
        assert!(matches!(closing, Err(ClosingError::Validation(_))));
    }

    #[test]
    fn test_enhanced_validator_rejects_negative_amounts() {
        let closing = ClosingBuilder::new("Centro".to_string(), "ana".to_string(), date())
            .payment("Visa".to_string(), "-1.000,00", 0)
            .build_with(&EnhancedClosingValidator);
        assert!(matches!(closing, Err(ClosingError::Validation(_))));
    }

    #[test]
    fn test_enhanced_validator_rejects_zero_adjustment() {
        let justification = JustificationEntry::new(
            date(),
            "ana".to_string(),
            "Missing voucher".to_string(),
            "abc",
        );
        assert!(EnhancedClosingValidator
            .validate_justification(&justification)
            .is_err());
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("Store", "Centro").is_ok());
        assert!(validate_identifier("Store", "  ").is_err());
        assert!(validate_identifier("Store", &"x".repeat(51)).is_err());
    }
}
