//! Assembly of a closing from what the cashier entered

use chrono::NaiveDate;

use super::cash::CashCount;
use crate::normalize::parse_locale_number;
use crate::traits::*;
use crate::types::*;

/// Payment method name used for the cash row
pub const CASH_METHOD: &str = "Cash";

/// Builder for a closing record
#[derive(Debug)]
pub struct ClosingBuilder {
    closing: ClosingRecord,
}

impl ClosingBuilder {
    /// Start a closing for a store, employee and date
    pub fn new(store: String, user: String, date: NaiveDate) -> Self {
        Self {
            closing: ClosingRecord::new(store, user, date),
        }
    }

    /// Use a specific identifier instead of a generated one
    pub fn id(mut self, id: String) -> Self {
        self.closing.id = id;
        self
    }

    /// Add a payment row from amounts as typed
    pub fn payment(
        mut self,
        method: String,
        billed: impl Into<RawAmount>,
        collected: impl Into<RawAmount>,
    ) -> Self {
        self.closing
            .payment_methods
            .push(PaymentMethodEntry::from_input(method, billed, collected));
        self
    }

    /// Add the cash row; collected cash comes from the register count
    pub fn cash(mut self, billed: impl Into<RawAmount>, cash_count: CashCount) -> Self {
        let entry = PaymentMethodEntry::new(
            CASH_METHOD.to_string(),
            parse_locale_number(billed),
            cash_count.counted_cash(),
        );
        self.closing.payment_methods.push(entry);
        self.closing.cash_count = Some(cash_count);
        self
    }

    /// Add a justification
    pub fn justification(mut self, justification: JustificationEntry) -> Self {
        self.closing.justifications.push(justification);
        self
    }

    /// Set the person responsible for the register
    pub fn responsible(mut self, responsible: String) -> Self {
        self.closing.responsible = Some(responsible);
        self
    }

    /// Attach comments
    pub fn comments(mut self, comments: String) -> Self {
        self.closing.comments = Some(comments);
        self
    }

    /// Compute totals and check the closing with the default rules
    pub fn build(self) -> ClosingResult<ClosingRecord> {
        self.build_with(&DefaultClosingValidator)
    }

    /// Compute totals and check the closing with custom rules
    pub fn build_with(mut self, validator: &dyn ClosingValidator) -> ClosingResult<ClosingRecord> {
        self.closing.recompute_totals();
        validator.validate_closing(&self.closing)?;
        self.closing.check_invariants()?;
        Ok(self.closing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciliation::Severity;
    use crate::settings::CashSettings;
    use bigdecimal::BigDecimal;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
    }

    #[test]
    fn test_build_computes_differences() {
        let closing = ClosingBuilder::new("Centro".to_string(), "ana".to_string(), date())
            .payment("Visa".to_string(), "12.500,00", "12.500,00")
            .payment("Mastercard".to_string(), "8.000", "7.900")
            .payment("Transfer".to_string(), 3000, "3.100,50")
            .build()
            .unwrap();

        assert_eq!(closing.payment_methods.len(), 3);
        // "8.000" has only a dot, so it is read as a decimal: 8.000 - 7.900
        assert_eq!(
            closing.payment_methods[1].difference_value,
            "-0.1".parse::<BigDecimal>().unwrap()
        );
        assert_eq!(
            closing.payment_methods[2].difference_value,
            "100.50".parse::<BigDecimal>().unwrap()
        );
        assert_eq!(
            closing.grand_difference_total,
            "100.40".parse::<BigDecimal>().unwrap()
        );
        assert_eq!(closing.validated, ValidationStatus::Unvalidated);
    }

    #[test]
    fn test_cash_row_uses_counted_cash() {
        let mut count = CashCount::from_settings(&CashSettings::default());
        count.set_quantity(20000, 3).unwrap();
        count.add_deposit("BR-7".to_string(), 9500);

        let closing = ClosingBuilder::new("Norte".to_string(), "luis".to_string(), date())
            .cash("60.000,00", count)
            .build()
            .unwrap();

        let cash = &closing.payment_methods[0];
        assert_eq!(cash.method, CASH_METHOD);
        assert_eq!(cash.collected, BigDecimal::from(59500));
        assert_eq!(closing.grand_difference_total, BigDecimal::from(-500));
        assert_eq!(closing.severity(), Severity::MinorDifference);
        assert!(closing.cash_count.is_some());
    }

    #[test]
    fn test_build_rejects_missing_store() {
        let result = ClosingBuilder::new(" ".to_string(), "ana".to_string(), date()).build();
        assert!(matches!(result, Err(ClosingError::Validation(_))));
    }
}
