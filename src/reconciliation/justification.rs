//! Justification balancing

use bigdecimal::BigDecimal;

use crate::types::JustificationEntry;

/// Sum every adjustment, normalizing amounts stored as text
pub fn sum_adjustments(justifications: &[JustificationEntry]) -> BigDecimal {
    justifications.iter().map(|j| j.adjustment()).sum()
}

/// Discrepancy left once the justifications are subtracted
pub fn balance_outstanding(
    grand_difference_total: &BigDecimal,
    justifications: &[JustificationEntry],
) -> BigDecimal {
    grand_difference_total - sum_adjustments(justifications)
}

/// Whether a balance is effectively zero (below one cent in absolute value)
pub fn is_squared(balance_outstanding: &BigDecimal) -> bool {
    balance_outstanding.abs() < squared_tolerance()
}

fn squared_tolerance() -> BigDecimal {
    BigDecimal::new(1.into(), 2)
}
