//! Core types and data structures for cash-closing reconciliation

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::closing::CashCount;
use crate::normalize::{self, amount};

/// A monetary value as it arrives from a form field or from the backend.
///
/// Amounts are entered by cashiers as free text (`"$ 1.234,56"`) and stored by
/// the backend either as JSON numbers or as those same strings. `RawAmount`
/// keeps the value as received; [`RawAmount::to_decimal`] normalizes it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawAmount {
    /// No value at all (null, absent field)
    #[default]
    Missing,
    /// Text as typed or as stored by the backend
    Text(String),
    /// A value that is already numeric
    Number(BigDecimal),
    /// Anything that is neither text nor a number (booleans, objects, NaN)
    Unsupported,
}

impl RawAmount {
    /// Normalize to an exact decimal. Never fails; unreadable input is zero.
    pub fn to_decimal(&self) -> BigDecimal {
        match self {
            RawAmount::Missing | RawAmount::Unsupported => BigDecimal::from(0),
            RawAmount::Number(value) => value.clone(),
            RawAmount::Text(text) => normalize::parse_locale_str(text),
        }
    }

    /// Whether the value was given as text
    pub fn is_text(&self) -> bool {
        matches!(self, RawAmount::Text(_))
    }
}

impl From<&str> for RawAmount {
    fn from(value: &str) -> Self {
        RawAmount::Text(value.to_string())
    }
}

impl From<String> for RawAmount {
    fn from(value: String) -> Self {
        RawAmount::Text(value)
    }
}

impl From<&String> for RawAmount {
    fn from(value: &String) -> Self {
        RawAmount::Text(value.clone())
    }
}

impl From<BigDecimal> for RawAmount {
    fn from(value: BigDecimal) -> Self {
        RawAmount::Number(value)
    }
}

impl From<&BigDecimal> for RawAmount {
    fn from(value: &BigDecimal) -> Self {
        RawAmount::Number(value.clone())
    }
}

impl From<f64> for RawAmount {
    fn from(value: f64) -> Self {
        if !value.is_finite() {
            return RawAmount::Unsupported;
        }
        // Display on f64 yields the shortest representation that round-trips,
        // so 250.5 becomes exactly 250.5 rather than its binary expansion.
        BigDecimal::from_str(&value.to_string())
            .map(RawAmount::Number)
            .unwrap_or(RawAmount::Unsupported)
    }
}

impl From<i32> for RawAmount {
    fn from(value: i32) -> Self {
        RawAmount::Number(BigDecimal::from(value))
    }
}

impl From<i64> for RawAmount {
    fn from(value: i64) -> Self {
        RawAmount::Number(BigDecimal::from(value))
    }
}

impl From<u32> for RawAmount {
    fn from(value: u32) -> Self {
        RawAmount::Number(BigDecimal::from(value))
    }
}

impl From<u64> for RawAmount {
    fn from(value: u64) -> Self {
        RawAmount::Number(BigDecimal::from(value))
    }
}

impl<T: Into<RawAmount>> From<Option<T>> for RawAmount {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(RawAmount::Missing)
    }
}

impl Serialize for RawAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RawAmount::Text(text) => serializer.serialize_str(text),
            RawAmount::Number(value) => amount::serialize(value, serializer),
            RawAmount::Missing | RawAmount::Unsupported => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for RawAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawAmountVisitor)
    }
}

struct RawAmountVisitor;

impl<'de> Visitor<'de> for RawAmountVisitor {
    type Value = RawAmount;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number, a locale formatted amount or null")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(RawAmount::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(RawAmount::Text(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(RawAmount::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(RawAmount::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(RawAmount::from(v))
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Self::Value, E> {
        Ok(RawAmount::Unsupported)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(RawAmount::Missing)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(RawAmount::Missing)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        RawAmount::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(RawAmount::Unsupported)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(RawAmount::Unsupported)
    }
}

/// Review state of a closing.
///
/// The backend stores this as an integer column: 0 unvalidated, 1 validated,
/// 2 flagged for review by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ValidationStatus {
    /// Submitted, not yet reviewed by a manager
    #[default]
    Unvalidated,
    /// Reviewed and accepted
    Validated,
    /// Sent back to the store for review
    FlaggedForReview,
}

impl ValidationStatus {
    /// Move to `next`, rejecting transitions the review workflow does not allow.
    ///
    /// Allowed: unvalidated to validated or flagged, validated to flagged, and
    /// flagged back to validated once the store has revisited it. The squared
    /// precondition for validating is checked by the caller.
    pub fn transition_to(self, next: ValidationStatus) -> ClosingResult<ValidationStatus> {
        use ValidationStatus::*;

        match (self, next) {
            (Unvalidated, Validated)
            | (Unvalidated, FlaggedForReview)
            | (Validated, FlaggedForReview)
            | (FlaggedForReview, Validated) => Ok(next),
            (from, to) => Err(ClosingError::InvalidTransition { from, to }),
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            ValidationStatus::Unvalidated => "Unvalidated",
            ValidationStatus::Validated => "Validated",
            ValidationStatus::FlaggedForReview => "Flagged for review",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<ValidationStatus> for u8 {
    fn from(status: ValidationStatus) -> Self {
        match status {
            ValidationStatus::Unvalidated => 0,
            ValidationStatus::Validated => 1,
            ValidationStatus::FlaggedForReview => 2,
        }
    }
}

impl TryFrom<u8> for ValidationStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ValidationStatus::Unvalidated),
            1 => Ok(ValidationStatus::Validated),
            2 => Ok(ValidationStatus::FlaggedForReview),
            other => Err(format!("unknown validation status code {}", other)),
        }
    }
}

/// One payment channel row of a closing (cash, a card brand, transfers...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodEntry {
    /// Name of the payment channel
    pub method: String,
    /// Amount the system of record expected
    #[serde(with = "amount")]
    pub billed: BigDecimal,
    /// Amount actually counted or received
    #[serde(with = "amount")]
    pub collected: BigDecimal,
    /// `collected - billed`
    #[serde(with = "amount")]
    pub difference_value: BigDecimal,
}

impl PaymentMethodEntry {
    /// Create a payment row, deriving its difference
    pub fn new(method: String, billed: BigDecimal, collected: BigDecimal) -> Self {
        let difference_value = &collected - &billed;
        Self {
            method,
            billed,
            collected,
            difference_value,
        }
    }

    /// Create a payment row from amounts as typed by the cashier
    pub fn from_input(
        method: String,
        billed: impl Into<RawAmount>,
        collected: impl Into<RawAmount>,
    ) -> Self {
        Self::new(
            method,
            normalize::parse_locale_number(billed),
            normalize::parse_locale_number(collected),
        )
    }

    /// Recompute the difference after `billed` or `collected` changed
    pub fn refresh_difference(&mut self) {
        self.difference_value = &self.collected - &self.billed;
    }

    /// Whether the stored difference agrees with the amounts
    pub fn is_consistent(&self) -> bool {
        self.difference_value == &self.collected - &self.billed
    }
}

/// A manually entered adjustment explaining part of a discrepancy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JustificationEntry {
    /// Unique identifier, used for deletion
    #[serde(default = "new_id")]
    pub id: String,
    /// Date the adjustment refers to
    pub date: NaiveDate,
    /// Employee who entered it
    pub user: String,
    /// Customer involved, if any
    #[serde(default)]
    pub client: String,
    /// Order or ticket number, if any
    #[serde(default)]
    pub order_id: String,
    /// Payment channel the adjustment applies to
    #[serde(default)]
    pub payment_method: String,
    /// Reason, taken from the configured reason list
    pub reason: String,
    /// Signed adjustment; stored as a number or as locale text
    #[serde(default)]
    pub adjustment_amount: RawAmount,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl JustificationEntry {
    /// Create a new justification with a generated id
    pub fn new(
        date: NaiveDate,
        user: String,
        reason: String,
        adjustment_amount: impl Into<RawAmount>,
    ) -> Self {
        Self {
            id: new_id(),
            date,
            user,
            client: String::new(),
            order_id: String::new(),
            payment_method: String::new(),
            reason,
            adjustment_amount: adjustment_amount.into(),
        }
    }

    /// Set the customer
    pub fn with_client(mut self, client: String) -> Self {
        self.client = client;
        self
    }

    /// Set the order number
    pub fn with_order_id(mut self, order_id: String) -> Self {
        self.order_id = order_id;
        self
    }

    /// Set the payment channel
    pub fn with_payment_method(mut self, payment_method: String) -> Self {
        self.payment_method = payment_method;
        self
    }

    /// Adjustment as an exact decimal
    pub fn adjustment(&self) -> BigDecimal {
        self.adjustment_amount.to_decimal()
    }
}

/// A single employee's end-of-shift closing for one store and date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingRecord {
    /// Unique identifier
    pub id: String,
    /// Date the closing pertains to
    pub date: NaiveDate,
    /// Store identifier
    pub store: String,
    /// Employee who performed the closing
    pub user: String,
    /// Payment channel rows, in entry order
    #[serde(default)]
    pub payment_methods: Vec<PaymentMethodEntry>,
    /// Adjustments explaining the discrepancy
    #[serde(default)]
    pub justifications: Vec<JustificationEntry>,
    /// Sum of every payment row difference
    #[serde(with = "amount")]
    pub grand_difference_total: BigDecimal,
    /// Review state
    #[serde(default)]
    pub validated: ValidationStatus,
    /// Reviewer who validated the closing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated_by: Option<String>,
    /// When the closing was validated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated_at: Option<NaiveDateTime>,
    /// Bills, float and deposits counted at the register
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_count: Option<CashCount>,
    /// Person responsible for the register
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible: Option<String>,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    /// When the closing was created
    #[serde(default = "now")]
    pub created_at: NaiveDateTime,
    /// When the closing was last updated
    #[serde(default = "now")]
    pub updated_at: NaiveDateTime,
}

fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

impl ClosingRecord {
    /// Create an empty closing
    pub fn new(store: String, user: String, date: NaiveDate) -> Self {
        let created = now();
        Self {
            id: new_id(),
            date,
            store,
            user,
            payment_methods: Vec::new(),
            justifications: Vec::new(),
            grand_difference_total: BigDecimal::from(0),
            validated: ValidationStatus::Unvalidated,
            validated_by: None,
            validated_at: None,
            cash_count: None,
            responsible: None,
            comments: None,
            created_at: created,
            updated_at: created,
        }
    }

    /// Sum of the payment row differences
    pub fn total_difference(&self) -> BigDecimal {
        self.payment_methods
            .iter()
            .map(|entry| &entry.difference_value)
            .sum()
    }

    /// Refresh every row difference and the grand total
    pub fn recompute_totals(&mut self) {
        for entry in &mut self.payment_methods {
            entry.refresh_difference();
        }
        self.grand_difference_total = self.total_difference();
        self.updated_at = now();
    }

    /// Add a payment row and keep the grand total in step
    pub fn add_payment_method(&mut self, entry: PaymentMethodEntry) {
        self.payment_methods.push(entry);
        self.recompute_totals();
    }

    /// Add a justification
    pub fn add_justification(&mut self, justification: JustificationEntry) {
        self.justifications.push(justification);
        self.updated_at = now();
    }

    /// Remove a justification by id, returning it
    pub fn remove_justification(&mut self, justification_id: &str) -> Option<JustificationEntry> {
        let position = self
            .justifications
            .iter()
            .position(|j| j.id == justification_id)?;
        self.updated_at = now();
        Some(self.justifications.remove(position))
    }

    /// Discrepancy left after subtracting every justification
    pub fn balance_outstanding(&self) -> BigDecimal {
        crate::reconciliation::balance_outstanding(
            &self.grand_difference_total,
            &self.justifications,
        )
    }

    /// Whether the justifications explain the whole discrepancy
    pub fn is_squared(&self) -> bool {
        crate::reconciliation::is_squared(&self.balance_outstanding())
    }

    /// Severity bucket of the raw discrepancy
    pub fn severity(&self) -> crate::reconciliation::Severity {
        crate::reconciliation::classify(&self.grand_difference_total)
    }

    /// Check the row and grand total invariants
    pub fn check_invariants(&self) -> ClosingResult<()> {
        if let Some(entry) = self.payment_methods.iter().find(|e| !e.is_consistent()) {
            return Err(ClosingError::InvariantViolation(format!(
                "Payment method '{}' difference {} does not equal collected {} - billed {}",
                entry.method, entry.difference_value, entry.collected, entry.billed
            )));
        }

        let total = self.total_difference();
        if total != self.grand_difference_total {
            return Err(ClosingError::InvariantViolation(format!(
                "Grand difference total {} does not equal the sum of differences {}",
                self.grand_difference_total, total
            )));
        }

        Ok(())
    }
}

/// Errors that can occur while handling closings
#[derive(Debug, thiserror::Error)]
pub enum ClosingError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Closing not found: {0}")]
    ClosingNotFound(String),
    #[error("Closing already exists: {0}")]
    ClosingExists(String),
    #[error("Justification not found: {0}")]
    JustificationNotFound(String),
    #[error("Closing already submitted for store '{store}', user '{user}' on {date}")]
    DuplicateClosing {
        store: String,
        user: String,
        date: NaiveDate,
    },
    #[error("Closing is not squared: balance outstanding is {balance}")]
    Unsquared { balance: BigDecimal },
    #[error("Cannot move closing from {from} to {to}")]
    InvalidTransition {
        from: ValidationStatus,
        to: ValidationStatus,
    },
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
    #[error("No storage backend available: {0}")]
    Unavailable(String),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ClosingError {
    /// Whether the error means a storage backend could not answer
    pub fn is_backend_failure(&self) -> bool {
        matches!(self, ClosingError::Storage(_) | ClosingError::Unavailable(_))
    }
}

/// Result type for closing operations
pub type ClosingResult<T> = Result<T, ClosingError>;
