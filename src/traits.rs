//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::types::*;

/// Storage abstraction for closings
///
/// Closings are owned by the backend. Implement this trait over whatever
/// reaches it (a REST client, a database, an in-memory map for tests).
/// Justifications are persisted as part of their closing.
#[async_trait]
pub trait ClosingStorage: Send + Sync {
    /// Save a new closing
    async fn save_closing(&mut self, closing: &ClosingRecord) -> ClosingResult<()>;

    /// Get a closing by ID
    async fn get_closing(&self, closing_id: &str) -> ClosingResult<Option<ClosingRecord>>;

    /// Find the closing a user submitted for a store on a date
    async fn find_closing(
        &self,
        store: &str,
        user: &str,
        date: NaiveDate,
    ) -> ClosingResult<Option<ClosingRecord>>;

    /// List closings within an inclusive date range
    async fn list_closings(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> ClosingResult<Vec<ClosingRecord>>;

    /// Replace an existing closing
    async fn update_closing(&mut self, closing: &ClosingRecord) -> ClosingResult<()>;

    /// Delete a closing
    async fn delete_closing(&mut self, closing_id: &str) -> ClosingResult<()>;
}

/// Trait for implementing custom closing validation rules
pub trait ClosingValidator: Send + Sync {
    /// Validate a closing before it is saved
    fn validate_closing(&self, closing: &ClosingRecord) -> ClosingResult<()>;

    /// Validate a justification before it is attached to a closing
    fn validate_justification(&self, justification: &JustificationEntry) -> ClosingResult<()>;
}

/// Default validator: identity fields present and totals consistent
pub struct DefaultClosingValidator;

impl ClosingValidator for DefaultClosingValidator {
    fn validate_closing(&self, closing: &ClosingRecord) -> ClosingResult<()> {
        if closing.store.trim().is_empty() {
            return Err(ClosingError::Validation(
                "Store cannot be empty".to_string(),
            ));
        }

        if closing.user.trim().is_empty() {
            return Err(ClosingError::Validation("User cannot be empty".to_string()));
        }

        closing.check_invariants()
    }

    fn validate_justification(&self, justification: &JustificationEntry) -> ClosingResult<()> {
        if justification.reason.trim().is_empty() {
            return Err(ClosingError::Validation(
                "Justification reason cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
