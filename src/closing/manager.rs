//! Review workflow over stored closings

use chrono::{Months, NaiveDate};

use crate::reconciliation::{summarize_by_store, ClosingStatistics, StoreSummary};
use crate::settings::ReconConfig;
use crate::traits::*;
use crate::types::*;

/// Closing manager: submission, justification editing and review
pub struct ClosingManager<S: ClosingStorage> {
    storage: S,
    validator: Box<dyn ClosingValidator>,
    adjustment_reasons: Vec<String>,
}

impl<S: ClosingStorage> ClosingManager<S> {
    /// Create a new closing manager
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultClosingValidator),
            adjustment_reasons: Vec::new(),
        }
    }

    /// Create a new closing manager with a custom validator
    pub fn with_validator(storage: S, validator: Box<dyn ClosingValidator>) -> Self {
        Self {
            storage,
            validator,
            adjustment_reasons: Vec::new(),
        }
    }

    /// Create a closing manager using the configured reason list
    pub fn from_config(storage: S, config: &ReconConfig) -> Self {
        Self::new(storage).with_adjustment_reasons(config.adjustment_reasons.clone())
    }

    /// Restrict justification reasons to a fixed list. An empty list accepts any reason.
    pub fn with_adjustment_reasons(mut self, reasons: Vec<String>) -> Self {
        self.adjustment_reasons = reasons;
        self
    }

    /// Access the underlying storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Submit a new closing.
    ///
    /// The closing must satisfy the validator and its invariants, must have a
    /// new id, must be the only one for its store, user and date, and must be
    /// squared: every discrepancy has to be justified before submission.
    pub async fn submit_closing(
        &mut self,
        mut closing: ClosingRecord,
    ) -> ClosingResult<ClosingRecord> {
        self.validator.validate_closing(&closing)?;
        for justification in &closing.justifications {
            self.check_justification(justification)?;
        }

        if self.storage.get_closing(&closing.id).await?.is_some() {
            return Err(ClosingError::ClosingExists(closing.id));
        }

        if self
            .storage
            .find_closing(&closing.store, &closing.user, closing.date)
            .await?
            .is_some()
        {
            return Err(ClosingError::DuplicateClosing {
                store: closing.store,
                user: closing.user,
                date: closing.date,
            });
        }

        require_squared(&closing)?;

        closing.validated = ValidationStatus::Unvalidated;
        closing.validated_by = None;
        closing.validated_at = None;
        closing.updated_at = chrono::Utc::now().naive_utc();
        self.storage.save_closing(&closing).await?;

        tracing::info!(
            closing_id = %closing.id,
            store = %closing.store,
            user = %closing.user,
            date = %closing.date,
            difference = %closing.grand_difference_total,
            severity = %closing.severity(),
            "closing submitted"
        );

        Ok(closing)
    }

    /// Get a closing by ID
    pub async fn get_closing(&self, closing_id: &str) -> ClosingResult<Option<ClosingRecord>> {
        self.storage.get_closing(closing_id).await
    }

    /// Get a closing by ID, returning an error if not found
    pub async fn get_closing_required(&self, closing_id: &str) -> ClosingResult<ClosingRecord> {
        self.storage
            .get_closing(closing_id)
            .await?
            .ok_or_else(|| ClosingError::ClosingNotFound(closing_id.to_string()))
    }

    /// List closings within an inclusive date range
    pub async fn list_closings(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> ClosingResult<Vec<ClosingRecord>> {
        self.storage.list_closings(start_date, end_date).await
    }

    /// Attach a justification to a stored closing
    pub async fn add_justification(
        &mut self,
        closing_id: &str,
        justification: JustificationEntry,
    ) -> ClosingResult<ClosingRecord> {
        self.check_justification(&justification)?;

        let mut closing = self.get_closing_required(closing_id).await?;
        closing.add_justification(justification);
        self.keep_validated_squared(&closing)?;

        self.storage.update_closing(&closing).await?;
        tracing::debug!(
            closing_id,
            balance = %closing.balance_outstanding(),
            "justification added"
        );
        Ok(closing)
    }

    /// Remove a justification from a stored closing
    pub async fn remove_justification(
        &mut self,
        closing_id: &str,
        justification_id: &str,
    ) -> ClosingResult<JustificationEntry> {
        let mut closing = self.get_closing_required(closing_id).await?;
        let removed = closing
            .remove_justification(justification_id)
            .ok_or_else(|| ClosingError::JustificationNotFound(justification_id.to_string()))?;
        self.keep_validated_squared(&closing)?;

        self.storage.update_closing(&closing).await?;
        tracing::debug!(closing_id, justification_id, "justification removed");
        Ok(removed)
    }

    /// Replace the payment rows of a closing, recomputing every difference.
    ///
    /// Validated closings cannot be amended; flag them for review first.
    pub async fn amend_payment_methods(
        &mut self,
        closing_id: &str,
        payment_methods: Vec<PaymentMethodEntry>,
    ) -> ClosingResult<ClosingRecord> {
        let mut closing = self.get_closing_required(closing_id).await?;
        if closing.validated == ValidationStatus::Validated {
            return Err(ClosingError::Validation(format!(
                "Closing {} is validated; flag it for review before amending",
                closing_id
            )));
        }

        closing.payment_methods = payment_methods;
        closing.recompute_totals();
        self.validator.validate_closing(&closing)?;

        self.storage.update_closing(&closing).await?;
        tracing::info!(
            closing_id,
            difference = %closing.grand_difference_total,
            "payment methods amended"
        );
        Ok(closing)
    }

    /// Mark a closing as validated by `reviewer`. Only squared closings can be validated.
    pub async fn validate_closing(
        &mut self,
        closing_id: &str,
        reviewer: &str,
    ) -> ClosingResult<ClosingRecord> {
        let closing = self.prepare_validation(closing_id, reviewer).await?;
        self.store_transition(closing).await
    }

    /// Validate several closings at once.
    ///
    /// Every closing is checked before any is stored, so one unsquared or
    /// missing closing leaves all of them unchanged.
    pub async fn validate_closings(
        &mut self,
        closing_ids: &[String],
        reviewer: &str,
    ) -> ClosingResult<Vec<ClosingRecord>> {
        let mut prepared = Vec::with_capacity(closing_ids.len());
        for closing_id in closing_ids {
            prepared.push(self.prepare_validation(closing_id, reviewer).await?);
        }

        let mut validated = Vec::with_capacity(prepared.len());
        for closing in prepared {
            validated.push(self.store_transition(closing).await?);
        }
        tracing::info!(count = validated.len(), reviewer, "closings validated");
        Ok(validated)
    }

    /// Send a closing back to the store for review. Any previous validation is cleared.
    pub async fn flag_for_review(
        &mut self,
        closing_id: &str,
        reviewer: &str,
    ) -> ClosingResult<ClosingRecord> {
        let mut closing = self.get_closing_required(closing_id).await?;
        transition(&mut closing, ValidationStatus::FlaggedForReview)?;
        closing.validated_by = None;
        closing.validated_at = None;
        tracing::info!(closing_id, reviewer, "closing flagged for review");
        self.store_transition(closing).await
    }

    /// Severity counts over a date range
    pub async fn statistics(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> ClosingResult<ClosingStatistics> {
        let closings = self.list_closings(start_date, end_date).await?;
        Ok(ClosingStatistics::from_closings(&closings))
    }

    /// Per-store roll-up for one calendar month
    pub async fn monthly_summary(
        &self,
        stores: &[String],
        year: i32,
        month: u32,
    ) -> ClosingResult<Vec<StoreSummary>> {
        let (first, last) = month_bounds(year, month)?;
        let closings = self.list_closings(Some(first), Some(last)).await?;
        Ok(summarize_by_store(stores, &closings))
    }

    async fn prepare_validation(
        &self,
        closing_id: &str,
        reviewer: &str,
    ) -> ClosingResult<ClosingRecord> {
        if reviewer.trim().is_empty() {
            return Err(ClosingError::Validation(
                "Reviewer cannot be empty".to_string(),
            ));
        }

        let mut closing = self.get_closing_required(closing_id).await?;
        require_squared(&closing)?;
        transition(&mut closing, ValidationStatus::Validated)?;
        closing.validated_by = Some(reviewer.to_string());
        closing.validated_at = Some(closing.updated_at);
        Ok(closing)
    }

    async fn store_transition(&mut self, closing: ClosingRecord) -> ClosingResult<ClosingRecord> {
        self.storage.update_closing(&closing).await?;
        tracing::info!(
            closing_id = %closing.id,
            status = %closing.validated,
            validated_by = ?closing.validated_by,
            "closing status changed"
        );
        Ok(closing)
    }

    fn check_justification(&self, justification: &JustificationEntry) -> ClosingResult<()> {
        self.validator.validate_justification(justification)?;

        if !self.adjustment_reasons.is_empty()
            && !self.adjustment_reasons.contains(&justification.reason)
        {
            return Err(ClosingError::Validation(format!(
                "Unknown justification reason: '{}'",
                justification.reason
            )));
        }

        Ok(())
    }

    fn keep_validated_squared(&self, closing: &ClosingRecord) -> ClosingResult<()> {
        if closing.validated == ValidationStatus::Validated {
            require_squared(closing)?;
        }
        Ok(())
    }
}

/// Apply a review transition and stamp the update time
fn transition(closing: &mut ClosingRecord, next: ValidationStatus) -> ClosingResult<()> {
    closing.validated = closing.validated.transition_to(next)?;
    closing.updated_at = chrono::Utc::now().naive_utc();
    Ok(())
}

/// Block the operation unless the closing's discrepancy is fully justified
fn require_squared(closing: &ClosingRecord) -> ClosingResult<()> {
    let balance = closing.balance_outstanding();
    if crate::reconciliation::is_squared(&balance) {
        return Ok(());
    }

    tracing::warn!(
        closing_id = %closing.id,
        balance = %balance,
        "closing is not squared"
    );
    Err(ClosingError::Unsquared { balance })
}

/// First and last day of a calendar month
pub fn month_bounds(year: i32, month: u32) -> ClosingResult<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ClosingError::Validation(format!("Invalid month: {}-{}", year, month)))?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| ClosingError::Validation(format!("Invalid month: {}-{}", year, month)))?;
    Ok((first, last))
}
