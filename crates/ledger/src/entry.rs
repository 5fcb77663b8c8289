use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use nexus_core::error::require_non_blank;
use nexus_core::{DomainError, DomainResult, Entity, RecordId, numeric};

/// Direction of a ledger entry (determines its sign in balances).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Income => "Income",
            EntryKind::Expense => "Expense",
        }
    }
}

/// Editable ledger entry fields, as submitted from a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub kind: EntryKind,
    /// Defaults to the save date when absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default, deserialize_with = "numeric::deserialize_lenient")]
    pub amount: f64,
}

impl EntryDraft {
    /// Description, category and payment method are required; the amount
    /// must be a positive number.
    pub fn validate(&self) -> DomainResult<()> {
        require_non_blank("description", &self.description)?;
        require_non_blank("category", &self.category)?;
        require_non_blank("payment method", &self.payment_method)?;
        if !(self.amount.is_finite() && self.amount > 0.0) {
            return Err(DomainError::validation("amount must be a positive number"));
        }
        Ok(())
    }
}

/// A recorded income or expense.
///
/// `source_document_id` is set when the entry was derived from an invoice. It
/// is a back-reference only; the entry does not own the invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub(crate) id: RecordId,
    pub(crate) kind: EntryKind,
    pub(crate) date: NaiveDate,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) category: String,
    #[serde(default)]
    pub(crate) payment_method: String,
    #[serde(default, deserialize_with = "numeric::deserialize_lenient")]
    pub(crate) amount: f64,
    pub(crate) created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) source_document_id: Option<RecordId>,
}

impl LedgerEntry {
    pub fn record(id: RecordId, draft: EntryDraft, created_at: DateTime<Utc>) -> Self {
        let date = draft.date.unwrap_or_else(|| created_at.date_naive());
        Self {
            id,
            kind: draft.kind,
            date,
            description: draft.description.trim().to_string(),
            category: draft.category.trim().to_string(),
            payment_method: draft.payment_method,
            amount: draft.amount,
            created_at,
            source_document_id: None,
        }
    }

    /// Copy with the draft's fields. Id, creation time and source link are kept.
    pub fn updated(&self, draft: EntryDraft, today: NaiveDate) -> Self {
        Self {
            id: self.id.clone(),
            kind: draft.kind,
            date: draft.date.unwrap_or(today),
            description: draft.description.trim().to_string(),
            category: draft.category.trim().to_string(),
            payment_method: draft.payment_method,
            amount: draft.amount,
            created_at: self.created_at,
            source_document_id: self.source_document_id.clone(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn payment_method(&self) -> &str {
        &self.payment_method
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn source_document_id(&self) -> Option<&RecordId> {
        self.source_document_id.as_ref()
    }

    /// Amount with its sign in a balance: positive for income, negative for expense.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            EntryKind::Income => self.amount,
            EntryKind::Expense => -self.amount,
        }
    }

    pub fn to_draft(&self) -> EntryDraft {
        EntryDraft {
            kind: self.kind,
            date: Some(self.date),
            description: self.description.clone(),
            category: self.category.clone(),
            payment_method: self.payment_method.clone(),
            amount: self.amount,
        }
    }
}

impl Entity for LedgerEntry {
    type Id = RecordId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap()
    }

    fn draft(amount: f64) -> EntryDraft {
        EntryDraft {
            kind: EntryKind::Expense,
            date: None,
            description: "Van fuel".to_string(),
            category: "Transport".to_string(),
            payment_method: "Card".to_string(),
            amount,
        }
    }

    #[test]
    fn record_defaults_date_to_creation_day() {
        let entry = LedgerEntry::record("e1".parse().unwrap(), draft(40.0), test_time());
        assert_eq!(entry.date(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(entry.signed_amount(), -40.0);
        assert!(entry.source_document_id().is_none());
    }

    #[test]
    fn amount_must_be_positive() {
        assert!(draft(0.0).validate().is_err());
        assert!(draft(-3.0).validate().is_err());
        assert!(draft(f64::NAN).validate().is_err());
        assert!(draft(0.01).validate().is_ok());
    }

    #[test]
    fn required_text_fields() {
        let mut d = draft(10.0);
        d.category = " ".to_string();
        assert_eq!(
            d.validate(),
            Err(DomainError::Validation("category is required".to_string()))
        );
    }

    #[test]
    fn update_keeps_identity() {
        let entry = LedgerEntry::record("e1".parse().unwrap(), draft(40.0), test_time());
        let mut next = entry.to_draft();
        next.amount = 55.0;
        next.kind = EntryKind::Income;

        let updated = entry.updated(next, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(updated.id(), entry.id());
        assert_eq!(updated.created_at(), entry.created_at());
        assert_eq!(updated.date(), entry.date());
        assert_eq!(updated.signed_amount(), 55.0);
    }

    #[test]
    fn stored_amount_text_is_coerced() {
        let entry: LedgerEntry = serde_json::from_value(json!({
            "id": "e1",
            "kind": "income",
            "date": "2024-03-05",
            "amount": "12.75",
            "created_at": "2024-03-05T08:00:00Z"
        }))
        .unwrap();
        assert_eq!(entry.amount(), 12.75);
    }
}
