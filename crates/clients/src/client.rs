use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nexus_core::error::require_non_blank;
use nexus_core::{DomainResult, Entity, RecordId};
use nexus_documents::ClientSnapshot;

/// Editable client fields, as submitted from a form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientDraft {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub notes: String,
}

impl ClientDraft {
    /// Only the name is required. Uniqueness is not enforced.
    pub fn validate(&self) -> DomainResult<()> {
        require_non_blank("client name", &self.name)
    }
}

/// A client in the directory.
///
/// Documents keep a copy of the client's details (see [`Client::snapshot`]) and
/// an optional id reference; deleting a client leaves those documents alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    id: RecordId,
    name: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    notes: String,
    created_at: DateTime<Utc>,
}

impl Client {
    pub fn register(id: RecordId, draft: ClientDraft, created_at: DateTime<Utc>) -> Self {
        let mut client = Self {
            id,
            name: String::new(),
            address: String::new(),
            phone: String::new(),
            email: String::new(),
            notes: String::new(),
            created_at,
        };
        client.apply(draft);
        client
    }

    /// Copy with the draft's fields; id and creation time are kept.
    pub fn updated(&self, draft: ClientDraft) -> Self {
        let mut client = self.clone();
        client.apply(draft);
        client
    }

    fn apply(&mut self, draft: ClientDraft) {
        self.name = draft.name.trim().to_string();
        self.address = draft.address.trim().to_string();
        self.phone = draft.phone.trim().to_string();
        self.email = draft.email.trim().to_string();
        self.notes = draft.notes.trim().to_string();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Details to copy into an invoice or quote draft.
    pub fn snapshot(&self) -> ClientSnapshot {
        ClientSnapshot {
            name: self.name.clone(),
            address: self.address.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

impl Entity for Client {
    type Id = RecordId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nexus_core::DomainError;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap()
    }

    fn draft(name: &str) -> ClientDraft {
        ClientDraft {
            name: name.to_string(),
            address: " 12 Calle Sol ".to_string(),
            phone: "787-555-0100".to_string(),
            email: "ops@acme.test".to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn register_trims_fields() {
        let client = Client::register("c1".parse().unwrap(), draft(" Acme "), test_time());
        assert_eq!(client.name(), "Acme");
        assert_eq!(client.address(), "12 Calle Sol");
        assert_eq!(client.created_at(), test_time());
    }

    #[test]
    fn update_keeps_identity_and_creation_time() {
        let client = Client::register("c1".parse().unwrap(), draft("Acme"), test_time());
        let updated = client.updated(draft("Acme Holdings"));

        assert_eq!(updated.id(), client.id());
        assert_eq!(updated.created_at(), client.created_at());
        assert_eq!(updated.name(), "Acme Holdings");
    }

    #[test]
    fn name_is_required() {
        assert!(matches!(draft("  ").validate(), Err(DomainError::Validation(_))));
        assert!(draft("Acme").validate().is_ok());
    }

    #[test]
    fn snapshot_copies_contact_details() {
        let client = Client::register("c1".parse().unwrap(), draft("Acme"), test_time());
        let snap = client.snapshot();

        assert_eq!(snap.name, "Acme");
        assert_eq!(snap.phone, "787-555-0100");
        assert_eq!(snap.email, "ops@acme.test");
    }

    #[test]
    fn stored_client_without_optional_fields_loads() {
        let client: Client = serde_json::from_value(serde_json::json!({
            "id": "c9",
            "name": "Walk-in",
            "created_at": "2024-01-10T09:00:00Z"
        }))
        .unwrap();
        assert_eq!(client.email(), "");
    }
}
