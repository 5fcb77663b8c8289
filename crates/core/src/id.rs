//! Record identifiers.
//!
//! Identifiers are opaque strings. Generated ids are UUIDv7 (time-ordered), but
//! any non-blank string is accepted so records hydrated from the remote mirror
//! or derived from another record keep whatever id they were given.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of a stored record (ledger entry, document, client).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create a new identifier.
    ///
    /// Prefer passing ids explicitly in tests for determinism.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Deterministic id derived from another record's id: `{prefix}{source}`.
    ///
    /// Re-deriving from the same source always yields the same id. Nothing
    /// prevents an unrelated record from having been given the same string.
    pub fn derived(prefix: &str, source: &RecordId) -> Self {
        Self(format!("{prefix}{}", source.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RecordId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_id("RecordId: empty"));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<RecordId> for String {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(RecordId::generate(), RecordId::generate());
    }

    #[test]
    fn derived_ids_are_deterministic() {
        let source: RecordId = "A".parse().unwrap();
        assert_eq!(RecordId::derived("inv-entry-", &source).as_str(), "inv-entry-A");
        assert_eq!(
            RecordId::derived("inv-entry-", &source),
            RecordId::derived("inv-entry-", &source)
        );
    }

    #[test]
    fn blank_ids_do_not_parse() {
        assert!(matches!("  ".parse::<RecordId>(), Err(DomainError::InvalidId(_))));
    }
}
