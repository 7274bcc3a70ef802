use serde::Deserialize;
use utility_lookup_models::UtilityType;

use crate::error::ScorerError;

#[derive(Debug, Clone, Deserialize)]
struct ContactEntry {
    canonical_id: String,
    utility_type: UtilityType,
    phone: Option<String>,
    website: Option<String>,
}

/// Phone/website lookup for canonical providers, keyed by
/// `(canonical_id, utility_type)` since the same holding company (e.g.
/// CenterPoint Energy) publishes separate numbers per service.
pub struct ContactTable {
    entries: Vec<ContactEntry>,
}

impl ContactTable {
    /// # Errors
    ///
    /// Returns [`ScorerError::Json`] if `raw` is malformed.
    pub fn from_json(raw: &str) -> Result<Self, ScorerError> {
        Ok(Self {
            entries: serde_json::from_str(raw)?,
        })
    }

    /// Loads the contact table embedded in this binary.
    ///
    /// # Panics
    ///
    /// Panics if the embedded table is malformed (validated at build time).
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_json(include_str!("../data/contacts.json"))
            .expect("embedded contact table must be valid JSON")
    }

    /// Prefers an entry tagged with `utility_type`, falling back to any
    /// entry for the same canonical id.
    #[must_use]
    pub fn lookup(&self, canonical_id: &str, utility_type: UtilityType) -> (Option<String>, Option<String>) {
        let exact = self
            .entries
            .iter()
            .find(|e| e.canonical_id == canonical_id && e.utility_type == utility_type);

        let entry = exact.or_else(|| {
            self.entries
                .iter()
                .find(|e| e.canonical_id == canonical_id)
        });

        match entry {
            Some(e) => (e.phone.clone(), e.website.clone()),
            None => (None, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_entry_matching_utility_type() {
        let table = ContactTable::embedded();
        let (phone, _) = table.lookup("centerpoint_energy", UtilityType::Gas);
        assert_eq!(phone.as_deref(), Some("888-876-5786"));
    }

    #[test]
    fn unknown_canonical_id_returns_none() {
        let table = ContactTable::embedded();
        let (phone, website) = table.lookup("nonexistent", UtilityType::Electric);
        assert!(phone.is_none());
        assert!(website.is_none());
    }
}
