use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::NormalizeError;

/// One entry of the canonical provider table.
#[derive(Debug, Clone, Deserialize)]
pub struct CanonicalProviderEntry {
    pub display_name: String,
    pub aliases: Vec<String>,
    #[serde(default)]
    pub parent_company: Option<String>,
    #[serde(default)]
    pub eia_id: Option<u32>,
}

/// The loaded canonical provider table plus a case-insensitive alias
/// index built over it.
///
/// Immutable after construction; safe to share behind an `Arc` across
/// every concurrent lookup.
pub struct CanonicalIndex {
    entries: BTreeMap<String, CanonicalProviderEntry>,
    /// normalized alias -> canonical_id
    alias_index: BTreeMap<String, String>,
}

impl CanonicalIndex {
    /// Parses the canonical provider table from its JSON representation
    /// and builds the alias index.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::Json`] if the JSON is malformed, or
    /// [`NormalizeError::DuplicateAlias`] if the same alias key appears
    /// under two different canonical ids.
    pub fn from_json(raw: &str) -> Result<Self, NormalizeError> {
        let entries: BTreeMap<String, CanonicalProviderEntry> = serde_json::from_str(raw)?;
        let mut alias_index = BTreeMap::new();

        for (canonical_id, entry) in &entries {
            for alias in &entry.aliases {
                let key = normalize_key(alias);
                if let Some(existing) = alias_index.insert(key.clone(), canonical_id.clone())
                    && existing != *canonical_id
                {
                    return Err(NormalizeError::DuplicateAlias {
                        alias: alias.clone(),
                        first: existing,
                        second: canonical_id.clone(),
                    });
                }
            }
        }

        Ok(Self {
            entries,
            alias_index,
        })
    }

    /// Loads the canonical provider table embedded in this binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded table is malformed (should never
    /// happen; it is validated at build time).
    pub fn embedded() -> Result<Self, NormalizeError> {
        Self::from_json(include_str!("../data/canonical_providers.json"))
    }

    #[must_use]
    pub fn get(&self, canonical_id: &str) -> Option<&CanonicalProviderEntry> {
        self.entries.get(canonical_id)
    }

    /// Exact lookup by normalized alias key.
    #[must_use]
    pub fn lookup_exact(&self, name: &str) -> Option<(&str, &CanonicalProviderEntry)> {
        let key = normalize_key(name);
        let canonical_id = self.alias_index.get(&key)?;
        self.entries
            .get(canonical_id)
            .map(|e| (canonical_id.as_str(), e))
    }

    /// Finds the canonical entry whose `eia_id` matches, if any.
    #[must_use]
    pub fn lookup_by_eia_id(&self, eia_id: u32) -> Option<(&str, &CanonicalProviderEntry)> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.eia_id == Some(eia_id))
            .map(|(id, entry)| (id.as_str(), entry))
    }

    /// All (canonical_id, alias) pairs, for fuzzy/substring scanning.
    pub fn iter_aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(id, entry)| {
            entry
                .aliases
                .iter()
                .map(move |alias| (id.as_str(), alias.as_str()))
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lowercase, strip trailing punctuation, and collapse whitespace for
/// alias-index keys.
#[must_use]
pub fn normalize_key(name: &str) -> String {
    name.trim()
        .trim_end_matches(['.', ',', ';'])
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_table_loads_without_duplicate_aliases() {
        let index = CanonicalIndex::embedded().expect("embedded table must be valid");
        assert!(!index.is_empty());
    }

    #[test]
    fn exact_lookup_is_case_insensitive() {
        let index = CanonicalIndex::embedded().unwrap();
        let (id, entry) = index.lookup_exact("comed").unwrap();
        assert_eq!(id, "comed");
        assert_eq!(entry.display_name, "ComEd");
    }

    #[test]
    fn rejects_duplicate_alias_across_canonical_ids() {
        let raw = r#"{
            "a": {"display_name": "A", "aliases": ["Shared Name"]},
            "b": {"display_name": "B", "aliases": ["Shared Name"]}
        }"#;
        let err = CanonicalIndex::from_json(raw).unwrap_err();
        assert!(matches!(err, NormalizeError::DuplicateAlias { .. }));
    }
}
