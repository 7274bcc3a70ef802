use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::IdMatcherError;
use crate::normalize::normalize_title;

#[derive(Debug, Clone, Deserialize)]
struct CatalogRow {
    #[serde(rename = "ID")]
    id: i32,
    #[serde(rename = "UtilityTypeId")]
    type_id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "URL", default)]
    url: String,
    #[serde(rename = "Phone", default)]
    phone: String,
    #[serde(rename = "Source", default)]
    #[allow(dead_code)]
    source: String,
}

/// One catalog row, plus its precomputed normalized title for matching.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub id: i32,
    pub type_id: String,
    pub title: String,
    pub url: Option<String>,
    pub phone: Option<String>,
    pub normalized: String,
}

/// The internal provider catalog: every entry this system can resolve a
/// name to, partitioned by `UtilityTypeId` for fast candidate scans.
pub struct ProviderCatalog {
    entries: Vec<CatalogEntry>,
    by_type: BTreeMap<String, Vec<usize>>,
}

impl ProviderCatalog {
    /// # Errors
    ///
    /// Returns [`IdMatcherError::Csv`] if a row cannot be parsed.
    pub fn from_csv_str(raw: &str) -> Result<Self, IdMatcherError> {
        let mut reader = csv::Reader::from_reader(raw.as_bytes());
        let mut entries = Vec::new();

        for result in reader.deserialize::<CatalogRow>() {
            let row = result?;
            if !matches!(row.type_id.as_str(), "2" | "3" | "4" | "5" | "6" | "7" | "8") {
                continue;
            }
            let normalized = normalize_title(row.title.trim());
            entries.push(CatalogEntry {
                id: row.id,
                type_id: row.type_id,
                title: row.title.trim().to_string(),
                url: (!row.url.is_empty()).then_some(row.url),
                phone: (!row.phone.is_empty()).then_some(row.phone),
                normalized,
            });
        }

        log::info!("provider catalog: {} entries loaded", entries.len());

        let mut by_type: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            by_type.entry(entry.type_id.clone()).or_default().push(idx);
        }

        Ok(Self { entries, by_type })
    }

    /// # Panics
    ///
    /// Panics if the embedded CSV is malformed (validated at build time).
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_csv_str(include_str!("../data/provider_catalog.csv"))
            .expect("embedded provider catalog must be valid CSV")
    }

    #[must_use]
    pub fn entries_for_type(&self, type_id: &str) -> Vec<&CatalogEntry> {
        self.by_type
            .get(type_id)
            .into_iter()
            .flatten()
            .map(|&idx| &self.entries[idx])
            .collect()
    }

    #[must_use]
    pub fn by_id(&self, id: i32) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_loads_and_partitions_by_type() {
        let catalog = ProviderCatalog::embedded();
        assert!(!catalog.is_empty());
        assert!(!catalog.entries_for_type("2").is_empty());
        assert!(!catalog.entries_for_type("3").is_empty());
        assert!(!catalog.entries_for_type("4").is_empty());
    }

    #[test]
    fn unknown_type_id_partition_is_empty() {
        let catalog = ProviderCatalog::embedded();
        assert!(catalog.entries_for_type("99").is_empty());
    }

    #[test]
    fn by_id_finds_loaded_entry() {
        let catalog = ProviderCatalog::embedded();
        let entry = catalog.by_id(2).unwrap();
        assert_eq!(entry.title, "ComEd");
    }
}
