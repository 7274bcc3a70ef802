use utility_lookup_models::{Correction, UtilityType};

use crate::result::AdapterResult;

/// Authoritative manual overrides. Appended-only; when more than one
/// correction matches the same key, the most recently appended one wins.
pub struct CorrectionsAdapter {
    corrections: Vec<Correction>,
}

impl CorrectionsAdapter {
    #[must_use]
    pub const fn new(corrections: Vec<Correction>) -> Self {
        Self { corrections }
    }

    /// Exact normalized-address match, confidence 0.99. Checked before
    /// every other source in the pipeline; a hit short-circuits the
    /// primary slot.
    #[must_use]
    pub fn lookup_by_address(&self, address: &str, utility_type: UtilityType) -> Option<AdapterResult> {
        let normalized = normalize_address(address);
        self.corrections
            .iter()
            .rev()
            .find(|c| {
                c.utility_type == utility_type
                    && c.address
                        .as_deref()
                        .is_some_and(|a| normalize_address(a) == normalized)
            })
            .map(|c| {
                AdapterResult::new(c.corrected_provider.clone(), "corrections_address", 0.99)
                    .with_state(c.state.clone())
            })
    }

    /// ZIP-level match, confidence 0.98. Used when no address-level
    /// correction exists for this exact address.
    #[must_use]
    pub fn lookup_by_zip(&self, zip: &str, utility_type: UtilityType) -> Option<AdapterResult> {
        self.corrections
            .iter()
            .rev()
            .find(|c| {
                c.utility_type == utility_type && c.zip.as_deref() == Some(zip) && c.address.is_none()
            })
            .map(|c| {
                AdapterResult::new(c.corrected_provider.clone(), "corrections_zip", 0.98)
                    .with_state(c.state.clone())
            })
    }
}

fn normalize_address(address: &str) -> String {
    address
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn correction(address: Option<&str>, zip: Option<&str>, provider: &str) -> Correction {
        Correction {
            address: address.map(String::from),
            lat: None,
            lon: None,
            zip: zip.map(String::from),
            state: "TX".to_string(),
            utility_type: UtilityType::Electric,
            corrected_provider: provider.to_string(),
            corrected_catalog_id: None,
            original_provider: None,
            corrected_by: "operator".to_string(),
            corrected_at: Utc::now(),
            notes: None,
        }
    }

    #[test]
    fn address_correction_beats_zip_correction() {
        let adapter = CorrectionsAdapter::new(vec![correction(
            Some("123 Main St, Dallas, TX"),
            None,
            "Oncor Electric Delivery",
        )]);
        let hit = adapter
            .lookup_by_address("123  main st, dallas, tx", UtilityType::Electric)
            .unwrap();
        assert_eq!(hit.name, "Oncor Electric Delivery");
        assert_eq!(hit.confidence, 0.99);
    }

    #[test]
    fn most_recent_correction_wins_on_duplicate_key() {
        let adapter = CorrectionsAdapter::new(vec![
            correction(None, Some("75201"), "Old Provider"),
            correction(None, Some("75201"), "New Provider"),
        ]);
        let hit = adapter
            .lookup_by_zip("75201", UtilityType::Electric)
            .unwrap();
        assert_eq!(hit.name, "New Provider");
    }
}
