#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Free-text utility provider name resolution.
//!
//! Resolves raw provider strings (as entered by a tenant, scraped from a
//! PDF, or returned by a state GIS layer) to a canonical provider id plus
//! a display name, classifying the match strength along the way. See
//! [`matcher::Normalizer`] for the main entry point and [`water`] for the
//! water-system-specific variant.

pub mod canonical;
pub mod error;
pub mod matcher;
pub mod water;

pub use canonical::{CanonicalIndex, CanonicalProviderEntry};
pub use error::NormalizeError;
pub use matcher::{NormalizeMatchType, NormalizeResult, Normalizer, clean_passthrough};
pub use water::normalize_water_name;

/// Loads the embedded Texas Retail Electric Provider id list consulted by
/// [`Normalizer::is_deregulated_rep`].
///
/// # Errors
///
/// Returns an error if the embedded table is malformed (should never
/// happen; it is validated at build time).
pub fn embedded_rep_ids() -> Result<Vec<String>, NormalizeError> {
    Ok(serde_json::from_str(include_str!(
        "../data/texas_reps.json"
    ))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_rep_ids_load() {
        let ids = embedded_rep_ids().unwrap();
        assert!(ids.contains(&"txu_energy".to_string()));
    }

    #[test]
    fn end_to_end_normalize_and_rep_check() {
        let index = CanonicalIndex::embedded().unwrap();
        let reps = embedded_rep_ids().unwrap();
        let normalizer = Normalizer::new(&index, &reps);

        let result = normalizer.normalize("TXU Energy");
        assert!(result.is_rep);

        let result = normalizer.normalize("Oncor Electric Delivery Company LLC");
        assert!(!result.is_rep);
        assert_eq!(result.display_name, "Oncor Electric Delivery");
    }
}
