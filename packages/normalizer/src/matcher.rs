use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::canonical::{CanonicalIndex, normalize_key};

/// Fuzzy-match acceptance threshold (token-sort-ratio, 0-100).
const FUZZY_THRESHOLD: u32 = 85;

/// Below this length (on the shorter side), fuzzy matches are rejected —
/// short strings produce spurious high ratios.
const FUZZY_MIN_LEN: usize = 4;

/// Minimum alias length eligible for substring matching.
const SUBSTRING_MIN_LEN: usize = 4;

/// Names frequent enough, and distinct enough from look-alikes, that a
/// fuzzy match is too risky — require an exact hit.
const EXACT_ONLY_NAMES: &[&str] = &["peco", "aep", "duke"];

const NULL_PLACEHOLDERS: &[&str] = &[
    "n/a",
    "na",
    "unknown",
    "landlord",
    "included",
    "varies",
    "none",
    "tbd",
    "unsure",
    "not sure",
    "n a",
    "",
];

const PROPANE_KEYWORDS: &[&str] = &[
    "amerigas",
    "ferrellgas",
    "propane",
    "suburban propane",
];

/// Rebrand and truncated-name substitutions applied before exact/fuzzy
/// matching. Grounded in production experience resolving HIFLD truncated
/// utility names (see `provider_id_matcher`'s `_normalize`).
const REBRAND_TABLE: &[(&str, &str)] = &[
    ("east ohio gas", "enbridge gas ohio"),
    ("dominion east ohio", "enbridge gas ohio"),
    ("little rock pine bluff", "entergy arkansas"),
    ("cheyenne light fuel power", "black hills energy"),
];

/// State abbreviations expanded only when followed by "american" within a
/// short window, disambiguating American Water's per-state subsidiaries
/// (e.g. "mo american water" -> "missouri american water").
const AMERICAN_WATER_STATE_EXPANSIONS: &[(&str, &str)] = &[
    ("mo ", "missouri "),
    ("pa ", "pennsylvania "),
    ("in ", "indiana "),
    ("il ", "illinois "),
    ("nj ", "new jersey "),
    ("wv ", "west virginia "),
];

const LEGAL_SUFFIXES: &[&str] = &[
    " llc", " inc", " inc.", " corporation", " corp", " co.", " co", " company", " lp",
];

/// How a name was resolved to a canonical id, or why it wasn't.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NormalizeMatchType {
    Exact,
    Fuzzy,
    Substring,
    NullValue,
    Propane,
    None,
}

/// The outcome of normalizing one free-text provider name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeResult {
    pub canonical_id: Option<String>,
    pub display_name: String,
    pub match_type: NormalizeMatchType,
    pub similarity: u32,
    pub is_rep: bool,
    pub matched_on: Option<String>,
}

/// Resolves free-text utility provider names against a [`CanonicalIndex`].
pub struct Normalizer<'a> {
    index: &'a CanonicalIndex,
    rep_ids: &'a [String],
}

impl<'a> Normalizer<'a> {
    #[must_use]
    pub const fn new(index: &'a CanonicalIndex, rep_ids: &'a [String]) -> Self {
        Self { index, rep_ids }
    }

    /// Resolves a single free-text provider name.
    ///
    /// Never fails: unmatched input degrades to
    /// [`NormalizeMatchType::None`] with a cleaned passthrough display
    /// name.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> NormalizeResult {
        let cleaned = raw.trim();

        if cleaned.is_empty() || NULL_PLACEHOLDERS.contains(&cleaned.to_lowercase().as_str()) {
            return NormalizeResult {
                canonical_id: None,
                display_name: cleaned.to_string(),
                match_type: NormalizeMatchType::NullValue,
                similarity: 0,
                is_rep: false,
                matched_on: None,
            };
        }

        let lower = cleaned.to_lowercase();
        if PROPANE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            return NormalizeResult {
                canonical_id: None,
                display_name: cleaned.to_string(),
                match_type: NormalizeMatchType::Propane,
                similarity: 0,
                is_rep: false,
                matched_on: None,
            };
        }

        let rebranded = apply_rebrand_table(&lower);

        if let Some((canonical_id, entry)) = self.index.lookup_exact(&rebranded) {
            return self.finish(canonical_id, &entry.display_name, NormalizeMatchType::Exact, 100, Some(rebranded));
        }

        if !EXACT_ONLY_NAMES.contains(&normalize_key(&rebranded).as_str()) {
            if let Some((canonical_id, display, score, matched_alias)) =
                self.fuzzy_lookup(&rebranded)
            {
                return self.finish(
                    &canonical_id,
                    &display,
                    NormalizeMatchType::Fuzzy,
                    score,
                    Some(matched_alias),
                );
            }
        }

        if let Some((canonical_id, display, matched_alias)) = self.substring_lookup(&rebranded) {
            return self.finish(
                &canonical_id,
                &display,
                NormalizeMatchType::Substring,
                95,
                Some(matched_alias),
            );
        }

        NormalizeResult {
            canonical_id: None,
            display_name: clean_passthrough(cleaned),
            match_type: NormalizeMatchType::None,
            similarity: 0,
            is_rep: false,
            matched_on: None,
        }
    }

    /// Splits `raw` on commas, trims each segment, drops empty segments,
    /// and normalizes each independently.
    ///
    /// Tenant-entered fields frequently contain multiple providers
    /// ("Oncor, Reliant Energy"); comma-splitting surfaces both.
    #[must_use]
    pub fn normalize_multi(&self, raw: &str) -> Vec<NormalizeResult> {
        raw.split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(|segment| self.normalize(segment))
            .collect()
    }

    /// True iff `a` and `b` resolve to the same canonical provider, or
    /// one is a substring of the other (both at least 4 characters), or
    /// they are exact case-insensitive matches.
    #[must_use]
    pub fn providers_match(&self, a: &str, b: &str) -> bool {
        let ra = self.normalize(a);
        let rb = self.normalize(b);

        if let (Some(ca), Some(cb)) = (&ra.canonical_id, &rb.canonical_id) {
            return ca == cb;
        }

        let (na, nb) = (normalize_key(a), normalize_key(b));
        if na == nb {
            return true;
        }

        if na.len() >= SUBSTRING_MIN_LEN && nb.len() >= SUBSTRING_MIN_LEN {
            return na.contains(&nb) || nb.contains(&na);
        }

        false
    }

    /// Membership test against the curated Texas Retail Electric Provider
    /// list.
    #[must_use]
    pub fn is_deregulated_rep(&self, name: &str) -> bool {
        let result = self.normalize(name);
        result
            .canonical_id
            .is_some_and(|id| self.rep_ids.contains(&id))
    }

    fn finish(
        &self,
        canonical_id: &str,
        display_name: &str,
        match_type: NormalizeMatchType,
        similarity: u32,
        matched_on: Option<String>,
    ) -> NormalizeResult {
        NormalizeResult {
            canonical_id: Some(canonical_id.to_string()),
            display_name: display_name.to_string(),
            match_type,
            similarity,
            is_rep: self.rep_ids.iter().any(|id| id == canonical_id),
            matched_on,
        }
    }

    fn fuzzy_lookup(&self, input: &str) -> Option<(String, String, u32, String)> {
        if input.len() < FUZZY_MIN_LEN {
            return None;
        }

        let mut best: Option<(String, String, u32, String)> = None;

        for (canonical_id, alias) in self.index.iter_aliases() {
            if alias.len() < FUZZY_MIN_LEN {
                continue;
            }
            let score = token_sort_ratio(input, &alias.to_lowercase());
            if score >= FUZZY_THRESHOLD
                && best.as_ref().is_none_or(|(_, _, best_score, _)| score > *best_score)
            {
                let display = self
                    .index
                    .get(canonical_id)
                    .map_or_else(|| alias.to_string(), |e| e.display_name.clone());
                best = Some((canonical_id.to_string(), display, score, alias.to_string()));
            }
        }

        best
    }

    fn substring_lookup(&self, input: &str) -> Option<(String, String, String)> {
        for (canonical_id, alias) in self.index.iter_aliases() {
            let alias_lower = alias.to_lowercase();
            if alias_lower.len() < SUBSTRING_MIN_LEN {
                continue;
            }
            if input.contains(&alias_lower) || alias_lower.contains(input) {
                let display = self
                    .index
                    .get(canonical_id)
                    .map_or_else(|| alias.to_string(), |e| e.display_name.clone());
                return Some((canonical_id.to_string(), display, alias.to_string()));
            }
        }
        None
    }
}

/// Applies the rebrand substitution table and the American-Water
/// state-abbreviation expansion.
fn apply_rebrand_table(lower: &str) -> String {
    for (from, to) in REBRAND_TABLE {
        if lower.contains(from) {
            return lower.replace(from, to);
        }
    }

    if lower.contains("american") {
        for (abbr, expanded) in AMERICAN_WATER_STATE_EXPANSIONS {
            if lower.starts_with(abbr) {
                return lower.replacen(abbr, expanded, 1);
            }
        }
    }

    lower.to_string()
}

/// Token-sort-ratio: sort whitespace-separated tokens alphabetically,
/// rejoin, then compute normalized Levenshtein similarity scaled to
/// 0-100. Order-insensitive, matching the tolerance of `rapidfuzz`'s
/// `token_sort_ratio` that this project's matching rules were tuned
/// against.
fn token_sort_ratio(a: &str, b: &str) -> u32 {
    let sorted_a = sort_tokens(a);
    let sorted_b = sort_tokens(b);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = (strsim::normalized_levenshtein(&sorted_a, &sorted_b) * 100.0).round() as u32;
    score
}

fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Strips common legal suffixes and title-cases all-caps input, used as
/// the display name for unmatched providers.
#[must_use]
pub fn clean_passthrough(name: &str) -> String {
    let mut cleaned = name.trim().to_string();
    let lower = cleaned.to_lowercase();
    for suffix in LEGAL_SUFFIXES {
        if lower.ends_with(suffix) {
            cleaned.truncate(cleaned.len() - suffix.len());
            cleaned = cleaned.trim_end().to_string();
            break;
        }
    }

    if cleaned == cleaned.to_uppercase() && cleaned.chars().any(char::is_alphabetic) {
        cleaned = title_case(&cleaned);
    }

    cleaned
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::CanonicalIndex;

    fn normalizer(index: &CanonicalIndex, reps: &[String]) -> Normalizer<'_> {
        Normalizer::new(index, reps)
    }

    #[test]
    fn exact_match_comed() {
        let index = CanonicalIndex::embedded().unwrap();
        let reps = Vec::new();
        let n = normalizer(&index, &reps);
        let result = n.normalize("ComEd");
        assert_eq!(result.match_type, NormalizeMatchType::Exact);
        assert_eq!(result.canonical_id.as_deref(), Some("comed"));
        assert_eq!(result.similarity, 100);
    }

    #[test]
    fn null_placeholder_short_circuits() {
        let index = CanonicalIndex::embedded().unwrap();
        let reps = Vec::new();
        let n = normalizer(&index, &reps);
        let result = n.normalize("N/A");
        assert_eq!(result.match_type, NormalizeMatchType::NullValue);
        assert!(result.canonical_id.is_none());
    }

    #[test]
    fn propane_keyword_detected() {
        let index = CanonicalIndex::embedded().unwrap();
        let reps = Vec::new();
        let n = normalizer(&index, &reps);
        let result = n.normalize("AmeriGas Propane");
        assert_eq!(result.match_type, NormalizeMatchType::Propane);
    }

    #[test]
    fn rebrand_table_maps_east_ohio_gas() {
        let index = CanonicalIndex::embedded().unwrap();
        let reps = Vec::new();
        let n = normalizer(&index, &reps);
        let result = n.normalize("East Ohio Gas");
        assert_eq!(result.canonical_id.as_deref(), Some("enbridge_gas_ohio"));
    }

    #[test]
    fn comma_split_returns_two_segments() {
        let index = CanonicalIndex::embedded().unwrap();
        let reps = vec!["txu_energy".to_string()];
        let n = normalizer(&index, &reps);
        let results = n.normalize_multi("Oncor, TXU Energy");
        assert_eq!(results.len(), 2);
        assert!(results[1].is_rep);
    }

    #[test]
    fn comma_split_filters_empty_segments() {
        let index = CanonicalIndex::embedded().unwrap();
        let reps = Vec::new();
        let n = normalizer(&index, &reps);
        let results = n.normalize_multi("ComEd, , , ");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].display_name, "ComEd");
    }

    #[test]
    fn empty_input_returns_empty_list() {
        let index = CanonicalIndex::embedded().unwrap();
        let reps = Vec::new();
        let n = normalizer(&index, &reps);
        assert!(n.normalize_multi("").is_empty());
    }

    #[test]
    fn providers_match_by_canonical_id() {
        let index = CanonicalIndex::embedded().unwrap();
        let reps = Vec::new();
        let n = normalizer(&index, &reps);
        assert!(n.providers_match("Oncor", "Oncor Electric Delivery Company LLC"));
    }

    #[test]
    fn providers_match_rejects_unrelated_names() {
        let index = CanonicalIndex::embedded().unwrap();
        let reps = Vec::new();
        let n = normalizer(&index, &reps);
        assert!(!n.providers_match("Oncor", "Duke Energy"));
    }

    #[test]
    fn clean_passthrough_strips_suffix_and_title_cases() {
        assert_eq!(clean_passthrough("ACME UTILITY LLC"), "Acme Utility");
    }
}
