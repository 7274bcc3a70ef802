use std::collections::BTreeSet;

/// Order-insensitive similarity: sorts each string's whitespace tokens
/// before comparing, so "Energy Duke" and "Duke Energy" score identically.
#[must_use]
pub fn token_sort_ratio(a: &str, b: &str) -> u32 {
    let sa = sort_tokens(a);
    let sb = sort_tokens(b);
    (strsim::normalized_levenshtein(&sa, &sb) * 100.0).round() as u32
}

/// Set-based similarity: tolerant of one name being a superset of the
/// other's tokens ("Duke Energy Carolinas" vs "Duke Energy"). Scores the
/// best of the intersection-only and intersection-plus-each-side
/// comparisons, approximating `rapidfuzz`'s `token_set_ratio`.
#[must_use]
pub fn token_set_ratio(a: &str, b: &str) -> u32 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let intersection: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let only_a: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let only_b: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    let sorted_join = |tokens: &[&str]| {
        let mut v = tokens.to_vec();
        v.sort_unstable();
        v.join(" ")
    };

    let intersection_str = sorted_join(&intersection);
    let combined_a = sorted_join(
        &intersection
            .iter()
            .chain(only_a.iter())
            .copied()
            .collect::<Vec<_>>(),
    );
    let combined_b = sorted_join(
        &intersection
            .iter()
            .chain(only_b.iter())
            .copied()
            .collect::<Vec<_>>(),
    );

    let score = |x: &str, y: &str| (strsim::normalized_levenshtein(x, y) * 100.0).round() as u32;

    score(&intersection_str, &combined_a)
        .max(score(&intersection_str, &combined_b))
        .max(score(&combined_a, &combined_b))
}

#[must_use]
pub fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_sort_ratio_ignores_word_order() {
        assert_eq!(token_sort_ratio("Duke Energy", "Energy Duke"), 100);
    }

    #[test]
    fn token_set_ratio_tolerates_superset() {
        let score = token_set_ratio("duke energy carolinas", "duke energy");
        assert!(score >= 90, "expected >= 90, got {score}");
    }

    #[test]
    fn dissimilar_names_score_low() {
        assert!(token_sort_ratio("Duke Energy", "Pacific Gas Electric") < 50);
    }
}
