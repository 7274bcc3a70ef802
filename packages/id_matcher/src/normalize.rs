use std::sync::LazyLock;

use regex::Regex;

/// Abbreviations and rebrands common enough in HIFLD/EPA source titles
/// that a plain fuzzy match would miss them. Keys are alias-index keys
/// (alphanumeric only, lowercased); values are the catalog vocabulary the
/// alias should be treated as.
const ALIASES: &[(&str, &str)] = &[
    ("sce", "southern california edison"),
    ("socalgaz", "southern california gas"),
    ("socalgas", "southern california gas"),
    ("sdge", "san diego gas electric"),
    ("pge", "pg e"),
    ("pseg", "pse g"),
    ("cemc", "cumberland electric membership"),
    ("comed", "comed"),
    ("lge", "louisville gas electric"),
    ("bge", "baltimore gas electric"),
    ("dte", "dte energy"),
    ("aps", "arizona public service"),
    ("tep", "tucson electric power"),
    ("nstar", "eversource"),
    ("rge", "rochester gas electric"),
    ("nyseg", "new york state electric gas"),
    ("jcpl", "jersey central power light"),
    ("pepco", "potomac electric power"),
    ("eastohiogas", "enbridge gas ohio"),
    ("dominioneastohio", "enbridge gas ohio"),
    ("sceg", "dominion energy south carolina"),
    ("srp", "salt river project"),
    ("ladwp", "los angeles department of water power"),
    ("tnmp", "texas new mexico power"),
    ("lgeku", "louisville gas electric"),
    ("chelco", "choctawhatchee electric cooperative"),
];

const LITERAL_REBRANDS: &[(&str, &str)] = &[
    ("east ohio gas", "enbridge gas ohio"),
    ("dominion east ohio", "enbridge gas ohio"),
    ("little rock pine bluff", "entergy arkansas"),
    ("cheyenne light fuel power", "black hills energy"),
    ("cheyenne light fuel & power", "black hills energy"),
];

/// Free-text substring rules mapping EPA/SDWIS/HIFLD system names to the
/// catalog vocabulary they're filed under. Each is `(must_contain_all,
/// replacement)`.
const SUBSTRING_RULES: &[(&[&str], &str)] = &[
    (&["intermountain gas"], "intermountain gas"),
    (
        &["upper cumberland e m c"],
        "upper cumberland electric membership",
    ),
    (
        &["upper cumberland emc"],
        "upper cumberland electric membership",
    ),
    (
        &["wisconsin rapids waterworks"],
        "wisconsin rapids water works lighting commission",
    ),
    (&["philadelphia water"], "city of philadelphia"),
    (&["citizens water", "indianapolis"], "citizens energy"),
    (&["fort wayne", "3 rivers"], "fort wayne city utilities"),
    (&["sarasota", "special"], "sarasota county water"),
    (&["augusta", "richmond"], "augusta utility"),
    (&["acsa", "urban"], "albemarle county service authority"),
    (&["global water", "santa cruz"], "global water resources"),
    (&["saws"], "san antonio water system"),
    (
        &["charles county", "dpw"],
        "charles county department of public works",
    ),
    (&["pwcsa"], "prince william water"),
    (
        &["coachella", "valley"],
        "coachella valley water district",
    ),
    (&["consolidated mutual"], "consolidated mutual water"),
    (
        &["smyrna", "natural gas"],
        "smyrna utilities department",
    ),
    (&["rio grande valley gas"], "rio grande valley gas"),
    (&["charlotte", "mecklenburg"], "charlotte water"),
    (&["az water co"], "epcor water arizona"),
    (&["arizona water co"], "epcor water arizona"),
    (&["chaparral city water"], "epcor water arizona"),
];

const AMERICAN_WATER_STATE_ABBREVIATIONS: &[(&str, &str)] = &[
    ("mo ", "missouri "),
    ("pa ", "pennsylvania "),
    ("in ", "indiana "),
    ("wv ", "west virginia "),
    ("tn ", "tennessee "),
    ("il ", "illinois "),
    ("ia ", "iowa "),
    ("nj ", "new jersey "),
    ("va ", "virginia "),
    ("ca ", "california "),
    ("ky ", "kentucky "),
    ("md ", "maryland "),
];

const TRAILING_SUFFIXES: &[&str] = &[
    " corporation",
    " corp",
    " inc",
    " llc",
    " co-op",
    " co op",
    " company",
    " electric delivery",
];

static TRAILING_STATE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*[-\u{2013}]\s*\(?[A-Z]{2}\)?\s*$").unwrap());
static PARENTHESIZED_STATE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\([A-Z]{2}\)\s*$").unwrap());
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static AMER_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bamer\b").unwrap());
static AW_DISTRICT_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+(pittsburgh|st louis|st charles|chattanooga|southeast|northwest|monterey)[\w\s]*$").unwrap()
});

/// Normalizes a provider title (from either the engine's resolved display
/// name or a catalog row) into the flattened vocabulary the matcher
/// compares against. Mirrors the scattering of HIFLD/EPA naming quirks
/// this catalog was originally reconciled against: truncations, rebrands,
/// multi-state subsidiary naming, and trailing jurisdiction tags.
#[must_use]
pub fn normalize_title(title: &str) -> String {
    let mut t = title.to_lowercase();

    t = t.replace(" elec ", " electric ");
    if let Some(stripped) = t.strip_suffix(" elec") {
        t = format!("{stripped} electric");
    }
    t = t.replace("elec member", "electric membership");
    t = t.replace(" coop", " cooperative");
    t = t.replace(" pwr ", " power ");
    if let Some(stripped) = t.strip_suffix(" pwr") {
        t = format!("{stripped} power");
    }
    t = t.replace(" svc ", " service ").replace(" svcs ", " services ");
    t = t
        .replace(" util ", " utilities ")
        .replace(" utils ", " utilities ");

    for (from, to) in LITERAL_REBRANDS {
        t = t.replace(from, to);
    }

    for (needles, replacement) in SUBSTRING_RULES {
        if needles.iter().all(|n| t.contains(n)) {
            t = (*replacement).to_string();
        }
    }

    if t.contains("amer") {
        t = AMER_WORD.replace_all(&t, "american").to_string();
        for (abbrev, full) in AMERICAN_WATER_STATE_ABBREVIATIONS {
            if t.starts_with(abbrev) {
                let window_end = (abbrev.len() + 12).min(t.len());
                if t[abbrev.len()..window_end].contains("american") {
                    t = AW_DISTRICT_SUFFIX.replace(&t, "").to_string();
                    t = format!("{full}american water");
                    break;
                }
            }
        }
    }

    if t.contains("winston") && t.contains("salem") && (t.contains("water") || t.contains("city")) {
        t = "city of winston salem".to_string();
    }

    let alias_key: String = t
        .chars()
        .filter(|c| !matches!(c, '&' | '-' | ' '))
        .collect();
    for (ak, av) in ALIASES {
        if alias_key == *ak {
            t = (*av).to_string();
            break;
        }
    }

    t = TRAILING_STATE_TAG.replace(&t, "").to_string();
    t = PARENTHESIZED_STATE_TAG.replace(&t, "").to_string();

    for suffix in TRAILING_SUFFIXES {
        if let Some(stripped) = t.strip_suffix(suffix) {
            t = stripped.to_string();
        }
    }

    t = NON_WORD.replace_all(&t, " ").to_string();
    t = WHITESPACE.replace_all(&t, " ").trim().to_string();
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_sce_alias() {
        assert_eq!(normalize_title("SCE"), "southern california edison");
    }

    #[test]
    fn strips_trailing_state_tag() {
        assert_eq!(normalize_title("Some Utility - TX"), "some utility");
    }

    #[test]
    fn rebrands_east_ohio_gas() {
        assert_eq!(normalize_title("East Ohio Gas"), "enbridge gas ohio");
    }

    #[test]
    fn expands_missouri_american_water_subsidiary() {
        assert_eq!(
            normalize_title("Mo American Water Co"),
            "missouri american water"
        );
    }

    #[test]
    fn maps_saws_acronym() {
        assert_eq!(normalize_title("SAWS"), "san antonio water system");
    }

    #[test]
    fn strips_legal_suffix() {
        assert_eq!(normalize_title("Duke Energy Corporation"), "duke energy");
    }
}
