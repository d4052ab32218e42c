//! Station name normalization.
//!
//! Names from different sources spell the same station differently
//! ("Saint-Étienne Châteaucreux" vs "St. Etienne Chateaucreux"). Matching
//! happens on a canonical form that folds case, diacritics, delimiters and
//! abbreviation punctuation.

use std::sync::LazyLock;

use moka::sync::Cache;
use regex::Regex;

static DELIMITERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[- _]").unwrap());
static OMITTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.']").unwrap());
static SPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s\s+").unwrap());

/// Memoized results, keyed by the exact input.
///
/// Unbounded: station vocabularies are small and finite.
static CACHE: LazyLock<Cache<String, String>> = LazyLock::new(|| Cache::builder().build());

/// Canonical form of a station name for matching.
///
/// ```
/// use route_builder::normalize::normalize;
///
/// assert_eq!(normalize("Saint-Étienne Châteaucreux"), "st etienne chateaucreux");
/// assert_eq!(normalize("St. Etienne  Chateaucreux"), "st etienne chateaucreux");
/// ```
pub fn normalize(name: &str) -> String {
    if let Some(cached) = CACHE.get(name) {
        return cached;
    }
    let normalized = normalize_uncached(name);
    CACHE.insert(name.to_string(), normalized.clone());
    normalized
}

fn normalize_uncached(name: &str) -> String {
    // Transliteration can reintroduce capitals (e.g. for CJK syllables)
    let name = deunicode::deunicode(&name.to_lowercase()).to_lowercase();
    let name = DELIMITERS.replace_all(&name, " ");
    let name = OMITTED.replace_all(&name, "");
    let name = SPACE_RUNS.replace_all(&name, " ");
    name.replace("saint", "st")
}
