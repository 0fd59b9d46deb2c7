//! Fuzzy matching of free-text values against a canonical vocabulary.

use crate::dataset::UNKNOWN;
use crate::vocabulary::Vocabulary;

/// Matches candidate strings against a vocabulary with a score threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatcher {
    threshold: f64,
}

impl FuzzyMatcher {
    /// A matcher that accepts scores strictly above `threshold` (0-100).
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Resolve `candidate` to a vocabulary entry or the `Unknown` sentinel.
    ///
    /// The candidate is trimmed and title-cased first. Empty candidates and
    /// `Unknown` short-circuit to `Unknown`. An entry equal to the candidate
    /// (exactly, or ignoring ASCII case) is returned without scoring, so
    /// every entry maps to itself.
    pub fn resolve(&self, candidate: &str, vocabulary: &Vocabulary) -> String {
        let normalized = title_case(candidate.trim());
        if normalized.is_empty() || normalized == UNKNOWN {
            return UNKNOWN.to_string();
        }
        if vocabulary.contains(&normalized) {
            return normalized;
        }
        if let Some(entry) = vocabulary.find_ignore_case(&normalized) {
            return entry.to_string();
        }

        match best_match(&normalized, vocabulary) {
            Some((entry, score)) if score > self.threshold => entry.to_string(),
            _ => UNKNOWN.to_string(),
        }
    }
}

/// Highest-scoring vocabulary entry by token-sort ratio.
///
/// Ties resolve to the earliest entry. Returns `None` for an empty
/// vocabulary.
pub fn best_match<'a>(candidate: &str, vocabulary: &'a Vocabulary) -> Option<(&'a str, f64)> {
    let mut best: Option<(&str, f64)> = None;
    for entry in vocabulary.iter() {
        let score = token_sort_ratio(candidate, entry);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((entry, score)),
        }
    }
    best
}

/// Similarity in `[0, 100]` after sorting each string's whitespace tokens.
///
/// Insensitive to word order, sensitive to case.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sort_tokens(a), &sort_tokens(b))
}

/// Normalized indel similarity: `100 * 2 * LCS / (len_a + len_b)`.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    100.0 * (2 * lcs_length(&a, &b)) as f64 / total as f64
}

fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Longest common subsequence length, two-row dynamic programming.
fn lcs_length(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Title-case a string: the first letter of every run of letters is
/// upper-cased and the rest lower-cased (`"o'neil"` → `"O'Neil"`,
/// `"u.s.a"` → `"U.S.A"`).
///
/// Case mappings that expand to several characters are cased again one
/// character at a time, so `"ßen"` becomes `"Ssen"` and the result is a
/// fixed point.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_letter = false;
    for c in s.chars() {
        if !c.is_alphabetic() {
            out.push(c);
            prev_letter = false;
            continue;
        }
        let mapped: Vec<char> = if prev_letter {
            c.to_lowercase().collect()
        } else {
            c.to_uppercase().collect()
        };
        for m in mapped {
            prev_letter = push_cased(&mut out, m, prev_letter);
        }
    }
    out
}

/// Push `c` as the start or continuation of a letter run and report
/// whether a letter run continues after it.
fn push_cased(out: &mut String, c: char, prev_letter: bool) -> bool {
    if !c.is_alphabetic() {
        out.push(c);
        return false;
    }
    let cased = if prev_letter {
        c.to_lowercase().next()
    } else {
        c.to_uppercase().next()
    }
    .unwrap_or(c);
    out.push(cased);
    cased.is_alphabetic()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::Vocabularies;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("new york"), "New York");
        assert_eq!(title_case("NEW YORK"), "New York");
        assert_eq!(title_case("o'neil"), "O'Neil");
        assert_eq!(title_case("u.s.a"), "U.S.A");
        assert_eq!(title_case("3rd street"), "3Rd Street");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_title_case_expanding_mappings() {
        assert_eq!(title_case("ßen"), "Ssen");
        assert_eq!(title_case("ßpringfield"), "Sspringfield");
        assert_eq!(title_case("ﬀoo"), "Ffoo");
        assert_eq!(title_case("straße"), "Straße");
        assert_eq!(title_case("élodie"), "Élodie");

        for raw in ["ßen", "ﬀoo", "ŉa", "aİb", "ΐx", "ǅemal", "ΣΊΣΥΦΟΣ"] {
            let once = title_case(raw);
            assert_eq!(title_case(&once), once, "{:?}", raw);
        }
    }

    #[test]
    fn test_ratio_bounds() {
        assert_eq!(ratio("abc", "abc"), 100.0);
        assert_eq!(ratio("abc", "xyz"), 0.0);
        assert_eq!(ratio("", ""), 100.0);
        assert_eq!(ratio("ab", "abcd"), 100.0 * 4.0 / 6.0);
    }

    #[test]
    fn test_token_sort_ignores_order() {
        assert_eq!(token_sort_ratio("York New", "New York"), 100.0);
        assert_eq!(token_sort_ratio("  New   York ", "New York"), 100.0);
    }

    #[test]
    fn test_best_match_tie_prefers_first() {
        let vocab = Vocabulary::new(["Abx", "Aby"]);
        let (entry, _) = best_match("Abz", &vocab).unwrap();
        assert_eq!(entry, "Abx");
    }

    #[test]
    fn test_best_match_empty_vocabulary() {
        assert!(best_match("x", &Vocabulary::new(Vec::<String>::new())).is_none());
    }

    #[test]
    fn test_resolve_sentinels() {
        let matcher = FuzzyMatcher::new(70.0);
        let vocab = Vocabularies::default().countries;
        assert_eq!(matcher.resolve("", &vocab), "Unknown");
        assert_eq!(matcher.resolve("   ", &vocab), "Unknown");
        assert_eq!(matcher.resolve("unknown", &vocab), "Unknown");
    }

    #[test]
    fn test_resolve_misspelling() {
        let matcher = FuzzyMatcher::new(70.0);
        let vocab = Vocabularies::default().countries;
        assert_eq!(matcher.resolve("germny", &vocab), "Germany");
        assert_eq!(matcher.resolve(" united kingdom ", &vocab), "United Kingdom");
        assert_eq!(matcher.resolve("Kingdom United", &vocab), "United Kingdom");
        assert_eq!(matcher.resolve("Atlantis", &vocab), "Unknown");
    }

    #[test]
    fn test_every_entry_is_fixed_point() {
        let vocab = Vocabularies::default();
        let countries = FuzzyMatcher::new(70.0);
        for entry in vocab.countries.iter() {
            assert_eq!(countries.resolve(entry, &vocab.countries), entry);
        }
        let cities = FuzzyMatcher::new(40.0);
        for entry in vocab.cities.iter() {
            assert_eq!(cities.resolve(entry, &vocab.cities), entry);
        }
    }

    #[test]
    fn test_case_variants_of_acronyms() {
        let matcher = FuzzyMatcher::new(70.0);
        let vocab = Vocabularies::default().countries;
        assert_eq!(matcher.resolve("uae", &vocab), "UAE");
        assert_eq!(matcher.resolve("trinidad and tobago", &vocab), "Trinidad and Tobago");
    }

    #[test]
    fn test_threshold_is_strict() {
        let vocab = Vocabulary::new(["Springfield"]);
        let score = token_sort_ratio("Springfeld", "Springfield");

        assert_eq!(FuzzyMatcher::new(score).resolve("springfeld", &vocab), "Unknown");
        assert_eq!(
            FuzzyMatcher::new(score - 1.0).resolve("springfeld", &vocab),
            "Springfield"
        );
    }

    #[test]
    fn test_low_city_threshold_is_permissive() {
        let matcher = FuzzyMatcher::new(40.0);
        let vocab = Vocabularies::default().cities;
        assert_eq!(matcher.resolve("gotham city", &vocab), "Gotham");
    }
}
