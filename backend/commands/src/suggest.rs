//! "Did you mean" suggestions for unknown command tokens.
//!
//! Prefix matches are preferred, in both directions ("makes" suggests
//! "make" and vice versa). When none exist, candidates within Levenshtein
//! distance 1 are offered so suggestions stay quiet rather than noisy.

/// Suggest candidates for an unknown token.
///
/// Output is lowercase, deduplicated and capped at five entries; prefix
/// matches come sorted, distance matches come in ascending distance with
/// ties in first-seen order. Returns an empty vec when nothing qualifies.
pub fn suggest(token: &str, candidates: &[String]) -> Vec<String> {
    let token = token.to_lowercase();
    if token.is_empty() || candidates.is_empty() {
        return Vec::new();
    }

    let mut prefix: Vec<String> = Vec::new();
    for candidate in candidates {
        let candidate = candidate.to_lowercase();
        if candidate.is_empty() {
            continue;
        }
        if token.starts_with(&candidate) || candidate.starts_with(&token) {
            prefix.push(candidate);
        }
    }
    prefix.sort();
    prefix.dedup();
    if !prefix.is_empty() {
        prefix.truncate(5);
        return prefix;
    }

    let mut scored: Vec<(String, usize)> = Vec::new();
    for candidate in candidates {
        let candidate = candidate.to_lowercase();
        if scored.iter().any(|(seen, _)| *seen == candidate) {
            continue;
        }
        let distance = levenshtein(&token, &candidate);
        if distance <= 1 {
            scored.push((candidate, distance));
        }
    }
    // Stable sort keeps first-seen order between equal distances.
    scored.sort_by_key(|(_, distance)| *distance);
    scored.truncate(5);
    scored.into_iter().map(|(candidate, _)| candidate).collect()
}

/// Edit distance over chars, using two rolling rows.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = if ca == cb { 0 } else { 1 };
            current[j + 1] = (prev[j + 1] + 1)
                .min(current[j] + 1)
                .min(prev[j] + substitution);
        }
        std::mem::swap(&mut prev, &mut current);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_prefix_match_wins() {
        let out = suggest("mak", &names(&["make", "model", "seed"]));
        assert_eq!(out, vec!["make"]);
    }

    #[test]
    fn prefix_works_in_both_directions() {
        // Token longer than the candidate.
        assert_eq!(suggest("makes", &names(&["make"])), vec!["make"]);
        // Candidate longer than the token.
        assert_eq!(suggest("mig", &names(&["migrate"])), vec!["migrate"]);
    }

    #[test]
    fn distance_fallback_allows_one_edit() {
        let out = suggest("mske", &names(&["make", "seed"]));
        assert_eq!(out, vec!["make"]);
        // Two edits away is too noisy to suggest.
        assert!(suggest("mxxe", &names(&["make"])).is_empty());
    }

    #[test]
    fn prefix_results_are_sorted_and_capped() {
        let out = suggest(
            "m",
            &names(&["migrate", "make", "model", "mount", "mirror", "monitor", "map"]),
        );
        assert_eq!(out.len(), 5);
        assert_eq!(out, vec!["make", "map", "migrate", "mirror", "model"]);
    }

    #[test]
    fn suggestions_are_lowercased_and_deduped() {
        let out = suggest("MAK", &names(&["Make", "MAKE", "make"]));
        assert_eq!(out, vec!["make"]);
    }

    #[test]
    fn empty_token_or_candidates_suggest_nothing() {
        assert!(suggest("", &names(&["make"])).is_empty());
        assert!(suggest("make", &[]).is_empty());
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("make", "make"), 0);
        assert_eq!(levenshtein("make", "mak"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
    }
}
