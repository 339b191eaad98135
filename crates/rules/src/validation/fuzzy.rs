//! Fuzzy matching for "did you mean" suggestions, plus the kebab-case check
//! applied to document ids.

/// Closest candidate by Levenshtein distance, compared case-insensitively.
///
/// Nothing is suggested when the best distance exceeds half the length of
/// the longer string.
pub(crate) fn fuzzy_match<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let needle = input.to_lowercase();
    candidates
        .iter()
        .map(|&c| (c, levenshtein(&needle, &c.to_lowercase())))
        .min_by_key(|&(_, dist)| dist)
        .filter(|&(c, dist)| dist <= input.len().max(c.len()) / 2)
        .map(|(c, _)| c)
}

/// Levenshtein edit distance over chars, two-row table.
pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != *cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// `^[a-z0-9]+(-[a-z0-9]+)*$`
pub(crate) fn is_kebab_case(s: &str) -> bool {
    !s.is_empty()
        && s.split('-').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::KNOWN_ACTIONS;

    #[test]
    fn levenshtein_distances() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "sms"), 3);
        assert_eq!(levenshtein("escalate", "escalate"), 0);
    }

    #[test]
    fn suggests_close_action() {
        assert_eq!(fuzzy_match("send_emial", KNOWN_ACTIONS), Some("send_email"));
        assert_eq!(fuzzy_match("Flag_Acount", KNOWN_ACTIONS), Some("flag_account"));
    }

    #[test]
    fn no_suggestion_for_distant_input() {
        assert_eq!(fuzzy_match("zzzzzzzzzzzzzzzz", KNOWN_ACTIONS), None);
    }

    #[test]
    fn kebab_case() {
        assert!(is_kebab_case("coffee-rewards"));
        assert!(is_kebab_case("tier2"));
        assert!(!is_kebab_case("Coffee-Rewards"));
        assert!(!is_kebab_case("coffee--rewards"));
        assert!(!is_kebab_case("-coffee"));
        assert!(!is_kebab_case("coffee_"));
        assert!(!is_kebab_case(""));
    }
}
