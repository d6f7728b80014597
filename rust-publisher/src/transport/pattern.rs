//! Topic exchange routing-key matching.
//!
//! Patterns and keys are dot-separated words. In a pattern `*` matches exactly
//! one word and `#` matches zero or more words.

/// Check whether `routing_key` matches the binding `pattern`.
///
/// Runs in O(pattern words × key words).
pub fn topic_matches(pattern: &str, routing_key: &str) -> bool {
    let mut words: Vec<&str> = Vec::new();
    for word in pattern.split('.') {
        // `#.#` matches exactly what `#` does.
        if word == "#" && words.last() == Some(&"#") {
            continue;
        }
        words.push(word);
    }
    let key: Vec<&str> = routing_key.split('.').collect();

    // `next[j]` holds whether the pattern suffix after the current word
    // matches `key[j..]`.
    let mut next = vec![false; key.len() + 1];
    next[key.len()] = true;
    let mut current = vec![false; key.len() + 1];

    for word in words.iter().rev() {
        current[key.len()] = *word == "#" && next[key.len()];
        for j in (0..key.len()).rev() {
            current[j] = match *word {
                "#" => next[j] || current[j + 1],
                "*" => next[j + 1],
                literal => key[j] == literal && next[j + 1],
            };
        }
        std::mem::swap(&mut next, &mut current);
    }

    next[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(topic_matches("orders.json", "orders.json"));
        assert!(!topic_matches("orders.json", "orders.plain"));
        assert!(!topic_matches("orders.json", "orders.json.v2"));
    }

    #[test]
    fn test_star_matches_single_word() {
        assert!(topic_matches("orders.*", "orders.json"));
        assert!(!topic_matches("orders.*", "orders"));
        assert!(!topic_matches("orders.*", "orders.json.v2"));
        assert!(topic_matches("*.created.*", "user.created.eu"));
    }

    #[test]
    fn test_hash_matches_zero_or_more_words() {
        assert!(topic_matches("#", "anything.at.all"));
        assert!(topic_matches("orders.#", "orders"));
        assert!(topic_matches("orders.#", "orders.json.v2"));
        assert!(topic_matches("#.json", "orders.json"));
        assert!(topic_matches("a.#.z", "a.z"));
        assert!(topic_matches("a.#.z", "a.b.c.z"));
        assert!(!topic_matches("a.#.z", "a.b.c"));
    }

    #[test]
    fn test_repeated_hash_against_long_key() {
        let pattern = vec!["#"; 64].join(".") + ".z";
        let key = vec!["a"; 200].join(".") + ".b";

        let started = std::time::Instant::now();
        assert!(!topic_matches(&pattern, &key));
        assert!(topic_matches(&pattern, &(key.clone() + ".z")));
        assert!(started.elapsed() < std::time::Duration::from_millis(500));
    }

    #[test]
    fn test_hash_between_stars() {
        assert!(topic_matches("*.#.*", "a.b"));
        assert!(topic_matches("*.#.*", "a.b.c.d"));
        assert!(!topic_matches("*.#.*", "a"));
        assert!(topic_matches("#.#", "a"));
    }

    #[test]
    fn test_empty_routing_key() {
        assert!(topic_matches("#", ""));
        assert!(topic_matches("", ""));
        assert!(!topic_matches("orders", ""));
    }
}
