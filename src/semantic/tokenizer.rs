//! Identifier tokenization: splitting `snake_case` and `camelCase`/`PascalCase`
//! names into lowercase word tokens (§4.4).

use unicode_segmentation::UnicodeSegmentation;

/// Split an identifier into lowercase word tokens, handling `snake_case`,
/// `kebab-case`, and `camelCase`/`PascalCase` boundaries.
pub fn split_identifier(identifier: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for grapheme in identifier.graphemes(true) {
        let ch = grapheme.chars().next().unwrap_or(' ');
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(ch.to_ascii_lowercase());
        prev_lower = ch.is_lowercase() || ch.is_numeric();
    }
    if !current.is_empty() {
        words.push(current);
    }
    words.into_iter().filter(|w| w.len() > 1).collect()
}

/// Group token weights into concept clusters by shared 3-character prefix
/// (§4.4: "simple prefix-grouping clustering (3-char prefix) for concept
/// discovery"), summing the weights of every token in a cluster. Tokens
/// shorter than 3 characters cluster under their own full text.
///
/// The returned map is keyed by the prefix itself, which becomes the
/// concept's topic — so `concept_topics` are cluster representatives, not
/// raw tokens.
pub fn cluster_by_prefix(token_weights: &std::collections::HashMap<String, f64>) -> std::collections::HashMap<String, f64> {
    let mut clusters: std::collections::HashMap<String, f64> = std::collections::HashMap::new();
    for (token, weight) in token_weights {
        let prefix = prefix_key(token);
        *clusters.entry(prefix).or_insert(0.0) += weight;
    }
    clusters
}

fn prefix_key(token: &str) -> String {
    token.chars().take(3).collect()
}

/// Tokenize a file path's stem into word tokens, for naming-drift
/// comparison against a file's concept topics.
pub fn tokenize_filename(path: &str) -> Vec<String> {
    let stem = path
        .rsplit('/')
        .next()
        .unwrap_or(path)
        .split('.')
        .next()
        .unwrap_or(path);
    split_identifier(stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_snake_case() {
        assert_eq!(split_identifier("user_repository"), vec!["user", "repository"]);
    }

    #[test]
    fn splits_camel_case() {
        assert_eq!(split_identifier("userRepository"), vec!["user", "repository"]);
    }

    #[test]
    fn splits_pascal_case() {
        assert_eq!(split_identifier("UserRepositoryImpl"), vec!["user", "repository", "impl"]);
    }

    #[test]
    fn single_letter_tokens_are_dropped() {
        assert_eq!(split_identifier("x_y_handler"), vec!["handler"]);
    }

    #[test]
    fn shared_prefix_tokens_cluster_into_one_concept() {
        let mut weights = std::collections::HashMap::new();
        weights.insert("user".to_string(), 1.0);
        weights.insert("users".to_string(), 0.5);
        weights.insert("handler".to_string(), 1.0);
        let clusters = cluster_by_prefix(&weights);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters["use"], 1.5);
        assert_eq!(clusters["han"], 1.0);
    }
}
