/// Characters stripped from a raw skill cell. Datasets exported from Python
/// often contain list literals such as `['Python', 'SQL']`.
const LIST_PUNCTUATION: [char; 4] = ['[', ']', '\'', '"'];

/// Split a raw `required_skills` cell into individual skill tokens.
///
/// * list punctuation is removed and the cell is split on commas
/// * each token is trimmed and runs of inner whitespace collapse to one space
/// * empty tokens are dropped
/// * duplicates within the cell (compared case-insensitively) are dropped,
///   keeping the first spelling
pub fn tokenize_skills(raw: &str) -> Vec<String> {
    let cleaned: String = raw.chars().filter(|c| !LIST_PUNCTUATION.contains(c)).collect();

    let mut tokens: Vec<String> = Vec::new();
    for part in cleaned.split(',') {
        let token = part.split_whitespace().collect::<Vec<_>>().join(" ");
        if token.is_empty() {
            continue;
        }
        let folded = token.to_lowercase();
        if tokens.iter().any(|t| t.to_lowercase() == folded) {
            continue;
        }
        tokens.push(token);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_trims() {
        assert_eq!(tokenize_skills("Python, SQL ,  Deep   Learning"), vec![
            "Python",
            "SQL",
            "Deep Learning"
        ]);
    }

    #[test]
    fn strips_list_literal_punctuation() {
        assert_eq!(tokenize_skills("['Python', 'TensorFlow']"), vec![
            "Python",
            "TensorFlow"
        ]);
    }

    #[test]
    fn drops_empty_tokens() {
        assert_eq!(tokenize_skills(" , ,Docker,,"), vec!["Docker"]);
        assert!(tokenize_skills("").is_empty());
        assert!(tokenize_skills("[]").is_empty());
    }

    #[test]
    fn dedupes_case_insensitively_keeping_first_spelling() {
        assert_eq!(tokenize_skills("AWS, aws, Aws, GCP"), vec!["AWS", "GCP"]);
    }
}
