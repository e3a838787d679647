use std::collections::{HashMap, HashSet};

pub const DEFAULT_MAX_WORDS: usize = 25;

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "can't", "cannot", "com", "could", "couldn't", "did", "didn't",
    "do", "does", "doesn't", "doing", "don't", "down", "during", "each", "else", "ever", "few",
    "for", "from", "further", "get", "had", "hadn't", "has", "hasn't", "have", "haven't",
    "having", "he", "he'd", "he'll", "he's", "hence", "her", "here", "here's", "hers", "herself",
    "him", "himself", "his", "how", "how's", "however", "http", "i", "i'd", "i'll", "i'm",
    "i've", "if", "in", "into", "is", "isn't", "it", "it's", "its", "itself", "just", "k",
    "let's", "like", "me", "more", "most", "mustn't", "my", "myself", "no", "nor", "not", "of",
    "off", "on", "once", "only", "or", "other", "otherwise", "ought", "our", "ours", "ourselves",
    "out", "over", "own", "r", "same", "shall", "shan't", "she", "she'd", "she'll", "she's",
    "should", "shouldn't", "since", "so", "some", "such", "than", "that", "that's", "the",
    "their", "theirs", "them", "themselves", "then", "there", "there's", "therefore", "these",
    "they", "they'd", "they'll", "they're", "they've", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "wasn't", "we", "we'd", "we'll", "we're", "we've",
    "were", "weren't", "what", "what's", "when", "when's", "where", "where's", "which", "while",
    "who", "who's", "whom", "why", "why's", "with", "won't", "would", "wouldn't", "www", "you",
    "you'd", "you'll", "you're", "you've", "your", "yours", "yourself", "yourselves",
];

/// Most frequent content words of `text`, most common first.
///
/// Words are lower-cased and stripped of a trailing possessive `'s`.
/// Stop words, single characters and pure numbers are dropped. Ties are
/// broken alphabetically so the output is stable.
pub fn top_terms(text: &str, max_words: usize) -> Vec<(String, usize)> {
    let stopwords: HashSet<&str> = STOPWORDS.iter().copied().collect();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for raw in text.split(|c: char| !(c.is_alphanumeric() || c == '\'')) {
        let lower = raw.trim_matches('\'').to_lowercase();
        if stopwords.contains(lower.as_str()) {
            continue;
        }
        let word = lower.strip_suffix("'s").unwrap_or(&lower);
        if word.chars().count() < 2
            || word.chars().all(|c| c.is_ascii_digit())
            || stopwords.contains(word)
        {
            continue;
        }
        *counts.entry(word.to_string()).or_default() += 1;
    }

    let mut terms: Vec<(String, usize)> = counts.into_iter().collect();
    terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    terms.truncate(max_words);
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_content_words_only() {
        let terms = top_terms(
            "The patient has diabetes. The patient's diabetes is controlled; patient is stable.",
            DEFAULT_MAX_WORDS,
        );
        assert_eq!(
            terms,
            vec![
                ("patient".to_string(), 3),
                ("diabetes".to_string(), 2),
                ("controlled".to_string(), 1),
                ("stable".to_string(), 1),
            ]
        );
    }

    #[test]
    fn numbers_and_single_letters_are_dropped() {
        let terms = top_terms("BP 120 over 80, x ray in 2024", DEFAULT_MAX_WORDS);
        let words: Vec<&str> = terms.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, vec!["bp", "ray"]);
    }

    #[test]
    fn respects_the_word_limit() {
        let text = "alpha beta gamma delta alpha beta alpha";
        let terms = top_terms(text, 2);
        assert_eq!(terms, vec![("alpha".to_string(), 3), ("beta".to_string(), 2)]);
    }

    #[test]
    fn empty_text_has_no_terms() {
        assert!(top_terms("", DEFAULT_MAX_WORDS).is_empty());
        assert!(top_terms("the and of", DEFAULT_MAX_WORDS).is_empty());
    }
}
