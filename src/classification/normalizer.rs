//! Pivot-language (English) text normalization.
//!
//! The output is a space-joined token string; normalizing it again yields
//! the same string.
use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// English stopwords. Negations are absent because the override
/// heuristic and the classifier both depend on them.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "ain", "all", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "it's", "its",
    "itself", "just", "ll", "ma", "me", "might", "more", "most", "must", "my", "myself", "now",
    "of", "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over",
    "own", "re", "same", "shall", "she", "she's", "should", "should've", "so", "some", "such",
    "than", "that", "that'll", "the", "their", "theirs", "them", "themselves", "then", "there",
    "these", "they", "this", "those", "through", "to", "too", "under", "until", "up", "ve",
    "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why",
    "will", "with", "would", "you", "you'd", "you'll", "you're", "you've", "your", "yours",
    "yourself", "yourselves",
];

static STOPWORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOPWORDS.iter().copied().collect());

const IRREGULAR_LEMMAS: &[(&str, &str)] = &[
    ("children", "child"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("men", "man"),
    ("mice", "mouse"),
    ("teeth", "tooth"),
    ("women", "woman"),
];

/// Words whose trailing `s` is not a plural marker.
const INVARIANT_WORDS: &[&str] = &[
    "always", "bias", "lens", "news", "perhaps", "series", "species", "sometimes", "whereas",
];

#[derive(Debug)]
pub struct TextNormalizer {
    url_re: Regex,
    mention_re: Regex,
    non_word_re: Regex,
}

impl TextNormalizer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            url_re: Regex::new(r"(?:https?://|www\.)\S+").expect("compile url pattern"),
            mention_re: Regex::new(r"@\S+").expect("compile mention pattern"),
            non_word_re: Regex::new(r"[^\p{L}\p{M}']+").expect("compile non-word pattern"),
        }
    }

    /// Cleans `text` into the token string consumed by the vectorizer and the
    /// override keywords. Returns an empty string when nothing survives.
    #[must_use]
    pub fn normalize(&self, text: &str) -> String {
        let folded = text
            .nfkc()
            .map(|c| match c {
                '\u{2018}' | '\u{2019}' | '\u{02BC}' | '`' => '\'',
                other => other,
            })
            .collect::<String>()
            .to_lowercase();
        let without_urls = self.url_re.replace_all(&folded, " ");
        let without_mentions = self.mention_re.replace_all(&without_urls, " ");
        let letters_only = self.non_word_re.replace_all(&without_mentions, " ");

        letters_only
            .split_whitespace()
            .filter_map(|raw| {
                let token = raw.trim_matches('\'');
                if is_stopword(token) {
                    return None;
                }
                let lemma = canonical_token(token);
                if lemma.chars().count() < 2 || is_stopword(&lemma) {
                    None
                } else {
                    Some(lemma)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_stopword(token: &str) -> bool {
    STOPWORD_SET.contains(token)
}

/// Applies the lemma rules until the token stops changing.
fn canonical_token(token: &str) -> String {
    let mut current = token.to_string();
    loop {
        let next = lemmatize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn lemmatize_once(token: &str) -> String {
    let token = token.trim_matches('\'');
    if let Some(stem) = token.strip_suffix("'s") {
        return stem.to_string();
    }
    if let Some((_, lemma)) = IRREGULAR_LEMMAS.iter().find(|(word, _)| *word == token) {
        return (*lemma).to_string();
    }
    if INVARIANT_WORDS.contains(&token) {
        return token.to_string();
    }
    let length = token.chars().count();
    if length > 4
        && let Some(stem) = token.strip_suffix("ies")
    {
        return format!("{stem}y");
    }
    if let Some(stem) = token.strip_suffix("sses") {
        return format!("{stem}ss");
    }
    if length > 3
        && token.ends_with('s')
        && !token.ends_with("ss")
        && !token.ends_with("us")
        && !token.ends_with("is")
    {
        return token[..token.len() - 1].to_string();
    }
    token.to_string()
}
