//! Text normalization shared by tokenization and phoneme lookup.

/// Which punctuation survives [`strip_punctuation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Punctuation {
    /// Remove every ASCII punctuation character.
    StripAll,
    /// Remove ASCII punctuation but keep apostrophes (contractions like "don't").
    KeepApostrophe,
}

impl Punctuation {
    fn removes(self, c: char) -> bool {
        match self {
            Punctuation::StripAll => c.is_ascii_punctuation(),
            Punctuation::KeepApostrophe => c.is_ascii_punctuation() && c != '\'',
        }
    }
}

/// Remove ASCII punctuation from `text`.
pub fn strip_punctuation(text: &str, mode: Punctuation) -> String {
    text.chars().filter(|&c| !mode.removes(c)).collect()
}

/// Normalize a single word into a phoneme-map key: lowercase, no punctuation.
pub fn normalize_word(word: &str) -> String {
    strip_punctuation(&word.to_lowercase(), Punctuation::StripAll)
}

/// Split raw text into lowercase words.
///
/// Punctuation other than the apostrophe is removed before splitting on
/// whitespace, so `"Hello, world!"` becomes `["hello", "world"]`.
pub fn tokenize(text: &str) -> Vec<String> {
    strip_punctuation(&text.to_lowercase(), Punctuation::KeepApostrophe)
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_sentence() {
        assert_eq!(tokenize("Hello, world!"), ["hello", "world"]);
    }

    #[test]
    fn keeps_apostrophes() {
        assert_eq!(tokenize("don't stop"), ["don't", "stop"]);
        assert_eq!(tokenize("The dog's BONE."), ["the", "dog's", "bone"]);
    }

    #[test]
    fn empty_input_yields_no_words() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  \t\n").is_empty());
        assert!(tokenize("?!...").is_empty());
    }

    #[test]
    fn punctuation_inside_words_is_removed() {
        // "well-known" loses the hyphen and stays one token
        assert_eq!(tokenize("a well-known fact"), ["a", "wellknown", "fact"]);
    }

    #[test]
    fn normalizes_word_for_lookup() {
        assert_eq!(normalize_word("Don't"), "dont");
        assert_eq!(normalize_word("HELLO!"), "hello");
        assert_eq!(normalize_word("-"), "");
    }
}
