//! Word to phoneme lookup built from a pronunciation dictionary.
//!
//! The dictionary spells words in a source phone set (one entry per line,
//! `word PH1 PH2 ...`). A [`PhoneInventory`] translates every source phone
//! into the target phoneme alphabet, and [`PhonemeMap`] stores the
//! concatenated translation per normalized word.

use crate::error::{PhonemeMapError, Result};
use crate::normalize::normalize_word;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Source phone that marks silence; always translates to an empty string.
pub const SILENCE_PHONE: &str = "SIL";

/// Phoneme lookup result. `None` marks a word missing from the map.
pub type Phoneme = Option<String>;

/// Translation table from source phones to target phoneme strings.
#[derive(Clone, Debug, Default)]
pub struct PhoneInventory {
    table: HashMap<String, String>,
}

impl PhoneInventory {
    /// Create an inventory from a phone table. The silence phone is registered
    /// on top of whatever the table says about it.
    pub fn new(mut table: HashMap<String, String>) -> Self {
        table.insert(SILENCE_PHONE.to_owned(), String::new());
        Self { table }
    }

    /// Parse an inventory from a JSON object of `phone -> phoneme` strings.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let table: HashMap<String, String> =
            serde_json::from_reader(reader).map_err(PhonemeMapError::Json)?;
        Ok(Self::new(table))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(PhonemeMapError::Io)?;
        Self::from_json_reader(BufReader::new(file))
    }

    /// Translate one source phone.
    pub fn translate(&self, phone: &str) -> Option<&str> {
        self.table.get(phone).map(String::as_str)
    }

}

/// Immutable mapping from normalized word to phoneme string.
#[derive(Clone, Debug, Default)]
pub struct PhonemeMap {
    words: HashMap<String, String>,
}

impl PhonemeMap {
    /// Build the map from dictionary lines.
    ///
    /// Blank lines are skipped. A word listed without phones maps to the empty
    /// string, and a later entry for the same normalized word replaces the
    /// earlier one.
    ///
    /// # Errors
    ///
    /// Fails on the first phone the inventory cannot translate.
    pub fn build<R: BufRead>(dictionary: R, inventory: &PhoneInventory) -> Result<Self> {
        let mut words = HashMap::new();

        for (i, line) in dictionary.lines().enumerate() {
            let line = line.map_err(PhonemeMapError::Io)?;
            let mut fields = line.split_whitespace();

            let Some(word) = fields.next() else {
                continue;
            };

            let phonemes = fields
                .map(|phone| {
                    inventory
                        .translate(phone)
                        .ok_or_else(|| PhonemeMapError::UnknownPhone {
                            phone: phone.to_owned(),
                            word: word.to_owned(),
                            line: i + 1,
                        })
                })
                .collect::<std::result::Result<String, _>>()?;

            words.insert(normalize_word(word), phonemes);
        }

        tracing::debug!(entries = words.len(), "phoneme map built");

        Ok(Self { words })
    }

    /// Build the map from a dictionary file and an inventory JSON file.
    pub fn from_files<P, Q>(dictionary: P, inventory: Q) -> Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let inventory = PhoneInventory::from_file(inventory)?;
        let file = File::open(dictionary).map_err(PhonemeMapError::Io)?;
        Self::build(BufReader::new(file), &inventory)
    }

    /// Look up one word after normalizing it.
    pub fn lookup(&self, word: &str) -> Option<&str> {
        self.words.get(&normalize_word(word)).map(String::as_str)
    }

    /// Map every word to its phonemes, keeping positions aligned.
    ///
    /// The output always has the same length as `words`; unmapped words are
    /// `None` at their position.
    pub fn phonemize<S: AsRef<str>>(&self, words: &[S]) -> Vec<Phoneme> {
        words
            .iter()
            .map(|word| self.lookup(word.as_ref()).map(str::to_owned))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const DICTIONARY: &str = "\
- SIL
the DH AH
cat K AE T
don't D OW N T
A AH
";

    fn inventory() -> PhoneInventory {
        let table = [
            ("DH", "D"),
            ("AH", "u"),
            ("K", "k"),
            ("AE", "@"),
            ("T", "t"),
            ("D", "d"),
            ("OW", "o"),
            ("N", "n"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();

        PhoneInventory::new(table)
    }

    fn phoneme_map() -> PhonemeMap {
        PhonemeMap::build(DICTIONARY.as_bytes(), &inventory()).unwrap()
    }

    #[test]
    fn concatenates_translated_phones() {
        let map = phoneme_map();

        assert_eq!(map.lookup("cat"), Some("k@t"));
        assert_eq!(map.lookup("the"), Some("Du"));
    }

    #[test]
    fn single_phone_entry_translates_directly() {
        let map = phoneme_map();
        assert_eq!(map.lookup("a"), Some("u"));
    }

    #[test]
    fn silence_entry_maps_to_empty_string() {
        let map = phoneme_map();

        assert_eq!(map.lookup("-"), Some(""));
        assert_eq!(map.phonemize(&["-"]), [Some(String::new())]);
    }

    #[test]
    fn silence_overrides_inventory_entry() {
        let table = HashMap::from([(SILENCE_PHONE.to_owned(), "x".to_owned())]);
        let inventory = PhoneInventory::new(table);

        assert_eq!(inventory.translate(SILENCE_PHONE), Some(""));
    }

    #[test]
    fn dictionary_words_lose_punctuation() {
        let map = phoneme_map();

        assert_eq!(map.lookup("dont"), Some("dont"));
        assert_eq!(map.lookup("Don't"), Some("dont"));
    }

    #[test]
    fn unmapped_words_yield_sentinel_in_place() {
        let map = phoneme_map();
        let words = ["The", "zebra", "cat!"];

        let phonemes = map.phonemize(&words);

        assert_eq!(phonemes.len(), words.len());
        assert_eq!(phonemes[0].as_deref(), Some("Du"));
        assert_eq!(phonemes[1], None);
        assert_eq!(phonemes[2].as_deref(), Some("k@t"));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let map = phoneme_map();
        let words: [&str; 0] = [];
        assert!(map.phonemize(&words).is_empty());
    }

    #[test]
    fn word_without_phones_maps_to_empty() {
        let map = PhonemeMap::build("hmm\n\n".as_bytes(), &inventory()).unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(map.lookup("hmm"), Some(""));
    }

    #[test]
    fn blank_dictionary_is_empty() {
        let map = PhonemeMap::build("\n  \n".as_bytes(), &inventory()).unwrap();

        assert!(map.is_empty());
        assert_eq!(map.lookup("the"), None);
    }

    #[test]
    fn unknown_phone_is_fatal() {
        let result = PhonemeMap::build("dog D AO G\n".as_bytes(), &inventory());

        match result {
            Err(Error::PhonemeMap(PhonemeMapError::UnknownPhone { phone, word, line })) => {
                assert_eq!(phone, "AO");
                assert_eq!(word, "dog");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn parses_inventory_json() {
        let json = r#"{"AA": "a", "B": "b"}"#;
        let inventory = PhoneInventory::from_json_reader(json.as_bytes()).unwrap();

        assert_eq!(inventory.translate("AA"), Some("a"));
        assert_eq!(inventory.translate(SILENCE_PHONE), Some(""));
        assert_eq!(inventory.translate("C"), None);
    }

    #[test]
    fn rejects_non_string_inventory() {
        let result = PhoneInventory::from_json_reader(r#"{"AA": 1}"#.as_bytes());
        assert!(matches!(
            result,
            Err(Error::PhonemeMap(PhonemeMapError::Json(_)))
        ));
    }
}
