//! Per-engine transcript payloads.
//!
//! Each ASR engine stores its output in its own column with its own shape:
//!
//! | Format              | Payload                                                    |
//! |---------------------|------------------------------------------------------------|
//! | `ConfidencePairs`   | `{"confidence": [["word", 0.9], ...]}`                     |
//! | `ConfidenceEntries` | `{"transcription": [{"word": "w", "confidence": 0.9}, ...]}` |
//! | `Words`             | plain transcript text                                      |
//! | `Phonemes`          | whitespace-delimited phoneme tokens                        |
//!
//! Confidences may be JSON numbers or numeric strings.

use crate::error::{Result, TranscriptError};
use crate::normalize::tokenize;
use crate::phoneme::{Phoneme, PhonemeMap};
use crate::table::CompositeKey;
use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize};

/// Payload shape of one engine column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranscriptFormat {
    /// JSON object with a `confidence` list of `[word, confidence]` pairs.
    ConfidencePairs,
    /// JSON object with a `transcription` list of `{word, confidence}` entries.
    ConfidenceEntries,
    /// Plain transcript text, tokenized like story text.
    Words,
    /// Pre-segmented phoneme tokens, used verbatim.
    Phonemes,
}

impl TranscriptFormat {
    /// Whether the payload carries per-word confidences.
    pub fn is_scored(self) -> bool {
        matches!(
            self,
            TranscriptFormat::ConfidencePairs | TranscriptFormat::ConfidenceEntries
        )
    }
}

/// An ASR engine: its column name in the ASR table and payload format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Engine {
    pub name: String,
    pub format: TranscriptFormat,
}

impl Engine {
    pub fn new(name: impl Into<String>, format: TranscriptFormat) -> Self {
        Self {
            name: name.into(),
            format,
        }
    }

    /// Parse this engine's payload and phonemize its words.
    ///
    /// `key` only labels errors.
    pub fn transcribe(
        &self,
        payload: &str,
        phoneme_map: &PhonemeMap,
        key: &CompositeKey,
    ) -> Result<Transcript> {
        let malformed = |source| TranscriptError::Malformed {
            engine: self.name.clone(),
            key: key.clone(),
            source,
        };

        let transcript = match self.format {
            TranscriptFormat::ConfidencePairs => {
                let scored = parse_confidence_pairs(payload).map_err(malformed)?;
                Transcript::scored(scored, phoneme_map)
            }
            TranscriptFormat::ConfidenceEntries => {
                let scored = parse_confidence_entries(payload).map_err(malformed)?;
                Transcript::scored(scored, phoneme_map)
            }
            TranscriptFormat::Words => {
                let word = tokenize(payload);
                let phoneme = phoneme_map.phonemize(&word);
                Transcript::Words { word, phoneme }
            }
            TranscriptFormat::Phonemes => Transcript::Phonemes {
                phoneme: payload.split_whitespace().map(str::to_owned).collect(),
            },
        };

        Ok(transcript)
    }
}

/// Engines present in the upstream ASR export, in processing order.
pub fn default_engines() -> Vec<Engine> {
    vec![
        Engine::new("amazon_data", TranscriptFormat::ConfidencePairs),
        Engine::new("kaldi_data", TranscriptFormat::ConfidenceEntries),
        Engine::new("kaldiNa_data", TranscriptFormat::ConfidenceEntries),
        Engine::new("wav2vec_transcript_words", TranscriptFormat::Words),
        Engine::new("wav2vec_transcript_phonemes", TranscriptFormat::Phonemes),
    ]
}

/// One engine's transcript inside a dataset record.
///
/// Every sequence in a variant is aligned 1:1 with `word` where present.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Transcript {
    Scored {
        word: Vec<String>,
        word_confidence: Vec<f64>,
        phoneme: Vec<Phoneme>,
    },
    Words {
        word: Vec<String>,
        phoneme: Vec<Phoneme>,
    },
    Phonemes {
        phoneme: Vec<String>,
    },
}

impl Transcript {
    fn scored(scored: ScoredWords, phoneme_map: &PhonemeMap) -> Self {
        let phoneme = phoneme_map.phonemize(&scored.words);
        Transcript::Scored {
            word: scored.words,
            word_confidence: scored.confidences,
            phoneme,
        }
    }

    /// Recognized words, empty for phoneme-only transcripts.
    pub fn words(&self) -> &[String] {
        match self {
            Transcript::Scored { word, .. } | Transcript::Words { word, .. } => word,
            Transcript::Phonemes { .. } => &[],
        }
    }

    /// Number of phoneme positions.
    pub fn phoneme_count(&self) -> usize {
        match self {
            Transcript::Scored { phoneme, .. } | Transcript::Words { phoneme, .. } => {
                phoneme.len()
            }
            Transcript::Phonemes { phoneme } => phoneme.len(),
        }
    }
}

/// Lowercased words with their confidences, aligned by position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoredWords {
    pub words: Vec<String>,
    pub confidences: Vec<f64>,
}

impl FromIterator<(String, f64)> for ScoredWords {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let (words, confidences) = iter
            .into_iter()
            .map(|(word, confidence)| (word.to_lowercase(), confidence))
            .unzip();

        Self { words, confidences }
    }
}

#[derive(Deserialize)]
struct PairsPayload {
    confidence: Vec<Pair>,
}

#[derive(Deserialize)]
struct Pair(String, #[serde(deserialize_with = "confidence")] f64);

#[derive(Deserialize)]
struct EntriesPayload {
    transcription: Vec<Entry>,
}

#[derive(Deserialize)]
struct Entry {
    word: String,
    #[serde(deserialize_with = "confidence")]
    confidence: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawConfidence {
    Number(f64),
    Text(String),
}

fn confidence<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    match RawConfidence::deserialize(deserializer)? {
        RawConfidence::Number(value) => Ok(value),
        RawConfidence::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid confidence value: {text:?}"))),
    }
}

/// Parse a `{"confidence": [[word, confidence], ...]}` payload.
pub fn parse_confidence_pairs(payload: &str) -> serde_json::Result<ScoredWords> {
    let payload: PairsPayload = serde_json::from_str(payload)?;
    Ok(payload
        .confidence
        .into_iter()
        .map(|Pair(word, confidence)| (word, confidence))
        .collect())
}

/// Parse a `{"transcription": [{"word": ..., "confidence": ...}, ...]}` payload.
pub fn parse_confidence_entries(payload: &str) -> serde_json::Result<ScoredWords> {
    let payload: EntriesPayload = serde_json::from_str(payload)?;
    Ok(payload
        .transcription
        .into_iter()
        .map(|entry| (entry.word, entry.confidence))
        .collect())
}
