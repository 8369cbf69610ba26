//! Joins cleaned label rows with their ASR rows into dataset records.

use crate::dataset::Dataset;
use crate::error::{AssemblyError, Result};
use crate::normalize::tokenize;
use crate::phoneme::{Phoneme, PhonemeMap};
use crate::table::{AsrRow, CompositeKey, LabelRow};
use crate::transcript::{Engine, Transcript, default_engines};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Default outlier ratio between a scored transcript and its phrase.
pub const DEFAULT_MAX_LENGTH_RATIO: usize = 2;

/// Expected word and its phonemes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expected {
    pub word: String,
    pub phoneme: Phoneme,
}

/// Identifies where the annotated word comes from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "activityId")]
    pub activity_id: String,
    #[serde(rename = "storyId")]
    pub story_id: String,
    #[serde(rename = "phraseIndex")]
    pub phrase_index: u32,
    pub word_index: u32,
}

/// Story phrase the word belongs to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Phrase {
    pub word: Vec<String>,
    pub phoneme: Vec<Phoneme>,
}

/// One training example: an annotated word with its phrase and every engine's transcript.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub expected: Expected,
    pub label: i64,
    pub metadata: Metadata,
    pub phrase: Phrase,
    /// Transcripts keyed by engine name.
    pub asr: BTreeMap<String, Transcript>,
}

/// Counts from one assembly pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    pub candidates: usize,
    pub kept: usize,
    pub outliers: usize,
}

/// Builds dataset records from cleaned tables.
pub struct DatasetAssembler<'a> {
    phoneme_map: &'a PhonemeMap,
    engines: Vec<Engine>,
    max_length_ratio: usize,
}

impl<'a> DatasetAssembler<'a> {
    /// Create an assembler with the default engines and outlier ratio.
    pub fn new(phoneme_map: &'a PhonemeMap) -> Self {
        Self {
            phoneme_map,
            engines: default_engines(),
            max_length_ratio: DEFAULT_MAX_LENGTH_RATIO,
        }
    }

    pub fn with_engines(mut self, engines: Vec<Engine>) -> Self {
        self.engines = engines;
        self
    }

    pub fn with_max_length_ratio(mut self, ratio: usize) -> Self {
        self.max_length_ratio = ratio;
        self
    }

    /// Assemble one record per label row, dropping outliers.
    ///
    /// Surviving records are numbered densely in label order.
    ///
    /// # Errors
    ///
    /// Fails if a label row has no ASR row, or an engine payload is missing
    /// or malformed.
    pub fn assemble(
        &self,
        labels: &[LabelRow],
        asr: &[AsrRow],
    ) -> Result<(Dataset, AssemblyReport)> {
        let index = AsrIndex::new(asr);
        let engines = self.ordered_engines();

        let records = labels
            .iter()
            .map(|label| self.assemble_row(label, &index, &engines))
            .filter_map(|record| record.transpose())
            .collect::<Result<Vec<_>>>()?;

        let report = AssemblyReport {
            candidates: labels.len(),
            kept: records.len(),
            outliers: labels.len() - records.len(),
        };

        tracing::info!(
            candidates = report.candidates,
            kept = report.kept,
            outliers = report.outliers,
            "dataset assembled"
        );

        Ok((Dataset::from_records(records), report))
    }

    /// Engines with the scored ones first, so an outlier skips parsing the rest.
    fn ordered_engines(&self) -> Vec<&Engine> {
        let (mut scored, unscored): (Vec<&Engine>, Vec<&Engine>) =
            self.engines.iter().partition(|e| e.format.is_scored());
        scored.extend(unscored);
        scored
    }

    /// Build the record for one label row, or `None` if it is an outlier.
    fn assemble_row(
        &self,
        label: &LabelRow,
        index: &AsrIndex,
        engines: &[&Engine],
    ) -> Result<Option<DatasetRecord>> {
        let key = label.key();
        let row = index
            .get(&key)
            .ok_or_else(|| AssemblyError::MissingAsrRow(key.clone()))?;

        let phrase_word = tokenize(&row.story_text);
        let phrase_phoneme = self.phoneme_map.phonemize(&phrase_word);
        let max_words = self.max_length_ratio.saturating_mul(phrase_word.len());

        let mut asr = BTreeMap::new();

        for &engine in engines {
            let payload = row
                .payload(&engine.name)
                .ok_or_else(|| AssemblyError::MissingPayload {
                    engine: engine.name.clone(),
                    key: key.clone(),
                })?;

            let transcript = engine.transcribe(payload, self.phoneme_map, &key)?;

            if engine.format.is_scored() && transcript.words().len() > max_words {
                return Ok(None);
            }

            asr.insert(engine.name.clone(), transcript);
        }

        Ok(Some(DatasetRecord {
            expected: Expected {
                word: label.expected_text.clone(),
                phoneme: self.phoneme_map.lookup(&label.expected_text).map(str::to_owned),
            },
            label: label.label,
            metadata: Metadata {
                activity_id: label.activity_id.clone(),
                story_id: label.story_id.clone(),
                phrase_index: label.phrase_index,
                word_index: label.word_index,
            },
            phrase: Phrase {
                word: phrase_word,
                phoneme: phrase_phoneme,
            },
            asr,
        }))
    }
}

/// ASR rows by composite key. The first row wins when keys repeat.
struct AsrIndex<'a> {
    rows: HashMap<&'a CompositeKey, &'a AsrRow>,
}

impl<'a> AsrIndex<'a> {
    fn new(asr: &'a [AsrRow]) -> Self {
        let mut rows: HashMap<&CompositeKey, &AsrRow> = HashMap::with_capacity(asr.len());
        let mut duplicates = 0usize;

        for row in asr {
            if rows.contains_key(&row.key) {
                duplicates += 1;
            } else {
                rows.insert(&row.key, row);
            }
        }

        if duplicates > 0 {
            tracing::warn!(duplicates, "duplicate ASR keys, keeping first occurrence");
        }

        Self { rows }
    }

    fn get(&self, key: &CompositeKey) -> Option<&'a AsrRow> {
        self.rows.get(key).copied()
    }
}
