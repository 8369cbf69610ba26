//! Label and ASR table rows and their CSV loaders.

use crate::error::{Result, TableError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

const ACTIVITY_ID: &str = "activityId";
const PHRASE_INDEX: &str = "phraseIndex";
const PHRASE_INDEX_ALIAS: &str = "phrase_index";
const STORY_TEXT: &str = "story_text";

const LABEL_COLUMNS: [&str; 6] = [
    ACTIVITY_ID,
    "storyId",
    PHRASE_INDEX,
    "word_index",
    "expected_text",
    "label",
];

/// Join key between label rows and ASR rows.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey {
    pub activity_id: String,
    pub phrase_index: u32,
}

impl CompositeKey {
    pub fn new(activity_id: impl Into<String>, phrase_index: u32) -> Self {
        Self {
            activity_id: activity_id.into(),
            phrase_index,
        }
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.activity_id, self.phrase_index)
    }
}

/// Failed to parse a `ACTIVITY:PHRASE` key.
#[derive(Debug, thiserror::Error)]
#[error("expected ACTIVITY:PHRASE, got {0:?}")]
pub struct ParseKeyError(String);

impl FromStr for CompositeKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (activity_id, phrase_index) = s
            .rsplit_once(':')
            .filter(|(id, _)| !id.is_empty())
            .ok_or_else(|| ParseKeyError(s.to_owned()))?;

        let phrase_index = phrase_index
            .parse()
            .map_err(|_| ParseKeyError(s.to_owned()))?;

        Ok(Self::new(activity_id, phrase_index))
    }
}

/// One annotated word from the label table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelRow {
    #[serde(rename = "activityId")]
    pub activity_id: String,
    #[serde(rename = "storyId")]
    pub story_id: String,
    #[serde(rename = "phraseIndex")]
    pub phrase_index: u32,
    pub word_index: u32,
    pub expected_text: String,
    pub label: i64,
}

impl LabelRow {
    pub fn key(&self) -> CompositeKey {
        CompositeKey::new(self.activity_id.clone(), self.phrase_index)
    }
}

/// ASR table row as read from disk. Empty fields are `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawAsrRow {
    pub activity_id: Option<String>,
    pub phrase_index: Option<u32>,
    pub story_text: Option<String>,
    /// Engine payload columns by header name.
    pub payloads: BTreeMap<String, Option<String>>,
}

impl RawAsrRow {
    /// Key of this row, if both parts are present.
    pub fn key(&self) -> Option<CompositeKey> {
        let activity_id = self.activity_id.as_ref()?;
        Some(CompositeKey::new(activity_id.clone(), self.phrase_index?))
    }

    /// Whether every field of the row is populated.
    pub fn is_complete(&self) -> bool {
        self.activity_id.is_some()
            && self.phrase_index.is_some()
            && self.story_text.is_some()
            && self.payloads.values().all(Option::is_some)
    }

    /// Convert into a fully populated row, or `None` if any field is missing.
    pub fn into_complete(self) -> Option<AsrRow> {
        let key = self.key()?;
        let story_text = self.story_text?;
        let payloads = self
            .payloads
            .into_iter()
            .map(|(column, value)| value.map(|v| (column, v)))
            .collect::<Option<_>>()?;

        Some(AsrRow {
            key,
            story_text,
            payloads,
        })
    }
}

/// ASR table row with every field present.
#[derive(Clone, Debug, PartialEq)]
pub struct AsrRow {
    pub key: CompositeKey,
    pub story_text: String,
    pub payloads: BTreeMap<String, String>,
}

impl AsrRow {
    /// Raw payload for one engine column.
    pub fn payload(&self, engine: &str) -> Option<&str> {
        self.payloads.get(engine).map(String::as_str)
    }
}

/// Position of the first header matching any of `names`.
fn require_column(
    headers: &csv::StringRecord,
    table: &'static str,
    names: &[&str],
) -> std::result::Result<usize, TableError> {
    headers
        .iter()
        .position(|h| names.contains(&h))
        .ok_or_else(|| TableError::MissingColumn {
            table,
            column: names[0].to_owned(),
        })
}

/// Read the label table from CSV.
pub fn read_labels<R: Read>(reader: R) -> Result<Vec<LabelRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr.headers()?;
    for column in LABEL_COLUMNS {
        require_column(headers, "labels", &[column])?;
    }

    let rows = rdr
        .deserialize::<LabelRow>()
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Read the ASR table from CSV.
///
/// `activityId`, `phraseIndex` (or `phrase_index`) and `story_text` are
/// required columns; every other column is kept as an engine payload.
pub fn read_asr<R: Read>(reader: R) -> Result<Vec<RawAsrRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();

    let activity_col = require_column(&headers, "asr", &[ACTIVITY_ID])?;
    let phrase_col = require_column(&headers, "asr", &[PHRASE_INDEX, PHRASE_INDEX_ALIAS])?;
    let story_col = require_column(&headers, "asr", &[STORY_TEXT])?;

    let payload_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| ![activity_col, phrase_col, story_col].contains(i))
        .map(|(i, h)| (i, h.to_owned()))
        .collect();

    let mut rows = Vec::new();

    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let field = |i: usize| record.get(i).filter(|v| !v.is_empty()).map(str::to_owned);

        let phrase_index = field(phrase_col)
            .map(|value| {
                value.trim().parse::<u32>().map_err(|_| TableError::InvalidField {
                    table: "asr",
                    row,
                    column: PHRASE_INDEX,
                    value,
                })
            })
            .transpose()?;

        rows.push(RawAsrRow {
            activity_id: field(activity_col),
            phrase_index,
            story_text: field(story_col),
            payloads: payload_cols
                .iter()
                .map(|(i, name)| (name.clone(), field(*i)))
                .collect(),
        });
    }

    tracing::debug!(rows = rows.len(), columns = headers.len(), "asr table read");

    Ok(rows)
}

pub fn load_labels<P: AsRef<Path>>(path: P) -> Result<Vec<LabelRow>> {
    let file = std::fs::File::open(path).map_err(TableError::Io)?;
    read_labels(file)
}

pub fn load_asr<P: AsRef<Path>>(path: P) -> Result<Vec<RawAsrRow>> {
    let file = std::fs::File::open(path).map_err(TableError::Io)?;
    read_asr(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const LABELS: &str = "\
activityId,storyId,phraseIndex,word_index,expected_text,label
A1,7,0,0,The,0
A1,7,0,1,cat,1
";

    const ASR: &str = "\
activityId,phrase_index,story_text,amazon_data,wav2vec_transcript_words
A1,0,The cat.,\"{\"\"confidence\"\": []}\",the cat
A2,,Missing index,{},x
A3,1,,{},
";

    #[test]
    fn reads_label_rows() {
        let rows = read_labels(LABELS.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].expected_text, "cat");
        assert_eq!(rows[1].label, 1);
        assert_eq!(rows[0].key(), CompositeKey::new("A1", 0));
    }

    #[test]
    fn rejects_missing_label_column() {
        let input = "activityId,storyId,phraseIndex,word_index,label\nA1,7,0,0,1\n";
        let result = read_labels(input.as_bytes());

        match result {
            Err(Error::Table(TableError::MissingColumn { table, column })) => {
                assert_eq!(table, "labels");
                assert_eq!(column, "expected_text");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn reads_asr_rows_with_alias_header() {
        let rows = read_asr(ASR.as_bytes()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].key(), Some(CompositeKey::new("A1", 0)));
        assert_eq!(rows[0].story_text.as_deref(), Some("The cat."));
        assert_eq!(
            rows[0].payloads["amazon_data"].as_deref(),
            Some(r#"{"confidence": []}"#)
        );
        assert!(rows[0].is_complete());
    }

    #[test]
    fn empty_fields_are_missing() {
        let rows = read_asr(ASR.as_bytes()).unwrap();

        assert_eq!(rows[1].phrase_index, None);
        assert_eq!(rows[1].key(), None);
        assert!(!rows[1].is_complete());

        assert_eq!(rows[2].story_text, None);
        assert_eq!(rows[2].payloads["wav2vec_transcript_words"], None);
        assert!(rows[2].clone().into_complete().is_none());
    }

    #[test]
    fn complete_row_converts() {
        let rows = read_asr(ASR.as_bytes()).unwrap();
        let row = rows[0].clone().into_complete().unwrap();

        assert_eq!(row.key, CompositeKey::new("A1", 0));
        assert_eq!(row.payload("wav2vec_transcript_words"), Some("the cat"));
        assert_eq!(row.payload("kaldi_data"), None);
    }

    #[test]
    fn rejects_missing_story_column() {
        let result = read_asr("activityId,phraseIndex\nA1,0\n".as_bytes());

        match result {
            Err(Error::Table(TableError::MissingColumn { table, column })) => {
                assert_eq!(table, "asr");
                assert_eq!(column, STORY_TEXT);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_non_numeric_phrase_index() {
        let result = read_asr("activityId,phraseIndex,story_text\nA1,two,hi\n".as_bytes());
        assert!(matches!(
            result,
            Err(Error::Table(TableError::InvalidField { row: 0, .. }))
        ));
    }

    #[test]
    fn parses_composite_key() {
        let key: CompositeKey = "98D5EDA1373C11EC89641635D148:4".parse().unwrap();

        assert_eq!(key.activity_id, "98D5EDA1373C11EC89641635D148");
        assert_eq!(key.phrase_index, 4);
        assert_eq!(key.to_string(), "98D5EDA1373C11EC89641635D148:4");
    }

    #[test]
    fn rejects_malformed_key() {
        assert!("A1".parse::<CompositeKey>().is_err());
        assert!(":4".parse::<CompositeKey>().is_err());
        assert!("A1:x".parse::<CompositeKey>().is_err());
    }
}
