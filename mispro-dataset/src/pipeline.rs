//! End-to-end dataset build: load, clean, map, assemble, save.

use crate::assemble::{AssemblyReport, DEFAULT_MAX_LENGTH_RATIO, DatasetAssembler};
use crate::clean::{CleaningReport, clean_tables, default_known_defects};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::phoneme::PhonemeMap;
use crate::table::{CompositeKey, load_asr, load_labels};
use crate::transcript::{Engine, default_engines};
use std::path::PathBuf;
use std::time::Instant;

/// Default label table path
pub const DEFAULT_LABELS_PATH: &str = "./data/labels.csv";

/// Default ASR table path
pub const DEFAULT_ASR_PATH: &str = "./data/asr_data.csv";

/// Default pronunciation dictionary path
pub const DEFAULT_DICTIONARY_PATH: &str = "./data/all_story_words.dic";

/// Default phone inventory path
pub const DEFAULT_INVENTORY_PATH: &str = "./data/arpabet_to_amirabet.json";

/// Default artifact path
pub const DEFAULT_OUTPUT_PATH: &str = "./dataset/dataset.bin";

/// Inputs, output and filtering rules of one dataset build.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub labels: PathBuf,
    pub asr: PathBuf,
    pub dictionary: PathBuf,
    pub inventory: PathBuf,
    pub output: PathBuf,
    /// Keys treated as missing from the ASR table.
    pub known_defects: Vec<CompositeKey>,
    pub engines: Vec<Engine>,
    pub max_length_ratio: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            labels: DEFAULT_LABELS_PATH.into(),
            asr: DEFAULT_ASR_PATH.into(),
            dictionary: DEFAULT_DICTIONARY_PATH.into(),
            inventory: DEFAULT_INVENTORY_PATH.into(),
            output: DEFAULT_OUTPUT_PATH.into(),
            known_defects: default_known_defects(),
            engines: default_engines(),
            max_length_ratio: DEFAULT_MAX_LENGTH_RATIO,
        }
    }
}

/// Summary of a finished build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildReport {
    pub cleaning: CleaningReport,
    pub assembly: AssemblyReport,
    pub bytes: usize,
}

/// Build the dataset described by `config` and write it to `config.output`.
///
/// Nothing is written unless every stage succeeds.
pub fn build_dataset(config: &PipelineConfig) -> Result<(Dataset, BuildReport)> {
    let s = Instant::now();

    tracing::info!(
        labels = ?config.labels.display(),
        asr = ?config.asr.display(),
        "loading tables"
    );
    let labels = load_labels(&config.labels)?;
    let asr = load_asr(&config.asr)?;

    tracing::info!(elapsed = %format_secs(s), "building phoneme map");
    let phoneme_map = PhonemeMap::from_files(&config.dictionary, &config.inventory)?;
    if phoneme_map.is_empty() {
        tracing::warn!(path = ?config.dictionary.display(), "dictionary has no entries");
    }

    tracing::info!(
        words = phoneme_map.len(),
        elapsed = %format_secs(s),
        "cleaning data"
    );
    let cleaned = clean_tables(labels, asr, &config.known_defects);

    tracing::info!(elapsed = %format_secs(s), "building dataset");
    let (dataset, assembly) = DatasetAssembler::new(&phoneme_map)
        .with_engines(config.engines.clone())
        .with_max_length_ratio(config.max_length_ratio)
        .assemble(&cleaned.labels, &cleaned.asr)?;

    tracing::info!(
        samples = dataset.len(),
        elapsed = %format_secs(s),
        "dataset complete"
    );

    tracing::info!(path = ?config.output.display(), "saving dataset");
    let bytes = dataset.save(&config.output)?;

    tracing::info!(bytes, elapsed = %format_secs(s), "dataset saved");

    let report = BuildReport {
        cleaning: cleaned.report,
        assembly,
        bytes,
    };

    Ok((dataset, report))
}

/// Format elapsed seconds since `start` with two decimal places.
fn format_secs(start: Instant) -> String {
    format!("{:.2}s", start.elapsed().as_secs_f32())
}
