//! mispro-dataset: builds mispronunciation-detection training records.
//!
//! Every annotated word in the label table becomes one [`assemble::DatasetRecord`]
//! that pairs the expected word with its story phrase and the transcripts of
//! several ASR engines, all converted to phonemes.
//!
//! # Pipeline
//!
//! 1. [`table`]: read the label and ASR tables
//! 2. [`clean`]: drop rows whose composite key has missing data on either side
//! 3. [`phoneme`]: build the word to phoneme map from a pronunciation dictionary
//! 4. [`assemble`]: join, parse transcripts, phonemize, drop outliers
//! 5. [`dataset`]: save the dense record collection as a binary artifact
//!
//! # Quick Start
//!
//! ```no_run
//! use mispro_dataset::pipeline::{PipelineConfig, build_dataset};
//!
//! # fn main() -> mispro_dataset::error::Result<()> {
//! let (dataset, report) = build_dataset(&PipelineConfig::default())?;
//! println!("{} records, {} outliers", dataset.len(), report.assembly.outliers);
//! # Ok(())
//! # }
//! ```

pub mod assemble;
pub mod clean;
pub mod dataset;
pub mod error;
pub mod normalize;
pub mod phoneme;
pub mod pipeline;
pub mod table;
pub mod transcript;
