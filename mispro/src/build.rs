//! Build subcommand - assemble the dataset artifact from input tables.

use color_eyre::Section;
use eyre::{Context, Result, eyre};
use mispro_dataset::assemble::DEFAULT_MAX_LENGTH_RATIO;
use mispro_dataset::clean::default_known_defects;
use mispro_dataset::pipeline::{
    BuildReport, DEFAULT_ASR_PATH, DEFAULT_DICTIONARY_PATH, DEFAULT_INVENTORY_PATH,
    DEFAULT_LABELS_PATH, DEFAULT_OUTPUT_PATH, PipelineConfig, build_dataset,
};
use mispro_dataset::table::CompositeKey;
use std::path::PathBuf;

/// Input file locations.
#[derive(clap::Args, Clone, Debug)]
pub struct InputArgs {
    /// Label table (CSV)
    #[arg(long, default_value = DEFAULT_LABELS_PATH)]
    pub labels: PathBuf,

    /// ASR transcript table (CSV)
    #[arg(long, default_value = DEFAULT_ASR_PATH)]
    pub asr: PathBuf,

    /// Pronunciation dictionary, one `word PHONE...` entry per line
    #[arg(long, default_value = DEFAULT_DICTIONARY_PATH)]
    pub dictionary: PathBuf,

    /// Phone inventory translation table (JSON)
    #[arg(long, default_value = DEFAULT_INVENTORY_PATH)]
    pub inventory: PathBuf,
}

/// Cleaning and outlier rules.
#[derive(clap::Args, Clone, Debug)]
pub struct FilterArgs {
    /// Extra key missing from the ASR table; its labels are dropped
    #[arg(long, value_name = "ACTIVITY:PHRASE")]
    pub known_missing: Vec<CompositeKey>,

    /// Do not apply the built-in list of known missing keys
    #[arg(long)]
    pub no_default_defects: bool,

    /// Drop a record when a scored transcript exceeds this many times the phrase length
    #[arg(long, default_value_t = DEFAULT_MAX_LENGTH_RATIO)]
    pub max_length_ratio: usize,
}

/// CLI arguments for dataset building.
#[derive(clap::Args, Debug)]
pub struct Args {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Output artifact path
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Print a build summary to stdout
    #[arg(long)]
    pub preview: bool,
}

/// Resolved configuration for dataset building.
#[derive(Debug)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub preview: bool,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        if args.filter.max_length_ratio == 0 {
            return Err(eyre!("--max-length-ratio must be at least 1"));
        }

        let mut known_defects = if args.filter.no_default_defects {
            Vec::new()
        } else {
            default_known_defects()
        };

        for key in args.filter.known_missing {
            if !known_defects.contains(&key) {
                known_defects.push(key);
            }
        }

        let pipeline = PipelineConfig {
            labels: args.inputs.labels,
            asr: args.inputs.asr,
            dictionary: args.inputs.dictionary,
            inventory: args.inputs.inventory,
            output: args.output,
            known_defects,
            max_length_ratio: args.filter.max_length_ratio,
            ..PipelineConfig::default()
        };

        Ok(Self {
            pipeline,
            preview: args.preview,
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    let pipeline = &config.pipeline;

    for (flag, path) in [
        ("--labels", &pipeline.labels),
        ("--asr", &pipeline.asr),
        ("--dictionary", &pipeline.dictionary),
        ("--inventory", &pipeline.inventory),
    ] {
        if !path.is_file() {
            let e = eyre!("input not found: {:?}", path.display())
                .suggestion(format!("pass the file location with {flag} <PATH>"));
            return Err(e);
        }
    }

    tracing::info!(
        output = ?pipeline.output.display(),
        known_defects = pipeline.known_defects.len(),
        "building dataset"
    );

    let (_, report) = build_dataset(pipeline)
        .wrap_err("dataset build failed")
        .note("no output was written; fix the input and rerun")?;

    tracing::info!(records = report.assembly.kept, "build completed");

    if config.preview {
        print!("{}", format_report(&report, pipeline));
    }

    Ok(())
}

/// Render a build report as plain text.
fn format_report(report: &BuildReport, pipeline: &PipelineConfig) -> String {
    let cleaning = &report.cleaning;
    let assembly = &report.assembly;

    format!(
        "asr rows dropped:   {}\n\
         label rows dropped: {}\n\
         candidates:         {}\n\
         outliers:           {}\n\
         records:            {}\n\
         written:            {} ({} bytes)\n",
        cleaning.asr_dropped,
        cleaning.labels_dropped,
        assembly.candidates,
        assembly.outliers,
        assembly.kept,
        pipeline.output.display(),
        report.bytes,
    )
}
