//! Inspect subcommand - print the shape of a dataset artifact.

use color_eyre::Section;
use eyre::{Context, OptionExt, Result};
use mispro_dataset::dataset::Dataset;
use std::path::PathBuf;

/// CLI arguments for artifact inspection.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Path to dataset artifact
    pub path: PathBuf,

    /// Print the record with this id as JSON
    #[arg(short, long)]
    pub record: Option<usize>,
}

/// Resolved configuration for artifact inspection.
#[derive(Debug)]
pub struct Config {
    pub path: PathBuf,
    pub record: Option<usize>,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            path: args.path,
            record: args.record,
        }
    }
}

pub fn execute(config: Config) -> Result<()> {
    tracing::info!(path = ?config.path.display(), "loading dataset");

    let dataset = Dataset::load(&config.path)
        .wrap_err_with(|| format!("failed to load dataset: {:?}", config.path.display()))?;

    print!("{}", describe(&dataset)?);

    if let Some(id) = config.record {
        let record = dataset
            .get(id)
            .ok_or_eyre(format!("no record with id {id}"))
            .with_suggestion(|| format!("valid ids are 0..{}", dataset.len()))?;

        println!("{}", serde_json::to_string_pretty(record)?);
    }

    Ok(())
}

/// Summarize record count and the fields of the first record.
pub fn describe(dataset: &Dataset) -> Result<String> {
    let mut out = format!("records: {}\n", dataset.len());

    if let Some(first) = dataset.get(0) {
        let value = serde_json::to_value(first)?;
        let fields = value
            .as_object()
            .map(|object| object.keys().cloned().collect::<Vec<_>>())
            .unwrap_or_default();

        out.push_str(&format!("fields: {}\n", fields.join(", ")));

        let engines: Vec<&str> = first.asr.keys().map(String::as_str).collect();
        out.push_str(&format!("asr: {}\n", engines.join(", ")));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_empty_dataset() {
        let out = describe(&Dataset::default()).unwrap();
        assert_eq!(out, "records: 0\n");
    }
}
