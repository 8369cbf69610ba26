//! Cross-table cleaning of label and ASR rows.
//!
//! An ASR row with any empty field is unusable, and so is every label row
//! that points at it. Cleaning drops both sides so that the assembler only
//! ever sees label rows whose composite key resolves to a complete ASR row.

use crate::table::{AsrRow, CompositeKey, LabelRow, RawAsrRow};
use std::collections::HashSet;

/// Upstream key missing from the ASR table entirely.
pub const KNOWN_MISSING_ASR_KEY: (&str, u32) = ("98D5EDA1373C11EC89641635D148", 4);

/// Keys known to be absent from the ASR table.
pub fn default_known_defects() -> Vec<CompositeKey> {
    let (activity_id, phrase_index) = KNOWN_MISSING_ASR_KEY;
    vec![CompositeKey::new(activity_id, phrase_index)]
}

/// Row counts removed by [`clean_tables`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CleaningReport {
    pub asr_dropped: usize,
    pub labels_dropped: usize,
    pub known_defects: usize,
}

/// Tables after cleaning.
#[derive(Clone, Debug)]
pub struct CleanedTables {
    pub labels: Vec<LabelRow>,
    pub asr: Vec<AsrRow>,
    pub report: CleaningReport,
}

/// Drop incomplete ASR rows and every label row sharing their key.
///
/// `known_defects` adds keys that must be treated as missing even though no
/// ASR row mentions them. Label order is preserved.
pub fn clean_tables(
    labels: Vec<LabelRow>,
    asr: Vec<RawAsrRow>,
    known_defects: &[CompositeKey],
) -> CleanedTables {
    let asr_total = asr.len();
    let mut missing: HashSet<CompositeKey> = HashSet::new();
    let mut complete = Vec::with_capacity(asr_total);

    for row in asr {
        if row.is_complete() {
            complete.extend(row.into_complete());
        } else if let Some(key) = row.key() {
            missing.insert(key);
        }
    }

    missing.extend(known_defects.iter().cloned());

    let labels_total = labels.len();
    let labels: Vec<LabelRow> = labels
        .into_iter()
        .filter(|row| !missing.contains(&row.key()))
        .collect();

    let report = CleaningReport {
        asr_dropped: asr_total - complete.len(),
        labels_dropped: labels_total - labels.len(),
        known_defects: known_defects.len(),
    };

    tracing::info!(
        asr_dropped = report.asr_dropped,
        labels_dropped = report.labels_dropped,
        known_defects = report.known_defects,
        "tables cleaned"
    );

    CleanedTables {
        labels,
        asr: complete,
        report,
    }
}
