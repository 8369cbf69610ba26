//! Integration tests for mispro CLI.

use clap::Parser;
use mispro::cli::{Cli, run_cli};
use mispro_dataset::dataset::Dataset;
use std::path::Path;

const LABELS: &str = "\
activityId,storyId,phraseIndex,word_index,expected_text,label
ACT1,9,0,0,the,0
ACT1,9,0,1,cat,1
ACT2,9,1,0,cat,1
";

const ASR: &str = r#"activityId,phraseIndex,story_text,amazon_data,kaldi_data,kaldiNa_data,wav2vec_transcript_words,wav2vec_transcript_phonemes
ACT1,0,The cat!,"{""confidence"": [[""The"", 0.9], [""cat"", ""0.8""]]}","{""transcription"": [{""word"": ""the"", ""confidence"": 1.0}]}","{""transcription"": []}",the cat,D u k @ t
ACT2,1,Cat.,"{""confidence"": [[""a"", 0.9], [""cat"", 0.8], [""sat"", 0.7]]}","{""transcription"": []}","{""transcription"": []}",cat,k @ t
"#;

const DICTIONARY: &str = "the DH AH\ncat K AE T\n";

const INVENTORY: &str = r#"{"DH": "D", "AH": "u", "K": "k", "AE": "@", "T": "t"}"#;

fn write_inputs(dir: &Path) {
    std::fs::write(dir.join("labels.csv"), LABELS).unwrap();
    std::fs::write(dir.join("asr.csv"), ASR).unwrap();
    std::fs::write(dir.join("words.dic"), DICTIONARY).unwrap();
    std::fs::write(dir.join("inventory.json"), INVENTORY).unwrap();
}

fn path_arg(dir: &Path, name: &str) -> String {
    dir.join(name).to_str().unwrap().to_owned()
}

#[test]
fn build_then_inspect() {
    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    let dir = temp_dir.path();
    write_inputs(dir);

    let output = path_arg(dir, "out/dataset.bin");

    let cli = Cli::parse_from([
        "mispro".to_owned(),
        "build".to_owned(),
        "--labels".to_owned(),
        path_arg(dir, "labels.csv"),
        "--asr".to_owned(),
        path_arg(dir, "asr.csv"),
        "--dictionary".to_owned(),
        path_arg(dir, "words.dic"),
        "--inventory".to_owned(),
        path_arg(dir, "inventory.json"),
        "-o".to_owned(),
        output.clone(),
    ]);

    run_cli(cli).expect("failed to build dataset");

    // ACT2 phrase has one word but three amazon words
    let dataset = Dataset::load(&output).expect("failed to load dataset");
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.get(1).unwrap().expected.word, "cat");
    assert_eq!(dataset.get(1).unwrap().expected.phoneme.as_deref(), Some("k@t"));

    let cli = Cli::parse_from(["mispro", "inspect", output.as_str(), "--record", "1"]);
    run_cli(cli).expect("failed to inspect dataset");
}

#[test]
fn inspect_rejects_unknown_record() {
    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    let output = temp_dir.path().join("empty.bin");
    Dataset::default().save(&output).unwrap();

    let cli = Cli::parse_from([
        "mispro",
        "inspect",
        output.to_str().unwrap(),
        "--record",
        "0",
    ]);

    let err = run_cli(cli).unwrap_err();
    assert!(err.to_string().contains("no record with id 0"));
}

#[test]
fn known_missing_drops_labels() {
    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    let dir = temp_dir.path();
    write_inputs(dir);

    let output = path_arg(dir, "dataset.bin");

    let cli = Cli::parse_from([
        "mispro".to_owned(),
        "build".to_owned(),
        "--labels".to_owned(),
        path_arg(dir, "labels.csv"),
        "--asr".to_owned(),
        path_arg(dir, "asr.csv"),
        "--dictionary".to_owned(),
        path_arg(dir, "words.dic"),
        "--inventory".to_owned(),
        path_arg(dir, "inventory.json"),
        "--output".to_owned(),
        output.clone(),
        "--known-missing".to_owned(),
        "ACT1:0".to_owned(),
    ]);

    run_cli(cli).expect("failed to build dataset");

    // ACT1 is excluded and ACT2 is an outlier
    let dataset = Dataset::load(&output).unwrap();
    assert!(dataset.is_empty());
}
