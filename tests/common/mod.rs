//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use plagio::config::AppConfig;

pub const TOPICS: &[&str] = &[
    "history",
    "biology",
    "physics",
    "poetry",
    "music",
    "economics",
    "chemistry",
    "geology",
    "painting",
    "astronomy",
    "botany",
    "sculpture",
    "algebra",
    "ethics",
    "linguistics",
];

/// Rows alternate between copied pairs (label 1) and unrelated pairs (label 0).
pub fn dataset_rows() -> Vec<String> {
    TOPICS
        .iter()
        .flat_map(|topic| {
            [
                format!(
                    "The student copied the essay on {topic}.\tA student copied an essay about {topic}.\t1"
                ),
                format!(
                    "Markets rallied after the {topic} report.\tRain is expected over the {topic} valley.\t0"
                ),
            ]
        })
        .collect()
}

pub fn write_dataset(dir: &Path, rows: &[String]) -> PathBuf {
    let path = dir.join("plagiarism_dataset.txt");
    let mut content = rows.join("\n");
    content.push('\n');
    fs::write(&path, content).unwrap();
    path
}

/// Config pointing at a fresh dataset and model directory under `dir`.
pub fn config_in(dir: &Path) -> AppConfig {
    let data_path = write_dataset(dir, &dataset_rows());
    AppConfig {
        data_path,
        model_dir: dir.join("model"),
        ..AppConfig::default()
    }
}
