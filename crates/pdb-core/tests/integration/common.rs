use std::io::Write;
use std::path::PathBuf;

use pdb_core::Record;
use tempfile::TempDir;

/// Temporary directory holding a config file with the given JSON.
pub fn config_dir(json: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("pdbscraper.json");
    let mut file = std::fs::File::create(&path).expect("create config file");
    file.write_all(json.as_bytes()).expect("write config file");
    (dir, path)
}

pub fn sample_records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| Record {
            identifier: format!("{}", 1000 + i),
            title: format!("Game {i}"),
            rating: "Platinum".into(),
            report_count: format!("{}", i * 3),
        })
        .collect()
}
