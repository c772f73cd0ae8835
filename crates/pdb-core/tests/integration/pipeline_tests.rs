use chrono::NaiveDate;
use pdb_core::settings::resolve_on;
use pdb_core::{SettingsOverrides, assemble, build_page_targets, write_database};
use serde_json::Value;

use crate::common::{config_dir, sample_records};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 3, 4).unwrap()
}

#[test]
fn config_file_drives_page_urls() {
    let (_dir, path) = config_dir(
        r#"{"source": "http://localhost:9000/explore", "maxpages": 3, "initpage": 5, "sort": "playerCount"}"#,
    );
    let overrides = SettingsOverrides {
        config: Some(path),
        ..Default::default()
    };

    let settings = resolve_on(&overrides, day()).unwrap();
    let targets = build_page_targets(&settings);

    let urls: Vec<&str> = targets.iter().map(|t| t.url.as_str()).collect();
    assert_eq!(
        urls,
        [
            "http://localhost:9000/explore?page=5&sort=playerCount",
            "http://localhost:9000/explore?page=6&sort=playerCount",
            "http://localhost:9000/explore?page=7&sort=playerCount",
        ]
    );
}

#[test]
fn missing_config_still_resolves() {
    let dir = tempfile::tempdir().unwrap();
    let overrides = SettingsOverrides {
        config: Some(dir.path().join("absent.json")),
        native: Some(true),
        ..Default::default()
    };

    let settings = resolve_on(&overrides, day()).unwrap();

    assert!(settings.native);
    assert_eq!(
        settings.output.as_deref(),
        Some("protondb-wilsonRating-2021-03-04.json")
    );
}

#[test]
fn database_round_trip_echoes_settings() {
    let (dir, path) = config_dir(r#"{"comment": "weekly run", "pagedown": 12}"#);
    let output = dir.path().join("out.json");
    let overrides = SettingsOverrides {
        config: Some(path),
        output: Some(output.to_string_lossy().into_owned()),
        ..Default::default()
    };
    let settings = resolve_on(&overrides, day()).unwrap();

    let database = assemble(sample_records(4), &settings, None).unwrap();
    let written = write_database(&database, settings.output.as_deref()).unwrap();

    let parsed: Vec<Value> =
        serde_json::from_str(&std::fs::read_to_string(written).unwrap()).unwrap();
    assert_eq!(parsed.len() - 1, 4);
    let header = parsed[0].as_object().unwrap();
    assert_eq!(header["comment"], Value::from("weekly run"));
    assert_eq!(header["pagedown"], Value::from(12));
    for record in &parsed[1..] {
        let mut keys: Vec<&str> = record
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        assert_eq!(keys, ["appid", "rating", "reports", "title"]);
    }
}

#[test]
fn zero_records_still_has_header() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("empty.json");
    let overrides = SettingsOverrides {
        output: Some(output.to_string_lossy().into_owned()),
        ..Default::default()
    };
    let settings = resolve_on(&overrides, day()).unwrap();

    let database = assemble(Vec::new(), &settings, None).unwrap();
    let written = write_database(&database, settings.output.as_deref()).unwrap();

    let parsed: Vec<Value> =
        serde_json::from_str(&std::fs::read_to_string(written).unwrap()).unwrap();
    assert_eq!(parsed.len(), 1);
    assert!(parsed[0].get("creator").is_some());
}
