//! Database assembly and persistence.
//!
//! A database file is a JSON array: the header object first, then one object
//! per record in harvest order.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::models::Record;
use crate::settings::Settings;

/// Written into every header as `creator`.
pub const CREATOR: &str = "https://github.com/thingsiplay/protondb_scraper";

/// Run metadata stored as the first database element.
///
/// Keys keep insertion order: `creator`, `timestamp`, any addenda, then every
/// setting. A setting with the same name as an addendum replaces its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    fields: Map<String, Value>,
}

impl Header {
    pub fn new(
        settings: &Settings,
        created_at: DateTime<Utc>,
        addenda: Option<Map<String, Value>>,
    ) -> Result<Self, AppError> {
        let mut fields = Map::new();
        fields.insert("creator".into(), Value::from(CREATOR));
        fields.insert(
            "timestamp".into(),
            Value::from(created_at.format("%Y-%m-%d %H:%M:%S%.6f").to_string()),
        );
        if let Some(addenda) = addenda {
            fields.extend(addenda);
        }
        fields.extend(settings.to_map()?);
        Ok(Self { fields })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl Serialize for Header {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// Header followed by every harvested record.
#[derive(Debug, Clone, PartialEq)]
pub struct Database {
    pub header: Header,
    pub records: Vec<Record>,
}

impl Database {
    /// Number of array elements, header included.
    pub fn len(&self) -> usize {
        self.records.len() + 1
    }

    /// Never true: the header is always present.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

impl Serialize for Database {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        seq.serialize_element(&self.header)?;
        for record in &self.records {
            seq.serialize_element(record)?;
        }
        seq.end()
    }
}

/// Prepend a header built from `settings` to the harvested records.
pub fn assemble(
    records: Vec<Record>,
    settings: &Settings,
    addenda: Option<Map<String, Value>>,
) -> Result<Database, AppError> {
    Ok(Database {
        header: Header::new(settings, Utc::now(), addenda)?,
        records,
    })
}

/// Pretty JSON with 4-space indentation, keys in insertion order.
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write the database to `output`.
///
/// Returns the absolute path of the written file, or `None` when there is no
/// output path or the file could not be written. Write failures are logged,
/// not returned: the run's results are still reported.
pub fn write_database(database: &Database, output: Option<&str>) -> Option<PathBuf> {
    let path = Path::new(output.filter(|o| !o.is_empty())?);
    match try_write(database, path) {
        Ok(written) => Some(written),
        Err(e) => {
            tracing::warn!("{e}");
            None
        }
    }
}

fn try_write(database: &Database, path: &Path) -> Result<PathBuf, AppError> {
    let json = to_json_pretty(database)?;
    let write_error = |e: io::Error| {
        let message = match e.kind() {
            io::ErrorKind::IsADirectory => "path is a directory".to_string(),
            io::ErrorKind::PermissionDenied => "permission denied".to_string(),
            _ => e.to_string(),
        };
        AppError::WriteError {
            path: path.to_path_buf(),
            message,
        }
    };

    std::fs::write(path, json).map_err(write_error)?;
    std::path::absolute(path).map_err(write_error)
}
