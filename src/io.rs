use std::time::Duration;

use chrono::{NaiveDateTime, Utc};
use serde::de::DeserializeOwned;

use crate::error::LoadError;

pub type UserId = u64;
pub type ItemId = u64;
pub type Score = f64;

/// Bookkeeping about a loaded snapshot, rendered on the status page.
pub struct SnapshotStats {
    pub descriptive_name: String,
    pub qty_records: usize,
    pub qty_unique_keys: usize,
    pub load_duration: Duration,
    pub loaded_at: NaiveDateTime,
}

impl SnapshotStats {
    pub fn new(
        descriptive_name: &str,
        qty_records: usize,
        qty_unique_keys: usize,
        load_duration: Duration,
    ) -> Self {
        SnapshotStats {
            descriptive_name: descriptive_name.to_string(),
            qty_records,
            qty_unique_keys,
            load_duration,
            loaded_at: Utc::now().naive_utc(),
        }
    }

    pub fn in_memory(qty_records: usize, qty_unique_keys: usize) -> Self {
        SnapshotStats::new("in-memory", qty_records, qty_unique_keys, Duration::default())
    }
}

/// Reads every record of a comma separated snapshot with a header row.
/// Columns are matched by header name, extra columns are ignored.
pub fn read_snapshot<T: DeserializeOwned>(path: &str) -> Result<Vec<T>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|err| LoadError::from_csv(path, err))?;

    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record: T = result.map_err(|err| LoadError::from_csv(path, err))?;
        records.push(record);
    }
    Ok(records)
}
