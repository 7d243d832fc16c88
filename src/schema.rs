use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::Result;
use crate::ExecutionMode;

/// Elapsed wall-clock seconds, one entry per timed execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSample {
    pub times: Vec<f64>,
}

/// Samples for one variant, keyed by mode (`base`, `cpu`, `full`).
pub type ModeResults = BTreeMap<ExecutionMode, RunSample>;

/// Variant identifier -> per-mode samples. This is the whole report document.
pub type ResultSet = BTreeMap<String, ModeResults>;

pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

pub fn report_path(output_dir: &Path, timestamp: u64) -> PathBuf {
    output_dir.join(format!("{timestamp}.json"))
}

/// Write `results` as indented JSON to `<output_dir>/<timestamp>.json`.
///
/// The document is staged in a temporary file in the same directory and then
/// renamed, so a reader never sees a half-written report.
pub fn write_report(results: &ResultSet, output_dir: &Path, timestamp: u64) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(results)?;
    let path = report_path(output_dir, timestamp);

    let mut tmp = NamedTempFile::new_in(output_dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(&path).map_err(|e| e.error)?;

    Ok(path)
}

#[cfg(test)]
pub fn read_report(path: &Path) -> Result<ResultSet> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}
