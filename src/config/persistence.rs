//! File persistence configuration

use std::path::PathBuf;

/// Directory path for storing scan history
pub const SCAN_HISTORY_PATH: &str = "scan_data";

/// Filename of the scan history file inside `SCAN_HISTORY_PATH`
pub const SCAN_HISTORY_FILENAME: &str = "scans.json";

/// Default location of the scan history file
/// Example: "scan_data/scans.json"
pub fn scan_history_path() -> PathBuf {
    PathBuf::from(SCAN_HISTORY_PATH).join(SCAN_HISTORY_FILENAME)
}
