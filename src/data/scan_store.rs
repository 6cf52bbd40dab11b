use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};

use crate::config::debug::PRINT_STORE_EVENTS;
use crate::config::scan_history_path;
use crate::models::ScanRecord;

/// Storage for past scans. Records carry only analysis inputs.
pub trait ScanStore: Send + Sync {
    /// Persist a record and return it with its assigned id
    fn create(&self, record: ScanRecord) -> Result<ScanRecord>;
    /// Newest first
    fn list(&self) -> Result<Vec<ScanRecord>>;
    fn get(&self, id: u64) -> Result<Option<ScanRecord>>;
    /// Returns whether a record was removed
    fn delete(&self, id: u64) -> Result<bool>;
}

fn next_id(records: &[ScanRecord]) -> u64 {
    records.iter().map(|r| r.id).max().unwrap_or(0) + 1
}

fn newest_first(mut records: Vec<ScanRecord>) -> Vec<ScanRecord> {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    records
}

#[derive(Debug, Default)]
pub struct MemoryScanStore {
    records: Mutex<Vec<ScanRecord>>,
}

impl MemoryScanStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<ScanRecord>>> {
        self.records
            .lock()
            .map_err(|_| anyhow!("Scan store lock poisoned"))
    }
}

impl ScanStore for MemoryScanStore {
    fn create(&self, mut record: ScanRecord) -> Result<ScanRecord> {
        let mut records = self.lock()?;
        record.id = next_id(&records);
        records.push(record.clone());
        Ok(record)
    }

    fn list(&self) -> Result<Vec<ScanRecord>> {
        Ok(newest_first(self.lock()?.clone()))
    }

    fn get(&self, id: u64) -> Result<Option<ScanRecord>> {
        Ok(self.lock()?.iter().find(|r| r.id == id).cloned())
    }

    fn delete(&self, id: u64) -> Result<bool> {
        let mut records = self.lock()?;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() != before)
    }
}

/// Whole history in one JSON array, rewritten on every change.
#[derive(Debug)]
pub struct JsonFileScanStore {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process
    guard: Mutex<()>,
}

impl JsonFileScanStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn default_path() -> PathBuf {
        scan_history_path()
    }

    fn load(&self) -> Result<Vec<ScanRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&self.path)
            .context(format!("Failed to open scan history: {}", self.path.display()))?;
        let reader = BufReader::new(file);
        let records = serde_json::from_reader(reader)
            .context(format!("Failed to parse scan history: {}", self.path.display()))?;
        Ok(records)
    }

    fn save(&self, records: &[ScanRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context(format!("Failed to create directory: {}", parent.display()))?;
            }
        }
        // Write beside the target, then swap it in
        let tmp_path = self.tmp_path();
        let file = File::create(&tmp_path)
            .context(format!("Failed to create file: {}", tmp_path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, records)
            .context(format!("Failed to write scan history to: {}", tmp_path.display()))?;
        writer
            .flush()
            .context(format!("Failed to flush scan history to: {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path).context(format!(
            "Failed to replace scan history: {}",
            self.path.display()
        ))
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn with_lock<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let _guard = self
            .guard
            .lock()
            .map_err(|_| anyhow!("Scan store lock poisoned"))?;
        f()
    }
}

impl ScanStore for JsonFileScanStore {
    fn create(&self, mut record: ScanRecord) -> Result<ScanRecord> {
        self.with_lock(|| {
            let mut records = self.load()?;
            record.id = next_id(&records);
            records.push(record.clone());
            self.save(&records)?;
            if PRINT_STORE_EVENTS {
                log::info!("Saved scan #{} to {}", record.id, self.path.display());
            }
            Ok(record)
        })
    }

    fn list(&self) -> Result<Vec<ScanRecord>> {
        self.with_lock(|| Ok(newest_first(self.load()?)))
    }

    fn get(&self, id: u64) -> Result<Option<ScanRecord>> {
        self.with_lock(|| Ok(self.load()?.into_iter().find(|r| r.id == id)))
    }

    fn delete(&self, id: u64) -> Result<bool> {
        self.with_lock(|| {
            let mut records = self.load()?;
            let before = records.len();
            records.retain(|r| r.id != id);
            let removed = records.len() != before;
            if removed {
                self.save(&records)?;
                if PRINT_STORE_EVENTS {
                    log::info!("Deleted scan #{} from {}", id, self.path.display());
                }
            }
            Ok(removed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AssetInfo, AssetType, TrendDirection};
    use chrono::{Duration, Utc};

    fn record(name: &str, minutes_ago: i64) -> ScanRecord {
        let mut r = ScanRecord::new(
            &AssetInfo::manual(AssetType::Crypto, Some(name)),
            69000.0,
            15000.0,
            Some(42000.0),
            TrendDirection::Uptrend,
        );
        r.created_at = Utc::now() - Duration::minutes(minutes_ago);
        r
    }

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("fib_sniper_{}_{}", tag, std::process::id()))
            .join("scans.json")
    }

    fn exercise(store: &dyn ScanStore) {
        let older = store.create(record("eth", 30)).unwrap();
        let newer = store.create(record("btc", 5)).unwrap();
        assert_eq!(older.id, 1);
        assert_eq!(newer.id, 2);

        let names: Vec<_> = store.list().unwrap().into_iter().map(|r| r.asset_name).collect();
        assert_eq!(names, ["BTC", "ETH"]);

        assert_eq!(store.get(1).unwrap().unwrap().asset_name, "ETH");
        assert!(store.get(99).unwrap().is_none());

        assert!(store.delete(1).unwrap());
        assert!(!store.delete(1).unwrap());
        assert_eq!(store.list().unwrap().len(), 1);

        // Ids are not reused below the current maximum
        assert_eq!(store.create(record("sol", 0)).unwrap().id, 3);
    }

    #[test]
    fn memory_store_roundtrip() {
        exercise(&MemoryScanStore::new());
    }

    #[test]
    fn json_store_persists_across_instances() {
        let path = temp_path("persist");
        let _ = std::fs::remove_dir_all(path.parent().unwrap());

        exercise(&JsonFileScanStore::new(&path));

        let reopened = JsonFileScanStore::new(&path);
        let records = reopened.list().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].asset_name, "SOL");
        assert_eq!(records[0].current_price, Some(42000.0));

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn json_store_replaces_file_without_leftovers() {
        let path = temp_path("replace");
        let _ = std::fs::remove_dir_all(path.parent().unwrap());

        let store = JsonFileScanStore::new(&path);
        store.create(record("btc", 1)).unwrap();
        store.create(record("eth", 0)).unwrap();

        let tmp = path.with_file_name("scans.json.tmp");
        assert_eq!(store.tmp_path(), tmp);
        assert!(!tmp.exists());

        let on_disk: Vec<ScanRecord> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.len(), 2);

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn json_store_failed_write_keeps_history() {
        let path = temp_path("blocked");
        let _ = std::fs::remove_dir_all(path.parent().unwrap());

        let store = JsonFileScanStore::new(&path);
        store.create(record("btc", 1)).unwrap();

        // A directory squatting on the temp name makes the next write fail
        std::fs::create_dir_all(store.tmp_path()).unwrap();
        assert!(store.create(record("eth", 0)).is_err());

        let records = store.list().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].asset_name, "BTC");

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn json_store_missing_file_is_empty() {
        let store = JsonFileScanStore::new(temp_path("missing"));
        assert!(store.list().unwrap().is_empty());
        assert!(!store.delete(1).unwrap());
    }

    #[test]
    fn json_store_reports_corrupt_file() {
        let path = temp_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        let err = JsonFileScanStore::new(&path).list().unwrap_err();
        assert!(err.to_string().contains("Failed to parse scan history"));

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
