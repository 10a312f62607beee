use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::types::Job;

/// JSON-file persistence for the job collection.
///
/// The file holds a single JSON array of job objects in registry order.
/// Loading is forgiving — a damaged file yields an empty collection, a
/// damaged entry is skipped — while saving is atomic via a temp-file
/// rename, so readers never observe a half-written file.
pub struct JobStore {
    path: PathBuf,
}

impl JobStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all jobs. Never fails: an absent, unreadable, or malformed file
    /// is treated as an empty collection (with a warning), and individual
    /// malformed entries are skipped rather than discarding the rest.
    pub fn load(&self) -> Vec<Job> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "job file absent; starting empty");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), "job file unreadable: {e}");
                return Vec::new();
            }
        };

        let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.path.display(), "job file malformed: {e}");
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<Job>(entry) {
                Ok(job) => Some(job),
                Err(e) => {
                    warn!("skipping malformed job entry: {e}");
                    None
                }
            })
            .collect()
    }

    /// Persist the full collection: write a temp file, then rename it over
    /// the real one. The parent directory is created on demand.
    pub fn save(&self, jobs: &[Job]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(jobs)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json.as_bytes())?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_INTERVAL_MINUTES;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> JobStore {
        JobStore::new(dir.path().join("cronjobs.json"))
    }

    fn job(id: &str, name: &str) -> Job {
        Job {
            id: id.to_string(),
            name: name.to_string(),
            target: "/bin/true".to_string(),
            arguments: String::new(),
            use_custom_command: false,
            custom_command: String::new(),
            interval_minutes: 5,
            enabled: true,
            last_run: None,
            next_run: Some("2026-03-01T10:00:00Z".parse().unwrap()),
        }
    }

    #[test]
    fn absent_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        assert!(store_in(&dir).load().is_empty());
    }

    #[test]
    fn malformed_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "this is not json {{{").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn non_array_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), r#"{"jobs": []}"#).unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_then_load_preserves_order_and_fields() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut custom = job("b", "second");
        custom.use_custom_command = true;
        custom.custom_command = "ruby".to_string();
        custom.interval_minutes = 90;
        let jobs = vec![job("a", "first"), custom, job("c", "third")];

        store.save(&jobs).unwrap();
        let loaded = store.load();

        assert_eq!(loaded, jobs);
        assert!(loaded[1].use_custom_command);
        assert_eq!(loaded[1].custom_command, "ruby");
        assert_eq!(loaded[1].interval_minutes, 90);
    }

    #[test]
    fn save_creates_missing_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = JobStore::new(dir.path().join("deep/nested/cronjobs.json"));
        store.save(&[job("a", "only")]).unwrap();
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn malformed_entry_is_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"[
                {"id": "ok-1", "name": "good"},
                ["not", "an", "object"],
                {"id": "ok-2", "name": "also good"}
            ]"#,
        )
        .unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, "ok-1");
        assert_eq!(loaded[1].id, "ok-2");
    }

    #[test]
    fn legacy_entries_parse_with_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"[{
                "id": "old",
                "name": "hand written",
                "target": "run.py",
                "intervalMinutes": "sixty",
                "lastRun": "",
                "nextRun": "not a date"
            }]"#,
        )
        .unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].interval_minutes, DEFAULT_INTERVAL_MINUTES);
        assert!(loaded[0].enabled);
        assert!(loaded[0].last_run.is_none());
        assert!(loaded[0].next_run.is_none());
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&[job("a", "one")]).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["cronjobs.json".to_string()]);
    }
}
