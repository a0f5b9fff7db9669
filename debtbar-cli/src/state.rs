use anyhow::{Context, Result};
use debtbar_core::KeyValueStore;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

pub fn debtbar_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".debtbar"))
}

pub fn ensure_debtbar_home() -> Result<PathBuf> {
    let dir = debtbar_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn state_path() -> Result<PathBuf> {
    Ok(ensure_debtbar_home()?.join("state.json"))
}

/// Persisted client state: one JSON object of string values on disk.
///
/// Writes go to a sibling temp file which is then renamed over the state
/// file, so readers see either the old or the new object, never a torn one.
/// A file that cannot be read or parsed is never overwritten.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open_default() -> Result<Self> {
        Ok(Self::new(state_path()?))
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let s = fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        serde_json::from_str(&s).with_context(|| format!("parse {}", self.path.display()))
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(values)?;
        let tmp = self.temp_path();
        fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path).with_context(|| {
            let _ = fs::remove_file(&tmp);
            format!("replace {}", self.path.display())
        })?;
        Ok(())
    }

    /// Per-process temp name, so concurrent writers never share one
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state.json".into());
        name.push(format!(".{}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn clear(&self, key: &str) -> Result<()> {
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> FileStore {
        let dir = std::env::temp_dir().join(format!("debtbar-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("state.json");
        let _ = fs::remove_file(&path);
        FileStore::new(path)
    }

    #[test]
    fn set_get_clear_round_through_disk() {
        let store = temp_store("basic");
        assert!(store.get("voted").unwrap().is_none());

        store.set("voted", "true").unwrap();
        store.set("debt_cache", "{}").unwrap();

        let reopened = FileStore::new(store.path.clone());
        assert_eq!(reopened.get("voted").unwrap().as_deref(), Some("true"));

        reopened.clear("debt_cache").unwrap();
        assert!(store.get("debt_cache").unwrap().is_none());
        assert_eq!(store.get("voted").unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn unreadable_file_is_never_overwritten() {
        let store = temp_store("torn");
        store.set("voted", "true").unwrap();
        store.set("debt_cache", r#"{"entries":[],"fetched_at":"2025-01-01T00:00:00Z"}"#).unwrap();

        // cut the file in half, as an interrupted foreign writer would
        let full = fs::read_to_string(&store.path).unwrap();
        let torn = &full[..full.len() / 2];
        fs::write(&store.path, torn).unwrap();

        assert!(store.get("voted").is_err());
        assert!(store.set("debt_cache", "{}").is_err());
        assert!(store.clear("debt_cache").is_err());
        assert_eq!(fs::read_to_string(&store.path).unwrap(), torn);
    }

    #[test]
    fn writes_leave_no_temp_file_behind() {
        let store = temp_store("rename");
        store.set("voted", "true").unwrap();
        store.set("debt_cache", "{}").unwrap();
        store.clear("debt_cache").unwrap();

        assert!(!store.temp_path().exists());
        let dir = store.path.parent().unwrap();
        let names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("state.json")]);
        assert_eq!(store.get("voted").unwrap().as_deref(), Some("true"));
    }
}
