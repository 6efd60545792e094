use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use blackbelt_shared::{KeyValueStorage, StorageError};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Key-value storage backed by a data directory, one `<key>.json` file per
/// key. Writes replace the file atomically.
#[derive(Debug)]
pub struct FileStorage {
    pub data_dir: PathBuf,
}

impl FileStorage {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        info!(data_dir = %data_dir.display(), "opened datastore");
        Ok(Self { data_dir })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.json"))
    }
}

impl KeyValueStorage for FileStorage {
    #[tracing::instrument(skip(self))]
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => {
                debug!(file = %path.display(), bytes = raw.len(), "read key");
                Ok(Some(raw))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Read {
                key: key.to_string(),
                reason: format!("{}: {err}", path.display()),
            }),
        }
    }

    #[tracing::instrument(skip(self, value))]
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        write_atomic(&path, value).map_err(|err| StorageError::Write {
            key: key.to_string(),
            reason: format!("{err:#}"),
        })
    }
}

fn write_atomic(path: &Path, value: &str) -> anyhow::Result<()> {
    debug!(file = %path.display(), bytes = value.len(), "writing atomically");

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(value.as_bytes())?;
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reads_as_absent() {
        let temp = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::open(temp.path()).expect("open");
        assert_eq!(storage.get("tasks").expect("get"), None);
    }

    #[test]
    fn set_then_get_across_reopen() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut storage = FileStorage::open(temp.path()).expect("open");
        storage.set("hasVisited", "true").expect("set");
        storage.set("hasVisited", "true").expect("overwrite");

        let reopened = FileStorage::open(temp.path()).expect("reopen");
        assert_eq!(reopened.get("hasVisited").expect("get").as_deref(), Some("true"));
        assert!(temp.path().join("hasVisited.json").exists());
    }
}
