use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::debug;

use crate::db::{DbError, SlotStore};

type Slots = BTreeMap<String, String>;

/// Slot store persisted as a single JSON object file
///
/// The whole file is read on every access and rewritten on every write,
/// through a temporary file renamed over the previous one. Writers inside this
/// process are serialised; separate processes sharing the file are not.
#[derive(Debug)]
pub struct FileSlotStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSlotStore {
    /// Open (or prepare) a slot file, creating its parent directory
    /// # Errors
    /// - Returns `DbError` if the parent directory cannot be created
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, DbError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        debug!("Using slot file {}", path.display());

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_slots(&self) -> Result<Slots, DbError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(Slots::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Slots::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_slots(&self, slots: &Slots) -> Result<(), DbError> {
        let data = serde_json::to_vec_pretty(slots)?;
        let tmp = self.path.with_extension("tmp");

        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        Ok(())
    }
}

impl SlotStore for FileSlotStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DbError> {
        let _guard = self.write_lock.lock().await;
        Ok(self.read_slots().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DbError> {
        let _guard = self.write_lock.lock().await;
        let mut slots = self.read_slots().await?;
        slots.insert(key.to_string(), value.to_string());
        self.write_slots(&slots).await
    }

    async fn remove(&self, key: &str) -> Result<(), DbError> {
        let _guard = self.write_lock.lock().await;
        let mut slots = self.read_slots().await?;
        if slots.remove(key).is_some() {
            self.write_slots(&slots).await?;
        }
        Ok(())
    }
}
