use database_adapter::db::{DbError, SlotStore};
use database_adapter::file::FileSlotStore;
use database_adapter::postgres::PostgresSlotStore;
use in_memory_adapter::InMemorySlotStore;
use tracing::info;

use crate::config::StorageBackend;

/// The slot store picked by configuration
#[derive(Debug)]
pub enum AppStore {
    File(FileSlotStore),
    Postgres(PostgresSlotStore),
    Memory(InMemorySlotStore),
}

impl AppStore {
    /// # Errors
    /// Returns `DbError` if the backend cannot be opened
    pub async fn open(backend: &StorageBackend) -> Result<Self, DbError> {
        Ok(match backend {
            StorageBackend::File(path) => {
                info!("Storing slots in {}", path.display());
                AppStore::File(FileSlotStore::open(path).await?)
            }
            StorageBackend::Postgres { url, table } => {
                info!("Storing slots in postgres table {table}");
                AppStore::Postgres(PostgresSlotStore::connect(url, table).await?)
            }
            StorageBackend::Memory => {
                info!("Storing slots in memory, nothing survives a restart");
                AppStore::Memory(InMemorySlotStore::new())
            }
        })
    }
}

impl SlotStore for AppStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DbError> {
        match self {
            AppStore::File(store) => store.get(key).await,
            AppStore::Postgres(store) => store.get(key).await,
            AppStore::Memory(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DbError> {
        match self {
            AppStore::File(store) => store.set(key, value).await,
            AppStore::Postgres(store) => store.set(key, value).await,
            AppStore::Memory(store) => store.set(key, value).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<(), DbError> {
        match self {
            AppStore::File(store) => store.remove(key).await,
            AppStore::Postgres(store) => store.remove(key).await,
            AppStore::Memory(store) => store.remove(key).await,
        }
    }
}
