use std::fmt;

#[derive(Debug)]
pub enum DbError {
    SqlxError(sqlx::Error),
    SerdeError(serde_json::Error),
    IoError(std::io::Error),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::SqlxError(e) => write!(f, "Database error: {e}"),
            DbError::SerdeError(e) => write!(f, "Serialization error: {e}"),
            DbError::IoError(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for DbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DbError::SqlxError(e) => Some(e),
            DbError::SerdeError(e) => Some(e),
            DbError::IoError(e) => Some(e),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(error: sqlx::Error) -> Self {
        DbError::SqlxError(error)
    }
}

impl From<serde_json::Error> for DbError {
    fn from(error: serde_json::Error) -> Self {
        DbError::SerdeError(error)
    }
}

impl From<std::io::Error> for DbError {
    fn from(error: std::io::Error) -> Self {
        DbError::IoError(error)
    }
}

/// Named-slot key-value storage.
///
/// Every slot holds one string value. Slots are independent: there is no
/// atomicity across two calls, even on the same slot.
#[allow(async_fn_in_trait)]
pub trait SlotStore {
    /// Read the value of a slot
    /// # Errors
    /// - Returns `DbError` if the backend fails
    async fn get(&self, key: &str) -> Result<Option<String>, DbError>;
    /// Write a slot, replacing any previous value
    /// # Errors
    /// - Returns `DbError` if the backend fails
    async fn set(&self, key: &str, value: &str) -> Result<(), DbError>;
    /// Remove a slot. Removing an absent slot is not an error
    /// # Errors
    /// - Returns `DbError` if the backend fails
    async fn remove(&self, key: &str) -> Result<(), DbError>;
    /// Check whether a slot holds a value
    /// # Errors
    /// - Returns `DbError` if the backend fails
    async fn contains(&self, key: &str) -> Result<bool, DbError> {
        Ok(self.get(key).await?.is_some())
    }
}
