use std::sync::Arc;

use database_adapter::db::{DbError, SlotStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::FormError;
use crate::slots::USERS_KEY;

/// A registered user. The password is kept as typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub login: String,
    pub password: String,
}

/// What to do when the users slot holds something that is not a user list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CorruptStorePolicy {
    /// Read corrupt data as "no users"; the next append overwrites it
    #[default]
    FailOpen,
    /// Refuse to read or overwrite corrupt data
    Reject,
}

/// The list of registered users, stored whole under one slot
#[derive(Debug)]
pub struct CredentialStore<S> {
    store: Arc<S>,
    policy: CorruptStorePolicy,
}

impl<S: SlotStore> CredentialStore<S> {
    pub fn new(store: Arc<S>, policy: CorruptStorePolicy) -> Self {
        Self { store, policy }
    }

    /// Gets every registered user, in registration order
    /// # Errors
    /// - `StorageCorrupt` if the slot is malformed and the policy is `Reject`
    /// - `StorageUnavailable` if the backend fails
    pub async fn list_all(&self) -> Result<Vec<UserRecord>, FormError> {
        let Some(raw) = self.store.get(USERS_KEY).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<UserRecord>>(&raw) {
            Ok(users) => Ok(users),
            Err(e) => {
                warn!("{}: {e}", FormError::StorageCorrupt);
                match self.policy {
                    CorruptStorePolicy::FailOpen => Ok(Vec::new()),
                    CorruptStorePolicy::Reject => Err(FormError::StorageCorrupt),
                }
            }
        }
    }

    /// Appends a user and writes the whole list back.
    ///
    /// Not atomic with any earlier existence check: two writers sharing the
    /// same backend can both append the same login, or lose one another's update.
    /// # Errors
    /// - see [`CredentialStore::list_all`]
    pub async fn append(&self, login: &str, password: &str) -> Result<(), FormError> {
        let mut users = self.list_all().await?;
        users.push(UserRecord {
            login: login.to_string(),
            password: password.to_string(),
        });

        let data = serde_json::to_string(&users).map_err(DbError::from)?;
        self.store.set(USERS_KEY, &data).await?;
        debug!("Stored {} user record(s)", users.len());

        Ok(())
    }

    /// Gets the first user whose login matches exactly
    /// # Errors
    /// - see [`CredentialStore::list_all`]
    pub async fn find_by_login(&self, login: &str) -> Result<Option<UserRecord>, FormError> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .find(|user| user.login == login))
    }

    /// Checks for a user with this login and, when given, this exact password
    /// # Errors
    /// - see [`CredentialStore::list_all`]
    pub async fn exists(&self, login: &str, password: Option<&str>) -> Result<bool, FormError> {
        let users = self.list_all().await?;
        Ok(match password {
            Some(password) => users
                .iter()
                .any(|user| user.login == login && user.password == password),
            None => users.iter().any(|user| user.login == login),
        })
    }

    /// Gets the number of stored records
    /// # Errors
    /// - see [`CredentialStore::list_all`]
    pub async fn count(&self) -> Result<usize, FormError> {
        Ok(self.list_all().await?.len())
    }
}
