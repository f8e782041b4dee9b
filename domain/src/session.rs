use std::sync::Arc;

use chrono::Utc;
use database_adapter::db::{DbError, SlotStore};
use tracing::debug;
use uuid::Uuid;

use crate::slots::{
    AUTH_TOKEN_KEY, CURRENT_USER_KEY, LAST_LOGIN_KEY, REMEMBER_ME_KEY, SAVED_LOGIN_KEY,
};

const REMEMBER_ME_SET: &str = "true";

/// Session markers, each in its own slot. Nothing here is atomic across slots.
#[derive(Debug)]
pub struct SessionStore<S> {
    store: Arc<S>,
}

impl<S: SlotStore> SessionStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Marks `login` as the current user under a fresh session token
    /// # Errors
    /// - Returns `DbError` if the backend fails
    pub async fn record_login(&self, login: &str) -> Result<String, DbError> {
        let token = new_session_token();
        self.store.set(AUTH_TOKEN_KEY, &token).await?;
        self.store.set(CURRENT_USER_KEY, login).await?;
        debug!("Session opened for {login}");
        Ok(token)
    }

    /// Remembers `login` for the login form, or forgets any remembered login
    /// # Errors
    /// - Returns `DbError` if the backend fails
    pub async fn set_remember_me(&self, login: &str, remember: bool) -> Result<(), DbError> {
        if remember {
            self.store.set(REMEMBER_ME_KEY, REMEMBER_ME_SET).await?;
            self.store.set(SAVED_LOGIN_KEY, login).await?;
        } else {
            self.store.remove(REMEMBER_ME_KEY).await?;
            self.store.remove(SAVED_LOGIN_KEY).await?;
        }
        Ok(())
    }

    /// # Errors
    /// - Returns `DbError` if the backend fails
    pub async fn record_last_registered(&self, login: &str) -> Result<(), DbError> {
        self.store.set(LAST_LOGIN_KEY, login).await
    }

    /// # Errors
    /// - Returns `DbError` if the backend fails
    pub async fn forget_last_registered(&self) -> Result<(), DbError> {
        self.store.remove(LAST_LOGIN_KEY).await
    }

    /// Logs out: drops the current user, the token and the remember-me markers.
    /// The last registered login survives.
    /// # Errors
    /// - Returns `DbError` if the backend fails
    pub async fn clear_session(&self) -> Result<(), DbError> {
        for key in [
            AUTH_TOKEN_KEY,
            CURRENT_USER_KEY,
            REMEMBER_ME_KEY,
            SAVED_LOGIN_KEY,
        ] {
            self.store.remove(key).await?;
        }
        debug!("Session cleared");
        Ok(())
    }

    /// # Errors
    /// - Returns `DbError` if the backend fails
    pub async fn current_user(&self) -> Result<Option<String>, DbError> {
        self.store.get(CURRENT_USER_KEY).await
    }

    /// # Errors
    /// - Returns `DbError` if the backend fails
    pub async fn session_token(&self) -> Result<Option<String>, DbError> {
        self.store.get(AUTH_TOKEN_KEY).await
    }

    /// Gets the remembered login, only while the remember-me flag is set
    /// # Errors
    /// - Returns `DbError` if the backend fails
    pub async fn remembered_login(&self) -> Result<Option<String>, DbError> {
        if self.store.get(REMEMBER_ME_KEY).await?.as_deref() != Some(REMEMBER_ME_SET) {
            return Ok(None);
        }
        Ok(self
            .store
            .get(SAVED_LOGIN_KEY)
            .await?
            .filter(|login| !login.is_empty()))
    }

    /// # Errors
    /// - Returns `DbError` if the backend fails
    pub async fn last_registered(&self) -> Result<Option<String>, DbError> {
        Ok(self
            .store
            .get(LAST_LOGIN_KEY)
            .await?
            .filter(|login| !login.is_empty()))
    }
}

/// Opaque token; nothing ever validates it
fn new_session_token() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("auth_{}_{}", Utc::now().timestamp_millis(), &suffix[..8])
}

#[cfg(test)]
mod tests {
    use in_memory_adapter::InMemorySlotStore;

    use super::*;

    fn session() -> (Arc<InMemorySlotStore>, SessionStore<InMemorySlotStore>) {
        let slots = Arc::new(InMemorySlotStore::new());
        (Arc::clone(&slots), SessionStore::new(slots))
    }

    #[tokio::test]
    async fn test_record_login_sets_user_and_token() {
        let (slots, session) = session();
        let token = session.record_login("alice").await.unwrap();

        assert!(token.starts_with("auth_"));
        assert_eq!(session.current_user().await.unwrap(), Some("alice".into()));
        assert_eq!(session.session_token().await.unwrap(), Some(token));
        assert_eq!(slots.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let (_, session) = session();
        let first = session.record_login("alice").await.unwrap();
        let second = session.record_login("alice").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_remember_me_toggle() {
        let (slots, session) = session();

        session.set_remember_me("alice", true).await.unwrap();
        assert_eq!(
            session.remembered_login().await.unwrap(),
            Some("alice".into())
        );
        assert_eq!(
            slots.snapshot().get(REMEMBER_ME_KEY).map(String::as_str),
            Some("true")
        );

        session.set_remember_me("alice", false).await.unwrap();
        assert_eq!(session.remembered_login().await.unwrap(), None);
        assert!(slots.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_saved_login_ignored_without_flag() {
        let slots = Arc::new(InMemorySlotStore::new().with_slot(SAVED_LOGIN_KEY, "alice"));
        let session = SessionStore::new(slots);
        assert_eq!(session.remembered_login().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_session_keeps_last_registered() {
        let (slots, session) = session();
        session.record_last_registered("bob").await.unwrap();
        session.record_login("alice").await.unwrap();
        session.set_remember_me("alice", true).await.unwrap();

        session.clear_session().await.unwrap();

        assert_eq!(session.current_user().await.unwrap(), None);
        assert_eq!(session.session_token().await.unwrap(), None);
        assert_eq!(session.remembered_login().await.unwrap(), None);
        assert_eq!(session.last_registered().await.unwrap(), Some("bob".into()));
        assert_eq!(slots.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_forget_last_registered() {
        let (_, session) = session();
        session.record_last_registered("bob").await.unwrap();
        session.forget_last_registered().await.unwrap();
        assert_eq!(session.last_registered().await.unwrap(), None);
    }
}
