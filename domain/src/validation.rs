use database_adapter::db::SlotStore;

use crate::error::FormError;
use crate::user::CredentialStore;

/// Configuration for credential format rules
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    pub min_password_len: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_password_len: 6,
        }
    }
}

/// Per-field outcome of checking a registration form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub login: Option<FormError>,
    pub password: Option<FormError>,
}

impl FieldErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.login.is_none() && self.password.is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormError> {
        self.login.iter().chain(self.password.iter())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CredentialValidator {
    config: ValidationConfig,
}

impl CredentialValidator {
    #[must_use]
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn with_default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// Checks a login against the format rules
    /// # Errors
    /// - `EmptyLogin` if only whitespace was given
    /// - `InvalidLoginChars` if anything outside `[A-Za-z0-9_-]` appears
    pub fn validate_login(&self, login: &str) -> Result<(), FormError> {
        if login.trim().is_empty() {
            return Err(FormError::EmptyLogin);
        }
        if !login.chars().all(is_login_char) {
            return Err(FormError::InvalidLoginChars);
        }
        Ok(())
    }

    /// Checks a password against the format rules
    /// # Errors
    /// - `EmptyPassword` if nothing was given
    /// - `PasswordTooShort` if it has fewer characters than configured
    pub fn validate_password(&self, password: &str) -> Result<(), FormError> {
        if password.is_empty() {
            return Err(FormError::EmptyPassword);
        }
        if password.chars().count() < self.config.min_password_len {
            return Err(FormError::PasswordTooShort {
                min: self.config.min_password_len,
            });
        }
        Ok(())
    }

    /// Checks both fields; neither check stops the other
    #[must_use]
    pub fn validate_credentials(&self, login: &str, password: &str) -> FieldErrors {
        FieldErrors {
            login: self.validate_login(login).err(),
            password: self.validate_password(password).err(),
        }
    }

    /// Checks that nobody registered this login yet
    /// # Errors
    /// - `LoginTaken` if a user with this login exists
    /// - any storage error from the credential store
    pub async fn check_login_available<S: SlotStore>(
        &self,
        users: &CredentialStore<S>,
        login: &str,
    ) -> Result<(), FormError> {
        if users.exists(login, None).await? {
            return Err(FormError::LoginTaken);
        }
        Ok(())
    }
}

fn is_login_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}
