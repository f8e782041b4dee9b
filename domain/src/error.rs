use database_adapter::db::DbError;

/// Every failure a form submission can end with.
///
/// None of them is fatal: the controller turns each one into a field error or
/// the global message and the page stays usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    EmptyLogin,
    InvalidLoginChars,
    LoginTaken,
    EmptyPassword,
    PasswordTooShort { min: usize },
    InvalidCredentials,
    StorageCorrupt,
    StorageUnavailable,
}

impl std::fmt::Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::EmptyLogin => write!(f, "Login is required"),
            FormError::InvalidLoginChars => {
                write!(f, "Only Latin letters, digits, _ and - are allowed")
            }
            FormError::LoginTaken => write!(f, "This login is already taken"),
            FormError::EmptyPassword => write!(f, "Password is required"),
            FormError::PasswordTooShort { min } => {
                write!(f, "Password must be at least {min} characters")
            }
            FormError::InvalidCredentials => write!(f, "Invalid login or password"),
            FormError::StorageCorrupt => write!(f, "Stored user data is corrupt"),
            FormError::StorageUnavailable => write!(f, "Storage is unavailable"),
        }
    }
}

impl std::error::Error for FormError {}

impl From<DbError> for FormError {
    fn from(error: DbError) -> Self {
        tracing::error!("Storage backend failure: {error}");
        FormError::StorageUnavailable
    }
}
