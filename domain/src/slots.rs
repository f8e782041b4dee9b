//! Names of the storage slots shared with the page.

pub const USERS_KEY: &str = "registration_users";
pub const AUTH_TOKEN_KEY: &str = "authToken";
pub const CURRENT_USER_KEY: &str = "currentUser";
pub const REMEMBER_ME_KEY: &str = "rememberMe";
pub const SAVED_LOGIN_KEY: &str = "savedLogin";
pub const LAST_LOGIN_KEY: &str = "last_login";
