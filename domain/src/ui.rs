//! Everything the page shows, as one value.
//!
//! The controller owns a [`UiState`] and only changes it through the methods
//! below; a page surface renders it and never writes to it.

use crate::error::FormError;
use crate::validation::FieldErrors;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormKind {
    #[default]
    Registration,
    Login,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub kind: MessageKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationFields {
    pub login: String,
    pub password: String,
    pub save_data: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginFields {
    pub login: String,
    pub password: String,
    pub remember_me: bool,
}

/// Error slots next to the inputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSlots {
    pub registration_login: Option<FormError>,
    pub registration_password: Option<FormError>,
    pub login: Option<FormError>,
}

impl ErrorSlots {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registration_login.is_none()
            && self.registration_password.is_none()
            && self.login.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    visible: FormKind,
    registration: RegistrationFields,
    login: LoginFields,
    errors: ErrorSlots,
    message: Option<Message>,
    navigation: Option<String>,
}

impl UiState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn visible(&self) -> FormKind {
        self.visible
    }

    #[must_use]
    pub fn registration(&self) -> &RegistrationFields {
        &self.registration
    }

    #[must_use]
    pub fn login(&self) -> &LoginFields {
        &self.login
    }

    #[must_use]
    pub fn errors(&self) -> &ErrorSlots {
        &self.errors
    }

    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    /// Where the page should go next, if anywhere
    #[must_use]
    pub fn navigation(&self) -> Option<&str> {
        self.navigation.as_deref()
    }

    /// Switching forms always wipes field errors and the message
    pub(crate) fn show(&mut self, form: FormKind) {
        self.visible = form;
        self.clear_feedback();
    }

    pub(crate) fn clear_feedback(&mut self) {
        self.errors = ErrorSlots::default();
        self.message = None;
    }

    pub(crate) fn set_message(&mut self, text: impl Into<String>, kind: MessageKind) {
        self.message = Some(Message {
            text: text.into(),
            kind,
        });
    }

    pub(crate) fn clear_message(&mut self) {
        self.message = None;
    }

    pub(crate) fn set_registration_errors(&mut self, errors: FieldErrors) {
        self.errors.registration_login = errors.login;
        self.errors.registration_password = errors.password;
    }

    pub(crate) fn set_login_error(&mut self, error: FormError) {
        self.errors.login = Some(error);
    }

    pub(crate) fn fill_registration(&mut self, fields: RegistrationFields) {
        self.registration = fields;
    }

    pub(crate) fn fill_login(&mut self, fields: LoginFields) {
        self.login = fields;
    }

    pub(crate) fn reset_registration(&mut self) {
        self.registration = RegistrationFields::default();
    }

    pub(crate) fn reset_login(&mut self) {
        self.login = LoginFields::default();
    }

    pub(crate) fn navigate(&mut self, target: String) {
        self.navigation = Some(target);
    }

    /// Hands the pending navigation to whoever is about to follow it
    pub fn take_navigation(&mut self) -> Option<String> {
        self.navigation.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_registration_form() {
        let ui = UiState::new();
        assert_eq!(ui.visible(), FormKind::Registration);
        assert!(ui.errors().is_empty());
        assert!(ui.message().is_none());
    }

    #[test]
    fn test_switch_clears_feedback() {
        let mut ui = UiState::new();
        ui.set_login_error(FormError::InvalidCredentials);
        ui.set_message("Login failed", MessageKind::Error);

        ui.show(FormKind::Login);

        assert_eq!(ui.visible(), FormKind::Login);
        assert!(ui.errors().is_empty());
        assert!(ui.message().is_none());
    }

    #[test]
    fn test_switch_keeps_field_values() {
        let mut ui = UiState::new();
        ui.fill_login(LoginFields {
            login: "alice".into(),
            password: "secret1".into(),
            remember_me: true,
        });
        ui.show(FormKind::Login);
        ui.show(FormKind::Registration);
        assert_eq!(ui.login().login, "alice");
    }

    #[test]
    fn test_navigation_is_taken_once() {
        let mut ui = UiState::new();
        ui.navigate("/messages".into());
        assert_eq!(ui.take_navigation().as_deref(), Some("/messages"));
        assert_eq!(ui.take_navigation(), None);
    }
}
