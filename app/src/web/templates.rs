use std::time::Duration;

use askama::Template;
use domain::error::FormError;
use domain::ui::{FormKind, MessageKind, UiState};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub show_login: bool,
    pub registration_login: String,
    pub registration_password: String,
    pub save_data: bool,
    pub registration_login_error: String,
    pub registration_password_error: String,
    pub login_login: String,
    pub login_password: String,
    pub remember_me: bool,
    pub login_error: String,
    pub message: String,
    pub message_class: &'static str,
    /// Seconds until the page should reload itself, 0 for never
    pub refresh_secs: u64,
}

impl IndexTemplate {
    pub fn from_ui(ui: &UiState, refresh_in: Option<Duration>) -> Self {
        let (message, message_class) = match ui.message() {
            Some(message) => (
                message.text.clone(),
                match message.kind {
                    MessageKind::Success => "message success",
                    MessageKind::Info => "message info",
                    MessageKind::Error => "message error-message",
                },
            ),
            None => (String::new(), "message"),
        };

        let errors = ui.errors();
        Self {
            show_login: ui.visible() == FormKind::Login,
            registration_login: ui.registration().login.clone(),
            registration_password: ui.registration().password.clone(),
            save_data: ui.registration().save_data,
            registration_login_error: error_text(errors.registration_login.as_ref()),
            registration_password_error: error_text(errors.registration_password.as_ref()),
            login_login: ui.login().login.clone(),
            login_password: ui.login().password.clone(),
            remember_me: ui.login().remember_me,
            login_error: error_text(errors.login.as_ref()),
            message,
            message_class,
            refresh_secs: refresh_in.map_or(0, |delay| {
                u64::try_from(delay.as_millis())
                    .unwrap_or(u64::MAX)
                    .div_ceil(1000)
                    .max(1)
            }),
        }
    }
}

#[derive(Template)]
#[template(path = "messages.html")]
pub struct MessagesTemplate {
    pub login: String,
}

fn error_text(error: Option<&FormError>) -> String {
    error.map(ToString::to_string).unwrap_or_default()
}
