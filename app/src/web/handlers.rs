use askama::Template;
use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use domain::core::{FormEvent, LoginInput, RegistrationInput};
use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::web::{
    AppState,
    templates::{IndexTemplate, MessagesTemplate},
};

#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
    // Unchecked checkboxes are not sent at all
    pub save_data: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
    pub remember_me: Option<String>,
}

fn render(template: &impl Template) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to render template: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// The form page. A pending navigation from a fired redirect timer is
/// followed instead of rendering.
pub async fn index(State(app_state): State<AppState>) -> Response {
    let mut controller = app_state.controller().await;

    if let Some(target) = controller.take_navigation() {
        debug!("Following navigation to {target}");
        return Redirect::to(&target).into_response();
    }

    let refresh_in = controller
        .next_deadline()
        .map(|deadline| deadline.saturating_duration_since(Instant::now()));
    render(&IndexTemplate::from_ui(controller.ui(), refresh_in))
}

pub async fn register_submit(
    State(app_state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Redirect {
    info!("Registration attempt for login: {}", form.login);

    let input = RegistrationInput {
        login: form.login,
        password: form.password,
        save_data: form.save_data.is_some(),
    };
    app_state
        .controller()
        .await
        .handle(FormEvent::SubmitRegistration(input))
        .await;
    Redirect::to("/")
}

pub async fn login_submit(
    State(app_state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Redirect {
    info!("Login attempt for login: {}", form.login);

    let input = LoginInput {
        login: form.login,
        password: form.password,
        remember_me: form.remember_me.is_some(),
    };
    app_state
        .controller()
        .await
        .handle(FormEvent::SubmitLogin(input))
        .await;
    Redirect::to("/")
}

pub async fn switch_to_login(State(app_state): State<AppState>) -> Redirect {
    app_state.controller().await.handle(FormEvent::ShowLogin).await;
    Redirect::to("/")
}

pub async fn switch_to_register(State(app_state): State<AppState>) -> Redirect {
    app_state
        .controller()
        .await
        .handle(FormEvent::ShowRegistration)
        .await;
    Redirect::to("/")
}

/// Landing page after a successful login
pub async fn messages_page(State(app_state): State<AppState>) -> Response {
    let current_user = {
        let controller = app_state.controller().await;
        controller.session().current_user().await
    };

    match current_user {
        Ok(Some(login)) => render(&MessagesTemplate { login }),
        Ok(None) => {
            debug!("No user logged in, back to the form");
            Redirect::to("/").into_response()
        }
        Err(e) => {
            error!("Failed to read the current user: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn logout(State(app_state): State<AppState>) -> Redirect {
    app_state.controller().await.handle(FormEvent::Logout).await;
    Redirect::to("/")
}
