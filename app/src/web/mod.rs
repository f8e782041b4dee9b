pub mod handlers;
pub mod templates;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::services::FormHandle;

use handlers::{
    index, login_submit, logout, messages_page, register_submit, switch_to_login,
    switch_to_register,
};

// App state type
pub type AppState = FormHandle;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        // Static file serving
        .nest_service(
            "/static",
            ServeDir::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
        )
        // Form routes
        .route("/", get(index))
        .route("/register", post(register_submit))
        .route("/login", post(login_submit))
        .route("/switch/login", post(switch_to_login))
        .route("/switch/register", post(switch_to_register))
        // Session routes
        .route("/messages", get(messages_page))
        .route("/logout", post(logout))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add state
        .with_state(state)
}
