use std::sync::Arc;
use std::time::Duration;

use database_adapter::db::SlotStore;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::{
    error::FormError,
    session::SessionStore,
    timers::{Scheduler, TimerAction, TimerFired},
    ui::{FormKind, LoginFields, MessageKind, RegistrationFields, UiState},
    user::{CorruptStorePolicy, CredentialStore},
    validation::{CredentialValidator, FieldErrors, ValidationConfig},
};

/// How to treat a registration for a login that is already stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateLoginPolicy {
    /// Same password: send the user to the login form. Other password: `LoginTaken`.
    #[default]
    RejectTaken,
    /// Send the user to the login form whatever the password
    RedirectToLogin,
}

#[derive(Debug, Clone)]
pub struct FormConfig {
    pub validation: ValidationConfig,
    /// How long a global message stays up
    pub message_ttl: Duration,
    /// Delay between a successful login and leaving the page
    pub redirect_delay: Duration,
    /// Where to go after a login; `None` returns to the registration form
    pub post_login_destination: Option<String>,
    pub duplicate_login_policy: DuplicateLoginPolicy,
    pub corrupt_store_policy: CorruptStorePolicy,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            validation: ValidationConfig::default(),
            message_ttl: Duration::from_millis(3000),
            redirect_delay: Duration::from_millis(1000),
            post_login_destination: Some(String::from("/messages")),
            duplicate_login_policy: DuplicateLoginPolicy::default(),
            corrupt_store_policy: CorruptStorePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationInput {
    pub login: String,
    pub password: String,
    pub save_data: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginInput {
    pub login: String,
    pub password: String,
    pub remember_me: bool,
}

/// A user action on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Load,
    SubmitRegistration(RegistrationInput),
    SubmitLogin(LoginInput),
    ShowLogin,
    ShowRegistration,
    Logout,
}

impl FormEvent {
    /// Variant name, safe to log without the submitted fields
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            FormEvent::Load => "load",
            FormEvent::SubmitRegistration(_) => "registration submit",
            FormEvent::SubmitLogin(_) => "login submit",
            FormEvent::ShowLogin => "show login",
            FormEvent::ShowRegistration => "show registration",
            FormEvent::Logout => "logout",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// Format errors, shown next to the fields
    Rejected(FieldErrors),
    /// Login already stored; the login form is shown pre-filled
    AlreadyRegistered,
    /// Login already stored with another password
    LoginTaken,
    Registered,
    /// Storage trouble, shown as the global message
    Failed(FormError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Accepted,
    Rejected,
    Failed(FormError),
}

const LOGIN_FAILED_MESSAGE: &str = "Login failed. Check your details.";
const ALREADY_REGISTERED_MESSAGE: &str = "This user is already registered. Please log in.";

/// Drives the registration and login forms.
///
/// Each handler runs to completion against the store before returning and
/// starts by cancelling every pending timer, so delayed transitions only ever
/// apply to the state that scheduled them.
#[derive(Debug)]
pub struct FormController<S> {
    users: CredentialStore<S>,
    session: SessionStore<S>,
    validator: CredentialValidator,
    ui: UiState,
    scheduler: Scheduler,
    config: FormConfig,
}

impl<S: SlotStore> FormController<S> {
    /// The receiver yields timer reports; feed them back through
    /// [`FormController::apply_timer`].
    #[must_use]
    pub fn new(store: Arc<S>, config: FormConfig) -> (Self, UnboundedReceiver<TimerFired>) {
        let (scheduler, timers) = Scheduler::new();
        let controller = Self {
            users: CredentialStore::new(Arc::clone(&store), config.corrupt_store_policy),
            session: SessionStore::new(store),
            validator: CredentialValidator::new(config.validation.clone()),
            ui: UiState::new(),
            scheduler,
            config,
        };
        (controller, timers)
    }

    #[must_use]
    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    #[must_use]
    pub fn users(&self) -> &CredentialStore<S> {
        &self.users
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    #[must_use]
    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Earliest moment a pending timer will change the page
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Hands out the pending navigation, clearing it
    pub fn take_navigation(&mut self) -> Option<String> {
        self.ui.take_navigation()
    }

    pub async fn handle(&mut self, event: FormEvent) {
        debug!("Handling {}", event.name());
        match event {
            FormEvent::Load => self.load().await,
            FormEvent::SubmitRegistration(input) => {
                self.submit_registration(input).await;
            }
            FormEvent::SubmitLogin(input) => {
                self.submit_login(input).await;
            }
            FormEvent::ShowLogin => self.show_login(),
            FormEvent::ShowRegistration => self.show_registration(),
            FormEvent::Logout => self.logout().await,
        }
    }

    /// Page load: pre-fill both forms from the stored markers and show
    /// the registration form
    pub async fn load(&mut self) {
        self.scheduler.cancel_all();
        self.ui = UiState::new();

        match self.session.last_registered().await {
            Ok(Some(login)) => self.ui.fill_registration(RegistrationFields {
                login,
                password: String::new(),
                save_data: true,
            }),
            Ok(None) => {}
            Err(e) => warn!("Could not read the last registered login: {e}"),
        }

        match self.session.remembered_login().await {
            Ok(Some(login)) => self.ui.fill_login(LoginFields {
                login,
                password: String::new(),
                remember_me: true,
            }),
            Ok(None) => {}
            Err(e) => warn!("Could not read the remembered login: {e}"),
        }

        self.ui.show(FormKind::Registration);
    }

    pub fn show_login(&mut self) {
        self.scheduler.cancel_all();
        self.ui.show(FormKind::Login);
    }

    pub fn show_registration(&mut self) {
        self.scheduler.cancel_all();
        self.ui.show(FormKind::Registration);
    }

    /// Drops the session, then behaves like a fresh page load
    pub async fn logout(&mut self) {
        self.scheduler.cancel_all();
        match self.session.clear_session().await {
            Ok(()) => {
                info!("User logged out");
                self.load().await;
            }
            Err(e) => self.show_failure(&FormError::from(e)),
        }
    }

    pub async fn submit_registration(&mut self, input: RegistrationInput) -> RegistrationOutcome {
        self.scheduler.cancel_all();
        self.ui.clear_feedback();

        match self.register(input).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.show_failure(&e);
                RegistrationOutcome::Failed(e)
            }
        }
    }

    pub async fn submit_login(&mut self, input: LoginInput) -> LoginOutcome {
        self.scheduler.cancel_all();
        self.ui.clear_feedback();

        match self.log_in(input).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.show_failure(&e);
                LoginOutcome::Failed(e)
            }
        }
    }

    /// Applies a timer report. Returns `false` when the report is stale.
    pub fn apply_timer(&mut self, fired: TimerFired) -> bool {
        if !self.scheduler.is_current(&fired) {
            debug!("Ignoring stale timer {:?}", fired.action);
            return false;
        }

        match fired.action {
            TimerAction::ClearMessage => self.ui.clear_message(),
            TimerAction::ShowRegistration => {
                self.scheduler.cancel_all();
                self.ui.show(FormKind::Registration);
            }
            TimerAction::Navigate(target) => {
                self.scheduler.cancel_all();
                self.ui.show(FormKind::Registration);
                info!("Navigating to {target}");
                self.ui.navigate(target);
            }
        }
        true
    }

    async fn register(
        &mut self,
        input: RegistrationInput,
    ) -> Result<RegistrationOutcome, FormError> {
        self.ui.fill_registration(RegistrationFields {
            login: input.login.clone(),
            password: input.password.clone(),
            save_data: input.save_data,
        });

        let errors = self
            .validator
            .validate_credentials(&input.login, &input.password);
        if !errors.is_empty() {
            warn!(
                "Registration rejected for {:?}: {}",
                input.login,
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ")
            );
            self.ui.set_registration_errors(errors.clone());
            return Ok(RegistrationOutcome::Rejected(errors));
        }

        if self
            .users
            .exists(&input.login, Some(&input.password))
            .await?
        {
            info!("{} is already registered, switching to login", input.login);
            self.redirect_to_login(&input);
            return Ok(RegistrationOutcome::AlreadyRegistered);
        }

        match self
            .validator
            .check_login_available(&self.users, &input.login)
            .await
        {
            Ok(()) => {}
            Err(FormError::LoginTaken) => {
                return Ok(match self.config.duplicate_login_policy {
                    DuplicateLoginPolicy::RejectTaken => {
                        warn!("Registration rejected, {} is taken", input.login);
                        self.ui.set_registration_errors(FieldErrors {
                            login: Some(FormError::LoginTaken),
                            password: None,
                        });
                        RegistrationOutcome::LoginTaken
                    }
                    DuplicateLoginPolicy::RedirectToLogin => {
                        info!("{} exists, switching to login", input.login);
                        self.redirect_to_login(&input);
                        RegistrationOutcome::AlreadyRegistered
                    }
                });
            }
            Err(e) => return Err(e),
        }

        self.users.append(&input.login, &input.password).await?;
        // The user is stored from here on, marker failures only warn
        let marker = if input.save_data {
            self.session.record_last_registered(&input.login).await
        } else {
            self.session.forget_last_registered().await
        };
        if let Err(e) = marker {
            warn!("Could not update the last registered login: {e}");
        }

        info!("Registered user {}", input.login);
        self.show_message(
            format!("User \"{}\" registered successfully!", input.login),
            MessageKind::Success,
        );
        self.ui.reset_registration();

        Ok(RegistrationOutcome::Registered)
    }

    async fn log_in(&mut self, input: LoginInput) -> Result<LoginOutcome, FormError> {
        self.ui.fill_login(LoginFields {
            login: input.login.clone(),
            password: input.password.clone(),
            remember_me: input.remember_me,
        });

        if !self
            .users
            .exists(&input.login, Some(&input.password))
            .await?
        {
            warn!("Failed login attempt for {:?}", input.login);
            self.ui.set_login_error(FormError::InvalidCredentials);
            self.show_message(LOGIN_FAILED_MESSAGE, MessageKind::Error);
            return Ok(LoginOutcome::Rejected);
        }

        if let Err(e) = self.session.record_login(&input.login).await {
            if let Err(cleanup) = self.session.clear_session().await {
                warn!("Could not roll back a partial session: {cleanup}");
            }
            return Err(e.into());
        }
        if let Err(e) = self
            .session
            .set_remember_me(&input.login, input.remember_me)
            .await
        {
            warn!("Could not update remember me for {}: {e}", input.login);
        }

        info!("User {} logged in", input.login);
        self.show_message(
            format!("Welcome, {}! Redirecting...", input.login),
            MessageKind::Success,
        );
        self.ui.reset_login();

        let next = match &self.config.post_login_destination {
            Some(target) => TimerAction::Navigate(target.clone()),
            None => TimerAction::ShowRegistration,
        };
        self.scheduler.schedule(self.config.redirect_delay, next);

        Ok(LoginOutcome::Accepted)
    }

    fn redirect_to_login(&mut self, input: &RegistrationInput) {
        let remember_me = self.ui.login().remember_me;
        self.ui.show(FormKind::Login);
        self.ui.fill_login(LoginFields {
            login: input.login.clone(),
            password: input.password.clone(),
            remember_me,
        });
        self.show_message(ALREADY_REGISTERED_MESSAGE, MessageKind::Info);
    }

    fn show_message(&mut self, text: impl Into<String>, kind: MessageKind) {
        self.ui.set_message(text, kind);
        self.scheduler
            .schedule(self.config.message_ttl, TimerAction::ClearMessage);
    }

    fn show_failure(&mut self, error: &FormError) {
        self.show_message(error.to_string(), MessageKind::Error);
    }
}
