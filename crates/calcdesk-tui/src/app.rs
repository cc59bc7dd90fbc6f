//! Application state management for calcdesk.
//!
//! This module contains the core `App` struct that holds the UI state, the
//! session and API client, and the channel that brings request outcomes back
//! from background tasks.

use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use calcdesk_core::api::{ApiClient, DEFAULT_HISTORY_LIMIT};
use calcdesk_core::auth::{Session, SessionData};
use calcdesk_core::config::Config;
use calcdesk_core::models::{
    Calculation, NewCalculation, NewUser, Operation, PasswordChange, TokenResponse, User,
    UserStatistics, UserUpdate,
};
use calcdesk_core::utils::parse_operand;

use crate::forms::{Form, TextInput, MAX_OPERAND_LENGTH};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the request result channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// How long a notice stays on screen
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Environment variables that prefill the login form
const USERNAME_ENV: &str = "CALCDESK_USERNAME";
const PASSWORD_ENV: &str = "CALCDESK_PASSWORD";

// Field indices
pub const USERNAME: usize = 0;
pub const PASSWORD: usize = 1;
pub const REGISTER_EMAIL: usize = 1;
pub const REGISTER_PASSWORD: usize = 2;
pub const PROFILE_EMAIL: usize = 1;
pub const CURRENT_PASSWORD: usize = 0;
pub const NEW_PASSWORD: usize = 1;

// ============================================================================
// UI State Types
// ============================================================================

/// Views of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    Register,
    Calculator,
    History,
    Profile,
}

impl Page {
    pub fn title(&self) -> &'static str {
        match self {
            Page::Login => "Login",
            Page::Register => "Register",
            Page::Calculator => "Calculator",
            Page::History => "History",
            Page::Profile => "Profile",
        }
    }

    /// Pages that need a logged-in user
    pub fn requires_auth(&self) -> bool {
        matches!(self, Page::Calculator | Page::History | Page::Profile)
    }

    /// Next authenticated page (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Page::Calculator => Page::History,
            Page::History => Page::Profile,
            Page::Profile => Page::Calculator,
            other => *other,
        }
    }

    /// Previous authenticated page (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Page::Calculator => Page::Profile,
            Page::History => Page::Calculator,
            Page::Profile => Page::History,
            other => *other,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    ConfirmingDelete(i64),
    ConfirmingAccountDelete,
    Quitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

/// Transient on-screen notice
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    shown_at: Instant,
}

impl Toast {
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= TOAST_DURATION
    }
}

/// Calculator form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcFocus {
    Operand1,
    Operation,
    Operand2,
    Button,
}

impl CalcFocus {
    pub fn next(&self) -> Self {
        match self {
            CalcFocus::Operand1 => CalcFocus::Operation,
            CalcFocus::Operation => CalcFocus::Operand2,
            CalcFocus::Operand2 => CalcFocus::Button,
            CalcFocus::Button => CalcFocus::Operand1,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            CalcFocus::Operand1 => CalcFocus::Button,
            CalcFocus::Operation => CalcFocus::Operand1,
            CalcFocus::Operand2 => CalcFocus::Operation,
            CalcFocus::Button => CalcFocus::Operand2,
        }
    }
}

pub struct CalculatorForm {
    pub operand1: TextInput,
    pub operation: Operation,
    pub operand2: TextInput,
    pub focus: CalcFocus,
    /// Last successful calculation, shown under the form
    pub result: Option<Calculation>,
}

impl Default for CalculatorForm {
    fn default() -> Self {
        Self {
            operand1: TextInput::new("First number").with_max_len(MAX_OPERAND_LENGTH),
            operation: Operation::Add,
            operand2: TextInput::new("Second number").with_max_len(MAX_OPERAND_LENGTH),
            focus: CalcFocus::Operand1,
            result: None,
        }
    }
}

impl CalculatorForm {
    pub fn focused_input_mut(&mut self) -> Option<&mut TextInput> {
        match self.focus {
            CalcFocus::Operand1 => Some(&mut self.operand1),
            CalcFocus::Operand2 => Some(&mut self.operand2),
            CalcFocus::Operation | CalcFocus::Button => None,
        }
    }

    /// Parse both operands into a request, or explain what is wrong
    pub fn to_request(&self) -> Result<NewCalculation, String> {
        let a = parse_operand(&self.operand1.value)
            .ok_or_else(|| "Please enter a valid first number".to_string())?;
        let b = parse_operand(&self.operand2.value)
            .ok_or_else(|| "Please enter a valid second number".to_string())?;
        Ok(NewCalculation::new(a, self.operation, b))
    }
}

/// Which form on the profile page has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSection {
    Profile,
    Password,
}

/// Why the profile is being fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileReason {
    /// Right after a successful login
    Login,
    /// Startup with a stored token
    Restore,
    /// After a profile edit
    Refresh,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Outcomes of background requests.
///
/// Each spawned request sends exactly one of these back through the MPSC
/// channel; `check_background_tasks` applies them to the app state.
#[derive(Debug)]
pub enum ApiResult {
    LoggedIn { username: String, token: TokenResponse },
    Registered { username: String },
    Profile { user: User, reason: ProfileReason },
    ProfileFailed(String),
    ProfileUpdated,
    PasswordChanged,
    Calculated(Calculation),
    History(Vec<Calculation>),
    Statistics(UserStatistics),
    CalculationDeleted,
    AccountDeleted(String),
    /// A request failed; the message is shown as-is
    Failed(String),
}

/// A finished request, tagged with the session generation that started it
#[derive(Debug)]
pub struct Response {
    pub generation: u64,
    pub result: ApiResult,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    /// Where config changes are written; `None` keeps them in memory
    config_path: Option<PathBuf>,
    pub session: Session,
    pub api: ApiClient,

    // UI State
    pub state: AppState,
    pub page: Page,
    pub toast: Option<Toast>,

    // Forms
    pub login_form: Form,
    pub register_form: Form,
    pub calculator: CalculatorForm,
    pub profile_form: Form,
    pub password_form: Form,
    pub profile_section: ProfileSection,

    // Display cache, overwritten on every profile fetch
    pub current_user: Option<User>,

    // History page
    pub calculations: Vec<Calculation>,
    pub statistics: Option<UserStatistics>,
    pub history_selection: usize,

    /// Requests spawned but not yet answered
    pub pending_requests: usize,

    /// Bumped on every login and logout; responses from an older
    /// generation are dropped
    session_generation: u64,

    // Background task channel
    result_rx: mpsc::Receiver<Response>,
    result_tx: mpsc::Sender<Response>,
}

impl App {
    /// Create the application from the on-disk config and session
    pub fn new(server_override: Option<&str>) -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let data_dir = config.data_dir()?;
        debug!(?data_dir, "Data directory configured");

        let mut session = Session::new(data_dir);
        if let Err(e) = session.load() {
            warn!(error = %e, "Failed to load stored session");
        }

        let server_url = config.server_url(server_override);
        info!(server = %server_url, "Using server");
        let api = ApiClient::new(&server_url)?;

        let config_path = match Config::config_path() {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "No config directory, settings will not be saved");
                None
            }
        };

        let mut app = Self::from_parts(config, config_path, session, api);

        if let Ok(username) = std::env::var(USERNAME_ENV) {
            app.login_form.set_value(USERNAME, &username);
        }
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            app.login_form.set_value(PASSWORD, &password);
        }

        Ok(app)
    }

    /// Assemble an app from already-loaded parts
    pub fn from_parts(
        config: Config,
        config_path: Option<PathBuf>,
        session: Session,
        mut api: ApiClient,
    ) -> Self {
        if let Some(token) = session.token() {
            api.set_token(token);
        }

        let mut login_form = Form::new(
            vec![TextInput::new("Username"), TextInput::masked("Password")],
            "Login",
        );
        if let Some(ref username) = config.last_username {
            login_form.set_value(USERNAME, username);
            login_form.focus = PASSWORD;
        }

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Self {
            config,
            config_path,
            session,
            api,

            state: AppState::Normal,
            page: Page::Login,
            toast: None,

            login_form,
            register_form: Form::new(
                vec![
                    TextInput::new("Username"),
                    TextInput::new("Email"),
                    TextInput::masked("Password"),
                ],
                "Register",
            ),
            calculator: CalculatorForm::default(),
            profile_form: Form::new(
                vec![TextInput::new("Username"), TextInput::new("Email")],
                "Save Profile",
            ),
            password_form: Form::new(
                vec![
                    TextInput::masked("Current password"),
                    TextInput::masked("New password"),
                ],
                "Change Password",
            ),
            profile_section: ProfileSection::Profile,

            current_user: None,

            calculations: Vec::new(),
            statistics: None,
            history_selection: 0,

            pending_requests: 0,
            session_generation: 0,

            result_rx: rx,
            result_tx: tx,
        }
    }

    /// Choose the initial view: restore a stored token or ask for login.
    pub fn start(&mut self) {
        if self.is_authenticated() {
            info!("Stored session found, restoring");
            self.show_toast("Restoring session...", ToastKind::Info);
            self.load_profile(ProfileReason::Restore);
        } else {
            self.page = Page::Login;
        }
    }

    fn save_config(&self) {
        if let Some(ref path) = self.config_path {
            if let Err(e) = self.config.save_to(path) {
                warn!(error = %e, "Failed to save config");
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.toast = Some(Toast::new(message, kind));
    }

    /// Drop the notice once it has been shown long enough
    pub fn tick(&mut self) {
        let now = Instant::now();
        if self.toast.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.toast = None;
        }
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    /// Run a request on a background task; its result comes back through
    /// the channel.
    fn spawn_request<Fut>(&mut self, request: Fut)
    where
        Fut: Future<Output = ApiResult> + Send + 'static,
    {
        self.pending_requests += 1;
        let generation = self.session_generation;
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let result = request.await;
            Self::send_result(&tx, Response { generation, result }).await;
        });
    }

    /// Helper to send request results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<Response>, response: Response) {
        if let Err(e) = tx.send(response).await {
            error!(error = %e, "Failed to send request result - channel closed");
        }
    }

    /// Check for completed background requests and apply their results
    pub fn check_background_tasks(&mut self) {
        while let Ok(response) = self.result_rx.try_recv() {
            self.pending_requests = self.pending_requests.saturating_sub(1);
            self.handle_response(response);
        }
    }

    /// Apply a response unless its session has since ended
    pub fn handle_response(&mut self, response: Response) {
        if response.generation != self.session_generation {
            debug!(
                generation = response.generation,
                current = self.session_generation,
                "Dropping response from a closed session"
            );
            return;
        }
        self.process_result(response.result);
    }

    /// Start a new session generation; responses already in flight go stale
    fn next_generation(&mut self) {
        self.session_generation = self.session_generation.wrapping_add(1);
    }

    /// Apply a single request outcome to the app state.
    fn process_result(&mut self, result: ApiResult) {
        match result {
            ApiResult::LoggedIn { username, token } => {
                self.next_generation();
                self.session.update(SessionData::from_login(token, username.clone()));
                if let Err(e) = self.session.save() {
                    warn!(error = %e, "Failed to save session");
                }
                if let Some(token) = self.session.token() {
                    self.api.set_token(token);
                }

                self.config.last_username = Some(username);
                self.save_config();

                self.login_form.set_value(PASSWORD, "");
                info!("Login successful");
                self.load_profile(ProfileReason::Login);
            }
            ApiResult::Registered { username } => {
                info!(username = %username, "Registration successful");
                self.register_form.reset();
                self.login_form.set_value(USERNAME, &username);
                self.login_form.set_value(PASSWORD, "");
                self.login_form.focus = PASSWORD;
                self.page = Page::Login;
                self.show_toast("Registration successful! Please login.", ToastKind::Success);
            }
            ApiResult::Profile { user, reason } => {
                if !self.is_authenticated() {
                    debug!("Ignoring profile for a closed session");
                    return;
                }
                self.profile_form.set_value(USERNAME, &user.username);
                self.profile_form.set_value(PROFILE_EMAIL, &user.email);
                self.current_user = Some(user);

                match reason {
                    ProfileReason::Login => {
                        self.page = Page::Calculator;
                        self.show_toast("Login successful!", ToastKind::Success);
                    }
                    ProfileReason::Restore => {
                        self.page = Page::Calculator;
                        self.toast = None;
                    }
                    ProfileReason::Refresh => {}
                }
            }
            ApiResult::ProfileFailed(message) => {
                error!(error = %message, "Profile fetch failed, logging out");
                self.clear_session();
                self.show_toast(message, ToastKind::Error);
            }
            ApiResult::ProfileUpdated => {
                self.show_toast("Profile updated successfully!", ToastKind::Success);
                self.load_profile(ProfileReason::Refresh);
            }
            ApiResult::PasswordChanged => {
                self.password_form.reset();
                self.show_toast("Password changed successfully!", ToastKind::Success);
            }
            ApiResult::Calculated(calc) => {
                self.calculator.result = Some(calc);
                self.show_toast("Calculation performed successfully!", ToastKind::Success);
            }
            ApiResult::History(calculations) => {
                if !self.is_authenticated() {
                    return;
                }
                self.calculations = calculations;
                self.history_selection = self
                    .history_selection
                    .min(self.calculations.len().saturating_sub(1));
            }
            ApiResult::Statistics(stats) => {
                if !self.is_authenticated() {
                    return;
                }
                self.statistics = Some(stats);
            }
            ApiResult::CalculationDeleted => {
                self.show_toast("Calculation deleted successfully", ToastKind::Success);
                self.load_history();
            }
            ApiResult::AccountDeleted(message) => {
                info!("Account deleted");
                self.clear_session();
                self.config.last_username = None;
                self.save_config();
                self.login_form.reset();
                self.show_toast(message, ToastKind::Success);
            }
            ApiResult::Failed(message) => {
                warn!(error = %message, "Request failed");
                self.show_toast(message, ToastKind::Error);
            }
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Submit the login form
    pub fn login(&mut self) {
        let username = self.login_form.value(USERNAME).trim().to_string();
        let password = self.login_form.value(PASSWORD).to_string();

        let api = self.api.clone();
        self.spawn_request(async move {
            match api.login(&username, &password).await {
                Ok(token) => ApiResult::LoggedIn { username, token },
                Err(e) => ApiResult::Failed(e.to_string()),
            }
        });
    }

    /// Submit the registration form
    pub fn register(&mut self) {
        let user = NewUser {
            username: self.register_form.value(USERNAME).trim().to_string(),
            email: self.register_form.value(REGISTER_EMAIL).trim().to_string(),
            password: self.register_form.value(REGISTER_PASSWORD).to_string(),
        };

        let api = self.api.clone();
        self.spawn_request(async move {
            match api.register(&user).await {
                Ok(created) => ApiResult::Registered {
                    username: created.username,
                },
                Err(e) => ApiResult::Failed(e.to_string()),
            }
        });
    }

    /// Forget the token and everything fetched with it, and show the login view
    fn clear_session(&mut self) {
        self.next_generation();
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to remove stored session");
        }
        self.api.clear_token();
        self.current_user = None;
        self.calculations.clear();
        self.statistics = None;
        self.history_selection = 0;
        self.calculator = CalculatorForm::default();
        self.profile_form.reset();
        self.password_form.reset();
        self.profile_section = ProfileSection::Profile;
        self.state = AppState::Normal;
        self.page = Page::Login;
        self.login_form.focus = if self.login_form.value(USERNAME).is_empty() {
            USERNAME
        } else {
            PASSWORD
        };
    }

    pub fn logout(&mut self) {
        info!("Logging out");
        self.clear_session();
        self.show_toast("Logged out successfully", ToastKind::Info);
    }

    /// Fetch the current user; any failure logs out.
    pub fn load_profile(&mut self, reason: ProfileReason) {
        let api = self.api.clone();
        self.spawn_request(async move {
            match api.current_user().await {
                Ok(user) => ApiResult::Profile { user, reason },
                Err(e) => ApiResult::ProfileFailed(e.to_string()),
            }
        });
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn open_page(&mut self, page: Page) {
        if page.requires_auth() && !self.is_authenticated() {
            return;
        }
        self.page = page;
        if page == Page::History {
            self.load_history();
        }
    }

    // =========================================================================
    // Calculator
    // =========================================================================

    pub fn calculate(&mut self) {
        let request = match self.calculator.to_request() {
            Ok(r) => r,
            Err(message) => {
                self.show_toast(message, ToastKind::Error);
                return;
            }
        };

        let api = self.api.clone();
        self.spawn_request(async move {
            match api.create_calculation(&request).await {
                Ok(calc) => ApiResult::Calculated(calc),
                Err(e) => ApiResult::Failed(e.to_string()),
            }
        });
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Reload the history table and the statistics as two requests
    pub fn load_history(&mut self) {
        let api = self.api.clone();
        self.spawn_request(async move {
            match api.list_calculations(0, DEFAULT_HISTORY_LIMIT).await {
                Ok(list) => ApiResult::History(list),
                Err(e) => ApiResult::Failed(e.to_string()),
            }
        });

        let api = self.api.clone();
        self.spawn_request(async move {
            match api.statistics().await {
                Ok(stats) => ApiResult::Statistics(stats),
                Err(e) => ApiResult::Failed(e.to_string()),
            }
        });
    }

    pub fn selected_calculation(&self) -> Option<&Calculation> {
        self.calculations.get(self.history_selection)
    }

    /// Ask for confirmation before deleting the selected row
    pub fn confirm_delete_selected(&mut self) {
        if let Some(id) = self.selected_calculation().map(|c| c.id) {
            self.state = AppState::ConfirmingDelete(id);
        }
    }

    pub fn delete_calculation(&mut self, id: i64) {
        let api = self.api.clone();
        self.spawn_request(async move {
            match api.delete_calculation(id).await {
                Ok(_) => ApiResult::CalculationDeleted,
                Err(e) => ApiResult::Failed(e.to_string()),
            }
        });
    }

    // =========================================================================
    // Profile
    // =========================================================================

    pub fn update_profile(&mut self) {
        let update = UserUpdate {
            username: Some(self.profile_form.value(USERNAME).trim().to_string()),
            email: Some(self.profile_form.value(PROFILE_EMAIL).trim().to_string()),
        };

        let api = self.api.clone();
        self.spawn_request(async move {
            match api.update_profile(&update).await {
                Ok(_) => ApiResult::ProfileUpdated,
                Err(e) => ApiResult::Failed(e.to_string()),
            }
        });
    }

    pub fn change_password(&mut self) {
        let change = PasswordChange {
            current_password: self.password_form.value(CURRENT_PASSWORD).to_string(),
            new_password: self.password_form.value(NEW_PASSWORD).to_string(),
        };

        let api = self.api.clone();
        self.spawn_request(async move {
            match api.change_password(&change).await {
                Ok(_) => ApiResult::PasswordChanged,
                Err(e) => ApiResult::Failed(e.to_string()),
            }
        });
    }

    pub fn delete_account(&mut self) {
        let api = self.api.clone();
        self.spawn_request(async move {
            match api.delete_account().await {
                Ok(msg) => ApiResult::AccountDeleted(msg.message),
                Err(e) => ApiResult::Failed(e.to_string()),
            }
        });
    }

    /// The form on the profile page that currently has focus
    pub fn active_profile_form_mut(&mut self) -> &mut Form {
        match self.profile_section {
            ProfileSection::Profile => &mut self.profile_form,
            ProfileSection::Password => &mut self.password_form,
        }
    }

    /// Move focus forward, continuing into the other form past a button
    pub fn profile_focus_next(&mut self) {
        if self.active_profile_form_mut().on_button() {
            self.profile_section = match self.profile_section {
                ProfileSection::Profile => ProfileSection::Password,
                ProfileSection::Password => ProfileSection::Profile,
            };
            self.active_profile_form_mut().focus = 0;
        } else {
            self.active_profile_form_mut().focus_next();
        }
    }

    /// Move focus backward, continuing into the other form before a first field
    pub fn profile_focus_prev(&mut self) {
        if self.active_profile_form_mut().focus == 0 {
            self.profile_section = match self.profile_section {
                ProfileSection::Profile => ProfileSection::Password,
                ProfileSection::Password => ProfileSection::Profile,
            };
            self.active_profile_form_mut().focus_button();
        } else {
            self.active_profile_form_mut().focus_prev();
        }
    }

    /// Name for the title bar
    pub fn display_username(&self) -> Option<&str> {
        self.current_user
            .as_ref()
            .map(|u| u.username.as_str())
            .or_else(|| self.session.username())
    }
}

// ============================================================================
// Tests
// ============================================================================
