//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use std::str::FromStr;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use calcdesk_core::models::Operation;

use crate::app::{App, AppState, CalcFocus, Page, ProfileSection};
use crate::forms::{is_number_char, FormAction};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle confirmations
    match app.state {
        AppState::ConfirmingQuit => {
            return Ok(handle_confirm(app, key, |app| {
                app.state = AppState::Quitting;
            }));
        }
        AppState::ConfirmingDelete(id) => {
            handle_confirm(app, key, |app| app.delete_calculation(id));
            return Ok(false);
        }
        AppState::ConfirmingAccountDelete => {
            handle_confirm(app, key, |app| app.delete_account());
            return Ok(false);
        }
        AppState::Normal | AppState::ShowingHelp | AppState::Quitting => {}
    }

    // Global keys
    match key.code {
        KeyCode::F(1) => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Esc => {
            if app.page == Page::Register {
                app.open_page(Page::Login);
            } else {
                app.state = AppState::ConfirmingQuit;
            }
            return Ok(false);
        }
        KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if app.is_authenticated() {
                app.logout();
            }
            return Ok(false);
        }
        KeyCode::PageDown if app.is_authenticated() => {
            app.open_page(app.page.next());
            return Ok(false);
        }
        KeyCode::PageUp if app.is_authenticated() => {
            app.open_page(app.page.prev());
            return Ok(false);
        }
        KeyCode::F(n @ 2..=4) => {
            handle_page_key(app, n);
            return Ok(false);
        }
        _ => {}
    }

    // Remaining control chords are never text
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('d') && app.page == Page::Profile {
            app.state = AppState::ConfirmingAccountDelete;
        }
        return Ok(false);
    }

    match app.page {
        Page::Login => handle_login_input(app, key),
        Page::Register => handle_register_input(app, key),
        Page::Calculator => handle_calculator_input(app, key),
        Page::History => handle_history_input(app, key),
        Page::Profile => handle_profile_input(app, key),
    }

    Ok(false)
}

/// Y/Enter runs `confirm`; N/Esc cancels. Returns true if confirmed.
fn handle_confirm(app: &mut App, key: KeyEvent, confirm: impl FnOnce(&mut App)) -> bool {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            app.state = AppState::Normal;
            confirm(app);
            true
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.state = AppState::Normal;
            false
        }
        _ => false,
    }
}

fn handle_page_key(app: &mut App, n: u8) {
    if app.is_authenticated() {
        let page = match n {
            2 => Page::Calculator,
            3 => Page::History,
            _ => Page::Profile,
        };
        app.open_page(page);
    } else if n == 2 {
        let page = if app.page == Page::Register {
            Page::Login
        } else {
            Page::Register
        };
        app.open_page(page);
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::Down => app.login_form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.login_form.focus_prev(),
        KeyCode::Enter => {
            if app.login_form.enter() == FormAction::Submit {
                app.login();
            }
        }
        KeyCode::Backspace => app.login_form.handle_backspace(),
        KeyCode::Char(c) => app.login_form.handle_char(c),
        _ => {}
    }
}

fn handle_register_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::Down => app.register_form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.register_form.focus_prev(),
        KeyCode::Enter => {
            if app.register_form.enter() == FormAction::Submit {
                app.register();
            }
        }
        KeyCode::Backspace => app.register_form.handle_backspace(),
        KeyCode::Char(c) => app.register_form.handle_char(c),
        _ => {}
    }
}

fn handle_calculator_input(app: &mut App, key: KeyEvent) {
    let calc = &mut app.calculator;
    match key.code {
        KeyCode::Tab | KeyCode::Down => calc.focus = calc.focus.next(),
        KeyCode::BackTab | KeyCode::Up => calc.focus = calc.focus.prev(),
        KeyCode::Enter => match calc.focus {
            CalcFocus::Operand2 | CalcFocus::Button => app.calculate(),
            CalcFocus::Operand1 | CalcFocus::Operation => calc.focus = calc.focus.next(),
        },
        KeyCode::Right | KeyCode::Char(' ') if calc.focus == CalcFocus::Operation => {
            calc.operation = calc.operation.next();
        }
        KeyCode::Left if calc.focus == CalcFocus::Operation => {
            calc.operation = calc.operation.prev();
        }
        KeyCode::Backspace => {
            if let Some(input) = calc.focused_input_mut() {
                input.pop();
            }
        }
        KeyCode::Char(c) => {
            if calc.focus == CalcFocus::Operation {
                if let Ok(op) = Operation::from_str(&c.to_string()) {
                    calc.operation = op;
                }
            } else if let Some(input) = calc.focused_input_mut() {
                if is_number_char(c) {
                    input.push(c);
                }
            }
        }
        _ => {}
    }
}

fn handle_history_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.history_selection = app.history_selection.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.history_selection + 1 < app.calculations.len() {
                app.history_selection += 1;
            }
        }
        KeyCode::Home => app.history_selection = 0,
        KeyCode::End => app.history_selection = app.calculations.len().saturating_sub(1),
        KeyCode::Char('d') | KeyCode::Delete => app.confirm_delete_selected(),
        KeyCode::Char('r') => app.load_history(),
        _ => {}
    }
}

fn handle_profile_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::Down => app.profile_focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.profile_focus_prev(),
        KeyCode::Enter => {
            if app.active_profile_form_mut().enter() == FormAction::Submit {
                match app.profile_section {
                    ProfileSection::Profile => app.update_profile(),
                    ProfileSection::Password => app.change_password(),
                }
            }
        }
        KeyCode::Backspace => app.active_profile_form_mut().handle_backspace(),
        KeyCode::Char(c) => app.active_profile_form_mut().handle_char(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calcdesk_core::api::ApiClient;
    use calcdesk_core::auth::{Session, SessionData};
    use calcdesk_core::config::Config;
    use calcdesk_core::models::{Calculation, TokenResponse};
    use chrono::Utc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn test_app(dir: &tempfile::TempDir, logged_in: bool) -> App {
        let mut session = Session::new(dir.path().to_path_buf());
        if logged_in {
            session.update(SessionData::from_login(
                TokenResponse {
                    access_token: "tok".to_string(),
                    token_type: "bearer".to_string(),
                },
                "alice",
            ));
        }
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        let mut app = App::from_parts(Config::default(), None, session, api);
        if logged_in {
            app.page = Page::Calculator;
        }
        app
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            handle_input(app, key(KeyCode::Char(c))).unwrap();
        }
    }

    // -------------------------------------------------------------------------
    // Global keys
    // -------------------------------------------------------------------------

    #[test]
    fn test_quit_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir, false);

        assert!(!handle_input(&mut app, key(KeyCode::Esc)).unwrap());
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!handle_input(&mut app, key(KeyCode::Char('n'))).unwrap());
        assert_eq!(app.state, AppState::Normal);

        handle_input(&mut app, key(KeyCode::Esc)).unwrap();
        assert!(handle_input(&mut app, key(KeyCode::Char('y'))).unwrap());
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn test_help_toggle() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir, false);
        handle_input(&mut app, key(KeyCode::F(1))).unwrap();
        assert_eq!(app.state, AppState::ShowingHelp);
        handle_input(&mut app, key(KeyCode::Char('x'))).unwrap();
        assert_eq!(app.state, AppState::ShowingHelp);
        handle_input(&mut app, key(KeyCode::F(1))).unwrap();
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_f2_toggles_register_when_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir, false);
        handle_input(&mut app, key(KeyCode::F(2))).unwrap();
        assert_eq!(app.page, Page::Register);
        handle_input(&mut app, key(KeyCode::F(3))).unwrap();
        assert_eq!(app.page, Page::Register);
        handle_input(&mut app, key(KeyCode::Esc)).unwrap();
        assert_eq!(app.page, Page::Login);
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_ctrl_l_logs_out() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir, true);
        handle_input(&mut app, ctrl('l')).unwrap();
        assert_eq!(app.page, Page::Login);
        assert!(!app.is_authenticated());
    }

    // -------------------------------------------------------------------------
    // Forms
    // -------------------------------------------------------------------------

    #[test]
    fn test_login_typing_and_focus() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir, false);
        type_str(&mut app, "alice");
        handle_input(&mut app, key(KeyCode::Tab)).unwrap();
        type_str(&mut app, "secret1");
        handle_input(&mut app, key(KeyCode::Backspace)).unwrap();

        assert_eq!(app.login_form.value(0), "alice");
        assert_eq!(app.login_form.value(1), "secret");
    }

    #[test]
    fn test_calculator_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir, true);

        type_str(&mut app, "1a5");
        assert_eq!(app.calculator.operand1.value, "15");

        handle_input(&mut app, key(KeyCode::Enter)).unwrap();
        assert_eq!(app.calculator.focus, CalcFocus::Operation);
        handle_input(&mut app, key(KeyCode::Right)).unwrap();
        assert_eq!(app.calculator.operation, Operation::Subtract);
        handle_input(&mut app, key(KeyCode::Left)).unwrap();
        handle_input(&mut app, key(KeyCode::Left)).unwrap();
        assert_eq!(app.calculator.operation, Operation::Modulo);
        type_str(&mut app, "^");
        assert_eq!(app.calculator.operation, Operation::Power);

        handle_input(&mut app, key(KeyCode::Tab)).unwrap();
        type_str(&mut app, "8");
        assert_eq!(app.calculator.operand2.value, "8");
    }

    #[test]
    fn test_profile_ctrl_d_asks_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir, true);
        app.page = Page::Profile;
        handle_input(&mut app, ctrl('d')).unwrap();
        assert_eq!(app.state, AppState::ConfirmingAccountDelete);
        handle_input(&mut app, key(KeyCode::Esc)).unwrap();
        assert_eq!(app.state, AppState::Normal);
    }

    // -------------------------------------------------------------------------
    // History
    // -------------------------------------------------------------------------

    #[test]
    fn test_history_selection_and_delete_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir, true);
        app.page = Page::History;
        app.calculations = (1..=3)
            .map(|id| Calculation {
                id,
                user_id: 1,
                operation: Operation::Add,
                operand1: 1.0,
                operand2: 1.0,
                result: 2.0,
                created_at: Utc::now(),
            })
            .collect();

        handle_input(&mut app, key(KeyCode::Down)).unwrap();
        handle_input(&mut app, key(KeyCode::Down)).unwrap();
        handle_input(&mut app, key(KeyCode::Down)).unwrap();
        assert_eq!(app.history_selection, 2);
        handle_input(&mut app, key(KeyCode::Up)).unwrap();
        assert_eq!(app.history_selection, 1);

        handle_input(&mut app, key(KeyCode::Char('d'))).unwrap();
        assert_eq!(app.state, AppState::ConfirmingDelete(2));
        handle_input(&mut app, key(KeyCode::Char('n'))).unwrap();
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.pending_requests, 0);
    }
}
