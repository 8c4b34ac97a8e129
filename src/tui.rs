use std::io;
use std::sync::mpsc;
use std::time::Duration;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::CrosstermBackend;
use ratatui::Terminal;

use crate::error::Result;
use crate::session::PhaseKind;
use crate::state::{AppState, AuthFocus, Dialog};
use crate::timer::TimerEvent;
use crate::transport::Reply;

pub fn run_tui(
    mut state: AppState,
    timer_rx: mpsc::Receiver<TimerEvent>,
    reply_rx: mpsc::Receiver<Reply>,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = main_loop(&mut terminal, &mut state, &timer_rx, &reply_rx);

    // Restore terminal
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result
}

fn main_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    timer_rx: &mpsc::Receiver<TimerEvent>,
    reply_rx: &mpsc::Receiver<Reply>,
) -> Result<()> {
    loop {
        terminal.draw(|f| crate::ui::draw(f, state))?;

        if state.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(key, state);
                }
            }
        }

        while let Ok(ev) = timer_rx.try_recv() {
            handle_timer(ev, state);
        }

        while let Ok(reply) = reply_rx.try_recv() {
            handle_reply(reply, state);
        }
    }

    tracing::info!("quitting");
    Ok(())
}

pub fn handle_timer(event: TimerEvent, state: &mut AppState) {
    let before = state.phase();
    state.controller.handle_timer(event);
    state.on_phase_change(before);
    if state.controller.take_time_warning() {
        state.push_dialog(Dialog::TimeWarning);
    }
}

pub fn handle_reply(reply: Reply, state: &mut AppState) {
    let before = state.phase();
    state.controller.handle_reply(reply);
    state.on_phase_change(before);
}

pub fn handle_key(key: KeyEvent, state: &mut AppState) {
    let before = state.phase();

    if state.has_dialog() {
        handle_dialog_key(key, state);
    } else {
        match before {
            PhaseKind::Unauthenticated => handle_auth_key(key, state),
            PhaseKind::Idle => handle_start_key(key, state),
            PhaseKind::InProgress => handle_exam_key(key, state),
            PhaseKind::Complete => handle_result_key(key, state),
        }
    }

    state.on_phase_change(before);
}

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

fn handle_auth_key(key: KeyEvent, state: &mut AppState) {
    if is_ctrl(&key, 'q') || is_ctrl(&key, 'c') {
        state.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Tab | KeyCode::Down => state.auth_focus = state.auth_focus.next(),
        KeyCode::BackTab | KeyCode::Up => state.auth_focus = state.auth_focus.prev(),
        KeyCode::Esc => state.controller.dismiss_notice(),
        KeyCode::Enter => match state.auth_focus {
            AuthFocus::Username => state.auth_focus = AuthFocus::Password,
            AuthFocus::Password | AuthFocus::Login => submit_login(state),
            AuthFocus::Register => submit_register(state),
        },
        KeyCode::Backspace => {
            if let Some(field) = focused_field(state) {
                field.pop();
            }
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(field) = focused_field(state) {
                field.push(c);
            }
        }
        _ => {}
    }
}

fn focused_field(state: &mut AppState) -> Option<&mut String> {
    match state.auth_focus {
        AuthFocus::Username => Some(&mut state.auth_username),
        AuthFocus::Password => Some(&mut state.auth_password),
        AuthFocus::Login | AuthFocus::Register => None,
    }
}

fn submit_login(state: &mut AppState) {
    let username = state.auth_username.trim().to_string();
    state.controller.login(&username, &state.auth_password);
}

fn submit_register(state: &mut AppState) {
    let username = state.auth_username.trim().to_string();
    state.controller.register(&username, &state.auth_password);
}

fn handle_start_key(key: KeyEvent, state: &mut AppState) {
    if is_ctrl(&key, 'q') || is_ctrl(&key, 'c') {
        state.should_quit = true;
        return;
    }
    match key.code {
        KeyCode::Enter | KeyCode::Char('s') => state.controller.start_exam(),
        KeyCode::Char('l') => state.controller.logout(),
        KeyCode::Char('q') => state.should_quit = true,
        KeyCode::Esc => state.controller.dismiss_notice(),
        _ => {}
    }
}

fn handle_exam_key(key: KeyEvent, state: &mut AppState) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('c') => state.push_dialog(Dialog::ConfirmQuit),
            KeyCode::Char('s') => request_submit(state),
            KeyCode::Char('l') => state.push_dialog(Dialog::ConfirmLogout),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Up => {
            state.choice_cursor = state.choice_cursor.saturating_sub(1);
        }
        KeyCode::Down => {
            let count = state.option_count();
            if count > 0 {
                state.choice_cursor = (state.choice_cursor + 1).min(count - 1);
            }
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            let idx = state.choice_cursor;
            state.controller.select_current(idx);
        }
        KeyCode::Char(c) if c.is_ascii_lowercase() => {
            let idx = (c as u8 - b'a') as usize;
            if state.controller.select_current(idx) {
                state.choice_cursor = idx;
            }
        }
        KeyCode::Right | KeyCode::PageDown => {
            state.controller.next();
            state.sync_choice_cursor();
        }
        KeyCode::Left | KeyCode::PageUp => {
            state.controller.previous();
            state.sync_choice_cursor();
        }
        KeyCode::Home => {
            state.controller.first();
            state.sync_choice_cursor();
        }
        KeyCode::End => {
            state.controller.last();
            state.sync_choice_cursor();
        }
        KeyCode::Char('?') => state.push_dialog(Dialog::Help),
        KeyCode::Esc => state.controller.dismiss_notice(),
        _ => {}
    }
}

fn request_submit(state: &mut AppState) {
    let Some(attempt) = state.controller.attempt() else {
        return;
    };
    if attempt.is_submitting() {
        return;
    }
    if attempt.is_last() {
        state.push_dialog(Dialog::ConfirmSubmit);
    } else {
        // Surfaces the "go to the last question" notice.
        state.controller.submit();
    }
}

fn handle_result_key(key: KeyEvent, state: &mut AppState) {
    if is_ctrl(&key, 'q') || is_ctrl(&key, 'c') {
        state.should_quit = true;
        return;
    }
    match key.code {
        KeyCode::Up => state.review_scroll = state.review_scroll.saturating_sub(1),
        KeyCode::Down => {
            let max = state.controller.review().len().saturating_sub(1);
            state.review_scroll = (state.review_scroll + 1).min(max);
        }
        KeyCode::Enter => state.controller.back_to_start(),
        KeyCode::Char('l') => state.controller.logout(),
        KeyCode::Char('q') => state.should_quit = true,
        _ => {}
    }
}

fn handle_dialog_key(key: KeyEvent, state: &mut AppState) {
    match state.top_dialog() {
        Some(Dialog::ConfirmSubmit) => match key.code {
            KeyCode::Enter | KeyCode::Char('y') => {
                state.pop_dialog();
                state.controller.submit();
            }
            KeyCode::Esc | KeyCode::Char('n') => {
                state.pop_dialog();
            }
            _ => {}
        },
        Some(Dialog::ConfirmQuit) => match key.code {
            KeyCode::Enter | KeyCode::Char('y') => {
                state.should_quit = true;
            }
            KeyCode::Esc | KeyCode::Char('n') => {
                state.pop_dialog();
            }
            _ => {}
        },
        Some(Dialog::ConfirmLogout) => match key.code {
            KeyCode::Enter | KeyCode::Char('y') => {
                state.pop_dialog();
                state.controller.logout();
            }
            KeyCode::Esc | KeyCode::Char('n') => {
                state.pop_dialog();
            }
            _ => {}
        },
        Some(Dialog::TimeWarning) => match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                state.pop_dialog();
            }
            _ => {}
        },
        Some(Dialog::Help) => match key.code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter => {
                state.pop_dialog();
            }
            _ => {}
        },
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Question;
    use crate::persist::MemoryTokenStore;
    use crate::session::Controller;
    use crate::transport::{Operation, RecordingTransport, Request, Response};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            handle_key(key(KeyCode::Char(c)), state);
        }
    }

    fn reply_to_last(state: &mut AppState, transport: &RecordingTransport, response: Response) {
        let (ticket, _) = transport.last().unwrap();
        handle_reply(
            Reply {
                ticket,
                outcome: Ok(response),
            },
            state,
        );
    }

    fn exam_state() -> (AppState, RecordingTransport) {
        let transport = RecordingTransport::default();
        let controller = Controller::new(
            transport.clone(),
            MemoryTokenStore::with_token("tok"),
            None,
        );
        let mut state = AppState::new(controller, "http://localhost:5000");
        handle_key(key(KeyCode::Enter), &mut state);
        reply_to_last(
            &mut state,
            &transport,
            Response::Questions(vec![
                Question {
                    id: 1,
                    prompt: "What is the capital of France?".into(),
                    options: vec!["Berlin".into(), "Madrid".into(), "Paris".into()],
                },
                Question {
                    id: 2,
                    prompt: "Which planet is known as the Red Planet?".into(),
                    options: vec!["Earth".into(), "Mars".into()],
                },
            ]),
        );
        (state, transport)
    }

    #[test]
    fn login_form_sends_typed_credentials() {
        let transport = RecordingTransport::default();
        let controller = Controller::new(transport.clone(), MemoryTokenStore::default(), None);
        let mut state = AppState::new(controller, "http://localhost:5000");

        type_text(&mut state, "alice");
        handle_key(key(KeyCode::Enter), &mut state);
        assert_eq!(state.auth_focus, AuthFocus::Password);
        type_text(&mut state, "pw");
        handle_key(key(KeyCode::Enter), &mut state);

        match transport.last() {
            Some((_, Request::Login(creds))) => {
                assert_eq!(creds.username, "alice");
                assert_eq!(creds.password, "pw");
            }
            other => panic!("unexpected {:?}", other),
        }

        reply_to_last(&mut state, &transport, Response::LoggedIn("tok".into()));
        assert_eq!(state.phase(), PhaseKind::Idle);
        assert!(state.auth_password.is_empty());
    }

    #[test]
    fn letter_keys_select_options_and_cursor_follows_navigation() {
        let (mut state, _) = exam_state();
        handle_key(key(KeyCode::Char('c')), &mut state);
        assert_eq!(state.controller.attempt().unwrap().selected_for(1), Some("Paris"));

        handle_key(key(KeyCode::Right), &mut state);
        assert_eq!(state.choice_cursor, 0);
        handle_key(key(KeyCode::Left), &mut state);
        assert_eq!(state.choice_cursor, 2);
    }

    #[test]
    fn submit_needs_last_question_and_confirmation() {
        let (mut state, transport) = exam_state();
        handle_key(ctrl('s'), &mut state);
        assert!(!state.has_dialog());
        assert!(state.controller.notice().is_some());

        handle_key(key(KeyCode::End), &mut state);
        handle_key(ctrl('s'), &mut state);
        assert_eq!(state.top_dialog(), Some(Dialog::ConfirmSubmit));
        handle_key(key(KeyCode::Enter), &mut state);
        assert_eq!(transport.count(Operation::Submit), 1);
        assert!(!state.has_dialog());
    }

    #[test]
    fn dialogs_close_when_phase_changes() {
        let (mut state, _) = exam_state();
        handle_key(key(KeyCode::Char('?')), &mut state);
        assert!(state.has_dialog());
        state.controller.logout();
        state.on_phase_change(PhaseKind::InProgress);
        assert!(!state.has_dialog());
    }

    #[test]
    fn confirm_logout_from_exam() {
        let (mut state, _) = exam_state();
        handle_key(ctrl('l'), &mut state);
        assert_eq!(state.top_dialog(), Some(Dialog::ConfirmLogout));
        handle_key(key(KeyCode::Enter), &mut state);
        assert_eq!(state.phase(), PhaseKind::Unauthenticated);
        assert!(!state.has_dialog());
    }
}
