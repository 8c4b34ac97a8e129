use crate::session::{Controller, PhaseKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    ConfirmSubmit,
    ConfirmQuit,
    ConfirmLogout,
    TimeWarning,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFocus {
    Username,
    Password,
    Login,
    Register,
}

impl AuthFocus {
    pub fn next(self) -> Self {
        match self {
            AuthFocus::Username => AuthFocus::Password,
            AuthFocus::Password => AuthFocus::Login,
            AuthFocus::Login => AuthFocus::Register,
            AuthFocus::Register => AuthFocus::Username,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            AuthFocus::Username => AuthFocus::Register,
            AuthFocus::Password => AuthFocus::Username,
            AuthFocus::Login => AuthFocus::Password,
            AuthFocus::Register => AuthFocus::Login,
        }
    }

    pub fn is_text(self) -> bool {
        matches!(self, AuthFocus::Username | AuthFocus::Password)
    }
}

/// Everything the terminal front end needs: the controller plus purely
/// presentational bits (form fields, cursors, dialogs).
pub struct AppState {
    pub controller: Controller,
    pub base_url: String,
    pub dialog_stack: Vec<Dialog>,
    pub auth_username: String,
    pub auth_password: String,
    pub auth_focus: AuthFocus,
    pub choice_cursor: usize,
    pub review_scroll: usize,
    pub should_quit: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusCounts {
    pub answered: usize,
    pub unanswered: usize,
}

impl AppState {
    pub fn new(controller: Controller, base_url: impl Into<String>) -> Self {
        Self {
            controller,
            base_url: base_url.into(),
            dialog_stack: Vec::new(),
            auth_username: String::new(),
            auth_password: String::new(),
            auth_focus: AuthFocus::Username,
            choice_cursor: 0,
            review_scroll: 0,
            should_quit: false,
        }
    }

    pub fn phase(&self) -> PhaseKind {
        self.controller.kind()
    }

    pub fn has_dialog(&self) -> bool {
        !self.dialog_stack.is_empty()
    }

    pub fn top_dialog(&self) -> Option<Dialog> {
        self.dialog_stack.last().copied()
    }

    pub fn push_dialog(&mut self, dialog: Dialog) {
        if self.top_dialog() != Some(dialog) {
            self.dialog_stack.push(dialog);
        }
    }

    pub fn pop_dialog(&mut self) -> Option<Dialog> {
        self.dialog_stack.pop()
    }

    pub fn status_counts(&self) -> StatusCounts {
        self.controller
            .attempt()
            .map(|a| StatusCounts {
                answered: a.answered_count(),
                unanswered: a.unanswered_count(),
            })
            .unwrap_or_default()
    }

    /// Puts the option cursor on the current question's saved answer, or
    /// on the first option.
    pub fn sync_choice_cursor(&mut self) {
        self.choice_cursor = self
            .controller
            .attempt()
            .and_then(|a| {
                let q = a.current_question();
                let selected = a.selected_for(q.id)?;
                q.options.iter().position(|o| o == selected)
            })
            .unwrap_or(0);
    }

    pub fn option_count(&self) -> usize {
        self.controller
            .attempt()
            .map(|a| a.current_question().options.len())
            .unwrap_or(0)
    }

    pub fn reset_auth_form(&mut self) {
        self.auth_password.clear();
        self.auth_focus = AuthFocus::Username;
    }

    /// Called after anything that may have moved the controller to another
    /// phase; overlays and cursors belong to the phase they were opened in.
    pub fn on_phase_change(&mut self, before: PhaseKind) {
        let now = self.phase();
        if now == before {
            return;
        }
        self.dialog_stack.clear();
        self.choice_cursor = 0;
        self.review_scroll = 0;
        if now == PhaseKind::Unauthenticated {
            self.reset_auth_form();
        }
        if before == PhaseKind::Unauthenticated {
            self.auth_password.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_focus_cycles_both_ways() {
        let mut f = AuthFocus::Username;
        for _ in 0..4 {
            f = f.next();
        }
        assert_eq!(f, AuthFocus::Username);
        assert_eq!(AuthFocus::Username.prev(), AuthFocus::Register);
        assert!(AuthFocus::Password.is_text());
        assert!(!AuthFocus::Login.is_text());
    }
}
