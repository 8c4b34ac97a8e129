pub mod auth;
pub mod dialog;
pub mod keybar;
pub mod layout;
pub mod markdown;
pub mod question;
pub mod result;
pub mod sidebar;
pub mod start;
pub mod statusbar;
pub mod titlebar;

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::Frame;

use crate::session::{NoticeKind, PhaseKind};
use crate::state::AppState;

pub fn draw(f: &mut Frame, state: &AppState) {
    let area = f.area();

    match state.phase() {
        PhaseKind::Unauthenticated => auth::draw_auth(f, area, state),
        PhaseKind::Idle => start::draw_start(f, area, state),
        PhaseKind::InProgress => draw_exam(f, area, state),
        PhaseKind::Complete => result::draw_result(f, area, state),
    }

    if state.has_dialog() {
        dialog::draw_dialog(f, area, state);
    }
}

fn draw_exam(f: &mut Frame, area: Rect, state: &AppState) {
    let layout = layout::compute_layout(area);

    titlebar::draw_titlebar(f, layout.titlebar, state);
    sidebar::draw_sidebar(f, layout.sidebar, state);
    question::draw_question(f, layout.main, state);
    statusbar::draw_statusbar(f, layout.statusbar, state);
    keybar::draw_keybar(f, layout.keybar, state);
}

/// The current notice or loading indicator as a single line, if any.
pub fn notice_line(state: &AppState) -> Option<Line<'static>> {
    if let Some(notice) = state.controller.notice() {
        let color = match notice.kind {
            NoticeKind::Info => Color::Green,
            NoticeKind::Error => Color::Red,
        };
        return Some(Line::from(Span::styled(
            notice.text.clone(),
            Style::default().fg(color),
        )));
    }

    let pending: Vec<&str> = state.controller.pending().map(|op| op.label()).collect();
    if pending.is_empty() {
        return None;
    }
    Some(Line::from(Span::styled(
        format!("{}...", pending.join(", ")),
        Style::default().fg(Color::Yellow),
    )))
}
