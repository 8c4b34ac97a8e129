use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::navigator::EXAM_DURATION_SECS;
use crate::state::AppState;
use crate::ui::notice_line;

pub fn draw_start(f: &mut Frame, area: Rect, state: &AppState) {
    let greeting = match state.controller.username() {
        Some(name) => format!("Welcome, {}", name),
        None => "Welcome back".to_string(),
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            greeting,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!(
            "You will have {} minutes once the exam starts.",
            EXAM_DURATION_SECS / 60
        )),
        Line::from("Answers are submitted automatically when time runs out."),
        Line::from(""),
    ];

    lines.push(notice_line(state).unwrap_or_else(|| Line::from("")));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(
            "[Enter] Start exam",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("    "),
        Span::styled("[L] Logout", Style::default().fg(Color::Yellow)),
        Span::raw("    "),
        Span::styled("[Q] Exit", Style::default().fg(Color::DarkGray)),
    ]));
    lines.push(Line::from(""));

    let block = Block::default().borders(Borders::ALL);
    let widget = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}
