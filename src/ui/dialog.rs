use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::state::{AppState, Dialog};
use crate::timer::format_duration;
use crate::ui::layout::centered_rect;

pub fn draw_dialog(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(dialog) = state.top_dialog() else {
        return;
    };

    match dialog {
        Dialog::ConfirmSubmit => draw_confirm_submit(f, area, state),
        Dialog::ConfirmQuit => draw_confirm(
            f,
            area,
            "Quit the exam?",
            &["Your answers will be lost.", "The exam cannot be resumed."],
        ),
        Dialog::ConfirmLogout => draw_confirm(
            f,
            area,
            "Log out?",
            &["Any exam in progress is discarded."],
        ),
        Dialog::TimeWarning => draw_time_warning(f, area, state),
        Dialog::Help => draw_help(f, area),
    }
}

fn popup(f: &mut Frame, area: Rect, width: u16, lines: Vec<Line>, border: Color, title: &str) {
    let rect = centered_rect(width, lines.len() as u16 + 2, area);
    f.render_widget(Clear, rect);
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    if !title.is_empty() {
        block = block.title(format!(" {} ", title));
    }
    f.render_widget(Paragraph::new(lines).block(block), rect);
}

fn confirm_buttons() -> Line<'static> {
    Line::from(vec![
        Span::styled("   [Enter] Confirm", Style::default().fg(Color::Green)),
        Span::raw("    "),
        Span::styled("[Esc] Cancel", Style::default().fg(Color::DarkGray)),
    ])
}

fn heading(text: &str, color: Color) -> Line<'static> {
    Line::from(Span::styled(
        format!("   {}", text),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

fn draw_confirm(f: &mut Frame, area: Rect, title: &str, body: &[&str]) {
    let mut lines = vec![Line::from(""), heading(title, Color::Yellow), Line::from("")];
    for text in body {
        lines.push(Line::from(format!("   {}", text)));
    }
    lines.push(Line::from(""));
    lines.push(confirm_buttons());
    popup(f, area, 42, lines, Color::Yellow, "");
}

fn draw_confirm_submit(f: &mut Frame, area: Rect, state: &AppState) {
    let counts = state.status_counts();
    let mut lines = vec![
        Line::from(""),
        heading("Submit your answers?", Color::Yellow),
        Line::from(""),
    ];

    if counts.unanswered > 0 {
        lines.push(Line::from(Span::styled(
            format!("   {} questions are not answered.", counts.unanswered),
            Style::default().fg(Color::White),
        )));
    } else {
        lines.push(Line::from("   All questions are answered."));
    }
    lines.push(Line::from("   Answers cannot be changed afterwards."));
    lines.push(Line::from(""));
    lines.push(confirm_buttons());

    popup(f, area, 44, lines, Color::Yellow, "");
}

fn draw_time_warning(f: &mut Frame, area: Rect, state: &AppState) {
    let remaining = state
        .controller
        .attempt()
        .map(|a| a.remaining_seconds())
        .unwrap_or(0);
    let lines = vec![
        Line::from(""),
        heading(&format!("⚠  {} REMAINING", format_duration(remaining)), Color::Red),
        Line::from(""),
        Line::from("   Your answers will be submitted"),
        Line::from("   automatically when time runs out."),
        Line::from(""),
        Line::from(Span::styled(
            "          [Enter] Continue",
            Style::default().fg(Color::Green),
        )),
    ];
    popup(f, area, 42, lines, Color::Red, "");
}

fn draw_help(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        heading("Key Bindings", Color::Cyan),
        Line::from(""),
        Line::from("   a-z        Select option by letter"),
        Line::from("   ↑/↓        Move option cursor"),
        Line::from("   Space      Select option under cursor"),
        Line::from("   ←/→        Previous/Next question"),
        Line::from("   Home/End   First/Last question"),
        Line::from("   Ctrl+S     Submit (last question)"),
        Line::from("   Ctrl+L     Log out"),
        Line::from("   Ctrl+Q     Quit"),
        Line::from("   ?          This help"),
        Line::from("   Esc        Close dialog / clear message"),
        Line::from(""),
        Line::from(Span::styled(
            "        [Esc] Close",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    popup(f, area, 46, lines, Color::Cyan, "Help");
}
