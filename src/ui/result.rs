use chrono::Local;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::state::AppState;

pub fn draw_result(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(result) = state.controller.result() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(3)])
        .split(area);

    let color = if result.percent() >= 50 {
        Color::Green
    } else {
        Color::Red
    };
    let summary = vec![
        Line::from(""),
        Line::from(Span::styled(
            "✓  Exam Submitted",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "Score: {} / {}  ({}%)",
                result.score,
                result.total,
                result.percent()
            ),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            state
                .controller
                .submitted_at()
                .map(|t| format!("Submitted {}", t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")))
                .unwrap_or_default(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "[Enter] Back to start    [L] Logout    [Q] Exit",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let widget = Paragraph::new(summary)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(widget, chunks[0]);

    let mut lines: Vec<Line> = Vec::new();
    for (i, row) in state.controller.review().iter().enumerate() {
        let (mark, mark_style) = if row.is_correct() {
            ("✓", Style::default().fg(Color::Green))
        } else {
            ("✗", Style::default().fg(Color::Red))
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", mark), mark_style),
            Span::styled(
                format!("{}. {}", i + 1, row.prompt),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::from(format!(
            "     Your answer:    {}",
            row.selected.as_deref().unwrap_or("(not answered)")
        )));
        if let Some(correct) = &row.correct {
            lines.push(Line::from(Span::styled(
                format!("     Correct answer: {}", correct),
                Style::default().fg(Color::Cyan),
            )));
        }
        lines.push(Line::from(""));
    }

    // Each review row is three or four lines; scroll in whole rows.
    let offset: usize = state
        .controller
        .review()
        .iter()
        .take(state.review_scroll)
        .map(|row| if row.correct.is_some() { 4 } else { 3 })
        .sum();

    let review = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Review ")
                .title_style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .wrap(Wrap { trim: false })
        .scroll((offset.min(u16::MAX as usize) as u16, 0));
    f.render_widget(review, chunks[1]);
}
