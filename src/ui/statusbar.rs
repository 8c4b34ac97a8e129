use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::state::AppState;
use crate::ui::notice_line;

pub fn draw_statusbar(f: &mut Frame, area: Rect, state: &AppState) {
    let counts = state.status_counts();

    let mut spans = vec![
        Span::raw(" "),
        Span::styled(
            format!("● {} answered", counts.answered),
            Style::default().fg(Color::Green),
        ),
        Span::raw("   "),
        Span::styled(
            format!("○ {} unanswered", counts.unanswered),
            Style::default().fg(Color::White),
        ),
        Span::raw("   "),
    ];

    if let Some(line) = notice_line(state) {
        spans.extend(line.spans);
    } else {
        spans.push(Span::styled("[?] help", Style::default().fg(Color::DarkGray)));
    }

    let widget = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Rgb(30, 30, 30)));
    f.render_widget(widget, area);
}
