use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::state::AppState;

pub fn draw_keybar(f: &mut Frame, area: Rect, state: &AppState) {
    let on_last = state
        .controller
        .attempt()
        .map(|a| a.is_last())
        .unwrap_or(false);

    let mut bindings: Vec<(&str, &str)> = vec![
        ("a-z", "answer"),
        ("↑/↓", "option"),
        ("Space", "select"),
        ("←/→", "prev/next"),
    ];
    if on_last {
        bindings.push(("Ctrl+S", "submit"));
    }
    bindings.push(("Ctrl+L", "logout"));
    bindings.push(("Ctrl+Q", "quit"));

    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    for (i, (key, action)) in bindings.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("   "));
        }
        spans.push(Span::styled(
            key.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {}", action)));
    }

    let widget = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Rgb(20, 20, 20)));
    f.render_widget(widget, area);
}
