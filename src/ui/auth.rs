use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::state::{AppState, AuthFocus};
use crate::transport::Operation;
use crate::ui::layout::centered_rect;
use crate::ui::notice_line;

const FORM_WIDTH: u16 = 56;

pub fn draw_auth(f: &mut Frame, area: Rect, state: &AppState) {
    let box_width = FORM_WIDTH.saturating_sub(8) as usize;

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Exam Login",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("  {}", state.base_url),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    let masked = "*".repeat(state.auth_password.chars().count());
    lines.extend(input_box(
        "Username",
        &state.auth_username,
        state.auth_focus == AuthFocus::Username,
        box_width,
    ));
    lines.push(Line::from(""));
    lines.extend(input_box(
        "Password",
        &masked,
        state.auth_focus == AuthFocus::Password,
        box_width,
    ));
    lines.push(Line::from(""));

    let busy = state.controller.is_pending(Operation::Login)
        || state.controller.is_pending(Operation::Register);
    lines.push(Line::from(vec![
        Span::raw("        "),
        Span::styled(
            "[ Login ]",
            button_style(state.auth_focus == AuthFocus::Login, busy, Color::Green),
        ),
        Span::raw("          "),
        Span::styled(
            "[ Register ]",
            button_style(state.auth_focus == AuthFocus::Register, busy, Color::Cyan),
        ),
    ]));
    lines.push(Line::from(""));

    match notice_line(state) {
        Some(line) => {
            let mut spans = vec![Span::raw("  ")];
            spans.extend(line.spans);
            lines.push(Line::from(spans));
        }
        None => lines.push(Line::from("")),
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  [Tab] next field   [Enter] confirm   [Ctrl+Q] exit",
        Style::default().fg(Color::DarkGray),
    )));

    let rect = centered_rect(FORM_WIDTH, lines.len() as u16 + 2, area);
    let block = Block::default().borders(Borders::ALL);
    let widget = Paragraph::new(lines).block(block);
    f.render_widget(widget, rect);
}

fn input_box(label: &str, value: &str, focused: bool, width: usize) -> Vec<Line<'static>> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };

    // Keep the tail visible when the value is wider than the box.
    let shown: String = {
        let chars: Vec<char> = value.chars().collect();
        let skip = chars.len().saturating_sub(width.saturating_sub(1));
        chars[skip..].iter().collect()
    };
    let cursor = if focused { "▏" } else { "" };
    let content = format!("{}{}", shown, cursor);
    let padded = format!("{:<width$}", content, width = width);

    vec![
        Line::from(Span::styled(format!("  {}", label), style)),
        Line::from(vec![
            Span::raw("  ┌"),
            Span::raw("─".repeat(width)),
            Span::raw("┐"),
        ]),
        Line::from(vec![
            Span::raw("  │"),
            Span::styled(padded, style),
            Span::raw("│"),
        ]),
        Line::from(vec![
            Span::raw("  └"),
            Span::raw("─".repeat(width)),
            Span::raw("┘"),
        ]),
    ]
}

fn button_style(focused: bool, busy: bool, color: Color) -> Style {
    if busy {
        Style::default().fg(Color::DarkGray)
    } else if focused {
        Style::default().fg(color).add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(color)
    }
}
