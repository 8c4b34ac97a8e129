use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::state::AppState;
use crate::ui::markdown::prompt_to_lines;

/// Wrap text to fit within `width` columns, breaking at word boundaries.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    let mut result = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            result.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        result.push(current);
    }
    if result.is_empty() {
        result.push(String::new());
    }
    result
}

pub fn option_letter(idx: usize) -> char {
    if idx < 26 {
        (b'A' + idx as u8) as char
    } else {
        '?'
    }
}

pub fn draw_question(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(attempt) = state.controller.attempt() else {
        return;
    };
    let question = attempt.current_question();
    let selected = attempt.selected_for(question.id);

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            format!(
                "  Question {} of {}",
                attempt.current_index() + 1,
                attempt.questions().len()
            ),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for line in prompt_to_lines(&question.prompt) {
        let mut spans = vec![Span::raw("  ")];
        spans.extend(line.spans);
        lines.push(Line::from(spans));
    }
    lines.push(Line::from(""));

    for (i, option) in question.options.iter().enumerate() {
        let is_selected = selected == Some(option.as_str());
        let is_cursor = i == state.choice_cursor;

        let radio = if is_selected { "(●)" } else { "( )" };
        let mut style = if is_selected {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
        };
        if is_cursor {
            style = style.add_modifier(Modifier::BOLD).bg(Color::Rgb(40, 40, 40));
        }

        let prefix = format!("{} {} {}. ", if is_cursor { "▸" } else { " " }, radio, option_letter(i));
        let prefix_len = prefix.chars().count() + 2;
        let text_width = (area.width as usize).saturating_sub(prefix_len + 2);
        for (li, wline) in wrap_text(option, text_width).into_iter().enumerate() {
            if li == 0 {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(prefix.clone(), style),
                    Span::styled(wline, style),
                ]));
            } else {
                lines.push(Line::from(vec![
                    Span::raw(" ".repeat(prefix_len)),
                    Span::styled(wline, style),
                ]));
            }
        }
    }

    lines.push(Line::from(""));
    let footer = if attempt.is_submitting() {
        Span::styled("  Submitting your answers...", Style::default().fg(Color::Yellow))
    } else if attempt.is_last() {
        Span::styled(
            "  Last question. [Ctrl+S] Submit",
            Style::default().fg(Color::Green),
        )
    } else {
        Span::styled("  [→] Next question", Style::default().fg(Color::DarkGray))
    };
    lines.push(Line::from(footer));

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::NONE))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}
