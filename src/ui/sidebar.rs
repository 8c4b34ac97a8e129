use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use ratatui::Frame;

use crate::state::AppState;

pub fn draw_sidebar(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(attempt) = state.controller.attempt() else {
        return;
    };

    let inner_height = area.height.saturating_sub(1) as usize; // title row
    let current = attempt.current_index();
    let total = attempt.questions().len();

    // Keep the current question on screen.
    let scroll_offset = if inner_height == 0 {
        0
    } else {
        current.saturating_sub(inner_height - 1)
    };

    let prompt_max = area.width.saturating_sub(10) as usize; // cursor + icon + number
    let mut lines: Vec<Line> = Vec::new();

    for (i, q) in attempt
        .questions()
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(inner_height)
    {
        let answered = attempt.selected_for(q.id).is_some();
        let (icon, color) = if answered {
            ("●", Color::Green)
        } else {
            ("○", Color::White)
        };

        let is_current = i == current;
        let style = if is_current {
            Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let prompt: String = q.prompt.chars().take(prompt_max).collect();
        let prompt = if q.prompt.chars().count() > prompt_max && prompt_max > 0 {
            let mut cut: String = prompt.chars().take(prompt_max - 1).collect();
            cut.push('…');
            cut
        } else {
            prompt
        };

        lines.push(Line::from(vec![
            Span::styled(if is_current { " ▸ " } else { "   " }, style),
            Span::styled(format!("{} ", icon), style.fg(color)),
            Span::styled(format!("{:>2}. ", i + 1), style),
            Span::styled(prompt, style),
        ]));
    }

    let block = Block::default()
        .borders(Borders::RIGHT)
        .title(format!(" {} Questions ", total))
        .title_style(Style::default().add_modifier(Modifier::BOLD));

    f.render_widget(Paragraph::new(lines).block(block), area);

    if total > inner_height {
        let scrollbar_area = Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: inner_height as u16,
        };
        let mut scrollbar_state = ScrollbarState::new(total.saturating_sub(1)).position(current);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
        f.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
    }
}
