use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::navigator::WARNING_THRESHOLD_SECS;
use crate::state::AppState;
use crate::timer::format_duration;

pub fn draw_titlebar(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(attempt) = state.controller.attempt() else {
        return;
    };

    let secs = attempt.remaining_seconds();
    let timer_text = format!(" {} remaining ", format_duration(secs));
    let timer_span = if secs <= WARNING_THRESHOLD_SECS {
        Span::styled(
            timer_text.clone(),
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(timer_text.clone(), Style::default().fg(Color::Rgb(200, 200, 120)))
    };

    let who = state.controller.username().unwrap_or("exam");
    let title_text = format!(
        "[ {} · question {} of {} ]",
        who,
        attempt.current_index() + 1,
        attempt.questions().len()
    );

    // Centre the title across the full width; the timer sits at the right edge.
    let available = area.width as usize;
    let title_len = title_text.chars().count();
    let timer_len = timer_text.chars().count();
    let center_pad = available.saturating_sub(title_len) / 2;
    let right_pad = available.saturating_sub(center_pad + title_len + timer_len);

    let line = Line::from(vec![
        Span::raw(" ".repeat(center_pad)),
        Span::styled(
            title_text,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ".repeat(right_pad)),
        timer_span,
    ]);

    let widget = Paragraph::new(line)
        .style(Style::default().bg(Color::DarkGray))
        .alignment(Alignment::Left);
    f.render_widget(widget, area);
}
