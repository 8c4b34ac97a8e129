use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Renders a question prompt. Prompts are usually plain sentences, but
/// emphasis, inline code and code blocks are honoured when present.
pub fn prompt_to_lines(text: &str) -> Vec<Line<'static>> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);

    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut styles: Vec<Style> = vec![Style::default()];
    let mut in_code_block = false;

    let flush = |spans: &mut Vec<Span<'static>>, lines: &mut Vec<Line<'static>>| {
        if !spans.is_empty() {
            lines.push(Line::from(std::mem::take(spans)));
        }
    };

    for event in Parser::new_ext(text, opts) {
        let top = *styles.last().unwrap_or(&Style::default());
        match event {
            Event::Start(Tag::Strong) => styles.push(top.add_modifier(Modifier::BOLD)),
            Event::Start(Tag::Emphasis) => styles.push(top.add_modifier(Modifier::ITALIC)),
            Event::Start(Tag::Strikethrough) => {
                styles.push(top.add_modifier(Modifier::CROSSED_OUT))
            }
            Event::End(TagEnd::Strong | TagEnd::Emphasis | TagEnd::Strikethrough) => {
                styles.pop();
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                flush(&mut spans, &mut lines);
                in_code_block = true;
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        lines.push(Line::from(Span::styled(
                            format!("[{}]", lang),
                            Style::default().fg(Color::DarkGray),
                        )));
                    }
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                lines.push(Line::from(""));
            }
            Event::Start(Tag::Item) => {
                flush(&mut spans, &mut lines);
                spans.push(Span::raw("• "));
            }
            Event::End(TagEnd::Item) => flush(&mut spans, &mut lines),
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_)) => {
                flush(&mut spans, &mut lines);
                lines.push(Line::from(""));
            }
            Event::Text(t) if in_code_block => {
                for code_line in t.lines() {
                    lines.push(Line::from(Span::styled(
                        format!("  {}", code_line),
                        Style::default().fg(Color::Green),
                    )));
                }
            }
            Event::Text(t) => spans.push(Span::styled(t.to_string(), top)),
            Event::Code(code) => spans.push(Span::styled(
                format!("`{}`", code),
                Style::default().fg(Color::Yellow),
            )),
            Event::SoftBreak => spans.push(Span::raw(" ")),
            Event::HardBreak => flush(&mut spans, &mut lines),
            Event::Rule => lines.push(Line::from(Span::styled(
                "─".repeat(40),
                Style::default().fg(Color::DarkGray),
            ))),
            _ => {}
        }
    }
    flush(&mut spans, &mut lines);

    // Trailing blank from the last paragraph.
    while lines.last().map(|l| l.width() == 0).unwrap_or(false) {
        lines.pop();
    }
    lines
}
