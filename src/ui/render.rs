use std::ops::Range;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph};

use crate::app::{Focus, Model};
use crate::doc::{DocumentHost, NodeId};
use crate::document::Block;
use crate::highlight::highlight_code;
use crate::tooltip::selection_tooltip;
use crate::widget::CodeWidget;

use super::{DOCUMENT_LEFT_PADDING, status};

/// Render the full frame: menu bar, content, footer.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();

    let toast_active = model.active_toast().is_some();
    let footer_rows = 1 + u16::from(toast_active);
    let menu_area = Rect { height: 1, ..area };
    let content_area = Rect {
        y: area.y + 1,
        height: area.height.saturating_sub(1 + footer_rows),
        ..area
    };
    let toast_area = Rect {
        y: area.y + area.height.saturating_sub(1 + u16::from(toast_active)),
        height: 1,
        ..area
    };
    let status_area = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: 1,
        ..area
    };

    render_menu_bar(model, frame, menu_area);

    if let Some(widget) = &model.source_widget {
        render_source(widget, frame, content_area);
    } else {
        render_blocks(model, frame, content_area);
    }

    if toast_active {
        status::render_toast_bar(model, frame, toast_area);
    }
    status::render_status_bar(model, frame, status_area);
}

fn render_menu_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let ctx = model.menu_context();
    let items = model.menu.visible_items(&ctx);
    let selected = model.menu.selected(&ctx);

    let mut spans = vec![Span::raw(" ")];
    for (index, item) in items.iter().enumerate() {
        let style = if model.menu.is_open() && selected == Some(index) {
            Style::default().bg(Color::White).fg(Color::Black)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", item.label), style));
        spans.push(Span::raw(" "));
    }

    let bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(bar, area);
}

fn render_blocks(model: &Model, frame: &mut Frame, area: Rect) {
    let mut content: Vec<Line> = Vec::new();
    // Screen cell of the focused widget's cursor, for the tooltip anchor.
    let mut head_cell: Option<(u16, u16)> = None;

    for (id, block) in model.document.blocks() {
        let selected = model.selected == Some(id) && model.focus == Focus::Document;
        match block {
            Block::Paragraph(text) => {
                let marker = if selected { "> " } else { "  " };
                let style = if selected {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                content.push(Line::styled(format!("{marker}{text}"), style));
            }
            Block::CodeBlock { language, .. } => {
                let focused = model.focus == Focus::Code(id);
                if let Some(sync) = model.syncs.get(&id) {
                    let header_style = if focused || selected {
                        Style::default().fg(Color::Yellow)
                    } else {
                        Style::default().fg(Color::DarkGray)
                    };
                    let label = if language.is_empty() { "code" } else { language };
                    content.push(Line::styled(format!("  ┌─ {label}"), header_style));
                    let first_code_row = content.len();
                    content.extend(code_widget_lines(sync.widget(), language, focused));
                    if focused {
                        let cursor = sync.widget().cursor();
                        let row = first_code_row + cursor.line;
                        // Gutter: left padding, right-aligned number, one space.
                        let col = usize::from(DOCUMENT_LEFT_PADDING)
                            + usize::from(line_number_width(sync.widget().line_count()))
                            + 1
                            + cursor.col;
                        head_cell = Some((clamp_u16(col), clamp_u16(row)));
                    }
                    content.push(Line::styled("  └─", header_style));
                }
            }
            Block::Image { src, alt } => {
                let marker = if selected { "> " } else { "  " };
                let label = if alt.is_empty() { "image" } else { alt };
                content.push(Line::styled(
                    format!("{marker}[{label}] {}", truncate(src, 40)),
                    Style::default().fg(Color::Cyan),
                ));
            }
        }

        // Uploads pending inside this block show as a placeholder row.
        for _ in 0..placeholder_rows(model, id, block) {
            content.push(Line::styled(
                "  [uploading image…]",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ));
        }
        content.push(Line::raw(""));
    }

    // No wrapping: every Line is exactly one row, so the cursor cell,
    // tooltip anchor, and block row spans all share the same coordinates.
    let scroll = clamp_u16(model.scroll);
    let doc = Paragraph::new(content).scroll((scroll, 0));
    frame.render_widget(doc, area);

    // Selection tooltip, anchored above the focused widget's cursor.
    if let Some((col, row)) = head_cell
        && let Some(tip) =
            selection_tooltip(model.document.selection(), (col, row.saturating_sub(scroll)), area.width)
    {
        let width = clamp_u16(tip.text.len());
        let tip_area = Rect {
            x: area.x + tip.col,
            y: area.y + tip.row,
            width: width.min(area.width.saturating_sub(tip.col)),
            height: 1,
        };
        frame.render_widget(Clear, tip_area);
        frame.render_widget(
            Paragraph::new(tip.text).style(Style::default().bg(Color::Blue).fg(Color::White)),
            tip_area,
        );
    }
}

/// Lines for one embedded code widget: numbered gutter, highlighted code,
/// selection background and cursor cell when focused.
fn code_widget_lines(widget: &CodeWidget, language: &str, focused: bool) -> Vec<Line<'static>> {
    let text = widget.text();
    let highlighted = highlight_code(language, &text);
    let total_lines = widget.line_count();
    let gutter_width = line_number_width(total_lines);
    let (sel_from, sel_to) = widget.selection();
    let cursor = widget.cursor();

    let mut lines = Vec::with_capacity(total_lines);
    for line_idx in 0..total_lines {
        let mut spans = vec![Span::styled(
            format!(
                "  {:>width$} ",
                line_idx + 1,
                width = gutter_width as usize
            ),
            Style::default().fg(Color::DarkGray),
        )];

        // Per-char styling: highlight color, selection background, cursor.
        let line_start = widget.index_from_pos(line_idx, 0);
        let mut cells: Vec<(char, Style)> = Vec::new();
        if let Some(line_spans) = highlighted.get(line_idx) {
            for code_span in line_spans {
                let style = code_span
                    .fg
                    .map_or_else(Style::default, |fg| Style::default().fg(fg));
                cells.extend(code_span.text.chars().map(|ch| (ch, style)));
            }
        }
        if focused {
            for (offset, (_, style)) in cells.iter_mut().enumerate() {
                let index = line_start + offset;
                if sel_from != sel_to && index >= sel_from && index < sel_to {
                    *style = style.bg(Color::Rgb(60, 60, 90));
                }
            }
            if cursor.line == line_idx {
                if cursor.col < cells.len() {
                    cells[cursor.col].1 = Style::default().bg(Color::White).fg(Color::Black);
                } else {
                    cells.push((' ', Style::default().bg(Color::White).fg(Color::Black)));
                }
            }
        }

        spans.extend(
            cells
                .into_iter()
                .map(|(ch, style)| Span::styled(ch.to_string(), style)),
        );
        lines.push(Line::from(spans));
    }
    lines
}

/// Raw markdown source view: the whole document in one gutter editor.
fn render_source(widget: &CodeWidget, frame: &mut Frame, area: Rect) {
    let total_lines = widget.line_count();
    let gutter_width = line_number_width(total_lines);
    let cursor = widget.cursor();
    let visible = area.height as usize;
    // Keep the cursor line on screen.
    let start = cursor.line.saturating_sub(visible.saturating_sub(1));
    let end = (start + visible).min(total_lines);

    let mut content: Vec<Line> = Vec::new();
    for line_idx in start..end {
        let line_text = widget.line_at(line_idx).unwrap_or_default();
        let line_num = format!("{:>width$} ", line_idx + 1, width = gutter_width as usize);

        let mut spans = vec![Span::styled(line_num, Style::default().fg(Color::DarkGray))];

        if line_idx == cursor.line {
            let chars: Vec<char> = line_text.chars().collect();
            let col = cursor.col.min(chars.len());
            let before: String = chars[..col].iter().collect();
            let cursor_char = chars.get(col).copied().unwrap_or(' ');
            let after: String = chars.get(col + 1..).unwrap_or_default().iter().collect();

            if !before.is_empty() {
                spans.push(Span::raw(before));
            }
            spans.push(Span::styled(
                cursor_char.to_string(),
                Style::default().bg(Color::White).fg(Color::Black),
            ));
            if !after.is_empty() {
                spans.push(Span::raw(after));
            }
        } else {
            spans.push(Span::raw(line_text));
        }

        content.push(Line::from(spans));
    }

    let doc = Paragraph::new(content);
    frame.render_widget(Clear, area);
    frame.render_widget(doc, area);
}

/// Rows each block occupies in the content layout, in document order.
///
/// A span covers the block's own rows plus its placeholder rows; the blank
/// spacer row after each block is outside the span. Lines never wrap, so
/// these rows are exactly the rows [`render`] draws.
pub(crate) fn block_row_spans(model: &Model) -> Vec<(NodeId, Range<usize>)> {
    let mut row = 0;
    let mut spans = Vec::new();
    for (id, block) in model.document.blocks() {
        let own = match block {
            Block::CodeBlock { .. } => model
                .syncs
                .get(&id)
                .map_or(0, |sync| sync.widget().line_count() + 2),
            Block::Paragraph(_) | Block::Image { .. } => 1,
        };
        let rows = own + placeholder_rows(model, id, block);
        spans.push((id, row..row + rows));
        row += rows + 1;
    }
    spans
}

/// Placeholder rows drawn under a block (uploads pending inside its span).
fn placeholder_rows(model: &Model, id: NodeId, block: &Block) -> usize {
    let pos = model.document.node_pos(id).unwrap_or(0);
    let end = pos + block.size();
    model
        .placeholders
        .iter()
        .filter(|placeholder| placeholder.pos >= pos && placeholder.pos < end)
        .count()
}

/// Adjust `model.scroll` so the block holding focus or selection sits
/// inside the content viewport.
///
/// Inside a code widget the cursor row is followed; at block level the
/// whole block is brought on screen (snapping to its first row when it is
/// taller than the viewport).
pub fn scroll_to_focus(model: &mut Model) {
    if model.source_mode() {
        return;
    }
    let target = match model.focus {
        Focus::Code(id) => Some(id),
        Focus::Document | Focus::Source => model.selected,
    };
    let Some(target) = target else {
        return;
    };
    let Some((_, span)) = block_row_spans(model)
        .into_iter()
        .find(|(id, _)| *id == target)
    else {
        return;
    };

    let (first, last) = if let Focus::Code(id) = model.focus {
        let row = model
            .syncs
            .get(&id)
            .map_or(span.start, |sync| span.start + 1 + sync.widget().cursor().line);
        (row, row)
    } else {
        (span.start, span.end.max(span.start + 1) - 1)
    };

    let height = content_height(model);
    if height == 0 {
        return;
    }
    if last + 1 - first > height || first < model.scroll {
        model.scroll = first;
    } else if last >= model.scroll + height {
        model.scroll = last + 1 - height;
    }
}

/// Content rows between the menu bar and the footer.
fn content_height(model: &Model) -> usize {
    let footer = 1 + usize::from(model.active_toast().is_some());
    usize::from(model.terminal_size.1).saturating_sub(1 + footer)
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else {
        4
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let prefix: String = text.chars().take(max_chars).collect();
        format!("{prefix}…")
    }
}

fn clamp_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}
