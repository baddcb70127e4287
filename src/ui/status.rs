use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Focus, Model, ToastLevel};

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let filename = model.file_path.as_deref().map_or_else(
        || "untitled".to_string(),
        |p| {
            p.file_name()
                .map_or_else(|| p.display().to_string(), |n| n.to_string_lossy().to_string())
        },
    );

    let dirty_indicator = if model.dirty { " [modified]" } else { "" };

    let (mode, hint) = match model.focus {
        Focus::Document => ("DOC", "↑/↓:blocks  Enter:edit code  m:menu  q:quit"),
        Focus::Code(_) => ("CODE", "arrows at edges leave  Esc:back  Ctrl+Enter:exit below"),
        Focus::Source => ("SRC", "Esc:apply and return"),
    };

    let cursor_info = match model.focus {
        Focus::Code(id) => model.syncs.get(&id).map(|sync| {
            let c = sync.widget().cursor();
            format!("  Ln {}, Col {}", c.line + 1, c.col + 1)
        }),
        Focus::Source => model.source_widget.as_ref().map(|w| {
            let c = w.cursor();
            format!("  Ln {}, Col {}", c.line + 1, c.col + 1)
        }),
        Focus::Document => None,
    }
    .unwrap_or_default();

    let status = format!(" {mode}  {filename}{dirty_indicator}{cursor_info}  {hint}");

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
