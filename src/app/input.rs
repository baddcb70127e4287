use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::model::{Focus, Model};
use crate::app::update::Message;
use crate::menu::MenuCommand;

/// Translate a terminal event into a message, given the current focus.
///
/// A handful of chords are global; everything else routes by focus. Keys
/// inside a code widget are passed through wholesale so the binding's own
/// keymap (including boundary escapes) decides what to do with them.
pub fn handle_event(event: &Event, model: &Model) -> Option<Message> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(key, model),
        Event::Resize(width, height) => Some(Message::Resize(*width, *height)),
        _ => None,
    }
}

fn handle_key(key: &KeyEvent, model: &Model) -> Option<Message> {
    // Global chords, regardless of focus.
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('q') => return Some(Message::Quit),
            KeyCode::Char('s') => return Some(Message::Command(MenuCommand::Save)),
            _ => {}
        }
    }

    if model.menu.is_open() {
        return menu_key(key);
    }
    if key.code == KeyCode::F(10) {
        return Some(Message::OpenMenu);
    }

    match model.focus {
        Focus::Code(_) => match key.code {
            KeyCode::Esc => Some(Message::LeaveCodeBlock),
            _ => Some(Message::CodeKey(*key)),
        },
        Focus::Source => match key.code {
            KeyCode::Esc => Some(Message::Command(MenuCommand::ToggleSource)),
            _ => Some(Message::SourceKey(*key)),
        },
        Focus::Document => document_key(key),
    }
}

fn menu_key(key: &KeyEvent) -> Option<Message> {
    match key.code {
        KeyCode::Left | KeyCode::BackTab => Some(Message::MenuPrev),
        KeyCode::Right | KeyCode::Tab => Some(Message::MenuNext),
        KeyCode::Enter => Some(Message::MenuActivate),
        KeyCode::Esc | KeyCode::F(10) => Some(Message::MenuClose),
        _ => None,
    }
}

fn document_key(key: &KeyEvent) -> Option<Message> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Message::SelectPrevBlock),
        KeyCode::Down | KeyCode::Char('j') => Some(Message::SelectNextBlock),
        KeyCode::Enter => Some(Message::EnterSelectedBlock),
        KeyCode::Char('m') => Some(Message::OpenMenu),
        KeyCode::Char('q') => Some(Message::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::NodeId;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(ch: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL))
    }

    #[test]
    fn test_document_arrows_move_block_selection() {
        let model = Model::default();
        assert_eq!(
            handle_event(&key(KeyCode::Down), &model),
            Some(Message::SelectNextBlock)
        );
        assert_eq!(
            handle_event(&key(KeyCode::Up), &model),
            Some(Message::SelectPrevBlock)
        );
    }

    #[test]
    fn test_code_focus_routes_keys_to_widget() {
        let mut model = Model::default();
        model.focus = Focus::Code(NodeId(1));
        let event = key(KeyCode::Char('x'));
        assert!(matches!(
            handle_event(&event, &model),
            Some(Message::CodeKey(_))
        ));
        assert_eq!(
            handle_event(&key(KeyCode::Esc), &model),
            Some(Message::LeaveCodeBlock)
        );
    }

    #[test]
    fn test_plain_q_quits_only_in_document_focus() {
        let mut model = Model::default();
        assert_eq!(handle_event(&key(KeyCode::Char('q')), &model), Some(Message::Quit));
        model.focus = Focus::Code(NodeId(1));
        assert!(matches!(
            handle_event(&key(KeyCode::Char('q')), &model),
            Some(Message::CodeKey(_))
        ));
    }

    #[test]
    fn test_ctrl_chords_are_global() {
        let mut model = Model::default();
        model.focus = Focus::Source;
        assert_eq!(handle_event(&ctrl('q'), &model), Some(Message::Quit));
        assert_eq!(
            handle_event(&ctrl('s'), &model),
            Some(Message::Command(MenuCommand::Save))
        );
    }

    #[test]
    fn test_open_menu_captures_navigation() {
        let mut model = Model::default();
        let ctx = model.menu_context();
        model.menu.open(&ctx);
        assert_eq!(
            handle_event(&key(KeyCode::Right), &model),
            Some(Message::MenuNext)
        );
        assert_eq!(
            handle_event(&key(KeyCode::Enter), &model),
            Some(Message::MenuActivate)
        );
        assert_eq!(
            handle_event(&key(KeyCode::Esc), &model),
            Some(Message::MenuClose)
        );
    }

    #[test]
    fn test_source_focus_escape_toggles_back() {
        let mut model = Model::default();
        model.focus = Focus::Source;
        assert_eq!(
            handle_event(&key(KeyCode::Esc), &model),
            Some(Message::Command(MenuCommand::ToggleSource))
        );
        assert!(matches!(
            handle_event(&key(KeyCode::Char('a')), &model),
            Some(Message::SourceKey(_))
        ));
    }

    #[test]
    fn test_resize_event_maps_to_message() {
        let model = Model::default();
        assert_eq!(
            handle_event(&Event::Resize(100, 40), &model),
            Some(Message::Resize(100, 40))
        );
    }
}
