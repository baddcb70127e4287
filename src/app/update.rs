use crossterm::event::KeyEvent;

use crate::app::Model;
use crate::app::model::{Focus, ToastLevel};
use crate::doc::NodeId;
use crate::document::{Block, markdown};
use crate::menu::MenuCommand;
use crate::placeholder::PlaceholderId;
use crate::widget::CodeWidget;

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Document navigation
    /// Move block selection up
    SelectPrevBlock,
    /// Move block selection down
    SelectNextBlock,
    /// Enter the selected block's widget (code blocks only)
    EnterSelectedBlock,
    /// Leave the focused code widget back to document navigation
    LeaveCodeBlock,

    // Widget input
    /// Key for the focused code widget
    CodeKey(KeyEvent),
    /// Key for the markdown source widget
    SourceKey(KeyEvent),

    // Menu
    /// Open the menu bar
    OpenMenu,
    /// Highlight the next menu item
    MenuNext,
    /// Highlight the previous menu item
    MenuPrev,
    /// Run the highlighted menu item
    MenuActivate,
    /// Close the menu bar
    MenuClose,
    /// Run a menu command directly (keyboard shortcut)
    Command(MenuCommand),

    // Uploads
    /// A simulated upload resolved
    UploadFinished(PlaceholderId, Result<String, String>),

    // Window
    /// Terminal resized
    Resize(u16, u16),

    // Application
    /// Quit the application
    Quit,
}

/// Pure function that updates the model based on a message.
///
/// This is the core of TEA - all state transitions happen here. File IO
/// (saving, starting uploads) runs afterwards in the effects pass.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        // Document navigation
        Message::SelectPrevBlock => move_selection(&mut model, -1),
        Message::SelectNextBlock => move_selection(&mut model, 1),
        Message::EnterSelectedBlock => {
            if let Some(id) = model.selected_code_block() {
                enter_code_block(&mut model, id, false);
            }
        }
        Message::LeaveCodeBlock => {
            if let Focus::Code(id) = model.focus {
                if let Some(sync) = model.syncs.get_mut(&id) {
                    sync.widget_mut().blur();
                }
                model.focus = Focus::Document;
                model.selected = Some(id);
            }
        }

        // Widget input
        Message::CodeKey(key) => {
            if let Focus::Code(id) = model.focus
                && let Some(sync) = model.syncs.get_mut(&id)
            {
                sync.handle_key(&mut model.document, &key);
            }
        }
        Message::SourceKey(key) => {
            if let Some(widget) = &mut model.source_widget {
                widget.handle_key(&key);
            }
        }

        // Menu
        Message::OpenMenu => {
            let ctx = model.menu_context();
            model.menu.open(&ctx);
        }
        Message::MenuNext => {
            let ctx = model.menu_context();
            model.menu.select_next(&ctx);
        }
        Message::MenuPrev => {
            let ctx = model.menu_context();
            model.menu.select_prev(&ctx);
        }
        Message::MenuActivate => {
            let ctx = model.menu_context();
            if let Some(command) = model.menu.activate(&ctx) {
                return update(model, Message::Command(command));
            }
        }
        Message::MenuClose => model.menu.close(),
        Message::Command(command) => run_command(&mut model, command),

        // Uploads
        Message::UploadFinished(id, result) => finish_upload(&mut model, id, result),

        // Window
        Message::Resize(width, height) => model.terminal_size = (width, height),

        // Application
        Message::Quit => model.should_quit = true,
    }

    model.reconcile();
    crate::ui::scroll_to_focus(&mut model);
    model
}

/// Move the block selection, entering a code block when the move lands on
/// one (the arrow carries straight into the embedded widget).
fn move_selection(model: &mut Model, delta: isize) {
    let ids = model.block_ids();
    if ids.is_empty() {
        return;
    }
    let current = model.selected_index().unwrap_or(0);
    let target = current.saturating_add_signed(delta).min(ids.len() - 1);
    if target == current {
        return;
    }
    let id = ids[target];
    if model
        .document
        .block(id)
        .is_some_and(|block| matches!(block, Block::CodeBlock { .. }))
    {
        // Entering from below lands at the end, from above at the start.
        enter_code_block(model, id, delta < 0);
    } else {
        model.select_block(id);
    }
}

fn enter_code_block(model: &mut Model, id: NodeId, at_end: bool) {
    let Some(sync) = model.syncs.get_mut(&id) else {
        return;
    };
    let widget = sync.widget_mut();
    if at_end {
        let last = widget.line_count() - 1;
        widget.move_to(last, widget.line_len(last));
    } else {
        widget.move_to(0, 0);
    }
    sync.widget_focused(&mut model.document);
    model.focus = Focus::Code(id);
    model.selected = Some(id);
}

fn run_command(model: &mut Model, command: MenuCommand) {
    match command {
        MenuCommand::InsertImage => {
            if model.image_path.is_none() {
                model.show_toast(ToastLevel::Warning, "No image configured (use --image)");
                return;
            }
            let pos = model.insertion_pos();
            let id = model.placeholders.add(pos);
            // The effects pass picks this up and starts the upload.
            model.upload_request = Some(id);
            tracing::debug!(placeholder = id.0, pos, "upload requested");
        }
        MenuCommand::InsertCodeBlock => {
            let pos = model.insertion_pos();
            let id = model.document.insert_block_near(
                pos,
                Block::CodeBlock {
                    language: "javascript".to_string(),
                    text: String::new(),
                },
            );
            model.dirty = true;
            model.reconcile();
            enter_code_block(model, id, false);
        }
        MenuCommand::ToggleSource => toggle_source(model),
        // Save is IO; the effects pass handles it.
        MenuCommand::Save => {}
    }
}

fn toggle_source(model: &mut Model) {
    if let Some(widget) = model.source_widget.take() {
        match markdown::parse(&widget.text()) {
            Ok(document) => {
                model.document = document;
                model.syncs.clear();
                model.placeholders = crate::placeholder::PlaceholderSet::new();
                model.dirty = true;
                model.focus = Focus::Document;
                model.selected = model.document.blocks().next().map(|(id, _)| id);
            }
            Err(err) => {
                model.show_toast(ToastLevel::Error, format!("Source not parseable: {err}"));
                model.source_widget = Some(widget);
            }
        }
    } else {
        let mut widget = CodeWidget::from_text(&markdown::serialize(&model.document));
        widget.focus();
        model.source_widget = Some(widget);
        model.focus = Focus::Source;
    }
}

fn finish_upload(model: &mut Model, id: PlaceholderId, result: Result<String, String>) {
    let Some(pos) = model.placeholders.find(id) else {
        // The placeholder was edited away; nothing to resolve.
        tracing::debug!(placeholder = id.0, "upload resolved after placeholder removal");
        return;
    };
    model.placeholders.remove(id);
    match result {
        Ok(src) => {
            model.document.insert_block_near(
                pos,
                Block::Image {
                    src,
                    alt: "uploaded image".to_string(),
                },
            );
            model.dirty = true;
            model.show_toast(ToastLevel::Info, "Image uploaded");
        }
        Err(err) => {
            model.show_toast(ToastLevel::Error, format!("Upload failed: {err}"));
        }
    }
}
