//! Side effects run after the pure update pass.
//!
//! The update function records intent (a save command, a placeholder
//! waiting for an upload); this pass performs the IO and feeds results
//! back into the model.

use anyhow::{Context, Result};

use crate::app::model::{Model, ToastLevel};
use crate::app::update::Message;
use crate::document::markdown;
use crate::menu::MenuCommand;
use crate::upload::PendingUpload;

pub(super) fn handle_message_side_effects(model: &mut Model, msg: &Message) {
    match msg {
        Message::Command(MenuCommand::Save) => match save_document(model) {
            Ok(true) => {
                model.dirty = false;
                model.show_toast(ToastLevel::Info, "Saved");
            }
            Ok(false) => {
                model.show_toast(ToastLevel::Warning, "No file to save to");
            }
            Err(err) => {
                tracing::warn!(%err, "save failed");
                model.show_toast(ToastLevel::Error, format!("Save failed: {err}"));
            }
        },
        Message::Command(MenuCommand::InsertImage) => start_requested_upload(model),
        _ => {}
    }
}

/// Write the document as markdown to the model's file path. Returns
/// `Ok(false)` when there is no target.
fn save_document(model: &Model) -> Result<bool> {
    let Some(path) = &model.file_path else {
        return Ok(false);
    };
    let source = markdown::serialize(&model.document);
    std::fs::write(path, source).with_context(|| format!("writing {}", path.display()))?;
    Ok(true)
}

/// Start the upload the update pass requested, tying it to its placeholder.
fn start_requested_upload(model: &mut Model) {
    let Some(placeholder) = model.upload_request.take() else {
        return;
    };
    let Some(path) = model.image_path.clone() else {
        model.placeholders.remove(placeholder);
        return;
    };
    model.uploads.push(PendingUpload::start(placeholder, &path));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::update::update;
    use crate::document::{Block, DocumentModel};

    #[test]
    fn test_save_roundtrips_document_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        let document = DocumentModel::from_blocks(vec![
            Block::Paragraph("hello".to_string()),
            Block::CodeBlock {
                language: "rust".to_string(),
                text: "fn main() {}".to_string(),
            },
        ]);
        let mut model = Model::new(document, (80, 24));
        model.file_path = Some(path.clone());
        model.dirty = true;

        let msg = Message::Command(MenuCommand::Save);
        let mut model = update(model, msg.clone());
        handle_message_side_effects(&mut model, &msg);

        assert!(!model.dirty);
        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(on_disk.contains("hello"));
        assert!(on_disk.contains("```rust"));
    }

    #[test]
    fn test_save_without_target_warns() {
        let mut model = Model::default();
        let msg = Message::Command(MenuCommand::Save);
        handle_message_side_effects(&mut model, &msg);
        assert!(
            model
                .active_toast()
                .is_some_and(|(text, _)| text.contains("No file"))
        );
    }

    #[test]
    fn test_insert_image_starts_upload_for_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("pic.png");
        std::fs::write(&image, b"fake png").unwrap();

        let document = DocumentModel::from_blocks(vec![Block::Paragraph("p".to_string())]);
        let mut model = Model::new(document, (80, 24));
        model.image_path = Some(image);

        let msg = Message::Command(MenuCommand::InsertImage);
        let mut model = update(model, msg.clone());
        handle_message_side_effects(&mut model, &msg);

        assert_eq!(model.uploads.len(), 1);
        assert!(!model.placeholders.is_empty());
        assert_eq!(
            model.placeholders.find(model.uploads[0].placeholder()),
            Some(2),
            "placeholder sits at the last position inside the paragraph"
        );
    }
}
