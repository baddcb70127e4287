use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use ratatui::DefaultTerminal;

use crate::app::App;
use crate::app::effects::handle_message_side_effects;
use crate::app::input::handle_event;
use crate::app::model::Model;
use crate::app::update::{Message, update};
use crate::document::{Block, DocumentModel, markdown};

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization, file loading, or the
    /// event loop encounters an IO failure.
    pub fn run(&mut self) -> Result<()> {
        let document = match &self.file_path {
            Some(path) => {
                let source = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                markdown::parse(&source)?
            }
            None => sample_document(),
        };

        let mut terminal = ratatui::try_init().context(
            "Failed to initialize terminal - codefence requires an interactive terminal",
        )?;
        let size = terminal.size()?;

        let mut model = Model::new(document, (size.width, size.height));
        model.file_path.clone_from(&self.file_path);
        model.image_path.clone_from(&self.image_path);

        let result = Self::event_loop(&mut terminal, &mut model);

        ratatui::restore();
        result
    }

    fn event_loop(terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let mut needs_render = true;

        loop {
            let now = Instant::now();
            if model.expire_toast(now) {
                needs_render = true;
            }

            // Resolve any uploads whose simulated latency has passed.
            let mut index = 0;
            while index < model.uploads.len() {
                if model.uploads[index].is_ready(now) {
                    let (placeholder, result) = model.uploads.swap_remove(index).finish();
                    let msg = Message::UploadFinished(
                        placeholder,
                        result.map_err(|err| err.to_string()),
                    );
                    *model = update(std::mem::take(model), msg);
                    needs_render = true;
                } else {
                    index += 1;
                }
            }

            // Short poll while uploads are pending so deadlines fire promptly.
            let poll_ms = if needs_render {
                0
            } else if model.uploads.is_empty() {
                250
            } else {
                50
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                let msg = handle_event(&event::read()?, model);
                if let Some(msg) = msg {
                    let side_msg = msg.clone();
                    *model = update(std::mem::take(model), msg);
                    handle_message_side_effects(model, &side_msg);
                    needs_render = true;
                }

                // Coalesce key repeat bursts into a single render.
                while event::poll(Duration::from_millis(0))? {
                    let msg = handle_event(&event::read()?, model);
                    if let Some(msg) = msg {
                        let side_msg = msg.clone();
                        *model = update(std::mem::take(model), msg);
                        handle_message_side_effects(model, &side_msg);
                        needs_render = true;
                    }
                }
            }

            if needs_render {
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }
}

/// The built-in demo document shown when no file is given.
pub fn sample_document() -> DocumentModel {
    DocumentModel::from_blocks(vec![
        Block::Paragraph(
            "The code block below is a live embedded editor. Arrow into it to \
             edit; arrows at its edges move back out."
                .to_string(),
        ),
        Block::CodeBlock {
            language: "javascript".to_string(),
            text: "function max(a, b) {\n  return a > b ? a : b\n}".to_string(),
        },
        Block::Paragraph(
            "Open the menu (F10 or m) to insert blocks, toggle the markdown \
             source view, or save."
                .to_string(),
        ),
    ])
}
