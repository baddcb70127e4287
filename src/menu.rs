//! Menu bar over application commands.
//!
//! Items carry an enable predicate evaluated against a small snapshot of
//! application state ([`MenuContext`]); disabled items are hidden rather
//! than greyed out, so the bar only ever shows what can run right now.
//! Activation yields a [`MenuCommand`] for the update loop to dispatch.

/// Commands the menu can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    InsertImage,
    InsertCodeBlock,
    ToggleSource,
    Save,
}

/// The application state slice menu predicates see.
#[derive(Debug, Clone, Copy, Default)]
pub struct MenuContext {
    /// The raw markdown source view is active.
    pub source_mode: bool,
    /// Focus is inside an embedded code widget.
    pub editing_code: bool,
    /// The document changed since the last save.
    pub dirty: bool,
    /// A save target path exists.
    pub can_save: bool,
}

pub struct MenuItem {
    pub label: &'static str,
    pub command: MenuCommand,
    enabled: fn(&MenuContext) -> bool,
}

impl MenuItem {
    pub fn is_enabled(&self, ctx: &MenuContext) -> bool {
        (self.enabled)(ctx)
    }
}

impl std::fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuItem")
            .field("label", &self.label)
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

/// The menu bar: a fixed item list plus a highlight cursor over the
/// currently visible items.
#[derive(Debug)]
pub struct MenuBar {
    items: Vec<MenuItem>,
    selected: Option<usize>,
}

impl MenuBar {
    /// The demo's standard menu.
    ///
    /// Insertions need the rich document view and document focus; toggling
    /// the source view is blocked while a code widget owns input; save
    /// needs a target and unsaved changes.
    pub fn standard() -> Self {
        Self {
            items: vec![
                MenuItem {
                    label: "Insert image",
                    command: MenuCommand::InsertImage,
                    enabled: |ctx| !ctx.source_mode && !ctx.editing_code,
                },
                MenuItem {
                    label: "Insert code block",
                    command: MenuCommand::InsertCodeBlock,
                    enabled: |ctx| !ctx.source_mode && !ctx.editing_code,
                },
                MenuItem {
                    label: "Source",
                    command: MenuCommand::ToggleSource,
                    enabled: |ctx| !ctx.editing_code,
                },
                MenuItem {
                    label: "Save",
                    command: MenuCommand::Save,
                    enabled: |ctx| ctx.can_save && ctx.dirty,
                },
            ],
            selected: None,
        }
    }

    /// Items whose predicate passes, in declaration order.
    pub fn visible_items(&self, ctx: &MenuContext) -> Vec<&MenuItem> {
        self.items
            .iter()
            .filter(|item| item.is_enabled(ctx))
            .collect()
    }

    pub const fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    /// Open the bar with the first visible item highlighted. No-op when
    /// nothing is visible.
    pub fn open(&mut self, ctx: &MenuContext) {
        if !self.visible_items(ctx).is_empty() {
            self.selected = Some(0);
        }
    }

    pub const fn close(&mut self) {
        self.selected = None;
    }

    pub fn select_next(&mut self, ctx: &MenuContext) {
        let count = self.visible_items(ctx).len();
        if let Some(selected) = self.selected
            && count > 0
        {
            self.selected = Some((selected + 1) % count);
        }
    }

    pub fn select_prev(&mut self, ctx: &MenuContext) {
        let count = self.visible_items(ctx).len();
        if let Some(selected) = self.selected
            && count > 0
        {
            self.selected = Some(selected.checked_sub(1).unwrap_or(count - 1));
        }
    }

    /// Index of the highlighted item among the visible items.
    pub fn selected(&self, ctx: &MenuContext) -> Option<usize> {
        let count = self.visible_items(ctx).len();
        self.selected.filter(|_| count > 0).map(|s| s.min(count - 1))
    }

    /// Close the bar and return the highlighted item's command.
    pub fn activate(&mut self, ctx: &MenuContext) -> Option<MenuCommand> {
        let command = self
            .selected(ctx)
            .and_then(|index| self.visible_items(ctx).get(index).map(|item| item.command));
        self.selected = None;
        command
    }
}
