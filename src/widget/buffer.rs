use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ropey::Rope;

/// Cursor position in the widget buffer.
///
/// Columns are char offsets within the line, which keeps every coordinate
/// in the widget (cursor, selection, linear offsets) in the same unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column (char offset within the line).
    pub col: usize,
    /// Remembered column for vertical movement (sticky column).
    col_memory: usize,
}

impl Cursor {
    /// Create a cursor at line 0, column 0.
    pub const fn new() -> Self {
        Self {
            line: 0,
            col: 0,
            col_memory: 0,
        }
    }

    /// Create a cursor at a specific position.
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            col_memory: col,
        }
    }

    /// Update column and reset column memory to match.
    const fn set_col(&mut self, col: usize) {
        self.col = col;
        self.col_memory = col;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// What a widget operation did, as observed by the embedding host.
///
/// The widget has exactly one consumer (its binding), so change and
/// selection notifications are returned from the mutating call instead of
/// going through a subscription registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WidgetNotice {
    /// The buffer content changed.
    pub buffer_changed: bool,
    /// The cursor or selection moved.
    pub selection_moved: bool,
}

impl WidgetNotice {
    const NONE: Self = Self {
        buffer_changed: false,
        selection_moved: false,
    };

    const EDIT: Self = Self {
        buffer_changed: true,
        selection_moved: true,
    };

    const MOVE: Self = Self {
        buffer_changed: false,
        selection_moved: true,
    };
}

/// Outcome of offering a key to the widget keymap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key was consumed.
    Handled,
    /// The key was declined; the host's default behavior applies.
    Pass,
}

/// A plain-text editing widget backed by a rope.
///
/// Tracks a cursor with sticky-column vertical movement, an optional
/// selection anchor, and input focus. Selections are exposed both as
/// (line, col) pairs and as linear char offsets into the buffer.
pub struct CodeWidget {
    rope: Rope,
    cursor: Cursor,
    /// Selection anchor as a linear char offset; `None` means a caret.
    anchor: Option<usize>,
    has_focus: bool,
}

impl CodeWidget {
    /// Create a widget seeded with `text`.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::new(),
            anchor: None,
            has_focus: false,
        }
    }

    // --- Queries ---

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Total chars in the buffer.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Total number of lines.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Length of a line in chars, excluding the line break.
    pub fn line_len(&self, line_idx: usize) -> usize {
        if line_idx >= self.rope.len_lines() {
            return 0;
        }
        let line = self.rope.line(line_idx);
        let mut len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            len -= 1;
        }
        if len > 0 && line.char(len - 1) == '\r' {
            len -= 1;
        }
        len
    }

    /// Get the content of a line (without trailing line break).
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line_idx).to_string();
        Some(s.trim_end_matches('\n').trim_end_matches('\r').to_string())
    }

    /// The current cursor position.
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Whether the widget currently has input focus.
    pub const fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// Whether a non-empty selection is active.
    pub fn has_selection(&self) -> bool {
        self.anchor.is_some_and(|a| a != self.head_index())
    }

    /// The selection as linear char offsets `(anchor, head)`.
    ///
    /// A caret reports both ends equal.
    pub fn selection(&self) -> (usize, usize) {
        let head = self.head_index();
        (self.anchor.unwrap_or(head), head)
    }

    /// Convert a (line, col) position to a linear char offset, clamping to
    /// buffer bounds.
    pub fn index_from_pos(&self, line: usize, col: usize) -> usize {
        let line = line.min(self.line_count().saturating_sub(1));
        self.rope.line_to_char(line) + col.min(self.line_len(line))
    }

    /// Convert a linear char offset to a (line, col) position, clamping to
    /// buffer bounds.
    pub fn pos_from_index(&self, index: usize) -> (usize, usize) {
        let index = index.min(self.rope.len_chars());
        let line = self.rope.char_to_line(index);
        (line, index - self.rope.line_to_char(line))
    }

    // --- Focus ---

    /// Acquire input focus.
    pub const fn focus(&mut self) {
        self.has_focus = true;
    }

    /// Release input focus.
    pub const fn blur(&mut self) {
        self.has_focus = false;
    }

    // --- Programmatic mutation (binding-driven) ---

    /// Replace the chars in `from..to` with `text`.
    ///
    /// Used by the binding to apply incoming document changes. The cursor
    /// and anchor are remapped through the edit: positions past the range
    /// shift, positions inside it collapse to the end of the insertion.
    pub fn replace_range(&mut self, from: usize, to: usize, text: &str) -> WidgetNotice {
        let len = self.rope.len_chars();
        let from = from.min(len);
        let to = to.clamp(from, len);
        if from == to && text.is_empty() {
            return WidgetNotice::NONE;
        }

        let head = self.head_index();
        let inserted = text.chars().count();

        self.rope.remove(from..to);
        if !text.is_empty() {
            self.rope.insert(from, text);
        }

        let mapped_head = map_index(head, from, to, inserted);
        self.anchor = self.anchor.map(|a| map_index(a, from, to, inserted));
        let (line, col) = self.pos_from_index(mapped_head);
        self.cursor = Cursor::at(line, col);

        WidgetNotice::EDIT
    }

    /// Move the selection to the given linear offsets.
    ///
    /// Collapses to a caret when the ends are equal. Does not touch focus.
    pub fn set_selection(&mut self, anchor: usize, head: usize) -> WidgetNotice {
        let anchor = anchor.min(self.rope.len_chars());
        let head = head.min(self.rope.len_chars());
        let (line, col) = self.pos_from_index(head);
        self.cursor = Cursor::at(line, col);
        self.anchor = (anchor != head).then_some(anchor);
        WidgetNotice::MOVE
    }

    // --- Editing primitives (user input) ---

    /// Insert a character at the cursor, replacing any active selection.
    pub fn insert_char(&mut self, ch: char) -> WidgetNotice {
        self.delete_selection();
        let idx = self.head_index();
        self.rope.insert_char(idx, ch);
        let (line, col) = self.pos_from_index(idx + 1);
        self.cursor = Cursor::at(line, col);
        WidgetNotice::EDIT
    }

    /// Insert a string at the cursor, replacing any active selection.
    pub fn insert_str(&mut self, s: &str) -> WidgetNotice {
        if s.is_empty() {
            return WidgetNotice::NONE;
        }
        self.delete_selection();
        let idx = self.head_index();
        self.rope.insert(idx, s);
        let (line, col) = self.pos_from_index(idx + s.chars().count());
        self.cursor = Cursor::at(line, col);
        WidgetNotice::EDIT
    }

    /// Split the current line at the cursor (Enter key).
    pub fn split_line(&mut self) -> WidgetNotice {
        self.insert_char('\n')
    }

    /// Delete the selection, or the character before the cursor (Backspace).
    pub fn delete_back(&mut self) -> WidgetNotice {
        if self.delete_selection() {
            return WidgetNotice::EDIT;
        }
        let idx = self.head_index();
        if idx == 0 {
            return WidgetNotice::NONE;
        }
        self.rope.remove(idx - 1..idx);
        let (line, col) = self.pos_from_index(idx - 1);
        self.cursor = Cursor::at(line, col);
        WidgetNotice::EDIT
    }

    /// Delete the selection, or the character at the cursor (Delete key).
    pub fn delete_forward(&mut self) -> WidgetNotice {
        if self.delete_selection() {
            return WidgetNotice::EDIT;
        }
        let idx = self.head_index();
        if idx >= self.rope.len_chars() {
            return WidgetNotice::NONE;
        }
        self.rope.remove(idx..=idx);
        WidgetNotice::EDIT
    }

    // --- Cursor movement ---

    /// Move the cursor, optionally extending the selection.
    ///
    /// A plain move collapses any active selection first (toward the edge
    /// the movement points at); an extending move plants the anchor on
    /// first use and keeps it.
    pub fn move_cursor(&mut self, direction: Direction, extend: bool) -> WidgetNotice {
        if extend {
            if self.anchor.is_none() {
                self.anchor = Some(self.head_index());
            }
        } else if self.anchor.is_some() {
            let (anchor, head) = self.selection();
            let target = match direction {
                Direction::Left | Direction::Up => anchor.min(head),
                Direction::Right | Direction::Down => anchor.max(head),
            };
            self.anchor = None;
            let (line, col) = self.pos_from_index(target);
            self.cursor = Cursor::at(line, col);
            if matches!(direction, Direction::Left | Direction::Right) {
                // Collapsing consumed the horizontal step.
                return WidgetNotice::MOVE;
            }
        }

        match direction {
            Direction::Left => self.move_left(),
            Direction::Right => self.move_right(),
            Direction::Up => self.move_up(),
            Direction::Down => self.move_down(),
        }
        if extend && self.anchor == Some(self.head_index()) {
            self.anchor = None;
        }
        WidgetNotice::MOVE
    }

    /// Move cursor to the beginning of the line (Home).
    pub fn move_home(&mut self, extend: bool) -> WidgetNotice {
        self.prepare_horizontal(extend);
        self.cursor.set_col(0);
        WidgetNotice::MOVE
    }

    /// Move cursor to the end of the line (End).
    pub fn move_end(&mut self, extend: bool) -> WidgetNotice {
        self.prepare_horizontal(extend);
        let len = self.line_len(self.cursor.line);
        self.cursor.set_col(len);
        WidgetNotice::MOVE
    }

    /// Move cursor to a specific line and column, collapsing the selection.
    pub fn move_to(&mut self, line: usize, col: usize) -> WidgetNotice {
        self.anchor = None;
        let max_line = self.line_count().saturating_sub(1);
        let line = line.min(max_line);
        self.cursor.line = line;
        self.cursor.set_col(col.min(self.line_len(line)));
        WidgetNotice::MOVE
    }

    // --- Default keymap ---

    /// Offer a key to the widget's default keymap.
    ///
    /// Returns [`KeyOutcome::Pass`] for keys the widget does not handle, so
    /// the embedding host can apply its own behavior.
    pub fn handle_key(&mut self, key: &KeyEvent) -> (KeyOutcome, WidgetNotice) {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let plain = key
            .modifiers
            .difference(KeyModifiers::SHIFT)
            .is_empty();

        let notice = match key.code {
            KeyCode::Char(ch) if plain => self.insert_char(ch),
            KeyCode::Enter if plain && !shift => self.split_line(),
            KeyCode::Tab if plain && !shift => self.insert_str("  "),
            KeyCode::Backspace if plain => self.delete_back(),
            KeyCode::Delete if plain => self.delete_forward(),
            KeyCode::Left if plain => self.move_cursor(Direction::Left, shift),
            KeyCode::Right if plain => self.move_cursor(Direction::Right, shift),
            KeyCode::Up if plain => self.move_cursor(Direction::Up, shift),
            KeyCode::Down if plain => self.move_cursor(Direction::Down, shift),
            KeyCode::Home if plain => self.move_home(shift),
            KeyCode::End if plain => self.move_end(shift),
            _ => return (KeyOutcome::Pass, WidgetNotice::NONE),
        };
        (KeyOutcome::Handled, notice)
    }

    // --- Private helpers ---

    /// Linear char offset of the cursor.
    fn head_index(&self) -> usize {
        self.index_from_pos(self.cursor.line, self.cursor.col)
    }

    /// Delete the active selection, if any. Returns `true` when something
    /// was removed.
    fn delete_selection(&mut self) -> bool {
        let Some(anchor) = self.anchor.take() else {
            return false;
        };
        let head = self.head_index();
        if anchor == head {
            return false;
        }
        let (from, to) = (anchor.min(head), anchor.max(head));
        self.rope.remove(from..to);
        let (line, col) = self.pos_from_index(from);
        self.cursor = Cursor::at(line, col);
        true
    }

    /// Shared prologue for horizontal jumps (Home/End).
    fn prepare_horizontal(&mut self, extend: bool) {
        if extend {
            if self.anchor.is_none() {
                self.anchor = Some(self.head_index());
            }
        } else {
            self.anchor = None;
        }
    }

    fn move_left(&mut self) {
        if self.cursor.col > 0 {
            self.cursor.set_col(self.cursor.col - 1);
        } else if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.cursor.set_col(self.line_len(self.cursor.line));
        }
    }

    fn move_right(&mut self) {
        if self.cursor.col < self.line_len(self.cursor.line) {
            self.cursor.set_col(self.cursor.col + 1);
        } else if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.cursor.set_col(0);
        }
    }

    fn move_up(&mut self) {
        if self.cursor.line > 0 {
            self.cursor.line -= 1;
            let max_col = self.line_len(self.cursor.line);
            self.cursor.col = self.cursor.col_memory.min(max_col);
        }
    }

    fn move_down(&mut self) {
        if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            let max_col = self.line_len(self.cursor.line);
            self.cursor.col = self.cursor.col_memory.min(max_col);
        }
    }
}

/// Map a position through a replacement of `from..to` by `inserted` chars.
///
/// Positions before the range are unchanged, positions after it shift, and
/// positions inside it collapse to the end of the insertion.
const fn map_index(index: usize, from: usize, to: usize, inserted: usize) -> usize {
    if index <= from {
        index
    } else if index >= to {
        index - (to - from) + inserted
    } else {
        from + inserted
    }
}

impl std::fmt::Debug for CodeWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeWidget")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("cursor", &self.cursor)
            .field("anchor", &self.anchor)
            .field("has_focus", &self.has_focus)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn shift_key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::SHIFT)
    }

    // --- Construction and queries ---

    #[test]
    fn test_empty_widget_has_one_line() {
        let w = CodeWidget::from_text("");
        assert_eq!(w.line_count(), 1);
        assert_eq!(w.line_at(0), Some(String::new()));
    }

    #[test]
    fn test_from_text_preserves_content() {
        let w = CodeWidget::from_text("hello\nworld");
        assert_eq!(w.line_count(), 2);
        assert_eq!(w.text(), "hello\nworld");
        assert_eq!(w.line_len(1), 5);
    }

    #[test]
    fn test_line_len_is_char_based() {
        let w = CodeWidget::from_text("café\nx");
        assert_eq!(w.line_len(0), 4);
    }

    // --- Offset conversion ---

    #[test]
    fn test_index_from_pos_and_back() {
        let w = CodeWidget::from_text("ab\ncde");
        assert_eq!(w.index_from_pos(1, 2), 5);
        assert_eq!(w.pos_from_index(5), (1, 2));
        assert_eq!(w.pos_from_index(2), (0, 2));
    }

    #[test]
    fn test_index_from_pos_clamps() {
        let w = CodeWidget::from_text("ab\ncde");
        assert_eq!(w.index_from_pos(9, 9), w.len_chars());
        assert_eq!(w.pos_from_index(100), (1, 3));
    }

    // --- Selection ---

    #[test]
    fn test_caret_selection_reports_equal_ends() {
        let mut w = CodeWidget::from_text("hello");
        w.move_to(0, 3);
        assert_eq!(w.selection(), (3, 3));
        assert!(!w.has_selection());
    }

    #[test]
    fn test_set_selection_moves_cursor_to_head() {
        let mut w = CodeWidget::from_text("hello\nworld");
        w.set_selection(2, 8);
        assert_eq!(w.selection(), (2, 8));
        assert!(w.has_selection());
        assert_eq!(w.cursor(), Cursor::at(1, 2));
    }

    #[test]
    fn test_set_selection_collapsed_clears_anchor() {
        let mut w = CodeWidget::from_text("hello");
        w.set_selection(1, 4);
        w.set_selection(2, 2);
        assert!(!w.has_selection());
    }

    #[test]
    fn test_shift_movement_extends_selection() {
        let mut w = CodeWidget::from_text("hello");
        w.move_cursor(Direction::Right, true);
        w.move_cursor(Direction::Right, true);
        assert_eq!(w.selection(), (0, 2));
    }

    #[test]
    fn test_plain_movement_collapses_selection() {
        let mut w = CodeWidget::from_text("hello");
        w.set_selection(1, 4);
        w.move_cursor(Direction::Left, false);
        assert!(!w.has_selection());
        assert_eq!(w.cursor().col, 1);
    }

    #[test]
    fn test_extend_back_to_anchor_collapses() {
        let mut w = CodeWidget::from_text("hello");
        w.move_cursor(Direction::Right, true);
        w.move_cursor(Direction::Left, true);
        assert!(!w.has_selection());
    }

    // --- Editing ---

    #[test]
    fn test_insert_char_advances_cursor() {
        let mut w = CodeWidget::from_text("hllo");
        w.move_to(0, 1);
        w.insert_char('e');
        assert_eq!(w.text(), "hello");
        assert_eq!(w.cursor(), Cursor::at(0, 2));
    }

    #[test]
    fn test_insert_char_replaces_selection() {
        let mut w = CodeWidget::from_text("hello");
        w.set_selection(1, 4);
        w.insert_char('i');
        assert_eq!(w.text(), "hio");
        assert_eq!(w.cursor(), Cursor::at(0, 2));
    }

    #[test]
    fn test_insert_str_multiline_moves_cursor_to_end() {
        let mut w = CodeWidget::from_text("ab");
        w.move_to(0, 1);
        w.insert_str("x\ny");
        assert_eq!(w.text(), "ax\nyb");
        assert_eq!(w.cursor(), Cursor::at(1, 1));
    }

    #[test]
    fn test_split_line() {
        let mut w = CodeWidget::from_text("hello");
        w.move_to(0, 2);
        w.split_line();
        assert_eq!(w.text(), "he\nllo");
        assert_eq!(w.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn test_delete_back_joins_lines() {
        let mut w = CodeWidget::from_text("he\nllo");
        w.move_to(1, 0);
        w.delete_back();
        assert_eq!(w.text(), "hello");
        assert_eq!(w.cursor(), Cursor::at(0, 2));
    }

    #[test]
    fn test_delete_back_at_start_is_noop() {
        let mut w = CodeWidget::from_text("hi");
        let notice = w.delete_back();
        assert_eq!(notice, WidgetNotice::NONE);
        assert_eq!(w.text(), "hi");
    }

    #[test]
    fn test_delete_forward_removes_selection_first() {
        let mut w = CodeWidget::from_text("hello");
        w.set_selection(0, 2);
        w.delete_forward();
        assert_eq!(w.text(), "llo");
    }

    // --- replace_range (incoming document changes) ---

    #[test]
    fn test_replace_range_updates_text() {
        let mut w = CodeWidget::from_text("function max(a, b)");
        w.replace_range(9, 12, "min");
        assert_eq!(w.text(), "function min(a, b)");
    }

    #[test]
    fn test_replace_range_maps_cursor_after_edit() {
        let mut w = CodeWidget::from_text("abcdef");
        w.move_to(0, 5);
        w.replace_range(1, 3, ""); // delete "bc"
        assert_eq!(w.cursor().col, 3);
    }

    #[test]
    fn test_replace_range_collapses_cursor_inside_edit() {
        let mut w = CodeWidget::from_text("abcdef");
        w.move_to(0, 2);
        w.replace_range(1, 4, "XY");
        assert_eq!(w.text(), "aXYef");
        assert_eq!(w.cursor().col, 3);
    }

    #[test]
    fn test_replace_range_empty_is_noop() {
        let mut w = CodeWidget::from_text("abc");
        let notice = w.replace_range(1, 1, "");
        assert_eq!(notice, WidgetNotice::NONE);
    }

    // --- Sticky column ---

    #[test]
    fn test_column_memory_across_short_line() {
        let mut w = CodeWidget::from_text("hello\nhi\nworld");
        w.move_to(0, 4);
        w.move_cursor(Direction::Down, false);
        assert_eq!(w.cursor().col, 2);
        w.move_cursor(Direction::Down, false);
        assert_eq!(w.cursor().col, 4);
    }

    // --- Keymap ---

    #[test]
    fn test_handle_key_insert() {
        let mut w = CodeWidget::from_text("");
        let (outcome, notice) = w.handle_key(&key(KeyCode::Char('x')));
        assert_eq!(outcome, KeyOutcome::Handled);
        assert!(notice.buffer_changed);
        assert_eq!(w.text(), "x");
    }

    #[test]
    fn test_handle_key_shift_arrow_extends() {
        let mut w = CodeWidget::from_text("abc");
        w.handle_key(&shift_key(KeyCode::Right));
        assert_eq!(w.selection(), (0, 1));
    }

    #[test]
    fn test_handle_key_declines_unknown() {
        let mut w = CodeWidget::from_text("abc");
        let (outcome, notice) = w.handle_key(&key(KeyCode::F(5)));
        assert_eq!(outcome, KeyOutcome::Pass);
        assert_eq!(notice, WidgetNotice::NONE);
    }

    #[test]
    fn test_handle_key_ctrl_char_declines() {
        let mut w = CodeWidget::from_text("abc");
        let (outcome, _) = w.handle_key(&KeyEvent::new(
            KeyCode::Char('s'),
            KeyModifiers::CONTROL,
        ));
        assert_eq!(outcome, KeyOutcome::Pass);
        assert_eq!(w.text(), "abc");
    }

    #[test]
    fn test_movement_notice_reports_selection_only() {
        let mut w = CodeWidget::from_text("abc");
        let (_, notice) = w.handle_key(&key(KeyCode::Right));
        assert!(notice.selection_moved);
        assert!(!notice.buffer_changed);
    }
}
