//! Selection-size tooltip.
//!
//! Pure layout computation: given the current selection and the screen
//! cell of its head, produce the small overlay the renderer draws above
//! the selection. An empty selection has no tooltip.

use unicode_width::UnicodeWidthStr;

use crate::doc::DocSelection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub text: String,
    pub col: u16,
    pub row: u16,
}

/// Tooltip for `selection` anchored at the head's screen cell, or `None`
/// when the selection is empty. The tooltip is kept inside `area_width`
/// columns and sits one row above the head (row 0 when already at the top).
pub fn selection_tooltip(
    selection: DocSelection,
    head_cell: (u16, u16),
    area_width: u16,
) -> Option<Tooltip> {
    if selection.is_empty() {
        return None;
    }
    let span = selection.to() - selection.from();
    let text = if span == 1 {
        "1 char".to_string()
    } else {
        format!("{span} chars")
    };
    let width = text.width() as u16;
    let (head_col, head_row) = head_cell;
    let col = head_col.min(area_width.saturating_sub(width));
    Some(Tooltip {
        text,
        col,
        row: head_row.saturating_sub(1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection_has_no_tooltip() {
        assert_eq!(selection_tooltip(DocSelection::caret(5), (3, 3), 80), None);
    }

    #[test]
    fn test_tooltip_reports_selection_size() {
        let sel = DocSelection { anchor: 2, head: 7 };
        let tip = selection_tooltip(sel, (10, 4), 80).unwrap();
        assert_eq!(tip.text, "5 chars");
        assert_eq!((tip.col, tip.row), (10, 3));
    }

    #[test]
    fn test_single_char_uses_singular() {
        let sel = DocSelection { anchor: 3, head: 2 };
        let tip = selection_tooltip(sel, (0, 0), 80).unwrap();
        assert_eq!(tip.text, "1 char");
        assert_eq!(tip.row, 0, "top row stays on screen");
    }

    #[test]
    fn test_tooltip_clamped_to_area_width() {
        let sel = DocSelection { anchor: 0, head: 12 };
        let tip = selection_tooltip(sel, (78, 5), 80).unwrap();
        // "12 chars" is 8 columns wide, so col pulls back to 80 - 8.
        assert_eq!(tip.col, 72);
    }

    #[test]
    fn test_reversed_selection_measures_same() {
        let forward = DocSelection { anchor: 1, head: 6 };
        let backward = DocSelection { anchor: 6, head: 1 };
        let a = selection_tooltip(forward, (0, 2), 80).unwrap();
        let b = selection_tooltip(backward, (0, 2), 80).unwrap();
        assert_eq!(a.text, b.text);
    }
}
