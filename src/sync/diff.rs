//! Minimal text diff for change propagation.
//!
//! Both sync directions (widget → document and document → widget) reduce a
//! pair of strings to the smallest contiguous replacement by trimming the
//! common prefix and suffix. Edits are typically single keystrokes or small
//! pastes, so this O(n) two-ended scan is sufficient; no LCS backtracking.

/// The smallest contiguous replacement turning one string into another.
///
/// Offsets are char offsets into the old string: replacing chars
/// `from..to` with `text` yields the new string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    /// Start of the replaced range (inclusive).
    pub from: usize,
    /// End of the replaced range (exclusive).
    pub to: usize,
    /// Replacement text (may be empty for a pure deletion).
    pub text: String,
}

impl TextChange {
    /// Number of chars removed from the old string.
    pub const fn deleted(&self) -> usize {
        self.to - self.from
    }
}

/// Compute the minimal edit turning `old` into `new`.
///
/// Returns `None` when the strings are equal (no change). The scan advances
/// a start index over the common prefix, then retreats both end indices
/// independently over the common suffix without crossing the start.
pub fn compute_change(old: &str, new: &str) -> Option<TextChange> {
    if old == new {
        return None;
    }

    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();

    let mut start = 0;
    let mut old_end = old_chars.len();
    let mut new_end = new_chars.len();

    while start < old_end && start < new_end && old_chars[start] == new_chars[start] {
        start += 1;
    }
    while old_end > start && new_end > start && old_chars[old_end - 1] == new_chars[new_end - 1] {
        old_end -= 1;
        new_end -= 1;
    }

    Some(TextChange {
        from: start,
        to: old_end,
        text: new_chars[start..new_end].iter().collect(),
    })
}

/// Apply a change produced by [`compute_change`] to the string it was
/// computed against.
pub fn apply_change(old: &str, change: &TextChange) -> String {
    let chars: Vec<char> = old.chars().collect();
    let mut out: String = chars[..change.from].iter().collect();
    out.push_str(&change.text);
    out.extend(&chars[change.to..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_equal_strings_yield_no_change() {
        assert_eq!(compute_change("abc", "abc"), None);
        assert_eq!(compute_change("", ""), None);
    }

    #[test]
    fn test_insertion_in_middle() {
        let change = compute_change("hd", "held").unwrap();
        assert_eq!(change.from, 1);
        assert_eq!(change.to, 1);
        assert_eq!(change.text, "el");
    }

    #[test]
    fn test_pure_deletion_has_empty_text() {
        let change = compute_change("hello world", "hello").unwrap();
        assert_eq!(change.from, 5);
        assert_eq!(change.to, 11);
        assert_eq!(change.text, "");
    }

    #[test]
    fn test_replacement_at_start() {
        let change = compute_change("cat", "bat").unwrap();
        assert_eq!(change.from, 0);
        assert_eq!(change.to, 1);
        assert_eq!(change.text, "b");
    }

    #[test]
    fn test_whole_string_replacement() {
        let change = compute_change("abc", "xyz").unwrap();
        assert_eq!(change.from, 0);
        assert_eq!(change.to, 3);
        assert_eq!(change.text, "xyz");
    }

    #[test]
    fn test_function_rename_scenario() {
        // The canonical embedded-code-editor edit: max → min. The shared
        // leading "m" belongs to the prefix, so the minimal range is the
        // trailing "ax".
        let old = "function max(a, b) {\n  return a > b ? a : b\n}";
        let new = "function min(a, b) {\n  return a > b ? a : b\n}";
        let change = compute_change(old, new).unwrap();
        assert_eq!(change.from, 10);
        assert_eq!(change.to, 12);
        assert_eq!(change.text, "in");
    }

    #[test]
    fn test_full_word_replacement_reports_word_range() {
        // Replacing "max" with "sum": no shared chars inside the word, so
        // the range covers the whole word.
        let old = "function max(a, b) {\n  return a > b ? a : b\n}";
        let new = "function sum(a, b) {\n  return a > b ? a : b\n}";
        let change = compute_change(old, new).unwrap();
        assert_eq!(change.from, 9);
        assert_eq!(change.to, 12);
        assert_eq!(change.text, "sum");
    }

    #[test]
    fn test_ambiguous_repeat_prefers_leftmost() {
        // "aa" → "aaa": prefix consumes both old chars, suffix cannot cross
        // the start, so the insertion lands at the end.
        let change = compute_change("aa", "aaa").unwrap();
        assert_eq!(change.from, 2);
        assert_eq!(change.to, 2);
        assert_eq!(change.text, "a");
    }

    #[test]
    fn test_multibyte_chars_use_char_offsets() {
        let change = compute_change("héllo", "hallo").unwrap();
        assert_eq!(change.from, 1);
        assert_eq!(change.to, 2);
        assert_eq!(change.text, "a");
    }

    #[test]
    fn test_apply_change_roundtrip() {
        let old = "one two three";
        let new = "one 2 three";
        let change = compute_change(old, new).unwrap();
        assert_eq!(apply_change(old, &change), new);
    }

    #[test]
    fn test_rediff_after_apply_is_no_change() {
        let old = "alpha";
        let new = "alphabet";
        let change = compute_change(old, new).unwrap();
        let applied = apply_change(old, &change);
        assert_eq!(compute_change(&applied, new), None);
    }

    proptest! {
        /// Applying the computed change to the old string yields the new one.
        #[test]
        fn prop_apply_yields_new(old in ".{0,40}", new in ".{0,40}") {
            match compute_change(&old, &new) {
                None => prop_assert_eq!(&old, &new),
                Some(change) => {
                    prop_assert!(change.from <= change.to);
                    prop_assert!(change.to <= old.chars().count());
                    prop_assert_eq!(apply_change(&old, &change), new);
                }
            }
        }

        /// Diffing a string against itself is always a no-op.
        #[test]
        fn prop_self_diff_is_none(s in ".{0,40}") {
            prop_assert_eq!(compute_change(&s, &s), None);
        }

        /// The replaced range and text never both preserve a shared prefix
        /// char (the diff is tight at the front).
        #[test]
        fn prop_front_is_tight(old in ".{0,40}", new in ".{0,40}") {
            if let Some(change) = compute_change(&old, &new) {
                let old_chars: Vec<char> = old.chars().collect();
                let first_replaced = old_chars.get(change.from);
                let first_inserted = change.text.chars().next();
                if change.from < change.to {
                    prop_assert!(
                        first_replaced != first_inserted.as_ref()
                            || first_inserted.is_none()
                    );
                }
            }
        }
    }
}
