//! Editable text with a caret, moved and deleted by grapheme cluster.

use std::ops::Range;

use unicode_segmentation::UnicodeSegmentation;

fn prev_grapheme_boundary(text: &str, byte: usize) -> usize {
    let mut last = 0usize;
    for (i, _) in text.grapheme_indices(true) {
        if i >= byte {
            break;
        }
        last = i;
    }
    last
}

fn next_grapheme_boundary(text: &str, byte: usize) -> usize {
    for (i, _) in text.grapheme_indices(true) {
        if i > byte {
            return i;
        }
    }
    text.len()
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextBuffer {
    pub text: String,
    /// Byte range; empty when there is only a caret.
    pub selection: Range<usize>,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let end = text.len();
        Self {
            text,
            selection: end..end,
        }
    }

    /// Replaces the whole text, caret at the end.
    pub fn set(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.selection = self.text.len()..self.text.len();
    }

    pub fn caret(&self) -> usize {
        self.selection.end.min(self.text.len())
    }

    pub fn at_start(&self) -> bool {
        self.selection.is_empty() && self.caret() == 0
    }

    pub fn at_end(&self) -> bool {
        self.selection.is_empty() && self.caret() == self.text.len()
    }

    pub fn insert(&mut self, text: &str) {
        let start = self.selection.start.min(self.text.len());
        let end = self.selection.end.min(self.text.len());
        self.text.replace_range(start..end, text);
        let pos = start + text.len();
        self.selection = pos..pos;
    }

    /// Returns whether anything was removed.
    pub fn delete_backward(&mut self) -> bool {
        if !self.selection.is_empty() {
            self.insert("");
            return true;
        }
        let pos = self.caret();
        if pos == 0 {
            return false;
        }
        let prev = prev_grapheme_boundary(&self.text, pos);
        self.text.replace_range(prev..pos, "");
        self.selection = prev..prev;
        true
    }

    pub fn delete_forward(&mut self) -> bool {
        if !self.selection.is_empty() {
            self.insert("");
            return true;
        }
        let pos = self.caret();
        if pos >= self.text.len() {
            return false;
        }
        let next = next_grapheme_boundary(&self.text, pos);
        self.text.replace_range(pos..next, "");
        true
    }

    pub fn move_left(&mut self) -> bool {
        let pos = self.caret();
        if pos == 0 {
            return false;
        }
        let prev = prev_grapheme_boundary(&self.text, pos);
        self.selection = prev..prev;
        true
    }

    pub fn move_right(&mut self) -> bool {
        let pos = self.caret();
        if pos >= self.text.len() {
            return false;
        }
        let next = next_grapheme_boundary(&self.text, pos);
        self.selection = next..next;
        true
    }

    pub fn select_all(&mut self) {
        self.selection = 0..self.text.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_at_caret() {
        let mut buf = TextBuffer::new("ac");
        buf.move_left();
        buf.insert("b");
        assert_eq!(buf.text, "abc");
        assert_eq!(buf.caret(), 2);
    }

    #[test]
    fn test_grapheme_aware_delete() {
        // family emoji is one grapheme made of several scalars
        let mut buf = TextBuffer::new("a👨‍👩‍👧");
        assert!(buf.delete_backward());
        assert_eq!(buf.text, "a");
        assert!(buf.delete_backward());
        assert!(!buf.delete_backward());
        assert!(buf.at_start());
    }

    #[test]
    fn test_delete_forward_and_edges() {
        let mut buf = TextBuffer::new("éx");
        assert!(buf.at_end());
        assert!(!buf.delete_forward());
        assert!(buf.move_left());
        assert!(buf.move_left());
        assert!(!buf.move_left());
        assert!(buf.delete_forward());
        assert_eq!(buf.text, "x");
    }

    #[test]
    fn test_selection_is_replaced() {
        let mut buf = TextBuffer::new("old");
        buf.select_all();
        buf.insert("new");
        assert_eq!(buf.text, "new");
        assert!(buf.at_end());
    }
}
