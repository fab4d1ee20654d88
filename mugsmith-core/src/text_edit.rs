//! Text-editing sub-state: an edit buffer with a cursor and debounced commits.
//!
//! While a text element is being edited, keystrokes mutate a private buffer.
//! The buffer is committed to the scene after a quiet period, or at once on
//! confirm/blur. Cancel throws away whatever has not been committed yet.

use crate::element::ElementId;
use crate::event::{EditKey, KeyModifiers};

/// What the host should do after a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    /// Keep editing.
    Continue,
    /// Commit the buffer and leave editing.
    Confirm,
    /// Discard uncommitted changes and leave editing.
    Cancel,
}

/// Edit buffer for one text element.
#[derive(Debug, Clone)]
pub struct TextEditSession {
    element_id: ElementId,
    buffer: String,
    /// Cursor position as a char index into `buffer`.
    cursor: usize,
    committed: String,
    /// Timestamp of the latest change not yet committed.
    dirty_at_ms: Option<u64>,
    debounce_ms: u64,
}

impl TextEditSession {
    /// Start editing `element_id` whose committed content is `content`.
    /// The cursor starts at the end.
    #[must_use]
    pub fn new(element_id: ElementId, content: &str, debounce_ms: u64) -> Self {
        Self {
            element_id,
            buffer: content.to_string(),
            cursor: content.chars().count(),
            committed: content.to_string(),
            dirty_at_ms: None,
            debounce_ms,
        }
    }

    /// Element being edited.
    #[must_use]
    pub fn element_id(&self) -> ElementId {
        self.element_id
    }

    /// Current buffer contents.
    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Cursor position as a char index.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Last content committed to the model.
    #[must_use]
    pub fn committed(&self) -> &str {
        &self.committed
    }

    /// Whether the buffer holds changes not yet committed.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty_at_ms.is_some()
    }

    /// Place the cursor, clamped to the buffer.
    pub fn set_cursor(&mut self, index: usize) {
        self.cursor = index.min(self.char_len());
    }

    /// Insert text at the cursor.
    pub fn insert(&mut self, text: &str, now_ms: u64) {
        if text.is_empty() {
            return;
        }
        let at = self.byte_offset(self.cursor);
        self.buffer.insert_str(at, text);
        self.cursor += text.chars().count();
        self.touch(now_ms);
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self, now_ms: u64) {
        if self.cursor == 0 {
            return;
        }
        let start = self.byte_offset(self.cursor - 1);
        let end = self.byte_offset(self.cursor);
        self.buffer.replace_range(start..end, "");
        self.cursor -= 1;
        self.touch(now_ms);
    }

    /// Delete the character after the cursor.
    pub fn delete_forward(&mut self, now_ms: u64) {
        if self.cursor >= self.char_len() {
            return;
        }
        let start = self.byte_offset(self.cursor);
        let end = self.byte_offset(self.cursor + 1);
        self.buffer.replace_range(start..end, "");
        self.touch(now_ms);
    }

    /// Replace the whole buffer (e.g. paste over selection).
    pub fn replace_all(&mut self, text: &str, now_ms: u64) {
        if self.buffer == text {
            return;
        }
        text.clone_into(&mut self.buffer);
        self.cursor = self.char_len();
        self.touch(now_ms);
    }

    /// Handle one key press.
    ///
    /// Enter confirms (Shift+Enter inserts a line break), Escape cancels.
    pub fn handle_key(&mut self, key: &EditKey, modifiers: KeyModifiers, now_ms: u64) -> EditAction {
        match key {
            EditKey::Text(text) => self.insert(text, now_ms),
            EditKey::Enter if modifiers.shift => self.insert("\n", now_ms),
            EditKey::Enter => return EditAction::Confirm,
            EditKey::Escape => return EditAction::Cancel,
            EditKey::Backspace => self.backspace(now_ms),
            EditKey::Delete => self.delete_forward(now_ms),
            EditKey::Left => self.cursor = self.cursor.saturating_sub(1),
            EditKey::Right => self.cursor = (self.cursor + 1).min(self.char_len()),
            EditKey::Home => self.cursor = 0,
            EditKey::End => self.cursor = self.char_len(),
        }
        EditAction::Continue
    }

    /// Debounce check: once the buffer has been quiet for the debounce
    /// period, mark it committed and return the content to store.
    pub fn poll(&mut self, now_ms: u64) -> Option<String> {
        let dirty_at = self.dirty_at_ms?;
        if now_ms.saturating_sub(dirty_at) < self.debounce_ms {
            return None;
        }
        Some(self.flush())
    }

    /// Commit immediately (confirm key or focus loss) and return the content.
    #[must_use]
    pub fn confirm(mut self) -> String {
        self.flush()
    }

    /// Discard uncommitted changes and return the last committed content.
    #[must_use]
    pub fn cancel(self) -> String {
        if self.is_dirty() {
            tracing::debug!(id = %self.element_id, "discarding buffered text edit");
        }
        self.committed
    }

    fn flush(&mut self) -> String {
        self.dirty_at_ms = None;
        self.committed.clone_from(&self.buffer);
        tracing::debug!(id = %self.element_id, "text edit committed");
        self.committed.clone()
    }

    fn touch(&mut self, now_ms: u64) {
        self.dirty_at_ms = Some(now_ms);
    }

    fn char_len(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_index)
            .map_or(self.buffer.len(), |(offset, _)| offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(content: &str) -> TextEditSession {
        TextEditSession::new(ElementId::new(), content, 300)
    }

    #[test]
    fn test_debounce_waits_for_quiet_period() {
        let mut s = session("Hi");
        s.insert("!", 1_000);
        assert_eq!(s.poll(1_100), None);
        s.insert("!", 1_200);
        // Only 200ms since the last keystroke
        assert_eq!(s.poll(1_400), None);
        assert_eq!(s.poll(1_500), Some("Hi!!".to_string()));
        assert!(!s.is_dirty());
        assert_eq!(s.poll(5_000), None);
    }

    #[test]
    fn test_cancel_reverts_to_last_commit() {
        let mut s = session("abc");
        s.insert("d", 0);
        assert_eq!(s.poll(300), Some("abcd".to_string()));
        s.insert("e", 400);
        assert_eq!(s.cancel(), "abcd");
    }

    #[test]
    fn test_confirm_commits_immediately() {
        let mut s = session("abc");
        s.insert("d", 0);
        assert_eq!(s.confirm(), "abcd");
    }

    #[test]
    fn test_cursor_editing_multibyte() {
        let mut s = session("héllo");
        s.set_cursor(2);
        s.backspace(0);
        assert_eq!(s.buffer(), "hllo");
        assert_eq!(s.cursor(), 1);
        s.insert("ë", 0);
        assert_eq!(s.buffer(), "hëllo");
        s.handle_key(&EditKey::Home, KeyModifiers::default(), 0);
        s.delete_forward(0);
        assert_eq!(s.buffer(), "ëllo");
        s.handle_key(&EditKey::End, KeyModifiers::default(), 0);
        s.delete_forward(0);
        assert_eq!(s.buffer(), "ëllo");
    }

    #[test]
    fn test_enter_and_escape() {
        let mut s = session("a");
        let shift = KeyModifiers {
            shift: true,
            ..KeyModifiers::default()
        };
        assert_eq!(s.handle_key(&EditKey::Enter, shift, 0), EditAction::Continue);
        assert_eq!(s.buffer(), "a\n");
        assert_eq!(
            s.handle_key(&EditKey::Enter, KeyModifiers::default(), 0),
            EditAction::Confirm
        );
        assert_eq!(
            s.handle_key(&EditKey::Escape, KeyModifiers::default(), 0),
            EditAction::Cancel
        );
    }

    #[test]
    fn test_cursor_movement_is_bounded() {
        let mut s = session("ab");
        s.handle_key(&EditKey::Right, KeyModifiers::default(), 0);
        assert_eq!(s.cursor(), 2);
        for _ in 0..5 {
            s.handle_key(&EditKey::Left, KeyModifiers::default(), 0);
        }
        assert_eq!(s.cursor(), 0);
        s.set_cursor(99);
        assert_eq!(s.cursor(), 2);
    }
}
