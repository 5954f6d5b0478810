//! Line editing state for the shell prompt
//!
//! Cursor-based editing, input history and prefix completion. Rendering and
//! key handling live in the terminal frontend.

use std::collections::VecDeque;

/// State of the line being edited
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    buffer: String,
    /// Byte offset, always on a char boundary
    cursor: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents, cursor at the end
    pub fn set_value(&mut self, value: &str) {
        self.buffer = value.to_string();
        self.cursor = self.buffer.len();
    }

    pub fn value(&self) -> &str {
        &self.buffer
    }

    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor position in characters, for terminal column math
    pub fn cursor_column(&self) -> usize {
        self.buffer[..self.cursor].chars().count()
    }

    pub fn insert(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Delete the character at the cursor
    pub fn delete(&mut self) {
        if self.cursor < self.buffer.len() {
            self.buffer.remove(self.cursor);
        }
    }

    /// Delete the character before the cursor
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.prev_char_boundary();
            self.buffer.remove(prev);
            self.cursor = prev;
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.prev_char_boundary();
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.buffer.len() {
            self.cursor = self.next_char_boundary();
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.buffer.len();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Complete the whole line against `labels`: a single match replaces
    /// the line, several matches extend it to their longest common prefix.
    /// Returns whether the line changed.
    pub fn complete(&mut self, labels: &[&str]) -> bool {
        let typed = self.buffer.as_str();
        let matching: Vec<&str> = labels
            .iter()
            .copied()
            .filter(|label| label.starts_with(typed))
            .collect();

        let completed = match matching.as_slice() {
            [] => return false,
            [only] => only.to_string(),
            many => longest_common_prefix(many),
        };
        if completed.len() <= self.buffer.len() {
            self.end();
            return false;
        }
        self.set_value(&completed);
        true
    }

    fn prev_char_boundary(&self) -> usize {
        let mut idx = self.cursor.saturating_sub(1);
        while idx > 0 && !self.buffer.is_char_boundary(idx) {
            idx -= 1;
        }
        idx
    }

    fn next_char_boundary(&self) -> usize {
        let mut idx = self.cursor + 1;
        while idx < self.buffer.len() && !self.buffer.is_char_boundary(idx) {
            idx += 1;
        }
        idx.min(self.buffer.len())
    }
}

/// Longest prefix shared by every label
pub fn longest_common_prefix(labels: &[&str]) -> String {
    let Some(first) = labels.first() else {
        return String::new();
    };
    let mut end = first.len();
    for label in &labels[1..] {
        end = first
            .char_indices()
            .zip(label.chars())
            .take_while(|((_, a), b)| a == b)
            .map(|((idx, a), _)| idx + a.len_utf8())
            .last()
            .unwrap_or(0)
            .min(end);
    }
    first[..end].to_string()
}

/// Entries kept before the oldest is dropped
pub const HISTORY_LIMIT: usize = 500;

/// Previously accepted lines, browsed with up/down
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<String>,
    position: Option<usize>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            position: None,
            limit: limit.max(1),
        }
    }

    /// Remember a line; blanks and repeats of the last entry are skipped
    pub fn push(&mut self, line: &str) {
        self.position = None;
        let line = line.trim();
        if line.is_empty() || self.entries.back().map(String::as_str) == Some(line) {
            return;
        }
        if self.entries.len() == self.limit {
            self.entries.pop_front();
        }
        self.entries.push_back(line.to_string());
    }

    /// Step back; stays on the oldest entry once reached
    pub fn older(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let idx = match self.position {
            None => self.entries.len() - 1,
            Some(i) => i.saturating_sub(1),
        };
        self.position = Some(idx);
        Some(&self.entries[idx])
    }

    /// Step forward; `None` once past the newest entry, where the line is
    /// empty again
    pub fn newer(&mut self) -> Option<&str> {
        let idx = self.position? + 1;
        if idx >= self.entries.len() {
            self.position = None;
            return None;
        }
        self.position = Some(idx);
        Some(&self.entries[idx])
    }

    /// Forget the browsing position
    pub fn reset(&mut self) {
        self.position = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
