//! External scanner hook.
//!
//! Grammars list tokens the regular lexer cannot express (indentation,
//! heredocs, nested comments) in `externals`. A scanner registered on the
//! [`Language`](crate::Language) recognizes them.

/// Recognizes external tokens.
///
/// Scanners are stateless: everything they need must be derivable from the
/// text at and after the cursor, so reused subtrees stay valid.
pub trait ExternalScanner: Send + Sync {
    /// Try to recognize one external token at the cursor.
    ///
    /// `valid[i]` tells whether external token `i` (its index in the
    /// grammar's `externals`) is acceptable here. Return the index of the
    /// recognized token; its end is the last [`ScanCursor::mark_end`], or the
    /// cursor position when `mark_end` was never called. Zero-length results
    /// are ignored.
    fn scan(&self, cursor: &mut ScanCursor<'_>, valid: &[bool]) -> Option<u16>;
}

/// Read cursor handed to an [`ExternalScanner`].
#[derive(Debug)]
pub struct ScanCursor<'t> {
    text: &'t str,
    start: usize,
    position: usize,
    marked: Option<usize>,
}

impl<'t> ScanCursor<'t> {
    pub(crate) fn new(text: &'t str, start: usize) -> Self {
        Self {
            text,
            start,
            position: start,
            marked: None,
        }
    }

    /// Character at the cursor.
    pub fn lookahead(&self) -> Option<char> {
        self.text[self.position..].chars().next()
    }

    /// Move past the current character.
    pub fn advance(&mut self) {
        if let Some(c) = self.lookahead() {
            self.position += c.len_utf8();
        }
    }

    /// Mark the current position as the end of the token.
    pub fn mark_end(&mut self) {
        self.marked = Some(self.position);
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Text from the token start to the cursor.
    pub fn consumed(&self) -> &'t str {
        &self.text[self.start..self.position]
    }

    pub fn is_at_eof(&self) -> bool {
        self.position >= self.text.len()
    }

    /// Token end: the marked position, else the cursor.
    pub(crate) fn token_end(&self) -> usize {
        self.marked.unwrap_or(self.position)
    }

    /// Furthest byte the scanner looked at.
    pub(crate) fn extent(&self) -> usize {
        (self.position + 1).min(self.text.len()).max(self.token_end())
    }
}
