//! Text edits and positions.

use std::fmt;

/// A text splice: bytes `byte_start..old_end` of the old text were replaced
/// by bytes `byte_start..new_end` of the new text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edit {
    pub byte_start: usize,
    pub old_end: usize,
    pub new_end: usize,
}

impl Edit {
    pub fn new(byte_start: usize, old_end: usize, new_end: usize) -> Self {
        Self {
            byte_start,
            old_end,
            new_end,
        }
    }

    /// Edit replacing `old_len` bytes at `byte_start` with `new_len` bytes.
    pub fn replace(byte_start: usize, old_len: usize, new_len: usize) -> Self {
        Self::new(byte_start, byte_start + old_len, byte_start + new_len)
    }

    /// Apply a replacement to `old`, returning the edit and the new text.
    ///
    /// Returns `None` when the range is out of bounds or splits a UTF-8
    /// character.
    pub fn splice(
        old: &str,
        range: std::ops::Range<usize>,
        replacement: &str,
    ) -> Option<(Self, String)> {
        if range.start > range.end || range.end > old.len() {
            return None;
        }
        if !old.is_char_boundary(range.start) || !old.is_char_boundary(range.end) {
            return None;
        }
        let mut text = String::with_capacity(old.len() - range.len() + replacement.len());
        text.push_str(&old[..range.start]);
        text.push_str(replacement);
        text.push_str(&old[range.end..]);
        let edit = Self::replace(range.start, range.len(), replacement.len());
        Some((edit, text))
    }

    pub fn old_len(&self) -> usize {
        self.old_end - self.byte_start
    }

    pub fn new_len(&self) -> usize {
        self.new_end - self.byte_start
    }

    /// Signed length change.
    pub fn delta(&self) -> isize {
        self.new_end as isize - self.old_end as isize
    }

    /// Whether the edit's own coordinates are ordered.
    pub fn is_well_formed(&self) -> bool {
        self.byte_start <= self.old_end && self.byte_start <= self.new_end
    }

    /// Length of the new text implied by applying this edit to a text of
    /// `old_text_len` bytes.
    pub fn new_text_len(&self, old_text_len: usize) -> Option<usize> {
        if !self.is_well_formed() || self.old_end > old_text_len {
            return None;
        }
        Some(old_text_len - self.old_len() + self.new_len())
    }

    /// Map an offset in the old text to the new text.
    ///
    /// Offsets before the edit are unchanged, offsets after it are shifted by
    /// the delta, and offsets inside the replaced range clamp to `new_end`.
    pub fn map_offset(&self, offset: usize) -> usize {
        if offset < self.byte_start {
            offset
        } else if offset >= self.old_end {
            (offset as isize + self.delta()) as usize
        } else {
            self.new_end
        }
    }

    /// Whether the old-text range `start..=end` touches the replaced range.
    ///
    /// Both ends are inclusive so that insertions at a node boundary damage
    /// the nodes on either side.
    pub fn touches(&self, start: usize, end: usize) -> bool {
        start <= self.old_end && self.byte_start <= end
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{} -> {}..{}",
            self.byte_start, self.old_end, self.byte_start, self.new_end
        )
    }
}

/// Zero-based row and byte column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub row: u32,
    pub column: u32,
}

impl Point {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.column)
    }
}
