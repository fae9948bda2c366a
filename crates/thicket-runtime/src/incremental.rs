//! Subtree reuse for incremental reparsing.
//!
//! The reparse runs left to right over the new text like a full parse. At
//! each token boundary the cursor maps the position back into the old tree
//! and offers the old subtrees starting there, outermost first. The parser
//! takes the first one that would have been built the same way again.

use std::sync::Arc;

use thicket_core::Edit;

use crate::lexer::Token;
use crate::subtree::Subtree;

/// Reuse statistics of one reparse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReuseStats {
    /// Old subtrees spliced into the new tree.
    pub reused_nodes: usize,
    /// Bytes covered by those subtrees, padding included.
    pub reused_bytes: usize,
}

pub(crate) struct ReuseCursor {
    root: Arc<Subtree>,
    edit: Edit,
}

impl ReuseCursor {
    pub(crate) fn new(root: Arc<Subtree>, edit: Edit) -> Self {
        Self { root, edit }
    }

    /// Old-text offset for a new-text offset outside the edited range.
    fn old_offset(&self, position: usize) -> Option<usize> {
        let edit = &self.edit;
        if position < edit.byte_start {
            Some(position)
        } else if position >= edit.new_end {
            Some((position as isize - edit.delta()) as usize)
        } else {
            None
        }
    }

    /// Old subtrees whose padding starts at `position` (new-text offset) and
    /// that the edit left intact, outermost first.
    pub(crate) fn candidates(&self, position: usize) -> Vec<Arc<Subtree>> {
        let Some(target) = self.old_offset(position) else {
            return Vec::new();
        };

        let mut out = Vec::new();
        let mut node = &self.root;
        let mut offset = 0;
        'descend: loop {
            for child in &node.children {
                let end = offset + child.total();
                if end <= target || child.total() == 0 {
                    offset = end;
                    continue;
                }
                if offset > target {
                    break 'descend;
                }
                if offset == target && self.intact(child, offset) {
                    out.push(Arc::clone(child));
                }
                node = child;
                continue 'descend;
            }
            break;
        }
        out
    }

    fn intact(&self, subtree: &Subtree, start: usize) -> bool {
        let end = start + subtree.total() + subtree.lookahead_bytes;
        !self.edit.touches(start, end)
    }
}

/// Whether `subtree` can stand in for the parse starting with `token`.
pub(crate) fn reusable(subtree: &Subtree, token: &Token, state: thicket_core::StateId) -> bool {
    if subtree.error_count > 0
        || subtree.fragile
        || subtree.extra
        || subtree.children.is_empty()
        || subtree.size == 0
        || subtree.parse_state != Some(state)
    {
        return false;
    }
    let leaf = subtree.first_leaf();
    leaf.missing.is_none()
        && leaf.symbol == token.symbol
        && leaf.padding == token.padding()
        && leaf.size == token.len()
}
