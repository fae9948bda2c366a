use std::iter::FusedIterator;
use std::slice;

use super::node::Node;
use super::{NodeId, Tree};

/// Walks a subtree without recursion. The cursor never leaves the node it
/// was created on.
#[derive(Clone)]
pub struct TreeCursor<'t> {
    tree: &'t Tree,
    root: NodeId,
    current: NodeId,
}

impl<'t> TreeCursor<'t> {
    pub(super) fn new(tree: &'t Tree, root: NodeId) -> Self {
        Self {
            tree,
            root,
            current: root,
        }
    }

    pub fn node(&self) -> Node<'t> {
        Node::new(self.tree, self.current)
    }

    pub fn field_name(&self) -> Option<&'t str> {
        if self.current == self.root {
            return None;
        }
        self.node().field_name()
    }

    pub fn goto_first_child(&mut self) -> bool {
        match self.tree.children_of(self.current).first() {
            Some(&child) => {
                self.current = child;
                true
            }
            None => false,
        }
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        if self.current == self.root {
            return false;
        }
        match self.node().next_sibling() {
            Some(next) => {
                self.current = next.id();
                true
            }
            None => false,
        }
    }

    pub fn goto_prev_sibling(&mut self) -> bool {
        if self.current == self.root {
            return false;
        }
        match self.node().prev_sibling() {
            Some(prev) => {
                self.current = prev.id();
                true
            }
            None => false,
        }
    }

    pub fn goto_parent(&mut self) -> bool {
        if self.current == self.root {
            return false;
        }
        match self.tree.data(self.current).parent {
            Some(parent) => {
                self.current = parent;
                true
            }
            None => false,
        }
    }

    /// Back to the node the cursor was created on.
    pub fn reset(&mut self) {
        self.current = self.root;
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'t> {
    cursor: TreeCursor<'t>,
    done: bool,
}

impl<'t> Descendants<'t> {
    pub(super) fn new(cursor: TreeCursor<'t>) -> Self {
        Self {
            cursor,
            done: false,
        }
    }
}

impl<'t> Iterator for Descendants<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Node<'t>> {
        if self.done {
            return None;
        }
        let node = self.cursor.node();
        if !self.cursor.goto_first_child() {
            while !self.cursor.goto_next_sibling() {
                if !self.cursor.goto_parent() {
                    self.done = true;
                    break;
                }
            }
        }
        Some(node)
    }
}

impl FusedIterator for Descendants<'_> {}

/// Direct children of a node.
#[derive(Clone)]
pub struct Children<'t> {
    tree: &'t Tree,
    ids: slice::Iter<'t, NodeId>,
}

impl<'t> Children<'t> {
    pub(super) fn new(tree: &'t Tree, ids: &'t [NodeId]) -> Self {
        Self {
            tree,
            ids: ids.iter(),
        }
    }
}

impl<'t> Iterator for Children<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Node<'t>> {
        self.ids.next().map(|&id| Node::new(self.tree, id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.ids.next_back().map(|&id| Node::new(self.tree, id))
    }
}

impl ExactSizeIterator for Children<'_> {}

impl FusedIterator for Children<'_> {}
