use std::fmt;
use std::ops::Range;

use thicket_core::{Point, SYMBOL_ERROR, SymbolId};

use super::cursor::{Children, Descendants, TreeCursor};
use super::sexp;
use super::{NodeData, NodeId, Tree};

/// A visible node, borrowed from its [`Tree`].
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t Tree,
    id: NodeId,
}

impl<'t> Node<'t> {
    pub(super) fn new(tree: &'t Tree, id: NodeId) -> Self {
        Self { tree, id }
    }

    fn data(&self) -> &'t NodeData {
        self.tree.data(self.id)
    }

    fn at(&self, id: NodeId) -> Node<'t> {
        Node::new(self.tree, id)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t Tree {
        self.tree
    }

    /// Symbol name, or the alias the node was renamed to.
    pub fn kind(&self) -> &'t str {
        self.tree.language().table().symbol_name(self.data().kind)
    }

    pub fn kind_id(&self) -> SymbolId {
        self.data().kind
    }

    pub fn is_named(&self) -> bool {
        self.data().named
    }

    pub fn is_error(&self) -> bool {
        self.data().kind == SYMBOL_ERROR
    }

    /// Zero-width placeholder inserted by error recovery.
    pub fn is_missing(&self) -> bool {
        self.data().missing.is_some()
    }

    /// Name of the symbol a missing node stands for.
    pub fn missing_kind(&self) -> Option<&'t str> {
        let symbol = self.data().missing?;
        Some(self.tree.language().table().symbol_name(symbol))
    }

    pub fn is_extra(&self) -> bool {
        self.data().extra
    }

    /// This node or a descendant is an ERROR.
    pub fn has_error(&self) -> bool {
        self.data().has_error
    }

    pub fn byte_range(&self) -> Range<usize> {
        self.data().start..self.data().end
    }

    pub fn start_byte(&self) -> usize {
        self.data().start
    }

    pub fn end_byte(&self) -> usize {
        self.data().end
    }

    pub fn start_point(&self) -> Point {
        self.tree.point(self.data().start)
    }

    pub fn end_point(&self) -> Point {
        self.tree.point(self.data().end)
    }

    pub fn text(&self) -> &'t str {
        &self.tree.source()[self.byte_range()]
    }

    pub fn parent(&self) -> Option<Node<'t>> {
        self.data().parent.map(|id| self.at(id))
    }

    pub fn child(&self, index: usize) -> Option<Node<'t>> {
        self.tree
            .children_of(self.id)
            .get(index)
            .map(|&id| self.at(id))
    }

    pub fn child_count(&self) -> usize {
        self.tree.children_of(self.id).len()
    }

    pub fn named_child(&self, index: usize) -> Option<Node<'t>> {
        self.named_children().nth(index)
    }

    pub fn named_child_count(&self) -> usize {
        self.named_children().count()
    }

    pub fn children(&self) -> Children<'t> {
        Children::new(self.tree, self.tree.children_of(self.id))
    }

    pub fn named_children(&self) -> impl Iterator<Item = Node<'t>> + use<'t> {
        self.children().filter(Node::is_named)
    }

    /// First child under the field `name`.
    pub fn child_by_field(&self, name: &str) -> Option<Node<'t>> {
        self.children_by_field(name).next()
    }

    pub fn children_by_field(&self, name: &str) -> impl Iterator<Item = Node<'t>> + use<'t> {
        let field = self.tree.language().field_id(name);
        self.children()
            .filter(move |child| field.is_some() && child.data().field == field)
    }

    /// Field this node occupies in its parent.
    pub fn field_name(&self) -> Option<&'t str> {
        let field = self.data().field?;
        Some(self.tree.language().table().field_name(field))
    }

    pub fn next_sibling(&self) -> Option<Node<'t>> {
        let parent = self.data().parent?;
        let index = self.data().index as usize + 1;
        self.tree.children_of(parent).get(index).map(|&id| self.at(id))
    }

    pub fn prev_sibling(&self) -> Option<Node<'t>> {
        let parent = self.data().parent?;
        let index = (self.data().index as usize).checked_sub(1)?;
        self.tree.children_of(parent).get(index).map(|&id| self.at(id))
    }

    pub fn walk(&self) -> TreeCursor<'t> {
        TreeCursor::new(self.tree, self.id)
    }

    /// This node and everything below it, in pre-order.
    pub fn descendants(&self) -> Descendants<'t> {
        Descendants::new(self.walk())
    }

    /// Smallest descendant covering `range`.
    pub fn descendant_for_range(&self, range: Range<usize>) -> Option<Node<'t>> {
        let covers =
            |node: &Node<'t>| node.start_byte() <= range.start && range.end <= node.end_byte();
        if !covers(self) {
            return None;
        }
        let mut node = *self;
        while let Some(child) = node.children().find(covers) {
            node = child;
        }
        Some(node)
    }

    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        sexp::write(*self, &mut out);
        out
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let range = self.byte_range();
        write!(f, "{} {}..{}", self.kind(), range.start, range.end)?;
        if self.is_missing() {
            write!(f, " (missing)")?;
        }
        Ok(())
    }
}
