//! Syntax trees.
//!
//! A [`Tree`] is a flat arena of the visible nodes of one parse, indexed by
//! [`NodeId`] in document pre-order. Hidden rules and repeat helpers exist
//! only in the green subtrees underneath; their children are attached to
//! the nearest visible ancestor. Trees are immutable.

mod builder;
mod cursor;
mod node;
mod sexp;


use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use line_index::{LineIndex, TextSize};
use thicket_core::{FieldId, Point, SymbolId};

use crate::incremental::ReuseStats;
use crate::language::Language;
use crate::subtree::Subtree;

pub use cursor::{Children, Descendants, TreeCursor};
pub use node::Node;

/// Index of a node in its tree's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NodeData {
    pub kind: SymbolId,
    pub named: bool,
    pub start: usize,
    pub end: usize,
    pub parent: Option<NodeId>,
    /// Position among the parent's children.
    pub index: u32,
    /// Range of this node's children in `Tree::edges`.
    pub edges: Range<u32>,
    pub field: Option<FieldId>,
    /// Symbol a recovery placeholder stands for.
    pub missing: Option<SymbolId>,
    pub extra: bool,
    pub has_error: bool,
}

/// An immutable syntax tree over the source it was parsed from.
pub struct Tree {
    language: Language,
    source: Arc<str>,
    nodes: Vec<NodeData>,
    edges: Vec<NodeId>,
    root: NodeId,
    green: Arc<Subtree>,
    lines: LineIndex,
    stats: ReuseStats,
}

impl Tree {
    pub(crate) fn build(
        language: Language,
        text: &str,
        green: Arc<Subtree>,
        stats: ReuseStats,
    ) -> Self {
        let (nodes, edges) = builder::TreeBuilder::new(language.table()).build(&green, text.len());
        Self {
            lines: LineIndex::new(text),
            source: Arc::from(text),
            language,
            nodes,
            edges,
            root: NodeId(0),
            green,
            stats,
        }
    }

    pub fn root_node(&self) -> Node<'_> {
        Node::new(self, self.root)
    }

    pub fn node(&self, id: NodeId) -> Option<Node<'_>> {
        (id.index() < self.nodes.len()).then(|| Node::new(self, id))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Shared handle to the source text.
    pub fn source_arc(&self) -> Arc<str> {
        Arc::clone(&self.source)
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// What the reparse that built this tree reused. Zero for full parses.
    pub fn reuse_stats(&self) -> ReuseStats {
        self.stats
    }

    pub fn has_error(&self) -> bool {
        self.green.error_count > 0
    }

    /// Named ERROR nodes (skipped regions and inserted placeholders), in
    /// document order.
    pub fn errors(&self) -> Vec<Node<'_>> {
        self.root_node()
            .descendants()
            .filter(|node| node.is_error() && node.is_named())
            .collect()
    }

    /// S-expression of the named nodes.
    pub fn to_sexp(&self) -> String {
        self.root_node().to_sexp()
    }

    /// Every leaf's byte range extended over its leading padding, in order.
    /// Together with the trailing padding they tile the source.
    pub fn leaf_spans(&self) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        self.green.leaf_spans(&mut spans);
        spans
    }

    /// Source text rebuilt from the leaves.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut end = 0;
        for span in self.leaf_spans() {
            out.push_str(&self.source[span.clone()]);
            end = span.end;
        }
        out.push_str(&self.source[end..]);
        out
    }

    pub(crate) fn green(&self) -> &Arc<Subtree> {
        &self.green
    }

    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub(crate) fn children_of(&self, id: NodeId) -> &[NodeId] {
        let edges = &self.data(id).edges;
        &self.edges[edges.start as usize..edges.end as usize]
    }

    pub(crate) fn point(&self, offset: usize) -> Point {
        let line_col = self.lines.line_col(TextSize::new(offset as u32));
        Point::new(line_col.line, line_col.col)
    }
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.root == other.root
            && self.nodes == other.nodes
            && self.edges == other.edges
    }
}

impl Eq for Tree {}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("language", &self.language.name())
            .field("nodes", &self.nodes.len())
            .field("sexp", &self.to_sexp())
            .finish()
    }
}
