//! Green subtrees to the node arena.

use std::sync::Arc;

use thicket_core::{FieldId, SYMBOL_ERROR, SymbolId};
use thicket_table::ParseTable;

use super::{NodeData, NodeId};
use crate::subtree::Subtree;

pub(super) struct TreeBuilder<'a> {
    table: &'a ParseTable,
    nodes: Vec<NodeData>,
    children: Vec<Vec<NodeId>>,
}

struct Frame<'s> {
    subtree: &'s Arc<Subtree>,
    /// Absolute start of the subtree's padding.
    start: usize,
    /// Nearest visible ancestor.
    parent: NodeId,
    field: Option<FieldId>,
    alias: Option<SymbolId>,
}

impl<'a> TreeBuilder<'a> {
    pub(super) fn new(table: &'a ParseTable) -> Self {
        Self {
            table,
            nodes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Materialize the visible nodes of `root` in pre-order. The root always
    /// gets a node and covers `0..len`.
    pub(super) fn build(mut self, root: &Arc<Subtree>, len: usize) -> (Vec<NodeData>, Vec<NodeId>) {
        let root_id = self.add(NodeData {
            kind: root.symbol,
            named: true,
            start: 0,
            end: len,
            parent: None,
            index: 0,
            edges: 0..0,
            field: None,
            missing: root.missing,
            extra: false,
            has_error: root.error_count > 0,
        });
        if root.symbol != SYMBOL_ERROR {
            self.nodes[0].named = self.table.is_named(root.symbol);
        }

        let mut stack = Vec::new();
        self.push_children(&mut stack, root, 0, root_id, None);

        while let Some(frame) = stack.pop() {
            let subtree = frame.subtree;
            let (parent, inherited) = if self.is_visible(&frame) {
                let id = self.visible_node(&frame);
                (id, None)
            } else {
                (frame.parent, frame.field)
            };
            self.push_children(&mut stack, subtree, frame.start, parent, inherited);
        }

        self.finish()
    }

    fn is_visible(&self, frame: &Frame<'_>) -> bool {
        frame.subtree.is_error() || frame.alias.is_some() || self.table.is_visible(frame.subtree.symbol)
    }

    fn visible_node(&mut self, frame: &Frame<'_>) -> NodeId {
        let subtree = frame.subtree;
        let kind = frame.alias.unwrap_or(subtree.symbol);
        let named = if kind == SYMBOL_ERROR {
            !subtree.children.is_empty() || subtree.missing.is_some()
        } else {
            self.table.is_named(kind)
        };
        let start = frame.start + subtree.padding;
        let index = self.children[frame.parent.index()].len() as u32;
        let id = self.add(NodeData {
            kind,
            named,
            start,
            end: start + subtree.size,
            parent: Some(frame.parent),
            index,
            edges: 0..0,
            field: frame.field,
            missing: subtree.missing,
            extra: subtree.extra,
            has_error: subtree.error_count > 0,
        });
        self.children[frame.parent.index()].push(id);
        id
    }

    /// Queue the children of `subtree` so they pop in document order.
    fn push_children<'s>(
        &self,
        stack: &mut Vec<Frame<'s>>,
        subtree: &'s Arc<Subtree>,
        start: usize,
        parent: NodeId,
        inherited: Option<FieldId>,
    ) {
        let infos = subtree
            .production
            .map(|p| self.table.production(p).children.as_slice())
            .unwrap_or_default();

        let mut frames = Vec::with_capacity(subtree.children.len());
        let mut offset = start;
        let mut position = 0;
        for child in &subtree.children {
            let info = if child.extra {
                None
            } else {
                position += 1;
                infos.get(position - 1)
            };
            let field = if child.extra {
                None
            } else {
                info.and_then(|i| i.field).or(inherited)
            };
            let alias = info.and_then(|i| i.alias).filter(|_| !child.is_error());
            frames.push(Frame {
                subtree: child,
                start: offset,
                parent,
                field,
                alias,
            });
            offset += child.total();
        }
        stack.extend(frames.into_iter().rev());
    }

    fn add(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(data);
        self.children.push(Vec::new());
        id
    }

    fn finish(mut self) -> (Vec<NodeData>, Vec<NodeId>) {
        let mut edges = Vec::with_capacity(self.nodes.len());
        for (node, children) in self.nodes.iter_mut().zip(self.children) {
            let start = edges.len() as u32;
            edges.extend(children);
            node.edges = start..edges.len() as u32;
        }
        (self.nodes, edges)
    }
}
