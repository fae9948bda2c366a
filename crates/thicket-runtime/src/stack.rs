//! Graph-structured (cactus) parse stack.
//!
//! Nodes live in an append-only arena and point at their parent, so forked
//! heads share everything below the fork point. Node 0 is the bottom of
//! every stack and carries state 0.

use std::cmp::Ordering;
use std::sync::Arc;

use thicket_core::StateId;

use crate::subtree::Subtree;

pub(crate) type StackId = u32;

#[derive(Debug)]
pub(crate) struct StackNode {
    pub state: StateId,
    /// `None` only for the bottom node.
    pub subtree: Option<Arc<Subtree>>,
    pub parent: Option<StackId>,
    /// Absolute byte offset where this node's subtree ends.
    pub position: usize,
    pub depth: u32,
}

impl StackNode {
    pub fn is_extra(&self) -> bool {
        self.subtree.as_ref().is_some_and(|s| s.extra)
    }
}

#[derive(Debug)]
pub(crate) struct Stack {
    nodes: Vec<StackNode>,
}

impl Stack {
    pub fn new(position: usize) -> Self {
        Self {
            nodes: vec![StackNode {
                state: 0,
                subtree: None,
                parent: None,
                position,
                depth: 0,
            }],
        }
    }

    pub fn node(&self, id: StackId) -> &StackNode {
        &self.nodes[id as usize]
    }

    pub fn state(&self, id: StackId) -> StateId {
        self.nodes[id as usize].state
    }

    pub fn push(&mut self, parent: StackId, state: StateId, subtree: Arc<Subtree>) -> StackId {
        let below = &self.nodes[parent as usize];
        let node = StackNode {
            state,
            position: below.position + subtree.total(),
            depth: below.depth + 1,
            subtree: Some(subtree),
            parent: Some(parent),
        };
        let id = self.nodes.len() as StackId;
        self.nodes.push(node);
        id
    }

    /// Subtrees from the bottom up to and including `top`.
    pub fn subtrees(&self, top: StackId) -> Vec<Arc<Subtree>> {
        let mut out = Vec::new();
        let mut id = Some(top);
        while let Some(current) = id {
            let node = self.node(current);
            if let Some(subtree) = &node.subtree {
                out.push(Arc::clone(subtree));
            }
            id = node.parent;
        }
        out.reverse();
        out
    }

    /// Whether two stacks carry the same states all the way down. Their
    /// futures are then indistinguishable and one head can absorb the other.
    pub fn same_states(&self, a: StackId, b: StackId) -> bool {
        let (mut a, mut b) = (a, b);
        loop {
            if a == b {
                return true;
            }
            let (na, nb) = (self.node(a), self.node(b));
            if na.state != nb.state || na.depth != nb.depth {
                return false;
            }
            match (na.parent, nb.parent) {
                (Some(pa), Some(pb)) => {
                    a = pa;
                    b = pb;
                }
                _ => return false,
            }
        }
    }
}

/// One live GLR head.
#[derive(Clone, Debug)]
pub(crate) struct Head {
    pub node: StackId,
    pub error_cost: u32,
    pub dynamic_precedence: i32,
    /// Action index chosen at each fork since the last time this was the
    /// only head.
    pub path: Vec<u16>,
    /// Consecutive zero-width insertions.
    pub insertions: u32,
}

impl Head {
    pub fn new(node: StackId) -> Self {
        Self {
            node,
            error_cost: 0,
            dynamic_precedence: 0,
            path: Vec::new(),
            insertions: 0,
        }
    }

    /// Preference order, best first: fewest errors, then highest dynamic
    /// precedence, then the earliest choice at the first fork divergence.
    pub fn preference(&self, other: &Self) -> Ordering {
        self.error_cost
            .cmp(&other.error_cost)
            .then(other.dynamic_precedence.cmp(&self.dynamic_precedence))
            .then_with(|| self.path.cmp(&other.path))
    }
}

/// Best head by [`Head::preference`].
pub(crate) fn preferred(heads: Vec<Head>) -> Option<Head> {
    heads.into_iter().min_by(|a, b| a.preference(b))
}
