//! Search-tree storage shared by the frontier-based solvers.
//!
//! Nodes live in an arena and refer to their parent through a [`NodeId`]
//! handle, so path reconstruction is a walk over indices. Nodes are only ever
//! appended, never reparented, so the parent links cannot form cycles.

use crate::engine::{Action, Board};
use log::warn;

/// Stable handle of a node inside a [`SearchTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

#[derive(Clone, Debug)]
pub struct Node {
    pub board: Board,
    pub parent: Option<NodeId>,
    /// Action that produced this node from its parent. `None` for roots.
    pub action: Option<Action>,
    pub depth: u32,
}

/// Append-only arena of search nodes. A tree may hold several roots, which
/// the belief-state searches use for their initial candidate boards.
#[derive(Debug, Default)]
pub struct SearchTree {
    nodes: Vec<Node>,
}

impl SearchTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(board: Board) -> (Self, NodeId) {
        let mut tree = Self::new();
        let root = tree.add_root(board);
        (tree, root)
    }

    pub fn add_root(&mut self, board: Board) -> NodeId {
        self.push(Node {
            board,
            parent: None,
            action: None,
            depth: 0,
        })
    }

    /// Appends a child of `parent`, one level deeper.
    pub fn add_child(&mut self, parent: NodeId, action: Option<Action>, board: Board) -> NodeId {
        let depth = self.get(parent).depth + 1;
        self.push(Node {
            board,
            parent: Some(parent),
            action,
            depth,
        })
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn board(&self, id: NodeId) -> &Board {
        &self.get(id).board
    }

    pub fn depth(&self, id: NodeId) -> u32 {
        self.get(id).depth
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Boards from the root of `id`'s branch down to `id`, inclusive.
    pub fn path(&self, id: NodeId) -> Vec<Board> {
        let mut path = Vec::with_capacity(self.depth(id) as usize + 1);
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.get(node_id);
            path.push(node.board);
            current = node.parent;
        }
        path.reverse();
        path
    }
}

/// Counter that stops a search once it has expanded `limit` nodes.
#[derive(Clone, Debug)]
pub struct Budget {
    stage: &'static str,
    limit: u64,
    spent: u64,
}

impl Budget {
    pub fn new(stage: &'static str, limit: u64) -> Self {
        Self {
            stage,
            limit,
            spent: 0,
        }
    }

    /// Records one expansion. Returns `false`, and logs once, when the
    /// budget is exhausted.
    pub fn spend(&mut self) -> bool {
        if self.spent >= self.limit {
            if self.spent == self.limit {
                warn!(
                    "{}: expansion budget of {} exhausted, giving up",
                    self.stage, self.limit
                );
                self.spent += 1;
            }
            return false;
        }
        self.spent += 1;
        true
    }

    pub fn spent(&self) -> u64 {
        self.spent.min(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GOAL;

    #[test]
    fn test_path_walks_parents_to_root() {
        let start = GOAL.apply(Action::Up).unwrap().apply(Action::Left).unwrap();
        let (mut tree, root) = SearchTree::with_root(start);
        let mid = start.apply(Action::Right).unwrap();
        let a = tree.add_child(root, Some(Action::Right), mid);
        let b = tree.add_child(a, Some(Action::Down), GOAL);

        assert_eq!(tree.depth(b), 2);
        assert_eq!(tree.get(b).action, Some(Action::Down));
        assert_eq!(tree.path(b), vec![start, mid, GOAL]);
        assert_eq!(tree.path(root), vec![start]);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_multiple_roots_have_independent_paths() {
        let mut tree = SearchTree::new();
        assert!(tree.is_empty());
        let r1 = tree.add_root(GOAL);
        let other = GOAL.apply(Action::Up).unwrap();
        let r2 = tree.add_root(other);
        let child = tree.add_child(r2, Some(Action::Down), GOAL);
        assert_eq!(tree.path(child), vec![other, GOAL]);
        assert_eq!(tree.path(r1), vec![GOAL]);
    }

    #[test]
    fn test_budget_stops_after_limit() {
        let mut budget = Budget::new("test", 3);
        assert!(budget.spend());
        assert!(budget.spend());
        assert!(budget.spend());
        assert!(!budget.spend());
        assert!(!budget.spend());
        assert_eq!(budget.spent(), 3);
    }
}
