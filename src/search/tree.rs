//! Arena-backed tree of partial placements.

use smallvec::SmallVec;

use crate::model::Cell;

pub type NodeId = usize;

/// One placement decision: a station placed on a cell, linked to the
/// decision it extends.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub station: String,
    pub cell: Cell,
    pub parent: Option<NodeId>,
    pub children: SmallVec<[NodeId; 4]>,
    /// Set when expansion decided this node terminates a configuration
    /// (all stations placed or no candidate cells left). Nodes whose
    /// children were all discarded as duplicates are not leaves.
    pub terminal: bool,
}

/// The configuration tree. Nodes are stored in creation order, which is
/// depth-first discovery order, and reference each other by index.
#[derive(Debug, Clone)]
pub struct SearchTree {
    nodes: Vec<TreeNode>,
}

impl SearchTree {
    pub fn with_root(station: impl Into<String>, cell: Cell) -> Self {
        Self {
            nodes: vec![TreeNode {
                station: station.into(),
                cell,
                parent: None,
                children: SmallVec::new(),
                terminal: false,
            }],
        }
    }

    pub const ROOT: NodeId = 0;

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_child(&mut self, parent: NodeId, station: impl Into<String>, cell: Cell) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(TreeNode {
            station: station.into(),
            cell,
            parent: Some(parent),
            children: SmallVec::new(),
            terminal: false,
        });
        self.nodes[parent].children.push(id);
        id
    }

    pub fn mark_terminal(&mut self, id: NodeId) {
        self.nodes[id].terminal = true;
    }

    /// Placements along the path from `id` up to the root, nearest
    /// first.
    pub fn ancestry(&self, id: NodeId) -> impl Iterator<Item = &TreeNode> + '_ {
        let mut current = Some(id);
        std::iter::from_fn(move || {
            let id = current?;
            let node = &self.nodes[id];
            current = node.parent;
            Some(node)
        })
    }

    /// Detach `id` from its parent. The node stays in the arena but is
    /// no longer reachable from the root.
    pub fn unlink(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id].parent {
            self.nodes[parent].children.retain(|&mut child| child != id);
        }
    }

    /// Terminal nodes reachable from the root, in depth-first discovery
    /// order.
    pub fn reachable_leaves(&self) -> Vec<NodeId> {
        let mut reachable = vec![false; self.nodes.len()];
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            reachable[id] = true;
            stack.extend(self.nodes[id].children.iter().copied());
        }

        (0..self.nodes.len())
            .filter(|&id| reachable[id] && self.nodes[id].terminal)
            .collect()
    }

    /// Number of terminal nodes still reachable from the root.
    pub fn leaf_count(&self) -> usize {
        self.reachable_leaves().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ancestry_walks_to_root() {
        let mut tree = SearchTree::with_root("InOut", Cell::new(2, 0));
        let a = tree.add_child(SearchTree::ROOT, "A", Cell::new(2, 1));
        let b = tree.add_child(a, "B", Cell::new(2, 2));
        tree.mark_terminal(b);

        let stations: Vec<&str> = tree.ancestry(b).map(|n| n.station.as_str()).collect();
        assert_eq!(stations, vec!["B", "A", "InOut"]);
    }

    #[test]
    fn unlink_detaches_subtree() {
        let mut tree = SearchTree::with_root("InOut", Cell::new(2, 0));
        let a = tree.add_child(SearchTree::ROOT, "A", Cell::new(2, 1));
        let b = tree.add_child(a, "B", Cell::new(2, 2));
        tree.mark_terminal(b);

        assert_eq!(tree.reachable_leaves(), vec![b]);
        tree.unlink(a);
        assert!(tree.reachable_leaves().is_empty());
    }

    #[test]
    fn leaves_are_reported_in_creation_order() {
        let mut tree = SearchTree::with_root("InOut", Cell::new(2, 0));
        let a = tree.add_child(SearchTree::ROOT, "A", Cell::new(2, 1));
        let b = tree.add_child(a, "B", Cell::new(1, 1));
        tree.mark_terminal(b);
        let c = tree.add_child(a, "C", Cell::new(3, 1));
        tree.mark_terminal(c);

        assert_eq!(tree.reachable_leaves(), vec![b, c]);
    }
}
