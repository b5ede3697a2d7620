use super::*;
use petgraph::{graph::NodeIndex, visit::DfsPostOrder, Graph};

/// List every node reachable from `root` exactly once, each node ahead of
/// all of its dependencies. `root` comes first.
///
/// The walk is an explicit-stack post-order DFS; reversing it yields the
/// topological order. Shared ancestors are only visited once.
pub fn topological_order(graph: &Graph<Node, Dependency>, root: NodeIndex) -> Vec<NodeIndex> {
    let mut dfs = DfsPostOrder::new(graph, root);
    let mut order = Vec::new();

    while let Some(node) = dfs.next(graph) {
        order.push(node);
    }

    order.reverse();
    order
}
