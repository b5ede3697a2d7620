use super::*;
use petgraph::{graph::NodeIndex, Graph};
use std::collections::HashMap;

/// Longest latency-weighted path from the first node of `order` to every
/// other node in it.
///
/// `order` must list each node ahead of its dependencies, as
/// [`topological_order`] does. Entering a node along an edge costs that
/// node's latency, so the first node has depth 0.
pub fn critical_path(graph: &Graph<Node, Dependency>, order: &[NodeIndex]) -> HashMap<NodeIndex, Depth> {
    let mut depths: HashMap<NodeIndex, Depth> = order.iter().map(|n| (*n, 0)).collect();

    for &node in order {
        let reached = depths.get(&node).cloned().unwrap_or(0);

        for dep in graph.neighbors(node) {
            let candidate = reached + Depth::from(graph[dep].latency);
            let current = depths.entry(dep).or_insert(0);
            if candidate > *current {
                *current = candidate;
            }
        }
    }

    depths
}
