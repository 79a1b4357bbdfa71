use std::collections::{HashSet, VecDeque};

use crate::graph::Graph;
use crate::types::{Community, VInt};

// Using bfs to walk through one component.
fn bfs_component(
    graph: &Graph,
    start_vertex: VInt,
    visited: &mut HashSet<VInt>,
    result: &mut Vec<VInt>,
) {
    let mut queue = VecDeque::new();
    queue.push_back(start_vertex);
    visited.insert(start_vertex);

    // Start to walk.
    while let Some(v) = queue.pop_front() {
        result.push(v);
        for neighbor in graph.neighbors(v) {
            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }
}

/// Compute the connected components of the graph.
///
/// Every node lands in exactly one component, isolated nodes as singletons.
/// Members are sorted and components come ordered by their smallest member,
/// since the walk starts from nodes in ascending order.
pub fn connected_components(graph: &Graph) -> Vec<Community> {
    let mut visited = HashSet::with_capacity(graph.node_count());
    let mut components = vec![];
    for v in graph.nodes() {
        if !visited.contains(&v) {
            let mut component = Vec::new();
            bfs_component(graph, v, &mut visited, &mut component);
            component.sort_unstable();
            components.push(component);
        }
    }
    components
}

/// Count the components without keeping their members.
pub fn component_count(graph: &Graph) -> usize {
    let mut visited = HashSet::with_capacity(graph.node_count());
    let mut scratch = Vec::new();
    let mut count = 0usize;
    for v in graph.nodes() {
        if !visited.contains(&v) {
            bfs_component(graph, v, &mut visited, &mut scratch);
            scratch.clear();
            count += 1;
        }
    }
    count
}
