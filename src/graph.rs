use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound::{Excluded, Unbounded};

use crate::error::{GnError, GnResult};
use crate::types::{Edge, VInt};

/// Undirected simple graph kept as an adjacency map.
///
/// Every node owns the set of its neighbours, so `degree` is the length of that
/// set and never needs a scan. Each edge is stored twice, once per endpoint,
/// and `e_size` counts it once.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Graph {
    pub(crate) adj_map: BTreeMap<VInt, BTreeSet<VInt>>,
    pub(crate) e_size: usize,
}

impl Graph {
    pub fn new() -> Graph {
        Graph {
            adj_map: BTreeMap::new(),
            e_size: 0,
        }
    }

    /// Build a graph from an edge iterator, stopping at the first self-loop.
    pub fn from_edges(edges_iter: impl IntoIterator<Item = (VInt, VInt)>) -> GnResult<Graph> {
        let mut graph = Graph::new();
        for (u, v) in edges_iter {
            graph.add_edge(u, v)?;
        }
        Ok(graph)
    }

    /// Insert an isolated node, no-op if it exists.
    pub fn add_node(&mut self, u: VInt) {
        self.adj_map.entry(u).or_default();
    }

    /// Insert the undirected edge (u, v), creating missing endpoints.
    /// Inserting an existing edge again changes nothing.
    pub fn add_edge(&mut self, u: VInt, v: VInt) -> GnResult<()> {
        if u == v {
            return Err(GnError::InvalidInput(format!("self-loop on node {}", u)));
        }
        let inserted = self.adj_map.entry(u).or_default().insert(v);
        // The other direction.
        self.adj_map.entry(v).or_default().insert(u);
        if inserted {
            self.e_size += 1;
        }
        Ok(())
    }

    /// Remove the edge (u, v) if present, return whether something was removed.
    pub fn remove_edge(&mut self, u: VInt, v: VInt) -> bool {
        let removed = match self.adj_map.get_mut(&u) {
            None => false,
            Some(neighbors) => neighbors.remove(&v),
        };
        if removed {
            if let Some(neighbors) = self.adj_map.get_mut(&v) {
                neighbors.remove(&u);
            }
            self.e_size -= 1;
        }
        removed
    }

    /// Remove a node with all its incident edges, no-op if absent.
    pub fn remove_node(&mut self, u: VInt) {
        if let Some(neighbors) = self.adj_map.remove(&u) {
            for neighbor in &neighbors {
                if let Some(back) = self.adj_map.get_mut(neighbor) {
                    back.remove(&u);
                }
            }
            self.e_size -= neighbors.len();
        }
    }

    /// Number of incident edges, `NotFound` for an absent node.
    pub fn degree(&self, u: VInt) -> GnResult<usize> {
        self.adj_map
            .get(&u)
            .map(|neighbors| neighbors.len())
            .ok_or(GnError::NotFound(u))
    }

    /// Remove every node whose degree is strictly below `threshold`.
    ///
    /// Degrees are read once before anything is removed, so a node that drops
    /// below the threshold because its neighbours were pruned stays.
    pub fn prune_below_degree(&mut self, threshold: usize) -> Vec<VInt> {
        let removed: Vec<VInt> = self
            .adj_map
            .iter()
            .filter(|(_, neighbors)| neighbors.len() < threshold)
            .map(|(u, _)| *u)
            .collect();
        for u in &removed {
            self.remove_node(*u);
        }
        removed
    }

    pub fn contains_node(&self, u: VInt) -> bool {
        self.adj_map.contains_key(&u)
    }

    pub fn has_edge(&self, u: VInt, v: VInt) -> bool {
        self.adj_map
            .get(&u)
            .map_or(false, |neighbors| neighbors.contains(&v))
    }

    pub fn node_count(&self) -> usize {
        self.adj_map.len()
    }

    pub fn edge_count(&self) -> usize {
        self.e_size
    }

    pub fn is_empty(&self) -> bool {
        self.adj_map.is_empty()
    }

    /// Node ids in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = VInt> + '_ {
        self.adj_map.keys().copied()
    }

    /// Neighbours of `u` in ascending order, empty for an absent node.
    pub fn neighbors(&self, u: VInt) -> impl Iterator<Item = VInt> + '_ {
        self.adj_map.get(&u).into_iter().flatten().copied()
    }

    /// Each edge once, normalised and in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.adj_map.iter().flat_map(|(u, neighbors)| {
            neighbors
                .range((Excluded(*u), Unbounded))
                .map(move |v| Edge { u: *u, v: *v })
        })
    }
}
