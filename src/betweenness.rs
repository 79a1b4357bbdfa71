use std::collections::{BTreeMap, VecDeque};

use log::{debug, trace};
use rand::Rng;
use rayon::prelude::*;

use crate::config::{SampleSize, SCORE_TOLERANCE, SOURCE_BATCH_SIZE};
use crate::graph::Graph;
use crate::types::{Edge, VInt};

/// Edge betweenness scores, keyed by normalised edge.
pub type BetweennessMap = BTreeMap<Edge, f64>;

const UNVISITED: usize = usize::MAX;

// Dense snapshot of the graph, nodes and edges are addressed by position.
struct IndexedGraph {
    node_ids: Vec<VInt>,
    adjacency: Vec<Vec<(usize, usize)>>, // (neighbour index, edge index) per node.
    edges: Vec<Edge>,
}

impl IndexedGraph {
    fn build(graph: &Graph) -> IndexedGraph {
        let node_ids: Vec<VInt> = graph.nodes().collect();
        let edges: Vec<Edge> = graph.edges().collect();
        let position: BTreeMap<VInt, usize> =
            node_ids.iter().enumerate().map(|(idx, id)| (*id, idx)).collect();
        let mut adjacency = vec![Vec::new(); node_ids.len()];
        for (edge_idx, edge) in edges.iter().enumerate() {
            // Edge endpoints are always graph nodes.
            let u = position[&edge.u];
            let v = position[&edge.v];
            adjacency[u].push((v, edge_idx));
            adjacency[v].push((u, edge_idx));
        }
        IndexedGraph {
            node_ids,
            adjacency,
            edges,
        }
    }

    fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    /// Add the dependencies of every target on `source` to `scores`.
    fn accumulate_from(&self, source: usize, scratch: &mut Scratch, scores: &mut [f64]) {
        // Step 1. BFS, counting shortest paths and recording predecessors.
        scratch.dist[source] = 0;
        scratch.sigma[source] = 1.0;
        scratch.queue.push_back(source);
        while let Some(v) = scratch.queue.pop_front() {
            scratch.order.push(v);
            let next_dist = scratch.dist[v] + 1;
            for &(w, edge_idx) in &self.adjacency[v] {
                if scratch.dist[w] == UNVISITED {
                    scratch.dist[w] = next_dist;
                    scratch.queue.push_back(w);
                }
                if scratch.dist[w] == next_dist {
                    scratch.sigma[w] += scratch.sigma[v];
                    scratch.preds[w].push((v, edge_idx));
                }
            }
        }

        // Step 2. Walk back in reverse BFS order and push dependencies onto edges.
        for &w in scratch.order.iter().rev() {
            let coefficient = (1.0 + scratch.delta[w]) / scratch.sigma[w];
            for &(v, edge_idx) in &scratch.preds[w] {
                let contribution = scratch.sigma[v] * coefficient;
                scores[edge_idx] += contribution;
                scratch.delta[v] += contribution;
            }
        }

        scratch.reset();
    }
}

// Per-task buffers, reset after each source by touching only reached nodes.
struct Scratch {
    dist: Vec<usize>,
    sigma: Vec<f64>,
    delta: Vec<f64>,
    preds: Vec<Vec<(usize, usize)>>,
    order: Vec<usize>,
    queue: VecDeque<usize>,
}

impl Scratch {
    fn new(node_count: usize) -> Scratch {
        Scratch {
            dist: vec![UNVISITED; node_count],
            sigma: vec![0.0; node_count],
            delta: vec![0.0; node_count],
            preds: vec![Vec::new(); node_count],
            order: Vec::with_capacity(node_count),
            queue: VecDeque::with_capacity(node_count),
        }
    }

    fn reset(&mut self) {
        for &v in &self.order {
            self.dist[v] = UNVISITED;
            self.sigma[v] = 0.0;
            self.delta[v] = 0.0;
            self.preds[v].clear();
        }
        self.order.clear();
    }
}

/// Pick the BFS sources, as sorted node positions.
fn select_sources<R: Rng + ?Sized>(node_count: usize, sample_size: SampleSize, rng: &mut R) -> Vec<usize> {
    match sample_size {
        SampleSize::Sampled(k) if k < node_count => {
            let mut sources = rand::seq::index::sample(rng, node_count, k).into_vec();
            sources.sort_unstable();
            sources
        }
        _ => (0..node_count).collect(),
    }
}

/// Compute the edge betweenness of every edge in `graph`.
///
/// Each selected source runs one BFS and pushes the shortest-path dependencies
/// of all targets onto the edges, then the sums are rescaled:
/// halved since every pair is counted from both ends, multiplied by `n / k`
/// when only `k` sources were sampled, and divided by `n (n - 1) / 2` when
/// `normalized` is set. All rescalings keep the order of the edges.
///
/// Sources are handed to rayon in fixed batches whose partial sums are added
/// in batch order, so the result does not depend on the thread count.
pub fn edge_betweenness<R: Rng + ?Sized>(
    graph: &Graph,
    sample_size: SampleSize,
    normalized: bool,
    rng: &mut R,
) -> BetweennessMap {
    if graph.node_count() < 2 || graph.edge_count() == 0 {
        return BetweennessMap::new();
    }
    let indexed = IndexedGraph::build(graph);
    let n = indexed.node_count();
    let m = indexed.edges.len();
    let sources = select_sources(n, sample_size, rng);
    debug!(
        "Edge betweenness over {} nodes and {} edges from {} sources",
        n,
        m,
        sources.len()
    );

    let partials: Vec<Vec<f64>> = sources
        .par_chunks(SOURCE_BATCH_SIZE)
        .map(|batch| {
            let mut scratch = Scratch::new(n);
            let mut scores = vec![0.0f64; m];
            for &source in batch {
                indexed.accumulate_from(source, &mut scratch, &mut scores);
            }
            scores
        })
        .collect();

    let mut totals = vec![0.0f64; m];
    for partial in partials {
        for (total, score) in totals.iter_mut().zip(partial) {
            *total += score;
        }
    }

    let mut scale = if normalized {
        1.0 / (n as f64 * (n as f64 - 1.0))
    } else {
        0.5
    };
    if !sources.is_empty() && sources.len() < n {
        scale *= n as f64 / sources.len() as f64;
    }
    trace!("Betweenness scale factor {}", scale);

    indexed
        .edges
        .into_iter()
        .zip(totals)
        .map(|(edge, total)| (edge, total * scale))
        .collect()
}

/// True when `score` beats `best` by more than `SCORE_TOLERANCE` relative to
/// the larger magnitude.
fn exceeds(score: f64, best: f64) -> bool {
    score - best > SCORE_TOLERANCE * score.abs().max(best.abs())
}

/// The edge with the highest score, smallest edge first among ties.
///
/// Two scores are a tie when they differ by at most `SCORE_TOLERANCE` times
/// the larger one. The band only absorbs floating point rounding, so a score
/// that is higher by more than a few ulps per summed source still wins.
pub fn max_edge(scores: &BetweennessMap) -> Option<(Edge, f64)> {
    let mut best: Option<(Edge, f64)> = None;
    // The map iterates edges in ascending order, so a later edge only wins by
    // a strictly larger score.
    for (edge, score) in scores {
        match best {
            Some((_, best_score)) if !exceeds(*score, best_score) => {}
            _ => best = Some((*edge, *score)),
        }
    }
    best
}
