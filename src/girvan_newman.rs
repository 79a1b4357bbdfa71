use std::time::{Duration, Instant};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::betweenness::{edge_betweenness, max_edge};
use crate::components::{component_count, connected_components};
use crate::config::DetectorConfig;
use crate::error::{GnError, GnResult};
use crate::graph::Graph;
use crate::types::{Community, Edge, VInt};

/// How a detection run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Termination {
    /// Pruning left no node, the partition is empty.
    Empty,
    /// The pruned graph was disconnected before any removal.
    AlreadySplit,
    /// An edge removal split the graph.
    SplitFound,
    /// The step budget ran out without a split.
    BudgetExhausted,
    /// No edge was left to remove.
    EdgesExhausted,
}

/// One removal of the loop, with the score that selected it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RemovedEdge {
    pub edge: Edge,
    pub score: f64,
}

/// Figures of one run, handed back to the caller for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetrics {
    pub elapsed: Duration,
    pub steps: usize,
    pub removed_edges: Vec<RemovedEdge>,
    pub nodes_before_pruning: usize,
    pub edges_before_pruning: usize,
    pub pruned_nodes: usize,
    pub nodes_after_pruning: usize,
    pub edges_after_pruning: usize,
    pub final_nodes: usize,
    pub final_edges: usize,
    pub termination: Termination,
}

/// The detected partition and the run metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub communities: Vec<Community>,
    pub metrics: RunMetrics,
}

/// Girvan-Newman detector: prune once, then remove the edge of highest
/// betweenness until the graph falls apart or the step budget is spent.
pub struct CommunityDetector {
    config: DetectorConfig,
}

impl CommunityDetector {
    pub fn new(config: DetectorConfig) -> GnResult<Self> {
        config.validate()?;
        Ok(CommunityDetector { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Run on `graph`, sampling sources with an RNG built from the config seed.
    pub fn run(&self, graph: Graph) -> GnResult<Detection> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run_with_rng(graph, &mut rng)
    }

    /// Run on `graph` with a caller-supplied source sampler.
    pub fn run_with_rng<R: Rng + ?Sized>(&self, mut graph: Graph, rng: &mut R) -> GnResult<Detection> {
        let start_time = Instant::now();
        let nodes_before_pruning = graph.node_count();
        let edges_before_pruning = graph.edge_count();
        info!(
            "Girvan-Newman on {} nodes, {} edges (degree threshold {}, max steps {}, sample size {})",
            nodes_before_pruning,
            edges_before_pruning,
            self.config.degree_threshold,
            self.config.max_steps,
            self.config.sample_size
        );

        // Step 1. Prune low degree nodes, exactly once.
        let pruned = graph.prune_below_degree(self.config.degree_threshold);
        info!(
            "Pruned {} nodes, {} nodes and {} edges remain",
            pruned.len(),
            graph.node_count(),
            graph.edge_count()
        );

        let mut run = RunState {
            start_time,
            removed_edges: Vec::new(),
            nodes_before_pruning,
            edges_before_pruning,
            pruned_nodes: pruned.len(),
            nodes_after_pruning: graph.node_count(),
            edges_after_pruning: graph.edge_count(),
        };

        if graph.is_empty() {
            return Ok(run.finish(&graph, Termination::Empty, vec![]));
        }

        // Step 2. A graph that is already split is returned as is.
        let components = connected_components(&graph);
        if components.len() > 1 {
            return Ok(run.finish(&graph, Termination::AlreadySplit, components));
        }

        // Step 3. Remove the most between edge until a split shows up.
        let termination = loop {
            if graph.edge_count() == 0 {
                break Termination::EdgesExhausted;
            }
            if run.removed_edges.len() >= self.config.max_steps {
                break Termination::BudgetExhausted;
            }

            let scores = edge_betweenness(&graph, self.config.sample_size, self.config.normalized, rng);
            let (edge, score) = max_edge(&scores).ok_or_else(|| {
                GnError::InvalidInput(format!("no edge scored among {} edges", graph.edge_count()))
            })?;
            if !graph.remove_edge(edge.u, edge.v) {
                return Err(GnError::InvalidInput(format!("selected edge {} is not in the graph", edge)));
            }
            run.removed_edges.push(RemovedEdge { edge, score });
            debug!(
                "Step {}: removed {} with score {:.6}, {} edges left",
                run.removed_edges.len(),
                edge,
                score,
                graph.edge_count()
            );

            if component_count(&graph) > 1 {
                let components = connected_components(&graph);
                return Ok(run.finish(&graph, Termination::SplitFound, components));
            }
        };

        // Step 4. No split, the remaining graph is one community.
        let whole: Vec<VInt> = graph.nodes().collect();
        Ok(run.finish(&graph, termination, vec![whole]))
    }
}

// Bookkeeping shared by every exit of the loop.
struct RunState {
    start_time: Instant,
    removed_edges: Vec<RemovedEdge>,
    nodes_before_pruning: usize,
    edges_before_pruning: usize,
    pruned_nodes: usize,
    nodes_after_pruning: usize,
    edges_after_pruning: usize,
}

impl RunState {
    fn finish(self, graph: &Graph, termination: Termination, communities: Vec<Community>) -> Detection {
        let elapsed = self.start_time.elapsed();
        info!(
            "Finished with {:?} after {} steps: {} communities, time elapsed: {:.6}s",
            termination,
            self.removed_edges.len(),
            communities.len(),
            elapsed.as_secs_f64()
        );
        Detection {
            communities,
            metrics: RunMetrics {
                elapsed,
                steps: self.removed_edges.len(),
                removed_edges: self.removed_edges,
                nodes_before_pruning: self.nodes_before_pruning,
                edges_before_pruning: self.edges_before_pruning,
                pruned_nodes: self.pruned_nodes,
                nodes_after_pruning: self.nodes_after_pruning,
                edges_after_pruning: self.edges_after_pruning,
                final_nodes: graph.node_count(),
                final_edges: graph.edge_count(),
                termination,
            },
        }
    }
}

/// Build a graph from `edges` and detect its communities.
pub fn detect_communities(
    edges: impl IntoIterator<Item = (VInt, VInt)>,
    config: &DetectorConfig,
) -> GnResult<Detection> {
    let detector = CommunityDetector::new(config.clone())?;
    detector.run(Graph::from_edges(edges)?)
}

/// Same as [`detect_communities`] with a caller-supplied source sampler.
pub fn detect_communities_with_rng<R: Rng + ?Sized>(
    edges: impl IntoIterator<Item = (VInt, VInt)>,
    config: &DetectorConfig,
    rng: &mut R,
) -> GnResult<Detection> {
    let detector = CommunityDetector::new(config.clone())?;
    detector.run_with_rng(Graph::from_edges(edges)?, rng)
}

#[cfg(test)]
mod test_girvan_newman {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::components::component_count;
    use crate::config::{DetectorConfig, SampleSize};
    use crate::error::GnError;
    use crate::girvan_newman::{detect_communities, detect_communities_with_rng, CommunityDetector, Termination};
    use crate::graph::Graph;
    use crate::types::{Edge, VInt};

    const BRIDGED_TRIANGLES: [(VInt, VInt); 7] = [(1, 2), (2, 3), (3, 1), (4, 5), (5, 6), (6, 4), (3, 4)];

    fn exact_config(degree_threshold: usize, max_steps: usize) -> DetectorConfig {
        DetectorConfig::new(degree_threshold, max_steps, SampleSize::Exact)
    }

    fn random_graph(seed: u64, n: VInt, p: f64) -> Vec<(VInt, VInt)> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut edges = vec![];
        for u in 0..n {
            for v in u + 1..n {
                if rng.gen_bool(p) {
                    edges.push((u, v));
                }
            }
        }
        edges
    }

    #[test]
    fn test_bridge_split() {
        let detection = detect_communities(BRIDGED_TRIANGLES, &exact_config(0, 10)).unwrap();
        assert_eq!(detection.communities, vec![vec![1, 2, 3], vec![4, 5, 6]]);
        let metrics = &detection.metrics;
        assert_eq!(metrics.termination, Termination::SplitFound);
        assert_eq!(metrics.steps, 1);
        assert_eq!(metrics.removed_edges[0].edge, Edge::new(3, 4));
        assert_eq!(metrics.pruned_nodes, 0);
        assert_eq!(metrics.final_edges, 6);
        assert_eq!(metrics.final_nodes, 6);
    }

    #[test]
    fn test_single_isolated_node() {
        let mut g = Graph::new();
        g.add_node(7);
        let detector = CommunityDetector::new(exact_config(0, 10)).unwrap();
        let detection = detector.run(g).unwrap();
        assert_eq!(detection.communities, vec![vec![7]]);
        assert_eq!(detection.metrics.termination, Termination::EdgesExhausted);
        assert_eq!(detection.metrics.steps, 0);
    }

    #[test]
    fn test_everything_pruned() {
        let detection = detect_communities(BRIDGED_TRIANGLES, &exact_config(5, 10)).unwrap();
        assert!(detection.communities.is_empty());
        assert_eq!(detection.metrics.termination, Termination::Empty);
        assert_eq!(detection.metrics.pruned_nodes, 6);
        assert_eq!(detection.metrics.steps, 0);

        let empty = detect_communities(Vec::<(VInt, VInt)>::new(), &exact_config(0, 10)).unwrap();
        assert!(empty.communities.is_empty());
        assert_eq!(empty.metrics.termination, Termination::Empty);
    }

    #[test]
    fn test_already_disconnected() {
        let edges = vec![(1, 2), (2, 3), (3, 1), (4, 5), (5, 6), (6, 4)];
        let detection = detect_communities(edges, &exact_config(0, 10)).unwrap();
        assert_eq!(detection.communities, vec![vec![1, 2, 3], vec![4, 5, 6]]);
        assert_eq!(detection.metrics.termination, Termination::AlreadySplit);
        assert_eq!(detection.metrics.steps, 0);
        assert_eq!(detection.metrics.final_edges, 6);
    }

    #[test]
    fn test_pruning_disconnects() {
        // Node 9 is the only link between two 4-cliques, pruning it splits the graph.
        let mut edges = vec![(4, 9), (9, 5)];
        for clique in [[1, 2, 3, 4], [5, 6, 7, 8]] {
            for i in 0..4 {
                for j in i + 1..4 {
                    edges.push((clique[i], clique[j]));
                }
            }
        }
        let detection = detect_communities(edges, &exact_config(3, 10)).unwrap();
        assert_eq!(detection.metrics.termination, Termination::AlreadySplit);
        assert_eq!(detection.communities, vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8]]);
        assert_eq!(detection.metrics.pruned_nodes, 1);
        assert_eq!(detection.metrics.steps, 0);
    }

    #[test]
    fn test_step_budget() {
        // A 4-cycle: the first removal leaves a path, the second splits it.
        let cycle = vec![(1, 2), (2, 3), (3, 4), (4, 1)];

        let none = detect_communities(cycle.clone(), &exact_config(0, 0)).unwrap();
        assert_eq!(none.metrics.termination, Termination::BudgetExhausted);
        assert_eq!(none.metrics.steps, 0);
        assert_eq!(none.communities, vec![vec![1, 2, 3, 4]]);

        let one = detect_communities(cycle.clone(), &exact_config(0, 1)).unwrap();
        assert_eq!(one.metrics.termination, Termination::BudgetExhausted);
        assert_eq!(one.metrics.steps, 1);
        assert_eq!(one.metrics.removed_edges[0].edge, Edge::new(1, 2));
        assert_eq!(one.communities, vec![vec![1, 2, 3, 4]]);
        assert_eq!(one.metrics.final_edges, 3);

        let two = detect_communities(cycle, &exact_config(0, 2)).unwrap();
        assert_eq!(two.metrics.termination, Termination::SplitFound);
        let removed: Vec<Edge> = two.metrics.removed_edges.iter().map(|r| r.edge).collect();
        assert_eq!(removed, vec![Edge::new(1, 2), Edge::new(3, 4)]);
        assert_eq!(two.communities, vec![vec![1, 4], vec![2, 3]]);
    }

    #[test]
    fn test_invalid_input() {
        let err = detect_communities(vec![(1, 2), (3, 3)], &exact_config(0, 10)).unwrap_err();
        assert!(matches!(err, GnError::InvalidInput(_)));

        let config = DetectorConfig::new(0, 10, SampleSize::Sampled(0));
        assert!(matches!(CommunityDetector::new(config), Err(GnError::InvalidInput(_))));
    }

    #[test]
    fn test_exact_deterministic() {
        let edges = random_graph(11, 40, 0.12);
        let config = exact_config(2, 200);
        let first = detect_communities(edges.clone(), &config).unwrap();
        let second = detect_communities(edges, &config).unwrap();
        assert_eq!(first.communities, second.communities);
        assert_eq!(first.metrics.removed_edges, second.metrics.removed_edges);
        assert_eq!(first.metrics.termination, second.metrics.termination);
    }

    #[test]
    fn test_sampled_deterministic() {
        let edges = random_graph(5, 50, 0.1);
        let config = DetectorConfig::new(0, 100, SampleSize::Sampled(8)).with_seed(99);
        let first = detect_communities(edges.clone(), &config).unwrap();
        let second = detect_communities(edges.clone(), &config).unwrap();
        assert_eq!(first.communities, second.communities);
        assert_eq!(first.metrics.removed_edges, second.metrics.removed_edges);

        // A caller-supplied sampler with the same seed behaves the same.
        let third = detect_communities_with_rng(edges, &config, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(first.communities, third.communities);
        assert_eq!(first.metrics.removed_edges, third.metrics.removed_edges);
    }

    #[test]
    fn test_partition_properties() {
        for seed in 0..12u64 {
            let edges = random_graph(seed, 30, 0.15);
            let max_steps = 25;
            let config = exact_config(2, max_steps).with_normalized(seed % 2 == 0);
            let detection = detect_communities(edges.clone(), &config).unwrap();
            let metrics = &detection.metrics;

            // Covers every post-pruning node exactly once.
            let mut expected = Graph::from_edges(edges).unwrap();
            expected.prune_below_degree(2);
            let mut covered: Vec<VInt> = detection.communities.iter().flatten().copied().collect();
            let distinct: HashSet<VInt> = covered.iter().copied().collect();
            assert_eq!(distinct.len(), covered.len(), "seed {}", seed);
            covered.sort_unstable();
            assert_eq!(covered, expected.nodes().collect::<Vec<_>>(), "seed {}", seed);

            // Budget and monotonicity.
            assert!(metrics.steps <= max_steps, "seed {}", seed);
            assert_eq!(metrics.final_edges, metrics.edges_after_pruning - metrics.steps);
            assert_eq!(metrics.final_nodes, metrics.nodes_after_pruning);
            let removed: HashSet<Edge> = metrics.removed_edges.iter().map(|r| r.edge).collect();
            assert_eq!(removed.len(), metrics.steps);

            // Split results are connected pieces.
            if metrics.termination == Termination::Empty {
                assert!(detection.communities.is_empty());
            } else if matches!(metrics.termination, Termination::SplitFound | Termination::AlreadySplit) {
                assert!(detection.communities.len() > 1);
                for community in &detection.communities {
                    let mut piece = Graph::new();
                    for &u in community {
                        piece.add_node(u);
                    }
                    for (u, v) in random_graph(seed, 30, 0.15) {
                        let edge = Edge::new(u, v);
                        if piece.contains_node(u) && piece.contains_node(v) && !removed.contains(&edge) {
                            piece.add_edge(u, v).unwrap();
                        }
                    }
                    assert_eq!(component_count(&piece), 1, "seed {}", seed);
                }
            } else {
                assert_eq!(detection.communities.len(), 1);
            }
        }
    }
}
