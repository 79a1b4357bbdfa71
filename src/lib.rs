//! Community detection with the Girvan-Newman edge removal algorithm.
//!
//! Nodes below a degree threshold are pruned once, then the edge with the
//! highest (optionally sampled) betweenness is removed until the graph splits
//! into several connected components, which are the communities.

pub mod betweenness;
pub mod components;
pub mod config;
pub mod error;
pub mod girvan_newman;
pub mod graph;
pub mod loader;
pub mod logger;
pub mod report;
pub mod types;

pub use config::{DetectorConfig, SampleSize};
pub use error::{GnError, GnResult};
pub use girvan_newman::{
    detect_communities, detect_communities_with_rng, CommunityDetector, Detection, RemovedEdge,
    RunMetrics, Termination,
};
pub use graph::Graph;
pub use types::{Community, Edge, VInt};
