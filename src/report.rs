use std::fmt::Write as _;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use itertools::Itertools;
use serde::Serialize;

use crate::config::DetectorConfig;
use crate::girvan_newman::Detection;

/// What the JSON report file holds.
#[derive(Debug, Serialize)]
pub struct DetectionReport<'a> {
    pub input: String,
    pub config: &'a DetectorConfig,
    pub elapsed_secs: f64,
    pub community_count: usize,
    pub detection: &'a Detection,
}

impl<'a> DetectionReport<'a> {
    pub fn new(input: impl Into<String>, config: &'a DetectorConfig, detection: &'a Detection) -> Self {
        DetectionReport {
            input: input.into(),
            config,
            elapsed_secs: detection.metrics.elapsed.as_secs_f64(),
            community_count: detection.communities.len(),
            detection,
        }
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("failed to create report {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        Ok(())
    }
}

/// Graph figures before detection, in the layout the CLI prints.
pub fn render_preprocessed(node_count: usize, edge_count: usize, config: &DetectorConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Pre-processed:");
    let _ = writeln!(out, "Number of nodes: {}", node_count);
    let _ = writeln!(out, "Number of edges: {}", edge_count);
    let _ = writeln!(out, "k value: {}", config.sample_size);
    let _ = writeln!(out, "degree threshold: {}", config.degree_threshold);
    let _ = writeln!(out, "max steps: {}", config.max_steps);
    out
}

/// Graph figures and communities after detection.
pub fn render_postprocessed(detection: &Detection) -> String {
    let metrics = &detection.metrics;
    let mut out = String::new();
    let _ = writeln!(out, "Time elapsed: {:.6}", metrics.elapsed.as_secs_f64());
    let _ = writeln!(out);
    let _ = writeln!(out, "Post-processed:");
    let _ = writeln!(out, "Number of nodes: {}", metrics.final_nodes);
    let _ = writeln!(out, "Number of edges: {}", metrics.final_edges);
    let _ = writeln!(out, "Pruned nodes: {}", metrics.pruned_nodes);
    let _ = writeln!(out, "Steps: {}", metrics.steps);
    let _ = writeln!(out, "Termination: {:?}", metrics.termination);
    if !metrics.removed_edges.is_empty() {
        let removed = metrics.removed_edges.iter().map(|r| r.edge).join(" ");
        let _ = writeln!(out, "Removed edges: {}", removed);
    }
    let _ = writeln!(out, "Communities: {}", detection.communities.len());
    for (idx, community) in detection.communities.iter().enumerate() {
        let _ = writeln!(
            out,
            "  #{} ({} nodes): {}",
            idx,
            community.len(),
            community.iter().join(" ")
        );
    }
    out
}
