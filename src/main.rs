use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use girvan_newman::config::{DetectorConfig, SampleSize};
use girvan_newman::error::GnError;
use girvan_newman::girvan_newman::CommunityDetector;
use girvan_newman::graph::Graph;
use girvan_newman::loader::load_edge_list;
use girvan_newman::logger::init_logger;
use girvan_newman::report::{render_postprocessed, render_preprocessed, DetectionReport};

/// Detect communities in an edge list with the Girvan-Newman algorithm.
#[derive(Parser, Debug)]
#[command(name = "girvan-newman", version, about, long_about = None)]
struct Cli {
    /// Edge list, one `u v` pair of integer node ids per line.
    input: PathBuf,

    /// YAML config file, flags given on the command line override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Prune nodes whose degree is strictly below this value.
    #[arg(short = 'd', long)]
    degree_threshold: Option<usize>,

    /// Maximum number of edge removals.
    #[arg(short = 'm', long)]
    max_steps: Option<usize>,

    /// Betweenness sources: `exact` or the number of sampled nodes.
    #[arg(short = 'k', long)]
    sample_size: Option<SampleSize>,

    /// Seed of the source sampler.
    #[arg(long)]
    seed: Option<u64>,

    /// Report normalised betweenness scores.
    #[arg(long)]
    normalized: bool,

    /// Worker threads for the betweenness computation.
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Write a JSON report to this file.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Append log lines to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Merge the config file with the flags, flags win.
    fn detector_config(&self) -> Result<DetectorConfig> {
        let mut config = match &self.config {
            Some(path) => DetectorConfig::from_yaml_file(path)?,
            None => DetectorConfig::new(
                self.degree_threshold.unwrap_or(0),
                self.max_steps.unwrap_or(1000),
                self.sample_size.unwrap_or(SampleSize::Exact),
            ),
        };
        if let Some(degree_threshold) = self.degree_threshold {
            config.degree_threshold = degree_threshold;
        }
        if let Some(max_steps) = self.max_steps {
            config.max_steps = max_steps;
        }
        if let Some(sample_size) = self.sample_size {
            config.sample_size = sample_size;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.normalized {
            config.normalized = true;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.log_file.as_deref())
        .map_err(|e| anyhow::anyhow!("failed to initialise logger: {}", e))?;

    let threads = cli.threads.unwrap_or_else(num_cpus::get).max(1);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .context("failed to build the worker pool")?;
    info!("Using {} worker threads", threads);

    let config = cli.detector_config()?;
    let edges = load_edge_list(&cli.input)?;
    if edges.is_empty() {
        return Err(GnError::EmptyGraph)
            .with_context(|| format!("no edges found in {}", cli.input.display()));
    }
    let graph = Graph::from_edges(edges)?;

    print!("{}", render_preprocessed(graph.node_count(), graph.edge_count(), &config));

    let detector = CommunityDetector::new(config.clone())?;
    let detection = detector.run(graph)?;

    println!();
    print!("{}", render_postprocessed(&detection));

    if let Some(output) = &cli.output {
        DetectionReport::new(cli.input.display().to_string(), &config, &detection).write_json(output)?;
        info!("Report written to {}", output.display());
    }
    Ok(())
}
