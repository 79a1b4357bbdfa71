use std::fmt;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{GnError, GnResult};

pub(crate) const READ_BUFFER_SIZE :usize = 8 * 1024 * 1024;

/// Number of BFS sources handled by one rayon task. Fixed so that the merge
/// order of partial scores does not depend on the thread count.
pub(crate) const SOURCE_BATCH_SIZE :usize = 64;

/// Relative tolerance under which two betweenness scores count as equal.
pub(crate) const SCORE_TOLERANCE :f64 = 1e-12;

/// Source selection of the betweenness estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "SampleSizeRepr")]
pub enum SampleSize {
    /// Every node is a BFS source.
    Exact,
    /// `k` sources drawn without replacement.
    Sampled(usize),
}

// Either `exact` or a plain integer in the config file.
#[derive(Deserialize)]
#[serde(untagged)]
enum SampleSizeRepr {
    Count(usize),
    Keyword(String),
}

impl TryFrom<SampleSizeRepr> for SampleSize {
    type Error = String;

    fn try_from(repr: SampleSizeRepr) -> Result<Self, Self::Error> {
        match repr {
            SampleSizeRepr::Count(k) => Ok(SampleSize::Sampled(k)),
            SampleSizeRepr::Keyword(word) => word.parse(),
        }
    }
}

impl FromStr for SampleSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("exact") || s.eq_ignore_ascii_case("all") {
            return Ok(SampleSize::Exact);
        }
        s.parse::<usize>()
            .map(SampleSize::Sampled)
            .map_err(|_| format!("expected `exact` or a source count, got `{}`", s))
    }
}

impl Display for SampleSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SampleSize::Exact => write!(f, "exact"),
            SampleSize::Sampled(k) => write!(f, "{}", k),
        }
    }
}

impl Serialize for SampleSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SampleSize::Exact => serializer.serialize_str("exact"),
            SampleSize::Sampled(k) => serializer.serialize_u64(*k as u64),
        }
    }
}

/// Configuration of one detection run.
///
/// No `Default`: threshold, step budget and sampling are chosen by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Nodes with a degree strictly below this are pruned before the loop.
    pub degree_threshold: usize,
    /// Maximum number of edge removals.
    pub max_steps: usize,
    /// Betweenness source selection.
    pub sample_size: SampleSize,
    /// Seed of the source sampler, `None` draws one from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Rescale scores to `[0, 1]` the way the usual edge betweenness does.
    #[serde(default)]
    pub normalized: bool,
}

impl DetectorConfig {
    pub fn new(degree_threshold: usize, max_steps: usize, sample_size: SampleSize) -> Self {
        DetectorConfig {
            degree_threshold,
            max_steps,
            sample_size,
            seed: None,
            normalized: false,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_normalized(mut self, normalized: bool) -> Self {
        self.normalized = normalized;
        self
    }

    /// Reject values the detector cannot run with.
    pub fn validate(&self) -> GnResult<()> {
        if let SampleSize::Sampled(0) = self.sample_size {
            return Err(GnError::InvalidInput(
                "sample size must be at least 1 source".to_string(),
            ));
        }
        Ok(())
    }

    /// Load a config from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: DetectorConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}
