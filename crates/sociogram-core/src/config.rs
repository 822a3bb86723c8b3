//! Core data types and configuration for Sociogram analysis.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Drawing style for `--plot`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PlotMode {
    /// Node size by clustering coefficient, colour by degree.
    Clustering,
    /// Edge width by neighbourhood overlap.
    Overlap,
    /// Node fill by `color`, edge colour by sign.
    Polarity,
    #[default]
    Plain,
}

impl PlotMode {
    /// Single-letter code used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clustering => "C",
            Self::Overlap => "N",
            Self::Polarity => "P",
            Self::Plain => "default",
        }
    }

    /// Parse a command-line code. Unknown codes fall back to a plain drawing.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "C" | "c" => Self::Clustering,
            "N" | "n" => Self::Overlap,
            "P" | "p" => Self::Polarity,
            _ => Self::Plain,
        }
    }
}

impl std::fmt::Display for PlotMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a single analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub graph_path: String,
    /// Requested number of communities for the Girvan–Newman partition.
    pub components: Option<usize>,
    pub plot: Option<PlotMode>,
    pub plot_out: Option<String>,
    #[serde(default)]
    pub verify_homophily: bool,
    #[serde(default)]
    pub verify_balance: bool,
    /// Number of edges removed by the one-shot failure simulation.
    pub simulate_failures: Option<usize>,
    /// Number of edges removed per robustness trial.
    pub robustness_check: Option<usize>,
    #[serde(default = "default_robustness_trials")]
    pub robustness_trials: usize,
    pub temporal_events: Option<String>,
    pub temporal_gif: Option<String>,
    /// GML export path.
    pub output_path: Option<String>,
    /// JSON report path.
    pub report_path: Option<String>,
    /// RNG seed for failure and robustness sampling; entropy when unset.
    pub seed: Option<u64>,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub quiet: bool,
}

fn default_robustness_trials() -> usize {
    30
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            graph_path: String::new(),
            components: None,
            plot: None,
            plot_out: None,
            verify_homophily: false,
            verify_balance: false,
            simulate_failures: None,
            robustness_check: None,
            robustness_trials: default_robustness_trials(),
            temporal_events: None,
            temporal_gif: None,
            output_path: None,
            report_path: None,
            seed: None,
            verbose: false,
            quiet: false,
        }
    }
}

/// Connectivity summary of a graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentStats {
    /// Average shortest path length of the largest component, if it has edges.
    pub aspl: Option<f64>,
    /// Number of connected components.
    pub components: usize,
    /// Component sizes, in component order.
    pub sizes: Vec<usize>,
}

impl ComponentStats {
    pub fn largest(&self) -> usize {
        self.sizes.iter().copied().max().unwrap_or(0)
    }
}

/// Outcome of a single random edge-failure simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureReport {
    pub before: ComponentStats,
    pub after: ComponentStats,
    /// Removed edges as `(source, target)` keys.
    pub removed: Vec<(String, String)>,
}

/// Aggregate of repeated failure trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobustnessReport {
    pub trials: usize,
    pub edges_removed: usize,
    pub avg_components: f64,
    pub min_components: usize,
    pub max_components: usize,
    pub avg_largest_component: f64,
}

/// Welch's t-test result for the homophily check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomophilyTest {
    /// t statistic, rounded to 3 decimals.
    pub t: f64,
    /// Two-sided p-value, rounded to 4 decimals.
    pub p: f64,
    /// Cohen's d, rounded to 3 decimals.
    pub d: f64,
    pub same_count: usize,
    pub different_count: usize,
    pub same_mean: f64,
    pub different_mean: f64,
    pub significant: bool,
}

/// Homophily check outcome. Too little data is a result, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HomophilyOutcome {
    Tested(HomophilyTest),
    Insufficient { same: usize, different: usize },
}

impl std::fmt::Display for HomophilyOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tested(t) => write!(f, "t={} p={} d={}", t.t, t.p, t.d),
            Self::Insufficient { same, different } => write!(
                f,
                "not enough data (same-color edges: {same}, cross-color edges: {different})"
            ),
        }
    }
}

/// A detected community.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub id: usize,
    pub members: Vec<String>,
}

/// Summary of a temporal replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalSummary {
    pub events: usize,
    pub snapshots: usize,
    pub final_nodes: usize,
    pub final_edges: usize,
    pub animation: Option<String>,
}

/// Result of an analysis run, serialised by `--report`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub stats: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub communities: Vec<Community>,
    pub homophily: Option<HomophilyOutcome>,
    pub balanced: Option<bool>,
    pub failures: Option<FailureReport>,
    pub robustness: Option<RobustnessReport>,
    pub temporal: Option<TemporalSummary>,
    #[serde(default)]
    pub outputs: Vec<String>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for AnalysisReport {
    fn default() -> Self {
        Self {
            version: default_version(),
            metadata: HashMap::new(),
            stats: HashMap::new(),
            communities: Vec::new(),
            homophily: None,
            balanced: None,
            failures: None,
            robustness: None,
            temporal: None,
            outputs: Vec::new(),
        }
    }
}
