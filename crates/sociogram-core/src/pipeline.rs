//! Sequential step orchestrator with timing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{AnalysisConfig, AnalysisReport, PlotMode};
use crate::error::GraphResult;
use crate::graph::gml;
use crate::graph::social_graph::SocialGraph;
use crate::output::finish_report;
use crate::phases::{balance, communities, homophily, metrics, resilience, temporal};
use crate::render;

/// Step labels for progress reporting.
const STEP_LABELS: &[(&str, &str)] = &[
    ("load", "Loading graph"),
    ("metrics", "Computing clustering and overlap"),
    ("communities", "Partitioning communities"),
    ("plot", "Drawing graph"),
    ("homophily", "Testing homophily"),
    ("balance", "Checking structural balance"),
    ("failures", "Simulating edge failures"),
    ("robustness", "Measuring robustness"),
    ("temporal", "Replaying temporal events"),
    ("export", "Writing graph"),
];

/// Progress callback type: (step_name, label).
pub type ProgressCallback = Box<dyn FnMut(&str, &str)>;

/// Reports progress and records per-step timings.
struct StepRunner {
    progress: Option<ProgressCallback>,
    timings: HashMap<String, f64>,
}

impl StepRunner {
    fn run<T>(&mut self, name: &str, step: impl FnOnce() -> GraphResult<T>) -> GraphResult<T> {
        if let Some(ref mut cb) = self.progress {
            let label = STEP_LABELS
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, l)| *l)
                .unwrap_or(name);
            cb(name, label);
        }

        let start = Instant::now();
        let result = step()?;
        self.timings
            .insert(name.to_string(), start.elapsed().as_secs_f64());
        Ok(result)
    }
}

/// Load the configured graph, run every requested step and return the report.
pub fn run_pipeline(
    config: &AnalysisConfig,
    progress_callback: Option<ProgressCallback>,
) -> GraphResult<AnalysisReport> {
    let total_start = Instant::now();
    let mut runner = StepRunner {
        progress: progress_callback,
        timings: HashMap::new(),
    };

    let mut graph = runner.run("load", || gml::load_graph(&config.graph_path))?;
    let mut report = analyse(config, &mut graph, &mut runner)?;

    let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
    finish_report(&mut report, config, &graph, &runner.timings, total_ms);
    Ok(report)
}

/// Run the analysis steps on an already-loaded graph.
///
/// The graph is annotated in place and, when temporal events are given,
/// left in its post-replay state.
pub fn run_on_graph(
    config: &AnalysisConfig,
    graph: &mut SocialGraph,
    progress_callback: Option<ProgressCallback>,
) -> GraphResult<AnalysisReport> {
    let total_start = Instant::now();
    let mut runner = StepRunner {
        progress: progress_callback,
        timings: HashMap::new(),
    };
    let mut report = analyse(config, graph, &mut runner)?;
    let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
    finish_report(&mut report, config, graph, &runner.timings, total_ms);
    Ok(report)
}

fn analyse(
    config: &AnalysisConfig,
    graph: &mut SocialGraph,
    runner: &mut StepRunner,
) -> GraphResult<AnalysisReport> {
    let mut report = AnalysisReport::default();
    let mut rng = resilience::make_rng(config.seed);

    runner.run("metrics", || {
        metrics::clustering(graph);
        metrics::overlap(graph);
        Ok(())
    })?;

    if let Some(requested) = config.components.filter(|&n| n > 0) {
        let parts = runner.run("communities", || {
            let parts = communities::partition(graph, requested);
            communities::annotate(graph, &parts);
            Ok(parts)
        })?;
        log::info!("Communities: {}", parts.len());
        report.communities = communities::to_communities(&parts);
    }

    if let Some(mode) = config.plot {
        let path = plot_path(config, mode);
        runner.run("plot", || render::plot_graph(graph, mode, &path))?;
        report.outputs.push(path.display().to_string());
    }

    if config.verify_homophily {
        let outcome = runner.run("homophily", || Ok(homophily::homophily(graph)))?;
        log::info!("Homophily: {outcome}");
        report.homophily = Some(outcome);
    }

    if config.verify_balance {
        let balanced = runner.run("balance", || Ok(balance::is_balanced(graph)))?;
        log::info!("{}", if balanced { "Balanced" } else { "Not balanced" });
        report.balanced = Some(balanced);
    }

    if let Some(k) = config.simulate_failures {
        let failures = runner.run("failures", || {
            Ok(resilience::simulate_failures(graph, k, &mut rng))
        })?;
        report.failures = Some(failures);
    }

    if let Some(k) = config.robustness_check.filter(|&k| k > 0) {
        let trials = config.robustness_trials;
        let robustness = runner.run("robustness", || {
            Ok(resilience::robustness(graph, k, trials, &mut rng))
        })?;
        log::info!("Robustness: avg components {:.3}", robustness.avg_components);
        report.robustness = Some(robustness);
    }

    if let Some(events) = &config.temporal_events {
        let animation = config.temporal_gif.as_deref().map(Path::new);
        let summary = runner.run("temporal", || temporal::temporal(graph, events, animation))?;
        if let Some(path) = &summary.animation {
            report.outputs.push(path.clone());
        }
        log::info!("Temporal events: {}", summary.events);
        report.temporal = Some(summary);
    }

    if let Some(output) = &config.output_path {
        runner.run("export", || gml::write_gml(graph, output))?;
        log::info!("Saved graph to {output}");
        report.outputs.push(output.clone());
    }

    Ok(report)
}

fn plot_path(config: &AnalysisConfig, mode: PlotMode) -> PathBuf {
    match &config.plot_out {
        Some(out) => PathBuf::from(out),
        None => render::default_plot_path(Path::new(&config.graph_path), mode),
    }
}
