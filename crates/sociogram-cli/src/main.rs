//! Sociogram CLI — social network analysis for GML graphs.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use sociogram_core::config::{AnalysisConfig, AnalysisReport, ComponentStats, PlotMode};
use sociogram_core::output::write_report;
use sociogram_core::pipeline;

#[derive(Parser)]
#[command(
    name = "graph-analysis",
    version,
    about = "Sociogram - Analyse, partition and stress-test social graphs"
)]
struct Cli {
    /// Path to the GML graph to analyse
    graph: PathBuf,

    /// Partition the graph into this many Girvan–Newman communities
    #[arg(long, value_name = "N")]
    components: Option<usize>,

    /// Plot mode: C (clustering), N (overlap), P (polarity) or default
    #[arg(long, value_name = "MODE")]
    plot: Option<String>,

    /// Plot output path (.svg, or .dot for Graphviz)
    #[arg(long, value_name = "PATH")]
    plot_out: Option<String>,

    /// Run the colour homophily t-test
    #[arg(long)]
    verify_homophily: bool,

    /// Check structural balance of edge signs
    #[arg(long = "verify-balanced-graph")]
    verify_balanced_graph: bool,

    /// Remove K random edges and compare connectivity
    #[arg(long, value_name = "K")]
    simulate_failures: Option<usize>,

    /// Remove K random edges per trial and average the results
    #[arg(long, value_name = "K")]
    robustness_check: Option<usize>,

    /// Number of robustness trials
    #[arg(long, default_value = "30", value_name = "T")]
    robustness_trials: usize,

    /// CSV of timestamp,source,target,action edge events to replay
    #[arg(long, value_name = "CSV")]
    temporal_simulation: Option<String>,

    /// Write the temporal replay as an animated SVG
    #[arg(long, value_name = "PATH")]
    temporal_gif: Option<String>,

    /// Save the annotated graph as GML
    #[arg(long, value_name = "PATH")]
    output: Option<String>,

    /// Write a JSON report of every result
    #[arg(long, value_name = "PATH")]
    report: Option<String>,

    /// Seed for random edge sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Show debug logs and per-step timings
    #[arg(long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = AnalysisConfig {
        graph_path: cli.graph.to_string_lossy().to_string(),
        components: cli.components,
        plot: cli.plot.as_deref().map(PlotMode::from_str_value),
        plot_out: cli.plot_out,
        verify_homophily: cli.verify_homophily,
        verify_balance: cli.verify_balanced_graph,
        simulate_failures: cli.simulate_failures,
        robustness_check: cli.robustness_check,
        robustness_trials: cli.robustness_trials,
        temporal_events: cli.temporal_simulation,
        temporal_gif: cli.temporal_gif,
        output_path: cli.output,
        report_path: cli.report,
        seed: cli.seed,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    if config.quiet {
        run_quiet(&config);
    } else {
        run_with_progress(&config);
    }
}

/// Install the fmt subscriber; `RUST_LOG` wins over the flag-derived level.
fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_quiet(config: &AnalysisConfig) {
    match pipeline::run_pipeline(config, None) {
        Ok(report) => save_report(config, &report),
        Err(e) => {
            eprintln!("Analysis failed: {e}");
            std::process::exit(1);
        }
    }
}

fn run_with_progress(config: &AnalysisConfig) {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(
            spinner.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
    }
    pb.set_message("Initialising...");
    pb.enable_steady_tick(std::time::Duration::from_millis(80));

    let progress: pipeline::ProgressCallback = {
        let pb = pb.clone();
        Box::new(move |_name, label| {
            pb.set_message(label.to_string());
        })
    };

    let start = Instant::now();
    let report = match pipeline::run_pipeline(config, Some(progress)) {
        Ok(r) => r,
        Err(e) => {
            pb.finish_and_clear();
            eprintln!("Analysis failed: {e}");
            std::process::exit(1);
        }
    };
    pb.finish_and_clear();

    print_summary(config, &report);

    let duration = start.elapsed();
    println!(
        "  {:<14} {:.1}ms",
        "Duration:",
        duration.as_secs_f64() * 1000.0
    );

    if config.verbose {
        if let Some(serde_json::Value::Object(timings)) = report.metadata.get("step_timings") {
            println!("\n  Step Timings:");
            for (step, secs) in timings {
                if let Some(val) = secs.as_f64() {
                    println!("    {:<14} {:.1}ms", step, val * 1000.0);
                }
            }
        }
    }

    save_report(config, &report);

    for path in &report.outputs {
        println!("\n  {} {}", style("Written:").green(), path);
    }
}

fn print_summary(config: &AnalysisConfig, report: &AnalysisReport) {
    let zero = serde_json::json!(0);
    println!(
        "\n{}  Graph Analysis: {}",
        style("✓").green().bold(),
        style(
            Path::new(&config.graph_path)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default()
        )
        .bold()
    );
    println!(
        "  {:<14} {}",
        "Nodes:",
        report.stats.get("nodes").unwrap_or(&zero)
    );
    println!(
        "  {:<14} {}",
        "Edges:",
        report.stats.get("edges").unwrap_or(&zero)
    );

    if !report.communities.is_empty() {
        println!("  {:<14} {}", "Communities:", report.communities.len());
        for community in &report.communities {
            println!(
                "    {:<12} {}",
                format!("#{}", community.id),
                community.members.join(", ")
            );
        }
    }

    if let Some(homophily) = &report.homophily {
        println!("  {:<14} {}", "Homophily:", homophily);
    }

    if let Some(balanced) = report.balanced {
        let verdict = if balanced {
            style("balanced").green()
        } else {
            style("not balanced").red()
        };
        println!("  {:<14} {}", "Balance:", verdict);
    }

    if let Some(failures) = &report.failures {
        println!(
            "  {:<14} removed {} edge(s)",
            "Failures:",
            failures.removed.len()
        );
        println!("    {:<12} {}", "before", describe_components(&failures.before));
        println!("    {:<12} {}", "after", describe_components(&failures.after));
    }

    if let Some(robustness) = &report.robustness {
        println!(
            "  {:<14} {} trial(s), {} edge(s) each: avg components {:.3} (min {}, max {}), avg largest {:.3}",
            "Robustness:",
            robustness.trials,
            robustness.edges_removed,
            robustness.avg_components,
            robustness.min_components,
            robustness.max_components,
            robustness.avg_largest_component
        );
    }

    if let Some(temporal) = &report.temporal {
        println!(
            "  {:<14} {} event(s) replayed, final graph {} nodes / {} edges",
            "Temporal:", temporal.events, temporal.final_nodes, temporal.final_edges
        );
    }
}

fn describe_components(stats: &ComponentStats) -> String {
    let aspl = stats
        .aspl
        .map(|v| format!("{v:.3}"))
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "{} component(s), largest {}, avg path length {}",
        stats.components,
        stats.largest(),
        aspl
    )
}

fn save_report(config: &AnalysisConfig, report: &AnalysisReport) {
    let Some(path) = &config.report_path else {
        return;
    };
    if let Err(e) = write_report(report, path) {
        eprintln!("Error writing report: {e}");
        std::process::exit(1);
    }
    if !config.quiet {
        println!("\n  {} {}", style("Report written to:").green(), path);
    }
}
