//! Benchmark Plotting Tool
//!
//! Merges benchmark CSV files and writes a comparison figure as SVG.
//!
//! # Usage
//!
//! ```bash
//! # Throughput vs thread count over a flat results directory
//! plot-benchmarks results/ --kind thread-count
//!
//! # One series per subfolder, highlighting two queues
//! plot-benchmarks results/ --mode subfolder --highlight lcrq_rust,bbq
//!
//! # Six-panel tau comparison
//! plot-benchmarks tau_0.5/ tau_1/ tau_2/ --mode variant \
//!     --variant 0.5 --variant 1 --variant 2 \
//!     --layout six-panel --right lcrq_rust,lprq_rust,faaa_queue_rust
//!
//! # Mean BFS time per dataset folder
//! plot-benchmarks bfs_results/ --mode subfolder --layout bfs
//!
//! # From a saved request, overriding the output
//! plot-benchmarks --config six_panel.toml --output tau.svg
//!
//! # Write a sample request
//! plot-benchmarks --generate-config request.toml
//! ```
//!
//! Logging defaults to `info` and honours `RUST_LOG`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;
use queue_bench_viz::{
    ErrorMode, FileSelection, IndependentVariable, LayoutKind, MergeMode, Metric, Pipeline,
    QueueFilter, RenderRequest,
};

#[derive(Parser, Debug)]
#[command(
    name = "plot-benchmarks",
    version,
    about = "Aggregate queue benchmark CSV files and draw comparison charts"
)]
struct Cli {
    /// Input files or directories
    roots: Vec<PathBuf>,

    /// Swept parameter: thread-count, producers, consumers
    #[arg(long)]
    kind: Option<IndependentVariable>,

    /// Figure layout: single, combined, four-metric, paired, six-panel, peak-memory, bfs
    #[arg(long)]
    layout: Option<LayoutKind>,

    /// Directory convention: flat, subfolder, variant
    #[arg(long)]
    mode: Option<MergeMode>,

    /// Variant label per root (repeat once per root)
    #[arg(long = "variant")]
    variants: Vec<String>,

    /// Only plot these queue types (comma separated, repeatable)
    #[arg(long, value_delimiter = ',')]
    queues: Vec<String>,

    /// Emphasise these queue types over a muted background
    #[arg(long, value_delimiter = ',')]
    highlight: Vec<String>,

    /// Never plot these queue types
    #[arg(long, value_delimiter = ',')]
    ignore: Vec<String>,

    /// Queue types shown on the right of paired layouts
    #[arg(long, value_delimiter = ',')]
    right: Vec<String>,

    /// Metric for single, paired and six-panel layouts
    #[arg(long)]
    metric: Option<Metric>,

    /// Horizontal tick positions, comma separated
    #[arg(long, value_delimiter = ',')]
    x_ticks: Vec<i64>,

    /// Plot each trial separately instead of averaging
    #[arg(long)]
    per_trial: bool,

    /// Walk flat directory roots recursively
    #[arg(long)]
    recursive: bool,

    /// Only load files whose name starts with this prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Abort on the first file that fails to load
    #[arg(long)]
    fail_fast: bool,

    /// Output SVG path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also print the figure to stdout
    #[arg(long)]
    show: bool,

    /// Append aggregated rows to this CSV file
    #[arg(long)]
    summary_csv: Option<PathBuf>,

    /// Load the request from a TOML or JSON file; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a sample request file and exit
    #[arg(long)]
    generate_config: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Some(path) = &cli.generate_config {
        return match sample_request().save_toml(path) {
            Ok(()) => {
                println!("Sample request written to {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: failed to write {}: {e}", path.display());
                ExitCode::FAILURE
            }
        };
    }

    let request = match build_request(cli) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = Pipeline::new(request).and_then(|pipeline| pipeline.run());
    match result {
        Ok(summary) => {
            println!(
                "Wrote {} ({} records from {} files, {} skipped)",
                summary.output.display(),
                summary.records,
                summary.files_loaded,
                summary.file_errors
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Start from the config file, if any, and apply every flag that was given.
fn build_request(cli: Cli) -> Result<RenderRequest, Box<dyn std::error::Error>> {
    let mut request = match &cli.config {
        Some(path) if is_json(path) => RenderRequest::load_json(path)?,
        Some(path) => RenderRequest::load_toml(path)?,
        None => RenderRequest::default(),
    };

    if !cli.roots.is_empty() {
        request.roots = cli.roots;
    }
    if let Some(kind) = cli.kind {
        request.kind = kind;
    }
    if let Some(layout) = cli.layout {
        request.layout = layout;
    }
    if let Some(mode) = cli.mode {
        request.mode = mode;
    }
    if !cli.variants.is_empty() {
        request.variants = cli.variants;
    }
    if let Some(metric) = cli.metric {
        request.metric = metric;
    }
    if !cli.queues.is_empty() {
        request.filter.allow = cli.queues;
    }
    if !cli.highlight.is_empty() {
        request.filter.highlight = cli.highlight;
    }
    if !cli.ignore.is_empty() {
        request.filter.ignore = cli.ignore;
    }
    if !cli.right.is_empty() {
        request.right = cli.right;
    }
    if !cli.x_ticks.is_empty() {
        request.x_ticks = cli.x_ticks;
    }
    if let Some(prefix) = cli.prefix {
        request.selection.name_prefix = Some(prefix);
    }
    if let Some(output) = cli.output {
        request.output = Some(output);
    }
    if let Some(path) = cli.summary_csv {
        request.summary_csv = Some(path);
    }
    request.per_trial |= cli.per_trial;
    request.recursive |= cli.recursive;
    request.show |= cli.show;
    if cli.fail_fast {
        request.error_mode = ErrorMode::FailFast;
    }

    Ok(request)
}

fn is_json(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

fn sample_request() -> RenderRequest {
    RenderRequest::new(["/path/to/tau_0.5", "/path/to/tau_1", "/path/to/tau_2"])
        .with_mode(MergeMode::Variant)
        .with_variants(["0.5", "1", "2"])
        .with_layout(LayoutKind::SixPanel)
        .with_metric(Metric::Throughput)
        .with_right(["lcrq_rust", "lprq_rust", "faaa_queue_rust"])
        .with_filter(QueueFilter::new().with_highlight(["lcrq_rust"]))
        .with_selection(FileSelection::default())
        .with_output("six_subplot_comparison.svg")
}
