//! Queue Bench Viz
//!
//! Aggregation and comparative charting of concurrent-queue benchmark results.
//!
//! # Overview
//!
//! Benchmark harnesses write one CSV file per run: a `Queuetype` column, the
//! swept parameter (`Thread Count`, `Producers` or `Consumers`) and measured
//! metrics (`Throughput`, `Fairness`, `Enqueues`, `Dequeues`, and for memory
//! runs `Memory Allocated`). This crate merges many such files, averages
//! repeated trials, and draws comparison figures in which every queue type
//! keeps the same colour, line style and marker across all charts.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Queue Bench Viz                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  schema/     - Column names, metrics, axis policy               │
//! │  source      - One CSV file → records                           │
//! │  merge       - Directory conventions → one dataset              │
//! │  aggregate   - Group by key tuple, mean/max reduction           │
//! │  style/      - Deterministic per-queue visual identity          │
//! │  render/     - Panel layouts, figure scene, SVG and text output │
//! │  pipeline    - Request → figure on disk                         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use queue_bench_viz::prelude::*;
//!
//! let request = RenderRequest::new(["results/tau_1"])
//!     .with_mode(MergeMode::Subfolder)
//!     .with_layout(LayoutKind::Combined);
//!
//! let summary = Pipeline::new(request)?.run()?;
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod prelude;
pub mod record;
pub mod render;
pub mod schema;
pub mod source;
pub mod style;

// Re-exports - Schema
pub use schema::{AxisScale, Field, IndependentVariable, Metric};

// Re-exports - Data
pub use record::{Dataset, Record};
pub use source::RecordSource;

// Re-exports - Merge
pub use merge::{
    DatasetMerger, EmptyReason, ErrorMode, FileError, FileSelection, MergeOutcome, MergeReport,
};

// Re-exports - Aggregation
pub use aggregate::{AggregatedGroup, Aggregator, KeyField, KeyValue, Reduction};

// Re-exports - Style
pub use style::{DrawStyle, Emphasis, SeriesStyle, StyleAssignment, StyleRegistry};

// Re-exports - Render
pub use render::{
    export_svg, ComparativeRenderer, DatasetTag, Figure, LayoutKind, PanelLayout, PanelSelection,
    PanelSpec, QueueFilter, Surface, SvgSurface, TextSurface,
};

// Re-exports - Config & Pipeline
pub use config::{MergeMode, RenderRequest};
pub use error::{PlotError, Result};
pub use pipeline::{Pipeline, RunSummary};
