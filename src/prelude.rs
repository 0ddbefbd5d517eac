//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```ignore
//! use queue_bench_viz::prelude::*;
//!
//! let request = RenderRequest::new(["results"]).with_layout(LayoutKind::FourMetric);
//! let summary = Pipeline::new(request)?.run()?;
//! ```
//!
//! # What's Included
//!
//! ## Pipeline
//! - [`Pipeline`], [`RenderRequest`], [`RunSummary`]
//! - [`MergeMode`], [`LayoutKind`]
//!
//! ## Data
//! - [`RecordSource`], [`Dataset`], [`Record`]
//! - [`DatasetMerger`], [`FileSelection`], [`ErrorMode`]
//!
//! ## Aggregation and Rendering
//! - [`Aggregator`], [`AggregatedGroup`]
//! - [`StyleRegistry`], [`QueueFilter`], [`ComparativeRenderer`], [`PanelLayout`]
//!
//! ## Schema
//! - [`IndependentVariable`], [`Metric`], [`AxisScale`]

pub use crate::aggregate::{AggregatedGroup, Aggregator};
pub use crate::config::{MergeMode, RenderRequest};
pub use crate::error::{PlotError, Result};
pub use crate::merge::{DatasetMerger, ErrorMode, FileSelection, MergeOutcome, MergeReport};
pub use crate::pipeline::{Pipeline, RunSummary};
pub use crate::record::{Dataset, Record};
pub use crate::render::{
    export_svg, ComparativeRenderer, Figure, LayoutKind, PanelLayout, QueueFilter, Surface,
};
pub use crate::schema::{AxisScale, IndependentVariable, Metric};
pub use crate::source::RecordSource;
pub use crate::style::{Emphasis, StyleRegistry};
