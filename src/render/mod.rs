//! Comparative chart rendering.
//!
//! # Architecture
//!
//! ```text
//! AggregatedGroup[] ──┐
//! StyleRegistry ──────┼──► ComparativeRenderer ──► Figure ──┬──► SvgSurface  (export)
//! QueueFilter ────────┤         (per PanelLayout)           └──► TextSurface (show)
//! PanelLayout ────────┘
//! ```
//!
//! The renderer does all of the deciding: which queue types appear in which
//! panel, their emphasis, labels, draw order and legend. The resulting
//! [`Figure`] is a plain scene description, and a [`Surface`] only draws it.
//!
//! # Example
//!
//! ```ignore
//! use queue_bench_viz::render::{export_svg, ComparativeRenderer, PanelLayout, QueueFilter};
//! use queue_bench_viz::schema::{IndependentVariable, Metric};
//!
//! let filter = QueueFilter::new().with_highlight(["lcrq_rust"]);
//! let renderer = ComparativeRenderer::new(&registry, &filter, IndependentVariable::ThreadCount);
//! let figure = renderer.render(&PanelLayout::single(Metric::Throughput), &groups)?;
//! export_svg(&figure, "thread_count_benchmark.svg".as_ref())?;
//! ```

mod figure;
mod filter;
mod layout;
mod renderer;
mod svg;

pub use figure::{Bar, Figure, Legend, LegendEntry, Panel, PanelContent, Series};
pub use filter::{PanelSelection, QueueFilter};
pub use layout::{
    DatasetTag, PanelKind, PanelLayout, PanelSpec, PAIRED_LEFT_TITLE, PAIRED_RIGHT_TITLE,
};
pub use renderer::{ComparativeRenderer, DEFAULT_X_TICKS};
pub use svg::{export_svg, write_atomic, Surface, SvgSurface, TextSurface};

use serde::{Deserialize, Serialize};

use crate::schema::IndependentVariable;

/// Standard figure arrangements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    /// One throughput panel.
    #[default]
    Single,
    /// Throughput and fairness side by side.
    Combined,
    /// Throughput, fairness, enqueues, dequeues.
    FourMetric,
    /// Ecosystem queues left, own queues right.
    Paired,
    /// Paired rows, one per variant.
    SixPanel,
    /// Peak memory bars.
    PeakMemory,
    /// Mean BFS time bars, one panel per dataset.
    Bfs,
}

impl LayoutKind {
    pub fn all() -> &'static [LayoutKind] {
        &[
            LayoutKind::Single,
            LayoutKind::Combined,
            LayoutKind::FourMetric,
            LayoutKind::Paired,
            LayoutKind::SixPanel,
            LayoutKind::PeakMemory,
            LayoutKind::Bfs,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            LayoutKind::Single => "single",
            LayoutKind::Combined => "combined",
            LayoutKind::FourMetric => "four-metric",
            LayoutKind::Paired => "paired",
            LayoutKind::SixPanel => "six-panel",
            LayoutKind::PeakMemory => "peak-memory",
            LayoutKind::Bfs => "bfs",
        }
    }

    /// Output file name used when none is given.
    pub fn default_file_name(&self, x: IndependentVariable) -> &'static str {
        match self {
            LayoutKind::Single | LayoutKind::FourMetric => match x {
                IndependentVariable::ThreadCount => "thread_count_benchmark.svg",
                IndependentVariable::Producers => "mpsc_benchmark.svg",
                IndependentVariable::Consumers => "spmc_benchmark.svg",
            },
            LayoutKind::Combined => "Combined_Performance_Metrics.svg",
            LayoutKind::Paired => "side_by_side_comparison.svg",
            LayoutKind::SixPanel => "six_subplot_comparison.svg",
            LayoutKind::PeakMemory => "peak_memory.svg",
            LayoutKind::Bfs => "bfs_benchmark.svg",
        }
    }
}

impl std::fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for LayoutKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        LayoutKind::all()
            .iter()
            .copied()
            .find(|k| k.name() == normalized)
            .ok_or_else(|| {
                let names: Vec<&str> = LayoutKind::all().iter().map(|k| k.name()).collect();
                format!("unknown layout '{s}', expected one of: {}", names.join(", "))
            })
    }
}
