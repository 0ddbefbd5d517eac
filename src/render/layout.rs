//! Panel layout descriptors.
//!
//! Every chart the renderer can draw is a [`PanelLayout`]: a grid size and a
//! list of [`PanelSpec`]s placing one metric in one cell. The standard
//! layouts are:
//!
//! | Layout | Grid | Panels |
//! |--------|------|--------|
//! | `single` | 1×1 | one metric |
//! | `combined` | 1×2 | Throughput, Fairness |
//! | `four_metric` | 2×2 | Throughput, Fairness, Enqueues, Dequeues |
//! | `paired` | 1×2 | left: queues not in the right-list; right: all queues, highlighted |
//! | `six_panel` | 3×2 | one row per variant, paired columns |
//! | `peak_memory` | 1×1 | bar chart of peak `Memory Allocated` |
//! | `bfs` | 1×n | mean `Milliseconds` bars, one panel per dataset |

use serde::{Deserialize, Serialize};

use super::filter::PanelSelection;
use crate::schema::{AxisScale, Metric};

/// Left panel title of paired layouts.
pub const PAIRED_LEFT_TITLE: &str = "Rust ecosystem and C++ queues";

/// Right panel title of paired layouts.
pub const PAIRED_RIGHT_TITLE: &str = "Our queues";

/// What a panel draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelKind {
    /// One line per (queue type, subfolder, variant) against the swept axis.
    #[default]
    Lines,
    /// One bar per queue type, sorted by value descending.
    Bars,
}

/// Provenance tag that tells BFS datasets apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatasetTag {
    Subfolder,
    Variant,
}

/// One cell of a layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    pub metric: Metric,
    pub scale: AxisScale,
    pub row: usize,
    pub col: usize,
    pub kind: PanelKind,

    /// Restrict the panel to records of this variant.
    pub variant: Option<String>,

    /// Restrict the panel to records from this subfolder.
    #[serde(default)]
    pub subfolder: Option<String>,

    pub selection: PanelSelection,

    /// Whether the figure's highlight list applies in this panel.
    pub highlight: bool,

    pub title: Option<String>,

    /// Text drawn vertically to the right of the panel (e.g. `τ = 0.5`).
    pub side_label: Option<String>,
}

impl PanelSpec {
    /// Line panel for `metric` at `(row, col)` using the metric's default scale.
    pub fn new(metric: Metric, row: usize, col: usize) -> Self {
        Self {
            metric,
            scale: metric.default_scale(),
            row,
            col,
            kind: PanelKind::Lines,
            variant: None,
            subfolder: None,
            selection: PanelSelection::All,
            highlight: true,
            title: None,
            side_label: None,
        }
    }

    pub fn with_scale(mut self, scale: AxisScale) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_kind(mut self, kind: PanelKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn with_subfolder(mut self, subfolder: impl Into<String>) -> Self {
        self.subfolder = Some(subfolder.into());
        self
    }

    pub fn with_selection(mut self, selection: PanelSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_highlight(mut self, enabled: bool) -> Self {
        self.highlight = enabled;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_side_label(mut self, label: impl Into<String>) -> Self {
        self.side_label = Some(label.into());
        self
    }
}

/// A grid of panels sharing one style registry and one legend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelLayout {
    pub rows: usize,
    pub cols: usize,
    pub title: Option<String>,

    /// Output size in pixels.
    pub size: (u32, u32),

    /// Use one vertical range for every panel.
    pub share_y: bool,

    pub panels: Vec<PanelSpec>,
}

impl PanelLayout {
    /// Empty `rows × cols` grid.
    pub fn grid(rows: usize, cols: usize, size: (u32, u32)) -> Self {
        Self {
            rows,
            cols,
            title: None,
            size,
            share_y: false,
            panels: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_panel(mut self, panel: PanelSpec) -> Self {
        self.panels.push(panel);
        self
    }

    pub fn with_shared_y(mut self, share: bool) -> Self {
        self.share_y = share;
        self
    }

    /// One metric, one panel.
    pub fn single(metric: Metric) -> Self {
        Self::grid(1, 1, (1000, 700)).with_panel(PanelSpec::new(metric, 0, 0))
    }

    /// Throughput and fairness side by side.
    pub fn combined() -> Self {
        Self::grid(1, 2, (1200, 800))
            .with_title("Combined Performance Metrics")
            .with_panel(PanelSpec::new(Metric::Throughput, 0, 0).with_title("Throughput"))
            .with_panel(PanelSpec::new(Metric::Fairness, 0, 1).with_title("Fairness"))
    }

    /// Throughput, fairness, enqueues and dequeues in a 2×2 grid.
    pub fn four_metric() -> Self {
        let mut layout = Self::grid(2, 2, (1200, 1000)).with_title("Performance Metrics");
        for (i, metric) in Metric::sweep_metrics().iter().enumerate() {
            layout = layout.with_panel(
                PanelSpec::new(*metric, i / 2, i % 2).with_title(metric.column_name()),
            );
        }
        layout
    }

    /// Left: every queue not in `right`, full colour. Right: every queue,
    /// with the figure's highlight list applied.
    pub fn paired(metric: Metric, right: &[String]) -> Self {
        Self::grid(1, 2, (1200, 800))
            .with_shared_y(true)
            .with_panel(Self::left_panel(metric, 0, right).with_title(PAIRED_LEFT_TITLE))
            .with_panel(Self::right_panel(metric, 0).with_title(PAIRED_RIGHT_TITLE))
    }

    /// One paired row per variant, labelled `τ = <variant>` on the right.
    pub fn six_panel(metric: Metric, variants: &[String], right: &[String]) -> Self {
        let height = 150 + 320 * variants.len().max(1) as u32;
        let mut layout = Self::grid(variants.len(), 2, (1000, height)).with_shared_y(true);
        for (row, variant) in variants.iter().enumerate() {
            layout = layout
                .with_panel(Self::left_panel(metric, row, right).with_variant(variant.as_str()))
                .with_panel(
                    Self::right_panel(metric, row)
                        .with_variant(variant.as_str())
                        .with_side_label(format!("τ = {variant}")),
                );
        }
        layout
    }

    /// Peak memory bar chart.
    pub fn peak_memory() -> Self {
        Self::grid(1, 1, (1000, 700))
            .with_title("Peak Memory Usage by Queue Type")
            .with_panel(
                PanelSpec::new(Metric::MemoryAllocated, 0, 0)
                    .with_kind(PanelKind::Bars)
                    .with_highlight(true),
            )
    }

    /// Mean BFS time per queue type, one bar panel per dataset label.
    ///
    /// With no labels every record lands on a single panel.
    pub fn bfs(datasets: &[String], tag: DatasetTag) -> Self {
        let bars = |col: usize| {
            PanelSpec::new(Metric::Milliseconds, 0, col)
                .with_kind(PanelKind::Bars)
                .with_scale(AxisScale::Linear)
        };
        if datasets.is_empty() {
            return Self::grid(1, 1, (900, 700))
                .with_title("BFS Benchmark Results")
                .with_panel(bars(0));
        }

        let width = (550 * datasets.len() as u32).max(900);
        let mut layout =
            Self::grid(1, datasets.len(), (width, 700)).with_title("BFS Benchmark Results");
        for (col, name) in datasets.iter().enumerate() {
            let panel = bars(col).with_title(name.as_str());
            layout = layout.with_panel(match tag {
                DatasetTag::Subfolder => panel.with_subfolder(name.as_str()),
                DatasetTag::Variant => panel.with_variant(name.as_str()),
            });
        }
        layout
    }

    fn left_panel(metric: Metric, row: usize, right: &[String]) -> PanelSpec {
        PanelSpec::new(metric, row, 0)
            .with_selection(PanelSelection::Excluding(right.to_vec()))
            .with_highlight(false)
    }

    fn right_panel(metric: Metric, row: usize) -> PanelSpec {
        PanelSpec::new(metric, row, 1)
    }

    /// Panel at a grid cell.
    pub fn panel_at(&self, row: usize, col: usize) -> Option<&PanelSpec> {
        self.panels.iter().find(|p| p.row == row && p.col == col)
    }

    /// Check the grid is well formed.
    pub fn validate(&self) -> Result<(), String> {
        if self.rows == 0 || self.cols == 0 {
            return Err(format!("grid must be non-empty, got {}x{}", self.rows, self.cols));
        }
        if self.panels.is_empty() {
            return Err("layout has no panels".to_string());
        }
        if self.size.0 < 200 || self.size.1 < 200 {
            return Err(format!("size {:?} is too small", self.size));
        }
        for (i, panel) in self.panels.iter().enumerate() {
            if panel.row >= self.rows || panel.col >= self.cols {
                return Err(format!(
                    "panel {} at ({}, {}) is outside the {}x{} grid",
                    i, panel.row, panel.col, self.rows, self.cols
                ));
            }
            if self.panels[..i]
                .iter()
                .any(|p| p.row == panel.row && p.col == panel.col)
            {
                return Err(format!("two panels share cell ({}, {})", panel.row, panel.col));
            }
        }
        Ok(())
    }
}
