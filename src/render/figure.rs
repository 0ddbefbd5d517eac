//! Backend-independent scene model.
//!
//! A [`Figure`] is fully laid out and styled: every series already carries
//! its final colour, width and label, points are sorted, and unplottable
//! values are gone. Surfaces only translate it into drawing calls, which is
//! what makes export and `show` agree.

use std::fmt::Write as _;

use crate::schema::AxisScale;
use crate::style::{DrawStyle, Emphasis};

/// One line on a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub queue_type: String,
    pub subfolder: Option<String>,
    pub variant: Option<String>,
    pub label: String,
    pub style: DrawStyle,
    /// `(x, y)` in data units, sorted by `x`.
    pub points: Vec<(f64, f64)>,
}

/// One bar on a bar panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub queue_type: String,
    pub label: String,
    pub value: f64,
    pub style: DrawStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelContent {
    /// Series in draw order (muted first, highlighted last).
    Lines(Vec<Series>),
    /// Bars sorted by value, largest first.
    Bars(Vec<Bar>),
}

/// One laid-out panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub row: usize,
    pub col: usize,
    pub title: Option<String>,
    pub x_label: String,
    pub y_label: String,
    pub scale: AxisScale,
    /// Explicit tick positions on the horizontal axis.
    pub x_ticks: Vec<f64>,
    /// Vertical data range `(min, max)`, `None` if the panel is empty.
    pub y_range: Option<(f64, f64)>,
    pub side_label: Option<String>,
    pub content: PanelContent,
    /// Values removed because the scale cannot show them.
    pub dropped_points: usize,
}

impl Panel {
    pub fn series(&self) -> &[Series] {
        match &self.content {
            PanelContent::Lines(series) => series,
            PanelContent::Bars(_) => &[],
        }
    }

    pub fn bars(&self) -> &[Bar] {
        match &self.content {
            PanelContent::Bars(bars) => bars,
            PanelContent::Lines(_) => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.content {
            PanelContent::Lines(series) => series.is_empty(),
            PanelContent::Bars(bars) => bars.is_empty(),
        }
    }

    /// Min and max of every plotted value.
    pub(crate) fn data_range(&self) -> Option<(f64, f64)> {
        let values: Box<dyn Iterator<Item = f64> + '_> = match &self.content {
            PanelContent::Lines(series) => {
                Box::new(series.iter().flat_map(|s| s.points.iter().map(|p| p.1)))
            }
            PanelContent::Bars(bars) => Box::new(bars.iter().map(|b| b.value)),
        };
        values.fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// One legend row.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub style: DrawStyle,
}

/// Shared figure legend; the first entry for a label wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Legend {
    entries: Vec<LegendEntry>,
}

impl Legend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry unless its label is already present. Returns whether it
    /// was added.
    pub fn insert(&mut self, label: &str, style: DrawStyle) -> bool {
        if self.contains(label) {
            return false;
        }
        self.entries.push(LegendEntry {
            label: label.to_string(),
            style,
        });
        true
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.iter().any(|e| e.label == label)
    }

    pub fn entries(&self) -> &[LegendEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A complete multi-panel figure.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: Option<String>,
    pub rows: usize,
    pub cols: usize,
    /// Output size in pixels.
    pub size: (u32, u32),
    /// Panels in layout order.
    pub panels: Vec<Panel>,
    pub legend: Legend,
}

impl Figure {
    /// Every series across all panels.
    pub fn all_series(&self) -> impl Iterator<Item = &Series> {
        self.panels.iter().flat_map(|p| p.series().iter())
    }

    /// Series of one queue type across all panels.
    pub fn series_for(&self, queue_type: &str) -> Vec<&Series> {
        self.all_series()
            .filter(|s| s.queue_type == queue_type)
            .collect()
    }

    /// Distinct queue types drawn anywhere in the figure.
    pub fn rendered_queue_types(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        let bars = self.panels.iter().flat_map(|p| p.bars().iter().map(|b| b.queue_type.as_str()));
        for q in self.all_series().map(|s| s.queue_type.as_str()).chain(bars) {
            if !seen.contains(&q) {
                seen.push(q);
            }
        }
        seen
    }

    /// Whether no panel has anything to draw.
    pub fn is_empty(&self) -> bool {
        self.panels.iter().all(Panel::is_empty)
    }

    /// Plain-text rendition for interactive display.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} ({}x{} panels, {}x{} px)",
            self.title.as_deref().unwrap_or("Figure"),
            self.rows,
            self.cols,
            self.size.0,
            self.size.1
        );

        for panel in &self.panels {
            let scale = match panel.scale {
                AxisScale::Linear => "linear",
                AxisScale::Log => "log",
            };
            let _ = write!(
                out,
                "\n[{},{}] {}: {} vs {} ({} scale)",
                panel.row,
                panel.col,
                panel.title.as_deref().unwrap_or(""),
                panel.y_label,
                panel.x_label,
                scale
            );
            if let Some(side) = &panel.side_label {
                let _ = write!(out, " {side}");
            }
            out.push('\n');

            match &panel.content {
                PanelContent::Lines(series) => {
                    for s in series {
                        let _ = writeln!(
                            out,
                            "  {:<40} {:<11} {}",
                            s.label,
                            emphasis_name(s.style.emphasis),
                            format_points(&s.points)
                        );
                    }
                }
                PanelContent::Bars(bars) => {
                    for b in bars {
                        let _ = writeln!(out, "  {:<40} {}", b.label, format_value(b.value));
                    }
                }
            }
            if panel.is_empty() {
                let _ = writeln!(out, "  (no data)");
            }
            if panel.dropped_points > 0 {
                let _ = writeln!(
                    out,
                    "  ({} non-positive values not shown)",
                    panel.dropped_points
                );
            }
        }

        if !self.legend.is_empty() {
            let labels: Vec<&str> = self.legend.entries().iter().map(|e| e.label.as_str()).collect();
            let _ = writeln!(out, "\nLegend: {}", labels.join(", "));
        }
        out
    }
}

fn emphasis_name(emphasis: Emphasis) -> &'static str {
    match emphasis {
        Emphasis::Normal => "normal",
        Emphasis::Muted => "muted",
        Emphasis::Highlighted => "highlighted",
    }
}

fn format_points(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{}:{}", x, format_value(*y)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_value(v: f64) -> String {
    if v != 0.0 && (v.abs() >= 1e5 || v.abs() < 1e-2) {
        format!("{v:.3e}")
    } else {
        format!("{v:.3}")
    }
}
