//! Turns aggregated groups into a styled [`Figure`].

use ahash::{AHashMap, AHashSet};
use log::{debug, warn};

use super::figure::{Bar, Figure, Legend, Panel, PanelContent, Series};
use super::filter::QueueFilter;
use super::layout::{PanelKind, PanelLayout, PanelSpec};
use crate::aggregate::AggregatedGroup;
use crate::error::{PlotError, Result};
use crate::schema::IndependentVariable;
use crate::style::{resolve_label, DrawStyle, Emphasis, StyleRegistry, HIGHLIGHT_MARK};

/// Default sweep positions on the horizontal axis.
pub const DEFAULT_X_TICKS: [i64; 10] = [2, 6, 10, 14, 18, 22, 26, 30, 34, 36];

/// Draws panels from aggregated groups using one registry and one filter.
///
/// The registry must already hold an assignment for every queue type that
/// survives filtering.
pub struct ComparativeRenderer<'a> {
    registry: &'a StyleRegistry,
    filter: &'a QueueFilter,
    x: IndependentVariable,
    x_ticks: Vec<i64>,
}

/// Series before labelling.
struct Draft {
    queue_type: String,
    subfolder: Option<String>,
    variant: Option<String>,
    emphasis: Emphasis,
    style: DrawStyle,
    points: Vec<(f64, f64)>,
}

impl<'a> ComparativeRenderer<'a> {
    pub fn new(registry: &'a StyleRegistry, filter: &'a QueueFilter, x: IndependentVariable) -> Self {
        Self {
            registry,
            filter,
            x,
            x_ticks: DEFAULT_X_TICKS.to_vec(),
        }
    }

    /// Use explicit horizontal tick positions.
    pub fn with_x_ticks(mut self, ticks: Vec<i64>) -> Self {
        self.x_ticks = ticks;
        self
    }

    /// Lay out every panel of `layout` over `groups`.
    pub fn render(&self, layout: &PanelLayout, groups: &[AggregatedGroup]) -> Result<Figure> {
        layout.validate().map_err(PlotError::Configuration)?;

        let mut drafts: Vec<Vec<Draft>> = Vec::with_capacity(layout.panels.len());
        let mut bars: Vec<Vec<Bar>> = Vec::with_capacity(layout.panels.len());
        let mut dropped: Vec<usize> = Vec::with_capacity(layout.panels.len());

        for spec in &layout.panels {
            match spec.kind {
                PanelKind::Lines => {
                    let (series, n) = self.panel_series(spec, groups)?;
                    drafts.push(series);
                    bars.push(Vec::new());
                    dropped.push(n);
                }
                PanelKind::Bars => {
                    let (panel_bars, n) = self.panel_bars(spec, groups)?;
                    drafts.push(Vec::new());
                    bars.push(panel_bars);
                    dropped.push(n);
                }
            }
        }

        let ambiguous = ambiguous_provenance(&drafts);
        let mut legend = Legend::new();
        let mut panels = Vec::with_capacity(layout.panels.len());

        for (((spec, panel_drafts), panel_bars), dropped) in layout
            .panels
            .iter()
            .zip(drafts)
            .zip(bars)
            .zip(dropped)
        {
            let content = match spec.kind {
                PanelKind::Lines => {
                    let series: Vec<Series> = panel_drafts
                        .into_iter()
                        .map(|d| self.finish(d, &ambiguous))
                        .collect();
                    for s in &series {
                        legend.insert(&s.label, s.style);
                    }
                    PanelContent::Lines(series)
                }
                PanelKind::Bars => PanelContent::Bars(panel_bars),
            };

            if dropped > 0 {
                warn!(
                    "Dropped {} non-positive {} values from log-scale panel ({}, {})",
                    dropped, spec.metric, spec.row, spec.col
                );
            }

            let mut panel = Panel {
                row: spec.row,
                col: spec.col,
                title: spec.title.clone(),
                x_label: match spec.kind {
                    PanelKind::Lines => self.x.axis_label().to_string(),
                    PanelKind::Bars => "Queue Type".to_string(),
                },
                y_label: spec.metric.display_name().to_string(),
                scale: spec.scale,
                x_ticks: match spec.kind {
                    PanelKind::Lines => self.x_ticks.iter().map(|t| *t as f64).collect(),
                    PanelKind::Bars => Vec::new(),
                },
                y_range: None,
                side_label: spec.side_label.clone(),
                content,
                dropped_points: dropped,
            };
            panel.y_range = panel.data_range();
            panels.push(panel);
        }

        if layout.share_y {
            share_y_range(&mut panels);
        }

        let figure = Figure {
            title: layout.title.clone(),
            rows: layout.rows,
            cols: layout.cols,
            size: layout.size,
            panels,
            legend,
        };
        debug!(
            "Rendered {} panels, {} legend entries",
            figure.panels.len(),
            figure.legend.len()
        );
        Ok(figure)
    }

    /// Whether a group belongs on a panel.
    fn selects(&self, spec: &PanelSpec, group: &AggregatedGroup) -> bool {
        let queue = group.queue_type();
        if !self.filter.admits(queue) || !spec.selection.admits(queue) {
            return false;
        }
        let variant_ok = spec
            .variant
            .as_deref()
            .map_or(true, |v| group.variant() == Some(v));
        let subfolder_ok = spec
            .subfolder
            .as_deref()
            .map_or(true, |s| group.subfolder() == Some(s));
        variant_ok && subfolder_ok
    }

    fn style_for(&self, queue_type: &str, emphasis: Emphasis) -> Result<DrawStyle> {
        self.registry.draw_style(queue_type, emphasis).ok_or_else(|| {
            PlotError::Configuration(format!("queue type '{queue_type}' has no style assignment"))
        })
    }

    fn panel_series(
        &self,
        spec: &PanelSpec,
        groups: &[AggregatedGroup],
    ) -> Result<(Vec<Draft>, usize)> {
        let mut index: AHashMap<(&str, Option<&str>, Option<&str>), usize> = AHashMap::new();
        let mut drafts: Vec<Draft> = Vec::new();
        let mut dropped = 0usize;

        for group in groups.iter().filter(|g| self.selects(spec, g)) {
            let (x, y) = match (group.independent(self.x), group.metric(spec.metric)) {
                (Some(x), Some(y)) => (x as f64, y),
                _ => continue,
            };
            if !spec.scale.accepts(y) {
                dropped += 1;
                continue;
            }

            let key = (group.queue_type(), group.subfolder(), group.variant());
            let slot = match index.get(&key) {
                Some(&slot) => slot,
                None => {
                    let emphasis = self.filter.emphasis(group.queue_type(), spec.highlight);
                    drafts.push(Draft {
                        queue_type: group.queue_type().to_string(),
                        subfolder: group.subfolder().map(str::to_string),
                        variant: group.variant().map(str::to_string),
                        emphasis,
                        style: self.style_for(group.queue_type(), emphasis)?,
                        points: Vec::new(),
                    });
                    index.insert(key, drafts.len() - 1);
                    drafts.len() - 1
                }
            };
            drafts[slot].points.push((x, y));
        }

        for draft in &mut drafts {
            draft.points.sort_by(|a, b| a.0.total_cmp(&b.0));
        }
        // Stable: muted first, highlighted on top
        drafts.sort_by_key(|d| d.emphasis.layer());

        Ok((drafts, dropped))
    }

    fn panel_bars(&self, spec: &PanelSpec, groups: &[AggregatedGroup]) -> Result<(Vec<Bar>, usize)> {
        let mut bars: Vec<Bar> = Vec::new();
        let mut dropped = 0usize;

        for group in groups.iter().filter(|g| self.selects(spec, g)) {
            let value = match group.metric(spec.metric) {
                Some(v) => v,
                None => continue,
            };
            if !spec.scale.accepts(value) {
                dropped += 1;
                continue;
            }
            let emphasis = self.filter.emphasis(group.queue_type(), spec.highlight);
            bars.push(Bar {
                queue_type: group.queue_type().to_string(),
                label: self.registry.label(group.queue_type(), emphasis),
                value,
                style: self.style_for(group.queue_type(), emphasis)?,
            });
        }

        bars.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.label.cmp(&b.label)));
        Ok((bars, dropped))
    }

    fn finish(&self, draft: Draft, ambiguous: &Ambiguity) -> Series {
        let mut label = resolve_label(&draft.queue_type).to_string();

        let mut tags: Vec<&str> = Vec::new();
        if ambiguous.subfolder.contains(draft.queue_type.as_str()) {
            tags.extend(draft.subfolder.as_deref());
        }
        if ambiguous.variant.contains(draft.queue_type.as_str()) {
            tags.extend(draft.variant.as_deref());
        }
        if !tags.is_empty() {
            label = format!("{label} [{}]", tags.join(", "));
        }
        if draft.emphasis == Emphasis::Highlighted {
            label.push_str(HIGHLIGHT_MARK);
        }

        Series {
            queue_type: draft.queue_type,
            subfolder: draft.subfolder,
            variant: draft.variant,
            label,
            style: draft.style,
            points: draft.points,
        }
    }
}

/// Queue types that appear with more than one subfolder (or variant) inside
/// a single panel and therefore need a provenance tag in their label.
#[derive(Default)]
struct Ambiguity {
    subfolder: AHashSet<String>,
    variant: AHashSet<String>,
}

fn ambiguous_provenance(panels: &[Vec<Draft>]) -> Ambiguity {
    let mut ambiguity = Ambiguity::default();
    for drafts in panels {
        let mut subfolders: AHashMap<&str, Option<&str>> = AHashMap::new();
        let mut variants: AHashMap<&str, Option<&str>> = AHashMap::new();
        for d in drafts {
            let q = d.queue_type.as_str();
            match subfolders.get(q) {
                Some(seen) if *seen != d.subfolder.as_deref() => {
                    ambiguity.subfolder.insert(q.to_string());
                }
                Some(_) => {}
                None => {
                    subfolders.insert(q, d.subfolder.as_deref());
                }
            }
            match variants.get(q) {
                Some(seen) if *seen != d.variant.as_deref() => {
                    ambiguity.variant.insert(q.to_string());
                }
                Some(_) => {}
                None => {
                    variants.insert(q, d.variant.as_deref());
                }
            }
        }
    }
    ambiguity
}

/// Give every non-empty panel the union of all panel ranges.
fn share_y_range(panels: &mut [Panel]) {
    let shared = panels
        .iter()
        .filter_map(|p| p.y_range)
        .fold(None, |acc: Option<(f64, f64)>, (lo, hi)| match acc {
            None => Some((lo, hi)),
            Some((a, b)) => Some((a.min(lo), b.max(hi))),
        });
    if let Some(range) = shared {
        for panel in panels.iter_mut().filter(|p| p.y_range.is_some()) {
            panel.y_range = Some(range);
        }
    }
}
