//! Session-scoped queue type → style assignment.

use std::collections::{BTreeMap, BTreeSet};

use ahash::AHashMap;
use log::debug;

use super::names::{priority_index, resolve_label, KNOWN_QUEUE_TYPES};
use super::palette::{Color, LineStyle, MarkerShape, COLORS, LINES, MARKERS};

/// Opacity of muted series.
pub const MUTED_ALPHA: f64 = 0.3;

/// Line width of muted series.
pub const MUTED_WIDTH: f64 = 1.0;

/// Line width of series drawn in normal mode.
pub const NORMAL_WIDTH: f64 = 1.5;

/// Line width of highlighted series.
pub const HIGHLIGHT_WIDTH: f64 = 2.5;

/// Appended to the legend label of highlighted series.
pub const HIGHLIGHT_MARK: &str = " ★";

/// Per-type visual encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesStyle {
    pub color: Color,
    pub line: LineStyle,
    pub marker: MarkerShape,
    /// Palette index the style was derived from.
    pub slot: usize,
}

impl SeriesStyle {
    /// Style for palette slot `slot`.
    pub fn for_slot(slot: usize) -> Self {
        Self {
            color: COLORS[slot % COLORS.len()],
            line: LINES[slot % LINES.len()],
            marker: MARKERS[slot % MARKERS.len()],
            slot,
        }
    }
}

/// Mapping returned by [`StyleRegistry::assign`], ordered by queue type.
pub type StyleAssignment = BTreeMap<String, SeriesStyle>;

/// How prominently a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emphasis {
    /// Full colour, normal width.
    Normal,
    /// Shared gray, reduced opacity, thin line.
    Muted,
    /// Full colour, wide line, drawn on top, starred label.
    Highlighted,
}

impl Emphasis {
    /// Drawing order; higher layers are drawn later.
    pub fn layer(&self) -> u8 {
        match self {
            Emphasis::Muted => 0,
            Emphasis::Normal => 5,
            Emphasis::Highlighted => 10,
        }
    }
}

/// Concrete stroke parameters for one series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawStyle {
    pub color: Color,
    pub alpha: f64,
    pub width: f64,
    pub line: LineStyle,
    pub marker: MarkerShape,
    pub emphasis: Emphasis,
}

/// Assigns a stable (colour, line, marker) triple to every queue type seen
/// while building one figure.
///
/// Well-known types take their position in [`KNOWN_QUEUE_TYPES`] as slot.
/// Other types are appended after the priority list in sorted order as they
/// are first seen, so `assign` gives the same result for any permutation of
/// its input. An assignment never changes once made and a slot is never given
/// to two types.
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    assignments: AHashMap<String, SeriesStyle>,
    overrides: AHashMap<String, Color>,
    unknown_count: usize,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the colour pins used by tau comparison figures.
    pub fn tau_comparison() -> Self {
        Self::new()
            .with_color_override("lcrq_rust", Color::ORANGE)
            .with_color_override("lprq_rust", Color::RED)
            .with_color_override("faaa_queue_rust", Color::BLUE)
    }

    /// Pin the colour of `queue_type`, keeping its line and marker.
    ///
    /// Intended to be called before the first `assign`.
    pub fn with_color_override(mut self, queue_type: impl Into<String>, color: Color) -> Self {
        let queue_type = queue_type.into();
        if let Some(style) = self.assignments.get_mut(&queue_type) {
            style.color = color;
        }
        self.overrides.insert(queue_type, color);
        self
    }

    /// Assign styles to every queue type in `queue_types` not yet seen and
    /// return the mapping for all of them.
    pub fn assign<I, S>(&mut self, queue_types: I) -> StyleAssignment
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let requested: BTreeSet<String> = queue_types
            .into_iter()
            .map(|q| q.as_ref().to_string())
            .collect();

        let mut unknown = Vec::new();
        for queue in &requested {
            if self.assignments.contains_key(queue) {
                continue;
            }
            match priority_index(queue) {
                Some(slot) => self.insert(queue, slot),
                None => unknown.push(queue),
            }
        }

        // BTreeSet iteration is sorted, so unknowns are appended in name order
        for queue in unknown {
            let slot = KNOWN_QUEUE_TYPES.len() + self.unknown_count;
            self.unknown_count += 1;
            self.insert(queue, slot);
        }

        requested
            .into_iter()
            .filter_map(|q| self.assignments.get(&q).map(|s| (q, *s)))
            .collect()
    }

    fn insert(&mut self, queue: &str, slot: usize) {
        let mut style = SeriesStyle::for_slot(slot);
        if let Some(color) = self.overrides.get(queue) {
            style.color = *color;
        }
        debug!(
            "Style slot {} for {}: {} {} {}",
            slot,
            queue,
            style.color,
            style.line.token(),
            style.marker.token()
        );
        self.assignments.insert(queue.to_string(), style);
    }

    /// Assigned style of `queue_type`.
    pub fn style(&self, queue_type: &str) -> Option<&SeriesStyle> {
        self.assignments.get(queue_type)
    }

    /// Stroke parameters for `queue_type` at the given emphasis.
    pub fn draw_style(&self, queue_type: &str, emphasis: Emphasis) -> Option<DrawStyle> {
        let style = self.style(queue_type)?;
        Some(match emphasis {
            Emphasis::Normal => DrawStyle {
                color: style.color,
                alpha: 1.0,
                width: NORMAL_WIDTH,
                line: style.line,
                marker: style.marker,
                emphasis,
            },
            Emphasis::Muted => DrawStyle {
                color: Color::GRAY,
                alpha: MUTED_ALPHA,
                width: MUTED_WIDTH,
                line: style.line,
                marker: style.marker,
                emphasis,
            },
            Emphasis::Highlighted => DrawStyle {
                color: style.color,
                alpha: 1.0,
                width: HIGHLIGHT_WIDTH,
                line: style.line,
                marker: style.marker,
                emphasis,
            },
        })
    }

    /// Legend label of `queue_type` at the given emphasis.
    pub fn label(&self, queue_type: &str, emphasis: Emphasis) -> String {
        let name = resolve_label(queue_type);
        match emphasis {
            Emphasis::Highlighted => format!("{name}{HIGHLIGHT_MARK}"),
            Emphasis::Normal | Emphasis::Muted => name.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// All assignments ordered by slot.
    pub fn assignments(&self) -> Vec<(&str, &SeriesStyle)> {
        let mut all: Vec<_> = self
            .assignments
            .iter()
            .map(|(q, s)| (q.as_str(), s))
            .collect();
        all.sort_by_key(|(_, s)| s.slot);
        all
    }
}
