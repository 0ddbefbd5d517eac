//! Style Registry
//!
//! Consistent visual encodings for queue types across every panel of a
//! figure, plus the highlight/grayout styling used to emphasise a subset.
//!
//! # Assignment
//!
//! ```text
//! slot:   0 ─────────────────────── 30 │ 31 ──────────────►
//!         KNOWN_QUEUE_TYPES (fixed)    │ unknown types, sorted, appended
//!
//! style(slot) = (COLORS[slot % 30], LINES[slot % 4], MARKERS[slot % 13])
//! ```
//!
//! Palettes are shorter than the number of types, so combinations repeat by
//! index modulo palette length. A repeated colour still differs in dash or
//! marker.
//!
//! # Emphasis
//!
//! | Emphasis | Colour | Alpha | Width | Label |
//! |----------|--------|-------|-------|-------|
//! | Normal | per type | 1.0 | 1.5 | display name |
//! | Muted | gray | 0.3 | 1.0 | display name |
//! | Highlighted | per type | 1.0 | 2.5 | display name + " ★" |
//!
//! # Example
//!
//! ```ignore
//! use queue_bench_viz::style::{Emphasis, StyleRegistry};
//!
//! let mut registry = StyleRegistry::new();
//! registry.assign(dataset.queue_types());
//! let style = registry.draw_style("lcrq_rust", Emphasis::Highlighted);
//! ```

mod names;
mod palette;
mod registry;

pub use names::{priority_index, resolve_label, KNOWN_QUEUE_TYPES};
pub use palette::{Color, LineStyle, MarkerShape, COLORS, LINES, MARKERS};
pub use registry::{
    DrawStyle, Emphasis, SeriesStyle, StyleAssignment, StyleRegistry, HIGHLIGHT_MARK,
    HIGHLIGHT_WIDTH, MUTED_ALPHA, MUTED_WIDTH, NORMAL_WIDTH,
};
