//! Drawing surfaces: SVG through plotters, and plain text for `show`.
//!
//! # Log axes
//!
//! Log-scale panels are drawn on a linear axis over `log10(value)`, with the
//! range widened to whole decades and ticks labelled `10ⁿ`. Only positive
//! values reach a log panel; the renderer has already dropped the rest.
//!
//! # Output
//!
//! The SVG document is rendered into memory first and then written through a
//! temporary file in the destination directory that is persisted over the
//! target path, so a failed run never leaves a partial file behind.

use std::io::Write;
use std::path::Path;

use log::info;
use plotters::coord::Shift;
use plotters::prelude::{
    ChartBuilder, Circle, Color as _, DrawingArea, EmptyElement, IntoDrawingArea,
    IntoFont, LineSeries, PathElement, Polygon, Rectangle, SVGBackend, Text, BLACK, WHITE,
};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontTransform, RGBColor, ShapeStyle};

use super::figure::{Bar, Figure, LegendEntry, Panel, PanelContent, Series};
use crate::error::{PlotError, Result};
use crate::schema::AxisScale;
use crate::style::{DrawStyle, MarkerShape};

type Area<'b> = DrawingArea<SVGBackend<'b>, Shift>;

const TITLE_FONT_SIZE: f64 = 24.0;
const PANEL_TITLE_FONT_SIZE: f64 = 18.0;
const AXIS_LABEL_FONT_SIZE: f64 = 15.0;
const TICK_LABEL_FONT_SIZE: f64 = 13.0;
const LEGEND_FONT_SIZE: f64 = 14.0;
const SIDE_LABEL_FONT_SIZE: f64 = 18.0;

const MARKER_RADIUS: i32 = 4;
const TICK_LENGTH: i32 = 5;
const LEGEND_ROW_HEIGHT: u32 = 24;
const LEGEND_MAX_COLUMNS: usize = 4;
const LEGEND_SAMPLE_WIDTH: i32 = 30;
const SIDE_LABEL_WIDTH: u32 = 40;

/// Something a [`Figure`] can be drawn onto.
pub trait Surface {
    fn draw(&mut self, figure: &Figure) -> Result<()>;
}

/// In-memory SVG document.
#[derive(Debug, Default)]
pub struct SvgSurface {
    svg: String,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.svg
    }

    pub fn into_string(self) -> String {
        self.svg
    }
}

impl Surface for SvgSurface {
    fn draw(&mut self, figure: &Figure) -> Result<()> {
        self.svg.clear();
        draw_figure(&mut self.svg, figure)
    }
}

/// Writes [`Figure::summary`] to any writer.
pub struct TextSurface<W: Write> {
    out: W,
}

impl<W: Write> TextSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Surface for TextSurface<W> {
    fn draw(&mut self, figure: &Figure) -> Result<()> {
        self.out
            .write_all(figure.summary().as_bytes())
            .and_then(|_| self.out.flush())
            .map_err(|e| PlotError::Render(format!("failed to write figure summary: {e}")))
    }
}

/// Render `figure` as SVG and write it atomically to `path`.
pub fn export_svg(figure: &Figure, path: &Path) -> Result<()> {
    let mut surface = SvgSurface::new();
    surface.draw(figure)?;
    write_atomic(path, surface.as_str().as_bytes())?;
    info!("Saved figure to {}", path.display());
    Ok(())
}

/// Write `bytes` to `path` through a persisted temporary file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| PlotError::io(dir, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| PlotError::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| PlotError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| PlotError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| PlotError::io(path, e.error))?;
    Ok(())
}

fn render_err<E: std::fmt::Display>(err: E) -> PlotError {
    PlotError::Render(err.to_string())
}

fn draw_figure(buf: &mut String, figure: &Figure) -> Result<()> {
    {
        let root = SVGBackend::with_string(buf, figure.size).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let area = match &figure.title {
            Some(title) => root
                .titled(title, ("sans-serif", TITLE_FONT_SIZE))
                .map_err(render_err)?,
            None => root.clone(),
        };

        let plots = if figure.legend.is_empty() {
            area
        } else {
            let (_, height) = area.dim_in_pixel();
            let legend_height = legend_height(figure.legend.len()).min(height / 2);
            let (plots, legend_area) = area.split_vertically(height - legend_height);
            draw_legend(&legend_area, figure.legend.entries())?;
            plots
        };

        let cells = plots.split_evenly((figure.rows, figure.cols));
        for panel in &figure.panels {
            if let Some(cell) = cells.get(panel.row * figure.cols + panel.col) {
                draw_panel(cell, panel)?;
            }
        }

        root.present().map_err(render_err)?;
    }
    Ok(())
}

fn draw_panel(cell: &Area<'_>, panel: &Panel) -> Result<()> {
    let cell = match &panel.side_label {
        Some(label) => {
            let (width, height) = cell.dim_in_pixel();
            let (plot, side) = cell.split_horizontally(width.saturating_sub(SIDE_LABEL_WIDTH));
            let style = ("sans-serif", SIDE_LABEL_FONT_SIZE)
                .into_font()
                .transform(FontTransform::Rotate90)
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Center));
            side.draw(&Text::new(
                label.clone(),
                ((SIDE_LABEL_WIDTH / 2) as i32, (height / 2) as i32),
                style,
            ))
            .map_err(render_err)?;
            plot
        }
        None => cell.clone(),
    };

    let (y0, y1) = axis_range(panel.y_range, panel.scale);
    let is_bars = matches!(panel.content, PanelContent::Bars(_));
    let (x_range, x_ticks): ((f64, f64), Vec<(f64, String)>) = match &panel.content {
        PanelContent::Lines(series) => {
            let (range, keys) = line_x_range(&panel.x_ticks, series);
            let ticks = keys
                .into_iter()
                .map(|x| (x, format!("{}", x.round() as i64)))
                .collect();
            (range, ticks)
        }
        PanelContent::Bars(bars) => (
            (-0.5, bars.len().max(1) as f64 - 0.5),
            bars.iter()
                .enumerate()
                .map(|(i, bar)| (i as f64, bar.label.clone()))
                .collect(),
        ),
    };

    let mut builder = ChartBuilder::on(&cell);
    builder
        .margin(12)
        .x_label_area_size(if is_bars { 150 } else { 45 })
        .y_label_area_size(80);
    if let Some(title) = &panel.title {
        builder.caption(title, ("sans-serif", PANEL_TITLE_FONT_SIZE));
    }
    let mut chart = builder
        .build_cartesian_2d(x_range.0..x_range.1, y0..y1)
        .map_err(render_err)?;

    let scale = panel.scale;
    let y_formatter = move |v: &f64| format_tick(*v, scale);

    chart
        .configure_mesh()
        .x_labels(0)
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .y_labels(12)
        .y_label_formatter(&y_formatter)
        .label_style(("sans-serif", TICK_LABEL_FONT_SIZE))
        .axis_desc_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
        .bold_line_style(BLACK.mix(0.15))
        .light_line_style(WHITE.mix(0.0))
        .draw()
        .map_err(render_err)?;
    draw_x_ticks(&cell, &chart, y0, &x_ticks, is_bars)?;

    match &panel.content {
        PanelContent::Lines(series) => {
            for s in series {
                let points: Vec<(f64, f64)> = s
                    .points
                    .iter()
                    .map(|&(x, y)| (x, to_axis(y, scale)))
                    .collect();
                let pixels: Vec<(f64, f64)> = points
                    .iter()
                    .map(|p| {
                        let (px, py) = chart.backend_coord(p);
                        (px as f64, py as f64)
                    })
                    .collect();
                let stroke = stroke_style(&s.style);
                for run in dash_segments(&points, &pixels, s.style.line.dash_pattern()) {
                    chart
                        .draw_series(LineSeries::new(run, stroke))
                        .map_err(render_err)?;
                }
                draw_markers(&mut chart, &points, &s.style)?;
            }
        }
        PanelContent::Bars(bars) => {
            for (i, bar) in bars.iter().enumerate() {
                draw_bar(&mut chart, i, bar, y0, scale)?;
            }
        }
    }

    if panel.is_empty() {
        chart
            .draw_series(std::iter::once(Text::new(
                "no data".to_string(),
                ((x_range.0 + x_range.1) / 2.0, (y0 + y1) / 2.0),
                ("sans-serif", AXIS_LABEL_FONT_SIZE)
                    .into_font()
                    .color(&BLACK.mix(0.5))
                    .pos(Pos::new(HPos::Center, VPos::Center)),
            )))
            .map_err(render_err)?;
    }

    Ok(())
}

type Chart<'a, 'b> = plotters::chart::ChartContext<
    'a,
    SVGBackend<'b>,
    plotters::coord::cartesian::Cartesian2d<
        plotters::coord::types::RangedCoordf64,
        plotters::coord::types::RangedCoordf64,
    >,
>;

/// Tick marks and labels along the bottom axis at explicit positions.
///
/// Labels go on the enclosing cell so they can sit in the label area below
/// the plot.
fn draw_x_ticks(
    cell: &Area<'_>,
    chart: &Chart<'_, '_>,
    y: f64,
    ticks: &[(f64, String)],
    rotate: bool,
) -> Result<()> {
    let (base_x, base_y) = cell.get_base_pixel();
    let font = ("sans-serif", TICK_LABEL_FONT_SIZE).into_font();
    let style = if rotate {
        font.transform(FontTransform::Rotate90)
            .color(&BLACK)
            .pos(Pos::new(HPos::Left, VPos::Center))
    } else {
        font.color(&BLACK).pos(Pos::new(HPos::Center, VPos::Top))
    };

    for (x, label) in ticks {
        let (px, py) = chart.backend_coord(&(*x, y));
        let (px, py) = (px - base_x, py - base_y);
        cell.draw(&PathElement::new(vec![(px, py), (px, py + TICK_LENGTH)], BLACK))
            .map_err(render_err)?;
        cell.draw(&Text::new(
            label.clone(),
            (px, py + TICK_LENGTH + 3),
            style.clone(),
        ))
        .map_err(render_err)?;
    }
    Ok(())
}

fn draw_bar(chart: &mut Chart<'_, '_>, i: usize, bar: &Bar, base: f64, scale: AxisScale) -> Result<()> {
    let x = i as f64;
    let top = to_axis(bar.value, scale);
    let color = rgb(&bar.style).mix(bar.style.alpha);
    chart
        .draw_series(std::iter::once(Rectangle::new(
            [(x - 0.4, base), (x + 0.4, top)],
            color.filled(),
        )))
        .map_err(render_err)?;
    Ok(())
}

fn draw_markers(chart: &mut Chart<'_, '_>, points: &[(f64, f64)], style: &DrawStyle) -> Result<()> {
    let r = MARKER_RADIUS;
    let fill = rgb(style).mix(style.alpha).filled();
    let stroke = ShapeStyle {
        color: rgb(style).mix(style.alpha),
        filled: false,
        stroke_width: 2,
    };

    match style.marker {
        MarkerShape::Circle => chart
            .draw_series(
                points
                    .iter()
                    .map(|p| EmptyElement::at(*p) + Circle::new((0, 0), r, fill)),
            )
            .map(|_| ()),
        MarkerShape::Square => chart
            .draw_series(
                points
                    .iter()
                    .map(|p| EmptyElement::at(*p) + Rectangle::new([(-r, -r), (r, r)], fill)),
            )
            .map(|_| ()),
        MarkerShape::Cross | MarkerShape::Plus => {
            for stroke_points in stroke_marker(style.marker, r) {
                chart
                    .draw_series(points.iter().map(|p| {
                        EmptyElement::at(*p) + PathElement::new(stroke_points.clone(), stroke)
                    }))
                    .map_err(render_err)?;
            }
            Ok(())
        }
        shape => {
            let outline = polygon_marker(shape, r);
            chart
                .draw_series(
                    points
                        .iter()
                        .map(|p| EmptyElement::at(*p) + Polygon::new(outline.clone(), fill)),
                )
                .map(|_| ())
        }
    }
    .map_err(render_err)
}

fn draw_legend(area: &Area<'_>, entries: &[LegendEntry]) -> Result<()> {
    let (width, _) = area.dim_in_pixel();
    let columns = entries.len().clamp(1, LEGEND_MAX_COLUMNS);
    let column_width = (width as usize / columns) as i32;

    for (i, entry) in entries.iter().enumerate() {
        let x = (i % columns) as i32 * column_width + 12;
        let y = (i / columns) as i32 * LEGEND_ROW_HEIGHT as i32 + LEGEND_ROW_HEIGHT as i32 / 2 + 8;

        let sample = [(x as f64, y as f64), ((x + LEGEND_SAMPLE_WIDTH) as f64, y as f64)];
        let stroke = stroke_style(&entry.style);
        for run in dash_segments(&sample, &sample, entry.style.line.dash_pattern()) {
            let run: Vec<(i32, i32)> = run.iter().map(|&(px, py)| (px as i32, py as i32)).collect();
            area.draw(&PathElement::new(run, stroke)).map_err(render_err)?;
        }

        let center = (x + LEGEND_SAMPLE_WIDTH / 2, y);
        let fill = rgb(&entry.style).mix(entry.style.alpha).filled();
        match entry.style.marker {
            MarkerShape::Circle => area
                .draw(&(EmptyElement::at(center) + Circle::new((0, 0), MARKER_RADIUS, fill)))
                .map_err(render_err)?,
            MarkerShape::Square => area
                .draw(
                    &(EmptyElement::at(center)
                        + Rectangle::new(
                            [(-MARKER_RADIUS, -MARKER_RADIUS), (MARKER_RADIUS, MARKER_RADIUS)],
                            fill,
                        )),
                )
                .map_err(render_err)?,
            MarkerShape::Cross | MarkerShape::Plus => {
                for stroke_points in stroke_marker(entry.style.marker, MARKER_RADIUS) {
                    let path: Vec<(i32, i32)> = stroke_points
                        .iter()
                        .map(|&(dx, dy)| (center.0 + dx, center.1 + dy))
                        .collect();
                    area.draw(&PathElement::new(path, stroke)).map_err(render_err)?;
                }
            }
            shape => area
                .draw(
                    &(EmptyElement::at(center)
                        + Polygon::new(polygon_marker(shape, MARKER_RADIUS), fill)),
                )
                .map_err(render_err)?,
        }

        let text_style = ("sans-serif", LEGEND_FONT_SIZE)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Left, VPos::Center));
        area.draw(&Text::new(
            entry.label.clone(),
            (x + LEGEND_SAMPLE_WIDTH + 8, y),
            text_style,
        ))
        .map_err(render_err)?;
    }
    Ok(())
}

fn legend_height(entries: usize) -> u32 {
    let rows = entries.div_ceil(LEGEND_MAX_COLUMNS) as u32;
    rows * LEGEND_ROW_HEIGHT + 16
}

fn rgb(style: &DrawStyle) -> RGBColor {
    RGBColor(style.color.r, style.color.g, style.color.b)
}

fn stroke_style(style: &DrawStyle) -> ShapeStyle {
    ShapeStyle {
        color: rgb(style).mix(style.alpha),
        filled: false,
        stroke_width: style.width.round().max(1.0) as u32,
    }
}

fn to_axis(value: f64, scale: AxisScale) -> f64 {
    match scale {
        AxisScale::Linear => value,
        AxisScale::Log => value.log10(),
    }
}

/// Vertical axis range in axis units.
fn axis_range(range: Option<(f64, f64)>, scale: AxisScale) -> (f64, f64) {
    match scale {
        AxisScale::Log => {
            let (lo, hi) = range
                .map(|(lo, hi)| (lo.log10(), hi.log10()))
                .unwrap_or((0.0, 1.0));
            let lo = lo.floor();
            let hi = hi.ceil().max(lo + 1.0);
            (lo, hi)
        }
        AxisScale::Linear => {
            let (lo, hi) = range.unwrap_or((0.0, 1.0));
            let span = hi - lo;
            let pad = if span > 0.0 {
                span * 0.05
            } else {
                lo.abs().max(1.0) * 0.1
            };
            (lo - pad, hi + pad)
        }
    }
}

/// Horizontal range covering every tick and point, plus the tick positions
/// that fall inside it.
fn line_x_range(ticks: &[f64], series: &[Series]) -> ((f64, f64), Vec<f64>) {
    let xs = ticks
        .iter()
        .copied()
        .chain(series.iter().flat_map(|s| s.points.iter().map(|p| p.0)));
    let (lo, hi) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
        (lo.min(x), hi.max(x))
    });
    let (lo, hi) = if lo.is_finite() { (lo, hi) } else { (0.0, 1.0) };
    ((lo - 1.0, hi + 1.0), ticks.to_vec())
}

fn format_tick(value: f64, scale: AxisScale) -> String {
    match scale {
        AxisScale::Log => {
            let exp = value.round();
            if (value - exp).abs() > 1e-6 {
                String::new()
            } else {
                format!("10{}", superscript(exp as i64))
            }
        }
        AxisScale::Linear => {
            if value != 0.0 && value.abs() >= 1e4 {
                format!("{value:.1e}")
            } else {
                let s = format!("{value:.3}");
                let s = s.trim_end_matches('0').trim_end_matches('.');
                if s == "-0" {
                    "0".to_string()
                } else {
                    s.to_string()
                }
            }
        }
    }
}

fn superscript(n: i64) -> String {
    n.to_string()
        .chars()
        .map(|c| match c {
            '-' => '⁻',
            '0' => '⁰',
            '1' => '¹',
            '2' => '²',
            '3' => '³',
            '4' => '⁴',
            '5' => '⁵',
            '6' => '⁶',
            '7' => '⁷',
            '8' => '⁸',
            '9' => '⁹',
            other => other,
        })
        .collect()
}

/// Outline of a filled marker, relative to its centre.
fn polygon_marker(shape: MarkerShape, r: i32) -> Vec<(i32, i32)> {
    let regular = |n: usize, radius: f64, phase: f64| -> Vec<(i32, i32)> {
        (0..n)
            .map(|k| {
                let a = phase + k as f64 * std::f64::consts::TAU / n as f64;
                ((radius * a.cos()).round() as i32, (radius * a.sin()).round() as i32)
            })
            .collect()
    };
    let rf = r as f64;
    let up = -std::f64::consts::FRAC_PI_2;

    match shape {
        MarkerShape::Diamond => vec![(0, -r), (r, 0), (0, r), (-r, 0)],
        MarkerShape::TriangleUp => vec![(0, -r), (r, r), (-r, r)],
        MarkerShape::TriangleDown => vec![(0, r), (r, -r), (-r, -r)],
        MarkerShape::TriangleLeft => vec![(-r, 0), (r, -r), (r, r)],
        MarkerShape::TriangleRight => vec![(r, 0), (-r, -r), (-r, r)],
        MarkerShape::Pentagon => regular(5, rf + 0.5, up),
        MarkerShape::Hexagon => regular(6, rf + 0.5, up),
        MarkerShape::HexagonFlat => regular(6, rf + 0.5, 0.0),
        MarkerShape::Star => {
            let outer = regular(5, rf + 1.5, up);
            let inner = regular(5, (rf + 1.5) * 0.45, up + std::f64::consts::PI / 5.0);
            outer
                .into_iter()
                .zip(inner)
                .flat_map(|(o, i)| [o, i])
                .collect()
        }
        MarkerShape::Square => vec![(-r, -r), (r, -r), (r, r), (-r, r)],
        MarkerShape::Circle | MarkerShape::Cross | MarkerShape::Plus => regular(12, rf, 0.0),
    }
}

/// Strokes of a line-only marker, relative to its centre.
fn stroke_marker(shape: MarkerShape, r: i32) -> Vec<Vec<(i32, i32)>> {
    match shape {
        MarkerShape::Plus => vec![vec![(-r, 0), (r, 0)], vec![(0, -r), (0, r)]],
        _ => vec![vec![(-r, -r), (r, r)], vec![(-r, r), (r, -r)]],
    }
}

/// Split a polyline into the visible runs of a dash pattern.
///
/// `data` and `pixel` are the same vertices in data and screen space. Dash
/// lengths are measured in pixels and cut points are interpolated back into
/// data space, which is exact because both axes are affine. An empty pattern
/// yields the whole line.
pub(crate) fn dash_segments(
    data: &[(f64, f64)],
    pixel: &[(f64, f64)],
    pattern: &[f64],
) -> Vec<Vec<(f64, f64)>> {
    if data.len() < 2 {
        return Vec::new();
    }
    if pattern.is_empty() || pattern.iter().any(|d| *d <= 0.0) || pixel.len() != data.len() {
        return vec![data.to_vec()];
    }

    let lerp = |a: (f64, f64), b: (f64, f64), t: f64| (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t);

    let mut runs = Vec::new();
    let mut current = vec![data[0]];
    let mut idx = 0;
    let mut remaining = pattern[0];
    let mut on = true;

    for k in 0..data.len() - 1 {
        let (a, b) = (data[k], data[k + 1]);
        let (p, q) = (pixel[k], pixel[k + 1]);
        let len = ((q.0 - p.0).powi(2) + (q.1 - p.1).powi(2)).sqrt();
        if len > 0.0 {
            let mut t = 0.0;
            while (1.0 - t) * len > remaining + 1e-9 {
                t += remaining / len;
                current.push(lerp(a, b, t));
                if on {
                    runs.push(std::mem::take(&mut current));
                }
                on = !on;
                idx = (idx + 1) % pattern.len();
                remaining = pattern[idx];
            }
            remaining -= (1.0 - t) * len;
        }
        if on {
            current.push(b);
        }
    }

    if on && current.len() >= 2 {
        runs.push(current);
    }
    runs
}
