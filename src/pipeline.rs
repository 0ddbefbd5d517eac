//! End-to-end figure pipeline.
//!
//! Connects the stages in order, each one a plain value handed to the next:
//!
//! ```text
//! RenderRequest ──validate──► DatasetMerger ──► Dataset ──► Aggregator ──► AggregatedGroup[]
//!                                                  │                              │
//!                                                  ▼                              ▼
//!                                           StyleRegistry ──────────► ComparativeRenderer ──► Figure
//!                                                                                           │
//!                                                                ┌──────────────────────────┤
//!                                                                ▼                          ▼
//!                                                          SvgSurface                  TextSurface
//! ```
//!
//! # Failure policy
//!
//! Everything that can be checked before reading data is checked first, so
//! a bad request never produces output. Per-file load failures are
//! collected and logged; the run only fails if nothing usable is left.
//! Queue types named in the allow, highlight or right lists must occur in the
//! loaded data. The SVG is rendered in memory and the summary CSV written
//! before the figure file is touched.
//!
//! # Example
//!
//! ```ignore
//! use queue_bench_viz::prelude::*;
//!
//! let request = RenderRequest::new(["results"])
//!     .with_kind(IndependentVariable::Producers)
//!     .with_filter(QueueFilter::new().with_highlight(["lcrq_rust"]));
//!
//! let summary = Pipeline::new(request)?.run()?;
//! println!("{} records → {}", summary.records, summary.output.display());
//! ```

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::aggregate::{AggregatedGroup, Aggregator, KeyField};
use crate::config::{MergeMode, RenderRequest};
use crate::error::{PlotError, Result};
use crate::merge::{DatasetMerger, MergeOutcome, MergeReport};
use crate::record::Dataset;
use crate::render::{
    write_atomic, ComparativeRenderer, DatasetTag, Figure, LayoutKind, PanelLayout, Surface,
    SvgSurface, TextSurface,
};
use crate::schema::{Field, Metric, QUEUE_TYPE, SUBFOLDER_COLUMN, TEST_ID, VARIANT_COLUMN};
use crate::style::StyleRegistry;

/// Outcome of a successful run.
#[derive(Debug)]
pub struct RunSummary {
    /// Files parsed successfully.
    pub files_loaded: usize,

    /// Files skipped because they failed to load.
    pub file_errors: usize,

    /// Records in the merged dataset.
    pub records: usize,

    /// Aggregated groups fed to the renderer.
    pub groups: usize,

    /// Where the SVG was written.
    pub output: PathBuf,

    /// The rendered scene.
    pub figure: Figure,
}

/// Runs one [`RenderRequest`].
#[derive(Debug, Clone)]
pub struct Pipeline {
    request: RenderRequest,
}

impl Pipeline {
    /// Validate `request` and build a pipeline for it.
    pub fn new(request: RenderRequest) -> Result<Self> {
        request.validate().map_err(PlotError::Configuration)?;
        Ok(Self { request })
    }

    pub fn request(&self) -> &RenderRequest {
        &self.request
    }

    /// Load and merge all inputs.
    pub fn load(&self) -> Result<MergeReport> {
        let request = &self.request;
        let merger = DatasetMerger::new()
            .with_selection(request.selection.clone())
            .with_error_mode(request.error_mode)
            .with_required(&[self.required_field()]);

        let report = match request.mode {
            MergeMode::Flat => self.load_flat(&merger)?,
            MergeMode::Subfolder => merger.merge_by_subfolder(&request.roots[0])?.into_report()?,
            MergeMode::Variant => merger
                .merge_by_variant(&request.roots, &request.variants)?
                .into_report()?,
        };

        for err in report.iter_errors() {
            warn!("Skipped {}: {}", err.path.display(), err);
        }
        if report.dataset.is_empty() {
            return Err(PlotError::NoData(format!(
                "no records loaded ({} files failed)",
                report.failed_count()
            )));
        }
        Ok(report)
    }

    fn load_flat(&self, merger: &DatasetMerger) -> Result<MergeReport> {
        let (dirs, files): (Vec<&PathBuf>, Vec<&PathBuf>) =
            self.request.roots.iter().partition(|root| root.is_dir());

        let mut report = MergeReport::default();
        let mut found = false;

        if !files.is_empty() {
            if let MergeOutcome::Loaded(loaded) = merger.merge_flat(&files)? {
                report.absorb(loaded);
                found = true;
            }
        }
        for dir in dirs {
            match merger.merge_directory_flat(dir, self.request.recursive)? {
                MergeOutcome::Loaded(loaded) => {
                    report.absorb(loaded);
                    found = true;
                }
                MergeOutcome::Empty(reason) => warn!("{}: {}", dir.display(), reason),
            }
        }

        if !found {
            return Err(PlotError::NoData("no input files found".to_string()));
        }
        Ok(report)
    }

    /// Column every loaded file must provide.
    fn required_field(&self) -> Field {
        match self.request.layout {
            LayoutKind::PeakMemory => Field::Metric(Metric::MemoryAllocated),
            LayoutKind::Bfs => Field::Metric(Metric::Milliseconds),
            _ => Field::from(self.request.kind),
        }
    }

    /// Check that every explicitly named queue type occurs in `dataset`.
    pub fn check_requested_queues(&self, dataset: &Dataset) -> Result<()> {
        let filter = &self.request.filter;
        let lists = [
            ("allow", &filter.allow),
            ("highlight", &filter.highlight),
            ("right", &self.request.right),
        ];
        for (name, list) in lists {
            let missing: Vec<&str> = list
                .iter()
                .map(String::as_str)
                .filter(|q| !dataset.contains_queue(q))
                .collect();
            if !missing.is_empty() {
                return Err(PlotError::Configuration(format!(
                    "{} list names queue types not present in the data: {}",
                    name,
                    missing.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Aggregator matching the request's layout.
    pub fn aggregator(&self) -> Aggregator {
        match self.request.layout {
            LayoutKind::PeakMemory => Aggregator::peak_memory(),
            LayoutKind::Bfs => Aggregator::bfs(match self.request.mode {
                MergeMode::Flat => None,
                MergeMode::Subfolder => Some(KeyField::Subfolder),
                MergeMode::Variant => Some(KeyField::Variant),
            }),
            _ => Aggregator::for_chart(self.request.kind, self.request.per_trial),
        }
    }

    /// Panel layout for the request over `dataset`.
    ///
    /// Only the BFS layout looks at the data, to find its subfolder names.
    pub fn layout(&self, dataset: &Dataset) -> PanelLayout {
        let request = &self.request;
        match request.layout {
            LayoutKind::Single => PanelLayout::single(request.metric).with_title(format!(
                "{} vs {}",
                request.metric.column_name(),
                request.kind.axis_label()
            )),
            LayoutKind::Combined => PanelLayout::combined(),
            LayoutKind::FourMetric => PanelLayout::four_metric(),
            LayoutKind::Paired => PanelLayout::paired(request.metric, &request.right),
            LayoutKind::SixPanel => {
                PanelLayout::six_panel(request.metric, &request.variants, &request.right)
            }
            LayoutKind::PeakMemory => PanelLayout::peak_memory(),
            LayoutKind::Bfs => match request.mode {
                MergeMode::Flat => PanelLayout::bfs(&[], DatasetTag::Subfolder),
                MergeMode::Subfolder => {
                    PanelLayout::bfs(&dataset.subfolders(), DatasetTag::Subfolder)
                }
                MergeMode::Variant => PanelLayout::bfs(&request.variants, DatasetTag::Variant),
            },
        }
    }

    /// Style registry with every queue type in `dataset` assigned.
    ///
    /// Assignment covers the unfiltered dataset so that changing the filter
    /// lists never moves a style.
    pub fn registry(&self, dataset: &Dataset) -> StyleRegistry {
        let mut registry = match self.request.layout {
            LayoutKind::SixPanel => StyleRegistry::tau_comparison(),
            _ => StyleRegistry::new(),
        };
        registry.assign(dataset.queue_types());
        registry
    }

    /// Aggregate `dataset` and lay out the figure.
    pub fn build_figure(&self, dataset: &Dataset) -> Result<(Figure, Vec<AggregatedGroup>)> {
        self.check_requested_queues(dataset)?;

        let groups = self.aggregator().aggregate(dataset);
        let registry = self.registry(dataset);
        let renderer = ComparativeRenderer::new(&registry, &self.request.filter, self.request.kind)
            .with_x_ticks(self.request.x_ticks.clone());
        let figure = renderer.render(&self.layout(dataset), &groups)?;

        if figure.is_empty() {
            return Err(PlotError::NoData(
                "nothing left to plot after filtering".to_string(),
            ));
        }
        Ok((figure, groups))
    }

    /// Load, aggregate, render and write the figure.
    pub fn run(&self) -> Result<RunSummary> {
        let report = self.load()?;
        let (figure, groups) = self.build_figure(&report.dataset)?;

        let mut svg = SvgSurface::new();
        svg.draw(&figure)?;

        if let Some(path) = &self.request.summary_csv {
            write_summary(path, &self.aggregator(), self.request.kind, &groups)?;
        }

        let output = self.request.output_path();
        write_atomic(&output, svg.as_str().as_bytes())?;
        info!("Saved figure to {}", output.display());

        if self.request.show {
            TextSurface::new(std::io::stdout().lock()).draw(&figure)?;
        }

        info!(
            "Plotted {} groups from {} records ({} files, {} skipped)",
            groups.len(),
            report.dataset.len(),
            report.successful_count(),
            report.failed_count()
        );

        Ok(RunSummary {
            files_loaded: report.successful_count(),
            file_errors: report.failed_count(),
            records: report.dataset.len(),
            groups: groups.len(),
            output,
            figure,
        })
    }
}

/// Append aggregated rows to a CSV file, writing the header only when the
/// file is new.
pub fn write_summary(
    path: &Path,
    aggregator: &Aggregator,
    x: crate::schema::IndependentVariable,
    groups: &[AggregatedGroup],
) -> Result<()> {
    let exists = path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| PlotError::io(path, e))?;
    let mut writer = csv::Writer::from_writer(file);
    let csv_err = |e: csv::Error| PlotError::Render(format!("{}: {e}", path.display()));

    if !exists {
        let mut header: Vec<&str> = vec![VARIANT_COLUMN, SUBFOLDER_COLUMN, QUEUE_TYPE, TEST_ID];
        header.push(x.column_name());
        header.extend(aggregator.metrics().iter().map(|m| m.column_name()));
        header.push("Records");
        writer.write_record(&header).map_err(csv_err)?;
    }

    for group in groups {
        let mut row: Vec<String> = vec![
            group.variant().unwrap_or_default().to_string(),
            group.subfolder().unwrap_or_default().to_string(),
            group.queue_type().to_string(),
            group.test_id().unwrap_or_default().to_string(),
            group
                .independent(x)
                .map(|v| v.to_string())
                .unwrap_or_default(),
        ];
        row.extend(
            aggregator
                .metrics()
                .iter()
                .map(|m| group.metric(*m).map(|v| v.to_string()).unwrap_or_default()),
        );
        row.push(group.record_count().to_string());
        writer.write_record(&row).map_err(csv_err)?;
    }

    writer.flush().map_err(|e| PlotError::io(path, e))?;
    info!("Appended {} rows to {}", groups.len(), path.display());
    Ok(())
}
