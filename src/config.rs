//! Run configuration.
//!
//! A [`RenderRequest`] describes one figure end to end: where the CSV files
//! live and how they are grouped, which chart and layout to draw, the queue
//! filters, and where output goes. It round-trips through TOML and JSON so a
//! figure can be regenerated from a checked-in file.
//!
//! # Example
//!
//! ```ignore
//! use queue_bench_viz::config::{MergeMode, RenderRequest};
//! use queue_bench_viz::render::LayoutKind;
//!
//! let request = RenderRequest::new(["results/tau_0.5", "results/tau_1"])
//!     .with_mode(MergeMode::Variant)
//!     .with_variants(["0.5", "1"])
//!     .with_layout(LayoutKind::SixPanel)
//!     .with_right(["lcrq_rust", "bbq"]);
//!
//! request.save_toml("six_panel.toml")?;
//! let loaded = RenderRequest::load_toml("six_panel.toml")?;
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::merge::{ErrorMode, FileSelection};
use crate::render::{LayoutKind, QueueFilter, DEFAULT_X_TICKS};
use crate::schema::{IndependentVariable, Metric};

/// How input roots are turned into one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeMode {
    /// Roots are files or directories of files, concatenated.
    #[default]
    Flat,
    /// One root; each immediate subdirectory is a separate series source.
    Subfolder,
    /// Several roots, each tagged with its own variant label.
    Variant,
}

impl MergeMode {
    pub fn all() -> &'static [MergeMode] {
        &[MergeMode::Flat, MergeMode::Subfolder, MergeMode::Variant]
    }

    pub fn name(&self) -> &'static str {
        match self {
            MergeMode::Flat => "flat",
            MergeMode::Subfolder => "subfolder",
            MergeMode::Variant => "variant",
        }
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MergeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(MergeMode::Flat),
            "subfolder" | "subfolders" => Ok(MergeMode::Subfolder),
            "variant" | "variants" | "tau" => Ok(MergeMode::Variant),
            other => Err(format!(
                "unknown merge mode '{other}' (expected flat, subfolder or variant)"
            )),
        }
    }
}

/// Everything needed to produce one figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderRequest {
    /// Input files or directories.
    pub roots: Vec<PathBuf>,

    /// Variant label per root (variant mode only).
    pub variants: Vec<String>,

    /// Swept parameter on the horizontal axis.
    pub kind: IndependentVariable,

    pub layout: LayoutKind,

    pub mode: MergeMode,

    /// Metric for single, paired and six-panel layouts.
    pub metric: Metric,

    /// Walk flat directory roots recursively.
    pub recursive: bool,

    pub filter: QueueFilter,

    /// Queue types shown on the right of paired layouts.
    pub right: Vec<String>,

    /// Horizontal tick positions.
    pub x_ticks: Vec<i64>,

    /// Keep trials separate instead of averaging them.
    pub per_trial: bool,

    pub selection: FileSelection,

    pub error_mode: ErrorMode,

    /// Output SVG path; defaults to the layout's standard file name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Print the figure to stdout as well.
    pub show: bool,

    /// Append aggregated rows to this CSV file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_csv: Option<PathBuf>,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            variants: Vec::new(),
            kind: IndependentVariable::ThreadCount,
            layout: LayoutKind::Single,
            mode: MergeMode::Flat,
            metric: Metric::Throughput,
            recursive: false,
            filter: QueueFilter::default(),
            right: Vec::new(),
            x_ticks: DEFAULT_X_TICKS.to_vec(),
            per_trial: false,
            selection: FileSelection::default(),
            error_mode: ErrorMode::default(),
            output: None,
            show: false,
            summary_csv: None,
        }
    }
}

impl RenderRequest {
    /// Request over `roots` with default settings.
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: IndependentVariable) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_layout(mut self, layout: LayoutKind) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_mode(mut self, mode: MergeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_variants<I, S>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variants = variants.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_filter(mut self, filter: QueueFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_right<I, S>(mut self, queues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.right = queues.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_x_ticks(mut self, ticks: Vec<i64>) -> Self {
        self.x_ticks = ticks;
        self
    }

    pub fn with_per_trial(mut self, per_trial: bool) -> Self {
        self.per_trial = per_trial;
        self
    }

    pub fn with_selection(mut self, selection: FileSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn with_show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    pub fn with_summary_csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.summary_csv = Some(path.into());
        self
    }

    /// Output path, falling back to the layout's standard file name.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.layout.default_file_name(self.kind)))
    }

    /// Validate the request before any file is read.
    pub fn validate(&self) -> Result<(), String> {
        if self.roots.is_empty() {
            return Err("at least one input root is required".to_string());
        }

        match self.mode {
            MergeMode::Flat => {}
            MergeMode::Subfolder => {
                if self.roots.len() != 1 {
                    return Err(format!(
                        "subfolder mode takes exactly one root, got {}",
                        self.roots.len()
                    ));
                }
            }
            MergeMode::Variant => {
                if self.variants.len() != self.roots.len() {
                    return Err(format!(
                        "variant mode needs one label per root: {} roots, {} labels",
                        self.roots.len(),
                        self.variants.len()
                    ));
                }
                if self.variants.iter().any(|v| v.trim().is_empty()) {
                    return Err("variant labels must not be empty".to_string());
                }
                if let Some(dup) = duplicate_label(&self.variants) {
                    return Err(format!("variant label '{dup}' is given for more than one root"));
                }
            }
        }

        match self.layout {
            LayoutKind::Paired | LayoutKind::SixPanel if self.right.is_empty() => {
                return Err(format!(
                    "{} layout requires at least one right-panel queue type",
                    self.layout
                ));
            }
            LayoutKind::SixPanel if self.mode != MergeMode::Variant => {
                return Err("six-panel layout requires variant mode".to_string());
            }
            _ => {}
        }

        if self.x_ticks.is_empty() {
            return Err("x_ticks must not be empty".to_string());
        }
        if self.x_ticks.windows(2).any(|w| w[0] >= w[1]) {
            return Err(format!("x_ticks must be strictly increasing: {:?}", self.x_ticks));
        }

        self.selection
            .validate()
            .map_err(|e| format!("selection: {e}"))?;

        if let Some(output) = &self.output {
            if output.file_name().is_none() {
                return Err(format!("output '{}' is not a file path", output.display()));
            }
        }

        Ok(())
    }

    /// Save configuration to TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    /// Load configuration from TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let request: RenderRequest = toml::from_str(&contents)?;
        request.validate()?;
        Ok(request)
    }

    /// Save configuration to JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let json_string = serde_json::to_string_pretty(self)?;
        fs::write(path, json_string)?;
        Ok(())
    }

    /// Load configuration from JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let request: RenderRequest = serde_json::from_str(&contents)?;
        request.validate()?;
        Ok(request)
    }
}

/// First label that occurs twice, compared after trimming.
fn duplicate_label(labels: &[String]) -> Option<&str> {
    labels.iter().enumerate().find_map(|(i, label)| {
        let label = label.trim();
        labels[..i]
            .iter()
            .any(|earlier| earlier.trim() == label)
            .then_some(label)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn six_panel() -> RenderRequest {
        RenderRequest::new(["a", "b", "c"])
            .with_mode(MergeMode::Variant)
            .with_variants(["0.5", "1", "2"])
            .with_layout(LayoutKind::SixPanel)
            .with_right(["lcrq_rust"])
            .with_filter(QueueFilter::new().with_highlight(["lcrq_rust"]))
            .with_output("out/six.svg")
    }

    #[test]
    fn test_default_request() {
        let request = RenderRequest::new(["results"]);
        assert!(request.validate().is_ok());
        assert_eq!(request.x_ticks, DEFAULT_X_TICKS.to_vec());
        assert_eq!(request.output_path(), PathBuf::from("thread_count_benchmark.svg"));
    }

    #[test]
    fn test_validation_errors() {
        assert!(RenderRequest::default().validate().is_err());

        let mismatched = RenderRequest::new(["a", "b"])
            .with_mode(MergeMode::Variant)
            .with_variants(["0.5"]);
        assert!(mismatched.validate().unwrap_err().contains("one label per root"));

        let no_right = RenderRequest::new(["a"]).with_layout(LayoutKind::Paired);
        assert!(no_right.validate().is_err());

        let flat_six = six_panel().with_mode(MergeMode::Flat);
        assert!(flat_six.validate().is_err());

        let ticks = RenderRequest::new(["a"]).with_x_ticks(vec![2, 2]);
        assert!(ticks.validate().is_err());

        let two_roots = RenderRequest::new(["a", "b"]).with_mode(MergeMode::Subfolder);
        assert!(two_roots.validate().is_err());
    }

    #[test]
    fn test_repeated_variant_label_rejected() {
        let repeated = RenderRequest::new(["tau_a", "tau_b"])
            .with_mode(MergeMode::Variant)
            .with_variants(["1", "1"]);
        let err = repeated.validate().unwrap_err();
        assert!(err.contains("'1'"), "{err}");

        let padded = RenderRequest::new(["a", "b", "c"])
            .with_mode(MergeMode::Variant)
            .with_variants(["0.5", "2", " 0.5 "]);
        assert!(padded.validate().is_err());

        let distinct = RenderRequest::new(["a", "b"])
            .with_mode(MergeMode::Variant)
            .with_variants(["1", "2"]);
        assert!(distinct.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("request.toml");

        let request = six_panel();
        request.save_toml(&path).unwrap();
        let loaded = RenderRequest::load_toml(&path).unwrap();
        assert_eq!(loaded, request);
    }

    #[test]
    fn test_json_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("request.json");

        let request = RenderRequest::new(["mem"])
            .with_metric(Metric::MemoryAllocated)
            .with_layout(LayoutKind::PeakMemory)
            .with_selection(FileSelection::default().with_name_prefix("mem"))
            .with_summary_csv("summary.csv");
        request.save_json(&path).unwrap();
        assert_eq!(RenderRequest::load_json(&path).unwrap(), request);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let request: RenderRequest = toml::from_str(
            r#"
            roots = ["results"]
            kind = "producers"
            layout = "four-metric"
            "#,
        )
        .unwrap();
        assert_eq!(request.kind, IndependentVariable::Producers);
        assert_eq!(request.layout, LayoutKind::FourMetric);
        assert_eq!(request.mode, MergeMode::Flat);
        assert_eq!(request.output_path(), PathBuf::from("mpsc_benchmark.svg"));
    }

    #[test]
    fn test_invalid_file_rejected_on_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.toml");
        fs::write(&path, "roots = []\n").unwrap();
        assert!(RenderRequest::load_toml(&path).is_err());
    }

    #[test]
    fn test_merge_mode_parse() {
        assert_eq!("tau".parse::<MergeMode>(), Ok(MergeMode::Variant));
        assert_eq!("Subfolder".parse::<MergeMode>(), Ok(MergeMode::Subfolder));
        assert!("nested".parse::<MergeMode>().is_err());
    }
}
