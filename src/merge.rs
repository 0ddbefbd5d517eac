//! DatasetMerger: discover result files, load them, tag their provenance.
//!
//! Three directory conventions are understood:
//!
//! ```text
//! flat                 subfolder                  variant
//! ────                 ─────────                  ───────
//! root/                root/                      tau_1/          tau_2/
//!   run_a.csv            lockfree/                  lockfree/       lockfree/
//!   run_b.csv              2024/run.csv               ...             ...
//!                        array/                     array/          array/
//!                          run.csv                    ...             ...
//!                        notes.txt  (ignored)
//! ```
//!
//! - **Flat**: a list of files, concatenated in the given order.
//! - **Subfolder**: each immediate subdirectory is walked recursively and its
//!   records are stamped with `subfolder = <directory name>`.
//! - **Variant**: several subfolder-mode roots, each stamped with a variant
//!   label (one label per root).
//!
//! # Error handling
//!
//! Per-file failures are recorded as [`FileError`] diagnostics and the merge
//! moves on ([`ErrorMode::CollectErrors`], the default). With
//! [`ErrorMode::FailFast`] the first failure is returned instead.
//!
//! Input that is structurally empty (no subdirectories, no candidate files)
//! is reported as [`MergeOutcome::Empty`] rather than an error, so callers can
//! tell "ran on empty input" apart from "crashed".
//!
//! # Example
//!
//! ```ignore
//! use queue_bench_viz::merge::{DatasetMerger, MergeOutcome};
//!
//! let merger = DatasetMerger::new();
//! match merger.merge_by_subfolder("results/")? {
//!     MergeOutcome::Loaded(report) => {
//!         println!("{} records from {} files", report.dataset.len(), report.files_loaded);
//!     }
//!     MergeOutcome::Empty(reason) => eprintln!("{reason}"),
//! }
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{PlotError, Result};
use crate::record::Dataset;
use crate::schema::Field;
use crate::source::RecordSource;

// ============================================================================
// Configuration
// ============================================================================

/// Error handling mode for per-file failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorMode {
    /// Stop at the first file that fails to load.
    FailFast,

    /// Record the failure and continue with the remaining files (default).
    #[default]
    CollectErrors,
}

/// Rule deciding which discovered files are loaded.
///
/// Hidden files and directories (leading `.`) are never loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSelection {
    /// Extensions (without the dot, case-insensitive) that are skipped.
    pub exclude_extensions: Vec<String>,

    /// If set, only files whose name starts with this prefix are loaded
    /// (e.g. `"mem"` for memory measurement files).
    pub name_prefix: Option<String>,
}

impl Default for FileSelection {
    fn default() -> Self {
        Self {
            exclude_extensions: vec!["txt".to_string()],
            name_prefix: None,
        }
    }
}

impl FileSelection {
    /// Accept every non-hidden file.
    pub fn all() -> Self {
        Self {
            exclude_extensions: Vec::new(),
            name_prefix: None,
        }
    }

    /// Only load files whose name starts with `prefix`.
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = Some(prefix.into());
        self
    }

    /// Additionally skip files with extension `ext`.
    pub fn excluding_extension(mut self, ext: impl Into<String>) -> Self {
        self.exclude_extensions.push(ext.into());
        self
    }

    /// Whether `path` passes the rule.
    pub fn accepts(&self, path: &Path) -> bool {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };
        if is_hidden(name) {
            return false;
        }
        if let Some(prefix) = &self.name_prefix {
            if !name.starts_with(prefix.as_str()) {
                return false;
            }
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => !self
                .exclude_extensions
                .iter()
                .any(|x| x.trim_start_matches('.').eq_ignore_ascii_case(ext)),
            None => true,
        }
    }

    /// Validate the rule.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(prefix) = &self.name_prefix {
            if prefix.is_empty() {
                return Err("name_prefix must not be empty when set".to_string());
            }
            if prefix.contains(std::path::MAIN_SEPARATOR) || prefix.contains('/') {
                return Err(format!("name_prefix '{prefix}' must not contain a path separator"));
            }
        }
        Ok(())
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

// ============================================================================
// Results
// ============================================================================

/// A file that could not be loaded.
#[derive(Debug)]
pub struct FileError {
    /// File path that failed.
    pub path: PathBuf,

    /// Why it failed.
    pub error: PlotError,
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

/// Merged records plus per-file diagnostics.
#[derive(Debug, Default)]
pub struct MergeReport {
    /// All successfully parsed records.
    pub dataset: Dataset,

    /// Files that were skipped.
    pub errors: Vec<FileError>,

    /// Number of files loaded successfully.
    pub files_loaded: usize,

    /// Subfolders in which no file passed the selection rule.
    pub empty_subfolders: Vec<PathBuf>,
}

impl MergeReport {
    /// Get count of successfully loaded files.
    pub fn successful_count(&self) -> usize {
        self.files_loaded
    }

    /// Get count of failed files.
    pub fn failed_count(&self) -> usize {
        self.errors.len()
    }

    /// Check if every discovered file loaded.
    pub fn all_successful(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate over errors.
    pub fn iter_errors(&self) -> impl Iterator<Item = &FileError> {
        self.errors.iter()
    }

    /// Append another report's records and diagnostics.
    pub fn absorb(&mut self, other: MergeReport) {
        self.dataset.append(other.dataset);
        self.errors.extend(other.errors);
        self.files_loaded += other.files_loaded;
        self.empty_subfolders.extend(other.empty_subfolders);
    }
}

/// Why a merge had nothing to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    /// The root contains no subdirectories.
    NoSubfolders(PathBuf),

    /// Subdirectories exist but none holds a file passing the selection rule.
    NoUsableFiles(PathBuf),

    /// No files were given or found.
    NoFiles,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyReason::NoSubfolders(root) => {
                write!(f, "no subfolders found in: {}", root.display())
            }
            EmptyReason::NoUsableFiles(root) => {
                write!(f, "no usable files found under: {}", root.display())
            }
            EmptyReason::NoFiles => write!(f, "no input files"),
        }
    }
}

/// Result of a merge that did not fail outright.
#[derive(Debug)]
pub enum MergeOutcome {
    /// At least one candidate file was found.
    Loaded(MergeReport),

    /// Nothing to load.
    Empty(EmptyReason),
}

impl MergeOutcome {
    /// Whether nothing was found to load.
    pub fn is_empty(&self) -> bool {
        matches!(self, MergeOutcome::Empty(_))
    }

    /// Get the report, if any.
    pub fn report(&self) -> Option<&MergeReport> {
        match self {
            MergeOutcome::Loaded(report) => Some(report),
            MergeOutcome::Empty(_) => None,
        }
    }

    /// Convert an empty outcome into [`PlotError::NoData`].
    pub fn into_report(self) -> Result<MergeReport> {
        match self {
            MergeOutcome::Loaded(report) => Ok(report),
            MergeOutcome::Empty(reason) => Err(PlotError::NoData(reason.to_string())),
        }
    }
}

// ============================================================================
// Merger
// ============================================================================

/// Loads and concatenates result files according to a directory convention.
#[derive(Debug, Clone, Default)]
pub struct DatasetMerger {
    selection: FileSelection,
    error_mode: ErrorMode,
    required: Vec<Field>,
}

impl DatasetMerger {
    /// Merger with the default selection rule, collecting per-file errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the file selection rule.
    pub fn with_selection(mut self, selection: FileSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Set the error handling mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Columns every file must carry; files lacking one are skipped with a
    /// schema diagnostic.
    pub fn with_required(mut self, fields: &[Field]) -> Self {
        self.required = fields.to_vec();
        self
    }

    pub fn selection(&self) -> &FileSelection {
        &self.selection
    }

    /// Load `paths` in order and concatenate their records.
    ///
    /// The selection rule is not applied: every listed file is attempted.
    /// Returns [`EmptyReason::NoFiles`] for an empty list.
    pub fn merge_flat<P: AsRef<Path>>(&self, paths: &[P]) -> Result<MergeOutcome> {
        if paths.is_empty() {
            return Ok(MergeOutcome::Empty(EmptyReason::NoFiles));
        }

        let mut report = MergeReport::default();
        for path in paths {
            self.load_into(path.as_ref(), None, &mut report)?;
        }

        log_summary("flat", &report);
        Ok(MergeOutcome::Loaded(report))
    }

    /// Flat mode on a directory: every selected file directly inside `root`,
    /// or anywhere below it when `recursive` is set, in file-name order.
    pub fn merge_directory_flat(
        &self,
        root: impl AsRef<Path>,
        recursive: bool,
    ) -> Result<MergeOutcome> {
        let root = root.as_ref();
        ensure_dir(root)?;

        let mut report = MergeReport::default();
        let files = self.collect_files(root, recursive, &mut report)?;
        if files.is_empty() && report.errors.is_empty() {
            return Ok(MergeOutcome::Empty(EmptyReason::NoFiles));
        }

        for file in &files {
            self.load_into(file, None, &mut report)?;
        }

        log_summary("directory", &report);
        Ok(MergeOutcome::Loaded(report))
    }

    /// Subfolder mode: walk each immediate subdirectory of `root` and stamp
    /// its records with the subdirectory name.
    pub fn merge_by_subfolder(&self, root: impl AsRef<Path>) -> Result<MergeOutcome> {
        let root = root.as_ref();
        ensure_dir(root)?;

        let subfolders = immediate_subdirectories(root)?;
        if subfolders.is_empty() {
            warn!("No subfolders found in: {}", root.display());
            return Ok(MergeOutcome::Empty(EmptyReason::NoSubfolders(
                root.to_path_buf(),
            )));
        }

        let mut report = MergeReport::default();
        let mut candidates = 0usize;
        for (name, dir) in &subfolders {
            let files = self.collect_files(dir, true, &mut report)?;
            if files.is_empty() {
                warn!("No usable files in subfolder: {}", dir.display());
                report.empty_subfolders.push(dir.clone());
                continue;
            }
            candidates += files.len();
            for file in &files {
                self.load_into(file, Some(name), &mut report)?;
            }
        }

        if candidates == 0 && report.errors.is_empty() {
            return Ok(MergeOutcome::Empty(EmptyReason::NoUsableFiles(
                root.to_path_buf(),
            )));
        }

        log_summary(&root.display().to_string(), &report);
        Ok(MergeOutcome::Loaded(report))
    }

    /// Variant mode: subfolder mode per root, stamping `labels[i]` on the
    /// records of `roots[i]`.
    ///
    /// Fails with [`PlotError::Configuration`] if the counts differ. Roots
    /// that turn out empty are skipped with a warning; the outcome is only
    /// empty if every root is.
    pub fn merge_by_variant<P: AsRef<Path>, S: AsRef<str>>(
        &self,
        roots: &[P],
        labels: &[S],
    ) -> Result<MergeOutcome> {
        if roots.len() != labels.len() {
            return Err(PlotError::Configuration(format!(
                "{} variant roots but {} variant labels",
                roots.len(),
                labels.len()
            )));
        }
        if let Some(i) = (1..labels.len())
            .find(|&i| labels[..i].iter().any(|l| l.as_ref() == labels[i].as_ref()))
        {
            return Err(PlotError::Configuration(format!(
                "variant label '{}' is given for more than one root",
                labels[i].as_ref()
            )));
        }
        if roots.is_empty() {
            return Ok(MergeOutcome::Empty(EmptyReason::NoFiles));
        }

        let mut merged: Option<MergeReport> = None;
        let mut first_empty: Option<EmptyReason> = None;

        for (root, label) in roots.iter().zip(labels) {
            let label = label.as_ref();
            match self.merge_by_subfolder(root)? {
                MergeOutcome::Loaded(mut report) => {
                    report.dataset.stamp_variant(label);
                    info!(
                        "Variant '{}': {} records from {}",
                        label,
                        report.dataset.len(),
                        root.as_ref().display()
                    );
                    merged.get_or_insert_with(MergeReport::default).absorb(report);
                }
                MergeOutcome::Empty(reason) => {
                    warn!("Variant '{}' has no data: {}", label, reason);
                    first_empty.get_or_insert(reason);
                }
            }
        }

        Ok(match (merged, first_empty) {
            (Some(report), _) => MergeOutcome::Loaded(report),
            (None, Some(reason)) => MergeOutcome::Empty(reason),
            (None, None) => MergeOutcome::Empty(EmptyReason::NoFiles),
        })
    }

    /// Load one file into `report`, honouring the error mode.
    fn load_into(
        &self,
        path: &Path,
        subfolder: Option<&str>,
        report: &mut MergeReport,
    ) -> Result<()> {
        match RecordSource::require(path, &self.required) {
            Ok(mut dataset) => {
                if let Some(name) = subfolder {
                    dataset.stamp_subfolder(name);
                }
                report.files_loaded += 1;
                report.dataset.append(dataset);
                Ok(())
            }
            Err(error) => self.record_error(path, error, report),
        }
    }

    fn record_error(&self, path: &Path, error: PlotError, report: &mut MergeReport) -> Result<()> {
        if self.error_mode == ErrorMode::FailFast {
            return Err(error);
        }
        warn!("Skipping {}: {}", path.display(), error);
        report.errors.push(FileError {
            path: path.to_path_buf(),
            error,
        });
        Ok(())
    }

    /// Selected files under `dir`, sorted by path.
    fn collect_files(
        &self,
        dir: &Path,
        recursive: bool,
        report: &mut MergeReport,
    ) -> Result<Vec<PathBuf>> {
        let max_depth = if recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || e.file_name()
                        .to_str()
                        .map(|name| !is_hidden(name))
                        .unwrap_or(false)
            });

        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.selection.accepts(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(err) => {
                    let path = err.path().unwrap_or(dir).to_path_buf();
                    let io = err
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                    self.record_error(&path, PlotError::io(&path, io), report)?;
                }
            }
        }

        debug!("{} candidate files under {}", files.len(), dir.display());
        Ok(files)
    }
}

fn ensure_dir(root: &Path) -> Result<()> {
    let meta = fs::metadata(root).map_err(|e| PlotError::io(root, e))?;
    if meta.is_dir() {
        Ok(())
    } else {
        Err(PlotError::io(
            root,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
        ))
    }
}

/// Non-hidden immediate subdirectories of `root` as `(name, path)`, sorted by name.
fn immediate_subdirectories(root: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(root).map_err(|e| PlotError::io(root, e))?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PlotError::io(root, e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_hidden(&name) {
            continue;
        }
        dirs.push((name, path));
    }

    dirs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(dirs)
}

fn log_summary(scope: &str, report: &MergeReport) {
    info!(
        "Merged {} records from {} files in {} ({} skipped)",
        report.dataset.len(),
        report.files_loaded,
        scope,
        report.failed_count()
    );
}

// ============================================================================
// Tests
// ============================================================================
