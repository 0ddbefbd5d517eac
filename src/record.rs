//! Typed benchmark rows and the ordered dataset that holds them.
//!
//! A [`Record`] is one CSV row after type conversion. The loader fills the
//! measurement fields; the merger stamps the provenance tags (`subfolder`,
//! `variant`) afterwards, so a record always knows where it came from by the
//! time it reaches aggregation.

use std::path::{Path, PathBuf};

use crate::schema::{Field, IndependentVariable, Metric, METRIC_COUNT};

/// One measurement row.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Queue implementation identifier (required).
    pub queue_type: String,

    /// Total thread count, if the file carries it.
    pub thread_count: Option<i64>,

    /// Producer count, if the file carries it.
    pub producers: Option<i64>,

    /// Consumer count, if the file carries it.
    pub consumers: Option<i64>,

    /// Opaque trial identifier.
    pub test_id: Option<String>,

    metrics: [Option<f64>; METRIC_COUNT],

    /// Name of the immediate subdirectory the file was found under.
    pub subfolder: Option<String>,

    /// Experiment variant label (e.g. a tau value).
    pub variant: Option<String>,

    /// File the row was read from.
    pub source_file: Option<PathBuf>,
}

impl Record {
    /// Create a record with only its queue type set.
    pub fn new(queue_type: impl Into<String>) -> Self {
        Self {
            queue_type: queue_type.into(),
            thread_count: None,
            producers: None,
            consumers: None,
            test_id: None,
            metrics: [None; METRIC_COUNT],
            subfolder: None,
            variant: None,
            source_file: None,
        }
    }

    /// Set an independent variable.
    pub fn with_independent(mut self, var: IndependentVariable, value: i64) -> Self {
        self.set_independent(var, Some(value));
        self
    }

    /// Set a metric value.
    pub fn with_metric(mut self, metric: Metric, value: f64) -> Self {
        self.set_metric(metric, Some(value));
        self
    }

    /// Set the trial identifier.
    pub fn with_test_id(mut self, id: impl Into<String>) -> Self {
        self.test_id = Some(id.into());
        self
    }

    /// Set the subfolder tag.
    pub fn with_subfolder(mut self, subfolder: impl Into<String>) -> Self {
        self.subfolder = Some(subfolder.into());
        self
    }

    /// Set the variant tag.
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    /// Value of a metric, `None` when the cell was empty or the column absent.
    #[inline]
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.metrics[metric.slot()]
    }

    #[inline]
    pub fn set_metric(&mut self, metric: Metric, value: Option<f64>) {
        self.metrics[metric.slot()] = value;
    }

    /// Value of an independent variable.
    #[inline]
    pub fn independent(&self, var: IndependentVariable) -> Option<i64> {
        match var {
            IndependentVariable::ThreadCount => self.thread_count,
            IndependentVariable::Producers => self.producers,
            IndependentVariable::Consumers => self.consumers,
        }
    }

    pub fn set_independent(&mut self, var: IndependentVariable, value: Option<i64>) {
        match var {
            IndependentVariable::ThreadCount => self.thread_count = value,
            IndependentVariable::Producers => self.producers = value,
            IndependentVariable::Consumers => self.consumers = value,
        }
    }

    /// Whether the record carries a value for `field`.
    pub fn has(&self, field: Field) -> bool {
        match field {
            Field::QueueType => true,
            Field::TestId => self.test_id.is_some(),
            Field::Independent(var) => self.independent(var).is_some(),
            Field::Metric(metric) => self.metric(metric).is_some(),
        }
    }
}

/// An ordered collection of records.
///
/// Insertion order is preserved by every operation, which keeps grouping and
/// output deterministic when no explicit sort is requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing records without reordering them.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Append another dataset after the current records.
    pub fn append(&mut self, other: Dataset) {
        self.records.extend(other.records);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Stamp every record with a subfolder tag.
    pub fn stamp_subfolder(&mut self, subfolder: &str) {
        for record in &mut self.records {
            record.subfolder = Some(subfolder.to_string());
        }
    }

    /// Stamp every record with a variant tag.
    pub fn stamp_variant(&mut self, variant: &str) {
        for record in &mut self.records {
            record.variant = Some(variant.to_string());
        }
    }

    /// Stamp every record with the file it came from.
    pub fn stamp_source(&mut self, path: &Path) {
        for record in &mut self.records {
            record.source_file = Some(path.to_path_buf());
        }
    }

    /// Distinct queue types in first-encounter order.
    pub fn queue_types(&self) -> Vec<String> {
        let mut seen = ahash::AHashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.queue_type.as_str()))
            .map(|r| r.queue_type.clone())
            .collect()
    }

    /// Distinct subfolder tags in first-encounter order.
    pub fn subfolders(&self) -> Vec<String> {
        let mut seen = ahash::AHashSet::new();
        self.records
            .iter()
            .filter_map(|r| r.subfolder.as_deref())
            .filter(|s| seen.insert(*s))
            .map(str::to_string)
            .collect()
    }

    /// Whether any record has the given queue type.
    pub fn contains_queue(&self, queue_type: &str) -> bool {
        self.records.iter().any(|r| r.queue_type == queue_type)
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Dataset {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let record = Record::new("seg_queue")
            .with_independent(IndependentVariable::ThreadCount, 6)
            .with_metric(Metric::Throughput, 1.5e6)
            .with_test_id("3");

        assert_eq!(record.queue_type, "seg_queue");
        assert_eq!(record.thread_count, Some(6));
        assert_eq!(record.independent(IndependentVariable::Producers), None);
        assert_eq!(record.metric(Metric::Throughput), Some(1.5e6));
        assert_eq!(record.metric(Metric::Fairness), None);
        assert!(record.has(Field::TestId));
        assert!(!record.has(Field::Metric(Metric::Dequeues)));
    }

    #[test]
    fn test_stamping_preserves_order() {
        let mut dataset: Dataset = ["b", "a", "b", "c"].iter().map(|q| Record::new(*q)).collect();
        dataset.stamp_subfolder("lockfree");
        dataset.stamp_variant("tau_1");

        let order: Vec<_> = dataset.iter().map(|r| r.queue_type.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "b", "c"]);
        assert!(dataset
            .iter()
            .all(|r| r.subfolder.as_deref() == Some("lockfree")
                && r.variant.as_deref() == Some("tau_1")));
    }

    #[test]
    fn test_queue_types_first_encounter() {
        let dataset: Dataset = ["lcrq_rust", "bbq", "lcrq_rust", "array_queue"]
            .iter()
            .map(|q| Record::new(*q))
            .collect();
        assert_eq!(dataset.queue_types(), vec!["lcrq_rust", "bbq", "array_queue"]);
        assert!(dataset.contains_queue("bbq"));
        assert!(!dataset.contains_queue("ms_queue"));
    }

    #[test]
    fn test_append() {
        let mut first = Dataset::from_records(vec![Record::new("a")]);
        let second = Dataset::from_records(vec![Record::new("b"), Record::new("c")]);
        first.append(second);
        assert_eq!(first.len(), 3);
        assert_eq!(first.records()[2].queue_type, "c");
    }
}
