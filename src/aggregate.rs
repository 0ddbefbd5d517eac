//! Aggregator: reduce repeated trials to one value per configuration key.
//!
//! Records are partitioned by an ordered tuple of [`KeyField`]s and each
//! requested metric is reduced within its partition.
//!
//! ```text
//! Dataset ──► key(record) = (Test ID?, x, Queuetype, Subfolder, Variant)
//!                 │
//!                 ▼
//!         AHashMap<key, group index>  ──►  Vec<Accumulator>  (first-encounter order)
//!                                              │
//!                                              ▼
//!                                     Vec<AggregatedGroup>
//! ```
//!
//! # Guarantees
//!
//! - Groups are emitted in the order their key is first seen, so output does
//!   not depend on hash iteration order.
//! - Every emitted group has at least one contributing record.
//! - A record missing a metric value does not contribute to that metric; a
//!   metric with no contributors in a group is `None`, never zero.
//! - Records only share a group if every key field matches, so identical
//!   queue types from different subfolders or variants stay apart.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::record::{Dataset, Record};
use crate::schema::{IndependentVariable, Metric, METRIC_COUNT};

/// A field a dataset can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyField {
    /// Trial identifier.
    TestId,
    /// A swept axis.
    Independent(IndependentVariable),
    /// Queue implementation.
    QueueType,
    /// Subfolder provenance tag.
    Subfolder,
    /// Variant provenance tag.
    Variant,
}

impl KeyField {
    /// Extract this field's value from a record.
    pub fn value_of(&self, record: &Record) -> KeyValue {
        match self {
            KeyField::TestId => KeyValue::from_text(record.test_id.as_deref()),
            KeyField::Independent(var) => record
                .independent(*var)
                .map(KeyValue::Int)
                .unwrap_or(KeyValue::Missing),
            KeyField::QueueType => KeyValue::Text(record.queue_type.clone()),
            KeyField::Subfolder => KeyValue::from_text(record.subfolder.as_deref()),
            KeyField::Variant => KeyValue::from_text(record.variant.as_deref()),
        }
    }
}

/// One component of a group key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyValue {
    /// The record had no value for the field.
    Missing,
    Int(i64),
    Text(String),
}

impl KeyValue {
    fn from_text(value: Option<&str>) -> Self {
        value
            .map(|s| KeyValue::Text(s.to_string()))
            .unwrap_or(KeyValue::Missing)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            KeyValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            KeyValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// How metric values within a group are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reduction {
    /// Arithmetic mean over contributing values.
    #[default]
    Mean,
    /// Largest contributing value (peak memory).
    Max,
}

/// A reduced metric and how many values went into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricValue {
    pub value: f64,
    pub count: usize,
}

/// One row of aggregated output.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedGroup {
    key: Vec<KeyValue>,
    queue_type: String,
    subfolder: Option<String>,
    variant: Option<String>,
    test_id: Option<String>,
    independents: [Option<i64>; 3],
    records: usize,
    metrics: [Option<MetricValue>; METRIC_COUNT],
}

impl AggregatedGroup {
    /// Key values in key-field order.
    pub fn key(&self) -> &[KeyValue] {
        &self.key
    }

    pub fn queue_type(&self) -> &str {
        &self.queue_type
    }

    pub fn subfolder(&self) -> Option<&str> {
        self.subfolder.as_deref()
    }

    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    pub fn test_id(&self) -> Option<&str> {
        self.test_id.as_deref()
    }

    /// Independent variable value of the group's first record.
    pub fn independent(&self, var: IndependentVariable) -> Option<i64> {
        self.independents[independent_slot(var)]
    }

    /// Number of records in the group (always at least one).
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Reduced value of a metric.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.metrics[metric.slot()].map(|m| m.value)
    }

    /// Number of values that contributed to a metric.
    pub fn contributors(&self, metric: Metric) -> usize {
        self.metrics[metric.slot()].map(|m| m.count).unwrap_or(0)
    }
}

fn independent_slot(var: IndependentVariable) -> usize {
    match var {
        IndependentVariable::ThreadCount => 0,
        IndependentVariable::Producers => 1,
        IndependentVariable::Consumers => 2,
    }
}

/// Running per-metric state for one group.
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    max: f64,
    count: usize,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        if self.count == 0 || value > self.max {
            self.max = value;
        }
        self.sum += value;
        self.count += 1;
    }

    fn finish(&self, reduction: Reduction) -> Option<MetricValue> {
        if self.count == 0 {
            return None;
        }
        let value = match reduction {
            Reduction::Mean => self.sum / self.count as f64,
            Reduction::Max => self.max,
        };
        Some(MetricValue {
            value,
            count: self.count,
        })
    }
}

struct GroupState {
    group: AggregatedGroup,
    accumulators: [Accumulator; METRIC_COUNT],
}

/// Groups a dataset by a key tuple and reduces metric columns.
#[derive(Debug, Clone)]
pub struct Aggregator {
    key_fields: Vec<KeyField>,
    metrics: Vec<Metric>,
    reduction: Reduction,
}

impl Aggregator {
    /// Mean-reducing aggregator over `metrics`, grouped by `key_fields`.
    pub fn new(key_fields: Vec<KeyField>, metrics: Vec<Metric>) -> Self {
        Self {
            key_fields,
            metrics,
            reduction: Reduction::Mean,
        }
    }

    /// Standard sweep aggregation for a chart over `x`.
    ///
    /// Key: `[Test ID (if per_trial), x, Queuetype, Subfolder, Variant]`.
    /// Every metric is averaged, so any column can be drawn against `x`.
    pub fn for_chart(x: IndependentVariable, per_trial: bool) -> Self {
        let mut key_fields = Vec::with_capacity(5);
        if per_trial {
            key_fields.push(KeyField::TestId);
        }
        key_fields.extend([
            KeyField::Independent(x),
            KeyField::QueueType,
            KeyField::Subfolder,
            KeyField::Variant,
        ]);
        Self::new(key_fields, Metric::all().to_vec())
    }

    /// Mean `Milliseconds` per queue type, kept apart per dataset when
    /// `dataset` names the provenance field that tells datasets apart.
    pub fn bfs(dataset: Option<KeyField>) -> Self {
        let key_fields = dataset
            .into_iter()
            .chain(std::iter::once(KeyField::QueueType))
            .collect();
        Self::new(key_fields, vec![Metric::Milliseconds])
    }

    /// Peak `Memory Allocated` per queue type.
    pub fn peak_memory() -> Self {
        Self::new(vec![KeyField::QueueType], vec![Metric::MemoryAllocated])
            .with_reduction(Reduction::Max)
    }

    pub fn with_reduction(mut self, reduction: Reduction) -> Self {
        self.reduction = reduction;
        self
    }

    pub fn key_fields(&self) -> &[KeyField] {
        &self.key_fields
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn reduction(&self) -> Reduction {
        self.reduction
    }

    /// Partition `dataset` and reduce each group.
    ///
    /// Fields outside the key (e.g. the queue type when it is not a key
    /// field) are taken from the group's first record.
    pub fn aggregate(&self, dataset: &Dataset) -> Vec<AggregatedGroup> {
        let mut index: AHashMap<Vec<KeyValue>, usize> = AHashMap::new();
        let mut states: Vec<GroupState> = Vec::new();

        for record in dataset {
            let key: Vec<KeyValue> = self.key_fields.iter().map(|f| f.value_of(record)).collect();

            let slot = match index.get(&key) {
                Some(&slot) => slot,
                None => {
                    let slot = states.len();
                    states.push(GroupState {
                        group: Self::seed(key.clone(), record),
                        accumulators: [Accumulator::default(); METRIC_COUNT],
                    });
                    index.insert(key, slot);
                    slot
                }
            };

            let state = &mut states[slot];
            state.group.records += 1;
            for metric in &self.metrics {
                if let Some(value) = record.metric(*metric) {
                    state.accumulators[metric.slot()].push(value);
                }
            }
        }

        states
            .into_iter()
            .map(|mut state| {
                for metric in &self.metrics {
                    state.group.metrics[metric.slot()] =
                        state.accumulators[metric.slot()].finish(self.reduction);
                }
                state.group
            })
            .collect()
    }

    fn seed(key: Vec<KeyValue>, record: &Record) -> AggregatedGroup {
        let mut independents = [None; 3];
        for var in IndependentVariable::all() {
            independents[independent_slot(*var)] = record.independent(*var);
        }
        AggregatedGroup {
            key,
            queue_type: record.queue_type.clone(),
            subfolder: record.subfolder.clone(),
            variant: record.variant.clone(),
            test_id: record.test_id.clone(),
            independents,
            records: 0,
            metrics: [None; METRIC_COUNT],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const X: IndependentVariable = IndependentVariable::ThreadCount;

    fn rec(queue: &str, x: i64, throughput: f64) -> Record {
        Record::new(queue)
            .with_independent(X, x)
            .with_metric(Metric::Throughput, throughput)
    }

    #[test]
    fn test_single_member_group_is_unchanged() {
        let record = rec("q1", 2, 123.456).with_metric(Metric::Fairness, 0.75);
        let dataset = Dataset::from_records(vec![record]);

        let groups = Aggregator::for_chart(X, false).aggregate(&dataset);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].metric(Metric::Throughput), Some(123.456));
        assert_eq!(groups[0].metric(Metric::Fairness), Some(0.75));
        assert_eq!(groups[0].record_count(), 1);
    }

    #[test]
    fn test_mean_over_group() {
        let values = [1.5, 2.25, 3.125, 10.0, 0.1];
        let dataset: Dataset = values.iter().map(|v| rec("q1", 6, *v)).collect();

        let groups = Aggregator::for_chart(X, false).aggregate(&dataset);
        assert_eq!(groups.len(), 1);
        let expected = values.iter().sum::<f64>() / values.len() as f64;
        let actual = groups[0].metric(Metric::Throughput).unwrap();
        assert!((actual - expected).abs() < 1e-9);
        assert_eq!(groups[0].contributors(Metric::Throughput), 5);
    }

    #[test]
    fn test_missing_values_do_not_count_as_zero() {
        let dataset = Dataset::from_records(vec![
            rec("q1", 2, 100.0),
            Record::new("q1").with_independent(X, 2),
            rec("q1", 2, 300.0),
        ]);

        let groups = Aggregator::for_chart(X, false).aggregate(&dataset);
        assert_eq!(groups[0].metric(Metric::Throughput), Some(200.0));
        assert_eq!(groups[0].contributors(Metric::Throughput), 2);
        assert_eq!(groups[0].record_count(), 3);
        // No record carried fairness
        assert_eq!(groups[0].metric(Metric::Fairness), None);
    }

    #[test]
    fn test_provenance_keeps_groups_apart() {
        let dataset = Dataset::from_records(vec![
            rec("q1", 2, 100.0).with_subfolder("lockfree"),
            rec("q1", 2, 200.0).with_subfolder("array"),
            rec("q1", 2, 300.0).with_subfolder("array").with_variant("tau 2"),
        ]);

        let groups = Aggregator::for_chart(X, false).aggregate(&dataset);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].subfolder(), Some("lockfree"));
        assert_eq!(groups[0].metric(Metric::Throughput), Some(100.0));
        assert_eq!(groups[1].subfolder(), Some("array"));
        assert_eq!(groups[1].metric(Metric::Throughput), Some(200.0));
        assert_eq!(groups[2].variant(), Some("tau 2"));
    }

    #[test]
    fn test_first_encounter_order() {
        let dataset = Dataset::from_records(vec![
            rec("zeta", 6, 1.0),
            rec("alpha", 2, 1.0),
            rec("zeta", 2, 1.0),
            rec("alpha", 2, 3.0),
        ]);

        let groups = Aggregator::for_chart(X, false).aggregate(&dataset);
        let keys: Vec<_> = groups
            .iter()
            .map(|g| (g.queue_type(), g.independent(X).unwrap()))
            .collect();
        assert_eq!(keys, vec![("zeta", 6), ("alpha", 2), ("zeta", 2)]);
        assert_eq!(groups[1].metric(Metric::Throughput), Some(2.0));
    }

    #[test]
    fn test_per_trial_key() {
        let dataset = Dataset::from_records(vec![
            rec("q1", 2, 10.0).with_test_id("0"),
            rec("q1", 2, 20.0).with_test_id("1"),
            rec("q1", 2, 30.0).with_test_id("0"),
        ]);

        let per_trial = Aggregator::for_chart(X, true).aggregate(&dataset);
        assert_eq!(per_trial.len(), 2);
        assert_eq!(per_trial[0].test_id(), Some("0"));
        assert_eq!(per_trial[0].metric(Metric::Throughput), Some(20.0));

        let pooled = Aggregator::for_chart(X, false).aggregate(&dataset);
        assert_eq!(pooled.len(), 1);
        assert_eq!(pooled[0].metric(Metric::Throughput), Some(20.0));
    }

    #[test]
    fn test_peak_memory_uses_max() {
        let dataset = Dataset::from_records(vec![
            Record::new("bbq").with_metric(Metric::MemoryAllocated, 4096.0),
            Record::new("bbq").with_metric(Metric::MemoryAllocated, 16384.0),
            Record::new("bbq").with_metric(Metric::MemoryAllocated, 8192.0),
            Record::new("ms_queue").with_metric(Metric::MemoryAllocated, 512.0),
        ]);

        let groups = Aggregator::peak_memory().aggregate(&dataset);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].metric(Metric::MemoryAllocated), Some(16384.0));
        assert_eq!(groups[1].metric(Metric::MemoryAllocated), Some(512.0));
    }

    #[test]
    fn test_chart_aggregation_covers_every_metric() {
        let dataset = Dataset::from_records(vec![
            Record::new("bbq")
                .with_independent(X, 2)
                .with_metric(Metric::MemoryAllocated, 4096.0),
            Record::new("bbq")
                .with_independent(X, 2)
                .with_metric(Metric::MemoryAllocated, 8192.0),
        ]);

        let groups = Aggregator::for_chart(X, false).aggregate(&dataset);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].metric(Metric::MemoryAllocated), Some(6144.0));
        assert_eq!(groups[0].metric(Metric::Throughput), None);
    }

    #[test]
    fn test_bfs_mean_per_dataset() {
        let ms = |queue: &str, folder: &str, value: f64| {
            Record::new(queue)
                .with_metric(Metric::Milliseconds, value)
                .with_subfolder(folder)
        };
        let dataset = Dataset::from_records(vec![
            ms("bbq", "soc-youtube", 10.0),
            ms("bbq", "soc-youtube", 20.0),
            ms("bbq", "soc-twitter-2010", 400.0),
            ms("lcrq_rust", "soc-youtube", 5.0),
        ]);

        let per_folder = Aggregator::bfs(Some(KeyField::Subfolder)).aggregate(&dataset);
        let rows: Vec<_> = per_folder
            .iter()
            .map(|g| (g.subfolder(), g.queue_type(), g.metric(Metric::Milliseconds)))
            .collect();
        assert_eq!(
            rows,
            vec![
                (Some("soc-youtube"), "bbq", Some(15.0)),
                (Some("soc-twitter-2010"), "bbq", Some(400.0)),
                (Some("soc-youtube"), "lcrq_rust", Some(5.0)),
            ]
        );

        let pooled = Aggregator::bfs(None).aggregate(&dataset);
        assert_eq!(pooled.len(), 2);
        assert!((pooled[0].metric(Metric::Milliseconds).unwrap() - 430.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_dataset_yields_no_groups() {
        let groups = Aggregator::for_chart(X, false).aggregate(&Dataset::new());
        assert!(groups.is_empty());
    }

    #[test]
    fn test_key_values() {
        let record = rec("q1", 2, 1.0).with_subfolder("array");
        assert_eq!(KeyField::QueueType.value_of(&record).as_text(), Some("q1"));
        assert_eq!(KeyField::Independent(X).value_of(&record).as_int(), Some(2));
        assert_eq!(KeyField::Variant.value_of(&record), KeyValue::Missing);
    }
}
