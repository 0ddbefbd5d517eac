//! Field definitions for benchmark result files.
//!
//! This module defines the typed vocabulary shared by every pipeline stage:
//! - `IndependentVariable`: the swept axis (thread, producer or consumer count)
//! - `Metric`: a measured numeric column
//! - `AxisScale`: how a metric is drawn on the vertical axis
//! - `Field`: any column the loader understands

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{
    CONSUMERS, DEQUEUES, ENQUEUES, FAIRNESS, MEMORY_ALLOCATED, MILLISECONDS, PRODUCERS,
    QUEUE_TYPE, TEST_ID, THREAD_COUNT, THROUGHPUT,
};

/// Vertical axis scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AxisScale {
    /// Values drawn as-is.
    Linear,
    /// Values drawn as `log10(v)`; non-positive values cannot be shown.
    Log,
}

impl AxisScale {
    /// Whether `value` can be placed on an axis of this scale.
    pub fn accepts(&self, value: f64) -> bool {
        match self {
            AxisScale::Linear => value.is_finite(),
            AxisScale::Log => value.is_finite() && value > 0.0,
        }
    }
}

/// The independent variable swept by a benchmark run.
///
/// Exactly one is active per chart; the others are carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndependentVariable {
    /// Total worker threads (producers + consumers).
    ThreadCount,
    /// Producer threads, consumers held fixed.
    Producers,
    /// Consumer threads, producers held fixed.
    Consumers,
}

impl IndependentVariable {
    /// All variables in standard order.
    pub fn all() -> &'static [IndependentVariable] {
        &[
            IndependentVariable::ThreadCount,
            IndependentVariable::Producers,
            IndependentVariable::Consumers,
        ]
    }

    /// Exact CSV header of this column.
    pub fn column_name(&self) -> &'static str {
        match self {
            IndependentVariable::ThreadCount => THREAD_COUNT,
            IndependentVariable::Producers => PRODUCERS,
            IndependentVariable::Consumers => CONSUMERS,
        }
    }

    /// Horizontal axis label.
    pub fn axis_label(&self) -> &'static str {
        match self {
            IndependentVariable::ThreadCount => "Thread Count",
            IndependentVariable::Producers => "Producer Count",
            IndependentVariable::Consumers => "Consumer Count",
        }
    }

    /// Identifier accepted on the command line and in config files.
    pub fn key(&self) -> &'static str {
        match self {
            IndependentVariable::ThreadCount => "thread-count",
            IndependentVariable::Producers => "producers",
            IndependentVariable::Consumers => "consumers",
        }
    }
}

impl fmt::Display for IndependentVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for IndependentVariable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "thread-count" | "threads" | "thread_count" => Ok(IndependentVariable::ThreadCount),
            "producers" | "producer" | "mpsc" => Ok(IndependentVariable::Producers),
            "consumers" | "consumer" | "spmc" => Ok(IndependentVariable::Consumers),
            other => Err(format!(
                "unknown chart kind '{other}' (expected thread-count, producers or consumers)"
            )),
        }
    }
}

/// A measured numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    /// Operations per second.
    Throughput,
    /// Balance of work between threads, bounded in `[0, 1]`.
    Fairness,
    /// Completed enqueue operations.
    Enqueues,
    /// Completed dequeue operations.
    Dequeues,
    /// Bytes allocated during a memory run.
    MemoryAllocated,
    /// Wall time of a BFS-style run.
    Milliseconds,
}

impl Metric {
    /// All metrics in standard order.
    pub fn all() -> &'static [Metric] {
        &[
            Metric::Throughput,
            Metric::Fairness,
            Metric::Enqueues,
            Metric::Dequeues,
            Metric::MemoryAllocated,
            Metric::Milliseconds,
        ]
    }

    /// Metrics averaged for thread/producer/consumer sweeps.
    pub fn sweep_metrics() -> &'static [Metric] {
        &[
            Metric::Throughput,
            Metric::Fairness,
            Metric::Enqueues,
            Metric::Dequeues,
        ]
    }

    /// Exact CSV header of this column.
    pub fn column_name(&self) -> &'static str {
        match self {
            Metric::Throughput => THROUGHPUT,
            Metric::Fairness => FAIRNESS,
            Metric::Enqueues => ENQUEUES,
            Metric::Dequeues => DEQUEUES,
            Metric::MemoryAllocated => MEMORY_ALLOCATED,
            Metric::Milliseconds => MILLISECONDS,
        }
    }

    /// Vertical axis label.
    pub fn display_name(&self) -> &'static str {
        match self {
            Metric::Throughput => "Throughput (ops/s)",
            Metric::Fairness => "Fairness",
            Metric::Enqueues => "Enqueues",
            Metric::Dequeues => "Dequeues",
            Metric::MemoryAllocated => "Memory Allocated (bytes)",
            Metric::Milliseconds => "Time (ms)",
        }
    }

    /// Whether values are byte counts.
    pub fn is_byte_valued(&self) -> bool {
        matches!(self, Metric::MemoryAllocated)
    }

    /// Scale used unless a panel overrides it.
    ///
    /// Throughput, byte-valued and timing metrics span orders of magnitude
    /// and are drawn logarithmically; the rest are linear.
    pub fn default_scale(&self) -> AxisScale {
        match self {
            Metric::Throughput | Metric::MemoryAllocated | Metric::Milliseconds => AxisScale::Log,
            Metric::Fairness | Metric::Enqueues | Metric::Dequeues => AxisScale::Linear,
        }
    }

    /// Position of this metric in per-record storage.
    pub(crate) fn slot(&self) -> usize {
        match self {
            Metric::Throughput => 0,
            Metric::Fairness => 1,
            Metric::Enqueues => 2,
            Metric::Dequeues => 3,
            Metric::MemoryAllocated => 4,
            Metric::Milliseconds => 5,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "throughput" => Ok(Metric::Throughput),
            "fairness" => Ok(Metric::Fairness),
            "enqueues" => Ok(Metric::Enqueues),
            "dequeues" => Ok(Metric::Dequeues),
            "memory" | "memory-allocated" | "memory allocated" => Ok(Metric::MemoryAllocated),
            "milliseconds" | "ms" => Ok(Metric::Milliseconds),
            other => Err(format!("unknown metric '{other}'")),
        }
    }
}

/// Any column understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    /// Queue implementation identifier.
    QueueType,
    /// Opaque trial identifier.
    TestId,
    /// A swept axis.
    Independent(IndependentVariable),
    /// A measured value.
    Metric(Metric),
}

impl Field {
    /// Exact CSV header of this column.
    pub fn column_name(&self) -> &'static str {
        match self {
            Field::QueueType => QUEUE_TYPE,
            Field::TestId => TEST_ID,
            Field::Independent(var) => var.column_name(),
            Field::Metric(metric) => metric.column_name(),
        }
    }

    /// Look up a header. Matching is case- and space-exact.
    pub fn from_column(name: &str) -> Option<Field> {
        if name == QUEUE_TYPE {
            return Some(Field::QueueType);
        }
        if name == TEST_ID {
            return Some(Field::TestId);
        }
        if let Some(var) = IndependentVariable::all()
            .iter()
            .find(|v| v.column_name() == name)
        {
            return Some(Field::Independent(*var));
        }
        Metric::all()
            .iter()
            .find(|m| m.column_name() == name)
            .map(|m| Field::Metric(*m))
    }
}

impl From<Metric> for Field {
    fn from(metric: Metric) -> Self {
        Field::Metric(metric)
    }
}

impl From<IndependentVariable> for Field {
    fn from(var: IndependentVariable) -> Self {
        Field::Independent(var)
    }
}
