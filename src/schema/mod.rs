//! Result File Schema
//!
//! Column vocabulary for concurrent-queue benchmark CSV files.
//!
//! # Design Philosophy
//!
//! - **Exact**: Header names are matched case- and space-exact, never fuzzily
//! - **Typed**: Metrics and swept axes are enums, not free-form strings
//! - **Self-describing**: Each metric knows its header, axis label and scale
//!
//! # File shapes
//!
//! ```text
//! sweep:   Throughput,Enqueues,Dequeues,Consumers,Producers,Thread Count,
//!          Queuetype,Benchmark,Test ID,Fairness,Spread,Queue Size
//! memory:  Memory Allocated,Queuetype,Benchmark,Test ID,Iteration
//! bfs:     Milliseconds,Queuetype,Thread Count,Test ID
//! ```
//!
//! Columns not listed below (`Benchmark`, `Spread`, `Queue Size`,
//! `Iteration`) are ignored by the loader.
//!
//! # Example
//!
//! ```ignore
//! use queue_bench_viz::schema::{AxisScale, Field, IndependentVariable, Metric};
//!
//! assert_eq!(
//!     Field::from_column("Thread Count"),
//!     Some(Field::Independent(IndependentVariable::ThreadCount))
//! );
//! assert_eq!(Metric::Throughput.default_scale(), AxisScale::Log);
//! ```

mod fields;

pub use fields::{AxisScale, Field, IndependentVariable, Metric};

/// Queue implementation identifier column.
pub const QUEUE_TYPE: &str = "Queuetype";

/// Trial identifier column.
pub const TEST_ID: &str = "Test ID";

/// Total thread count column.
pub const THREAD_COUNT: &str = "Thread Count";

/// Producer count column.
pub const PRODUCERS: &str = "Producers";

/// Consumer count column.
pub const CONSUMERS: &str = "Consumers";

pub const THROUGHPUT: &str = "Throughput";
pub const FAIRNESS: &str = "Fairness";
pub const ENQUEUES: &str = "Enqueues";
pub const DEQUEUES: &str = "Dequeues";
pub const MEMORY_ALLOCATED: &str = "Memory Allocated";
pub const MILLISECONDS: &str = "Milliseconds";

/// Provenance columns added by the loader, written to summary files.
pub const SUBFOLDER_COLUMN: &str = "Subfolder";
pub const VARIANT_COLUMN: &str = "Variant";

/// Number of metric columns stored per record.
pub const METRIC_COUNT: usize = 6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_lookup_is_exact() {
        assert_eq!(Field::from_column("Queuetype"), Some(Field::QueueType));
        assert_eq!(
            Field::from_column("Thread Count"),
            Some(Field::Independent(IndependentVariable::ThreadCount))
        );
        assert_eq!(
            Field::from_column("Memory Allocated"),
            Some(Field::Metric(Metric::MemoryAllocated))
        );

        // Case and spacing matter
        assert_eq!(Field::from_column("queuetype"), None);
        assert_eq!(Field::from_column("ThreadCount"), None);
        assert_eq!(Field::from_column("Thread  Count"), None);
        assert_eq!(Field::from_column("Benchmark"), None);
    }

    #[test]
    fn test_every_field_round_trips_through_its_header() {
        for metric in Metric::all() {
            assert_eq!(
                Field::from_column(metric.column_name()),
                Some(Field::Metric(*metric))
            );
        }
        for var in IndependentVariable::all() {
            assert_eq!(
                Field::from_column(var.column_name()),
                Some(Field::Independent(*var))
            );
        }
    }

    #[test]
    fn test_axis_policy() {
        assert_eq!(Metric::Throughput.default_scale(), AxisScale::Log);
        assert_eq!(Metric::MemoryAllocated.default_scale(), AxisScale::Log);
        assert_eq!(Metric::Fairness.default_scale(), AxisScale::Linear);
        assert_eq!(Metric::Enqueues.default_scale(), AxisScale::Linear);
        assert!(Metric::MemoryAllocated.is_byte_valued());
        assert!(!Metric::Throughput.is_byte_valued());
    }

    #[test]
    fn test_metric_slots_are_distinct() {
        let mut slots: Vec<usize> = Metric::all().iter().map(|m| m.slot()).collect();
        slots.sort_unstable();
        slots.dedup();
        assert_eq!(slots.len(), METRIC_COUNT);
        assert!(slots.iter().all(|&s| s < METRIC_COUNT));
    }

    #[test]
    fn test_log_scale_rejects_non_positive() {
        assert!(AxisScale::Log.accepts(1.0));
        assert!(!AxisScale::Log.accepts(0.0));
        assert!(!AxisScale::Log.accepts(-3.0));
        assert!(AxisScale::Linear.accepts(0.0));
        assert!(!AxisScale::Linear.accepts(f64::NAN));
    }

    #[test]
    fn test_parse_kinds_and_metrics() {
        assert_eq!(
            "producers".parse::<IndependentVariable>(),
            Ok(IndependentVariable::Producers)
        );
        assert_eq!("memory".parse::<Metric>(), Ok(Metric::MemoryAllocated));
        assert!("latency".parse::<Metric>().is_err());
    }
}
