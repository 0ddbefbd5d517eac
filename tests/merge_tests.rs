//! Directory conventions, per-file diagnostics and aggregation over merged data.

use std::fs;
use std::path::{Path, PathBuf};

use queue_bench_viz::prelude::*;
use queue_bench_viz::{EmptyReason, KeyValue};
use tempfile::TempDir;

const HEADER: &str = "Queuetype,Thread Count,Throughput,Fairness";

fn write_csv(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    let mut content = format!("{HEADER}\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(&path, content).unwrap();
    path
}

// ============================================================================
// Flat mode
// ============================================================================

#[test]
fn test_merge_flat_union_in_file_order() {
    let temp = TempDir::new().unwrap();
    let a = write_csv(temp.path(), "a.csv", &["q1,2,100,0.5", "q2,2,200,0.6"]);
    let b = write_csv(temp.path(), "b.csv", &["q3,6,300,0.7"]);

    let report = DatasetMerger::new()
        .merge_flat(&[&a, &b])
        .unwrap()
        .into_report()
        .unwrap();

    assert_eq!(report.successful_count(), 2);
    let queues: Vec<&str> = report.dataset.iter().map(|r| r.queue_type.as_str()).collect();
    assert_eq!(queues, vec!["q1", "q2", "q3"]);
    assert_eq!(report.dataset.records()[2].source_file.as_deref(), Some(b.as_path()));
}

#[test]
fn test_merge_flat_empty_list() {
    let paths: [&str; 0] = [];
    let outcome = DatasetMerger::new().merge_flat(&paths).unwrap();
    assert!(matches!(outcome, MergeOutcome::Empty(EmptyReason::NoFiles)));
}

#[test]
fn test_broken_file_is_collected() {
    let temp = TempDir::new().unwrap();
    let good = write_csv(temp.path(), "good.csv", &["q1,2,100,0.5"]);
    let bad = temp.path().join("bad.csv");
    fs::write(&bad, "Queuetype,Thread Count,Throughput\nq1,2,fast\n").unwrap();
    let missing = temp.path().join("missing.csv");

    let report = DatasetMerger::new()
        .merge_flat(&[&good, &bad, &missing])
        .unwrap()
        .into_report()
        .unwrap();

    assert_eq!(report.successful_count(), 1);
    assert_eq!(report.failed_count(), 2);
    assert!(!report.all_successful());
    let failed: Vec<&Path> = report.iter_errors().map(|e| e.path.as_path()).collect();
    assert_eq!(failed, vec![bad.as_path(), missing.as_path()]);
    assert!(report.iter_errors().all(|e| e.error.is_file_local()));
}

#[test]
fn test_fail_fast_stops_at_first_error() {
    let temp = TempDir::new().unwrap();
    let bad = temp.path().join("bad.csv");
    fs::write(&bad, "Thread Count,Throughput\n2,100\n").unwrap();
    let good = write_csv(temp.path(), "good.csv", &["q1,2,100,0.5"]);

    let result = DatasetMerger::new()
        .with_error_mode(ErrorMode::FailFast)
        .merge_flat(&[&bad, &good]);

    match result {
        Err(PlotError::Schema { column, .. }) => assert_eq!(column, "Queuetype"),
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn test_required_column_enforced() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("producers.csv");
    fs::write(&path, "Queuetype,Producers,Throughput\nq1,2,100\n").unwrap();

    let report = DatasetMerger::new()
        .with_required(&[IndependentVariable::ThreadCount.into()])
        .merge_flat(&[&path])
        .unwrap()
        .into_report()
        .unwrap();

    assert!(report.dataset.is_empty());
    match &report.errors[0].error {
        PlotError::Schema { column, .. } => assert_eq!(column, "Thread Count"),
        other => panic!("expected schema error, got {other:?}"),
    }
}

// ============================================================================
// Subfolder mode
// ============================================================================

#[test]
fn test_subfolders_stay_separate() {
    let temp = TempDir::new().unwrap();
    write_csv(&temp.path().join("lockfree"), "run.csv", &["q1,2,100,0.5"]);
    write_csv(&temp.path().join("array"), "run.csv", &["q1,2,200,0.5"]);

    let report = DatasetMerger::new()
        .merge_by_subfolder(temp.path())
        .unwrap()
        .into_report()
        .unwrap();
    assert_eq!(report.dataset.len(), 2);

    let groups = Aggregator::for_chart(IndependentVariable::ThreadCount, false)
        .aggregate(&report.dataset);
    assert_eq!(groups.len(), 2);

    let throughput = |subfolder: &str| {
        groups
            .iter()
            .find(|g| g.subfolder() == Some(subfolder))
            .and_then(|g| g.metric(Metric::Throughput))
    };
    assert_eq!(throughput("lockfree"), Some(100.0));
    assert_eq!(throughput("array"), Some(200.0));
}

#[test]
fn test_no_subfolders_is_explicit_empty() {
    let temp = TempDir::new().unwrap();
    write_csv(temp.path(), "loose.csv", &["q1,2,100,0.5"]);

    let outcome = DatasetMerger::new().merge_by_subfolder(temp.path()).unwrap();
    assert!(outcome.is_empty());
    assert!(outcome.report().is_none());

    let err = outcome.into_report().unwrap_err();
    assert!(matches!(err, PlotError::NoData(_)));
    assert!(err.to_string().contains("no subfolders found"));
}

#[test]
fn test_missing_root_is_io_error() {
    let temp = TempDir::new().unwrap();
    let err = DatasetMerger::new()
        .merge_by_subfolder(temp.path().join("nope"))
        .unwrap_err();
    assert!(matches!(err, PlotError::Io { .. }));
}

#[test]
fn test_selection_skips_hidden_and_text_files() {
    let temp = TempDir::new().unwrap();
    let sub = temp.path().join("run1");
    write_csv(&sub, "data.csv", &["q1,2,100,0.5"]);
    write_csv(&sub, ".partial.csv", &["q9,2,1,0.1"]);
    fs::write(sub.join("notes.txt"), "free text").unwrap();
    write_csv(&temp.path().join(".cache"), "data.csv", &["q8,2,1,0.1"]);

    let report = DatasetMerger::new()
        .merge_by_subfolder(temp.path())
        .unwrap()
        .into_report()
        .unwrap();

    assert_eq!(report.successful_count(), 1);
    assert!(report.all_successful());
    assert_eq!(report.dataset.queue_types(), vec!["q1".to_string()]);
    assert_eq!(report.dataset.records()[0].subfolder.as_deref(), Some("run1"));
}

#[test]
fn test_name_prefix_selection() {
    let temp = TempDir::new().unwrap();
    let sub = temp.path().join("memory");
    write_csv(&sub, "mem_run.csv", &["q1,2,100,0.5"]);
    write_csv(&sub, "throughput_run.csv", &["q2,2,100,0.5"]);

    let report = DatasetMerger::new()
        .with_selection(FileSelection::default().with_name_prefix("mem"))
        .merge_by_subfolder(temp.path())
        .unwrap()
        .into_report()
        .unwrap();
    assert_eq!(report.dataset.queue_types(), vec!["q1".to_string()]);
}

#[test]
fn test_subfolders_without_usable_files() {
    let temp = TempDir::new().unwrap();
    let sub = temp.path().join("run1");
    fs::create_dir_all(&sub).unwrap();
    fs::write(sub.join("log.txt"), "nothing").unwrap();

    let outcome = DatasetMerger::new().merge_by_subfolder(temp.path()).unwrap();
    match outcome {
        MergeOutcome::Empty(EmptyReason::NoUsableFiles(root)) => assert_eq!(root, temp.path()),
        other => panic!("unexpected outcome {other:?}"),
    }
}

// ============================================================================
// Variant mode
// ============================================================================

#[test]
fn test_variant_labels_stamped_per_root() {
    let temp = TempDir::new().unwrap();
    let low = temp.path().join("tau_low");
    let high = temp.path().join("tau_high");
    write_csv(&low.join("run"), "a.csv", &["q1,2,100,0.5"]);
    write_csv(&high.join("run"), "a.csv", &["q1,2,300,0.5"]);

    let report = DatasetMerger::new()
        .merge_by_variant(&[&low, &high], &["0.5", "2"])
        .unwrap()
        .into_report()
        .unwrap();

    let variants: Vec<Option<&str>> = report.dataset.iter().map(|r| r.variant.as_deref()).collect();
    assert_eq!(variants, vec![Some("0.5"), Some("2")]);

    let groups = Aggregator::for_chart(IndependentVariable::ThreadCount, false)
        .aggregate(&report.dataset);
    assert_eq!(groups.len(), 2);
}

#[test]
fn test_variant_count_mismatch() {
    let err = DatasetMerger::new()
        .merge_by_variant(&["a", "b"], &["0.5"])
        .unwrap_err();
    assert!(matches!(err, PlotError::Configuration(_)));
}

#[test]
fn test_repeated_variant_label_is_configuration_error() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a");
    let b = temp.path().join("b");
    write_csv(&a.join("sub"), "run.csv", &["bbq,2,100,0.5"]);
    write_csv(&b.join("sub"), "run.csv", &["bbq,2,300,0.5"]);

    let err = DatasetMerger::new()
        .merge_by_variant(&[&a, &b], &["1", "1"])
        .unwrap_err();
    assert!(matches!(err, PlotError::Configuration(_)));
}

// ============================================================================
// Aggregation over merged files
// ============================================================================

#[test]
fn test_trials_across_files_are_averaged() {
    let temp = TempDir::new().unwrap();
    let a = write_csv(temp.path(), "a.csv", &["q1,2,0.1,0.5"]);
    let b = write_csv(temp.path(), "b.csv", &["q1,2,0.2,0.5"]);
    let c = write_csv(temp.path(), "c.csv", &["q1,2,0.4,0.5", "q1,6,9,0.5"]);

    let report = DatasetMerger::new()
        .merge_flat(&[&a, &b, &c])
        .unwrap()
        .into_report()
        .unwrap();
    let groups = Aggregator::for_chart(IndependentVariable::ThreadCount, false)
        .aggregate(&report.dataset);

    assert_eq!(groups.len(), 2);
    let first = &groups[0];
    assert_eq!(first.independent(IndependentVariable::ThreadCount), Some(2));
    assert_eq!(first.record_count(), 3);
    let mean = first.metric(Metric::Throughput).unwrap();
    assert!((mean - (0.1 + 0.2 + 0.4) / 3.0).abs() < 1e-9);

    // Single-member group passes values through unchanged
    assert_eq!(groups[1].metric(Metric::Throughput), Some(9.0));
    assert_eq!(groups[1].key()[0], KeyValue::Int(6));
}
