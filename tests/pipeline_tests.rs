//! End-to-end runs: request → merged data → figure on disk.

use std::fs;
use std::path::{Path, PathBuf};

use queue_bench_viz::prelude::*;
use queue_bench_viz::style::{Color, HIGHLIGHT_WIDTH, MUTED_ALPHA, MUTED_WIDTH, NORMAL_WIDTH};
use queue_bench_viz::PanelSelection;
use tempfile::TempDir;

const HEADER: &str = "Queuetype,Thread Count,Throughput,Fairness,Enqueues,Dequeues";

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

fn three_queues(dir: &Path) -> PathBuf {
    write_csv(
        dir,
        "run.csv",
        &[
            "seg_queue,2,1000,0.9,10,10",
            "lcrq_rust,2,5000,0.8,50,50",
            "bbq,2,2000,0.7,20,20",
            "seg_queue,6,1500,0.9,15,15",
            "lcrq_rust,6,7000,0.8,70,70",
            "bbq,6,2500,0.7,25,25",
        ],
    )
}

// ============================================================================
// Highlight mode
// ============================================================================

#[test]
fn test_highlighted_queue_drawn_on_top_in_full_colour() {
    let temp = TempDir::new().unwrap();
    let input = three_queues(temp.path());

    let request = RenderRequest::new([&input])
        .with_output(temp.path().join("highlight.svg"))
        .with_filter(QueueFilter::new().with_highlight(["lcrq_rust"]));
    let pipeline = Pipeline::new(request).unwrap();
    let summary = pipeline.run().unwrap();

    let series = summary.figure.panels[0].series();
    assert_eq!(series.len(), 3);
    // Muted series first, highlighted last
    assert_eq!(series[2].queue_type, "lcrq_rust");
    assert_eq!(series[2].label, "Rust LCRQ ★");
    assert_eq!(series[2].style.width, HIGHLIGHT_WIDTH);
    assert_ne!(series[2].style.color, Color::GRAY);

    for muted in &series[..2] {
        assert_eq!(muted.style.color, Color::GRAY);
        assert_eq!(muted.style.alpha, MUTED_ALPHA);
        assert_eq!(muted.style.width, MUTED_WIDTH);
        assert!(!muted.label.contains('★'));
    }

    let dataset = pipeline.load().unwrap().dataset;
    let registry = pipeline.registry(&dataset);
    assert_eq!(
        series[2].style.color,
        registry.style("lcrq_rust").unwrap().color
    );
}

#[test]
fn test_removing_queue_keeps_other_styles() {
    let temp = TempDir::new().unwrap();
    let with_y = three_queues(&temp.path().join("with"));
    let without_y = write_csv(
        &temp.path().join("without"),
        "run.csv",
        &["seg_queue,2,1000,0.9,10,10", "bbq,2,2000,0.7,20,20"],
    );

    let full = Pipeline::new(RenderRequest::new([&with_y])).unwrap();
    let reduced = Pipeline::new(RenderRequest::new([&without_y])).unwrap();
    let full_registry = full.registry(&full.load().unwrap().dataset);
    let reduced_registry = reduced.registry(&reduced.load().unwrap().dataset);

    for queue in ["seg_queue", "bbq"] {
        assert_eq!(full_registry.style(queue), reduced_registry.style(queue));
    }
    assert!(reduced_registry.style("lcrq_rust").is_none());
}

#[test]
fn test_normal_mode_uses_type_styles() {
    let temp = TempDir::new().unwrap();
    let input = three_queues(temp.path());

    let request = RenderRequest::new([&input]).with_output(temp.path().join("plain.svg"));
    let summary = Pipeline::new(request).unwrap().run().unwrap();

    let series = summary.figure.panels[0].series();
    assert!(series.iter().all(|s| s.style.width == NORMAL_WIDTH));
    assert!(series.iter().all(|s| s.style.color != Color::GRAY));
    // Points sorted by the swept variable
    assert!(series.iter().all(|s| s.points.windows(2).all(|w| w[0].0 < w[1].0)));
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn test_ignore_overrides_allow() {
    let temp = TempDir::new().unwrap();
    let input = write_csv(
        temp.path(),
        "run.csv",
        &["q1,2,100,0.5,1,1", "q2,2,200,0.5,1,1", "q3,2,300,0.5,1,1"],
    );

    let request = RenderRequest::new([&input])
        .with_output(temp.path().join("filtered.svg"))
        .with_filter(QueueFilter::new().with_allow(["q1", "q2"]).with_ignore(["q1"]));
    let summary = Pipeline::new(request).unwrap().run().unwrap();

    assert_eq!(summary.figure.rendered_queue_types(), vec!["q2"]);
    assert_eq!(summary.figure.legend.len(), 1);
}

// ============================================================================
// Failure handling
// ============================================================================

#[test]
fn test_no_subfolders_fails_without_output() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("results");
    write_csv(&root, "loose.csv", &["q1,2,100,0.5,1,1"]);
    let output = temp.path().join("out.svg");

    let request = RenderRequest::new([&root])
        .with_mode(MergeMode::Subfolder)
        .with_output(&output);
    let err = Pipeline::new(request).unwrap().run().unwrap_err();

    assert!(matches!(err, PlotError::NoData(_)));
    assert!(err.to_string().contains("no subfolders found"));
    assert!(!output.exists());
}

#[test]
fn test_invalid_root_fails_without_output() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("out.svg");

    let request = RenderRequest::new([temp.path().join("missing")])
        .with_mode(MergeMode::Subfolder)
        .with_output(&output);
    let err = Pipeline::new(request).unwrap().run().unwrap_err();

    assert!(matches!(err, PlotError::Io { .. }));
    assert!(!output.exists());
}

#[test]
fn test_failed_run_keeps_previous_output() {
    let temp = TempDir::new().unwrap();
    let input = three_queues(temp.path());
    let output = temp.path().join("chart.svg");

    let request = RenderRequest::new([&input]).with_output(&output);
    Pipeline::new(request.clone()).unwrap().run().unwrap();
    let before = fs::read_to_string(&output).unwrap();

    let failing = request.with_filter(QueueFilter::new().with_ignore(["seg_queue", "lcrq_rust", "bbq"]));
    assert!(Pipeline::new(failing).unwrap().run().is_err());
    assert_eq!(fs::read_to_string(&output).unwrap(), before);
}

#[test]
fn test_summary_failure_leaves_no_figure() {
    let temp = TempDir::new().unwrap();
    let input = three_queues(temp.path());
    let output = temp.path().join("chart.svg");
    // A directory cannot be opened for appending
    let summary_csv = temp.path().join("summary.csv");
    fs::create_dir(&summary_csv).unwrap();

    let request = RenderRequest::new([&input])
        .with_output(&output)
        .with_summary_csv(&summary_csv);
    let err = Pipeline::new(request).unwrap().run().unwrap_err();

    assert!(matches!(err, PlotError::Io { .. }));
    assert!(!output.exists());
}

#[test]
fn test_repeated_variant_label_rejected_before_loading() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a");
    let b = temp.path().join("b");
    write_csv(&a.join("sub"), "run.csv", &["bbq,2,100,0.5,1,1"]);
    write_csv(&b.join("sub"), "run.csv", &["bbq,2,300,0.5,1,1"]);

    let request = RenderRequest::new([&a, &b])
        .with_mode(MergeMode::Variant)
        .with_variants(["1", "1"])
        .with_output(temp.path().join("tau.svg"));
    let err = Pipeline::new(request).unwrap_err();
    assert!(matches!(err, PlotError::Configuration(_)));
}

// ============================================================================
// Layouts
// ============================================================================

#[test]
fn test_memory_against_thread_count() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("memory.csv");
    fs::write(
        &input,
        "Queuetype,Thread Count,Memory Allocated\nbbq,2,4096\nbbq,6,8192\nlcrq_rust,2,1024\nbbq,2,2048\n",
    )
    .unwrap();

    let request = RenderRequest::new([&input])
        .with_metric(Metric::MemoryAllocated)
        .with_output(temp.path().join("memory.svg"));
    let summary = Pipeline::new(request).unwrap().run().unwrap();

    assert_eq!(summary.figure.panels[0].scale, AxisScale::Log);
    assert_eq!(
        summary.figure.series_for("bbq")[0].points,
        vec![(2.0, 3072.0), (6.0, 8192.0)]
    );
    assert_eq!(summary.figure.series_for("lcrq_rust")[0].points, vec![(2.0, 1024.0)]);
}

#[test]
fn test_bfs_bars_per_dataset() {
    let temp = TempDir::new().unwrap();
    let youtube = temp.path().join("soc-youtube");
    let twitter = temp.path().join("soc-twitter-2010");
    fs::create_dir_all(&youtube).unwrap();
    fs::create_dir_all(&twitter).unwrap();
    fs::write(
        youtube.join("bfs1.csv"),
        "Queuetype,Milliseconds\nbbq,10\nbbq,20\nlcrq_rust,5\n",
    )
    .unwrap();
    fs::write(youtube.join("bfs2.csv"), "Queuetype,Milliseconds\nbbq,30\n").unwrap();
    fs::write(
        twitter.join("bfs.csv"),
        "Queuetype,Milliseconds\nbbq,400\nlcrq_rust,900\n",
    )
    .unwrap();

    let request = RenderRequest::new([temp.path()])
        .with_mode(MergeMode::Subfolder)
        .with_layout(LayoutKind::Bfs)
        .with_output(temp.path().join("bfs.svg"));
    let summary = Pipeline::new(request).unwrap().run().unwrap();

    let figure = &summary.figure;
    assert_eq!(figure.panels.len(), 2);
    let bars_of = |title: &str| -> Vec<(String, f64)> {
        figure
            .panels
            .iter()
            .find(|p| p.title.as_deref() == Some(title))
            .unwrap()
            .bars()
            .iter()
            .map(|b| (b.queue_type.clone(), b.value))
            .collect()
    };
    assert_eq!(
        bars_of("soc-youtube"),
        vec![("bbq".to_string(), 20.0), ("lcrq_rust".to_string(), 5.0)]
    );
    assert_eq!(
        bars_of("soc-twitter-2010"),
        vec![("lcrq_rust".to_string(), 900.0), ("bbq".to_string(), 400.0)]
    );
    assert!(summary.output.exists());
}

#[test]
fn test_subfolder_series_are_tagged() {
    let temp = TempDir::new().unwrap();
    write_csv(&temp.path().join("lockfree"), "run.csv", &["q1,2,100,0.5,1,1"]);
    write_csv(&temp.path().join("array"), "run.csv", &["q1,2,200,0.5,1,1"]);

    let request = RenderRequest::new([temp.path()])
        .with_mode(MergeMode::Subfolder)
        .with_output(temp.path().join("subfolders.svg"));
    let summary = Pipeline::new(request).unwrap().run().unwrap();

    let mut labels: Vec<(String, f64)> = summary
        .figure
        .series_for("q1")
        .iter()
        .map(|s| (s.label.clone(), s.points[0].1))
        .collect();
    labels.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        labels,
        vec![("q1 [array]".to_string(), 200.0), ("q1 [lockfree]".to_string(), 100.0)]
    );
}

#[test]
fn test_four_metric_layout() {
    let temp = TempDir::new().unwrap();
    let input = three_queues(temp.path());

    let request = RenderRequest::new([&input])
        .with_layout(LayoutKind::FourMetric)
        .with_output(temp.path().join("four.svg"));
    let summary = Pipeline::new(request).unwrap().run().unwrap();

    let figure = &summary.figure;
    assert_eq!((figure.rows, figure.cols), (2, 2));
    assert_eq!(figure.panels.len(), 4);
    assert!(figure.panels.iter().all(|p| p.series().len() == 3));
    // One legend entry per queue type even though each appears four times
    assert_eq!(figure.legend.len(), 3);
}

#[test]
fn test_six_panel_tau_comparison() {
    let temp = TempDir::new().unwrap();
    let mut roots = Vec::new();
    for (tau, scale) in [("0.5", 1.0), ("1", 2.0), ("2", 3.0)] {
        let root = temp.path().join(format!("tau_{tau}"));
        let rows = [
            format!("lcrq_rust,2,{},0.8,1,1", 1000.0 * scale),
            format!("bbq,2,{},0.7,1,1", 500.0 * scale),
        ];
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        write_csv(&root.join("run"), "a.csv", &rows);
        roots.push(root);
    }

    let request = RenderRequest::new(&roots)
        .with_mode(MergeMode::Variant)
        .with_variants(["0.5", "1", "2"])
        .with_layout(LayoutKind::SixPanel)
        .with_right(["lcrq_rust"])
        .with_filter(QueueFilter::new().with_highlight(["lcrq_rust"]))
        .with_output(temp.path().join("six.svg"));
    let summary = Pipeline::new(request).unwrap().run().unwrap();
    let figure = &summary.figure;

    assert_eq!(figure.panels.len(), 6);
    for panel in &figure.panels {
        if panel.col == 0 {
            assert!(panel.series().iter().all(|s| s.queue_type != "lcrq_rust"));
            assert!(panel.side_label.is_none());
        } else {
            assert!(panel.side_label.as_deref().unwrap().starts_with("τ = "));
            let top = panel.series().last().unwrap();
            assert_eq!(top.queue_type, "lcrq_rust");
            assert_eq!(top.style.color, Color::ORANGE);
        }
    }

    let labels: Vec<&str> = figure.legend.entries().iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["BBQ", "Rust LCRQ ★"]);

    // Shared vertical range across all panels
    let ranges: Vec<_> = figure.panels.iter().map(|p| p.y_range).collect();
    assert!(ranges.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_paired_layout_panels() {
    let temp = TempDir::new().unwrap();
    let input = three_queues(temp.path());

    let request = RenderRequest::new([&input])
        .with_layout(LayoutKind::Paired)
        .with_metric(Metric::Fairness)
        .with_right(["lcrq_rust"])
        .with_output(temp.path().join("paired.svg"));
    let pipeline = Pipeline::new(request).unwrap();
    let layout = pipeline.layout(&Dataset::new());
    assert_eq!(
        layout.panels[0].selection,
        PanelSelection::Excluding(vec!["lcrq_rust".to_string()])
    );

    let summary = pipeline.run().unwrap();
    assert_eq!(summary.figure.panels[0].series().len(), 2);
    assert_eq!(summary.figure.panels[1].series().len(), 3);
    assert_eq!(summary.figure.panels[1].scale, AxisScale::Linear);
}

#[test]
fn test_peak_memory_bars() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("memory");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("mem_run1.csv"),
        "Queuetype,Memory Allocated\nlcrq_rust,4096\nbbq,1024\nlcrq_rust,8192\n",
    )
    .unwrap();
    fs::write(dir.join("mem_run2.csv"), "Queuetype,Memory Allocated\nbbq,2048\n").unwrap();
    write_csv(&dir, "throughput.csv", &["seg_queue,2,1,1,1,1"]);

    let request = RenderRequest::new([&dir])
        .with_layout(LayoutKind::PeakMemory)
        .with_selection(FileSelection::default().with_name_prefix("mem"))
        .with_output(temp.path().join("peak.svg"));
    let summary = Pipeline::new(request).unwrap().run().unwrap();

    assert_eq!(summary.files_loaded, 2);
    let bars = summary.figure.panels[0].bars();
    let values: Vec<(&str, f64)> = bars.iter().map(|b| (b.queue_type.as_str(), b.value)).collect();
    assert_eq!(values, vec![("lcrq_rust", 8192.0), ("bbq", 2048.0)]);
    assert_eq!(summary.figure.panels[0].scale, AxisScale::Log);
}

// ============================================================================
// Configuration files
// ============================================================================

#[test]
fn test_saved_request_reproduces_figure() {
    let temp = TempDir::new().unwrap();
    let input = three_queues(temp.path());
    let config = temp.path().join("request.toml");

    let request = RenderRequest::new([&input])
        .with_layout(LayoutKind::Combined)
        .with_filter(QueueFilter::new().with_highlight(["bbq"]))
        .with_output(temp.path().join("combined.svg"));
    request.save_toml(&config).unwrap();

    let first = Pipeline::new(request).unwrap().run().unwrap();
    let loaded = RenderRequest::load_toml(&config).unwrap();
    let second = Pipeline::new(loaded).unwrap().run().unwrap();

    assert_eq!(first.figure, second.figure);
    assert!(second.output.exists());
}

#[test]
fn test_style_assignment_is_order_independent() {
    let mut forward = StyleRegistry::new();
    let mut backward = StyleRegistry::new();
    let a = forward.assign(["custom_b", "bbq", "custom_a", "lcrq_rust"]);
    let b = backward.assign(["lcrq_rust", "custom_a", "bbq", "custom_b"]);
    assert_eq!(a, b);
}
