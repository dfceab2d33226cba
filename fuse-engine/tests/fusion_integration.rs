//! Integration tests for the read → fuse → write pipeline.
//!
//! Fixture runs live in `tests/fixtures/`; outputs go to temporary
//! directories and are compared line by line.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::{Path, PathBuf};

use fuse_engine::{
    fuse, fuse_files, read_run, write_to, FusionConfig, FusionError, FusionMethod, OutputFormat,
    Run,
};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_pair() -> Vec<Run> {
    vec![
        read_run(&fixture("run1.txt"), false).expect("run1"),
        read_run(&fixture("run2.txt"), false).expect("run2"),
    ]
}

fn fuse_to_lines(method: FusionMethod, tweak: impl FnOnce(&mut FusionConfig)) -> Vec<String> {
    let mut config = FusionConfig::with_method(method);
    config.run_tag = "test".into();
    tweak(&mut config);
    let fused = fuse(load_pair(), &config).expect("fuse");
    let mut buf = Vec::new();
    write_to(&mut buf, &config.run_tag, &fused, OutputFormat::Trec).expect("write");
    String::from_utf8(buf)
        .expect("utf8")
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn average_fusion_matches_expected_output() {
    let lines = fuse_to_lines(FusionMethod::Average, |_| {});
    assert_eq!(
        lines,
        vec![
            "query1 Q0 doc1 1 5.500000 test",
            "query1 Q0 doc2 2 5.500000 test",
            "query1 Q0 doc3 3 2.500000 test",
            "query1 Q0 doc4 4 1.500000 test",
            "query2 Q0 doc1 1 7.000000 test",
            "query2 Q0 doc2 2 6.500000 test",
            "query2 Q0 doc3 3 6.000000 test",
        ]
    );
}

#[test]
fn weighted_and_interpolation_agree() {
    let weighted = fuse_to_lines(FusionMethod::Weighted { weights: vec![0.7, 0.3] }, |_| {});
    let interpolated = fuse_to_lines(FusionMethod::Interpolation { alpha: 0.7 }, |_| {});
    assert_eq!(weighted, interpolated);
    assert_eq!(
        &weighted[..4],
        &[
            "query1 Q0 doc1 1 6.100000 test",
            "query1 Q0 doc2 2 5.700000 test",
            "query1 Q0 doc3 3 3.500000 test",
            "query1 Q0 doc4 4 0.900000 test",
        ]
    );
}

#[test]
fn rrf_fusion_matches_expected_output() {
    let lines = fuse_to_lines(FusionMethod::Rrf { k: 60.0 }, |_| {});
    assert_eq!(
        lines,
        vec![
            "query1 Q0 doc1 1 0.032522 test",
            "query1 Q0 doc2 2 0.032522 test",
            "query1 Q0 doc3 3 0.015873 test",
            "query1 Q0 doc4 4 0.015873 test",
            "query2 Q0 doc1 1 0.016393 test",
            "query2 Q0 doc2 2 0.016129 test",
            "query2 Q0 doc3 3 0.015873 test",
        ]
    );
}

#[test]
fn rrf_ignores_min_max_normalization() {
    let plain = fuse_to_lines(FusionMethod::Rrf { k: 60.0 }, |_| {});
    let normalized = fuse_to_lines(FusionMethod::Rrf { k: 60.0 }, |c| {
        c.min_max_normalization = true;
    });
    assert_eq!(plain, normalized);
}

#[test]
fn normalized_average() {
    let lines = fuse_to_lines(FusionMethod::Average, |c| c.min_max_normalization = true);
    assert_eq!(
        lines,
        vec![
            "query1 Q0 doc1 1 0.750000 test",
            "query1 Q0 doc2 2 0.750000 test",
            "query1 Q0 doc3 3 0.000000 test",
            "query1 Q0 doc4 4 0.000000 test",
            "query2 Q0 doc1 1 0.500000 test",
            "query2 Q0 doc2 2 0.250000 test",
            "query2 Q0 doc3 3 0.000000 test",
        ]
    );
}

#[test]
fn normalized_zero_scores_with_negative_weight_tie_by_docid() {
    // Normalization maps each topic's lowest score to 0.0; a negative weight
    // turns that into -0.0, which must still tie with +0.0.
    let lines = fuse_to_lines(FusionMethod::Weighted { weights: vec![-1.0, 1.0] }, |c| {
        c.min_max_normalization = true;
    });
    assert_eq!(
        lines,
        vec![
            "query1 Q0 doc2 1 0.500000 test",
            "query1 Q0 doc3 2 0.000000 test",
            "query1 Q0 doc4 3 0.000000 test",
            "query1 Q0 doc1 4 -0.500000 test",
            "query2 Q0 doc3 1 0.000000 test",
            "query2 Q0 doc2 2 -0.500000 test",
            "query2 Q0 doc1 3 -1.000000 test",
        ]
    );
}

#[test]
fn depth_excludes_lower_ranked_entries() {
    let lines = fuse_to_lines(FusionMethod::Rrf { k: 60.0 }, |c| c.depth = 1);
    assert_eq!(
        lines,
        vec![
            "query1 Q0 doc1 1 0.016393 test",
            "query1 Q0 doc2 2 0.016393 test",
            "query2 Q0 doc1 1 0.016393 test",
        ]
    );
}

#[test]
fn k_limits_documents_per_topic() {
    let lines = fuse_to_lines(FusionMethod::Average, |c| c.k = 1);
    assert_eq!(
        lines,
        vec![
            "query1 Q0 doc1 1 5.500000 test",
            "query2 Q0 doc1 1 7.000000 test",
        ]
    );
}

#[test]
fn fused_file_can_be_fused_again() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first = dir.path().join("first.txt");
    let config = FusionConfig::with_method(FusionMethod::Average);
    fuse_files(
        &[fixture("run1.txt"), fixture("run2.txt")],
        &first,
        &config,
        false,
        OutputFormat::Trec,
    )
    .expect("first fusion");

    let reread = read_run(&first, false).expect("fused output parses as a run");
    assert_eq!(reread.len(), 7);
    assert_eq!(reread.topic_count(), 2);

    let second = dir.path().join("second.txt");
    let fused = fuse_files(
        &[first, fixture("run1.txt")],
        &second,
        &config,
        false,
        OutputFormat::Trec,
    )
    .expect("second fusion");
    // doc1/query1: (5.5 + 7) / 2
    let top = &fused.topic("query1").expect("query1").docs[0];
    assert_eq!(top.docid, "doc1");
    assert!((top.score - 6.25).abs() < 1e-12);
}

#[test]
fn msmarco_output_from_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("fused.tsv");
    fuse_files(
        &[fixture("run1.txt"), fixture("run2.txt")],
        &out,
        &FusionConfig::with_method(FusionMethod::Average),
        false,
        OutputFormat::MsMarco,
    )
    .expect("fuse");
    let text = std::fs::read_to_string(&out).expect("read output");
    assert_eq!(text.lines().next(), Some("query1\tdoc1\t1"));
    assert_eq!(text.lines().count(), 7);
}

#[test]
fn malformed_run_reports_line() {
    let err = read_run(&fixture("malformed.txt"), false).unwrap_err();
    match err {
        FusionError::Parse { line, ref message, .. } => {
            assert_eq!(line, 2);
            assert!(message.contains("invalid rank"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn failed_fusion_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("fused.txt");
    let err = fuse_files(
        &[fixture("run1.txt"), fixture("malformed.txt")],
        &out,
        &FusionConfig::default(),
        false,
        OutputFormat::Trec,
    )
    .unwrap_err();
    assert!(matches!(err, FusionError::Parse { .. }));
    assert!(!out.exists());
}

#[test]
fn interpolation_over_three_runs_rejected_before_reading() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = fuse_files(
        &[
            fixture("run1.txt"),
            fixture("run2.txt"),
            dir.path().join("missing.txt"),
        ],
        &dir.path().join("out.txt"),
        &FusionConfig::with_method(FusionMethod::Interpolation { alpha: 0.5 }),
        false,
        OutputFormat::Trec,
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Interpolation requires exactly 2 runs");
}
