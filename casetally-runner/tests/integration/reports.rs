// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::run_fixture;
use camino_tempfile::tempdir;
use casetally_runner::reporter::{
    JunitConfig, ReporterBuilder, ReporterStderr, RunStats, StructuredReporter,
};
use pretty_assertions::assert_eq;
use serde_json::Value;

#[tokio::test]
async fn calculator_reports() {
    let dir = tempdir().expect("create temp dir");
    let attachments_dir = dir.path().join("attachments");
    std::fs::create_dir(&attachments_dir).expect("create attachments dir");
    let junit_path = dir.path().join("reports/junit.xml");

    let mut stderr = Vec::new();
    let mut json = Vec::new();
    let reporter = ReporterBuilder::default().set_verbose(true).build(
        ReporterStderr::Buffer(&mut stderr),
        StructuredReporter::JsonLines(Box::new(&mut json)),
        Some(JunitConfig::new(&junit_path, Some("Cucumber tests"))),
    );
    let (reporter, stats) = run_fixture("calculator.ndjson", reporter, &attachments_dir).await;
    assert_eq!(reporter.stats(), stats);
    drop(reporter);

    let stderr = String::from_utf8(stderr).expect("stderr is UTF-8");
    for expected in [
        "Starting fixture calculator.ndjson for project DEMO",
        "PASS [    1s] Calculator > Adding [101]",
        "FAIL [    2s] Calculator > Dividing by zero [102]",
        "Error: division by zero\n",
        "at divide (features/support/calc.js:12:11)",
        "SKIP [    0s] Calculator > Subtracting below zero [103]",
        "PASS [    0s] Multiplying 2 and 3\n",
        "Summary 5 test cases were run: 3 passed, 1 failed, 1 skipped",
    ] {
        assert!(stderr.contains(expected), "{expected:?} not found in:\n{stderr}");
    }

    let lines: Vec<Value> = String::from_utf8(json)
        .expect("JSON is UTF-8")
        .lines()
        .map(|line| serde_json::from_str(line).expect("line is JSON"))
        .collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0]["type"], "run-started");
    assert_eq!(lines[0]["projectCode"], "DEMO");
    assert_eq!(lines[2]["type"], "test-result");
    assert_eq!(lines[2]["id"], "tcs-2");
    assert_eq!(lines[2]["status"], "failed");
    assert_eq!(lines[2]["caseIds"], serde_json::json!([102]));
    assert_eq!(lines[6]["type"], "run-finished");
    assert_eq!(lines[6]["spawn"], false);
    let finished: RunStats = RunStats {
        passed: lines[6]["passed"].as_u64().expect("passed is a number") as usize,
        failed: lines[6]["failed"].as_u64().expect("failed is a number") as usize,
        skipped: lines[6]["skipped"].as_u64().expect("skipped is a number") as usize,
    };
    assert_eq!(finished, stats);

    let xml = std::fs::read_to_string(&junit_path).expect("JUnit report written");
    for expected in [
        r#"<testsuites name="Cucumber tests""#,
        r#"<testsuite name="Calculator""#,
        r#"<testsuite name="(no feature)""#,
        r#"<testcase name="Dividing by zero" classname="Calculator""#,
        r#"message="Error: division by zero""#,
        "[[ATTACHMENT|",
    ] {
        assert!(xml.contains(expected), "{expected:?} not found in:\n{xml}");
    }
}
