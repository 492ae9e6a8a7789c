// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests that drive recorded message streams through the
//! aggregator.
//!
//! Fixtures live in `fixtures/messages` at the workspace root. They were
//! captured from cucumber-js runs and trimmed to the fields casetally reads.

mod fixtures;
mod reports;

use camino_tempfile::tempdir;
use casetally_metadata::ResultStatus;
use casetally_runner::reporter::{DiagnosticKind, EndOptions, RunStats};
use fixtures::*;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn calculator_run() {
    let dir = tempdir().expect("create temp dir");
    let (sink, stats) = run_fixture("calculator.ndjson", RecordingSink::default(), dir.path()).await;

    assert_eq!(
        stats,
        RunStats {
            passed: 3,
            failed: 1,
            skipped: 1,
        }
    );
    assert_eq!(sink.started.len(), 1);
    assert_eq!(sink.started[0].run_name, "fixture calculator.ndjson");
    assert_eq!(sink.ended, vec![EndOptions { spawn: false }]);
    assert_eq!(sink.diagnostic_kinds(), vec![DiagnosticKind::UnmappedStepStatus]);
    assert!(
        sink.diagnostics[0].1.contains("UNDEFINED"),
        "{:?}",
        sink.diagnostics
    );

    let ids: Vec<_> = sink.results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["tcs-1", "tcs-2", "tcs-3", "tcs-4", "tcs-5"]);

    let adding = sink.result("tcs-1");
    assert_eq!(adding.status, ResultStatus::Passed);
    assert_eq!(adding.suite_path, "Calculator");
    assert_eq!(adding.case_ids, Some(vec![101]));
    assert_eq!(adding.duration, 1);
    assert_eq!(adding.attachments.len(), 1);
    assert_eq!(
        std::fs::read_to_string(&adding.attachments[0].path).expect("read attachment"),
        "sum = 5"
    );

    let dividing = sink.result("tcs-2");
    assert_eq!(dividing.status, ResultStatus::Failed);
    assert_eq!(dividing.case_ids, Some(vec![102]));
    assert_eq!(dividing.duration, 2);
    assert_eq!(dividing.error.as_deref(), Some("Error: division by zero"));
    assert_eq!(
        dividing.stacktrace.as_deref(),
        Some("Error: division by zero\n    at divide (features/support/calc.js:12:11)")
    );
    assert_eq!(dividing.attachments.len(), 1);
    assert_eq!(dividing.attachments[0].path.extension(), Some("png"));
    assert_eq!(
        std::fs::read(&dividing.attachments[0].path).expect("read attachment"),
        b"\x89PNG\r\n\x1a\n"
    );

    // The retry is a separate instance with its own result.
    let retried = sink.result("tcs-3");
    assert_eq!(retried.status, ResultStatus::Passed);
    assert_eq!(retried.title, "Dividing by zero");
    assert!(retried.attachments.is_empty());

    let negative = sink.result("tcs-4");
    assert_eq!(negative.status, ResultStatus::Skipped);
    assert_eq!(negative.suite_path, "Calculator");
    assert_eq!(negative.case_ids, Some(vec![103]));
    assert_eq!(negative.error, None);

    // Outline rows reference an example row last, which has no feature.
    let outline = sink.result("tcs-5");
    assert_eq!(outline.status, ResultStatus::Passed);
    assert_eq!(outline.suite_path, "");
    assert_eq!(outline.case_ids, None);
}

#[tokio::test]
async fn parallel_workers() {
    let dir = tempdir().expect("create temp dir");
    let (sink, stats) = run_fixture("parallel.ndjson", RecordingSink::default(), dir.path()).await;

    assert_eq!(
        stats,
        RunStats {
            passed: 1,
            failed: 1,
            skipped: 1,
        }
    );
    assert_eq!(sink.diagnostic_kinds(), vec![DiagnosticKind::UnmappedStepStatus]);

    let ids: Vec<_> = sink.results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["w0-1", "w2-1", "w1-1"]);

    let valid = sink.result("w0-1");
    assert_eq!(valid.status, ResultStatus::Passed);
    assert_eq!(valid.suite_path, "Login");
    assert_eq!(valid.duration, 2);
    assert_eq!(valid.attachments.len(), 1);
    assert_eq!(valid.attachments[0].path.extension(), Some("html"));

    let cart = sink.result("w2-1");
    assert_eq!(cart.status, ResultStatus::Skipped);
    assert_eq!(cart.suite_path, "Shopping cart");
    assert_eq!(cart.case_ids, None);
    assert_eq!(cart.error, None);
    assert!(cart.attachments.is_empty());

    let wrong = sink.result("w1-1");
    assert_eq!(wrong.status, ResultStatus::Failed);
    assert_eq!(wrong.case_ids, Some(vec![2, 3]));
    assert_eq!(wrong.duration, 1, "clock skew yields a positive duration");
    assert_eq!(wrong.error.as_deref(), Some("AssertionError: expected 401"));
    assert_eq!(
        wrong.stacktrace.as_deref(),
        Some(
            "AssertionError: expected 401\n    at Context.<anonymous> (steps.js:20:5)\
             \n\nError: session leaked\n    at afterHook (hooks.js:9:3)"
        )
    );
    let contents: Vec<_> = wrong
        .attachments
        .iter()
        .map(|attachment| std::fs::read_to_string(&attachment.path).expect("read attachment"))
        .collect();
    assert_eq!(contents, ["wrong password screen", "{\"status\":401}"]);
}

#[tokio::test]
async fn truncated_stream() {
    let dir = tempdir().expect("create temp dir");
    let (sink, stats) = run_fixture("truncated.ndjson", RecordingSink::default(), dir.path()).await;

    assert_eq!(
        stats,
        RunStats {
            passed: 1,
            failed: 0,
            skipped: 0,
        }
    );
    assert_eq!(
        sink.diagnostic_kinds(),
        vec![
            DiagnosticKind::ParseError,
            DiagnosticKind::RunNotFinished,
            DiagnosticKind::UnfinishedInstance,
        ]
    );
    assert!(
        sink.diagnostics[0].1.starts_with("parse error at features/broken.feature:4:7: "),
        "{:?}",
        sink.diagnostics[0]
    );
    assert_eq!(sink.ended, vec![EndOptions { spawn: false }]);

    let book = sink.result("tcs-1");
    assert_eq!(book.case_ids, Some(vec![7]));
    assert_eq!(book.suite_path, "Search");

    // The unfinished instance's attachment was still flushed before the run ended.
    let staged: Vec<_> = dir
        .path()
        .read_dir_utf8()
        .expect("read staging dir")
        .map(|entry| entry.expect("read dir entry").path().to_owned())
        .collect();
    assert_eq!(staged.len(), 1);
    assert_eq!(staged[0].extension(), Some("log"));
    assert_eq!(
        std::fs::read_to_string(&staged[0]).expect("read attachment"),
        "partial output"
    );
}
