// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prints out and aggregates test results.
//!
//! The main structure in this module is [`Reporter`].

use super::{
    displayer::{DisplayReporter, DisplayReporterBuilder},
    junit::{JunitAggregator, JunitConfig},
    sink::{EndOptions, ResultSink},
    stats::RunStats,
    structured::StructuredReporter,
};
use crate::errors::WriteEventError;
use casetally_metadata::{RunHeader, TestResult};

/// Standard error destination for the reporter.
///
/// This is usually a terminal, but can be an in-memory buffer for tests.
pub enum ReporterStderr<'a> {
    /// Produce output on the (possibly piped) terminal.
    Terminal,

    /// Write output to a buffer.
    Buffer(&'a mut Vec<u8>),
}

/// Reporter builder.
#[derive(Debug, Default)]
pub struct ReporterBuilder {
    should_colorize: bool,
    verbose: bool,
}

impl ReporterBuilder {
    /// Set to true if the reporter should colorize output.
    pub fn set_colorize(&mut self, should_colorize: bool) -> &mut Self {
        self.should_colorize = should_colorize;
        self
    }

    /// Sets verbose output: stack traces and attachment paths are printed for
    /// every result.
    pub fn set_verbose(&mut self, verbose: bool) -> &mut Self {
        self.verbose = verbose;
        self
    }

    /// Creates a new reporter.
    pub fn build<'a>(
        &self,
        output: ReporterStderr<'a>,
        structured_reporter: StructuredReporter<'a>,
        junit: Option<JunitConfig>,
    ) -> Reporter<'a> {
        let display_reporter = DisplayReporterBuilder {
            should_colorize: self.should_colorize,
            verbose: self.verbose,
        }
        .build(output);

        Reporter {
            display_reporter,
            structured_reporter,
            junit: junit.map(JunitAggregator::new),
            stats: RunStats::default(),
        }
    }
}

/// Functionality to report test results to stderr, JUnit, and/or structured,
/// machine-readable results.
pub struct Reporter<'a> {
    /// Used to display results to standard error.
    display_reporter: DisplayReporter<'a>,
    /// Used to emit results in machine-readable format.
    structured_reporter: StructuredReporter<'a>,
    /// Used to aggregate results for a JUnit report written to disk.
    junit: Option<JunitAggregator>,
    stats: RunStats,
}

impl Reporter<'_> {
    /// Counts of results reported so far.
    pub fn stats(&self) -> RunStats {
        self.stats
    }
}

impl ResultSink for Reporter<'_> {
    fn start(&mut self, header: &RunHeader) -> Result<(), WriteEventError> {
        self.display_reporter.write_run_started(header)?;
        self.structured_reporter.write_run_started(header)
    }

    fn add_test_result(&mut self, result: TestResult) -> Result<(), WriteEventError> {
        self.stats.on_result(result.status);
        self.display_reporter.write_test_result(&result)?;
        self.structured_reporter.write_test_result(&result)?;
        if let Some(junit) = &mut self.junit {
            junit.add_test_result(&result);
        }
        Ok(())
    }

    fn end(&mut self, options: EndOptions) -> Result<(), WriteEventError> {
        self.display_reporter.write_run_finished(self.stats)?;
        self.structured_reporter
            .write_run_finished(options.spawn, self.stats)?;
        if let Some(junit) = &mut self.junit {
            junit.write()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        aggregator::{AttachmentStager, EventAggregator},
        reporter::Diagnostic,
    };
    use camino_tempfile::tempdir;
    use casetally_metadata::ResultStatus;
    use indoc::indoc;

    fn result(id: &str, status: ResultStatus) -> TestResult {
        TestResult {
            id: id.to_owned(),
            title: id.to_owned(),
            case_ids: None,
            status,
            duration: 0,
            error: None,
            suite_path: String::new(),
            stacktrace: None,
            attachments: Vec::new(),
        }
    }

    #[test]
    fn summary_uses_reporter_counts() {
        let mut stderr = Vec::new();
        let mut json = Vec::new();
        let mut reporter = ReporterBuilder::default().build(
            ReporterStderr::Buffer(&mut stderr),
            StructuredReporter::JsonLines(Box::new(&mut json)),
            None,
        );
        reporter
            .add_test_result(result("a", ResultStatus::Passed))
            .expect("write succeeds");
        reporter
            .add_test_result(result("b", ResultStatus::Skipped))
            .expect("write succeeds");
        reporter
            .end(EndOptions { spawn: false })
            .expect("write succeeds");
        assert_eq!(
            reporter.stats(),
            RunStats {
                passed: 1,
                failed: 0,
                skipped: 1,
            }
        );
        drop(reporter);

        let stderr = String::from_utf8(stderr).expect("stderr is UTF-8");
        assert!(
            stderr.contains("Summary 2 test cases were run: 1 passed, 0 failed, 1 skipped"),
            "{stderr}"
        );
        let json = String::from_utf8(json).expect("JSON is UTF-8");
        let last = json.lines().last().expect("at least one line");
        assert!(last.contains(r#""passed":1,"failed":0,"skipped":1"#), "{json}");
    }

    #[tokio::test]
    async fn reports_everywhere() {
        let dir = tempdir().expect("create temp dir");
        let junit_path = dir.path().join("junit.xml");
        let mut stderr = Vec::new();
        let mut json = Vec::new();

        let reporter = ReporterBuilder::default().build(
            ReporterStderr::Buffer(&mut stderr),
            StructuredReporter::JsonLines(Box::new(&mut json)),
            Some(JunitConfig::new(&junit_path, None)),
        );
        let header = RunHeader {
            run_name: "nightly".to_owned(),
            ..Default::default()
        };
        let mut aggregator = EventAggregator::new(reporter, header, AttachmentStager::new(dir.path()));
        aggregator
            .consume_lines(
                indoc! {r#"
                    {"gherkinDocument":{"feature":{"name":"Calculator","children":[{"scenario":{"id":"sc-1"}}]}}}
                    {"pickle":{"id":"p-1","name":"Adding","astNodeIds":["sc-1"],"tags":[{"name":"@Q-1"}]}}
                    {"testCase":{"id":"tc-1","pickleId":"p-1"}}
                    {"testRunStarted":{"timestamp":{"seconds":1,"nanos":0}}}
                    {"testCaseStarted":{"id":"x","testCaseId":"tc-1","timestamp":{"seconds":1,"nanos":0}}}
                    {"testStepFinished":{"testCaseStartedId":"x","testStepId":"s-1","testStepResult":{"status":"FAILED","message":"boom"}}}
                    {"testCaseFinished":{"testCaseStartedId":"x","timestamp":{"seconds":2,"nanos":0}}}
                    {"testRunFinished":{"timestamp":{"seconds":2,"nanos":0}}}
                "#}
                .as_bytes(),
            )
            .await
            .expect("input is consumed");
        let stats = aggregator.finish().await.expect("run finishes");
        assert_eq!(stats.failed, 1);
        assert_eq!(aggregator.sink().stats(), stats);

        let mut reporter = aggregator.into_sink();
        reporter.log(&Diagnostic::RunNotFinished);
        drop(reporter);

        let stderr = String::from_utf8(stderr).expect("stderr is UTF-8");
        assert!(stderr.contains("FAIL [    1s] Calculator > Adding [1]"), "{stderr}");
        assert!(stderr.contains("Summary 1 test case was run"), "{stderr}");

        let json = String::from_utf8(json).expect("JSON is UTF-8");
        let types: Vec<_> = json
            .lines()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).expect("line is JSON");
                value["type"].as_str().expect("type is a string").to_owned()
            })
            .collect();
        assert_eq!(types, ["run-started", "test-result", "run-finished"]);

        let xml = std::fs::read_to_string(&junit_path).expect("JUnit report written");
        assert!(xml.contains(r#"<testsuite name="Calculator""#), "{xml}");
    }
}
