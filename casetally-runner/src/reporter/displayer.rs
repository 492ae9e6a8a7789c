// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human-readable output on standard error.

use super::{helpers::Styles, imp::ReporterStderr, stats::RunStats};
use crate::{errors::WriteEventError, helpers::plural};
use casetally_metadata::{ResultStatus, RunHeader, TestResult};
use owo_colors::OwoColorize;
use std::io::Write;
use swrite::{SWrite, swrite, swriteln};

const INDENT: &str = "             ";

pub(super) struct DisplayReporterBuilder {
    pub(super) should_colorize: bool,
    pub(super) verbose: bool,
}

impl DisplayReporterBuilder {
    pub(super) fn build(self, stderr: ReporterStderr<'_>) -> DisplayReporter<'_> {
        let mut styles = Styles::default();
        if self.should_colorize {
            styles.colorize();
        }
        DisplayReporter {
            stderr,
            styles,
            verbose: self.verbose,
        }
    }
}

pub(super) struct DisplayReporter<'a> {
    stderr: ReporterStderr<'a>,
    styles: Styles,
    verbose: bool,
}

impl DisplayReporter<'_> {
    pub(super) fn write_run_started(&mut self, header: &RunHeader) -> Result<(), WriteEventError> {
        let mut out = String::new();
        swrite!(out, "{:>12} ", "Starting".style(self.styles.pass));
        swrite!(out, "{}", header.run_name.style(self.styles.count));
        if let Some(project_code) = &header.project_code {
            swrite!(out, " for project {}", project_code.style(self.styles.suite));
        }
        if let Some(run_id) = &header.run_id {
            swrite!(out, " (run {run_id})");
        }
        out.push('\n');
        self.write_str(&out)
    }

    pub(super) fn write_test_result(&mut self, result: &TestResult) -> Result<(), WriteEventError> {
        let mut out = String::new();
        let status_style = self.styles.for_status(result.status);
        let status_str = match result.status {
            ResultStatus::Passed => "PASS",
            ResultStatus::Skipped => "SKIP",
            ResultStatus::Failed => "FAIL",
        };
        swrite!(out, "{:>12} [{:>5}s] ", status_str.style(status_style), result.duration);

        for suite in result.suite_names() {
            swrite!(out, "{} > ", suite.style(self.styles.suite));
        }
        swrite!(out, "{}", result.title);

        if let Some(case_ids) = &result.case_ids {
            let ids: Vec<_> = case_ids.iter().map(|id| id.to_string()).collect();
            swrite!(out, " [{}]", ids.join(", ").style(self.styles.case_id));
        }
        out.push('\n');

        if let Some(error) = &result.error {
            swriteln!(out, "{INDENT}{}", error.style(status_style));
        }
        if self.verbose {
            if let Some(stacktrace) = &result.stacktrace {
                for line in stacktrace.lines() {
                    swriteln!(out, "{INDENT}  {line}");
                }
            }
            for attachment in &result.attachments {
                swriteln!(out, "{INDENT}attachment: {}", attachment.path);
            }
        }

        self.write_str(&out)
    }

    pub(super) fn write_run_finished(&mut self, stats: RunStats) -> Result<(), WriteEventError> {
        let summary_style = if stats.has_failures() {
            self.styles.fail
        } else if stats.finished_count() == 0 {
            self.styles.skip
        } else {
            self.styles.pass
        };

        let mut out = String::new();
        swriteln!(out, "{}", "-".repeat(12));
        swrite!(
            out,
            "{:>12} {} {} {} run: ",
            "Summary".style(summary_style),
            stats.finished_count().style(self.styles.count),
            plural::test_cases_str(stats.finished_count()),
            plural::was_were(stats.finished_count()),
        );
        swriteln!(
            out,
            "{} {}, {} {}, {} {}",
            stats.passed.style(self.styles.count),
            "passed".style(self.styles.pass),
            stats.failed.style(self.styles.count),
            "failed".style(self.styles.fail),
            stats.skipped.style(self.styles.count),
            "skipped".style(self.styles.skip),
        );

        self.write_str(&out)
    }

    fn write_str(&mut self, out: &str) -> Result<(), WriteEventError> {
        match &mut self.stderr {
            ReporterStderr::Terminal => {
                let mut stderr = std::io::stderr().lock();
                stderr
                    .write_all(out.as_bytes())
                    .and_then(|()| stderr.flush())
                    .map_err(WriteEventError::Io)
            }
            ReporterStderr::Buffer(buf) => {
                buf.extend_from_slice(out.as_bytes());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casetally_metadata::AttachmentRef;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn failing_result() -> TestResult {
        TestResult {
            id: "tcs-1".to_owned(),
            title: "Dividing by zero".to_owned(),
            case_ids: Some(vec![12, 99]),
            status: ResultStatus::Failed,
            duration: 3,
            error: Some("division by zero".to_owned()),
            suite_path: "Calculator".to_owned(),
            stacktrace: Some("division by zero\n  at calc.js:4".to_owned()),
            attachments: vec![AttachmentRef {
                path: "/tmp/abc.txt".into(),
            }],
        }
    }

    #[test]
    fn uncolored_output() {
        let mut buf = Vec::new();
        let mut reporter = DisplayReporterBuilder {
            should_colorize: false,
            verbose: false,
        }
        .build(ReporterStderr::Buffer(&mut buf));

        reporter
            .write_run_started(&RunHeader {
                project_code: Some("TP".to_owned()),
                run_name: "nightly".to_owned(),
                ..Default::default()
            })
            .expect("write succeeds");
        reporter
            .write_test_result(&TestResult {
                id: "tcs-2".to_owned(),
                title: "Adding".to_owned(),
                case_ids: None,
                status: ResultStatus::Passed,
                duration: 1,
                error: None,
                suite_path: String::new(),
                stacktrace: None,
                attachments: Vec::new(),
            })
            .expect("write succeeds");
        reporter
            .write_test_result(&failing_result())
            .expect("write succeeds");
        reporter
            .write_run_finished(RunStats {
                passed: 1,
                failed: 1,
                skipped: 0,
            })
            .expect("write succeeds");
        drop(reporter);

        assert_eq!(
            String::from_utf8(buf).expect("output is UTF-8"),
            indoc! {"
                    Starting nightly for project TP
                        PASS [    1s] Adding
                        FAIL [    3s] Calculator > Dividing by zero [12, 99]
                             division by zero
                ------------
                     Summary 2 test cases were run: 1 passed, 1 failed, 0 skipped
            "}
        );
    }

    #[test]
    fn verbose_output_includes_stacktrace() {
        let mut buf = Vec::new();
        let mut reporter = DisplayReporterBuilder {
            should_colorize: false,
            verbose: true,
        }
        .build(ReporterStderr::Buffer(&mut buf));
        reporter
            .write_test_result(&failing_result())
            .expect("write succeeds");
        drop(reporter);

        let output = String::from_utf8(buf).expect("output is UTF-8");
        assert!(output.contains(&format!("{INDENT}    at calc.js:4\n")), "{output}");
        assert!(output.contains(&format!("{INDENT}attachment: /tmp/abc.txt\n")), "{output}");
    }
}
