// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Code to generate JUnit XML reports from test results.

use crate::errors::WriteEventError;
use camino::{Utf8Path, Utf8PathBuf};
use casetally_metadata::{ResultStatus, TestResult};
use debug_ignore::DebugIgnore;
use indexmap::IndexMap;
use quick_junit::{NonSuccessKind, Report, TestCase, TestCaseStatus, TestSuite};
use std::{fs::File, time::Duration};
use swrite::{SWrite, swriteln};

static NO_FEATURE: &str = "(no feature)";
static DEFAULT_REPORT_NAME: &str = "casetally";

/// Where and under what name a JUnit report is written.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JunitConfig {
    path: Utf8PathBuf,
    report_name: String,
}

impl JunitConfig {
    /// Creates a new config writing to `path`.
    ///
    /// The report is named after `root_suite_title` if one is provided.
    pub fn new(path: impl Into<Utf8PathBuf>, root_suite_title: Option<&str>) -> Self {
        Self {
            path: path.into(),
            report_name: root_suite_title
                .filter(|title| !title.is_empty())
                .unwrap_or(DEFAULT_REPORT_NAME)
                .to_owned(),
        }
    }

    /// The path the report is written to.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// The name of the report.
    pub fn report_name(&self) -> &str {
        &self.report_name
    }
}

/// Collects results into one `<testsuite>` per suite path.
#[derive(Clone, Debug)]
pub(super) struct JunitAggregator {
    config: JunitConfig,
    test_suites: DebugIgnore<IndexMap<String, TestSuite>>,
}

impl JunitAggregator {
    pub(super) fn new(config: JunitConfig) -> Self {
        Self {
            config,
            test_suites: DebugIgnore(IndexMap::new()),
        }
    }

    pub(super) fn add_test_result(&mut self, result: &TestResult) {
        let mut status = match result.status {
            ResultStatus::Passed => TestCaseStatus::success(),
            ResultStatus::Skipped => TestCaseStatus::skipped(),
            ResultStatus::Failed => TestCaseStatus::non_success(NonSuccessKind::Failure),
        };
        if let Some(error) = &result.error {
            status.set_message(error.as_str());
        }
        if let Some(stacktrace) = &result.stacktrace {
            status.set_description(stacktrace.as_str());
        }

        let suite_name = suite_name(result);
        let mut testcase = TestCase::new(result.title.as_str(), status);
        testcase
            .set_classname(suite_name.as_str())
            .set_time(Duration::from_secs(result.duration));

        if !result.attachments.is_empty() {
            let mut system_out = String::new();
            for attachment in &result.attachments {
                swriteln!(system_out, "[[ATTACHMENT|{}]]", attachment.path);
            }
            testcase.set_system_out(system_out);
        }

        self.test_suites
            .entry(suite_name.clone())
            .or_insert_with(|| TestSuite::new(suite_name))
            .add_test_case(testcase);
    }

    pub(super) fn write(&mut self) -> Result<(), WriteEventError> {
        let mut report = Report::new(self.config.report_name());
        report.add_test_suites(self.test_suites.drain(..).map(|(_, testsuite)| testsuite));

        let junit_path = self.config.path();
        if let Some(junit_dir) = junit_path.parent().filter(|dir| !dir.as_str().is_empty()) {
            std::fs::create_dir_all(junit_dir).map_err(|error| WriteEventError::Fs {
                file: junit_dir.to_path_buf(),
                error,
            })?;
        }

        let f = File::create(junit_path).map_err(|error| WriteEventError::Fs {
            file: junit_path.to_path_buf(),
            error,
        })?;
        report
            .serialize(f)
            .map_err(|error| WriteEventError::Junit {
                file: junit_path.to_path_buf(),
                error,
            })
    }
}

/// Suite names are the tab-separated ancestors, joined with `::` for display.
fn suite_name(result: &TestResult) -> String {
    let names: Vec<_> = result.suite_names().collect();
    if names.is_empty() {
        NO_FEATURE.to_owned()
    } else {
        names.join("::")
    }
}
