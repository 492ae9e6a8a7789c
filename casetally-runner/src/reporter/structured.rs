// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Functionality for emitting structured, machine readable output.

use super::stats::RunStats;
use crate::errors::WriteEventError;
use casetally_metadata::{RunHeader, TestResult};
use serde::Serialize;
use std::io::Write;

/// A reporter for structured, machine readable output.
pub enum StructuredReporter<'a> {
    /// One JSON object per line.
    JsonLines(Box<dyn Write + 'a>),

    /// Variant that doesn't actually emit anything.
    Disabled,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum StructuredEvent<'e> {
    RunStarted(&'e RunHeader),
    TestResult(&'e TestResult),
    RunFinished {
        spawn: bool,
        #[serde(flatten)]
        stats: RunStats,
    },
}

impl StructuredReporter<'_> {
    pub(super) fn write_run_started(&mut self, header: &RunHeader) -> Result<(), WriteEventError> {
        self.write_event(&StructuredEvent::RunStarted(header))
    }

    pub(super) fn write_test_result(&mut self, result: &TestResult) -> Result<(), WriteEventError> {
        self.write_event(&StructuredEvent::TestResult(result))
    }

    pub(super) fn write_run_finished(
        &mut self,
        spawn: bool,
        stats: RunStats,
    ) -> Result<(), WriteEventError> {
        self.write_event(&StructuredEvent::RunFinished { spawn, stats })?;
        match self {
            Self::JsonLines(writer) => writer.flush().map_err(WriteEventError::Io),
            Self::Disabled => Ok(()),
        }
    }

    fn write_event(&mut self, event: &StructuredEvent<'_>) -> Result<(), WriteEventError> {
        match self {
            Self::Disabled => Ok(()),
            Self::JsonLines(writer) => {
                serde_json::to_writer(&mut *writer, event).map_err(WriteEventError::Json)?;
                writer.write_all(b"\n").map_err(WriteEventError::Io)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casetally_metadata::ResultStatus;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    #[test]
    fn json_lines() {
        let mut buf = Vec::new();
        let mut reporter = StructuredReporter::JsonLines(Box::new(&mut buf));
        reporter
            .write_run_started(&RunHeader {
                project_code: Some("TP".to_owned()),
                run_name: "nightly".to_owned(),
                environment_id: Some(3),
                ..Default::default()
            })
            .expect("write succeeds");
        reporter
            .write_test_result(&TestResult {
                id: "tcs-1".to_owned(),
                title: "Adding".to_owned(),
                case_ids: Some(vec![12]),
                status: ResultStatus::Skipped,
                duration: 0,
                error: None,
                suite_path: "Calculator".to_owned(),
                stacktrace: None,
                attachments: Vec::new(),
            })
            .expect("write succeeds");
        reporter
            .write_run_finished(
                false,
                RunStats {
                    passed: 0,
                    failed: 0,
                    skipped: 1,
                },
            )
            .expect("write succeeds");
        drop(reporter);

        let lines: Vec<Value> = String::from_utf8(buf)
            .expect("output is UTF-8")
            .lines()
            .map(|line| serde_json::from_str(line).expect("each line is JSON"))
            .collect();
        assert_eq!(
            lines,
            vec![
                json!({
                    "type": "run-started",
                    "projectCode": "TP",
                    "runName": "nightly",
                    "environmentId": 3,
                }),
                json!({
                    "type": "test-result",
                    "id": "tcs-1",
                    "title": "Adding",
                    "caseIds": [12],
                    "status": "skipped",
                    "duration": 0,
                    "suitePath": "Calculator",
                    "attachments": [],
                }),
                json!({
                    "type": "run-finished",
                    "spawn": false,
                    "passed": 0,
                    "failed": 0,
                    "skipped": 1,
                }),
            ]
        );
    }

    #[test]
    fn disabled_writes_nothing() {
        let mut reporter = StructuredReporter::Disabled;
        reporter
            .write_run_finished(true, RunStats::default())
            .expect("write succeeds");
    }
}
