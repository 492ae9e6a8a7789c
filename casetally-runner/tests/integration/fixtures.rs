// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::{Utf8Path, Utf8PathBuf};
use casetally_metadata::{RunHeader, TestResult};
use casetally_runner::{
    aggregator::{AttachmentStager, EventAggregator},
    errors::WriteEventError,
    reporter::{Diagnostic, DiagnosticKind, EndOptions, ResultSink, RunStats},
};
use tokio::io::BufReader;

pub(crate) fn messages_dir() -> Utf8PathBuf {
    Utf8Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("workspace root exists")
        .join("fixtures/messages")
}

#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub(crate) started: Vec<RunHeader>,
    pub(crate) results: Vec<TestResult>,
    pub(crate) ended: Vec<EndOptions>,
    pub(crate) diagnostics: Vec<(DiagnosticKind, String)>,
}

impl RecordingSink {
    pub(crate) fn diagnostic_kinds(&self) -> Vec<DiagnosticKind> {
        self.diagnostics.iter().map(|(kind, _)| *kind).collect()
    }

    pub(crate) fn result(&self, id: &str) -> &TestResult {
        self.results
            .iter()
            .find(|result| result.id == id)
            .unwrap_or_else(|| panic!("no result for {id}"))
    }
}

impl ResultSink for RecordingSink {
    fn start(&mut self, header: &RunHeader) -> Result<(), WriteEventError> {
        self.started.push(header.clone());
        Ok(())
    }

    fn add_test_result(&mut self, result: TestResult) -> Result<(), WriteEventError> {
        self.results.push(result);
        Ok(())
    }

    fn end(&mut self, options: EndOptions) -> Result<(), WriteEventError> {
        self.ended.push(options);
        Ok(())
    }

    fn log(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics
            .push((diagnostic.kind(), diagnostic.to_string()));
    }
}

/// Feeds a fixture file through an aggregator to completion.
pub(crate) async fn run_fixture<S: ResultSink>(
    name: &str,
    sink: S,
    attachments_dir: &Utf8Path,
) -> (S, RunStats) {
    let path = messages_dir().join(name);
    let file = tokio::fs::File::open(&path)
        .await
        .unwrap_or_else(|error| panic!("opening {path}: {error}"));

    let header = RunHeader {
        project_code: Some("DEMO".to_owned()),
        run_name: format!("fixture {name}"),
        ..Default::default()
    };
    let mut aggregator =
        EventAggregator::new(sink, header, AttachmentStager::new(attachments_dir));
    aggregator
        .consume_lines(BufReader::new(file))
        .await
        .expect("fixture is consumed");
    let stats = aggregator.finish().await.expect("run finishes");
    (aggregator.into_sink(), stats)
}
