// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    attachments::{AttachmentStager, PendingAttachment},
    finalize::finalize,
    registry::{CaseRunRegistry, DocumentIndex, PickleRegistry},
    tracker::{RunStateTracker, StepRecord},
};
use crate::{
    errors::{
        ConsumeError, DisplayErrorChain, EnvelopeParseError, FinalizeError, WriteEventError,
    },
    messages::{Attachment, Envelope, TestCaseFinished, TestStepFinished},
    reporter::{Diagnostic, EndOptions, ResultSink, RunStats},
};
use casetally_metadata::{AttachmentRef, RunHeader};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum RunPhase {
    NotStarted,
    Running,
    Finished,
}

/// Reduces a stream of envelopes into one [`TestResult`] per finished
/// instance.
///
/// One aggregator handles exactly one run. Envelopes must be handed over in
/// the order the upstream source produced them: documents before the pickles
/// compiled from them, and every event for an instance before its finish
/// event. Events for different instances may interleave arbitrarily.
///
/// [`TestResult`]: casetally_metadata::TestResult
#[derive(Debug)]
pub struct EventAggregator<S> {
    sink: S,
    header: RunHeader,
    stager: AttachmentStager,
    documents: DocumentIndex,
    pickles: PickleRegistry,
    cases: CaseRunRegistry,
    tracker: RunStateTracker,
    phase: RunPhase,
    stats: RunStats,
}

impl<S: ResultSink> EventAggregator<S> {
    /// Creates a new aggregator for a single run.
    ///
    /// `header` is passed to the sink when the run starts, and attachments
    /// are staged through `stager`.
    pub fn new(sink: S, header: RunHeader, stager: AttachmentStager) -> Self {
        Self {
            sink,
            header,
            stager,
            documents: DocumentIndex::new(),
            pickles: PickleRegistry::new(),
            cases: CaseRunRegistry::new(),
            tracker: RunStateTracker::new(),
            phase: RunPhase::NotStarted,
            stats: RunStats::default(),
        }
    }

    /// Returns the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the aggregator, returning the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Counts of results produced so far.
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Returns true once the run has finished.
    pub fn is_finished(&self) -> bool {
        self.phase == RunPhase::Finished
    }

    /// Handles a single envelope.
    ///
    /// Malformed or out-of-contract events are reported through
    /// [`ResultSink::log`] and otherwise ignored. Only failures of the sink
    /// itself are returned.
    pub async fn handle(&mut self, envelope: Envelope) -> Result<(), WriteEventError> {
        if self.phase == RunPhase::Finished {
            self.sink.log(&Diagnostic::EventAfterRunFinished {
                kind: envelope.kind_name(),
            });
            return Ok(());
        }

        match envelope {
            Envelope::GherkinDocument(document) => self.documents.index_document(&document),
            Envelope::Pickle(pickle) => self.pickles.insert(&pickle),
            Envelope::TestCase(test_case) => self.cases.declare(&test_case),
            Envelope::TestRunStarted(_) => self.start_run()?,
            Envelope::TestRunFinished(_) => self.finish_run().await?,
            Envelope::Attachment(attachment) => self.stage_attachment(&attachment),
            Envelope::TestCaseStarted(started) => self.tracker.start(started),
            Envelope::TestCaseFinished(finished) => self.finish_instance(&finished).await?,
            Envelope::TestStepFinished(step) => self.record_step(step),
            Envelope::ParseError(error) => self.sink.log(&Diagnostic::ParseError {
                source: error.source,
                message: error.message,
            }),
        }

        Ok(())
    }

    /// Reads newline-delimited envelopes from `reader` until it is exhausted.
    ///
    /// Lines that fail to decode, including lines that aren't valid UTF-8, are
    /// logged and skipped. Only IO errors end the stream early.
    pub async fn consume_lines<R>(&mut self, mut reader: R) -> Result<(), ConsumeError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::new();
        let mut line_number = 0;
        loop {
            line_number += 1;
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {}
                Err(error) => return Err(ConsumeError::Read { line_number, error }),
            }

            let decoded = std::str::from_utf8(&buf)
                .map_err(EnvelopeParseError::InvalidUtf8)
                .and_then(Envelope::from_json_line);
            match decoded {
                Ok(Some(envelope)) => self.handle(envelope).await?,
                Ok(None) => {}
                Err(error) => {
                    warn!(
                        "skipping malformed message on line {line_number}: {}",
                        DisplayErrorChain::new(&error),
                    );
                }
            }
        }

        Ok(())
    }

    /// Completes the run, returning the final counts.
    ///
    /// If the stream ended without the run finishing, this finishes it:
    /// instances that are still running are reported as unfinished, their
    /// pending attachment writes are joined, and the sink is ended.
    pub async fn finish(&mut self) -> Result<RunStats, WriteEventError> {
        if self.phase != RunPhase::Finished {
            self.sink.log(&Diagnostic::RunNotFinished);
            self.finish_run().await?;
        }
        Ok(self.stats)
    }

    fn start_run(&mut self) -> Result<(), WriteEventError> {
        if self.phase == RunPhase::Running {
            self.sink.log(&Diagnostic::DuplicateRunStarted);
            return Ok(());
        }
        self.phase = RunPhase::Running;
        self.sink.start(&self.header)
    }

    async fn finish_run(&mut self) -> Result<(), WriteEventError> {
        self.phase = RunPhase::Finished;

        let unfinished: Vec<_> = self.tracker.drain().collect();
        for mut state in unfinished {
            let instance_id = state.started().id.clone();
            self.sink.log(&Diagnostic::UnfinishedInstance {
                instance_id: instance_id.clone(),
            });
            self.join_attachments(&instance_id, state.take_attachments())
                .await;
        }

        self.sink.end(EndOptions { spawn: false })
    }

    fn stage_attachment(&mut self, attachment: &Attachment) {
        let Some(instance_id) = &attachment.test_case_started_id else {
            debug!(
                "skipping `{}` attachment not associated with a test case",
                attachment.media_type,
            );
            return;
        };
        let Some(state) = self.tracker.get_mut(instance_id) else {
            self.sink.log(&Diagnostic::UnknownInstance {
                instance_id: instance_id.clone(),
                event: "attachment",
            });
            return;
        };

        state.push_attachment(self.stager.stage(attachment));
    }

    fn record_step(&mut self, step: TestStepFinished) {
        match self.tracker.record_step(&step) {
            StepRecord::Applied => {}
            StepRecord::Unmapped(status) => self.sink.log(&Diagnostic::UnmappedStepStatus {
                instance_id: step.test_case_started_id,
                step_id: step.test_step_id,
                status,
                message: step.test_step_result.message,
            }),
            StepRecord::UnknownInstance => self.sink.log(&Diagnostic::UnknownInstance {
                instance_id: step.test_case_started_id,
                event: "testStepFinished",
            }),
        }
    }

    async fn finish_instance(&mut self, finished: &TestCaseFinished) -> Result<(), WriteEventError> {
        let Some(mut state) = self.tracker.remove(&finished.test_case_started_id) else {
            self.sink.log(&Diagnostic::FinalizeFailed {
                error: FinalizeError::UnknownInstance {
                    instance_id: finished.test_case_started_id.clone(),
                },
            });
            return Ok(());
        };

        let attachments = self
            .join_attachments(&finished.test_case_started_id, state.take_attachments())
            .await;

        match finalize(
            finished,
            &state,
            &self.cases,
            &self.pickles,
            &self.documents,
            attachments,
        ) {
            Ok(result) => {
                self.stats.on_result(result.status);
                self.sink.add_test_result(result)
            }
            Err(error) => {
                self.sink.log(&Diagnostic::FinalizeFailed { error });
                Ok(())
            }
        }
    }

    /// Waits for an instance's attachment writes, returning the ones that
    /// succeeded in their original order.
    async fn join_attachments(
        &mut self,
        instance_id: &str,
        pending: Vec<PendingAttachment>,
    ) -> Vec<AttachmentRef> {
        let mut written = Vec::with_capacity(pending.len());
        for attachment in pending {
            match attachment.wait().await {
                Ok(attachment) => written.push(attachment),
                Err(error) => self.sink.log(&Diagnostic::AttachmentWriteFailed {
                    instance_id: instance_id.to_owned(),
                    error,
                }),
            }
        }
        written
    }
}
