// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-instance running state.

use super::attachments::PendingAttachment;
use crate::messages::{TestCaseStarted, TestStepFinished, TestStepResultStatus};
use casetally_metadata::ResultStatus;
use std::collections::HashMap;

/// How a step outcome affects the status of its instance.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StepOutcome {
    /// The outcome maps onto a result status.
    Mapped(ResultStatus),

    /// The outcome has no corresponding result status, and is ignored.
    Unmapped(TestStepResultStatus),
}

impl From<TestStepResultStatus> for StepOutcome {
    fn from(status: TestStepResultStatus) -> Self {
        match status {
            TestStepResultStatus::Passed => Self::Mapped(ResultStatus::Passed),
            TestStepResultStatus::Skipped => Self::Mapped(ResultStatus::Skipped),
            TestStepResultStatus::Failed => Self::Mapped(ResultStatus::Failed),
            TestStepResultStatus::Ambiguous
            | TestStepResultStatus::Pending
            | TestStepResultStatus::Undefined
            | TestStepResultStatus::Unknown => Self::Unmapped(status),
        }
    }
}

/// The mutable state of one running instance.
#[derive(Debug)]
pub struct RunState {
    started: TestCaseStarted,
    status: ResultStatus,
    error_messages: Vec<String>,
    attachments: Vec<PendingAttachment>,
}

impl RunState {
    /// Creates state for a newly started instance. The status starts out as
    /// [`ResultStatus::Passed`].
    pub fn new(started: TestCaseStarted) -> Self {
        Self {
            started,
            status: ResultStatus::Passed,
            error_messages: Vec::new(),
            attachments: Vec::new(),
        }
    }

    /// The event that started this instance.
    pub fn started(&self) -> &TestCaseStarted {
        &self.started
    }

    /// The status so far.
    pub fn status(&self) -> ResultStatus {
        self.status
    }

    /// Error messages reported so far, in order.
    pub fn error_messages(&self) -> &[String] {
        &self.error_messages
    }

    /// Attachments staged so far, in order.
    pub fn attachments(&self) -> &[PendingAttachment] {
        &self.attachments
    }

    /// Applies a mapped step status.
    ///
    /// A non-passing status is merged with the current one by precedence
    /// (`Failed` over `Skipped` over `Passed`), and its message, if any, is
    /// recorded even if the status doesn't change. Passing steps change
    /// nothing.
    pub fn apply_step(&mut self, status: ResultStatus, message: Option<&str>) {
        if status == ResultStatus::Passed {
            return;
        }
        if let Some(message) = message.filter(|message| !message.is_empty()) {
            self.error_messages.push(message.to_owned());
        }
        self.status = self.status.max(status);
    }

    /// Adds a staged attachment.
    pub fn push_attachment(&mut self, attachment: PendingAttachment) {
        self.attachments.push(attachment);
    }

    /// Takes the staged attachments out of this state.
    pub fn take_attachments(&mut self) -> Vec<PendingAttachment> {
        std::mem::take(&mut self.attachments)
    }
}

/// The effect a finished step had on the tracker.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StepRecord {
    /// The step was applied to its instance.
    Applied,

    /// The step's outcome has no corresponding status; state is unchanged.
    Unmapped(TestStepResultStatus),

    /// The step referenced an instance that isn't running.
    UnknownInstance,
}

/// Tracks the state of every running instance, keyed by runtime instance ID.
///
/// Events for different instances may arrive interleaved in any order; each
/// only ever touches the state of its own instance.
#[derive(Debug, Default)]
pub struct RunStateTracker {
    states: HashMap<String, RunState>,
}

impl RunStateTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins tracking a newly started instance.
    pub fn start(&mut self, started: TestCaseStarted) {
        self.states
            .insert(started.id.clone(), RunState::new(started));
    }

    /// Records a finished step against its instance.
    pub fn record_step(&mut self, step: &TestStepFinished) -> StepRecord {
        let Some(state) = self.states.get_mut(&step.test_case_started_id) else {
            return StepRecord::UnknownInstance;
        };

        let result = &step.test_step_result;
        match StepOutcome::from(result.status) {
            StepOutcome::Mapped(status) => {
                state.apply_step(status, result.message.as_deref());
                StepRecord::Applied
            }
            StepOutcome::Unmapped(status) => StepRecord::Unmapped(status),
        }
    }

    /// Returns the state of a running instance.
    pub fn get(&self, instance_id: &str) -> Option<&RunState> {
        self.states.get(instance_id)
    }

    /// Returns the state of a running instance mutably.
    pub fn get_mut(&mut self, instance_id: &str) -> Option<&mut RunState> {
        self.states.get_mut(instance_id)
    }

    /// Stops tracking an instance, returning its state.
    pub fn remove(&mut self, instance_id: &str) -> Option<RunState> {
        self.states.remove(instance_id)
    }

    /// Stops tracking every instance, returning their states.
    pub fn drain(&mut self) -> impl Iterator<Item = RunState> + '_ {
        self.states.drain().map(|(_, state)| state)
    }
}
