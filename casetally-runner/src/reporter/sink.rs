// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::{AttachmentWriteError, DisplayErrorChain, FinalizeError, WriteEventError},
    messages::{SourceReference, TestStepResultStatus},
};
use casetally_metadata::{RunHeader, TestResult};
use std::fmt;

/// Options passed to [`ResultSink::end`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct EndOptions {
    /// Whether the downstream collaborator should finish its work in a
    /// detached background process.
    pub spawn: bool,
}

/// Receives the output of an [`EventAggregator`](crate::aggregator::EventAggregator).
///
/// `start` is called at most once, when the run starts. `add_test_result` is
/// called exactly once per finished instance. `end` is called once, after
/// every pending attachment write has been joined.
pub trait ResultSink {
    /// Called when the run starts.
    fn start(&mut self, header: &RunHeader) -> Result<(), WriteEventError>;

    /// Called with the result of each finished instance.
    fn add_test_result(&mut self, result: TestResult) -> Result<(), WriteEventError>;

    /// Called once the run is complete.
    fn end(&mut self, options: EndOptions) -> Result<(), WriteEventError>;

    /// Called for conditions that are absorbed rather than propagated.
    ///
    /// The default implementation logs at warn level.
    fn log(&mut self, diagnostic: &Diagnostic) {
        tracing::warn!("{diagnostic}");
    }
}

impl<S: ResultSink + ?Sized> ResultSink for &mut S {
    fn start(&mut self, header: &RunHeader) -> Result<(), WriteEventError> {
        (**self).start(header)
    }

    fn add_test_result(&mut self, result: TestResult) -> Result<(), WriteEventError> {
        (**self).add_test_result(result)
    }

    fn end(&mut self, options: EndOptions) -> Result<(), WriteEventError> {
        (**self).end(options)
    }

    fn log(&mut self, diagnostic: &Diagnostic) {
        (**self).log(diagnostic)
    }
}

/// A condition the aggregator absorbed without affecting control flow.
#[derive(Debug)]
#[non_exhaustive]
pub enum Diagnostic {
    /// A step finished with an outcome that has no corresponding result
    /// status. The instance's state is unchanged.
    UnmappedStepStatus {
        /// The runtime instance ID.
        instance_id: String,

        /// The step ID, if reported.
        step_id: Option<String>,

        /// The upstream outcome.
        status: TestStepResultStatus,

        /// The step's message, if any.
        message: Option<String>,
    },

    /// The upstream source failed to parse a document.
    ParseError {
        /// Where the failure occurred.
        source: Option<SourceReference>,

        /// The parser's message, verbatim.
        message: String,
    },

    /// An attachment could not be staged, and is omitted from its instance.
    AttachmentWriteFailed {
        /// The runtime instance ID.
        instance_id: String,

        /// The underlying error.
        error: AttachmentWriteError,
    },

    /// An event referenced an instance that isn't running.
    UnknownInstance {
        /// The runtime instance ID.
        instance_id: String,

        /// The kind of event, for example `testStepFinished`.
        event: &'static str,
    },

    /// A finished instance could not be turned into a result, and was
    /// skipped.
    FinalizeFailed {
        /// The underlying error.
        error: FinalizeError,
    },

    /// The run ended while an instance was still running. No result is
    /// produced for it.
    UnfinishedInstance {
        /// The runtime instance ID.
        instance_id: String,
    },

    /// An event arrived after the run finished, and was ignored.
    EventAfterRunFinished {
        /// The kind of event.
        kind: &'static str,
    },

    /// The message stream ended without the run finishing.
    RunNotFinished,

    /// The run started more than once. Only the first start is reported.
    DuplicateRunStarted,
}

/// The kind of a [`Diagnostic`], without its data.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum DiagnosticKind {
    /// See [`Diagnostic::UnmappedStepStatus`].
    UnmappedStepStatus,
    /// See [`Diagnostic::ParseError`].
    ParseError,
    /// See [`Diagnostic::AttachmentWriteFailed`].
    AttachmentWriteFailed,
    /// See [`Diagnostic::UnknownInstance`].
    UnknownInstance,
    /// See [`Diagnostic::FinalizeFailed`].
    FinalizeFailed,
    /// See [`Diagnostic::UnfinishedInstance`].
    UnfinishedInstance,
    /// See [`Diagnostic::EventAfterRunFinished`].
    EventAfterRunFinished,
    /// See [`Diagnostic::RunNotFinished`].
    RunNotFinished,
    /// See [`Diagnostic::DuplicateRunStarted`].
    DuplicateRunStarted,
}

impl Diagnostic {
    /// Returns the kind of this diagnostic.
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::UnmappedStepStatus { .. } => DiagnosticKind::UnmappedStepStatus,
            Self::ParseError { .. } => DiagnosticKind::ParseError,
            Self::AttachmentWriteFailed { .. } => DiagnosticKind::AttachmentWriteFailed,
            Self::UnknownInstance { .. } => DiagnosticKind::UnknownInstance,
            Self::FinalizeFailed { .. } => DiagnosticKind::FinalizeFailed,
            Self::UnfinishedInstance { .. } => DiagnosticKind::UnfinishedInstance,
            Self::EventAfterRunFinished { .. } => DiagnosticKind::EventAfterRunFinished,
            Self::RunNotFinished => DiagnosticKind::RunNotFinished,
            Self::DuplicateRunStarted => DiagnosticKind::DuplicateRunStarted,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmappedStepStatus {
                instance_id,
                step_id,
                status,
                message,
            } => {
                write!(
                    f,
                    "step `{}` of instance `{instance_id}` finished with unmapped status {status}",
                    step_id.as_deref().unwrap_or("<unknown>"),
                )?;
                if let Some(message) = message {
                    write!(f, ": {message}")?;
                }
                Ok(())
            }
            Self::ParseError { source, message } => match source {
                Some(source) => write!(f, "parse error at {source}: {message}"),
                None => write!(f, "parse error: {message}"),
            },
            Self::AttachmentWriteFailed { instance_id, error } => write!(
                f,
                "dropping attachment for instance `{instance_id}`: {}",
                DisplayErrorChain::new(error),
            ),
            Self::UnknownInstance { instance_id, event } => write!(
                f,
                "ignoring `{event}` for instance `{instance_id}`, which is not running",
            ),
            Self::FinalizeFailed { error } => {
                write!(f, "skipping result: {error}")
            }
            Self::UnfinishedInstance { instance_id } => write!(
                f,
                "instance `{instance_id}` was still running when the run ended",
            ),
            Self::EventAfterRunFinished { kind } => {
                write!(f, "ignoring `{kind}` received after the run finished")
            }
            Self::RunNotFinished => {
                f.write_str("message stream ended before the run finished")
            }
            Self::DuplicateRunStarted => f.write_str("ignoring repeated `testRunStarted`"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Location;
    use pretty_assertions::assert_eq;

    #[test]
    fn display() {
        let diagnostic = Diagnostic::UnmappedStepStatus {
            instance_id: "tcs-1".to_owned(),
            step_id: Some("s-2".to_owned()),
            status: TestStepResultStatus::Undefined,
            message: None,
        };
        assert_eq!(diagnostic.kind(), DiagnosticKind::UnmappedStepStatus);
        assert_eq!(
            diagnostic.to_string(),
            "step `s-2` of instance `tcs-1` finished with unmapped status UNDEFINED"
        );

        let diagnostic = Diagnostic::ParseError {
            source: Some(SourceReference {
                uri: Some("features/a.feature".to_owned()),
                location: Some(Location {
                    line: 3,
                    column: Some(5),
                }),
            }),
            message: "expected: #Feature".to_owned(),
        };
        assert_eq!(
            diagnostic.to_string(),
            "parse error at features/a.feature:3:5: expected: #Feature"
        );

        let diagnostic = Diagnostic::FinalizeFailed {
            error: FinalizeError::UnknownInstance {
                instance_id: "tcs-9".to_owned(),
            },
        };
        assert_eq!(
            diagnostic.to_string(),
            "skipping result: test case instance `tcs-9` finished without having started"
        );
    }
}
