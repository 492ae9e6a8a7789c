// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by casetally.

use camino::Utf8PathBuf;
use std::{error::Error, fmt};
use thiserror::Error;

/// An error that occurred while decoding one line of the message stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EnvelopeParseError {
    /// The line was not valid UTF-8.
    #[error("message is not valid UTF-8")]
    InvalidUtf8(#[source] std::str::Utf8Error),

    /// The line was not valid JSON.
    #[error("message is not valid JSON")]
    Json(#[source] serde_json::Error),

    /// The line was valid JSON, but not an object with exactly one key.
    #[error("expected an object with a single message key, found {found}")]
    NotAnEnvelope {
        /// A description of what was found instead.
        found: String,
    },

    /// The body of a known message kind failed to deserialize.
    #[error("failed to deserialize `{kind}` message at `{path}`")]
    Body {
        /// The kind of message, for example `testCaseStarted`.
        kind: &'static str,

        /// The JSON path at which deserialization failed.
        path: String,

        /// The underlying error.
        #[source]
        error: serde_json::Error,
    },
}

/// An error that occurred while reading the message stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConsumeError {
    /// Reading a line from the input failed.
    #[error("error reading message stream at line {line_number}")]
    Read {
        /// The 1-based line number that failed to be read.
        line_number: usize,

        /// The underlying IO error.
        #[source]
        error: std::io::Error,
    },

    /// A sink failed to write its output.
    #[error(transparent)]
    Write(#[from] WriteEventError),
}

/// An error that occurred while loading a [`ReporterConfig`](crate::config::ReporterConfig).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigReadError {
    /// A config file was explicitly requested, but does not exist.
    #[error("config file not found at `{path}`")]
    FileNotFound {
        /// The path that was requested.
        path: Utf8PathBuf,
    },

    /// The config file exists but could not be read.
    #[error("failed to read config file at `{path}`")]
    Read {
        /// The path of the config file.
        path: Utf8PathBuf,

        /// The underlying IO error.
        #[source]
        error: std::io::Error,
    },

    /// The config file could not be parsed.
    #[error("failed to parse config file at `{path}`")]
    Parse {
        /// The path of the config file.
        path: Utf8PathBuf,

        /// The underlying TOML error.
        #[source]
        error: toml::de::Error,
    },

    /// No attachments directory was configured, and the system temporary
    /// directory is not valid UTF-8.
    #[error("temporary directory `{}` is not valid UTF-8", .path.display())]
    TempDirNotUtf8 {
        /// The temporary directory.
        path: std::path::PathBuf,
    },
}

/// An error that prevents a finished test case from being turned into a
/// [`TestResult`](casetally_metadata::TestResult).
///
/// These indicate that the upstream message source broke its ordering
/// contract: every instance that finishes must have started, and every started
/// test case must have been declared along with its pickle.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum FinalizeError {
    /// A finish event referenced an instance that never started, or that
    /// already finished.
    #[error("test case instance `{instance_id}` finished without having started")]
    UnknownInstance {
        /// The runtime instance ID.
        instance_id: String,
    },

    /// The started instance referenced a test case that was never declared.
    #[error("test case `{test_case_id}` (instance `{instance_id}`) was never declared")]
    UndeclaredTestCase {
        /// The runtime instance ID.
        instance_id: String,

        /// The test case ID the instance referenced.
        test_case_id: String,
    },

    /// The declared test case referenced a pickle that was never observed.
    #[error("pickle `{pickle_id}` for test case `{test_case_id}` was never observed")]
    UnknownPickle {
        /// The test case ID.
        test_case_id: String,

        /// The pickle ID the test case referenced.
        pickle_id: String,
    },
}

/// An error that occurred while staging an attachment on disk.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AttachmentWriteError {
    /// The attachment body was not valid base64.
    #[error("attachment for `{path}` is not valid base64")]
    Decode {
        /// The path the attachment would have been written to.
        path: Utf8PathBuf,

        /// The underlying decode error.
        #[source]
        error: base64::DecodeError,
    },

    /// Writing the attachment to disk failed.
    #[error("failed to write attachment to `{path}`")]
    Write {
        /// The path being written to.
        path: Utf8PathBuf,

        /// The underlying IO error.
        #[source]
        error: std::io::Error,
    },

    /// The task writing the attachment panicked or was cancelled.
    #[error("attachment write task for `{path}` did not complete")]
    Join {
        /// The path being written to.
        path: Utf8PathBuf,

        /// The underlying join error.
        #[source]
        error: tokio::task::JoinError,
    },
}

/// An error that occurs while writing an event to a sink.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteEventError {
    /// An error occurred while writing the event to the provided output.
    #[error("error writing to output")]
    Io(#[source] std::io::Error),

    /// An error occurred while serializing an event to JSON.
    #[error("error serializing event to JSON")]
    Json(#[source] serde_json::Error),

    /// An error occurred while operating on the file system.
    #[error("error operating on path {file}")]
    Fs {
        /// The file being operated on.
        file: Utf8PathBuf,

        /// The underlying IO error.
        #[source]
        error: std::io::Error,
    },

    /// An error occurred while producing JUnit XML.
    #[error("error writing JUnit output to {file}")]
    Junit {
        /// The output file.
        file: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: quick_junit::SerializeError,
    },
}

/// Displays an error along with its chain of sources, one per line.
pub struct DisplayErrorChain<E> {
    error: E,
}

impl<E: Error> DisplayErrorChain<E> {
    /// Creates a new `DisplayErrorChain`.
    pub fn new(error: E) -> Self {
        Self { error }
    }
}

impl<E: Error> fmt::Display for DisplayErrorChain<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        let mut source = self.error.source();
        while let Some(error) = source {
            write!(f, "\n  caused by: {error}")?;
            source = error.source();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_error_chain() {
        let error = ConfigReadError::Read {
            path: "a/b.toml".into(),
            error: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            DisplayErrorChain::new(&error).to_string(),
            "failed to read config file at `a/b.toml`\n  caused by: denied"
        );
    }
}
