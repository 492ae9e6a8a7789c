// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use camino::Utf8PathBuf;
use casetally_metadata::CasetallyExitCode;
use casetally_runner::errors::{ConfigReadError, ConsumeError, WriteEventError};
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;
use tracing::error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// The #[error()] strings are placeholders: errors are meant to be printed with
// display_to_stderr, which colorizes them.

/// A failure casetally knows how to report.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("could not determine current directory")]
    CurrentDirFailed {
        #[source]
        err: std::io::Error,
    },
    #[error("current directory is not valid UTF-8")]
    CurrentDirNotUtf8 { path: std::path::PathBuf },
    #[error("config read error")]
    ConfigReadError {
        #[from]
        err: ConfigReadError,
    },
    #[error("failed to create attachments directory")]
    AttachmentsDirCreateError {
        dir: Utf8PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("failed to create async runtime")]
    RuntimeBuildError {
        #[source]
        err: std::io::Error,
    },
    #[error("failed to open input")]
    InputOpenError {
        path: Utf8PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("failed to create output file")]
    OutputCreateError {
        path: Utf8PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("failed to consume message stream")]
    ConsumeError {
        #[from]
        err: ConsumeError,
    },
    #[error("failed to write results")]
    WriteEventError {
        #[from]
        err: WriteEventError,
    },
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::CurrentDirFailed { .. }
            | Self::CurrentDirNotUtf8 { .. }
            | Self::ConfigReadError { .. }
            | Self::AttachmentsDirCreateError { .. }
            | Self::RuntimeBuildError { .. } => CasetallyExitCode::SETUP_ERROR,
            Self::InputOpenError { .. } => CasetallyExitCode::INPUT_READ_FAILED,
            Self::ConsumeError {
                err: ConsumeError::Write(_),
            } => CasetallyExitCode::WRITE_OUTPUT_ERROR,
            Self::ConsumeError { .. } => CasetallyExitCode::INPUT_READ_FAILED,
            Self::OutputCreateError { .. } | Self::WriteEventError { .. } => {
                CasetallyExitCode::WRITE_OUTPUT_ERROR
            }
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match self {
            Self::CurrentDirFailed { err } => {
                error!("could not determine current directory");
                Some(err as &dyn Error)
            }
            Self::CurrentDirNotUtf8 { path } => {
                error!(
                    "current directory `{}` is not valid UTF-8",
                    path.display().style(styles.bold)
                );
                None
            }
            Self::ConfigReadError { err } => {
                error!("{err}");
                err.source()
            }
            Self::AttachmentsDirCreateError { dir, err } => {
                error!(
                    "failed to create attachments directory `{}`",
                    dir.style(styles.bold)
                );
                Some(err as &dyn Error)
            }
            Self::RuntimeBuildError { err } => {
                error!("failed to create async runtime");
                Some(err as &dyn Error)
            }
            Self::InputOpenError { path, err } => {
                error!("failed to open input `{}`", path.style(styles.bold));
                Some(err as &dyn Error)
            }
            Self::OutputCreateError { path, err } => {
                error!("failed to create output file `{}`", path.style(styles.bold));
                Some(err as &dyn Error)
            }
            Self::ConsumeError {
                err: ConsumeError::Write(err),
            }
            | Self::WriteEventError { err } => {
                error!("failed to write results");
                Some(err as &dyn Error)
            }
            Self::ConsumeError { err } => {
                error!("{err}");
                if let ConsumeError::Read { .. } = err {
                    error!(
                        target: NO_HEADING_TARGET,
                        "{}",
                        "(results for instances finished before this point were already reported)"
                            .style(styles.warning_text)
                    );
                }
                err.source()
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
