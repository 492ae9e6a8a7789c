// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The separator between ancestor names in [`TestResult::suite_path`].
pub const SUITE_PATH_SEPARATOR: char = '\t';

/// The final status of a test case.
///
/// The variants are ordered by precedence: a case that saw any failing step is
/// [`Failed`](Self::Failed), otherwise one that saw any skipped step is
/// [`Skipped`](Self::Skipped), otherwise it [`Passed`](Self::Passed). Combining
/// two statuses is therefore [`Ord::max`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    /// Every step passed, or the case had no steps at all.
    #[default]
    Passed,

    /// At least one step was skipped, and none failed.
    Skipped,

    /// At least one step failed.
    Failed,
}

impl ResultStatus {
    /// Returns the lowercase name of this status, as used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            ResultStatus::Passed => "passed",
            ResultStatus::Skipped => "skipped",
            ResultStatus::Failed => "failed",
        }
    }

    /// Returns true if this status is [`Failed`](Self::Failed).
    pub fn is_failure(self) -> bool {
        self == ResultStatus::Failed
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file staged on disk as evidence for a test case.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRef {
    /// The path the attachment was written to.
    pub path: Utf8PathBuf,
}

/// The consolidated result of one executed test case.
///
/// Exactly one of these is produced for every runtime instance that finishes.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// The runtime instance ID this result was produced for.
    pub id: String,

    /// The scenario's display name.
    pub title: String,

    /// External case IDs extracted from the scenario's tags, in tag order.
    ///
    /// `None` if no tag carried a case ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_ids: Option<Vec<u64>>,

    /// The final status.
    pub status: ResultStatus,

    /// Wall-clock duration in whole seconds.
    pub duration: u64,

    /// The first line of the first error message, if any step reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Ancestor names joined by [`SUITE_PATH_SEPARATOR`]. Empty if the owning
    /// feature could not be resolved.
    pub suite_path: String,

    /// Every error message reported for this case, separated by a blank line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stacktrace: Option<String>,

    /// Attachments successfully staged for this case.
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
}

impl TestResult {
    /// Returns the individual ancestor names making up the suite path.
    ///
    /// Yields nothing for an empty suite path.
    pub fn suite_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.suite_path
            .split(SUITE_PATH_SEPARATOR)
            .filter(|name| !name.is_empty())
    }
}

/// Information about a run, emitted once when the run starts.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunHeader {
    /// The project code results are reported against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_code: Option<String>,

    /// An existing run to report into, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,

    /// The run name, with any template placeholders expanded.
    pub run_name: String,

    /// A free-form description of the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_description: Option<String>,

    /// The environment the run executed in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<u64>,

    /// A title for the top-level suite all features are grouped under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_suite_title: Option<String>,
}
