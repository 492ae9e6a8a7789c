// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message bodies, deserialized from the Cucumber messages JSON format.
//!
//! Only the fields casetally needs are modeled. Unknown fields are ignored.

use serde::{Deserialize, Deserializer, de};
use std::fmt;

/// A point in time, as seconds and nanoseconds since the Unix epoch.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestamp {
    /// Whole seconds since the epoch.
    ///
    /// Protobuf-JSON encoders serialize 64-bit integers as strings, so both
    /// forms are accepted.
    #[serde(deserialize_with = "deserialize_seconds")]
    pub seconds: i64,

    /// Nanoseconds past `seconds`.
    #[serde(default)]
    pub nanos: u32,
}

impl Timestamp {
    /// Creates a timestamp from whole seconds.
    pub fn from_seconds(seconds: i64) -> Self {
        Self { seconds, nanos: 0 }
    }

    /// The absolute difference in whole seconds between two timestamps.
    ///
    /// Never negative, even if `other` is earlier than `self` due to clock
    /// skew.
    pub fn abs_diff_seconds(self, other: Timestamp) -> u64 {
        self.seconds.abs_diff(other.seconds)
    }
}

fn deserialize_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct SecondsVisitor;

    impl de::Visitor<'_> for SecondsVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer or a string containing an integer")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
            v.parse()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }

    deserializer.deserialize_any(SecondsVisitor)
}

/// A parsed Gherkin document.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GherkinDocument {
    /// The URI of the source file.
    #[serde(default)]
    pub uri: Option<String>,

    /// The feature defined in the document. Empty documents have none.
    #[serde(default)]
    pub feature: Option<Feature>,
}

/// A feature within a Gherkin document.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    /// The feature's name.
    #[serde(default)]
    pub name: Option<String>,

    /// Backgrounds, scenarios and rules within the feature.
    #[serde(default)]
    pub children: Vec<FeatureChild>,
}

/// A child of a [`Feature`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureChild {
    /// Set if this child is a scenario or scenario outline.
    #[serde(default)]
    pub scenario: Option<Scenario>,

    /// Set if this child is a rule grouping further scenarios.
    #[serde(default)]
    pub rule: Option<Rule>,
}

/// A rule within a feature.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// The rule's name.
    #[serde(default)]
    pub name: Option<String>,

    /// Backgrounds and scenarios within the rule.
    #[serde(default)]
    pub children: Vec<RuleChild>,
}

/// A child of a [`Rule`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleChild {
    /// Set if this child is a scenario or scenario outline.
    #[serde(default)]
    pub scenario: Option<Scenario>,
}

/// A scenario definition, identified by its structural node ID.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    /// The structural node ID.
    #[serde(default)]
    pub id: Option<String>,

    /// The scenario's name.
    #[serde(default)]
    pub name: Option<String>,
}

/// A compiled, fully-parameterized scenario, ready for execution.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pickle {
    /// The pickle ID.
    pub id: String,

    /// The display name.
    pub name: String,

    /// The URI of the source document.
    #[serde(default)]
    pub uri: Option<String>,

    /// Tags attached to the scenario, including inherited ones.
    #[serde(default)]
    pub tags: Vec<PickleTag>,

    /// The structural nodes this pickle was compiled from, outermost first.
    #[serde(default)]
    pub ast_node_ids: Vec<String>,
}

/// A tag attached to a [`Pickle`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickleTag {
    /// The tag text, including the leading `@`.
    pub name: String,

    /// The structural node that declared this tag.
    #[serde(default)]
    pub ast_node_id: Option<String>,
}

/// A test case declaration, pairing a test case ID with a pickle.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    /// The test case ID.
    pub id: String,

    /// The pickle this test case executes.
    pub pickle_id: String,
}

/// The test run started.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunStarted {
    /// When the run started.
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
}

/// The test run finished.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunFinished {
    /// When the run finished.
    #[serde(default)]
    pub timestamp: Option<Timestamp>,

    /// Whether the run was successful overall.
    #[serde(default)]
    pub success: Option<bool>,

    /// An error message, if the run aborted.
    #[serde(default)]
    pub message: Option<String>,
}

/// One execution attempt of a test case started.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseStarted {
    /// The runtime instance ID, distinct for every attempt.
    pub id: String,

    /// The test case being executed.
    pub test_case_id: String,

    /// When the attempt started.
    pub timestamp: Timestamp,

    /// The 0-based retry attempt.
    #[serde(default)]
    pub attempt: u32,
}

/// One execution attempt of a test case finished.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseFinished {
    /// The runtime instance ID.
    pub test_case_started_id: String,

    /// When the attempt finished.
    pub timestamp: Timestamp,

    /// Whether the test case will be retried in a new instance.
    #[serde(default)]
    pub will_be_retried: bool,
}

/// A step within a running instance finished.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStepFinished {
    /// The runtime instance ID.
    pub test_case_started_id: String,

    /// The step ID.
    #[serde(default)]
    pub test_step_id: Option<String>,

    /// The outcome of the step.
    pub test_step_result: TestStepResult,
}

/// The outcome of a step.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStepResult {
    /// The status the step finished with.
    pub status: TestStepResultStatus,

    /// An error message, usually followed by a stack trace.
    #[serde(default)]
    pub message: Option<String>,
}

/// The status a step finished with, as reported upstream.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum TestStepResultStatus {
    /// The step's status could not be determined.
    #[default]
    Unknown,
    /// The step passed.
    Passed,
    /// The step was skipped.
    Skipped,
    /// The step is pending implementation.
    Pending,
    /// No step definition matched the step.
    Undefined,
    /// More than one step definition matched the step.
    Ambiguous,
    /// The step failed.
    Failed,
}

impl TestStepResultStatus {
    /// Returns the upstream name of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Passed => "PASSED",
            Self::Skipped => "SKIPPED",
            Self::Pending => "PENDING",
            Self::Undefined => "UNDEFINED",
            Self::Ambiguous => "AMBIGUOUS",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TestStepResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An attachment produced while a test case was running.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// The runtime instance the attachment belongs to. Attachments produced
    /// outside of a test case have none.
    #[serde(default)]
    pub test_case_started_id: Option<String>,

    /// The payload, encoded as described by `content_encoding`.
    pub body: String,

    /// The media type of the decoded payload.
    pub media_type: String,

    /// How `body` is encoded.
    #[serde(default)]
    pub content_encoding: ContentEncoding,

    /// A suggested file name for the attachment.
    #[serde(default)]
    pub file_name: Option<String>,
}

/// How an [`Attachment`] body is encoded.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentEncoding {
    /// The body is the payload, as text.
    #[default]
    Identity,

    /// The body is the base64-encoded payload.
    Base64,
}

/// The upstream source failed to parse a document.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseError {
    /// Where the failure occurred.
    #[serde(default)]
    pub source: Option<SourceReference>,

    /// The parser's message.
    pub message: String,
}

/// A reference to a location in a source document.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceReference {
    /// The URI of the document.
    #[serde(default)]
    pub uri: Option<String>,

    /// The location within the document.
    #[serde(default)]
    pub location: Option<Location>,
}

/// A line and optional column within a document.
#[derive(Copy, Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// The 1-based line number.
    pub line: u32,

    /// The 1-based column number.
    #[serde(default)]
    pub column: Option<u32>,
}

impl fmt::Display for SourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uri.as_deref().unwrap_or("<unknown>"))?;
        if let Some(location) = self.location {
            write!(f, ":{}", location.line)?;
            if let Some(column) = location.column {
                write!(f, ":{column}")?;
            }
        }
        Ok(())
    }
}
