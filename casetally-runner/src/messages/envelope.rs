// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::types::*;
use crate::errors::EnvelopeParseError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// One message from the upstream test framework.
///
/// Only the message kinds that contribute to test results are represented.
/// Other kinds (`meta`, `source`, `stepDefinition`, `hook`,
/// `testStepStarted`, ...) are skipped during decoding.
#[derive(Clone, Debug)]
pub enum Envelope {
    /// A source document was parsed.
    GherkinDocument(GherkinDocument),

    /// A scenario was compiled into a pickle.
    Pickle(Pickle),

    /// A test case was declared for a pickle.
    TestCase(TestCase),

    /// The test run started.
    TestRunStarted(TestRunStarted),

    /// The test run finished.
    TestRunFinished(TestRunFinished),

    /// An attachment was produced.
    Attachment(Attachment),

    /// An execution attempt of a test case started.
    TestCaseStarted(TestCaseStarted),

    /// An execution attempt of a test case finished.
    TestCaseFinished(TestCaseFinished),

    /// A step within an execution attempt finished.
    TestStepFinished(TestStepFinished),

    /// A source document failed to parse.
    ParseError(ParseError),
}

impl Envelope {
    /// Decodes one line of a newline-delimited JSON message stream.
    ///
    /// Returns `Ok(None)` for blank lines and for message kinds that do not
    /// contribute to test results.
    pub fn from_json_line(line: &str) -> Result<Option<Self>, EnvelopeParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let value: Value = serde_json::from_str(line).map_err(EnvelopeParseError::Json)?;
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(EnvelopeParseError::NotAnEnvelope {
                    found: json_type_name(&other).to_owned(),
                });
            }
        };
        let len = map.len();
        let mut entries = map.into_iter();
        let (key, body) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            _ => {
                return Err(EnvelopeParseError::NotAnEnvelope {
                    found: format!("an object with {len} keys"),
                });
            }
        };

        let envelope = match key.as_str() {
            "gherkinDocument" => Self::GherkinDocument(decode_body("gherkinDocument", body)?),
            "pickle" => Self::Pickle(decode_body("pickle", body)?),
            "testCase" => Self::TestCase(decode_body("testCase", body)?),
            "testRunStarted" => Self::TestRunStarted(decode_body("testRunStarted", body)?),
            "testRunFinished" => Self::TestRunFinished(decode_body("testRunFinished", body)?),
            "attachment" => Self::Attachment(decode_body("attachment", body)?),
            "testCaseStarted" => Self::TestCaseStarted(decode_body("testCaseStarted", body)?),
            "testCaseFinished" => Self::TestCaseFinished(decode_body("testCaseFinished", body)?),
            "testStepFinished" => Self::TestStepFinished(decode_body("testStepFinished", body)?),
            "parseError" => Self::ParseError(decode_body("parseError", body)?),
            other => {
                debug!("skipping `{other}` message");
                return Ok(None);
            }
        };

        Ok(Some(envelope))
    }

    /// Returns the wire name of this message kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::GherkinDocument(_) => "gherkinDocument",
            Self::Pickle(_) => "pickle",
            Self::TestCase(_) => "testCase",
            Self::TestRunStarted(_) => "testRunStarted",
            Self::TestRunFinished(_) => "testRunFinished",
            Self::Attachment(_) => "attachment",
            Self::TestCaseStarted(_) => "testCaseStarted",
            Self::TestCaseFinished(_) => "testCaseFinished",
            Self::TestStepFinished(_) => "testStepFinished",
            Self::ParseError(_) => "parseError",
        }
    }
}

fn decode_body<T: DeserializeOwned>(
    kind: &'static str,
    body: Value,
) -> Result<T, EnvelopeParseError> {
    serde_path_to_error::deserialize(body).map_err(|error| EnvelopeParseError::Body {
        kind,
        path: error.path().to_string(),
        error: error.into_inner(),
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
