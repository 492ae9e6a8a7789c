// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    registry::{CaseRunRegistry, DocumentIndex, PickleRegistry},
    tracker::RunState,
};
use crate::{errors::FinalizeError, messages::TestCaseFinished};
use casetally_metadata::{AttachmentRef, TestResult};
use tracing::debug;

/// Joins the stored state for a finished instance into a [`TestResult`].
///
/// `attachments` are the instance's staged attachments whose writes
/// succeeded, in the order they were produced.
pub fn finalize(
    finished: &TestCaseFinished,
    state: &RunState,
    cases: &CaseRunRegistry,
    pickles: &PickleRegistry,
    documents: &DocumentIndex,
    attachments: Vec<AttachmentRef>,
) -> Result<TestResult, FinalizeError> {
    let started = state.started();
    let pickle_id =
        cases
            .pickle_id(&started.test_case_id)
            .ok_or_else(|| FinalizeError::UndeclaredTestCase {
                instance_id: started.id.clone(),
                test_case_id: started.test_case_id.clone(),
            })?;
    let pickle = pickles
        .get(pickle_id)
        .ok_or_else(|| FinalizeError::UnknownPickle {
            test_case_id: started.test_case_id.clone(),
            pickle_id: pickle_id.to_owned(),
        })?;

    let suite_path = pickle
        .last_ast_node_id
        .as_deref()
        .and_then(|node_id| documents.feature_name(node_id))
        .unwrap_or_default()
        .to_owned();

    let messages = state.error_messages();
    let error = messages
        .first()
        .and_then(|message| message.split('\n').next())
        .map(str::to_owned);
    let stacktrace = (!messages.is_empty()).then(|| messages.join("\n\n"));

    let case_ids: Vec<u64> = pickle
        .case_ids
        .iter()
        .filter_map(|id| match id.parse() {
            Ok(id) => Some(id),
            Err(error) => {
                debug!("dropping case ID `{id}` of `{}`: {error}", pickle.name);
                None
            }
        })
        .collect();

    Ok(TestResult {
        id: started.id.clone(),
        title: pickle.name.clone(),
        case_ids: (!case_ids.is_empty()).then_some(case_ids),
        status: state.status(),
        duration: finished.timestamp.abs_diff_seconds(started.timestamp),
        error,
        suite_path,
        stacktrace,
        attachments,
    })
}
