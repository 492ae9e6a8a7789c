// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The event aggregation state machine.
//!
//! The main structure in this module is [`EventAggregator`]. Static metadata
//! (documents, pickles, test case declarations) is gathered into registries
//! as it arrives; per-instance state is tracked from the moment an instance
//! starts until it finishes, at which point everything is joined into a
//! [`TestResult`](casetally_metadata::TestResult).

mod attachments;
mod finalize;
mod imp;
mod registry;
mod tags;
mod tracker;

pub use attachments::{AttachmentStager, PendingAttachment, extension_for};
pub use finalize::finalize;
pub use imp::EventAggregator;
pub use registry::{CaseRunRegistry, DocumentIndex, PickleInfo, PickleRegistry};
pub use tags::extract_case_ids;
pub use tracker::{RunState, RunStateTracker, StepOutcome, StepRecord};
