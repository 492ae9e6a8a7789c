// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Machine-readable output for casetally.
//!
//! casetally reduces a stream of Cucumber messages into one [`TestResult`] per
//! executed test case. The types in this crate describe those results, the
//! header emitted at the start of a run, and the exit codes the `casetally`
//! binary may produce.
//!
//! All types serialize to camelCase JSON.

mod exit_codes;
mod test_result;

pub use exit_codes::*;
pub use test_result::*;
