// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns a Cucumber message stream into one test result per executed test
//! case.
//!
//! Run `casetally report` with the NDJSON output of a Cucumber run on
//! standard input (or `--input <PATH>`).

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::{OutputContext, OutputWriter, StderrStyles};
