// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for casetally.
//!
//! casetally consumes the Cucumber message stream produced by a test run and
//! reduces it into exactly one [`TestResult`](casetally_metadata::TestResult)
//! per executed test case, however the events for concurrently-running cases
//! are interleaved.
//!
//! The basic flow is:
//!
//! 1. Each line of the stream is decoded into an
//!    [`Envelope`](messages::Envelope).
//! 2. An [`EventAggregator`](aggregator::EventAggregator) folds envelopes into
//!    per-instance state, and finalizes a result when a case finishes.
//! 3. Finished results are handed to a [`ResultSink`](reporter::ResultSink),
//!    typically a [`Reporter`](reporter::Reporter) that prints, writes JSON
//!    lines and aggregates a JUnit report.

pub mod aggregator;
pub mod config;
pub mod errors;
mod helpers;
pub mod messages;
pub mod reporter;
