// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Consumers of finished test results.
//!
//! [`ResultSink`] is the interface the aggregator reports through.
//! [`Reporter`] is the standard sink: it prints to standard error, and
//! optionally writes JSON lines and a JUnit report.

mod displayer;
mod helpers;
mod imp;
mod junit;
mod sink;
mod stats;
mod structured;

pub use imp::{Reporter, ReporterBuilder, ReporterStderr};
pub use junit::JunitConfig;
pub use sink::{Diagnostic, DiagnosticKind, EndOptions, ResultSink};
pub use stats::RunStats;
pub use structured::StructuredReporter;
