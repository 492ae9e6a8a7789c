// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `casetally` failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum CasetallyExitCode {}

impl CasetallyExitCode {
    /// No errors occurred and casetally exited normally.
    pub const OK: i32 = 0;

    /// One or more test cases failed, and `--fail-on-failure` was passed.
    pub const TEST_RUN_FAILED: i32 = 100;

    /// The message stream could not be opened or read.
    pub const INPUT_READ_FAILED: i32 = 103;

    /// A user issue happened while setting up a casetally invocation, for
    /// example an unreadable or malformed config file.
    pub const SETUP_ERROR: i32 = 96;

    /// Writing results to stdout, stderr or an output file produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
