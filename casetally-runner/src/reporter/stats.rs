// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use casetally_metadata::ResultStatus;
use serde::Serialize;

/// Counts of finished test cases, by status.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct RunStats {
    /// The number of cases that passed.
    pub passed: usize,

    /// The number of cases that failed.
    pub failed: usize,

    /// The number of cases that were skipped.
    pub skipped: usize,
}

impl RunStats {
    /// Records one finished case.
    pub fn on_result(&mut self, status: ResultStatus) {
        match status {
            ResultStatus::Passed => self.passed += 1,
            ResultStatus::Skipped => self.skipped += 1,
            ResultStatus::Failed => self.failed += 1,
        }
    }

    /// The total number of finished cases.
    pub fn finished_count(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    /// Returns true if any case failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
