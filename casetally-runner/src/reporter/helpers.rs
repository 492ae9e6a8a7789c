// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use casetally_metadata::ResultStatus;
use owo_colors::Style;

#[derive(Clone, Debug, Default)]
pub(super) struct Styles {
    pub(super) count: Style,
    pub(super) pass: Style,
    pub(super) fail: Style,
    pub(super) skip: Style,
    pub(super) suite: Style,
    pub(super) case_id: Style,
}

impl Styles {
    pub(super) fn colorize(&mut self) {
        self.count = Style::new().bold();
        self.pass = Style::new().green().bold();
        self.fail = Style::new().red().bold();
        self.skip = Style::new().yellow().bold();
        self.suite = Style::new().magenta().bold();
        self.case_id = Style::new().blue().bold();
    }

    pub(super) fn for_status(&self, status: ResultStatus) -> Style {
        match status {
            ResultStatus::Passed => self.pass,
            ResultStatus::Skipped => self.skip,
            ResultStatus::Failed => self.fail,
        }
    }
}
