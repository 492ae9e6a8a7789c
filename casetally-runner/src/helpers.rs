// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Utilities for pluralizing various words based on count or plurality.
pub(crate) mod plural {
    /// Returns "test case" if `count` is 1, otherwise "test cases".
    pub(crate) fn test_cases_str(count: usize) -> &'static str {
        if count == 1 { "test case" } else { "test cases" }
    }

    /// Returns "was" if `count` is 1, otherwise "were".
    pub(crate) fn was_were(count: usize) -> &'static str {
        if count == 1 { "was" } else { "were" }
    }
}

#[cfg(test)]
mod tests {
    use super::plural::*;

    #[test]
    fn pluralization() {
        assert_eq!(test_cases_str(0), "test cases");
        assert_eq!(test_cases_str(1), "test case");
        assert_eq!(test_cases_str(2), "test cases");
        assert_eq!(was_were(1), "was");
        assert_eq!(was_were(3), "were");
    }
}
