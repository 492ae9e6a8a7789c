// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use regex::Regex;
use std::sync::LazyLock;

/// Matches an external case reference such as `@Q-12`, `@q99` or `@42`.
///
/// The numeric part is the first capture group.
static CASE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i:q)?-*([0-9]+)").expect("case ID regex is valid"));

/// Extracts external case IDs from a scenario's tag labels.
///
/// Labels that don't contain a case reference are dropped. The order of the
/// remaining IDs follows the order of the labels.
pub fn extract_case_ids<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    labels
        .into_iter()
        .filter_map(|label| CASE_ID_REGEX.captures(label))
        .map(|captures| captures[1].to_owned())
        .collect()
}
