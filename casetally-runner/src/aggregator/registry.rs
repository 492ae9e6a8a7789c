// Copyright (c) The casetally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static metadata gathered before test cases run: which feature owns each
//! scenario, what each pickle is called and tagged with, and which pickle each
//! test case executes.

use super::tags::extract_case_ids;
use crate::messages::{GherkinDocument, Pickle, TestCase};
use std::collections::HashMap;

/// Maps scenario node IDs to the name of the feature containing them.
///
/// The upstream source emits every document before the pickles and test cases
/// generated from it, so the index is complete by the time any case finishes.
#[derive(Clone, Debug, Default)]
pub struct DocumentIndex {
    feature_names: HashMap<String, String>,
}

impl DocumentIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the feature name for every scenario in the document, including
    /// scenarios nested within rules.
    ///
    /// Documents without a feature name and scenarios without an ID are
    /// skipped.
    pub fn index_document(&mut self, document: &GherkinDocument) {
        let Some(feature) = &document.feature else {
            return;
        };
        let Some(feature_name) = &feature.name else {
            return;
        };

        let scenarios = feature.children.iter().flat_map(|child| {
            let rule_scenarios = child
                .rule
                .iter()
                .flat_map(|rule| rule.children.iter())
                .filter_map(|rule_child| rule_child.scenario.as_ref());
            child.scenario.iter().chain(rule_scenarios)
        });

        for scenario in scenarios {
            if let Some(id) = &scenario.id {
                self.feature_names.insert(id.clone(), feature_name.clone());
            }
        }
    }

    /// Returns the name of the feature containing the given scenario node.
    pub fn feature_name(&self, node_id: &str) -> Option<&str> {
        self.feature_names.get(node_id).map(String::as_str)
    }
}

/// Static information about a compiled scenario.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PickleInfo {
    /// External case IDs extracted from the pickle's tags, in tag order.
    pub case_ids: Vec<String>,

    /// The pickle's display name.
    pub name: String,

    /// The last structural node the pickle references. For a scenario this is
    /// the scenario node, which resolves to its feature through the
    /// [`DocumentIndex`].
    pub last_ast_node_id: Option<String>,
}

impl PickleInfo {
    /// Extracts information from a pickle.
    pub fn from_pickle(pickle: &Pickle) -> Self {
        Self {
            case_ids: extract_case_ids(pickle.tags.iter().map(|tag| tag.name.as_str())),
            name: pickle.name.clone(),
            last_ast_node_id: pickle.ast_node_ids.last().cloned(),
        }
    }
}

/// Maps pickle IDs to [`PickleInfo`].
#[derive(Clone, Debug, Default)]
pub struct PickleRegistry {
    pickles: HashMap<String, PickleInfo>,
}

impl PickleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pickle.
    pub fn insert(&mut self, pickle: &Pickle) {
        self.pickles
            .insert(pickle.id.clone(), PickleInfo::from_pickle(pickle));
    }

    /// Looks up a pickle by ID.
    pub fn get(&self, pickle_id: &str) -> Option<&PickleInfo> {
        self.pickles.get(pickle_id)
    }
}

/// Maps test case IDs to the pickle each one executes.
///
/// Pickle IDs are not validated on declaration; they're resolved when a case
/// finishes.
#[derive(Clone, Debug, Default)]
pub struct CaseRunRegistry {
    pickle_ids: HashMap<String, String>,
}

impl CaseRunRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a test case declaration.
    pub fn declare(&mut self, test_case: &TestCase) {
        self.pickle_ids
            .insert(test_case.id.clone(), test_case.pickle_id.clone());
    }

    /// Returns the pickle ID for the given test case.
    pub fn pickle_id(&self, test_case_id: &str) -> Option<&str> {
        self.pickle_ids.get(test_case_id).map(String::as_str)
    }
}
