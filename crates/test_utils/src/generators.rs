//! Property-Based Test Generators
//!
//! Proptest strategies for suggestion lists and index selections.

use domain_claims::{AiSuggestion, SuggestionKind};
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Strategy for suggestion kinds
pub fn suggestion_kind_strategy() -> impl Strategy<Value = SuggestionKind> {
    prop_oneof![
        Just(SuggestionKind::Cpt),
        Just(SuggestionKind::Modifier),
        Just(SuggestionKind::Icd10),
        Just(SuggestionKind::Pos),
    ]
}

/// Strategy for a prior approval decision
pub fn decision_strategy() -> impl Strategy<Value = Option<bool>> {
    prop_oneof![Just(None), Just(Some(true)), Just(Some(false))]
}

/// Strategy for one suggestion with any prior decision
pub fn suggestion_strategy() -> impl Strategy<Value = AiSuggestion> {
    (suggestion_kind_strategy(), "[0-9]{5}", "[0-9]{5}", decision_strategy()).prop_map(
        |(kind, from, to, approved)| {
            let mut suggestion = match kind {
                SuggestionKind::Modifier => AiSuggestion::addition(kind, &from[..2], "generated"),
                _ => AiSuggestion::replace(kind, from, to, "generated"),
            };
            suggestion.approved = approved;
            suggestion
        },
    )
}

/// Strategy for a non-empty suggestion list
pub fn suggestion_list_strategy(max: usize) -> impl Strategy<Value = Vec<AiSuggestion>> {
    proptest::collection::vec(suggestion_strategy(), 1..=max)
}

/// Strategy for index sets that may reach past `len`
pub fn index_set_strategy(len: usize) -> impl Strategy<Value = BTreeSet<usize>> {
    proptest::collection::btree_set(0..len + 3, 0..=len)
}
