//! AI-proposed corrections to a claim's billing codes

use serde::{Deserialize, Serialize};
use std::fmt;

/// What part of the claim a suggestion touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Cpt,
    Modifier,
    Icd10,
    Pos,
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SuggestionKind::Cpt => "CPT",
            SuggestionKind::Modifier => "Modifier",
            SuggestionKind::Icd10 => "ICD-10",
            SuggestionKind::Pos => "POS",
        };
        f.write_str(label)
    }
}

/// One proposed correction
///
/// `approved` is `None` until a reviewer decides. Modifier suggestions
/// usually carry `add` instead of a `from`/`to` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiSuggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add: Option<String>,
    pub reason: String,
    #[serde(default)]
    pub approved: Option<bool>,
}

impl AiSuggestion {
    /// A replacement of one value with another
    pub fn replace(
        kind: SuggestionKind,
        from: impl Into<String>,
        to: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            from: Some(from.into()),
            to: Some(to.into()),
            add: None,
            reason: reason.into(),
            approved: None,
        }
    }

    /// An addition, typically a modifier
    pub fn addition(kind: SuggestionKind, add: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            from: None,
            to: None,
            add: Some(add.into()),
            reason: reason.into(),
            approved: None,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.approved == Some(true)
    }

    pub fn is_decided(&self) -> bool {
        self.approved.is_some()
    }

    /// Short change description, e.g. `99214 → 99213` or `+25`
    pub fn summary(&self) -> String {
        match (&self.from, &self.to, &self.add) {
            (_, _, Some(add)) => format!("+{}", add),
            (Some(from), Some(to), None) => format!("{} → {}", from, to),
            (None, Some(to), None) => to.clone(),
            (Some(from), None, None) => format!("-{}", from),
            (None, None, None) => String::new(),
        }
    }
}
