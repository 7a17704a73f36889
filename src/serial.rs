//! Serialized forms of built rule trees.
//!
//! A top-level document is wrapped together with the rule format it was
//! built for. The format tag is written first so that a reader can check it
//! before looking at the rest of the payload:
//!
//! ```text
//! {"_ruleFormat_": "v2023-01-05", "rules": { ...Rule... }}
//! ```
//!
//! Child rules are stored in the configuration tree as independent snapshots
//! in this same shape. When a parent is built, each snapshot is decoded, its
//! tag (if any) is checked against the parent's format and then discarded.

use serde::{Deserialize, Serialize};

use crate::types::{BuildError, Rule};

/// Reserved key carrying the rule format version.
pub const RULE_FORMAT_KEY: &str = "_ruleFormat_";

/// A built rule tree tagged with its rule format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedRules {
    #[serde(rename = "_ruleFormat_")]
    pub rule_format: String,
    pub rules: Rule,
}

impl FormattedRules {
    #[must_use]
    pub fn new(rule_format: impl Into<String>, rules: Rule) -> Self {
        Self {
            rule_format: rule_format.into(),
            rules,
        }
    }

    /// # Errors
    ///
    /// Returns the `serde_json` error if encoding fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// # Errors
    ///
    /// Returns the `serde_json` error if encoding fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// A decoded child snapshot whose format tag has not been checked yet.
///
/// Decoding rejects unknown keys at every level of the rule tree, so a
/// misspelled field fails instead of escaping the legality check.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChildSnapshot {
    #[serde(rename = "_ruleFormat_", default)]
    pub rule_format: Option<String>,
    pub rules: Rule,
}

impl ChildSnapshot {
    /// # Errors
    ///
    /// Returns the `serde_json` error if `input` is not a rule snapshot.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    /// Check the snapshot's tag against `parent_format` and strip it.
    /// An untagged snapshot inherits the parent's format.
    ///
    /// # Errors
    ///
    /// [`BuildError::FormatMismatch`] when the tag names another format.
    pub fn into_rule(self, parent_format: &str) -> Result<Rule, BuildError> {
        match self.rule_format {
            Some(child) if child != parent_format => Err(BuildError::FormatMismatch {
                child,
                parent: parent_format.to_owned(),
            }),
            _ => Ok(self.rules),
        }
    }
}

impl Rule {
    /// Serialize this rule as a child snapshot tagged with `rule_format`.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if encoding fails.
    pub fn to_snapshot(&self, rule_format: &str) -> Result<String, serde_json::Error> {
        #[derive(Serialize)]
        struct Tagged<'a> {
            #[serde(rename = "_ruleFormat_")]
            rule_format: &'a str,
            rules: &'a Rule,
        }
        serde_json::to_string(&Tagged {
            rule_format,
            rules: self,
        })
    }
}
