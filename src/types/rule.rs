use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::RuleKind;
use super::value::Map;

/// One node of a hierarchical rule tree: the root `default` rule or a
/// nested child rule.
///
/// Produced by [`RulesBuilder`](crate::RulesBuilder) and immutable once
/// returned. Serializes to the camel-cased shape the rules API expects;
/// empty and absent fields are omitted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Rule {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_secure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria_must_satisfy: Option<CriteriaMustSatisfy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria_locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced_override: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_override: Option<CustomOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_link: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Variable>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub behaviors: Vec<RuleItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub criteria: Vec<RuleItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Rule>,
}

impl Rule {
    #[must_use]
    pub fn kind(&self) -> RuleKind {
        RuleKind::of(&self.name)
    }
}

/// A configured behavior or criterion attached to a rule.
///
/// Order within [`Rule::behaviors`] / [`Rule::criteria`] is execution order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleItem {
    pub name: String,
    #[serde(default)]
    pub options: Map,
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uuid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template_uuid: String,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(v: &bool) -> bool {
    !*v
}

/// A user-defined variable declared on the `default` rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Variable {
    pub name: String,
    pub description: String,
    pub value: String,
    pub sensitive: bool,
    pub hidden: bool,
}

/// A reference to a custom override attached to the `default` rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomOverride {
    pub name: String,
    pub override_id: String,
}

/// How a rule's criteria combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriteriaMustSatisfy {
    All,
    Any,
}

impl CriteriaMustSatisfy {
    pub const VARIANTS: &'static [&'static str] = &["all", "any"];
}

impl FromStr for CriteriaMustSatisfy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(CriteriaMustSatisfy::All),
            "any" => Ok(CriteriaMustSatisfy::Any),
            _ => Err(()),
        }
    }
}

impl fmt::Display for CriteriaMustSatisfy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriteriaMustSatisfy::All => write!(f, "all"),
            CriteriaMustSatisfy::Any => write!(f, "any"),
        }
    }
}
