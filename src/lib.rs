//! Build typed, versioned rule trees from dynamic configuration.
//!
//! A host configuration system hands over an untyped tree of maps, lists and
//! scalars. [`RulesBuilder`] reads one rule out of it through a typed
//! [`RulesSchemaReader`], resolves its behaviors and criteria, remaps their
//! options according to the active [`FormatProfile`], enforces which fields
//! are legal on the root `default` rule versus nested rules, and attaches
//! child rules decoded from serialized snapshots.
//!
//! ```
//! use ruleform::{Document, FormatProfile, FormatRegistry, RulesBuilder};
//!
//! let registry = FormatRegistry::builder()
//!     .format(FormatProfile::new("v2023-01-05").remap_name("caching.edge_ttl", "ttl"))
//!     .build()
//!     .unwrap();
//!
//! let doc = Document::from_json(r#"{
//!     "rules_v2023_01_05": [{
//!         "name": "default",
//!         "behavior": [{"caching": [{"edge_ttl": "7d"}]}]
//!     }]
//! }"#).unwrap();
//!
//! let rules = RulesBuilder::new(&doc, &registry, "v2023-01-05")
//!     .unwrap()
//!     .build_formatted()
//!     .unwrap();
//! assert_eq!(
//!     rules.to_json().unwrap(),
//!     r#"{"_ruleFormat_":"v2023-01-05","rules":{"name":"default","behaviors":[{"name":"caching","options":{"ttl":"7d"}}]}}"#
//! );
//! ```

mod build;
mod error;
pub mod parse;
mod read;
pub mod remap;
pub mod serial;
mod types;

pub use build::{RulesBuilder, validate};
pub use error::Error;
pub use parse::{Path, PathError, Segment};
pub use read::RulesSchemaReader;
pub use serial::{ChildSnapshot, FormattedRules};
pub use types::{
    BuildError, ConfigSource, CriteriaMustSatisfy, CustomOverride, Document, FormatProfile,
    FormatRegistry, FormatRegistryBuilder, InvariantViolation, Map, OptionalExt, ReadError,
    RegistryError, Rule, RuleFormat, RuleItem, RuleKind, Value, Variable, rules_key,
};
