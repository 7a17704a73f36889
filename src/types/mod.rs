mod document;
mod error;
mod format;
mod rule;
mod value;

pub use document::{ConfigSource, Document};
pub use error::{BuildError, InvariantViolation, OptionalExt, ReadError, RegistryError, RuleKind};
pub use format::{FormatProfile, FormatRegistry, FormatRegistryBuilder, RuleFormat, rules_key};
pub use rule::{CriteriaMustSatisfy, CustomOverride, Rule, RuleItem, Variable};
pub use value::{Map, Value};
