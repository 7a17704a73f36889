use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{InvariantViolation, RegistryError};
use super::value::Value;

/// The three per-version lookups the option remapper consumes.
///
/// All paths are qualified option paths such as `caching.ttl`, built from the
/// behavior/criterion name followed by each option name on the way down.
pub trait RuleFormat {
    /// The version identifier, e.g. `v2023-01-05`.
    fn version(&self) -> &str;

    /// Canonical API name for the option at `path`, if it differs from the
    /// lower-camel form of the configuration name.
    fn name_remap(&self, path: &str) -> Option<&str>;

    /// Replacement literal for the key `path.literal`.
    fn type_mapping(&self, key: &str) -> Option<&Value>;

    /// Whether the option at `path` is a singleton object wrapped in a list.
    fn should_flatten(&self, path: &str) -> bool;
}

/// A table-driven rule-format definition.
///
/// Profiles are constructed with chained setters or deserialized from a
/// registry document, then frozen inside a [`FormatRegistry`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatProfile {
    version: String,
    #[serde(default)]
    name_remap: HashMap<String, String>,
    #[serde(default)]
    type_mappings: HashMap<String, Value>,
    #[serde(default)]
    flatten: HashSet<String>,
}

impl FormatProfile {
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// Rename the option at `path` to `canonical` in built documents.
    #[must_use]
    pub fn remap_name(mut self, path: &str, canonical: &str) -> Self {
        self.name_remap.insert(path.to_owned(), canonical.to_owned());
        self
    }

    /// Replace the value at `path` with `to` whenever its literal form is `literal`.
    #[must_use]
    pub fn map_type(mut self, path: &str, literal: &str, to: impl Into<Value>) -> Self {
        self.type_mappings
            .insert(format!("{path}.{literal}"), to.into());
        self
    }

    /// Mark the option at `path` as a one-element list to be flattened.
    #[must_use]
    pub fn flatten(mut self, path: &str) -> Self {
        self.flatten.insert(path.to_owned());
        self
    }

    /// The config-tree key under which rules of this format are stored,
    /// e.g. `rules_v2023_01_05` for `v2023-01-05`.
    #[must_use]
    pub fn rules_key(&self) -> String {
        rules_key(&self.version)
    }
}

/// Config-tree key for rules of the given format version.
#[must_use]
pub fn rules_key(version: &str) -> String {
    format!("rules_{}", version.replace('-', "_"))
}

impl RuleFormat for FormatProfile {
    fn version(&self) -> &str {
        &self.version
    }

    fn name_remap(&self, path: &str) -> Option<&str> {
        self.name_remap.get(path).map(String::as_str)
    }

    fn type_mapping(&self, key: &str) -> Option<&Value> {
        self.type_mappings.get(key)
    }

    fn should_flatten(&self, path: &str) -> bool {
        self.flatten.contains(path)
    }
}

/// Immutable set of known rule formats, keyed by version.
///
/// Built once at start-up and shared by reference (or behind `Arc`) with
/// every builder. There is no way to mutate a registry after `build()`.
#[derive(Debug, Default)]
pub struct FormatRegistry {
    profiles: HashMap<String, FormatProfile>,
}

/// Builder for a [`FormatRegistry`].
#[derive(Debug, Default)]
pub struct FormatRegistryBuilder {
    profiles: Vec<FormatProfile>,
}

#[derive(Debug, Deserialize)]
struct RegistryDocument {
    formats: Vec<FormatProfile>,
}

impl FormatRegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn format(mut self, profile: FormatProfile) -> Self {
        self.profiles.push(profile);
        self
    }

    /// Freeze the collected profiles into a registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] on an empty or duplicated version.
    pub fn build(self) -> Result<FormatRegistry, RegistryError> {
        let mut profiles = HashMap::with_capacity(self.profiles.len());
        for profile in self.profiles {
            if profile.version.is_empty() {
                return Err(RegistryError::EmptyVersion);
            }
            if profiles.contains_key(&profile.version) {
                return Err(RegistryError::DuplicateFormat {
                    version: profile.version,
                });
            }
            profiles.insert(profile.version.clone(), profile);
        }
        debug!(formats = profiles.len(), "rule format registry built");
        Ok(FormatRegistry { profiles })
    }
}

impl FormatRegistry {
    #[must_use]
    pub fn builder() -> FormatRegistryBuilder {
        FormatRegistryBuilder::new()
    }

    /// Look up the profile for `version`.
    ///
    /// # Errors
    ///
    /// An unregistered version is an [`InvariantViolation::UnknownRuleFormat`]:
    /// callers are expected to only pass versions they registered.
    pub fn profile_for(&self, version: &str) -> Result<&FormatProfile, InvariantViolation> {
        self.profiles
            .get(version)
            .ok_or_else(|| InvariantViolation::UnknownRuleFormat {
                version: version.to_owned(),
            })
    }

    #[must_use]
    pub fn contains(&self, version: &str) -> bool {
        self.profiles.contains_key(version)
    }

    /// Registered versions in ascending order.
    #[must_use]
    pub fn versions(&self) -> Vec<&str> {
        let mut versions: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        versions.sort_unstable();
        versions
    }

    /// Load a registry from a JSON document of the form
    /// `{"formats": [{"version": ..., "name_remap": {..}, "type_mappings": {..}, "flatten": [..]}]}`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] on malformed JSON or an invalid profile set.
    pub fn from_json(input: &str) -> Result<Self, RegistryError> {
        let doc: RegistryDocument = serde_json::from_str(input)?;
        doc.formats
            .into_iter()
            .fold(Self::builder(), FormatRegistryBuilder::format)
            .build()
    }

    /// Read a JSON registry document from a file.
    ///
    /// # Errors
    ///
    /// Returns [`Error`](crate::Error) on I/O failure or an invalid document.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::Error> {
        let input = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&input)?)
    }
}

impl fmt::Display for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FormatRegistry({})", self.versions().join(", "))
    }
}
