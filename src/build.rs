use tracing::debug;

use crate::read::RulesSchemaReader;
use crate::remap::remap_item;
use crate::serial::{ChildSnapshot, FormattedRules};
use crate::types::{
    BuildError, ConfigSource, CriteriaMustSatisfy, CustomOverride, FormatProfile, FormatRegistry,
    OptionalExt, ReadError, Rule, RuleFormat, RuleItem, RuleKind, Variable,
};

/// Builds one typed [`Rule`] tree from a configuration snapshot.
///
/// A builder is bound to one source and one rule format. It holds no mutable
/// state, so independent builders can run on separate threads sharing the
/// same [`FormatRegistry`].
///
/// # Example
///
/// ```
/// use ruleform::{Document, FormatProfile, FormatRegistry, RulesBuilder, Value};
///
/// let registry = FormatRegistry::builder()
///     .format(FormatProfile::new("v2023-01-05").flatten("caching.max_age"))
///     .build()
///     .unwrap();
///
/// let doc = Document::from_json(r#"{
///     "rules_v2023_01_05": [{
///         "name": "default",
///         "behavior": [{"caching": [{"behavior": "MAX_AGE", "max_age": ["1d"]}]}]
///     }]
/// }"#).unwrap();
///
/// let rule = RulesBuilder::new(&doc, &registry, "v2023-01-05")
///     .unwrap()
///     .build()
///     .unwrap();
/// assert_eq!(rule.behaviors[0].options["maxAge"], Value::from("1d"));
/// ```
#[derive(Debug)]
pub struct RulesBuilder<'a, S: ?Sized> {
    reader: RulesSchemaReader<'a, S>,
    format: &'a FormatProfile,
}

impl<'a, S: ConfigSource + ?Sized> RulesBuilder<'a, S> {
    /// Bind a builder to `source` for the registered format `version`. The
    /// rule is read from the format's rules key (see [`FormatProfile::rules_key`]).
    ///
    /// # Errors
    ///
    /// [`BuildError::Invariant`] if `version` is not registered.
    pub fn new(
        source: &'a S,
        registry: &'a FormatRegistry,
        version: &str,
    ) -> Result<Self, BuildError> {
        let format = registry.profile_for(version)?;
        Ok(Self {
            reader: RulesSchemaReader::new(source, &format.rules_key()),
            format,
        })
    }

    /// Bind a builder to an already-positioned reader.
    pub fn with_reader(reader: RulesSchemaReader<'a, S>, format: &'a FormatProfile) -> Self {
        Self { reader, format }
    }

    #[must_use]
    pub fn rule_format(&self) -> &str {
        self.format.version()
    }

    /// Build the rule tree.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] on the first malformed field, illegal field
    /// combination, invalid child snapshot or profile inconsistency. No
    /// partial rule is returned.
    pub fn build(&self) -> Result<Rule, BuildError> {
        let r = &self.reader;
        let name = r.get_string("name")?;
        debug!(rule = %name, format = self.rule_format(), "building rule");

        let rule = Rule {
            comments: r.get_string("comments").optional()?,
            is_secure: r.get_bool("is_secure").optional()?,
            criteria_must_satisfy: self.criteria_must_satisfy()?,
            criteria_locked: r.get_bool("criteria_locked").optional()?,
            advanced_override: r.get_string("advanced_override").optional()?,
            custom_override: self.custom_override()?,
            uuid: r.get_string("uuid").optional()?,
            template_uuid: r.get_string("template_uuid").optional()?,
            template_link: r.get_string("template_link").optional()?,
            variables: self.variables()?,
            behaviors: self.rule_items("behavior")?,
            criteria: self.rule_items("criterion")?,
            children: self.children()?,
            name,
        };

        check_fields(&rule)?;
        debug!(
            rule = %rule.name,
            behaviors = rule.behaviors.len(),
            criteria = rule.criteria.len(),
            children = rule.children.len(),
            "rule built"
        );
        Ok(rule)
    }

    /// Build the rule tree and tag it with this builder's rule format.
    ///
    /// # Errors
    ///
    /// See [`build`](Self::build).
    pub fn build_formatted(&self) -> Result<FormattedRules, BuildError> {
        Ok(FormattedRules::new(self.rule_format(), self.build()?))
    }

    fn criteria_must_satisfy(&self) -> Result<Option<CriteriaMustSatisfy>, BuildError> {
        let Some(raw) = self.reader.get_string("criteria_must_satisfy").optional()? else {
            return Ok(None);
        };
        raw.parse().map(Some).map_err(|()| {
            BuildError::Read(ReadError::TypeMismatch {
                wanted: format!("one of {}", CriteriaMustSatisfy::VARIANTS.join(", ")),
                got: format!("{raw:?}"),
                path: self.reader.root().clone().key("criteria_must_satisfy").to_string(),
            })
        })
    }

    /// Only the block itself may be absent. Once present, a missing or null
    /// field inside it is an error.
    fn custom_override(&self) -> Result<Option<CustomOverride>, BuildError> {
        match self.reader.get_list("custom_override").optional()? {
            None | Some([]) => Ok(None),
            Some(_) => Ok(Some(self.reader.get_custom_override("custom_override")?)),
        }
    }

    fn variables(&self) -> Result<Vec<Variable>, BuildError> {
        if self.reader.get_list("variable").optional()?.is_none() {
            return Ok(Vec::new());
        }
        Ok(self.reader.get_variables("variable")?)
    }

    fn rule_items(&self, path: &str) -> Result<Vec<RuleItem>, BuildError> {
        let items = self
            .reader
            .list_rule_items(path)
            .optional()?
            .unwrap_or_default();
        items
            .into_iter()
            .map(|item| remap_item(self.format, item).map_err(BuildError::from))
            .collect()
    }

    fn children(&self) -> Result<Vec<Rule>, BuildError> {
        let Some(snapshots) = self.reader.get_strings("children").optional()? else {
            return Ok(Vec::new());
        };
        snapshots
            .iter()
            .enumerate()
            .map(|(index, text)| -> Result<Rule, BuildError> {
                let snapshot = ChildSnapshot::from_json(text)
                    .map_err(|source| BuildError::InvalidChild { index, source })?;
                let child = snapshot.into_rule(self.rule_format())?;
                validate(&child)?;
                Ok(child)
            })
            .collect()
    }
}

/// Check the field-legality table for `rule` and, recursively, its children.
///
/// # Errors
///
/// [`BuildError::FieldNotAllowed`] for the first field populated on the
/// wrong kind of rule.
pub fn validate(rule: &Rule) -> Result<(), BuildError> {
    check_fields(rule)?;
    rule.children.iter().try_for_each(validate)
}

fn check_fields(rule: &Rule) -> Result<(), BuildError> {
    let kind = rule.kind();
    let fields = [
        ("variables", !rule.variables.is_empty(), RuleKind::Default),
        ("is_secure", rule.is_secure.is_some(), RuleKind::Default),
        ("advanced_override", rule.advanced_override.is_some(), RuleKind::Default),
        ("custom_override", rule.custom_override.is_some(), RuleKind::Default),
        ("criteria", !rule.criteria.is_empty(), RuleKind::Child),
        ("criteria_must_satisfy", rule.criteria_must_satisfy.is_some(), RuleKind::Child),
        ("criteria_locked", rule.criteria_locked.is_some(), RuleKind::Child),
    ];
    for (field, present, legal_in) in fields {
        if present && kind != legal_in {
            return Err(BuildError::FieldNotAllowed {
                field,
                rule_kind: kind,
            });
        }
    }
    Ok(())
}
