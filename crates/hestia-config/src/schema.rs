//! Declared configuration schemas.
//!
//! Schemas are built explicitly at startup with the builder APIs below; there
//! is no runtime type introspection. A [`RootSchema`] pairs a name and a
//! [`ConfigPhase`] with a tree of [`ConfigItem`]s, and the item keys are
//! derived from declared field names by [`hyphenate`] unless overridden.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::convert::ConvertError;
use crate::error::ConfigError;
use crate::registry::TypeKey;
use crate::value::ConfigValue;

/// Lifecycle stage at which a configuration root is bound.
///
/// The binder itself is phase-agnostic; an external scheduler decides which
/// raw value source to consult and when to bind each phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigPhase {
    /// Bound once during the build step; not visible at run time.
    BuildTime,
    /// Bound during the build step; the value is fixed and visible at run time.
    BuildAndRunTimeFixed,
    /// Bound at process start, and potentially re-bound on reload.
    RunTime,
}

impl ConfigPhase {
    /// Whether roots of this phase are read during the build step.
    #[must_use]
    pub const fn available_at_build(self) -> bool {
        matches!(self, Self::BuildTime | Self::BuildAndRunTimeFixed)
    }

    /// Whether roots of this phase are visible to the running process.
    #[must_use]
    pub const fn available_at_run(self) -> bool {
        matches!(self, Self::BuildAndRunTimeFixed | Self::RunTime)
    }
}

/// Derive a dotted-name segment from a declared field name.
///
/// Lower-cases camel-case words and joins them with hyphens, treating runs of
/// capitals as a single word:
///
/// ```
/// use hestia_config::hyphenate;
///
/// assert_eq!(hyphenate("btStringOpt"), "bt-string-opt");
/// assert_eq!(hyphenate("btSBVWithDefault"), "bt-sbv-with-default");
/// ```
#[must_use]
pub fn hyphenate(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let boundary = match chars.get(i.wrapping_sub(1)) {
                None => false,
                // aB is always a word boundary
                Some(prev) if !prev.is_uppercase() => true,
                // ABc breaks before B, AB does not break inside the run
                Some(_) => chars.get(i + 1).is_some_and(|next| next.is_lowercase()),
            };
            if boundary {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Single-string construction path for a wrapper type or an atomic group.
pub type WrapperCtor = Arc<dyn Fn(&str) -> Result<ConfigValue, ConvertError> + Send + Sync>;

/// The declared type of a configuration item.
#[derive(Clone)]
pub enum ItemKind {
    /// A value produced by a registered converter for the given type key.
    Scalar(TypeKey),
    /// A wrapper type with a single-string construction path.
    ///
    /// A converter registered for `type_key` takes precedence over the
    /// constructor; the constructor is the fallback convention.
    Wrapper {
        /// Target type key, resolvable against the registry.
        type_key: TypeKey,
        /// The string construction path.
        ctor: WrapperCtor,
    },
    /// A nested configuration group bound under an extended dotted prefix.
    Group(Arc<GroupSchema>),
}

impl ItemKind {
    /// Declare a scalar item for a registered converter type.
    pub fn scalar(type_key: impl Into<TypeKey>) -> Self {
        Self::Scalar(type_key.into())
    }

    /// Declare a wrapper item with a single-string constructor.
    pub fn wrapper<F>(type_key: impl Into<TypeKey>, ctor: F) -> Self
    where
        F: Fn(&str) -> Result<ConfigValue, ConvertError> + Send + Sync + 'static,
    {
        Self::Wrapper {
            type_key: type_key.into(),
            ctor: Arc::new(ctor),
        }
    }

    /// Declare a nested group item.
    #[must_use]
    pub fn group(schema: GroupSchema) -> Self {
        Self::Group(Arc::new(schema))
    }
}

impl fmt::Debug for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(key) => f.debug_tuple("Scalar").field(key).finish(),
            Self::Wrapper { type_key, .. } => {
                f.debug_struct("Wrapper").field("type_key", type_key).finish_non_exhaustive()
            }
            Self::Group(schema) => f.debug_tuple("Group").field(schema).finish(),
        }
    }
}

/// One declared item of a configuration root or group.
#[derive(Debug, Clone)]
pub struct ConfigItem {
    name: String,
    key: String,
    kind: ItemKind,
    default_value: Option<String>,
    required: bool,
}

impl ConfigItem {
    /// Declare an item. The dotted-name key is derived from `name` by
    /// [`hyphenate`]. Items are required unless marked
    /// [`optional`](Self::optional); a [default](Self::with_default)
    /// satisfies a required item whenever no raw value is present, but an
    /// explicit empty raw value still unsets it.
    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        let name = name.into();
        let key = hyphenate(&name);
        Self {
            name,
            key,
            kind,
            default_value: None,
            required: true,
        }
    }

    /// Override the derived dotted-name key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Declare a default value, used when no raw value is present.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default_value = Some(default.into());
        self
    }

    /// Allow the item to be unset when no raw value and no default exist.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// The declared field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The dotted-name key (derived or overridden).
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The declared type of the item.
    #[must_use]
    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    /// The declared default value, if any.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Whether the item must resolve to a value.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// A declared configuration group: an ordered list of items, optionally with
/// an atomic single-string construction path.
///
/// A group with an atomic constructor can be supplied either piecewise
/// (`a.b.x=1`) or as one raw string at its own dotted name (`a.b=1`).
#[derive(Clone)]
pub struct GroupSchema {
    items: Vec<ConfigItem>,
    atomic_ctor: Option<WrapperCtor>,
}

impl GroupSchema {
    /// Create a new group builder.
    #[must_use]
    pub fn builder() -> GroupSchemaBuilder {
        GroupSchemaBuilder::new()
    }

    /// The declared items, in declaration order.
    #[must_use]
    pub fn items(&self) -> &[ConfigItem] {
        &self.items
    }

    /// The atomic single-string constructor, if the group declares one.
    #[must_use]
    pub fn atomic_ctor(&self) -> Option<&WrapperCtor> {
        self.atomic_ctor.as_ref()
    }
}

impl fmt::Debug for GroupSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupSchema")
            .field("items", &self.items)
            .field("atomic", &self.atomic_ctor.is_some())
            .finish()
    }
}

/// Builder for [`GroupSchema`].
#[derive(Default)]
pub struct GroupSchemaBuilder {
    items: Vec<ConfigItem>,
    atomic_ctor: Option<WrapperCtor>,
}

impl GroupSchemaBuilder {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declared item.
    #[must_use]
    pub fn item(mut self, item: ConfigItem) -> Self {
        self.items.push(item);
        self
    }

    /// Declare an atomic single-string construction path for the whole group.
    #[must_use]
    pub fn atomic_ctor<F>(mut self, ctor: F) -> Self
    where
        F: Fn(&str) -> Result<ConfigValue, ConvertError> + Send + Sync + 'static,
    {
        self.atomic_ctor = Some(Arc::new(ctor));
        self
    }

    /// Build the group schema.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if two items share a dotted-name key.
    pub fn build(self) -> Result<GroupSchema, ConfigError> {
        let mut seen = std::collections::BTreeSet::new();
        for item in &self.items {
            if !seen.insert(item.key()) {
                return Err(ConfigError::validation(format!(
                    "duplicate item key: {}",
                    item.key()
                )));
            }
        }
        Ok(GroupSchema {
            items: self.items,
            atomic_ctor: self.atomic_ctor,
        })
    }
}

/// A named, phase-tagged configuration root.
///
/// Name and phase are immutable after declaration.
#[derive(Debug, Clone)]
pub struct RootSchema {
    name: String,
    phase: ConfigPhase,
    group: Arc<GroupSchema>,
}

impl RootSchema {
    /// Create a new root builder.
    #[must_use]
    pub fn builder(name: impl Into<String>, phase: ConfigPhase) -> RootSchemaBuilder {
        RootSchemaBuilder {
            name: name.into(),
            phase,
            group: GroupSchemaBuilder::new(),
        }
    }

    /// The root's declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The root's declared phase.
    #[must_use]
    pub fn phase(&self) -> ConfigPhase {
        self.phase
    }

    /// The root's top-level group.
    #[must_use]
    pub fn group(&self) -> &GroupSchema {
        &self.group
    }
}

/// Builder for [`RootSchema`].
pub struct RootSchemaBuilder {
    name: String,
    phase: ConfigPhase,
    group: GroupSchemaBuilder,
}

impl RootSchemaBuilder {
    /// Add a declared item to the root.
    #[must_use]
    pub fn item(mut self, item: ConfigItem) -> Self {
        self.group = self.group.item(item);
        self
    }

    /// Build the root schema.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the root name is empty or two
    /// items share a dotted-name key.
    pub fn build(self) -> Result<RootSchema, ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::validation("config root name must not be empty"));
        }
        Ok(RootSchema {
            name: self.name,
            phase: self.phase,
            group: Arc::new(self.group.build()?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyphenate() {
        assert_eq!(hyphenate("btStringOpt"), "bt-string-opt");
        assert_eq!(hyphenate("btStringOptWithDefault"), "bt-string-opt-with-default");
        assert_eq!(hyphenate("btSBV"), "bt-sbv");
        assert_eq!(hyphenate("btSBVWithDefault"), "bt-sbv-with-default");
        assert_eq!(hyphenate("allValues"), "all-values");
        assert_eq!(hyphenate("simple"), "simple");
        assert_eq!(hyphenate("Leading"), "leading");
    }

    #[test]
    fn test_item_key_derivation_and_override() {
        let item = ConfigItem::new("listenAddr", ItemKind::scalar(TypeKey::INET_ADDR));
        assert_eq!(item.key(), "listen-addr");

        let item = item.with_key("bind");
        assert_eq!(item.key(), "bind");
        assert_eq!(item.name(), "listenAddr");
    }

    #[test]
    fn test_item_flags() {
        let item = ConfigItem::new("port", ItemKind::scalar(TypeKey::UINT));
        assert!(item.is_required());
        assert_eq!(item.default_value(), None);

        let item = item.with_default("8080").optional();
        assert!(!item.is_required());
        assert_eq!(item.default_value(), Some("8080"));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let err = GroupSchema::builder()
            .item(ConfigItem::new("listenAddr", ItemKind::scalar(TypeKey::INET_ADDR)))
            .item(ConfigItem::new("listen-addr", ItemKind::scalar(TypeKey::STRING)))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("listen-addr"));
    }

    #[test]
    fn test_empty_root_name_rejected() {
        let err = RootSchema::builder("", ConfigPhase::RunTime).build().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_phase_availability() {
        assert!(ConfigPhase::BuildTime.available_at_build());
        assert!(!ConfigPhase::BuildTime.available_at_run());
        assert!(ConfigPhase::BuildAndRunTimeFixed.available_at_build());
        assert!(ConfigPhase::BuildAndRunTimeFixed.available_at_run());
        assert!(!ConfigPhase::RunTime.available_at_build());
        assert!(ConfigPhase::RunTime.available_at_run());
    }

    #[test]
    fn test_root_carries_name_and_phase() {
        let root = RootSchema::builder("bt", ConfigPhase::BuildTime)
            .item(ConfigItem::new("btStringOpt", ItemKind::scalar(TypeKey::STRING)))
            .build()
            .unwrap();
        assert_eq!(root.name(), "bt");
        assert_eq!(root.phase(), ConfigPhase::BuildTime);
        assert_eq!(root.group().items().len(), 1);
    }
}
