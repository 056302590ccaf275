//! The configuration item binder.
//!
//! [`Binder::bind`] walks a declared [`RootSchema`], fetches raw strings from
//! a [`RawValueSource`], applies converters, wrapper constructors, and nested
//! group recursion, and produces a fully bound root — or the first error,
//! with the fully-qualified property name attached. The binder never returns
//! a partially populated root.
//!
//! Binding is synchronous and owns no state across calls; the only shared
//! piece is the read-only [`ConverterRegistry`], so concurrent binds over
//! independent sources are safe.

use crate::error::ConfigError;
use crate::registry::ConverterRegistry;
use crate::schema::{ConfigItem, GroupSchema, ItemKind, RootSchema};
use crate::source::RawValueSource;
use crate::value::{BoundGroup, BoundRoot, ConfigValue};

/// Binds declared configuration roots against raw value sources.
#[derive(Debug)]
pub struct Binder {
    registry: ConverterRegistry,
}

impl Binder {
    /// Create a binder over the given registry.
    #[must_use]
    pub fn new(registry: ConverterRegistry) -> Self {
        Self { registry }
    }

    /// Create a binder over a registry pre-populated with the built-in
    /// converters.
    #[must_use]
    pub fn with_default_converters() -> Self {
        Self::new(ConverterRegistry::with_defaults())
    }

    /// The binder's converter registry.
    #[must_use]
    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// Bind a root schema against a raw value source.
    ///
    /// The root's phase governs *when* callers invoke this and which source
    /// they pass; the binding mechanics themselves are phase-agnostic.
    ///
    /// # Errors
    ///
    /// Returns the first failure encountered, always carrying the
    /// fully-qualified dotted name of the offending item:
    ///
    /// - [`ConfigError::MissingValue`] for a required item with no raw value
    ///   and no default;
    /// - [`ConfigError::Conversion`] for a raw value the declared type cannot
    ///   parse;
    /// - [`ConfigError::NoConverter`] for a declared type with no registered
    ///   converter and no construction path.
    pub fn bind(
        &self,
        root: &RootSchema,
        source: &dyn RawValueSource,
    ) -> Result<BoundRoot, ConfigError> {
        tracing::debug!(root = root.name(), phase = ?root.phase(), "binding config root");
        let values = self.bind_group(root.group(), root.name(), source)?;
        Ok(BoundRoot::new(root.name(), root.phase(), values))
    }

    fn bind_group(
        &self,
        schema: &GroupSchema,
        prefix: &str,
        source: &dyn RawValueSource,
    ) -> Result<BoundGroup, ConfigError> {
        let mut group = BoundGroup::new();
        for item in schema.items() {
            let name = format!("{prefix}.{}", item.key());
            if let Some(value) = self.bind_item(item, &name, source)? {
                group.insert(item.key(), value);
            } else {
                tracing::trace!(%name, "item unset");
            }
        }
        Ok(group)
    }

    fn bind_item(
        &self,
        item: &ConfigItem,
        name: &str,
        source: &dyn RawValueSource,
    ) -> Result<Option<ConfigValue>, ConfigError> {
        if let ItemKind::Group(schema) = item.kind() {
            return self.bind_group_item(item, schema, name, source);
        }

        let raw = source
            .get(name)
            .or_else(|| item.default_value().map(str::to_string));
        let Some(raw) = raw else {
            if item.is_required() {
                return Err(ConfigError::missing_value(name));
            }
            return Ok(None);
        };

        let value = self.convert_item(item, name, &raw)?;
        if value.is_none() && item.is_required() {
            // An explicit empty string unsets the item; a required item may
            // not end up unset.
            return Err(ConfigError::missing_value(name));
        }
        Ok(value)
    }

    fn convert_item(
        &self,
        item: &ConfigItem,
        name: &str,
        raw: &str,
    ) -> Result<Option<ConfigValue>, ConfigError> {
        match item.kind() {
            ItemKind::Scalar(type_key) => match self.registry.resolve(type_key) {
                Some(converter) => converter
                    .convert(raw)
                    .map_err(|e| ConfigError::conversion(name, raw, e)),
                None => Err(ConfigError::no_converter(name, type_key.clone())),
            },
            ItemKind::Wrapper { type_key, ctor } => {
                // A registered converter shadows the construction path.
                if let Some(converter) = self.registry.resolve(type_key) {
                    return converter
                        .convert(raw)
                        .map_err(|e| ConfigError::conversion(name, raw, e));
                }
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                ctor(trimmed)
                    .map(Some)
                    .map_err(|e| ConfigError::conversion(name, raw, e))
            }
            ItemKind::Group(_) => unreachable!("group items are bound by bind_group_item"),
        }
    }

    /// Bind a nested group item, choosing between its two supply modes.
    ///
    /// Item-level entries under the group's prefix take precedence over an
    /// atomic raw string at the group's own dotted name. With neither
    /// present, an atomic constructor consumes the item's default string;
    /// failing that the group binds per-item so its items' own defaults and
    /// required flags apply.
    fn bind_group_item(
        &self,
        item: &ConfigItem,
        schema: &GroupSchema,
        name: &str,
        source: &dyn RawValueSource,
    ) -> Result<Option<ConfigValue>, ConfigError> {
        let child_prefix = format!("{name}.");
        if source.contains_prefix(&child_prefix) {
            return self
                .bind_group(schema, name, source)
                .map(|g| Some(ConfigValue::Group(g)));
        }

        if let Some(ctor) = schema.atomic_ctor() {
            let atomic = source
                .get(name)
                .or_else(|| item.default_value().map(str::to_string));
            if let Some(raw) = atomic {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    // Same rule as scalar items: an explicit empty string
                    // unsets the item, and a required item may not end up
                    // unset.
                    if item.is_required() {
                        return Err(ConfigError::missing_value(name));
                    }
                    return Ok(None);
                }
                tracing::trace!(%name, "binding group atomically");
                return ctor(trimmed)
                    .map(Some)
                    .map_err(|e| ConfigError::conversion(name, raw.as_str(), e));
            }
        } else if source.get(name).is_some() {
            tracing::debug!(%name, "ignoring atomic value for group without a string form");
        }

        self.bind_group(schema, name, source)
            .map(|g| Some(ConfigValue::Group(g)))
    }
}
