//! Converter registry with priority-based resolution.
//!
//! The registry is built once at startup (`&mut self` registration) and is
//! read-only afterwards; the binder only ever takes `&ConverterRegistry`, so
//! concurrent binds can share one registry freely.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::convert::{
    BoolConverter, Converter, FloatConverter, InetAddrConverter, IntConverter, StringConverter,
    UintConverter,
};
use crate::error::ConfigError;

/// Priority assigned to the built-in converters.
///
/// External converters registered at a higher priority shadow the built-in
/// one for the same type.
pub const DEFAULT_CONVERTER_PRIORITY: i32 = 200;

/// Key naming a conversion target type.
///
/// Built-in keys are exposed as associated constants
/// ([`TypeKey::BOOL`], [`TypeKey::INET_ADDR`], …); external components may
/// mint their own keys for custom wrapper types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(Cow<'static, str>);

impl TypeKey {
    /// Boolean values.
    pub const BOOL: TypeKey = TypeKey::from_static("bool");
    /// Signed 64-bit integers.
    pub const INT: TypeKey = TypeKey::from_static("i64");
    /// Unsigned 64-bit integers.
    pub const UINT: TypeKey = TypeKey::from_static("u64");
    /// 64-bit floats.
    pub const FLOAT: TypeKey = TypeKey::from_static("f64");
    /// Strings.
    pub const STRING: TypeKey = TypeKey::from_static("string");
    /// Network addresses.
    pub const INET_ADDR: TypeKey = TypeKey::from_static("inet-addr");

    /// Create a type key from a static string.
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Create a type key from an owned string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// The key's name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for TypeKey {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

struct Registration {
    priority: i32,
    converter: Arc<dyn Converter>,
}

/// Ordered collection of typed converters.
///
/// For each target type the registry keeps every registration and resolves
/// the one with the numerically highest priority. Registering two converters
/// for the same type at the same priority is a startup-time fatal error; it
/// is reported immediately, never deferred to first use.
#[derive(Default)]
pub struct ConverterRegistry {
    table: HashMap<TypeKey, Vec<Registration>>,
}

impl ConverterRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with the built-in converters at
    /// [`DEFAULT_CONVERTER_PRIORITY`].
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.insert(TypeKey::BOOL, DEFAULT_CONVERTER_PRIORITY, Arc::new(BoolConverter));
        registry.insert(TypeKey::INT, DEFAULT_CONVERTER_PRIORITY, Arc::new(IntConverter));
        registry.insert(TypeKey::UINT, DEFAULT_CONVERTER_PRIORITY, Arc::new(UintConverter));
        registry.insert(TypeKey::FLOAT, DEFAULT_CONVERTER_PRIORITY, Arc::new(FloatConverter));
        registry.insert(
            TypeKey::STRING,
            DEFAULT_CONVERTER_PRIORITY,
            Arc::new(StringConverter),
        );
        registry.insert(
            TypeKey::INET_ADDR,
            DEFAULT_CONVERTER_PRIORITY,
            Arc::new(InetAddrConverter::new()),
        );
        registry
    }

    /// Register a converter for a target type at the given priority.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RegistrationConflict`] if a converter is
    /// already registered for the same type at the same priority.
    pub fn register(
        &mut self,
        type_key: impl Into<TypeKey>,
        priority: i32,
        converter: Arc<dyn Converter>,
    ) -> Result<(), ConfigError> {
        let type_key = type_key.into();
        let existing = self.table.entry(type_key.clone()).or_default();
        if existing.iter().any(|r| r.priority == priority) {
            return Err(ConfigError::registration_conflict(type_key, priority));
        }
        tracing::debug!(%type_key, priority, "registering converter");
        existing.push(Registration {
            priority,
            converter,
        });
        existing.sort_by_key(|r| std::cmp::Reverse(r.priority));
        Ok(())
    }

    // Infallible insertion for the built-in set; keys are distinct.
    fn insert(&mut self, type_key: TypeKey, priority: i32, converter: Arc<dyn Converter>) {
        self.table
            .entry(type_key)
            .or_default()
            .push(Registration {
                priority,
                converter,
            });
    }

    /// Resolve the highest-priority converter for a target type.
    #[must_use]
    pub fn resolve(&self, type_key: &TypeKey) -> Option<&Arc<dyn Converter>> {
        self.table
            .get(type_key)
            .and_then(|regs| regs.first())
            .map(|r| &r.converter)
    }

    /// Returns `true` if any converter is registered for the type.
    #[must_use]
    pub fn contains(&self, type_key: &TypeKey) -> bool {
        self.table.contains_key(type_key)
    }

    /// Number of target types with at least one converter.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("types", &self.table.len())
            .finish_non_exhaustive()
    }
}
