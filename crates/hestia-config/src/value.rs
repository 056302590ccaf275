//! Bound configuration values.
//!
//! Binding produces [`ConfigValue`] trees: an item that is unset is simply
//! absent from its [`BoundGroup`] — there is no null sentinel inside the
//! value model.

use std::collections::BTreeMap;
use std::net::IpAddr;

use serde::Serialize;

use crate::schema::ConfigPhase;

/// A single typed configuration value produced by a converter or a nested
/// group bind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer value.
    Int(i64),
    /// Unsigned 64-bit integer value.
    Uint(u64),
    /// 64-bit floating point value.
    Float(f64),
    /// String value.
    Str(String),
    /// Network address value (IPv4 or IPv6).
    Addr(IpAddr),
    /// Nested configuration group.
    Group(BoundGroup),
}

impl ConfigValue {
    /// Returns the boolean value, if this is a [`ConfigValue::Bool`].
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the signed integer value, if this is a [`ConfigValue::Int`].
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the unsigned integer value, if this is a [`ConfigValue::Uint`].
    #[must_use]
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the float value, if this is a [`ConfigValue::Float`].
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string value, if this is a [`ConfigValue::Str`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the address value, if this is a [`ConfigValue::Addr`].
    #[must_use]
    pub fn as_addr(&self) -> Option<IpAddr> {
        match self {
            Self::Addr(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the nested group, if this is a [`ConfigValue::Group`].
    #[must_use]
    pub fn as_group(&self) -> Option<&BoundGroup> {
        match self {
            Self::Group(v) => Some(v),
            _ => None,
        }
    }
}

/// A bound configuration group: item key to value.
///
/// Keys are the kebab-case item keys from the schema, without the dotted
/// prefix. Unset items have no entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BoundGroup {
    items: BTreeMap<String, ConfigValue>,
}

impl BoundGroup {
    /// Create an empty bound group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value under an item key, replacing any previous one.
    ///
    /// Atomic group constructors use this to assemble a group value from a
    /// single raw string.
    pub fn insert(&mut self, key: impl Into<String>, value: ConfigValue) {
        self.items.insert(key.into(), value);
    }

    /// Look up a value by item key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.items.get(key)
    }

    /// Look up a string value by item key.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ConfigValue::as_str)
    }

    /// Look up a boolean value by item key.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ConfigValue::as_bool)
    }

    /// Look up a signed integer value by item key.
    #[must_use]
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(ConfigValue::as_int)
    }

    /// Look up an unsigned integer value by item key.
    #[must_use]
    pub fn get_uint(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(ConfigValue::as_uint)
    }

    /// Look up a float value by item key.
    #[must_use]
    pub fn get_float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ConfigValue::as_float)
    }

    /// Look up an address value by item key.
    #[must_use]
    pub fn get_addr(&self, key: &str) -> Option<IpAddr> {
        self.get(key).and_then(ConfigValue::as_addr)
    }

    /// Look up a nested group by item key.
    #[must_use]
    pub fn get_group(&self, key: &str) -> Option<&BoundGroup> {
        self.get(key).and_then(ConfigValue::as_group)
    }

    /// Returns `true` if no items are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of bound items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate over bound item keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }
}

/// A fully bound configuration root.
///
/// Carries the root's declared name and phase alongside its values. The name
/// and phase are immutable after binding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundRoot {
    name: String,
    phase: ConfigPhase,
    values: BoundGroup,
}

impl BoundRoot {
    pub(crate) fn new(name: impl Into<String>, phase: ConfigPhase, values: BoundGroup) -> Self {
        Self {
            name: name.into(),
            phase,
            values,
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

    /// The bound values of this root.
    #[must_use]
    pub fn values(&self) -> &BoundGroup {
        &self.values
    }

    /// Look up a value by item key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    /// Render the bound root as pretty-printed JSON for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
