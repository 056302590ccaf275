//! Raw configuration value sources.
//!
//! A [`RawValueSource`] maps dotted property names to unparsed strings. It is
//! populated once per phase before binding begins and is read-only during
//! binding. Sources layer in the usual order — in-memory overrides, then a
//! TOML file, then the process environment — via [`LayeredSource`].

use std::collections::BTreeMap;
use std::env;
use std::path::Path;

use crate::error::ConfigError;

/// Supplier of raw string values keyed by dotted property name.
pub trait RawValueSource {
    /// Look up the raw string for a fully-qualified dotted name.
    fn get(&self, name: &str) -> Option<String>;

    /// Whether any key starts with the given dotted prefix.
    ///
    /// The binder uses this with a prefix ending in `.` to decide whether a
    /// nested group is supplied piecewise.
    fn contains_prefix(&self, prefix: &str) -> bool;
}

/// In-memory source backed by an ordered map.
///
/// Iteration order is sorted, which keeps diagnostics stable regardless of
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    entries: BTreeMap<String, String>,
}

impl MapSource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a raw value, replacing any previous one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the source has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl RawValueSource for MapSource {
    fn get(&self, name: &str) -> Option<String> {
        self.entries.get(name).cloned()
    }

    fn contains_prefix(&self, prefix: &str) -> bool {
        self.entries
            .range(prefix.to_string()..)
            .next()
            .is_some_and(|(k, _)| k.starts_with(prefix))
    }
}

/// Source backed by process environment variables.
///
/// Dotted names translate to the `PREFIX__SEGMENT__SEGMENT` convention:
/// upper-cased, dots become `__`, hyphens become `_`. With prefix `HESTIA`,
/// the name `srv.listen-addr` reads `HESTIA__SRV__LISTEN_ADDR`.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
}

impl EnvSource {
    /// Create a source with the given variable prefix.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_uppercase(),
        }
    }

    /// Create a source after loading a `.env` file, if one exists.
    #[must_use]
    pub fn with_dotenv(prefix: &str) -> Self {
        // Missing .env files are not an error
        let _ = dotenvy::dotenv();
        Self::new(prefix)
    }

    fn var_name(&self, name: &str) -> String {
        let mut var = String::with_capacity(self.prefix.len() + name.len() + 2);
        var.push_str(&self.prefix);
        var.push_str("__");
        for c in name.chars() {
            match c {
                '.' => var.push_str("__"),
                '-' => var.push('_'),
                _ => var.extend(c.to_uppercase()),
            }
        }
        var
    }
}

impl RawValueSource for EnvSource {
    fn get(&self, name: &str) -> Option<String> {
        env::var(self.var_name(name)).ok()
    }

    fn contains_prefix(&self, prefix: &str) -> bool {
        let var_prefix = self.var_name(prefix.trim_end_matches('.'));
        env::vars().any(|(k, _)| {
            k.strip_prefix(&var_prefix)
                .is_some_and(|rest| rest.starts_with("__"))
        })
    }
}

/// Source backed by a TOML document, flattened to dotted names.
///
/// Nested tables extend the dotted prefix; scalars are rendered back to their
/// string form; arrays of scalars join with commas.
#[derive(Debug, Clone, Default)]
pub struct TomlSource {
    entries: BTreeMap<String, String>,
}

impl TomlSource {
    /// Parse a TOML document into a flattened source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Toml` on invalid TOML, or
    /// `ConfigError::Validation` for value shapes that have no raw string
    /// form (arrays of tables, nested arrays).
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let value: toml::Value = content.parse()?;
        let mut entries = BTreeMap::new();
        flatten(&value, "", &mut entries)?;
        Ok(Self { entries })
    }

    /// Read and parse a TOML file into a flattened source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`from_str`](Self::from_str).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }
}

fn flatten(
    value: &toml::Value,
    prefix: &str,
    entries: &mut BTreeMap<String, String>,
) -> Result<(), ConfigError> {
    match value {
        toml::Value::Table(table) => {
            for (key, child) in table {
                let name = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(child, &name, entries)?;
            }
            Ok(())
        }
        toml::Value::Array(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                match scalar_to_string(item) {
                    Some(s) => parts.push(s),
                    None => {
                        return Err(ConfigError::validation(format!(
                            "unsupported TOML value shape at {prefix}"
                        )))
                    }
                }
            }
            entries.insert(prefix.to_string(), parts.join(","));
            Ok(())
        }
        scalar => {
            // Scalar at the root (empty prefix) cannot occur in valid TOML
            let rendered = scalar_to_string(scalar).ok_or_else(|| {
                ConfigError::validation(format!("unsupported TOML value shape at {prefix}"))
            })?;
            entries.insert(prefix.to_string(), rendered);
            Ok(())
        }
    }
}

fn scalar_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}

impl RawValueSource for TomlSource {
    fn get(&self, name: &str) -> Option<String> {
        self.entries.get(name).cloned()
    }

    fn contains_prefix(&self, prefix: &str) -> bool {
        self.entries
            .range(prefix.to_string()..)
            .next()
            .is_some_and(|(k, _)| k.starts_with(prefix))
    }
}

/// Stack of sources searched in order; the first layer with a value wins.
///
/// Push the highest-precedence layer first (e.g. CLI overrides, then file,
/// then environment).
#[derive(Default)]
pub struct LayeredSource {
    layers: Vec<Box<dyn RawValueSource>>,
}

impl LayeredSource {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer below all existing layers.
    #[must_use]
    pub fn layer(mut self, source: impl RawValueSource + 'static) -> Self {
        self.layers.push(Box::new(source));
        self
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if the stack has no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl RawValueSource for LayeredSource {
    fn get(&self, name: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.get(name))
    }

    fn contains_prefix(&self, prefix: &str) -> bool {
        self.layers.iter().any(|layer| layer.contains_prefix(prefix))
    }
}

impl std::fmt::Debug for LayeredSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayeredSource")
            .field("layers", &self.layers.len())
            .finish_non_exhaustive()
    }
}
