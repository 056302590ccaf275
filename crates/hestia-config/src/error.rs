//! Configuration error types.

use thiserror::Error;

use crate::convert::ConvertError;
use crate::registry::TypeKey;

/// Errors that can occur during converter registration, schema declaration,
/// or binding.
///
/// Every binding failure carries the fully-qualified dotted property name of
/// the item that caused it, so callers can report actionable diagnostics
/// without re-walking the schema.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required item has no raw value and no declared default.
    #[error("missing required configuration value: {name}")]
    MissingValue {
        /// Fully-qualified dotted property name.
        name: String,
    },

    /// A raw value was present but could not be converted to the declared type.
    #[error("failed to convert configuration value {name} = \"{raw}\"")]
    Conversion {
        /// Fully-qualified dotted property name.
        name: String,
        /// The raw string that failed to convert, verbatim.
        raw: String,
        /// Underlying conversion failure.
        #[source]
        source: ConvertError,
    },

    /// Two converters were registered for the same type at the same priority.
    ///
    /// Raised at registration time, never deferred to first use.
    #[error("converter for type {type_key} already registered at priority {priority}")]
    RegistrationConflict {
        /// The contested target type.
        type_key: TypeKey,
        /// The colliding priority.
        priority: i32,
    },

    /// An item's declared type has no registered converter and no string
    /// construction path.
    #[error("no converter available for {name} (type {type_key})")]
    NoConverter {
        /// Fully-qualified dotted property name.
        name: String,
        /// The declared target type.
        type_key: TypeKey,
    },

    /// A schema or value-source declaration is structurally invalid.
    #[error("configuration validation failed: {0}")]
    Validation(String),

    /// TOML parsing error from a TOML-backed value source.
    #[error("failed to parse TOML value source: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error while reading a file-backed value source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Create a new missing value error.
    pub fn missing_value(name: impl Into<String>) -> Self {
        Self::MissingValue { name: name.into() }
    }

    /// Create a new conversion error wrapping a converter failure.
    pub fn conversion(
        name: impl Into<String>,
        raw: impl Into<String>,
        source: ConvertError,
    ) -> Self {
        Self::Conversion {
            name: name.into(),
            raw: raw.into(),
            source,
        }
    }

    /// Create a new registration conflict error.
    pub fn registration_conflict(type_key: TypeKey, priority: i32) -> Self {
        Self::RegistrationConflict { type_key, priority }
    }

    /// Create a new missing converter error.
    pub fn no_converter(name: impl Into<String>, type_key: TypeKey) -> Self {
        Self::NoConverter {
            name: name.into(),
            type_key,
        }
    }

    /// Create a new validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// The fully-qualified property name this error refers to, if any.
    #[must_use]
    pub fn property_name(&self) -> Option<&str> {
        match self {
            Self::MissingValue { name }
            | Self::Conversion { name, .. }
            | Self::NoConverter { name, .. } => Some(name),
            _ => None,
        }
    }
}
