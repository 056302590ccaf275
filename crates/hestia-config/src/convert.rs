//! Converter SPI and the built-in primitive converters.
//!
//! A [`Converter`] turns one raw string into one typed [`ConfigValue`]. The
//! contract, shared by every converter:
//!
//! - input is trimmed of surrounding whitespace before interpretation;
//! - an empty (or whitespace-only) input means "unset" and yields `Ok(None)`,
//!   never an error;
//! - a non-empty input either converts or fails with a [`ConvertError`]
//!   whose message contains the offending raw string verbatim.
//!
//! Converters are pure and carry no per-call state, so a single instance is
//! safely shared across concurrent binds.

use std::net::{IpAddr, ToSocketAddrs};

use thiserror::Error;

use crate::value::ConfigValue;

/// Boxed error used as a conversion failure cause.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure to convert a single raw string.
///
/// Carries the raw input verbatim and, when available, the underlying cause
/// (e.g. a name resolution failure).
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ConvertError {
    message: String,
    raw: String,
    #[source]
    source: Option<BoxError>,
}

impl ConvertError {
    /// Create a conversion failure without an underlying cause.
    pub fn new(raw: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            raw: raw.into(),
            source: None,
        }
    }

    /// Create a conversion failure with an underlying cause.
    pub fn with_source(
        raw: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self {
            message: message.into(),
            raw: raw.into(),
            source: Some(source.into()),
        }
    }

    /// The raw input that failed to convert, verbatim.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// A pure conversion from a raw string to a typed value.
///
/// Implementations are registered in a
/// [`ConverterRegistry`](crate::ConverterRegistry) under a type key and a
/// priority; the registry resolves the highest-priority converter per type.
pub trait Converter: Send + Sync {
    /// Convert a raw string, yielding `Ok(None)` for empty input.
    fn convert(&self, raw: &str) -> Result<Option<ConfigValue>, ConvertError>;
}

/// Trim the raw input, mapping empty input to unset.
fn non_empty(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Converter for boolean values.
///
/// Accepts `true`/`false`, `yes`/`no`, `on`/`off`, and `1`/`0`, case
/// insensitively.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoolConverter;

impl Converter for BoolConverter {
    fn convert(&self, raw: &str) -> Result<Option<ConfigValue>, ConvertError> {
        let Some(raw) = non_empty(raw) else {
            return Ok(None);
        };
        match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Some(ConfigValue::Bool(true))),
            "false" | "no" | "off" | "0" => Ok(Some(ConfigValue::Bool(false))),
            _ => Err(ConvertError::new(
                raw,
                format!("expected a boolean, got \"{raw}\""),
            )),
        }
    }
}

/// Converter for signed 64-bit integers.
#[derive(Debug, Default, Clone, Copy)]
pub struct IntConverter;

impl Converter for IntConverter {
    fn convert(&self, raw: &str) -> Result<Option<ConfigValue>, ConvertError> {
        let Some(raw) = non_empty(raw) else {
            return Ok(None);
        };
        raw.parse::<i64>()
            .map(|v| Some(ConfigValue::Int(v)))
            .map_err(|e| {
                ConvertError::with_source(raw, format!("expected an integer, got \"{raw}\""), e)
            })
    }
}

/// Converter for unsigned 64-bit integers.
#[derive(Debug, Default, Clone, Copy)]
pub struct UintConverter;

impl Converter for UintConverter {
    fn convert(&self, raw: &str) -> Result<Option<ConfigValue>, ConvertError> {
        let Some(raw) = non_empty(raw) else {
            return Ok(None);
        };
        raw.parse::<u64>()
            .map(|v| Some(ConfigValue::Uint(v)))
            .map_err(|e| {
                ConvertError::with_source(
                    raw,
                    format!("expected an unsigned integer, got \"{raw}\""),
                    e,
                )
            })
    }
}

/// Converter for 64-bit floating point values.
#[derive(Debug, Default, Clone, Copy)]
pub struct FloatConverter;

impl Converter for FloatConverter {
    fn convert(&self, raw: &str) -> Result<Option<ConfigValue>, ConvertError> {
        let Some(raw) = non_empty(raw) else {
            return Ok(None);
        };
        raw.parse::<f64>()
            .map(|v| Some(ConfigValue::Float(v)))
            .map_err(|e| {
                ConvertError::with_source(raw, format!("expected a number, got \"{raw}\""), e)
            })
    }
}

/// Converter for strings.
///
/// Trims surrounding whitespace; an empty result is unset.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringConverter;

impl Converter for StringConverter {
    fn convert(&self, raw: &str) -> Result<Option<ConfigValue>, ConvertError> {
        Ok(non_empty(raw).map(|s| ConfigValue::Str(s.to_string())))
    }
}

/// Name resolution seam for [`InetAddrConverter`].
///
/// The production implementation ([`SystemResolver`]) may block on DNS I/O;
/// tests substitute a stub to assert the literal fast path never resolves.
pub trait HostResolver: Send + Sync {
    /// Resolve a hostname to a single address.
    fn resolve(&self, host: &str) -> std::io::Result<IpAddr>;
}

/// System resolver backed by the platform's name resolution.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl HostResolver for SystemResolver {
    fn resolve(&self, host: &str) -> std::io::Result<IpAddr> {
        // Port 0 satisfies ToSocketAddrs; only the address part matters.
        let mut addrs = (host, 0).to_socket_addrs()?;
        addrs.next().map(|sa| sa.ip()).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no addresses for host {host}"),
            )
        })
    }
}

/// Converter for network addresses.
///
/// Tries a structural parse of IPv4/IPv6 literals first; that path performs
/// no I/O and never blocks. Only when the input is not a literal does it fall
/// back to the [`HostResolver`], which may block on DNS.
pub struct InetAddrConverter {
    resolver: Box<dyn HostResolver>,
}

impl InetAddrConverter {
    /// Create a converter backed by the system resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::with_resolver(Box::new(SystemResolver))
    }

    /// Create a converter with a custom resolver.
    #[must_use]
    pub fn with_resolver(resolver: Box<dyn HostResolver>) -> Self {
        Self { resolver }
    }
}

impl Default for InetAddrConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InetAddrConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InetAddrConverter").finish_non_exhaustive()
    }
}

impl Converter for InetAddrConverter {
    fn convert(&self, raw: &str) -> Result<Option<ConfigValue>, ConvertError> {
        let Some(raw) = non_empty(raw) else {
            return Ok(None);
        };
        if let Ok(literal) = raw.parse::<IpAddr>() {
            return Ok(Some(ConfigValue::Addr(literal)));
        }
        match self.resolver.resolve(raw) {
            Ok(addr) => Ok(Some(ConfigValue::Addr(addr))),
            Err(e) => Err(ConvertError::with_source(
                raw,
                format!("unable to resolve \"{raw}\""),
                e,
            )),
        }
    }
}
