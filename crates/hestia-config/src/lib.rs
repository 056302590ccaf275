//! Phased, converter-driven configuration binding for Hestia.
//!
//! This crate turns raw textual configuration (dotted property names mapped
//! to strings) into strongly typed, validated value trees:
//!
//! - [`ConverterRegistry`] — ordered, priority-resolved converters per type
//! - Primitive [`Converter`]s, including a network-address converter with a
//!   non-blocking literal fast path and a pluggable resolver fallback
//! - [`Binder`] — walks a declared [`RootSchema`], applying converters,
//!   defaults, string constructors, and nested-group recursion
//! - [`ConfigPhase`] — build-time vs run-time tagging of config roots
//! - [`RawValueSource`] implementations: in-memory maps, TOML files,
//!   environment variables, and layered stacks of those
//!
//! Binding is fail-fast: the first missing or unconvertible item aborts the
//! whole bind with the fully-qualified property name attached. A caller
//! receives either a fully bound root or an error — never a partial object.
//!
//! # Example
//!
//! ```
//! use hestia_config::{
//!     Binder, ConfigItem, ConfigPhase, ItemKind, MapSource, RootSchema, TypeKey,
//! };
//!
//! # fn main() -> Result<(), hestia_config::ConfigError> {
//! let root = RootSchema::builder("srv", ConfigPhase::RunTime)
//!     .item(ConfigItem::new("listenAddr", ItemKind::scalar(TypeKey::INET_ADDR)))
//!     .item(ConfigItem::new("port", ItemKind::scalar(TypeKey::UINT)).with_default("8080"))
//!     .build()?;
//!
//! let source = MapSource::new().with("srv.listen-addr", "127.0.0.1");
//!
//! let bound = Binder::with_default_converters().bind(&root, &source)?;
//! assert_eq!(bound.values().get_uint("port"), Some(8080));
//! # Ok(())
//! # }
//! ```
//!
//! # Phases
//!
//! A root declares one of three [`ConfigPhase`]s. The binder itself is
//! phase-agnostic; an external scheduler decides which raw value source to
//! consult for each phase and when to invoke [`Binder::bind`] (build-time
//! roots once during the build step, run-time roots at process start).

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binder;
mod convert;
mod error;
mod registry;
mod schema;
mod source;
mod value;

pub use binder::Binder;
pub use convert::{
    BoolConverter, BoxError, ConvertError, Converter, FloatConverter, HostResolver,
    InetAddrConverter, IntConverter, StringConverter, SystemResolver, UintConverter,
};
pub use error::ConfigError;
pub use registry::{ConverterRegistry, TypeKey, DEFAULT_CONVERTER_PRIORITY};
pub use schema::{
    hyphenate, ConfigItem, ConfigPhase, GroupSchema, GroupSchemaBuilder, ItemKind, RootSchema,
    RootSchemaBuilder, WrapperCtor,
};
pub use source::{EnvSource, LayeredSource, MapSource, RawValueSource, TomlSource};
pub use value::{BoundGroup, BoundRoot, ConfigValue};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end_smoke() {
        let root = RootSchema::builder("app", ConfigPhase::RunTime)
            .item(ConfigItem::new("name", ItemKind::scalar(TypeKey::STRING)).with_default("hestia"))
            .build()
            .unwrap();

        let bound = Binder::with_default_converters()
            .bind(&root, &MapSource::new())
            .unwrap();

        assert_eq!(bound.name(), "app");
        assert_eq!(bound.phase(), ConfigPhase::RunTime);
        assert_eq!(bound.values().get_str("name"), Some("hestia"));
    }

    #[test]
    fn test_registry_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConverterRegistry>();
        assert_send_sync::<Binder>();
    }
}
