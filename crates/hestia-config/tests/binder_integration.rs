//! End-to-end binding scenarios across schemas, converters, and sources.

use hestia_config::{
    Binder, BoundGroup, ConfigError, ConfigItem, ConfigPhase, ConfigValue, ConvertError,
    GroupSchema, ItemKind, LayeredSource, MapSource, RootSchema, TomlSource, TypeKey,
};

/// A build-time root mirroring a typical extension config surface: plain
/// strings, string-constructed wrappers, and a nested group of all supported
/// value kinds.
fn build_time_root() -> RootSchema {
    let all_values = GroupSchema::builder()
        .item(ConfigItem::new("boolValue", ItemKind::scalar(TypeKey::BOOL)).with_default("false"))
        .item(ConfigItem::new("longValue", ItemKind::scalar(TypeKey::INT)).with_default("0"))
        .item(ConfigItem::new("doubleValue", ItemKind::scalar(TypeKey::FLOAT)).optional())
        .item(ConfigItem::new("stringValue", ItemKind::scalar(TypeKey::STRING)).optional())
        .item(ConfigItem::new("hostValue", ItemKind::scalar(TypeKey::INET_ADDR)).optional())
        .build()
        .unwrap();

    RootSchema::builder("bt", ConfigPhase::BuildTime)
        .item(ConfigItem::new("btStringOpt", ItemKind::scalar(TypeKey::STRING)))
        .item(
            ConfigItem::new("btStringOptWithDefault", ItemKind::scalar(TypeKey::STRING))
                .with_default("btStringOptWithDefaultValue"),
        )
        .item(ConfigItem::new("btSBV", ItemKind::wrapper("sbv", sbv_ctor)).optional())
        .item(
            ConfigItem::new("btSBVWithDefault", ItemKind::wrapper("sbv", sbv_ctor))
                .with_default("btSBVWithDefaultValue"),
        )
        .item(ConfigItem::new("allValues", ItemKind::group(all_values)))
        .build()
        .unwrap()
}

/// Single-string construction path for a wrapper value type.
fn sbv_ctor(raw: &str) -> Result<ConfigValue, ConvertError> {
    Ok(ConfigValue::Str(raw.to_string()))
}

#[test]
fn test_missing_required_item_names_full_path() {
    let binder = Binder::with_default_converters();
    let err = binder.bind(&build_time_root(), &MapSource::new()).unwrap_err();

    assert!(matches!(err, ConfigError::MissingValue { .. }));
    assert_eq!(err.property_name(), Some("bt.bt-string-opt"));
    assert!(err.to_string().contains("bt.bt-string-opt"));
}

#[test]
fn test_defaults_fill_absent_values() {
    let binder = Binder::with_default_converters();
    let source = MapSource::new().with("bt.bt-string-opt", "supplied");
    let bound = binder.bind(&build_time_root(), &source).unwrap();

    assert_eq!(bound.values().get_str("bt-string-opt"), Some("supplied"));
    assert_eq!(
        bound.values().get_str("bt-string-opt-with-default"),
        Some("btStringOptWithDefaultValue")
    );
    assert_eq!(
        bound.values().get_str("bt-sbv-with-default"),
        Some("btSBVWithDefaultValue")
    );
    // Optional wrapper with no raw value and no default stays unset
    assert_eq!(bound.values().get("bt-sbv"), None);

    // Nested group bound per-item with its own defaults
    let all_values = bound.values().get_group("all-values").unwrap();
    assert_eq!(all_values.get_bool("bool-value"), Some(false));
    assert_eq!(all_values.get_int("long-value"), Some(0));
    assert_eq!(all_values.get("double-value"), None);
}

#[test]
fn test_explicit_values_everywhere_ignore_defaults() {
    let binder = Binder::with_default_converters();
    let source = MapSource::new()
        .with("bt.bt-string-opt", "a")
        .with("bt.bt-string-opt-with-default", "b")
        .with("bt.bt-sbv", "c")
        .with("bt.bt-sbv-with-default", "d")
        .with("bt.all-values.bool-value", "true")
        .with("bt.all-values.long-value", "1234567891234")
        .with("bt.all-values.double-value", "3.1415927")
        .with("bt.all-values.string-value", "string value")
        .with("bt.all-values.host-value", "192.168.1.128");
    let bound = binder.bind(&build_time_root(), &source).unwrap();

    assert_eq!(bound.values().get_str("bt-string-opt"), Some("a"));
    assert_eq!(bound.values().get_str("bt-string-opt-with-default"), Some("b"));
    assert_eq!(bound.values().get_str("bt-sbv"), Some("c"));
    assert_eq!(bound.values().get_str("bt-sbv-with-default"), Some("d"));

    let all_values = bound.values().get_group("all-values").unwrap();
    assert_eq!(all_values.get_bool("bool-value"), Some(true));
    assert_eq!(all_values.get_int("long-value"), Some(1_234_567_891_234));
    assert_eq!(all_values.get_float("double-value"), Some(3.141_592_7));
    assert_eq!(all_values.get_str("string-value"), Some("string value"));
    assert_eq!(
        all_values.get_addr("host-value"),
        Some("192.168.1.128".parse().unwrap())
    );
}

#[test]
fn test_bound_root_carries_name_and_phase() {
    let binder = Binder::with_default_converters();
    let source = MapSource::new().with("bt.bt-string-opt", "x");
    let bound = binder.bind(&build_time_root(), &source).unwrap();

    assert_eq!(bound.name(), "bt");
    assert_eq!(bound.phase(), ConfigPhase::BuildTime);
    assert!(bound.phase().available_at_build());
    assert!(!bound.phase().available_at_run());
}

#[test]
fn test_unparsable_nested_value_aborts_whole_bind() {
    let binder = Binder::with_default_converters();
    let source = MapSource::new()
        .with("bt.bt-string-opt", "fine")
        .with("bt.all-values.long-value", "not-a-number");
    let err = binder.bind(&build_time_root(), &source).unwrap_err();

    assert_eq!(err.property_name(), Some("bt.all-values.long-value"));
    assert!(err.to_string().contains("not-a-number"));
}

// --- group dual-mode: atomic string vs per-item entries ---

/// An endpoint group that can be supplied either piecewise
/// (`app.endpoint.host` / `app.endpoint.port`) or atomically as one
/// `host:port` string at `app.endpoint`.
fn endpoint_group() -> GroupSchema {
    GroupSchema::builder()
        .item(ConfigItem::new("host", ItemKind::scalar(TypeKey::STRING)))
        .item(ConfigItem::new("port", ItemKind::scalar(TypeKey::UINT)).with_default("80"))
        .atomic_ctor(|raw| {
            let (host, port) = raw.split_once(':').ok_or_else(|| {
                ConvertError::new(raw, format!("expected host:port, got \"{raw}\""))
            })?;
            let port: u64 = port.parse().map_err(|e| {
                ConvertError::with_source(raw, format!("invalid port in \"{raw}\""), e)
            })?;
            let mut group = BoundGroup::new();
            group.insert("host", ConfigValue::Str(host.to_string()));
            group.insert("port", ConfigValue::Uint(port));
            Ok(ConfigValue::Group(group))
        })
        .build()
        .unwrap()
}

fn endpoint_root(default: Option<&str>) -> RootSchema {
    let mut item = ConfigItem::new("endpoint", ItemKind::group(endpoint_group()));
    if let Some(default) = default {
        item = item.with_default(default);
    }
    RootSchema::builder("app", ConfigPhase::RunTime)
        .item(item)
        .build()
        .unwrap()
}

#[test]
fn test_group_supplied_atomically_uses_string_ctor() {
    let binder = Binder::with_default_converters();
    let source = MapSource::new().with("app.endpoint", "example.com:8443");
    let bound = binder.bind(&endpoint_root(None), &source).unwrap();

    let endpoint = bound.values().get_group("endpoint").unwrap();
    assert_eq!(endpoint.get_str("host"), Some("example.com"));
    assert_eq!(endpoint.get_uint("port"), Some(8443));
}

#[test]
fn test_group_supplied_piecewise_recurses_per_item() {
    let binder = Binder::with_default_converters();
    let source = MapSource::new().with("app.endpoint.host", "example.org");
    let bound = binder.bind(&endpoint_root(None), &source).unwrap();

    let endpoint = bound.values().get_group("endpoint").unwrap();
    assert_eq!(endpoint.get_str("host"), Some("example.org"));
    // Item-level default applies in piecewise mode
    assert_eq!(endpoint.get_uint("port"), Some(80));
}

#[test]
fn test_item_level_entries_win_over_atomic_string() {
    let binder = Binder::with_default_converters();
    let source = MapSource::new()
        .with("app.endpoint", "ignored.example:1")
        .with("app.endpoint.host", "wins.example")
        .with("app.endpoint.port", "9000");
    let bound = binder.bind(&endpoint_root(None), &source).unwrap();

    let endpoint = bound.values().get_group("endpoint").unwrap();
    assert_eq!(endpoint.get_str("host"), Some("wins.example"));
    assert_eq!(endpoint.get_uint("port"), Some(9000));
}

#[test]
fn test_group_default_string_constructs_atomically() {
    let binder = Binder::with_default_converters();
    let bound = binder
        .bind(&endpoint_root(Some("fallback.example:1234")), &MapSource::new())
        .unwrap();

    let endpoint = bound.values().get_group("endpoint").unwrap();
    assert_eq!(endpoint.get_str("host"), Some("fallback.example"));
    assert_eq!(endpoint.get_uint("port"), Some(1234));
}

#[test]
fn test_malformed_atomic_string_names_group_path() {
    let binder = Binder::with_default_converters();
    let source = MapSource::new().with("app.endpoint", "no-port-here");
    let err = binder.bind(&endpoint_root(None), &source).unwrap_err();

    assert_eq!(err.property_name(), Some("app.endpoint"));
    assert!(err.to_string().contains("no-port-here"));
}

// --- layered sources end to end ---

#[test]
fn test_layered_toml_and_overrides_bind_together() {
    let toml = TomlSource::from_str(
        r#"
        [bt]
        bt-string-opt = "from-file"

        [bt.all-values]
        bool-value = true
        long-value = 99
    "#,
    )
    .unwrap();
    let overrides = MapSource::new().with("bt.all-values.long-value", "100");
    let layered = LayeredSource::new().layer(overrides).layer(toml);

    let binder = Binder::with_default_converters();
    let bound = binder.bind(&build_time_root(), &layered).unwrap();

    assert_eq!(bound.values().get_str("bt-string-opt"), Some("from-file"));
    let all_values = bound.values().get_group("all-values").unwrap();
    assert_eq!(all_values.get_bool("bool-value"), Some(true));
    // The override layer wins over the file layer
    assert_eq!(all_values.get_int("long-value"), Some(100));
}

#[test]
fn test_bound_root_serializes_for_diagnostics() {
    let binder = Binder::with_default_converters();
    let source = MapSource::new()
        .with("bt.bt-string-opt", "x")
        .with("bt.all-values.host-value", "10.0.0.1");
    let bound = binder.bind(&build_time_root(), &source).unwrap();

    let json = bound.to_json().unwrap();
    assert!(json.contains("\"bt\""));
    assert!(json.contains("10.0.0.1"));
    assert!(json.contains("btStringOptWithDefaultValue"));
}
