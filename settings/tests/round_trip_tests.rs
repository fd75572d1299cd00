use argbind_core::*;
use argbind_settings::{SettingsDocument, SettingsError, SettingsFormat, load, load_as, save};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct Deploy {
    host: String,
    port: i64,
    ratio: f64,
    dry_run: bool,
    mode: String,
    tags: Vec<String>,
    note: Option<String>,
    token: String,
}

impl Default for Deploy {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 80,
            ratio: 0.5,
            dry_run: false,
            mode: "rolling".to_string(),
            tags: Vec::new(),
            note: None,
            token: String::new(),
        }
    }
}

impl Configuration for Deploy {
    fn describe(builder: &mut SchemaBuilder<Self>) {
        builder.type_name("deploy::Deploy");
        builder.field(
            "Host",
            ValueType::string(),
            |d| Value::from(&d.host),
            |d, v| {
                d.host = v.into_string()?;
                Ok(())
            },
        );
        builder.field(
            "Port",
            ValueType::integer(),
            |d| Value::from(d.port),
            |d, v| {
                d.port = v.into_i64()?;
                Ok(())
            },
        );
        builder.field(
            "Ratio",
            ValueType::float(),
            |d| Value::from(d.ratio),
            |d, v| {
                d.ratio = v.into_f64()?;
                Ok(())
            },
        );
        builder.field(
            "DryRun",
            ValueType::bool(),
            |d| Value::from(d.dry_run),
            |d, v| {
                d.dry_run = v.into_bool()?;
                Ok(())
            },
        );
        builder.field(
            "Mode",
            ValueType::choice(["rolling", "blue-green"]),
            |d| Value::from(&d.mode),
            |d, v| {
                d.mode = v.into_string()?;
                Ok(())
            },
        );
        builder
            .field(
                "Tags",
                ValueType::array(ScalarType::String),
                |d| Value::from(d.tags.clone()),
                |d, v| {
                    d.tags = v.into_strings()?;
                    Ok(())
                },
            )
            .alias("t");
        builder.field(
            "Note",
            ValueType::string(),
            |d| Value::from(d.note.clone()),
            |d, v| {
                d.note = v.into_optional_string()?;
                Ok(())
            },
        );
        builder
            .field(
                "Token",
                ValueType::string(),
                |d| Value::from(&d.token),
                |d, v| {
                    d.token = v.into_string()?;
                    Ok(())
                },
            )
            .no_save();
    }
}

fn bound(registry: &SchemaRegistry) -> ArgumentBinder<Deploy> {
    let mut binder = ArgumentBinder::<Deploy>::from_registry(registry).unwrap();
    let valid = binder
        .initialize_from_args(&[
            "/Host", "example.org", "/Port", "8443", "/Ratio", "0.25", "/DryRun", "/Mode",
            "Blue-Green", "/t", "a", "b c", "/Token", "secret",
        ])
        .unwrap();
    assert!(valid, "{:?}", binder.error_messages());
    binder
}

fn round_trip(format: SettingsFormat, file_name: &str) {
    let registry = SchemaRegistry::new();
    let binder = bound(&registry);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(file_name);

    save(binder.schema(), binder.config(), &path, format).unwrap();
    let restored: Deploy = load_as(&registry, &path, format).unwrap();

    let mut expected = binder.into_inner();
    expected.token = String::new();
    assert_eq!(restored, expected);
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

#[test]
fn test_json_round_trip_preserves_saved_fields() {
    round_trip(SettingsFormat::Json, "deploy.json");
}

#[test]
fn test_yaml_round_trip_preserves_saved_fields() {
    round_trip(SettingsFormat::Yaml, "deploy.yaml");
}

#[test]
fn test_saved_file_shape() {
    let registry = SchemaRegistry::new();
    let binder = bound(&registry);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deploy.json");
    save(binder.schema(), binder.config(), &path, SettingsFormat::Json).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["Type"], "deploy::Deploy");
    assert_eq!(raw["Properties"]["Mode"], "blue-green");
    assert_eq!(raw["Properties"]["Tags"]["Element"][1], "b c");
    assert!(raw["Properties"]["Note"].is_null());
    assert!(raw["Properties"].get("Token").is_none());
}

#[test]
fn test_load_keeps_unsaved_fields() {
    let registry = SchemaRegistry::new();
    let schema = registry.get_or_build::<Deploy>().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.yaml");
    std::fs::write(
        &path,
        "Type: deploy::Deploy\nProperties:\n  Port: 9000\n  Unknown: 1\n",
    )
    .unwrap();

    let mut config = Deploy {
        token: "kept".to_string(),
        ..Deploy::default()
    };
    load(&schema, &path, SettingsFormat::Yaml, &mut config).unwrap();
    assert_eq!(config.port, 9000);
    assert_eq!(config.host, "localhost");
    assert_eq!(config.token, "kept");
}

#[test]
fn test_document_for_other_type_is_rejected() {
    let registry = SchemaRegistry::new();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("other.json");
    SettingsDocument::new("other::Type")
        .write(&path, SettingsFormat::Json)
        .unwrap();

    let err = load_as::<Deploy>(&registry, &path, SettingsFormat::Json).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::TypeMismatch { ref expected, ref found }
            if expected == "deploy::Deploy" && found == "other::Type"
    ));
}
