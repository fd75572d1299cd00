//! Text encodings and file I/O for settings documents.

use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use argbind_core::{ArgumentSchema, Configuration, SchemaRegistry};
use tracing::debug;

use crate::document::{SettingsDocument, apply_document, to_document};
use crate::error::Result;

/// Supported settings encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SettingsFormat {
    #[default]
    Json,
    Yaml,
}

impl SettingsFormat {
    /// Picks the format from a file extension (`.json`, `.yaml`, `.yml`).
    ///
    /// ```
    /// use argbind_settings::SettingsFormat;
    ///
    /// assert_eq!(SettingsFormat::from_path("a/b.yml"), Some(SettingsFormat::Yaml));
    /// assert_eq!(SettingsFormat::from_path("b.JSON"), Some(SettingsFormat::Json));
    /// assert_eq!(SettingsFormat::from_path("b.toml"), None);
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(SettingsFormat::Json),
            "yaml" | "yml" => Some(SettingsFormat::Yaml),
            _ => None,
        }
    }
}

impl SettingsDocument {
    /// Encodes the document.
    ///
    /// # Errors
    ///
    /// Returns a JSON or YAML serialization error.
    pub fn render(&self, format: SettingsFormat) -> Result<String> {
        let text = match format {
            SettingsFormat::Json => serde_json::to_string_pretty(self)?,
            SettingsFormat::Yaml => serde_yaml::to_string(self)?,
        };
        Ok(text)
    }

    /// Decodes a document.
    ///
    /// # Errors
    ///
    /// Returns a JSON or YAML parse error.
    pub fn parse(text: &str, format: SettingsFormat) -> Result<Self> {
        let document = match format {
            SettingsFormat::Json => serde_json::from_str(text)?,
            SettingsFormat::Yaml => serde_yaml::from_str(text)?,
        };
        Ok(document)
    }

    /// Reads a document from a file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::SettingsError::Io) if the file cannot be read,
    /// or a JSON/YAML error if parsing fails.
    pub fn read(path: impl AsRef<Path>, format: SettingsFormat) -> Result<Self> {
        let reader = BufReader::new(std::fs::File::open(path)?);
        let document = match format {
            SettingsFormat::Json => serde_json::from_reader(reader)?,
            SettingsFormat::Yaml => serde_yaml::from_reader(reader)?,
        };
        Ok(document)
    }

    /// Writes the document to a file, replacing any existing content.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::SettingsError::Io) if the file cannot be
    /// written, or a serialization error.
    pub fn write(&self, path: impl AsRef<Path>, format: SettingsFormat) -> Result<()> {
        let mut writer = BufWriter::new(std::fs::File::create(path)?);
        match format {
            SettingsFormat::Json => {
                serde_json::to_writer_pretty(&mut writer, self)?;
                writer.write_all(b"\n")?;
            }
            SettingsFormat::Yaml => serde_yaml::to_writer(&mut writer, self)?,
        }
        writer.flush()?;
        Ok(())
    }
}

/// Encodes the saveable fields of `config`.
///
/// # Errors
///
/// Returns a JSON or YAML serialization error.
pub fn to_string<T>(schema: &ArgumentSchema<T>, config: &T, format: SettingsFormat) -> Result<String> {
    to_document(schema, config).render(format)
}

/// Decodes `text` and applies it to `config`.
///
/// # Errors
///
/// Returns a parse error or any error from [`apply_document`].
pub fn from_str<T>(
    schema: &ArgumentSchema<T>,
    text: &str,
    format: SettingsFormat,
    config: &mut T,
) -> Result<()> {
    apply_document(schema, &SettingsDocument::parse(text, format)?, config)
}

/// Saves the saveable fields of `config` to `path`.
///
/// # Errors
///
/// Returns an I/O or serialization error.
pub fn save<T>(
    schema: &ArgumentSchema<T>,
    config: &T,
    path: impl AsRef<Path>,
    format: SettingsFormat,
) -> Result<()> {
    let path = path.as_ref();
    let document = to_document(schema, config);
    document.write(path, format)?;
    debug!(path = %path.display(), properties = document.properties.len(), "Saved settings");
    Ok(())
}

/// Loads settings from `path` into `config`.
///
/// # Errors
///
/// Returns an I/O or parse error, or any error from [`apply_document`].
pub fn load<T>(
    schema: &ArgumentSchema<T>,
    path: impl AsRef<Path>,
    format: SettingsFormat,
    config: &mut T,
) -> Result<()> {
    let path = path.as_ref();
    let document = SettingsDocument::read(path, format)?;
    apply_document(schema, &document, config)?;
    debug!(path = %path.display(), properties = document.properties.len(), "Loaded settings");
    Ok(())
}

/// Loads a fresh `T` from `path` using the registry's schema.
///
/// # Errors
///
/// Returns [`Schema`](crate::SettingsError::Schema) if `T`'s schema cannot be
/// built, or any error from [`load`].
pub fn load_as<T: Configuration>(
    registry: &SchemaRegistry,
    path: impl AsRef<Path>,
    format: SettingsFormat,
) -> Result<T> {
    let schema = registry.get_or_build::<T>()?;
    let mut config = T::default();
    load(&schema, path, format, &mut config)?;
    Ok(config)
}
