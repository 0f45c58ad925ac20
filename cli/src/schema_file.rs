//! Schema documents read from YAML or JSON files.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use switchbind_core::{ConverterRegistry, FieldDescriptor, ParserSettings, Schema, ValueKind};

/// On-disk form of a [`Schema`].
///
/// ```yaml
/// name: server
/// help: Starts the server.
/// fields:
///   - name: Port
///     kind: unsigned
///     required: true
///     short: p
///     example: "8080"
///   - name: Hosts
///     kind: { collection: { shape: list, element: string } }
///     default: localhost
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaFile {
    pub name: String,
    #[serde(default)]
    pub help: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldEntry {
    pub name: String,
    pub kind: ValueKind,
    #[serde(default)]
    pub required: bool,
    /// Default as argument text, converted like a switch argument.
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub short: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub example: Option<String>,
    /// Plain fields only bind when `allow_all_properties` is set.
    #[serde(default)]
    pub plain: bool,
}

impl SchemaFile {
    /// Reads a schema, choosing JSON or YAML by file extension.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = fs::read_to_string(path)
            .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&text)
                .map_err(|err| format!("Invalid schema '{}': {err}", path.display()))
        } else {
            Self::from_yaml(&text)
                .map_err(|err| format!("Invalid schema '{}': {err}", path.display()))
        }
    }

    /// Parses YAML where enum kinds are written as single-key maps
    /// (`{ choice: [Low, High] }`) or bare names (`unsigned`), the same shape
    /// JSON schemas use.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::with::singleton_map_recursive::deserialize(serde_yaml::Deserializer::from_str(
            text,
        ))
    }

    /// Builds the schema, converting default text with `registry`.
    pub fn into_schema(
        self,
        registry: &ConverterRegistry,
        settings: &ParserSettings,
    ) -> Result<Schema, String> {
        let mut schema = Schema::new(&self.name);
        if let Some(help) = &self.help {
            schema = schema.with_help_text(help);
        }
        for entry in self.fields {
            schema = schema.with_field(entry.into_field(registry, settings)?);
        }
        Ok(schema)
    }
}

impl FieldEntry {
    fn into_field(
        self,
        registry: &ConverterRegistry,
        settings: &ParserSettings,
    ) -> Result<FieldDescriptor, String> {
        let mut field = match (self.plain, self.required) {
            (true, _) => FieldDescriptor::new(&self.name, self.kind.clone()),
            (false, true) => FieldDescriptor::required(&self.name, self.kind.clone()),
            (false, false) => FieldDescriptor::optional(&self.name, self.kind.clone()),
        };
        if let Some(text) = &self.default {
            let value = registry
                .convert(text, &self.kind, settings)
                .map_err(|err| format!("Invalid default for field '{}': {err}", self.name))?;
            field = field.with_default(value);
        }
        if let Some(short) = &self.short {
            field = field.with_short_name(short);
        }
        if let Some(description) = &self.description {
            field = field.with_description(description);
        }
        if let Some(example) = &self.example {
            field = field.with_example(example);
        }
        Ok(field)
    }
}
