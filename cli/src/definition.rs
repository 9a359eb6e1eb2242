//! Argument definition files.
//!
//! An [`ArgsDefinition`] bundles the requested types with parse settings so
//! a set of schemas can be kept next to the program that uses them. Files
//! ending in `.json` are read as JSON, everything else as YAML.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! lenient: false
//! types:
//!   - type: schema
//!     name: Server
//!     fields:
//!       - { name: port, shape: scalar, type: int32, default: "8080" }
//!       - { name: tags, shape: list, type: string }
//!   - type: family
//!     name: Action
//!     kind: action
//!     members:
//!       - name: Start
//!       - name: Stop
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use typed_args_core::{ArgsType, DefinitionError, ParseOptions, validate_definitions};

/// Errors raised while reading or writing a definition file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The file parsed but its types do not work together.
    #[error("invalid definition: {0}")]
    Invalid(#[from] DefinitionError),
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;

fn default_version() -> String {
    "1.0".to_string()
}

/// A set of argument types plus parse settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgsDefinition {
    /// Format version (e.g. `"1.0"`).
    #[serde(default = "default_version")]
    pub version: String,
    /// Ignore unknown arguments when parsing.
    #[serde(default)]
    pub lenient: bool,
    /// Requested types, in order.
    pub types: Vec<ArgsType>,
}

impl ArgsDefinition {
    /// Loads a definition, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the file cannot be read, or a
    /// JSON/YAML error if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let definition = if is_json(path) {
            serde_json::from_reader(reader)?
        } else {
            serde_yaml::from_reader(reader)?
        };
        Ok(definition)
    }

    /// Saves the definition, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the file cannot be written, or a
    /// JSON/YAML error if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(std::fs::File::create(path)?);
        if is_json(path) {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_yaml::to_writer(writer, self)?;
        }
        Ok(())
    }

    /// Runs the definition checks on the contained types.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] with the first problem found.
    pub fn validate(&self) -> Result<()> {
        validate_definitions(&self.types)?;
        Ok(())
    }

    /// Parse options for this definition; `force_lenient` overrides a
    /// strict file.
    pub fn options(&self, force_lenient: bool) -> ParseOptions {
        ParseOptions {
            lenient: self.lenient || force_lenient,
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use typed_args_core::{ElementType, FieldSchema, Schema, VariantFamily};

    use super::*;

    const YAML: &str = r#"
version: "1.0"
types:
  - type: schema
    name: Server
    fields:
      - { name: port, shape: scalar, type: int32, default: "8080" }
      - { name: env, shape: map, key: string, type: string }
  - type: family
    name: Action
    kind: action
    members:
      - name: Start
      - name: Stop
"#;

    fn definition(types: Vec<ArgsType>) -> ArgsDefinition {
        ArgsDefinition {
            version: "1.0".to_string(),
            lenient: false,
            types,
        }
    }

    fn sample() -> ArgsDefinition {
        definition(vec![
            Schema::new("Server")
                .with_field(FieldSchema::scalar("port", ElementType::Int32).with_default("8080"))
                .with_field(FieldSchema::map("env", ElementType::String, ElementType::String))
                .into(),
            VariantFamily::action("Action")
                .with_member(Schema::new("Start"))
                .with_member(Schema::new("Stop"))
                .into(),
        ])
    }

    #[test]
    fn test_yaml_definition_parses() {
        let definition: ArgsDefinition = serde_yaml::from_str(YAML).unwrap();
        assert_eq!(definition, sample());
        assert!(!definition.lenient);
        assert!(definition.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let definition = sample();

        for name in ["args.yaml", "args.json"] {
            let path = dir.path().join(name);
            definition.save(&path).unwrap();
            assert_eq!(ArgsDefinition::load(&path).unwrap(), definition);
        }

        let json = std::fs::read_to_string(dir.path().join("args.json")).unwrap();
        assert!(json.trim_start().starts_with('{'));
    }

    #[test]
    fn test_load_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ArgsDefinition::load(dir.path().join("missing.yaml")),
            Err(ConfigError::IoError(_))
        ));

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(ArgsDefinition::load(&path), Err(ConfigError::JsonError(_))));
    }

    #[test]
    fn test_validate_and_options() {
        let mut empty = definition(Vec::new());
        assert!(matches!(
            empty.validate(),
            Err(ConfigError::Invalid(DefinitionError::NoTypes))
        ));

        assert!(!empty.options(false).lenient);
        assert!(empty.options(true).lenient);
        empty.lenient = true;
        assert!(empty.options(false).lenient);
    }
}
