use crate::error::{CodaError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw API record, keys kept in the order the API sent them
pub type Record = Map<String, Value>;

/// Keys that launcher formatting nests under `variables`
const VARIABLE_KEYS: [&str; 2] = ["id", "browserLink"];
const NAME_KEY: &str = "name";
/// Top-level launcher fields that allow-listed extras may not replace
const RESERVED_LAUNCHER_KEYS: [&str; 5] = ["uid", "title", "subtitle", "icon", "variables"];

/// What to do with a key that is neither allow-listed nor handled by the
/// launcher reshaping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFields {
    #[default]
    Drop,
    Reject,
}

/// Allow-list of record fields kept by the projector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSchema {
    pub allow: Vec<String>,
    pub unknown: UnknownFields,
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self {
            allow: vec!["browserLink".to_string(), NAME_KEY.to_string()],
            unknown: UnknownFields::Drop,
        }
    }
}

impl FieldSchema {
    fn allows(&self, key: &str) -> bool {
        self.allow.iter().any(|field| field == key)
    }
}

/// Output shape of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Plain,
    /// Alfred script-filter items
    Launcher,
}

/// A record reshaped for a launcher script filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LauncherRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub icon: String,
    pub variables: Record,
    /// Remaining allow-listed fields, emitted top-level
    #[serde(flatten)]
    pub extra: Record,
}

/// Maps raw API records onto the configured field schema
#[derive(Debug, Clone)]
pub struct Projector {
    schema: FieldSchema,
    icon: String,
}

impl Projector {
    pub fn new(schema: FieldSchema, icon: impl Into<String>) -> Self {
        Self {
            schema,
            icon: icon.into(),
        }
    }

    /// Keep only allow-listed keys, in input order
    pub fn project_plain(&self, record: &Record) -> Result<Record> {
        let mut out = Record::new();
        for (key, value) in record {
            if self.schema.allows(key) {
                out.insert(key.clone(), value.clone());
            } else {
                self.unknown(key)?;
            }
        }
        Ok(out)
    }

    pub fn project_launcher(&self, record: &Record) -> Result<LauncherRecord> {
        let mut launcher = LauncherRecord {
            uid: None,
            title: None,
            subtitle: None,
            icon: self.icon.clone(),
            variables: Record::new(),
            extra: Record::new(),
        };

        for (key, value) in record {
            if key == NAME_KEY {
                let name = display_value(value);
                launcher.uid = Some(name.clone());
                launcher.title = Some(name.clone());
                launcher.subtitle = Some(name);
            } else if VARIABLE_KEYS.contains(&key.as_str()) {
                launcher.variables.insert(key.clone(), value.clone());
            } else if RESERVED_LAUNCHER_KEYS.contains(&key.as_str()) {
                tracing::debug!(key = %key, "skipping field that shadows a launcher field");
            } else if self.schema.allows(key) {
                launcher.extra.insert(key.clone(), value.clone());
            } else {
                self.unknown(key)?;
            }
        }

        Ok(launcher)
    }

    /// Project every record in order, serialized for output
    pub fn project_all(&self, records: &[Record], format: OutputFormat) -> Result<Vec<Value>> {
        records
            .iter()
            .map(|record| match format {
                OutputFormat::Plain => self.project_plain(record).map(Value::Object),
                OutputFormat::Launcher => {
                    let launcher = self.project_launcher(record)?;
                    Ok(serde_json::to_value(launcher)?)
                }
            })
            .collect()
    }

    fn unknown(&self, key: &str) -> Result<()> {
        match self.schema.unknown {
            UnknownFields::Drop => Ok(()),
            UnknownFields::Reject => Err(CodaError::UnknownField(key.to_string())),
        }
    }
}

/// Launcher titles are plain text; non-string names fall back to their JSON text
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
