//! JSON Schema loading for catalog validation.
//!
//! The catalog file is checked against `catalog.schema.json` before it is
//! deserialized, so structural problems surface as schema errors with JSON
//! pointers rather than opaque serde failures.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Result of loading and compiling a JSON Schema.
pub(crate) struct SchemaLoadResult {
    pub title: Option<String>,
    pub compiled: JSONSchema,
}

pub(crate) fn load_json_schema(path: &Path) -> Result<SchemaLoadResult> {
    let schema_value =
        read_json(path).with_context(|| format!("loading schema {}", path.display()))?;
    if !schema_value.is_object() {
        bail!("schema {} must be a JSON object", path.display());
    }
    let title = schema_value
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string);

    // Compile errors borrow the schema value, so render them before it drops.
    let compiled = JSONSchema::compile(&schema_value)
        .map_err(|err| anyhow!("compiling schema {}: {err}", path.display()))?;

    Ok(SchemaLoadResult {
        title,
        compiled,
    })
}

/// Validate `instance`, joining every violation into one error.
pub(crate) fn validate_instance(schema: &JSONSchema, instance: &Value, label: &str) -> Result<()> {
    if let Err(errors) = schema.validate(instance) {
        let details = errors
            .map(|err| err.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        bail!("{label} failed schema validation:\n{details}");
    }
    Ok(())
}

pub(crate) fn read_json(path: &Path) -> Result<Value> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))
}
