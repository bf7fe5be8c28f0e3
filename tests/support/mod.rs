#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use schema_views::{CATALOG_ENV, CatalogIndex, bundled_catalog_path};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::OnceLock;
use tempfile::TempDir;

/// Bundled catalog, loaded once and shared read-only across tests.
pub fn bundled_index() -> &'static CatalogIndex {
    static INDEX: OnceLock<CatalogIndex> = OnceLock::new();
    INDEX.get_or_init(|| {
        CatalogIndex::load(&bundled_catalog_path()).expect("bundled catalog loads")
    })
}

pub fn bundled_catalog_value() -> Value {
    read_json(&bundled_catalog_path()).expect("bundled catalog parses")
}

pub fn bundled_schema_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("schema/catalog.schema.json")
}

pub fn read_json(path: &Path) -> Result<Value> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

/// Write `catalog` as `catalog.json` inside a fresh temp dir.
pub fn write_catalog(catalog: &Value) -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new().context("failed to allocate temp dir")?;
    let path = dir.path().join("catalog.json");
    fs::write(&path, serde_json::to_vec_pretty(catalog)?)?;
    Ok((dir, path))
}

pub fn cli_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_schema-view"))
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

/// Strip `_links` the way views do: top level plus each attribute.
pub fn without_links(mut entity: Value) -> Value {
    if let Some(map) = entity.as_object_mut() {
        map.remove("_links");
        if let Some(attrs) = map.get_mut("attributes").and_then(Value::as_object_mut) {
            for attr in attrs.values_mut() {
                if let Some(attr) = attr.as_object_mut() {
                    attr.remove("_links");
                }
            }
        }
    }
    entity
}

/// Find an object entry by name in the raw catalog JSON.
pub fn raw_object(catalog: &Value, name: &str) -> Value {
    catalog["objects"]
        .as_array()
        .and_then(|objects| objects.iter().find(|obj| obj["name"] == name))
        .cloned()
        .unwrap_or_else(|| panic!("object {name} missing from catalog"))
}

/// Point the CLI at the bundled catalog regardless of the caller's env.
pub fn with_catalog_env(cmd: &mut Command) {
    cmd.env(CATALOG_ENV, bundled_catalog_path());
    cmd.env_remove("RUST_LOG");
}
