//! View composition over a security-event schema catalog.
//!
//! The crate loads a validated, read-only catalog snapshot (classes, objects,
//! categories) and renders JSON views of its entries: nested object types are
//! resolved into a flat closure, profile overlays narrow attribute sets, and
//! internal `_links` metadata is stripped before anything leaves the crate.
//! Transport concerns stay with the caller; the CLI in `src/bin` is one such
//! boundary.

use anyhow::{Result, bail};
use std::env;
use std::path::PathBuf;

pub mod catalog;
pub mod closure;
pub mod error;
pub mod links;
pub mod options;
pub mod profiles;
mod schema_loader;
pub mod view;

pub use catalog::{
    AttributeDefinition, AttributeType, Attributes, Catalog, CatalogIndex, CategoryDefinition,
    ClassDefinition, Entity, EntityKind, ObjectDefinition, PrimitiveType, SchemaCatalog, TypeName,
    load_catalog_from_path,
};
pub use closure::{ClosureMap, resolve_closure};
pub use error::ViewError;
pub use links::{StripLinks, strip_links};
pub use options::{RequestOptions, normalize_extensions, normalize_profiles, normalize_verbosity};
pub use profiles::{ProfileFilter, TaggedProfileFilter};
pub use view::{View, ViewComposer, ViewOptions};

/// Environment variable naming the catalog file to serve.
pub const CATALOG_ENV: &str = "SCHEMA_VIEWS_CATALOG";

const BUNDLED_CATALOG: &str = "catalog.json";

/// Path of the catalog bundled with the crate.
pub fn bundled_catalog_path() -> PathBuf {
    catalog::index::bundled_schema_dir().join(BUNDLED_CATALOG)
}

/// Locate the catalog to load.
///
/// An explicit path wins, then `SCHEMA_VIEWS_CATALOG`, then the bundled
/// sample catalog. A path that does not exist is an error rather than a
/// silent fallback.
pub fn resolve_catalog_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    select_catalog_path(explicit, env::var(CATALOG_ENV).ok())
}

fn select_catalog_path(explicit: Option<PathBuf>, env_value: Option<String>) -> Result<PathBuf> {
    let candidate = match (explicit, env_value) {
        (Some(path), _) => path,
        (None, Some(value)) if !value.trim().is_empty() => PathBuf::from(value),
        (None, _) => bundled_catalog_path(),
    };
    if !candidate.is_file() {
        bail!("catalog file not found: {}", candidate.display());
    }
    Ok(candidate)
}
