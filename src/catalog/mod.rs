//! Schema catalog wiring.
//!
//! This module wraps the JSON catalog under `schema/catalog.json` so the view
//! composer can look up classes, objects, and categories from a validated,
//! immutable snapshot. Types here mirror the catalog schema; the composer
//! only sees the [`Catalog`] trait, and `CatalogIndex` is the implementation
//! loaded from disk.

pub mod identity;
pub mod index;
pub mod model;

use std::collections::BTreeSet;

pub use identity::{EntityKind, PrimitiveType, TypeName};
pub use index::{CatalogIndex, resolve_catalog_schema_path};
pub use model::{
    AttributeDefinition, AttributeType, Attributes, CategoryDefinition, ClassDefinition, Entity,
    ExtensionInfo, Link, ObjectDefinition, SchemaCatalog, load_catalog_from_path, qualified_key,
};

/// Read-only lookups the view composer needs from a catalog snapshot.
pub trait Catalog {
    /// Resolve a root entity; `extension_scope` qualifies the identifier.
    fn lookup(
        &self,
        kind: EntityKind,
        extension_scope: Option<&str>,
        identifier: &str,
    ) -> Option<Entity>;

    /// Resolve an object definition by its qualified type name.
    fn lookup_object(&self, type_name: &TypeName) -> Option<ObjectDefinition>;

    /// Entities of `kind` from the base schema plus the given extensions,
    /// ordered by qualified key.
    fn list(&self, kind: EntityKind, extensions: &BTreeSet<String>) -> Vec<Entity>;
}
