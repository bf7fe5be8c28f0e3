//! Indexed, read-only snapshot of a schema catalog.
//!
//! The index validates the catalog file against its JSON Schema, rejects
//! duplicate keys and dangling category/extension references, and then serves
//! lookups by kind and key. It is built once at start-up and shared by
//! reference; nothing mutates it afterwards.

use crate::catalog::Catalog;
use crate::catalog::identity::{EntityKind, TypeName};
use crate::catalog::model::{
    CategoryDefinition, ClassDefinition, Entity, ExtensionInfo, ObjectDefinition, SchemaCatalog,
    load_catalog_from_path, qualified_key,
};
use crate::schema_loader::{load_json_schema, read_json, validate_instance};
use anyhow::{Context, Result, bail};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::debug;

const CATALOG_SCHEMA_FILE: &str = "catalog.schema.json";

#[derive(Debug)]
/// Schema catalog plus derived indexes keyed by qualified name.
pub struct CatalogIndex {
    version: String,
    categories: BTreeMap<String, CategoryDefinition>,
    classes: BTreeMap<String, ClassDefinition>,
    objects: BTreeMap<TypeName, ObjectDefinition>,
}

impl CatalogIndex {
    /// Load and validate the catalog from disk.
    pub fn load(path: &Path) -> Result<Self> {
        validate_against_schema(path)?;
        let catalog =
            load_catalog_from_path(path).with_context(|| format!("loading {}", path.display()))?;
        let index = Self::from_catalog(catalog)
            .with_context(|| format!("indexing catalog {}", path.display()))?;
        debug!(
            path = %path.display(),
            version = %index.version,
            classes = index.classes.len(),
            objects = index.objects.len(),
            "catalog loaded"
        );
        Ok(index)
    }

    /// Index an already-parsed catalog, enforcing referential invariants.
    pub fn from_catalog(catalog: SchemaCatalog) -> Result<Self> {
        validate_version(&catalog.version)?;
        let extensions = index_extensions(catalog.extensions)?;

        let mut categories = BTreeMap::new();
        for category in catalog.categories {
            check_entity(
                EntityKind::Category,
                &category.name,
                category.extension.as_deref(),
                &extensions,
            )?;
            let key = category.key();
            if categories.contains_key(&key) {
                bail!("duplicate category {key}");
            }
            categories.insert(key, category);
        }

        let mut classes = BTreeMap::new();
        for class in catalog.classes {
            check_entity(
                EntityKind::Class,
                &class.base.name,
                class.base.extension.as_deref(),
                &extensions,
            )?;
            let key = class.base.key().0;
            if classes.contains_key(&key) {
                bail!("duplicate class {key}");
            }
            let Some(category) = categories.get_mut(&class.category) else {
                bail!("class {key} references unknown category {}", class.category);
            };
            category.classes.insert(key.clone(), class.clone());
            classes.insert(key, class);
        }

        let mut objects = BTreeMap::new();
        for object in catalog.objects {
            check_entity(
                EntityKind::Object,
                &object.name,
                object.extension.as_deref(),
                &extensions,
            )?;
            let key = object.key();
            if objects.contains_key(&key) {
                bail!("duplicate object {key}");
            }
            objects.insert(key, object);
        }

        Ok(Self {
            version: catalog.version,
            categories,
            classes,
            objects,
        })
    }

    /// Catalog version declared in the loaded file.
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl Catalog for CatalogIndex {
    fn lookup(
        &self,
        kind: EntityKind,
        extension_scope: Option<&str>,
        identifier: &str,
    ) -> Option<Entity> {
        let key = qualified_key(extension_scope, identifier);
        match kind {
            EntityKind::Class => self.classes.get(&key).cloned().map(Entity::Class),
            EntityKind::Object => self
                .objects
                .get(&TypeName(key))
                .cloned()
                .map(Entity::Object),
            EntityKind::Category => self.categories.get(&key).cloned().map(Entity::Category),
        }
    }

    fn lookup_object(&self, type_name: &TypeName) -> Option<ObjectDefinition> {
        self.objects.get(type_name).cloned()
    }

    fn list(&self, kind: EntityKind, extensions: &BTreeSet<String>) -> Vec<Entity> {
        let in_scope = |extension: Option<&str>| match extension {
            None => true,
            Some(ext) => extensions.contains(ext),
        };
        match kind {
            EntityKind::Class => self
                .classes
                .values()
                .filter(|class| in_scope(class.base.extension.as_deref()))
                .cloned()
                .map(Entity::Class)
                .collect(),
            EntityKind::Object => self
                .objects
                .values()
                .filter(|object| in_scope(object.extension.as_deref()))
                .cloned()
                .map(Entity::Object)
                .collect(),
            EntityKind::Category => self
                .categories
                .values()
                .filter(|category| in_scope(category.extension.as_deref()))
                .cloned()
                .map(Entity::Category)
                .collect(),
        }
    }
}

fn validate_version(version: &str) -> Result<()> {
    if version.is_empty() {
        bail!("version must not be empty");
    }
    if !version
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '+'))
    {
        bail!("version must match ^[A-Za-z0-9_.+-]+$, got {version}");
    }
    Ok(())
}

fn index_extensions(declared: Vec<ExtensionInfo>) -> Result<BTreeMap<String, ExtensionInfo>> {
    let mut map = BTreeMap::new();
    for ext in declared {
        if ext.name.trim().is_empty() {
            bail!("extensions must not contain empty names");
        }
        if ext.name.contains('/') {
            bail!("extension name {} must not contain '/'", ext.name);
        }
        if map.contains_key(&ext.name) {
            bail!("duplicate extension {}", ext.name);
        }
        map.insert(ext.name.clone(), ext);
    }
    Ok(map)
}

fn check_entity(
    kind: EntityKind,
    name: &str,
    extension: Option<&str>,
    extensions: &BTreeMap<String, ExtensionInfo>,
) -> Result<()> {
    if name.trim().is_empty() {
        bail!("encountered {kind} with no name");
    }
    if let Some(ext) = extension {
        if !extensions.contains_key(ext) {
            bail!("{kind} {name} references unknown extension {ext}");
        }
    }
    Ok(())
}

fn validate_against_schema(catalog_path: &Path) -> Result<()> {
    let catalog_value = read_json(catalog_path)?;
    let schema_path = resolve_catalog_schema_path(catalog_path);
    let schema = load_json_schema(&schema_path)
        .with_context(|| format!("loading catalog schema {}", schema_path.display()))?;
    debug!(schema = ?schema.title, "validating catalog");
    validate_instance(
        &schema.compiled,
        &catalog_value,
        &format!("schema catalog {}", catalog_path.display()),
    )
}

/// Prefer a schema shipped next to the catalog, else the bundled copy.
pub fn resolve_catalog_schema_path(catalog_path: &Path) -> PathBuf {
    if let Some(dir) = catalog_path.parent() {
        let candidate = dir.join(CATALOG_SCHEMA_FILE);
        if candidate.is_file() {
            return candidate;
        }
    }
    bundled_schema_dir().join(CATALOG_SCHEMA_FILE)
}

pub(crate) fn bundled_schema_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("schema")
}
