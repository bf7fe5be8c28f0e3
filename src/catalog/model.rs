//! Deserializable representation of the schema catalog file.
//!
//! The types mirror `schema/catalog.schema.json` so the index and the view
//! composer can reason about classes, objects, and categories without ad-hoc
//! JSON handling. Unknown attribute fields are carried through untouched so a
//! richer catalog still renders faithfully.

use crate::catalog::identity::{EntityKind, PrimitiveType, TypeName};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Wire tag for object-typed attributes.
pub const OBJECT_TYPE_TAG: &str = "object_t";

/// Attribute mapping of an entity, ordered by attribute name.
pub type Attributes = BTreeMap<String, AttributeDefinition>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// Documentation cross-reference kept in `_links`; never exposed by views.
pub struct Link {
    pub group: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
/// Value kind of an attribute.
pub enum AttributeType {
    Primitive(PrimitiveType),
    ObjectReference { referenced_type: TypeName },
}

impl AttributeType {
    /// The referenced object type when this is an object reference.
    pub fn referenced_type(&self) -> Option<&TypeName> {
        match self {
            AttributeType::ObjectReference { referenced_type } => Some(referenced_type),
            AttributeType::Primitive(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAttribute", into = "RawAttribute")]
/// One attribute of a class or object, keyed by name in [`Attributes`].
pub struct AttributeDefinition {
    pub attr_type: AttributeType,
    pub caption: Option<String>,
    pub description: Option<String>,
    pub requirement: Option<String>,
    /// Profile that contributes this attribute; untagged attributes are
    /// always part of the view.
    pub profile: Option<String>,
    pub links: Option<Vec<Link>>,
    pub extra: Map<String, Value>,
}

impl AttributeDefinition {
    /// Shorthand for an attribute referencing another object type.
    pub fn object_ref(referenced_type: &str) -> Self {
        Self::with_type(AttributeType::ObjectReference {
            referenced_type: TypeName::from(referenced_type),
        })
    }

    /// Shorthand for a primitive-typed attribute.
    pub fn primitive(kind: PrimitiveType) -> Self {
        Self::with_type(AttributeType::Primitive(kind))
    }

    fn with_type(attr_type: AttributeType) -> Self {
        Self {
            attr_type,
            caption: None,
            description: None,
            requirement: None,
            profile: None,
            links: None,
            extra: Map::new(),
        }
    }
}

// Flat wire shape: `type` plus `object_type` for references.
#[derive(Serialize, Deserialize)]
struct RawAttribute {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    object_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    requirement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    profile: Option<String>,
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    links: Option<Vec<Link>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<RawAttribute> for AttributeDefinition {
    type Error = String;

    fn try_from(raw: RawAttribute) -> Result<Self, Self::Error> {
        let attr_type = if raw.type_name == OBJECT_TYPE_TAG {
            let referenced = raw
                .object_type
                .filter(|name| !name.trim().is_empty())
                .ok_or_else(|| format!("{OBJECT_TYPE_TAG} attribute is missing object_type"))?;
            AttributeType::ObjectReference {
                referenced_type: TypeName(referenced),
            }
        } else {
            AttributeType::Primitive(PrimitiveType::from_str(&raw.type_name))
        };
        Ok(Self {
            attr_type,
            caption: raw.caption,
            description: raw.description,
            requirement: raw.requirement,
            profile: raw.profile,
            links: raw.links,
            extra: raw.extra,
        })
    }
}

impl From<AttributeDefinition> for RawAttribute {
    fn from(attr: AttributeDefinition) -> Self {
        let (type_name, object_type) = match attr.attr_type {
            AttributeType::Primitive(kind) => (kind.as_str().to_string(), None),
            AttributeType::ObjectReference { referenced_type } => {
                (OBJECT_TYPE_TAG.to_string(), Some(referenced_type.0))
            }
        };
        Self {
            type_name,
            object_type,
            caption: attr.caption,
            description: attr.description,
            requirement: attr.requirement,
            profile: attr.profile,
            links: attr.links,
            extra: attr.extra,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// Shared object definition referenced by classes and other objects.
pub struct ObjectDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
}

impl ObjectDefinition {
    /// Catalog key: the name, prefixed with its extension when it has one.
    pub fn key(&self) -> TypeName {
        TypeName(qualified_key(self.extension.as_deref(), &self.name))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// Event class: an object definition plus classification metadata.
pub struct ClassDefinition {
    pub uid: i64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profiles: Vec<String>,
    #[serde(flatten)]
    pub base: ObjectDefinition,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// Category grouping of event classes.
///
/// `classes` is empty on disk; the index fills it from each class's
/// `category` field when the catalog is loaded.
pub struct CategoryDefinition {
    pub name: String,
    pub uid: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(default)]
    pub classes: BTreeMap<String, ClassDefinition>,
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
}

impl CategoryDefinition {
    pub fn key(&self) -> String {
        qualified_key(self.extension.as_deref(), &self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
/// Any root entity a view can be composed from.
pub enum Entity {
    Class(ClassDefinition),
    Object(ObjectDefinition),
    Category(CategoryDefinition),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Class(_) => EntityKind::Class,
            Entity::Object(_) => EntityKind::Object,
            Entity::Category(_) => EntityKind::Category,
        }
    }

    /// Attribute mapping of classes and objects; categories have none.
    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            Entity::Class(class) => Some(&class.base.attributes),
            Entity::Object(object) => Some(&object.attributes),
            Entity::Category(_) => None,
        }
    }

    pub fn attributes_mut(&mut self) -> Option<&mut Attributes> {
        match self {
            Entity::Class(class) => Some(&mut class.base.attributes),
            Entity::Object(object) => Some(&mut object.attributes),
            Entity::Category(_) => None,
        }
    }

    pub fn extension(&self) -> Option<&str> {
        match self {
            Entity::Class(class) => class.base.extension.as_deref(),
            Entity::Object(object) => object.extension.as_deref(),
            Entity::Category(category) => category.extension.as_deref(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// Extension declared by the catalog; entities may only name declared ones.
pub struct ExtensionInfo {
    pub name: String,
    pub uid: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
/// Full schema catalog as stored on disk.
pub struct SchemaCatalog {
    pub version: String,
    #[serde(default)]
    pub extensions: Vec<ExtensionInfo>,
    #[serde(default)]
    pub categories: Vec<CategoryDefinition>,
    #[serde(default)]
    pub classes: Vec<ClassDefinition>,
    #[serde(default)]
    pub objects: Vec<ObjectDefinition>,
}

/// `ext/name` for extension members, `name` for the base schema.
pub fn qualified_key(extension: Option<&str>, name: &str) -> String {
    match extension {
        Some(ext) if !ext.is_empty() => format!("{ext}/{name}"),
        _ => name.to_string(),
    }
}

/// Read and parse a schema catalog from disk without additional validation.
pub fn load_catalog_from_path(path: &Path) -> Result<SchemaCatalog> {
    let data = fs::read_to_string(path)?;
    let catalog: SchemaCatalog = serde_json::from_str(&data)?;
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_reference_attribute_parses_into_tagged_variant() {
        let attr: AttributeDefinition = serde_json::from_value(json!({
            "type": "object_t",
            "object_type": "user",
            "caption": "User",
            "group": "primary"
        }))
        .unwrap();
        assert_eq!(
            attr.attr_type.referenced_type(),
            Some(&TypeName::from("user"))
        );
        assert_eq!(attr.extra.get("group"), Some(&json!("primary")));

        let back = serde_json::to_value(&attr).unwrap();
        assert_eq!(back["type"], "object_t");
        assert_eq!(back["object_type"], "user");
        assert_eq!(back["group"], "primary");
    }

    #[test]
    fn object_reference_without_target_is_rejected() {
        let err = serde_json::from_value::<AttributeDefinition>(json!({"type": "object_t"}))
            .expect_err("object_t needs object_type");
        assert!(err.to_string().contains("object_type"));
    }

    #[test]
    fn primitive_attribute_keeps_links_and_profile() {
        let attr: AttributeDefinition = serde_json::from_value(json!({
            "type": "string_t",
            "profile": "host",
            "_links": [{"group": "common", "type": "object", "caption": "Device"}]
        }))
        .unwrap();
        assert!(attr.attr_type.referenced_type().is_none());
        assert_eq!(attr.profile.as_deref(), Some("host"));
        assert_eq!(attr.links.as_ref().map(Vec::len), Some(1));
        assert!(attr.extra.is_empty());
    }

    #[test]
    fn class_flattens_object_fields() {
        let class: ClassDefinition = serde_json::from_value(json!({
            "name": "process_activity",
            "uid": 1007,
            "category": "system",
            "profiles": ["host"],
            "attributes": {"process": {"type": "object_t", "object_type": "process"}}
        }))
        .unwrap();
        assert_eq!(class.base.name, "process_activity");
        assert_eq!(class.base.attributes.len(), 1);

        let value = serde_json::to_value(&class).unwrap();
        assert_eq!(value["uid"], 1007);
        assert_eq!(value["name"], "process_activity");
        assert!(value.get("_links").is_none());
    }

    #[test]
    fn qualified_key_prefixes_extension_members() {
        assert_eq!(qualified_key(Some("win"), "win_service"), "win/win_service");
        assert_eq!(qualified_key(None, "process"), "process");
        assert_eq!(qualified_key(Some(""), "process"), "process");
    }
}
