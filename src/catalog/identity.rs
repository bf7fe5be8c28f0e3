use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Catalog key of an object definition (e.g., `process`, `win/win_service`).
///
/// Extension-contributed entries carry their extension prefix, so the key is
/// unique across the whole catalog namespace.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(pub String);

impl TypeName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(value: &str) -> Self {
        TypeName(value.to_string())
    }
}

/// Which catalog namespace a lookup targets.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum EntityKind {
    Class,
    Object,
    Category,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Class => "class",
            EntityKind::Object => "object",
            EntityKind::Category => "category",
        }
    }

    /// Accepts singular and plural spellings, matching the API path segments.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "class" | "classes" => Some(EntityKind::Class),
            "object" | "objects" => Some(EntityKind::Object),
            "category" | "categories" => Some(EntityKind::Category),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primitive attribute kinds known to the catalog.
///
/// Known variants keep serialization consistent; `Other` preserves forward
/// compatibility with catalogs that introduce new primitive types.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PrimitiveType {
    String,
    Integer,
    Long,
    Float,
    Boolean,
    Timestamp,
    Json,
    Other(String),
}

impl Serialize for PrimitiveType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PrimitiveType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_str(&value))
    }
}

impl PrimitiveType {
    pub fn as_str(&self) -> &str {
        match self {
            PrimitiveType::String => "string_t",
            PrimitiveType::Integer => "integer_t",
            PrimitiveType::Long => "long_t",
            PrimitiveType::Float => "float_t",
            PrimitiveType::Boolean => "boolean_t",
            PrimitiveType::Timestamp => "timestamp_t",
            PrimitiveType::Json => "json_t",
            PrimitiveType::Other(value) => value.as_str(),
        }
    }

    pub(crate) fn from_str(value: &str) -> Self {
        match value {
            "string_t" => PrimitiveType::String,
            "integer_t" => PrimitiveType::Integer,
            "long_t" => PrimitiveType::Long,
            "float_t" => PrimitiveType::Float,
            "boolean_t" => PrimitiveType::Boolean,
            "timestamp_t" => PrimitiveType::Timestamp,
            "json_t" => PrimitiveType::Json,
            other => PrimitiveType::Other(other.to_string()),
        }
    }
}
