//! Removal of internal `_links` metadata before entities leave the crate.
//!
//! Links are stripped from the entity itself and from each entry of its
//! designated nested collection (`attributes`, or `classes` for a category).
//! Nothing deeper is touched: `_links` held inside an attribute's opaque
//! extra fields survive.

use crate::catalog::{CategoryDefinition, ClassDefinition, Entity, ObjectDefinition};

/// Entities that carry `_links` which views must not expose.
pub trait StripLinks: Sized {
    fn strip_links(self) -> Self;
}

/// Functional form of [`StripLinks::strip_links`].
pub fn strip_links<T: StripLinks>(entity: T) -> T {
    entity.strip_links()
}

impl StripLinks for ObjectDefinition {
    fn strip_links(mut self) -> Self {
        self.links = None;
        for attr in self.attributes.values_mut() {
            attr.links = None;
        }
        self
    }
}

impl StripLinks for ClassDefinition {
    fn strip_links(mut self) -> Self {
        self.base = self.base.strip_links();
        self
    }
}

impl StripLinks for CategoryDefinition {
    fn strip_links(mut self) -> Self {
        self.links = None;
        self.classes = self
            .classes
            .into_iter()
            .map(|(name, class)| (name, class.strip_links()))
            .collect();
        self
    }
}

impl StripLinks for Entity {
    fn strip_links(self) -> Self {
        match self {
            Entity::Class(class) => Entity::Class(class.strip_links()),
            Entity::Object(object) => Entity::Object(object.strip_links()),
            Entity::Category(category) => Entity::Category(category.strip_links()),
        }
    }
}
