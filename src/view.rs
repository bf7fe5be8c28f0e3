//! Composition of catalog entities into consumer-facing views.
//!
//! A view is built in a fixed order: catalog lookup, optional object closure,
//! link stripping, optional profile filtering. Only a missing root entity is
//! reported as [`ViewError::NotFound`]; anything else that goes wrong is
//! logged here and surfaced as the opaque [`ViewError::Internal`].

use crate::catalog::{Attributes, Catalog, Entity, EntityKind, ObjectDefinition, TypeName};
use crate::closure::{ClosureMap, resolve_closure};
use crate::error::ViewError;
use crate::links::StripLinks;
use crate::profiles::{ProfileFilter, TaggedProfileFilter};
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, error};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Per-request switches for [`ViewComposer::compose_view`].
pub struct ViewOptions {
    pub include_nested_objects: bool,
    /// `None` leaves attributes untouched; `Some(empty)` filters to zero
    /// active profiles.
    pub profiles: Option<BTreeSet<String>>,
    /// Extensions whose objects may join the closure, in addition to the
    /// base schema and the root entity's own extension.
    pub extension_filter: BTreeSet<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
/// Finished view of one entity.
///
/// Serializes as the entity's own fields, plus `objects` when nested object
/// expansion was requested and found at least one referenced type.
pub struct View {
    #[serde(flatten)]
    entity: Entity,
    #[serde(skip_serializing_if = "Option::is_none")]
    objects: Option<ClosureMap>,
}

impl View {
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn kind(&self) -> EntityKind {
        self.entity.kind()
    }

    pub fn objects(&self) -> Option<&ClosureMap> {
        self.objects.as_ref()
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Builds views against a shared, read-only catalog snapshot.
pub struct ViewComposer<'a, C, P = TaggedProfileFilter> {
    catalog: &'a C,
    profile_filter: P,
}

impl<'a, C: Catalog> ViewComposer<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self::with_profile_filter(catalog, TaggedProfileFilter)
    }
}

impl<'a, C: Catalog, P: ProfileFilter> ViewComposer<'a, C, P> {
    pub fn with_profile_filter(catalog: &'a C, profile_filter: P) -> Self {
        Self {
            catalog,
            profile_filter,
        }
    }

    /// Look up `identifier` and compose its view.
    pub fn compose_view(
        &self,
        kind: EntityKind,
        extension_scope: Option<&str>,
        identifier: &str,
        options: &ViewOptions,
    ) -> Result<View, ViewError> {
        let entity = self
            .catalog
            .lookup(kind, extension_scope, identifier)
            .ok_or_else(|| ViewError::NotFound(identifier.to_string()))?;
        self.assemble(entity, extension_scope, options)
            .map_err(|err| {
                error!(
                    %kind,
                    ?extension_scope,
                    identifier,
                    error = ?err,
                    "view composition failed"
                );
                ViewError::Internal
            })
    }

    /// Boundary entry point for a single class or object view.
    pub fn resolve_view(
        &self,
        kind: EntityKind,
        extension_scope: Option<&str>,
        identifier: &str,
        options: &ViewOptions,
    ) -> Result<View, ViewError> {
        let view = self.compose_view(kind, extension_scope, identifier, options);
        if let Err(ViewError::NotFound(_)) = &view {
            debug!(%kind, ?extension_scope, identifier, "no such entity");
        }
        view
    }

    /// Category view: its classes, link-stripped and optionally profile-filtered.
    ///
    /// Extension classes appear only when their extension is the scope or the
    /// category's own; `compose_view` with an `extension_filter` widens that.
    pub fn resolve_category_view(
        &self,
        extension_scope: Option<&str>,
        identifier: &str,
        profiles: Option<&BTreeSet<String>>,
    ) -> Result<View, ViewError> {
        let options = ViewOptions {
            profiles: profiles.cloned(),
            ..ViewOptions::default()
        };
        self.resolve_view(EntityKind::Category, extension_scope, identifier, &options)
    }

    /// Views of every entity of `kind` in the base schema and `extensions`,
    /// ordered by catalog key. Listed views are never object-expanded.
    pub fn list_views(
        &self,
        kind: EntityKind,
        extensions: &BTreeSet<String>,
        profiles: Option<&BTreeSet<String>>,
    ) -> Result<Vec<View>, ViewError> {
        let options = ViewOptions {
            include_nested_objects: false,
            profiles: profiles.cloned(),
            extension_filter: extensions.clone(),
        };
        self.catalog
            .list(kind, extensions)
            .into_iter()
            .map(|entity| self.assemble(entity, None, &options))
            .collect::<Result<Vec<_>>>()
            .map_err(|err| {
                error!(%kind, error = ?err, "listing views failed");
                ViewError::Internal
            })
    }

    fn assemble(
        &self,
        entity: Entity,
        extension_scope: Option<&str>,
        options: &ViewOptions,
    ) -> Result<View> {
        let allowed = allowed_extensions(&entity, extension_scope, options);
        let mut objects = None;
        if options.include_nested_objects {
            if let Some(attributes) = entity.attributes() {
                let closure =
                    resolve_closure(attributes, |name| self.lookup_in_scope(name, &allowed));
                objects = Some(closure).filter(|closure| !closure.is_empty());
            }
        }

        let mut entity = entity.strip_links();
        if let Entity::Category(category) = &mut entity {
            category
                .classes
                .retain(|_, class| in_scope(class.base.extension.as_deref(), &allowed));
        }

        if let Some(profiles) = &options.profiles {
            if let Entity::Category(category) = &mut entity {
                for class in category.classes.values_mut() {
                    self.filter(&mut class.base.attributes, profiles)?;
                }
            } else if let Some(attributes) = entity.attributes_mut() {
                self.filter(attributes, profiles)?;
            }
            if let Some(closure) = objects.as_mut() {
                for object in closure.values_mut() {
                    self.filter(&mut object.attributes, profiles)?;
                }
            }
        }

        Ok(View { entity, objects })
    }

    fn filter(&self, attributes: &mut Attributes, profiles: &BTreeSet<String>) -> Result<()> {
        let full = std::mem::take(attributes);
        *attributes = self.profile_filter.apply(full, profiles)?;
        Ok(())
    }

    fn lookup_in_scope(
        &self,
        type_name: &TypeName,
        allowed: &BTreeSet<String>,
    ) -> Option<ObjectDefinition> {
        self.catalog
            .lookup_object(type_name)
            .filter(|object| in_scope(object.extension.as_deref(), allowed))
    }
}

/// Extensions visible to one view: the request filter, the lookup scope, and
/// the entity's own extension.
fn allowed_extensions(
    entity: &Entity,
    extension_scope: Option<&str>,
    options: &ViewOptions,
) -> BTreeSet<String> {
    options
        .extension_filter
        .iter()
        .map(String::as_str)
        .chain(extension_scope)
        .chain(entity.extension())
        .map(str::to_string)
        .collect()
}

fn in_scope(extension: Option<&str>, allowed: &BTreeSet<String>) -> bool {
    extension.is_none_or(|ext| allowed.contains(ext))
}
