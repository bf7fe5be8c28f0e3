//! Transitive expansion of object-typed attributes.
//!
//! Starting from a root attribute set, every referenced object type is looked
//! up once and collected into a flat [`ClosureMap`]. Traversal uses an explicit
//! work queue and an expanded-set, so self-referencing and mutually
//! referencing object types terminate without growing the call stack.

use crate::catalog::{Attributes, ObjectDefinition, TypeName};
use crate::links::StripLinks;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::debug;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
/// Referenced object definitions keyed by type name, links already stripped.
pub struct ClosureMap(BTreeMap<TypeName, ObjectDefinition>);

impl ClosureMap {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, type_name: &TypeName) -> Option<&ObjectDefinition> {
        self.0.get(type_name)
    }

    pub fn contains(&self, type_name: &TypeName) -> bool {
        self.0.contains_key(type_name)
    }

    /// Type names in sorted order.
    pub fn type_names(&self) -> impl Iterator<Item = &TypeName> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeName, &ObjectDefinition)> {
        self.0.iter()
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut ObjectDefinition> {
        self.0.values_mut()
    }
}

/// Collect every object definition reachable from `root_attributes`.
///
/// `lookup` resolves a type name against the catalog; types it cannot find
/// are left out rather than treated as errors, since extension-scoped
/// catalogs may be partial. Each distinct type is looked up at most once.
pub fn resolve_closure<F>(root_attributes: &Attributes, mut lookup: F) -> ClosureMap
where
    F: FnMut(&TypeName) -> Option<ObjectDefinition>,
{
    let mut expanded: BTreeSet<TypeName> = BTreeSet::new();
    let mut queue: VecDeque<TypeName> = object_references(root_attributes).cloned().collect();
    let mut resolved = BTreeMap::new();

    while let Some(type_name) = queue.pop_front() {
        if !expanded.insert(type_name.clone()) {
            continue;
        }
        let Some(object) = lookup(&type_name) else {
            debug!(%type_name, "referenced object type unavailable; omitted");
            continue;
        };
        let object = object.strip_links();
        queue.extend(
            object_references(&object.attributes)
                .filter(|next| !expanded.contains(*next))
                .cloned(),
        );
        resolved.insert(type_name, object);
    }

    ClosureMap(resolved)
}

fn object_references(attributes: &Attributes) -> impl Iterator<Item = &TypeName> {
    attributes
        .values()
        .filter_map(|attr| attr.attr_type.referenced_type())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AttributeDefinition, Link, PrimitiveType};
    use std::cell::RefCell;

    fn object(name: &str, refs: &[(&str, &str)]) -> ObjectDefinition {
        let mut attributes: Attributes = refs
            .iter()
            .map(|(attr, target)| (attr.to_string(), AttributeDefinition::object_ref(target)))
            .collect();
        attributes.insert("uid".into(), AttributeDefinition::primitive(PrimitiveType::String));
        ObjectDefinition {
            name: name.to_string(),
            caption: None,
            description: None,
            extension: None,
            attributes,
            links: Some(vec![Link {
                group: "common".into(),
                kind: "object".into(),
                caption: None,
            }]),
        }
    }

    fn catalog(objects: Vec<ObjectDefinition>) -> BTreeMap<TypeName, ObjectDefinition> {
        objects.into_iter().map(|obj| (obj.key(), obj)).collect()
    }

    #[test]
    fn no_object_references_yields_empty_map() {
        let root = object("file", &[]);
        let closure = resolve_closure(&root.attributes, |_| panic!("no lookups expected"));
        assert!(closure.is_empty());
    }

    #[test]
    fn self_and_mutual_cycles_terminate_with_unique_entries() {
        let objects = catalog(vec![
            object("process", &[("parent_process", "process"), ("user", "user")]),
            object("user", &[("groups", "group"), ("account", "account")]),
            object("group", &[("owner", "user")]),
            object("account", &[("owner", "user"), ("self_ref", "account")]),
        ]);
        let lookups = RefCell::new(Vec::new());
        let root = object("process_activity", &[("process", "process"), ("actor", "user")]);

        let closure = resolve_closure(&root.attributes, |name| {
            lookups.borrow_mut().push(name.clone());
            objects.get(name).cloned()
        });

        let names: Vec<_> = closure.type_names().map(TypeName::as_str).collect();
        assert_eq!(names, vec!["account", "group", "process", "user"]);
        let lookups = lookups.into_inner();
        let distinct: BTreeSet<_> = lookups.iter().collect();
        assert_eq!(lookups.len(), distinct.len(), "each type looked up once");
    }

    #[test]
    fn missing_types_are_omitted_silently() {
        let objects = catalog(vec![object("user", &[("ldap", "ldap_person")])]);
        let root = object("authentication", &[("user", "user"), ("device", "device")]);
        let closure = resolve_closure(&root.attributes, |name| objects.get(name).cloned());
        assert_eq!(closure.len(), 1);
        assert!(closure.contains(&TypeName::from("user")));
        assert!(!closure.contains(&TypeName::from("device")));
    }

    #[test]
    fn resolved_entries_have_links_stripped_and_root_is_untouched() {
        let objects = catalog(vec![object("user", &[])]);
        let root = object("process", &[("user", "user")]);
        let before = root.clone();
        let closure = resolve_closure(&root.attributes, |name| objects.get(name).cloned());
        assert!(closure.get(&TypeName::from("user")).unwrap().links.is_none());
        assert_eq!(root, before);
    }

    #[test]
    fn deep_chains_do_not_recurse() {
        let depth = 10_000;
        let objects: BTreeMap<TypeName, ObjectDefinition> = (0..depth)
            .map(|i| {
                let next = format!("node_{}", i + 1);
                let obj = object(&format!("node_{i}"), &[("next", next.as_str())]);
                (obj.key(), obj)
            })
            .collect();
        let root = object("root", &[("head", "node_0")]);
        let closure = resolve_closure(&root.attributes, |name| objects.get(name).cloned());
        assert_eq!(closure.len(), depth);
    }
}
