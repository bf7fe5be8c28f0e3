//! Profile overlays that narrow an attribute set.

use crate::catalog::Attributes;
use anyhow::Result;
use std::collections::BTreeSet;

/// Narrows attributes to those relevant for the active profiles.
///
/// An empty profile set is a real request ("no profiles active"), distinct
/// from not filtering at all; callers skip the filter entirely for the latter.
pub trait ProfileFilter {
    fn apply(&self, attributes: Attributes, profiles: &BTreeSet<String>) -> Result<Attributes>;
}

impl<F> ProfileFilter for F
where
    F: Fn(Attributes, &BTreeSet<String>) -> Result<Attributes>,
{
    fn apply(&self, attributes: Attributes, profiles: &BTreeSet<String>) -> Result<Attributes> {
        self(attributes, profiles)
    }
}

#[derive(Clone, Copy, Debug, Default)]
/// Keeps untagged attributes plus those whose `profile` tag is active.
pub struct TaggedProfileFilter;

impl ProfileFilter for TaggedProfileFilter {
    fn apply(&self, mut attributes: Attributes, profiles: &BTreeSet<String>) -> Result<Attributes> {
        attributes.retain(|_, attr| match &attr.profile {
            None => true,
            Some(profile) => profiles.contains(profile),
        });
        Ok(attributes)
    }
}
