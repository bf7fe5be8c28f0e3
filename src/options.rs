//! Normalization of raw request options.
//!
//! The boundary hands over string-keyed options exactly as received. Parsing
//! here is lenient: malformed values fall back to defaults instead of failing
//! the request.

use crate::view::ViewOptions;
use std::collections::{BTreeMap, BTreeSet};

pub const EXTENSIONS_PARAM: &str = "extensions";
pub const PROFILES_PARAM: &str = "profiles";
pub const OBJECTS_PARAM: &str = "objects";
pub const MODE_PARAM: &str = "_mode";
pub const SPACES_PARAM: &str = "_spaces";
pub const EXTENSION_PARAM: &str = "extension";

/// Split a comma-delimited list into a set, dropping empty tokens.
pub fn split_list(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Absent or empty input selects no extensions.
pub fn normalize_extensions(raw: Option<&str>) -> BTreeSet<String> {
    raw.map(split_list).unwrap_or_default()
}

/// `None` means "do not filter"; `Some` of an empty set filters to nothing.
pub fn normalize_profiles(raw: Option<&str>) -> Option<BTreeSet<String>> {
    raw.map(split_list)
}

/// Verbosity level for translate/sample flows; anything unparsable is 0.
pub fn normalize_verbosity(raw: Option<&str>) -> u32 {
    raw.map(str::trim)
        .and_then(|value| value.parse::<i64>().ok())
        .map(|level| u32::try_from(level.max(0)).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Every recognized request option, normalized.
pub struct RequestOptions {
    pub extensions: BTreeSet<String>,
    pub profiles: Option<BTreeSet<String>>,
    pub include_nested_objects: bool,
    pub verbosity: u32,
    /// Space-handling policy for the translator; passed through untouched.
    pub spaces: Option<String>,
    pub extension: Option<String>,
}

impl RequestOptions {
    pub fn from_params(params: &BTreeMap<String, String>) -> Self {
        let get = |key: &str| params.get(key).map(String::as_str);
        Self {
            extensions: normalize_extensions(get(EXTENSIONS_PARAM)),
            profiles: normalize_profiles(get(PROFILES_PARAM)),
            include_nested_objects: get(OBJECTS_PARAM) == Some("1"),
            verbosity: normalize_verbosity(get(MODE_PARAM)),
            spaces: get(SPACES_PARAM).map(str::to_string),
            extension: get(EXTENSION_PARAM)
                .map(str::trim)
                .filter(|ext| !ext.is_empty())
                .map(str::to_string),
        }
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            include_nested_objects: self.include_nested_objects,
            profiles: self.profiles.clone(),
            extension_filter: self.extensions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn extensions_split_and_collapse() {
        assert!(normalize_extensions(None).is_empty());
        assert!(normalize_extensions(Some("")).is_empty());
        assert_eq!(normalize_extensions(Some("win,linux,win")), set(&["linux", "win"]));
        assert_eq!(normalize_extensions(Some(" win , ,linux")), set(&["linux", "win"]));
    }

    #[test]
    fn profiles_distinguish_absent_from_empty() {
        assert_eq!(normalize_profiles(None), None);
        assert_eq!(normalize_profiles(Some("")), Some(BTreeSet::new()));
        assert_eq!(normalize_profiles(Some("host,cloud")), Some(set(&["cloud", "host"])));
    }

    #[test]
    fn verbosity_degrades_to_zero() {
        assert_eq!(normalize_verbosity(Some("2")), 2);
        assert_eq!(normalize_verbosity(Some("abc")), 0);
        assert_eq!(normalize_verbosity(None), 0);
        assert_eq!(normalize_verbosity(Some("")), 0);
        assert_eq!(normalize_verbosity(Some("-5")), 0);
        assert_eq!(normalize_verbosity(Some(" 3 ")), 3);
    }

    #[test]
    fn from_params_reads_every_option() {
        let params = BTreeMap::from([
            ("extensions".to_string(), "win".to_string()),
            ("profiles".to_string(), String::new()),
            ("objects".to_string(), "1".to_string()),
            ("_mode".to_string(), "2".to_string()),
            ("_spaces".to_string(), "_".to_string()),
            ("extension".to_string(), "win".to_string()),
        ]);
        let options = RequestOptions::from_params(&params);
        assert_eq!(options.extensions, set(&["win"]));
        assert_eq!(options.profiles, Some(BTreeSet::new()));
        assert!(options.include_nested_objects);
        assert_eq!(options.verbosity, 2);
        assert_eq!(options.spaces.as_deref(), Some("_"));
        assert_eq!(options.extension.as_deref(), Some("win"));

        let view = options.view_options();
        assert!(view.include_nested_objects);
        assert_eq!(view.extension_filter, set(&["win"]));
    }

    #[test]
    fn objects_flag_requires_exact_one() {
        for raw in ["true", "0", "", "yes"] {
            let params = BTreeMap::from([("objects".to_string(), raw.to_string())]);
            assert!(!RequestOptions::from_params(&params).include_nested_objects);
        }
        assert_eq!(RequestOptions::from_params(&BTreeMap::new()), RequestOptions::default());
    }
}
