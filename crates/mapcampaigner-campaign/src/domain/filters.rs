//! Equality/substring filters for campaign listings.

use std::collections::BTreeMap;

use serde_json::Value;

use super::record::Attributes;

/// Attribute criteria a campaign must satisfy to be listed.
///
/// A campaign passes when, for every `key -> value`, the key is present in
/// its serialized attributes and `value` is contained in the attribute: a
/// substring of a string, an element of a list, or a key of a mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignFilters {
    criteria: BTreeMap<String, String>,
}

impl CampaignFilters {
    /// No criteria; every campaign passes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a criterion.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.criteria.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Whether `attributes` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, attributes: &Attributes) -> bool {
        self.criteria.iter().all(|(key, needle)| {
            attributes
                .get(key)
                .is_some_and(|haystack| contains(haystack, needle))
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CampaignFilters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |filters, (key, value)| filters.with(key, value))
    }
}

fn contains(haystack: &Value, needle: &str) -> bool {
    match haystack {
        Value::String(text) => text.contains(needle),
        Value::Array(items) => items.iter().any(|item| item.as_str() == Some(needle)),
        Value::Object(map) => map.contains_key(needle),
        _ => false,
    }
}
