use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// An exact-match label selector.
///
/// A selector matches a label map when every one of its entries is present
/// in the map with an equal value. An empty selector matches nothing, the
/// way an empty Service selector binds no pods.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct LabelSelector(BTreeMap<String, String>);

impl LabelSelector {
    #[must_use]
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        !self.0.is_empty() && self.0.iter().all(|(key, value)| labels.get(key) == Some(value))
    }

    /// Whether `key` takes part in the selection.
    #[must_use]
    pub fn requires(&self, key: &str) -> bool { self.0.contains_key(key) }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> { self.0.get(key).map(String::as_str) }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    #[inline]
    #[must_use]
    pub const fn as_map(&self) -> &BTreeMap<String, String> { &self.0 }

    #[inline]
    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, String> { self.0 }
}

impl From<BTreeMap<String, String>> for LabelSelector {
    fn from(labels: BTreeMap<String, String>) -> Self { Self(labels) }
}

impl<K, V> FromIterator<(K, V)> for LabelSelector
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
    }
}

/// Renders the `key=value,key=value` form accepted by the Kubernetes list
/// API.
impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn test_matches_subset() {
        let selector = LabelSelector::from_iter([("app", "demo")]);
        assert!(selector.matches(&labels(&[("app", "demo"), ("tier", "web")])));
        assert!(!selector.matches(&labels(&[("app", "other")])));
        assert!(!selector.matches(&labels(&[("tier", "web")])));
    }

    #[test]
    fn test_empty_selector_matches_nothing() {
        let selector = LabelSelector::default();
        assert!(!selector.matches(&labels(&[("app", "demo")])));
        assert!(!selector.matches(&BTreeMap::new()));
    }

    #[test]
    fn test_display() {
        let selector = LabelSelector::from_iter([
            ("app.kubernetes.io/name", "demo"),
            ("app.kubernetes.io/instance", "app1"),
        ]);
        assert_eq!(
            selector.to_string(),
            "app.kubernetes.io/instance=app1,app.kubernetes.io/name=demo"
        );
        assert!(selector.requires("app.kubernetes.io/instance"));
        assert_eq!(selector.get("app.kubernetes.io/name"), Some("demo"));
    }
}
