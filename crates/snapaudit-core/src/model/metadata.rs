use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Immutable structured metadata
///
/// Holds arbitrary JSON values keyed by name. There are no in-place
/// mutators: `with` and `without` return a new value, so a change to a
/// metadata field always replaces the field wholesale and the store always
/// rewrites the full value. Keys are kept sorted, which makes the JSON
/// encoding canonical.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, Value>);

impl Metadata {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build metadata from a JSON value
    ///
    /// Returns `None` unless the value is a JSON object.
    pub fn from_object(value: &Value) -> Option<Self> {
        value.as_object().map(|obj| {
            Self(
                obj.iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            )
        })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a string value by key
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return a copy with `key` set to `value`
    #[must_use]
    pub fn with(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut data = self.0.clone();
        data.insert(key.into(), value.into());
        Self(data)
    }

    /// Return a copy without `key`
    #[must_use]
    pub fn without(&self, key: &str) -> Self {
        let mut data = self.0.clone();
        data.remove(key);
        Self(data)
    }

    /// Keys whose values differ between `self` and `other`, sorted
    pub fn changed_keys(&self, other: &Metadata) -> Vec<String> {
        let mut keys: Vec<String> = self
            .0
            .keys()
            .chain(other.0.keys())
            .filter(|k| self.0.get(*k) != other.0.get(*k))
            .cloned()
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl FromIterator<(String, Value)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, Value>> for Metadata {
    fn from(data: BTreeMap<String, Value>) -> Self {
        Self(data)
    }
}

impl From<Metadata> for BTreeMap<String, Value> {
    fn from(metadata: Metadata) -> Self {
        metadata.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_with_returns_new_value() {
        let original = Metadata::new().with("is_disabled", false);
        let updated = original.with("is_disabled", true);

        assert_eq!(original.get("is_disabled"), Some(&json!(false)));
        assert_eq!(updated.get("is_disabled"), Some(&json!(true)));
    }

    #[test]
    fn test_without_leaves_original_untouched() {
        let original = Metadata::new().with("a", 1).with("b", 2);
        let trimmed = original.without("a");

        assert!(original.contains_key("a"));
        assert!(!trimmed.contains_key("a"));
        assert_eq!(trimmed.len(), 1);
    }

    #[test]
    fn test_from_object_rejects_non_objects() {
        assert!(Metadata::from_object(&json!([1, 2])).is_none());
        let meta = Metadata::from_object(&json!({"Name": "alice"})).unwrap();
        assert_eq!(meta.get_str("Name"), Some("alice"));
    }

    #[test]
    fn test_serializes_with_sorted_keys() {
        let meta = Metadata::new().with("zeta", 1).with("alpha", 2);
        assert_eq!(
            serde_json::to_string(&meta).unwrap(),
            r#"{"alpha":2,"zeta":1}"#
        );
    }

    #[test]
    fn test_changed_keys() {
        let a = Metadata::new().with("x", 1).with("y", 2);
        let b = Metadata::new().with("y", 3).with("z", 4);
        assert_eq!(a.changed_keys(&b), vec!["x", "y", "z"]);
        assert!(a.changed_keys(&a.clone()).is_empty());
    }
}
