//! Attribute map (§3): an ordered, descriptive-only string→string mapping.
//! Attributes never participate in object identity or equality used by the
//! derivation-purity invariant; they may only be added before an object is
//! finalized.

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// Well-known attribute key: human-readable field name.
pub const SPECIES: &str = "_species";
/// Well-known attribute key: set membership.
pub const PART_OF: &str = "_part_of";
/// Well-known attribute key: display color.
pub const COLOR: &str = "_color";

/// An ordered string→string attribute map. Preserves insertion order;
/// re-setting an existing key updates its value in place without moving it
/// to the back.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    /// An empty attribute map.
    pub fn new() -> Self {
        Attributes::default()
    }

    /// Sets `key` to `value`, preserving the original insertion position if
    /// `key` was already present.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Looks up `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Removes `key`, returning its value if present.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Iterates attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_preserves_order_on_update() {
        let mut a = Attributes::new();
        a.set("a", "1");
        a.set("b", "2");
        a.set("a", "3");
        let keys: Vec<_> = a.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(a.get("a"), Some("3"));
    }

    #[test]
    fn remove_returns_previous_value() {
        let mut a = Attributes::new();
        a.set(SPECIES, "pressure");
        assert_eq!(a.remove(SPECIES), Some("pressure".to_string()));
        assert_eq!(a.get(SPECIES), None);
    }
}
